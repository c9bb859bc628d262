use reqwest::Method;
use serde::Serialize;
use validator::Validate;

use super::PageQuery;
use crate::error::SniClientResult;
use crate::models::{Page, Snippet, Visibility};
use crate::SniClient;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
/// Параметры списка сниппетов.
pub struct SnippetQuery {
    /// Номер страницы (с нуля).
    pub page: u32,
    /// Размер страницы.
    pub size: u32,
    /// Поиск по заголовку, описанию и тегам.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    /// Язык программирования.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Сортировка в формате Spring, например `likeCount,desc`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

impl SnippetQuery {
    /// Страница заданного размера без фильтров.
    pub fn page(page: u32, size: u32) -> Self {
        Self {
            page,
            size: size.clamp(1, 100),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
/// Данные для создания и изменения сниппета.
pub struct NewSnippet {
    /// Заголовок.
    #[validate(custom(function = "crate::api::non_blank"), length(min = 1, max = 255))]
    pub title: String,
    /// Описание.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Код.
    #[validate(custom(function = "crate::api::non_blank"), length(min = 1))]
    pub code: String,
    /// Язык программирования.
    #[validate(custom(function = "crate::api::non_blank"), length(min = 1, max = 32))]
    pub language: String,
    /// Теги.
    pub tags: Vec<String>,
    /// Видимость.
    pub visibility: Visibility,
}

impl SniClient {
    /// Список публичных сниппетов.
    pub async fn list_snippets(&self, query: &SnippetQuery) -> SniClientResult<Page<Snippet>> {
        let token = self.session.access_token();
        self.http
            .get("/api/snippets", Some(query), token.as_deref())
            .await
    }

    /// Сниппеты текущего пользователя, включая приватные.
    pub async fn my_snippets(&self, page: u32, size: u32) -> SniClientResult<Page<Snippet>> {
        let token = self.require_token()?;
        let query = PageQuery::new(page, size);
        self.http
            .get("/api/snippets/my", Some(&query), Some(&token))
            .await
    }

    /// Сниппет по идентификатору.
    pub async fn get_snippet(&self, id: i64) -> SniClientResult<Snippet> {
        let token = self.session.access_token();
        self.http
            .get::<(), _>(&format!("/api/snippets/{id}"), None, token.as_deref())
            .await
    }

    /// Создаёт сниппет.
    pub async fn create_snippet(&self, snippet: &NewSnippet) -> SniClientResult<Snippet> {
        let token = self.require_token()?;
        snippet.validate()?;
        self.http
            .send_json(Method::POST, "/api/snippets", snippet, Some(&token))
            .await
    }

    /// Изменяет сниппет.
    pub async fn update_snippet(&self, id: i64, snippet: &NewSnippet) -> SniClientResult<Snippet> {
        let token = self.require_token()?;
        snippet.validate()?;
        self.http
            .send_json(
                Method::PUT,
                &format!("/api/snippets/{id}"),
                snippet,
                Some(&token),
            )
            .await
    }

    /// Удаляет сниппет.
    pub async fn delete_snippet(&self, id: i64) -> SniClientResult<()> {
        let token = self.require_token()?;
        let _: Option<serde_json::Value> = self
            .http
            .send_empty(Method::DELETE, &format!("/api/snippets/{id}"), Some(&token))
            .await?;
        Ok(())
    }

    /// Ставит или снимает лайк; возвращает обновлённый сниппет.
    pub async fn toggle_snippet_like(&self, id: i64) -> SniClientResult<Snippet> {
        let token = self.require_token()?;
        let _: Option<serde_json::Value> = self
            .http
            .send_empty(
                Method::POST,
                &format!("/api/snippets/{id}/like"),
                Some(&token),
            )
            .await?;
        self.get_snippet(id).await
    }
}
