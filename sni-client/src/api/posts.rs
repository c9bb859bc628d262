use reqwest::Method;
use serde::Serialize;
use validator::Validate;

use crate::error::SniClientResult;
use crate::models::{Page, Post};
use crate::SniClient;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
/// Параметры списка постов.
pub struct PostQuery {
    /// Номер страницы (с нуля).
    pub page: u32,
    /// Размер страницы.
    pub size: u32,
    /// Поиск по заголовку и тексту.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    /// Категория доски.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Сортировка в формате Spring, например `createdAt,desc`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

impl PostQuery {
    /// Первая страница заданного размера.
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
/// Данные для создания и изменения поста.
pub struct NewPost {
    /// Заголовок.
    #[validate(custom(function = "crate::api::non_blank"), length(min = 1, max = 255))]
    pub title: String,
    /// Содержимое.
    #[validate(custom(function = "crate::api::non_blank"), length(min = 1))]
    pub content: String,
    /// Категория доски.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl SniClient {
    /// Список постов с пагинацией и фильтрами.
    pub async fn list_posts(&self, query: &PostQuery) -> SniClientResult<Page<Post>> {
        let token = self.session.access_token();
        self.http
            .get("/api/posts", Some(query), token.as_deref())
            .await
    }

    /// Пост по идентификатору.
    pub async fn get_post(&self, id: i64) -> SniClientResult<Post> {
        let token = self.session.access_token();
        self.http
            .get::<(), _>(&format!("/api/posts/{id}"), None, token.as_deref())
            .await
    }

    /// Создаёт пост от имени текущего пользователя.
    pub async fn create_post(&self, post: &NewPost) -> SniClientResult<Post> {
        let token = self.require_token()?;
        post.validate()?;
        self.http
            .send_json(Method::POST, "/api/posts", post, Some(&token))
            .await
    }

    /// Изменяет пост.
    pub async fn update_post(&self, id: i64, post: &NewPost) -> SniClientResult<Post> {
        let token = self.require_token()?;
        post.validate()?;
        self.http
            .send_json(Method::PUT, &format!("/api/posts/{id}"), post, Some(&token))
            .await
    }

    /// Удаляет пост.
    pub async fn delete_post(&self, id: i64) -> SniClientResult<()> {
        let token = self.require_token()?;
        let _: Option<serde_json::Value> = self
            .http
            .send_empty(Method::DELETE, &format!("/api/posts/{id}"), Some(&token))
            .await?;
        Ok(())
    }

    /// Ставит или снимает лайк; возвращает обновлённый пост.
    pub async fn toggle_post_like(&self, id: i64) -> SniClientResult<Post> {
        let token = self.require_token()?;
        let _: Option<serde_json::Value> = self
            .http
            .send_empty(Method::POST, &format!("/api/posts/{id}/like"), Some(&token))
            .await?;
        self.get_post(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_query_omits_empty_filters() {
        let query = PostQuery::page(1, 20);
        let raw = serde_json::to_value(&query).expect("must serialize");
        assert_eq!(raw, serde_json::json!({"page": 1, "size": 20}));
    }

    #[test]
    fn new_post_requires_title() {
        let post = NewPost {
            title: String::new(),
            content: "body".to_string(),
            category: None,
        };
        assert!(post.validate().is_err());
    }

    #[test]
    fn whitespace_only_post_is_rejected() {
        let post = NewPost {
            title: "   ".to_string(),
            content: " \n ".to_string(),
            category: None,
        };
        let err = post.validate().expect_err("must fail");
        let fields = err.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("content"));
    }
}
