use reqwest::Method;
use serde::Serialize;
use validator::Validate;

use crate::error::SniClientResult;
use crate::models::Comment;
use crate::SniClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Объект, к которому относятся комментарии.
pub enum CommentTarget {
    /// Пост доски обсуждений.
    Post(i64),
    /// Сниппет.
    Snippet(i64),
}

impl CommentTarget {
    fn path(self) -> String {
        match self {
            Self::Post(id) => format!("/api/posts/{id}/comments"),
            Self::Snippet(id) => format!("/api/snippets/{id}/comments"),
        }
    }
}

#[derive(Debug, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
struct CommentDto {
    #[validate(length(min = 1, max = 1000))]
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_id: Option<i64>,
}

impl SniClient {
    /// Комментарии к посту или сниппету.
    pub async fn list_comments(&self, target: CommentTarget) -> SniClientResult<Vec<Comment>> {
        let token = self.session.access_token();
        self.http
            .get::<(), _>(&target.path(), None, token.as_deref())
            .await
    }

    /// Добавляет комментарий; `parent_id` задаёт ответ на другой комментарий.
    pub async fn create_comment(
        &self,
        target: CommentTarget,
        content: &str,
        parent_id: Option<i64>,
    ) -> SniClientResult<Comment> {
        let token = self.require_token()?;
        let payload = CommentDto {
            content: content.trim().to_string(),
            parent_id,
        };
        payload.validate()?;
        self.http
            .send_json(Method::POST, &target.path(), &payload, Some(&token))
            .await
    }

    /// Изменяет текст комментария.
    pub async fn update_comment(&self, id: i64, content: &str) -> SniClientResult<Comment> {
        let token = self.require_token()?;
        let payload = CommentDto {
            content: content.trim().to_string(),
            parent_id: None,
        };
        payload.validate()?;
        self.http
            .send_json(
                Method::PUT,
                &format!("/api/comments/{id}"),
                &payload,
                Some(&token),
            )
            .await
    }

    /// Удаляет комментарий.
    pub async fn delete_comment(&self, id: i64) -> SniClientResult<()> {
        let token = self.require_token()?;
        let _: Option<serde_json::Value> = self
            .http
            .send_empty(Method::DELETE, &format!("/api/comments/{id}"), Some(&token))
            .await?;
        Ok(())
    }
}
