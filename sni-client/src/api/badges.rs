use reqwest::Method;
use serde::Serialize;

use crate::error::SniClientResult;
use crate::models::{Badge, User};
use crate::session::AuthApi;
use crate::SniClient;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RepresentativeBadgeDto {
    badge_id: i64,
}

impl SniClient {
    /// Все значки, которые можно получить.
    pub async fn list_badges(&self) -> SniClientResult<Vec<Badge>> {
        self.http.get::<(), _>("/api/badges", None, None).await
    }

    /// Значки, полученные пользователем.
    pub async fn user_badges(&self, user_id: i64) -> SniClientResult<Vec<Badge>> {
        let token = self.session.access_token();
        self.http
            .get::<(), _>(
                &format!("/api/users/{user_id}/badges"),
                None,
                token.as_deref(),
            )
            .await
    }

    /// Представительский значок пользователя; `None`, если не выбран.
    pub async fn representative_badge(&self, user_id: i64) -> SniClientResult<Option<Badge>> {
        let token = self.require_token()?;
        AuthApi::representative_badge(&self.http, &token, user_id).await
    }

    /// Выбирает представительский значок и обновляет профиль в сессии.
    pub async fn set_representative_badge(&self, badge_id: i64) -> SniClientResult<User> {
        let token = self.require_token()?;
        let payload = RepresentativeBadgeDto { badge_id };
        let _: Option<serde_json::Value> = self
            .http
            .send_json(
                Method::PUT,
                "/api/users/me/representative-badge",
                &payload,
                Some(&token),
            )
            .await?;
        self.session.fetch_user(&token).await
    }
}
