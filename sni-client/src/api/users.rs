use reqwest::Method;
use serde::Serialize;
use validator::Validate;

use super::PageQuery;
use crate::error::SniClientResult;
use crate::models::{LevelInfo, Page, User};
use crate::SniClient;

#[derive(Debug, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
struct UpdateProfileDto {
    #[validate(length(min = 2, max = 20))]
    nickname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500))]
    bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile_image: Option<String>,
}

impl SniClient {
    /// Публичный профиль пользователя.
    pub async fn get_user(&self, id: i64) -> SniClientResult<User> {
        let token = self.session.access_token();
        self.http
            .get::<(), _>(&format!("/api/users/{id}"), None, token.as_deref())
            .await
    }

    /// Обновляет профиль текущего пользователя и кэш сессии.
    ///
    /// `profile_image` обычно берётся из [`SniClient::upload_file`].
    pub async fn update_profile(
        &self,
        nickname: &str,
        bio: Option<&str>,
        profile_image: Option<&str>,
    ) -> SniClientResult<User> {
        let token = self.require_token()?;
        let payload = UpdateProfileDto {
            nickname: nickname.trim().to_string(),
            bio: bio.map(str::to_string),
            profile_image: profile_image.map(str::to_string),
        };
        payload.validate()?;

        let user: User = self
            .http
            .send_json(Method::PUT, "/api/users/me", &payload, Some(&token))
            .await?;
        Ok(self.session.replace_user(user))
    }

    /// Уровень, ранг и прогресс пользователя.
    pub async fn user_level(&self, id: i64) -> SniClientResult<LevelInfo> {
        self.http
            .get::<(), _>(&format!("/api/users/{id}/level"), None, None)
            .await
    }

    /// Рейтинг пользователей по очкам.
    pub async fn ranking(&self, page: u32, size: u32) -> SniClientResult<Page<User>> {
        let query = PageQuery::new(page, size);
        self.http
            .get("/api/users/ranking", Some(&query), None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_profile_skips_absent_fields() {
        let dto = UpdateProfileDto {
            nickname: "neo".to_string(),
            bio: None,
            profile_image: Some("https://cdn/x.png".to_string()),
        };
        let raw = serde_json::to_string(&dto).expect("must serialize");
        assert_eq!(raw, r#"{"nickname":"neo","profileImage":"https://cdn/x.png"}"#);
    }

    #[test]
    fn update_profile_validates_nickname() {
        let dto = UpdateProfileDto {
            nickname: "x".to_string(),
            bio: None,
            profile_image: None,
        };
        assert!(dto.validate().is_err());
    }
}
