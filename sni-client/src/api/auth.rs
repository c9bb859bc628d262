use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use tracing::warn;
use validator::Validate;

use crate::error::SniClientResult;
use crate::http_client::HttpClient;
use crate::models::{Badge, LoginPayload, TokenPair, User};
use crate::session::AuthApi;
use crate::SniClient;

#[derive(Debug, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
struct LoginRequestDto {
    #[validate(email)]
    email: String,
    #[validate(length(min = 1, max = 128))]
    password: String,
}

#[derive(Debug, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
struct SignupRequestDto {
    #[validate(email)]
    email: String,
    #[validate(length(min = 8, max = 128))]
    password: String,
    #[validate(length(min = 2, max = 20))]
    nickname: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReissueRequestDto<'a> {
    refresh_token: &'a str,
}

#[async_trait]
impl AuthApi for HttpClient {
    async fn fetch_profile(&self, access_token: &str) -> SniClientResult<User> {
        self.get::<(), _>("/api/users/me", None, Some(access_token))
            .await
    }

    async fn reissue(&self, refresh_token: &str) -> SniClientResult<TokenPair> {
        let payload = ReissueRequestDto { refresh_token };
        self.send_json(Method::POST, "/api/auth/reissue", &payload, None)
            .await
    }

    async fn representative_badge(
        &self,
        access_token: &str,
        user_id: i64,
    ) -> SniClientResult<Option<Badge>> {
        self.get::<(), _>(
            &format!("/api/users/{user_id}/representative-badge"),
            None,
            Some(access_token),
        )
        .await
    }
}

impl SniClient {
    /// Вход по email и паролю. Токены сохраняются в сессии, возвращается
    /// загруженный профиль.
    pub async fn login(&self, email: &str, password: &str) -> SniClientResult<User> {
        let payload = LoginRequestDto {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        payload.validate()?;

        let response: LoginPayload = self
            .http
            .send_json(Method::POST, "/api/auth/login", &payload, None)
            .await?;
        self.session.login(response).await
    }

    /// Регистрация. Вход после регистрации выполняется отдельно.
    pub async fn signup(&self, email: &str, password: &str, nickname: &str) -> SniClientResult<()> {
        let payload = SignupRequestDto {
            email: email.trim().to_string(),
            password: password.to_string(),
            nickname: nickname.trim().to_string(),
        };
        payload.validate()?;

        let _: Option<serde_json::Value> = self
            .http
            .send_json(Method::POST, "/api/auth/signup", &payload, None)
            .await?;
        Ok(())
    }

    /// Завершает сессию. Серверный logout выполняется по возможности:
    /// локальные учётные данные удаляются в любом случае.
    pub async fn logout(&self) {
        if let Some(token) = self.session.access_token() {
            let result: SniClientResult<Option<serde_json::Value>> = self
                .http
                .send_empty(Method::POST, "/api/auth/logout", Some(&token))
                .await;
            if let Err(err) = result {
                warn!(error = %err, "server-side logout failed");
            }
        }
        self.session.logout();
    }

    /// Поднимает сохранённую сессию (аналог перезагрузки страницы).
    pub async fn restore_session(&self) -> SniClientResult<Option<User>> {
        self.session.restore().await
    }

    /// Профиль текущего пользователя (с перевыпуском токена при 401).
    pub async fn me(&self) -> SniClientResult<User> {
        let token = self.require_token()?;
        self.session.fetch_user(&token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_request_rejects_malformed_email() {
        let dto = LoginRequestDto {
            email: "not-an-email".to_string(),
            password: "secret".to_string(),
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn signup_request_enforces_password_length() {
        let dto = SignupRequestDto {
            email: "dev@example.com".to_string(),
            password: "short".to_string(),
            nickname: "dev".to_string(),
        };
        let err = dto.validate().expect_err("must fail");
        assert!(err.field_errors().contains_key("password"));
    }

    #[test]
    fn reissue_request_uses_camel_case() {
        let raw = serde_json::to_string(&ReissueRequestDto {
            refresh_token: "r",
        })
        .expect("must serialize");
        assert_eq!(raw, r#"{"refreshToken":"r"}"#);
    }
}
