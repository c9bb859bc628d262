use std::fmt;
use std::str::FromStr;

use reqwest::Url;
use tracing::warn;

use crate::error::{SniClientError, SniClientResult};
use crate::models::{LoginPayload, RawTokens, User};
use crate::SniClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Провайдер OAuth2-входа.
pub enum OAuthProvider {
    /// Kakao.
    Kakao,
    /// Google.
    Google,
}

impl OAuthProvider {
    fn as_str(self) -> &'static str {
        match self {
            Self::Kakao => "kakao",
            Self::Google => "google",
        }
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OAuthProvider {
    type Err = SniClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kakao" => Ok(Self::Kakao),
            "google" => Ok(Self::Google),
            other => Err(SniClientError::InvalidRequest(format!(
                "unsupported oauth provider: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Разобранный redirect после OAuth2-входа.
pub enum OAuthCallback {
    /// Вход выполнен: бэкенд передал токены и, возможно, профиль.
    Success {
        /// Access token.
        access_token: String,
        /// Refresh token, если передан.
        refresh_token: Option<String>,
        /// Профиль из параметра `user`, если он разобрался.
        user: Option<User>,
    },
    /// Вход не удался.
    Failure {
        /// Код ошибки из параметра `error`.
        error: String,
        /// Пояснение из параметра `message`.
        message: Option<String>,
    },
}

/// Разбирает URL, на который бэкенд перенаправил после OAuth2-входа.
///
/// Ожидаются параметры `accessToken`, `refreshToken`, `user` (JSON) либо
/// `error`/`message`.
pub fn parse_oauth_callback(callback_url: &str) -> SniClientResult<OAuthCallback> {
    let url = Url::parse(callback_url)
        .map_err(|err| SniClientError::InvalidRequest(format!("invalid callback url: {err}")))?;

    let mut access_token = None;
    let mut refresh_token = None;
    let mut user_raw = None;
    let mut error = None;
    let mut message = None;
    for (key, value) in url.query_pairs() {
        let value = value.trim().to_string();
        if value.is_empty() {
            continue;
        }
        match key.as_ref() {
            "accessToken" => access_token = Some(value),
            "refreshToken" => refresh_token = Some(value),
            "user" => user_raw = Some(value),
            "error" => error = Some(value),
            "message" => message = Some(value),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Ok(OAuthCallback::Failure { error, message });
    }

    let access_token = access_token.ok_or_else(|| {
        SniClientError::InvalidRequest("callback url is missing accessToken".to_string())
    })?;
    let user = user_raw.and_then(|raw| match serde_json::from_str::<User>(&raw) {
        Ok(user) => Some(user),
        Err(err) => {
            warn!(error = %err, "ignoring unreadable user in oauth callback");
            None
        }
    });

    Ok(OAuthCallback::Success {
        access_token,
        refresh_token,
        user,
    })
}

impl SniClient {
    /// URL, с которого начинается OAuth2-вход через провайдера.
    pub fn oauth_authorize_url(&self, provider: OAuthProvider) -> String {
        self.http
            .endpoint(&format!("/oauth2/authorization/{provider}"))
    }

    /// Завершает OAuth2-вход по redirect URL.
    pub async fn complete_oauth_login(&self, callback_url: &str) -> SniClientResult<User> {
        match parse_oauth_callback(callback_url)? {
            OAuthCallback::Success {
                access_token,
                refresh_token,
                user,
            } => {
                let payload = LoginPayload {
                    token: Some(RawTokens {
                        access_token: Some(access_token),
                        refresh_token,
                    }),
                    user,
                };
                self.session.login(payload).await
            }
            OAuthCallback::Failure { error, message } => Err(SniClientError::Api {
                status: 401,
                message: message.unwrap_or(error),
            }),
        }
    }
}
