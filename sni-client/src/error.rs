use thiserror::Error;

#[derive(Debug, Clone, Error)]
/// Ошибки клиентской библиотеки `sni-client`.
pub enum SniClientError {
    /// Ошибка HTTP-транспорта (`reqwest`): соединение, таймаут, TLS.
    #[error("http error: {0}")]
    Http(String),

    /// Требуется авторизация (отсутствует/просрочен токен).
    #[error("unauthorized")]
    Unauthorized,

    /// Доступ запрещён: токен валиден, но прав на операцию нет (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Запрошенный ресурс не найден.
    #[error("not found")]
    NotFound,

    /// Некорректный запрос или ошибка клиентской валидации.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Бэкенд ответил ошибкой (`success: false` или неуспешный статус).
    #[error("api error ({status}): {message}")]
    Api {
        /// HTTP-статус ответа.
        status: u16,
        /// Сообщение из тела ответа либо запасной текст.
        message: String,
    },

    /// Тело ответа не удалось разобрать.
    #[error("decode error: {0}")]
    Decode(String),

    /// Ошибка локального хранилища сессии.
    #[error("storage error: {0}")]
    Storage(String),

    /// Ошибка websocket-соединения уведомлений.
    #[error("websocket error: {0}")]
    WebSocket(String),

    /// Нарушение протокола STOMP/SockJS или `ERROR`-кадр от брокера.
    #[error("stomp error: {0}")]
    Stomp(String),
}

/// Результат операций `sni-client`.
pub type SniClientResult<T> = Result<T, SniClientError>;

impl SniClientError {
    pub(crate) fn from_http_status(status: reqwest::StatusCode, message: Option<String>) -> Self {
        match status {
            reqwest::StatusCode::UNAUTHORIZED => Self::Unauthorized,
            reqwest::StatusCode::FORBIDDEN => {
                Self::Forbidden(message.unwrap_or_else(|| fallback_message(status)))
            }
            reqwest::StatusCode::NOT_FOUND => Self::NotFound,
            status if status.is_client_error() => {
                Self::InvalidRequest(message.unwrap_or_else(|| fallback_message(status)))
            }
            _ => Self::Api {
                status: status.as_u16(),
                message: message.unwrap_or_else(|| fallback_message(status)),
            },
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_http_status(status, None);
        }
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        Self::Http(err.to_string())
    }

    /// `true`, если ошибка означает истёкший или отсутствующий токен.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

impl From<reqwest::Error> for SniClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::from_reqwest(err)
    }
}

impl From<serde_json::Error> for SniClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<validator::ValidationErrors> for SniClientError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for SniClientError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(err.to_string())
    }
}

fn fallback_message(status: reqwest::StatusCode) -> String {
    match status.as_u16() {
        400 => "bad request".to_string(),
        403 => "forbidden".to_string(),
        409 => "conflict".to_string(),
        500..=599 => "server error".to_string(),
        code => format!("http status {code}"),
    }
}
