use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};

pub(crate) const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_SESSION_FILE: &str = ".sni_session.json";

#[derive(Debug, Clone)]
/// Настройки клиента.
pub struct ClientConfig {
    /// Базовый URL REST API, например `http://127.0.0.1:8080`.
    pub api_url: String,
    /// Базовый URL websocket-эндпоинта (`ws://.../ws`).
    pub ws_url: String,
    /// Файл, в котором хранится сессия.
    pub session_file: PathBuf,
    /// Таймаут установки соединения.
    pub connect_timeout: Duration,
    /// Таймаут всего запроса.
    pub request_timeout: Duration,
    /// Пауза перед переподключением к уведомлениям.
    pub reconnect_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::for_server(DEFAULT_API_URL)
    }
}

impl ClientConfig {
    /// Настройки по умолчанию для указанного сервера.
    pub fn for_server(api_url: impl Into<String>) -> Self {
        let api_url = normalize_server(api_url.into());
        let ws_url = derive_ws_url(&api_url);
        Self {
            api_url,
            ws_url,
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(15),
            reconnect_delay: Duration::from_millis(5000),
        }
    }

    /// Читает настройки из окружения (`SNI_*`).
    pub fn from_env() -> Result<Self> {
        let api_url = std::env::var("SNI_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let mut config = Self::for_server(api_url);

        if let Ok(ws_url) = std::env::var("SNI_WS_URL") {
            let ws_url = ws_url.trim().to_string();
            if ws_url.is_empty() {
                return Err(anyhow!("SNI_WS_URL must not be empty"));
            }
            config.ws_url = ws_url;
        }
        if let Ok(path) = std::env::var("SNI_SESSION_FILE") {
            config.session_file = PathBuf::from(path);
        }

        config.connect_timeout =
            Duration::from_secs(parse_u64_env("SNI_CONNECT_TIMEOUT_SECS", 5)?);
        config.request_timeout =
            Duration::from_secs(parse_u64_env("SNI_REQUEST_TIMEOUT_SECS", 15)?);
        config.reconnect_delay =
            Duration::from_millis(parse_u64_env("SNI_RECONNECT_DELAY_MS", 5000)?);

        Ok(config)
    }

    /// Подменяет адрес сервера.
    ///
    /// Websocket-адрес пересчитывается, только если он был выведен из
    /// прежнего адреса API; явно заданный `SNI_WS_URL` сохраняется.
    pub fn with_server(mut self, api_url: impl Into<String>) -> Self {
        let derived = self.ws_url == derive_ws_url(&self.api_url);
        self.api_url = normalize_server(api_url.into());
        if derived {
            self.ws_url = derive_ws_url(&self.api_url);
        }
        self
    }
}

/// Добавляет `http://`, если схема не указана.
pub fn normalize_server(server: String) -> String {
    let server = server.trim().to_string();
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn derive_ws_url(api_url: &str) -> String {
    let base = api_url.trim_end_matches('/');
    let base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base.to_string()
    };
    format!("{base}/ws")
}

fn parse_u64_env(key: &str, default: u64) -> Result<u64> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<u64>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_server_keeps_scheme() {
        let s = normalize_server("https://example.com:8080".to_string());
        assert_eq!(s, "https://example.com:8080");
    }

    #[test]
    fn normalize_server_adds_http_scheme() {
        let s = normalize_server("127.0.0.1:8080".to_string());
        assert_eq!(s, "http://127.0.0.1:8080");
    }

    #[test]
    fn ws_url_follows_api_scheme() {
        assert_eq!(
            ClientConfig::for_server("http://localhost:8080/").ws_url,
            "ws://localhost:8080/ws"
        );
        assert_eq!(
            ClientConfig::for_server("https://sni.example.com").ws_url,
            "wss://sni.example.com/ws"
        );
    }

    #[test]
    fn with_server_rederives_default_ws_url() {
        let config = ClientConfig::default().with_server("https://sni.example.com");
        assert_eq!(config.api_url, "https://sni.example.com");
        assert_eq!(config.ws_url, "wss://sni.example.com/ws");
    }

    #[test]
    fn with_server_keeps_explicit_ws_url() {
        let mut config = ClientConfig::default();
        config.ws_url = "ws://push.sni.example.com/stomp".to_string();

        let config = config.with_server("sni.example.com:8080");
        assert_eq!(config.api_url, "http://sni.example.com:8080");
        assert_eq!(config.ws_url, "ws://push.sni.example.com/stomp");
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.reconnect_delay, Duration::from_millis(5000));
        assert_eq!(config.session_file, PathBuf::from(".sni_session.json"));
    }
}
