//! Клиентская библиотека для бэкенда Snippethub (SNI).
//!
//! Предоставляет единый API (`SniClient`) поверх REST (`reqwest`):
//! посты, сниппеты, комментарии, значки и уровни, задачи и решения,
//! AI-оценка кода, уведомления и загрузка файлов.
//!
//! Сессия (`Session`) хранит access/refresh токены, зеркалит их в
//! `TokenStore` и один раз перевыпускает просроченный токен при загрузке
//! профиля. Уведомления в реальном времени приходят через
//! `NotificationClient` (STOMP поверх SockJS).
#![warn(missing_docs)]

mod api;
mod config;
mod envelope;
mod error;
mod http_client;
mod models;
mod realtime;
mod session;
mod storage;

use std::sync::Arc;

pub use api::comments::CommentTarget;
pub use api::oauth::{OAuthCallback, OAuthProvider, parse_oauth_callback};
pub use api::posts::{NewPost, PostQuery};
pub use api::problems::ProblemQuery;
pub use api::snippets::{NewSnippet, SnippetQuery};
pub use config::{ClientConfig, normalize_server};
pub use error::{SniClientError, SniClientResult};
pub use http_client::HttpClient;
pub use models::{
    AiEvaluation, Author, Badge, Comment, LevelInfo, LoginPayload, Notification, Page, Post,
    Problem, Rank, RawTokens, Snippet, Submission, SubmissionStatus, TokenPair, UploadedFile,
    User, Visibility,
};
pub use realtime::client::{ConnectOutcome, NotificationClient, NotificationHandler};
pub use realtime::stomp::StompFrame;
pub use session::{AuthApi, Session};
pub use storage::{FileTokenStore, MemoryTokenStore, StoredSession, TokenStore};

#[derive(Debug, Clone)]
/// Унифицированный клиент Snippethub: HTTP-транспорт плюс сессия.
pub struct SniClient {
    config: ClientConfig,
    http: HttpClient,
    session: Session,
}

impl SniClient {
    /// Создаёт клиент с заданными настройками и хранилищем сессии.
    pub fn new(config: ClientConfig, store: Arc<dyn TokenStore>) -> SniClientResult<Self> {
        let http = HttpClient::with_timeouts(
            config.api_url.clone(),
            config.connect_timeout,
            config.request_timeout,
        )?;
        let session = Session::new(Arc::new(http.clone()), store);

        Ok(Self {
            config,
            http,
            session,
        })
    }

    /// Клиент с сессией в файле из `config.session_file`.
    pub fn with_file_store(config: ClientConfig) -> SniClientResult<Self> {
        let store = Arc::new(FileTokenStore::new(config.session_file.clone()));
        Self::new(config, store)
    }

    /// Настройки клиента.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Контекст сессии.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Клиент уведомлений, использующий текущий access token.
    pub fn notifications(&self) -> NotificationClient {
        NotificationClient::new(self.config.ws_url.clone(), self.config.reconnect_delay)
            .with_token(self.session.access_token())
    }

    fn require_token(&self) -> SniClientResult<String> {
        self.session
            .access_token()
            .ok_or(SniClientError::Unauthorized)
    }
}
