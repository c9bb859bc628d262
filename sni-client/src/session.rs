//! Контекст сессии: токены, кэш профиля и их зеркало в [`TokenStore`].
//!
//! Загрузка профиля при 401 один раз перевыпускает access token и повторяет
//! запрос. Параллельные вызовы [`Session::fetch_user`] разделяют одну
//! загрузку: второй вызывающий ждёт тот же результат, не отправляя
//! повторный запрос. Любая ошибка загрузки профиля завершает сессию.
//! Вход и выход начинают новую эпоху: загрузка, начатая до них, не
//! меняет состояние и завершается ошибкой `Unauthorized`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tracing::{debug, info, warn};

use crate::error::{SniClientError, SniClientResult};
use crate::models::{Badge, LoginPayload, TokenPair, User};
use crate::storage::{StoredSession, TokenStore};

/// Эндпоинты, которые нужны сессии.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `GET /api/users/me`.
    async fn fetch_profile(&self, access_token: &str) -> SniClientResult<User>;
    /// `POST /api/auth/reissue`.
    async fn reissue(&self, refresh_token: &str) -> SniClientResult<TokenPair>;
    /// Представительский значок пользователя, если он выбран.
    async fn representative_badge(
        &self,
        access_token: &str,
        user_id: i64,
    ) -> SniClientResult<Option<Badge>>;
}

type ProfileLoad = Shared<BoxFuture<'static, SniClientResult<User>>>;

#[derive(Debug, Default)]
struct SessionState {
    access_token: Option<String>,
    refresh_token: Option<String>,
    user: Option<User>,
}

struct SessionInner {
    api: Arc<dyn AuthApi>,
    store: Arc<dyn TokenStore>,
    state: RwLock<SessionState>,
    in_flight: Mutex<Option<(u64, ProfileLoad)>>,
    generation: AtomicU64,
    // меняется при каждом входе и выходе; загрузки, начатые в прошлой
    // эпохе, не пишут в состояние
    epoch: AtomicU64,
}

#[derive(Clone)]
/// Текущая сессия пользователя. Клоны разделяют одно состояние.
pub struct Session {
    inner: Arc<SessionInner>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Создаёт неавторизованную сессию поверх API и хранилища.
    pub fn new(api: Arc<dyn AuthApi>, store: Arc<dyn TokenStore>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                api,
                store,
                state: RwLock::new(SessionState::default()),
                in_flight: Mutex::new(None),
                generation: AtomicU64::new(0),
                epoch: AtomicU64::new(0),
            }),
        }
    }

    /// Поднимает сохранённую сессию и перепроверяет её загрузкой профиля.
    ///
    /// `Ok(None)`, если в хранилище ничего нет.
    pub async fn restore(&self) -> SniClientResult<Option<User>> {
        let Some(stored) = self.inner.store.load()? else {
            return Ok(None);
        };

        let token = stored.access_token.clone();
        {
            let mut state = self.inner.write_state();
            self.inner.begin_epoch();
            state.access_token = Some(stored.access_token);
            state.refresh_token = stored.refresh_token;
            state.user = stored.user;
        }
        debug!("restored stored session");

        self.fetch_user(&token).await.map(Some)
    }

    /// Принимает ответ на вход: сохраняет токены и снимок пользователя,
    /// затем загружает профиль.
    ///
    /// Payload без `token.accessToken` отклоняется до любых изменений
    /// состояния.
    pub async fn login(&self, payload: LoginPayload) -> SniClientResult<User> {
        let LoginPayload { token, user } = payload;
        let token = token.unwrap_or_default();
        let access_token = token
            .access_token
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                SniClientError::InvalidRequest(
                    "login payload is missing token.accessToken".to_string(),
                )
            })?;
        let refresh_token = token
            .refresh_token
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());

        self.inner.store.save(&StoredSession {
            access_token: access_token.clone(),
            refresh_token: refresh_token.clone(),
            user: user.clone(),
        })?;
        {
            let mut state = self.inner.write_state();
            self.inner.begin_epoch();
            state.access_token = Some(access_token.clone());
            state.refresh_token = refresh_token;
            state.user = user;
        }
        info!("logged in");

        self.fetch_user(&access_token).await
    }

    /// Сбрасывает сессию и удаляет сохранённые учётные данные.
    pub fn logout(&self) {
        self.inner.clear();
    }

    /// Заголовок `Authorization` для исходящих запросов; пустой без токена.
    pub fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let Some(token) = self.access_token() else {
            return headers;
        };
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(value) => {
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => warn!("access token is not a valid header value"),
        }
        headers
    }

    /// Текущий access token.
    pub fn access_token(&self) -> Option<String> {
        self.inner.read_state().access_token.clone()
    }

    /// Текущий refresh token.
    pub fn refresh_token(&self) -> Option<String> {
        self.inner.read_state().refresh_token.clone()
    }

    /// Закэшированный профиль.
    pub fn current_user(&self) -> Option<User> {
        self.inner.read_state().user.clone()
    }

    /// Есть ли access token.
    pub fn is_authenticated(&self) -> bool {
        self.inner.read_state().access_token.is_some()
    }

    /// Загружает профиль по токену.
    ///
    /// Если загрузка уже идёт, вызывающий присоединяется к ней.
    pub async fn fetch_user(&self, token: &str) -> SniClientResult<User> {
        let load = {
            let mut slot = self
                .inner
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            match slot.as_ref() {
                Some((_, load)) => {
                    debug!("joining in-flight profile load");
                    load.clone()
                }
                None => {
                    let generation = self.inner.generation.fetch_add(1, Ordering::Relaxed);
                    let epoch = self.inner.epoch();
                    let inner = Arc::clone(&self.inner);
                    let token = token.to_string();
                    let load = async move {
                        let result = Arc::clone(&inner).load_profile(token, epoch).await;
                        inner.finish_load(generation);
                        result
                    }
                    .boxed()
                    .shared();
                    *slot = Some((generation, load.clone()));
                    load
                }
            }
        };

        load.await
    }

    /// Подменяет закэшированный профиль, сохраняя уже известный
    /// представительский значок, если в новом его нет.
    pub(crate) fn replace_user(&self, mut user: User) -> User {
        {
            let mut state = self.inner.write_state();
            if user.representative_badge.is_none() {
                user.representative_badge = state
                    .user
                    .as_ref()
                    .and_then(|current| current.representative_badge.clone());
            }
            state.user = Some(user.clone());
        }
        self.inner.persist();
        user
    }

    /// Перевыпускает пару токенов по refresh token.
    ///
    /// При неудаче сессия завершается, ошибка возвращается вызывающему.
    pub async fn reissue_token(&self) -> SniClientResult<TokenPair> {
        self.inner.reissue(self.inner.epoch()).await
    }
}

impl SessionInner {
    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Начинает новую эпоху и забывает незавершённую загрузку профиля.
    /// Вызывается под write-блокировкой состояния.
    fn begin_epoch(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        *self.in_flight.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn clear(&self) {
        {
            let mut state = self.write_state();
            *state = SessionState::default();
            self.begin_epoch();
        }
        self.clear_store();
    }

    /// Как [`Self::clear`], но только если сессия не сменилась с `epoch`.
    fn clear_if_current(&self, epoch: u64) {
        {
            let mut state = self.write_state();
            if self.epoch() != epoch {
                debug!("session already replaced, keeping it");
                return;
            }
            *state = SessionState::default();
            self.begin_epoch();
        }
        self.clear_store();
    }

    fn clear_store(&self) {
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "failed to clear stored session");
        }
        info!("logged out");
    }

    fn finish_load(&self, generation: u64) {
        let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|(current, _)| *current == generation) {
            *slot = None;
        }
    }

    fn persist(&self) {
        let stored = {
            let state = self.read_state();
            let Some(access_token) = state.access_token.clone() else {
                return;
            };
            StoredSession {
                access_token,
                refresh_token: state.refresh_token.clone(),
                user: state.user.clone(),
            }
        };
        if let Err(err) = self.store.save(&stored) {
            warn!(error = %err, "failed to persist session");
        }
    }

    async fn load_profile(self: Arc<Self>, token: String, epoch: u64) -> SniClientResult<User> {
        match self.fetch_with_reissue(&token, epoch).await {
            Ok(user) => {
                let user = self.merge_representative_badge(user).await;
                {
                    let mut state = self.write_state();
                    if self.epoch() != epoch {
                        debug!("session changed during profile load, discarding result");
                        return Err(SniClientError::Unauthorized);
                    }
                    state.user = Some(user.clone());
                }
                self.persist();
                debug!(user_id = user.id, "profile loaded");
                Ok(user)
            }
            Err(err) => {
                warn!(error = %err, "profile load failed, logging out");
                self.clear_if_current(epoch);
                Err(err)
            }
        }
    }

    async fn fetch_with_reissue(&self, token: &str, epoch: u64) -> SniClientResult<User> {
        match self.api.fetch_profile(token).await {
            Err(SniClientError::Unauthorized) => {
                info!("access token rejected, reissuing");
                let tokens = self.reissue(epoch).await?;
                self.api.fetch_profile(&tokens.access_token).await
            }
            other => other,
        }
    }

    async fn merge_representative_badge(&self, mut user: User) -> User {
        let Some(token) = self.read_state().access_token.clone() else {
            return user;
        };
        match self.api.representative_badge(&token, user.id).await {
            Ok(Some(badge)) => user.representative_badge = Some(badge),
            Ok(None) => {}
            Err(err) => warn!(error = %err, "failed to load representative badge"),
        }
        user
    }

    async fn reissue(&self, epoch: u64) -> SniClientResult<TokenPair> {
        let refresh_token = {
            let state = self.read_state();
            if self.epoch() != epoch {
                return Err(SniClientError::Unauthorized);
            }
            state.refresh_token.clone()
        };
        let Some(refresh_token) = refresh_token else {
            warn!("no refresh token, logging out");
            self.clear_if_current(epoch);
            return Err(SniClientError::Unauthorized);
        };

        match self.api.reissue(&refresh_token).await {
            Ok(tokens) => {
                {
                    let mut state = self.write_state();
                    if self.epoch() != epoch {
                        debug!("session changed during reissue, discarding tokens");
                        return Err(SniClientError::Unauthorized);
                    }
                    state.access_token = Some(tokens.access_token.clone());
                    state.refresh_token = Some(tokens.refresh_token.clone());
                }
                self.persist();
                info!("access token reissued");
                Ok(tokens)
            }
            Err(err) => {
                warn!(error = %err, "token reissue failed, logging out");
                self.clear_if_current(epoch);
                Err(err)
            }
        }
    }
}
