use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{SniClientError, SniClientResult};
use crate::models::User;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Сохранённая сессия: то, что браузерная версия держала в `localStorage`.
pub struct StoredSession {
    /// Access token.
    pub access_token: String,
    /// Refresh token.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Последний известный профиль пользователя.
    #[serde(default)]
    pub user: Option<User>,
}

/// Постоянное хранилище учётных данных сессии.
pub trait TokenStore: Send + Sync {
    /// Загружает сессию; `Ok(None)`, если сохранённой сессии нет.
    fn load(&self) -> SniClientResult<Option<StoredSession>>;
    /// Перезаписывает сохранённую сессию.
    fn save(&self, session: &StoredSession) -> SniClientResult<()>;
    /// Удаляет все сохранённые учётные данные.
    fn clear(&self) -> SniClientResult<()>;
}

fn parse_session(raw: &str) -> Option<StoredSession> {
    if raw.trim().is_empty() {
        return None;
    }
    let session = serde_json::from_str::<StoredSession>(raw).ok()?;
    if session.access_token.trim().is_empty() {
        return None;
    }
    Some(session)
}

#[derive(Debug, Clone)]
/// Хранилище сессии в JSON-файле.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Хранилище по указанному пути; файл создаётся при первом `save`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Путь к файлу сессии.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> SniClientResult<Option<StoredSession>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(SniClientError::Storage(format!(
                    "failed to read {}: {err}",
                    self.path.display()
                )));
            }
        };

        let session = parse_session(&raw);
        if session.is_none() && !raw.trim().is_empty() {
            warn!(path = %self.path.display(), "ignoring unreadable session file");
        }
        Ok(session)
    }

    fn save(&self, session: &StoredSession) -> SniClientResult<()> {
        let raw = serde_json::to_string_pretty(session)
            .map_err(|err| SniClientError::Storage(format!("failed to serialize session: {err}")))?;
        fs::write(&self.path, raw).map_err(|err| {
            SniClientError::Storage(format!("failed to write {}: {err}", self.path.display()))
        })
    }

    fn clear(&self) -> SniClientResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(SniClientError::Storage(format!(
                "failed to remove {}: {err}",
                self.path.display()
            ))),
        }
    }
}

#[derive(Debug, Default)]
/// Хранилище сессии в памяти процесса.
pub struct MemoryTokenStore {
    session: Mutex<Option<StoredSession>>,
}

impl MemoryTokenStore {
    /// Пустое хранилище.
    pub fn new() -> Self {
        Self::default()
    }

    /// Хранилище с заранее сохранённой сессией.
    pub fn with_session(session: StoredSession) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }

    /// Текущее содержимое.
    pub fn snapshot(&self) -> Option<StoredSession> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> SniClientResult<Option<StoredSession>> {
        Ok(self.snapshot())
    }

    fn save(&self, session: &StoredSession) -> SniClientResult<()> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> SniClientResult<()> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock must be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("sni_{name}_{nanos}.json"))
    }

    fn session() -> StoredSession {
        StoredSession {
            access_token: "access".to_string(),
            refresh_token: Some("refresh".to_string()),
            user: None,
        }
    }

    #[test]
    fn parse_session_rejects_blank_and_invalid_input() {
        assert!(parse_session("   ").is_none());
        assert!(parse_session("{not-json}").is_none());
        assert!(parse_session(r#"{"accessToken":"  "}"#).is_none());
    }

    #[test]
    fn file_store_round_trips_and_uses_camel_case_keys() {
        let path = temp_path("roundtrip");
        let store = FileTokenStore::new(&path);

        store.save(&session()).expect("save must succeed");
        let raw = fs::read_to_string(&path).expect("file must exist");
        assert!(raw.contains("\"accessToken\""));
        assert!(raw.contains("\"refreshToken\""));
        assert!(raw.contains("\"user\""));

        let loaded = store.load().expect("load must succeed");
        assert_eq!(loaded, Some(session()));

        store.clear().expect("clear must succeed");
        assert!(store.load().expect("load must succeed").is_none());
    }

    #[test]
    fn file_store_missing_file_is_empty_and_clear_is_idempotent() {
        let store = FileTokenStore::new(temp_path("missing"));
        assert!(store.load().expect("load must succeed").is_none());
        store.clear().expect("clear must succeed");
    }

    #[test]
    fn memory_store_keeps_last_saved_session() {
        let store = MemoryTokenStore::new();
        store.save(&session()).expect("save must succeed");
        assert_eq!(store.snapshot(), Some(session()));
        store.clear().expect("clear must succeed");
        assert!(store.snapshot().is_none());
    }
}
