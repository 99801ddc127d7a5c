//! File-backed session store.
//!
//! The durable client-side cache: one `state.json` in the data directory
//! holding the last resolved session id and the bearer credential. This is
//! what lets a repeat visit resume its session instead of creating a new
//! one. Missing files mean "nothing cached"; a malformed file is an error
//! the callers tolerate.

use std::path::PathBuf;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use sagely_core::session::SessionStore;
use sagely_types::error::StoreError;
use sagely_types::session::SessionId;

const STATE_FILE: &str = "state.json";

/// On-disk shape of the cache.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    auth_token: Option<String>,
}

/// [`SessionStore`] persisting to `{data_dir}/state.json`.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: data_dir.into().join(STATE_FILE),
        }
    }

    /// The platform default data directory (`~/.local/share/sagely` on
    /// Linux), when the platform reports one.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("sagely"))
    }

    /// Persist a bearer credential alongside whatever is already cached.
    pub async fn store_token(&self, token: &str) -> Result<(), StoreError> {
        let mut state = self.read_or_default().await;
        state.auth_token = Some(token.to_string());
        self.write(&state).await
    }

    /// Forget the cached session id (the next resolution starts a fresh
    /// session). The credential stays.
    pub async fn clear_session(&self) -> Result<(), StoreError> {
        let mut state = self.read_or_default().await;
        state.session_id = None;
        self.write(&state).await
    }

    async fn read(&self) -> Result<StateFile, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => serde_json::from_str(&content)
                .map_err(|err| StoreError::Malformed(err.to_string())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(StateFile::default()),
            Err(err) => Err(StoreError::Io(err.to_string())),
        }
    }

    /// Read for a read-modify-write; an unreadable file starts fresh.
    async fn read_or_default(&self) -> StateFile {
        match self.read().await {
            Ok(state) => state,
            Err(err) => {
                tracing::warn!(error = %err, path = %self.path.display(), "resetting unreadable state file");
                StateFile::default()
            }
        }
    }

    async fn write(&self, state: &StateFile) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| StoreError::Io(err.to_string()))?;
        }
        let content = serde_json::to_string_pretty(state)
            .map_err(|err| StoreError::Malformed(err.to_string()))?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|err| StoreError::Io(err.to_string()))
    }
}

impl SessionStore for FileSessionStore {
    async fn load_session(&self) -> Result<Option<SessionId>, StoreError> {
        let state = self.read().await?;
        Ok(state
            .session_id
            .filter(|id| !id.is_empty())
            .map(SessionId::from))
    }

    async fn save_session(&self, id: &SessionId) -> Result<(), StoreError> {
        let mut state = self.read_or_default().await;
        state.session_id = Some(id.as_str().to_string());
        self.write(&state).await
    }

    async fn auth_token(&self) -> Result<Option<SecretString>, StoreError> {
        let state = self.read().await?;
        Ok(state
            .auth_token
            .filter(|token| !token.is_empty())
            .map(SecretString::from))
    }
}

impl std::fmt::Debug for FileSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSessionStore")
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_means_nothing_cached() {
        let tmp = TempDir::new().unwrap();
        let store = FileSessionStore::new(tmp.path());

        assert!(store.load_session().await.unwrap().is_none());
        assert!(store.auth_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn session_id_round_trips() {
        let tmp = TempDir::new().unwrap();
        let store = FileSessionStore::new(tmp.path());

        store.save_session(&SessionId::new("s-42")).await.unwrap();
        let loaded = store.load_session().await.unwrap();
        assert_eq!(loaded, Some(SessionId::new("s-42")));
    }

    #[tokio::test]
    async fn saving_a_session_preserves_the_token() {
        let tmp = TempDir::new().unwrap();
        let store = FileSessionStore::new(tmp.path());

        store.store_token("bearer-xyz").await.unwrap();
        store.save_session(&SessionId::new("s-1")).await.unwrap();

        let token = store.auth_token().await.unwrap().unwrap();
        assert_eq!(token.expose_secret(), "bearer-xyz");
    }

    #[tokio::test]
    async fn malformed_file_is_a_load_error_but_save_recovers() {
        let tmp = TempDir::new().unwrap();
        let store = FileSessionStore::new(tmp.path());
        tokio::fs::write(tmp.path().join(STATE_FILE), "{ not json")
            .await
            .unwrap();

        assert!(matches!(
            store.load_session().await,
            Err(StoreError::Malformed(_))
        ));

        store.save_session(&SessionId::new("s-fresh")).await.unwrap();
        assert_eq!(
            store.load_session().await.unwrap(),
            Some(SessionId::new("s-fresh"))
        );
    }

    #[tokio::test]
    async fn empty_strings_count_as_absent() {
        let tmp = TempDir::new().unwrap();
        let store = FileSessionStore::new(tmp.path());
        tokio::fs::write(
            tmp.path().join(STATE_FILE),
            r#"{"session_id": "", "auth_token": ""}"#,
        )
        .await
        .unwrap();

        assert!(store.load_session().await.unwrap().is_none());
        assert!(store.auth_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clearing_the_session_keeps_the_token() {
        let tmp = TempDir::new().unwrap();
        let store = FileSessionStore::new(tmp.path());
        store.store_token("bearer-xyz").await.unwrap();
        store.save_session(&SessionId::new("s-1")).await.unwrap();

        store.clear_session().await.unwrap();

        assert!(store.load_session().await.unwrap().is_none());
        assert!(store.auth_token().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn creates_the_data_directory_on_first_write() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("deep").join("nested");
        let store = FileSessionStore::new(&nested);

        store.save_session(&SessionId::new("s-1")).await.unwrap();
        assert!(nested.join(STATE_FILE).exists());
    }
}
