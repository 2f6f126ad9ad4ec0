//! Application startup: build the shared session, restore it from storage
//! exactly once, and hand out the client and auth store built on it.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::api::ApiClient;
use crate::auth::{AuthStore, SessionState};
use crate::config::{Config, StorageBackend};
use crate::router::Navigator;
use crate::store::{FileStore, KeyValueStore, KeyringStore};

pub struct App {
    api: ApiClient,
    auth: AuthStore,
}

impl App {
    /// Wire the core together.
    ///
    /// The session is restored before the client exists, so no request can
    /// go out ahead of `init`.
    pub fn bootstrap(
        base_url: impl Into<String>,
        storage: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let session = SessionState::new(storage);
        let restored = session.init();
        info!(authenticated = restored, "Session initialized");

        let api = ApiClient::new(base_url, session, navigator)
            .context("Failed to create API client")?;
        let auth = AuthStore::new(api.clone());

        Ok(Self { api, auth })
    }

    /// Bootstrap from configuration, picking the configured storage backend
    pub fn from_config(
        config: &Config,
        override_origin: Option<&str>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let storage = storage_for(config)?;
        Self::bootstrap(config.resolve_api_base_url(override_origin), storage, navigator)
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    pub fn session(&self) -> &SessionState {
        self.auth.session()
    }
}

/// Storage for the configured backend
pub fn storage_for(config: &Config) -> Result<Arc<dyn KeyValueStore>> {
    Ok(match config.storage {
        StorageBackend::File => Arc::new(FileStore::default_location()?),
        StorageBackend::Keyring => Arc::new(KeyringStore::new()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{TOKEN_KEY, USER_KEY};
    use crate::router::HistoryRouter;
    use crate::store::MemoryStore;

    #[test]
    fn test_bootstrap_restores_persisted_session() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(TOKEN_KEY, "T1").unwrap();
        storage.set(USER_KEY, r#"{"id":1,"username":"a"}"#).unwrap();

        let app = App::bootstrap(
            "http://127.0.0.1:8000/api",
            storage,
            Arc::new(HistoryRouter::new()),
        )
        .unwrap();

        assert!(app.session().is_authenticated());
        assert_eq!(app.api().base_url(), "http://127.0.0.1:8000/api");
        // Client and auth store share one session
        app.auth().force_logout().unwrap();
        assert!(!app.api().session().is_authenticated());
    }

    #[test]
    fn test_bootstrap_with_empty_storage() {
        let app = App::bootstrap(
            "http://127.0.0.1:8000/api",
            Arc::new(MemoryStore::new()),
            Arc::new(HistoryRouter::new()),
        )
        .unwrap();
        assert!(!app.auth().is_authenticated());
        assert!(app.auth().user().is_none());
    }
}
