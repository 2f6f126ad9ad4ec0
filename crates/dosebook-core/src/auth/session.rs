use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::models::User;
use crate::store::KeyValueStore;

/// Storage key holding the raw token
pub const TOKEN_KEY: &str = "auth_token";

/// Storage key holding the JSON-serialized user
pub const USER_KEY: &str = "auth_user";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<User>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }
}

/// Shared session state with write-through persistence.
///
/// Clone is cheap; every clone sees the same session. Built once at startup
/// and handed to the API client and the auth store.
#[derive(Clone)]
pub struct SessionState {
    inner: Arc<RwLock<Session>>,
    storage: Arc<dyn KeyValueStore>,
}

impl SessionState {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Session::default())),
            storage,
        }
    }

    /// Restore the session from storage, returning whether it is authenticated.
    ///
    /// Replaces the in-memory session with whatever is persisted. An
    /// unreadable store or a corrupt user record leaves the session empty.
    pub fn init(&self) -> bool {
        let restored = match self.load_persisted() {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Could not restore session, starting signed out");
                Session::default()
            }
        };

        let authenticated = restored.is_authenticated();
        debug!(
            has_token = restored.token.is_some(),
            has_user = restored.user.is_some(),
            "Session restored"
        );
        *self.write() = restored;
        authenticated
    }

    fn load_persisted(&self) -> Result<Session> {
        let token = self.storage.get(TOKEN_KEY).context("Failed to read token")?;
        let user = match self.storage.get(USER_KEY).context("Failed to read user")? {
            Some(json) => {
                Some(serde_json::from_str(&json).context("Failed to parse persisted user")?)
            }
            None => None,
        };
        Ok(Session { token, user })
    }

    /// Copy of the current session
    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    /// Replace the user, leaving the token alone
    pub fn set_user(&self, user: User) -> Result<()> {
        let json = serde_json::to_string(&user)?;
        self.storage
            .set(USER_KEY, &json)
            .context("Failed to persist user")?;
        self.write().user = Some(user);
        Ok(())
    }

    /// Store a freshly issued token and user, both or neither.
    ///
    /// Memory is only touched once both keys are persisted. If the user write
    /// fails, the token key is put back the way it was.
    pub(crate) fn commit(&self, token: String, user: User) -> Result<()> {
        let json = serde_json::to_string(&user)?;
        let previous_token = self.storage.get(TOKEN_KEY).ok().flatten();

        self.storage
            .set(TOKEN_KEY, &token)
            .context("Failed to persist token")?;

        if let Err(e) = self.storage.set(USER_KEY, &json) {
            let rollback = match previous_token {
                Some(ref previous) => self.storage.set(TOKEN_KEY, previous),
                None => self.storage.remove(TOKEN_KEY),
            };
            if let Err(rollback_err) = rollback {
                warn!(error = %rollback_err, "Failed to roll back persisted token");
            }
            return Err(e.context("Failed to persist user"));
        }

        let mut session = self.write();
        session.token = Some(token);
        session.user = Some(user);
        Ok(())
    }

    /// Clear the session locally, no server round trip.
    ///
    /// Memory is cleared first and always; the error only reports keys that
    /// could not be removed from storage.
    pub fn force_logout(&self) -> Result<()> {
        {
            let mut session = self.write();
            session.token = None;
            session.user = None;
        }
        debug!("Session cleared");

        let token_result = self.storage.remove(TOKEN_KEY);
        let user_result = self.storage.remove(USER_KEY);
        token_result.context("Failed to remove persisted token")?;
        user_result.context("Failed to remove persisted user")?;
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.read();
        f.debug_struct("SessionState")
            .field("has_token", &session.token.is_some())
            .field("user", &session.user.as_ref().map(|u| u.id))
            .finish()
    }
}
