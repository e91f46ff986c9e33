//! Explicit session handling on top of an [`AuthProvider`].

use std::sync::Mutex;

use tracing::{info, warn};
use tracker_domain::{Session, User};

use crate::{
    auth::{AuthProvider, SignUpMetadata},
    CoreError,
};

/// Persists the "remember me" user between runs.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<User>, CoreError>;
    fn save(&self, user: &User) -> Result<(), CoreError>;
    fn clear(&self) -> Result<(), CoreError>;
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    user: Mutex<Option<User>>,
}

impl SessionStore for InMemorySessionStore {
    fn load(&self) -> Result<Option<User>, CoreError> {
        self.user
            .lock()
            .map(|user| user.clone())
            .map_err(|_| CoreError::Storage("session store lock poisoned".into()))
    }

    fn save(&self, user: &User) -> Result<(), CoreError> {
        let mut slot = self
            .user
            .lock()
            .map_err(|_| CoreError::Storage("session store lock poisoned".into()))?;
        *slot = Some(user.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        let mut slot = self
            .user
            .lock()
            .map_err(|_| CoreError::Storage("session store lock poisoned".into()))?;
        *slot = None;
        Ok(())
    }
}

pub struct SessionService;

impl SessionService {
    /// Authenticates and, when `remember` is set, persists the user.
    ///
    /// A failure to persist the session is logged and does not fail the sign-in.
    pub fn sign_in(
        provider: &dyn AuthProvider,
        store: &dyn SessionStore,
        email: &str,
        password: &str,
        remember: bool,
    ) -> Result<Session, CoreError> {
        let user = provider.sign_in(email, password, remember)?;
        if remember {
            if let Err(err) = store.save(&user) {
                warn!(error = %err, "failed to remember session");
            }
        }
        info!(user = %user.id, remember, "signed in");
        Ok(Session::for_user(user))
    }

    pub fn sign_up(
        provider: &dyn AuthProvider,
        email: &str,
        password: &str,
        metadata: SignUpMetadata,
    ) -> Result<User, CoreError> {
        Ok(provider.sign_up(email, password, metadata)?)
    }

    pub fn reset_password(provider: &dyn AuthProvider, email: &str) -> Result<(), CoreError> {
        Ok(provider.reset_password(email)?)
    }

    /// Returns the remembered session, or an anonymous one when nothing usable is stored.
    pub fn restore(store: &dyn SessionStore) -> Session {
        match store.load() {
            Ok(Some(user)) => Session::for_user(user),
            Ok(None) => Session::anonymous(),
            Err(err) => {
                warn!(error = %err, "failed to restore session");
                Session::anonymous()
            }
        }
    }

    pub fn sign_out(store: &dyn SessionStore) -> Session {
        if let Err(err) = store.clear() {
            warn!(error = %err, "failed to forget session");
        }
        Session::anonymous()
    }
}
