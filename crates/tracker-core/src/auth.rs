//! Authentication provider contract and the local stub provider.

use thiserror::Error;
use tracker_domain::User;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid email address")]
    InvalidEmail,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("{0} is not available")]
    NotImplemented(String),
}

/// Extra profile data captured at sign-up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpMetadata {
    pub display_name: Option<String>,
}

/// External identity capability. The ledger never depends on it directly.
pub trait AuthProvider: Send + Sync {
    fn sign_in(&self, email: &str, password: &str, remember: bool) -> Result<User, AuthError>;

    fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: SignUpMetadata,
    ) -> Result<User, AuthError>;

    fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        let _ = email;
        Err(AuthError::NotImplemented("password reset".into()))
    }
}

/// Offline provider accepting any well-formed email with a fixed password.
#[derive(Debug, Clone)]
pub struct StubAuthProvider {
    accepted_password: String,
}

impl StubAuthProvider {
    pub const DEFAULT_PASSWORD: &'static str = "1234";

    pub fn new(accepted_password: impl Into<String>) -> Self {
        Self {
            accepted_password: accepted_password.into(),
        }
    }
}

impl Default for StubAuthProvider {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PASSWORD)
    }
}

fn check_email(email: &str) -> Result<&str, AuthError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AuthError::InvalidEmail);
    }
    Ok(email)
}

impl AuthProvider for StubAuthProvider {
    fn sign_in(&self, email: &str, password: &str, _remember: bool) -> Result<User, AuthError> {
        let email = check_email(email)?;
        if password != self.accepted_password {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(User::new("local-1", Some(email.to_string())))
    }

    fn sign_up(
        &self,
        email: &str,
        _password: &str,
        metadata: SignUpMetadata,
    ) -> Result<User, AuthError> {
        let email = check_email(email)?;
        let mut user = User::new("local-signup-1", Some(email.to_string()));
        user.display_name = metadata.display_name;
        Ok(user)
    }

    fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        check_email(email).map(|_| ())
    }
}
