//! Sign-in, registration and the stored session.
//!
//! The remote authentication service sits behind [`Authenticator`]; this
//! module validates what the user typed, persists the returned [`Session`]
//! and builds the bearer header for later requests.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{Database, DbError};
use crate::models::Session;

/// Authentication errors.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("Authentication failed: {0}")]
    Rejected(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Login form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn validate(&self) -> AuthResult<()> {
        require("Username", &self.username)?;
        require("Password", &self.password)
    }
}

/// Sign-up form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

impl Registration {
    pub fn validate(&self) -> AuthResult<()> {
        require("Username", &self.username)?;
        require("Email", &self.email)?;
        require("Password", &self.password)?;
        if !self.email.contains('@') {
            return Err(AuthError::Invalid(format!(
                "Email address looks invalid: {}",
                self.email.trim()
            )));
        }
        Ok(())
    }
}

fn require(field: &str, value: &str) -> AuthResult<()> {
    if value.trim().is_empty() {
        return Err(AuthError::Invalid(format!("{} is required", field)));
    }
    Ok(())
}

/// The remote authentication service.
pub trait Authenticator {
    fn login(&self, credentials: &Credentials) -> AuthResult<Session>;

    fn register(&self, registration: &Registration) -> AuthResult<Session>;
}

/// Session persistence on top of the database.
pub struct SessionStore<'a> {
    db: &'a Database,
}

impl<'a> SessionStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Validate, log in and persist the returned session.
    pub fn sign_in(
        &self,
        authenticator: &dyn Authenticator,
        credentials: &Credentials,
    ) -> AuthResult<Session> {
        credentials.validate()?;
        let session = authenticator.login(credentials).map_err(|e| {
            warn!("Login failed for {}: {}", credentials.username.trim(), e);
            e
        })?;
        self.store(&session)?;
        Ok(session)
    }

    /// Validate, register and persist the returned session.
    pub fn register(
        &self,
        authenticator: &dyn Authenticator,
        registration: &Registration,
    ) -> AuthResult<Session> {
        registration.validate()?;
        let session = authenticator.register(registration)?;
        self.store(&session)?;
        Ok(session)
    }

    /// Persist a session obtained elsewhere.
    pub fn store(&self, session: &Session) -> AuthResult<()> {
        self.db.save_session(session)?;
        info!("Signed in as {}", session.username);
        Ok(())
    }

    pub fn current(&self) -> AuthResult<Option<Session>> {
        Ok(self.db.get_session()?)
    }

    /// Forget the stored session. Signing out twice is not an error.
    pub fn sign_out(&self) -> AuthResult<()> {
        if self.db.clear_session()? {
            info!("Signed out");
        }
        Ok(())
    }

    /// `Bearer <token>` for the stored session.
    pub fn authorization_header(&self) -> AuthResult<String> {
        let session = self.current()?.ok_or(AuthError::NotSignedIn)?;
        Ok(format!("Bearer {}", session.token))
    }
}
