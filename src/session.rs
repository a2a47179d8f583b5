// src/session.rs
use crate::config::DatabaseConfig;
use std::any::Any;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid login or password for `{user}`")]
    Rejected {
        user: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Credential-backed database session. The handle is opaque; dropping the session closes it.
pub struct Session {
    user: String,
    _handle: Box<dyn Any + Send>,
}

impl Session {
    pub fn new(user: impl Into<String>, handle: Box<dyn Any + Send>) -> Self {
        Self {
            user: user.into(),
            _handle: handle,
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("user", &self.user).finish_non_exhaustive()
    }
}

pub trait Authenticator: Send {
    fn connect(&self, username: &str, password: &str) -> Result<Session, AuthError>;
}

/// Opens a PostgreSQL connection to the configured database with user-supplied credentials.
pub struct PostgresAuthenticator {
    config: DatabaseConfig,
}

impl PostgresAuthenticator {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    fn pg_config(&self, username: &str, password: &str) -> postgres::Config {
        let mut pg = postgres::Config::new();
        pg.host(&self.config.host)
            .port(self.config.port)
            .dbname(&self.config.dbname)
            .user(username)
            .password(password)
            .connect_timeout(self.config.connect_timeout());
        pg
    }
}

impl Authenticator for PostgresAuthenticator {
    fn connect(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        log::info!(
            "connecting to {}@{}:{}/{}",
            username,
            self.config.host,
            self.config.port,
            self.config.dbname
        );
        let client = self
            .pg_config(username, password)
            .connect(postgres::NoTls)
            .map_err(|e| AuthError::Rejected {
                user: username.to_owned(),
                source: Box::new(e),
            })?;
        Ok(Session::new(username, Box::new(client)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pg_config_carries_credentials_and_dbname() {
        let auth = PostgresAuthenticator::new(DatabaseConfig::default());
        let pg = auth.pg_config("operator", "secret");
        assert_eq!(pg.get_user(), Some("operator"));
        assert_eq!(pg.get_password(), Some(&b"secret"[..]));
        assert_eq!(pg.get_dbname(), Some("bearing_db"));
        assert_eq!(pg.get_ports(), &[5432]);
    }

    #[test]
    fn test_session_debug_hides_handle() {
        let session = Session::new("operator", Box::new(42u8));
        assert_eq!(session.user(), "operator");
        let dbg = format!("{session:?}");
        assert!(dbg.contains("operator"));
        assert!(!dbg.contains("42"));
    }
}
