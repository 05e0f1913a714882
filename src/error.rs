use std::{error::Error, fmt::Debug};

#[derive(thiserror::Error)]
pub enum CustomError {
    #[error("ENV '{0}' Not Found")]
    EnvError(String, #[source] std::env::VarError),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Database")]
    DBError(#[from] sqlx::Error),

    #[error("Username already exists")]
    UsernameExists,

    #[error("Could not allocate a free account number")]
    AccountNumberExhausted,
}

impl Debug for CustomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        if let Some(source) = self.source() {
            write!(f, " (Caused by: {})", source)?;
        }
        Ok(())
    }
}

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// Translates a failed user insert, keeping duplicate user names apart from
/// every other store fault.
pub fn map_user_insert_error(err: sqlx::Error) -> CustomError {
    if is_unique_violation(&err) {
        CustomError::UsernameExists
    } else {
        CustomError::DBError(err)
    }
}
