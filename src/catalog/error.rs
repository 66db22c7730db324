use thiserror::Error;

/// Errors from the catalog and account services.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("User with this email already exists.")]
    DuplicateEmail,

    #[error("Invalid credentials.")]
    InvalidCredentials,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("password hashing failed")]
    PasswordHash,
}
