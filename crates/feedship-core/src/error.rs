use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid revision: revision identifier is empty")]
    InvalidRevision,

    #[error("Missing required environment variable: {0}")]
    MissingVariable(&'static str),

    #[error("Invalid registry reference: {0:?}")]
    InvalidRegistry(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
