use thiserror::Error;

/// Every fallible operation in the engine reports one of these. The payload is a
/// human readable message naming the entity id and field involved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("null pointer: {0}")]
    NullPtr(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("resource not found: {0}")]
    ResourceNotFound(String),
    #[error("unexpected value: {0}")]
    UnexpectedValue(String),
    #[error("divide by zero: {0}")]
    DivideByZero(String),
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("write failure: {0}")]
    WriteFailure(String),
}

impl Error {
    pub fn message(&self) -> &str {
        match self {
            Error::NullPtr(m)
            | Error::InvalidConfiguration(m)
            | Error::ResourceNotFound(m)
            | Error::UnexpectedValue(m)
            | Error::DivideByZero(m)
            | Error::InvalidPath(m)
            | Error::WriteFailure(m) => m,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
