use thiserror::Error;

/// Unified error type for record store operations.
///
/// The store has no recoverable failure modes the workflows act on: existence
/// and currency checks happen over `find_history` results, not constraint
/// violations, so anything surfacing here is infrastructure trouble.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Other(anyhow::Error::from(err))
    }
}

/// Type alias for store operation results
pub type Result<T> = std::result::Result<T, StoreError>;
