use thiserror::Error;

/// Failures surfaced by [`UserStore`](super::UserStore).
///
/// A duplicate username is not an error; it comes back as
/// [`AddOutcome::RejectedDuplicate`](super::AddOutcome::RejectedDuplicate).
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
