
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SleuthError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Engine error: {0}")]
    Engine(String),
    #[error("Builder error: {0}")]
    Builder(String),
    #[error("Internal invariant violated: {0}")]
    Invariant(String),
    #[error("Lock poisoned: {0}")]
    Lock(String),
}

pub type Result<T> = std::result::Result<T, SleuthError>;

// Helper conversions
impl From<rusqlite::Error> for SleuthError {
    fn from(e: rusqlite::Error) -> Self { Self::Engine(e.to_string()) }
}
