use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No session in progress, start one first")]
    NotStarted,

    #[error("No remaining balance to wager")]
    EmptyBalance,
}

impl From<EngineError> for String {
    fn from(err: EngineError) -> Self {
        err.to_string()
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
