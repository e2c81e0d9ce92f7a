use filter_engine::DelegateError;
use filter_model::OperatorTag;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Invalid function arguments for {function}: {message}")]
    InvalidFunctionArgs { function: String, message: String },

    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("Record must be a JSON object, got {0}")]
    InvalidRecord(String),
}

pub type Result<T> = std::result::Result<T, EvalError>;

impl EvalError {
    pub(crate) fn into_delegate_error(self, tag: OperatorTag, delegate: &str) -> DelegateError {
        DelegateError::Failed {
            tag,
            delegate: delegate.to_string(),
            message: self.to_string(),
        }
    }
}
