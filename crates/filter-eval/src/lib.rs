//! In-memory evaluation of filters against records.

pub mod error;
pub mod evaluator;
pub mod functions;
pub mod like;
pub mod record;

pub use error::{EvalError, Result};
pub use evaluator::{EvalDelegate, RecordEvaluator, evaluate};
pub use functions::FunctionRegistry;
pub use record::{Record, json_to_value};
