use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    #[error("Unknown distance unit: {0}")]
    UnknownUnit(String),

    #[error("Invalid date range: end {end} precedes start {start}")]
    InvalidDateRange { start: String, end: String },

    #[error("Invalid WKT geometry '{wkt}': {reason}")]
    InvalidWkt { wkt: String, reason: String },
}
