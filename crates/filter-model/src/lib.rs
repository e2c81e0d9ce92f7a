//! Dialect-independent vocabulary shared by the filter adapter and builders:
//! operator tags, literal values, temporal/spatial operands and the native
//! filter tree together with its dispatch hook.

pub mod error;
pub mod expr;
pub mod filter;
pub mod operator;
pub mod spatial;
pub mod temporal;
pub mod value;

pub use error::ModelError;
pub use expr::{Expression, FunctionCall};
pub use filter::{Filter, FilterNode, NodeKind};
pub use operator::{OperatorFamily, OperatorTag};
pub use spatial::{Distance, DistanceUnit, Wkt};
pub use temporal::{DateRange, TemporalOperand};
pub use value::{LiteralType, Value};
