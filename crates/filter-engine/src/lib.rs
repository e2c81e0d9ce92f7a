pub mod adapter;
pub mod config;
pub mod copy;
pub mod delegate;
pub mod error;
pub mod pattern;
pub mod rollup;
pub mod text;

pub use adapter::FilterAdapter;
pub use config::AdapterConfig;
pub use copy::{CopyDelegate, FilterFactory, NativeFactory};
pub use delegate::FilterDelegate;
pub use error::{AdapterError, ConfigError, DelegateError, DelegateResult};
pub use rollup::{FamilyHooks, Invocation, Rollup};
pub use text::TextDelegate;
