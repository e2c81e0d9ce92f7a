use filter_engine::AdapterError;
use filter_model::OperatorTag;
use thiserror::Error;

/// The builder invariant a call broke.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
    #[error("a terminal is already in progress")]
    TerminalInProgress,

    #[error("no terminal or function is in progress")]
    NoNodeInProgress,

    #[error("functions can only be opened inside a terminal")]
    FunctionOutsideTerminal,

    #[error("{0} is not a logical operator")]
    NotLogical(OperatorTag),

    #[error("{0} cannot be built as a terminal")]
    NotTerminal(OperatorTag),

    #[error("{0} slot is already set")]
    SlotAlreadySet(&'static str),

    #[error("{0} slot was never set")]
    MissingOperand(&'static str),

    #[error("{0} does not take a distance")]
    DistanceNotAllowed(OperatorTag),

    #[error("{tag} scope needs {expected} children, got {got}")]
    ScopeArity {
        tag: OperatorTag,
        expected: &'static str,
        got: usize,
    },

    #[error("nothing is open to end")]
    NothingToEnd,

    #[error("{0} logical scope(s) still open")]
    ScopesOpen(usize),

    #[error("a root node was already produced")]
    RootAlreadySet,

    #[error("no root node was produced")]
    NoRoot,

    #[error("the builder is complete and can no longer be modified")]
    Frozen,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("Builder protocol violation: {0}")]
    Protocol(Violation),

    #[error("Builder was poisoned by an earlier protocol violation")]
    Poisoned,

    #[error("Operation {tag} cannot be represented by {target}")]
    Unsupported { tag: OperatorTag, target: String },

    #[error("Failed to render {target} output: {message}")]
    Render { target: String, message: String },
}

impl From<Violation> for BuildError {
    fn from(violation: Violation) -> Self {
        BuildError::Protocol(violation)
    }
}

/// Failure of a full adapt-then-build translation.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error(transparent)]
    Adapt(#[from] AdapterError),

    #[error(transparent)]
    Build(#[from] BuildError),
}
