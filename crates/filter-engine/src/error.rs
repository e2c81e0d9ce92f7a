use filter_model::OperatorTag;
use thiserror::Error;

pub type DelegateResult<T> = std::result::Result<T, DelegateError>;

/// Failure raised while handling a single node.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DelegateError {
    #[error("Operation {tag} is not supported by {delegate}")]
    Unsupported { tag: OperatorTag, delegate: String },

    #[error("Operation {tag} does not accept a {literal_type} operand")]
    IncompatibleLiteral { tag: OperatorTag, literal_type: String },

    #[error("Malformed {tag} node: {message}")]
    MalformedInput { tag: OperatorTag, message: String },

    #[error("{delegate} failed on {tag}: {message}")]
    Failed {
        tag: OperatorTag,
        delegate: String,
        message: String,
    },
}

impl DelegateError {
    pub fn unsupported(tag: OperatorTag, delegate: &str) -> Self {
        DelegateError::Unsupported {
            tag,
            delegate: delegate.to_string(),
        }
    }

    pub fn malformed(tag: OperatorTag, message: impl Into<String>) -> Self {
        DelegateError::MalformedInput {
            tag,
            message: message.into(),
        }
    }

    pub fn incompatible(tag: OperatorTag, literal_type: impl ToString) -> Self {
        DelegateError::IncompatibleLiteral {
            tag,
            literal_type: literal_type.to_string(),
        }
    }

    pub fn tag(&self) -> OperatorTag {
        match self {
            DelegateError::Unsupported { tag, .. }
            | DelegateError::IncompatibleLiteral { tag, .. }
            | DelegateError::MalformedInput { tag, .. }
            | DelegateError::Failed { tag, .. } => *tag,
        }
    }
}

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Failed to adapt {tag} node: {source}")]
    Operation {
        tag: OperatorTag,
        #[source]
        source: DelegateError,
    },

    #[error("Filter tree depth {depth} exceeds the maximum of {max}")]
    TooDeep { depth: usize, max: usize },
}

impl AdapterError {
    /// The per-node failure that aborted adaptation, if any.
    pub fn root_cause(&self) -> Option<&DelegateError> {
        match self {
            AdapterError::Operation { source, .. } => Some(source),
            AdapterError::TooDeep { .. } => None,
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self.root_cause(), Some(DelegateError::Unsupported { .. }))
    }

    pub fn is_malformed(&self) -> bool {
        matches!(
            self.root_cause(),
            Some(DelegateError::MalformedInput { .. } | DelegateError::IncompatibleLiteral { .. })
        )
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse environment variable '{var}' with value '{value}' as {expected_type}")]
    EnvParseError {
        var: String,
        value: String,
        expected_type: String,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_source_chain_preserves_cause() {
        let err = AdapterError::Operation {
            tag: OperatorTag::Intersects,
            source: DelegateError::unsupported(OperatorTag::Intersects, "TestDelegate"),
        };
        let source = err.source().unwrap();
        let cause = source.downcast_ref::<DelegateError>().unwrap();
        assert_eq!(cause.tag(), OperatorTag::Intersects);
        assert!(err.is_unsupported());
        assert!(!err.is_malformed());
    }

    #[test]
    fn test_messages() {
        let err = DelegateError::unsupported(OperatorTag::During, "SolrDelegate");
        assert_eq!(err.to_string(), "Operation DURING is not supported by SolrDelegate");

        let err = DelegateError::incompatible(OperatorTag::IsLessThan, "boolean");
        assert_eq!(
            err.to_string(),
            "Operation IS_LESS_THAN does not accept a boolean operand"
        );
    }
}
