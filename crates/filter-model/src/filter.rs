//! The native filter tree and the dispatch hook consumed by the adapter.
//!
//! Any tree representation can be adapted as long as it implements
//! [`FilterNode`]; [`Filter`] is the representation shipped with this crate.

use crate::{
    expr::Expression,
    operator::OperatorTag,
    spatial::{Distance, Wkt},
    temporal::TemporalOperand,
    value::Value,
};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_WILDCARD: char = '*';
pub const DEFAULT_SINGLE_CHAR: char = '?';
pub const DEFAULT_ESCAPE: char = '\\';

lazy_static! {
    static ref INCLUDE: Arc<Filter> = Arc::new(Filter::Include);
    static ref EXCLUDE: Arc<Filter> = Arc::new(Filter::Exclude);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Filter {
    /// Matches everything.
    Include,

    /// Matches nothing.
    Exclude,

    And {
        filters: Vec<Filter>,
    },

    Or {
        filters: Vec<Filter>,
    },

    Not {
        filter: Box<Filter>,
    },

    /// Binary comparison (`=`, `<>`, `>`, `>=`, `<`, `<=`).
    Compare {
        op: OperatorTag,
        left: Expression,
        right: Expression,
        #[serde(default = "default_match_case")]
        match_case: bool,
    },

    Between {
        expr: Expression,
        lower: Expression,
        upper: Expression,
    },

    /// Pattern match; the wildcard characters are specific to this node.
    Like {
        expr: Expression,
        pattern: String,
        #[serde(default = "default_wildcard")]
        wildcard: char,
        #[serde(default = "default_single_char")]
        single_char: char,
        #[serde(default = "default_escape")]
        escape: char,
        #[serde(default = "default_match_case")]
        match_case: bool,
    },

    Fuzzy {
        expr: Expression,
        literal: Value,
    },

    IsNull {
        expr: Expression,
    },

    Spatial {
        op: OperatorTag,
        property: String,
        geometry: Wkt,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        distance: Option<Distance>,
    },

    Temporal {
        op: OperatorTag,
        property: String,
        operand: TemporalOperand,
    },
}

fn default_match_case() -> bool {
    true
}

fn default_wildcard() -> char {
    DEFAULT_WILDCARD
}

fn default_single_char() -> char {
    DEFAULT_SINGLE_CHAR
}

fn default_escape() -> char {
    DEFAULT_ESCAPE
}

impl Filter {
    /// Shared `INCLUDE` constant. Copies of a tree hand this same allocation back.
    pub fn include_sentinel() -> Arc<Filter> {
        Arc::clone(&INCLUDE)
    }

    /// Shared `EXCLUDE` constant.
    pub fn exclude_sentinel() -> Arc<Filter> {
        Arc::clone(&EXCLUDE)
    }

    pub fn and(filters: Vec<Filter>) -> Self {
        Filter::And { filters }
    }

    pub fn or(filters: Vec<Filter>) -> Self {
        Filter::Or { filters }
    }

    pub fn not(filter: Filter) -> Self {
        Filter::Not {
            filter: Box::new(filter),
        }
    }

    /// `property <op> literal`, case-sensitive.
    pub fn compare(op: OperatorTag, property: &str, literal: impl Into<Value>) -> Self {
        Filter::Compare {
            op,
            left: Expression::property(property),
            right: Expression::literal(literal),
            match_case: true,
        }
    }

    pub fn equal_to(property: &str, literal: impl Into<Value>, match_case: bool) -> Self {
        Filter::Compare {
            op: OperatorTag::IsEqualTo,
            left: Expression::property(property),
            right: Expression::literal(literal),
            match_case,
        }
    }

    pub fn between(property: &str, lower: impl Into<Value>, upper: impl Into<Value>) -> Self {
        Filter::Between {
            expr: Expression::property(property),
            lower: Expression::literal(lower),
            upper: Expression::literal(upper),
        }
    }

    /// LIKE using the default `*`, `?` and `\` characters.
    pub fn like(property: &str, pattern: &str, match_case: bool) -> Self {
        Filter::Like {
            expr: Expression::property(property),
            pattern: pattern.to_string(),
            wildcard: DEFAULT_WILDCARD,
            single_char: DEFAULT_SINGLE_CHAR,
            escape: DEFAULT_ESCAPE,
            match_case,
        }
    }

    pub fn fuzzy(property: &str, literal: impl Into<Value>) -> Self {
        Filter::Fuzzy {
            expr: Expression::property(property),
            literal: literal.into(),
        }
    }

    pub fn is_null(property: &str) -> Self {
        Filter::IsNull {
            expr: Expression::property(property),
        }
    }

    pub fn spatial(op: OperatorTag, property: &str, geometry: Wkt) -> Self {
        Filter::Spatial {
            op,
            property: property.to_string(),
            geometry,
            distance: None,
        }
    }

    pub fn buffered(op: OperatorTag, property: &str, geometry: Wkt, distance: Distance) -> Self {
        Filter::Spatial {
            op,
            property: property.to_string(),
            geometry,
            distance: Some(distance),
        }
    }

    pub fn temporal(op: OperatorTag, property: &str, operand: TemporalOperand) -> Self {
        Filter::Temporal {
            op,
            property: property.to_string(),
            operand,
        }
    }

    /// `true` for the two stateless constants.
    pub fn is_constant(&self) -> bool {
        matches!(self, Filter::Include | Filter::Exclude)
    }
}

/// Borrowed, representation-independent view of one node.
#[derive(Debug)]
pub enum NodeKind<'a, N: ?Sized> {
    Include,
    Exclude,
    And(Vec<&'a N>),
    Or(Vec<&'a N>),
    Not(&'a N),
    Compare {
        op: OperatorTag,
        left: &'a Expression,
        right: &'a Expression,
        match_case: bool,
    },
    Between {
        expr: &'a Expression,
        lower: &'a Expression,
        upper: &'a Expression,
    },
    Like {
        expr: &'a Expression,
        pattern: &'a str,
        wildcard: char,
        single_char: char,
        escape: char,
        match_case: bool,
    },
    Fuzzy {
        expr: &'a Expression,
        literal: &'a Value,
    },
    IsNull(&'a Expression),
    Spatial {
        op: OperatorTag,
        property: &'a str,
        geometry: &'a Wkt,
        distance: Option<&'a Distance>,
    },
    Temporal {
        op: OperatorTag,
        property: &'a str,
        operand: &'a TemporalOperand,
    },
}

/// The single coupling point between the adapter and a tree representation.
pub trait FilterNode {
    fn kind(&self) -> NodeKind<'_, Self>;
}

impl FilterNode for Filter {
    fn kind(&self) -> NodeKind<'_, Self> {
        match self {
            Filter::Include => NodeKind::Include,
            Filter::Exclude => NodeKind::Exclude,
            Filter::And { filters } => NodeKind::And(filters.iter().collect()),
            Filter::Or { filters } => NodeKind::Or(filters.iter().collect()),
            Filter::Not { filter } => NodeKind::Not(filter),
            Filter::Compare {
                op,
                left,
                right,
                match_case,
            } => NodeKind::Compare {
                op: *op,
                left,
                right,
                match_case: *match_case,
            },
            Filter::Between { expr, lower, upper } => NodeKind::Between { expr, lower, upper },
            Filter::Like {
                expr,
                pattern,
                wildcard,
                single_char,
                escape,
                match_case,
            } => NodeKind::Like {
                expr,
                pattern,
                wildcard: *wildcard,
                single_char: *single_char,
                escape: *escape,
                match_case: *match_case,
            },
            Filter::Fuzzy { expr, literal } => NodeKind::Fuzzy { expr, literal },
            Filter::IsNull { expr } => NodeKind::IsNull(expr),
            Filter::Spatial {
                op,
                property,
                geometry,
                distance,
            } => NodeKind::Spatial {
                op: *op,
                property,
                geometry,
                distance: distance.as_ref(),
            },
            Filter::Temporal {
                op,
                property,
                operand,
            } => NodeKind::Temporal {
                op: *op,
                property,
                operand,
            },
        }
    }
}
