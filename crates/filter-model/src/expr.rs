use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An operand of a predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expression {
    /// A property reference, e.g. `title`, or an XPath such as `/metacard/title`.
    Property { name: String },

    /// A literal value.
    Literal { value: Value },

    /// A function call, e.g. `lower(title)`.
    Function(FunctionCall),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expression>,
}

impl Expression {
    pub fn property(name: &str) -> Self {
        Expression::Property {
            name: name.to_string(),
        }
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Expression::Literal {
            value: value.into(),
        }
    }

    pub fn function(name: &str, args: Vec<Expression>) -> Self {
        Expression::Function(FunctionCall {
            name: name.to_string(),
            args,
        })
    }

    pub fn as_property(&self) -> Option<&str> {
        match self {
            Expression::Property { name } => Some(name),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Expression::Literal { value } => Some(value),
            _ => None,
        }
    }

    /// Nesting depth of function calls; plain operands have depth 0.
    pub fn depth(&self) -> usize {
        match self {
            Expression::Function(call) => {
                1 + call.args.iter().map(Expression::depth).max().unwrap_or(0)
            }
            _ => 0,
        }
    }
}

/// Property names starting with `/` address a document node rather than a
/// flat attribute.
pub fn is_xpath(property: &str) -> bool {
    property.starts_with('/')
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Property { name } => f.write_str(name),
            Expression::Literal { value } => write!(f, "{value}"),
            Expression::Function(call) => write!(f, "{call}"),
        }
    }
}

impl fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        f.write_str("(")?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(")")
    }
}
