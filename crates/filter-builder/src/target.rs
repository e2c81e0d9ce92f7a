//! The node-construction side of the flat builder.

use crate::error::BuildError;
use filter_model::{Distance, OperatorFamily, OperatorTag, Value};

/// Combines the children of a closed logical scope into one node.
pub type Reducer<N> = Box<dyn FnOnce(Vec<N>) -> N>;

/// Operand layout of a terminal predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Property only (`IS_NULL`, `XPATH_EXISTS`).
    Unary,
    /// Property and one value.
    Binary,
    /// Property, lower and upper value.
    Between,
}

impl Shape {
    /// `None` for tags that are not built as terminals.
    pub fn of(tag: OperatorTag) -> Option<Shape> {
        match tag {
            OperatorTag::IsNull | OperatorTag::XPathExists => Some(Shape::Unary),
            OperatorTag::IsBetween => Some(Shape::Between),
            OperatorTag::Function => None,
            tag if tag.family() == OperatorFamily::Logical => None,
            _ => Some(Shape::Binary),
        }
    }

    pub fn value_slots(&self) -> usize {
        match self {
            Shape::Unary => 0,
            Shape::Binary => 1,
            Shape::Between => 2,
        }
    }
}

/// A completed terminal handed to [`TreeTarget::terminal`].
#[derive(Debug, Clone, PartialEq)]
pub struct Terminal<O> {
    pub tag: OperatorTag,
    pub match_case: bool,
    /// Left operand: a property or a function.
    pub property: O,
    /// Right operand(s) in the order they were supplied.
    pub values: Vec<O>,
    pub distance: Option<Distance>,
}

/// Builds the nodes of one target representation.
pub trait TreeTarget {
    type Node: Clone;
    type Operand;

    fn name(&self) -> &str;

    /// Whether `tag` can be represented at all. Checked when the terminal is
    /// opened.
    fn supports(&self, _tag: OperatorTag) -> bool {
        true
    }

    fn property(&self, name: &str) -> Result<Self::Operand, BuildError>;
    fn literal(&self, value: &Value) -> Result<Self::Operand, BuildError>;
    fn function(&self, name: &str, args: Vec<Self::Operand>) -> Result<Self::Operand, BuildError>;
    fn terminal(&self, terminal: Terminal<Self::Operand>) -> Result<Self::Node, BuildError>;
    fn logical_reducer(&self, tag: OperatorTag) -> Result<Reducer<Self::Node>, BuildError>;

    fn unsupported(&self, tag: OperatorTag) -> BuildError {
        BuildError::Unsupported {
            tag,
            target: self.name().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shapes() {
        assert_eq!(Shape::of(OperatorTag::IsNull), Some(Shape::Unary));
        assert_eq!(Shape::of(OperatorTag::IsBetween), Some(Shape::Between));
        assert_eq!(Shape::of(OperatorTag::DWithin), Some(Shape::Binary));
        assert_eq!(Shape::of(OperatorTag::And), None);
        assert_eq!(Shape::of(OperatorTag::Include), None);
        assert_eq!(Shape::of(OperatorTag::Function), None);
    }
}
