//! The closed catalog of predicate and combinator kinds.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Broad grouping of operator tags. Every tag belongs to exactly one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperatorFamily {
    Logical,
    Comparison,
    Spatial,
    Temporal,
    XPath,
    Function,
}

impl fmt::Display for OperatorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperatorFamily::Logical => "logical",
            OperatorFamily::Comparison => "comparison",
            OperatorFamily::Spatial => "spatial",
            OperatorFamily::Temporal => "temporal",
            OperatorFamily::XPath => "xpath",
            OperatorFamily::Function => "function",
        };
        f.write_str(name)
    }
}

/// Identifies one predicate or combinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperatorTag {
    // Logical
    And,
    Or,
    Not,
    Include,
    Exclude,

    // Comparison
    IsEqualTo,
    IsNotEqualTo,
    IsGreaterThan,
    IsGreaterThanOrEqualTo,
    IsLessThan,
    IsLessThanOrEqualTo,
    IsBetween,
    IsLike,
    IsFuzzy,
    IsNull,

    // Spatial
    Beyond,
    Contains,
    Crosses,
    Disjoint,
    #[serde(rename = "DWITHIN")]
    DWithin,
    Intersects,
    Overlaps,
    Touches,
    Within,
    NearestNeighbor,

    // Temporal
    After,
    Before,
    During,
    Relative,

    // XPath
    #[serde(rename = "XPATH_EXISTS")]
    XPathExists,
    #[serde(rename = "XPATH_IS_LIKE")]
    XPathIsLike,
    #[serde(rename = "XPATH_IS_FUZZY")]
    XPathIsFuzzy,

    // Function
    Function,
}

impl OperatorTag {
    pub const ALL: [OperatorTag; 33] = [
        OperatorTag::And,
        OperatorTag::Or,
        OperatorTag::Not,
        OperatorTag::Include,
        OperatorTag::Exclude,
        OperatorTag::IsEqualTo,
        OperatorTag::IsNotEqualTo,
        OperatorTag::IsGreaterThan,
        OperatorTag::IsGreaterThanOrEqualTo,
        OperatorTag::IsLessThan,
        OperatorTag::IsLessThanOrEqualTo,
        OperatorTag::IsBetween,
        OperatorTag::IsLike,
        OperatorTag::IsFuzzy,
        OperatorTag::IsNull,
        OperatorTag::Beyond,
        OperatorTag::Contains,
        OperatorTag::Crosses,
        OperatorTag::Disjoint,
        OperatorTag::DWithin,
        OperatorTag::Intersects,
        OperatorTag::Overlaps,
        OperatorTag::Touches,
        OperatorTag::Within,
        OperatorTag::NearestNeighbor,
        OperatorTag::After,
        OperatorTag::Before,
        OperatorTag::During,
        OperatorTag::Relative,
        OperatorTag::XPathExists,
        OperatorTag::XPathIsLike,
        OperatorTag::XPathIsFuzzy,
        OperatorTag::Function,
    ];

    pub fn family(&self) -> OperatorFamily {
        use OperatorTag::*;
        match self {
            And | Or | Not | Include | Exclude => OperatorFamily::Logical,
            IsEqualTo | IsNotEqualTo | IsGreaterThan | IsGreaterThanOrEqualTo | IsLessThan
            | IsLessThanOrEqualTo | IsBetween | IsLike | IsFuzzy | IsNull => {
                OperatorFamily::Comparison
            }
            Beyond | Contains | Crosses | Disjoint | DWithin | Intersects | Overlaps | Touches
            | Within | NearestNeighbor => OperatorFamily::Spatial,
            After | Before | During | Relative => OperatorFamily::Temporal,
            XPathExists | XPathIsLike | XPathIsFuzzy => OperatorFamily::XPath,
            Function => OperatorFamily::Function,
        }
    }

    /// `>`, `>=`, `<` and `<=`.
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            OperatorTag::IsGreaterThan
                | OperatorTag::IsGreaterThanOrEqualTo
                | OperatorTag::IsLessThan
                | OperatorTag::IsLessThanOrEqualTo
        )
    }

    /// Operators that may compare a property (or function) against a single literal.
    pub fn is_binary_comparison(&self) -> bool {
        matches!(self, OperatorTag::IsEqualTo | OperatorTag::IsNotEqualTo) || self.is_ordering()
    }

    /// The operator obtained by swapping the operands, e.g. `5 < x` is `x > 5`.
    pub fn mirrored(&self) -> OperatorTag {
        match self {
            OperatorTag::IsGreaterThan => OperatorTag::IsLessThan,
            OperatorTag::IsGreaterThanOrEqualTo => OperatorTag::IsLessThanOrEqualTo,
            OperatorTag::IsLessThan => OperatorTag::IsGreaterThan,
            OperatorTag::IsLessThanOrEqualTo => OperatorTag::IsGreaterThanOrEqualTo,
            other => *other,
        }
    }

    /// Spatial operators that carry a buffer distance.
    pub fn takes_distance(&self) -> bool {
        matches!(self, OperatorTag::DWithin | OperatorTag::Beyond)
    }

    pub fn as_str(&self) -> &'static str {
        use OperatorTag::*;
        match self {
            And => "AND",
            Or => "OR",
            Not => "NOT",
            Include => "INCLUDE",
            Exclude => "EXCLUDE",
            IsEqualTo => "IS_EQUAL_TO",
            IsNotEqualTo => "IS_NOT_EQUAL_TO",
            IsGreaterThan => "IS_GREATER_THAN",
            IsGreaterThanOrEqualTo => "IS_GREATER_THAN_OR_EQUAL_TO",
            IsLessThan => "IS_LESS_THAN",
            IsLessThanOrEqualTo => "IS_LESS_THAN_OR_EQUAL_TO",
            IsBetween => "IS_BETWEEN",
            IsLike => "IS_LIKE",
            IsFuzzy => "IS_FUZZY",
            IsNull => "IS_NULL",
            Beyond => "BEYOND",
            Contains => "CONTAINS",
            Crosses => "CROSSES",
            Disjoint => "DISJOINT",
            DWithin => "DWITHIN",
            Intersects => "INTERSECTS",
            Overlaps => "OVERLAPS",
            Touches => "TOUCHES",
            Within => "WITHIN",
            NearestNeighbor => "NEAREST_NEIGHBOR",
            After => "AFTER",
            Before => "BEFORE",
            During => "DURING",
            Relative => "RELATIVE",
            XPathExists => "XPATH_EXISTS",
            XPathIsLike => "XPATH_IS_LIKE",
            XPathIsFuzzy => "XPATH_IS_FUZZY",
            Function => "FUNCTION",
        }
    }
}

impl fmt::Display for OperatorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperatorTag {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperatorTag::ALL
            .iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| ModelError::UnknownOperator(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_tag_listed_once() {
        let unique: HashSet<_> = OperatorTag::ALL.iter().collect();
        assert_eq!(unique.len(), OperatorTag::ALL.len());
    }

    #[test]
    fn test_family_partition() {
        let count = |family| {
            OperatorTag::ALL
                .iter()
                .filter(|t| t.family() == family)
                .count()
        };
        assert_eq!(count(OperatorFamily::Logical), 5);
        assert_eq!(count(OperatorFamily::Comparison), 10);
        assert_eq!(count(OperatorFamily::Spatial), 10);
        assert_eq!(count(OperatorFamily::Temporal), 4);
        assert_eq!(count(OperatorFamily::XPath), 3);
        assert_eq!(count(OperatorFamily::Function), 1);
    }

    #[test]
    fn test_display_parse_agree() {
        for tag in OperatorTag::ALL {
            assert_eq!(tag.to_string().parse::<OperatorTag>().unwrap(), tag);
        }
        assert_eq!("dwithin".parse::<OperatorTag>().unwrap(), OperatorTag::DWithin);
        assert!("IS_SIMILAR_TO".parse::<OperatorTag>().is_err());
    }

    #[test]
    fn test_serde_names_match_display() {
        for tag in OperatorTag::ALL {
            let json = serde_json::to_string(&tag).unwrap();
            assert_eq!(json, format!("\"{}\"", tag));
        }
    }

    #[test]
    fn test_mirrored() {
        assert_eq!(OperatorTag::IsLessThan.mirrored(), OperatorTag::IsGreaterThan);
        assert_eq!(
            OperatorTag::IsGreaterThanOrEqualTo.mirrored(),
            OperatorTag::IsLessThanOrEqualTo
        );
        assert_eq!(OperatorTag::IsEqualTo.mirrored(), OperatorTag::IsEqualTo);
    }
}
