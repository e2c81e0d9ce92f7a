//! Family-level delegate built from a partial set of hooks.
//!
//! [`Rollup`] implements every [`FilterDelegate`] method by first looking up a
//! per-operator override, then funnelling the call into one of the
//! [`FamilyHooks`] methods. Hooks that are not overridden fall through to
//! [`FamilyHooks::on_default`], which reports the operator as unsupported.
//!
//! The family hooks see a canonical `(property, literals, literal_type, tag)`
//! shape: numeric widths collapse to [`LiteralType::Number`], between is keyed
//! on the lower boundary's type, and match-case is not passed through. A
//! delegate that needs case sensitivity registers an override for the
//! operator, which receives the full [`Invocation`].

use crate::{
    delegate::FilterDelegate,
    error::{DelegateError, DelegateResult},
};
use chrono::{DateTime, Duration, Utc};
use filter_model::{
    DateRange, Distance, FunctionCall, LiteralType, OperatorTag, TemporalOperand, Value, Wkt,
};
use std::collections::HashMap;

/// Overridable family hooks. Every hook defaults to [`FamilyHooks::on_default`].
pub trait FamilyHooks {
    type Output;

    fn name(&self) -> &str;

    /// `AND`/`OR` receive all operands, `NOT` one, `INCLUDE`/`EXCLUDE` none.
    fn on_logical(
        &mut self,
        _operands: Vec<Self::Output>,
        tag: OperatorTag,
    ) -> DelegateResult<Self::Output> {
        self.on_default(tag)
    }

    /// `literals` is empty for `IS_NULL`, holds both bounds for `IS_BETWEEN`
    /// and one literal otherwise. LIKE patterns arrive as string literals.
    fn on_comparison(
        &mut self,
        _property: &str,
        _literals: &[&Value],
        _literal_type: LiteralType,
        tag: OperatorTag,
    ) -> DelegateResult<Self::Output> {
        self.on_default(tag)
    }

    fn on_spatial(
        &mut self,
        _property: &str,
        _geometry: &Wkt,
        _distance: Option<&Distance>,
        tag: OperatorTag,
    ) -> DelegateResult<Self::Output> {
        self.on_default(tag)
    }

    /// `AFTER`/`BEFORE` carry an instant, `DURING` a period and `RELATIVE` a
    /// duration.
    fn on_temporal(
        &mut self,
        _property: &str,
        _operand: &TemporalOperand,
        tag: OperatorTag,
    ) -> DelegateResult<Self::Output> {
        self.on_default(tag)
    }

    /// `literal` is the pattern for `XPATH_IS_LIKE` and absent for `XPATH_EXISTS`.
    fn on_xpath(
        &mut self,
        _xpath: &str,
        _literal: Option<&Value>,
        tag: OperatorTag,
    ) -> DelegateResult<Self::Output> {
        self.on_default(tag)
    }

    /// `comparison` is the operator applied between the call and `literal`.
    fn on_function(
        &mut self,
        _call: &FunctionCall,
        _literal: &Value,
        _literal_type: LiteralType,
        _comparison: OperatorTag,
    ) -> DelegateResult<Self::Output> {
        self.on_default(OperatorTag::Function)
    }

    fn on_default(&mut self, tag: OperatorTag) -> DelegateResult<Self::Output> {
        Err(DelegateError::unsupported(tag, self.name()))
    }
}

/// The un-normalised arguments of one delegate call, handed to overrides.
#[derive(Debug)]
pub enum Invocation<'a, O> {
    Logical {
        operands: Vec<O>,
    },
    Comparison {
        property: &'a str,
        literal: &'a Value,
        /// `None` for operators without a case flag.
        match_case: Option<bool>,
    },
    Between {
        property: &'a str,
        lower: &'a Value,
        upper: &'a Value,
    },
    Like {
        property: &'a str,
        pattern: &'a str,
        match_case: bool,
    },
    Null {
        property: &'a str,
    },
    Spatial {
        property: &'a str,
        geometry: &'a Wkt,
        distance: Option<&'a Distance>,
    },
    Temporal {
        property: &'a str,
        operand: TemporalOperand,
    },
    XPath {
        xpath: &'a str,
        literal: Option<&'a Value>,
        match_case: Option<bool>,
    },
    Function {
        call: &'a FunctionCall,
        literal: &'a Value,
        comparison: OperatorTag,
        match_case: bool,
    },
}

/// Handler for one operator. State lives in the hooks value it receives.
pub type OverrideFn<H> = fn(
    &mut H,
    Invocation<'_, <H as FamilyHooks>::Output>,
) -> DelegateResult<<H as FamilyHooks>::Output>;

pub struct Rollup<H: FamilyHooks> {
    hooks: H,
    overrides: HashMap<OperatorTag, OverrideFn<H>>,
}

impl<H: FamilyHooks> Rollup<H> {
    pub fn new(hooks: H) -> Self {
        Self {
            hooks,
            overrides: HashMap::new(),
        }
    }

    /// Routes `tag` to `handler` instead of the family hook.
    pub fn with_override(mut self, tag: OperatorTag, handler: OverrideFn<H>) -> Self {
        self.overrides.insert(tag, handler);
        self
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    pub fn into_hooks(self) -> H {
        self.hooks
    }

    pub fn is_overridden(&self, tag: OperatorTag) -> bool {
        self.overrides.contains_key(&tag)
    }

    fn route(
        &mut self,
        tag: OperatorTag,
        invocation: Invocation<'_, H::Output>,
    ) -> DelegateResult<H::Output> {
        if let Some(handler) = self.overrides.get(&tag).copied() {
            return handler(&mut self.hooks, invocation);
        }
        self.roll_up(tag, invocation)
    }

    fn roll_up(
        &mut self,
        tag: OperatorTag,
        invocation: Invocation<'_, H::Output>,
    ) -> DelegateResult<H::Output> {
        match invocation {
            Invocation::Logical { operands } => self.hooks.on_logical(operands, tag),
            Invocation::Comparison {
                property, literal, ..
            } => self
                .hooks
                .on_comparison(property, &[literal], literal.literal_type(), tag),
            Invocation::Between {
                property,
                lower,
                upper,
            } => self
                .hooks
                .on_comparison(property, &[lower, upper], lower.literal_type(), tag),
            Invocation::Like {
                property, pattern, ..
            } => {
                let pattern = Value::from(pattern);
                self.hooks
                    .on_comparison(property, &[&pattern], LiteralType::String, tag)
            }
            Invocation::Null { property } => {
                self.hooks
                    .on_comparison(property, &[], LiteralType::Null, tag)
            }
            Invocation::Spatial {
                property,
                geometry,
                distance,
            } => self.hooks.on_spatial(property, geometry, distance, tag),
            Invocation::Temporal { property, operand } => {
                self.hooks.on_temporal(property, &operand, tag)
            }
            Invocation::XPath { xpath, literal, .. } => self.hooks.on_xpath(xpath, literal, tag),
            Invocation::Function {
                call,
                literal,
                comparison,
                ..
            } => self
                .hooks
                .on_function(call, literal, literal.literal_type(), comparison),
        }
    }
}

impl<H: FamilyHooks> FilterDelegate for Rollup<H> {
    type Output = H::Output;

    fn name(&self) -> &str {
        self.hooks.name()
    }

    fn and(&mut self, operands: Vec<H::Output>) -> DelegateResult<H::Output> {
        self.route(OperatorTag::And, Invocation::Logical { operands })
    }

    fn or(&mut self, operands: Vec<H::Output>) -> DelegateResult<H::Output> {
        self.route(OperatorTag::Or, Invocation::Logical { operands })
    }

    fn not(&mut self, operand: H::Output) -> DelegateResult<H::Output> {
        self.route(
            OperatorTag::Not,
            Invocation::Logical {
                operands: vec![operand],
            },
        )
    }

    fn include(&mut self) -> DelegateResult<H::Output> {
        self.route(OperatorTag::Include, Invocation::Logical { operands: vec![] })
    }

    fn exclude(&mut self) -> DelegateResult<H::Output> {
        self.route(OperatorTag::Exclude, Invocation::Logical { operands: vec![] })
    }

    fn property_is_equal_to(
        &mut self,
        property: &str,
        literal: &Value,
        match_case: bool,
    ) -> DelegateResult<H::Output> {
        self.route(
            OperatorTag::IsEqualTo,
            Invocation::Comparison {
                property,
                literal,
                match_case: Some(match_case),
            },
        )
    }

    fn property_is_not_equal_to(
        &mut self,
        property: &str,
        literal: &Value,
        match_case: bool,
    ) -> DelegateResult<H::Output> {
        self.route(
            OperatorTag::IsNotEqualTo,
            Invocation::Comparison {
                property,
                literal,
                match_case: Some(match_case),
            },
        )
    }

    fn property_is_greater_than(
        &mut self,
        property: &str,
        literal: &Value,
        match_case: bool,
    ) -> DelegateResult<H::Output> {
        self.route(
            OperatorTag::IsGreaterThan,
            ordering(property, literal, match_case),
        )
    }

    fn property_is_greater_than_or_equal_to(
        &mut self,
        property: &str,
        literal: &Value,
        match_case: bool,
    ) -> DelegateResult<H::Output> {
        self.route(
            OperatorTag::IsGreaterThanOrEqualTo,
            ordering(property, literal, match_case),
        )
    }

    fn property_is_less_than(
        &mut self,
        property: &str,
        literal: &Value,
        match_case: bool,
    ) -> DelegateResult<H::Output> {
        self.route(
            OperatorTag::IsLessThan,
            ordering(property, literal, match_case),
        )
    }

    fn property_is_less_than_or_equal_to(
        &mut self,
        property: &str,
        literal: &Value,
        match_case: bool,
    ) -> DelegateResult<H::Output> {
        self.route(
            OperatorTag::IsLessThanOrEqualTo,
            ordering(property, literal, match_case),
        )
    }

    fn property_is_between(
        &mut self,
        property: &str,
        lower: &Value,
        upper: &Value,
    ) -> DelegateResult<H::Output> {
        self.route(
            OperatorTag::IsBetween,
            Invocation::Between {
                property,
                lower,
                upper,
            },
        )
    }

    fn property_is_like(
        &mut self,
        property: &str,
        pattern: &str,
        match_case: bool,
    ) -> DelegateResult<H::Output> {
        self.route(
            OperatorTag::IsLike,
            Invocation::Like {
                property,
                pattern,
                match_case,
            },
        )
    }

    fn property_is_fuzzy(&mut self, property: &str, literal: &Value) -> DelegateResult<H::Output> {
        self.route(OperatorTag::IsFuzzy, comparison(property, literal))
    }

    fn property_is_null(&mut self, property: &str) -> DelegateResult<H::Output> {
        self.route(OperatorTag::IsNull, Invocation::Null { property })
    }

    fn beyond(
        &mut self,
        property: &str,
        geometry: &Wkt,
        distance: &Distance,
    ) -> DelegateResult<H::Output> {
        self.route(
            OperatorTag::Beyond,
            spatial(property, geometry, Some(distance)),
        )
    }

    fn contains(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<H::Output> {
        self.route(OperatorTag::Contains, spatial(property, geometry, None))
    }

    fn crosses(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<H::Output> {
        self.route(OperatorTag::Crosses, spatial(property, geometry, None))
    }

    fn disjoint(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<H::Output> {
        self.route(OperatorTag::Disjoint, spatial(property, geometry, None))
    }

    fn dwithin(
        &mut self,
        property: &str,
        geometry: &Wkt,
        distance: &Distance,
    ) -> DelegateResult<H::Output> {
        self.route(
            OperatorTag::DWithin,
            spatial(property, geometry, Some(distance)),
        )
    }

    fn intersects(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<H::Output> {
        self.route(OperatorTag::Intersects, spatial(property, geometry, None))
    }

    fn overlaps(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<H::Output> {
        self.route(OperatorTag::Overlaps, spatial(property, geometry, None))
    }

    fn touches(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<H::Output> {
        self.route(OperatorTag::Touches, spatial(property, geometry, None))
    }

    fn within(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<H::Output> {
        self.route(OperatorTag::Within, spatial(property, geometry, None))
    }

    fn nearest_neighbor(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<H::Output> {
        self.route(
            OperatorTag::NearestNeighbor,
            spatial(property, geometry, None),
        )
    }

    fn after(&mut self, property: &str, instant: &DateTime<Utc>) -> DelegateResult<H::Output> {
        self.route(
            OperatorTag::After,
            temporal(property, TemporalOperand::Instant(*instant)),
        )
    }

    fn before(&mut self, property: &str, instant: &DateTime<Utc>) -> DelegateResult<H::Output> {
        self.route(
            OperatorTag::Before,
            temporal(property, TemporalOperand::Instant(*instant)),
        )
    }

    fn during(&mut self, property: &str, range: &DateRange) -> DelegateResult<H::Output> {
        self.route(
            OperatorTag::During,
            temporal(property, TemporalOperand::Period(*range)),
        )
    }

    fn relative(&mut self, property: &str, duration: &Duration) -> DelegateResult<H::Output> {
        self.route(
            OperatorTag::Relative,
            temporal(property, TemporalOperand::Duration(*duration)),
        )
    }

    fn xpath_exists(&mut self, xpath: &str) -> DelegateResult<H::Output> {
        self.route(
            OperatorTag::XPathExists,
            Invocation::XPath {
                xpath,
                literal: None,
                match_case: None,
            },
        )
    }

    fn xpath_is_like(
        &mut self,
        xpath: &str,
        pattern: &str,
        match_case: bool,
    ) -> DelegateResult<H::Output> {
        let pattern = Value::from(pattern);
        self.route(
            OperatorTag::XPathIsLike,
            Invocation::XPath {
                xpath,
                literal: Some(&pattern),
                match_case: Some(match_case),
            },
        )
    }

    fn xpath_is_fuzzy(&mut self, xpath: &str, literal: &Value) -> DelegateResult<H::Output> {
        self.route(
            OperatorTag::XPathIsFuzzy,
            Invocation::XPath {
                xpath,
                literal: Some(literal),
                match_case: None,
            },
        )
    }

    fn function(
        &mut self,
        call: &FunctionCall,
        literal: &Value,
        comparison: OperatorTag,
        match_case: bool,
    ) -> DelegateResult<H::Output> {
        self.route(
            OperatorTag::Function,
            Invocation::Function {
                call,
                literal,
                comparison,
                match_case,
            },
        )
    }
}

fn ordering<'a, O>(
    property: &'a str,
    literal: &'a Value,
    match_case: bool,
) -> Invocation<'a, O> {
    Invocation::Comparison {
        property,
        literal,
        match_case: Some(match_case),
    }
}

fn comparison<'a, O>(property: &'a str, literal: &'a Value) -> Invocation<'a, O> {
    Invocation::Comparison {
        property,
        literal,
        match_case: None,
    }
}

fn spatial<'a, O>(
    property: &'a str,
    geometry: &'a Wkt,
    distance: Option<&'a Distance>,
) -> Invocation<'a, O> {
    Invocation::Spatial {
        property,
        geometry,
        distance,
    }
}

fn temporal<O>(property: &str, operand: TemporalOperand) -> Invocation<'_, O> {
    Invocation::Temporal { property, operand }
}
