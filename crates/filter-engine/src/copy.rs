//! Rebuilds a filter tree through a [`FilterFactory`].

use crate::{
    delegate::FilterDelegate,
    error::{DelegateError, DelegateResult},
};
use chrono::{DateTime, Duration, Utc};
use filter_model::{
    DateRange, Distance, Expression, Filter, FunctionCall, OperatorTag, TemporalOperand, Value,
    Wkt,
};
use std::sync::Arc;
use tracing::trace;

/// Constructs nodes of some filter representation.
///
/// `like` patterns are always in canonical form (`*`, `?`, `\`).
pub trait FilterFactory {
    type Node;

    fn name(&self) -> &str;

    /// Factories that cannot express case-sensitive matching receive
    /// `match_case = false` for every node.
    fn supports_match_case(&self) -> bool {
        true
    }

    fn include(&self) -> DelegateResult<Self::Node>;
    fn exclude(&self) -> DelegateResult<Self::Node>;
    fn and(&self, children: Vec<Self::Node>) -> DelegateResult<Self::Node>;
    fn or(&self, children: Vec<Self::Node>) -> DelegateResult<Self::Node>;
    fn not(&self, child: Self::Node) -> DelegateResult<Self::Node>;
    fn compare(
        &self,
        op: OperatorTag,
        left: Expression,
        right: Expression,
        match_case: bool,
    ) -> DelegateResult<Self::Node>;
    fn between(
        &self,
        expr: Expression,
        lower: Expression,
        upper: Expression,
    ) -> DelegateResult<Self::Node>;
    fn like(&self, expr: Expression, pattern: &str, match_case: bool)
    -> DelegateResult<Self::Node>;
    fn fuzzy(&self, expr: Expression, literal: Value) -> DelegateResult<Self::Node>;
    fn is_null(&self, expr: Expression) -> DelegateResult<Self::Node>;
    fn spatial(
        &self,
        op: OperatorTag,
        property: &str,
        geometry: Wkt,
        distance: Option<Distance>,
    ) -> DelegateResult<Self::Node>;
    fn temporal(
        &self,
        op: OperatorTag,
        property: &str,
        operand: TemporalOperand,
    ) -> DelegateResult<Self::Node>;
}

/// Factory for the native [`Filter`] tree.
///
/// Nodes are handed around as `Arc<Filter>` so `INCLUDE` and `EXCLUDE` can be
/// returned as the shared sentinels rather than fresh allocations.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeFactory;

impl FilterFactory for NativeFactory {
    type Node = Arc<Filter>;

    fn name(&self) -> &str {
        "NativeFactory"
    }

    fn include(&self) -> DelegateResult<Arc<Filter>> {
        Ok(Filter::include_sentinel())
    }

    fn exclude(&self) -> DelegateResult<Arc<Filter>> {
        Ok(Filter::exclude_sentinel())
    }

    fn and(&self, children: Vec<Arc<Filter>>) -> DelegateResult<Arc<Filter>> {
        Ok(Arc::new(Filter::and(unwrap_all(children))))
    }

    fn or(&self, children: Vec<Arc<Filter>>) -> DelegateResult<Arc<Filter>> {
        Ok(Arc::new(Filter::or(unwrap_all(children))))
    }

    fn not(&self, child: Arc<Filter>) -> DelegateResult<Arc<Filter>> {
        Ok(Arc::new(Filter::not(Arc::unwrap_or_clone(child))))
    }

    fn compare(
        &self,
        op: OperatorTag,
        left: Expression,
        right: Expression,
        match_case: bool,
    ) -> DelegateResult<Arc<Filter>> {
        Ok(Arc::new(Filter::Compare {
            op,
            left,
            right,
            match_case,
        }))
    }

    fn between(
        &self,
        expr: Expression,
        lower: Expression,
        upper: Expression,
    ) -> DelegateResult<Arc<Filter>> {
        Ok(Arc::new(Filter::Between { expr, lower, upper }))
    }

    fn like(&self, expr: Expression, pattern: &str, match_case: bool) -> DelegateResult<Arc<Filter>> {
        Ok(Arc::new(Filter::Like {
            expr,
            pattern: pattern.to_string(),
            wildcard: crate::pattern::WILDCARD,
            single_char: crate::pattern::SINGLE_CHAR,
            escape: crate::pattern::ESCAPE,
            match_case,
        }))
    }

    fn fuzzy(&self, expr: Expression, literal: Value) -> DelegateResult<Arc<Filter>> {
        Ok(Arc::new(Filter::Fuzzy { expr, literal }))
    }

    fn is_null(&self, expr: Expression) -> DelegateResult<Arc<Filter>> {
        Ok(Arc::new(Filter::IsNull { expr }))
    }

    fn spatial(
        &self,
        op: OperatorTag,
        property: &str,
        geometry: Wkt,
        distance: Option<Distance>,
    ) -> DelegateResult<Arc<Filter>> {
        Ok(Arc::new(Filter::Spatial {
            op,
            property: property.to_string(),
            geometry,
            distance,
        }))
    }

    fn temporal(
        &self,
        op: OperatorTag,
        property: &str,
        operand: TemporalOperand,
    ) -> DelegateResult<Arc<Filter>> {
        Ok(Arc::new(Filter::temporal(op, property, operand)))
    }
}

fn unwrap_all(children: Vec<Arc<Filter>>) -> Vec<Filter> {
    children.into_iter().map(Arc::unwrap_or_clone).collect()
}

/// Delegate that reproduces every node it visits through a factory.
#[derive(Debug, Clone, Default)]
pub struct CopyDelegate<F> {
    factory: F,
}

impl<F: FilterFactory> CopyDelegate<F> {
    pub fn new(factory: F) -> Self {
        Self { factory }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    fn match_case(&self, requested: bool) -> bool {
        if !requested || self.factory.supports_match_case() {
            return requested;
        }
        trace!(
            "{} cannot match case; copying as case-insensitive",
            self.factory.name()
        );
        false
    }

    fn compare(
        &self,
        op: OperatorTag,
        property: &str,
        literal: &Value,
        match_case: bool,
    ) -> DelegateResult<F::Node> {
        self.factory.compare(
            op,
            Expression::property(property),
            Expression::literal(literal.clone()),
            self.match_case(match_case),
        )
    }

    fn spatial(
        &self,
        op: OperatorTag,
        property: &str,
        geometry: &Wkt,
        distance: Option<&Distance>,
    ) -> DelegateResult<F::Node> {
        self.factory
            .spatial(op, property, geometry.clone(), distance.copied())
    }
}

impl CopyDelegate<NativeFactory> {
    pub fn native() -> Self {
        Self::new(NativeFactory)
    }
}

impl<F: FilterFactory> FilterDelegate for CopyDelegate<F> {
    type Output = F::Node;

    fn name(&self) -> &str {
        "CopyDelegate"
    }

    fn and(&mut self, operands: Vec<F::Node>) -> DelegateResult<F::Node> {
        self.factory.and(operands)
    }

    fn or(&mut self, operands: Vec<F::Node>) -> DelegateResult<F::Node> {
        self.factory.or(operands)
    }

    fn not(&mut self, operand: F::Node) -> DelegateResult<F::Node> {
        self.factory.not(operand)
    }

    fn include(&mut self) -> DelegateResult<F::Node> {
        self.factory.include()
    }

    fn exclude(&mut self) -> DelegateResult<F::Node> {
        self.factory.exclude()
    }

    fn property_is_equal_to(
        &mut self,
        property: &str,
        literal: &Value,
        match_case: bool,
    ) -> DelegateResult<F::Node> {
        self.compare(OperatorTag::IsEqualTo, property, literal, match_case)
    }

    fn property_is_not_equal_to(
        &mut self,
        property: &str,
        literal: &Value,
        match_case: bool,
    ) -> DelegateResult<F::Node> {
        self.compare(OperatorTag::IsNotEqualTo, property, literal, match_case)
    }

    fn property_is_greater_than(
        &mut self,
        property: &str,
        literal: &Value,
        match_case: bool,
    ) -> DelegateResult<F::Node> {
        self.compare(OperatorTag::IsGreaterThan, property, literal, match_case)
    }

    fn property_is_greater_than_or_equal_to(
        &mut self,
        property: &str,
        literal: &Value,
        match_case: bool,
    ) -> DelegateResult<F::Node> {
        self.compare(OperatorTag::IsGreaterThanOrEqualTo, property, literal, match_case)
    }

    fn property_is_less_than(
        &mut self,
        property: &str,
        literal: &Value,
        match_case: bool,
    ) -> DelegateResult<F::Node> {
        self.compare(OperatorTag::IsLessThan, property, literal, match_case)
    }

    fn property_is_less_than_or_equal_to(
        &mut self,
        property: &str,
        literal: &Value,
        match_case: bool,
    ) -> DelegateResult<F::Node> {
        self.compare(OperatorTag::IsLessThanOrEqualTo, property, literal, match_case)
    }

    fn property_is_between(
        &mut self,
        property: &str,
        lower: &Value,
        upper: &Value,
    ) -> DelegateResult<F::Node> {
        self.factory.between(
            Expression::property(property),
            Expression::literal(lower.clone()),
            Expression::literal(upper.clone()),
        )
    }

    fn property_is_like(
        &mut self,
        property: &str,
        pattern: &str,
        match_case: bool,
    ) -> DelegateResult<F::Node> {
        let match_case = self.match_case(match_case);
        self.factory
            .like(Expression::property(property), pattern, match_case)
    }

    fn property_is_fuzzy(&mut self, property: &str, literal: &Value) -> DelegateResult<F::Node> {
        self.factory
            .fuzzy(Expression::property(property), literal.clone())
    }

    fn property_is_null(&mut self, property: &str) -> DelegateResult<F::Node> {
        self.factory.is_null(Expression::property(property))
    }

    fn beyond(
        &mut self,
        property: &str,
        geometry: &Wkt,
        distance: &Distance,
    ) -> DelegateResult<F::Node> {
        self.spatial(OperatorTag::Beyond, property, geometry, Some(distance))
    }

    fn contains(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<F::Node> {
        self.spatial(OperatorTag::Contains, property, geometry, None)
    }

    fn crosses(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<F::Node> {
        self.spatial(OperatorTag::Crosses, property, geometry, None)
    }

    fn disjoint(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<F::Node> {
        self.spatial(OperatorTag::Disjoint, property, geometry, None)
    }

    fn dwithin(
        &mut self,
        property: &str,
        geometry: &Wkt,
        distance: &Distance,
    ) -> DelegateResult<F::Node> {
        self.spatial(OperatorTag::DWithin, property, geometry, Some(distance))
    }

    fn intersects(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<F::Node> {
        self.spatial(OperatorTag::Intersects, property, geometry, None)
    }

    fn overlaps(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<F::Node> {
        self.spatial(OperatorTag::Overlaps, property, geometry, None)
    }

    fn touches(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<F::Node> {
        self.spatial(OperatorTag::Touches, property, geometry, None)
    }

    fn within(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<F::Node> {
        self.spatial(OperatorTag::Within, property, geometry, None)
    }

    fn nearest_neighbor(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<F::Node> {
        self.spatial(OperatorTag::NearestNeighbor, property, geometry, None)
    }

    fn after(&mut self, property: &str, instant: &DateTime<Utc>) -> DelegateResult<F::Node> {
        self.factory.temporal(
            OperatorTag::After,
            property,
            TemporalOperand::Instant(*instant),
        )
    }

    fn before(&mut self, property: &str, instant: &DateTime<Utc>) -> DelegateResult<F::Node> {
        self.factory.temporal(
            OperatorTag::Before,
            property,
            TemporalOperand::Instant(*instant),
        )
    }

    fn during(&mut self, property: &str, range: &DateRange) -> DelegateResult<F::Node> {
        self.factory
            .temporal(OperatorTag::During, property, TemporalOperand::Period(*range))
    }

    fn relative(&mut self, property: &str, duration: &Duration) -> DelegateResult<F::Node> {
        self.factory.temporal(
            OperatorTag::Relative,
            property,
            TemporalOperand::Duration(*duration),
        )
    }

    fn xpath_exists(&mut self, xpath: &str) -> DelegateResult<F::Node> {
        self.factory
            .like(Expression::property(xpath), "*", false)
    }

    fn xpath_is_like(
        &mut self,
        xpath: &str,
        pattern: &str,
        match_case: bool,
    ) -> DelegateResult<F::Node> {
        self.property_is_like(xpath, pattern, match_case)
    }

    fn xpath_is_fuzzy(&mut self, xpath: &str, literal: &Value) -> DelegateResult<F::Node> {
        self.property_is_fuzzy(xpath, literal)
    }

    fn function(
        &mut self,
        call: &FunctionCall,
        literal: &Value,
        comparison: OperatorTag,
        match_case: bool,
    ) -> DelegateResult<F::Node> {
        if !comparison.is_binary_comparison() {
            return Err(DelegateError::malformed(
                OperatorTag::Function,
                format!("{comparison} cannot compare a function result"),
            ));
        }
        self.factory.compare(
            comparison,
            Expression::Function(call.clone()),
            Expression::literal(literal.clone()),
            self.match_case(match_case),
        )
    }
}
