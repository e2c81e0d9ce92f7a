//! The visitor target driven by [`crate::FilterAdapter`].

use crate::error::DelegateResult;
use chrono::{DateTime, Duration, Utc};
use filter_model::{DateRange, Distance, FunctionCall, OperatorTag, Value, Wkt};

/// One method per concrete operator. The adapter computes the results of all
/// children before invoking the parent's method, so composite methods receive
/// already-built operands in tree order.
///
/// Implementations that only care about operator families should build on
/// [`crate::Rollup`] instead of implementing every method.
pub trait FilterDelegate {
    type Output;

    /// Identifies the delegate in error messages.
    fn name(&self) -> &str;

    // Logical
    fn and(&mut self, operands: Vec<Self::Output>) -> DelegateResult<Self::Output>;
    fn or(&mut self, operands: Vec<Self::Output>) -> DelegateResult<Self::Output>;
    fn not(&mut self, operand: Self::Output) -> DelegateResult<Self::Output>;
    fn include(&mut self) -> DelegateResult<Self::Output>;
    fn exclude(&mut self) -> DelegateResult<Self::Output>;

    // Comparison
    fn property_is_equal_to(
        &mut self,
        property: &str,
        literal: &Value,
        match_case: bool,
    ) -> DelegateResult<Self::Output>;
    fn property_is_not_equal_to(
        &mut self,
        property: &str,
        literal: &Value,
        match_case: bool,
    ) -> DelegateResult<Self::Output>;
    fn property_is_greater_than(
        &mut self,
        property: &str,
        literal: &Value,
        match_case: bool,
    ) -> DelegateResult<Self::Output>;
    fn property_is_greater_than_or_equal_to(
        &mut self,
        property: &str,
        literal: &Value,
        match_case: bool,
    ) -> DelegateResult<Self::Output>;
    fn property_is_less_than(
        &mut self,
        property: &str,
        literal: &Value,
        match_case: bool,
    ) -> DelegateResult<Self::Output>;
    fn property_is_less_than_or_equal_to(
        &mut self,
        property: &str,
        literal: &Value,
        match_case: bool,
    ) -> DelegateResult<Self::Output>;
    fn property_is_between(
        &mut self,
        property: &str,
        lower: &Value,
        upper: &Value,
    ) -> DelegateResult<Self::Output>;
    /// `pattern` uses `*` for any run, `?` for one character and `\` as escape.
    fn property_is_like(
        &mut self,
        property: &str,
        pattern: &str,
        match_case: bool,
    ) -> DelegateResult<Self::Output>;
    fn property_is_fuzzy(&mut self, property: &str, literal: &Value)
    -> DelegateResult<Self::Output>;
    fn property_is_null(&mut self, property: &str) -> DelegateResult<Self::Output>;

    // Spatial
    fn beyond(
        &mut self,
        property: &str,
        geometry: &Wkt,
        distance: &Distance,
    ) -> DelegateResult<Self::Output>;
    fn contains(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<Self::Output>;
    fn crosses(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<Self::Output>;
    fn disjoint(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<Self::Output>;
    fn dwithin(
        &mut self,
        property: &str,
        geometry: &Wkt,
        distance: &Distance,
    ) -> DelegateResult<Self::Output>;
    fn intersects(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<Self::Output>;
    fn overlaps(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<Self::Output>;
    fn touches(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<Self::Output>;
    fn within(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<Self::Output>;
    fn nearest_neighbor(&mut self, property: &str, geometry: &Wkt)
    -> DelegateResult<Self::Output>;

    // Temporal
    fn after(&mut self, property: &str, instant: &DateTime<Utc>) -> DelegateResult<Self::Output>;
    fn before(&mut self, property: &str, instant: &DateTime<Utc>)
    -> DelegateResult<Self::Output>;
    fn during(&mut self, property: &str, range: &DateRange) -> DelegateResult<Self::Output>;
    /// Matches values within `duration` before now.
    fn relative(&mut self, property: &str, duration: &Duration) -> DelegateResult<Self::Output>;

    // XPath
    fn xpath_exists(&mut self, xpath: &str) -> DelegateResult<Self::Output>;
    fn xpath_is_like(
        &mut self,
        xpath: &str,
        pattern: &str,
        match_case: bool,
    ) -> DelegateResult<Self::Output>;
    fn xpath_is_fuzzy(&mut self, xpath: &str, literal: &Value) -> DelegateResult<Self::Output>;

    // Function
    /// `call <comparison> literal`, e.g. `lower(title) = 'foo'`.
    fn function(
        &mut self,
        call: &FunctionCall,
        literal: &Value,
        comparison: OperatorTag,
        match_case: bool,
    ) -> DelegateResult<Self::Output>;
}
