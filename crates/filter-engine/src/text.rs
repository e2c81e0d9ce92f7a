//! Renders a filter tree as a deterministic one-line description.
//!
//! The output is `TAG(arg, ...)` with operands in tree order, which makes it
//! handy for logging and for comparing two trees regardless of their
//! representation.

use crate::{delegate::FilterDelegate, error::DelegateResult};
use chrono::{DateTime, Duration, Utc};
use filter_model::{DateRange, Distance, FunctionCall, OperatorTag, Value, Wkt};

#[derive(Debug, Clone, Copy, Default)]
pub struct TextDelegate;

impl TextDelegate {
    pub fn new() -> Self {
        Self
    }
}

fn render(tag: OperatorTag, args: &[String]) -> String {
    format!("{}({})", tag, args.join(", "))
}

fn with_case(tag: OperatorTag, property: &str, operand: String, match_case: bool) -> String {
    render(
        tag,
        &[
            property.to_string(),
            operand,
            format!("matchCase={match_case}"),
        ],
    )
}

fn quoted(pattern: &str) -> String {
    Value::from(pattern).to_string()
}

fn spatial(tag: OperatorTag, property: &str, geometry: &Wkt, distance: Option<&Distance>) -> String {
    let mut args = vec![property.to_string(), geometry.to_string()];
    if let Some(distance) = distance {
        args.push(distance.to_string());
    }
    render(tag, &args)
}

fn instant(tag: OperatorTag, property: &str, instant: &DateTime<Utc>) -> String {
    render(tag, &[property.to_string(), Value::Date(*instant).to_string()])
}

impl FilterDelegate for TextDelegate {
    type Output = String;

    fn name(&self) -> &str {
        "TextDelegate"
    }

    fn and(&mut self, operands: Vec<String>) -> DelegateResult<String> {
        Ok(render(OperatorTag::And, &operands))
    }

    fn or(&mut self, operands: Vec<String>) -> DelegateResult<String> {
        Ok(render(OperatorTag::Or, &operands))
    }

    fn not(&mut self, operand: String) -> DelegateResult<String> {
        Ok(render(OperatorTag::Not, &[operand]))
    }

    fn include(&mut self) -> DelegateResult<String> {
        Ok(OperatorTag::Include.to_string())
    }

    fn exclude(&mut self) -> DelegateResult<String> {
        Ok(OperatorTag::Exclude.to_string())
    }

    fn property_is_equal_to(
        &mut self,
        property: &str,
        literal: &Value,
        match_case: bool,
    ) -> DelegateResult<String> {
        Ok(with_case(
            OperatorTag::IsEqualTo,
            property,
            literal.to_string(),
            match_case,
        ))
    }

    fn property_is_not_equal_to(
        &mut self,
        property: &str,
        literal: &Value,
        match_case: bool,
    ) -> DelegateResult<String> {
        Ok(with_case(
            OperatorTag::IsNotEqualTo,
            property,
            literal.to_string(),
            match_case,
        ))
    }

    fn property_is_greater_than(
        &mut self,
        property: &str,
        literal: &Value,
        _match_case: bool,
    ) -> DelegateResult<String> {
        Ok(render(
            OperatorTag::IsGreaterThan,
            &[property.to_string(), literal.to_string()],
        ))
    }

    fn property_is_greater_than_or_equal_to(
        &mut self,
        property: &str,
        literal: &Value,
        _match_case: bool,
    ) -> DelegateResult<String> {
        Ok(render(
            OperatorTag::IsGreaterThanOrEqualTo,
            &[property.to_string(), literal.to_string()],
        ))
    }

    fn property_is_less_than(
        &mut self,
        property: &str,
        literal: &Value,
        _match_case: bool,
    ) -> DelegateResult<String> {
        Ok(render(
            OperatorTag::IsLessThan,
            &[property.to_string(), literal.to_string()],
        ))
    }

    fn property_is_less_than_or_equal_to(
        &mut self,
        property: &str,
        literal: &Value,
        _match_case: bool,
    ) -> DelegateResult<String> {
        Ok(render(
            OperatorTag::IsLessThanOrEqualTo,
            &[property.to_string(), literal.to_string()],
        ))
    }

    fn property_is_between(
        &mut self,
        property: &str,
        lower: &Value,
        upper: &Value,
    ) -> DelegateResult<String> {
        Ok(render(
            OperatorTag::IsBetween,
            &[property.to_string(), lower.to_string(), upper.to_string()],
        ))
    }

    fn property_is_like(
        &mut self,
        property: &str,
        pattern: &str,
        match_case: bool,
    ) -> DelegateResult<String> {
        Ok(with_case(
            OperatorTag::IsLike,
            property,
            quoted(pattern),
            match_case,
        ))
    }

    fn property_is_fuzzy(&mut self, property: &str, literal: &Value) -> DelegateResult<String> {
        Ok(render(
            OperatorTag::IsFuzzy,
            &[property.to_string(), literal.to_string()],
        ))
    }

    fn property_is_null(&mut self, property: &str) -> DelegateResult<String> {
        Ok(render(OperatorTag::IsNull, &[property.to_string()]))
    }

    fn beyond(&mut self, property: &str, geometry: &Wkt, distance: &Distance) -> DelegateResult<String> {
        Ok(spatial(OperatorTag::Beyond, property, geometry, Some(distance)))
    }

    fn contains(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<String> {
        Ok(spatial(OperatorTag::Contains, property, geometry, None))
    }

    fn crosses(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<String> {
        Ok(spatial(OperatorTag::Crosses, property, geometry, None))
    }

    fn disjoint(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<String> {
        Ok(spatial(OperatorTag::Disjoint, property, geometry, None))
    }

    fn dwithin(&mut self, property: &str, geometry: &Wkt, distance: &Distance) -> DelegateResult<String> {
        Ok(spatial(OperatorTag::DWithin, property, geometry, Some(distance)))
    }

    fn intersects(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<String> {
        Ok(spatial(OperatorTag::Intersects, property, geometry, None))
    }

    fn overlaps(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<String> {
        Ok(spatial(OperatorTag::Overlaps, property, geometry, None))
    }

    fn touches(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<String> {
        Ok(spatial(OperatorTag::Touches, property, geometry, None))
    }

    fn within(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<String> {
        Ok(spatial(OperatorTag::Within, property, geometry, None))
    }

    fn nearest_neighbor(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<String> {
        Ok(spatial(OperatorTag::NearestNeighbor, property, geometry, None))
    }

    fn after(&mut self, property: &str, at: &DateTime<Utc>) -> DelegateResult<String> {
        Ok(instant(OperatorTag::After, property, at))
    }

    fn before(&mut self, property: &str, at: &DateTime<Utc>) -> DelegateResult<String> {
        Ok(instant(OperatorTag::Before, property, at))
    }

    fn during(&mut self, property: &str, range: &DateRange) -> DelegateResult<String> {
        Ok(render(
            OperatorTag::During,
            &[property.to_string(), range.to_string()],
        ))
    }

    fn relative(&mut self, property: &str, duration: &Duration) -> DelegateResult<String> {
        Ok(render(
            OperatorTag::Relative,
            &[property.to_string(), duration.to_string()],
        ))
    }

    fn xpath_exists(&mut self, xpath: &str) -> DelegateResult<String> {
        Ok(render(OperatorTag::XPathExists, &[xpath.to_string()]))
    }

    fn xpath_is_like(&mut self, xpath: &str, pattern: &str, match_case: bool) -> DelegateResult<String> {
        Ok(with_case(
            OperatorTag::XPathIsLike,
            xpath,
            quoted(pattern),
            match_case,
        ))
    }

    fn xpath_is_fuzzy(&mut self, xpath: &str, literal: &Value) -> DelegateResult<String> {
        Ok(render(
            OperatorTag::XPathIsFuzzy,
            &[xpath.to_string(), literal.to_string()],
        ))
    }

    fn function(
        &mut self,
        call: &FunctionCall,
        literal: &Value,
        comparison: OperatorTag,
        match_case: bool,
    ) -> DelegateResult<String> {
        let mut args = vec![comparison.to_string(), call.to_string(), literal.to_string()];
        if matches!(comparison, OperatorTag::IsEqualTo | OperatorTag::IsNotEqualTo) {
            args.push(format!("matchCase={match_case}"));
        }
        Ok(render(OperatorTag::Function, &args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::FilterAdapter;
    use chrono::TimeZone;
    use filter_model::{DistanceUnit, Expression, Filter, TemporalOperand};

    fn text(filter: &Filter) -> String {
        FilterAdapter::new().adapt(filter, &mut TextDelegate).unwrap()
    }

    #[test]
    fn test_logical_and_comparison() {
        let filter = Filter::and(vec![
            Filter::equal_to("title", "Foo", false),
            Filter::not(Filter::is_null("owner")),
            Filter::between("size", 1, 10),
        ]);
        assert_eq!(
            text(&filter),
            "AND(IS_EQUAL_TO(title, 'Foo', matchCase=false), NOT(IS_NULL(owner)), IS_BETWEEN(size, 1, 10))"
        );
        assert_eq!(text(&Filter::Include), "INCLUDE");
    }

    #[test]
    fn test_spatial_and_temporal() {
        let filter = Filter::buffered(
            OperatorTag::DWithin,
            "location",
            Wkt::parse("POINT (1 2)").unwrap(),
            Distance::new(10.0, DistanceUnit::Meters),
        );
        assert_eq!(text(&filter), "DWITHIN(location, POINT (1 2), 10m)");

        let filter = Filter::temporal(
            OperatorTag::Relative,
            "modified",
            TemporalOperand::Duration(Duration::seconds(60)),
        );
        assert_eq!(text(&filter), "RELATIVE(modified, PT60S)");

        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let filter = Filter::temporal(OperatorTag::Before, "created", TemporalOperand::Instant(at));
        assert_eq!(text(&filter), "BEFORE(created, '2024-03-01T12:00:00+00:00')");
    }

    #[test]
    fn test_function_and_xpath() {
        let filter = Filter::Compare {
            op: OperatorTag::IsEqualTo,
            left: Expression::function("lower", vec![Expression::property("title")]),
            right: Expression::literal("foo"),
            match_case: true,
        };
        assert_eq!(
            text(&filter),
            "FUNCTION(IS_EQUAL_TO, lower(title), 'foo', matchCase=true)"
        );

        let filter = Filter::Compare {
            op: OperatorTag::IsNotEqualTo,
            left: Expression::function("upper", vec![Expression::property("title")]),
            right: Expression::literal("FOO"),
            match_case: false,
        };
        assert_eq!(
            text(&filter),
            "FUNCTION(IS_NOT_EQUAL_TO, upper(title), 'FOO', matchCase=false)"
        );

        let filter = Filter::Compare {
            op: OperatorTag::IsGreaterThan,
            left: Expression::function("length", vec![Expression::property("title")]),
            right: Expression::literal(3),
            match_case: true,
        };
        assert_eq!(text(&filter), "FUNCTION(IS_GREATER_THAN, length(title), 3)");

        assert_eq!(
            text(&Filter::like("/metacard/title", "*", true)),
            "XPATH_EXISTS(/metacard/title)"
        );
        assert_eq!(
            text(&Filter::like("/metacard/title", "fo*", true)),
            "XPATH_IS_LIKE(/metacard/title, 'fo*', matchCase=true)"
        );
    }
}
