//! Re-emits an adapted filter as flat builder calls.
//!
//! The adapter is post-order while the builder wants scopes opened before
//! their children, so [`EmitDelegate`] composes a [`BuildScript`] per node and
//! the parent wraps its children's scripts in `begin`/`end` steps.

use crate::{builder::FlatFilterBuilder, error::BuildError, target::TreeTarget};
use chrono::{DateTime, Duration, Utc};
use filter_engine::{DelegateError, DelegateResult, FilterDelegate};
use filter_model::{
    DateRange, Distance, Expression, FunctionCall, OperatorTag, Value, Wkt,
};

#[derive(Debug, Clone, PartialEq)]
pub enum BuildStep {
    BeginLogical(OperatorTag),
    BeginTerminal { tag: OperatorTag, match_case: bool },
    BeginFunction(String),
    Property(String),
    Value(Value),
    Distance(Distance),
    End,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BuildScript {
    steps: Vec<BuildStep>,
}

impl BuildScript {
    pub fn steps(&self) -> &[BuildStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Drives `builder` through every step in order.
    pub fn replay<T: TreeTarget>(&self, builder: &mut FlatFilterBuilder<T>) -> Result<(), BuildError> {
        for step in &self.steps {
            match step {
                BuildStep::BeginLogical(tag) => builder.begin_logical(*tag)?,
                BuildStep::BeginTerminal { tag, match_case } => {
                    builder.begin_terminal(*tag, *match_case)?
                }
                BuildStep::BeginFunction(name) => builder.begin_function(name)?,
                BuildStep::Property(name) => builder.property(name)?,
                BuildStep::Value(value) => builder.value(value.clone())?,
                BuildStep::Distance(distance) => builder.distance(*distance)?,
                BuildStep::End => builder.end()?,
            };
        }
        Ok(())
    }

    fn logical(tag: OperatorTag, children: Vec<BuildScript>) -> Self {
        let mut steps = vec![BuildStep::BeginLogical(tag)];
        steps.extend(children.into_iter().flat_map(|child| child.steps));
        steps.push(BuildStep::End);
        Self { steps }
    }

    fn terminal(tag: OperatorTag, match_case: bool, property: &str, values: Vec<Value>) -> Self {
        let mut steps = vec![
            BuildStep::BeginTerminal { tag, match_case },
            BuildStep::Property(property.to_string()),
        ];
        steps.extend(values.into_iter().map(BuildStep::Value));
        steps.push(BuildStep::End);
        Self { steps }
    }

    fn spatial(tag: OperatorTag, property: &str, geometry: &Wkt, distance: Option<&Distance>) -> Self {
        let mut steps = vec![
            BuildStep::BeginTerminal {
                tag,
                match_case: true,
            },
            BuildStep::Property(property.to_string()),
            BuildStep::Value(Value::from(geometry.as_str())),
        ];
        if let Some(distance) = distance {
            steps.push(BuildStep::Distance(*distance));
        }
        steps.push(BuildStep::End);
        Self { steps }
    }

    fn push_expression(&mut self, expr: &Expression) {
        match expr {
            Expression::Property { name } => self.steps.push(BuildStep::Property(name.clone())),
            Expression::Literal { value } => self.steps.push(BuildStep::Value(value.clone())),
            Expression::Function(call) => self.push_function(call),
        }
    }

    fn push_function(&mut self, call: &FunctionCall) {
        self.steps.push(BuildStep::BeginFunction(call.name.clone()));
        for arg in &call.args {
            self.push_expression(arg);
        }
        self.steps.push(BuildStep::End);
    }
}

/// Delegate producing the builder calls that reconstruct each node.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmitDelegate;

impl EmitDelegate {
    fn compare(
        tag: OperatorTag,
        property: &str,
        literal: &Value,
        match_case: bool,
    ) -> DelegateResult<BuildScript> {
        Ok(BuildScript::terminal(
            tag,
            match_case,
            property,
            vec![literal.clone()],
        ))
    }
}

impl FilterDelegate for EmitDelegate {
    type Output = BuildScript;

    fn name(&self) -> &str {
        "EmitDelegate"
    }

    fn and(&mut self, operands: Vec<BuildScript>) -> DelegateResult<BuildScript> {
        Ok(BuildScript::logical(OperatorTag::And, operands))
    }

    fn or(&mut self, operands: Vec<BuildScript>) -> DelegateResult<BuildScript> {
        Ok(BuildScript::logical(OperatorTag::Or, operands))
    }

    fn not(&mut self, operand: BuildScript) -> DelegateResult<BuildScript> {
        Ok(BuildScript::logical(OperatorTag::Not, vec![operand]))
    }

    fn include(&mut self) -> DelegateResult<BuildScript> {
        Err(DelegateError::unsupported(OperatorTag::Include, self.name()))
    }

    fn exclude(&mut self) -> DelegateResult<BuildScript> {
        Err(DelegateError::unsupported(OperatorTag::Exclude, self.name()))
    }

    fn property_is_equal_to(
        &mut self,
        property: &str,
        literal: &Value,
        match_case: bool,
    ) -> DelegateResult<BuildScript> {
        Self::compare(OperatorTag::IsEqualTo, property, literal, match_case)
    }

    fn property_is_not_equal_to(
        &mut self,
        property: &str,
        literal: &Value,
        match_case: bool,
    ) -> DelegateResult<BuildScript> {
        Self::compare(OperatorTag::IsNotEqualTo, property, literal, match_case)
    }

    fn property_is_greater_than(
        &mut self,
        property: &str,
        literal: &Value,
        match_case: bool,
    ) -> DelegateResult<BuildScript> {
        Self::compare(OperatorTag::IsGreaterThan, property, literal, match_case)
    }

    fn property_is_greater_than_or_equal_to(
        &mut self,
        property: &str,
        literal: &Value,
        match_case: bool,
    ) -> DelegateResult<BuildScript> {
        Self::compare(OperatorTag::IsGreaterThanOrEqualTo, property, literal, match_case)
    }

    fn property_is_less_than(
        &mut self,
        property: &str,
        literal: &Value,
        match_case: bool,
    ) -> DelegateResult<BuildScript> {
        Self::compare(OperatorTag::IsLessThan, property, literal, match_case)
    }

    fn property_is_less_than_or_equal_to(
        &mut self,
        property: &str,
        literal: &Value,
        match_case: bool,
    ) -> DelegateResult<BuildScript> {
        Self::compare(OperatorTag::IsLessThanOrEqualTo, property, literal, match_case)
    }

    fn property_is_between(
        &mut self,
        property: &str,
        lower: &Value,
        upper: &Value,
    ) -> DelegateResult<BuildScript> {
        Ok(BuildScript::terminal(
            OperatorTag::IsBetween,
            true,
            property,
            vec![lower.clone(), upper.clone()],
        ))
    }

    fn property_is_like(
        &mut self,
        property: &str,
        pattern: &str,
        match_case: bool,
    ) -> DelegateResult<BuildScript> {
        Ok(BuildScript::terminal(
            OperatorTag::IsLike,
            match_case,
            property,
            vec![Value::from(pattern)],
        ))
    }

    fn property_is_fuzzy(&mut self, property: &str, literal: &Value) -> DelegateResult<BuildScript> {
        Self::compare(OperatorTag::IsFuzzy, property, literal, false)
    }

    fn property_is_null(&mut self, property: &str) -> DelegateResult<BuildScript> {
        Ok(BuildScript::terminal(OperatorTag::IsNull, true, property, vec![]))
    }

    fn beyond(
        &mut self,
        property: &str,
        geometry: &Wkt,
        distance: &Distance,
    ) -> DelegateResult<BuildScript> {
        Ok(BuildScript::spatial(OperatorTag::Beyond, property, geometry, Some(distance)))
    }

    fn contains(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<BuildScript> {
        Ok(BuildScript::spatial(OperatorTag::Contains, property, geometry, None))
    }

    fn crosses(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<BuildScript> {
        Ok(BuildScript::spatial(OperatorTag::Crosses, property, geometry, None))
    }

    fn disjoint(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<BuildScript> {
        Ok(BuildScript::spatial(OperatorTag::Disjoint, property, geometry, None))
    }

    fn dwithin(
        &mut self,
        property: &str,
        geometry: &Wkt,
        distance: &Distance,
    ) -> DelegateResult<BuildScript> {
        Ok(BuildScript::spatial(OperatorTag::DWithin, property, geometry, Some(distance)))
    }

    fn intersects(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<BuildScript> {
        Ok(BuildScript::spatial(OperatorTag::Intersects, property, geometry, None))
    }

    fn overlaps(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<BuildScript> {
        Ok(BuildScript::spatial(OperatorTag::Overlaps, property, geometry, None))
    }

    fn touches(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<BuildScript> {
        Ok(BuildScript::spatial(OperatorTag::Touches, property, geometry, None))
    }

    fn within(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<BuildScript> {
        Ok(BuildScript::spatial(OperatorTag::Within, property, geometry, None))
    }

    fn nearest_neighbor(&mut self, property: &str, geometry: &Wkt) -> DelegateResult<BuildScript> {
        Ok(BuildScript::spatial(OperatorTag::NearestNeighbor, property, geometry, None))
    }

    fn after(&mut self, property: &str, instant: &DateTime<Utc>) -> DelegateResult<BuildScript> {
        Ok(BuildScript::terminal(
            OperatorTag::After,
            true,
            property,
            vec![Value::Date(*instant)],
        ))
    }

    fn before(&mut self, property: &str, instant: &DateTime<Utc>) -> DelegateResult<BuildScript> {
        Ok(BuildScript::terminal(
            OperatorTag::Before,
            true,
            property,
            vec![Value::Date(*instant)],
        ))
    }

    fn during(&mut self, property: &str, range: &DateRange) -> DelegateResult<BuildScript> {
        Ok(BuildScript::terminal(
            OperatorTag::During,
            true,
            property,
            vec![Value::DateRange(*range)],
        ))
    }

    fn relative(&mut self, property: &str, duration: &Duration) -> DelegateResult<BuildScript> {
        Ok(BuildScript::terminal(
            OperatorTag::Relative,
            true,
            property,
            vec![Value::Long(duration.num_milliseconds())],
        ))
    }

    fn xpath_exists(&mut self, xpath: &str) -> DelegateResult<BuildScript> {
        Ok(BuildScript::terminal(OperatorTag::XPathExists, false, xpath, vec![]))
    }

    fn xpath_is_like(
        &mut self,
        xpath: &str,
        pattern: &str,
        match_case: bool,
    ) -> DelegateResult<BuildScript> {
        Ok(BuildScript::terminal(
            OperatorTag::XPathIsLike,
            match_case,
            xpath,
            vec![Value::from(pattern)],
        ))
    }

    fn xpath_is_fuzzy(&mut self, xpath: &str, literal: &Value) -> DelegateResult<BuildScript> {
        Self::compare(OperatorTag::XPathIsFuzzy, xpath, literal, false)
    }

    fn function(
        &mut self,
        call: &FunctionCall,
        literal: &Value,
        comparison: OperatorTag,
        match_case: bool,
    ) -> DelegateResult<BuildScript> {
        let mut script = BuildScript {
            steps: vec![BuildStep::BeginTerminal {
                tag: comparison,
                match_case,
            }],
        };
        script.push_function(call);
        script.steps.push(BuildStep::Value(literal.clone()));
        script.steps.push(BuildStep::End);
        Ok(script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::JsonTarget;
    use filter_engine::FilterAdapter;
    use filter_model::Filter;
    use serde_json::json;

    fn script(filter: &Filter) -> BuildScript {
        FilterAdapter::new().adapt(filter, &mut EmitDelegate).unwrap()
    }

    #[test]
    fn test_scopes_wrap_children() {
        let filter = Filter::not(Filter::is_null("a"));
        assert_eq!(
            script(&filter).steps(),
            &[
                BuildStep::BeginLogical(OperatorTag::Not),
                BuildStep::BeginTerminal {
                    tag: OperatorTag::IsNull,
                    match_case: true,
                },
                BuildStep::Property("a".to_string()),
                BuildStep::End,
                BuildStep::End,
            ]
        );
    }

    #[test]
    fn test_function_steps() {
        let filter = Filter::Compare {
            op: OperatorTag::IsEqualTo,
            left: Expression::function(
                "f",
                vec![Expression::property("a"), Expression::literal(1)],
            ),
            right: Expression::literal("x"),
            match_case: true,
        };
        let mut builder = FlatFilterBuilder::new(JsonTarget);
        script(&filter).replay(&mut builder).unwrap();
        let root = builder.result().unwrap();
        assert_eq!(root["type"], "IS_EQUAL_TO");
        assert_eq!(root["property"]["args"].as_array().unwrap().len(), 2);
        assert_eq!(root["value"], json!({"type": "LITERAL", "value": "x"}));
    }

    #[test]
    fn test_function_keeps_match_case() {
        let filter = Filter::Compare {
            op: OperatorTag::IsEqualTo,
            left: Expression::function("lower", vec![Expression::property("title")]),
            right: Expression::literal("foo"),
            match_case: false,
        };
        assert_eq!(
            script(&filter).steps()[0],
            BuildStep::BeginTerminal {
                tag: OperatorTag::IsEqualTo,
                match_case: false,
            }
        );
    }

    #[test]
    fn test_constants_not_emitted() {
        let err = FilterAdapter::new()
            .adapt(&Filter::Include, &mut EmitDelegate)
            .unwrap_err();
        assert!(err.is_unsupported());
    }
}
