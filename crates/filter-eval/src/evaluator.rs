//! Boolean evaluation of a filter against a [`Record`].

use crate::{
    error::Result,
    functions::FunctionRegistry,
    like,
    record::Record,
};
use chrono::{DateTime, Utc};
use filter_engine::{
    AdapterError, DelegateError, DelegateResult, FamilyHooks, FilterAdapter, Invocation, Rollup,
};
use filter_model::{
    Expression, FilterNode, FunctionCall, LiteralType, OperatorTag, TemporalOperand, Value,
};
use std::cmp::Ordering;
use tracing::trace;

/// Largest edit distance at which `IS_FUZZY` still matches.
const FUZZY_DISTANCE: usize = 2;

/// Family hooks that answer every predicate for one record.
///
/// Missing and null properties fail every predicate except `IS_NULL`.
/// Spatial predicates are not evaluated.
pub struct RecordEvaluator<'r> {
    record: &'r Record,
    functions: FunctionRegistry,
    now: DateTime<Utc>,
}

pub type EvalDelegate<'r> = Rollup<RecordEvaluator<'r>>;

impl<'r> RecordEvaluator<'r> {
    pub fn new(record: &'r Record) -> Self {
        Self {
            record,
            functions: FunctionRegistry::new(),
            now: Utc::now(),
        }
    }

    pub fn with_functions(mut self, functions: FunctionRegistry) -> Self {
        self.functions = functions;
        self
    }

    /// Reference instant for `RELATIVE`.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Wraps the hooks in a delegate whose equality, LIKE and function
    /// comparisons honour match-case.
    pub fn into_delegate(self) -> EvalDelegate<'r> {
        Rollup::new(self)
            .with_override(OperatorTag::IsEqualTo, case_aware_equal_to)
            .with_override(OperatorTag::IsNotEqualTo, case_aware_not_equal_to)
            .with_override(OperatorTag::IsLike, case_aware_like)
            .with_override(OperatorTag::XPathIsLike, case_aware_like)
            .with_override(OperatorTag::Function, case_aware_function)
    }

    fn field(&self, property: &str) -> Option<&'r Value> {
        self.record.get(property).filter(|v| !v.is_null())
    }

    fn evaluate_expression(&self, expr: &Expression) -> Result<Value> {
        match expr {
            Expression::Property { name } => Ok(self.record.get(name).cloned().unwrap_or(Value::Null)),
            Expression::Literal { value } => Ok(value.clone()),
            Expression::Function(call) => self.evaluate_call(call),
        }
    }

    fn evaluate_call(&self, call: &FunctionCall) -> Result<Value> {
        let args = call
            .args
            .iter()
            .map(|arg| self.evaluate_expression(arg))
            .collect::<Result<Vec<_>>>()?;
        self.functions.call(&call.name, &args)
    }

    fn function_matches(
        &self,
        call: &FunctionCall,
        literal: &Value,
        comparison: OperatorTag,
        match_case: bool,
    ) -> DelegateResult<bool> {
        let result = self
            .evaluate_call(call)
            .map_err(|e| e.into_delegate_error(OperatorTag::Function, self.name()))?;
        trace!("{} evaluated to {:?}", call, result);
        Ok(match comparison {
            OperatorTag::IsEqualTo => equals(&result, literal, match_case),
            OperatorTag::IsNotEqualTo => !equals(&result, literal, match_case),
            ordering => compare(ordering, &result, literal),
        })
    }
}

fn equals(actual: &Value, expected: &Value, match_case: bool) -> bool {
    match (actual, expected) {
        (Value::String(a), Value::String(b)) if !match_case => a.to_lowercase() == b.to_lowercase(),
        _ => actual.equal(expected),
    }
}

fn compare(tag: OperatorTag, actual: &Value, literal: &Value) -> bool {
    let Some(ordering) = actual.compare(literal) else {
        return false;
    };
    match tag {
        OperatorTag::IsEqualTo => ordering == Ordering::Equal,
        OperatorTag::IsNotEqualTo => ordering != Ordering::Equal,
        OperatorTag::IsGreaterThan => ordering == Ordering::Greater,
        OperatorTag::IsGreaterThanOrEqualTo => ordering != Ordering::Less,
        OperatorTag::IsLessThan => ordering == Ordering::Less,
        OperatorTag::IsLessThanOrEqualTo => ordering != Ordering::Greater,
        _ => false,
    }
}

fn fuzzy(actual: &Value, literal: &Value) -> bool {
    match (actual.as_str(), literal.as_str()) {
        (Some(a), Some(b)) => edit_distance(&a.to_lowercase(), &b.to_lowercase()) <= FUZZY_DISTANCE,
        _ => false,
    }
}

fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut current = vec![i + 1; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != *cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        previous = current;
    }
    previous[b.len()]
}

fn like_value(actual: &Value, pattern: &str, match_case: bool) -> bool {
    actual
        .as_str()
        .is_some_and(|text| like::matches(pattern, text, match_case))
}

fn equality_operands<'a>(
    tag: OperatorTag,
    invocation: Invocation<'a, bool>,
) -> DelegateResult<(&'a str, &'a Value, bool)> {
    match invocation {
        Invocation::Comparison {
            property,
            literal,
            match_case,
        } => Ok((property, literal, match_case.unwrap_or(true))),
        _ => Err(DelegateError::malformed(tag, "expected a comparison invocation")),
    }
}

fn case_aware_equal_to(
    hooks: &mut RecordEvaluator<'_>,
    invocation: Invocation<'_, bool>,
) -> DelegateResult<bool> {
    let (property, literal, match_case) = equality_operands(OperatorTag::IsEqualTo, invocation)?;
    Ok(hooks
        .field(property)
        .is_some_and(|actual| equals(actual, literal, match_case)))
}

fn case_aware_not_equal_to(
    hooks: &mut RecordEvaluator<'_>,
    invocation: Invocation<'_, bool>,
) -> DelegateResult<bool> {
    let (property, literal, match_case) =
        equality_operands(OperatorTag::IsNotEqualTo, invocation)?;
    Ok(hooks
        .field(property)
        .is_some_and(|actual| !equals(actual, literal, match_case)))
}

fn case_aware_like(
    hooks: &mut RecordEvaluator<'_>,
    invocation: Invocation<'_, bool>,
) -> DelegateResult<bool> {
    match invocation {
        Invocation::Like {
            property,
            pattern,
            match_case,
        } => Ok(hooks
            .field(property)
            .is_some_and(|actual| like_value(actual, pattern, match_case))),
        Invocation::XPath {
            xpath,
            literal: Some(Value::String(pattern)),
            match_case,
        } => Ok(hooks
            .record
            .resolve_path(xpath)
            .is_some_and(|actual| like_value(&actual, pattern, match_case.unwrap_or(true)))),
        _ => Err(DelegateError::malformed(
            OperatorTag::IsLike,
            "expected a LIKE invocation",
        )),
    }
}

fn case_aware_function(
    hooks: &mut RecordEvaluator<'_>,
    invocation: Invocation<'_, bool>,
) -> DelegateResult<bool> {
    match invocation {
        Invocation::Function {
            call,
            literal,
            comparison,
            match_case,
        } => hooks.function_matches(call, literal, comparison, match_case),
        _ => Err(DelegateError::malformed(
            OperatorTag::Function,
            "expected a function invocation",
        )),
    }
}

impl FamilyHooks for RecordEvaluator<'_> {
    type Output = bool;

    fn name(&self) -> &str {
        "EvalDelegate"
    }

    fn on_logical(&mut self, operands: Vec<bool>, tag: OperatorTag) -> DelegateResult<bool> {
        match tag {
            OperatorTag::And => Ok(operands.iter().all(|b| *b)),
            OperatorTag::Or => Ok(operands.iter().any(|b| *b)),
            OperatorTag::Not => Ok(!operands.first().copied().unwrap_or(false)),
            OperatorTag::Include => Ok(true),
            OperatorTag::Exclude => Ok(false),
            other => self.on_default(other),
        }
    }

    fn on_comparison(
        &mut self,
        property: &str,
        literals: &[&Value],
        _literal_type: LiteralType,
        tag: OperatorTag,
    ) -> DelegateResult<bool> {
        let actual = self.field(property);
        trace!("Evaluating {} on {} = {:?}", tag, property, actual);

        if tag == OperatorTag::IsNull {
            return Ok(actual.is_none());
        }
        let Some(actual) = actual else {
            return Ok(false);
        };

        match (tag, literals) {
            (OperatorTag::IsBetween, [lower, upper]) => Ok(compare(
                OperatorTag::IsGreaterThanOrEqualTo,
                actual,
                lower,
            ) && compare(
                OperatorTag::IsLessThanOrEqualTo,
                actual,
                upper,
            )),
            (OperatorTag::IsLike, [pattern]) => Ok(pattern
                .as_str()
                .is_some_and(|pattern| like_value(actual, pattern, true))),
            (OperatorTag::IsFuzzy, [literal]) => Ok(fuzzy(actual, literal)),
            (OperatorTag::IsEqualTo, [literal]) => Ok(equals(actual, literal, true)),
            (OperatorTag::IsNotEqualTo, [literal]) => Ok(!equals(actual, literal, true)),
            (tag, [literal]) if tag.is_ordering() => Ok(compare(tag, actual, literal)),
            (tag, _) => Err(DelegateError::malformed(
                tag,
                format!("unexpected operand count {}", literals.len()),
            )),
        }
    }

    fn on_temporal(
        &mut self,
        property: &str,
        operand: &TemporalOperand,
        tag: OperatorTag,
    ) -> DelegateResult<bool> {
        let Some(actual) = self.field(property).and_then(Value::as_date) else {
            return Ok(false);
        };
        match (tag, operand) {
            (OperatorTag::After, TemporalOperand::Instant(at)) => Ok(actual > at),
            (OperatorTag::Before, TemporalOperand::Instant(at)) => Ok(actual < at),
            (OperatorTag::During, TemporalOperand::Period(range)) => Ok(range.contains(actual)),
            (OperatorTag::Relative, TemporalOperand::Duration(window)) => {
                Ok(*actual <= self.now && *actual >= self.now - *window)
            }
            (tag, operand) => Err(DelegateError::incompatible(tag, operand.kind_name())),
        }
    }

    fn on_xpath(
        &mut self,
        xpath: &str,
        literal: Option<&Value>,
        tag: OperatorTag,
    ) -> DelegateResult<bool> {
        let resolved = self.record.resolve_path(xpath).filter(|v| !v.is_null());
        match (tag, literal) {
            (OperatorTag::XPathExists, _) => Ok(resolved.is_some()),
            (OperatorTag::XPathIsFuzzy, Some(literal)) => {
                Ok(resolved.is_some_and(|actual| fuzzy(&actual, literal)))
            }
            (tag, _) => self.on_default(tag),
        }
    }

    fn on_function(
        &mut self,
        call: &FunctionCall,
        literal: &Value,
        _literal_type: LiteralType,
        comparison: OperatorTag,
    ) -> DelegateResult<bool> {
        self.function_matches(call, literal, comparison, true)
    }
}

/// Evaluates `node` against `record` with the default function set.
pub fn evaluate<N>(
    adapter: &FilterAdapter,
    node: &N,
    record: &Record,
) -> std::result::Result<bool, AdapterError>
where
    N: FilterNode + ?Sized,
{
    let mut delegate = RecordEvaluator::new(record).into_delegate();
    adapter.adapt(node, &mut delegate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use filter_model::{DateRange, Filter, Wkt};

    fn record() -> Record {
        Record::new()
            .with("title", "FOO")
            .with("size", 5)
            .with("ratio", 0.25)
            .with(
                "created",
                Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            )
    }

    fn eval(filter: &Filter) -> bool {
        evaluate(&FilterAdapter::new(), filter, &record()).unwrap()
    }

    #[test]
    fn test_equality_honours_match_case() {
        assert!(eval(&Filter::equal_to("title", "Foo", false)));
        assert!(!eval(&Filter::equal_to("title", "Foo", true)));
        assert!(!eval(&Filter::equal_to("title", "Bar", false)));
        assert!(eval(&Filter::equal_to("title", "FOO", true)));
    }

    #[test]
    fn test_not_equal() {
        let filter = Filter::Compare {
            op: OperatorTag::IsNotEqualTo,
            left: Expression::property("title"),
            right: Expression::literal("foo"),
            match_case: false,
        };
        assert!(!eval(&filter));

        let filter = Filter::Compare {
            op: OperatorTag::IsNotEqualTo,
            left: Expression::property("title"),
            right: Expression::literal("Bar"),
            match_case: true,
        };
        assert!(eval(&filter));
    }

    #[test]
    fn test_ordering_and_between() {
        assert!(eval(&Filter::compare(OperatorTag::IsGreaterThan, "size", 4)));
        assert!(!eval(&Filter::compare(OperatorTag::IsLessThan, "size", 5)));
        assert!(eval(&Filter::compare(OperatorTag::IsLessThanOrEqualTo, "ratio", 0.5)));
        assert!(eval(&Filter::between("size", 1, 10)));
        assert!(eval(&Filter::between("size", 5, 5)));
        assert!(!eval(&Filter::between("size", 6, 10)));
    }

    #[test]
    fn test_literal_on_left() {
        let filter = Filter::Compare {
            op: OperatorTag::IsLessThan,
            left: Expression::literal(3),
            right: Expression::property("size"),
            match_case: true,
        };
        assert!(eval(&filter));
    }

    #[test]
    fn test_like_and_fuzzy() {
        assert!(eval(&Filter::like("title", "F*", true)));
        assert!(!eval(&Filter::like("title", "f*", true)));
        assert!(eval(&Filter::like("title", "f?o", false)));
        assert!(eval(&Filter::fuzzy("title", "fob")));
        assert!(!eval(&Filter::fuzzy("title", "barbaz")));
    }

    #[test]
    fn test_missing_and_null_properties() {
        let record = record().with("owner", Value::Null);
        let adapter = FilterAdapter::new();
        assert!(evaluate(&adapter, &Filter::is_null("owner"), &record).unwrap());
        assert!(evaluate(&adapter, &Filter::is_null("missing"), &record).unwrap());
        assert!(!evaluate(&adapter, &Filter::is_null("title"), &record).unwrap());
        assert!(!evaluate(&adapter, &Filter::equal_to("missing", "x", true), &record).unwrap());
        let not_equal = Filter::Compare {
            op: OperatorTag::IsNotEqualTo,
            left: Expression::property("owner"),
            right: Expression::literal("x"),
            match_case: true,
        };
        assert!(!evaluate(&adapter, &not_equal, &record).unwrap());
    }

    #[test]
    fn test_logical_and_constants() {
        assert!(eval(&Filter::and(vec![
            Filter::equal_to("title", "foo", false),
            Filter::not(Filter::is_null("size")),
        ])));
        assert!(eval(&Filter::or(vec![
            Filter::Exclude,
            Filter::between("size", 1, 10),
        ])));
        assert!(eval(&Filter::Include));
        assert!(!eval(&Filter::Exclude));
    }

    #[test]
    fn test_temporal() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(eval(&Filter::temporal(
            OperatorTag::After,
            "created",
            TemporalOperand::Instant(at)
        )));
        assert!(!eval(&Filter::temporal(
            OperatorTag::Before,
            "created",
            TemporalOperand::Instant(at)
        )));

        let range = DateRange::new(at, at + Duration::days(90)).unwrap();
        assert!(eval(&Filter::temporal(
            OperatorTag::During,
            "created",
            TemporalOperand::Period(range)
        )));

        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let record = record();
        let mut delegate = RecordEvaluator::new(&record).with_now(now).into_delegate();
        let relative = |minutes| {
            Filter::temporal(
                OperatorTag::Relative,
                "created",
                TemporalOperand::Duration(Duration::minutes(minutes)),
            )
        };
        let adapter = FilterAdapter::new();
        assert!(adapter.adapt(&relative(60), &mut delegate).unwrap());
        assert!(!adapter.adapt(&relative(10), &mut delegate).unwrap());
    }

    #[test]
    fn test_function_comparison() {
        let filter = Filter::Compare {
            op: OperatorTag::IsEqualTo,
            left: Expression::function("lower", vec![Expression::property("title")]),
            right: Expression::literal("foo"),
            match_case: true,
        };
        assert!(eval(&filter));

        let filter = Filter::Compare {
            op: OperatorTag::IsGreaterThan,
            left: Expression::function("length", vec![Expression::property("title")]),
            right: Expression::literal(2),
            match_case: true,
        };
        assert!(eval(&filter));
    }

    #[test]
    fn test_function_comparison_honours_match_case() {
        let compare = |op, name, literal, match_case| Filter::Compare {
            op,
            left: Expression::function(name, vec![Expression::property("title")]),
            right: Expression::literal(literal),
            match_case,
        };
        // title is "FOO"
        assert!(eval(&compare(OperatorTag::IsEqualTo, "upper", "foo", false)));
        assert!(!eval(&compare(OperatorTag::IsEqualTo, "upper", "foo", true)));
        assert!(eval(&compare(OperatorTag::IsEqualTo, "lower", "FOO", false)));
        assert!(!eval(&compare(OperatorTag::IsNotEqualTo, "lower", "Foo", false)));
        assert!(eval(&compare(OperatorTag::IsNotEqualTo, "lower", "Foo", true)));
    }

    #[test]
    fn test_unknown_function_fails() {
        let filter = Filter::Compare {
            op: OperatorTag::IsEqualTo,
            left: Expression::function("soundex", vec![Expression::property("title")]),
            right: Expression::literal("F000"),
            match_case: true,
        };
        let err = evaluate(&FilterAdapter::new(), &filter, &record()).unwrap_err();
        assert_eq!(err.root_cause().map(|e| e.tag()), Some(OperatorTag::Function));
    }

    #[test]
    fn test_spatial_is_unsupported() {
        let filter = Filter::spatial(
            OperatorTag::Intersects,
            "location",
            Wkt::parse("POINT (1 2)").unwrap(),
        );
        let err = evaluate(&FilterAdapter::new(), &filter, &record()).unwrap_err();
        assert!(err.is_unsupported());
    }

    #[test]
    fn test_xpath() {
        let record = Record::try_from(serde_json::json!({
            "meta": {"owner": {"name": "Ann"}}
        }))
        .unwrap();
        let adapter = FilterAdapter::new();
        assert!(evaluate(&adapter, &Filter::like("/meta/owner/name", "*", true), &record).unwrap());
        assert!(evaluate(&adapter, &Filter::like("/meta/owner/name", "a*", false), &record).unwrap());
        assert!(!evaluate(&adapter, &Filter::like("/meta/owner/name", "a*", true), &record).unwrap());
        assert!(!evaluate(&adapter, &Filter::like("/meta/missing", "*", true), &record).unwrap());
        assert!(evaluate(&adapter, &Filter::fuzzy("/meta/owner/name", "Anne"), &record).unwrap());
    }
}
