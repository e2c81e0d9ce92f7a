//! Walks a native filter tree and dispatches every node to a [`FilterDelegate`].

use crate::{
    config::AdapterConfig,
    delegate::FilterDelegate,
    error::{AdapterError, DelegateError, DelegateResult},
    pattern::{is_match_all, normalize_like_pattern},
};
use filter_model::{
    Distance, Expression, FilterNode, LiteralType, NodeKind, OperatorFamily, OperatorTag,
    TemporalOperand, Value, Wkt, expr::is_xpath,
};
use tracing::{debug, trace};

#[derive(Debug, Clone, Default)]
pub struct FilterAdapter {
    config: AdapterConfig,
}

impl FilterAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AdapterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Adapts `node` and returns whatever the delegate composes for the root.
    ///
    /// Errors raised by the delegate, and operands the delegate could never
    /// accept, are returned as [`AdapterError::Operation`] carrying the
    /// original [`DelegateError`] as source.
    pub fn adapt<N, D>(&self, node: &N, delegate: &mut D) -> Result<D::Output, AdapterError>
    where
        N: FilterNode + ?Sized,
        D: FilterDelegate,
    {
        self.visit(node, delegate, 1)
    }

    fn visit<N, D>(&self, node: &N, delegate: &mut D, depth: usize) -> Result<D::Output, AdapterError>
    where
        N: FilterNode + ?Sized,
        D: FilterDelegate,
    {
        self.check_depth(depth)?;

        match node.kind() {
            NodeKind::Include => finish(OperatorTag::Include, delegate, |d| d.include()),
            NodeKind::Exclude => finish(OperatorTag::Exclude, delegate, |d| d.exclude()),
            NodeKind::And(children) => {
                let operands = self.visit_children(OperatorTag::And, children, delegate, depth)?;
                finish(OperatorTag::And, delegate, |d| d.and(operands))
            }
            NodeKind::Or(children) => {
                let operands = self.visit_children(OperatorTag::Or, children, delegate, depth)?;
                finish(OperatorTag::Or, delegate, |d| d.or(operands))
            }
            NodeKind::Not(child) => {
                let operand = self.visit(child, delegate, depth + 1)?;
                finish(OperatorTag::Not, delegate, |d| d.not(operand))
            }
            NodeKind::Compare {
                op,
                left,
                right,
                match_case,
            } => self.adapt_compare(op, left, right, match_case, delegate, depth),
            NodeKind::Between { expr, lower, upper } => {
                let tag = OperatorTag::IsBetween;
                let property = property_operand(tag, expr)?;
                let lower = literal_operand(tag, lower)?;
                let upper = literal_operand(tag, upper)?;
                // Dispatch is keyed on the lower boundary; the upper one only
                // has to be orderable.
                ensure_orderable(tag, lower)?;
                ensure_orderable(tag, upper)?;
                finish(tag, delegate, |d| d.property_is_between(property, lower, upper))
            }
            NodeKind::Like {
                expr,
                pattern,
                wildcard,
                single_char,
                escape,
                match_case,
            } => {
                let property = property_operand(OperatorTag::IsLike, expr)?;
                let pattern = normalize_like_pattern(pattern, wildcard, single_char, escape);
                if !is_xpath(property) {
                    finish(OperatorTag::IsLike, delegate, |d| {
                        d.property_is_like(property, &pattern, match_case)
                    })
                } else if is_match_all(&pattern) {
                    finish(OperatorTag::XPathExists, delegate, |d| d.xpath_exists(property))
                } else {
                    finish(OperatorTag::XPathIsLike, delegate, |d| {
                        d.xpath_is_like(property, &pattern, match_case)
                    })
                }
            }
            NodeKind::Fuzzy { expr, literal } => {
                let property = property_operand(OperatorTag::IsFuzzy, expr)?;
                let tag = if is_xpath(property) {
                    OperatorTag::XPathIsFuzzy
                } else {
                    OperatorTag::IsFuzzy
                };
                if literal.literal_type() != LiteralType::String {
                    return Err(reject(tag, DelegateError::incompatible(tag, literal.literal_type())));
                }
                match tag {
                    OperatorTag::XPathIsFuzzy => {
                        finish(tag, delegate, |d| d.xpath_is_fuzzy(property, literal))
                    }
                    _ => finish(tag, delegate, |d| d.property_is_fuzzy(property, literal)),
                }
            }
            NodeKind::IsNull(expr) => {
                let property = property_operand(OperatorTag::IsNull, expr)?;
                finish(OperatorTag::IsNull, delegate, |d| d.property_is_null(property))
            }
            NodeKind::Spatial {
                op,
                property,
                geometry,
                distance,
            } => adapt_spatial(op, property, geometry, distance, delegate),
            NodeKind::Temporal {
                op,
                property,
                operand,
            } => adapt_temporal(op, property, operand, delegate),
        }
    }

    fn visit_children<N, D>(
        &self,
        tag: OperatorTag,
        children: Vec<&N>,
        delegate: &mut D,
        depth: usize,
    ) -> Result<Vec<D::Output>, AdapterError>
    where
        N: FilterNode + ?Sized,
        D: FilterDelegate,
    {
        if children.len() < 2 {
            return Err(reject(
                tag,
                DelegateError::malformed(
                    tag,
                    format!("{} requires at least 2 operands, got {}", tag, children.len()),
                ),
            ));
        }

        children
            .into_iter()
            .map(|child| self.visit(child, delegate, depth + 1))
            .collect()
    }

    fn adapt_compare<D: FilterDelegate>(
        &self,
        op: OperatorTag,
        left: &Expression,
        right: &Expression,
        match_case: bool,
        delegate: &mut D,
        depth: usize,
    ) -> Result<D::Output, AdapterError> {
        if !op.is_binary_comparison() {
            return Err(reject(
                op,
                DelegateError::malformed(op, format!("{op} is not a binary comparison")),
            ));
        }

        // Literal on the left is rewritten so the literal always comes last.
        let (op, subject, literal) = match (left, right) {
            (_, Expression::Literal { value }) if !matches!(left, Expression::Literal { .. }) => {
                (op, left, value)
            }
            (Expression::Literal { value }, _) if !matches!(right, Expression::Literal { .. }) => {
                (op.mirrored(), right, value)
            }
            _ => {
                return Err(reject(
                    op,
                    DelegateError::malformed(
                        op,
                        "comparison requires exactly one literal operand",
                    ),
                ));
            }
        };

        if op.is_ordering() {
            ensure_orderable(op, literal)?;
        }

        match subject {
            Expression::Property { name } => dispatch_comparison(op, name, literal, match_case, delegate),
            Expression::Function(call) => {
                self.check_depth(depth + subject.depth())?;
                finish(OperatorTag::Function, delegate, |d| {
                    d.function(call, literal, op, match_case)
                })
            }
            Expression::Literal { .. } => Err(reject(
                op,
                DelegateError::malformed(op, "comparison between two literals"),
            )),
        }
    }

    fn check_depth(&self, depth: usize) -> Result<(), AdapterError> {
        if depth > self.config.max_depth {
            debug!(
                "Rejecting filter at depth {} (max {})",
                depth, self.config.max_depth
            );
            return Err(AdapterError::TooDeep {
                depth,
                max: self.config.max_depth,
            });
        }
        Ok(())
    }
}

fn dispatch_comparison<D: FilterDelegate>(
    op: OperatorTag,
    property: &str,
    literal: &Value,
    match_case: bool,
    delegate: &mut D,
) -> Result<D::Output, AdapterError> {
    finish(op, delegate, |d| match op {
        OperatorTag::IsEqualTo => d.property_is_equal_to(property, literal, match_case),
        OperatorTag::IsNotEqualTo => d.property_is_not_equal_to(property, literal, match_case),
        OperatorTag::IsGreaterThan => d.property_is_greater_than(property, literal, match_case),
        OperatorTag::IsGreaterThanOrEqualTo => {
            d.property_is_greater_than_or_equal_to(property, literal, match_case)
        }
        OperatorTag::IsLessThan => d.property_is_less_than(property, literal, match_case),
        OperatorTag::IsLessThanOrEqualTo => {
            d.property_is_less_than_or_equal_to(property, literal, match_case)
        }
        other => Err(DelegateError::malformed(
            other,
            format!("{other} is not a binary comparison"),
        )),
    })
}

fn adapt_spatial<D: FilterDelegate>(
    op: OperatorTag,
    property: &str,
    geometry: &Wkt,
    distance: Option<&Distance>,
    delegate: &mut D,
) -> Result<D::Output, AdapterError> {
    if op.family() != OperatorFamily::Spatial {
        return Err(reject(
            op,
            DelegateError::malformed(op, format!("{op} is not a spatial operator")),
        ));
    }

    let distance = match (op.takes_distance(), distance) {
        (true, Some(d)) if d.is_valid() => Some(d),
        (true, Some(d)) => {
            return Err(reject(
                op,
                DelegateError::malformed(op, format!("invalid distance {}", d.value)),
            ));
        }
        (true, None) => {
            return Err(reject(op, DelegateError::malformed(op, "distance is required")));
        }
        (false, Some(_)) => {
            return Err(reject(
                op,
                DelegateError::malformed(op, format!("{op} does not take a distance")),
            ));
        }
        (false, None) => None,
    };

    finish(op, delegate, |d| match (op, distance) {
        (OperatorTag::Beyond, Some(distance)) => d.beyond(property, geometry, distance),
        (OperatorTag::DWithin, Some(distance)) => d.dwithin(property, geometry, distance),
        (OperatorTag::Contains, _) => d.contains(property, geometry),
        (OperatorTag::Crosses, _) => d.crosses(property, geometry),
        (OperatorTag::Disjoint, _) => d.disjoint(property, geometry),
        (OperatorTag::Intersects, _) => d.intersects(property, geometry),
        (OperatorTag::Overlaps, _) => d.overlaps(property, geometry),
        (OperatorTag::Touches, _) => d.touches(property, geometry),
        (OperatorTag::Within, _) => d.within(property, geometry),
        (OperatorTag::NearestNeighbor, _) => d.nearest_neighbor(property, geometry),
        (other, _) => Err(DelegateError::malformed(other, "missing distance")),
    })
}

fn adapt_temporal<D: FilterDelegate>(
    op: OperatorTag,
    property: &str,
    operand: &TemporalOperand,
    delegate: &mut D,
) -> Result<D::Output, AdapterError> {
    match (op, operand) {
        (OperatorTag::After, TemporalOperand::Instant(instant)) => {
            finish(op, delegate, |d| d.after(property, instant))
        }
        // After a period means after it has ended.
        (OperatorTag::After, TemporalOperand::Period(range)) => {
            finish(op, delegate, |d| d.after(property, &range.end()))
        }
        (OperatorTag::Before, TemporalOperand::Instant(instant)) => {
            finish(op, delegate, |d| d.before(property, instant))
        }
        (OperatorTag::Before, TemporalOperand::Period(range)) => {
            finish(op, delegate, |d| d.before(property, &range.start()))
        }
        (OperatorTag::During, TemporalOperand::Period(range)) => {
            finish(op, delegate, |d| d.during(property, range))
        }
        (OperatorTag::Relative, TemporalOperand::Duration(duration)) => {
            if *duration < chrono::Duration::zero() {
                return Err(reject(
                    op,
                    DelegateError::malformed(op, "relative duration must not be negative"),
                ));
            }
            finish(op, delegate, |d| d.relative(property, duration))
        }
        (op, _) if op.family() != OperatorFamily::Temporal => Err(reject(
            op,
            DelegateError::malformed(op, format!("{op} is not a temporal operator")),
        )),
        (op, operand) => Err(reject(op, DelegateError::incompatible(op, operand.kind_name()))),
    }
}

fn property_operand(tag: OperatorTag, expr: &Expression) -> Result<&str, AdapterError> {
    expr.as_property().ok_or_else(|| {
        reject(
            tag,
            DelegateError::malformed(tag, format!("expected a property operand, got {expr}")),
        )
    })
}

fn literal_operand(tag: OperatorTag, expr: &Expression) -> Result<&Value, AdapterError> {
    expr.as_literal().ok_or_else(|| {
        reject(
            tag,
            DelegateError::malformed(tag, format!("expected a literal operand, got {expr}")),
        )
    })
}

fn ensure_orderable(tag: OperatorTag, literal: &Value) -> Result<(), AdapterError> {
    if literal.literal_type().is_orderable() {
        Ok(())
    } else {
        Err(reject(tag, DelegateError::incompatible(tag, literal.literal_type())))
    }
}

fn reject(tag: OperatorTag, source: DelegateError) -> AdapterError {
    debug!("Rejecting {} node: {}", tag, source);
    AdapterError::Operation { tag, source }
}

/// Invokes the delegate for one node and attaches the node's tag to any failure.
fn finish<D, F>(tag: OperatorTag, delegate: &mut D, call: F) -> Result<D::Output, AdapterError>
where
    D: FilterDelegate,
    F: FnOnce(&mut D) -> DelegateResult<D::Output>,
{
    trace!("Dispatching {} to {}", tag, delegate.name());
    call(&mut *delegate).map_err(|source| {
        debug!("{} failed on {}: {}", delegate.name(), tag, source);
        AdapterError::Operation { tag, source }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        rollup::{FamilyHooks, Rollup},
        text::TextDelegate,
    };
    use chrono::{Duration, TimeZone, Utc};
    use filter_model::{DateRange, DistanceUnit, Filter};

    #[derive(Default)]
    struct Trace {
        calls: Vec<String>,
    }

    impl FamilyHooks for Trace {
        type Output = ();

        fn name(&self) -> &str {
            "Trace"
        }

        fn on_logical(&mut self, _operands: Vec<()>, tag: OperatorTag) -> DelegateResult<()> {
            self.calls.push(tag.to_string());
            Ok(())
        }

        fn on_comparison(
            &mut self,
            property: &str,
            _literals: &[&Value],
            _literal_type: LiteralType,
            tag: OperatorTag,
        ) -> DelegateResult<()> {
            self.calls.push(format!("{tag} {property}"));
            Ok(())
        }
    }

    fn text(filter: &Filter) -> Result<String, AdapterError> {
        FilterAdapter::new().adapt(filter, &mut TextDelegate)
    }

    fn point() -> Wkt {
        Wkt::parse("POINT (0 0)").unwrap()
    }

    #[test]
    fn test_children_visited_before_parent_in_order() {
        let filter = Filter::or(vec![
            Filter::and(vec![Filter::is_null("a"), Filter::is_null("b")]),
            Filter::not(Filter::is_null("c")),
        ]);
        let mut rollup = Rollup::new(Trace::default());
        FilterAdapter::new().adapt(&filter, &mut rollup).unwrap();
        assert_eq!(
            rollup.hooks().calls,
            vec!["IS_NULL a", "IS_NULL b", "AND", "IS_NULL c", "NOT", "OR"]
        );
    }

    #[test]
    fn test_literal_on_left_is_mirrored() {
        let filter = Filter::Compare {
            op: OperatorTag::IsGreaterThanOrEqualTo,
            left: Expression::literal(3),
            right: Expression::property("size"),
            match_case: true,
        };
        assert_eq!(text(&filter).unwrap(), "IS_LESS_THAN_OR_EQUAL_TO(size, 3)");

        let filter = Filter::Compare {
            op: OperatorTag::IsEqualTo,
            left: Expression::literal("Foo"),
            right: Expression::property("title"),
            match_case: false,
        };
        assert_eq!(
            text(&filter).unwrap(),
            "IS_EQUAL_TO(title, 'Foo', matchCase=false)"
        );
    }

    #[test]
    fn test_comparison_operand_shapes_rejected() {
        let two_properties = Filter::Compare {
            op: OperatorTag::IsEqualTo,
            left: Expression::property("a"),
            right: Expression::property("b"),
            match_case: true,
        };
        assert!(text(&two_properties).unwrap_err().is_malformed());

        let two_literals = Filter::Compare {
            op: OperatorTag::IsEqualTo,
            left: Expression::literal(1),
            right: Expression::literal(1),
            match_case: true,
        };
        assert!(text(&two_literals).unwrap_err().is_malformed());

        let not_a_comparison = Filter::compare(OperatorTag::Intersects, "a", 1);
        assert!(text(&not_a_comparison).unwrap_err().is_malformed());
    }

    #[test]
    fn test_function_only_allowed_in_binary_comparison() {
        let lower = || Expression::function("lower", vec![Expression::property("title")]);
        let rejected = [
            Filter::Between {
                expr: lower(),
                lower: Expression::literal("a"),
                upper: Expression::literal("m"),
            },
            Filter::Like {
                expr: lower(),
                pattern: "fo*".to_string(),
                wildcard: '*',
                single_char: '?',
                escape: '\\',
                match_case: false,
            },
            Filter::Fuzzy {
                expr: lower(),
                literal: Value::from("foo"),
            },
            Filter::IsNull { expr: lower() },
        ];
        for filter in &rejected {
            assert!(text(filter).unwrap_err().is_malformed());
        }
    }

    #[test]
    fn test_logical_arity() {
        let err = text(&Filter::and(vec![Filter::is_null("a")])).unwrap_err();
        assert!(matches!(
            err,
            AdapterError::Operation {
                tag: OperatorTag::And,
                source: DelegateError::MalformedInput { .. }
            }
        ));
        assert!(text(&Filter::or(vec![])).unwrap_err().is_malformed());
    }

    #[test]
    fn test_ordering_requires_orderable_literal() {
        let err = text(&Filter::compare(OperatorTag::IsLessThan, "flag", true)).unwrap_err();
        assert_eq!(
            err.root_cause(),
            Some(&DelegateError::incompatible(OperatorTag::IsLessThan, "boolean"))
        );
        assert!(text(&Filter::between("size", 1, Value::Null)).is_err());
        // Equality accepts any literal.
        assert!(text(&Filter::equal_to("flag", true, true)).is_ok());
    }

    #[test]
    fn test_fuzzy_requires_string() {
        let err = text(&Filter::fuzzy("title", 3)).unwrap_err();
        assert_eq!(
            err.root_cause(),
            Some(&DelegateError::incompatible(OperatorTag::IsFuzzy, "number"))
        );
        assert_eq!(
            text(&Filter::fuzzy("/doc/title", "foo")).unwrap(),
            "XPATH_IS_FUZZY(/doc/title, 'foo')"
        );
    }

    #[test]
    fn test_like_pattern_is_normalized() {
        let filter = Filter::Like {
            expr: Expression::property("name"),
            pattern: "a%b_c!%".to_string(),
            wildcard: '%',
            single_char: '_',
            escape: '!',
            match_case: true,
        };
        assert_eq!(
            text(&filter).unwrap(),
            "IS_LIKE(name, 'a*b?c%', matchCase=true)"
        );
    }

    #[test]
    fn test_spatial_distance_rules() {
        let meters = Distance::new(5.0, DistanceUnit::Meters);

        let missing = Filter::spatial(OperatorTag::DWithin, "loc", point());
        assert!(text(&missing).unwrap_err().is_malformed());

        let negative = Filter::buffered(
            OperatorTag::Beyond,
            "loc",
            point(),
            Distance::new(-1.0, DistanceUnit::Meters),
        );
        assert!(text(&negative).unwrap_err().is_malformed());

        let unexpected = Filter::buffered(OperatorTag::Intersects, "loc", point(), meters);
        assert!(text(&unexpected).unwrap_err().is_malformed());

        let ok = Filter::buffered(OperatorTag::Beyond, "loc", point(), meters);
        assert_eq!(text(&ok).unwrap(), "BEYOND(loc, POINT (0 0), 5m)");
    }

    #[test]
    fn test_temporal_operand_rules() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let period = TemporalOperand::Period(DateRange::new(start, end).unwrap());

        let after = Filter::temporal(OperatorTag::After, "t", period.clone());
        assert_eq!(
            text(&after).unwrap(),
            "AFTER(t, '2024-02-01T00:00:00+00:00')"
        );
        let before = Filter::temporal(OperatorTag::Before, "t", period);
        assert_eq!(
            text(&before).unwrap(),
            "BEFORE(t, '2024-01-01T00:00:00+00:00')"
        );

        let during_instant =
            Filter::temporal(OperatorTag::During, "t", TemporalOperand::Instant(start));
        assert_eq!(
            text(&during_instant).unwrap_err().root_cause(),
            Some(&DelegateError::incompatible(OperatorTag::During, "instant"))
        );

        let negative = Filter::temporal(
            OperatorTag::Relative,
            "t",
            TemporalOperand::Duration(Duration::seconds(-5)),
        );
        assert!(text(&negative).unwrap_err().is_malformed());
    }

    #[test]
    fn test_depth_limit() {
        let adapter = FilterAdapter::with_config(AdapterConfig::with_max_depth(2).unwrap());
        let shallow = Filter::not(Filter::is_null("a"));
        assert!(adapter.adapt(&shallow, &mut TextDelegate).is_ok());

        let deep = Filter::not(Filter::not(Filter::is_null("a")));
        assert!(matches!(
            adapter.adapt(&deep, &mut TextDelegate),
            Err(AdapterError::TooDeep { depth: 3, max: 2 })
        ));

        // Nested function calls count towards the limit.
        let nested = Filter::not(Filter::Compare {
            op: OperatorTag::IsEqualTo,
            left: Expression::function("lower", vec![Expression::property("a")]),
            right: Expression::literal("x"),
            match_case: true,
        });
        assert!(matches!(
            adapter.adapt(&nested, &mut TextDelegate),
            Err(AdapterError::TooDeep { .. })
        ));
    }

    #[test]
    fn test_delegate_error_is_tagged() {
        let filter = Filter::and(vec![
            Filter::is_null("a"),
            Filter::spatial(OperatorTag::Crosses, "loc", point()),
        ]);
        let mut rollup = Rollup::new(Trace::default());
        let err = FilterAdapter::new().adapt(&filter, &mut rollup).unwrap_err();
        assert!(matches!(
            err,
            AdapterError::Operation {
                tag: OperatorTag::Crosses,
                ..
            }
        ));
        assert!(err.is_unsupported());
        assert_eq!(rollup.hooks().calls, vec!["IS_NULL a"]);
    }
}
