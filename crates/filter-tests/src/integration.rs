#[cfg(test)]
mod tests {
    use crate::utils::{catalog_filter, copy, instant, point, text};
    use filter_builder::{
        BuildError, FlatFilterBuilder, JsonTarget, TranslateError, XmlTarget, translate,
    };
    use filter_engine::{AdapterConfig, AdapterError, FilterAdapter};
    use filter_eval::{Record, evaluate};
    use filter_model::{Expression, Filter, OperatorTag, TemporalOperand};
    use serde_json::json;
    use std::sync::Arc;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn test_copy_round_trip_is_equivalent() {
        let filter = catalog_filter();
        let copied = copy(&filter);

        assert_eq!(text(&copied), text(&filter));
        assert!(text(&filter).starts_with("AND(OR(IS_EQUAL_TO(title, 'Foo', matchCase=false)"));
    }

    #[traced_test]
    #[test]
    fn test_copy_preserves_constant_identity() {
        let copied = copy(&Filter::Include);
        assert!(Arc::ptr_eq(&copied, &Filter::include_sentinel()));

        let copied = copy(&Filter::Exclude);
        assert!(Arc::ptr_eq(&copied, &Filter::exclude_sentinel()));

        let first = copy(&Filter::is_null("owner"));
        let second = copy(&Filter::is_null("owner"));
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first, second);
    }

    #[traced_test]
    #[test]
    fn test_copy_canonicalizes_like_characters() {
        let filter = Filter::Like {
            expr: Expression::property("title"),
            pattern: "F%o_!%".to_string(),
            wildcard: '%',
            single_char: '_',
            escape: '!',
            match_case: true,
        };
        let copied = copy(&filter);
        assert_eq!(*copied, Filter::like("title", "F*o?%", true));
        assert_eq!(text(&copied), text(&filter));
    }

    #[traced_test]
    #[test]
    fn test_filter_survives_serde() {
        let filter = catalog_filter();
        let encoded = serde_json::to_string(&filter).unwrap();
        let decoded: Filter = serde_json::from_str(&encoded).unwrap();
        assert_eq!(text(&decoded), text(&filter));
    }

    #[traced_test]
    #[test]
    fn test_translate_to_json() {
        let filter = Filter::and(vec![
            Filter::equal_to("title", "Foo", false),
            Filter::not(Filter::is_null("owner")),
            Filter::between("size", 1, 10),
        ]);
        let node = translate(&FilterAdapter::new(), &filter, JsonTarget).unwrap();
        assert_eq!(
            node,
            json!({
                "type": "AND",
                "filters": [
                    {
                        "type": "IS_EQUAL_TO",
                        "property": {"type": "PROPERTY", "name": "title"},
                        "value": {"type": "LITERAL", "value": "Foo"},
                        "matchCase": false
                    },
                    {
                        "type": "NOT",
                        "filter": {
                            "type": "IS_NULL",
                            "property": {"type": "PROPERTY", "name": "owner"}
                        }
                    },
                    {
                        "type": "IS_BETWEEN",
                        "property": {"type": "PROPERTY", "name": "size"},
                        "lower": {"type": "LITERAL", "value": 1},
                        "upper": {"type": "LITERAL", "value": 10}
                    }
                ]
            })
        );
    }

    #[traced_test]
    #[test]
    fn test_translate_function_to_json() {
        let filter = Filter::Compare {
            op: OperatorTag::IsEqualTo,
            left: Expression::function(
                "concat",
                vec![
                    Expression::function("lower", vec![Expression::property("first")]),
                    Expression::literal("-"),
                    Expression::property("last"),
                ],
            ),
            right: Expression::literal("ann-Lee"),
            match_case: true,
        };
        let node = translate(&FilterAdapter::new(), &filter, JsonTarget).unwrap();
        assert_eq!(node["type"], "IS_EQUAL_TO");
        assert_eq!(node["property"]["name"], "concat");
        assert_eq!(node["property"]["args"][0]["name"], "lower");
        assert_eq!(
            node["property"]["args"][0]["args"][0],
            json!({"type": "PROPERTY", "name": "first"})
        );
        assert_eq!(node["value"]["value"], "ann-Lee");
    }

    #[traced_test]
    #[test]
    fn test_case_insensitive_function_comparison() {
        let filter = Filter::Compare {
            op: OperatorTag::IsEqualTo,
            left: Expression::function("lower", vec![Expression::property("title")]),
            right: Expression::literal("foo"),
            match_case: false,
        };

        let copied = copy(&filter);
        assert_eq!(*copied, filter);
        assert_eq!(
            text(&copied),
            "FUNCTION(IS_EQUAL_TO, lower(title), 'foo', matchCase=false)"
        );

        let node = translate(&FilterAdapter::new(), &filter, JsonTarget).unwrap();
        assert_eq!(node["type"], "IS_EQUAL_TO");
        assert_eq!(node["property"]["name"], "lower");
        assert_eq!(node["matchCase"], json!(false));

        let record = Record::try_from(json!({"title": "foo"})).unwrap();
        let upper = |match_case| Filter::Compare {
            op: OperatorTag::IsEqualTo,
            left: Expression::function("upper", vec![Expression::property("title")]),
            right: Expression::literal("foo"),
            match_case,
        };
        assert!(evaluate(&FilterAdapter::new(), &upper(false), &record).unwrap());
        assert!(!evaluate(&FilterAdapter::new(), &upper(true), &record).unwrap());
    }

    #[traced_test]
    #[test]
    fn test_ordering_match_case_survives_copy() {
        let filter = Filter::Compare {
            op: OperatorTag::IsGreaterThan,
            left: Expression::property("title"),
            right: Expression::literal("m"),
            match_case: false,
        };
        assert_eq!(*copy(&filter), filter);
    }

    #[traced_test]
    #[test]
    fn test_translate_to_xml() {
        let filter = Filter::or(vec![
            Filter::like("title", "F*", false),
            Filter::buffered(
                OperatorTag::DWithin,
                "location",
                point(),
                filter_model::Distance::new(10.0, filter_model::DistanceUnit::Kilometers),
            ),
            Filter::temporal(
                OperatorTag::Before,
                "created",
                TemporalOperand::Instant(instant(2024, 1, 1)),
            ),
        ]);
        let root = translate(&FilterAdapter::new(), &filter, XmlTarget).unwrap();
        let xml = XmlTarget.render(&root).unwrap();

        assert!(xml.contains("<fes:Or>"));
        assert!(xml.contains("wildCard=\"*\""));
        assert!(xml.contains("<fes:Distance uom=\"km\">10</fes:Distance>"));
        assert!(xml.contains("<fes:Literal>2024-01-01T00:00:00+00:00</fes:Literal>"));
    }

    #[traced_test]
    #[test]
    fn test_xml_rejects_relative() {
        let filter = Filter::and(vec![
            Filter::is_null("owner"),
            Filter::temporal(
                OperatorTag::Relative,
                "modified",
                TemporalOperand::Duration(chrono::Duration::seconds(60)),
            ),
        ]);
        let err = translate(&FilterAdapter::new(), &filter, XmlTarget).unwrap_err();
        assert!(matches!(
            err,
            TranslateError::Build(BuildError::Unsupported {
                tag: OperatorTag::Relative,
                ..
            })
        ));
    }

    #[traced_test]
    #[test]
    fn test_constants_cannot_be_emitted() {
        let filter = Filter::or(vec![Filter::Include, Filter::is_null("owner")]);
        let err = translate(&FilterAdapter::new(), &filter, JsonTarget).unwrap_err();
        match err {
            TranslateError::Adapt(e) => assert!(e.is_unsupported()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[traced_test]
    #[test]
    fn test_builder_by_hand_matches_translation() {
        let mut b = FlatFilterBuilder::new(JsonTarget);
        b.begin_logical(OperatorTag::And).unwrap();
        b.begin_terminal(OperatorTag::IsEqualTo, false).unwrap();
        b.property("title").unwrap();
        b.value("Foo").unwrap();
        b.end().unwrap();
        b.begin_logical(OperatorTag::Not).unwrap();
        b.begin_terminal(OperatorTag::IsNull, true).unwrap();
        b.property("owner").unwrap();
        b.end().unwrap();
        b.end().unwrap();
        b.end().unwrap();
        let built = b.result().unwrap();

        let filter = Filter::and(vec![
            Filter::equal_to("title", "Foo", false),
            Filter::not(Filter::is_null("owner")),
        ]);
        let translated = translate(&FilterAdapter::new(), &filter, JsonTarget).unwrap();
        assert_eq!(built, translated);
    }

    #[traced_test]
    #[test]
    fn test_unsupported_propagates_from_nested_node() {
        let filter = Filter::and(vec![
            Filter::equal_to("title", "FOO", true),
            Filter::spatial(OperatorTag::Intersects, "location", point()),
        ]);
        let record = Record::new().with("title", "FOO");
        let err = evaluate(&FilterAdapter::new(), &filter, &record).unwrap_err();

        assert!(err.is_unsupported());
        assert_eq!(
            err.root_cause().map(|cause| cause.tag()),
            Some(OperatorTag::Intersects)
        );
    }

    #[traced_test]
    #[test]
    fn test_evaluate_record_from_json() {
        let record = Record::try_from(json!({
            "title": "FOO",
            "size": 4,
            "created": "2024-02-10T08:00:00Z",
            "metacard": {"owner": "Ann"}
        }))
        .unwrap();
        let adapter = FilterAdapter::new();

        let filter = Filter::and(vec![
            Filter::equal_to("title", "Foo", false),
            Filter::between("size", 1, 10),
            Filter::temporal(
                OperatorTag::After,
                "created",
                TemporalOperand::Instant(instant(2024, 1, 1)),
            ),
            Filter::like("/metacard/owner", "a*", false),
        ]);
        assert!(evaluate(&adapter, &filter, &record).unwrap());

        let filter = Filter::equal_to("title", "Bar", false);
        assert!(!evaluate(&adapter, &filter, &record).unwrap());
    }

    #[traced_test]
    #[test]
    fn test_depth_limit_applies_to_every_delegate() {
        let mut filter = Filter::is_null("owner");
        for _ in 0..8 {
            filter = Filter::not(filter);
        }
        let adapter = FilterAdapter::with_config(AdapterConfig::with_max_depth(4).unwrap());

        assert!(matches!(
            translate(&adapter, &filter, JsonTarget),
            Err(TranslateError::Adapt(AdapterError::TooDeep { max: 4, .. }))
        ));
        assert!(matches!(
            evaluate(&adapter, &filter, &Record::new()),
            Err(AdapterError::TooDeep { max: 4, .. })
        ));
    }
}
