#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use filter_engine::{CopyDelegate, FilterAdapter, TextDelegate};
use filter_model::{
    DateRange, Distance, DistanceUnit, Expression, Filter, OperatorTag, TemporalOperand, Wkt,
};
use std::sync::Arc;

pub fn instant(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .expect("valid date")
}

pub fn point() -> Wkt {
    Wkt::parse("POINT (1 2)").expect("valid wkt")
}

/// One filter touching every operator the native tree can express.
pub fn catalog_filter() -> Filter {
    let q1 = DateRange::new(instant(2024, 1, 1), instant(2024, 4, 1)).expect("valid range");
    Filter::and(vec![
        Filter::or(vec![
            Filter::equal_to("title", "Foo", false),
            Filter::Compare {
                op: OperatorTag::IsNotEqualTo,
                left: Expression::property("title"),
                right: Expression::literal("Bar"),
                match_case: true,
            },
        ]),
        Filter::compare(OperatorTag::IsGreaterThan, "size", 1),
        Filter::compare(OperatorTag::IsGreaterThanOrEqualTo, "size", 2_i64),
        Filter::compare(OperatorTag::IsLessThan, "ratio", 0.5),
        Filter::compare(OperatorTag::IsLessThanOrEqualTo, "ratio", 0.75_f32),
        Filter::between("size", 1, 10),
        Filter::like("title", "F*o?", true),
        Filter::fuzzy("title", "fob"),
        Filter::not(Filter::is_null("owner")),
        Filter::spatial(OperatorTag::Intersects, "location", point()),
        Filter::buffered(
            OperatorTag::DWithin,
            "location",
            point(),
            Distance::new(10.0, DistanceUnit::Meters),
        ),
        Filter::temporal(
            OperatorTag::After,
            "created",
            TemporalOperand::Instant(instant(2024, 1, 1)),
        ),
        Filter::temporal(OperatorTag::During, "created", TemporalOperand::Period(q1)),
        Filter::temporal(
            OperatorTag::Relative,
            "modified",
            TemporalOperand::Duration(Duration::seconds(60)),
        ),
        Filter::like("/metacard/title", "*", true),
        Filter::like("/metacard/owner", "a*", false),
        Filter::fuzzy("/metacard/owner", "ann"),
        Filter::Compare {
            op: OperatorTag::IsEqualTo,
            left: Expression::function("lower", vec![Expression::property("title")]),
            right: Expression::literal("foo"),
            match_case: true,
        },
        Filter::Compare {
            op: OperatorTag::IsNotEqualTo,
            left: Expression::function("upper", vec![Expression::property("owner")]),
            right: Expression::literal("bob"),
            match_case: false,
        },
    ])
}

pub fn text(filter: &Filter) -> String {
    FilterAdapter::new()
        .adapt(filter, &mut TextDelegate::new())
        .expect("text form")
}

pub fn copy(filter: &Filter) -> Arc<Filter> {
    FilterAdapter::new()
        .adapt(filter, &mut CopyDelegate::native())
        .expect("copy")
}
