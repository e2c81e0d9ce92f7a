use crate::error::ModelError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = ModelError;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        DateRange::new(raw.start, raw.end)
    }
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ModelError> {
        if end < start {
            return Err(ModelError::InvalidDateRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        self.start <= *instant && *instant < self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

/// Right-hand side of a temporal predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalOperand {
    Instant(DateTime<Utc>),
    Period(DateRange),
    /// Window ending now, used by `RELATIVE`.
    #[serde(with = "duration_millis")]
    Duration(Duration),
}

impl TemporalOperand {
    pub fn kind_name(&self) -> &'static str {
        match self {
            TemporalOperand::Instant(_) => "instant",
            TemporalOperand::Period(_) => "period",
            TemporalOperand::Duration(_) => "duration",
        }
    }
}

mod duration_millis {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(duration.num_milliseconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let millis = i64::deserialize(d)?;
        Ok(Duration::milliseconds(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_range_is_half_open() {
        let range = DateRange::new(at(1), at(5)).unwrap();
        assert!(range.contains(&at(1)));
        assert!(range.contains(&at(4)));
        assert!(!range.contains(&at(5)));
        assert!(!range.contains(&at(0)));
    }

    #[test]
    fn test_inverted_range_rejected() {
        assert!(matches!(
            DateRange::new(at(5), at(1)),
            Err(ModelError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_deserialize_validates_bounds() {
        let bad = r#"{"start":"2024-03-01T05:00:00Z","end":"2024-03-01T01:00:00Z"}"#;
        assert!(serde_json::from_str::<DateRange>(bad).is_err());

        let good = r#"{"start":"2024-03-01T01:00:00Z","end":"2024-03-01T05:00:00Z"}"#;
        let range: DateRange = serde_json::from_str(good).unwrap();
        assert_eq!(range.start(), at(1));
    }

    #[test]
    fn test_duration_serialized_as_millis() {
        let operand = TemporalOperand::Duration(Duration::seconds(90));
        let json = serde_json::to_string(&operand).unwrap();
        assert_eq!(json, r#"{"duration":90000}"#);
        let back: TemporalOperand = serde_json::from_str(&json).unwrap();
        assert_eq!(back, operand);
    }
}
