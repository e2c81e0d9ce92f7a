use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

const GEOMETRY_KEYWORDS: [&str; 7] = [
    "GEOMETRYCOLLECTION",
    "MULTIPOLYGON",
    "MULTILINESTRING",
    "MULTIPOINT",
    "POLYGON",
    "LINESTRING",
    "POINT",
];

/// Well-known-text geometry. Only the outer shape is checked (a known geometry
/// keyword followed by `EMPTY` or a balanced coordinate list).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Wkt(String);

impl Wkt {
    pub fn parse(text: &str) -> Result<Self, ModelError> {
        let trimmed = text.trim();
        let invalid = |reason: &str| ModelError::InvalidWkt {
            wkt: text.to_string(),
            reason: reason.to_string(),
        };

        let upper = trimmed.to_ascii_uppercase();
        let keyword = GEOMETRY_KEYWORDS
            .iter()
            .find(|k| upper.starts_with(*k))
            .ok_or_else(|| invalid("unknown geometry type"))?;

        let body = upper[keyword.len()..].trim_start();
        if body == "EMPTY" {
            return Ok(Self(trimmed.to_string()));
        }
        if !body.starts_with('(') {
            return Err(invalid("expected '(' or EMPTY after geometry type"));
        }

        let mut depth: usize = 0;
        for (i, c) in body.char_indices() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| invalid("unbalanced parentheses"))?;
                    if depth == 0 && i + 1 != body.len() {
                        return Err(invalid("trailing characters after geometry"));
                    }
                }
                _ => {}
            }
        }
        if depth != 0 {
            return Err(invalid("unbalanced parentheses"));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Upper-cased geometry keyword, e.g. `POLYGON`.
    pub fn geometry_type(&self) -> &'static str {
        let upper = self.0.to_ascii_uppercase();
        GEOMETRY_KEYWORDS
            .iter()
            .find(|k| upper.starts_with(*k))
            .copied()
            .unwrap_or("GEOMETRY")
    }
}

impl TryFrom<String> for Wkt {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Wkt::parse(&value)
    }
}

impl From<Wkt> for String {
    fn from(wkt: Wkt) -> Self {
        wkt.0
    }
}

impl fmt::Display for Wkt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceUnit {
    Meters,
    Kilometers,
    Feet,
    Yards,
    Miles,
    NauticalMiles,
}

impl DistanceUnit {
    pub fn meters_per_unit(&self) -> f64 {
        match self {
            DistanceUnit::Meters => 1.0,
            DistanceUnit::Kilometers => 1000.0,
            DistanceUnit::Feet => 0.3048,
            DistanceUnit::Yards => 0.9144,
            DistanceUnit::Miles => 1609.344,
            DistanceUnit::NauticalMiles => 1852.0,
        }
    }

    /// Unit-of-measure abbreviation used in serialized forms.
    pub fn symbol(&self) -> &'static str {
        match self {
            DistanceUnit::Meters => "m",
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Feet => "ft",
            DistanceUnit::Yards => "yd",
            DistanceUnit::Miles => "mi",
            DistanceUnit::NauticalMiles => "nmi",
        }
    }
}

impl FromStr for DistanceUnit {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "m" | "meter" | "meters" | "metre" | "metres" => Ok(DistanceUnit::Meters),
            "km" | "kilometer" | "kilometers" => Ok(DistanceUnit::Kilometers),
            "ft" | "foot" | "feet" => Ok(DistanceUnit::Feet),
            "yd" | "yard" | "yards" => Ok(DistanceUnit::Yards),
            "mi" | "mile" | "miles" => Ok(DistanceUnit::Miles),
            "nmi" | "nautical_miles" | "nautical miles" => Ok(DistanceUnit::NauticalMiles),
            other => Err(ModelError::UnknownUnit(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    pub value: f64,
    pub units: DistanceUnit,
}

impl Distance {
    pub fn new(value: f64, units: DistanceUnit) -> Self {
        Self { value, units }
    }

    pub fn meters(&self) -> f64 {
        self.value * self.units.meters_per_unit()
    }

    pub fn is_valid(&self) -> bool {
        self.value.is_finite() && self.value >= 0.0
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.units.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_wkt() {
        let wkt = Wkt::parse("POLYGON ((0 0, 0 10, 10 10, 10 0, 0 0))").unwrap();
        assert_eq!(wkt.geometry_type(), "POLYGON");
        assert_eq!(Wkt::parse("point(1 2)").unwrap().geometry_type(), "POINT");
        assert_eq!(
            Wkt::parse("MULTIPOINT ((1 2), (3 4))").unwrap().geometry_type(),
            "MULTIPOINT"
        );
        assert!(Wkt::parse("LINESTRING EMPTY").is_ok());
    }

    #[test]
    fn test_reject_malformed_wkt() {
        assert!(Wkt::parse("").is_err());
        assert!(Wkt::parse("CIRCLE (1 2)").is_err());
        assert!(Wkt::parse("POINT (1 2").is_err());
        assert!(Wkt::parse("POINT 1 2").is_err());
        assert!(Wkt::parse("POINT (1 2)) junk").is_err());
    }

    #[test]
    fn test_distance_conversion() {
        assert_eq!(Distance::new(2.5, DistanceUnit::Kilometers).meters(), 2500.0);
        assert_eq!(Distance::new(1.0, DistanceUnit::NauticalMiles).meters(), 1852.0);
        assert!(!Distance::new(-1.0, DistanceUnit::Meters).is_valid());
        assert!(!Distance::new(f64::NAN, DistanceUnit::Meters).is_valid());
    }

    #[test]
    fn test_unit_from_str() {
        assert_eq!("KM".parse::<DistanceUnit>().unwrap(), DistanceUnit::Kilometers);
        assert!("parsecs".parse::<DistanceUnit>().is_err());
    }
}
