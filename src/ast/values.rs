use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::names::is_identifier;

/// Timestamp literal format. Offsets are normalized to UTC before rendering.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A literal value embedded in a condition or passed as a function argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

/// Coarse literal kind, used where two literals must agree (BETWEEN bounds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Null,
    Bool,
    Number,
    String,
    Date,
    Timestamp,
}

impl std::fmt::Display for LiteralKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LiteralKind::Null => write!(f, "null"),
            LiteralKind::Bool => write!(f, "boolean"),
            LiteralKind::Number => write!(f, "number"),
            LiteralKind::String => write!(f, "string"),
            LiteralKind::Date => write!(f, "date"),
            LiteralKind::Timestamp => write!(f, "timestamp"),
        }
    }
}

impl Literal {
    pub fn kind(&self) -> LiteralKind {
        match self {
            Literal::Null => LiteralKind::Null,
            Literal::Bool(_) => LiteralKind::Bool,
            Literal::Int(_) | Literal::Float(_) => LiteralKind::Number,
            Literal::String(_) => LiteralKind::String,
            Literal::Date(_) => LiteralKind::Date,
            Literal::Timestamp(_) => LiteralKind::Timestamp,
        }
    }

    /// Name of the parameter if this literal is a `{{name}}` placeholder.
    pub fn placeholder(&self) -> Option<&str> {
        match self {
            Literal::String(s) => placeholder_name(s),
            _ => None,
        }
    }
}

/// Extract `name` from `{{name}}`.
pub fn placeholder_name(s: &str) -> Option<&str> {
    s.strip_prefix("{{")
        .and_then(|rest| rest.strip_suffix("}}"))
        .filter(|name| is_identifier(name))
}

/// Parse `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` or RFC 3339 with an
/// offset. Offset-carrying values are converted to UTC.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// SQL rendering of the literal.
impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Null => write!(f, "NULL"),
            Literal::Bool(true) => write!(f, "TRUE"),
            Literal::Bool(false) => write!(f, "FALSE"),
            Literal::Int(n) => write!(f, "{}", n),
            // Debug keeps the decimal point on integral floats (500.0)
            Literal::Float(n) => write!(f, "{:?}", n),
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Literal::Date(d) => write!(f, "'{}'", d.format(DATE_FORMAT)),
            Literal::Timestamp(ts) => write!(f, "'{}'", ts.format(TIMESTAMP_FORMAT)),
        }
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Bool(b)
    }
}

impl From<i32> for Literal {
    fn from(n: i32) -> Self {
        Literal::Int(n as i64)
    }
}

impl From<i64> for Literal {
    fn from(n: i64) -> Self {
        Literal::Int(n)
    }
}

impl From<f64> for Literal {
    fn from(n: f64) -> Self {
        Literal::Float(n)
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::String(s)
    }
}

impl From<NaiveDate> for Literal {
    fn from(d: NaiveDate) -> Self {
        Literal::Date(d)
    }
}

impl From<NaiveDateTime> for Literal {
    fn from(ts: NaiveDateTime) -> Self {
        Literal::Timestamp(ts)
    }
}

impl From<Option<String>> for Literal {
    fn from(opt: Option<String>) -> Self {
        match opt {
            Some(s) => Literal::String(s),
            None => Literal::Null,
        }
    }
}

impl From<Option<i64>> for Literal {
    fn from(opt: Option<i64>) -> Self {
        match opt {
            Some(n) => Literal::Int(n),
            None => Literal::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_rendering() {
        assert_eq!(Literal::Null.to_string(), "NULL");
        assert_eq!(Literal::from(true).to_string(), "TRUE");
        assert_eq!(Literal::from(false).to_string(), "FALSE");
        assert_eq!(Literal::from(100).to_string(), "100");
        assert_eq!(Literal::from(500.0).to_string(), "500.0");
        assert_eq!(Literal::from(12.5).to_string(), "12.5");
        assert_eq!(Literal::from("O'Connor").to_string(), "'O''Connor'");
    }

    #[test]
    fn test_temporal_rendering() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(Literal::from(d).to_string(), "'2024-01-31'");

        let ts = d.and_hms_opt(8, 5, 0).unwrap();
        assert_eq!(Literal::from(ts).to_string(), "'2024-01-31 08:05:00'");
    }

    #[test]
    fn test_parse_timestamp_normalizes_offset() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2024-03-01T10:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01 10:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T12:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_placeholder_detection() {
        assert_eq!(Literal::from("{{start_date}}").placeholder(), Some("start_date"));
        assert_eq!(Literal::from("{{ start_date }}").placeholder(), None);
        assert_eq!(Literal::from("{{}}").placeholder(), None);
        assert_eq!(Literal::from("start_date").placeholder(), None);
        assert_eq!(Literal::Int(1).placeholder(), None);
    }

    #[test]
    fn test_literal_kinds() {
        assert_eq!(Literal::Int(1).kind(), Literal::Float(1.5).kind());
        assert_ne!(Literal::Int(1).kind(), Literal::from("1").kind());
    }
}
