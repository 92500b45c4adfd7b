use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The closed set of element kinds a declared property shape can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    String,
    Double,
    Long,
    Int,
    Duration,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Double => write!(f, "double"),
            Self::Long => write!(f, "long"),
            Self::Int => write!(f, "int"),
            Self::Duration => write!(f, "duration"),
        }
    }
}

/// Conversion function from a single raw token to a typed value.
///
/// Canonical parsers carry the `ElementKind` they convert to; shape
/// resolution dispatches on that tag. Parsers built with [`custom`] carry no
/// tag and cannot back a declared shape.
///
/// [`custom`]: ElementParser::custom
pub struct ElementParser<T> {
    kind: Option<ElementKind>,
    convert: Arc<dyn Fn(&str) -> Result<T> + Send + Sync>,
}

impl<T> ElementParser<T> {
    pub fn custom(convert: impl Fn(&str) -> Result<T> + Send + Sync + 'static) -> Self {
        Self {
            kind: None,
            convert: Arc::new(convert),
        }
    }

    fn canonical(
        kind: ElementKind,
        convert: impl Fn(&str) -> Result<T> + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind: Some(kind),
            convert: Arc::new(convert),
        }
    }

    pub fn kind(&self) -> Option<ElementKind> {
        self.kind
    }

    pub fn parse(&self, token: &str) -> Result<T> {
        (*self.convert)(token)
    }
}

impl<T> Clone for ElementParser<T> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            convert: Arc::clone(&self.convert),
        }
    }
}

impl ElementParser<String> {
    pub fn string() -> Self {
        Self::canonical(ElementKind::String, |token| Ok(token.to_owned()))
    }
}

impl ElementParser<f64> {
    pub fn double() -> Self {
        Self::canonical(ElementKind::Double, |token| {
            token
                .parse::<f64>()
                .map_err(|err| Error::Conversion(format!("invalid double '{token}': {err}")))
        })
    }
}

impl ElementParser<i64> {
    pub fn long() -> Self {
        Self::canonical(ElementKind::Long, |token| {
            token
                .parse::<i64>()
                .map_err(|err| Error::Conversion(format!("invalid long '{token}': {err}")))
        })
    }
}

impl ElementParser<i32> {
    pub fn int() -> Self {
        Self::canonical(ElementKind::Int, |token| {
            token
                .parse::<i32>()
                .map_err(|err| Error::Conversion(format!("invalid int '{token}': {err}")))
        })
    }
}

impl ElementParser<Duration> {
    pub fn duration() -> Self {
        Self::canonical(ElementKind::Duration, |token| parse_duration(token))
    }
}

/// Duration tokens are an integral count plus an optional unit suffix; a bare
/// count means milliseconds. Whitespace around the count is tolerated.
fn parse_duration(token: &str) -> Result<Duration> {
    let trimmed = token.trim();
    let unit_start = trimmed
        .find(|ch: char| ch.is_ascii_alphabetic())
        .unwrap_or(trimmed.len());
    let (count_part, unit) = trimmed.split_at(unit_start);

    let count = count_part
        .trim_end()
        .parse::<u64>()
        .map_err(|err| Error::Conversion(format!("invalid duration '{token}': {err}")))?;

    let scaled = |factor: u64| {
        count
            .checked_mul(factor)
            .ok_or_else(|| Error::Conversion(format!("invalid duration '{token}': out of range")))
    };

    match unit {
        "" | "ms" | "millis" | "milliseconds" => Ok(Duration::from_millis(count)),
        "ns" | "nanos" | "nanoseconds" => Ok(Duration::from_nanos(count)),
        "us" | "micros" | "microseconds" => Ok(Duration::from_micros(count)),
        "s" | "seconds" => Ok(Duration::from_secs(count)),
        "m" | "minutes" => Ok(Duration::from_secs(scaled(60)?)),
        "h" | "hours" => Ok(Duration::from_secs(scaled(60 * 60)?)),
        "d" | "days" => Ok(Duration::from_secs(scaled(24 * 60 * 60)?)),
        other => Err(Error::Conversion(format!(
            "invalid duration '{token}': unknown unit '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{ElementKind, ElementParser};

    #[test]
    fn string_parser_passes_tokens_through() {
        let parser = ElementParser::string();
        assert_eq!(parser.kind(), Some(ElementKind::String));
        assert_eq!(parser.parse("hello").unwrap(), "hello");
        assert_eq!(parser.parse("").unwrap(), "");
    }

    #[test]
    fn numeric_parsers_convert_and_reject() {
        assert_eq!(ElementParser::int().parse("42").unwrap(), 42);
        assert_eq!(ElementParser::long().parse("-7").unwrap(), -7);
        assert_eq!(ElementParser::double().parse("1.5").unwrap(), 1.5);

        let error = ElementParser::int()
            .parse("forty-two")
            .expect_err("non-numeric token should fail");
        assert!(error.to_string().contains("invalid int 'forty-two'"));
    }

    #[test]
    fn duration_parser_accepts_unit_suffixes() {
        let parser = ElementParser::duration();
        assert_eq!(parser.parse("100").unwrap(), Duration::from_millis(100));
        assert_eq!(parser.parse("100ms").unwrap(), Duration::from_millis(100));
        assert_eq!(parser.parse("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parser.parse("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parser.parse("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parser.parse("1d").unwrap(), Duration::from_secs(86_400));
        assert_eq!(parser.parse("250us").unwrap(), Duration::from_micros(250));
        assert_eq!(parser.parse("10nanos").unwrap(), Duration::from_nanos(10));
        assert_eq!(parser.parse("3 seconds").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn duration_parser_rejects_malformed_tokens() {
        let parser = ElementParser::duration();
        assert!(parser.parse("-5s").is_err());
        assert!(parser.parse("1.5s").is_err());
        assert!(parser.parse("5lightyears").is_err());
        assert!(parser.parse("").is_err());

        let error = parser.parse("5w").expect_err("unknown unit should fail");
        assert!(error.to_string().contains("unknown unit 'w'"));
    }

    #[test]
    fn custom_parsers_carry_no_kind() {
        let parser = ElementParser::custom(|token| Ok(token.len()));
        assert_eq!(parser.kind(), None);
        assert_eq!(parser.parse("abc").unwrap(), 3);
    }
}
