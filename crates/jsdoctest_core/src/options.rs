//! Per-sample options parsed from a code fence annotation.
//!
//! A fence such as ```` ```js#skip#assert=chai ```` carries the annotation `#skip#assert=chai`.
//! Each `#`-separated part is either a flag (`skip`) or a `key=value` pair (`assert=chai`).
//! Options override the run-wide [`Config`](crate::Config) for the same key.

use std::fmt;

use indexmap::IndexMap;

/// A single option value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// Bare `#key`
    Flag,
    /// `#key=value`
    Text(String),
}

impl OptionValue {
    /// Truthiness of the value: flags are true, text is true unless empty, `false` or `0`.
    pub fn is_truthy(&self) -> bool {
        match self {
            OptionValue::Flag => true,
            OptionValue::Text(s) => !(s.is_empty() || s == "false" || s == "0"),
        }
    }

    /// The value as a selector string; a bare flag reads as `true`.
    pub fn as_str(&self) -> &str {
        match self {
            OptionValue::Flag => "true",
            OptionValue::Text(s) => s,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered set of per-sample options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    values: IndexMap<String, OptionValue>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an annotation like `#skip#assert=chai`.
    ///
    /// Empty parts are dropped, the first `=` splits key from value, and a repeated key keeps its
    /// original position but takes the later value.
    pub fn parse(annotation: &str) -> Self {
        let mut options = Self::new();
        for part in annotation.split('#').filter(|p| !p.is_empty()) {
            match part.split_once('=') {
                Some((key, value)) => options.set(key, OptionValue::Text(value.to_string())),
                None => options.set(part, OptionValue::Flag),
            }
        }
        options
    }

    pub fn set(&mut self, key: impl Into<String>, value: OptionValue) {
        self.values.insert(key.into(), value);
    }

    /// Builder-style [`Options::set`]
    pub fn with(mut self, key: impl Into<String>, value: OptionValue) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    /// Text of an option, treating empty text as absent.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).map(OptionValue::as_str).filter(|s| !s.is_empty())
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some_and(OptionValue::is_truthy)
    }

    /// Whether the sample must be reported as skipped instead of executed.
    pub fn skip(&self) -> bool {
        self.is_set("skip")
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl fmt::Display for Options {
    /// Renders back to annotation form (`#skip#assert=chai`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.iter() {
            match value {
                OptionValue::Flag => write!(f, "#{key}")?,
                OptionValue::Text(text) => write!(f, "#{key}={text}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags_and_values() {
        let options = Options::parse("#skip#assert=chai");
        assert_eq!(options.get("skip"), Some(&OptionValue::Flag));
        assert_eq!(options.get("assert"), Some(&OptionValue::Text("chai".to_string())));
        assert!(options.skip());
    }

    #[test]
    fn test_parse_empty_annotation() {
        assert!(Options::parse("").is_empty());
        assert!(Options::parse("###").is_empty());
        assert!(!Options::parse("").skip());
    }

    #[test]
    fn test_value_keeps_text_after_first_equals() {
        let options = Options::parse("#path=a=b");
        assert_eq!(options.text("path"), Some("a=b"));
    }

    #[test]
    fn test_later_key_wins() {
        let options = Options::parse("#assert=node#assert=chai");
        assert_eq!(options.text("assert"), Some("chai"));
        assert_eq!(options.iter().count(), 1);
    }

    #[test]
    fn test_skip_truthiness() {
        assert!(Options::parse("#skip=yes").skip());
        assert!(!Options::parse("#skip=false").skip());
        assert!(!Options::parse("#skip=0").skip());
        assert!(!Options::parse("#skip=").skip());
    }

    #[test]
    fn test_flag_reads_as_true() {
        let options = Options::parse("#assert");
        assert_eq!(options.text("assert"), Some("true"));
    }

    #[test]
    fn test_display_roundtrips_order() {
        let options = Options::parse("#skip#assert=chai#path=./lib");
        assert_eq!(options.to_string(), "#skip#assert=chai#path=./lib");
    }
}
