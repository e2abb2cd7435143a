//! Body pattern matching.
//!
//! A [`PatternSet`] holds the compiled positive and negative patterns of a
//! monitor and decides whether a body passes:
//!
//! | positive | negative | passes when                                   |
//! |----------|----------|-----------------------------------------------|
//! | set      | empty    | any positive pattern matches                  |
//! | empty    | set      | no negative pattern matches                   |
//! | set      | set      | a positive matches and no negative matches    |
//! | empty    | empty    | never                                         |

use regex::Regex;
use serde_json::Value;
use tracing::trace;

use crate::config::BodyConfig;
use crate::error::ConfigError;
use crate::reason::CheckFailure;

/// A compiled body pattern.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
}

impl Matcher {
    pub fn compile(pattern: &str) -> Result<Self, ConfigError> {
        let regex = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { regex })
    }

    #[inline]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// Compiled positive and negative body patterns.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    positive: Vec<Matcher>,
    negative: Vec<Matcher>,
}

impl PatternSet {
    pub fn new(positive: Vec<Matcher>, negative: Vec<Matcher>) -> Self {
        Self { positive, negative }
    }

    /// Compile the patterns of a `body` setting.
    ///
    /// A plain list contributes only its first string entry, as a positive
    /// pattern. In the object form, string entries under `positive` and
    /// `negative` are compiled in order; the first string entry found under
    /// any other key stops compilation and returns what has been collected
    /// so far.
    pub fn from_config(config: &BodyConfig) -> Result<Self, ConfigError> {
        let mut set = PatternSet::default();

        match config {
            BodyConfig::PlainPatterns(entries) => {
                if let Some(pattern) = entries.iter().find_map(Value::as_str) {
                    set.positive.push(Matcher::compile(pattern)?);
                }
            }
            BodyConfig::PositiveNegativePatterns(map) => {
                for (kind, value) in map {
                    let Value::Array(entries) = value else {
                        continue;
                    };
                    for pattern in entries.iter().filter_map(Value::as_str) {
                        match kind.as_str() {
                            "positive" => set.positive.push(Matcher::compile(pattern)?),
                            "negative" => set.negative.push(Matcher::compile(pattern)?),
                            other => {
                                trace!(key = other, "unrecognized body pattern key, stopping");
                                return Ok(set);
                            }
                        }
                    }
                }
            }
        }

        Ok(set)
    }

    pub fn positive(&self) -> &[Matcher] {
        &self.positive
    }

    pub fn negative(&self) -> &[Matcher] {
        &self.negative
    }

    /// Check a body against the patterns.
    pub fn check(&self, body: &str) -> Result<(), CheckFailure> {
        let mut positive_hit = self.positive.iter().any(|m| m.is_match(body));

        if self.negative.is_empty() {
            return if positive_hit {
                Ok(())
            } else {
                Err(CheckFailure::PositivePatternMismatch)
            };
        }

        // Negative-only sets only need to stay clear of the negatives.
        if self.positive.is_empty() {
            positive_hit = true;
        }

        let negative_hit = self.negative.iter().any(|m| m.is_match(body));

        match (positive_hit, negative_hit) {
            (true, false) => Ok(()),
            (true, true) => Err(CheckFailure::NegativePatternMismatch),
            (false, _) => Err(CheckFailure::PositivePatternMismatch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> BodyConfig {
        match value {
            Value::Object(map) => BodyConfig::PositiveNegativePatterns(map),
            other => panic!("expected object, got {other}"),
        }
    }

    fn patterns(matchers: &[Matcher]) -> Vec<&str> {
        matchers.iter().map(Matcher::as_str).collect()
    }

    #[test]
    fn test_plain_list_uses_first_string_only() {
        let config = BodyConfig::PlainPatterns(vec![json!(1), json!("ok"), json!("later")]);
        let set = PatternSet::from_config(&config).unwrap();

        assert_eq!(patterns(set.positive()), vec!["ok"]);
        assert!(set.negative().is_empty());
    }

    #[test]
    fn test_plain_list_without_strings_is_empty() {
        let config = BodyConfig::PlainPatterns(vec![json!(1), json!(true)]);
        let set = PatternSet::from_config(&config).unwrap();

        assert!(set.positive().is_empty());
        assert!(set.negative().is_empty());
    }

    #[test]
    fn test_object_form_compiles_both_lists() {
        let config = object(json!({
            "positive": ["ok", 7, "up"],
            "negative": ["error"]
        }));
        let set = PatternSet::from_config(&config).unwrap();

        assert_eq!(patterns(set.positive()), vec!["ok", "up"]);
        assert_eq!(patterns(set.negative()), vec!["error"]);
    }

    #[test]
    fn test_object_form_stops_at_unrecognized_key() {
        // Keys are visited in document order; the stray key comes before
        // "negative", so the negative list is never compiled.
        let config = object(json!({
            "positive": ["ok"],
            "typo": ["oops"],
            "negative": ["error"]
        }));
        let set = PatternSet::from_config(&config).unwrap();

        assert_eq!(patterns(set.positive()), vec!["ok"]);
        assert!(set.negative().is_empty());
    }

    #[test]
    fn test_object_form_skips_unrecognized_key_without_strings() {
        let config = object(json!({
            "comment": "not a list",
            "extra": [1, 2],
            "negative": ["error"]
        }));
        let set = PatternSet::from_config(&config).unwrap();

        assert!(set.positive().is_empty());
        assert_eq!(patterns(set.negative()), vec!["error"]);
    }

    #[test]
    fn test_invalid_pattern_fails() {
        let config = BodyConfig::plain(["(unclosed"]);
        let err = PatternSet::from_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { ref pattern, .. } if pattern == "(unclosed"));
    }

    #[test]
    fn test_positive_only() {
        let set = PatternSet::from_config(&BodyConfig::plain(["ok"])).unwrap();

        assert_eq!(set.check("all ok"), Ok(()));
        assert_eq!(set.check("fail"), Err(CheckFailure::PositivePatternMismatch));
    }

    #[test]
    fn test_positive_and_negative() {
        let set =
            PatternSet::from_config(&BodyConfig::positive_negative(["ok"], ["error"])).unwrap();

        assert_eq!(set.check("ok"), Ok(()));
        assert_eq!(
            set.check("ok error"),
            Err(CheckFailure::NegativePatternMismatch)
        );
        assert_eq!(
            set.check("nothing"),
            Err(CheckFailure::PositivePatternMismatch)
        );
        assert_eq!(
            set.check("error only"),
            Err(CheckFailure::PositivePatternMismatch)
        );
    }

    #[test]
    fn test_negative_only() {
        let empty: [&str; 0] = [];
        let set = PatternSet::from_config(&BodyConfig::positive_negative(empty, ["error"])).unwrap();

        assert_eq!(set.check("clean"), Ok(()));
        assert_eq!(
            set.check("an error occurred"),
            Err(CheckFailure::NegativePatternMismatch)
        );
    }

    #[test]
    fn test_no_patterns_never_pass() {
        let set = PatternSet::from_config(&BodyConfig::PlainPatterns(vec![])).unwrap();

        assert_eq!(set.check(""), Err(CheckFailure::PositivePatternMismatch));
        assert_eq!(
            set.check("anything"),
            Err(CheckFailure::PositivePatternMismatch)
        );
    }

    #[test]
    fn test_any_positive_is_enough() {
        let set = PatternSet::from_config(&object(json!({
            "positive": ["^up$", "healthy"],
            "negative": ["degraded", "down"]
        })))
        .unwrap();

        assert_eq!(set.check("service healthy"), Ok(()));
        assert_eq!(set.check("up"), Ok(()));
        assert_eq!(
            set.check("healthy but degraded"),
            Err(CheckFailure::NegativePatternMismatch)
        );
    }

    #[test]
    fn test_regex_syntax_is_honored() {
        let set = PatternSet::from_config(&BodyConfig::plain([r#""version":\s*"\d+\.\d+""#])).unwrap();

        assert_eq!(set.check(r#"{"version": "1.2"}"#), Ok(()));
        assert_eq!(
            set.check(r#"{"version": "dev"}"#),
            Err(CheckFailure::PositivePatternMismatch)
        );
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn negative_only_passes_iff_no_negative_matches(body in "[a-z ]{0,40}") {
                let empty: [&str; 0] = [];
                let set = PatternSet::from_config(&BodyConfig::positive_negative(empty, ["err"])).unwrap();
                prop_assert_eq!(set.check(&body).is_ok(), !body.contains("err"));
            }

            #[test]
            fn positive_miss_always_reports_positive_mismatch(body in "[a-m ]{0,40}") {
                let set = PatternSet::from_config(&BodyConfig::positive_negative(["z"], ["a"])).unwrap();
                prop_assert_eq!(set.check(&body), Err(CheckFailure::PositivePatternMismatch));
            }
        }
    }
}
