use crate::backup::result_error::result::Result;

use regex::Regex;
use serde::de::Visitor;
use serde::{Deserialize, Deserializer};

use std::fmt::{Debug, Display, Formatter};
use std::result;

/// A regular expression that only matches from the start of the haystack.
///
/// The pattern is wrapped as `^(?:pattern)`, so `.*\.log$` matches any path ending in
/// `.log` while `docs/` only matches paths that begin with `docs/`. The end of the
/// haystack is not anchored unless the pattern asks for it.
#[derive(Clone)]
pub struct AnchoredRegex {
    pattern: String,
    regex: Regex,
}

impl AnchoredRegex {
    pub fn new<S: Into<String>>(pattern: S) -> Result<Self> {
        let pattern = pattern.into();
        let regex = Regex::new(&format!("^(?:{pattern})"))?;
        Ok(Self { pattern, regex })
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }

    /// The pattern as configured, without the anchoring wrapper.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}

impl Debug for AnchoredRegex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.pattern, f)
    }
}

impl Display for AnchoredRegex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.pattern)
    }
}

struct AnchoredRegexVisitor;

impl Visitor<'_> for AnchoredRegexVisitor {
    type Value = AnchoredRegex;

    fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
        formatter.write_str("a regular expression")
    }

    fn visit_str<E>(self, v: &str) -> result::Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        AnchoredRegex::new(v).map_err(serde::de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for AnchoredRegex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> result::Result<Self, D::Error> {
        deserializer.deserialize_str(AnchoredRegexVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_is_anchored_at_start() {
        let re = AnchoredRegex::new("b").unwrap();
        assert!(re.is_match("b.txt"));
        assert!(!re.is_match("ab.txt"));
    }

    #[test]
    fn test_match_is_not_anchored_at_end() {
        let re = AnchoredRegex::new("/home/me/docs").unwrap();
        assert!(re.is_match("/home/me/docs/a.txt"));
    }

    #[test]
    fn test_alternation_stays_anchored() {
        let re = AnchoredRegex::new("a|b").unwrap();
        assert!(re.is_match("b"));
        assert!(!re.is_match("cb"));
    }

    #[test]
    fn test_suffix_pattern() {
        let re = AnchoredRegex::new(r".*\.log$").unwrap();
        assert!(re.is_match("/tmp/proj/b.log"));
        assert!(!re.is_match("/tmp/proj/b.log.txt"));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(AnchoredRegex::new("[unclosed").is_err());
    }

    #[test]
    fn test_display_and_debug_show_configured_pattern() {
        let re = AnchoredRegex::new(r".*\.txt$").unwrap();
        assert_eq!(re.to_string(), r".*\.txt$");
        assert_eq!(re.as_str(), r".*\.txt$");
        assert_eq!(format!("{re:?}"), format!("{:?}", r".*\.txt$"));
    }

    #[test]
    fn test_deserialize_from_yaml() {
        let patterns: Vec<AnchoredRegex> = serde_yml::from_str("['.*\\.jpe?g$', 'raw/']").unwrap();
        assert_eq!(patterns.len(), 2);
        assert!(patterns[0].is_match("/photos/cat.jpeg"));
        assert!(patterns[1].is_match("raw/img.cr2"));
    }

    #[test]
    fn test_deserialize_invalid_pattern() {
        let result = serde_yml::from_str::<AnchoredRegex>("'(oops'");
        assert!(result.is_err());
    }
}
