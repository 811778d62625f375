//! Rule matching
//!
//! A rule is either a case-sensitive literal substring or a regex searched
//! anywhere in the content. The variant is decided once at parse time from
//! the raw string form (`regex:` prefix), never re-sniffed per evaluation.
//! A regex that fails to compile leaves the rule inert: it never matches
//! and never aborts classification.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Prefix marking a raw rule string as a regular expression
pub const REGEX_PREFIX: &str = "regex:";

/// A single classification rule, parsed from its raw config string
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Rule {
    /// Case-sensitive substring match, no normalization
    Literal(String),
    /// Search-anywhere regex match; `compiled` is `None` when the pattern
    /// failed to compile and the rule contributes no matches
    Regex {
        pattern: String,
        compiled: Option<Regex>,
    },
}

impl Rule {
    /// Parse a raw rule string.
    ///
    /// An invalid regex is reported once here and the rule stays inert.
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix(REGEX_PREFIX) {
            Some(pattern) => {
                let compiled = match Regex::new(pattern) {
                    Ok(re) => Some(re),
                    Err(e) => {
                        eprintln!("[RuleMatcher] Invalid regex '{}': {}", pattern, e);
                        None
                    }
                };
                Rule::Regex {
                    pattern: pattern.to_string(),
                    compiled,
                }
            }
            None => Rule::Literal(raw.to_string()),
        }
    }

    /// Check whether this rule matches the given content
    pub fn matches(&self, content: &str) -> bool {
        match self {
            Rule::Literal(pattern) => content.contains(pattern.as_str()),
            Rule::Regex { compiled, .. } => match compiled {
                Some(re) => re.is_match(content),
                None => false,
            },
        }
    }

    /// The raw config-file form of this rule
    pub fn raw(&self) -> String {
        match self {
            Rule::Literal(pattern) => pattern.clone(),
            Rule::Regex { pattern, .. } => format!("{}{}", REGEX_PREFIX, pattern),
        }
    }

    /// Whether the rule can ever match (false for uncompilable regexes)
    pub fn is_valid(&self) -> bool {
        !matches!(self, Rule::Regex { compiled: None, .. })
    }
}

// Rules are compared by their raw string form; compiled state is derived.
impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.raw() == other.raw()
    }
}

impl Eq for Rule {}

impl From<String> for Rule {
    fn from(raw: String) -> Self {
        Rule::parse(&raw)
    }
}

impl From<Rule> for String {
    fn from(rule: Rule) -> Self {
        rule.raw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_substring_match() {
        let rule = Rule::parse("def ");
        assert!(rule.matches("def main():"));
        assert!(rule.matches("    def helper():"));
        assert!(!rule.matches("definitely not")); // no trailing space after "def"
    }

    #[test]
    fn test_literal_is_case_sensitive() {
        let rule = Rule::parse("Hello");
        assert!(rule.matches("Hello world"));
        assert!(!rule.matches("hello world"));
    }

    #[test]
    fn test_regex_prefix_parses_as_regex() {
        let rule = Rule::parse("regex:^https?://");
        assert!(matches!(rule, Rule::Regex { .. }));
        assert!(rule.matches("https://example.com"));
        assert!(!rule.matches("see https later")); // anchored pattern, not at start
    }

    #[test]
    fn test_regex_searches_anywhere() {
        let rule = Rule::parse(r"regex:\d{3}-\d{4}");
        assert!(rule.matches("call 555-1234 now"));
    }

    #[test]
    fn test_invalid_regex_is_inert() {
        let rule = Rule::parse("regex:(");
        assert!(!rule.is_valid());
        assert!(!rule.matches("anything ("));
        assert!(!rule.matches(""));
    }

    #[test]
    fn test_raw_round_trip() {
        for raw in ["def ", "regex:^bar", "regex:(", "=>"] {
            assert_eq!(Rule::parse(raw).raw(), raw);
        }
    }

    #[test]
    fn test_serde_round_trips_through_raw_string() {
        let rules: Vec<Rule> = serde_json::from_str(r#"["import ", "regex:https?://"]"#).unwrap();
        assert_eq!(rules[0], Rule::Literal("import ".to_string()));
        assert!(rules[1].matches("http://x"));

        let json = serde_json::to_string(&rules).unwrap();
        assert_eq!(json, r#"["import ","regex:https?://"]"#);
    }

    #[test]
    fn test_equality_ignores_compiled_state() {
        assert_eq!(Rule::parse("regex:a+"), Rule::parse("regex:a+"));
        assert_ne!(Rule::parse("a+"), Rule::parse("regex:a+"));
    }
}
