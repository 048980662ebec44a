//! Decides whether a user message is "the" question.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// How the trigger is compared against user input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Normalized input equals the normalized trigger
    Exact,
    /// Normalized input contains the normalized trigger
    #[default]
    Contains,
    /// Trigger is a case-insensitive regular expression run on the raw input
    #[serde(alias = "regex")]
    Pattern,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Exact => "exact",
            MatchMode::Contains => "contains",
            MatchMode::Pattern => "pattern",
        }
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

fn compile(trigger: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(trigger).case_insensitive(true).build()
}

/// Check `input` against `trigger` using `mode`.
///
/// An invalid pattern never matches.
pub fn matches(input: &str, mode: MatchMode, trigger: &str) -> bool {
    match mode {
        MatchMode::Exact => normalize(input) == normalize(trigger),
        MatchMode::Contains => normalize(input).contains(&normalize(trigger)),
        MatchMode::Pattern => compile(trigger)
            .map(|re| re.is_match(input))
            .unwrap_or(false),
    }
}

/// A trigger bound to its mode, with the pattern compiled up front.
#[derive(Debug, Clone)]
pub struct Matcher {
    mode: MatchMode,
    trigger: String,
    // None when mode is Pattern and the trigger failed to compile
    pattern: Option<Regex>,
}

impl Matcher {
    pub fn new(mode: MatchMode, trigger: &str) -> Self {
        let pattern = match mode {
            MatchMode::Pattern => match compile(trigger) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::warn!(trigger, error = %e, "trigger pattern does not compile, it will never match");
                    None
                }
            },
            MatchMode::Exact | MatchMode::Contains => None,
        };

        Self {
            mode,
            trigger: normalize(trigger),
            pattern,
        }
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn is_match(&self, input: &str) -> bool {
        match self.mode {
            MatchMode::Exact => normalize(input) == self.trigger,
            MatchMode::Contains => normalize(input).contains(&self.trigger),
            MatchMode::Pattern => self
                .pattern
                .as_ref()
                .map(|re| re.is_match(input))
                .unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_ignores_case_and_surrounding_whitespace() {
        assert!(matches("  HI \n", MatchMode::Exact, "hi"));
        assert!(matches("hi", MatchMode::Exact, "  Hi  "));
        assert!(!matches("hi there", MatchMode::Exact, "hi"));
        assert!(!matches("h i", MatchMode::Exact, "hi"));
    }

    #[test]
    fn exact_agrees_with_normalized_equality() {
        let cases = [
            ("Hello", "hello"),
            ("hello ", " HELLO"),
            ("hell", "hello"),
            ("", ""),
            ("   ", ""),
            ("ÉCOLE", "école"),
        ];
        for (input, trigger) in cases {
            let expected = input.trim().to_lowercase() == trigger.trim().to_lowercase();
            assert_eq!(matches(input, MatchMode::Exact, trigger), expected, "{input:?} vs {trigger:?}");
        }
    }

    #[test]
    fn contains_finds_trigger_anywhere() {
        let trigger = "do engineers have common traits?";
        assert!(matches("Do Engineers Have Common Traits?", MatchMode::Contains, trigger));
        assert!(matches(
            "so... do engineers have common traits? asking for a friend",
            MatchMode::Contains,
            trigger
        ));
        assert!(!matches("what is the weather", MatchMode::Contains, trigger));
        assert!(!matches("do engineers have traits?", MatchMode::Contains, trigger));
    }

    #[test]
    fn empty_trigger_is_contained_in_everything() {
        assert!(matches("anything", MatchMode::Contains, "   "));
        assert!(matches("", MatchMode::Contains, ""));
    }

    #[test]
    fn pattern_is_case_insensitive_on_raw_input() {
        assert!(matches("Do ENGINEERS share traits", MatchMode::Pattern, r"engineers?\s+share"));
        // raw input is not trimmed before matching
        assert!(!matches("  hello", MatchMode::Pattern, "^hello"));
        assert!(matches("HELLO world", MatchMode::Pattern, "^hello"));
    }

    #[test]
    fn invalid_pattern_fails_closed() {
        for input in ["(", "", "anything at all", "(("] {
            assert!(!matches(input, MatchMode::Pattern, "("));
        }
        assert!(!matches("abc", MatchMode::Pattern, "[a-"));
    }

    #[test]
    fn matcher_agrees_with_free_function() {
        let inputs = ["hi", " HI ", "hi there", "oh hi", "", "(", "HELLO world"];
        let triggers = ["hi", "Hi ", "(", "^hello", "there$"];
        for mode in [MatchMode::Exact, MatchMode::Contains, MatchMode::Pattern] {
            for trigger in triggers {
                let matcher = Matcher::new(mode, trigger);
                for input in inputs {
                    assert_eq!(
                        matcher.is_match(input),
                        matches(input, mode, trigger),
                        "{} {trigger:?} {input:?}",
                        mode.as_str()
                    );
                }
            }
        }
    }
}
