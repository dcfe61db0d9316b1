//! Fold rules: a user pattern plus its lazily compiled matcher.

use crate::error::RuleError;
use crate::text::OffsetMap;
use regex::{Regex, RegexBuilder};
use std::ops::Range;
use std::sync::OnceLock;

/// A single user-defined folding rule.
///
/// Patterns are compiled with multi-line (`^`/`$` match at line boundaries) and
/// dot-matches-newline semantics. Compilation happens on first use and is memoized for the
/// lifetime of the rule; an edited rule is a new `Rule` value.
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: String,
    replacement: String,
    enabled: bool,
    compiled: OnceLock<Result<Regex, RuleError>>,
}

/// One matcher hit, expressed as a half-open character range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMatch {
    /// Matched range (char offsets, `[start, end)`).
    pub range: Range<usize>,
    /// The matched text.
    pub text: String,
}

impl Rule {
    /// Create an enabled rule.
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
            enabled: true,
            compiled: OnceLock::new(),
        }
    }

    /// Set whether the rule is enabled.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// The regex pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The replacement text (carried for the authoring surface; folding does not use it).
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Whether the user enabled this rule.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Compile (or fetch the memoized) matcher.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] if the pattern is empty or does not compile.
    pub fn compile(&self) -> Result<&Regex, RuleError> {
        self.compiled
            .get_or_init(|| compile_pattern(&self.pattern))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Returns `true` if the pattern is non-empty and compiles.
    pub fn is_valid(&self) -> bool {
        self.compile().is_ok()
    }

    /// Returns `true` if the rule matches anywhere in `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.compile().is_ok_and(|re| re.is_match(text))
    }

    /// Find all non-overlapping matches, leftmost first.
    ///
    /// Each search resumes at the end of the previous match, or one character further if the
    /// previous match was empty. An invalid rule matches nothing.
    pub fn find_all(&self, text: &str) -> Vec<RawMatch> {
        let Ok(regex) = self.compile() else {
            return Vec::new();
        };

        let map = OffsetMap::new(text);
        let mut matches = Vec::new();
        let mut at = 0usize;

        while at <= text.len() {
            let Some(m) = regex.find_at(text, at) else {
                break;
            };
            matches.push(RawMatch {
                range: map.to_char(m.start())..map.to_char(m.end()),
                text: m.as_str().to_string(),
            });

            at = if m.is_empty() {
                match text[m.end()..].chars().next() {
                    Some(ch) => m.end() + ch.len_utf8(),
                    None => break,
                }
            } else {
                m.end()
            };
        }

        matches
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
            && self.replacement == other.replacement
            && self.enabled == other.enabled
    }
}

impl Eq for Rule {}

fn compile_pattern(pattern: &str) -> Result<Regex, RuleError> {
    if pattern.is_empty() {
        return Err(RuleError::EmptyPattern);
    }

    RegexBuilder::new(pattern)
        .multi_line(true)
        .dot_matches_new_line(true)
        .build()
        .map_err(|err| {
            tracing::warn!(pattern, error = %err, "rule pattern failed to compile");
            RuleError::InvalidPattern {
                pattern: pattern.to_string(),
                message: err.to_string(),
            }
        })
}
