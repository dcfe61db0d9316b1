//! Match location: run rules over a document and attach line-span metadata to each hit.

use crate::observer::{FoldEvent, FoldObserver};
use crate::rule::{RawMatch, Rule};
use std::ops::Range;

/// A match with the line span it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiLineMatch {
    /// First line of the match (0-based).
    pub start_line: usize,
    /// Last line of the match (0-based, inclusive).
    pub end_line: usize,
    /// Text of the match up to its first `\n`.
    pub first_line_text: String,
    /// `end_line - start_line + 1`.
    pub total_lines: usize,
    /// Matched range (char offsets, `[start, end)`).
    pub range: Range<usize>,
}

impl MultiLineMatch {
    /// Build line metadata for `raw`, given how many newlines precede it in the document.
    pub fn from_raw(raw: &RawMatch, newlines_before: usize) -> Self {
        let mut lines = raw.text.split('\n');
        let first_line_text = lines.next().unwrap_or_default().to_string();
        let total_lines = 1 + lines.count();
        Self {
            start_line: newlines_before,
            end_line: newlines_before + total_lines - 1,
            first_line_text,
            total_lines,
            range: raw.range.clone(),
        }
    }

    /// Returns `true` if the match spans more than one line and may become a region.
    pub fn is_actionable(&self) -> bool {
        self.total_lines > 1
    }
}

/// A match together with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedMatch {
    /// Index of the producing rule in the rule list.
    pub rule: usize,
    /// The match and its line span.
    pub info: MultiLineMatch,
}

/// Run every rule over `text`, in rule order, and return all matches with line metadata.
///
/// Within a rule matches keep discovery order. Single-line matches are included; the resolver
/// ignores them.
pub fn locate(text: &str, rules: &[Rule], observer: &dyn FoldObserver) -> Vec<LocatedMatch> {
    let mut located = Vec::new();

    for (index, rule) in rules.iter().enumerate() {
        if let Err(error) = rule.compile() {
            observer.on_event(&FoldEvent::RuleSkipped { rule: index, error });
            continue;
        }

        let raw_matches = rule.find_all(text);
        let mut actionable = 0usize;

        // Matches come in increasing offset order, so newlines are counted incrementally.
        let mut newlines = 0usize;
        let mut counted_to = 0usize;
        let mut chars = text.char_indices();

        for raw in &raw_matches {
            for (_, ch) in chars.by_ref().take(raw.range.start - counted_to) {
                if ch == '\n' {
                    newlines += 1;
                }
            }
            counted_to = raw.range.start;

            let info = MultiLineMatch::from_raw(raw, newlines);
            if info.is_actionable() {
                actionable += 1;
            }
            located.push(LocatedMatch { rule: index, info });
        }

        observer.on_event(&FoldEvent::RuleMatched {
            rule: index,
            matches: raw_matches.len(),
            actionable,
        });
    }

    located
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{NoopObserver, RecordingObserver};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_locate_line_metadata() {
        let text = "A\nSTART\nfoo\nbar\nEND\nB\n";
        let rules = vec![Rule::new(r"START[\s\S]*?END", "")];

        let located = locate(text, &rules, &NoopObserver);
        assert_eq!(located.len(), 1);
        assert_eq!(
            located[0].info,
            MultiLineMatch {
                start_line: 1,
                end_line: 4,
                first_line_text: "START".to_string(),
                total_lines: 4,
                range: 2..19,
            }
        );
    }

    #[test]
    fn test_locate_keeps_rule_then_discovery_order() {
        let text = "x1\nx2\ny1\ny2";
        let rules = vec![Rule::new(r"y\d", ""), Rule::new(r"x\d", "")];

        let located = locate(text, &rules, &NoopObserver);
        let summary: Vec<(usize, usize, usize)> = located
            .iter()
            .map(|m| (m.rule, m.info.range.start, m.info.start_line))
            .collect();
        assert_eq!(summary, vec![(0, 6, 2), (0, 9, 3), (1, 0, 0), (1, 3, 1)]);
    }

    #[test]
    fn test_single_line_matches_are_not_actionable() {
        let located = locate("abc\nabc", &[Rule::new("abc", "")], &NoopObserver);
        assert_eq!(located.len(), 2);
        assert!(located.iter().all(|m| !m.info.is_actionable()));
        assert_eq!(located[1].info.start_line, 1);
    }

    #[test]
    fn test_locate_reports_per_rule_counts() {
        let observer = RecordingObserver::new();
        let rules = vec![Rule::new("(", ""), Rule::new(r"a\nb", "")];
        locate("a\nb a\nb", &rules, &observer);

        let events = observer.events();
        assert!(matches!(events[0], FoldEvent::RuleSkipped { rule: 0, .. }));
        assert_eq!(
            events[1],
            FoldEvent::RuleMatched {
                rule: 1,
                matches: 2,
                actionable: 2
            }
        );
    }
}
