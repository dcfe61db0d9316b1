//! Region resolution: turn located matches into a conflict-free list of collapse regions.

use crate::locate::{LocatedMatch, MultiLineMatch, locate};
use crate::observer::{FoldEvent, FoldObserver};
use crate::region::CollapseRegion;
use crate::rule::Rule;

/// Candidate region for one match: from the newline ending its first line to the match end.
///
/// Returns `None` for single-line matches and for multi-line matches whose first newline
/// cannot be located inside the match.
pub fn region_for_match(info: &MultiLineMatch) -> Option<CollapseRegion> {
    if !info.is_actionable() {
        return None;
    }
    let first_newline = info.range.start + info.first_line_text.chars().count();
    let region = CollapseRegion::new(first_newline, info.range.end);
    (first_newline < info.range.end).then_some(region)
}

/// Accepted regions sorted by start. Accepted regions never overlap, so only the neighbours
/// of an insertion point need checking.
#[derive(Debug, Default)]
struct Accepted {
    sorted: Vec<CollapseRegion>,
}

impl Accepted {
    fn try_accept(&mut self, candidate: CollapseRegion) -> bool {
        let pos = self.sorted.partition_point(|r| r.start < candidate.start);

        let hits_prev = pos > 0 && self.sorted[pos - 1].overlaps(&candidate);
        let hits_next = self
            .sorted
            .get(pos)
            .is_some_and(|next| next.overlaps(&candidate));
        if hits_prev || hits_next {
            return false;
        }

        self.sorted.insert(pos, candidate);
        true
    }
}

/// Resolve matches into regions, in the order received.
///
/// Earlier matches take precedence: a candidate overlapping any already accepted region is
/// dropped, never split or merged. The result is pairwise non-overlapping and deterministic.
pub fn resolve(matches: &[LocatedMatch], observer: &dyn FoldObserver) -> Vec<CollapseRegion> {
    let mut accepted = Accepted::default();
    let mut regions = Vec::new();

    for located in matches {
        if !located.info.is_actionable() {
            continue;
        }

        let Some(candidate) = region_for_match(&located.info) else {
            observer.on_event(&FoldEvent::DegenerateMatch {
                rule: located.rule,
                range: located.info.range.clone(),
            });
            continue;
        };

        if accepted.try_accept(candidate) {
            regions.push(candidate);
        } else {
            observer.on_event(&FoldEvent::OverlapRejected {
                rule: located.rule,
                region: candidate,
            });
        }
    }

    observer.on_event(&FoldEvent::RegionsResolved {
        regions: regions.len(),
    });
    regions
}

/// `resolve(locate(text, rules))`.
pub fn find_regions(
    text: &str,
    rules: &[Rule],
    observer: &dyn FoldObserver,
) -> Vec<CollapseRegion> {
    resolve(&locate(text, rules, observer), observer)
}

/// A char-offset span to be rendered dimmed: every line of a match after the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimSpan {
    /// Start offset (chars, inclusive): first char after the first-line newline.
    pub start: usize,
    /// End offset (chars, exclusive).
    pub end: usize,
    /// Index of the producing rule.
    pub rule: usize,
}

/// Dim spans for all actionable matches. Spans may overlap; empty spans are dropped.
pub fn dim_spans(matches: &[LocatedMatch]) -> Vec<DimSpan> {
    matches
        .iter()
        .filter_map(|located| {
            let region = region_for_match(&located.info)?;
            let start = region.start + 1;
            (start < region.end).then_some(DimSpan {
                start,
                end: region.end,
                rule: located.rule,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{NoopObserver, RecordingObserver};
    use pretty_assertions::assert_eq;

    fn regions(text: &str, patterns: &[&str]) -> Vec<CollapseRegion> {
        let rules: Vec<Rule> = patterns.iter().map(|p| Rule::new(*p, "")).collect();
        find_regions(text, &rules, &NoopObserver)
    }

    #[test]
    fn test_start_end_block() {
        let text = "A\nSTART\nfoo\nbar\nEND\nB\n";
        let found = regions(text, &[r"START[\s\S]*?END"]);
        assert_eq!(found, vec![CollapseRegion::new(7, 19)]);
        assert_eq!(text.chars().nth(7), Some('\n'));
        assert_eq!(&text[16..19], "END");
    }

    #[test]
    fn test_single_line_match_produces_nothing() {
        assert!(regions("START END\n", &[r"START.*?END"]).is_empty());
    }

    #[test]
    fn test_earlier_rule_wins_overlap() {
        let text = "a\nb\nc\nd";
        // Rule A covers a..c, rule B covers b..d; they overlap.
        let found = regions(text, &[r"a.*c", r"b.*d"]);
        assert_eq!(found, vec![CollapseRegion::new(1, 5)]);

        let found = regions(text, &[r"b.*d", r"a.*c"]);
        assert_eq!(found, vec![CollapseRegion::new(3, 7)]);
    }

    #[test]
    fn test_adjacent_regions_do_not_overlap() {
        // Second match starts right where the first region ends.
        let text = "a\nb\nc\nd";
        let found = regions(text, &[r"a\nb", r"\nc\nd"]);
        assert_eq!(
            found,
            vec![CollapseRegion::new(1, 3), CollapseRegion::new(3, 7)]
        );
    }

    #[test]
    fn test_nested_candidate_rejected() {
        let text = "{\n{\nx\n}\n}";
        let found = regions(text, &[r"\{.*\}", r"\{\nx\n\}"]);
        assert_eq!(found, vec![CollapseRegion::new(1, 9)]);
    }

    #[test]
    fn test_degenerate_match_is_skipped() {
        let observer = RecordingObserver::new();
        let located = vec![LocatedMatch {
            rule: 3,
            info: MultiLineMatch {
                start_line: 0,
                end_line: 1,
                first_line_text: "abc".to_string(),
                total_lines: 2,
                range: 0..3,
            },
        }];
        assert!(resolve(&located, &observer).is_empty());
        assert_eq!(
            observer.events()[0],
            FoldEvent::DegenerateMatch {
                rule: 3,
                range: 0..3
            }
        );
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let text = "START\n1\nEND\nSTART\n2\nEND\n";
        let rules = vec![Rule::new(r"START.*?END", ""), Rule::new(r"\d\nEND", "")];
        let first = find_regions(text, &rules, &NoopObserver);
        let second = find_regions(text, &rules, &NoopObserver);
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_dim_spans_skip_first_line() {
        let text = "A\nSTART\nfoo\nEND";
        let rules = vec![Rule::new(r"START.*?END", "")];
        let spans = dim_spans(&locate(text, &rules, &NoopObserver));
        assert_eq!(
            spans,
            vec![DimSpan {
                start: 8,
                end: 15,
                rule: 0
            }]
        );
    }
}
