//! Dimmed-text style layer.
//!
//! Holds the spans rendered grey/italic (the hidden lines of each match) in a sorted vector with
//! a prefix-max of end offsets, so point and range queries are O(log n + k).

use regex_fold::DimSpan;

/// Dim spans sorted by start.
#[derive(Debug, Clone, Default)]
pub struct DimLayer {
    spans: Vec<DimSpan>,
    /// `prefix_max_end[i] = max(spans[0..=i].end)`.
    prefix_max_end: Vec<usize>,
}

impl DimLayer {
    /// Create an empty layer.
    pub fn new() -> Self {
        Self::default()
    }

    fn rebuild_prefix_max_end(&mut self) {
        let mut max_end = 0;
        self.prefix_max_end.clear();
        self.prefix_max_end.extend(self.spans.iter().map(|span| {
            max_end = max_end.max(span.end);
            max_end
        }));
    }

    /// Replace the whole layer.
    pub fn replace(&mut self, mut spans: Vec<DimSpan>) {
        spans.retain(|s| s.start < s.end);
        spans.sort_by_key(|s| (s.start, s.end));
        self.spans = spans;
        self.rebuild_prefix_max_end();
    }

    /// Spans covering `pos`.
    pub fn query_point(&self, pos: usize) -> Vec<&DimSpan> {
        // All spans with start <= pos are before `idx`.
        let idx = self.spans.partition_point(|s| s.start <= pos);
        let mut result = Vec::new();

        for i in (0..idx).rev() {
            if self.prefix_max_end[i] <= pos {
                break;
            }
            let span = &self.spans[i];
            if pos < span.end {
                result.push(span);
            }
        }

        result
    }

    /// Spans overlapping `[start, end)`.
    pub fn query_range(&self, start: usize, end: usize) -> Vec<&DimSpan> {
        if start >= end {
            return Vec::new();
        }

        let search_end = self.spans.partition_point(|s| s.start < end);
        let mut scan_start = self.spans[..search_end].partition_point(|s| s.start < start);
        while scan_start > 0 && self.prefix_max_end[scan_start - 1] > start {
            scan_start -= 1;
        }

        self.spans[scan_start..search_end]
            .iter()
            .filter(|s| s.start < end && s.end > start)
            .collect()
    }

    /// Returns `true` if `pos` is dimmed.
    pub fn is_dimmed(&self, pos: usize) -> bool {
        !self.query_point(pos).is_empty()
    }

    /// Shift or drop spans for an edit replacing `removed` chars at `offset` with `inserted`.
    ///
    /// Spans touching the edit are dropped; the next resolution pass recomputes them.
    pub fn apply_edit(&mut self, offset: usize, removed: usize, inserted: usize) {
        let edit_end = offset + removed;
        self.spans.retain_mut(|span| {
            let touched = if removed == 0 {
                span.start < offset && offset < span.end
            } else {
                span.start < edit_end && offset < span.end
            };
            if touched {
                return false;
            }
            if span.start >= edit_end {
                span.start = span.start - removed + inserted;
                span.end = span.end - removed + inserted;
            }
            true
        });
        self.rebuild_prefix_max_end();
    }

    /// All spans, sorted by start.
    pub fn spans(&self) -> &[DimSpan] {
        &self.spans
    }

    /// Number of spans.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Returns `true` if the layer is empty.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}
