//! Minimized line previews for the hidden lines of each match.

use crate::host::DocumentSource;
use crate::locate::LocatedMatch;

/// Labels longer than this are truncated.
pub const PREVIEW_MAX_CHARS: usize = 50;

/// A one-line summary of a hidden line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinePreview {
    /// Document line the preview describes.
    pub line: usize,
    /// Char offset of the line start.
    pub offset: usize,
    /// `"[k] text"`, where `k` is the line's position inside its match.
    pub label: String,
}

/// Previews for every non-blank line after the first of each actionable match.
pub fn line_previews(doc: &dyn DocumentSource, matches: &[LocatedMatch]) -> Vec<LinePreview> {
    let line_count = doc.line_count();
    let mut previews = Vec::new();

    for located in matches.iter().filter(|m| m.info.is_actionable()) {
        let info = &located.info;
        for line in (info.start_line + 1)..=info.end_line {
            if line >= line_count {
                break;
            }
            let (Some(range), Some(text)) = (doc.line_range(line), doc.line_text(line)) else {
                continue;
            };
            let trimmed = text.trim();
            if trimmed.is_empty() {
                continue;
            }
            previews.push(LinePreview {
                line,
                offset: range.start,
                label: format!("[{}] {}", line - info.start_line, minimize(trimmed)),
            });
        }
    }

    previews
}

fn minimize(text: &str) -> String {
    if text.chars().count() > PREVIEW_MAX_CHARS {
        let head: String = text.chars().take(PREVIEW_MAX_CHARS - 3).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
