//! Headless editor: document, fold model and dim layer behind the engine's host traits.

use crate::dim_layer::DimLayer;
use crate::document::Document;
use crate::fold_model::FoldModel;
use regex_fold::{
    DimSpan, DocumentSource, EditOutcome, FoldEditor, HostError, OwnedRegion, OwnerMarker,
    RegionEdit, RegionHost,
};
use std::borrow::Cow;
use std::ops::Range;

/// A text edit that was applied to the document, in char offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEdit {
    /// Where the edit starts.
    pub offset: usize,
    /// Chars removed.
    pub removed: usize,
    /// Chars inserted.
    pub inserted: usize,
}

/// An in-memory editor with no UI.
///
/// Fold regions and dim spans follow text edits. A warmup count makes the editor refuse its
/// first batches with [`HostError::NotReady`], like an editor whose folding support is still
/// initializing.
#[derive(Debug, Clone, Default)]
pub struct HeadlessEditor {
    document: Document,
    folds: FoldModel,
    dims: DimLayer,
    file_name: Option<String>,
    warmup: usize,
    batches: usize,
    disposed: bool,
}

impl HeadlessEditor {
    /// Open an editor on `text`.
    pub fn new(text: &str) -> Self {
        Self {
            document: Document::from_text(text),
            ..Self::default()
        }
    }

    /// Set the edited file's name.
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Refuse the first `batches` batches with [`HostError::NotReady`].
    pub fn with_warmup(mut self, batches: usize) -> Self {
        self.warmup = batches;
        self
    }

    /// The document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The fold model.
    pub fn folds(&self) -> &FoldModel {
        &self.folds
    }

    /// Mutable access to the fold model, for regions created by other sources.
    pub fn folds_mut(&mut self) -> &mut FoldModel {
        &mut self.folds
    }

    /// The dim layer.
    pub fn dim_layer(&self) -> &DimLayer {
        &self.dims
    }

    /// Replace the dim layer's spans.
    pub fn set_dim_spans(&mut self, spans: Vec<DimSpan>) {
        self.dims.replace(spans);
    }

    /// Batches received so far, refused ones included.
    pub fn batches_received(&self) -> usize {
        self.batches
    }

    /// Close the editor. Every later region call fails with [`HostError::Disposed`].
    pub fn dispose(&mut self) {
        self.disposed = true;
    }

    /// Insert `text` at `offset`.
    pub fn insert_text(&mut self, offset: usize, text: &str) -> TextEdit {
        let offset = offset.min(self.document.char_count());
        let inserted = self.document.insert(offset, text);
        self.after_edit(TextEdit {
            offset,
            removed: 0,
            inserted,
        })
    }

    /// Delete the chars in `range`.
    pub fn delete_text(&mut self, range: Range<usize>) -> TextEdit {
        let offset = range.start.min(self.document.char_count());
        let removed = self.document.delete(offset, range.len());
        self.after_edit(TextEdit {
            offset,
            removed,
            inserted: 0,
        })
    }

    fn after_edit(&mut self, edit: TextEdit) -> TextEdit {
        let dropped = self
            .folds
            .apply_edit(edit.offset, edit.removed, edit.inserted);
        if !dropped.is_empty() {
            tracing::debug!(
                dropped = dropped.len(),
                offset = edit.offset,
                "edit dropped fold regions"
            );
        }
        self.dims.apply_edit(edit.offset, edit.removed, edit.inserted);
        edit
    }

    /// The document as displayed: every outermost collapsed region replaced by its placeholder.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut pos = 0;
        for fold in self.folds.outermost_collapsed() {
            out.push_str(&self.document.slice(pos..fold.region.start));
            out.push_str(&fold.placeholder);
            pos = fold.region.end;
        }
        out.push_str(&self.document.slice(pos..self.document.char_count()));
        out
    }
}

impl RegionHost for HeadlessEditor {
    fn owned_regions(&self, owner: &OwnerMarker) -> Result<Vec<OwnedRegion>, HostError> {
        if self.disposed {
            return Err(HostError::Disposed);
        }
        Ok(self.folds.owned_by(owner))
    }

    fn apply_batch(
        &mut self,
        owner: &OwnerMarker,
        edits: &[RegionEdit],
    ) -> Result<Vec<EditOutcome>, HostError> {
        if self.disposed {
            return Err(HostError::Disposed);
        }
        self.batches += 1;
        if self.warmup > 0 {
            self.warmup -= 1;
            tracing::debug!(remaining = self.warmup, "batch refused during warmup");
            return Err(HostError::NotReady);
        }

        let outcomes = self
            .folds
            .apply_batch(owner, edits, self.document.char_count());
        tracing::trace!(edits = edits.len(), "batch applied");
        Ok(outcomes)
    }
}

impl DocumentSource for HeadlessEditor {
    fn text(&self) -> Cow<'_, str> {
        Cow::Owned(self.document.text())
    }

    fn line_count(&self) -> usize {
        self.document.line_count()
    }

    fn line_range(&self, line: usize) -> Option<Range<usize>> {
        self.document.line_range(line)
    }

    fn line_text(&self, line: usize) -> Option<String> {
        self.document.line_text(line)
    }
}

impl FoldEditor for HeadlessEditor {
    fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex_fold::{CollapseRegion, RegionHandle};

    fn create(start: usize, end: usize) -> RegionEdit {
        RegionEdit::Create {
            region: CollapseRegion::new(start, end),
            placeholder: "...".to_string(),
            collapsed: true,
        }
    }

    #[test]
    fn test_warmup_refuses_whole_batches() {
        let owner = OwnerMarker::default();
        let mut editor = HeadlessEditor::new("a\nb\nc\n").with_warmup(1);

        assert_eq!(
            editor.apply_batch(&owner, &[create(1, 3)]),
            Err(HostError::NotReady)
        );
        assert!(editor.owned_regions(&owner).unwrap().is_empty());

        let outcomes = editor.apply_batch(&owner, &[create(1, 3)]).unwrap();
        assert_eq!(outcomes, vec![Ok(Some(RegionHandle(0)))]);
        assert_eq!(editor.batches_received(), 2);
    }

    #[test]
    fn test_render_replaces_collapsed_regions() {
        let owner = OwnerMarker::default();
        let mut editor = HeadlessEditor::new("A\nSTART\nfoo\nbar\nEND\nB\n");
        editor.apply_batch(&owner, &[create(7, 19)]).unwrap();

        assert_eq!(editor.render(), "A\nSTART...\nB\n");
    }

    #[test]
    fn test_text_edits_move_regions() {
        let owner = OwnerMarker::default();
        let mut editor = HeadlessEditor::new("A\nSTART\nfoo\nEND\n");
        editor.apply_batch(&owner, &[create(7, 15)]).unwrap();

        let edit = editor.insert_text(0, "xx");
        assert_eq!(
            edit,
            TextEdit {
                offset: 0,
                removed: 0,
                inserted: 2
            }
        );
        let owned = editor.owned_regions(&owner).unwrap();
        assert_eq!(owned[0].region, CollapseRegion::new(9, 17));

        editor.delete_text(10..12);
        assert!(editor.owned_regions(&owner).unwrap().is_empty());
    }

    #[test]
    fn test_disposed_editor_refuses_everything() {
        let owner = OwnerMarker::default();
        let mut editor = HeadlessEditor::new("text");
        editor.dispose();

        assert!(editor.is_disposed());
        assert_eq!(editor.owned_regions(&owner), Err(HostError::Disposed));
        assert_eq!(editor.apply_batch(&owner, &[]), Err(HostError::Disposed));
    }
}
