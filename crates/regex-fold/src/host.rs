//! Host editor contracts.
//!
//! The engine never touches an editor directly. A host adapter implements these narrow traits:
//!
//! - [`RegionHost`] - list owned regions and apply a batch of [`RegionEdit`]s atomically
//! - [`DocumentSource`] - read-only text snapshot with line access
//! - [`Scheduler`] - deferred execution on the host's apply thread
//! - [`FoldEditor`] - one open editor (regions + document + lifecycle)

use crate::error::HostError;
use crate::region::CollapseRegion;
use std::borrow::Cow;
use std::ops::Range;
use std::time::Duration;

/// Opaque identifier of a live region inside a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionHandle(pub u64);

/// Tag carried by every region this engine creates, so its regions can be told apart from
/// regions created by other sources in the same document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OwnerMarker(pub String);

impl OwnerMarker {
    /// Create a marker from a string tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// The tag string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for OwnerMarker {
    fn default() -> Self {
        Self::new("regex-fold")
    }
}

/// A region the host reports as owned by a given marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedRegion {
    /// Host handle.
    pub handle: RegionHandle,
    /// Current offsets.
    pub region: CollapseRegion,
    /// `true` if the hidden text is currently visible.
    pub expanded: bool,
}

/// One region mutation inside a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionEdit {
    /// Create a region.
    Create {
        /// The region offsets.
        region: CollapseRegion,
        /// Text shown in place of the hidden span.
        placeholder: String,
        /// Whether the region starts collapsed.
        collapsed: bool,
    },
    /// Expand or collapse an existing region.
    SetExpanded {
        /// Target region.
        handle: RegionHandle,
        /// New state.
        expanded: bool,
    },
    /// Remove an existing region.
    Remove {
        /// Target region.
        handle: RegionHandle,
    },
}

/// Result of one edit: the new handle for `Create`, `None` otherwise.
pub type EditOutcome = Result<Option<RegionHandle>, HostError>;

/// The host's region model.
pub trait RegionHost {
    /// Regions currently carrying `owner`, read fresh from the host.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the region model cannot be read yet.
    fn owned_regions(&self, owner: &OwnerMarker) -> Result<Vec<OwnedRegion>, HostError>;

    /// Apply `edits` as one atomic batch, tagging created regions with `owner`.
    ///
    /// Returns one outcome per edit, in order. A failed edit does not stop the batch.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::NotReady`] (or another error) if the whole batch is refused.
    fn apply_batch(
        &mut self,
        owner: &OwnerMarker,
        edits: &[RegionEdit],
    ) -> Result<Vec<EditOutcome>, HostError>;
}

/// Read-only view of the document text.
pub trait DocumentSource {
    /// Full document text.
    fn text(&self) -> Cow<'_, str>;

    /// Number of lines (a trailing `\n` starts an empty last line).
    fn line_count(&self) -> usize;

    /// Char range of line `line`, excluding its line terminator.
    fn line_range(&self, line: usize) -> Option<Range<usize>>;

    /// Text of line `line`, excluding its line terminator.
    ///
    /// Called once per previewed line, so it should not rebuild the whole text.
    fn line_text(&self, line: usize) -> Option<String>;
}

/// A deferred unit of work.
pub type Task = Box<dyn FnOnce()>;

/// Deferred execution on the host's apply thread.
pub trait Scheduler {
    /// Queue `task` to run as soon as possible, after the current work item.
    fn run_later(&self, task: Task);

    /// Queue `task` to run after `delay`.
    fn run_after_delay(&self, task: Task, delay: Duration);
}

/// One open editor: its region model, its document, and its lifecycle.
pub trait FoldEditor: RegionHost + DocumentSource {
    /// File name of the edited file, if any (used to pick a retry policy).
    fn file_name(&self) -> Option<&str>;

    /// Returns `true` once the editor has been closed.
    fn is_disposed(&self) -> bool;
}
