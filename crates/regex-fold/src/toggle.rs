//! The toggle state machine.
//!
//! The state is derived on every toggle from the regions the host reports as owned, never
//! cached between batches:
//!
//! | state | owned regions | toggle |
//! |---|---|---|
//! | [`ToggleState::Empty`] | none | create all, collapsed |
//! | [`ToggleState::AnyExpanded`] | one or more expanded | collapse all, add new collapsed |
//! | [`ToggleState::AllCollapsed`] | all collapsed | expand all, add new collapsed |
//!
//! A mixed state converges to collapsed first.

use crate::host::{OwnedRegion, RegionEdit};
use crate::region::CollapseRegion;
use std::collections::HashSet;

/// Observable state of the owned regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleState {
    /// No owned regions exist.
    Empty,
    /// At least one owned region is expanded.
    AnyExpanded,
    /// Owned regions exist and all are collapsed.
    AllCollapsed,
}

impl ToggleState {
    /// Derive the state from the host's owned regions.
    pub fn classify(owned: &[OwnedRegion]) -> Self {
        if owned.is_empty() {
            Self::Empty
        } else if owned.iter().any(|r| r.expanded) {
            Self::AnyExpanded
        } else {
            Self::AllCollapsed
        }
    }
}

/// Edits for one toggle, in issue order: state changes for existing regions first, then
/// creations in resolution order.
pub fn plan_toggle(
    owned: &[OwnedRegion],
    resolved: &[CollapseRegion],
    placeholder: &str,
) -> (ToggleState, Vec<RegionEdit>) {
    let state = ToggleState::classify(owned);
    let mut edits = Vec::with_capacity(owned.len() + resolved.len());

    let expand = match state {
        ToggleState::Empty => None,
        ToggleState::AnyExpanded => Some(false),
        ToggleState::AllCollapsed => Some(true),
    };
    if let Some(expanded) = expand {
        edits.extend(owned.iter().map(|r| RegionEdit::SetExpanded {
            handle: r.handle,
            expanded,
        }));
    }

    let existing: HashSet<CollapseRegion> = owned.iter().map(|r| r.region).collect();
    edits.extend(
        resolved
            .iter()
            .filter(|region| !existing.contains(region))
            .map(|&region| RegionEdit::Create {
                region,
                placeholder: placeholder.to_string(),
                collapsed: true,
            }),
    );

    (state, edits)
}

/// Edits for attach-time application: drop every owned region, recreate all resolved ones
/// collapsed. Safe to repeat.
pub fn plan_reapply(
    owned: &[OwnedRegion],
    resolved: &[CollapseRegion],
    placeholder: &str,
) -> Vec<RegionEdit> {
    owned
        .iter()
        .map(|r| RegionEdit::Remove { handle: r.handle })
        .chain(resolved.iter().map(|&region| RegionEdit::Create {
            region,
            placeholder: placeholder.to_string(),
            collapsed: true,
        }))
        .collect()
}
