//! Char-offset fold model with owner markers and atomic batches.
//!
//! Regions from every source (the regex engine, a language's own folding, the user) live in one
//! model, each tagged with the [`OwnerMarker`] of whoever created it. Regions may nest but never
//! cross.

use regex_fold::{
    CollapseRegion, EditOutcome, HostError, OwnedRegion, OwnerMarker, RegionEdit, RegionHandle,
};
use std::cmp::Reverse;

/// A region stored in the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldRegion {
    /// Handle handed out on creation.
    pub handle: RegionHandle,
    /// Offsets (chars, `[start, end)`).
    pub region: CollapseRegion,
    /// Placeholder shown while collapsed.
    pub placeholder: String,
    /// Whether the hidden text is visible.
    pub expanded: bool,
    /// Creator of the region.
    pub owner: OwnerMarker,
}

fn crosses(a: &CollapseRegion, b: &CollapseRegion) -> bool {
    let nested = (a.start <= b.start && b.end <= a.end) || (b.start <= a.start && a.end <= b.end);
    a.overlaps(b) && !nested
}

/// Sort key: by start, and an outer region before the regions nested at the same start.
fn order_key(region: &CollapseRegion) -> (usize, Reverse<usize>) {
    (region.start, Reverse(region.end))
}

/// All fold regions of one document, sorted by start with outer regions first.
#[derive(Debug, Clone, Default)]
pub struct FoldModel {
    regions: Vec<FoldRegion>,
    next_handle: u64,
}

impl FoldModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, handle: RegionHandle) -> Result<usize, HostError> {
        self.regions
            .iter()
            .position(|r| r.handle == handle)
            .ok_or(HostError::UnknownHandle(handle))
    }

    /// Add a region.
    ///
    /// # Errors
    ///
    /// Fails if the region is empty or exceeds `doc_len`, duplicates an existing range, or
    /// crosses an existing region.
    pub fn add_region(
        &mut self,
        region: CollapseRegion,
        placeholder: &str,
        owner: &OwnerMarker,
        doc_len: usize,
    ) -> Result<RegionHandle, HostError> {
        if region.is_empty() || region.end > doc_len {
            return Err(HostError::OutOfBounds {
                start: region.start,
                end: region.end,
                len: doc_len,
            });
        }
        if self
            .regions
            .iter()
            .any(|r| r.region == region || crosses(&r.region, &region))
        {
            return Err(HostError::Overlap {
                start: region.start,
                end: region.end,
            });
        }

        let handle = RegionHandle(self.next_handle);
        self.next_handle += 1;

        let key = order_key(&region);
        let pos = self.regions.partition_point(|r| order_key(&r.region) < key);
        self.regions.insert(
            pos,
            FoldRegion {
                handle,
                region,
                placeholder: placeholder.to_string(),
                expanded: true,
                owner: owner.clone(),
            },
        );
        Ok(handle)
    }

    /// Remove a region.
    ///
    /// # Errors
    ///
    /// Fails if the handle is unknown.
    pub fn remove_region(&mut self, handle: RegionHandle) -> Result<FoldRegion, HostError> {
        let pos = self.position(handle)?;
        Ok(self.regions.remove(pos))
    }

    /// Expand or collapse a region.
    ///
    /// # Errors
    ///
    /// Fails if the handle is unknown.
    pub fn set_expanded(&mut self, handle: RegionHandle, expanded: bool) -> Result<(), HostError> {
        let pos = self.position(handle)?;
        self.regions[pos].expanded = expanded;
        Ok(())
    }

    /// Apply a batch of edits. Each edit is applied on top of the previous ones; a failed edit
    /// is reported and skipped.
    pub fn apply_batch(
        &mut self,
        owner: &OwnerMarker,
        edits: &[RegionEdit],
        doc_len: usize,
    ) -> Vec<EditOutcome> {
        edits
            .iter()
            .map(|edit| -> EditOutcome {
                match edit {
                    RegionEdit::Create {
                        region,
                        placeholder,
                        collapsed,
                    } => {
                        let handle = self.add_region(*region, placeholder, owner, doc_len)?;
                        self.set_expanded(handle, !collapsed)?;
                        Ok(Some(handle))
                    }
                    RegionEdit::SetExpanded { handle, expanded } => {
                        self.set_expanded(*handle, *expanded).map(|()| None)
                    }
                    RegionEdit::Remove { handle } => self.remove_region(*handle).map(|_| None),
                }
            })
            .collect()
    }

    /// Regions created by `owner`.
    pub fn owned_by(&self, owner: &OwnerMarker) -> Vec<OwnedRegion> {
        self.regions
            .iter()
            .filter(|r| &r.owner == owner)
            .map(|r| OwnedRegion {
                handle: r.handle,
                region: r.region,
                expanded: r.expanded,
            })
            .collect()
    }

    /// Region with the given handle.
    pub fn get(&self, handle: RegionHandle) -> Option<&FoldRegion> {
        self.regions.iter().find(|r| r.handle == handle)
    }

    /// All regions, sorted by start with outer regions first.
    pub fn regions(&self) -> &[FoldRegion] {
        &self.regions
    }

    /// Collapsed regions not contained in another collapsed region, sorted by start.
    pub fn outermost_collapsed(&self) -> Vec<&FoldRegion> {
        let mut result: Vec<&FoldRegion> = Vec::new();
        for region in self.regions.iter().filter(|r| !r.expanded) {
            if result
                .last()
                .is_some_and(|outer| region.region.start < outer.region.end)
            {
                continue;
            }
            result.push(region);
        }
        result
    }

    /// Shift or drop regions for an edit replacing `removed` chars at `offset` with `inserted`.
    ///
    /// Regions the edit touches are dropped and returned.
    pub fn apply_edit(
        &mut self,
        offset: usize,
        removed: usize,
        inserted: usize,
    ) -> Vec<FoldRegion> {
        let edit_end = offset + removed;
        let mut dropped = Vec::new();

        self.regions = std::mem::take(&mut self.regions)
            .into_iter()
            .filter_map(|mut r| {
                let touched = if removed == 0 {
                    r.region.start < offset && offset < r.region.end
                } else {
                    r.region.start < edit_end && offset < r.region.end
                };
                if touched {
                    dropped.push(r);
                    return None;
                }
                if r.region.start >= edit_end {
                    r.region = CollapseRegion::new(
                        r.region.start - removed + inserted,
                        r.region.end - removed + inserted,
                    );
                }
                Some(r)
            })
            .collect();

        dropped
    }

    /// Remove every region created by `owner`.
    pub fn clear_owner(&mut self, owner: &OwnerMarker) {
        self.regions.retain(|r| &r.owner != owner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> OwnerMarker {
        OwnerMarker::new("test")
    }

    #[test]
    fn test_add_rejects_out_of_bounds_and_crossing() {
        let mut model = FoldModel::new();
        let owner = owner();

        assert!(model.add_region(CollapseRegion::new(2, 10), "...", &owner, 20).is_ok());
        assert_eq!(
            model.add_region(CollapseRegion::new(15, 25), "...", &owner, 20),
            Err(HostError::OutOfBounds {
                start: 15,
                end: 25,
                len: 20
            })
        );
        assert!(matches!(
            model.add_region(CollapseRegion::new(5, 15), "...", &owner, 20),
            Err(HostError::Overlap { .. })
        ));
        assert!(matches!(
            model.add_region(CollapseRegion::new(2, 10), "...", &owner, 20),
            Err(HostError::Overlap { .. })
        ));
        // Nesting is fine.
        assert!(model.add_region(CollapseRegion::new(3, 5), "...", &owner, 20).is_ok());
        assert_eq!(model.regions().len(), 2);
    }

    #[test]
    fn test_batch_skips_failed_edits() {
        let mut model = FoldModel::new();
        let owner = owner();
        let outcomes = model.apply_batch(
            &owner,
            &[
                RegionEdit::Create {
                    region: CollapseRegion::new(1, 4),
                    placeholder: "...".to_string(),
                    collapsed: true,
                },
                RegionEdit::Remove {
                    handle: RegionHandle(99),
                },
                RegionEdit::Create {
                    region: CollapseRegion::new(5, 8),
                    placeholder: "...".to_string(),
                    collapsed: false,
                },
            ],
            10,
        );

        assert_eq!(outcomes[0], Ok(Some(RegionHandle(0))));
        assert_eq!(outcomes[1], Err(HostError::UnknownHandle(RegionHandle(99))));
        assert_eq!(outcomes[2], Ok(Some(RegionHandle(1))));

        let owned = model.owned_by(&owner);
        assert_eq!(owned.len(), 2);
        assert!(!owned[0].expanded);
        assert!(owned[1].expanded);
    }

    #[test]
    fn test_owned_by_filters_markers() {
        let mut model = FoldModel::new();
        model
            .add_region(CollapseRegion::new(0, 3), "{...}", &OwnerMarker::new("language"), 10)
            .unwrap();
        model
            .add_region(CollapseRegion::new(4, 8), "...", &owner(), 10)
            .unwrap();

        assert_eq!(model.owned_by(&owner()).len(), 1);
        model.clear_owner(&owner());
        assert_eq!(model.regions().len(), 1);
    }

    #[test]
    fn test_outermost_collapsed() {
        let mut model = FoldModel::new();
        let owner = owner();
        let outer = model.add_region(CollapseRegion::new(0, 10), "...", &owner, 20).unwrap();
        let inner = model.add_region(CollapseRegion::new(2, 5), "...", &owner, 20).unwrap();
        let other = model.add_region(CollapseRegion::new(12, 15), "...", &owner, 20).unwrap();
        for handle in [outer, inner, other] {
            model.set_expanded(handle, false).unwrap();
        }

        let handles: Vec<_> = model.outermost_collapsed().iter().map(|r| r.handle).collect();
        assert_eq!(handles, vec![outer, other]);
    }

    #[test]
    fn test_same_start_nesting_keeps_outer_first() {
        let mut model = FoldModel::new();
        let owner = owner();
        let inner = model.add_region(CollapseRegion::new(5, 12), "...", &owner, 20).unwrap();
        let outer = model.add_region(CollapseRegion::new(5, 19), "...", &owner, 20).unwrap();
        for handle in [inner, outer] {
            model.set_expanded(handle, false).unwrap();
        }

        let order: Vec<_> = model.regions().iter().map(|r| r.handle).collect();
        assert_eq!(order, vec![outer, inner]);
        let handles: Vec<_> = model.outermost_collapsed().iter().map(|r| r.handle).collect();
        assert_eq!(handles, vec![outer]);
    }

    #[test]
    fn test_apply_edit_shifts_and_drops() {
        let mut model = FoldModel::new();
        let owner = owner();
        model.add_region(CollapseRegion::new(2, 6), "...", &owner, 20).unwrap();
        model.add_region(CollapseRegion::new(10, 14), "...", &owner, 20).unwrap();

        let dropped = model.apply_edit(4, 0, 3);
        assert_eq!(dropped.len(), 1);
        assert_eq!(model.regions()[0].region, CollapseRegion::new(13, 17));
    }
}
