//! Collapse regions and the per-editor region set.

/// A char-offset span the host can collapse behind a placeholder.
///
/// `start` is the newline ending the first matched line, `end` is the match end (exclusive).
/// The `(start, end)` pair is the region's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollapseRegion {
    /// Start offset (chars, inclusive).
    pub start: usize,
    /// End offset (chars, exclusive).
    pub end: usize,
}

impl CollapseRegion {
    /// Create a region for `[start, end)`.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Check if two regions overlap.
    pub fn overlaps(&self, other: &CollapseRegion) -> bool {
        !(self.end <= other.start || self.start >= other.end)
    }

    /// Length in chars.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if the region covers nothing.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// The regions this engine believes it has created in one editor.
///
/// Kept sorted by `(start, end)` and free of duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionSet {
    regions: Vec<CollapseRegion>,
}

impl RegionSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a region; returns `false` if it was already present.
    pub fn insert(&mut self, region: CollapseRegion) -> bool {
        match self.regions.binary_search(&region) {
            Ok(_) => false,
            Err(pos) => {
                self.regions.insert(pos, region);
                true
            }
        }
    }

    /// Remove a region; returns `false` if it was absent.
    pub fn remove(&mut self, region: &CollapseRegion) -> bool {
        match self.regions.binary_search(region) {
            Ok(pos) => {
                self.regions.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    /// Check if the exact `(start, end)` key is present.
    pub fn contains(&self, region: &CollapseRegion) -> bool {
        self.regions.binary_search(region).is_ok()
    }

    /// Keep only regions for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(&CollapseRegion) -> bool) {
        self.regions.retain(|r| keep(r));
    }

    /// Iterate in `(start, end)` order.
    pub fn iter(&self) -> impl Iterator<Item = &CollapseRegion> {
        self.regions.iter()
    }

    /// Number of regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Update offsets for a text edit replacing `removed` chars at `offset` with `inserted` chars.
    ///
    /// Regions entirely before the edit are kept, regions entirely after are shifted, and
    /// regions touching the edited range are dropped (their offsets no longer describe a match).
    /// A pure insertion touches a region only when it lands strictly inside it.
    /// Returns the dropped regions.
    pub fn apply_edit(
        &mut self,
        offset: usize,
        removed: usize,
        inserted: usize,
    ) -> Vec<CollapseRegion> {
        let edit_end = offset + removed;
        let mut dropped = Vec::new();
        let mut kept = Vec::with_capacity(self.regions.len());

        for region in self.regions.drain(..) {
            let touched = if removed == 0 {
                region.start < offset && offset < region.end
            } else {
                region.start < edit_end && offset < region.end
            };

            if touched {
                dropped.push(region);
            } else if region.start >= edit_end {
                kept.push(CollapseRegion::new(
                    region.start - removed + inserted,
                    region.end - removed + inserted,
                ));
            } else {
                kept.push(region);
            }
        }

        self.regions = kept;
        dropped
    }
}

impl<'a> IntoIterator for &'a RegionSet {
    type Item = &'a CollapseRegion;
    type IntoIter = std::slice::Iter<'a, CollapseRegion>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}
