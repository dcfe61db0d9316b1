//! Per-editor folding sessions.

use crate::config::{FoldConfig, RetryPolicy};
use crate::error::HostError;
use crate::host::{FoldEditor, OwnedRegion, OwnerMarker, RegionEdit, RegionHandle};
use crate::locate::{LocatedMatch, locate};
use crate::observer::{FoldEvent, FoldObserver, TracingObserver};
use crate::preview::{LinePreview, line_previews};
use crate::region::{CollapseRegion, RegionSet};
use crate::resolve::{DimSpan, dim_spans, resolve};
use crate::rule::Rule;
use crate::rule_store::RuleStore;
use crate::toggle::{ToggleState, plan_reapply, plan_toggle};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Shared, process-wide engine state: the rule store, the configuration and the observer.
///
/// Cloning is cheap; every clone refers to the same store.
#[derive(Clone)]
pub struct FoldEngine {
    rules: Rc<RefCell<RuleStore>>,
    config: Rc<FoldConfig>,
    owner: OwnerMarker,
    observer: Rc<dyn FoldObserver>,
}

impl FoldEngine {
    /// Create an engine that reports to `tracing`.
    pub fn new(rules: RuleStore, config: FoldConfig) -> Self {
        Self::with_observer(rules, config, Rc::new(TracingObserver))
    }

    /// Create an engine with a custom observer.
    pub fn with_observer(
        rules: RuleStore,
        config: FoldConfig,
        observer: Rc<dyn FoldObserver>,
    ) -> Self {
        let owner = config.owner_marker();
        Self {
            rules: Rc::new(RefCell::new(rules)),
            config: Rc::new(config),
            owner,
            observer,
        }
    }

    /// The shared rule store.
    pub fn rules(&self) -> &Rc<RefCell<RuleStore>> {
        &self.rules
    }

    /// The configuration.
    pub fn config(&self) -> &FoldConfig {
        &self.config
    }

    /// The owner marker placed on created regions.
    pub fn owner(&self) -> &OwnerMarker {
        &self.owner
    }

    /// The observer.
    pub fn observer(&self) -> &dyn FoldObserver {
        self.observer.as_ref()
    }

    /// Enabled, valid rules at this moment.
    pub fn enabled_rules(&self) -> Vec<Rule> {
        self.rules.borrow().enabled_rules()
    }

    /// Start a session for a freshly attached editor.
    pub fn session<E: FoldEditor>(&self, editor: E) -> FoldSession<E> {
        FoldSession {
            engine: self.clone(),
            editor,
            regions: RegionSet::new(),
        }
    }
}

/// What one batch did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Regions created.
    pub created: usize,
    /// Existing regions expanded.
    pub expanded: usize,
    /// Existing regions collapsed.
    pub collapsed: usize,
    /// Existing regions removed.
    pub removed: usize,
    /// Edits the host refused.
    pub rejected: usize,
}

/// What one toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleReport {
    /// State observed before the toggle.
    pub from: ToggleState,
    /// Edits applied.
    pub batch: BatchReport,
}

/// Folding state of one open editor.
///
/// Owns the editor adapter and the [`RegionSet`] of regions this engine created in it.
pub struct FoldSession<E> {
    engine: FoldEngine,
    editor: E,
    regions: RegionSet,
}

impl<E: FoldEditor> FoldSession<E> {
    /// The editor adapter.
    pub fn editor(&self) -> &E {
        &self.editor
    }

    /// Mutable access to the editor adapter.
    pub fn editor_mut(&mut self) -> &mut E {
        &mut self.editor
    }

    /// The engine this session belongs to.
    pub fn engine(&self) -> &FoldEngine {
        &self.engine
    }

    /// Regions this session created and still believes exist.
    pub fn regions(&self) -> &RegionSet {
        &self.regions
    }

    /// Retry policy for this editor's file.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.engine
            .config
            .retry
            .policy_for_file(self.editor.file_name())
    }

    /// Locate all matches of the enabled rules in the current text.
    pub fn locate(&self) -> Vec<LocatedMatch> {
        let rules = self.engine.enabled_rules();
        locate(&self.editor.text(), &rules, self.engine.observer())
    }

    /// Resolve regions fresh from the current text and enabled rules.
    pub fn resolve(&self) -> Vec<CollapseRegion> {
        resolve(&self.locate(), self.engine.observer())
    }

    /// Dim spans for the current text.
    pub fn dim_spans(&self) -> Vec<DimSpan> {
        dim_spans(&self.locate())
    }

    /// Previews of the hidden lines for the current text.
    pub fn line_previews(&self) -> Vec<LinePreview> {
        line_previews(&self.editor, &self.locate())
    }

    /// Run one toggle transition as a single batch.
    ///
    /// Returns `Ok(None)` without touching the host when no rule is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the host refuses to list regions or refuses the whole batch.
    pub fn toggle(&mut self) -> Result<Option<ToggleReport>, HostError> {
        let rules = self.engine.enabled_rules();
        if rules.is_empty() {
            tracing::debug!("toggle ignored: no enabled rules");
            return Ok(None);
        }

        let owned = self.editor.owned_regions(&self.engine.owner)?;
        let resolved = {
            let text = self.editor.text();
            let observer = self.engine.observer();
            resolve(&locate(&text, &rules, observer), observer)
        };
        let (from, edits) = plan_toggle(&owned, &resolved, &self.engine.config.placeholder);
        tracing::debug!(?from, owned = owned.len(), resolved = resolved.len(), "toggle");

        let batch = self.run_batch(&owned, &edits)?;
        Ok(Some(ToggleReport { from, batch }))
    }

    /// Attach-time application: replace every owned region with freshly resolved collapsed ones.
    ///
    /// Idempotent; with no enabled rules it does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the host refuses to list regions or refuses the whole batch.
    pub fn apply(&mut self) -> Result<BatchReport, HostError> {
        let rules = self.engine.enabled_rules();
        if rules.is_empty() {
            return Ok(BatchReport::default());
        }

        let owned = self.editor.owned_regions(&self.engine.owner)?;
        let resolved = {
            let text = self.editor.text();
            let observer = self.engine.observer();
            resolve(&locate(&text, &rules, observer), observer)
        };
        let edits = plan_reapply(&owned, &resolved, &self.engine.config.placeholder);
        self.run_batch(&owned, &edits)
    }

    /// Record a text edit: `removed` chars at `offset` replaced by `inserted` chars.
    ///
    /// Regions whose offsets the edit invalidated leave the region set and are returned.
    pub fn notify_edit(
        &mut self,
        offset: usize,
        removed: usize,
        inserted: usize,
    ) -> Vec<CollapseRegion> {
        self.regions.apply_edit(offset, removed, inserted)
    }

    fn run_batch(
        &mut self,
        owned: &[OwnedRegion],
        edits: &[RegionEdit],
    ) -> Result<BatchReport, HostError> {
        let observer = self.engine.observer();

        // Regions the host no longer reports are gone, whatever we believed before.
        let live: HashSet<CollapseRegion> = owned.iter().map(|r| r.region).collect();
        self.regions.retain(|region| live.contains(region));
        let by_handle: HashMap<RegionHandle, CollapseRegion> =
            owned.iter().map(|r| (r.handle, r.region)).collect();

        let outcomes = match self.editor.apply_batch(&self.engine.owner, edits) {
            Ok(outcomes) => outcomes,
            Err(error) => {
                observer.on_event(&FoldEvent::BatchRejected {
                    error: error.clone(),
                });
                return Err(error);
            }
        };

        let mut report = BatchReport::default();
        for (edit, outcome) in edits.iter().zip(outcomes) {
            match (edit, outcome) {
                (RegionEdit::Create { region, .. }, Ok(Some(_))) => {
                    report.created += 1;
                    self.regions.insert(*region);
                }
                (RegionEdit::Create { region, .. }, Ok(None)) => {
                    tracing::warn!(
                        start = region.start,
                        end = region.end,
                        "host created no region"
                    );
                    report.rejected += 1;
                }
                (RegionEdit::SetExpanded { expanded, .. }, Ok(_)) => {
                    if *expanded {
                        report.expanded += 1;
                    } else {
                        report.collapsed += 1;
                    }
                }
                (RegionEdit::Remove { handle }, Ok(_)) => {
                    report.removed += 1;
                    if let Some(region) = by_handle.get(handle) {
                        self.regions.remove(region);
                    }
                }
                (_, Err(error)) => {
                    report.rejected += 1;
                    observer.on_event(&FoldEvent::EditRejected { error });
                }
            }
        }

        observer.on_event(&FoldEvent::BatchApplied {
            created: report.created,
            expanded: report.expanded,
            collapsed: report.collapsed,
            removed: report.removed,
            rejected: report.rejected,
        });
        Ok(report)
    }
}
