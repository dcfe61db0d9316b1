#![warn(missing_docs)]
//! Regex Fold - Headless Multi-Line Match Folding Engine
//!
//! # Overview
//!
//! `regex-fold` lets users define multi-line regex patterns and visually collapse everything after
//! the first line of each match inside an open document, without mutating the document.
//! It never talks to an editor directly: every host touchpoint sits behind the narrow traits in
//! [`host`], so the engine is a pure library and the concrete editor adapter is a thin shim.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Attach Retry Scheduler (retry)             │  ← editor attach, bounded backoff
//! ├─────────────────────────────────────────────┤
//! │  Toggle State Machine (toggle, session)     │  ← user action, one batch per toggle
//! ├─────────────────────────────────────────────┤
//! │  Region Resolver (resolve)                  │  ← conflict-free collapse regions
//! ├─────────────────────────────────────────────┤
//! │  Match Locator (locate)                     │  ← matches + line spans
//! ├─────────────────────────────────────────────┤
//! │  Rules (rule, rule_store)                   │  ← lazily compiled patterns
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use regex_fold::{CollapseRegion, NoopObserver, Rule, find_regions};
//!
//! let text = "A\nSTART\nfoo\nbar\nEND\nB\n";
//! let rules = vec![Rule::new(r"START[\s\S]*?END", "")];
//!
//! let regions = find_regions(text, &rules, &NoopObserver);
//! assert_eq!(regions, vec![CollapseRegion::new(7, 19)]);
//! ```
//!
//! All offsets are **character offsets** (not bytes), half-open `[start, end)`.
//!
//! # Module Description
//!
//! - [`rule`] - rule patterns and their memoized matchers
//! - [`rule_store`] - insertion-ordered rule list
//! - [`locate`] - match location and line-span metadata
//! - [`resolve`] - collapse region resolution and dim spans
//! - [`region`] - collapse regions and the per-editor region set
//! - [`toggle`] - toggle state machine planning
//! - [`session`] - per-editor sessions that apply batches to a host
//! - [`retry`] - attach-time application with bounded retries
//! - [`host`] - host editor contracts
//! - [`preview`] - minimized previews of hidden lines
//! - [`observer`] - observability hook
//! - [`config`] - configuration

pub mod config;
pub mod error;
pub mod host;
pub mod locate;
pub mod observer;
pub mod preview;
pub mod region;
pub mod resolve;
pub mod retry;
pub mod rule;
pub mod rule_store;
pub mod session;
mod text;
pub mod toggle;

pub use config::{FileKind, FoldConfig, RetryConfig, RetryPolicy};
pub use error::{ConfigError, HostError, RuleError};
pub use host::{
    DocumentSource, EditOutcome, FoldEditor, OwnedRegion, OwnerMarker, RegionEdit, RegionHandle,
    RegionHost, Scheduler, Task,
};
pub use locate::{LocatedMatch, MultiLineMatch, locate};
pub use observer::{FoldEvent, FoldObserver, NoopObserver, RecordingObserver, TracingObserver};
pub use preview::{LinePreview, line_previews};
pub use region::{CollapseRegion, RegionSet};
pub use resolve::{DimSpan, dim_spans, find_regions, region_for_match, resolve};
pub use retry::{RetryStop, attach};
pub use rule::{RawMatch, Rule};
pub use rule_store::RuleStore;
pub use session::{BatchReport, FoldEngine, FoldSession, ToggleReport};
pub use toggle::{ToggleState, plan_reapply, plan_toggle};
