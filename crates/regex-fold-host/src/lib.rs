#![warn(missing_docs)]
//! Headless reference host for `regex-fold`.
//!
//! Implements the engine's host traits without any UI, so folding behavior can be exercised and
//! inspected end to end:
//!
//! - [`Document`] - rope-backed text with `\n`-only line indexing
//! - [`FoldModel`] - owner-marked fold regions, applied in atomic batches
//! - [`DimLayer`] - dimmed spans for hidden lines
//! - [`HeadlessEditor`] - all of the above behind [`regex_fold::FoldEditor`]
//! - [`ManualScheduler`] - a virtual-clock [`regex_fold::Scheduler`]
//!
//! # Example
//!
//! ```
//! use regex_fold::{FoldConfig, FoldEngine, Rule, RuleStore};
//! use regex_fold_host::HeadlessEditor;
//!
//! let rules = RuleStore::from_rules(vec![Rule::new(r"START[\s\S]*?END", "")]);
//! let engine = FoldEngine::new(rules, FoldConfig::default());
//! let mut session = engine.session(HeadlessEditor::new("A\nSTART\nfoo\nbar\nEND\nB\n"));
//!
//! session.toggle().unwrap();
//! assert_eq!(session.editor().render(), "A\nSTART...\nB\n");
//! ```

mod dim_layer;
mod document;
mod editor;
mod fold_model;
mod scheduler;

pub use dim_layer::DimLayer;
pub use document::Document;
pub use editor::{HeadlessEditor, TextEdit};
pub use fold_model::{FoldModel, FoldRegion};
pub use scheduler::ManualScheduler;
