//! Fold a file headlessly and print what an editor would display.
//!
//! ```text
//! regex-fold notes.txt -p 'START[\s\S]*?END'
//! regex-fold Main.java --sample-rules --toggles 2 --previews
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use regex_fold::{FoldConfig, FoldEngine, Rule, RuleStore, attach};
use regex_fold_host::{HeadlessEditor, ManualScheduler};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "regex-fold")]
#[command(about = "Collapse multi-line regex matches and print the folded view")]
struct Args {
    /// File to fold
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Fold pattern (repeatable, earlier patterns win overlaps)
    #[arg(short, long = "pattern", value_name = "REGEX")]
    patterns: Vec<String>,

    /// Add the built-in sample rules
    #[arg(long)]
    sample_rules: bool,

    /// TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Toggles to run after attaching
    #[arg(short, long, default_value_t = 0)]
    toggles: u32,

    /// Batches the editor refuses before accepting edits
    #[arg(long, default_value_t = 0)]
    warmup: usize,

    /// Print previews of the hidden lines
    #[arg(long)]
    previews: bool,

    /// Print the dimmed spans
    #[arg(long)]
    dim: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn setup_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("regex_fold=trace,regex_fold_host=debug,info")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_tracing(args.verbose);

    let config = match &args.config {
        Some(path) => FoldConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => FoldConfig::default(),
    };

    let mut rules = RuleStore::new();
    if args.sample_rules {
        rules.add_sample_rules();
    }
    for pattern in &args.patterns {
        let rule = Rule::new(pattern.as_str(), "");
        rule.compile()
            .with_context(|| format!("invalid pattern {pattern:?}"))?;
        rules.add_rule(rule);
    }
    if rules.is_empty() {
        tracing::warn!("no rules given, nothing will be folded");
    }

    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let mut editor = HeadlessEditor::new(&text).with_warmup(args.warmup);
    if let Some(name) = args.file.file_name().and_then(|n| n.to_str()) {
        editor = editor.with_file_name(name);
    }

    let engine = FoldEngine::new(rules, config);
    let session = Rc::new(RefCell::new(engine.session(editor)));
    let scheduler = ManualScheduler::new();
    attach(&session, &scheduler);
    let ran = scheduler.run_until_idle();
    tracing::info!(ran, elapsed = ?scheduler.now(), "attach finished");

    let mut session = session.borrow_mut();
    for i in 0..args.toggles {
        let report = session
            .toggle()
            .with_context(|| format!("toggle {}", i + 1))?;
        tracing::info!(toggle = i + 1, ?report, "toggled");
    }

    if args.dim {
        let spans = session.dim_spans();
        for span in &spans {
            println!("dim {}..{} (rule {})", span.start, span.end, span.rule);
        }
        session.editor_mut().set_dim_spans(spans);
    }
    if args.previews {
        for preview in session.line_previews() {
            println!("{:>5}: {}", preview.line + 1, preview.label);
        }
    }

    print!("{}", session.editor().render());
    Ok(())
}
