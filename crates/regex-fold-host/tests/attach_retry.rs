use pretty_assertions::assert_eq;
use regex_fold::{
    FoldConfig, FoldEngine, FoldEvent, FoldSession, RecordingObserver, RegionHost, RetryStop,
    Rule, RuleStore, attach,
};
use regex_fold_host::{HeadlessEditor, ManualScheduler};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

const TEXT: &str = "A\nSTART\nfoo\nbar\nEND\nB\n";

struct Harness {
    session: Rc<RefCell<FoldSession<HeadlessEditor>>>,
    scheduler: ManualScheduler,
    recorder: Rc<RecordingObserver>,
}

impl Harness {
    fn new(editor: HeadlessEditor, rules: Vec<Rule>) -> Self {
        let recorder = Rc::new(RecordingObserver::new());
        let engine = FoldEngine::with_observer(
            RuleStore::from_rules(rules),
            FoldConfig::default(),
            recorder.clone(),
        );
        Self {
            session: Rc::new(RefCell::new(engine.session(editor))),
            scheduler: ManualScheduler::new(),
            recorder,
        }
    }

    fn attach(&self) {
        attach(&self.session, &self.scheduler);
    }

    fn batches(&self) -> usize {
        self.session.borrow().editor().batches_received()
    }

    fn stop(&self) -> Option<(u32, RetryStop)> {
        self.recorder.events().into_iter().find_map(|event| match event {
            FoldEvent::RetryStopped { attempts, reason } => Some((attempts, reason)),
            _ => None,
        })
    }

    fn delays(&self) -> Vec<Duration> {
        self.recorder
            .events()
            .into_iter()
            .filter_map(|event| match event {
                FoldEvent::RetryScheduled { delay, .. } => Some(delay),
                _ => None,
            })
            .collect()
    }
}

fn block_rule() -> Vec<Rule> {
    vec![Rule::new(r"START[\s\S]*?END", "")]
}

#[test]
fn test_attach_retries_until_editor_is_ready() {
    let harness = Harness::new(HeadlessEditor::new(TEXT).with_warmup(2), block_rule());
    harness.attach();

    // Nothing happens before the scheduler runs.
    assert_eq!(harness.batches(), 0);

    harness.scheduler.run_until_idle();
    assert_eq!(harness.batches(), 3);
    assert_eq!(harness.stop(), Some((3, RetryStop::Applied)));
    assert_eq!(
        harness.delays(),
        vec![Duration::from_millis(500), Duration::from_millis(800)]
    );
    assert_eq!(harness.scheduler.now(), Duration::from_millis(1300));

    let session = harness.session.borrow();
    assert_eq!(session.editor().render(), "A\nSTART...\nB\n");
}

#[test]
fn test_attach_gives_up_after_budget() {
    let harness = Harness::new(HeadlessEditor::new(TEXT).with_warmup(100), block_rule());
    harness.attach();
    harness.scheduler.run_until_idle();

    assert_eq!(harness.batches(), 5);
    assert_eq!(harness.stop(), Some((5, RetryStop::Exhausted)));
    let owner = harness.session.borrow().engine().owner().clone();
    assert!(
        harness
            .session
            .borrow()
            .editor()
            .owned_regions(&owner)
            .unwrap()
            .is_empty()
    );
}

#[test]
fn test_slow_files_get_a_longer_budget() {
    let editor = HeadlessEditor::new(TEXT)
        .with_file_name("script.py")
        .with_warmup(100);
    let harness = Harness::new(editor, block_rule());
    harness.attach();
    harness.scheduler.run_until_idle();

    assert_eq!(harness.batches(), 8);
    let delays = harness.delays();
    assert_eq!(delays.len(), 7);
    assert_eq!(delays[0], Duration::from_millis(1000));
    assert_eq!(delays[1], Duration::from_millis(1500));
}

#[test]
fn test_attach_without_rules_stops_at_once() {
    let harness = Harness::new(HeadlessEditor::new(TEXT), Vec::new());
    harness.attach();
    harness.scheduler.run_until_idle();

    assert_eq!(harness.batches(), 0);
    assert_eq!(harness.stop(), Some((1, RetryStop::NoRules)));
}

#[test]
fn test_disposed_editor_stops_pending_retries() {
    let harness = Harness::new(HeadlessEditor::new(TEXT).with_warmup(100), block_rule());
    harness.attach();

    harness.scheduler.advance(Duration::ZERO);
    assert_eq!(harness.batches(), 1);
    assert_eq!(harness.scheduler.pending(), 1);

    harness.session.borrow_mut().editor_mut().dispose();
    harness.scheduler.run_until_idle();

    assert_eq!(harness.batches(), 1);
    assert_eq!(harness.stop(), Some((1, RetryStop::Disposed)));
}

#[test]
fn test_dropped_session_turns_retries_into_no_ops() {
    let harness = Harness::new(HeadlessEditor::new(TEXT).with_warmup(100), block_rule());
    harness.attach();
    harness.scheduler.advance(Duration::ZERO);

    let Harness {
        session,
        scheduler,
        recorder,
    } = harness;
    drop(session);

    assert_eq!(scheduler.run_until_idle(), 1);
    assert!(
        !recorder
            .events()
            .iter()
            .any(|e| matches!(e, FoldEvent::RetryStopped { .. }))
    );
}

#[test]
fn test_reattach_is_idempotent() {
    let harness = Harness::new(HeadlessEditor::new(TEXT), block_rule());
    harness.attach();
    harness.scheduler.run_until_idle();
    harness.attach();
    harness.scheduler.run_until_idle();

    let session = harness.session.borrow();
    let owner = session.engine().owner().clone();
    assert_eq!(session.editor().owned_regions(&owner).unwrap().len(), 1);
    assert_eq!(session.regions().len(), 1);
}
