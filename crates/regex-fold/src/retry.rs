//! Attach-time application with bounded retries.
//!
//! A freshly opened editor may not accept region mutations yet, and its readiness cannot be
//! observed synchronously. [`attach`] hops onto the host's apply thread, tries to apply regions,
//! and retries with linear backoff until regions are created, the attempt budget runs out, or
//! the editor goes away.

use crate::host::{FoldEditor, Scheduler};
use crate::observer::FoldEvent;
use crate::session::FoldSession;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Why attach-time application stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStop {
    /// An attempt created at least one region.
    Applied,
    /// No rule is enabled, so retrying cannot help.
    NoRules,
    /// The attempt budget was used up without creating a region.
    Exhausted,
    /// The editor was disposed before the attempt ran.
    Disposed,
}

/// Schedule attach-time application for `session`.
///
/// Only a weak reference to the session is kept: dropping the session (or disposing its
/// editor) turns every pending attempt into a no-op.
pub fn attach<E, S>(session: &Rc<RefCell<FoldSession<E>>>, scheduler: &S)
where
    E: FoldEditor + 'static,
    S: Scheduler + Clone + 'static,
{
    let weak = Rc::downgrade(session);
    let next = scheduler.clone();
    scheduler.run_later(Box::new(move || run_attempt(weak, next, 0)));
}

fn run_attempt<E, S>(weak: Weak<RefCell<FoldSession<E>>>, scheduler: S, attempt: u32)
where
    E: FoldEditor + 'static,
    S: Scheduler + Clone + 'static,
{
    let Some(rc) = weak.upgrade() else {
        tracing::trace!(attempt, "session dropped before attach attempt");
        return;
    };
    // The session may be mid-call on this thread; try again once that work item is done.
    let Ok(mut session) = rc.try_borrow_mut() else {
        tracing::debug!(attempt, "session busy, attach attempt requeued");
        let next = scheduler.clone();
        scheduler.run_later(Box::new(move || run_attempt(weak, next, attempt)));
        return;
    };
    let engine = session.engine().clone();
    let observer = engine.observer();

    if session.editor().is_disposed() {
        observer.on_event(&FoldEvent::RetryStopped {
            attempts: attempt,
            reason: RetryStop::Disposed,
        });
        return;
    }

    let policy = session.retry_policy();
    let created = match session.apply() {
        Ok(report) => report.created,
        Err(error) => {
            tracing::debug!(attempt, %error, "attach attempt refused");
            0
        }
    };
    let attempts = attempt + 1;

    let stop = if created > 0 {
        Some(RetryStop::Applied)
    } else if engine.enabled_rules().is_empty() {
        Some(RetryStop::NoRules)
    } else if attempts >= policy.max_attempts {
        Some(RetryStop::Exhausted)
    } else {
        None
    };
    drop(session);

    if let Some(reason) = stop {
        observer.on_event(&FoldEvent::RetryStopped { attempts, reason });
        return;
    }

    let delay = policy.delay_after(attempt);
    observer.on_event(&FoldEvent::RetryScheduled {
        attempt: attempts,
        delay,
    });
    let next = scheduler.clone();
    scheduler.run_after_delay(Box::new(move || run_attempt(weak, next, attempts)), delay);
}
