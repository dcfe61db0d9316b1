//! Single-threaded scheduler driven by a virtual clock.
//!
//! Nothing runs until the owner pumps the queue with [`ManualScheduler::run_until_idle`] or
//! [`ManualScheduler::advance`]. Delayed tasks become due when the virtual clock reaches them;
//! tasks due at the same instant run in the order they were queued.

use regex_fold::{Scheduler, Task};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

struct Pending {
    due: Duration,
    seq: u64,
    task: Task,
}

#[derive(Default)]
struct Inner {
    now: Duration,
    next_seq: u64,
    queue: Vec<Pending>,
}

impl Inner {
    fn push(&mut self, task: Task, due: Duration) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Pending { due, seq, task });
    }

    /// Pops the earliest task due at or before `limit`.
    fn pop_due(&mut self, limit: Option<Duration>) -> Option<Pending> {
        let (idx, _) = self
            .queue
            .iter()
            .enumerate()
            .filter(|(_, p)| limit.is_none_or(|limit| p.due <= limit))
            .min_by_key(|(_, p)| (p.due, p.seq))?;
        Some(self.queue.swap_remove(idx))
    }
}

/// A [`Scheduler`] with a virtual clock. Clones share the same queue.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    inner: Rc<RefCell<Inner>>,
}

impl ManualScheduler {
    /// Create a scheduler at virtual time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Number of queued tasks.
    pub fn pending(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    fn run_next(&self, limit: Option<Duration>) -> bool {
        // The borrow must end before the task runs: tasks schedule follow-ups.
        let next = {
            let mut inner = self.inner.borrow_mut();
            let next = inner.pop_due(limit);
            if let Some(pending) = &next {
                inner.now = inner.now.max(pending.due);
            }
            next
        };

        match next {
            Some(pending) => {
                (pending.task)();
                true
            }
            None => false,
        }
    }

    /// Run tasks in due order, jumping the clock forward, until the queue is empty.
    ///
    /// Returns the number of tasks run.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while self.run_next(None) {
            ran += 1;
        }
        tracing::trace!(ran, now = ?self.now(), "scheduler idle");
        ran
    }

    /// Move the clock forward by `by`, running every task that becomes due.
    ///
    /// Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now() + by;
        let mut ran = 0;
        while self.run_next(Some(target)) {
            ran += 1;
        }
        self.inner.borrow_mut().now = target;
        ran
    }
}

impl Scheduler for ManualScheduler {
    fn run_later(&self, task: Task) {
        let mut inner = self.inner.borrow_mut();
        let now = inner.now;
        inner.push(task, now);
    }

    fn run_after_delay(&self, task: Task, delay: Duration) {
        let mut inner = self.inner.borrow_mut();
        let due = inner.now + delay;
        inner.push(task, due);
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ManualScheduler")
            .field("now", &inner.now)
            .field("pending", &inner.queue.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Task) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let make = move |name: &'static str| -> Task {
            let sink = Rc::clone(&sink);
            Box::new(move || sink.borrow_mut().push(name))
        };
        (log, make)
    }

    #[test]
    fn test_runs_in_due_order() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();

        scheduler.run_after_delay(task("late"), Duration::from_millis(800));
        scheduler.run_after_delay(task("early"), Duration::from_millis(500));
        scheduler.run_later(task("now"));

        assert_eq!(scheduler.pending(), 3);
        assert_eq!(scheduler.run_until_idle(), 3);
        assert_eq!(*log.borrow(), vec!["now", "early", "late"]);
        assert_eq!(scheduler.now(), Duration::from_millis(800));
    }

    #[test]
    fn test_advance_runs_only_due_tasks() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();

        scheduler.run_after_delay(task("a"), Duration::from_millis(100));
        scheduler.run_after_delay(task("b"), Duration::from_millis(300));

        assert_eq!(scheduler.advance(Duration::from_millis(200)), 1);
        assert_eq!(*log.borrow(), vec!["a"]);
        assert_eq!(scheduler.now(), Duration::from_millis(200));

        assert_eq!(scheduler.advance(Duration::from_millis(100)), 1);
        assert_eq!(*log.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn test_task_can_schedule_follow_up() {
        let scheduler = ManualScheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let inner_log = Rc::clone(&log);
        let inner_scheduler = scheduler.clone();
        scheduler.run_later(Box::new(move || {
            inner_log.borrow_mut().push(inner_scheduler.now());
            let log = Rc::clone(&inner_log);
            let clock = inner_scheduler.clone();
            inner_scheduler.run_after_delay(
                Box::new(move || log.borrow_mut().push(clock.now())),
                Duration::from_millis(250),
            );
        }));

        assert_eq!(scheduler.run_until_idle(), 2);
        assert_eq!(
            *log.borrow(),
            vec![Duration::ZERO, Duration::from_millis(250)]
        );
    }
}
