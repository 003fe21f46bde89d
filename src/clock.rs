//! Playback clock: per-word delays and the single-shot scheduler abstraction.
//!
//! ## Pacing
//!
//! Each word is shown for `60000 / wpm` milliseconds, stretched when the word
//! ends a sentence (`. ! ?` → ×2.2) or a clause (`, ; :` → ×1.6). Only the
//! final character is inspected: `"end."` pauses, `"end.\""` does not.
//!
//! ## Scheduling
//!
//! Advancement is a cancellable single-shot task re-armed after each firing.
//! [`Scheduler::schedule_once`] returns a [`TimerHandle`]; cancelling it
//! guarantees the task body never runs. Two implementations ship:
//!
//! * [`TokioScheduler`]: one `tokio::time::sleep` task per wait.
//! * [`ManualScheduler`]: a virtual clock advanced explicitly, for tests and
//!   headless drivers that want deterministic stepping.

use crate::error::FocusReadError;
use crate::segment::WordRecord;
use crate::speed::Speed;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::AbortHandle;
use tracing::trace;

pub const SENTENCE_MULTIPLIER: f64 = 2.2;
pub const CLAUSE_MULTIPLIER: f64 = 1.6;

/// Punctuation class of a word's final character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pause {
    /// `.`, `!` or `?`
    Sentence,
    /// `,`, `;` or `:`
    Clause,
    None,
}

impl Pause {
    pub fn of(text: &str) -> Self {
        match text.chars().next_back() {
            Some('.' | '!' | '?') => Pause::Sentence,
            Some(',' | ';' | ':') => Pause::Clause,
            _ => Pause::None,
        }
    }

    pub fn multiplier(self) -> f64 {
        match self {
            Pause::Sentence => SENTENCE_MULTIPLIER,
            Pause::Clause => CLAUSE_MULTIPLIER,
            Pause::None => 1.0,
        }
    }
}

/// Display time for `text` at `speed`, in (fractional) milliseconds.
pub fn delay_ms(text: &str, speed: Speed) -> f64 {
    speed.base_delay_ms() * Pause::of(text).multiplier()
}

/// [`delay_ms`] as a `Duration`.
pub fn word_delay(text: &str, speed: Speed) -> Duration {
    Duration::from_secs_f64(delay_ms(text, speed) / 1000.0)
}

/// Time needed to read `words` from the first to the last at `speed`.
pub fn total_duration(words: &[WordRecord], speed: Speed) -> Duration {
    let ms: f64 = words.iter().map(|w| delay_ms(w.text(), speed)).sum();
    Duration::from_secs_f64(ms / 1000.0)
}

// ── Scheduler ────────────────────────────────────────────────────────────

/// Body of a scheduled wait.
pub type TimerTask = Box<dyn FnOnce() + Send + 'static>;

/// Something that can run a task once after a delay.
pub trait Scheduler: Send + Sync {
    fn schedule_once(&self, delay: Duration, task: TimerTask) -> TimerHandle;
}

/// Cancellation token for one scheduled wait.
///
/// Cancelling is idempotent. Dropping a handle does not cancel the wait.
#[derive(Debug)]
pub struct TimerHandle {
    cancelled: Arc<AtomicBool>,
    abort: Option<AbortHandle>,
}

impl TimerHandle {
    pub fn new(cancelled: Arc<AtomicBool>) -> Self {
        Self {
            cancelled,
            abort: None,
        }
    }

    /// Also abort this tokio task on cancel so its timer is released at once.
    pub fn with_abort(mut self, abort: AbortHandle) -> Self {
        self.abort = Some(abort);
        self
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(ref abort) = self.abort {
            abort.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Scheduler backed by tokio timers.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: tokio::runtime::Handle,
}

impl TokioScheduler {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Bind to the runtime of the calling context.
    pub fn current() -> Result<Self, FocusReadError> {
        tokio::runtime::Handle::try_current()
            .map(Self::new)
            .map_err(|e| FocusReadError::NoRuntime(e.to_string()))
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_once(&self, delay: Duration, task: TimerTask) -> TimerHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let join = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if !flag.load(Ordering::SeqCst) {
                task();
            }
        });
        TimerHandle::new(cancelled).with_abort(join.abort_handle())
    }
}

/// Virtual-time scheduler: nothing fires until [`ManualScheduler::advance`]
/// or [`ManualScheduler::fire_next`] is called.
///
/// Tasks run on the caller's thread with no internal lock held, so a task may
/// schedule further work on the same scheduler.
#[derive(Default)]
pub struct ManualScheduler {
    state: Mutex<ManualState>,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    seq: u64,
    queue: Vec<ManualTimer>,
}

struct ManualTimer {
    due: Duration,
    seq: u64,
    cancelled: Arc<AtomicBool>,
    task: TimerTask,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current virtual time since construction.
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of waits that are scheduled and not cancelled.
    pub fn pending(&self) -> usize {
        self.lock()
            .queue
            .iter()
            .filter(|t| !t.cancelled.load(Ordering::SeqCst))
            .count()
    }

    /// Delay from now until the earliest live wait expires.
    pub fn next_due(&self) -> Option<Duration> {
        let state = self.lock();
        state
            .queue
            .iter()
            .filter(|t| !t.cancelled.load(Ordering::SeqCst))
            .map(|t| t.due.saturating_sub(state.now))
            .min()
    }

    /// Jump to the earliest live wait and run it.
    ///
    /// Returns the virtual time that elapsed, or `None` when nothing is
    /// pending.
    pub fn fire_next(&self) -> Option<Duration> {
        let (waited, task) = {
            let mut state = self.lock();
            state.queue.retain(|t| !t.cancelled.load(Ordering::SeqCst));
            let pos = earliest(&state.queue)?;
            let timer = state.queue.remove(pos);
            let waited = timer.due.saturating_sub(state.now);
            state.now = state.now.max(timer.due);
            (waited, timer.task)
        };
        task();
        Some(waited)
    }

    /// Move virtual time forward by `by`, running every wait that expires on
    /// the way in due order. Returns how many tasks ran.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now() + by;
        let mut fired = 0;
        loop {
            let task = {
                let mut state = self.lock();
                state.queue.retain(|t| !t.cancelled.load(Ordering::SeqCst));
                match earliest(&state.queue) {
                    Some(pos) if state.queue[pos].due <= target => {
                        let timer = state.queue.remove(pos);
                        state.now = state.now.max(timer.due);
                        timer.task
                    }
                    _ => {
                        state.now = target;
                        break;
                    }
                }
            };
            task();
            fired += 1;
        }
        fired
    }
}

fn earliest(queue: &[ManualTimer]) -> Option<usize> {
    queue
        .iter()
        .enumerate()
        .min_by_key(|(_, t)| (t.due, t.seq))
        .map(|(i, _)| i)
}

impl Scheduler for ManualScheduler {
    fn schedule_once(&self, delay: Duration, task: TimerTask) -> TimerHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let mut state = self.lock();
        state.seq += 1;
        let due = state.now + delay;
        trace!("manual timer #{} due at {:?}", state.seq, due);
        let seq = state.seq;
        state.queue.push(ManualTimer {
            due,
            seq,
            cancelled: Arc::clone(&cancelled),
            task,
        });
        TimerHandle::new(cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::segment;
    use std::sync::atomic::AtomicUsize;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.05
    }

    #[test]
    fn punctuation_classes() {
        assert_eq!(Pause::of("end."), Pause::Sentence);
        assert_eq!(Pause::of("what?"), Pause::Sentence);
        assert_eq!(Pause::of("wow!"), Pause::Sentence);
        assert_eq!(Pause::of("first,"), Pause::Clause);
        assert_eq!(Pause::of("so;"), Pause::Clause);
        assert_eq!(Pause::of("note:"), Pause::Clause);
        assert_eq!(Pause::of("plain"), Pause::None);
        assert_eq!(Pause::of(""), Pause::None);
        // Only the final character counts.
        assert_eq!(Pause::of("said.\""), Pause::None);
        assert_eq!(Pause::of("(aside)"), Pause::None);
    }

    #[test]
    fn delays_at_300_wpm() {
        assert!(approx(delay_ms("word", Speed::Wpm300), 200.0));
        assert!(approx(delay_ms("word.", Speed::Wpm300), 440.0));
        assert!(approx(delay_ms("word,", Speed::Wpm300), 320.0));
    }

    #[test]
    fn delays_at_900_wpm() {
        assert!(approx(delay_ms("Hi.", Speed::Wpm900), 146.67));
        assert!(approx(delay_ms("There,", Speed::Wpm900), 106.67));
        assert!(approx(delay_ms("world", Speed::Wpm900), 66.67));
    }

    #[test]
    fn word_delay_matches_delay_ms() {
        let d = word_delay("stop.", Speed::Wpm500);
        assert!(approx(d.as_secs_f64() * 1000.0, 264.0));
    }

    #[test]
    fn total_duration_sums_every_word() {
        let words = segment("Hi. There, world");
        let total = total_duration(&words, Speed::Wpm300);
        assert!(approx(total.as_secs_f64() * 1000.0, 440.0 + 320.0 + 200.0));
        assert_eq!(total_duration(&[], Speed::Wpm300), Duration::ZERO);
    }

    #[test]
    fn manual_scheduler_runs_in_due_order() {
        let sched = ManualScheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for (name, ms) in [("b", 20u64), ("a", 10), ("c", 30)] {
            let log = Arc::clone(&log);
            sched.schedule_once(
                Duration::from_millis(ms),
                Box::new(move || log.lock().unwrap().push(name)),
            );
        }
        assert_eq!(sched.pending(), 3);
        assert_eq!(sched.advance(Duration::from_millis(25)), 2);
        assert_eq!(*log.lock().unwrap(), ["a", "b"]);
        assert_eq!(sched.now(), Duration::from_millis(25));
        assert_eq!(sched.next_due(), Some(Duration::from_millis(5)));
    }

    #[test]
    fn cancelled_task_never_runs() {
        let sched = ManualScheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let handle = sched.schedule_once(
            Duration::from_millis(10),
            Box::new(move || {
                h.fetch_add(1, Ordering::SeqCst);
            }),
        );
        handle.cancel();
        assert!(handle.is_cancelled());
        assert_eq!(sched.pending(), 0);
        assert_eq!(sched.advance(Duration::from_secs(1)), 0);
        assert_eq!(sched.fire_next(), None);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn task_may_reschedule_itself() {
        let sched = Arc::new(ManualScheduler::new());
        let hits = Arc::new(AtomicUsize::new(0));
        let s = Arc::clone(&sched);
        let h = Arc::clone(&hits);
        sched.schedule_once(
            Duration::from_millis(10),
            Box::new(move || {
                h.fetch_add(1, Ordering::SeqCst);
                let h2 = Arc::clone(&h);
                s.schedule_once(
                    Duration::from_millis(10),
                    Box::new(move || {
                        h2.fetch_add(1, Ordering::SeqCst);
                    }),
                );
            }),
        );
        assert_eq!(sched.advance(Duration::from_millis(20)), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn fire_next_reports_waited_time() {
        let sched = ManualScheduler::new();
        sched.schedule_once(Duration::from_millis(40), Box::new(|| {}));
        assert_eq!(sched.fire_next(), Some(Duration::from_millis(40)));
        assert_eq!(sched.now(), Duration::from_millis(40));
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_scheduler_fires_once_after_delay() {
        let sched = TokioScheduler::current().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        sched.schedule_once(
            Duration::from_millis(100),
            Box::new(move || {
                h.fetch_add(1, Ordering::SeqCst);
            }),
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_scheduler_cancel_is_total() {
        let sched = TokioScheduler::current().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let handle = sched.schedule_once(
            Duration::from_millis(100),
            Box::new(move || {
                h.fetch_add(1, Ordering::SeqCst);
            }),
        );
        handle.cancel();
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn tokio_scheduler_needs_a_runtime() {
        assert!(matches!(
            TokioScheduler::current(),
            Err(FocusReadError::NoRuntime(_))
        ));
    }
}
