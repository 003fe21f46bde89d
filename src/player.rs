//! The player: a [`ReadingSession`] driven by a [`Scheduler`].
//!
//! ## Timer discipline
//!
//! Exactly one advancement wait may be outstanding. Every transition that
//! could start a wait cancels the previous one first, and each wait carries a
//! generation number that the callback re-checks under the player lock, so a
//! wait that lost a race with `cancel()` still cannot advance the cursor.
//!
//! Timer callbacks hold a `Weak` reference. Once the last [`Player`] handle is
//! dropped, outstanding waits are cancelled and any that still fire find
//! nothing to upgrade.
//!
//! ## Collaborators
//!
//! [`Player::load_document`] and [`Player::transform`] run an async
//! collaborator without holding the lock. On success the session is reloaded
//! with the new text; on failure it is left exactly as it was and a transient
//! status message is shown for `status_ttl_ms`.

use crate::clock::{word_delay, Scheduler, TimerHandle};
use crate::config::ReaderConfig;
use crate::error::ServiceError;
use crate::events::{Frame, Observer};
use crate::pipeline::extract::DocumentExtractor;
use crate::pipeline::input::{display_name, resolve_input};
use crate::pipeline::normalize;
use crate::pipeline::transform::TextTransformer;
use crate::prompts::TransformKind;
use crate::session::{PlaybackState, ReadingSession};
use crate::speed::Speed;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, Weak};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Cheaply cloneable handle to one reading session and its clock.
#[derive(Clone)]
pub struct Player {
    shared: Arc<Shared>,
}

struct Shared {
    inner: Mutex<Inner>,
    scheduler: Arc<dyn Scheduler>,
    observers: RwLock<Vec<Observer>>,
    status_ttl: Duration,
    download_timeout_secs: u64,
}

#[derive(Default)]
struct Inner {
    session: ReadingSession,
    source_text: String,
    generation: u64,
    pending: Option<Pending>,
    status: Option<String>,
    status_timer: Option<Pending>,
    processing: bool,
}

struct Pending {
    generation: u64,
    handle: TimerHandle,
}

/// Notifications gathered under the lock and delivered after it is released.
enum Event {
    Frame(Frame),
    Status(Option<String>),
    Finished(usize),
}

impl Player {
    pub fn new(config: &ReaderConfig, scheduler: Arc<dyn Scheduler>) -> Self {
        let inner = Inner {
            session: ReadingSession::new(config.speed),
            ..Inner::default()
        };
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(inner),
                scheduler,
                observers: RwLock::new(Vec::new()),
                status_ttl: Duration::from_millis(config.status_ttl_ms),
                download_timeout_secs: config.download_timeout_secs,
            }),
        }
    }

    /// A paused player with `text` already loaded.
    pub fn with_text(config: &ReaderConfig, scheduler: Arc<dyn Scheduler>, text: &str) -> Self {
        let player = Self::new(config, scheduler);
        player.load_text(text);
        player
    }

    /// Register an observer. It receives the current frame immediately.
    pub fn subscribe(&self, observer: Observer) {
        let frame = self.frame();
        observer.on_frame(&frame);
        self.shared
            .observers
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .push(observer);
    }

    // ── Transitions ──────────────────────────────────────────────────────

    /// Replace the text. Playback stops and the cursor returns to the start.
    pub fn load_text(&self, text: &str) {
        let events = {
            let mut inner = self.shared.lock();
            inner.source_text = text.to_string();
            vec![Event::Frame(self.shared.reload(&mut inner))]
        };
        self.shared.emit(events);
    }

    /// Start or stop playback. Returns whether the player is now playing;
    /// always `false` when no words are loaded.
    pub fn toggle_play(&self) -> bool {
        let (playing, events) = {
            let mut inner = self.shared.lock();
            if !inner.session.toggle_play() {
                return false;
            }
            let playing = inner.session.is_playing();
            if playing {
                info!(
                    "Playing from word {} of {} at {}",
                    inner.session.position(),
                    inner.session.len(),
                    inner.session.speed()
                );
                self.shared.arm(&mut inner);
            } else {
                debug!("Paused at word {}", inner.session.position());
                Shared::cancel_pending(&mut inner);
            }
            (playing, vec![Event::Frame(Frame::capture(&inner.session))])
        };
        self.shared.emit(events);
        playing
    }

    /// Stop and rewind to the first word.
    pub fn reset(&self) {
        let events = {
            let mut inner = self.shared.lock();
            Shared::cancel_pending(&mut inner);
            inner.session.reset();
            vec![Event::Frame(Frame::capture(&inner.session))]
        };
        self.shared.emit(events);
    }

    /// Change speed. While playing, the wait for the current word is re-armed
    /// with the new delay.
    pub fn set_speed(&self, speed: Speed) {
        let events = {
            let mut inner = self.shared.lock();
            inner.session.set_speed(speed);
            if inner.session.is_playing() {
                self.shared.arm(&mut inner);
            }
            vec![Event::Frame(Frame::capture(&inner.session))]
        };
        self.shared.emit(events);
    }

    // ── Collaborators ────────────────────────────────────────────────────

    /// Resolve `input` (path or URL), extract its text and load it.
    ///
    /// Returns the number of words loaded.
    pub async fn load_document(
        &self,
        extractor: &dyn DocumentExtractor,
        input: &str,
    ) -> Result<usize, ServiceError> {
        let name = display_name(input);
        let job = self.begin(format!("Extracting text from {name}..."))?;
        let start = Instant::now();

        let result = match resolve_input(input, self.shared.download_timeout_secs).await {
            Ok(doc) => extractor.extract(&doc).await,
            Err(e) => Err(e),
        };

        if result.is_ok() {
            info!("Extracted '{}' in {:?}", name, start.elapsed());
        }
        job.finish(result, "Error reading document")
    }

    /// Replace the source text with its AI-refined or summarized version.
    ///
    /// Returns the number of words loaded.
    pub async fn transform(
        &self,
        transformer: &dyn TextTransformer,
        kind: TransformKind,
    ) -> Result<usize, ServiceError> {
        let source = self.source_text();
        if source.trim().is_empty() {
            return Err(ServiceError::NothingToTransform);
        }
        let job = self.begin(kind.progress_label().to_string())?;

        let result = transformer
            .transform(&source, kind)
            .await
            .map(|text| normalize::clean_transformed(&text))
            .and_then(|text| {
                if text.is_empty() {
                    Err(ServiceError::EmptyResponse)
                } else {
                    Ok(text)
                }
            });

        job.finish(result, "AI processing failed")
    }

    fn begin(&self, status: String) -> Result<Job, ServiceError> {
        let events = {
            let mut inner = self.shared.lock();
            if inner.processing {
                return Err(ServiceError::Busy);
            }
            inner.processing = true;
            info!("{}", status);
            self.shared.set_status(&mut inner, Some(status), false)
        };
        self.shared.emit(events);
        Ok(Job {
            shared: Arc::clone(&self.shared),
            done: false,
        })
    }

    // ── Snapshots ────────────────────────────────────────────────────────

    pub fn frame(&self) -> Frame {
        Frame::capture(&self.shared.lock().session)
    }

    pub fn state(&self) -> PlaybackState {
        self.shared.lock().session.state()
    }

    pub fn speed(&self) -> Speed {
        self.shared.lock().session.speed()
    }

    /// Text the current words were segmented from.
    pub fn source_text(&self) -> String {
        self.shared.lock().source_text.clone()
    }

    /// Current transient status message, if any.
    pub fn status(&self) -> Option<String> {
        self.shared.lock().status.clone()
    }

    /// Whether a collaborator call is in flight.
    pub fn is_processing(&self) -> bool {
        self.shared.lock().processing
    }

    /// Whether an advancement wait is outstanding.
    pub fn has_pending_advance(&self) -> bool {
        self.shared.lock().pending.is_some()
    }

    /// A copy of the underlying session.
    pub fn session(&self) -> ReadingSession {
        self.shared.lock().session.clone()
    }
}

/// An in-flight collaborator call. Dropping it unfinished (the future was
/// cancelled) releases the busy flag and clears the progress status.
struct Job {
    shared: Arc<Shared>,
    done: bool,
}

impl Job {
    fn finish(mut self, result: Result<String, ServiceError>, label: &str) -> Result<usize, ServiceError> {
        self.done = true;
        let (outcome, events) = {
            let mut inner = self.shared.lock();
            inner.processing = false;
            match result {
                Ok(text) => {
                    inner.source_text = text;
                    let frame = self.shared.reload(&mut inner);
                    let mut events = self.shared.set_status(&mut inner, None, false);
                    events.push(Event::Frame(frame));
                    (Ok(inner.session.len()), events)
                }
                Err(e) => {
                    warn!("{}: {}", label, e);
                    let message = format!("{label}: {e}");
                    let events = self.shared.set_status(&mut inner, Some(message), true);
                    (Err(e), events)
                }
            }
        };
        self.shared.emit(events);
        outcome
    }
}

impl Drop for Job {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        let events = {
            let mut inner = self.shared.lock();
            inner.processing = false;
            self.shared.set_status(&mut inner, None, false)
        };
        self.shared.emit(events);
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, events: Vec<Event>) {
        if events.is_empty() {
            return;
        }
        let observers = self
            .observers
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone();
        for event in &events {
            for observer in &observers {
                match event {
                    Event::Frame(frame) => observer.on_frame(frame),
                    Event::Status(status) => observer.on_status(status.as_deref()),
                    Event::Finished(total) => observer.on_finished(*total),
                }
            }
        }
    }

    /// Re-segment `source_text` into the session, stopping playback.
    fn reload(&self, inner: &mut Inner) -> Frame {
        Self::cancel_pending(inner);
        let text = std::mem::take(&mut inner.source_text);
        inner.session.load_text(&text);
        inner.source_text = text;
        info!("Loaded {} words", inner.session.len());
        Frame::capture(&inner.session)
    }

    fn cancel_pending(inner: &mut Inner) {
        if let Some(pending) = inner.pending.take() {
            pending.handle.cancel();
        }
    }

    /// Cancel any outstanding wait, then schedule one for the current word.
    fn arm(self: &Arc<Self>, inner: &mut Inner) {
        Self::cancel_pending(inner);
        let Some(word) = inner.session.current_word() else {
            return;
        };
        let delay = word_delay(word.text(), inner.session.speed());
        debug!(
            "Word {} '{}' for {:?}",
            inner.session.position(),
            word.text(),
            delay
        );

        inner.generation += 1;
        let generation = inner.generation;
        let weak: Weak<Shared> = Arc::downgrade(self);
        let handle = self.scheduler.schedule_once(
            delay,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.on_timer(generation);
                }
            }),
        );
        inner.pending = Some(Pending { generation, handle });
    }

    fn on_timer(self: &Arc<Self>, generation: u64) {
        let events = {
            let mut inner = self.lock();
            match inner.pending {
                Some(ref pending) if pending.generation == generation => {}
                _ => return,
            }
            inner.pending = None;
            inner.session.advance();

            let mut events = Vec::with_capacity(2);
            if inner.session.is_playing() {
                self.arm(&mut inner);
            }
            events.push(Event::Frame(Frame::capture(&inner.session)));
            if inner.session.state() == PlaybackState::Finished {
                info!("Finished {} words", inner.session.len());
                events.push(Event::Finished(inner.session.len()));
            }
            events
        };
        self.emit(events);
    }

    /// Replace the status line. Transient messages clear themselves after
    /// `status_ttl`; any later status change supersedes the pending clear.
    fn set_status(
        self: &Arc<Self>,
        inner: &mut Inner,
        status: Option<String>,
        transient: bool,
    ) -> Vec<Event> {
        if let Some(timer) = inner.status_timer.take() {
            timer.handle.cancel();
        }
        let changed = inner.status != status;
        inner.status = status.clone();

        if transient && status.is_some() {
            inner.generation += 1;
            let generation = inner.generation;
            let weak = Arc::downgrade(self);
            let handle = self.scheduler.schedule_once(
                self.status_ttl,
                Box::new(move || {
                    if let Some(shared) = weak.upgrade() {
                        shared.clear_status(generation);
                    }
                }),
            );
            inner.status_timer = Some(Pending { generation, handle });
        }
        if changed {
            vec![Event::Status(status)]
        } else {
            Vec::new()
        }
    }

    fn clear_status(self: &Arc<Self>, generation: u64) {
        let events = {
            let mut inner = self.lock();
            match inner.status_timer {
                Some(ref timer) if timer.generation == generation => {}
                _ => return,
            }
            inner.status_timer = None;
            inner.status = None;
            vec![Event::Status(None)]
        };
        self.emit(events);
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let inner = self.inner.get_mut().unwrap_or_else(|p| p.into_inner());
        Shared::cancel_pending(inner);
        if let Some(timer) = inner.status_timer.take() {
            timer.handle.cancel();
        }
    }
}
