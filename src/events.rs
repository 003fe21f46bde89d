//! Observer trait for player state changes.
//!
//! Register an [`Arc<dyn SessionObserver>`] with
//! [`crate::player::Player::subscribe`] to receive a [`Frame`] whenever the
//! word list or cursor changes, plus transient status messages from text
//! collaborators. The display layer (terminal, GUI, web socket) lives entirely
//! on the observer side.
//!
//! # Example
//!
//! ```rust
//! use focusread::{Frame, SessionObserver};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct WordCounter {
//!     shown: Arc<AtomicUsize>,
//! }
//!
//! impl SessionObserver for WordCounter {
//!     fn on_frame(&self, frame: &Frame) {
//!         if let Some(ref word) = frame.word {
//!             self.shown.fetch_add(1, Ordering::SeqCst);
//!             eprintln!("{} [{}] {}", word.prefix(), word.pivot(), word.suffix());
//!         }
//!     }
//! }
//! ```

use crate::segment::WordRecord;
use crate::session::{PlaybackState, ReadingSession};
use crate::speed::Speed;
use serde::Serialize;
use std::sync::Arc;

/// Everything a display surface needs to draw the current moment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    /// Word under the cursor, `None` when nothing is loaded.
    pub word: Option<WordRecord>,
    /// 0-based cursor.
    pub index: usize,
    /// Number of words loaded.
    pub total: usize,
    /// 0–100, see [`ReadingSession::progress`].
    pub progress: f64,
    pub state: PlaybackState,
    pub speed: Speed,
}

impl Frame {
    pub fn capture(session: &ReadingSession) -> Self {
        Self {
            word: session.current_word().cloned(),
            index: session.current_index(),
            total: session.len(),
            progress: session.progress(),
            state: session.state(),
            speed: session.speed(),
        }
    }
}

/// Receives player events. Every method defaults to a no-op.
///
/// Events are delivered after the player's internal lock is released, so
/// implementations may call back into the player. Timer-driven frames arrive
/// on the scheduler's thread.
pub trait SessionObserver: Send + Sync {
    /// Called on every change of the cursor, word list, play flag or speed.
    fn on_frame(&self, frame: &Frame) {
        let _ = frame;
    }

    /// A transient status message was set (`Some`) or cleared (`None`).
    fn on_status(&self, status: Option<&str>) {
        let _ = status;
    }

    /// Playback reached the last word and stopped on its own.
    fn on_finished(&self, total_words: usize) {
        let _ = total_words;
    }
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

/// Shared observer handle as stored by the player.
pub type Observer = Arc<dyn SessionObserver>;
