//! Reading-session state machine.
//!
//! Pure state: no timers, no I/O. The [`crate::player::Player`] owns a
//! session and drives [`ReadingSession::advance`] from the playback clock.
//!
//! ```text
//!            load_text(non-empty)            toggle_play
//!   Idle ───────────────────────▶ Paused ◀──────────────▶ Playing
//!    ▲                              ▲  ▲                     │
//!    └──── load_text(empty) ────────┘  └── reset ──┐         │ advance() past
//!                                                  │         ▼ the last word
//!                                                Finished ◀──┘
//! ```

use crate::segment::{segment, WordRecord};
use crate::speed::Speed;
use serde::{Deserialize, Serialize};

/// Observable playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// No words loaded.
    Idle,
    Playing,
    /// Words loaded, cursor holding its position.
    Paused,
    /// Cursor on the last word after natural completion. Behaves like
    /// `Paused`.
    Finished,
}

/// Words, cursor, play flag and speed for one loaded text.
#[derive(Debug, Clone, Default)]
pub struct ReadingSession {
    words: Vec<WordRecord>,
    current_index: usize,
    is_playing: bool,
    finished: bool,
    speed: Speed,
}

impl ReadingSession {
    pub fn new(speed: Speed) -> Self {
        Self {
            speed,
            ..Self::default()
        }
    }

    /// Replace the word sequence with the segmentation of `text`.
    ///
    /// Always rewinds to the first word and stops playback.
    pub fn load_text(&mut self, text: &str) {
        self.words = segment(text);
        self.current_index = 0;
        self.is_playing = false;
        self.finished = false;
    }

    /// Flip the play flag. Returns `false` (no effect) when no words are
    /// loaded.
    pub fn toggle_play(&mut self) -> bool {
        if self.words.is_empty() {
            return false;
        }
        self.is_playing = !self.is_playing;
        self.finished = false;
        true
    }

    pub fn reset(&mut self) {
        self.is_playing = false;
        self.current_index = 0;
        self.finished = false;
    }

    /// Takes effect on the next delay computation.
    pub fn set_speed(&mut self, speed: Speed) {
        self.speed = speed;
    }

    /// Step to the next word, or stop on the last one.
    ///
    /// At the last index this clears the play flag and leaves the cursor where
    /// it is, so repeated calls are idempotent.
    pub fn advance(&mut self) {
        let Some(last) = self.words.len().checked_sub(1) else {
            self.is_playing = false;
            return;
        };
        if self.current_index < last {
            self.current_index += 1;
        } else {
            self.is_playing = false;
            self.finished = true;
        }
    }

    pub fn state(&self) -> PlaybackState {
        if self.words.is_empty() {
            PlaybackState::Idle
        } else if self.is_playing {
            PlaybackState::Playing
        } else if self.finished {
            PlaybackState::Finished
        } else {
            PlaybackState::Paused
        }
    }

    pub fn words(&self) -> &[WordRecord] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    /// The word under the cursor, or `None` before any text is loaded.
    pub fn current_word(&self) -> Option<&WordRecord> {
        self.words.get(self.current_index)
    }

    /// Percentage through the text: `index / (len - 1) * 100`, or 0 for
    /// sequences shorter than two words.
    pub fn progress(&self) -> f64 {
        if self.words.len() > 1 {
            self.current_index as f64 / (self.words.len() - 1) as f64 * 100.0
        } else {
            0.0
        }
    }

    /// 1-based cursor position for "N of M words" counters.
    pub fn position(&self) -> usize {
        self.current_index + 1
    }
}
