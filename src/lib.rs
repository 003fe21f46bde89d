//! # focusread
//!
//! A speed-reading core built on Rapid Serial Visual Presentation (RSVP):
//! text is shown one word at a time at a fixed spot, each word anchored on
//! its pivot letter, at a steady words-per-minute rate that lingers on
//! punctuation.
//!
//! ## Architecture
//!
//! ```text
//! text ──▶ segment ──▶ ReadingSession ◀── Player ──▶ SessionObserver(s)
//!          (pivots)    (state machine)      │          (Frame, status)
//!                                           ▼
//!                                       Scheduler
//!                                   (one wait at a time)
//! ```
//!
//! * [`segment`] splits text into [`WordRecord`]s with a prefix / pivot /
//!   suffix split.
//! * [`ReadingSession`] is the pure state machine: cursor, play flag, speed.
//! * [`clock`] computes per-word delays and abstracts timers behind
//!   [`Scheduler`].
//! * [`Player`] binds a session to a scheduler, fans out [`Frame`]s and runs
//!   the text collaborators in [`pipeline`] (PDF extraction, AI refine /
//!   summarize).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use focusread::{Player, ReaderConfig, Speed, TokioScheduler};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ReaderConfig::builder().speed(Speed::Wpm500).build()?;
//!     let player = Player::with_text(
//!         &config,
//!         Arc::new(TokioScheduler::current()?),
//!         "Hi. There, world",
//!     );
//!     player.toggle_play();
//!     tokio::time::sleep(std::time::Duration::from_secs(1)).await;
//!     println!("{:?}", player.frame());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `focusread` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! focusread = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod pipeline;
pub mod player;
pub mod prompts;
pub mod segment;
pub mod session;
pub mod speed;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use clock::{
    delay_ms, total_duration, word_delay, ManualScheduler, Pause, Scheduler, TimerHandle,
    TimerTask, TokioScheduler,
};
pub use config::{ReaderConfig, ReaderConfigBuilder};
pub use error::{FocusReadError, ServiceError};
pub use events::{Frame, NoopObserver, Observer, SessionObserver};
pub use pipeline::extract::{AutoExtractor, DocumentExtractor, PdfExtractor, PlainTextExtractor};
pub use pipeline::input::{resolve_input, ResolvedDocument};
pub use pipeline::transform::{LlmTransformer, TextTransformer};
pub use player::Player;
pub use prompts::TransformKind;
pub use segment::{pivot_index, segment, WordRecord};
pub use session::{PlaybackState, ReadingSession};
pub use speed::Speed;

/// Demo passage shown when no text has been supplied.
pub const DEFAULT_TEXT: &str = "Speed reading is a set of techniques intended to improve a person's ability to read quickly. Rapid Serial Visual Presentation (RSVP) is one such method. It involves displaying words in a single location at a fixed speed, which eliminates the time spent on eye movements between words. By focusing on a single point and highlighting the 'pivot' letter of each word, readers can significantly increase their words-per-minute rate while maintaining or even improving comprehension. Load your own PDFs or text files to practice this skill at varying speeds.";
