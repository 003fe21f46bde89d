//! CLI binary for focusread.
//!
//! A thin shim over the library crate: maps CLI flags to `ReaderConfig`,
//! loads text from a document, stdin or the command line, optionally runs it
//! through an LLM, then plays it word by word in the terminal.

use anyhow::{Context, Result};
use clap::Parser;
use focusread::{
    total_duration, word_delay, AutoExtractor, Frame, LlmTransformer, PlaybackState, Player,
    ReaderConfig, SessionObserver, Speed, TokioScheduler, TransformKind, WordRecord, DEFAULT_TEXT,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::sync::Notify;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

/// Column the pivot letter is drawn on.
const PIVOT_COLUMN: usize = 12;

/// `prefix` right-aligned so the pivot always lands on [`PIVOT_COLUMN`].
fn render_word(word: &WordRecord) -> String {
    let pad = PIVOT_COLUMN.saturating_sub(word.prefix().chars().count());
    format!(
        "{}{}{}{}",
        " ".repeat(pad),
        word.prefix(),
        bold(&red(word.pivot())),
        word.suffix()
    )
}

// ── Terminal observer ────────────────────────────────────────────────────────

/// Draws the current word, either as the message of an indicatif bar or as
/// plain lines on stdout when the bar is disabled.
struct TerminalObserver {
    bar: Option<ProgressBar>,
    /// Index of the last word drawn; the finishing frame repeats it.
    last_drawn: AtomicUsize,
    quiet: bool,
    done: Arc<Notify>,
}

impl TerminalObserver {
    fn new(total: usize, show_progress: bool, quiet: bool, done: Arc<Notify>) -> Arc<Self> {
        let bar = show_progress.then(|| {
            let bar = ProgressBar::new(total as u64);
            let style = ProgressStyle::with_template(
                "{msg:40}  [{bar:30.green/238}] {pos:>5}/{len} words  ⏱ {elapsed_precise}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ");
            bar.set_style(style);
            bar
        });
        Arc::new(Self {
            bar,
            last_drawn: AtomicUsize::new(usize::MAX),
            quiet,
            done,
        })
    }
}

impl SessionObserver for TerminalObserver {
    fn on_frame(&self, frame: &Frame) {
        if frame.state != PlaybackState::Playing && frame.state != PlaybackState::Finished {
            return;
        }
        let Some(ref word) = frame.word else {
            return;
        };
        if self.last_drawn.swap(frame.index, Ordering::SeqCst) == frame.index {
            return;
        }
        match self.bar {
            Some(ref bar) => {
                bar.set_position(frame.index as u64 + 1);
                bar.set_message(render_word(word));
            }
            None => println!("{}", render_word(word)),
        }
    }

    fn on_status(&self, status: Option<&str>) {
        let Some(status) = status else {
            return;
        };
        if self.quiet {
            return;
        }
        match self.bar {
            Some(ref bar) => bar.println(dim(status)),
            None => eprintln!("{}", dim(status)),
        }
    }

    fn on_finished(&self, total_words: usize) {
        if let Some(ref bar) = self.bar {
            bar.finish();
        }
        if !self.quiet {
            eprintln!("{} {} words read", green("✔"), bold(&total_words.to_string()));
        }
        self.done.notify_one();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Read the built-in demo passage at 300 WPM
  focusread

  # Read a PDF at 500 WPM
  focusread --speed 500 book.pdf

  # Read a PDF straight from a URL
  focusread https://arxiv.org/pdf/1706.03762

  # Read text from stdin
  cat notes.txt | focusread -

  # Summarize first, then read
  focusread --summarize --provider openai --model gpt-4.1-nano paper.pdf

  # Show the word / pivot / delay table and the estimated reading time
  focusread --dry-run --speed 700 --text "Hi. There, world"

  # Word records as JSON
  focusread --dry-run --json chapter.txt > words.json

SPEEDS:
  300, 500, 700 or 900 words per minute. Words ending a sentence (. ! ?)
  stay 2.2× longer; words ending a clause (, ; :) stay 1.6× longer.

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)

CONTROLS:
  Ctrl-C pauses playback and prints the current position.
"#;

/// Speed-read text, PDFs and URLs one word at a time (RSVP).
#[derive(Parser, Debug)]
#[command(
    name = "focusread",
    version,
    about = "Speed-read text, PDFs and URLs one word at a time (RSVP)",
    long_about = "Rapid Serial Visual Presentation reader. Shows one word at a time on a \
fixed column with its pivot letter highlighted, pausing longer on punctuation. Text can \
come from a PDF or text file, a URL, stdin, or the command line, and can optionally be \
refined or summarized by an LLM (OpenAI, Anthropic, Gemini, Ollama, ...) before reading.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF or text file path, HTTP/HTTPS URL, or "-" for stdin.
    input: Option<String>,

    /// Read this text instead of INPUT.
    #[arg(long, conflicts_with = "input")]
    text: Option<String>,

    /// Reading speed in words per minute: 300, 500, 700 or 900.
    #[arg(short, long, env = "FOCUSREAD_SPEED", default_value = "300")]
    speed: Speed,

    /// Refine the text for speed reading with an LLM before playing.
    #[arg(long, conflicts_with = "summarize")]
    refine: bool,

    /// Summarize the text with an LLM before playing.
    #[arg(long)]
    summarize: bool,

    /// LLM model ID (e.g. gpt-4.1-nano, claude-sonnet-4-20250514).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "FOCUSREAD_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Max LLM output tokens.
    #[arg(long, env = "FOCUSREAD_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// Retries on LLM failure.
    #[arg(long, env = "FOCUSREAD_MAX_RETRIES", default_value_t = 0)]
    max_retries: u32,

    /// LLM call timeout in seconds.
    #[arg(long, env = "FOCUSREAD_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "FOCUSREAD_PASSWORD")]
    password: Option<String>,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "FOCUSREAD_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Print the segmentation and estimated reading time instead of playing.
    #[arg(long)]
    dry_run: bool,

    /// With --dry-run, print word records as JSON.
    #[arg(long, requires = "dry_run")]
    json: bool,

    /// Print words as plain lines instead of a progress bar.
    #[arg(long, env = "FOCUSREAD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "FOCUSREAD_VERBOSE")]
    verbose: bool,

    /// Suppress everything except the words and errors.
    #[arg(short, long, env = "FOCUSREAD_QUIET")]
    quiet: bool,
}

impl Cli {
    fn transform_kind(&self) -> Option<TransformKind> {
        if self.refine {
            Some(TransformKind::Refine)
        } else if self.summarize {
            Some(TransformKind::Summarize)
        } else {
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Library INFO logs would tear the live word display; keep them off
    // unless asked for.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || !cli.dry_run {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;
    let scheduler = TokioScheduler::current().context("Failed to start the playback clock")?;
    let player = Player::new(&config, Arc::new(scheduler));

    // ── Load text ────────────────────────────────────────────────────────
    match (cli.text.as_deref(), cli.input.as_deref()) {
        (Some(text), _) => player.load_text(text),
        (None, Some("-")) => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read stdin")?;
            player.load_text(&text);
        }
        (None, Some(input)) => {
            if !cli.quiet {
                eprintln!("{} Extracting text from {}", cyan("◆"), bold(input));
            }
            let extractor = AutoExtractor::from_config(&config);
            player
                .load_document(&extractor, input)
                .await
                .with_context(|| format!("Error reading {input}"))?;
        }
        (None, None) => player.load_text(DEFAULT_TEXT),
    }

    if let Some(kind) = cli.transform_kind() {
        if !cli.quiet {
            eprintln!("{} {}", cyan("◆"), kind.progress_label());
        }
        let transformer = LlmTransformer::from_config(&config)
            .context("Failed to initialise LLM provider")?;
        player
            .transform(&transformer, kind)
            .await
            .with_context(|| format!("AI {kind} failed"))?;
    }

    let session = player.session();
    if session.is_empty() {
        anyhow::bail!("Nothing to read: the text contains no words");
    }

    // ── Dry run ──────────────────────────────────────────────────────────
    if cli.dry_run {
        if cli.json {
            let json = serde_json::to_string_pretty(session.words())
                .context("Failed to serialise words")?;
            println!("{json}");
            return Ok(());
        }
        for (i, word) in session.words().iter().enumerate() {
            let delay = word_delay(word.text(), session.speed());
            println!(
                "{:>6}  {}  {}",
                dim(&(i + 1).to_string()),
                render_word(word),
                dim(&format!("{:.1}ms", delay.as_secs_f64() * 1000.0)),
            );
        }
        if !cli.quiet {
            let total = total_duration(session.words(), session.speed());
            eprintln!(
                "{} {} words at {}  ≈ {:.1}s",
                green("✔"),
                bold(&session.len().to_string()),
                session.speed(),
                total.as_secs_f64()
            );
        }
        return Ok(());
    }

    // ── Play ─────────────────────────────────────────────────────────────
    if !cli.quiet {
        let total = total_duration(session.words(), session.speed());
        eprintln!(
            "{} {} words at {}  ≈ {:.0}s  {}",
            cyan("◆"),
            bold(&session.len().to_string()),
            session.speed(),
            total.as_secs_f64(),
            dim("(Ctrl-C to pause)")
        );
    }

    let done = Arc::new(Notify::new());
    let show_progress = !cli.no_progress && !cli.quiet;
    let observer = TerminalObserver::new(session.len(), show_progress, cli.quiet, done.clone());
    player.subscribe(observer.clone());
    player.toggle_play();

    tokio::select! {
        _ = done.notified() => {}
        _ = tokio::signal::ctrl_c() => {
            if player.state() == PlaybackState::Playing {
                player.toggle_play();
            }
            if let Some(ref bar) = observer.bar {
                bar.abandon();
            }
            let frame = player.frame();
            eprintln!(
                "{} Paused at word {}/{} ({:.0}%)",
                cyan("⏸"),
                bold(&(frame.index + 1).to_string()),
                frame.total,
                frame.progress
            );
        }
    }

    Ok(())
}

/// Map CLI args to `ReaderConfig`.
fn build_config(cli: &Cli) -> Result<ReaderConfig> {
    let mut builder = ReaderConfig::builder()
        .speed(cli.speed)
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .max_retries(cli.max_retries)
        .api_timeout_secs(cli.api_timeout)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(ref password) = cli.password {
        builder = builder.password(password.clone());
    }

    builder.build().context("Invalid configuration")
}
