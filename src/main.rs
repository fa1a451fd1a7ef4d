use clap::Parser;
use std::error::Error;
use std::io::Read;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use takt::config::{Config, ConfigStore, Difficulty, FileConfigStore, Mode, WordLengthClass};
use takt::engine::{InputEvent, SessionEngine};
use takt::metrics::Metrics;
use takt::runtime::{ChannelEventSource, EngineEvent, FixedTicker, Runner};
use takt::session::Phase;
use takt::timing::MonotonicClock;
use takt::words::WordSource;
use takt::TICK_RATE_MS;

/// headless typing-test harness around the takt engine
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Runs a typing session over stdin: the target words are printed first, keystrokes are read as they come, and the final report is printed when the session ends. Unset options fall back to the saved configuration."
)]
pub struct Cli {
    /// session mode (time or words)
    #[clap(short = 'm', long, value_enum)]
    mode: Option<Mode>,

    /// time limit in seconds for time mode (presets: 15/30/60/120)
    #[clap(short = 's', long)]
    seconds: Option<u64>,

    /// number of words for words mode (presets: 10/25/50/100)
    #[clap(short = 'w', long)]
    words: Option<usize>,

    /// failure rules (normal, expert, master)
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// mix digits and number words into the stream
    #[clap(long)]
    numbers: bool,

    /// mix punctuation tokens into the stream
    #[clap(long)]
    punctuation: bool,

    /// word-length filter (all, short, medium, long, thicc)
    #[clap(short = 'l', long, value_enum)]
    word_length: Option<WordLengthClass>,

    /// seed for a reproducible word stream
    #[clap(long)]
    seed: Option<u64>,

    /// persist the effective configuration as the new default
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Overlay the flags that were given onto the stored configuration.
    fn merge_into(&self, base: Config) -> Config {
        Config {
            mode: self.mode.unwrap_or(base.mode),
            time_limit_secs: self.seconds.unwrap_or(base.time_limit_secs),
            word_count: self.words.unwrap_or(base.word_count),
            difficulty: self.difficulty.unwrap_or(base.difficulty),
            include_numbers: self.numbers || base.include_numbers,
            include_punctuation: self.punctuation || base.include_punctuation,
            word_length: self.word_length.unwrap_or(base.word_length),
        }
        .sanitized()
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    #[cfg(feature = "trace")]
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let store = FileConfigStore::new();
    let config = cli.merge_into(store.load());
    if cli.save_config {
        store.save(&config)?;
    }

    let source = match cli.seed {
        Some(seed) => WordSource::with_seed(seed),
        None => WordSource::new(),
    };
    let mut engine = SessionEngine::with_source(config, source, Box::new(MonotonicClock::new()));

    print_banner(&engine);

    let events = spawn_stdin_reader();
    let ticker = FixedTicker::new(Duration::from_millis(TICK_RATE_MS));
    let runner = Runner::new(ChannelEventSource::new(events), ticker);

    loop {
        match runner.step() {
            EngineEvent::Input(ev) => {
                engine.handle_input(ev);
            }
            EngineEvent::Tick => {
                engine.tick();
            }
            EngineEvent::Closed => {
                // Input is gone. A session that never started can't finish,
                // and a words-mode session can't commit more words; only a
                // running timed session still ends on its own clock.
                match (engine.state().phase, engine.config().mode) {
                    (Phase::Idle, _) => {
                        eprintln!("no input received");
                        return Ok(());
                    }
                    (Phase::Active, Mode::Words) => {
                        eprintln!("input ended before the session completed");
                        break;
                    }
                    _ => {
                        engine.tick();
                        thread::sleep(runner.tick_interval());
                    }
                }
            }
        }
        if engine.state().phase.is_terminal() {
            break;
        }
    }

    print_report(&engine);
    Ok(())
}

fn print_banner(engine: &SessionEngine) {
    let config = engine.config();
    match config.mode {
        Mode::Words => println!(
            "mode: words ({}) / difficulty: {}",
            config.word_count, config.difficulty
        ),
        Mode::Time => println!(
            "mode: time ({}s) / difficulty: {}",
            config.time_limit_secs, config.difficulty
        ),
    }
    let preview: Vec<&str> = engine
        .state()
        .words
        .iter()
        .take(config.word_count.min(25))
        .map(|w| w.as_str())
        .collect();
    println!("{}", preview.join(" "));
}

fn print_report(engine: &SessionEngine) {
    let state = engine.state();
    let Metrics {
        wpm,
        accuracy,
        correct_chars,
        incorrect_chars,
        total_chars,
        grade,
    } = engine.metrics();

    match state.phase {
        Phase::Failed => println!("session failed ({})", engine.config().difficulty),
        Phase::Completed => println!("session complete"),
        _ => println!("session aborted"),
    }
    println!(
        "wpm: {wpm:.0} / accuracy: {accuracy:.0}% / grade: {grade} / elapsed: {:.1}s",
        engine.elapsed().as_secs_f64()
    );
    println!(
        "chars: {correct_chars} correct, {incorrect_chars} incorrect, {total_chars} total / words: {} correct, {} incorrect",
        state.counters.correct_words, state.counters.incorrect_words
    );
}

/// Read raw bytes off stdin on a dedicated thread and translate them into
/// engine events. Space commits, backspace rolls back, newline commits any
/// trailing word (harmless when input is piped).
fn spawn_stdin_reader() -> mpsc::Receiver<InputEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for byte in std::io::stdin().bytes() {
            let Ok(byte) = byte else { break };
            let event = match byte {
                b' ' | b'\n' | b'\r' => InputEvent::Commit,
                0x08 | 0x7f => InputEvent::Backspace,
                b if b.is_ascii_graphic() => InputEvent::Char(b as char),
                _ => continue,
            };
            if tx.send(event).is_err() {
                break;
            }
        }
    });
    rx
}
