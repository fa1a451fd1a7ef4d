use crate::config::{Config, Mode};
use crate::metrics::{self, Metrics};
use crate::reducer;
use crate::session::{Phase, SessionState};
use crate::timing::{Clock, MonotonicClock, TimingController};
use crate::words::WordSource;
use std::time::Duration;
use tracing::debug;

/// Raw input fed into a session. Event sources translate a typed space to
/// `Commit`; the engine also accepts `Char(' ')` and does the same.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Char(char),
    Backspace,
    Commit,
}

/// Refill the word stream of a timed session when fewer than this many
/// unseen words remain.
const REFILL_MARGIN: usize = 20;

/// Owns one typing session: state, timing, and the word stream.
///
/// All transitions are synchronous; callers serialize events per session.
/// The hosting layer reads `state()` for rendering and `metrics()` for the
/// live numbers.
pub struct SessionEngine {
    config: Config,
    state: SessionState,
    timing: TimingController,
    source: WordSource,
    clock: Box<dyn Clock>,
}

impl SessionEngine {
    pub fn new(config: Config) -> Self {
        Self::with_source(config, WordSource::new(), Box::new(MonotonicClock::new()))
    }

    /// Full injection point: seeded word source and/or test clock.
    pub fn with_source(config: Config, mut source: WordSource, clock: Box<dyn Clock>) -> Self {
        let config = config.sanitized();
        let state = SessionState::new(source.generate(&config));
        let timing = TimingController::new(Self::limit(&config));
        Self {
            config,
            state,
            timing,
            source,
            clock,
        }
    }

    fn limit(config: &Config) -> Option<Duration> {
        match config.mode {
            Mode::Time => Some(Duration::from_secs(config.time_limit_secs)),
            Mode::Words => None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn elapsed(&self) -> Duration {
        self.timing.elapsed()
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.timing.remaining()
    }

    /// Apply one input event. Terminal phases consume events without
    /// effect; only `reset` leaves them.
    pub fn handle_input(&mut self, event: InputEvent) -> &SessionState {
        if self.state.phase.is_terminal() {
            return &self.state;
        }
        if self.state.phase == Phase::Active {
            self.timing.observe(self.clock.now());
        }

        match event {
            InputEvent::Char(' ') | InputEvent::Commit => {
                reducer::commit_word(&mut self.state, self.config.difficulty);
                if !self.state.phase.is_terminal() {
                    self.after_commit();
                }
            }
            InputEvent::Char(c) if reducer::is_typeable(c) => {
                if self.state.phase == Phase::Idle {
                    self.timing.start(self.clock.now());
                    self.state.phase = Phase::Active;
                    debug!("session started");
                }
                reducer::write_char(&mut self.state, self.config.difficulty, c);
            }
            // Anything else on the keyboard is the host's business.
            InputEvent::Char(_) => {}
            InputEvent::Backspace => {
                reducer::backspace(&mut self.state);
            }
        }

        if self.state.phase.is_terminal() {
            self.timing.stop();
            debug!(phase = ?self.state.phase, "session ended");
        }
        &self.state
    }

    /// Periodic tick from the external scheduler. Samples the injected
    /// clock, and in time mode drives completion independent of keystrokes.
    pub fn tick(&mut self) -> &SessionState {
        if self.state.phase != Phase::Active {
            return &self.state;
        }
        self.timing.observe(self.clock.now());
        if self.config.mode == Mode::Time && self.timing.expired() {
            self.timing.stop();
            self.state.phase = Phase::Completed;
            debug!("time limit reached");
        }
        &self.state
    }

    /// Current metric set. In a terminal phase the elapsed time is frozen,
    /// so this doubles as the final report.
    pub fn metrics(&self) -> Metrics {
        metrics::compute(&self.state.counters, self.timing.elapsed())
    }

    /// Discard the session and start a fresh one, optionally with a new
    /// configuration. The timing controller is rebuilt, so no stale tick
    /// can touch the new state.
    pub fn reset(&mut self, config: Option<Config>) -> &SessionState {
        if let Some(config) = config {
            self.config = config.sanitized();
        }
        self.state = SessionState::new(self.source.generate(&self.config));
        self.timing = TimingController::new(Self::limit(&self.config));
        debug!("session reset");
        &self.state
    }

    fn after_commit(&mut self) {
        match self.config.mode {
            Mode::Words => {
                if self.state.current_word_index >= self.config.word_count
                    || self.state.current_word_index >= self.state.words.len()
                {
                    self.state.phase = Phase::Completed;
                }
            }
            Mode::Time => {
                if self.state.words_remaining() < REFILL_MARGIN {
                    let batch = self.source.refill(&self.config);
                    debug!(batch = batch.len(), "refilled word stream");
                    self.state.extend_words(batch);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Difficulty;
    use crate::session::{CharStatus, WordStatus};
    use crate::timing::ManualClock;
    use assert_matches::assert_matches;
    use std::time::Duration;

    fn engine(config: Config) -> (SessionEngine, ManualClock) {
        let clock = ManualClock::new();
        let engine =
            SessionEngine::with_source(config, WordSource::with_seed(42), Box::new(clock.clone()));
        (engine, clock)
    }

    fn words_config(count: usize) -> Config {
        Config {
            mode: Mode::Words,
            word_count: count,
            ..Config::default()
        }
    }

    fn type_current_word(engine: &mut SessionEngine) {
        let word = engine.state().current_word().unwrap().to_string();
        for c in word.chars() {
            engine.handle_input(InputEvent::Char(c));
        }
        engine.handle_input(InputEvent::Commit);
    }

    #[test]
    fn first_character_starts_the_session() {
        let (mut engine, clock) = engine(words_config(5));
        assert_eq!(engine.state().phase, Phase::Idle);

        clock.set(Duration::from_secs(3));
        engine.handle_input(InputEvent::Char('a'));
        assert_eq!(engine.state().phase, Phase::Active);
        assert_eq!(engine.elapsed(), Duration::ZERO);
    }

    #[test]
    fn space_char_is_treated_as_commit() {
        let (mut engine, _clock) = engine(words_config(5));
        let word = engine.state().current_word().unwrap().to_string();
        for c in word.chars() {
            engine.handle_input(InputEvent::Char(c));
        }
        engine.handle_input(InputEvent::Char(' '));
        assert_eq!(engine.state().current_word_index, 1);
        assert_eq!(engine.state().counters.correct_words, 1);
    }

    #[test]
    fn untypeable_characters_are_ignored() {
        let (mut engine, _clock) = engine(words_config(5));
        engine.handle_input(InputEvent::Char('€'));
        engine.handle_input(InputEvent::Char('\t'));
        assert_eq!(engine.state().phase, Phase::Idle);
        assert_eq!(engine.state().current_input, "");
    }

    // Scenario E: words mode completes after the configured count.
    #[test]
    fn words_mode_completes_after_count() {
        let (mut engine, _clock) = engine(words_config(3));
        for _ in 0..3 {
            type_current_word(&mut engine);
        }
        assert_eq!(engine.state().phase, Phase::Completed);

        // Nothing mutates after completion.
        let counters = engine.state().counters;
        engine.handle_input(InputEvent::Char('a'));
        engine.handle_input(InputEvent::Backspace);
        engine.handle_input(InputEvent::Commit);
        assert_eq!(engine.state().counters, counters);
    }

    // Scenario F: time mode completes on tick, final metrics at the limit.
    #[test]
    fn time_mode_completes_on_tick() {
        let config = Config {
            mode: Mode::Time,
            time_limit_secs: 15,
            ..Config::default()
        };
        let (mut engine, clock) = engine(config);

        engine.handle_input(InputEvent::Char('a'));
        assert_eq!(engine.state().phase, Phase::Active);

        clock.set(Duration::from_secs(14));
        engine.tick();
        assert_eq!(engine.state().phase, Phase::Active);

        clock.set(Duration::from_secs(16));
        engine.tick();
        assert_eq!(engine.state().phase, Phase::Completed);
        assert_eq!(engine.elapsed(), Duration::from_secs(15));
    }

    #[test]
    fn tick_before_start_does_nothing() {
        let config = Config {
            mode: Mode::Time,
            time_limit_secs: 15,
            ..Config::default()
        };
        let (mut engine, clock) = engine(config);
        clock.set(Duration::from_secs(60));
        engine.tick();
        assert_eq!(engine.state().phase, Phase::Idle);
        assert_eq!(engine.elapsed(), Duration::ZERO);
    }

    #[test]
    fn master_difficulty_fails_from_engine_path() {
        let config = Config {
            difficulty: Difficulty::Master,
            ..words_config(5)
        };
        let (mut engine, _clock) = engine(config);
        let first = engine.state().current_word().unwrap().chars().next().unwrap();
        let wrong = if first == 'x' { 'y' } else { 'x' };
        engine.handle_input(InputEvent::Char(wrong));
        assert_eq!(engine.state().phase, Phase::Failed);
    }

    #[test]
    fn expert_difficulty_fails_on_bad_commit() {
        let config = Config {
            difficulty: Difficulty::Expert,
            ..words_config(5)
        };
        let (mut engine, _clock) = engine(config);
        engine.handle_input(InputEvent::Char('x'));
        engine.handle_input(InputEvent::Char('x'));
        engine.handle_input(InputEvent::Commit);
        assert_eq!(engine.state().phase, Phase::Failed);
    }

    #[test]
    fn time_mode_refills_word_stream() {
        let config = Config {
            mode: Mode::Time,
            time_limit_secs: 600,
            ..Config::default()
        };
        let (mut engine, _clock) = engine(config);
        let provisioned = engine.state().words.len();

        // Burn through words until a refill must have happened.
        for _ in 0..provisioned {
            type_current_word(&mut engine);
        }
        assert_eq!(engine.state().phase, Phase::Active);
        assert!(engine.state().words.len() > provisioned);
        assert!(engine.state().current_word().is_some());
        assert_matches!(
            engine.state().word_states[engine.state().current_word_index].status,
            WordStatus::Current
        );
    }

    #[test]
    fn reset_produces_identical_shape() {
        let (mut engine, _clock) = engine(words_config(10));
        type_current_word(&mut engine);
        engine.reset(None);

        let s = engine.state();
        assert_eq!(s.phase, Phase::Idle);
        assert_eq!(s.words.len(), 10);
        assert_eq!(s.current_word_index, 0);
        assert_eq!(s.current_input, "");
        assert!(s.committed.is_empty());
        assert!(s
            .char_states
            .iter()
            .all(|w| w.iter().all(|c| *c == CharStatus::Untyped)));

        engine.reset(None);
        let t = engine.state();
        assert_eq!(t.phase, Phase::Idle);
        assert_eq!(t.words.len(), 10);
    }

    #[test]
    fn reset_accepts_new_config() {
        let (mut engine, _clock) = engine(words_config(10));
        engine.reset(Some(words_config(25)));
        assert_eq!(engine.state().words.len(), 25);
        assert_eq!(engine.config().word_count, 25);
    }

    #[test]
    fn reset_discards_stale_timer() {
        let config = Config {
            mode: Mode::Time,
            time_limit_secs: 15,
            ..Config::default()
        };
        let (mut engine, clock) = engine(config);
        engine.handle_input(InputEvent::Char('a'));
        clock.set(Duration::from_secs(10));
        engine.tick();
        engine.reset(None);

        // The old session's elapsed time must not leak into the new one.
        assert_eq!(engine.elapsed(), Duration::ZERO);
        clock.set(Duration::from_secs(20));
        engine.tick();
        assert_eq!(engine.state().phase, Phase::Idle);
    }

    #[test]
    fn live_and_final_metrics_agree_at_completion() {
        let (mut engine, clock) = engine(words_config(2));
        clock.set(Duration::from_secs(0));
        type_current_word(&mut engine);
        clock.set(Duration::from_secs(30));
        type_current_word(&mut engine);
        assert_eq!(engine.state().phase, Phase::Completed);

        let at_completion = engine.metrics();
        clock.set(Duration::from_secs(300));
        engine.tick();
        assert_eq!(engine.metrics(), at_completion);
    }

    #[test]
    fn metrics_reflect_committed_counters() {
        let (mut engine, clock) = engine(words_config(5));
        clock.set(Duration::from_secs(0));
        type_current_word(&mut engine);
        clock.set(Duration::from_secs(6));
        engine.tick();

        let m = engine.metrics();
        let expected = engine.state().counters.correct_chars;
        assert_eq!(m.correct_chars, expected);
        assert_eq!(m.accuracy, 100.0);
        assert!(m.wpm > 0.0);
    }

    #[test]
    fn cursor_never_leaves_bounds() {
        let (mut engine, _clock) = engine(words_config(3));
        for _ in 0..5 {
            engine.handle_input(InputEvent::Backspace);
        }
        for _ in 0..3 {
            type_current_word(&mut engine);
        }
        let s = engine.state();
        assert!(s.current_word_index <= s.words.len());
        assert!(s.counters.correct_chars + s.counters.incorrect_chars <= s.counters.total_chars);
    }
}
