use crate::bank::WordBank;
use crate::config::{Config, Mode};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

/// Floor on the number of words provisioned for a timed session, so the
/// stream cannot run dry before the clock does.
pub const TIME_MODE_MIN_WORDS: usize = 200;

/// Handles word-stream generation for a session.
///
/// Holds the candidate pools and a seedable rng; reproducible streams for
/// tests come from `with_seed`.
pub struct WordSource {
    base: WordBank,
    numbers: WordBank,
    punctuation: WordBank,
    rng: StdRng,
}

impl WordSource {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            base: WordBank::base(),
            numbers: WordBank::numbers(),
            punctuation: WordBank::punctuation(),
            rng,
        }
    }

    #[cfg(test)]
    fn with_banks(base: WordBank, numbers: WordBank, punctuation: WordBank, seed: u64) -> Self {
        Self {
            base,
            numbers,
            punctuation,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate the word sequence for a fresh session.
    pub fn generate(&mut self, config: &Config) -> Vec<String> {
        let needed = match config.mode {
            Mode::Words => config.word_count,
            Mode::Time => config.word_count.max(TIME_MODE_MIN_WORDS),
        };
        let pool = self.pool(config);
        self.draw(&pool, needed)
    }

    /// Generate a follow-up batch for a timed session that is close to
    /// exhausting its provisioned words.
    pub fn refill(&mut self, config: &Config) -> Vec<String> {
        let pool = self.pool(config);
        self.draw(&pool, TIME_MODE_MIN_WORDS)
    }

    fn pool(&self, config: &Config) -> Vec<String> {
        let mut pool = self.base.words.clone();
        if config.include_numbers {
            pool.extend(self.numbers.words.iter().cloned());
        }
        if config.include_punctuation {
            pool.extend(self.punctuation.words.iter().cloned());
        }

        let filtered: Vec<String> = pool
            .iter()
            .filter(|w| config.word_length.admits(w))
            .cloned()
            .collect();

        if filtered.is_empty() {
            // A filter combination that empties the pool is recovered
            // locally; the session always gets words.
            debug!(class = %config.word_length, "length filter emptied pool, using base bank");
            return self.base.words.clone();
        }
        filtered
    }

    // Uniform permutation of the pool; when more words are requested than
    // the pool holds, reshuffle and keep drawing.
    fn draw(&mut self, pool: &[String], needed: usize) -> Vec<String> {
        let mut deck: Vec<String> = pool.to_vec();
        let mut out = Vec::with_capacity(needed);
        while out.len() < needed {
            deck.shuffle(&mut self.rng);
            let take = (needed - out.len()).min(deck.len());
            out.extend(deck.iter().take(take).cloned());
        }
        out
    }
}
