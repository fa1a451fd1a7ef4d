/// Status of one character slot in a target word.
///
/// `Missing` is only assigned at commit time, when the word was committed
/// with fewer typed characters than the target has.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharStatus {
    Untyped,
    Correct,
    Incorrect,
    Missing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WordStatus {
    Untyped,
    Current,
    Correct,
    Incorrect,
}

/// Per-word status plus, once committed, the literal text the user typed.
/// The stored text is what cross-word backspace restores for re-editing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordState {
    pub status: WordStatus,
    pub typed: Option<String>,
}

impl WordState {
    fn untyped() -> Self {
        Self {
            status: WordStatus::Untyped,
            typed: None,
        }
    }
}

/// Running totals over every character that has been assigned a terminal
/// status. Counters move only at word commit and cross-word rollback.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counters {
    pub correct_chars: usize,
    pub incorrect_chars: usize,
    pub total_chars: usize,
    pub correct_words: usize,
    pub incorrect_words: usize,
}

impl Counters {
    pub fn apply(&mut self, delta: &CommitDelta) {
        self.correct_chars += delta.correct_chars;
        self.incorrect_chars += delta.incorrect_chars;
        self.total_chars += delta.total_chars;
        if delta.word_correct {
            self.correct_words += 1;
        } else {
            self.incorrect_words += 1;
        }
    }

    // Saturating: a revert can never drive a counter negative, whatever the
    // event stream looked like.
    pub fn revert(&mut self, delta: &CommitDelta) {
        self.correct_chars = self.correct_chars.saturating_sub(delta.correct_chars);
        self.incorrect_chars = self.incorrect_chars.saturating_sub(delta.incorrect_chars);
        self.total_chars = self.total_chars.saturating_sub(delta.total_chars);
        if delta.word_correct {
            self.correct_words = self.correct_words.saturating_sub(1);
        } else {
            self.incorrect_words = self.incorrect_words.saturating_sub(1);
        }
    }
}

/// The exact counter contribution a word commit applied, kept so a
/// cross-word rollback subtracts precisely what was added instead of
/// recomputing it from the arrays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommitDelta {
    pub correct_chars: usize,
    pub incorrect_chars: usize,
    pub total_chars: usize,
    pub word_correct: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Active,
    Completed,
    Failed,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Completed | Phase::Failed)
    }
}

/// The authoritative session data model. Mutated only by reducer
/// transitions; replaced wholesale on reset.
#[derive(Clone, Debug)]
pub struct SessionState {
    pub words: Vec<String>,
    pub current_word_index: usize,
    pub current_input: String,
    pub char_states: Vec<Vec<CharStatus>>,
    pub word_states: Vec<WordState>,
    pub committed: Vec<CommitDelta>,
    pub counters: Counters,
    pub phase: Phase,
}

impl SessionState {
    pub fn new(words: Vec<String>) -> Self {
        let char_states = words
            .iter()
            .map(|w| vec![CharStatus::Untyped; w.chars().count()])
            .collect();
        let mut word_states: Vec<WordState> = words.iter().map(|_| WordState::untyped()).collect();
        if let Some(first) = word_states.first_mut() {
            first.status = WordStatus::Current;
        }
        Self {
            words,
            current_word_index: 0,
            current_input: String::new(),
            char_states,
            word_states,
            committed: Vec::new(),
            counters: Counters::default(),
            phase: Phase::Idle,
        }
    }

    pub fn current_word(&self) -> Option<&str> {
        self.words.get(self.current_word_index).map(|w| w.as_str())
    }

    /// Characters typed beyond the current target word's length. They have
    /// no character slot; consumers render them from `current_input`.
    pub fn overflow_len(&self) -> usize {
        let typed = self.current_input.chars().count();
        let target = self
            .current_word()
            .map(|w| w.chars().count())
            .unwrap_or(0);
        typed.saturating_sub(target)
    }

    /// How many provisioned words are still ahead of the cursor.
    pub fn words_remaining(&self) -> usize {
        self.words.len().saturating_sub(self.current_word_index)
    }

    /// Append a fresh batch of words (timed sessions refill through this).
    pub fn extend_words(&mut self, batch: Vec<String>) {
        for word in batch {
            self.char_states
                .push(vec![CharStatus::Untyped; word.chars().count()]);
            self.word_states.push(WordState::untyped());
            self.words.push(word);
        }
        // The cursor may have landed past the old tail before the refill.
        if let Some(ws) = self.word_states.get_mut(self.current_word_index) {
            if ws.status == WordStatus::Untyped {
                ws.status = WordStatus::Current;
            }
        }
    }
}
