use crate::config::Difficulty;
use crate::session::{CharStatus, CommitDelta, Phase, SessionState, WordStatus};
use itertools::{EitherOrBoth, Itertools};

/// Characters the engine accepts as word input. Everything else on the
/// keyboard belongs to the hosting layer (navigation, shortcuts, ...).
pub fn is_typeable(c: char) -> bool {
    c.is_ascii_alphanumeric() || ",.!?;:'\"()-".contains(c)
}

/// Append one typed character to the current word.
///
/// Slots inside the target word get live correct/incorrect feedback;
/// characters typed past the target's end have no slot and are tracked as
/// overflow through `current_input` alone. Counters are untouched; they
/// move at commit.
pub fn write_char(state: &mut SessionState, difficulty: Difficulty, c: char) {
    if state.phase.is_terminal() {
        return;
    }
    let Some(target) = state.current_word() else {
        return;
    };

    let idx = state.current_input.chars().count();
    let expected = target.chars().nth(idx);
    let correct = expected == Some(c);

    // Master mode ends the session on the first mismatch; the keystroke is
    // not recorded.
    if difficulty == Difficulty::Master && !correct {
        state.phase = Phase::Failed;
        return;
    }

    state.current_input.push(c);
    let word_idx = state.current_word_index;
    if let Some(slot) = state.char_states[word_idx].get_mut(idx) {
        *slot = if correct {
            CharStatus::Correct
        } else {
            CharStatus::Incorrect
        };
    }
}

/// Commit the current word (space pressed).
///
/// Classifies every slot, marks trailing target characters missing, counts
/// overflow as incorrect, applies one reversible counter delta, and advances
/// the cursor. A commit with nothing typed is consumed without effect.
pub fn commit_word(state: &mut SessionState, difficulty: Difficulty) {
    if state.phase.is_terminal() {
        return;
    }
    let typed = state.current_input.trim().to_string();
    if typed.is_empty() {
        return;
    }
    let Some(target) = state.current_word().map(str::to_string) else {
        return;
    };

    let is_correct = typed == target;
    if difficulty == Difficulty::Expert && !is_correct {
        state.phase = Phase::Failed;
        return;
    }

    let word_idx = state.current_word_index;
    let mut delta = CommitDelta {
        word_correct: is_correct,
        ..CommitDelta::default()
    };

    for (i, pair) in typed.chars().zip_longest(target.chars()).enumerate() {
        delta.total_chars += 1;
        match pair {
            EitherOrBoth::Both(t, w) => {
                let correct = t == w;
                if correct {
                    delta.correct_chars += 1;
                } else {
                    delta.incorrect_chars += 1;
                }
                // Live feedback already on the slot stays as-is.
                if let Some(slot) = state.char_states[word_idx].get_mut(i) {
                    if *slot == CharStatus::Untyped {
                        *slot = if correct {
                            CharStatus::Correct
                        } else {
                            CharStatus::Incorrect
                        };
                    }
                }
            }
            // Target longer than typed: the rest of the word was never
            // reached.
            EitherOrBoth::Right(_) => {
                delta.incorrect_chars += 1;
                if let Some(slot) = state.char_states[word_idx].get_mut(i) {
                    *slot = CharStatus::Missing;
                }
            }
            // Typed longer than target: overflow, no slot to write.
            EitherOrBoth::Left(_) => {
                delta.incorrect_chars += 1;
            }
        }
    }

    state.word_states[word_idx] = crate::session::WordState {
        status: if is_correct {
            WordStatus::Correct
        } else {
            WordStatus::Incorrect
        },
        typed: Some(typed),
    };
    state.counters.apply(&delta);
    state.committed.push(delta);

    state.current_word_index += 1;
    state.current_input.clear();
    if let Some(next) = state.word_states.get_mut(state.current_word_index) {
        next.status = WordStatus::Current;
    }
}

/// Backspace, in two flavours.
///
/// Inside the current word it pops one character and clears its slot.
/// At the start of a word it rolls back into the previous committed word:
/// the cursor returns, the stored typed text becomes editable input again,
/// and the commit's counter delta is subtracted verbatim. The committed
/// correct/incorrect/missing marks on the previous word's slots are kept.
pub fn backspace(state: &mut SessionState) {
    if state.phase.is_terminal() {
        return;
    }

    if !state.current_input.is_empty() {
        state.current_input.pop();
        let idx = state.current_input.chars().count();
        let word_idx = state.current_word_index;
        if let Some(slot) = state.char_states[word_idx].get_mut(idx) {
            *slot = CharStatus::Untyped;
        }
        return;
    }

    if state.current_word_index == 0 {
        return;
    }

    let leaving = state.current_word_index;
    if let Some(ws) = state.word_states.get_mut(leaving) {
        ws.status = WordStatus::Untyped;
    }

    let prev = leaving - 1;
    if let Some(delta) = state.committed.pop() {
        state.counters.revert(&delta);
    }
    let ws = &mut state.word_states[prev];
    state.current_input = ws.typed.take().unwrap_or_default();
    ws.status = WordStatus::Current;
    state.current_word_index = prev;
}
