use crate::session::Counters;
use std::time::Duration;

/// Floor on elapsed minutes so a session's first instants don't divide by
/// (almost) zero. Matches the product behaviour this engine replaces.
const MIN_MINUTES: f64 = 0.1;

/// Derived performance numbers. Live and final values come from the same
/// formulas; only the elapsed time fed in differs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Metrics {
    pub wpm: f64,
    pub accuracy: f64,
    pub correct_chars: usize,
    pub incorrect_chars: usize,
    pub total_chars: usize,
    pub grade: Grade,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, strum_macros::Display)]
pub enum Grade {
    #[strum(serialize = "A+")]
    APlus,
    #[strum(serialize = "A")]
    A,
    #[strum(serialize = "B+")]
    BPlus,
    #[strum(serialize = "B")]
    B,
    #[strum(serialize = "C+")]
    CPlus,
    #[strum(serialize = "C")]
    C,
    #[strum(serialize = "D")]
    D,
    #[strum(serialize = "F")]
    F,
}

/// Gross WPM: correct characters ÷ 5 per elapsed minute.
pub fn gross_wpm(correct_chars: usize, elapsed: Duration) -> f64 {
    let minutes = (elapsed.as_secs_f64() / 60.0).max(MIN_MINUTES);
    (correct_chars as f64 / 5.0) / minutes
}

/// Net WPM: gross minus the incorrect-character penalty, floored at zero.
pub fn net_wpm(correct_chars: usize, incorrect_chars: usize, elapsed: Duration) -> f64 {
    let minutes = (elapsed.as_secs_f64() / 60.0).max(MIN_MINUTES);
    let penalty = (incorrect_chars as f64 / 5.0) / minutes;
    (gross_wpm(correct_chars, elapsed) - penalty).max(0.0)
}

/// Accuracy over all characters with a terminal status; an untouched
/// session reads 100%.
pub fn accuracy(correct_chars: usize, total_chars: usize) -> f64 {
    if total_chars == 0 {
        return 100.0;
    }
    (correct_chars as f64 / total_chars as f64 * 100.0).round()
}

/// Letter grade from a weighted blend of accuracy and speed. 60 WPM and up
/// earns full marks on the speed component.
pub fn grade(accuracy: f64, wpm: f64) -> Grade {
    let score = accuracy * 0.7 + (wpm / 60.0).min(1.0) * 100.0 * 0.3;
    match score {
        s if s >= 95.0 => Grade::APlus,
        s if s >= 90.0 => Grade::A,
        s if s >= 85.0 => Grade::BPlus,
        s if s >= 80.0 => Grade::B,
        s if s >= 70.0 => Grade::CPlus,
        s if s >= 60.0 => Grade::C,
        s if s >= 40.0 => Grade::D,
        _ => Grade::F,
    }
}

/// Compute the full metric set for a counter snapshot at a given elapsed
/// time.
pub fn compute(counters: &Counters, elapsed: Duration) -> Metrics {
    let wpm = net_wpm(counters.correct_chars, counters.incorrect_chars, elapsed).round();
    let accuracy = accuracy(counters.correct_chars, counters.total_chars);
    Metrics {
        wpm,
        accuracy,
        correct_chars: counters.correct_chars,
        incorrect_chars: counters.incorrect_chars,
        total_chars: counters.total_chars,
        grade: grade(accuracy, wpm),
    }
}
