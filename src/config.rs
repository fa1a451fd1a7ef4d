use clap::ValueEnum;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// How a session ends: when the clock runs out, or after a fixed word count.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Time,
    Words,
}

/// Failure rules applied while typing.
///
/// Normal records everything; expert fails the session on an incorrect word
/// commit; master fails it on the first incorrect keystroke.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Normal,
    Expert,
    Master,
}

/// Word-length filter, measured on alphanumeric characters only.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WordLengthClass {
    All,
    Short,
    Medium,
    Long,
    Thicc,
}

impl WordLengthClass {
    /// Whether a candidate word falls in this class. Punctuation is stripped
    /// before measuring, so "don't" counts 4 characters.
    pub fn admits(&self, word: &str) -> bool {
        let len = word.chars().filter(|c| c.is_alphanumeric()).count();
        match self {
            WordLengthClass::All => true,
            WordLengthClass::Short => len <= 4,
            WordLengthClass::Medium => (5..=8).contains(&len),
            WordLengthClass::Long => (9..=12).contains(&len),
            WordLengthClass::Thicc => len > 12,
        }
    }
}

pub const TIME_LIMIT_PRESETS: [u64; 4] = [15, 30, 60, 120];
pub const WORD_COUNT_PRESETS: [usize; 4] = [10, 25, 50, 100];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub mode: Mode,
    pub time_limit_secs: u64,
    pub word_count: usize,
    pub difficulty: Difficulty,
    pub include_numbers: bool,
    pub include_punctuation: bool,
    pub word_length: WordLengthClass,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Time,
            time_limit_secs: 30,
            word_count: 50,
            difficulty: Difficulty::Normal,
            include_numbers: false,
            include_punctuation: false,
            word_length: WordLengthClass::All,
        }
    }
}

impl Config {
    /// Clamp limits to at least one second / one word. Presets are a UI
    /// convenience; any positive value is valid.
    pub fn sanitized(mut self) -> Self {
        self.time_limit_secs = self.time_limit_secs.max(1);
        self.word_count = self.word_count.max(1);
        self
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "takt") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("takt_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg;
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
