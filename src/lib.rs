// Library surface for embedders and integration tests.
// The binary in main.rs is one consumer; a UI layer is another.
pub mod bank;
pub mod config;
pub mod engine;
pub mod metrics;
pub mod reducer;
pub mod runtime;
pub mod session;
pub mod timing;
pub mod words;

pub use config::Config;
pub use engine::{InputEvent, SessionEngine};
pub use session::{Phase, SessionState};

/// Recommended tick interval for external schedulers.
pub const TICK_RATE_MS: u64 = 100;
