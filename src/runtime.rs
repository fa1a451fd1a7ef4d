use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::engine::InputEvent;

/// Unified event type consumed by a session loop. Keystrokes and timer
/// ticks arrive through one serialized stream, so no two transitions ever
/// race and input order is preserved exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    Input(InputEvent),
    Tick,
    /// The input producer went away; the loop decides whether to keep
    /// ticking (timed session still running) or wind down.
    Closed,
}

/// Source of input events (keyboard, script, test channel).
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event. Returns Ok(event) if
    /// one arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<InputEvent, RecvTimeoutError>;
}

/// Event source fed by an mpsc channel. Production loops hang a reader
/// thread on the sending side; tests push events directly.
pub struct ChannelEventSource {
    rx: Receiver<InputEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<InputEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<InputEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface.
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker.
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Runner that advances a session loop one event/tick at a time.
pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        self.ticker.interval()
    }

    /// Blocks up to the tick interval and returns the next event, Tick on
    /// timeout, or Closed once the producer hung up.
    pub fn step(&self) -> EngineEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => EngineEvent::Input(ev),
            Err(RecvTimeoutError::Timeout) => EngineEvent::Tick,
            Err(RecvTimeoutError::Disconnected) => EngineEvent::Closed,
        }
    }
}
