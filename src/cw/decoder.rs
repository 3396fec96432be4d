use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::scheduler::{Scheduler, Tick, POLL_PERIOD};
use super::table::{self, Pattern, Symbol};
use super::timing;
use crate::error::{Error, Result};

/// What the decoder hands to the text sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// Decoded letter, digit or punctuation, case already adjusted
    Char(char),
    /// Word separator in normal mode
    Space,
    /// Character and word boundary in direct mode
    Newline,
    /// Raw dit/dah glyph, direct mode only
    Glyph(char),
}

impl Output {
    /// Text to commit to the editor
    pub fn as_char(self) -> char {
        match self {
            Output::Char(c) | Output::Glyph(c) => c,
            Output::Space => ' ',
            Output::Newline => '\n',
        }
    }
}

/// Receiver of decoded output.
///
/// `emit` runs inside the decoder's critical section: it must not block or
/// call back into the decoder.
pub trait Sink: Send + Sync {
    fn emit(&self, output: Output);

    /// Shift/caps state, queried when a character is finalized
    fn is_shifted(&self) -> bool {
        false
    }

    /// A finalized pattern matched nothing and was dropped
    fn discarded(&self, _pattern: &Pattern) {}
}

/// Parameters consulted by `poll`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    pub wpm: u32,
    /// Emit a word separator after a word gap of silence
    pub auto_word_space: bool,
    /// Emit raw glyphs and newlines instead of decoded characters
    pub direct_mode: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            wpm: 10,
            auto_word_space: false,
            direct_mode: false,
        }
    }
}

impl DecoderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.wpm == 0 {
            return Err(Error::InvalidConfig("words per minute must be positive".into()));
        }
        Ok(())
    }
}

/// Joint state of the pending buffer and the activity clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing pending, no clock
    Idle,
    /// Symbols pending, clock at the last symbol
    Accumulating,
    /// Character just finalized, silence may still grow into a word gap
    AwaitingWordGap,
}

/// Consistent view of the decoder taken under its lock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderSnapshot {
    pub phase: Phase,
    pub pending: Pattern,
    pub last_activity: Option<Instant>,
    pub scheduled: bool,
}

#[derive(Debug)]
struct State {
    pending: Pattern,
    /// None while idle
    last_activity: Option<Instant>,
    /// Whether a poll loop is running for this session
    scheduled: bool,
    config: DecoderConfig,
}

impl State {
    fn phase(&self) -> Phase {
        match (self.last_activity, self.pending.is_empty()) {
            (None, _) => Phase::Idle,
            (Some(_), false) => Phase::Accumulating,
            (Some(_), true) => Phase::AwaitingWordGap,
        }
    }
}

/// Timing-driven Morse decoder.
///
/// Symbols arrive through [`record_symbol`](Self::record_symbol) and a
/// fixed-period [`poll`](Self::poll) decides when enough silence has passed
/// to finalize a character or emit a word separator. All state lives behind
/// one lock so producer and timer paths can run on different threads.
pub struct Decoder<K, S> {
    state: Mutex<State>,
    sink: K,
    scheduler: S,
}

impl<K: Sink, S: Scheduler> Decoder<K, S> {
    pub fn new(sink: K, scheduler: S, config: DecoderConfig) -> Self {
        Self {
            state: Mutex::new(State {
                pending: Pattern::new(),
                last_activity: None,
                scheduled: false,
                config,
            }),
            sink,
            scheduler,
        }
    }

    /// Append a symbol and start the poll loop if it is not running.
    /// Returns the config in effect when the symbol was recorded.
    pub fn record_symbol(&self, symbol: Symbol, now: Instant) -> DecoderConfig {
        let mut state = self.state.lock();
        state.pending.push(symbol);
        state.last_activity = Some(now);

        if !state.scheduled {
            self.scheduler.cancel();
            self.scheduler.schedule(POLL_PERIOD);
            state.scheduled = true;
            debug!(?symbol, "poll loop armed");
        }
        state.config
    }

    /// One poll tick. Re-arms the next tick unless the decoder was reset
    /// since this one was armed.
    pub fn poll(&self, now: Instant) {
        let mut state = self.state.lock();
        if !state.scheduled {
            return;
        }
        self.evaluate(&mut state, now);
        self.scheduler.schedule(POLL_PERIOD);
    }

    fn evaluate(&self, state: &mut State, now: Instant) {
        let Some(last) = state.last_activity else {
            return;
        };
        let elapsed = now.saturating_duration_since(last);
        let config = state.config;

        if elapsed < timing::char_gap(config.wpm) {
            return;
        }

        if state.pending.is_empty() {
            if !config.auto_word_space || elapsed < timing::word_gap(config.wpm) {
                return;
            }
            state.last_activity = None;
            let separator = if config.direct_mode {
                Output::Newline
            } else {
                Output::Space
            };
            debug!(?separator, ?elapsed, "word gap");
            self.sink.emit(separator);
            return;
        }

        // Snapshot and clear in the same critical section
        let pattern = state.pending.take();

        if config.direct_mode {
            self.sink.emit(Output::Newline);
            return;
        }

        match table::decode(&pattern) {
            Ok(c) => {
                let c = if self.sink.is_shifted() {
                    c.to_ascii_uppercase()
                } else {
                    c
                };
                debug!(%pattern, character = %c, "decoded");
                self.sink.emit(Output::Char(c));
            }
            Err(err) => {
                warn!(%err, "discarding pattern");
                self.sink.discarded(&pattern);
            }
        }
    }

    /// Cancel polling and return to idle. Idempotent.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        self.scheduler.cancel();
        if !state.pending.is_empty() {
            debug!(pending = %state.pending, "reset dropped pending symbols");
        }
        state.pending.clear();
        state.last_activity = None;
        state.scheduled = false;
    }

    /// Takes effect on the next poll; does not reset state
    pub fn configure(&self, config: DecoderConfig) -> Result<()> {
        config.validate()?;
        self.state.lock().config = config;
        Ok(())
    }

    pub fn config(&self) -> DecoderConfig {
        self.state.lock().config
    }

    pub fn phase(&self) -> Phase {
        self.state.lock().phase()
    }

    pub fn snapshot(&self) -> DecoderSnapshot {
        let state = self.state.lock();
        DecoderSnapshot {
            phase: state.phase(),
            pending: state.pending.clone(),
            last_activity: state.last_activity,
            scheduled: state.scheduled,
        }
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
}

impl<K: Sink, S: Scheduler> Tick for Decoder<K, S> {
    fn tick(&self, now: Instant) {
        self.poll(now);
    }
}
