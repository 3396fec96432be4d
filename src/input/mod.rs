use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::debug;

use crate::cw::{Decoder, DecoderConfig, Output, Pattern, Scheduler, Sink, Symbol};
use crate::error::Result;

/// Sentinel key codes delivered by the keyboard layer
pub const KEYCODE_DIT: i32 = -102;
pub const KEYCODE_DAH: i32 = -103;
pub const KEYCODE_ENTER: i32 = 10;

/// A raw key press, classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Symbol(Symbol),
    /// Any other key; invalidates an in-progress Morse sequence
    Other(i32),
}

impl KeyEvent {
    pub fn from_code(code: i32) -> Self {
        match code {
            KEYCODE_DIT => KeyEvent::Symbol(Symbol::Dit),
            KEYCODE_DAH => KeyEvent::Symbol(Symbol::Dah),
            other => KeyEvent::Other(other),
        }
    }
}

/// Sink that forwards output over a channel and carries the host's shift
/// state. Sending on an unbounded channel never blocks the decoder lock.
#[derive(Debug)]
pub struct ChannelSink {
    output_tx: Sender<Output>,
    shifted: AtomicBool,
    discards: AtomicUsize,
}

impl ChannelSink {
    pub fn channel() -> (Self, Receiver<Output>) {
        let (output_tx, output_rx) = unbounded();
        let sink = Self {
            output_tx,
            shifted: AtomicBool::new(false),
            discards: AtomicUsize::new(0),
        };
        (sink, output_rx)
    }

    pub fn set_shifted(&self, shifted: bool) {
        self.shifted.store(shifted, Ordering::Release);
    }

    /// Patterns dropped because they matched nothing
    pub fn discard_count(&self) -> usize {
        self.discards.load(Ordering::Relaxed)
    }
}

impl Sink for ChannelSink {
    fn emit(&self, output: Output) {
        // Receiver gone means the host is shutting down
        let _ = self.output_tx.send(output);
    }

    fn is_shifted(&self) -> bool {
        self.shifted.load(Ordering::Acquire)
    }

    fn discarded(&self, _pattern: &Pattern) {
        self.discards.fetch_add(1, Ordering::Relaxed);
    }
}

/// Commit decoded output to `out` as text until the channel closes.
///
/// Returns the first write or flush error; later outputs stay queued.
pub fn write_outputs<W: Write>(outputs: &Receiver<Output>, out: &mut W) -> io::Result<()> {
    for output in outputs {
        write!(out, "{}", output.as_char())?;
        out.flush()?;
    }
    Ok(())
}

/// Adapter between a key-driven input layer and the decoder
pub struct MorseHost<K, S> {
    decoder: Arc<Decoder<K, S>>,
}

impl<K, S> Clone for MorseHost<K, S> {
    fn clone(&self) -> Self {
        Self {
            decoder: Arc::clone(&self.decoder),
        }
    }
}

impl<K: Sink, S: Scheduler> MorseHost<K, S> {
    pub fn new(decoder: Arc<Decoder<K, S>>) -> Self {
        Self { decoder }
    }

    pub fn decoder(&self) -> &Arc<Decoder<K, S>> {
        &self.decoder
    }

    /// Dispatch a raw key code.
    ///
    /// Returns the code when the host should process it itself; dit and dah
    /// are consumed.
    pub fn on_key(&self, code: i32) -> Option<i32> {
        match KeyEvent::from_code(code) {
            KeyEvent::Symbol(symbol) => {
                self.on_symbol(symbol);
                None
            }
            KeyEvent::Other(code) => {
                self.on_non_symbol_key();
                Some(code)
            }
        }
    }

    pub fn on_symbol(&self, symbol: Symbol) {
        self.on_symbol_at(symbol, Instant::now());
    }

    /// Record a symbol with an explicit timestamp. In direct mode the raw
    /// glyph is passed straight through to the sink.
    pub fn on_symbol_at(&self, symbol: Symbol, now: Instant) {
        let config = self.decoder.record_symbol(symbol, now);
        if config.direct_mode {
            self.decoder.sink().emit(Output::Glyph(symbol.pretty()));
        }
    }

    pub fn on_non_symbol_key(&self) {
        self.decoder.reset();
    }

    /// Takes effect on the next poll; pending symbols are kept
    pub fn configure(&self, config: DecoderConfig) -> Result<()> {
        self.decoder.configure(config)
    }

    /// A text field gained focus. `direct_mode` comes from the field's
    /// editor options.
    pub fn start_session(&self, direct_mode: bool) -> Result<()> {
        let config = DecoderConfig {
            direct_mode,
            ..self.decoder.config()
        };
        debug!(direct_mode, "session started");
        self.decoder.configure(config)
    }

    /// The text field lost focus
    pub fn finish_session(&self) {
        debug!("session finished");
        self.decoder.reset();
    }
}
