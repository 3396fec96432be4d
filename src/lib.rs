//! Real-time Morse key decoder.
//!
//! Turns timestamped dit/dah key events into characters and word separators
//! using a fixed-period poll, safe to drive from an input thread and a timer
//! thread at once.

pub mod config;
pub mod cw;
pub mod error;
pub mod input;
pub mod practice;

pub use config::Settings;
pub use cw::{spawn_decoder, Decoder, DecoderConfig, Output, Pattern, Sink, Symbol};
pub use error::{Error, Result};
pub use input::{ChannelSink, KeyEvent, MorseHost};
