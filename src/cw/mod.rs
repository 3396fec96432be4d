mod decoder;
pub mod scheduler;
pub mod table;
pub mod timing;

use std::sync::{Arc, Weak};
use std::thread::JoinHandle;

use tracing::info;

use crate::error::Result;

pub use decoder::{Decoder, DecoderConfig, DecoderSnapshot, Output, Phase, Sink};
pub use scheduler::{ManualScheduler, Scheduler, Tick, TickHandle, POLL_PERIOD};
pub use table::{Category, CodeEntry, Pattern, Symbol};

/// Decoder driven by its own ticker thread
pub type TickedDecoder<K> = Decoder<K, TickHandle>;

/// Build a decoder and the ticker thread that polls it.
///
/// The thread exits when the decoder is dropped or when
/// `decoder.scheduler().shutdown()` is called.
pub fn spawn_decoder<K>(sink: K, config: DecoderConfig) -> Result<(Arc<TickedDecoder<K>>, JoinHandle<()>)>
where
    K: Sink + 'static,
{
    config.validate()?;
    let (handle, receiver) = TickHandle::channel();
    let decoder = Arc::new(Decoder::new(sink, handle, config));

    let target: Weak<dyn Tick> = Arc::downgrade(&decoder) as Weak<dyn Tick>;
    let thread = scheduler::spawn_ticker(receiver, target)?;

    info!(wpm = config.wpm, auto_word_space = config.auto_word_space, direct_mode = config.direct_mode, "decoder started");
    Ok((decoder, thread))
}
