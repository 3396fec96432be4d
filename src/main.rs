use std::io::{self, BufRead, Write};
use std::thread;

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use morse_ime::cw::{timing, POLL_PERIOD};
use morse_ime::input::write_outputs;
use morse_ime::{spawn_decoder, ChannelSink, MorseHost, Output, Settings, Sink, Symbol};

/// Decode dit/dah keystrokes read from stdin.
///
/// `.` is a dit and `-` a dah. A space pauses for a character gap, `/` for a
/// word gap, `#` toggles shift. Anything else is an ordinary key: it cancels
/// the sequence in progress and is echoed through.
#[derive(Parser, Debug)]
#[command(name = "morse-ime", version)]
struct Args {
    /// Keying speed in words per minute
    #[arg(long, env = "MORSE_WPM")]
    wpm: Option<u32>,

    /// Emit a space after a word gap of silence
    #[arg(long)]
    auto_space: bool,

    /// Emit raw dit/dah glyphs and newlines instead of characters
    #[arg(long)]
    direct: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "morse_ime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();

    let mut settings = Settings::load();
    if let Some(wpm) = args.wpm {
        settings.wpm = wpm;
    }
    settings.auto_word_space |= args.auto_space;
    settings.direct_mode |= args.direct;
    let config = settings.clamped().decoder_config();

    let (sink, output_rx) = ChannelSink::channel();
    let (decoder, ticker) = spawn_decoder(sink, config)?;
    let host = MorseHost::new(decoder);

    let printer = thread::spawn(move || write_outputs(&output_rx, &mut io::stdout().lock()));

    // Taps are one dit apart; pauses overshoot by a poll period so the tick
    // after the gap is guaranteed to see it.
    let tap_spacing = timing::dit_duration(config.wpm);
    let char_pause = timing::char_gap(config.wpm) + POLL_PERIOD;
    let word_pause = timing::word_gap(config.wpm) + POLL_PERIOD;
    let mut shifted = false;

    for line in io::stdin().lock().lines() {
        for key in line?.chars() {
            match key {
                '.' => {
                    host.on_symbol(Symbol::Dit);
                    thread::sleep(tap_spacing);
                }
                '-' => {
                    host.on_symbol(Symbol::Dah);
                    thread::sleep(tap_spacing);
                }
                ' ' => thread::sleep(char_pause),
                '/' => thread::sleep(word_pause),
                '#' => {
                    shifted = !shifted;
                    host.decoder().sink().set_shifted(shifted);
                }
                other => {
                    if host.on_key(other as i32).is_some() {
                        host.decoder().sink().emit(Output::Char(other));
                    }
                }
            }
        }
        thread::sleep(word_pause);
    }

    info!("input finished");
    host.decoder().scheduler().shutdown();
    ticker.join().map_err(|_| anyhow!("ticker thread panicked"))?;

    // Dropping the last decoder handle closes the output channel
    drop(host);
    match printer.join().map_err(|_| anyhow!("output thread panicked"))? {
        Ok(()) => writeln!(io::stdout())?,
        Err(e) => warn!(error = %e, "stdout closed, output stopped"),
    }

    Ok(())
}
