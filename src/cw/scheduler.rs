//! Poll scheduling.
//!
//! The decoder does not own a timer. It asks a [`Scheduler`] to arm the next
//! poll and to cancel it on reset; both calls happen while the decoder lock is
//! held, so implementations must return promptly and never call back into the
//! decoder.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Weak;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{after, never, select, unbounded, Receiver, Sender};
use tracing::{debug, info};

use crate::error::Result;

/// Fixed poll period. At most half the char gap at
/// [`MAX_WPM`](crate::config::MAX_WPM) (60 wpm -> 60ms), so a finalize lands
/// no later than one period after the gap elapses.
pub const POLL_PERIOD: Duration = Duration::from_millis(20);

pub trait Scheduler: Send + Sync {
    /// Arm a single poll `delay` from now, replacing any armed one
    fn schedule(&self, delay: Duration);

    /// Disarm any pending poll
    fn cancel(&self);
}

/// Something the ticker thread can drive
pub trait Tick: Send + Sync {
    fn tick(&self, now: Instant);
}

/// Scheduler for hosts that run their own fixed-period loop and only need
/// to know whether the decoder currently wants polling.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    armed: AtomicBool,
    arms: AtomicUsize,
    cancels: AtomicUsize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// Number of times a poll was armed
    pub fn arm_count(&self) -> usize {
        self.arms.load(Ordering::Relaxed)
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::Relaxed)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, _delay: Duration) {
        self.armed.store(true, Ordering::Release);
        self.arms.fetch_add(1, Ordering::Relaxed);
    }

    fn cancel(&self) {
        self.armed.store(false, Ordering::Release);
        self.cancels.fetch_add(1, Ordering::Relaxed);
    }
}

/// Commands sent to the ticker thread
#[derive(Debug)]
enum TickCommand {
    Arm(Duration),
    Disarm,
    Shutdown,
}

/// Scheduler backed by a ticker thread.
///
/// Only holds a channel sender, so arming from inside the decoder lock never
/// blocks.
#[derive(Debug, Clone)]
pub struct TickHandle {
    command_tx: Sender<TickCommand>,
}

impl TickHandle {
    /// Create a handle and the receiving end for [`spawn_ticker`]
    pub fn channel() -> (Self, TickReceiver) {
        let (command_tx, command_rx) = unbounded();
        (Self { command_tx }, TickReceiver { command_rx })
    }

    /// Stop the ticker thread. Pending polls are dropped.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(TickCommand::Shutdown);
    }
}

impl Scheduler for TickHandle {
    fn schedule(&self, delay: Duration) {
        let _ = self.command_tx.send(TickCommand::Arm(delay));
    }

    fn cancel(&self) {
        let _ = self.command_tx.send(TickCommand::Disarm);
    }
}

/// Receiving end of a [`TickHandle`]
#[derive(Debug)]
pub struct TickReceiver {
    command_rx: Receiver<TickCommand>,
}

/// Spawn the ticker thread driving `target`.
///
/// The thread holds only a weak reference and exits once the target is
/// dropped, every handle is dropped, or [`TickHandle::shutdown`] is called.
pub fn spawn_ticker(receiver: TickReceiver, target: Weak<dyn Tick>) -> Result<JoinHandle<()>> {
    let handle = thread::Builder::new()
        .name("morse-ticker".into())
        .spawn(move || ticker_thread(receiver.command_rx, target))?;
    Ok(handle)
}

fn ticker_thread(command_rx: Receiver<TickCommand>, target: Weak<dyn Tick>) {
    info!("ticker started");
    let mut deadline: Option<Instant> = None;

    loop {
        let timer: Receiver<Instant> = match deadline {
            Some(at) => after(at.saturating_duration_since(Instant::now())),
            None => never(),
        };

        select! {
            recv(command_rx) -> command => match command {
                Ok(TickCommand::Arm(delay)) => deadline = Some(Instant::now() + delay),
                Ok(TickCommand::Disarm) => deadline = None,
                Ok(TickCommand::Shutdown) | Err(_) => break,
            },
            recv(timer) -> _ => {
                deadline = None;
                match target.upgrade() {
                    Some(target) => target.tick(Instant::now()),
                    None => break,
                }
            }
        }
    }

    debug!("ticker stopped");
}
