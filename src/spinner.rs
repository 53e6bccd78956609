//! A terminal indicator shown while a mutation is in flight.
//!
//! The optimistic entry is already on screen by the time this starts; the
//! indicator only marks that the server hasn't had its say yet, and shows
//! how long it has been thinking. Writes to stderr so stdout stays clean.

use std::io::Write;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

const FRAMES: &[&str] = &["-", "\\", "|", "/"];

const TICK: Duration = Duration::from_millis(120);

/// A settling indicator running in a background task.
///
/// Call [`Spinner::start`] after dispatching, [`Spinner::stop`] once the
/// outcome is in.
pub struct Spinner {
    handle: JoinHandle<()>,
    cancel: tokio::sync::watch::Sender<bool>,
}

impl Spinner {
    pub fn start(message: &str) -> Self {
        let (cancel, mut cancelled) = tokio::sync::watch::channel(false);
        let message = message.to_string();

        let handle = tokio::spawn(async move {
            let started = Instant::now();
            let mut ticker = tokio::time::interval(TICK);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut i = 0;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = cancelled.changed() => break,
                }
                let elapsed = started.elapsed().as_secs_f32();
                // \r returns to the start of the line, \x1b[2K clears it
                eprint!("\x1b[2K\r{} {message} ({elapsed:.1}s)", FRAMES[i % FRAMES.len()]);
                let _ = std::io::stderr().flush();
                i += 1;
            }
            eprint!("\x1b[2K\r");
            let _ = std::io::stderr().flush();
        });

        Self { handle, cancel }
    }

    /// Stop the indicator and clear its line.
    pub async fn stop(self) {
        let _ = self.cancel.send(true);
        let _ = self.handle.await;
    }
}
