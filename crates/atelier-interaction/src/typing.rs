//! Typing reveal: paces out reply text like a human typist.

use tokio::sync::mpsc;
use tokio::time::{Duration, sleep};
use tokio_util::sync::CancellationToken;

/// One step of a typing reveal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypingUpdate {
    /// Text revealed so far, always a valid prefix of the full content.
    Partial(String),
    /// The reveal finished (or was skipped); carries the full content.
    Done(String),
}

/// Handle to a running reveal.
pub struct TypingTask {
    updates: mpsc::UnboundedReceiver<TypingUpdate>,
    cancel: CancellationToken,
}

impl TypingTask {
    /// Next update, or `None` once the reveal task has finished.
    pub async fn next(&mut self) -> Option<TypingUpdate> {
        self.updates.recv().await
    }

    /// Stops the reveal. Used when the session switches away so a stale
    /// reveal never writes into the new session's view.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that stops this reveal, for wiring into external lifetimes.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

/// Milliseconds between characters for a given words-per-minute rate,
/// assuming five characters per word.
fn char_delay_ms(wpm: u32) -> f64 {
    let chars_per_second = (wpm as f64 * 5.0) / 60.0;
    1000.0 / chars_per_second
}

/// Starts revealing `content` character by character at `wpm`.
///
/// Very high rates reveal instantly: sub-4ms timers are unreliable and
/// pointless to watch.
pub fn start_reveal(content: String, wpm: u32) -> TypingTask {
    let (tx, rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    tokio::spawn(async move {
        let delay = char_delay_ms(wpm.max(1));
        if delay < 4.0 || wpm > 3000 {
            let _ = tx.send(TypingUpdate::Done(content));
            return;
        }
        let pause = Duration::from_secs_f64(delay / 1000.0);
        let mut boundaries = content.char_indices().map(|(i, c)| i + c.len_utf8());
        loop {
            let Some(end) = boundaries.next() else {
                break;
            };
            tokio::select! {
                _ = token.cancelled() => return,
                _ = sleep(pause) => {}
            }
            if tx.send(TypingUpdate::Partial(content[..end].to_string())).is_err() {
                return;
            }
        }
        let _ = tx.send(TypingUpdate::Done(content));
    });

    TypingTask {
        updates: rx,
        cancel,
    }
}
