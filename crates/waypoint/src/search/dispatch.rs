//! Hand-off of index completions to the session's owner thread.
//!
//! Index completions arrive on worker threads. They carry nothing but the
//! generation of the search they belong to and its outcome; everything that
//! touches session state happens later, when the owner feeds the completion
//! back into [`crate::SearchSession::handle_completion`].

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use tracing::debug;

use super::SearchError;

/// Outcome of one index search, tagged with the search generation.
#[derive(Debug)]
pub struct Completion {
    pub(crate) generation: u64,
    pub(crate) outcome: Result<(), SearchError>,
}

impl Completion {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Port through which completions are posted to the owner's execution
/// context (a UI thread, an event loop, ...). Must not run session code
/// inline.
pub trait OwnerDispatcher: Send + Sync {
    fn dispatch(&self, completion: Completion);
}

/// Create a channel based dispatcher and the inbox the owner drains.
pub fn owner_channel() -> (ChannelDispatcher, OwnerInbox) {
    let (tx, rx) = mpsc::channel();
    (ChannelDispatcher { tx }, OwnerInbox { rx })
}

#[derive(Debug, Clone)]
pub struct ChannelDispatcher {
    tx: Sender<Completion>,
}

impl OwnerDispatcher for ChannelDispatcher {
    fn dispatch(&self, completion: Completion) {
        if let Err(err) = self.tx.send(completion) {
            debug!(
                generation = err.0.generation,
                "Owner inbox closed, dropping completion"
            );
        }
    }
}

/// Receiving end owned by the session's owner.
#[derive(Debug)]
pub struct OwnerInbox {
    rx: Receiver<Completion>,
}

impl OwnerInbox {
    pub fn try_next(&self) -> Option<Completion> {
        self.rx.try_recv().ok()
    }

    /// Block until a completion arrives or `timeout` elapses.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Completion> {
        match self.rx.recv_timeout(timeout) {
            Ok(completion) => Some(completion),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}
