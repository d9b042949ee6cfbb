//! Fetch/filter/timeout state machines shared by every page.
//!
//! Each page owns one controller. A controller never blocks: operations
//! spawn a tokio task that races the API call against the UI timeout and
//! reports back exactly once over an `mpsc` channel as a [`ControllerEvent`].
//! The owner feeds those events back through `handle_event`, which applies a
//! result only when its sequence number is still the latest issued, so the
//! last query issued wins rather than the last response received.

mod detail;
mod feed;
mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use detail::{DetailController, DetailEvent, DetailOutcome, DetailState};
pub use feed::{FeedController, FeedEvent, FeedPage, FeedSettings};
pub use state::{CategoryState, FeedState, FeedStatus, FetchOutcome, TIMEOUT_MESSAGE};

use tokio::sync::mpsc;

/// A settled background operation, tagged with the controller it belongs to.
#[derive(Debug)]
pub enum ControllerEvent {
    Feed { page: FeedPage, event: FeedEvent },
    Detail(DetailEvent),
}

pub type ControllerSender = mpsc::Sender<ControllerEvent>;

/// Deliver an event from a background task, tolerating a closed receiver.
pub(crate) async fn deliver(tx: &ControllerSender, event: ControllerEvent) {
    if let Err(e) = tx.send(event).await {
        tracing::debug!(error = %e, "Controller event dropped (receiver closed)");
    }
}
