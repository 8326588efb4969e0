mod coordinator;
mod poller;
mod tracker;

use futures::stream::BoxStream;
use kube::runtime::watcher::Event;
use tokio::sync::{
    mpsc,
    watch,
};
use tracing::*;

pub use self::coordinator::{
    CompletionSource,
    WatchCoordinator,
    WatchState,
};
pub use self::poller::PodPoller;
pub use self::tracker::{
    PodTracker,
    pod_event_stream,
};
use crate::errors::*;
use crate::prelude::*;

// Both observation paths hand their results to the coordinator through a single-slot channel; if
// the coordinator isn't reading, the producer waits.  That back-pressure is intentional.
pub const HANDOFF_CAPACITY: usize = 1;

pub type ObjStream<K> = BoxStream<'static, anyhow::Result<Event<K>>>;
pub type StatusSender = mpsc::Sender<Vec<corev1::ContainerStatus>>;
pub type StatusReceiver = mpsc::Receiver<Vec<corev1::ContainerStatus>>;
pub type PollSender = mpsc::Sender<bool>;
pub type PollReceiver = mpsc::Receiver<bool>;

err_impl! {WatchError,
    #[error("handoff channel to the watch coordinator is closed: {0}")]
    ChannelClosed(String),

    #[error("invalid watch state transition: {0}")]
    InvalidTransition(String),

    #[error("both observation paths closed before completion was detected for {0}")]
    ObservationLost(String),
}

// Cancellation signal for one of the observation loops.  Stopping is idempotent, and never blocks
// (even if the loop on the other end has already exited and dropped its receiver).
#[derive(Clone, Debug)]
pub struct StopHandle {
    tx: watch::Sender<bool>,
}

impl StopHandle {
    pub(crate) fn new() -> (StopHandle, watch::Receiver<bool>) {
        let (tx, rx) = watch::channel(false);
        (StopHandle { tx }, rx)
    }

    pub fn stop(&self) {
        if self.tx.send_replace(true) {
            debug!("stop already requested, ignoring");
        }
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }
}

// Resolves once a stop has been requested, or once the handle has been dropped (nobody is left
// who could ask us to keep going).
pub(crate) async fn stop_requested(stop_rx: &mut watch::Receiver<bool>) {
    let _ = stop_rx.wait_for(|stopped| *stopped).await;
}

#[cfg(test)]
mod tests;
