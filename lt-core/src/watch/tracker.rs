use futures::{
    StreamExt,
    TryStreamExt,
};
use kube::runtime::WatchStreamExt;
use kube::runtime::watcher::watcher;

use super::*;

// Every pod in the namespace, no field selector; filtering happens in-process below.  Watch errors
// (disconnects, expired resource versions) are retried with the default backoff, and anything that
// slips through is covered by the poller.
pub fn pod_event_stream(pod_api: kube::Api<corev1::Pod>) -> ObjStream<corev1::Pod> {
    watcher(pod_api, Default::default())
        .default_backoff()
        .map_err(|e| e.into())
        .boxed()
}

// The PodTracker bridges the pod event stream into the coordinator's status channel.  It only
// cares about one pod; updates for anything else in the namespace (which is most of them) are
// dropped on the floor.  It deliberately doesn't decide whether the target has finished; that's
// the coordinator's job, so both observation paths go through the same check.
pub struct PodTracker {
    pod_name: String,
    pod_stream: ObjStream<corev1::Pod>,
    status_tx: StatusSender,
    stop_rx: watch::Receiver<bool>,
}

impl PodTracker {
    pub fn new(pod_name: &str, pod_stream: ObjStream<corev1::Pod>, status_tx: StatusSender) -> (PodTracker, StopHandle) {
        let (stop, stop_rx) = StopHandle::new();
        (
            PodTracker {
                pod_name: pod_name.into(),
                pod_stream,
                status_tx,
                stop_rx,
            },
            stop,
        )
    }

    // This is not a reference because it needs to "own" itself when tokio spawns it
    #[instrument(skip_all, fields(pod = %self.pod_name))]
    pub async fn start(mut self) {
        info!("starting pod event stream");
        loop {
            let maybe_evt = tokio::select! {
                biased;
                _ = stop_requested(&mut self.stop_rx) => {
                    info!("stop requested, closing pod event stream");
                    break;
                },
                maybe_evt = self.pod_stream.next() => maybe_evt,
            };

            match maybe_evt {
                Some(Ok(evt)) => {
                    if let Err(err) = self.handle_pod_event(evt).await {
                        warn!("pod tracker exiting: {err}");
                        break;
                    }
                },
                Some(Err(err)) => {
                    skerr!(err, "pod tracker received error on stream");
                },
                None => {
                    warn!("pod event stream ended; relying on the poller from here on");
                    break;
                },
            }
        }
    }

    // Only returns an error if the coordinator has hung up; anything wrong with an individual
    // event is logged and skipped.
    pub(super) async fn handle_pod_event(&mut self, evt: Event<corev1::Pod>) -> EmptyResult {
        let pod = match evt {
            Event::Apply(pod) | Event::InitApply(pod) => pod,
            Event::Delete(pod) => {
                if pod.name_any() == self.pod_name {
                    warn!("tracked pod was deleted, forwarding its last known status");
                }
                pod
            },
            Event::Init | Event::InitDone => return Ok(()),
        };

        if pod.name_any() != self.pod_name {
            return Ok(());
        }

        let statuses = pod.container_statuses().to_vec();
        debug!("publishing {} container statuses", statuses.len());
        if self.status_tx.send(statuses).await.is_err() {
            bail!(WatchError::channel_closed(&self.pod_name));
        }
        Ok(())
    }
}
