use std::time::Duration;

use kube::api::ListParams;
use tokio::time::{
    MissedTickBehavior,
    interval,
};

use super::*;
use crate::config::TrackedTarget;
use crate::k8s::any_target_completed;

// Watches are not bulletproof: the connection can drop, the apiserver can compact away the
// resource version we were watching from, or an update can simply show up late.  The poller is
// the safety net; every tick it lists the pods in the namespace and runs the same completion check
// the coordinator uses for the event stream.  A failed list is not a big deal, we just try again
// on the next tick.
pub struct PodPoller {
    pod_api: kube::Api<corev1::Pod>,
    target: TrackedTarget,
    poll_interval: Duration,
    result_tx: PollSender,
    stop_rx: watch::Receiver<bool>,
}

impl PodPoller {
    pub fn new(
        pod_api: kube::Api<corev1::Pod>,
        target: &TrackedTarget,
        poll_interval_seconds: u64,
        result_tx: PollSender,
    ) -> (PodPoller, StopHandle) {
        let (stop, stop_rx) = StopHandle::new();
        (
            PodPoller {
                pod_api,
                target: target.clone(),
                poll_interval: Duration::from_secs(poll_interval_seconds),
                result_tx,
                stop_rx,
            },
            stop,
        )
    }

    pub async fn poll_once(&self) -> anyhow::Result<bool> {
        let pods = self.pod_api.list(&ListParams::default()).await?;
        let Some(pod) = pods.items.iter().find(|p| p.name_any() == self.target.pod_name) else {
            debug!("pod {} not present in listing", self.target.namespaced_name());
            return Ok(false);
        };

        Ok(any_target_completed(pod.container_statuses(), &self.target))
    }

    #[instrument(skip_all, fields(pod = %self.target.namespaced_name()))]
    pub async fn start(self) {
        info!("polling every {:?}", self.poll_interval);
        let mut stop_rx = self.stop_rx.clone();
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let res = tokio::select! {
                biased;
                _ = stop_requested(&mut stop_rx) => {
                    info!("stop requested, shutting down poller");
                    break;
                },
                res = async {
                    ticker.tick().await;
                    self.poll_once().await
                } => res,
            };

            match res {
                Ok(completed) => {
                    if self.result_tx.send(completed).await.is_err() {
                        warn!("poll result channel closed, shutting down poller");
                        break;
                    }
                },
                Err(err) => warn!("could not list pods, will retry in {:?}: {err:#}", self.poll_interval),
            }
        }
    }
}
