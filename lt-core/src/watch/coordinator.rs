use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::timeout;

use super::*;
use crate::config::TrackedTarget;
use crate::k8s::any_target_completed;
use crate::notify::{
    ShutdownAttempt,
    ShutdownNotifier,
};

// States only ever move forward, one step at a time: Starting -> Watching -> Draining -> Done.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum WatchState {
    Starting,
    Watching,
    Draining,
    Done,
}

impl WatchState {
    fn next(self) -> Option<WatchState> {
        match self {
            WatchState::Starting => Some(WatchState::Watching),
            WatchState::Watching => Some(WatchState::Draining),
            WatchState::Draining => Some(WatchState::Done),
            WatchState::Done => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompletionSource {
    Event,
    Poll,
}

// Everything that lives for the duration of one tracking run.  The coordinator owns this
// exclusively; it's the only thing that closes the channels or tells the loops to stop.
struct WatchSession {
    status_rx: StatusReceiver,
    poll_rx: PollReceiver,
    tracker_stop: StopHandle,
    poller_stop: StopHandle,
    tasks: JoinSet<()>,
}

pub struct WatchCoordinator {
    target: TrackedTarget,
    state: WatchState,
    session: Option<WatchSession>,
}

impl WatchCoordinator {
    pub fn start(client: kube::Client, config: &TerminatorConfig) -> WatchCoordinator {
        let pod_api: kube::Api<corev1::Pod> = kube::Api::namespaced(client, &config.target.namespace);
        let pod_stream = pod_event_stream(pod_api.clone());
        WatchCoordinator::start_with(config.target.clone(), pod_stream, pod_api, config.poll_interval_seconds)
    }

    // Spawns the tracker and the poller as independent tasks; must be called from inside a tokio
    // runtime.
    pub fn start_with(
        target: TrackedTarget,
        pod_stream: ObjStream<corev1::Pod>,
        pod_api: kube::Api<corev1::Pod>,
        poll_interval_seconds: u64,
    ) -> WatchCoordinator {
        let mut coordinator = WatchCoordinator { target, state: WatchState::Starting, session: None };

        let (status_tx, status_rx): (StatusSender, StatusReceiver) = mpsc::channel(HANDOFF_CAPACITY);
        let (poll_tx, poll_rx): (PollSender, PollReceiver) = mpsc::channel(HANDOFF_CAPACITY);

        let (tracker, tracker_stop) = PodTracker::new(&coordinator.target.pod_name, pod_stream, status_tx);
        let (poller, poller_stop) = PodPoller::new(pod_api, &coordinator.target, poll_interval_seconds, poll_tx);

        let mut tasks = JoinSet::new();
        tasks.spawn(tracker.start());
        tasks.spawn(poller.start());

        coordinator.session = Some(WatchSession { status_rx, poll_rx, tracker_stop, poller_stop, tasks });

        // Starting -> Watching can't fail
        let _ = coordinator.transition(WatchState::Watching);
        coordinator
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    #[instrument(skip_all, fields(pod = %self.target.namespaced_name()))]
    pub async fn run(mut self, notifier: &mut ShutdownNotifier) -> anyhow::Result<ShutdownAttempt> {
        self.wait_for_completion().await?;
        self.drain().await?;
        notifier.notify().await
    }

    // Blocks until either observation path reports that the tracked container has finished.
    // Status lists that don't satisfy the completion check leave us in Watching.  If both paths
    // report completion at around the same time, whichever one we see first wins; the other one
    // is discarded during the drain.
    pub async fn wait_for_completion(&mut self) -> anyhow::Result<CompletionSource> {
        let Some(session) = self.session.as_mut().filter(|_| self.state == WatchState::Watching) else {
            bail!(WatchError::invalid_transition(&format!("cannot watch from {:?}", self.state)));
        };

        let source = loop {
            tokio::select! {
                Some(statuses) = session.status_rx.recv() => {
                    if any_target_completed(&statuses, &self.target) {
                        break CompletionSource::Event;
                    }
                    debug!("tracked container has not finished yet ({} container statuses)", statuses.len());
                },
                Some(completed) = session.poll_rx.recv() => {
                    if completed {
                        break CompletionSource::Poll;
                    }
                    debug!("poll: tracked container has not finished yet");
                },
                else => bail!(WatchError::observation_lost(&self.target.namespaced_name())),
            }
        };

        info!("{} has finished (detected via {source:?})", self.target.match_key);
        self.transition(WatchState::Draining)?;
        Ok(source)
    }

    // Stops both observation loops and tears down the session.  The loops are asked nicely first;
    // if they haven't exited within the drain timeout they're aborted.
    pub async fn drain(&mut self) -> EmptyResult {
        if self.state != WatchState::Draining {
            bail!(WatchError::invalid_transition(&format!("cannot drain from {:?}", self.state)));
        }

        if let Some(mut session) = self.session.take() {
            session.tracker_stop.stop();
            session.poller_stop.stop();
            session.status_rx.close();
            session.poll_rx.close();

            let joined = timeout(Duration::from_secs(DRAIN_TIMEOUT_SECONDS), async {
                while let Some(res) = session.tasks.join_next().await {
                    if let Err(err) = res {
                        warn!("observation task exited abnormally: {err}");
                    }
                }
            })
            .await;

            if joined.is_err() {
                warn!("observation tasks did not stop within {DRAIN_TIMEOUT_SECONDS}s, aborting them");
                session.tasks.shutdown().await;
            }
        }

        self.transition(WatchState::Done)
    }

    fn transition(&mut self, next: WatchState) -> EmptyResult {
        if self.state.next() != Some(next) {
            bail!(WatchError::invalid_transition(&format!("{:?} -> {:?}", self.state, next)));
        }
        debug!("watch state {:?} -> {:?}", self.state, next);
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
impl WatchCoordinator {
    // A coordinator with nothing running behind its channels; the test drives both sides
    pub(crate) fn from_channels(target: TrackedTarget, status_rx: StatusReceiver, poll_rx: PollReceiver) -> Self {
        let (tracker_stop, _) = StopHandle::new();
        let (poller_stop, _) = StopHandle::new();
        let session = WatchSession { status_rx, poll_rx, tracker_stop, poller_stop, tasks: JoinSet::new() };
        WatchCoordinator { target, state: WatchState::Watching, session: Some(session) }
    }

    pub(crate) fn stop_handles(&self) -> Option<(StopHandle, StopHandle)> {
        self.session
            .as_ref()
            .map(|s| (s.tracker_stop.clone(), s.poller_stop.clone()))
    }
}
