mod poller_test;

use std::time::Duration;

use futures::{
    StreamExt,
    stream,
};
use lt_testutils::*;
use rstest::*;
use tracing_test::traced_test;

use super::*;

// Long enough that only the immediate first tick fires during a test
const SLOW_POLL_SECONDS: u64 = 60;

#[fixture]
fn target() -> TrackedTarget {
    TrackedTarget::new(
        TEST_NAMESPACE,
        TEST_POD_NAME,
        MatchKey::ContainerName(TEST_CONTAINER_NAME.into()),
        TerminationCheck::Completed,
    )
    .unwrap()
}

// The events are delivered in order, and then the stream stays open (like a real watch would)
fn event_stream(events: Vec<Event<corev1::Pod>>) -> ObjStream<corev1::Pod> {
    stream::iter(events.into_iter().map(Ok)).chain(stream::pending()).boxed()
}

fn completed_pod(name: &str) -> corev1::Pod {
    let mut pod = test_pod(name);
    add_completed_worker(&mut pod);
    pod
}

fn running_pod(name: &str) -> corev1::Pod {
    let mut pod = test_pod(name);
    add_running_worker(&mut pod);
    pod
}
