use httpmock::Method::*;

use super::*;

fn make_poller(client: kube::Client, target: &TrackedTarget, interval: u64) -> (PodPoller, StopHandle, PollReceiver) {
    let (poll_tx, poll_rx) = mpsc::channel(HANDOFF_CAPACITY);
    let pod_api = kube::Api::namespaced(client, TEST_NAMESPACE);
    let (poller, stop) = PodPoller::new(pod_api, target, interval, poll_tx);
    (poller, stop, poll_rx)
}

#[rstest]
#[case::completed(vec![running_pod(TEST_OTHER_POD_NAME), completed_pod(TEST_POD_NAME)], true)]
#[case::running(vec![completed_pod(TEST_OTHER_POD_NAME), running_pod(TEST_POD_NAME)], false)]
#[case::missing(vec![completed_pod(TEST_OTHER_POD_NAME)], false)]
#[case::empty(vec![], false)]
#[traced_test]
#[tokio::test]
async fn test_poll_once(target: TrackedTarget, #[case] pods: Vec<corev1::Pod>, #[case] expected: bool) {
    let (mut fake_apiserver, client) = make_fake_apiserver();
    fake_apiserver.handle_pod_list(TEST_NAMESPACE, pods).build();
    let (poller, _stop, _poll_rx) = make_poller(client, &target, SLOW_POLL_SECONDS);

    assert_eq!(poller.poll_once().await.unwrap(), expected);
    fake_apiserver.assert();
}

#[rstest]
#[traced_test]
#[tokio::test]
async fn test_poll_once_errored_worker(target: TrackedTarget) {
    let mut pod = test_pod(TEST_POD_NAME);
    add_errored_worker(&mut pod);

    let (mut fake_apiserver, client) = make_fake_apiserver();
    fake_apiserver.handle_pod_list(TEST_NAMESPACE, vec![pod.clone()]).build();
    let (strict, _stop, _rx) = make_poller(client.clone(), &target, SLOW_POLL_SECONDS);
    assert!(!strict.poll_once().await.unwrap());

    let lenient_target = TrackedTarget { termination_check: TerminationCheck::AnyTermination, ..target };
    let (lenient, _stop, _rx) = make_poller(client, &lenient_target, SLOW_POLL_SECONDS);
    assert!(lenient.poll_once().await.unwrap());
}

#[rstest]
#[traced_test]
#[tokio::test]
async fn test_poll_once_list_error(target: TrackedTarget) {
    let (mut fake_apiserver, client) = make_fake_apiserver();
    fake_apiserver
        .handle_server_error(format!("/api/v1/namespaces/{TEST_NAMESPACE}/pods"))
        .build();
    let (poller, _stop, _poll_rx) = make_poller(client, &target, SLOW_POLL_SECONDS);

    let err = poller.poll_once().await.unwrap_err().downcast::<kube::Error>().unwrap();
    assert!(matches!(err, kube::Error::Api(..)));
}

#[rstest]
#[traced_test]
#[tokio::test]
async fn test_poller_sends_tick_result(target: TrackedTarget) {
    let (mut fake_apiserver, client) = make_fake_apiserver();
    fake_apiserver
        .handle(|when, then| {
            when.method(GET).path(format!("/api/v1/namespaces/{TEST_NAMESPACE}/pods"));
            then.json_body(pod_list(vec![completed_pod(TEST_POD_NAME)]));
        })
        .build();
    let (poller, stop, mut poll_rx) = make_poller(client, &target, SLOW_POLL_SECONDS);
    let task = tokio::spawn(poller.start());

    // The first tick fires immediately
    assert_eq!(poll_rx.recv().await, Some(true));

    stop.stop();
    task.await.unwrap();
    fake_apiserver.assert();
}

#[rstest]
#[traced_test]
#[tokio::test]
async fn test_poller_survives_list_errors(target: TrackedTarget) {
    let (mut fake_apiserver, client) = make_fake_apiserver();
    fake_apiserver
        .handle_server_error(format!("/api/v1/namespaces/{TEST_NAMESPACE}/pods"))
        .build();
    let (poller, stop, mut poll_rx) = make_poller(client, &target, 1);
    let task = tokio::spawn(poller.start());

    // A couple of failed ticks go by without anything being reported, and without the poller
    // giving up
    let res = tokio::time::timeout(Duration::from_millis(2500), poll_rx.recv()).await;
    assert!(res.is_err());
    assert!(!task.is_finished());

    stop.stop();
    stop.stop();
    task.await.unwrap();
}
