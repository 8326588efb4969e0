use tracing_test::traced_test;

use super::*;

fn parse(args: &[&str]) -> Options {
    let mut argv = vec!["lt-terminator"];
    argv.extend_from_slice(args);
    Options::try_parse_from(argv).unwrap()
}

#[rstest]
#[traced_test]
fn test_build_config_defaults() {
    let opts = parse(&["--pod-name", "the-pod", "--target-image", "app:v1", "--namespace", "jobs"]);
    let config = build_config(&opts).unwrap();

    assert_eq!(config.target.namespace, "jobs");
    assert_eq!(config.target.pod_name, "the-pod");
    assert_eq!(config.target.match_key, MatchKey::ContainerImage("app:v1".into()));
    assert_eq!(config.target.termination_check, TerminationCheck::Completed);
    assert_eq!(config.poll_interval_seconds, DEFAULT_POLL_INTERVAL_SECONDS);
    assert_eq!(config.max_notify_attempts, DEFAULT_MAX_NOTIFY_ATTEMPTS);
    assert_eq!(config.collector_url.as_str(), "http://127.0.0.1:24444/api/processes.interruptWorkers");
}

#[rstest]
#[traced_test]
fn test_build_config_overrides() {
    let opts = parse(&[
        "--pod-name",
        "the-pod",
        "--target-name",
        "worker",
        "--accept-any-termination",
        "--poll-interval-seconds",
        "2",
        "--max-notify-attempts",
        "4",
        "--collector-port",
        "9880",
    ]);
    let config = build_config(&opts).unwrap();

    assert_eq!(config.target.match_key, MatchKey::ContainerName("worker".into()));
    assert_eq!(config.target.termination_check, TerminationCheck::AnyTermination);
    assert_eq!(config.poll_interval_seconds, 2);
    assert_eq!(config.max_notify_attempts, 4);
    assert_eq!(config.collector_url.port(), Some(9880));
}

#[rstest]
#[traced_test]
fn test_build_config_explicit_collector_url() {
    let opts = parse(&[
        "--pod-name",
        "the-pod",
        "--target-name",
        "worker",
        "--collector-port",
        "9880",
        "--collector-url",
        "http://fluentd.logging:24444/api/processes.interruptWorkers",
    ]);
    let config = build_config(&opts).unwrap();

    assert_eq!(config.collector_url.host_str(), Some("fluentd.logging"));
    assert_eq!(config.collector_url.port(), Some(24444));
}

#[rstest]
#[case::no_target(&["--pod-name", "the-pod"])]
#[case::empty_pod_name(&["--pod-name", "", "--target-name", "worker"])]
#[case::zero_interval(&["--pod-name", "the-pod", "--target-name", "worker", "--poll-interval-seconds", "0"])]
#[case::bad_url(&["--pod-name", "the-pod", "--target-name", "worker", "--collector-url", "not a url"])]
fn test_build_config_invalid(#[case] args: &[&str]) {
    let opts = parse(args);
    let err = build_config(&opts).unwrap_err();
    assert_eq!(exit_code(&err), EXIT_FAILURE);
}

#[rstest]
fn test_options_target_conflict() {
    let res = Options::try_parse_from([
        "lt-terminator",
        "--pod-name",
        "the-pod",
        "--target-name",
        "worker",
        "--target-image",
        "app:v1",
    ]);
    assert!(res.is_err());
}

#[rstest]
#[case::no_env(None)]
#[case::env_set(Some("/home/me/.kube/a:/home/me/.kube/b"))]
fn test_kubeconfig_path_explicit(#[case] kubeconfig_env: Option<&str>) {
    let opts = parse(&["--pod-name", "the-pod", "--kubeconfig", "/etc/kube/admin.conf"]);
    assert_eq!(kubeconfig_path(&opts, kubeconfig_env.map(OsString::from)), Some(PathBuf::from("/etc/kube/admin.conf")));
}

#[rstest]
#[case::single("/home/me/.kube/config")]
#[case::list("/home/me/.kube/a:/home/me/.kube/b")]
fn test_kubeconfig_path_env_is_inferred(#[case] kubeconfig_env: &str) {
    // The flag doesn't pick up KUBECONFIG; kube's inferred config reads (and merges) it instead
    let opts = Options::try_parse_from(["lt-terminator", "--pod-name", "the-pod"]).unwrap();
    assert_eq!(kubeconfig_path(&opts, Some(OsString::from(kubeconfig_env))), None);
}

#[rstest]
#[case::valid("9880", 9880)]
#[case::padded(" 9880 ", 9880)]
#[case::not_a_number("fluentd", DEFAULT_COLLECTOR_PORT)]
#[case::out_of_range("70000", DEFAULT_COLLECTOR_PORT)]
#[case::empty("", DEFAULT_COLLECTOR_PORT)]
#[traced_test]
fn test_build_config_lenient_collector_port(#[case] port: &str, #[case] expected: u16) {
    let opts = parse(&["--pod-name", "the-pod", "--target-name", "worker", "--collector-port", port]);
    let config = build_config(&opts).unwrap();
    assert_eq!(config.collector_url.port_or_known_default(), Some(expected));
}

#[rstest]
#[case::delivery_failed(ShutdownError::delivery_failed("http://127.0.0.1:24444/", 10), EXIT_DELIVERY_FAILED)]
#[case::wrapped(
    ShutdownError::delivery_failed("http://127.0.0.1:24444/", 10).context("notifying collector"),
    EXIT_DELIVERY_FAILED
)]
#[case::other(anyhow!("could not list pods"), EXIT_FAILURE)]
fn test_exit_code(#[case] err: anyhow::Error, #[case] expected: i32) {
    assert_eq!(exit_code(&err), expected);
}

#[rstest]
#[traced_test]
#[tokio::test]
async fn test_run_failure_not_logged_by_span() {
    // The caller reports the failure (with a backtrace); run itself shouldn't log it as well
    let err = run(parse(&["--pod-name", "the-pod"])).await.unwrap_err();
    assert_eq!(exit_code(&err), EXIT_FAILURE);
    logs_assert(|lines: &[&str]| match lines.iter().find(|line| line.contains("ERROR")) {
        Some(line) => Err(format!("unexpected error log: {line}")),
        None => Ok(()),
    });
}
