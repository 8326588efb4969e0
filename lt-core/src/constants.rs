// Env vars; these are what the pod spec for the sidecar sets via the downward API
pub const KUBECONFIG_ENV_VAR: &str = "KUBECONFIG";
pub const NAMESPACE_ENV_VAR: &str = "KUBE_NAMESPACE";
pub const POD_NAME_ENV_VAR: &str = "POD_NAME";
pub const TARGET_IMAGE_ENV_VAR: &str = "JOB_IMAGE";
pub const TARGET_NAME_ENV_VAR: &str = "TARGET_CONTAINER_NAME";
pub const ACCEPT_ANY_TERMINATION_ENV_VAR: &str = "ACCEPT_ANY_TERMINATION";
pub const POLL_INTERVAL_ENV_VAR: &str = "POLL_INTERVAL_SECONDS";
pub const MAX_NOTIFY_ATTEMPTS_ENV_VAR: &str = "MAX_NOTIFY_ATTEMPTS";
pub const COLLECTOR_PORT_ENV_VAR: &str = "FLUENTD_PORT";
pub const COLLECTOR_URL_ENV_VAR: &str = "LOG_COLLECTOR_URL";

// Defaults
pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_COLLECTOR_PORT: u16 = 24444;
pub const DEFAULT_COLLECTOR_HOST: &str = "127.0.0.1";
pub const COLLECTOR_INTERRUPT_PATH: &str = "/api/processes.interruptWorkers";
pub const DEFAULT_MAX_NOTIFY_ATTEMPTS: u32 = 10;

// Container termination reasons
pub const COMPLETED_REASON: &str = "Completed";

// Timing
pub const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 5;
pub const NOTIFY_REQUEST_TIMEOUT_SECONDS: u64 = 5;
pub const DRAIN_TIMEOUT_SECONDS: u64 = 10;
