pub const TEST_NAMESPACE: &str = "test-namespace";
pub const TEST_POD_NAME: &str = "the-pod";
pub const TEST_OTHER_POD_NAME: &str = "some-other-pod";
pub const TEST_CONTAINER_NAME: &str = "worker";
pub const TEST_CONTAINER_IMAGE: &str = "app:v1";
pub const TEST_SIDECAR_NAME: &str = "log-shipper";
pub const TEST_SIDECAR_IMAGE: &str = "fluentd:v1.16";
pub const TEST_INTERRUPT_PATH: &str = "/api/processes.interruptWorkers";
