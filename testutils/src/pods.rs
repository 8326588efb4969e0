use k8s_openapi::api::core::v1 as corev1;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use rstest::fixture;

use crate::constants::*;

#[fixture]
pub fn test_pod(#[default(TEST_POD_NAME)] name: &str) -> corev1::Pod {
    corev1::Pod {
        metadata: metav1::ObjectMeta {
            namespace: Some(TEST_NAMESPACE.into()),
            name: Some(name.into()),
            ..Default::default()
        },
        status: Some(corev1::PodStatus {
            container_statuses: Some(vec![running_container(TEST_SIDECAR_NAME, TEST_SIDECAR_IMAGE)]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn running_container(name: &str, image: &str) -> corev1::ContainerStatus {
    corev1::ContainerStatus {
        name: name.into(),
        image: image.into(),
        ready: true,
        state: Some(corev1::ContainerState {
            running: Some(corev1::ContainerStateRunning { started_at: None }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn waiting_container(name: &str, image: &str) -> corev1::ContainerStatus {
    corev1::ContainerStatus {
        name: name.into(),
        image: image.into(),
        state: Some(corev1::ContainerState {
            waiting: Some(corev1::ContainerStateWaiting {
                reason: Some("ContainerCreating".into()),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn terminated_container(name: &str, image: &str, reason: Option<&str>, exit_code: i32) -> corev1::ContainerStatus {
    corev1::ContainerStatus {
        name: name.into(),
        image: image.into(),
        state: Some(corev1::ContainerState {
            terminated: Some(corev1::ContainerStateTerminated {
                exit_code,
                reason: reason.map(|r| r.into()),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn add_container_status(pod: &mut corev1::Pod, status: corev1::ContainerStatus) {
    pod.status
        .get_or_insert_with(Default::default)
        .container_statuses
        .get_or_insert_with(Vec::new)
        .push(status);
}

pub fn add_running_worker(pod: &mut corev1::Pod) {
    add_container_status(pod, running_container(TEST_CONTAINER_NAME, TEST_CONTAINER_IMAGE));
}

pub fn add_completed_worker(pod: &mut corev1::Pod) {
    add_container_status(pod, terminated_container(TEST_CONTAINER_NAME, TEST_CONTAINER_IMAGE, Some("Completed"), 0));
}

pub fn add_errored_worker(pod: &mut corev1::Pod) {
    add_container_status(pod, terminated_container(TEST_CONTAINER_NAME, TEST_CONTAINER_IMAGE, Some("Error"), 1));
}
