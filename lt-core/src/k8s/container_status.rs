use super::*;
use crate::config::TrackedTarget;

// Per the Kubernetes API, at most one of `running`, `terminated`, or `waiting` is set on a
// container state, so the presence of `terminated` is enough to say the container has exited.
impl ContainerStatusExt for corev1::ContainerStatus {
    fn matches_key(&self, key: &MatchKey) -> bool {
        match key {
            MatchKey::ContainerName(name) => &self.name == name,
            MatchKey::ContainerImage(image) => &self.image == image,
        }
    }

    fn terminated(&self) -> Option<&corev1::ContainerStateTerminated> {
        self.state.as_ref()?.terminated.as_ref()
    }

    fn is_finished(&self, check: TerminationCheck) -> bool {
        match (self.terminated(), check) {
            (None, _) => false,
            (Some(_), TerminationCheck::AnyTermination) => true,
            (Some(t), TerminationCheck::Completed) => t.reason.as_deref() == Some(COMPLETED_REASON),
        }
    }
}

/// Returns true iff `status` belongs to the tracked container and that container has finished
/// according to `check`.
pub fn is_target_completed(status: &corev1::ContainerStatus, key: &MatchKey, check: TerminationCheck) -> bool {
    status.matches_key(key) && status.is_finished(check)
}

/// Evaluates the completion predicate against every container in a pod's status list (a pod
/// can host several containers and only one of them is tracked), in list order.
pub fn any_target_completed(statuses: &[corev1::ContainerStatus], target: &TrackedTarget) -> bool {
    statuses
        .iter()
        .any(|s| is_target_completed(s, &target.match_key, target.termination_check))
}
