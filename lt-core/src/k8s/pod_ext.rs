use super::*;

impl PodExt for corev1::Pod {
    // Pods that haven't been scheduled yet (or that come through with only metadata on a watch
    // restart) have no status at all; that's the same as "no containers have reported anything".
    fn container_statuses(&self) -> &[corev1::ContainerStatus] {
        self.status
            .as_ref()
            .and_then(|st| st.container_statuses.as_deref())
            .unwrap_or_default()
    }
}
