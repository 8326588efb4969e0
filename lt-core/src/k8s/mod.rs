mod container_status;
mod pod_ext;

pub use container_status::{
    any_target_completed,
    is_target_completed,
};

use crate::config::{
    MatchKey,
    TerminationCheck,
};
use crate::prelude::*;

pub trait ContainerStatusExt {
    fn matches_key(&self, key: &MatchKey) -> bool;
    fn terminated(&self) -> Option<&corev1::ContainerStateTerminated>;
    fn is_finished(&self, check: TerminationCheck) -> bool;
}

pub trait PodExt {
    fn container_statuses(&self) -> &[corev1::ContainerStatus];
}

#[cfg(test)]
mod tests;
