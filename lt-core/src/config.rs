use std::fmt;

use reqwest::Url;
use tracing::*;

use crate::errors::*;
use crate::prelude::*;

err_impl! {ConfigError,
    #[error("required configuration is missing: {0}")]
    MissingField(String),

    #[error("target container must be selected by name or by image, not both: {0}")]
    AmbiguousTarget(String),

    #[error("invalid configuration value: {0}")]
    InvalidValue(String),
}

// Which field of a container status we compare against when looking for the tracked container.
// Some deployments only know the image of the workload (it's injected by whatever templated the
// job), others set a stable container name, so both are supported.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MatchKey {
    ContainerName(String),
    ContainerImage(String),
}

impl MatchKey {
    pub fn from_parts(name: Option<&str>, image: Option<&str>) -> anyhow::Result<MatchKey> {
        let name = name.filter(|n| !n.is_empty());
        let image = image.filter(|i| !i.is_empty());
        match (name, image) {
            (Some(n), None) => Ok(MatchKey::ContainerName(n.into())),
            (None, Some(i)) => Ok(MatchKey::ContainerImage(i.into())),
            (Some(n), Some(i)) => Err(ConfigError::ambiguous_target(&format!("name={n}, image={i}"))),
            (None, None) => Err(ConfigError::missing_field("target container name or image")),
        }
    }
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchKey::ContainerName(n) => write!(f, "container name {n}"),
            MatchKey::ContainerImage(i) => write!(f, "container image {i}"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TerminationCheck {
    // The container must have exited with reason "Completed"
    #[default]
    Completed,

    // Any terminated state counts, regardless of the exit reason
    AnyTermination,
}

impl TerminationCheck {
    pub fn from_lenient(accept_any_termination: bool) -> TerminationCheck {
        if accept_any_termination { TerminationCheck::AnyTermination } else { TerminationCheck::Completed }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TrackedTarget {
    pub namespace: String,
    pub pod_name: String,
    pub match_key: MatchKey,
    pub termination_check: TerminationCheck,
}

impl TrackedTarget {
    pub fn new(
        namespace: &str,
        pod_name: &str,
        match_key: MatchKey,
        termination_check: TerminationCheck,
    ) -> anyhow::Result<TrackedTarget> {
        if pod_name.is_empty() {
            bail!(ConfigError::missing_field("pod name"));
        }
        let namespace = if namespace.is_empty() { DEFAULT_NAMESPACE } else { namespace };

        Ok(TrackedTarget {
            namespace: namespace.into(),
            pod_name: pod_name.into(),
            match_key,
            termination_check,
        })
    }

    pub fn namespaced_name(&self) -> String {
        format!("{}/{}", self.namespace, self.pod_name)
    }
}

// The full set of knobs for one terminator run.  This is resolved exactly once at startup and then
// handed (by reference or clone) to every component; nothing downstream reads the environment.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TerminatorConfig {
    pub target: TrackedTarget,
    pub poll_interval_seconds: u64,
    pub max_notify_attempts: u32,
    pub collector_url: Url,
}

impl TerminatorConfig {
    pub fn new(
        target: TrackedTarget,
        poll_interval_seconds: u64,
        max_notify_attempts: u32,
        collector_url: &str,
    ) -> anyhow::Result<TerminatorConfig> {
        if poll_interval_seconds == 0 {
            bail!(ConfigError::invalid_value("poll interval must be at least one second"));
        }
        if max_notify_attempts == 0 {
            bail!(ConfigError::invalid_value("max notify attempts must be at least one"));
        }

        let collector_url = match Url::parse(collector_url) {
            Ok(url) => url,
            Err(err) => bail!(ConfigError::invalid_value(&format!("collector url {collector_url}: {err}"))),
        };

        info!(
            "tracking {} in pod {} (termination check: {:?}); collector url is {}",
            target.match_key,
            target.namespaced_name(),
            target.termination_check,
            collector_url,
        );

        Ok(TerminatorConfig {
            target,
            poll_interval_seconds,
            max_notify_attempts,
            collector_url,
        })
    }
}

pub fn default_collector_url(port: u16) -> String {
    format!("http://{DEFAULT_COLLECTOR_HOST}:{port}{COLLECTOR_INTERRUPT_PATH}")
}
