use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;
use clockabilly::UtcClock;
use kube::config::{
    KubeConfigOptions,
    Kubeconfig,
};
use lt_core::config::default_collector_url;
use lt_core::errors::*;
use lt_core::logging;
use lt_core::notify::{
    HttpShutdownEndpoint,
    ShutdownAttempt,
    ShutdownNotifier,
};
use lt_core::prelude::*;
use lt_core::watch::WatchCoordinator;
use tracing::*;

const EXIT_FAILURE: i32 = 1;
const EXIT_DELIVERY_FAILED: i32 = 3;

#[derive(Clone, Debug, Parser)]
#[command(about = "Stop the log collector once the tracked container has finished")]
struct Options {
    // Not bound to KUBECONFIG, which may be a list of files; kube merges those itself
    #[arg(long)]
    kubeconfig: Option<PathBuf>,

    #[arg(long, env = NAMESPACE_ENV_VAR, default_value = DEFAULT_NAMESPACE)]
    namespace: String,

    #[arg(long, env = POD_NAME_ENV_VAR)]
    pod_name: String,

    #[arg(long, env = TARGET_IMAGE_ENV_VAR, conflicts_with = "target_name")]
    target_image: Option<String>,

    #[arg(long, env = TARGET_NAME_ENV_VAR)]
    target_name: Option<String>,

    // By default only a clean exit (reason "Completed") counts as finished
    #[arg(long, env = ACCEPT_ANY_TERMINATION_ENV_VAR)]
    accept_any_termination: bool,

    #[arg(long, env = POLL_INTERVAL_ENV_VAR, default_value_t = DEFAULT_POLL_INTERVAL_SECONDS)]
    poll_interval_seconds: u64,

    #[arg(long, env = MAX_NOTIFY_ATTEMPTS_ENV_VAR, default_value_t = DEFAULT_MAX_NOTIFY_ATTEMPTS)]
    max_notify_attempts: u32,

    // Parsed leniently in build_config; anything that isn't a port falls back to the default
    #[arg(long, env = COLLECTOR_PORT_ENV_VAR, default_value_t = DEFAULT_COLLECTOR_PORT.to_string())]
    collector_port: String,

    #[arg(long, env = COLLECTOR_URL_ENV_VAR)]
    collector_url: Option<String>,

    #[arg(short, long, default_value = "info")]
    verbosity: String,
}

fn build_config(opts: &Options) -> anyhow::Result<TerminatorConfig> {
    let match_key = MatchKey::from_parts(opts.target_name.as_deref(), opts.target_image.as_deref())?;
    let target = TrackedTarget::new(
        &opts.namespace,
        &opts.pod_name,
        match_key,
        TerminationCheck::from_lenient(opts.accept_any_termination),
    )?;

    let collector_url = match opts.collector_url.as_deref() {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => default_collector_url(collector_port(&opts.collector_port)),
    };

    TerminatorConfig::new(target, opts.poll_interval_seconds, opts.max_notify_attempts, &collector_url)
}

fn collector_port(raw: &str) -> u16 {
    match raw.trim().parse() {
        Ok(port) => port,
        Err(err) => {
            warn!("invalid collector port {raw:?} ({err}), using {DEFAULT_COLLECTOR_PORT}");
            DEFAULT_COLLECTOR_PORT
        },
    }
}

// An explicit kubeconfig wins.  If KUBECONFIG is set we leave it to kube's inferred config, which
// knows how to merge a list of files; otherwise use ~/.kube/config if there is one, and failing
// that the in-cluster service account.
fn kubeconfig_path(opts: &Options, kubeconfig_env: Option<OsString>) -> Option<PathBuf> {
    if let Some(path) = opts.kubeconfig.clone().filter(|p| !p.as_os_str().is_empty()) {
        return Some(path);
    }
    if kubeconfig_env.is_some_and(|v| !v.is_empty()) {
        return None;
    }
    dirs::home_dir()
        .map(|home| home.join(".kube").join("config"))
        .filter(|p| p.exists())
}

async fn kube_client(opts: &Options) -> anyhow::Result<kube::Client> {
    let Some(path) = kubeconfig_path(opts, env::var_os(KUBECONFIG_ENV_VAR)) else {
        info!("no kubeconfig found, using inferred cluster config");
        return Ok(kube::Client::try_default().await?);
    };

    info!("loading kubeconfig from {}", path.display());
    let kubeconfig = Kubeconfig::read_from(&path)?;
    let config = kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?;
    Ok(kube::Client::try_from(config)?)
}

fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<ShutdownError>() {
        Some(ShutdownError::DeliveryFailed { .. }) => EXIT_DELIVERY_FAILED,
        None => EXIT_FAILURE,
    }
}

#[instrument(skip_all)]
async fn run(opts: Options) -> anyhow::Result<ShutdownAttempt> {
    let config = build_config(&opts)?;
    let client = kube_client(&opts).await?;

    let endpoint = HttpShutdownEndpoint::new(config.collector_url.clone())?;
    let mut notifier = ShutdownNotifier::new(
        Box::new(endpoint),
        config.max_notify_attempts,
        config.poll_interval_seconds as i64,
        UtcClock::boxed(),
    );

    WatchCoordinator::start(client, &config).run(&mut notifier).await
}

#[tokio::main]
async fn main() {
    let args = Options::parse();
    logging::setup(&args.verbosity);
    match run(args).await {
        Ok(attempt) => info!("log collector notified (attempt {} at {})", attempt.seq, attempt.ts),
        Err(err) => {
            skerr!(err, "log terminator failed");
            std::process::exit(exit_code(&err));
        },
    }
}

#[cfg(test)]
mod tests;
