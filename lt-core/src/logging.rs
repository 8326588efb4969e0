use tracing_subscriber::fmt::format::FmtSpan;

// The terminator runs as a sidecar, so everything goes to stdout where the container runtime
// picks it up; file and line numbers are included since there's nobody around to ask.
pub fn setup(env_filter: &str) {
    tracing_subscriber::fmt()
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::NEW)
        .with_target(false)
        .with_env_filter(env_filter)
        .compact()
        .init();
}
