use tracing_subscriber::EnvFilter;

/// Environment variable with an `EnvFilter` directive that overrides `-v`.
pub const ENV_LOG_VAR: &str = "ADO_PRS_LOG";

/// Default filter directive for the given verbosity.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "warn,ado_prs=debug"
    } else {
        "warn"
    }
}

fn build_filter(env_value: Option<&str>, verbose: bool) -> EnvFilter {
    env_value
        .filter(|v| !v.trim().is_empty())
        .and_then(|v| EnvFilter::try_new(v).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directive(verbose)))
}

/// Install the global subscriber. Logs go to stderr so table output on
/// stdout stays pipeable.
pub fn init(verbose: bool) {
    let env_value = std::env::var(ENV_LOG_VAR).ok();
    let filter = build_filter(env_value.as_deref(), verbose);

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
