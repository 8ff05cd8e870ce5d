mod repository_tests;
mod swap_tests;

/// Opt-in log output for debugging a failing test:
/// `RUST_LOG=tyr_reflect=trace cargo test -p tyr-reflect`.
#[allow(dead_code)]
pub(crate) fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
