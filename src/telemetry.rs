use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// RUST_LOG wins, otherwise info
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();
}
