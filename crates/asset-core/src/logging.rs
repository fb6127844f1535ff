//! Log output for hosts and tests
//!
//! Library code only emits `tracing` events. A host that has no subscriber of
//! its own can call [`init`] once at startup.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install a compact subscriber filtered by `RUST_LOG`, defaulting to `info`.
///
/// # Errors
///
/// Fails when the filter does not parse or a global subscriber is already
/// installed.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .compact();

    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        // Another test may have installed the subscriber already.
        let _ = init();
        assert!(init().is_err());
        tracing::debug!("asset-core logging initialized");
    }
}
