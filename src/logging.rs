//! `tracing` setup.
//!
//! In the browser events go to the devtools console through `tracing-wasm`.
//! Native builds (tests, tooling) use a `tracing-subscriber` fmt layer on
//! stderr.

use tracing::Level;

/// Install the global subscriber. Later calls are no-ops.
#[cfg(target_arch = "wasm32")]
pub fn init(max_level: Level) {
    use std::sync::Once;

    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let config = tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(max_level)
            .set_report_logs_in_timings(false)
            .build();
        tracing_wasm::set_as_global_default_with_config(config);
    });
}

/// Install the global subscriber. Later calls are no-ops.
#[cfg(not(target_arch = "wasm32"))]
pub fn init(max_level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_is_harmless() {
        init(Level::DEBUG);
        init(Level::WARN);
        tracing::debug!("logging initialised");
    }
}
