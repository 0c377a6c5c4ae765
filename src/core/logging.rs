//! Logging setup
//!
//! The engine logs through the `log` facade: one `info!` line when a
//! landscape comes up (patch grid and pool sizes) and a `debug!` line per
//! rendered frame with triangle and pool counters. Hosts that want that
//! output on stderr can install the env_logger backend once at startup.
//! `RUST_LOG` overrides the default `info` filter.
//!
//! # Example
//! ```
//! roamesh::core::logging::init();
//! log::info!("host starting up");
//! ```

/// Install the env_logger backend behind the `log` facade
pub fn init() {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(env).init();
}
