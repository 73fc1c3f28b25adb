//! Shared fixtures for unit tests.
//!
//! - [`sideeffects`] - the `Lside_effects_test;` class, a table-driven platform fallback and a
//!   counting class initializer
//! - [`init_logging`] - routes `log` output through `env_logger` so `RUST_LOG` works in tests


pub use sideeffects::*;

/// Installs `env_logger` for the current test binary. Safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
