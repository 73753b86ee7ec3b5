//! Runtime setup: tracing initialization driven by `-v`/`RUST_LOG`.
//!
//! Mirrors the teacher's `cli::setup::init_tracing` shape: `RUST_LOG` wins
//! when set, otherwise verbosity count picks a default filter.

use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber. Safe to call once; a second
/// call is a silent no-op (global subscribers can only be set once).
pub fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_tracing_does_not_panic_on_repeated_calls() {
        init_tracing(0);
        init_tracing(2);
    }
}
