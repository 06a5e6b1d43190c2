pub mod build_info;

use std::{
    env,
    io::{self, IsTerminal},
};

use crate::cli::SCRIPT_ENV;

/// Installs the global tracing subscriber. `RUST_LOG` directives take
/// precedence; the crate logs at `info` otherwise. Repeated calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("box_office_core=info"));
    let ansi = wants_ansi(env::var_os(SCRIPT_ENV).is_some(), io::stderr().is_terminal());

    let _ = fmt()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_writer(io::stderr)
        .try_init();
}

/// Script runs and redirected stderr get plain log lines.
fn wants_ansi(script_mode: bool, stderr_is_terminal: bool) -> bool {
    !script_mode && stderr_is_terminal
}
