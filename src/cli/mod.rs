//! Terminal front end for the cash-payment dialog.

pub mod output;
pub mod render;
mod shell;

pub use shell::{run_cli, CliMode, SCRIPT_ENV};
