use box_office_core::{
    cli::{output, run_cli},
    init,
};

fn main() {
    init();

    if let Err(err) = run_cli() {
        tracing::warn!(error = %err, "box office CLI failed");
        output::error(&err);
        std::process::exit(1);
    }
}
