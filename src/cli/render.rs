//! Terminal rendering of a [`PaymentInputState`] snapshot.

use crate::currency::MoneyAmount;
use crate::payment::PaymentInputState;

use super::output::{self, MessageKind};

const LABEL_WIDTH: usize = 10;

fn row(label: &str, value: impl AsRef<str>) -> String {
    format!("{:<width$} {}", format!("{label}:"), value.as_ref(), width = LABEL_WIDTH)
}

fn money(amount: MoneyAmount, symbol: &str) -> String {
    amount.format_with_symbol(symbol)
}

/// Builds the dialog body as `(kind, line)` pairs, top to bottom.
pub fn payment_lines(state: &PaymentInputState, symbol: &str) -> Vec<(MessageKind, String)> {
    let tendered = match (&state.parsed_amount, state.raw_input.is_empty()) {
        (Some(amount), _) => money(*amount, symbol),
        (None, true) => "-".to_string(),
        (None, false) => format!("\"{}\"", state.raw_input),
    };

    let mut lines = vec![
        (MessageKind::Info, row("Price due", money(state.price_due, symbol))),
        (MessageKind::Info, row("Tendered", tendered)),
        (MessageKind::Info, row("Change", money(state.change_amount, symbol))),
        (MessageKind::Info, row("Missing", money(state.missing_amount, symbol))),
    ];

    if let Some(message) = &state.error_message {
        lines.push((MessageKind::Warning, message.clone()));
    } else if state.is_insufficient() {
        lines.push((MessageKind::Warning, "Amount too low".to_string()));
    }

    let confirm = if state.confirm_enabled {
        (MessageKind::Success, row("Confirm", "enabled (:ok)"))
    } else {
        (MessageKind::Info, row("Confirm", "disabled"))
    };
    lines.push(confirm);
    lines
}

pub fn print_state(state: &PaymentInputState, symbol: &str) {
    output::section("Cash payment");
    for (kind, line) in payment_lines(state, symbol) {
        output::print(kind, line);
    }
}
