//! Cash-payment input handling: the snapshot derivation behind the payment
//! dialog and the dialog controller itself.

pub mod dialog;

use std::cmp::Ordering;

use serde::Serialize;

use crate::currency::MoneyAmount;

pub use dialog::{CashPaymentDialog, PaymentOutcome};

/// Hint shown while the tendered text is not a valid amount.
pub const FORMAT_HINT: &str = "Enter the amount as 12,50 (digits, comma, two digits)";

/// Everything a view needs to render the payment dialog for one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentInputState {
    pub price_due: MoneyAmount,
    pub raw_input: String,
    pub parsed_amount: Option<MoneyAmount>,
    pub missing_amount: MoneyAmount,
    pub change_amount: MoneyAmount,
    pub confirm_enabled: bool,
    pub error_message: Option<String>,
}

impl PaymentInputState {
    fn awaiting(price_due: MoneyAmount, raw_input: &str, error: Option<&str>) -> Self {
        Self {
            price_due,
            raw_input: raw_input.to_string(),
            parsed_amount: None,
            missing_amount: price_due,
            change_amount: MoneyAmount::zero(),
            confirm_enabled: false,
            error_message: error.map(str::to_string),
        }
    }

    /// True when a valid amount was entered but it does not cover the price.
    pub fn is_insufficient(&self) -> bool {
        self.parsed_amount.is_some() && !self.confirm_enabled
    }
}

/// Stateless derivation of [`PaymentInputState`] from the price and the raw
/// tendered text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentInputReducer;

impl PaymentInputReducer {
    /// Never fails: invalid or insufficient input is reported through the
    /// snapshot fields.
    pub fn derive(price_due: MoneyAmount, raw_input: &str) -> PaymentInputState {
        if raw_input.is_empty() {
            return PaymentInputState::awaiting(price_due, raw_input, None);
        }

        let tendered = match MoneyAmount::from_text(raw_input) {
            Ok(amount) => amount,
            Err(_) => return PaymentInputState::awaiting(price_due, raw_input, Some(FORMAT_HINT)),
        };

        let (change_amount, missing_amount, confirm_enabled) = match tendered.compare(price_due) {
            Ordering::Less => (MoneyAmount::zero(), price_due.distance(tendered), false),
            Ordering::Equal | Ordering::Greater => {
                (tendered.distance(price_due), MoneyAmount::zero(), true)
            }
        };

        PaymentInputState {
            price_due,
            raw_input: raw_input.to_string(),
            parsed_amount: Some(tendered),
            missing_amount,
            change_amount,
            confirm_enabled,
            error_message: None,
        }
    }
}

/// Shorthand for [`PaymentInputReducer::derive`].
pub fn derive(price_due: MoneyAmount, raw_input: &str) -> PaymentInputState {
    PaymentInputReducer::derive(price_due, raw_input)
}
