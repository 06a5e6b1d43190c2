#![doc(test(attr(deny(warnings))))]

//! Box Office Core implements the cash-payment step of a cinema box office:
//! exact money amounts, the derivation of the payment dialog state from the
//! tendered text, and a terminal front end for the dialog.

pub mod cli;
pub mod config;
pub mod currency;
pub mod errors;
pub mod observer;
pub mod payment;
pub mod utils;

pub use currency::MoneyAmount;
pub use errors::MoneyError;
pub use payment::{derive, PaymentInputReducer, PaymentInputState};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing once and emits a startup debug log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!("Box Office Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
