use tracing::{debug, info};

use crate::currency::MoneyAmount;
use crate::observer::{SubscriptionId, Subscribers};

use super::{PaymentInputReducer, PaymentInputState};

/// Final result handed to the caller-supplied outcome callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Confirmed {
        price: MoneyAmount,
        tendered: MoneyAmount,
        change: MoneyAmount,
    },
    Cancelled,
}

type OutcomeCallback = Box<dyn FnMut(PaymentOutcome)>;

/// Controller behind the cash-payment dialog.
///
/// Holds the price and the current tendered text, re-derives the
/// [`PaymentInputState`] whenever either changes and publishes it to every
/// subscribed view. Confirmation is only accepted while the current snapshot
/// allows it.
pub struct CashPaymentDialog {
    state: PaymentInputState,
    open: bool,
    views: Subscribers<PaymentInputState>,
    on_outcome: OutcomeCallback,
}

impl CashPaymentDialog {
    pub fn new(on_outcome: impl FnMut(PaymentOutcome) + 'static) -> Self {
        Self {
            state: PaymentInputReducer::derive(MoneyAmount::zero(), ""),
            open: false,
            views: Subscribers::new(),
            on_outcome: Box::new(on_outcome),
        }
    }

    pub fn subscribe(&mut self, view: impl FnMut(&PaymentInputState) + 'static) -> SubscriptionId {
        self.views.subscribe(view)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.views.unsubscribe(id)
    }

    pub fn state(&self) -> &PaymentInputState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Opens the dialog for `price` with an empty tendered field.
    pub fn open(&mut self, price: MoneyAmount) {
        info!(price = %price, "opening cash payment");
        self.open = true;
        self.apply(price, String::new());
    }

    pub fn input_changed(&mut self, raw_input: &str) {
        if !self.ensure_open("input_changed") {
            return;
        }
        self.apply(self.state.price_due, raw_input.to_string());
    }

    /// Replaces the price while keeping the tendered text.
    pub fn update_price(&mut self, price: MoneyAmount) {
        if !self.ensure_open("update_price") {
            return;
        }
        let raw_input = self.state.raw_input.clone();
        self.apply(price, raw_input);
    }

    pub fn reset(&mut self) {
        if !self.ensure_open("reset") {
            return;
        }
        self.apply(self.state.price_due, String::new());
    }

    /// Returns `false` (and does nothing) while confirmation is disabled.
    pub fn confirm(&mut self) -> bool {
        if !self.ensure_open("confirm") {
            return false;
        }
        let tendered = match self.state.parsed_amount {
            Some(tendered) if self.state.confirm_enabled => tendered,
            _ => {
                debug!(input = %self.state.raw_input, "confirmation is disabled");
                return false;
            }
        };
        let outcome = PaymentOutcome::Confirmed {
            price: self.state.price_due,
            tendered,
            change: self.state.change_amount,
        };
        info!(
            price = %self.state.price_due,
            tendered = %tendered,
            change = %self.state.change_amount,
            "cash payment confirmed"
        );
        self.finish(outcome);
        true
    }

    pub fn cancel(&mut self) {
        if !self.ensure_open("cancel") {
            return;
        }
        info!(price = %self.state.price_due, "cash payment cancelled");
        self.finish(PaymentOutcome::Cancelled);
    }

    fn apply(&mut self, price: MoneyAmount, raw_input: String) {
        self.state = PaymentInputReducer::derive(price, &raw_input);
        debug!(
            input = %self.state.raw_input,
            confirm_enabled = self.state.confirm_enabled,
            "payment input derived"
        );
        self.views.notify(&self.state);
    }

    fn finish(&mut self, outcome: PaymentOutcome) {
        self.open = false;
        (self.on_outcome)(outcome);
    }

    fn ensure_open(&self, operation: &str) -> bool {
        if !self.open {
            debug!(operation, "ignored on a closed payment dialog");
        }
        self.open
    }
}
