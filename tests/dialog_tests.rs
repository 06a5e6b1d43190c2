use std::{cell::RefCell, rc::Rc};

use box_office_core::{
    payment::{CashPaymentDialog, PaymentOutcome, FORMAT_HINT},
    MoneyAmount, PaymentInputState,
};

fn amount(text: &str) -> MoneyAmount {
    MoneyAmount::from_text(text).expect("valid amount")
}

struct Harness {
    dialog: CashPaymentDialog,
    outcomes: Rc<RefCell<Vec<PaymentOutcome>>>,
    rendered: Rc<RefCell<Vec<PaymentInputState>>>,
}

fn harness() -> Harness {
    let outcomes = Rc::new(RefCell::new(Vec::new()));
    let rendered = Rc::new(RefCell::new(Vec::new()));

    let sink = Rc::clone(&outcomes);
    let mut dialog = CashPaymentDialog::new(move |outcome| sink.borrow_mut().push(outcome));
    let view = Rc::clone(&rendered);
    dialog.subscribe(move |state| view.borrow_mut().push(state.clone()));

    Harness {
        dialog,
        outcomes,
        rendered,
    }
}

#[test]
fn opening_publishes_an_empty_snapshot() {
    let mut h = harness();
    assert!(!h.dialog.is_open());

    h.dialog.open(amount("11,90"));

    assert!(h.dialog.is_open());
    let rendered = h.rendered.borrow();
    assert_eq!(rendered.len(), 1);
    assert_eq!(rendered[0].raw_input, "");
    assert_eq!(rendered[0].missing_amount, amount("11,90"));
    assert!(!rendered[0].confirm_enabled);
}

#[test]
fn every_input_change_is_rendered() {
    let mut h = harness();
    h.dialog.open(amount("11,90"));

    for raw in ["1", "10", "10,", "10,0", "10,00", "20,00"] {
        h.dialog.input_changed(raw);
    }

    let rendered = h.rendered.borrow();
    assert_eq!(rendered.len(), 7);
    assert_eq!(rendered[3].error_message.as_deref(), Some(FORMAT_HINT));
    assert_eq!(rendered[5].missing_amount.format(), "1,90");
    assert_eq!(rendered[6].change_amount.format(), "8,10");
    assert!(rendered[6].confirm_enabled);
}

#[test]
fn confirm_is_ignored_while_disabled() {
    let mut h = harness();
    h.dialog.open(amount("11,90"));
    h.dialog.input_changed("10,00");

    assert!(!h.dialog.confirm());
    assert!(h.dialog.is_open());
    assert!(h.outcomes.borrow().is_empty());
}

#[test]
fn confirm_reports_tendered_amount_and_change() {
    let mut h = harness();
    h.dialog.open(amount("11,90"));
    h.dialog.input_changed("20,00");

    assert!(h.dialog.confirm());

    assert!(!h.dialog.is_open());
    assert_eq!(
        *h.outcomes.borrow(),
        vec![PaymentOutcome::Confirmed {
            price: amount("11,90"),
            tendered: amount("20,00"),
            change: amount("8,10"),
        }]
    );
}

#[test]
fn outcome_is_emitted_once() {
    let mut h = harness();
    h.dialog.open(amount("5,00"));
    h.dialog.input_changed("5,00");

    assert!(h.dialog.confirm());
    assert!(!h.dialog.confirm());
    h.dialog.cancel();

    assert_eq!(h.outcomes.borrow().len(), 1);
}

#[test]
fn cancel_reports_cancelled() {
    let mut h = harness();
    h.dialog.open(amount("11,90"));
    h.dialog.input_changed("50,00");
    h.dialog.cancel();

    assert!(!h.dialog.is_open());
    assert_eq!(*h.outcomes.borrow(), vec![PaymentOutcome::Cancelled]);
}

#[test]
fn price_update_rederives_with_current_input() {
    let mut h = harness();
    h.dialog.open(amount("11,90"));
    h.dialog.input_changed("15,00");
    assert!(h.dialog.state().confirm_enabled);

    h.dialog.update_price(amount("17,80"));

    let state = h.dialog.state();
    assert_eq!(state.raw_input, "15,00");
    assert_eq!(state.missing_amount.format(), "2,80");
    assert!(!state.confirm_enabled);
}

#[test]
fn reset_clears_the_tendered_field() {
    let mut h = harness();
    h.dialog.open(amount("11,90"));
    h.dialog.input_changed("20,00");
    h.dialog.reset();

    let state = h.dialog.state();
    assert_eq!(state.raw_input, "");
    assert_eq!(state.parsed_amount, None);
    assert_eq!(state.missing_amount, amount("11,90"));
    assert!(!state.confirm_enabled);
}

#[test]
fn reopening_starts_from_scratch() {
    let mut h = harness();
    h.dialog.open(amount("11,90"));
    h.dialog.input_changed("20,00");
    h.dialog.cancel();

    h.dialog.open(amount("8,50"));

    let state = h.dialog.state();
    assert_eq!(state.price_due, amount("8,50"));
    assert_eq!(state.raw_input, "");
    assert!(!state.confirm_enabled);
}

#[test]
fn closed_dialog_ignores_input() {
    let mut h = harness();
    h.dialog.input_changed("20,00");
    h.dialog.reset();
    h.dialog.cancel();

    assert!(h.rendered.borrow().is_empty());
    assert!(h.outcomes.borrow().is_empty());
    assert!(!h.dialog.confirm());
}

#[test]
fn views_can_unsubscribe() {
    let mut h = harness();
    let extra = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&extra);
    let id = h.dialog.subscribe(move |_| *counter.borrow_mut() += 1);

    h.dialog.open(amount("1,00"));
    assert!(h.dialog.unsubscribe(id));
    h.dialog.input_changed("2,00");

    assert_eq!(*extra.borrow(), 1);
    assert_eq!(h.rendered.borrow().len(), 2);
}
