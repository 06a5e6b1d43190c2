use box_office_core::{
    init,
    payment::{CashPaymentDialog, PaymentOutcome},
    MoneyAmount,
};
use std::{cell::Cell, rc::Rc};

#[test]
fn cash_payment_smoke() {
    init();

    let ticket = MoneyAmount::from_text("8,50").unwrap();
    let total = ticket.scale(2).and_then(|two| two.add(ticket)).unwrap();
    assert_eq!(total.format(), "25,50");

    let change = Rc::new(Cell::new(None));
    let sink = Rc::clone(&change);
    let mut dialog = CashPaymentDialog::new(move |outcome| {
        if let PaymentOutcome::Confirmed { change, .. } = outcome {
            sink.set(Some(change));
        }
    });

    dialog.open(total);
    dialog.input_changed("30,00");
    assert!(dialog.confirm());
    assert_eq!(change.get().map(MoneyAmount::format).as_deref(), Some("4,50"));
}
