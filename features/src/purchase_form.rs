//! Purchase (expense) create/edit form.

use chrono::NaiveDate;
use tally_core::{Effects, effect::EffectHandler, reducer::Reducer, smallvec};
use tally_domain::records::{Purchase, PurchaseId};
use tally_domain::repository::PurchaseRepository;

/// State of the purchase form
#[derive(Clone, Debug, PartialEq)]
pub struct PurchaseFormState {
    /// Id the saved purchase will carry; fixed when the form opens
    pub purchase_id: PurchaseId,
    /// Editing an existing purchase rather than creating one
    pub is_editing: bool,
    /// Supplier field; required
    pub supplier: String,
    /// Amount field, kept as entered until save time
    pub amount: String,
    /// Purchase date
    pub date: NaiveDate,
    /// Already paid
    pub paid: bool,
    /// A save is in flight
    pub is_saving: bool,
    /// The last save completed
    pub saved_successfully: bool,
    /// Last save failure
    pub error: Option<String>,
}

impl PurchaseFormState {
    /// Empty form for recording a new purchase, dated `today`
    #[must_use]
    pub fn new(today: NaiveDate) -> Self {
        Self {
            purchase_id: PurchaseId::new(),
            is_editing: false,
            supplier: String::new(),
            amount: String::new(),
            date: today,
            paid: false,
            is_saving: false,
            saved_successfully: false,
            error: None,
        }
    }

    /// Form pre-filled from an existing purchase
    #[must_use]
    pub fn editing(purchase: &Purchase) -> Self {
        Self {
            purchase_id: purchase.id,
            is_editing: true,
            supplier: purchase.supplier.clone(),
            amount: purchase.amount.to_string(),
            date: purchase.date,
            paid: purchase.paid,
            is_saving: false,
            saved_successfully: false,
            error: None,
        }
    }

    /// Whether the current fields form a valid purchase
    #[must_use]
    pub fn can_save(&self) -> bool {
        !self.supplier.trim().is_empty() && parse_amount(&self.amount).is_some()
    }
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|a| *a > 0.0)
}

/// Inputs to the purchase form
#[derive(Clone, Debug)]
pub enum PurchaseFormMessage {
    /// Supplier field edited
    SupplierChanged(String),
    /// Amount field edited
    AmountChanged(String),
    /// Date picked
    DateChanged(NaiveDate),
    /// Paid switch toggled
    PaidToggled,
    /// Save tapped
    SaveTapped,
    /// The repository accepted the purchase
    SaveSucceeded,
    /// The save failed
    Failed(String),
}

/// Asynchronous work for the purchase form
#[derive(Clone, Debug, PartialEq)]
pub enum PurchaseFormEffect {
    /// Persist a new purchase
    SavePurchase(Purchase),
    /// Persist changes to an existing purchase
    UpdatePurchase(Purchase),
}

/// Reducer for the purchase form
#[derive(Clone, Debug, Default)]
pub struct PurchaseFormReducer;

impl Reducer for PurchaseFormReducer {
    type State = PurchaseFormState;
    type Message = PurchaseFormMessage;
    type Effect = PurchaseFormEffect;

    fn reduce(
        &self,
        state: &mut PurchaseFormState,
        message: PurchaseFormMessage,
    ) -> Effects<PurchaseFormEffect> {
        match message {
            PurchaseFormMessage::SupplierChanged(supplier) => {
                state.supplier = supplier;
                Effects::new()
            },
            PurchaseFormMessage::AmountChanged(amount) => {
                state.amount = amount;
                Effects::new()
            },
            PurchaseFormMessage::DateChanged(date) => {
                state.date = date;
                Effects::new()
            },
            PurchaseFormMessage::PaidToggled => {
                state.paid = !state.paid;
                Effects::new()
            },
            PurchaseFormMessage::SaveTapped => {
                if state.is_saving || !state.can_save() {
                    return Effects::new();
                }
                let Some(amount) = parse_amount(&state.amount) else {
                    return Effects::new();
                };
                state.is_saving = true;
                state.error = None;
                let purchase = Purchase {
                    id: state.purchase_id,
                    supplier: state.supplier.trim().to_string(),
                    date: state.date,
                    amount,
                    paid: state.paid,
                };
                if state.is_editing {
                    smallvec![PurchaseFormEffect::UpdatePurchase(purchase)]
                } else {
                    smallvec![PurchaseFormEffect::SavePurchase(purchase)]
                }
            },
            PurchaseFormMessage::SaveSucceeded => {
                state.is_saving = false;
                state.saved_successfully = true;
                Effects::new()
            },
            PurchaseFormMessage::Failed(reason) => {
                state.is_saving = false;
                state.error = Some(reason);
                Effects::new()
            },
        }
    }
}

/// Effect handler for the purchase form
pub struct PurchaseFormEffects<P> {
    purchases: P,
}

impl<P> PurchaseFormEffects<P> {
    /// Create a handler from the injected purchase repository
    pub const fn new(purchases: P) -> Self {
        Self { purchases }
    }
}

impl<P> EffectHandler for PurchaseFormEffects<P>
where
    P: PurchaseRepository + 'static,
{
    type Message = PurchaseFormMessage;
    type Effect = PurchaseFormEffect;

    async fn handle(&self, effect: PurchaseFormEffect) -> Option<PurchaseFormMessage> {
        let result = match effect {
            PurchaseFormEffect::SavePurchase(purchase) => {
                self.purchases.save_purchase(purchase).await
            },
            PurchaseFormEffect::UpdatePurchase(purchase) => {
                self.purchases.update_purchase(purchase).await
            },
        };
        match result {
            Ok(()) => Some(PurchaseFormMessage::SaveSucceeded),
            Err(error) => Some(PurchaseFormMessage::Failed(error.to_string())),
        }
    }
}
