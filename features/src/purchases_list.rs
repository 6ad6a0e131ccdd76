//! Purchases (expenses) list screen.

use tally_core::{Effects, effect::EffectHandler, reducer::Reducer, smallvec};
use tally_domain::records::{Purchase, PurchaseId};
use tally_domain::repository::PurchaseRepository;

/// State of the purchases list screen
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PurchasesListState {
    /// The list is being (re)loaded
    pub is_loading: bool,
    /// Loaded purchases
    pub purchases: Vec<Purchase>,
    /// Last load/delete failure
    pub error: Option<String>,
}

impl PurchasesListState {
    /// Sum of all listed purchase amounts
    #[must_use]
    pub fn total(&self) -> f64 {
        self.purchases.iter().map(|p| p.amount).sum()
    }
}

/// Inputs to the purchases list screen
#[derive(Clone, Debug)]
pub enum PurchasesListMessage {
    /// Screen appeared; load the list
    Started,
    /// Load finished
    PurchasesLoaded(Vec<Purchase>),
    /// Delete swiped on a row
    DeleteTapped(PurchaseId),
    /// Delete finished; remove the row
    PurchaseDeleted(PurchaseId),
    /// Load or delete failed
    Failed(String),
}

/// Asynchronous work for the purchases list screen
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PurchasesListEffect {
    /// Load every purchase
    LoadPurchases,
    /// Delete one purchase
    DeletePurchase(PurchaseId),
}

/// Reducer for the purchases list screen
#[derive(Clone, Debug, Default)]
pub struct PurchasesListReducer;

impl Reducer for PurchasesListReducer {
    type State = PurchasesListState;
    type Message = PurchasesListMessage;
    type Effect = PurchasesListEffect;

    fn reduce(
        &self,
        state: &mut PurchasesListState,
        message: PurchasesListMessage,
    ) -> Effects<PurchasesListEffect> {
        match message {
            PurchasesListMessage::Started => {
                if state.is_loading {
                    return Effects::new();
                }
                state.is_loading = true;
                state.error = None;
                smallvec![PurchasesListEffect::LoadPurchases]
            },
            PurchasesListMessage::PurchasesLoaded(purchases) => {
                state.is_loading = false;
                state.purchases = purchases;
                Effects::new()
            },
            PurchasesListMessage::DeleteTapped(id) => {
                if state.is_loading {
                    return Effects::new();
                }
                smallvec![PurchasesListEffect::DeletePurchase(id)]
            },
            PurchasesListMessage::PurchaseDeleted(id) => {
                state.purchases.retain(|purchase| purchase.id != id);
                Effects::new()
            },
            PurchasesListMessage::Failed(reason) => {
                state.is_loading = false;
                state.error = Some(reason);
                Effects::new()
            },
        }
    }
}

/// Effect handler for the purchases list screen
pub struct PurchasesListEffects<P> {
    purchases: P,
}

impl<P> PurchasesListEffects<P> {
    /// Create a handler from the injected purchase repository
    pub const fn new(purchases: P) -> Self {
        Self { purchases }
    }
}

impl<P> EffectHandler for PurchasesListEffects<P>
where
    P: PurchaseRepository + 'static,
{
    type Message = PurchasesListMessage;
    type Effect = PurchasesListEffect;

    async fn handle(&self, effect: PurchasesListEffect) -> Option<PurchasesListMessage> {
        match effect {
            PurchasesListEffect::LoadPurchases => match self.purchases.get_purchases().await {
                Ok(purchases) => Some(PurchasesListMessage::PurchasesLoaded(purchases)),
                Err(error) => Some(PurchasesListMessage::Failed(error.to_string())),
            },
            PurchasesListEffect::DeletePurchase(id) => {
                match self.purchases.delete_purchase(id).await {
                    Ok(()) => Some(PurchasesListMessage::PurchaseDeleted(id)),
                    Err(error) => Some(PurchasesListMessage::Failed(error.to_string())),
                }
            },
        }
    }
}
