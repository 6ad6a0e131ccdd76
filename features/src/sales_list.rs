//! Sales list screen.
//!
//! Loads every sale on `Started`, supports swipe-to-delete, and exposes the
//! running total the header renders. A failed load keeps whatever rows were
//! already on screen (empty on first load), per the app-wide rule that an
//! error only ever touches the error and loading fields.

use tally_core::{Effects, effect::EffectHandler, reducer::Reducer, smallvec};
use tally_domain::records::{Sale, SaleId};
use tally_domain::repository::SaleRepository;

/// State of the sales list screen
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SalesListState {
    /// The list is being (re)loaded
    pub is_loading: bool,
    /// Loaded sales, newest ordering left to the repository
    pub sales: Vec<Sale>,
    /// Last load/delete failure
    pub error: Option<String>,
}

impl SalesListState {
    /// Sum of all listed sale totals
    #[must_use]
    pub fn total(&self) -> f64 {
        self.sales.iter().map(Sale::total).sum()
    }
}

/// Inputs to the sales list screen
#[derive(Clone, Debug)]
pub enum SalesListMessage {
    /// Screen appeared; load the list
    Started,
    /// Load finished
    SalesLoaded(Vec<Sale>),
    /// Delete swiped on a row
    DeleteTapped(SaleId),
    /// Delete finished; remove the row
    SaleDeleted(SaleId),
    /// Load or delete failed
    Failed(String),
}

/// Asynchronous work for the sales list screen
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SalesListEffect {
    /// Load every sale
    LoadSales,
    /// Delete one sale
    DeleteSale(SaleId),
}

/// Reducer for the sales list screen
#[derive(Clone, Debug, Default)]
pub struct SalesListReducer;

impl Reducer for SalesListReducer {
    type State = SalesListState;
    type Message = SalesListMessage;
    type Effect = SalesListEffect;

    fn reduce(
        &self,
        state: &mut SalesListState,
        message: SalesListMessage,
    ) -> Effects<SalesListEffect> {
        match message {
            SalesListMessage::Started => {
                if state.is_loading {
                    return Effects::new();
                }
                state.is_loading = true;
                state.error = None;
                smallvec![SalesListEffect::LoadSales]
            },
            SalesListMessage::SalesLoaded(sales) => {
                state.is_loading = false;
                state.sales = sales;
                Effects::new()
            },
            SalesListMessage::DeleteTapped(id) => {
                if state.is_loading {
                    return Effects::new();
                }
                smallvec![SalesListEffect::DeleteSale(id)]
            },
            SalesListMessage::SaleDeleted(id) => {
                state.sales.retain(|sale| sale.id != id);
                Effects::new()
            },
            SalesListMessage::Failed(reason) => {
                state.is_loading = false;
                state.error = Some(reason);
                Effects::new()
            },
        }
    }
}

/// Effect handler for the sales list screen
pub struct SalesListEffects<S> {
    sales: S,
}

impl<S> SalesListEffects<S> {
    /// Create a handler from the injected sale repository
    pub const fn new(sales: S) -> Self {
        Self { sales }
    }
}

impl<S> EffectHandler for SalesListEffects<S>
where
    S: SaleRepository + 'static,
{
    type Message = SalesListMessage;
    type Effect = SalesListEffect;

    async fn handle(&self, effect: SalesListEffect) -> Option<SalesListMessage> {
        match effect {
            SalesListEffect::LoadSales => match self.sales.get_sales().await {
                Ok(sales) => Some(SalesListMessage::SalesLoaded(sales)),
                Err(error) => {
                    tracing::warn!(error = %error, "loading sales failed");
                    Some(SalesListMessage::Failed(error.to_string()))
                },
            },
            SalesListEffect::DeleteSale(id) => match self.sales.delete_sale(id).await {
                Ok(()) => Some(SalesListMessage::SaleDeleted(id)),
                Err(error) => Some(SalesListMessage::Failed(error.to_string())),
            },
        }
    }
}
