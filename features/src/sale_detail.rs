//! Single-sale detail screen.
//!
//! Opened for a known [`SaleId`]; loads the sale, can flip its paid flag and
//! delete it. `deleted` tells the UI to navigate back once a delete lands.

use tally_core::{Effects, effect::EffectHandler, reducer::Reducer, smallvec};
use tally_domain::records::{Sale, SaleId};
use tally_domain::repository::SaleRepository;

/// State of the sale detail screen
#[derive(Clone, Debug, PartialEq)]
pub struct SaleDetailState {
    /// The sale this screen was opened for
    pub sale_id: SaleId,
    /// The sale is being loaded or written
    pub is_loading: bool,
    /// The loaded sale
    pub sale: Option<Sale>,
    /// The sale was deleted; the screen should close
    pub deleted: bool,
    /// Last load/update/delete failure
    pub error: Option<String>,
}

impl SaleDetailState {
    /// Fresh state for the given sale
    #[must_use]
    pub const fn new(sale_id: SaleId) -> Self {
        Self {
            sale_id,
            is_loading: false,
            sale: None,
            deleted: false,
            error: None,
        }
    }
}

/// Inputs to the sale detail screen
#[derive(Clone, Debug)]
pub enum SaleDetailMessage {
    /// Screen appeared; load the sale
    Started,
    /// Load finished
    SaleLoaded(Sale),
    /// Paid switch toggled
    TogglePaidTapped,
    /// The paid update was accepted
    PaidUpdated(Sale),
    /// Delete tapped
    DeleteTapped,
    /// The sale was deleted
    SaleDeleted,
    /// Load, update or delete failed
    Failed(String),
}

/// Asynchronous work for the sale detail screen
#[derive(Clone, Debug, PartialEq)]
pub enum SaleDetailEffect {
    /// Load the sale
    LoadSale(SaleId),
    /// Persist a paid-flag change
    UpdateSale(Sale),
    /// Delete the sale
    DeleteSale(SaleId),
}

/// Reducer for the sale detail screen
#[derive(Clone, Debug, Default)]
pub struct SaleDetailReducer;

impl Reducer for SaleDetailReducer {
    type State = SaleDetailState;
    type Message = SaleDetailMessage;
    type Effect = SaleDetailEffect;

    fn reduce(
        &self,
        state: &mut SaleDetailState,
        message: SaleDetailMessage,
    ) -> Effects<SaleDetailEffect> {
        match message {
            SaleDetailMessage::Started => {
                if state.is_loading {
                    return Effects::new();
                }
                state.is_loading = true;
                state.error = None;
                smallvec![SaleDetailEffect::LoadSale(state.sale_id)]
            },
            SaleDetailMessage::SaleLoaded(sale) => {
                state.is_loading = false;
                state.sale = Some(sale);
                Effects::new()
            },
            SaleDetailMessage::TogglePaidTapped => {
                // Only meaningful once the sale is on screen and idle.
                let Some(sale) = state.sale.as_ref() else {
                    return Effects::new();
                };
                if state.is_loading {
                    return Effects::new();
                }
                let mut updated = sale.clone();
                updated.paid = !updated.paid;
                state.is_loading = true;
                smallvec![SaleDetailEffect::UpdateSale(updated)]
            },
            SaleDetailMessage::PaidUpdated(sale) => {
                state.is_loading = false;
                state.sale = Some(sale);
                Effects::new()
            },
            SaleDetailMessage::DeleteTapped => {
                if state.is_loading {
                    return Effects::new();
                }
                state.is_loading = true;
                smallvec![SaleDetailEffect::DeleteSale(state.sale_id)]
            },
            SaleDetailMessage::SaleDeleted => {
                state.is_loading = false;
                state.deleted = true;
                Effects::new()
            },
            SaleDetailMessage::Failed(reason) => {
                state.is_loading = false;
                state.error = Some(reason);
                Effects::new()
            },
        }
    }
}

/// Effect handler for the sale detail screen
pub struct SaleDetailEffects<S> {
    sales: S,
}

impl<S> SaleDetailEffects<S> {
    /// Create a handler from the injected sale repository
    pub const fn new(sales: S) -> Self {
        Self { sales }
    }
}

impl<S> EffectHandler for SaleDetailEffects<S>
where
    S: SaleRepository + 'static,
{
    type Message = SaleDetailMessage;
    type Effect = SaleDetailEffect;

    async fn handle(&self, effect: SaleDetailEffect) -> Option<SaleDetailMessage> {
        match effect {
            SaleDetailEffect::LoadSale(id) => match self.sales.get_sale(id).await {
                Ok(sale) => Some(SaleDetailMessage::SaleLoaded(sale)),
                Err(error) => Some(SaleDetailMessage::Failed(error.to_string())),
            },
            SaleDetailEffect::UpdateSale(sale) => {
                match self.sales.update_sale(sale.clone()).await {
                    Ok(()) => Some(SaleDetailMessage::PaidUpdated(sale)),
                    Err(error) => Some(SaleDetailMessage::Failed(error.to_string())),
                }
            },
            SaleDetailEffect::DeleteSale(id) => match self.sales.delete_sale(id).await {
                Ok(()) => Some(SaleDetailMessage::SaleDeleted),
                Err(error) => Some(SaleDetailMessage::Failed(error.to_string())),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::time::Duration;
    use tally_domain::records::{ProductId, SaleLine};
    use tally_runtime::Store;
    use tally_testing::{InMemorySaleRepository, ReducerTest, assertions};

    fn sample_sale() -> Sale {
        Sale {
            id: SaleId::new(),
            client_id: None,
            client_name: "Acme".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 2, 10).unwrap(),
            lines: vec![SaleLine {
                product_id: ProductId::new(),
                name: "Pen".to_string(),
                unit_price: 1.5,
                quantity: 2,
            }],
            paid: false,
        }
    }

    #[test]
    fn started_loads_the_opened_sale() {
        let id = SaleId::new();
        ReducerTest::new(SaleDetailReducer)
            .given_state(SaleDetailState::new(id))
            .when_message(SaleDetailMessage::Started)
            .then_state(|state| assert!(state.is_loading))
            .then_effects(move |effects| {
                assertions::assert_effects_count(effects, 1);
                assert_eq!(effects[0], SaleDetailEffect::LoadSale(id));
            })
            .run();
    }

    #[test]
    fn toggle_before_load_does_nothing() {
        ReducerTest::new(SaleDetailReducer)
            .given_state(SaleDetailState::new(SaleId::new()))
            .when_message(SaleDetailMessage::TogglePaidTapped)
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn toggle_emits_the_flipped_sale() {
        let sale = sample_sale();
        let mut state = SaleDetailState::new(sale.id);
        state.sale = Some(sale.clone());

        ReducerTest::new(SaleDetailReducer)
            .given_state(state)
            .when_message(SaleDetailMessage::TogglePaidTapped)
            .then_effects(move |effects| {
                assertions::assert_effects_count(effects, 1);
                let SaleDetailEffect::UpdateSale(updated) = &effects[0] else {
                    panic!("expected UpdateSale");
                };
                assert!(updated.paid);
                assert_eq!(updated.id, sale.id);
            })
            .run();
    }

    #[tokio::test]
    async fn missing_sale_surfaces_an_error() {
        let store = Store::new(
            SaleDetailState::new(SaleId::new()),
            SaleDetailReducer,
            SaleDetailEffects::new(InMemorySaleRepository::new()),
        );

        let mut handle = store.dispatch(SaleDetailMessage::Started).await.unwrap();
        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let state = store.state(|s| s.clone()).await;
        assert!(!state.is_loading);
        assert!(state.error.is_some());
        assert!(state.sale.is_none());
    }

    #[tokio::test]
    async fn delete_flags_the_screen_closed() {
        let sale = sample_sale();
        let id = sale.id;
        let repo = InMemorySaleRepository::with_sales(vec![sale]);
        let store = Store::new(
            SaleDetailState::new(id),
            SaleDetailReducer,
            SaleDetailEffects::new(repo.clone()),
        );

        let mut handle = store.dispatch(SaleDetailMessage::DeleteTapped).await.unwrap();
        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(store.state(|s| s.deleted).await);
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn toggle_round_trip_persists_paid() {
        let sale = sample_sale();
        let id = sale.id;
        let repo = InMemorySaleRepository::with_sales(vec![sale.clone()]);
        let mut state = SaleDetailState::new(id);
        state.sale = Some(sale);
        let store = Store::new(state, SaleDetailReducer, SaleDetailEffects::new(repo.clone()));

        let mut handle = store
            .dispatch(SaleDetailMessage::TogglePaidTapped)
            .await
            .unwrap();
        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(store.state(|s| s.sale.as_ref().is_some_and(|sale| sale.paid)).await);
        assert!(repo.get_sale(id).await.unwrap().paid);
    }
}
