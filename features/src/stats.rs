//! Statistics screen: per-period totals over sales and purchases.
//!
//! Loads both datasets once on `Started`; changing the year or month filter
//! is pure state and recomputes the derived figures without a reload. The
//! monthly breakdown always covers the whole selected year, independent of
//! the month filter.

use chrono::Datelike;
use tally_core::{Effects, effect::EffectHandler, reducer::Reducer, smallvec};
use tally_domain::records::{Purchase, Sale};
use tally_domain::repository::{PurchaseRepository, SaleRepository};

/// One month's sales total within the selected year
#[derive(Clone, Debug, PartialEq)]
pub struct MonthlyTotal {
    /// Month number, 1-12
    pub month: u32,
    /// Sales total for that month
    pub total: f64,
}

/// State of the statistics screen
#[derive(Clone, Debug, PartialEq)]
pub struct StatsState {
    /// Sales are being loaded
    pub is_loading_sales: bool,
    /// Purchases are being loaded
    pub is_loading_purchases: bool,
    /// All loaded sales, unfiltered
    pub sales: Vec<Sale>,
    /// All loaded purchases, unfiltered
    pub purchases: Vec<Purchase>,
    /// Selected year
    pub year: i32,
    /// Selected month, 1-12; None means the whole year
    pub month: Option<u32>,
    /// Last load failure
    pub error: Option<String>,
}

impl StatsState {
    /// Fresh state filtered to the given year, whole-year view
    #[must_use]
    pub const fn new(year: i32) -> Self {
        Self {
            is_loading_sales: false,
            is_loading_purchases: false,
            sales: Vec::new(),
            purchases: Vec::new(),
            year,
            month: None,
            error: None,
        }
    }

    /// Any load still in flight
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.is_loading_sales || self.is_loading_purchases
    }

    fn in_period(&self, date: chrono::NaiveDate) -> bool {
        date.year() == self.year && self.month.is_none_or(|m| date.month() == m)
    }

    /// Sales matching the selected period
    pub fn filtered_sales(&self) -> impl Iterator<Item = &Sale> {
        self.sales.iter().filter(|s| self.in_period(s.date))
    }

    /// Purchases matching the selected period
    pub fn filtered_purchases(&self) -> impl Iterator<Item = &Purchase> {
        self.purchases.iter().filter(|p| self.in_period(p.date))
    }

    /// Total of all sales in the period
    #[must_use]
    pub fn total_sales(&self) -> f64 {
        self.filtered_sales().map(Sale::total).sum()
    }

    /// Total of unpaid sales in the period
    #[must_use]
    pub fn unpaid_total(&self) -> f64 {
        self.filtered_sales().filter(|s| !s.paid).map(Sale::total).sum()
    }

    /// Number of sales in the period
    #[must_use]
    pub fn sales_count(&self) -> usize {
        self.filtered_sales().count()
    }

    /// Total of all purchases in the period
    #[must_use]
    pub fn total_purchases(&self) -> f64 {
        self.filtered_purchases().map(|p| p.amount).sum()
    }

    /// Sales minus purchases for the period
    #[must_use]
    pub fn net(&self) -> f64 {
        self.total_sales() - self.total_purchases()
    }

    /// Per-month sales totals for the selected year, ascending by month.
    /// Months without sales are omitted.
    #[must_use]
    pub fn monthly_breakdown(&self) -> Vec<MonthlyTotal> {
        (1..=12_u32)
            .filter_map(|month| {
                let in_month = |s: &&Sale| s.date.year() == self.year && s.date.month() == month;
                if self.sales.iter().any(|s| in_month(&s)) {
                    let total = self.sales.iter().filter(in_month).map(Sale::total).sum();
                    Some(MonthlyTotal { month, total })
                } else {
                    None
                }
            })
            .collect()
    }
}

/// Inputs to the statistics screen
#[derive(Clone, Debug)]
pub enum StatsMessage {
    /// Screen appeared; load both datasets
    Started,
    /// Sales load finished
    SalesLoaded(Vec<Sale>),
    /// Purchases load finished
    PurchasesLoaded(Vec<Purchase>),
    /// Year filter changed
    YearChanged(i32),
    /// Month filter changed; None selects the whole year
    MonthChanged(Option<u32>),
    /// A load failed
    Failed(String),
}

/// Asynchronous work for the statistics screen
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatsEffect {
    /// Load every sale
    LoadSales,
    /// Load every purchase
    LoadPurchases,
}

/// Reducer for the statistics screen
#[derive(Clone, Debug, Default)]
pub struct StatsReducer;

impl Reducer for StatsReducer {
    type State = StatsState;
    type Message = StatsMessage;
    type Effect = StatsEffect;

    fn reduce(&self, state: &mut StatsState, message: StatsMessage) -> Effects<StatsEffect> {
        match message {
            StatsMessage::Started => {
                if state.is_loading() {
                    return Effects::new();
                }
                state.is_loading_sales = true;
                state.is_loading_purchases = true;
                state.error = None;
                smallvec![StatsEffect::LoadSales, StatsEffect::LoadPurchases]
            },
            StatsMessage::SalesLoaded(sales) => {
                state.is_loading_sales = false;
                state.sales = sales;
                Effects::new()
            },
            StatsMessage::PurchasesLoaded(purchases) => {
                state.is_loading_purchases = false;
                state.purchases = purchases;
                Effects::new()
            },
            StatsMessage::YearChanged(year) => {
                state.year = year;
                Effects::new()
            },
            StatsMessage::MonthChanged(month) => {
                state.month = month.filter(|m| (1..=12).contains(m));
                Effects::new()
            },
            StatsMessage::Failed(reason) => {
                state.is_loading_sales = false;
                state.is_loading_purchases = false;
                state.error = Some(reason);
                Effects::new()
            },
        }
    }
}

/// Effect handler for the statistics screen
pub struct StatsEffects<S, P> {
    sales: S,
    purchases: P,
}

impl<S, P> StatsEffects<S, P> {
    /// Create a handler from the injected repositories
    pub const fn new(sales: S, purchases: P) -> Self {
        Self { sales, purchases }
    }
}

impl<S, P> EffectHandler for StatsEffects<S, P>
where
    S: SaleRepository + 'static,
    P: PurchaseRepository + 'static,
{
    type Message = StatsMessage;
    type Effect = StatsEffect;

    async fn handle(&self, effect: StatsEffect) -> Option<StatsMessage> {
        match effect {
            StatsEffect::LoadSales => match self.sales.get_sales().await {
                Ok(sales) => Some(StatsMessage::SalesLoaded(sales)),
                Err(error) => Some(StatsMessage::Failed(error.to_string())),
            },
            StatsEffect::LoadPurchases => match self.purchases.get_purchases().await {
                Ok(purchases) => Some(StatsMessage::PurchasesLoaded(purchases)),
                Err(error) => Some(StatsMessage::Failed(error.to_string())),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::time::Duration;
    use tally_domain::records::{ProductId, PurchaseId, SaleId, SaleLine};
    use tally_runtime::Store;
    use tally_testing::{
        InMemoryPurchaseRepository, InMemorySaleRepository, ReducerTest, assertions,
    };

    fn sale_on(date: &str, total: f64, paid: bool) -> Sale {
        Sale {
            id: SaleId::new(),
            client_id: None,
            client_name: "Acme".to_string(),
            date: date.parse::<NaiveDate>().unwrap(),
            lines: vec![SaleLine {
                product_id: ProductId::new(),
                name: "Item".to_string(),
                unit_price: total,
                quantity: 1,
            }],
            paid,
        }
    }

    fn purchase_on(date: &str, amount: f64) -> Purchase {
        Purchase {
            id: PurchaseId::new(),
            supplier: "Paper Co".to_string(),
            date: date.parse::<NaiveDate>().unwrap(),
            amount,
            paid: true,
        }
    }

    #[test]
    fn started_loads_both_datasets() {
        ReducerTest::new(StatsReducer)
            .given_state(StatsState::new(2025))
            .when_message(StatsMessage::Started)
            .then_state(|state| assert!(state.is_loading()))
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 2);
                assert_eq!(effects[0], StatsEffect::LoadSales);
                assert_eq!(effects[1], StatsEffect::LoadPurchases);
            })
            .run();
    }

    // Two February 2025 sales, one unpaid, whole-year view: totals, count
    // and the single-entry breakdown.
    #[test]
    fn yearly_aggregation() {
        let mut state = StatsState::new(2025);
        state.sales = vec![
            sale_on("2025-02-10", 95.0, false),
            sale_on("2025-02-08", 45.0, true),
        ];

        assert!((state.total_sales() - 140.0).abs() < f64::EPSILON);
        assert!((state.unpaid_total() - 95.0).abs() < f64::EPSILON);
        assert_eq!(state.sales_count(), 2);
        assert_eq!(
            state.monthly_breakdown(),
            vec![MonthlyTotal {
                month: 2,
                total: 140.0
            }]
        );
    }

    #[test]
    fn month_filter_narrows_totals_but_not_the_breakdown() {
        let mut state = StatsState::new(2025);
        state.sales = vec![
            sale_on("2025-02-10", 95.0, false),
            sale_on("2025-03-01", 50.0, true),
        ];
        state.month = Some(3);

        assert!((state.total_sales() - 50.0).abs() < f64::EPSILON);
        assert_eq!(state.sales_count(), 1);
        assert_eq!(state.monthly_breakdown().len(), 2);
    }

    #[test]
    fn other_years_are_excluded() {
        let mut state = StatsState::new(2025);
        state.sales = vec![
            sale_on("2025-02-10", 95.0, false),
            sale_on("2024-02-10", 80.0, false),
        ];
        state.purchases = vec![purchase_on("2025-02-11", 30.0), purchase_on("2023-01-05", 99.0)];

        assert!((state.total_sales() - 95.0).abs() < f64::EPSILON);
        assert!((state.total_purchases() - 30.0).abs() < f64::EPSILON);
        assert!((state.net() - 65.0).abs() < f64::EPSILON);
    }

    #[test]
    fn breakdown_is_ascending_by_month() {
        let mut state = StatsState::new(2025);
        state.sales = vec![
            sale_on("2025-09-01", 10.0, true),
            sale_on("2025-01-15", 20.0, true),
            sale_on("2025-04-20", 30.0, true),
        ];

        let months: Vec<u32> = state.monthly_breakdown().iter().map(|m| m.month).collect();
        assert_eq!(months, vec![1, 4, 9]);
    }

    #[test]
    fn invalid_month_clears_the_filter() {
        ReducerTest::new(StatsReducer)
            .given_state(StatsState::new(2025))
            .when_message(StatsMessage::MonthChanged(Some(13)))
            .then_state(|state| assert_eq!(state.month, None))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[tokio::test]
    async fn load_then_filter_without_reload() {
        let sales = InMemorySaleRepository::with_sales(vec![
            sale_on("2025-02-10", 95.0, false),
            sale_on("2025-02-08", 45.0, true),
        ]);
        let purchases = InMemoryPurchaseRepository::with_purchases(vec![purchase_on(
            "2025-02-11",
            30.0,
        )]);
        let store = Store::new(
            StatsState::new(2025),
            StatsReducer,
            StatsEffects::new(sales, purchases),
        );

        let mut handle = store.dispatch(StatsMessage::Started).await.unwrap();
        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let state = store.state(|s| s.clone()).await;
        assert!(!state.is_loading());
        assert!((state.total_sales() - 140.0).abs() < f64::EPSILON);
        assert!((state.net() - 110.0).abs() < f64::EPSILON);

        // Switching period touches no repository: no effects, same data.
        let handle = store
            .dispatch(StatsMessage::MonthChanged(Some(2)))
            .await
            .unwrap();
        assert_eq!(handle.pending(), 0);
        assert!((store.state(StatsState::total_sales).await - 140.0).abs() < f64::EPSILON);
    }
}
