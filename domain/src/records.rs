//! Domain records shared by every feature store.
//!
//! All records are plain owned values: `Clone`, comparable, serializable.
//! Monetary amounts are `f64` and derived totals are recomputed from line
//! items rather than stored, so a record can never carry a stale total.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! record_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID
            #[must_use]
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Returns the inner UUID
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Unique identifier for a sale
    SaleId
);
record_id!(
    /// Unique identifier for a purchase
    PurchaseId
);
record_id!(
    /// Unique identifier for a client
    ClientId
);
record_id!(
    /// Unique identifier for a product
    ProductId
);
record_id!(
    /// Unique identifier for an authenticated user
    UserId
);

/// One line of a sale: a product, its unit price at sale time, and a quantity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaleLine {
    /// Product this line refers to
    pub product_id: ProductId,
    /// Product name captured at sale time
    pub name: String,
    /// Unit price captured at sale time
    pub unit_price: f64,
    /// Quantity sold, always at least 1 (a line at zero is removed instead)
    pub quantity: u32,
}

impl SaleLine {
    /// Total for this line
    #[must_use]
    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// A sale: who bought what, when, and whether it has been paid
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    /// Unique identifier
    pub id: SaleId,
    /// Client the sale was made to, if one was selected
    pub client_id: Option<ClientId>,
    /// Client name captured at sale time (kept even if the client is later deleted)
    pub client_name: String,
    /// Date of the sale
    pub date: NaiveDate,
    /// Line items
    pub lines: Vec<SaleLine>,
    /// Whether the sale has been paid
    pub paid: bool,
}

impl Sale {
    /// Total of all line items
    #[must_use]
    pub fn total(&self) -> f64 {
        self.lines.iter().map(SaleLine::line_total).sum()
    }
}

/// A purchase: an expense made to a supplier
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    /// Unique identifier
    pub id: PurchaseId,
    /// Supplier name
    pub supplier: String,
    /// Date of the purchase
    pub date: NaiveDate,
    /// Amount spent
    pub amount: f64,
    /// Whether the purchase has been paid
    pub paid: bool,
}

/// A client of the business
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Unique identifier
    pub id: ClientId,
    /// Display name, never empty
    pub name: String,
    /// Contact email
    pub email: String,
    /// Contact phone
    pub phone: String,
    /// Postal address
    pub address: String,
}

/// A product or service sold by the business
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier
    pub id: ProductId,
    /// Display name, never empty
    pub name: String,
    /// Unit price
    pub price: f64,
}

/// The business's own identity, shown on invoices
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessInfo {
    /// Business name
    pub name: String,
    /// Postal address
    pub address: String,
    /// Contact phone
    pub phone: String,
    /// Contact email
    pub email: String,
    /// Tax / registration identifier
    pub tax_id: String,
}
