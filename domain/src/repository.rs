//! Repository traits behind the feature stores.
//!
//! Each trait is a small async CRUD surface over one record kind. Effect
//! handlers hold these by value (generics, not trait objects), so the
//! methods return named `impl Future + Send` types and stay dyn-free.
//!
//! A repository failure is always a [`RepositoryError`]; the handler maps it
//! to an error-carrying message, so nothing here ever crosses a store
//! boundary as a raised error.

use std::future::Future;

use thiserror::Error;

use crate::records::{
    BusinessInfo, Client, ClientId, Product, ProductId, Purchase, PurchaseId, Sale, SaleId, UserId,
};

/// Errors surfaced by repository implementations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The requested record does not exist
    #[error("{kind} not found")]
    NotFound {
        /// Record kind, e.g. `"sale"`
        kind: &'static str,
    },

    /// The backend rejected or failed the operation
    #[error("{0}")]
    Backend(String),
}

impl RepositoryError {
    /// Convenience constructor for a not-found error
    #[must_use]
    pub const fn not_found(kind: &'static str) -> Self {
        Self::NotFound { kind }
    }

    /// Convenience constructor for a backend error
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

/// Result alias used by every repository method
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Storage for [`Sale`] records
pub trait SaleRepository: Send + Sync {
    /// Load every sale
    fn get_sales(&self) -> impl Future<Output = Result<Vec<Sale>>> + Send;

    /// Load one sale by id
    fn get_sale(&self, id: SaleId) -> impl Future<Output = Result<Sale>> + Send;

    /// Persist a new sale
    fn save_sale(&self, sale: Sale) -> impl Future<Output = Result<()>> + Send;

    /// Replace an existing sale
    fn update_sale(&self, sale: Sale) -> impl Future<Output = Result<()>> + Send;

    /// Delete a sale by id
    fn delete_sale(&self, id: SaleId) -> impl Future<Output = Result<()>> + Send;
}

/// Storage for [`Purchase`] records
pub trait PurchaseRepository: Send + Sync {
    /// Load every purchase
    fn get_purchases(&self) -> impl Future<Output = Result<Vec<Purchase>>> + Send;

    /// Load one purchase by id
    fn get_purchase(&self, id: PurchaseId) -> impl Future<Output = Result<Purchase>> + Send;

    /// Persist a new purchase
    fn save_purchase(&self, purchase: Purchase) -> impl Future<Output = Result<()>> + Send;

    /// Replace an existing purchase
    fn update_purchase(&self, purchase: Purchase) -> impl Future<Output = Result<()>> + Send;

    /// Delete a purchase by id
    fn delete_purchase(&self, id: PurchaseId) -> impl Future<Output = Result<()>> + Send;
}

/// Storage for [`Client`] records
pub trait ClientRepository: Send + Sync {
    /// Load every client
    fn get_clients(&self) -> impl Future<Output = Result<Vec<Client>>> + Send;

    /// Persist a new client
    fn save_client(&self, client: Client) -> impl Future<Output = Result<()>> + Send;

    /// Replace an existing client
    fn update_client(&self, client: Client) -> impl Future<Output = Result<()>> + Send;

    /// Delete a client by id
    fn delete_client(&self, id: ClientId) -> impl Future<Output = Result<()>> + Send;
}

/// Storage for [`Product`] records
pub trait ProductRepository: Send + Sync {
    /// Load every product
    fn get_products(&self) -> impl Future<Output = Result<Vec<Product>>> + Send;

    /// Persist a new product
    fn save_product(&self, product: Product) -> impl Future<Output = Result<()>> + Send;

    /// Replace an existing product
    fn update_product(&self, product: Product) -> impl Future<Output = Result<()>> + Send;

    /// Delete a product by id
    fn delete_product(&self, id: ProductId) -> impl Future<Output = Result<()>> + Send;
}

/// Storage for the single [`BusinessInfo`] record
pub trait BusinessInfoRepository: Send + Sync {
    /// Load the business info, if one has been saved
    fn get_business_info(&self) -> impl Future<Output = Result<Option<BusinessInfo>>> + Send;

    /// Persist the business info, replacing any previous value
    fn save_business_info(&self, info: BusinessInfo) -> impl Future<Output = Result<()>> + Send;
}

/// Local session storage (the device key-value store)
pub trait SessionRepository: Send + Sync {
    /// Load the stored session, if any
    fn load_session(&self) -> impl Future<Output = Result<Option<UserId>>> + Send;

    /// Store the session for the signed-in user
    fn store_session(&self, user: UserId) -> impl Future<Output = Result<()>> + Send;

    /// Clear the stored session
    fn clear_session(&self) -> impl Future<Output = Result<()>> + Send;
}

/// Authentication backend
pub trait AuthGateway: Send + Sync {
    /// Sign in with email and password, returning the authenticated user
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<UserId>> + Send;

    /// Sign out the current user
    fn sign_out(&self) -> impl Future<Output = Result<()>> + Send;
}
