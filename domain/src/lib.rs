//! # Tally Domain
//!
//! Domain records and repository traits for the Tally accounting features.
//!
//! The records here are what the feature stores load, edit, and save: sales
//! with their line items, purchases, clients, products, and the single
//! business-info record used for invoicing. Repositories are the injected
//! collaborators behind every effect handler — the stores are agnostic to
//! whether a repository is backed by a document database, device storage,
//! or an in-memory map.

/// Domain records (sales, purchases, clients, products, business info)
pub mod records;

/// Repository traits and errors
pub mod repository;

pub use records::{
    BusinessInfo, Client, ClientId, Product, ProductId, Purchase, PurchaseId, Sale, SaleId,
    SaleLine, UserId,
};
pub use repository::{
    AuthGateway, BusinessInfoRepository, ClientRepository, ProductRepository, PurchaseRepository,
    RepositoryError, SaleRepository, SessionRepository,
};
