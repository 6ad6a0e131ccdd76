//! In-memory repository mocks
//!
//! Fast, deterministic stand-ins for the domain repositories:
//! collection-backed storage plus failure injection, so tests can drive
//! both the success and error paths of every effect handler.
//!
//! Each mock is cheaply cloneable (shared interior), matching how effect
//! handlers hold their repositories.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Lock poisoning is the only panic source

use std::sync::{Arc, RwLock};

use tally_domain::records::{
    BusinessInfo, Client, ClientId, Product, ProductId, Purchase, PurchaseId, Sale, SaleId, UserId,
};
use tally_domain::repository::{
    AuthGateway, BusinessInfoRepository, ClientRepository, ProductRepository, PurchaseRepository,
    RepositoryError, Result, SaleRepository, SessionRepository,
};

/// Shared failure switch used by every mock
#[derive(Clone, Debug, Default)]
struct FailureSwitch {
    message: Arc<RwLock<Option<String>>>,
}

impl FailureSwitch {
    fn set(&self, message: &str) {
        *self.message.write().unwrap() = Some(message.to_string());
    }

    fn clear(&self) {
        *self.message.write().unwrap() = None;
    }

    fn check(&self) -> Result<()> {
        match self.message.read().unwrap().as_ref() {
            Some(message) => Err(RepositoryError::backend(message.clone())),
            None => Ok(()),
        }
    }
}

macro_rules! failure_injection {
    () => {
        /// Make every subsequent call fail with the given backend error
        pub fn fail_with(&self, message: &str) {
            self.failure.set(message);
        }

        /// Clear a previously injected failure
        pub fn succeed(&self) {
            self.failure.clear();
        }
    };
}

/// In-memory [`SaleRepository`]
#[derive(Clone, Debug, Default)]
pub struct InMemorySaleRepository {
    sales: Arc<RwLock<Vec<Sale>>>,
    failure: FailureSwitch,
}

impl InMemorySaleRepository {
    /// Create an empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-populated with sales
    #[must_use]
    pub fn with_sales(sales: Vec<Sale>) -> Self {
        Self {
            sales: Arc::new(RwLock::new(sales)),
            failure: FailureSwitch::default(),
        }
    }

    failure_injection!();

    /// Number of stored sales
    #[must_use]
    pub fn len(&self) -> usize {
        self.sales.read().unwrap().len()
    }

    /// Whether the repository is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a sale with this id is stored
    #[must_use]
    pub fn contains(&self, id: SaleId) -> bool {
        self.sales.read().unwrap().iter().any(|s| s.id == id)
    }
}

impl SaleRepository for InMemorySaleRepository {
    async fn get_sales(&self) -> Result<Vec<Sale>> {
        self.failure.check()?;
        Ok(self.sales.read().unwrap().clone())
    }

    async fn get_sale(&self, id: SaleId) -> Result<Sale> {
        self.failure.check()?;
        self.sales
            .read()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or(RepositoryError::not_found("sale"))
    }

    async fn save_sale(&self, sale: Sale) -> Result<()> {
        self.failure.check()?;
        self.sales.write().unwrap().push(sale);
        Ok(())
    }

    async fn update_sale(&self, sale: Sale) -> Result<()> {
        self.failure.check()?;
        let mut sales = self.sales.write().unwrap();
        match sales.iter_mut().find(|s| s.id == sale.id) {
            Some(existing) => {
                *existing = sale;
                Ok(())
            },
            None => Err(RepositoryError::not_found("sale")),
        }
    }

    async fn delete_sale(&self, id: SaleId) -> Result<()> {
        self.failure.check()?;
        let mut sales = self.sales.write().unwrap();
        let before = sales.len();
        sales.retain(|s| s.id != id);
        if sales.len() == before {
            return Err(RepositoryError::not_found("sale"));
        }
        Ok(())
    }
}

/// In-memory [`PurchaseRepository`]
#[derive(Clone, Debug, Default)]
pub struct InMemoryPurchaseRepository {
    purchases: Arc<RwLock<Vec<Purchase>>>,
    failure: FailureSwitch,
}

impl InMemoryPurchaseRepository {
    /// Create an empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-populated with purchases
    #[must_use]
    pub fn with_purchases(purchases: Vec<Purchase>) -> Self {
        Self {
            purchases: Arc::new(RwLock::new(purchases)),
            failure: FailureSwitch::default(),
        }
    }

    failure_injection!();

    /// Number of stored purchases
    #[must_use]
    pub fn len(&self) -> usize {
        self.purchases.read().unwrap().len()
    }

    /// Whether the repository is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PurchaseRepository for InMemoryPurchaseRepository {
    async fn get_purchases(&self) -> Result<Vec<Purchase>> {
        self.failure.check()?;
        Ok(self.purchases.read().unwrap().clone())
    }

    async fn get_purchase(&self, id: PurchaseId) -> Result<Purchase> {
        self.failure.check()?;
        self.purchases
            .read()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(RepositoryError::not_found("purchase"))
    }

    async fn save_purchase(&self, purchase: Purchase) -> Result<()> {
        self.failure.check()?;
        self.purchases.write().unwrap().push(purchase);
        Ok(())
    }

    async fn update_purchase(&self, purchase: Purchase) -> Result<()> {
        self.failure.check()?;
        let mut purchases = self.purchases.write().unwrap();
        match purchases.iter_mut().find(|p| p.id == purchase.id) {
            Some(existing) => {
                *existing = purchase;
                Ok(())
            },
            None => Err(RepositoryError::not_found("purchase")),
        }
    }

    async fn delete_purchase(&self, id: PurchaseId) -> Result<()> {
        self.failure.check()?;
        let mut purchases = self.purchases.write().unwrap();
        let before = purchases.len();
        purchases.retain(|p| p.id != id);
        if purchases.len() == before {
            return Err(RepositoryError::not_found("purchase"));
        }
        Ok(())
    }
}

/// In-memory [`ClientRepository`]
#[derive(Clone, Debug, Default)]
pub struct InMemoryClientRepository {
    clients: Arc<RwLock<Vec<Client>>>,
    failure: FailureSwitch,
}

impl InMemoryClientRepository {
    /// Create an empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-populated with clients
    #[must_use]
    pub fn with_clients(clients: Vec<Client>) -> Self {
        Self {
            clients: Arc::new(RwLock::new(clients)),
            failure: FailureSwitch::default(),
        }
    }

    failure_injection!();

    /// Number of stored clients
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.read().unwrap().len()
    }

    /// Whether the repository is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ClientRepository for InMemoryClientRepository {
    async fn get_clients(&self) -> Result<Vec<Client>> {
        self.failure.check()?;
        Ok(self.clients.read().unwrap().clone())
    }

    async fn save_client(&self, client: Client) -> Result<()> {
        self.failure.check()?;
        self.clients.write().unwrap().push(client);
        Ok(())
    }

    async fn update_client(&self, client: Client) -> Result<()> {
        self.failure.check()?;
        let mut clients = self.clients.write().unwrap();
        match clients.iter_mut().find(|c| c.id == client.id) {
            Some(existing) => {
                *existing = client;
                Ok(())
            },
            None => Err(RepositoryError::not_found("client")),
        }
    }

    async fn delete_client(&self, id: ClientId) -> Result<()> {
        self.failure.check()?;
        let mut clients = self.clients.write().unwrap();
        let before = clients.len();
        clients.retain(|c| c.id != id);
        if clients.len() == before {
            return Err(RepositoryError::not_found("client"));
        }
        Ok(())
    }
}

/// In-memory [`ProductRepository`]
#[derive(Clone, Debug, Default)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<Vec<Product>>>,
    failure: FailureSwitch,
}

impl InMemoryProductRepository {
    /// Create an empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-populated with products
    #[must_use]
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: Arc::new(RwLock::new(products)),
            failure: FailureSwitch::default(),
        }
    }

    failure_injection!();

    /// Number of stored products
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.read().unwrap().len()
    }

    /// Whether the repository is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a product with this id is stored
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.products.read().unwrap().iter().any(|p| p.id == id)
    }
}

impl ProductRepository for InMemoryProductRepository {
    async fn get_products(&self) -> Result<Vec<Product>> {
        self.failure.check()?;
        Ok(self.products.read().unwrap().clone())
    }

    async fn save_product(&self, product: Product) -> Result<()> {
        self.failure.check()?;
        self.products.write().unwrap().push(product);
        Ok(())
    }

    async fn update_product(&self, product: Product) -> Result<()> {
        self.failure.check()?;
        let mut products = self.products.write().unwrap();
        match products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => {
                *existing = product;
                Ok(())
            },
            None => Err(RepositoryError::not_found("product")),
        }
    }

    async fn delete_product(&self, id: ProductId) -> Result<()> {
        self.failure.check()?;
        let mut products = self.products.write().unwrap();
        let before = products.len();
        products.retain(|p| p.id != id);
        if products.len() == before {
            return Err(RepositoryError::not_found("product"));
        }
        Ok(())
    }
}

/// In-memory [`BusinessInfoRepository`]
#[derive(Clone, Debug, Default)]
pub struct InMemoryBusinessInfoRepository {
    info: Arc<RwLock<Option<BusinessInfo>>>,
    failure: FailureSwitch,
}

impl InMemoryBusinessInfoRepository {
    /// Create an empty repository (first-run state)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository with business info already saved
    #[must_use]
    pub fn with_info(info: BusinessInfo) -> Self {
        Self {
            info: Arc::new(RwLock::new(Some(info))),
            failure: FailureSwitch::default(),
        }
    }

    failure_injection!();

    /// The currently stored info, if any
    #[must_use]
    pub fn stored(&self) -> Option<BusinessInfo> {
        self.info.read().unwrap().clone()
    }
}

impl BusinessInfoRepository for InMemoryBusinessInfoRepository {
    async fn get_business_info(&self) -> Result<Option<BusinessInfo>> {
        self.failure.check()?;
        Ok(self.info.read().unwrap().clone())
    }

    async fn save_business_info(&self, info: BusinessInfo) -> Result<()> {
        self.failure.check()?;
        *self.info.write().unwrap() = Some(info);
        Ok(())
    }
}

/// In-memory [`SessionRepository`]
#[derive(Clone, Debug, Default)]
pub struct InMemorySessionRepository {
    session: Arc<RwLock<Option<UserId>>>,
    failure: FailureSwitch,
}

impl InMemorySessionRepository {
    /// Create an empty session store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session store with a signed-in user
    #[must_use]
    pub fn with_session(user: UserId) -> Self {
        Self {
            session: Arc::new(RwLock::new(Some(user))),
            failure: FailureSwitch::default(),
        }
    }

    failure_injection!();

    /// The currently stored session, if any
    #[must_use]
    pub fn stored(&self) -> Option<UserId> {
        *self.session.read().unwrap()
    }
}

impl SessionRepository for InMemorySessionRepository {
    async fn load_session(&self) -> Result<Option<UserId>> {
        self.failure.check()?;
        Ok(*self.session.read().unwrap())
    }

    async fn store_session(&self, user: UserId) -> Result<()> {
        self.failure.check()?;
        *self.session.write().unwrap() = Some(user);
        Ok(())
    }

    async fn clear_session(&self) -> Result<()> {
        self.failure.check()?;
        *self.session.write().unwrap() = None;
        Ok(())
    }
}

/// Fake [`AuthGateway`] accepting a single known credential pair
#[derive(Clone, Debug)]
pub struct FakeAuthGateway {
    email: String,
    password: String,
    user: UserId,
    failure: FailureSwitch,
}

impl FakeAuthGateway {
    /// Create a gateway that accepts exactly this credential pair
    #[must_use]
    pub fn accepting(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
            user: UserId::new(),
            failure: FailureSwitch::default(),
        }
    }

    failure_injection!();

    /// The user id returned on successful sign-in
    #[must_use]
    pub const fn user(&self) -> UserId {
        self.user
    }
}

impl AuthGateway for FakeAuthGateway {
    async fn sign_in(&self, email: &str, password: &str) -> Result<UserId> {
        self.failure.check()?;
        if email == self.email && password == self.password {
            Ok(self.user)
        } else {
            Err(RepositoryError::backend("invalid credentials"))
        }
    }

    async fn sign_out(&self) -> Result<()> {
        self.failure.check()?;
        Ok(())
    }
}
