//! Sale create/edit form.
//!
//! `Started` loads the product and client catalogs in parallel (plus the sale
//! itself when editing). Lines are managed by index; decrementing a
//! quantity-1 line removes it outright, so a line's quantity is never zero.

use chrono::NaiveDate;
use tally_core::{Effects, effect::EffectHandler, reducer::Reducer, smallvec};
use tally_domain::records::{Client, ClientId, Product, ProductId, Sale, SaleId, SaleLine};
use tally_domain::repository::{ClientRepository, ProductRepository, SaleRepository};

/// State of the sale form
#[derive(Clone, Debug, PartialEq)]
pub struct SaleFormState {
    /// Id the saved sale will carry; fixed when the form opens
    pub sale_id: SaleId,
    /// Editing an existing sale rather than creating one
    pub is_editing: bool,
    /// The product catalog is being loaded
    pub is_loading_products: bool,
    /// The client list is being loaded
    pub is_loading_clients: bool,
    /// The edited sale is being loaded
    pub is_loading_sale: bool,
    /// Product catalog to pick lines from
    pub products: Vec<Product>,
    /// Known clients to pick from
    pub clients: Vec<Client>,
    /// Selected client, if any
    pub client_id: Option<ClientId>,
    /// Client name as it will appear on the sale
    pub client_name: String,
    /// Sale date
    pub date: NaiveDate,
    /// Already paid
    pub paid: bool,
    /// Sale lines
    pub lines: Vec<SaleLine>,
    /// A save is in flight
    pub is_saving: bool,
    /// The last save completed
    pub saved_successfully: bool,
    /// Last load/save failure
    pub error: Option<String>,
}

impl SaleFormState {
    /// Empty form for a new sale, dated `today`
    #[must_use]
    pub fn new(today: NaiveDate) -> Self {
        Self {
            sale_id: SaleId::new(),
            is_editing: false,
            is_loading_products: false,
            is_loading_clients: false,
            is_loading_sale: false,
            products: Vec::new(),
            clients: Vec::new(),
            client_id: None,
            client_name: String::new(),
            date: today,
            paid: false,
            lines: Vec::new(),
            is_saving: false,
            saved_successfully: false,
            error: None,
        }
    }

    /// Form that will edit the sale with this id; fields fill once it loads
    #[must_use]
    pub fn editing(sale_id: SaleId, today: NaiveDate) -> Self {
        Self {
            sale_id,
            is_editing: true,
            ..Self::new(today)
        }
    }

    /// Any load still in flight
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.is_loading_products || self.is_loading_clients || self.is_loading_sale
    }

    /// Sum of all line totals
    #[must_use]
    pub fn total_price(&self) -> f64 {
        self.lines.iter().map(SaleLine::line_total).sum()
    }

    /// Whether the sale can be saved: at least one line
    #[must_use]
    pub fn can_save(&self) -> bool {
        !self.lines.is_empty()
    }

    fn sale(&self) -> Sale {
        Sale {
            id: self.sale_id,
            client_id: self.client_id,
            client_name: self.client_name.trim().to_string(),
            date: self.date,
            lines: self.lines.clone(),
            paid: self.paid,
        }
    }
}

/// Inputs to the sale form
#[derive(Clone, Debug)]
pub enum SaleFormMessage {
    /// Screen appeared; load catalogs (and the sale when editing)
    Started,
    /// Product catalog load finished
    ProductsLoaded(Vec<Product>),
    /// Client list load finished
    ClientsLoaded(Vec<Client>),
    /// The edited sale load finished
    SaleLoaded(Sale),
    /// Client picked from the list (None clears the selection)
    ClientSelected(Option<ClientId>),
    /// Free-text client name edited
    ClientNameChanged(String),
    /// Date picked
    DateChanged(NaiveDate),
    /// Paid switch toggled
    PaidToggled,
    /// Product picked from the catalog; adds or bumps a line
    ProductAdded(ProductId),
    /// Plus tapped on the line at this index
    QuantityIncremented(usize),
    /// Minus tapped on the line at this index
    QuantityDecremented(usize),
    /// Save tapped
    SaveTapped,
    /// The repository accepted the sale
    SaveSucceeded,
    /// A load or the save failed
    Failed(String),
}

/// Asynchronous work for the sale form
#[derive(Clone, Debug, PartialEq)]
pub enum SaleFormEffect {
    /// Load the product catalog
    LoadProducts,
    /// Load the client list
    LoadClients,
    /// Load the sale being edited
    LoadSale(SaleId),
    /// Persist a new sale
    SaveSale(Sale),
    /// Persist changes to an existing sale
    UpdateSale(Sale),
}

/// Reducer for the sale form
#[derive(Clone, Debug, Default)]
pub struct SaleFormReducer;

impl Reducer for SaleFormReducer {
    type State = SaleFormState;
    type Message = SaleFormMessage;
    type Effect = SaleFormEffect;

    #[allow(clippy::too_many_lines)]
    fn reduce(
        &self,
        state: &mut SaleFormState,
        message: SaleFormMessage,
    ) -> Effects<SaleFormEffect> {
        match message {
            SaleFormMessage::Started => {
                if state.is_loading() {
                    return Effects::new();
                }
                state.is_loading_products = true;
                state.is_loading_clients = true;
                state.error = None;
                let mut effects: Effects<SaleFormEffect> =
                    smallvec![SaleFormEffect::LoadProducts, SaleFormEffect::LoadClients];
                if state.is_editing {
                    state.is_loading_sale = true;
                    effects.push(SaleFormEffect::LoadSale(state.sale_id));
                }
                effects
            },
            SaleFormMessage::ProductsLoaded(products) => {
                state.is_loading_products = false;
                state.products = products;
                Effects::new()
            },
            SaleFormMessage::ClientsLoaded(clients) => {
                state.is_loading_clients = false;
                state.clients = clients;
                Effects::new()
            },
            SaleFormMessage::SaleLoaded(sale) => {
                state.is_loading_sale = false;
                state.client_id = sale.client_id;
                state.client_name = sale.client_name;
                state.date = sale.date;
                state.paid = sale.paid;
                state.lines = sale.lines;
                Effects::new()
            },
            SaleFormMessage::ClientSelected(client_id) => {
                state.client_id = client_id;
                state.client_name = client_id
                    .and_then(|id| state.clients.iter().find(|c| c.id == id))
                    .map(|c| c.name.clone())
                    .unwrap_or_default();
                Effects::new()
            },
            SaleFormMessage::ClientNameChanged(name) => {
                state.client_name = name;
                state.client_id = None;
                Effects::new()
            },
            SaleFormMessage::DateChanged(date) => {
                state.date = date;
                Effects::new()
            },
            SaleFormMessage::PaidToggled => {
                state.paid = !state.paid;
                Effects::new()
            },
            SaleFormMessage::ProductAdded(product_id) => {
                if let Some(line) =
                    state.lines.iter_mut().find(|l| l.product_id == product_id)
                {
                    line.quantity += 1;
                } else if let Some(product) =
                    state.products.iter().find(|p| p.id == product_id)
                {
                    state.lines.push(SaleLine {
                        product_id: product.id,
                        name: product.name.clone(),
                        unit_price: product.price,
                        quantity: 1,
                    });
                }
                Effects::new()
            },
            SaleFormMessage::QuantityIncremented(index) => {
                if let Some(line) = state.lines.get_mut(index) {
                    line.quantity += 1;
                }
                Effects::new()
            },
            SaleFormMessage::QuantityDecremented(index) => {
                // Quantity never reaches zero: a quantity-1 line is removed.
                if let Some(line) = state.lines.get_mut(index) {
                    if line.quantity > 1 {
                        line.quantity -= 1;
                    } else {
                        state.lines.remove(index);
                    }
                }
                Effects::new()
            },
            SaleFormMessage::SaveTapped => {
                if state.is_saving || !state.can_save() {
                    return Effects::new();
                }
                state.is_saving = true;
                state.error = None;
                let sale = state.sale();
                if state.is_editing {
                    smallvec![SaleFormEffect::UpdateSale(sale)]
                } else {
                    smallvec![SaleFormEffect::SaveSale(sale)]
                }
            },
            SaleFormMessage::SaveSucceeded => {
                state.is_saving = false;
                state.saved_successfully = true;
                Effects::new()
            },
            SaleFormMessage::Failed(reason) => {
                state.is_loading_products = false;
                state.is_loading_clients = false;
                state.is_loading_sale = false;
                state.is_saving = false;
                state.error = Some(reason);
                Effects::new()
            },
        }
    }
}

/// Effect handler for the sale form
pub struct SaleFormEffects<S, P, C> {
    sales: S,
    products: P,
    clients: C,
}

impl<S, P, C> SaleFormEffects<S, P, C> {
    /// Create a handler from the injected repositories
    pub const fn new(sales: S, products: P, clients: C) -> Self {
        Self {
            sales,
            products,
            clients,
        }
    }
}

impl<S, P, C> EffectHandler for SaleFormEffects<S, P, C>
where
    S: SaleRepository + 'static,
    P: ProductRepository + 'static,
    C: ClientRepository + 'static,
{
    type Message = SaleFormMessage;
    type Effect = SaleFormEffect;

    async fn handle(&self, effect: SaleFormEffect) -> Option<SaleFormMessage> {
        match effect {
            SaleFormEffect::LoadProducts => match self.products.get_products().await {
                Ok(products) => Some(SaleFormMessage::ProductsLoaded(products)),
                Err(error) => Some(SaleFormMessage::Failed(error.to_string())),
            },
            SaleFormEffect::LoadClients => match self.clients.get_clients().await {
                Ok(clients) => Some(SaleFormMessage::ClientsLoaded(clients)),
                Err(error) => Some(SaleFormMessage::Failed(error.to_string())),
            },
            SaleFormEffect::LoadSale(id) => match self.sales.get_sale(id).await {
                Ok(sale) => Some(SaleFormMessage::SaleLoaded(sale)),
                Err(error) => Some(SaleFormMessage::Failed(error.to_string())),
            },
            SaleFormEffect::SaveSale(sale) => match self.sales.save_sale(sale).await {
                Ok(()) => Some(SaleFormMessage::SaveSucceeded),
                Err(error) => {
                    tracing::warn!(error = %error, "saving sale failed");
                    Some(SaleFormMessage::Failed(error.to_string()))
                },
            },
            SaleFormEffect::UpdateSale(sale) => match self.sales.update_sale(sale).await {
                Ok(()) => Some(SaleFormMessage::SaveSucceeded),
                Err(error) => Some(SaleFormMessage::Failed(error.to_string())),
            },
        }
    }
}
