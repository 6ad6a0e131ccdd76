//! Product catalog list screen.

use tally_core::{Effects, effect::EffectHandler, reducer::Reducer, smallvec};
use tally_domain::records::{Product, ProductId};
use tally_domain::repository::ProductRepository;

/// State of the product catalog screen
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductsListState {
    /// The list is being (re)loaded
    pub is_loading: bool,
    /// Loaded products
    pub products: Vec<Product>,
    /// Last load/delete failure
    pub error: Option<String>,
}

/// Inputs to the product catalog screen
#[derive(Clone, Debug)]
pub enum ProductsListMessage {
    /// Screen appeared; load the catalog
    Started,
    /// Load finished
    ProductsLoaded(Vec<Product>),
    /// Delete swiped on a row
    DeleteTapped(ProductId),
    /// Delete finished; remove the row
    ProductDeleted(ProductId),
    /// Load or delete failed
    Failed(String),
}

/// Asynchronous work for the product catalog screen
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProductsListEffect {
    /// Load every product
    LoadProducts,
    /// Delete one product
    DeleteProduct(ProductId),
}

/// Reducer for the product catalog screen
#[derive(Clone, Debug, Default)]
pub struct ProductsListReducer;

impl Reducer for ProductsListReducer {
    type State = ProductsListState;
    type Message = ProductsListMessage;
    type Effect = ProductsListEffect;

    fn reduce(
        &self,
        state: &mut ProductsListState,
        message: ProductsListMessage,
    ) -> Effects<ProductsListEffect> {
        match message {
            ProductsListMessage::Started => {
                if state.is_loading {
                    return Effects::new();
                }
                state.is_loading = true;
                state.error = None;
                smallvec![ProductsListEffect::LoadProducts]
            },
            ProductsListMessage::ProductsLoaded(products) => {
                state.is_loading = false;
                state.products = products;
                Effects::new()
            },
            ProductsListMessage::DeleteTapped(id) => {
                if state.is_loading {
                    return Effects::new();
                }
                smallvec![ProductsListEffect::DeleteProduct(id)]
            },
            ProductsListMessage::ProductDeleted(id) => {
                state.products.retain(|product| product.id != id);
                Effects::new()
            },
            ProductsListMessage::Failed(reason) => {
                state.is_loading = false;
                state.error = Some(reason);
                Effects::new()
            },
        }
    }
}

/// Effect handler for the product catalog screen
pub struct ProductsListEffects<P> {
    products: P,
}

impl<P> ProductsListEffects<P> {
    /// Create a handler from the injected product repository
    pub const fn new(products: P) -> Self {
        Self { products }
    }
}

impl<P> EffectHandler for ProductsListEffects<P>
where
    P: ProductRepository + 'static,
{
    type Message = ProductsListMessage;
    type Effect = ProductsListEffect;

    async fn handle(&self, effect: ProductsListEffect) -> Option<ProductsListMessage> {
        match effect {
            ProductsListEffect::LoadProducts => match self.products.get_products().await {
                Ok(products) => Some(ProductsListMessage::ProductsLoaded(products)),
                Err(error) => Some(ProductsListMessage::Failed(error.to_string())),
            },
            ProductsListEffect::DeleteProduct(id) => {
                match self.products.delete_product(id).await {
                    Ok(()) => Some(ProductsListMessage::ProductDeleted(id)),
                    Err(error) => Some(ProductsListMessage::Failed(error.to_string())),
                }
            },
        }
    }
}
