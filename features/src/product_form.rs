//! Product create/edit form.
//!
//! Field edits are plain text; validation happens in [`ProductFormState::can_save`]
//! and the price is only parsed once, at save time. The same form serves both
//! creation and editing, switched by `is_editing`.

use tally_core::{Effects, effect::EffectHandler, reducer::Reducer, smallvec};
use tally_domain::records::{Product, ProductId};
use tally_domain::repository::ProductRepository;

/// State of the product form
#[derive(Clone, Debug, PartialEq)]
pub struct ProductFormState {
    /// Id the saved product will carry; fixed when the form opens
    pub product_id: ProductId,
    /// Editing an existing product rather than creating one
    pub is_editing: bool,
    /// Product name field
    pub name: String,
    /// Price field, kept as entered until save time
    pub price: String,
    /// A save is in flight
    pub is_saving: bool,
    /// The last save completed
    pub saved_successfully: bool,
    /// Last save failure
    pub error: Option<String>,
}

impl ProductFormState {
    /// Empty form for creating a new product
    #[must_use]
    pub fn new() -> Self {
        Self {
            product_id: ProductId::new(),
            is_editing: false,
            name: String::new(),
            price: String::new(),
            is_saving: false,
            saved_successfully: false,
            error: None,
        }
    }

    /// Form pre-filled from an existing product
    #[must_use]
    pub fn editing(product: &Product) -> Self {
        Self {
            product_id: product.id,
            is_editing: true,
            name: product.name.clone(),
            price: product.price.to_string(),
            is_saving: false,
            saved_successfully: false,
            error: None,
        }
    }

    /// Whether the current fields form a valid product
    #[must_use]
    pub fn can_save(&self) -> bool {
        !self.name.trim().is_empty() && parse_price(&self.price).is_some()
    }
}

impl Default for ProductFormState {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_price(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|p| *p >= 0.0)
}

/// Inputs to the product form
#[derive(Clone, Debug)]
pub enum ProductFormMessage {
    /// Name field edited
    NameChanged(String),
    /// Price field edited
    PriceChanged(String),
    /// Save tapped
    SaveTapped,
    /// The repository accepted the product
    SaveSucceeded,
    /// The save failed
    Failed(String),
}

/// Asynchronous work for the product form
#[derive(Clone, Debug, PartialEq)]
pub enum ProductFormEffect {
    /// Persist a new product
    SaveProduct(Product),
    /// Persist changes to an existing product
    UpdateProduct(Product),
}

/// Reducer for the product form
#[derive(Clone, Debug, Default)]
pub struct ProductFormReducer;

impl Reducer for ProductFormReducer {
    type State = ProductFormState;
    type Message = ProductFormMessage;
    type Effect = ProductFormEffect;

    fn reduce(
        &self,
        state: &mut ProductFormState,
        message: ProductFormMessage,
    ) -> Effects<ProductFormEffect> {
        match message {
            ProductFormMessage::NameChanged(name) => {
                state.name = name;
                Effects::new()
            },
            ProductFormMessage::PriceChanged(price) => {
                state.price = price;
                Effects::new()
            },
            ProductFormMessage::SaveTapped => {
                // A second tap while saving must not produce a second write.
                if state.is_saving || !state.can_save() {
                    return Effects::new();
                }
                let Some(price) = parse_price(&state.price) else {
                    return Effects::new();
                };
                state.is_saving = true;
                state.error = None;
                let product = Product {
                    id: state.product_id,
                    name: state.name.trim().to_string(),
                    price,
                };
                if state.is_editing {
                    smallvec![ProductFormEffect::UpdateProduct(product)]
                } else {
                    smallvec![ProductFormEffect::SaveProduct(product)]
                }
            },
            ProductFormMessage::SaveSucceeded => {
                state.is_saving = false;
                state.saved_successfully = true;
                Effects::new()
            },
            ProductFormMessage::Failed(reason) => {
                state.is_saving = false;
                state.error = Some(reason);
                Effects::new()
            },
        }
    }
}

/// Effect handler for the product form
pub struct ProductFormEffects<P> {
    products: P,
}

impl<P> ProductFormEffects<P> {
    /// Create a handler from the injected product repository
    pub const fn new(products: P) -> Self {
        Self { products }
    }
}

impl<P> EffectHandler for ProductFormEffects<P>
where
    P: ProductRepository + 'static,
{
    type Message = ProductFormMessage;
    type Effect = ProductFormEffect;

    async fn handle(&self, effect: ProductFormEffect) -> Option<ProductFormMessage> {
        let result = match effect {
            ProductFormEffect::SaveProduct(product) => self.products.save_product(product).await,
            ProductFormEffect::UpdateProduct(product) => {
                self.products.update_product(product).await
            },
        };
        match result {
            Ok(()) => Some(ProductFormMessage::SaveSucceeded),
            Err(error) => {
                tracing::warn!(error = %error, "saving product failed");
                Some(ProductFormMessage::Failed(error.to_string()))
            },
        }
    }
}
