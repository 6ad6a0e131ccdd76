//! Business (invoicing) information screen.
//!
//! A single record, loaded on `Started` and saved on `SaveTapped`. A missing
//! record is the first-run case and loads as the empty default, not an error.

use tally_core::{Effects, effect::EffectHandler, reducer::Reducer, smallvec};
use tally_domain::records::BusinessInfo;
use tally_domain::repository::BusinessInfoRepository;

/// State of the business info screen
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BusinessInfoState {
    /// The record is being loaded
    pub is_loading: bool,
    /// Business name field
    pub name: String,
    /// Address field
    pub address: String,
    /// Phone field
    pub phone: String,
    /// Email field
    pub email: String,
    /// Tax identifier field
    pub tax_id: String,
    /// A save is in flight
    pub is_saving: bool,
    /// The last save completed
    pub saved_successfully: bool,
    /// Last load/save failure
    pub error: Option<String>,
}

impl BusinessInfoState {
    /// Whether the current fields can be saved: the name is required
    #[must_use]
    pub fn can_save(&self) -> bool {
        !self.name.trim().is_empty()
    }

    fn info(&self) -> BusinessInfo {
        BusinessInfo {
            name: self.name.trim().to_string(),
            address: self.address.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: self.email.trim().to_string(),
            tax_id: self.tax_id.trim().to_string(),
        }
    }

    fn fill(&mut self, info: BusinessInfo) {
        self.name = info.name;
        self.address = info.address;
        self.phone = info.phone;
        self.email = info.email;
        self.tax_id = info.tax_id;
    }
}

/// Inputs to the business info screen
#[derive(Clone, Debug)]
pub enum BusinessInfoMessage {
    /// Screen appeared; load the stored record
    Started,
    /// Load finished; None on first run
    InfoLoaded(Option<BusinessInfo>),
    /// Name field edited
    NameChanged(String),
    /// Address field edited
    AddressChanged(String),
    /// Phone field edited
    PhoneChanged(String),
    /// Email field edited
    EmailChanged(String),
    /// Tax id field edited
    TaxIdChanged(String),
    /// Save tapped
    SaveTapped,
    /// The repository accepted the record
    SaveSucceeded,
    /// Load or save failed
    Failed(String),
}

/// Asynchronous work for the business info screen
#[derive(Clone, Debug, PartialEq)]
pub enum BusinessInfoEffect {
    /// Load the stored record
    LoadInfo,
    /// Persist the record
    SaveInfo(BusinessInfo),
}

/// Reducer for the business info screen
#[derive(Clone, Debug, Default)]
pub struct BusinessInfoReducer;

impl Reducer for BusinessInfoReducer {
    type State = BusinessInfoState;
    type Message = BusinessInfoMessage;
    type Effect = BusinessInfoEffect;

    fn reduce(
        &self,
        state: &mut BusinessInfoState,
        message: BusinessInfoMessage,
    ) -> Effects<BusinessInfoEffect> {
        match message {
            BusinessInfoMessage::Started => {
                if state.is_loading {
                    return Effects::new();
                }
                state.is_loading = true;
                state.error = None;
                smallvec![BusinessInfoEffect::LoadInfo]
            },
            BusinessInfoMessage::InfoLoaded(info) => {
                state.is_loading = false;
                // First run: nothing stored yet, the form stays empty.
                if let Some(info) = info {
                    state.fill(info);
                }
                Effects::new()
            },
            BusinessInfoMessage::NameChanged(name) => {
                state.name = name;
                Effects::new()
            },
            BusinessInfoMessage::AddressChanged(address) => {
                state.address = address;
                Effects::new()
            },
            BusinessInfoMessage::PhoneChanged(phone) => {
                state.phone = phone;
                Effects::new()
            },
            BusinessInfoMessage::EmailChanged(email) => {
                state.email = email;
                Effects::new()
            },
            BusinessInfoMessage::TaxIdChanged(tax_id) => {
                state.tax_id = tax_id;
                Effects::new()
            },
            BusinessInfoMessage::SaveTapped => {
                if state.is_saving || !state.can_save() {
                    return Effects::new();
                }
                state.is_saving = true;
                state.error = None;
                smallvec![BusinessInfoEffect::SaveInfo(state.info())]
            },
            BusinessInfoMessage::SaveSucceeded => {
                state.is_saving = false;
                state.saved_successfully = true;
                Effects::new()
            },
            BusinessInfoMessage::Failed(reason) => {
                state.is_loading = false;
                state.is_saving = false;
                state.error = Some(reason);
                Effects::new()
            },
        }
    }
}

/// Effect handler for the business info screen
pub struct BusinessInfoEffects<B> {
    info: B,
}

impl<B> BusinessInfoEffects<B> {
    /// Create a handler from the injected business info repository
    pub const fn new(info: B) -> Self {
        Self { info }
    }
}

impl<B> EffectHandler for BusinessInfoEffects<B>
where
    B: BusinessInfoRepository + 'static,
{
    type Message = BusinessInfoMessage;
    type Effect = BusinessInfoEffect;

    async fn handle(&self, effect: BusinessInfoEffect) -> Option<BusinessInfoMessage> {
        match effect {
            BusinessInfoEffect::LoadInfo => match self.info.get_business_info().await {
                Ok(info) => Some(BusinessInfoMessage::InfoLoaded(info)),
                Err(error) => Some(BusinessInfoMessage::Failed(error.to_string())),
            },
            BusinessInfoEffect::SaveInfo(info) => match self.info.save_business_info(info).await
            {
                Ok(()) => Some(BusinessInfoMessage::SaveSucceeded),
                Err(error) => Some(BusinessInfoMessage::Failed(error.to_string())),
            },
        }
    }
}
