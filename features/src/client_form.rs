//! Client create/edit form.

use tally_core::{Effects, effect::EffectHandler, reducer::Reducer, smallvec};
use tally_domain::records::{Client, ClientId};
use tally_domain::repository::ClientRepository;

/// State of the client form
#[derive(Clone, Debug, PartialEq)]
pub struct ClientFormState {
    /// Id the saved client will carry; fixed when the form opens
    pub client_id: ClientId,
    /// Editing an existing client rather than creating one
    pub is_editing: bool,
    /// Name field; the only required one
    pub name: String,
    /// Email field
    pub email: String,
    /// Phone field
    pub phone: String,
    /// Address field
    pub address: String,
    /// A save is in flight
    pub is_saving: bool,
    /// The last save completed
    pub saved_successfully: bool,
    /// Last save failure
    pub error: Option<String>,
}

impl ClientFormState {
    /// Empty form for creating a new client
    #[must_use]
    pub fn new() -> Self {
        Self {
            client_id: ClientId::new(),
            is_editing: false,
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            is_saving: false,
            saved_successfully: false,
            error: None,
        }
    }

    /// Form pre-filled from an existing client
    #[must_use]
    pub fn editing(client: &Client) -> Self {
        Self {
            client_id: client.id,
            is_editing: true,
            name: client.name.clone(),
            email: client.email.clone(),
            phone: client.phone.clone(),
            address: client.address.clone(),
            is_saving: false,
            saved_successfully: false,
            error: None,
        }
    }

    /// Whether the current fields form a valid client
    #[must_use]
    pub fn can_save(&self) -> bool {
        !self.name.trim().is_empty()
    }

    fn client(&self) -> Client {
        Client {
            id: self.client_id,
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
        }
    }
}

impl Default for ClientFormState {
    fn default() -> Self {
        Self::new()
    }
}

/// Inputs to the client form
#[derive(Clone, Debug)]
pub enum ClientFormMessage {
    /// Name field edited
    NameChanged(String),
    /// Email field edited
    EmailChanged(String),
    /// Phone field edited
    PhoneChanged(String),
    /// Address field edited
    AddressChanged(String),
    /// Save tapped
    SaveTapped,
    /// The repository accepted the client
    SaveSucceeded,
    /// The save failed
    Failed(String),
}

/// Asynchronous work for the client form
#[derive(Clone, Debug, PartialEq)]
pub enum ClientFormEffect {
    /// Persist a new client
    SaveClient(Client),
    /// Persist changes to an existing client
    UpdateClient(Client),
}

/// Reducer for the client form
#[derive(Clone, Debug, Default)]
pub struct ClientFormReducer;

impl Reducer for ClientFormReducer {
    type State = ClientFormState;
    type Message = ClientFormMessage;
    type Effect = ClientFormEffect;

    fn reduce(
        &self,
        state: &mut ClientFormState,
        message: ClientFormMessage,
    ) -> Effects<ClientFormEffect> {
        match message {
            ClientFormMessage::NameChanged(name) => {
                state.name = name;
                Effects::new()
            },
            ClientFormMessage::EmailChanged(email) => {
                state.email = email;
                Effects::new()
            },
            ClientFormMessage::PhoneChanged(phone) => {
                state.phone = phone;
                Effects::new()
            },
            ClientFormMessage::AddressChanged(address) => {
                state.address = address;
                Effects::new()
            },
            ClientFormMessage::SaveTapped => {
                if state.is_saving || !state.can_save() {
                    return Effects::new();
                }
                state.is_saving = true;
                state.error = None;
                let client = state.client();
                if state.is_editing {
                    smallvec![ClientFormEffect::UpdateClient(client)]
                } else {
                    smallvec![ClientFormEffect::SaveClient(client)]
                }
            },
            ClientFormMessage::SaveSucceeded => {
                state.is_saving = false;
                state.saved_successfully = true;
                Effects::new()
            },
            ClientFormMessage::Failed(reason) => {
                state.is_saving = false;
                state.error = Some(reason);
                Effects::new()
            },
        }
    }
}

/// Effect handler for the client form
pub struct ClientFormEffects<C> {
    clients: C,
}

impl<C> ClientFormEffects<C> {
    /// Create a handler from the injected client repository
    pub const fn new(clients: C) -> Self {
        Self { clients }
    }
}

impl<C> EffectHandler for ClientFormEffects<C>
where
    C: ClientRepository + 'static,
{
    type Message = ClientFormMessage;
    type Effect = ClientFormEffect;

    async fn handle(&self, effect: ClientFormEffect) -> Option<ClientFormMessage> {
        let result = match effect {
            ClientFormEffect::SaveClient(client) => self.clients.save_client(client).await,
            ClientFormEffect::UpdateClient(client) => self.clients.update_client(client).await,
        };
        match result {
            Ok(()) => Some(ClientFormMessage::SaveSucceeded),
            Err(error) => Some(ClientFormMessage::Failed(error.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tally_runtime::Store;
    use tally_testing::{InMemoryClientRepository, ReducerTest, assertions};

    #[test]
    fn name_is_the_only_required_field() {
        let mut state = ClientFormState::new();
        assert!(!state.can_save());
        state.name = "  Acme  ".to_string();
        assert!(state.can_save());
    }

    #[test]
    fn whitespace_name_cannot_save() {
        ReducerTest::new(ClientFormReducer)
            .given_state(ClientFormState {
                name: "   ".to_string(),
                ..ClientFormState::new()
            })
            .when_message(ClientFormMessage::SaveTapped)
            .then_state(|state| assert!(!state.is_saving))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn save_trims_fields() {
        let state = ClientFormState {
            name: " Acme ".to_string(),
            email: " billing@acme.test ".to_string(),
            ..ClientFormState::new()
        };
        let id = state.client_id;

        ReducerTest::new(ClientFormReducer)
            .given_state(state)
            .when_message(ClientFormMessage::SaveTapped)
            .then_effects(move |effects| {
                assertions::assert_effects_count(effects, 1);
                let ClientFormEffect::SaveClient(client) = &effects[0] else {
                    panic!("expected SaveClient");
                };
                assert_eq!(client.id, id);
                assert_eq!(client.name, "Acme");
                assert_eq!(client.email, "billing@acme.test");
            })
            .run();
    }

    #[tokio::test]
    async fn editing_updates_the_stored_client() {
        let existing = Client {
            id: ClientId::new(),
            name: "Acme".to_string(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
        };
        let repo = InMemoryClientRepository::with_clients(vec![existing.clone()]);
        let store = Store::new(
            ClientFormState::editing(&existing),
            ClientFormReducer,
            ClientFormEffects::new(repo.clone()),
        );

        store
            .dispatch(ClientFormMessage::NameChanged("Acme Corp".to_string()))
            .await
            .unwrap();
        let mut handle = store.dispatch(ClientFormMessage::SaveTapped).await.unwrap();
        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(store.state(|s| s.saved_successfully).await);
        assert_eq!(repo.len(), 1);
    }
}
