//! Clients list screen.

use tally_core::{Effects, effect::EffectHandler, reducer::Reducer, smallvec};
use tally_domain::records::{Client, ClientId};
use tally_domain::repository::ClientRepository;

/// State of the clients list screen
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClientsListState {
    /// The list is being (re)loaded
    pub is_loading: bool,
    /// Loaded clients
    pub clients: Vec<Client>,
    /// Last load/delete failure
    pub error: Option<String>,
}

/// Inputs to the clients list screen
#[derive(Clone, Debug)]
pub enum ClientsListMessage {
    /// Screen appeared; load the list
    Started,
    /// Load finished
    ClientsLoaded(Vec<Client>),
    /// Delete swiped on a row
    DeleteTapped(ClientId),
    /// Delete finished; remove the row
    ClientDeleted(ClientId),
    /// Load or delete failed
    Failed(String),
}

/// Asynchronous work for the clients list screen
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientsListEffect {
    /// Load every client
    LoadClients,
    /// Delete one client
    DeleteClient(ClientId),
}

/// Reducer for the clients list screen
#[derive(Clone, Debug, Default)]
pub struct ClientsListReducer;

impl Reducer for ClientsListReducer {
    type State = ClientsListState;
    type Message = ClientsListMessage;
    type Effect = ClientsListEffect;

    fn reduce(
        &self,
        state: &mut ClientsListState,
        message: ClientsListMessage,
    ) -> Effects<ClientsListEffect> {
        match message {
            ClientsListMessage::Started => {
                if state.is_loading {
                    return Effects::new();
                }
                state.is_loading = true;
                state.error = None;
                smallvec![ClientsListEffect::LoadClients]
            },
            ClientsListMessage::ClientsLoaded(clients) => {
                state.is_loading = false;
                state.clients = clients;
                Effects::new()
            },
            ClientsListMessage::DeleteTapped(id) => {
                if state.is_loading {
                    return Effects::new();
                }
                smallvec![ClientsListEffect::DeleteClient(id)]
            },
            ClientsListMessage::ClientDeleted(id) => {
                state.clients.retain(|client| client.id != id);
                Effects::new()
            },
            ClientsListMessage::Failed(reason) => {
                state.is_loading = false;
                state.error = Some(reason);
                Effects::new()
            },
        }
    }
}

/// Effect handler for the clients list screen
pub struct ClientsListEffects<C> {
    clients: C,
}

impl<C> ClientsListEffects<C> {
    /// Create a handler from the injected client repository
    pub const fn new(clients: C) -> Self {
        Self { clients }
    }
}

impl<C> EffectHandler for ClientsListEffects<C>
where
    C: ClientRepository + 'static,
{
    type Message = ClientsListMessage;
    type Effect = ClientsListEffect;

    async fn handle(&self, effect: ClientsListEffect) -> Option<ClientsListMessage> {
        match effect {
            ClientsListEffect::LoadClients => match self.clients.get_clients().await {
                Ok(clients) => Some(ClientsListMessage::ClientsLoaded(clients)),
                Err(error) => Some(ClientsListMessage::Failed(error.to_string())),
            },
            ClientsListEffect::DeleteClient(id) => match self.clients.delete_client(id).await {
                Ok(()) => Some(ClientsListMessage::ClientDeleted(id)),
                Err(error) => Some(ClientsListMessage::Failed(error.to_string())),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tally_runtime::Store;
    use tally_testing::{InMemoryClientRepository, ReducerTest, assertions};

    fn client(name: &str) -> Client {
        Client {
            id: ClientId::new(),
            name: name.to_string(),
            email: format!("{}@example.test", name.to_lowercase()),
            phone: "0600000000".to_string(),
            address: "1 Main St".to_string(),
        }
    }

    #[test]
    fn started_requests_load() {
        ReducerTest::new(ClientsListReducer)
            .given_state(ClientsListState::default())
            .when_message(ClientsListMessage::Started)
            .then_state(|state| assert!(state.is_loading))
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assert_eq!(effects[0], ClientsListEffect::LoadClients);
            })
            .run();
    }

    #[test]
    fn deleted_client_is_removed() {
        let keep = client("Acme");
        let gone = client("Bobco");
        let gone_id = gone.id;

        ReducerTest::new(ClientsListReducer)
            .given_state(ClientsListState {
                clients: vec![keep, gone],
                ..ClientsListState::default()
            })
            .when_message(ClientsListMessage::ClientDeleted(gone_id))
            .then_state(|state| {
                assert_eq!(state.clients.len(), 1);
                assert_eq!(state.clients[0].name, "Acme");
            })
            .run();
    }

    #[tokio::test]
    async fn load_failure_sets_error() {
        let repo = InMemoryClientRepository::new();
        repo.fail_with("permission denied");
        let store = Store::new(
            ClientsListState::default(),
            ClientsListReducer,
            ClientsListEffects::new(repo),
        );

        let mut handle = store.dispatch(ClientsListMessage::Started).await.unwrap();
        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let state = store.state(|s| s.clone()).await;
        assert_eq!(state.error.as_deref(), Some("permission denied"));
        assert!(state.clients.is_empty());
    }
}
