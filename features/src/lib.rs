//! # Tally Features
//!
//! The feature stores of the Tally accounting application.
//!
//! Every screen is one instance of the same pattern: a `State` struct, a
//! closed `Message` enum, a closed `Effect` enum, a pure `Reducer`, and an
//! `EffectHandler` holding the injected repositories. The platform UI
//! constructs a `tally-runtime` store per screen, dispatches messages from
//! event handlers, and re-renders from the state stream.
//!
//! Conventions shared by all features:
//!
//! - A `Started` message kicks off the screen's initial load; stores never
//!   run effects at construction
//! - Recoverable failures arrive as a `Failed(String)` message and land in
//!   an `error: Option<String>` field, with the loading/saving flag cleared
//! - Validation is a derived `can_save`-style predicate; the reducer
//!   refuses to emit a save effect while the form is invalid or a save is
//!   already in flight
//! - Ids are generated when a form state is constructed, never inside
//!   `reduce`, which keeps reductions deterministic

/// App-level session bootstrap and sign-out
pub mod app;
/// Business identity (invoice header) screen
pub mod business_info;
/// Client create/edit form
pub mod client_form;
/// Client list screen
pub mod clients_list;
/// Email/password sign-in screen
pub mod login;
/// Product create/edit form
pub mod product_form;
/// Product catalog list screen
pub mod products_list;
/// Purchase create/edit form
pub mod purchase_form;
/// Purchase list screen
pub mod purchases_list;
/// Sale detail screen (paid toggle, delete)
pub mod sale_detail;
/// Sale create/edit form with line items
pub mod sale_form;
/// Sales list screen
pub mod sales_list;
/// Revenue/expense statistics screen
pub mod stats;
