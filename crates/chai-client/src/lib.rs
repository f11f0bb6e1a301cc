//! HTTP menu service for the Chai admin console
//!
//! [`HttpMenuService`] fetches the permission node list from the console API
//! and plugs into [`chai_router::MenuStore`] as its menu-fetch collaborator.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod api_client;

pub use api_client::{ApiEnvelope, HttpMenuService};
