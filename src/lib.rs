//! Support desk console client.
//!
//! Role-gated admin and agent views over tickets, calls, users, agents and
//! notes, backed by the support REST API. Reads go through a shared
//! [`query::QueryCache`]; writes go through [`mutation::MutationDispatcher`],
//! which invalidates cache keys and queues user notifications.

pub mod api;
pub mod error;
pub mod mutation;
pub mod notification;
pub mod query;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;
pub mod types;
pub mod util;
pub mod views;
