//! pbx-dao: data access for a PBX configuration database.
//!
//! The crate exposes one module per configuration entity under
//! [`resources`], a generic search engine and criteria lookups under
//! [`query`], and the reconciliation passes under [`fixes`] that keep cached
//! fields (line names and numbers, endpoint caller ids, queue member
//! interfaces, trunk contexts) consistent after a change.
//!
//! Every operation takes an explicit `&rusqlite::Connection`; a
//! `rusqlite::Transaction` can be passed wherever a connection is expected.
//! [`store::database::Database::session`] wraps a unit of work in a
//! transaction.

pub mod config;
pub mod errors;
pub mod fixes;
pub mod models;
pub mod query;
pub mod resources;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{DaoError, DaoResult};
