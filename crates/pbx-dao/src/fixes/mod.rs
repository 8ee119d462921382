//! Reconciliation of denormalized columns.
//!
//! Several tables cache values owned by another table: a line caches its
//! endpoint's name and its extension's number, queue members cache the dial
//! interface of their user's main line, endpoints cache the line context and
//! the main user's caller id. Each `*Fixes::fix` call recomputes those values
//! for one aggregate inside a savepoint, so it either applies completely or
//! not at all, and running it twice changes nothing the second time.

mod line;
mod queue_member;
mod trunk;
mod user;

pub use line::LineFixes;
pub use queue_member::QueueMemberFixes;
pub use trunk::TrunkFixes;
pub use user::UserFixes;
