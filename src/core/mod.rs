//! Core business logic - framework-agnostic account, ledger and history operations.
//!
//! Nothing in here knows about HTTP, chat or tokens. Every function takes the shared
//! `DatabaseConnection` by reference and returns [`crate::errors::Result`].

/// Account store: create, look up, rename, delete, deposit
pub mod account;
/// Read-side projections: history, most recent entry, balance
pub mod history;
/// Transfer engine: atomic debit + credit + ledger entry
pub mod ledger;
/// Minor-unit conversions used at the API boundary
pub mod money;
