//! Entity module - Contains all SeaORM entity definitions for the database.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod account;
pub mod ledger_entry;

pub use account::{Column as AccountColumn, Entity as Account, Model as AccountModel, Role};
pub use ledger_entry::{
    Column as LedgerEntryColumn, Entity as LedgerEntry, Model as LedgerEntryModel,
};
