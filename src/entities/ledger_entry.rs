//! Ledger entry entity - Immutable record of one completed transfer.
//!
//! Entries are only ever inserted by `core::ledger::transfer_amount`. The holder names are a
//! snapshot taken inside the transfer and are not updated when an account is later renamed.
//! There is deliberately no foreign key to `accounts`: history survives a hard delete.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ledger entry database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    /// Unique identifier, also the commit-order tie-break
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Debited account
    #[sea_orm(indexed)]
    pub from_account: Uuid,
    /// Credited account
    #[sea_orm(indexed)]
    pub to_account: Uuid,
    /// Amount moved, in minor units, always positive
    pub amount: i64,
    /// When the transfer committed
    pub timestamp: DateTimeUtc,
    /// Sender display name at transfer time
    pub from_holder: String,
    /// Receiver display name at transfer time
    pub to_holder: String,
}

/// `LedgerEntry` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether `account_id` is the debited side of this entry.
    #[must_use]
    pub fn is_outgoing_for(&self, account_id: Uuid) -> bool {
        self.from_account == account_id
    }
}
