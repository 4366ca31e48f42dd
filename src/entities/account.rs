//! Account entity - A holder's balance-bearing identity record.
//!
//! Balances are stored as `i64` minor units (cents). The id is a UUID assigned on insert
//! and never changes. The password column only ever holds an Argon2 PHC string.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Privilege level of an account holder
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular account holder
    #[sea_orm(string_value = "user")]
    User,
    /// May list every account and act on other holders' accounts
    #[sea_orm(string_value = "admin")]
    Admin,
}

/// Account database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    /// Opaque unique identifier, assigned at creation
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Display name of the holder
    pub holder: String,
    /// Phone number used for chat identification, unique when present
    #[sea_orm(unique)]
    pub phone: Option<String>,
    /// Salted Argon2 hash of the password
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Current balance in minor units
    pub balance: i64,
    /// Privilege level
    pub role: Role,
    /// When the account was created
    pub created_at: DateTimeUtc,
    /// Advances on every balance mutation or rename
    pub updated_at: DateTimeUtc,
}

/// Accounts have no navigable relations; ledger entries outlive deleted accounts.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether this holder may act on any account.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
