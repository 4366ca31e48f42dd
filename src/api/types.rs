//! JSON bodies. Field names are part of the public contract, so they are documented by
//! the route table rather than per field.
#![allow(missing_docs)]

use crate::{
    core::money::to_major_units,
    entities::{Role, account, ledger_entry},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `POST /create`
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub user_name: String,
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Opening balance in major units
    #[serde(default)]
    pub initial_balance: f64,
}

/// `POST /login`
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Holder name or phone number
    pub user_name: String,
    pub password: String,
}

/// Answer to `/create` and `/login`
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_name: String,
    pub account_id: Uuid,
    pub token: String,
}

/// Answer to `/create`: the new account plus a token, so the client is logged in.
#[derive(Debug, Serialize)]
pub struct CreateAccountResponse {
    pub account: AccountResponse,
    #[serde(flatten)]
    pub login: LoginResponse,
}

/// `GET /account/name`
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub account_holder: String,
}

/// `PUT /account/:id/name`
#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub account_holder: String,
}

/// `POST /account/deposit`
#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    /// Major units
    pub amount: f64,
    /// Target account; defaults to the caller. Only admins may name another account.
    #[serde(default)]
    pub account_id: Option<Uuid>,
}

/// `POST /account/transfer`
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub to_account_id: Uuid,
    /// Major units
    pub amount: f64,
}

/// An account as shown to clients. Never includes the password hash.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub account_holder: String,
    pub phone: Option<String>,
    pub balance: f64,
    pub balance_minor: i64,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<account::Model> for AccountResponse {
    fn from(model: account::Model) -> Self {
        Self {
            id: model.id,
            account_holder: model.holder,
            phone: model.phone,
            balance: to_major_units(model.balance),
            balance_minor: model.balance,
            role: model.role,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LedgerEntryResponse {
    pub id: i64,
    pub from_account: Uuid,
    pub to_account: Uuid,
    pub from_holder: String,
    pub to_holder: String,
    pub amount: f64,
    pub amount_minor: i64,
    pub timestamp: DateTime<Utc>,
}

impl From<ledger_entry::Model> for LedgerEntryResponse {
    fn from(entry: ledger_entry::Model) -> Self {
        Self {
            id: entry.id,
            from_account: entry.from_account,
            to_account: entry.to_account,
            from_holder: entry.from_holder,
            to_holder: entry.to_holder,
            amount: to_major_units(entry.amount),
            amount_minor: entry.amount,
            timestamp: entry.timestamp,
        }
    }
}

/// `GET /account/balance`
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub account_id: Uuid,
    pub balance: f64,
    pub balance_minor: i64,
    /// Transfers received by the caller, newest first
    pub incoming: Vec<LedgerEntryResponse>,
}

/// `POST /chat`
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Twilio webhook form fields we use
#[derive(Debug, Deserialize)]
pub struct WhatsAppForm {
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "Body", default)]
    pub body: String,
}
