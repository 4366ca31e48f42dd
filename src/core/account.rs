//! Account store - creation, lookup, rename, delete and deposit of account records.
//!
//! Balances are never written generically. Deposits go through [`deposit`] and transfers
//! through [`crate::core::ledger::transfer_amount`]; both run inside a database transaction.
//! Authorization (who may list or delete) is the caller's job, not this module's.

use crate::{
    auth::password::hash_password_blocking,
    core::money::ensure_positive,
    entities::{Account, Role, account},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{
    Condition, QueryOrder, Set, TransactionTrait,
    prelude::*,
    sea_query::{Expr, Func},
};
use tracing::{debug, info, instrument};

/// Input for [`create_account`]
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Display name of the holder
    pub holder: String,
    /// Plaintext password, hashed before storage
    pub password: String,
    /// Opening balance in minor units
    pub initial_balance: i64,
    /// Optional phone number used for chat identification
    pub phone: Option<String>,
    /// Privilege level
    pub role: Role,
}

impl NewAccount {
    /// A plain user account with no phone number.
    #[must_use]
    pub fn user(
        holder: impl Into<String>,
        password: impl Into<String>,
        initial_balance: i64,
    ) -> Self {
        Self {
            holder: holder.into(),
            password: password.into(),
            initial_balance,
            phone: None,
            role: Role::User,
        }
    }
}

pub(crate) fn not_found(id: impl ToString) -> Error {
    Error::AccountNotFound { id: id.to_string() }
}

fn normalize_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput {
            message: "Account holder name cannot be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Creates an account, hashing the password and assigning a fresh id.
///
/// The holder name is trimmed and must not be empty; a blank phone is stored as `None`.
/// The opening balance may be zero but not negative.
#[instrument(skip(db, new_account), fields(holder = %new_account.holder))]
pub async fn create_account(
    db: &DatabaseConnection,
    new_account: NewAccount,
) -> Result<account::Model> {
    let holder = normalize_name(&new_account.holder)?;

    if new_account.password.is_empty() {
        return Err(Error::InvalidInput {
            message: "Password cannot be empty".to_string(),
        });
    }

    if new_account.initial_balance < 0 {
        return Err(Error::InvalidAmount {
            amount: crate::core::money::format_minor_units(new_account.initial_balance),
        });
    }

    let phone = new_account
        .phone
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());

    let password_hash = hash_password_blocking(new_account.password).await?;

    let now = Utc::now();
    let model = account::ActiveModel {
        id: Set(Uuid::new_v4()),
        holder: Set(holder),
        phone: Set(phone),
        password_hash: Set(password_hash),
        balance: Set(new_account.initial_balance),
        role: Set(new_account.role),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let created = model.insert(db).await?;
    debug!(account_id = %created.id, "Account created");
    Ok(created)
}

/// Finds an account by its id.
pub async fn get_account_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<account::Model>> {
    Account::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Finds an account by exact phone number.
pub async fn get_account_by_phone(
    db: &DatabaseConnection,
    phone: &str,
) -> Result<Option<account::Model>> {
    Account::find()
        .filter(account::Column::Phone.eq(phone.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Case-insensitive substring search over holder name or phone, ordered by holder.
///
/// Returns an empty list when nothing matches or the query is blank.
pub async fn search_accounts(db: &DatabaseConnection, query: &str) -> Result<Vec<account::Model>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    // SQLite LIKE is case-insensitive for ASCII
    Account::find()
        .filter(
            Condition::any()
                .add(account::Column::Holder.contains(query))
                .add(account::Column::Phone.contains(query)),
        )
        .order_by_asc(account::Column::Holder)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Accounts a login name may refer to: exact holder name (ignoring ASCII case) or exact
/// phone number. Several holders may share a name; the caller checks each password.
pub async fn find_login_candidates(
    db: &DatabaseConnection,
    login: &str,
) -> Result<Vec<account::Model>> {
    let login = login.trim();
    if login.is_empty() {
        return Ok(Vec::new());
    }

    Account::find()
        .filter(
            Condition::any()
                .add(
                    Expr::expr(Func::lower(Expr::col(account::Column::Holder)))
                        .eq(login.to_lowercase()),
                )
                .add(account::Column::Phone.eq(login)),
        )
        .order_by_asc(account::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Makes sure an admin account named `holder` exists, creating it with `password` if not.
///
/// Used at startup to bootstrap the first administrator. An existing admin keeps its
/// current password.
#[instrument(skip(db, password))]
pub async fn ensure_admin(
    db: &DatabaseConnection,
    holder: &str,
    password: &str,
) -> Result<account::Model> {
    let holder = normalize_name(holder)?;

    let existing = Account::find()
        .filter(account::Column::Holder.eq(holder.as_str()))
        .filter(account::Column::Role.eq(Role::Admin))
        .one(db)
        .await?;

    if let Some(admin) = existing {
        debug!(account_id = %admin.id, "Admin account already present");
        return Ok(admin);
    }

    let mut new_account = NewAccount::user(holder, password, 0);
    new_account.role = Role::Admin;
    let admin = create_account(db, new_account).await?;
    info!(account_id = %admin.id, "Bootstrapped admin account");
    Ok(admin)
}

/// Lists every account. Callers must restrict this to admins.
pub async fn list_accounts(db: &DatabaseConnection) -> Result<Vec<account::Model>> {
    Account::find().all(db).await.map_err(Into::into)
}

/// Permanently deletes an account. Ledger entries that reference it are kept.
#[instrument(skip(db))]
pub async fn delete_account(db: &DatabaseConnection, id: Uuid) -> Result<()> {
    let result = Account::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(not_found(id));
    }
    debug!("Account deleted");
    Ok(())
}

/// Changes the holder name, returning the stored (trimmed) name.
///
/// Existing ledger entries keep the name that was current when they were written.
#[instrument(skip(db))]
pub async fn rename_account(db: &DatabaseConnection, id: Uuid, new_holder: &str) -> Result<String> {
    let holder = normalize_name(new_holder)?;

    let result = Account::update_many()
        .col_expr(account::Column::Holder, Expr::value(holder.clone()))
        .col_expr(account::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(account::Column::Id.eq(id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(not_found(id));
    }
    Ok(holder)
}

/// Adds `amount` minor units to an account inside a database transaction.
///
/// This performs an atomic `balance = balance + amount` update rather than writing back a
/// value read earlier, so concurrent deposits and transfers cannot lose updates.
///
/// # Returns
/// The account as it stands after the deposit
#[instrument(skip(db))]
pub async fn deposit(db: &DatabaseConnection, id: Uuid, amount: i64) -> Result<account::Model> {
    ensure_positive(amount)?;

    let txn = db.begin().await?;

    let current = Account::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| not_found(id))?;

    if current.balance.checked_add(amount).is_none() {
        return Err(Error::InvalidAmount {
            amount: crate::core::money::format_minor_units(amount),
        });
    }

    let result = Account::update_many()
        .col_expr(
            account::Column::Balance,
            Expr::col(account::Column::Balance).add(amount),
        )
        .col_expr(account::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(account::Column::Id.eq(id))
        .exec(&txn)
        .await?;

    if result.rows_affected == 0 {
        return Err(not_found(id));
    }

    let updated = Account::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| not_found(id))?;

    txn.commit().await?;
    Ok(updated)
}
