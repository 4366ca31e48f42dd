//! Transfer engine - the only path by which money moves between two accounts.
//!
//! A transfer debits one account, credits another and appends one immutable ledger entry,
//! all inside a single database transaction. Either every write commits or none does.
//!
//! The debit is a guarded `balance = balance - amount WHERE balance >= amount` update, so a
//! concurrent transfer that drained the account after our read cannot push it negative: it
//! shows up as zero affected rows and the transfer fails with `InsufficientFunds`.
//! Lock contention reported by the store is retried a bounded number of times.

use crate::{
    core::{account::not_found, money::ensure_positive},
    entities::{Account, account, ledger_entry},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Set, TransactionTrait, prelude::*, sea_query::Expr};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Attempts made before a conflicting transfer is surfaced as a storage error
pub const MAX_TRANSFER_ATTEMPTS: u32 = 3;

const RETRY_BACKOFF: Duration = Duration::from_millis(25);

/// Moves `amount` minor units from `from_id` to `to_id` and records the ledger entry.
///
/// # Errors
/// * `InvalidAmount` - `amount` is not strictly positive
/// * `InvalidTransfer` - source and destination are the same account
/// * `AccountNotFound` - either account does not exist
/// * `InsufficientFunds` - the source balance is below `amount` at commit time
/// * `Storage` - the store kept reporting write conflicts
///
/// Dropping the returned future before it completes rolls the transaction back.
#[instrument(skip(db))]
pub async fn transfer_amount(
    db: &DatabaseConnection,
    from_id: Uuid,
    to_id: Uuid,
    amount: i64,
) -> Result<ledger_entry::Model> {
    ensure_positive(amount)?;

    if from_id == to_id {
        return Err(Error::InvalidTransfer {
            reason: "cannot transfer to the same account".to_string(),
        });
    }

    let mut attempt = 1;
    loop {
        match try_transfer(db, from_id, to_id, amount).await {
            Err(err) if err.is_conflict() => {
                if attempt >= MAX_TRANSFER_ATTEMPTS {
                    return Err(Error::Storage {
                        message: format!(
                            "transfer abandoned after {attempt} conflicting attempts: {err}"
                        ),
                    });
                }
                warn!(attempt, "Transfer hit a write conflict, retrying");
                tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}

/// One attempt at the atomic unit. Any early return drops `txn`, which rolls it back.
async fn try_transfer(
    db: &DatabaseConnection,
    from_id: Uuid,
    to_id: Uuid,
    amount: i64,
) -> Result<ledger_entry::Model> {
    let txn = db.begin().await?;

    let from_account = Account::find_by_id(from_id)
        .one(&txn)
        .await?
        .ok_or_else(|| not_found(from_id))?;

    if from_account.balance < amount {
        return Err(Error::InsufficientFunds {
            current: from_account.balance,
            required: amount,
        });
    }

    let to_account = Account::find_by_id(to_id)
        .one(&txn)
        .await?
        .ok_or_else(|| not_found(to_id))?;

    if to_account.balance.checked_add(amount).is_none() {
        return Err(Error::InvalidAmount {
            amount: crate::core::money::format_minor_units(amount),
        });
    }

    let now = Utc::now();

    let debited = Account::update_many()
        .col_expr(
            account::Column::Balance,
            Expr::col(account::Column::Balance).sub(amount),
        )
        .col_expr(account::Column::UpdatedAt, Expr::value(now))
        .filter(account::Column::Id.eq(from_id))
        .filter(account::Column::Balance.gte(amount))
        .exec(&txn)
        .await?;

    if debited.rows_affected == 0 {
        // Someone else spent the money between our read and the debit
        return Err(Error::InsufficientFunds {
            current: from_account.balance,
            required: amount,
        });
    }

    let credited = Account::update_many()
        .col_expr(
            account::Column::Balance,
            Expr::col(account::Column::Balance).add(amount),
        )
        .col_expr(account::Column::UpdatedAt, Expr::value(now))
        .filter(account::Column::Id.eq(to_id))
        .exec(&txn)
        .await?;

    if credited.rows_affected == 0 {
        return Err(not_found(to_id));
    }

    let entry = ledger_entry::ActiveModel {
        from_account: Set(from_id),
        to_account: Set(to_id),
        amount: Set(amount),
        timestamp: Set(now),
        from_holder: Set(from_account.holder),
        to_holder: Set(to_account.holder),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    debug!(entry_id = entry.id, "Transfer committed");
    Ok(entry)
}
