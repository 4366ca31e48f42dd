//! Read-side projections over the ledger and account balances.
//!
//! History is returned newest first. Entries committed in the same instant are ordered by
//! id, which follows commit order.

use crate::{
    core::account::not_found,
    entities::{Account, LedgerEntry, ledger_entry},
    errors::Result,
};
use sea_orm::{Condition, QueryOrder, Select, prelude::*};

fn touching(account_id: Uuid) -> Select<LedgerEntry> {
    LedgerEntry::find()
        .filter(
            Condition::any()
                .add(ledger_entry::Column::FromAccount.eq(account_id))
                .add(ledger_entry::Column::ToAccount.eq(account_id)),
        )
        .order_by_desc(ledger_entry::Column::Timestamp)
        .order_by_desc(ledger_entry::Column::Id)
}

/// All ledger entries where the account is source or destination, newest first.
pub async fn get_history(
    db: &DatabaseConnection,
    account_id: Uuid,
) -> Result<Vec<ledger_entry::Model>> {
    touching(account_id).all(db).await.map_err(Into::into)
}

/// The latest entry touching the account, used to report what just happened.
pub async fn get_most_recent(
    db: &DatabaseConnection,
    account_id: Uuid,
) -> Result<Option<ledger_entry::Model>> {
    touching(account_id).one(db).await.map_err(Into::into)
}

/// Entries credited to the account, newest first.
pub async fn get_incoming(
    db: &DatabaseConnection,
    account_id: Uuid,
) -> Result<Vec<ledger_entry::Model>> {
    LedgerEntry::find()
        .filter(ledger_entry::Column::ToAccount.eq(account_id))
        .order_by_desc(ledger_entry::Column::Timestamp)
        .order_by_desc(ledger_entry::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Current stored balance in minor units. The stored value is authoritative; it is not
/// recomputed from the ledger.
pub async fn get_balance(db: &DatabaseConnection, account_id: Uuid) -> Result<i64> {
    Account::find_by_id(account_id)
        .one(db)
        .await?
        .map(|account| account.balance)
        .ok_or_else(|| not_found(account_id))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{account::deposit, ledger::transfer_amount};
    use crate::errors::Error;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_get_history_empty() -> Result<()> {
        let (db, alice, _bob) = setup_with_two_accounts(100, 0).await?;
        assert!(get_history(&db, alice.id).await?.is_empty());
        assert!(get_most_recent(&db, alice.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_get_history_newest_first() -> Result<()> {
        let (db, alice, bob) = setup_with_two_accounts(1_000, 1_000).await?;

        let first = transfer_amount(&db, alice.id, bob.id, 100).await?;
        let second = transfer_amount(&db, bob.id, alice.id, 50).await?;
        let third = transfer_amount(&db, alice.id, bob.id, 25).await?;

        let history = get_history(&db, alice.id).await?;
        assert_eq!(history, vec![third.clone(), second, first]);

        let latest = get_most_recent(&db, bob.id).await?;
        assert_eq!(latest, Some(third));
        Ok(())
    }

    #[tokio::test]
    async fn test_history_only_includes_own_entries() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_account(&db, "a", 500).await?;
        let b = create_test_account(&db, "b", 500).await?;
        let c = create_test_account(&db, "c", 500).await?;

        let ab = transfer_amount(&db, a.id, b.id, 10).await?;
        let bc = transfer_amount(&db, b.id, c.id, 20).await?;

        assert_eq!(get_history(&db, a.id).await?, vec![ab.clone()]);
        assert_eq!(get_history(&db, c.id).await?, vec![bc.clone()]);
        assert_eq!(get_history(&db, b.id).await?, vec![bc, ab]);
        Ok(())
    }

    #[tokio::test]
    async fn test_deposit_does_not_create_ledger_entries() -> Result<()> {
        let (db, alice, _bob) = setup_with_two_accounts(0, 0).await?;
        deposit(&db, alice.id, 1_000).await?;
        assert!(get_history(&db, alice.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_get_incoming() -> Result<()> {
        let (db, alice, bob) = setup_with_two_accounts(1_000, 1_000).await?;
        let to_alice = transfer_amount(&db, bob.id, alice.id, 300).await?;
        transfer_amount(&db, alice.id, bob.id, 100).await?;

        assert_eq!(get_incoming(&db, alice.id).await?, vec![to_alice]);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_balance() -> Result<()> {
        let (db, alice, bob) = setup_with_two_accounts(10_000, 0).await?;
        transfer_amount(&db, alice.id, bob.id, 4_000).await?;

        assert_eq!(get_balance(&db, alice.id).await?, 6_000);
        assert_eq!(get_balance(&db, bob.id).await?, 4_000);
        // Idempotent reads
        assert_eq!(get_balance(&db, alice.id).await?, 6_000);

        let missing = get_balance(&db, Uuid::new_v4()).await;
        assert!(matches!(missing.unwrap_err(), Error::AccountNotFound { .. }));
        Ok(())
    }
}
