use super::intent::{CLARIFY_REPLY, Intent};
use crate::{
    core::{
        account::{
            deposit, get_account_by_id, get_account_by_phone, rename_account, search_accounts,
        },
        history::{get_balance, get_history, get_most_recent},
        ledger::transfer_amount,
        money::{format_minor_units, to_minor_units},
    },
    entities::{account, ledger_entry},
    errors::{Error, ErrorKind, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use std::fmt::Write;
use tracing::{info, instrument};
use uuid::Uuid;

/// Number of entries shown for a history request
pub const HISTORY_LIMIT: usize = 10;

/// Runs `intent` on behalf of `caller` and renders the reply text.
///
/// Business failures (unknown recipient, insufficient funds, bad amount) are answered in
/// the reply. Only storage-level failures are returned as errors.
#[instrument(skip(db, caller), fields(caller = %caller.id))]
pub async fn execute(
    db: &DatabaseConnection,
    caller: &account::Model,
    intent: Intent,
) -> Result<String> {
    match run(db, caller, intent).await {
        Ok(reply) => Ok(reply),
        Err(err) if err.kind() == ErrorKind::Storage => Err(err),
        Err(err) => Ok(describe_failure(&err)),
    }
}

async fn run(db: &DatabaseConnection, caller: &account::Model, intent: Intent) -> Result<String> {
    match intent {
        Intent::CheckBalance => {
            let balance = get_balance(db, caller.id).await?;
            Ok(format!("Your balance is {}.", format_minor_units(balance)))
        }
        Intent::Transfer { to, amount } => {
            let amount = to_minor_units(amount)?;
            let recipient = resolve_recipient(db, caller, &to).await?;
            let entry = transfer_amount(db, caller.id, recipient.id, amount).await?;
            info!(entry_id = entry.id, "Chat transfer completed");

            let balance = get_balance(db, caller.id).await?;
            Ok(format!(
                "Sent {} to {}. Your balance is now {}.",
                format_minor_units(entry.amount),
                entry.to_holder,
                format_minor_units(balance)
            ))
        }
        Intent::Deposit { amount } => {
            let amount = to_minor_units(amount)?;
            let updated = deposit(db, caller.id, amount).await?;
            Ok(format!(
                "Deposited {}. Your balance is now {}.",
                format_minor_units(amount),
                format_minor_units(updated.balance)
            ))
        }
        Intent::History => {
            let entries = get_history(db, caller.id).await?;
            if entries.is_empty() {
                return Ok("You have no transactions yet.".to_string());
            }
            Ok(format_history(caller.id, &entries, Utc::now()))
        }
        Intent::LastTransaction => match get_most_recent(db, caller.id).await? {
            Some(entry) => Ok(format!(
                "Your last transaction: {}",
                describe_entry(caller.id, &entry, Utc::now())
            )),
            None => Ok("You have no transactions yet.".to_string()),
        },
        Intent::Search { query } => {
            let matches = search_accounts(db, &query).await?;
            if matches.is_empty() {
                return Ok(format!("No accounts match \"{}\".", query.trim()));
            }
            let mut reply = String::from("Matching accounts:");
            for found in &matches {
                let _ = write!(reply, "\n- {} ({})", found.holder, found.id);
            }
            Ok(reply)
        }
        Intent::Rename { name } => {
            let holder = rename_account(db, caller.id, &name).await?;
            Ok(format!("Your account name is now {holder}."))
        }
        Intent::Unknown { reply } if reply.trim().is_empty() => Ok(CLARIFY_REPLY.to_string()),
        Intent::Unknown { reply } => Ok(reply),
    }
}

/// Finds the account a chat user means by `to`: an account id, a `+` phone number, or a
/// holder name. Names match by substring, but an exact (case-insensitive) name wins.
/// The caller is never a candidate.
async fn resolve_recipient(
    db: &DatabaseConnection,
    caller: &account::Model,
    to: &str,
) -> Result<account::Model> {
    let to = to.trim();

    if let Ok(id) = Uuid::parse_str(to) {
        return get_account_by_id(db, id)
            .await?
            .ok_or_else(|| Error::AccountNotFound { id: to.to_string() });
    }

    if to.starts_with('+') {
        return get_account_by_phone(db, to)
            .await?
            .ok_or_else(|| Error::AccountNotFound { id: to.to_string() });
    }

    let mut candidates: Vec<account::Model> = search_accounts(db, to)
        .await?
        .into_iter()
        .filter(|candidate| candidate.id != caller.id)
        .collect();

    let exact: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, candidate)| candidate.holder.eq_ignore_ascii_case(to))
        .map(|(i, _)| i)
        .collect();

    match (exact.as_slice(), candidates.len()) {
        ([only], _) => Ok(candidates.swap_remove(*only)),
        (_, 0) => Err(Error::AccountNotFound { id: to.to_string() }),
        ([], 1) => Ok(candidates.remove(0)),
        _ => Err(Error::InvalidTransfer {
            reason: format!(
                "more than one account matches \"{to}\", please use the account id or phone number"
            ),
        }),
    }
}

fn describe_failure(err: &Error) -> String {
    match err {
        Error::AccountNotFound { id } => format!("I couldn't find an account for \"{id}\"."),
        Error::InsufficientFunds { current, .. } => format!(
            "Insufficient funds. Your balance is {}.",
            format_minor_units(*current)
        ),
        Error::InvalidAmount { amount } => {
            format!("{amount} is not a valid amount. Amounts must be positive.")
        }
        Error::InvalidTransfer { reason } => format!("I can't do that: {reason}."),
        other => other.to_string(),
    }
}

/// Human-readable age like "3 days ago". Future timestamps count as "just now".
#[must_use]
pub fn relative_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let (count, unit) = if elapsed.num_days() > 0 {
        (elapsed.num_days(), "day")
    } else if elapsed.num_hours() > 0 {
        (elapsed.num_hours(), "hour")
    } else if elapsed.num_minutes() > 0 {
        (elapsed.num_minutes(), "minute")
    } else {
        return "just now".to_string();
    };
    let plural = if count == 1 { "" } else { "s" };
    format!("{count} {unit}{plural} ago")
}

fn describe_entry(viewer: Uuid, entry: &ledger_entry::Model, now: DateTime<Utc>) -> String {
    let age = relative_age(entry.timestamp, now);
    if entry.is_outgoing_for(viewer) {
        format!(
            "sent {} to {} ({age})",
            format_minor_units(entry.amount),
            entry.to_holder
        )
    } else {
        format!(
            "received {} from {} ({age})",
            format_minor_units(entry.amount),
            entry.from_holder
        )
    }
}

/// Renders up to [`HISTORY_LIMIT`] entries, one per line, from `viewer`'s point of view.
#[must_use]
pub fn format_history(viewer: Uuid, entries: &[ledger_entry::Model], now: DateTime<Utc>) -> String {
    let mut reply = String::from("Recent transactions:");
    for entry in entries.iter().take(HISTORY_LIMIT) {
        let _ = write!(reply, "\n- {}", describe_entry(viewer, entry, now));
    }
    if entries.len() > HISTORY_LIMIT {
        let _ = write!(reply, "\n...and {} more", entries.len() - HISTORY_LIMIT);
    }
    reply
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_check_balance() -> Result<()> {
        let (db, alice, _bob) = setup_with_two_accounts(12_345, 0).await?;
        let reply = execute(&db, &alice, Intent::CheckBalance).await?;
        assert_eq!(reply, "Your balance is 123.45.");
        Ok(())
    }

    #[tokio::test]
    async fn test_transfer_by_name() -> Result<()> {
        let (db, alice, bob) = setup_with_two_accounts(10_000, 0).await?;

        let intent = Intent::Transfer {
            to: "Bob".to_string(),
            amount: 40.0,
        };
        let reply = execute(&db, &alice, intent).await?;
        assert_eq!(reply, "Sent 40.00 to bob. Your balance is now 60.00.");
        assert_eq!(get_balance(&db, bob.id).await?, 4_000);
        Ok(())
    }

    #[tokio::test]
    async fn test_transfer_by_phone_and_id() -> Result<()> {
        let (db, alice, bob) = setup_with_two_accounts(10_000, 0).await?;
        let carol = create_test_account_with_phone(&db, "carol", "+15550002222").await?;

        execute(
            &db,
            &alice,
            Intent::Transfer {
                to: "+15550002222".to_string(),
                amount: 1.0,
            },
        )
        .await?;
        execute(
            &db,
            &alice,
            Intent::Transfer {
                to: bob.id.to_string(),
                amount: 2.0,
            },
        )
        .await?;

        assert_eq!(get_balance(&db, carol.id).await?, 100);
        assert_eq!(get_balance(&db, bob.id).await?, 200);
        Ok(())
    }

    #[tokio::test]
    async fn test_transfer_failures_are_replies() -> Result<()> {
        let (db, alice, bob) = setup_with_two_accounts(500, 0).await?;

        let reply = execute(
            &db,
            &alice,
            Intent::Transfer {
                to: "bob".to_string(),
                amount: 6.0,
            },
        )
        .await?;
        assert_eq!(reply, "Insufficient funds. Your balance is 5.00.");

        let reply = execute(
            &db,
            &alice,
            Intent::Transfer {
                to: "nobody".to_string(),
                amount: 1.0,
            },
        )
        .await?;
        assert!(reply.contains("couldn't find"));

        let reply = execute(
            &db,
            &alice,
            Intent::Transfer {
                to: "bob".to_string(),
                amount: -3.0,
            },
        )
        .await?;
        assert!(reply.contains("not a valid amount"));

        assert_eq!(get_balance(&db, alice.id).await?, 500);
        assert_eq!(get_balance(&db, bob.id).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_resolve_recipient_ambiguity() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_account(&db, "alice", 0).await?;
        let dana = create_test_account(&db, "Dana", 0).await?;
        create_test_account(&db, "Dana Cohen", 0).await?;
        create_test_account(&db, "Eli Levi", 0).await?;
        create_test_account(&db, "Eli Levinson", 0).await?;

        // Exact name wins over substring matches
        assert_eq!(resolve_recipient(&db, &alice, "dana").await?.id, dana.id);

        let result = resolve_recipient(&db, &alice, "Eli").await;
        assert!(matches!(result.unwrap_err(), Error::InvalidTransfer { .. }));

        // The caller never matches themselves
        let result = resolve_recipient(&db, &alice, "alice").await;
        assert!(matches!(result.unwrap_err(), Error::AccountNotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_history_and_last_transaction() -> Result<()> {
        let (db, alice, bob) = setup_with_two_accounts(10_000, 0).await?;

        let reply = execute(&db, &alice, Intent::History).await?;
        assert_eq!(reply, "You have no transactions yet.");

        transfer_amount(&db, alice.id, bob.id, 1_000).await?;
        transfer_amount(&db, bob.id, alice.id, 250).await?;

        let reply = execute(&db, &alice, Intent::History).await?;
        let lines: Vec<&str> = reply.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("- received 2.50 from bob"));
        assert!(lines[2].starts_with("- sent 10.00 to bob"));

        let reply = execute(&db, &bob, Intent::LastTransaction).await?;
        assert!(reply.starts_with("Your last transaction: sent 2.50 to alice"));
        Ok(())
    }

    #[tokio::test]
    async fn test_deposit_search_and_rename() -> Result<()> {
        let (db, alice, _bob) = setup_with_two_accounts(0, 0).await?;

        let reply = execute(&db, &alice, Intent::Deposit { amount: 12.5 }).await?;
        assert_eq!(reply, "Deposited 12.50. Your balance is now 12.50.");

        let reply = execute(
            &db,
            &alice,
            Intent::Search {
                query: "bo".to_string(),
            },
        )
        .await?;
        assert!(reply.starts_with("Matching accounts:\n- bob"));

        let reply = execute(
            &db,
            &alice,
            Intent::Rename {
                name: " Alicia ".to_string(),
            },
        )
        .await?;
        assert_eq!(reply, "Your account name is now Alicia.");
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_passes_reply_through() -> Result<()> {
        let (db, alice, _bob) = setup_with_two_accounts(0, 0).await?;
        let reply = execute(
            &db,
            &alice,
            Intent::Unknown {
                reply: "How much?".to_string(),
            },
        )
        .await?;
        assert_eq!(reply, "How much?");

        let reply = execute(
            &db,
            &alice,
            Intent::Unknown {
                reply: String::new(),
            },
        )
        .await?;
        assert_eq!(reply, CLARIFY_REPLY);
        Ok(())
    }

    #[test]
    fn test_relative_age() {
        let now = Utc::now();
        assert_eq!(relative_age(now, now), "just now");
        assert_eq!(relative_age(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(relative_age(now - Duration::hours(5), now), "5 hours ago");
        assert_eq!(relative_age(now - Duration::days(3), now), "3 days ago");
        assert_eq!(relative_age(now + Duration::hours(1), now), "just now");
    }

    #[test]
    fn test_format_history_caps_entries() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        let now = Utc::now();
        let entries: Vec<ledger_entry::Model> = (0..12)
            .map(|i| ledger_entry::Model {
                id: i,
                from_account: me,
                to_account: other,
                amount: 100,
                timestamp: now - Duration::hours(2),
                from_holder: "me".to_string(),
                to_holder: "them".to_string(),
            })
            .collect();

        let reply = format_history(me, &entries, now);
        assert_eq!(reply.lines().count(), 1 + HISTORY_LIMIT + 1);
        assert!(reply.contains("- sent 1.00 to them (2 hours ago)"));
        assert!(reply.ends_with("...and 2 more"));
    }
}
