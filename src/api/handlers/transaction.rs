use crate::{
    api::{
        AppState, ApiError, AuthUser,
        extract::parse_account_id,
        types::{
            AccountResponse, BalanceResponse, DepositRequest, LedgerEntryResponse, TransferRequest,
        },
    },
    core::{
        account::deposit as deposit_amount,
        history::{get_balance, get_history, get_incoming, get_most_recent},
        ledger::transfer_amount,
        money::{to_major_units, to_minor_units},
    },
    errors::Error,
};
use axum::{
    Json,
    extract::{Path, State},
};
use tracing::{info, instrument};

/// `POST /account/deposit` - credits the caller, or any account when the caller is an admin.
#[instrument(skip(state, caller, request), fields(caller = %caller.0.id))]
pub async fn deposit(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(request): Json<DepositRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    let target = request.account_id.unwrap_or(caller.0.id);
    caller.ensure_self_or_admin(target)?;

    let amount = to_minor_units(request.amount)?;
    let account = deposit_amount(&state.db, target, amount).await?;
    info!(account_id = %target, amount, "Deposit completed");
    Ok(Json(account.into()))
}

/// `POST /account/transfer` - always debits the caller.
#[instrument(skip(state, caller, request), fields(caller = %caller.0.id))]
pub async fn transfer(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(request): Json<TransferRequest>,
) -> Result<Json<LedgerEntryResponse>, ApiError> {
    let amount = to_minor_units(request.amount)?;
    let entry = transfer_amount(&state.db, caller.0.id, request.to_account_id, amount).await?;
    info!(entry_id = entry.id, "Transfer completed");
    Ok(Json(entry.into()))
}

/// `GET /account/transactions/:id` - newest first. Works for deleted accounts too, so
/// admins can audit them.
pub async fn history(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<LedgerEntryResponse>>, ApiError> {
    let id = parse_account_id(&id)?;
    caller.ensure_self_or_admin(id)?;
    let entries = get_history(&state.db, id).await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// `GET /account/transactions/:id/latest`
pub async fn latest(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<LedgerEntryResponse>, ApiError> {
    let id = parse_account_id(&id)?;
    caller.ensure_self_or_admin(id)?;
    let entry = get_most_recent(&state.db, id)
        .await?
        .ok_or_else(|| Error::TransactionNotFound {
            account_id: id.to_string(),
        })?;
    Ok(Json(entry.into()))
}

/// `GET /account/balance` - the caller's balance and the transfers they received.
pub async fn balance(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<BalanceResponse>, ApiError> {
    let id = caller.0.id;
    let balance = get_balance(&state.db, id).await?;
    let incoming = get_incoming(&state.db, id).await?;
    Ok(Json(BalanceResponse {
        account_id: id,
        balance: to_major_units(balance),
        balance_minor: balance,
        incoming: incoming.into_iter().map(Into::into).collect(),
    }))
}
