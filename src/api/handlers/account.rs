use crate::{
    api::{
        AppState, ApiError, AuthUser,
        extract::parse_account_id,
        types::{AccountResponse, RenameRequest, SearchQuery},
    },
    core::account::{
        delete_account, get_account_by_id, list_accounts, not_found, rename_account,
        search_accounts,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::{info, instrument};

/// `GET /account/:id`
pub async fn get_by_id(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<AccountResponse>, ApiError> {
    let id = parse_account_id(&id)?;
    let account = get_account_by_id(&state.db, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(account.into()))
}

/// `GET /account/name?account_holder=q` - substring search over names and phones.
pub async fn search(
    State(state): State<AppState>,
    _caller: AuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<AccountResponse>>, ApiError> {
    let accounts = search_accounts(&state.db, &query.account_holder).await?;
    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}

/// `DELETE /account/:id` - the holder or an admin may close an account.
#[instrument(skip(state, caller), fields(caller = %caller.0.id))]
pub async fn delete(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_account_id(&id)?;
    caller.ensure_self_or_admin(id)?;
    delete_account(&state.db, id).await?;
    info!(account_id = %id, "Account deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /account/:id/name`
pub async fn rename(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<RenameRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    let id = parse_account_id(&id)?;
    caller.ensure_self_or_admin(id)?;
    rename_account(&state.db, id, &request.account_holder).await?;
    let account = get_account_by_id(&state.db, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(account.into()))
}

/// `GET /admin/accounts`
pub async fn list_all(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<Vec<AccountResponse>>, ApiError> {
    caller.ensure_admin()?;
    let accounts = list_accounts(&state.db).await?;
    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}
