use crate::{
    api::{
        AppState, ApiError,
        types::{CreateAccountRequest, CreateAccountResponse, LoginRequest, LoginResponse},
    },
    auth::verify_password,
    core::{
        account::{NewAccount, create_account, find_login_candidates},
        money::to_minor_units,
    },
    errors::Error,
};
use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

/// Liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Registers a user account and logs it in.
#[instrument(skip(state, request), fields(user_name = %request.user_name))]
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<CreateAccountResponse>), ApiError> {
    let mut new_account = NewAccount::user(
        request.user_name,
        request.password,
        to_minor_units(request.initial_balance)?,
    );
    new_account.phone = request.phone;

    let account = create_account(&state.db, new_account).await?;
    let token = state.tokens.issue(account.id, &account.holder)?;
    info!(account_id = %account.id, "Account registered");

    Ok((
        StatusCode::CREATED,
        Json(CreateAccountResponse {
            login: LoginResponse {
                user_name: account.holder.clone(),
                account_id: account.id,
                token,
            },
            account: account.into(),
        }),
    ))
}

/// Exchanges a holder name (or phone) and password for a bearer token.
#[instrument(skip(state, request), fields(user_name = %request.user_name))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let candidates = find_login_candidates(&state.db, &request.user_name).await?;

    let password = request.password;
    // Each Argon2 check takes tens of milliseconds; keep them off the async workers
    let matched = tokio::task::spawn_blocking(move || {
        candidates
            .into_iter()
            .find(|candidate| verify_password(&password, &candidate.password_hash))
    })
    .await
    .map_err(|e| Error::Storage {
        message: format!("Password verification task failed: {e}"),
    })?;

    let Some(account) = matched else {
        warn!("Failed login attempt");
        return Err(Error::Unauthorized {
            message: "Invalid user name or password".to_string(),
        }
        .into());
    };

    let token = state.tokens.issue(account.id, &account.holder)?;
    Ok(Json(LoginResponse {
        user_name: account.holder,
        account_id: account.id,
        token,
    }))
}
