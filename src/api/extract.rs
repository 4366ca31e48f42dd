use super::{AppState, error::ApiError};
use crate::{
    core::account::get_account_by_id,
    entities::account,
    errors::{Error, Result},
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

/// The caller, authenticated by bearer token and loaded from the store.
#[derive(Debug, Clone)]
pub struct AuthUser(pub account::Model);

impl AuthUser {
    /// Allows the request if the caller owns `account_id` or is an admin.
    pub fn ensure_self_or_admin(&self, account_id: Uuid) -> Result<()> {
        if self.0.id == account_id || self.0.is_admin() {
            Ok(())
        } else {
            Err(Error::Unauthorized {
                message: "You can only act on your own account".to_string(),
            })
        }
    }

    /// Allows the request only for admins.
    pub fn ensure_admin(&self) -> Result<()> {
        if self.0.is_admin() {
            Ok(())
        } else {
            Err(Error::Unauthorized {
                message: "Admin role required".to_string(),
            })
        }
    }
}

fn unauthorized(message: &str) -> Error {
    Error::Unauthorized {
        message: message.to_string(),
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| unauthorized("Missing Authorization header"))?;

        // Bare tokens are accepted too
        let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
        if token.is_empty() {
            return Err(unauthorized("Empty bearer token").into());
        }

        let claims = state.tokens.verify(token)?;
        let account = get_account_by_id(&state.db, claims.account_id()?)
            .await?
            .ok_or_else(|| unauthorized("Account no longer exists"))?;

        Ok(Self(account))
    }
}

/// Parses an account id taken from the path.
pub fn parse_account_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| Error::InvalidInput {
        message: format!("Invalid account id: {raw}"),
    })
}
