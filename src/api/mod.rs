//! HTTP interface - axum router, shared state, extractors and JSON types.
//!
//! Handlers are thin: they authenticate the caller, convert decimal amounts with
//! [`crate::core::money`], call into [`crate::core`] and render the result.

/// Error responses
pub mod error;
/// Request extractors (authenticated caller)
pub mod extract;
/// Route handlers grouped by resource
pub mod handlers;
/// Request and response bodies
pub mod types;

use crate::{auth::TokenIssuer, chat::IntentParser};
use axum::{
    Router,
    routing::{get, post, put},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use error::ApiError;
pub use extract::AuthUser;

/// State shared by every handler. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide database handle
    pub db: DatabaseConnection,
    /// Bearer token issuer/verifier
    pub tokens: Arc<TokenIssuer>,
    /// Intent parser for the chat endpoints; `None` disables them
    pub chat: Option<Arc<dyn IntentParser>>,
}

impl AppState {
    /// Bundles the handles the router needs.
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        tokens: TokenIssuer,
        chat: Option<Arc<dyn IntentParser>>,
    ) -> Self {
        Self {
            db,
            tokens: Arc::new(tokens),
            chat,
        }
    }
}

/// Builds the application router with tracing and CORS layers.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::general::health))
        .route("/create", post(handlers::general::create))
        .route("/login", post(handlers::general::login))
        .route("/account/name", get(handlers::account::search))
        .route("/account/balance", get(handlers::transaction::balance))
        .route("/account/deposit", post(handlers::transaction::deposit))
        .route("/account/transfer", post(handlers::transaction::transfer))
        .route(
            "/account/transactions/:id",
            get(handlers::transaction::history),
        )
        .route(
            "/account/transactions/:id/latest",
            get(handlers::transaction::latest),
        )
        .route(
            "/account/:id",
            get(handlers::account::get_by_id).delete(handlers::account::delete),
        )
        .route("/account/:id/name", put(handlers::account::rename))
        .route("/admin/accounts", get(handlers::account::list_all))
        .route("/chat", post(handlers::chat::chat))
        .route("/whatsapp", post(handlers::chat::whatsapp))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
