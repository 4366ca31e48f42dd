use dotenvy::dotenv;
use ledger_bank::{
    api::{self, AppState},
    auth::TokenIssuer,
    chat::{IntentParser, OpenAiIntentParser},
    config::{database, settings},
    core::account::ensure_admin,
    errors::{Error, Result},
};
use std::{env, sync::Arc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Non-secret settings from config.toml
    let settings = settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;

    // 4. Secrets from the environment
    let jwt_secret = env::var("JWT_SECRET")
        .inspect_err(|e| error!("JWT_SECRET not found: {}", e))
        .map_err(Error::EnvVar)?;
    if jwt_secret.trim().is_empty() {
        return Err(Error::Config {
            message: "JWT_SECRET must not be empty".to_string(),
        });
    }
    let tokens = TokenIssuer::new(jwt_secret.as_bytes(), settings.auth.token_ttl()?);

    // 5. Database
    let db = database::create_connection(&database::get_database_url())
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 6. Optional first administrator
    if let (Ok(holder), Ok(password)) = (env::var("ADMIN_USER"), env::var("ADMIN_PASSWORD")) {
        ensure_admin(&db, &holder, &password).await?;
    }

    // 7. Conversational adapter, only with an API key
    let chat: Option<Arc<dyn IntentParser>> = match env::var("OPENAI_API_KEY") {
        Ok(key) if !key.trim().is_empty() => {
            info!(model = %settings.chat.model, "Chat adapter enabled");
            Some(Arc::new(OpenAiIntentParser::new(key, &settings.chat)))
        }
        _ => {
            warn!("OPENAI_API_KEY not set, chat endpoints are disabled");
            None
        }
    };

    // 8. Serve
    let app = api::router(AppState::new(db, tokens, chat));
    let listener = tokio::net::TcpListener::bind(&settings.server.bind_addr)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", settings.server.bind_addr, e))?;
    info!("Listening on {}", settings.server.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
