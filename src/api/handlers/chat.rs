use crate::{
    api::{
        AppState, ApiError, AuthUser,
        types::{ChatRequest, ChatResponse, WhatsAppForm},
    },
    chat::{
        dispatch::execute,
        whatsapp::{normalize_sender, twiml_reply},
    },
    core::account::get_account_by_phone,
};
use axum::{
    Form, Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use tracing::{error, instrument, warn};

const CHAT_DISABLED: &str = "Chat is not enabled on this server";

/// `POST /chat` - runs a free-text request for the authenticated caller.
#[instrument(skip_all, fields(caller = %caller.0.id))]
pub async fn chat(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Some(parser) = state.chat.as_ref() else {
        return Err(ApiError::new(StatusCode::SERVICE_UNAVAILABLE, CHAT_DISABLED));
    };

    let intent = parser.parse(&request.message).await?;
    let reply = execute(&state.db, &caller.0, intent).await?;
    Ok(Json(ChatResponse { reply }))
}

/// `POST /whatsapp` - Twilio webhook. The sender's phone number identifies the account.
///
/// Always answers 200 with TwiML so Twilio relays the text; failures become apologies.
#[instrument(skip_all, fields(from = %form.from))]
pub async fn whatsapp(
    State(state): State<AppState>,
    Form(form): Form<WhatsAppForm>,
) -> impl IntoResponse {
    let reply = whatsapp_reply(&state, &form).await;
    (
        [(header::CONTENT_TYPE, "application/xml")],
        twiml_reply(&reply),
    )
}

async fn whatsapp_reply(state: &AppState, form: &WhatsAppForm) -> String {
    let Some(parser) = state.chat.as_ref() else {
        return CHAT_DISABLED.to_string();
    };

    let Some(phone) = normalize_sender(&form.from) else {
        warn!("Rejected malformed sender");
        return "Sorry, I could not read your phone number.".to_string();
    };

    let caller = match get_account_by_phone(&state.db, &phone).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            return format!(
                "No account is registered for {phone}. Create one with your phone number first."
            );
        }
        Err(e) => {
            error!("Phone lookup failed: {}", e);
            return "Sorry, something went wrong. Please try again later.".to_string();
        }
    };

    let intent = match parser.parse(&form.body).await {
        Ok(intent) => intent,
        Err(e) => {
            error!("Intent parsing failed: {}", e);
            return "Sorry, I can't process messages right now.".to_string();
        }
    };

    match execute(&state.db, &caller, intent).await {
        Ok(reply) => reply,
        Err(e) => {
            error!("Chat request failed: {}", e);
            "Sorry, something went wrong. Please try again later.".to_string()
        }
    }
}
