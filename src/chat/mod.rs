//! Conversational adapter - lets account holders drive the core through free text.
//!
//! A message is turned into a structured [`Intent`] by an [`IntentParser`] (normally a
//! chat-completion model), then [`dispatch::execute`] runs it against the same core
//! operations the HTTP API uses and renders a short plain-text reply.

/// Intent execution and reply formatting
pub mod dispatch;
/// Structured intents and the parser seam
pub mod intent;
/// OpenAI-compatible intent parser
pub mod openai;
/// WhatsApp (Twilio) sender normalization and TwiML rendering
pub mod whatsapp;

pub use intent::{Intent, IntentParser};
pub use openai::OpenAiIntentParser;
