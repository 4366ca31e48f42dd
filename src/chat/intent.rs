use crate::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

/// Reply used when a message cannot be mapped to an intent
pub const CLARIFY_REPLY: &str =
    "Sorry, I didn't get that. Please specify a clear request, e.g. \"send 20 to Dana\".";

/// A structured request extracted from a chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    /// Report the caller's balance
    CheckBalance,
    /// Send money to another account
    Transfer {
        /// Recipient account id, phone number or holder name
        to: String,
        /// Amount in major units
        #[serde(deserialize_with = "number_or_string")]
        amount: f64,
    },
    /// Add money to the caller's account
    Deposit {
        /// Amount in major units
        #[serde(deserialize_with = "number_or_string")]
        amount: f64,
    },
    /// List recent transfers
    History,
    /// Describe the latest transfer
    LastTransaction,
    /// Find accounts by name or phone
    Search {
        /// Name or phone fragment
        query: String,
    },
    /// Change the caller's display name
    Rename {
        /// New holder name
        name: String,
    },
    /// Anything else; `reply` is shown to the user as-is
    Unknown {
        /// Clarifying question or answer from the model
        #[serde(default)]
        reply: String,
    },
}

/// Models regularly quote numbers ("amount": "40"), so accept both forms.
fn number_or_string<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .trim_start_matches(['$', '₪', '€'])
            .replace(',', "")
            .parse()
            .map_err(serde::de::Error::custom),
    }
}

/// Turns free text into an [`Intent`].
#[async_trait]
pub trait IntentParser: Send + Sync {
    /// Parses one user message.
    async fn parse(&self, text: &str) -> Result<Intent>;
}

/// Extracts the intent JSON object from a model reply.
///
/// Tolerates code fences and prose around the object. Anything unparsable becomes
/// [`Intent::Unknown`]; plain prose is passed through as the reply.
#[must_use]
pub fn parse_model_reply(reply: &str) -> Intent {
    let object = match (reply.find('{'), reply.rfind('}')) {
        (Some(start), Some(end)) if start < end => &reply[start..=end],
        _ => {
            let prose = reply.trim();
            return Intent::Unknown {
                reply: if prose.is_empty() {
                    CLARIFY_REPLY.to_string()
                } else {
                    prose.to_string()
                },
            };
        }
    };

    match serde_json::from_str::<Intent>(object) {
        Ok(Intent::Unknown { reply }) if reply.trim().is_empty() => Intent::Unknown {
            reply: CLARIFY_REPLY.to_string(),
        },
        Ok(intent) => intent,
        Err(e) => {
            tracing::debug!("Unparsable intent object {}: {}", object, e);
            Intent::Unknown {
                reply: CLARIFY_REPLY.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_plain_object() {
        let intent = parse_model_reply(r#"{"intent": "check_balance"}"#);
        assert_eq!(intent, Intent::CheckBalance);
    }

    #[test]
    fn test_parse_transfer_with_string_amount() {
        let intent = parse_model_reply(r#"{"intent":"transfer","to":"Dana","amount":"1,200.50"}"#);
        assert_eq!(
            intent,
            Intent::Transfer {
                to: "Dana".to_string(),
                amount: 1200.5
            }
        );
    }

    #[test]
    fn test_parse_fenced_reply() {
        let reply = "Sure!\n```json\n{\"intent\": \"deposit\", \"amount\": 25}\n```";
        assert_eq!(parse_model_reply(reply), Intent::Deposit { amount: 25.0 });
    }

    #[test]
    fn test_parse_prose_becomes_unknown() {
        let intent = parse_model_reply("Who would you like to send money to?");
        assert_eq!(
            intent,
            Intent::Unknown {
                reply: "Who would you like to send money to?".to_string()
            }
        );
    }

    #[test]
    fn test_parse_garbage_object_asks_for_clarification() {
        let intent = parse_model_reply(r#"{"intent": "launch_rocket"}"#);
        assert_eq!(
            intent,
            Intent::Unknown {
                reply: CLARIFY_REPLY.to_string()
            }
        );

        let missing_amount = parse_model_reply(r#"{"intent": "transfer", "to": "Dana"}"#);
        assert!(matches!(missing_amount, Intent::Unknown { .. }));
    }

    #[test]
    fn test_parse_empty_unknown_gets_default_reply() {
        let intent = parse_model_reply(r#"{"intent": "unknown"}"#);
        assert_eq!(
            intent,
            Intent::Unknown {
                reply: CLARIFY_REPLY.to_string()
            }
        );
    }
}
