//! JSON-lines encoding for commands and events

use crate::error::{MarketError, Result};

use super::message::{ChatCommand, ChatEvent};

/// Encode an event as a single JSON line (no trailing newline)
pub fn encode_line(event: &ChatEvent) -> Result<String> {
    Ok(serde_json::to_string(event)?)
}

/// Decode one JSON line into a command
pub fn decode_line(line: &str) -> Result<ChatCommand> {
    serde_json::from_str(line.trim())
        .map_err(|e| MarketError::Validation(format!("malformed command: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ErrorKind;
    use crate::types::ParticipantId;

    #[test]
    fn test_decode_offer_command() {
        let command = decode_line(r#" {"type":"send_offer","author":"a","amount":40} "#).unwrap();
        assert_eq!(
            command,
            ChatCommand::SendOffer {
                author: ParticipantId::new("a"),
                amount: 40.0,
            }
        );
    }

    #[test]
    fn test_malformed_line_is_validation_error() {
        assert!(matches!(
            decode_line("{\"type\":\"shout\"}"),
            Err(MarketError::Validation(_))
        ));
        assert!(matches!(
            decode_line("{not json"),
            Err(MarketError::Validation(_))
        ));
    }

    #[test]
    fn test_encode_error_event() {
        let line = encode_line(&ChatEvent::Error {
            kind: ErrorKind::InvalidTransition,
            message: "offer msg-1 is already accepted".to_string(),
        })
        .unwrap();

        assert!(!line.contains('\n'));
        assert_eq!(
            line,
            r#"{"type":"error","kind":"invalid_transition","message":"offer msg-1 is already accepted"}"#
        );
    }
}
