use serde_json::Value;
use thiserror::Error;

use super::messages::{AnyGameMessage, FinalizedEventEnvelope, MESSAGE_KINDS};
use super::stream_event::{StreamEvent, STREAM_EVENT_KINDS};
use super::types::DECK_SIZE;

/// Structural validation failures for inbound protocol traffic.
///
/// Validation is shape-only: signatures ride through as opaque hex and are
/// never checked cryptographically here. Callers decide whether to drop,
/// log, or abort the stream.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Input was not valid JSON or did not match the expected shape.
    #[error("malformed envelope structure: {reason}")]
    MalformedStructure { reason: String },

    /// The message carries a tag this client does not understand.
    #[error("unknown message kind `{kind}`")]
    UnknownMessageKind { kind: String },

    /// The stream item carries a tag this client does not understand.
    #[error("unknown stream event kind `{kind}`")]
    UnknownEventKind { kind: String },

    /// A card position outside the 52-card deck.
    #[error("card position {position} out of range")]
    CardPositionOutOfRange { position: u16 },
}

impl ValidationError {
    pub fn malformed(reason: impl ToString) -> Self {
        Self::MalformedStructure {
            reason: reason.to_string(),
        }
    }

    pub fn unknown_message_kind(kind: impl Into<String>) -> Self {
        Self::UnknownMessageKind { kind: kind.into() }
    }

    pub fn unknown_event_kind(kind: impl Into<String>) -> Self {
        Self::UnknownEventKind { kind: kind.into() }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Parse and validate one finalized envelope from its JSON text.
pub fn parse_envelope(raw: &str) -> ValidationResult<FinalizedEventEnvelope> {
    let value: Value = serde_json::from_str(raw).map_err(ValidationError::malformed)?;
    parse_envelope_value(value)
}

/// Parse and validate one finalized envelope from an already-decoded value.
pub fn parse_envelope_value(value: Value) -> ValidationResult<FinalizedEventEnvelope> {
    check_message_tag(value.get("envelope").and_then(|e| e.get("message")))?;
    let finalized: FinalizedEventEnvelope =
        serde_json::from_value(value).map_err(ValidationError::malformed)?;
    check_positions(&finalized.envelope.message)?;
    Ok(finalized)
}

/// Parse and validate one stream item from its JSON text.
pub fn parse_stream_event(raw: &str) -> ValidationResult<StreamEvent> {
    let value: Value = serde_json::from_str(raw).map_err(ValidationError::malformed)?;
    parse_stream_event_value(value)
}

/// Parse and validate one stream item from an already-decoded value.
pub fn parse_stream_event_value(value: Value) -> ValidationResult<StreamEvent> {
    let tag = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ValidationError::malformed("missing stream event `type` tag"))?;
    if !STREAM_EVENT_KINDS.contains(&tag) {
        return Err(ValidationError::unknown_event_kind(tag));
    }

    if tag == "game_event" {
        check_message_tag(value.get("envelope").and_then(|e| e.get("message")))?;
    }

    let event: StreamEvent = serde_json::from_value(value).map_err(ValidationError::malformed)?;

    match &event {
        StreamEvent::GameEvent { envelope } => check_positions(&envelope.envelope.message)?,
        StreamEvent::CardDecryptable { card_position, .. }
        | StreamEvent::HoleCardsDecrypted { card_position, .. } => {
            check_position(*card_position as u16)?;
        }
        _ => {}
    }

    Ok(event)
}

/// Distinguish an unrecognized message tag from a structurally broken
/// payload before handing the value to serde, which collapses both into the
/// same error kind.
fn check_message_tag(message: Option<&Value>) -> ValidationResult<()> {
    let message =
        message.ok_or_else(|| ValidationError::malformed("missing `envelope.message`"))?;
    let object = message
        .as_object()
        .ok_or_else(|| ValidationError::malformed("`envelope.message` is not an object"))?;
    let mut keys = object.keys();
    let (tag, extra) = (keys.next(), keys.next());
    let tag = tag.ok_or_else(|| ValidationError::malformed("`envelope.message` has no tag"))?;
    if extra.is_some() {
        return Err(ValidationError::malformed(
            "`envelope.message` has more than one tag",
        ));
    }
    if !MESSAGE_KINDS.contains(&tag.as_str()) {
        return Err(ValidationError::unknown_message_kind(tag));
    }
    Ok(())
}

fn check_positions(message: &AnyGameMessage) -> ValidationResult<()> {
    if let Some(position) = message.share_position() {
        check_position(u16::from(position))?;
    }
    if let AnyGameMessage::Showdown(showdown) = message {
        for &position in &showdown.card_positions {
            check_position(u16::from(position))?;
        }
    }
    Ok(())
}

fn check_position(position: u16) -> ValidationResult<()> {
    if position as usize >= DECK_SIZE {
        return Err(ValidationError::CardPositionOutOfRange { position });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::{finalized_envelope, player_action_envelope};
    use crate::protocol::actions::{PlayerBetAction, Street};

    #[test]
    fn valid_envelopes_parse() {
        let finalized = player_action_envelope(9, 2, Street::Flop, PlayerBetAction::Call);
        let raw = serde_json::to_string(&finalized).unwrap();
        let parsed = parse_envelope(&raw).unwrap();
        assert_eq!(parsed, finalized);
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = parse_envelope("{not json").unwrap_err();
        assert!(matches!(err, ValidationError::MalformedStructure { .. }));
    }

    #[test]
    fn missing_fields_are_malformed() {
        let raw = r#"{"envelope": {"message": {"Shuffle": {}}}}"#;
        let err = parse_envelope(raw).unwrap_err();
        assert!(matches!(err, ValidationError::MalformedStructure { .. }));
    }

    #[test]
    fn unknown_message_tags_are_distinguished_from_malformed_payloads() {
        let mut value = serde_json::to_value(finalized_envelope(1)).unwrap();
        value["envelope"]["message"] = serde_json::json!({ "Teleport": { "to": 3 } });
        let err = parse_envelope_value(value).unwrap_err();
        match err {
            ValidationError::UnknownMessageKind { kind } => assert_eq!(kind, "Teleport"),
            other => panic!("expected unknown kind, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_card_positions_are_rejected() {
        let mut value = serde_json::to_value(finalized_envelope(1)).unwrap();
        value["envelope"]["message"]["Blinding"]["card_position"] = serde_json::json!(52);
        let err = parse_envelope_value(value).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::CardPositionOutOfRange { position: 52 }
        ));
    }

    #[test]
    fn bad_hex_signature_is_malformed() {
        let mut value = serde_json::to_value(finalized_envelope(1)).unwrap();
        value["envelope"]["signature"] = serde_json::json!("not-hex");
        let err = parse_envelope_value(value).unwrap_err();
        assert!(matches!(err, ValidationError::MalformedStructure { .. }));
    }

    #[test]
    fn stream_event_tags_are_checked_before_shape() {
        let raw = r#"{"type": "fireworks", "game_id": 1}"#;
        let err = parse_stream_event(raw).unwrap_err();
        match err {
            ValidationError::UnknownEventKind { kind } => assert_eq!(kind, "fireworks"),
            other => panic!("expected unknown event kind, got {other:?}"),
        }
    }

    #[test]
    fn game_event_stream_items_parse() {
        let finalized = finalized_envelope(6);
        let event = crate::protocol::stream_event::StreamEvent::GameEvent {
            envelope: finalized.clone(),
        };
        let raw = serde_json::to_string(&event).unwrap();
        match parse_stream_event(&raw).unwrap() {
            crate::protocol::stream_event::StreamEvent::GameEvent { envelope } => {
                assert_eq!(envelope, finalized)
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
