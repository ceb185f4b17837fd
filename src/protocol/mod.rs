//! Wire schema for the finalized ledger stream: envelope and message types,
//! actor discrimination, and structural validation. Everything cryptographic
//! is opaque on this side of the wire.

pub mod actions;
pub mod actor;
pub mod messages;
pub mod parse;
pub mod stream_event;
pub mod types;

pub use actions::{PlayerBetAction, Street};
pub use actor::AnyActor;
pub use messages::{
    AnyGameMessage, BlindingShareMessage, EventEnvelope, FinalizedEventEnvelope,
    PartialUnblindingShareMessage, PlayerActionMessage, ShowdownMessage, ShuffleMessage,
};
pub use parse::{
    parse_envelope, parse_envelope_value, parse_stream_event, parse_stream_event_value,
    ValidationError, ValidationResult,
};
pub use stream_event::StreamEvent;
pub use types::{
    CardPosition, Chips, EventPhase, GameId, HandId, HandStatus, HexBytes, PlayerId, PlayerKey,
    SeatId, SequenceId, ShufflerId, SnapshotStatus, DECK_SIZE,
};
