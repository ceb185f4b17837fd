use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::actions::{PlayerBetAction, Street};
use super::actor::AnyActor;
use super::types::{
    CardPosition, EventPhase, GameId, HandId, HexBytes, PlayerKey, SequenceId, SnapshotStatus,
};

/// One shuffler's turn in the shuffle chain. Decks and proof are opaque
/// commitments; the backend has already verified them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShuffleMessage {
    pub turn_index: u16,
    pub deck_in: HexBytes,
    pub deck_out: HexBytes,
    pub proof: HexBytes,
}

/// A shuffler's blinding contribution for one card, addressed to the player
/// who will eventually hold it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlindingShareMessage {
    pub card_position: CardPosition,
    pub share: HexBytes,
    pub target_player_key: PlayerKey,
}

/// A shuffler's partial unblinding share for one card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialUnblindingShareMessage {
    pub card_position: CardPosition,
    pub share: HexBytes,
    pub target_player_key: PlayerKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerActionMessage {
    pub street: Street,
    pub action: PlayerBetAction,
}

/// Hole-card reveal at showdown. Ciphertexts and proofs stay opaque; the
/// plaintext cards arrive separately once decryption completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowdownMessage {
    pub card_positions: [CardPosition; 2],
    pub hole_ciphertexts: [HexBytes; 2],
    pub proofs: [HexBytes; 2],
}

/// Every message kind the ledger emits. Variant names are the wire tags and
/// must stay aligned with the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnyGameMessage {
    Shuffle(ShuffleMessage),
    Blinding(BlindingShareMessage),
    PartialUnblinding(PartialUnblindingShareMessage),
    PlayerPreflop(PlayerActionMessage),
    PlayerFlop(PlayerActionMessage),
    PlayerTurn(PlayerActionMessage),
    PlayerRiver(PlayerActionMessage),
    Showdown(ShowdownMessage),
}

/// Wire tags of [`AnyGameMessage`], in variant order. Used to tell a
/// malformed payload apart from a kind this client does not know.
pub const MESSAGE_KINDS: [&str; 8] = [
    "Shuffle",
    "Blinding",
    "PartialUnblinding",
    "PlayerPreflop",
    "PlayerFlop",
    "PlayerTurn",
    "PlayerRiver",
    "Showdown",
];

impl AnyGameMessage {
    pub fn phase(&self) -> EventPhase {
        match self {
            AnyGameMessage::Shuffle(_) => EventPhase::Shuffling,
            AnyGameMessage::Blinding(_) => EventPhase::Dealing,
            AnyGameMessage::PartialUnblinding(_) => EventPhase::Reveals,
            AnyGameMessage::PlayerPreflop(_) => EventPhase::Betting,
            AnyGameMessage::PlayerFlop(_) => EventPhase::Betting,
            AnyGameMessage::PlayerTurn(_) => EventPhase::Betting,
            AnyGameMessage::PlayerRiver(_) => EventPhase::Betting,
            AnyGameMessage::Showdown(_) => EventPhase::Showdown,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AnyGameMessage::Shuffle(_) => "Shuffle",
            AnyGameMessage::Blinding(_) => "Blinding",
            AnyGameMessage::PartialUnblinding(_) => "PartialUnblinding",
            AnyGameMessage::PlayerPreflop(_) => "PlayerPreflop",
            AnyGameMessage::PlayerFlop(_) => "PlayerFlop",
            AnyGameMessage::PlayerTurn(_) => "PlayerTurn",
            AnyGameMessage::PlayerRiver(_) => "PlayerRiver",
            AnyGameMessage::Showdown(_) => "Showdown",
        }
    }

    /// Card position a share-bearing message refers to, if any.
    pub fn share_position(&self) -> Option<CardPosition> {
        match self {
            AnyGameMessage::Blinding(msg) => Some(msg.card_position),
            AnyGameMessage::PartialUnblinding(msg) => Some(msg.card_position),
            _ => None,
        }
    }
}

impl From<ShuffleMessage> for AnyGameMessage {
    fn from(message: ShuffleMessage) -> Self {
        AnyGameMessage::Shuffle(message)
    }
}

impl From<BlindingShareMessage> for AnyGameMessage {
    fn from(message: BlindingShareMessage) -> Self {
        AnyGameMessage::Blinding(message)
    }
}

impl From<PartialUnblindingShareMessage> for AnyGameMessage {
    fn from(message: PartialUnblindingShareMessage) -> Self {
        AnyGameMessage::PartialUnblinding(message)
    }
}

impl From<ShowdownMessage> for AnyGameMessage {
    fn from(message: ShowdownMessage) -> Self {
        AnyGameMessage::Showdown(message)
    }
}

/// A signed ledger message as delivered to viewers. The signature has been
/// verified by the backend before finalization; it is carried opaquely for
/// observability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub sequence_id: SequenceId,
    pub hand_id: HandId,
    pub game_id: GameId,
    pub actor: AnyActor,
    pub message: AnyGameMessage,
    pub signature: HexBytes,
    pub public_key: HexBytes,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

/// An envelope plus the outcome of applying it to the backend snapshot
/// chain. `snapshot_sequence_id` is the authoritative ordering key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizedEventEnvelope {
    pub envelope: EventEnvelope,
    pub snapshot_status: SnapshotStatus,
    pub applied_phase: EventPhase,
    pub snapshot_sequence_id: SequenceId,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_timestamp: DateTime<Utc>,
}

impl FinalizedEventEnvelope {
    /// Create a new FinalizedEventEnvelope with the current timestamp
    pub fn new(
        envelope: EventEnvelope,
        snapshot_status: SnapshotStatus,
        applied_phase: EventPhase,
        snapshot_sequence_id: SequenceId,
    ) -> Self {
        Self {
            envelope,
            snapshot_status,
            applied_phase,
            snapshot_sequence_id,
            created_timestamp: Utc::now(),
        }
    }

    /// Create a FinalizedEventEnvelope with an explicit timestamp
    pub fn with_timestamp(
        envelope: EventEnvelope,
        snapshot_status: SnapshotStatus,
        applied_phase: EventPhase,
        snapshot_sequence_id: SequenceId,
        created_timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            envelope,
            snapshot_status,
            applied_phase,
            snapshot_sequence_id,
            created_timestamp,
        }
    }

    pub fn sequence_id(&self) -> SequenceId {
        self.snapshot_sequence_id
    }
}
