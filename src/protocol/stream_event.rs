use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cards::Card;

use super::messages::FinalizedEventEnvelope;
use super::types::{GameId, HandId, HexBytes, SeatId};

/// Events delivered over the table streaming endpoint. The shape mirrors
/// what the backend emits; `snapshot` payloads are forwarded to the page
/// layer untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Viewer player registration (NPCs are not emitted).
    PlayerCreated {
        game_id: GameId,
        seat: SeatId,
        display_name: String,
        public_key: HexBytes,
    },

    /// Hand has been commenced and the initial shuffling snapshot is ready.
    HandCreated {
        game_id: GameId,
        hand_id: HandId,
        player_count: usize,
        shuffler_count: usize,
        snapshot: Value,
    },

    /// Raw ledger activity (shuffle proofs, dealing messages, etc.).
    GameEvent {
        #[serde(flatten)]
        envelope: FinalizedEventEnvelope,
    },

    /// Community board decrypted on the backend (revealed cards).
    CommunityDecrypted {
        game_id: GameId,
        hand_id: HandId,
        cards: Vec<Card>,
    },

    /// A player can now decrypt their card (has all unblinding shares).
    CardDecryptable {
        game_id: GameId,
        hand_id: HandId,
        seat: SeatId,
        card_position: usize,
    },

    /// Single hole card decrypted (revealed card value).
    /// Emitted once per card for real-time reveals.
    HoleCardsDecrypted {
        game_id: GameId,
        hand_id: HandId,
        seat: SeatId,
        card_position: usize,
        card: Card,
    },

    /// Hand considered complete for demo purposes.
    HandCompleted { game_id: GameId, hand_id: HandId },
}

/// Wire tags of [`StreamEvent`], in variant order.
pub const STREAM_EVENT_KINDS: [&str; 7] = [
    "player_created",
    "hand_created",
    "game_event",
    "community_decrypted",
    "card_decryptable",
    "hole_cards_decrypted",
    "hand_completed",
];

impl StreamEvent {
    pub fn event_name(&self) -> &'static str {
        match self {
            StreamEvent::PlayerCreated { .. } => "player_created",
            StreamEvent::HandCreated { .. } => "hand_created",
            StreamEvent::GameEvent { .. } => "game_event",
            StreamEvent::CommunityDecrypted { .. } => "community_decrypted",
            StreamEvent::CardDecryptable { .. } => "card_decryptable",
            StreamEvent::HoleCardsDecrypted { .. } => "hole_cards_decrypted",
            StreamEvent::HandCompleted { .. } => "hand_completed",
        }
    }
}
