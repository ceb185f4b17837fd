//! Scripted hand generator: a deterministic finalized-event stream shaped
//! like the backend demo endpoint, used by the `replay_demo` binary and by
//! end-to-end tests to drive the engine without a live backend.

use chrono::{DateTime, TimeZone, Utc};

use crate::cards::decode_card;
use crate::protocol::actions::{PlayerBetAction, Street};
use crate::protocol::actor::AnyActor;
use crate::protocol::messages::{
    AnyGameMessage, BlindingShareMessage, EventEnvelope, FinalizedEventEnvelope,
    PartialUnblindingShareMessage, PlayerActionMessage, ShowdownMessage, ShuffleMessage,
};
use crate::protocol::stream_event::StreamEvent;
use crate::protocol::types::{
    CardPosition, GameId, HandId, HexBytes, SeatId, SequenceId, SnapshotStatus,
};

const BASE_TIMESTAMP_MS: i64 = 1_700_000_000_000;
const EVENT_SPACING_MS: i64 = 250;

/// A fully scripted hand: registration, shuffle chain, dealing with both
/// share kinds per card, a betting round, showdown, and reveals.
#[derive(Debug, Clone)]
pub struct DemoScript {
    pub game_id: GameId,
    pub hand_id: HandId,
    pub player_count: usize,
    pub shuffler_count: usize,
    pub events: Vec<StreamEvent>,
}

impl DemoScript {
    /// The ledger envelopes embedded in the script, in sequence order.
    pub fn game_envelopes(&self) -> Vec<FinalizedEventEnvelope> {
        self.events
            .iter()
            .filter_map(|event| match event {
                StreamEvent::GameEvent { envelope } => Some(envelope.clone()),
                _ => None,
            })
            .collect()
    }

    /// Look up one embedded envelope by sequence id, for backfill replies.
    pub fn envelope(&self, sequence_id: SequenceId) -> Option<FinalizedEventEnvelope> {
        self.game_envelopes()
            .into_iter()
            .find(|envelope| envelope.sequence_id() == sequence_id)
    }
}

/// Deterministic player key: recognizable, unique per seat.
pub fn player_key(seat: SeatId) -> HexBytes {
    HexBytes::new(vec![0x50, seat, 0x4b])
}

fn payload(tag: u8, a: u8, b: u8) -> HexBytes {
    HexBytes::new(vec![tag, a, b])
}

fn timestamp(sequence_id: SequenceId) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(BASE_TIMESTAMP_MS + sequence_id as i64 * EVENT_SPACING_MS)
        .single()
        .expect("demo timestamps are valid")
}

struct ScriptBuilder {
    game_id: GameId,
    hand_id: HandId,
    next_seq: SequenceId,
    events: Vec<StreamEvent>,
}

impl ScriptBuilder {
    fn push_game_event(&mut self, actor: AnyActor, message: AnyGameMessage) {
        let sequence_id = self.next_seq;
        self.next_seq += 1;
        let applied_phase = message.phase();
        let envelope = EventEnvelope {
            sequence_id,
            hand_id: self.hand_id,
            game_id: self.game_id,
            actor,
            message,
            signature: payload(0x51, sequence_id as u8, 0),
            public_key: payload(0x4b, sequence_id as u8, 0),
            timestamp: timestamp(sequence_id),
        };
        self.events.push(StreamEvent::GameEvent {
            envelope: FinalizedEventEnvelope::with_timestamp(
                envelope,
                SnapshotStatus::Success,
                applied_phase,
                sequence_id,
                timestamp(sequence_id),
            ),
        });
    }
}

/// Build the scripted hand. Hole cards for seat `s` land at deck positions
/// `2s` and `2s + 1`; their plaintexts follow the product-wide index
/// mapping so reveals are stable across runs.
pub fn scripted_hand(
    game_id: GameId,
    hand_id: HandId,
    player_count: usize,
    shuffler_count: usize,
) -> DemoScript {
    let mut builder = ScriptBuilder {
        game_id,
        hand_id,
        next_seq: 0,
        events: Vec::new(),
    };

    for seat in 0..player_count as SeatId {
        builder.events.push(StreamEvent::PlayerCreated {
            game_id,
            seat,
            display_name: format!("player-{seat}"),
            public_key: player_key(seat),
        });
    }

    builder.events.push(StreamEvent::HandCreated {
        game_id,
        hand_id,
        player_count,
        shuffler_count,
        snapshot: serde_json::json!({ "phase": "shuffling" }),
    });

    for turn in 0..shuffler_count {
        builder.push_game_event(
            AnyActor::Shuffler {
                shuffler_id: turn as i64,
            },
            AnyGameMessage::Shuffle(ShuffleMessage {
                turn_index: turn as u16,
                deck_in: payload(0xd0, turn as u8, 0),
                deck_out: payload(0xd1, turn as u8, 0),
                proof: payload(0xf0, turn as u8, 0),
            }),
        );
    }

    for seat in 0..player_count as SeatId {
        for hole in 0..2u8 {
            let position: CardPosition = seat * 2 + hole;
            let target = player_key(seat);

            for shuffler in 0..shuffler_count as i64 {
                builder.push_game_event(
                    AnyActor::Shuffler {
                        shuffler_id: shuffler,
                    },
                    AnyGameMessage::Blinding(BlindingShareMessage {
                        card_position: position,
                        share: payload(0xb0, position, shuffler as u8),
                        target_player_key: target.clone(),
                    }),
                );
            }
            for shuffler in 0..shuffler_count as i64 {
                builder.push_game_event(
                    AnyActor::Shuffler {
                        shuffler_id: shuffler,
                    },
                    AnyGameMessage::PartialUnblinding(PartialUnblindingShareMessage {
                        card_position: position,
                        share: payload(0xe0, position, shuffler as u8),
                        target_player_key: target.clone(),
                    }),
                );
            }

            builder.events.push(StreamEvent::CardDecryptable {
                game_id,
                hand_id,
                seat,
                card_position: position as usize,
            });
        }
    }

    for seat in 0..player_count as SeatId {
        let action = if seat == 0 {
            PlayerBetAction::BetTo { to: 100 }
        } else {
            PlayerBetAction::Call
        };
        builder.push_game_event(
            AnyActor::Player {
                seat_id: seat,
                player_id: u64::from(seat) + 100,
            },
            AnyGameMessage::PlayerPreflop(PlayerActionMessage {
                street: Street::Preflop,
                action,
            }),
        );
    }

    builder.push_game_event(
        AnyActor::Player {
            seat_id: 0,
            player_id: 100,
        },
        AnyGameMessage::Showdown(ShowdownMessage {
            card_positions: [0, 1],
            hole_ciphertexts: [payload(0xc0, 0, 0), payload(0xc0, 1, 0)],
            proofs: [payload(0xf1, 0, 0), payload(0xf1, 1, 0)],
        }),
    );

    // Reveals come last so every share has been streamed by the time the
    // plaintexts land.
    for seat in 0..player_count as SeatId {
        for hole in 0..2u8 {
            let position = seat * 2 + hole;
            builder.events.push(StreamEvent::HoleCardsDecrypted {
                game_id,
                hand_id,
                seat,
                card_position: position as usize,
                card: decode_card(position + 1).expect("demo positions stay within the deck"),
            });
        }
    }

    builder.events.push(StreamEvent::HandCompleted { game_id, hand_id });

    DemoScript {
        game_id,
        hand_id,
        player_count,
        shuffler_count,
        events: builder.events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{HandSession, SessionConfig};

    #[test]
    fn script_sequences_are_contiguous_from_zero() {
        let script = scripted_hand(1, 2, 3, 2);
        let ids: Vec<_> = script
            .game_envelopes()
            .iter()
            .map(|e| e.sequence_id())
            .collect();
        let expected: Vec<u64> = (0..ids.len() as u64).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn full_script_replays_cleanly_through_a_session() {
        let script = scripted_hand(1, 2, 2, 3);
        let mut session = HandSession::new(SessionConfig {
            required_share_count: script.shuffler_count,
            ..SessionConfig::default()
        });

        let mut decryptable = Vec::new();
        for event in script.events.clone() {
            let update = session.on_stream_event(event).expect("script replays cleanly");
            assert!(update.gap.is_none());
            decryptable.extend(update.newly_decryptable);
        }

        // Two hole cards per player, each unlocked exactly once.
        assert_eq!(decryptable.len(), script.player_count * 2);
        for position in 0..(script.player_count * 2) as u8 {
            let state = session.card_state(position).unwrap();
            assert!(state.revealed);
            assert_eq!(state.target_seat, position / 2);
        }
    }
}
