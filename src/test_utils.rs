//! Common test utilities: serde round-trip assertions and envelope fixtures.

/// Helpers shared across test modules.
pub mod serde {
    use std::fmt::Debug;

    /// Assert that a value survives a serde_json round-trip using structural equality.
    pub fn assert_round_trip_eq<T>(value: &T)
    where
        T: ::serde::Serialize + ::serde::de::DeserializeOwned + PartialEq + Debug,
    {
        let json = serde_json::to_string(value)
            .expect("serialization should succeed during round-trip testing");
        let restored: T = serde_json::from_str(&json)
            .expect("deserialization should succeed during round-trip testing");
        assert_eq!(restored, *value, "serde_json round-trip altered the value");
    }

    /// Assert that serde_json emits the same payload before and after round-tripping.
    pub fn assert_round_trip_json<T>(value: &T)
    where
        T: ::serde::Serialize + ::serde::de::DeserializeOwned,
    {
        let json = serde_json::to_value(value)
            .expect("serialization to value should succeed during round-trip testing");
        let restored: T = serde_json::from_value(json.clone())
            .expect("deserialization from value should succeed during round-trip testing");
        let json_after = serde_json::to_value(restored)
            .expect("re-serialization should succeed during round-trip testing");
        assert_eq!(
            json_after, json,
            "serde_json round-trip altered the payload"
        );
    }
}

/// Envelope builders shared across replay/session tests.
pub mod fixtures {
    use chrono::{TimeZone, Utc};

    use crate::protocol::actions::{PlayerBetAction, Street};
    use crate::protocol::actor::AnyActor;
    use crate::protocol::messages::{
        AnyGameMessage, BlindingShareMessage, EventEnvelope, FinalizedEventEnvelope,
        PartialUnblindingShareMessage, PlayerActionMessage,
    };
    use crate::protocol::types::{
        CardPosition, HexBytes, PlayerKey, SeatId, SequenceId, ShufflerId, SnapshotStatus,
    };

    pub fn sample_target_key() -> PlayerKey {
        HexBytes::new(vec![0xaa, 0xbb])
    }

    pub fn finalize(
        sequence_id: SequenceId,
        actor: AnyActor,
        message: AnyGameMessage,
    ) -> FinalizedEventEnvelope {
        let applied_phase = message.phase();
        let envelope = EventEnvelope {
            sequence_id,
            hand_id: 30,
            game_id: 40,
            actor,
            message,
            signature: HexBytes::new(vec![4, 5, 6]),
            public_key: HexBytes::new(vec![7, 7]),
            timestamp: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
        };
        FinalizedEventEnvelope::with_timestamp(
            envelope,
            SnapshotStatus::Success,
            applied_phase,
            sequence_id,
            Utc.timestamp_millis_opt(1_700_000_000_500).unwrap(),
        )
    }

    /// A finalized blinding-share envelope, the workhorse fixture.
    pub fn finalized_envelope(sequence_id: SequenceId) -> FinalizedEventEnvelope {
        blinding_envelope(sequence_id, 1, 7, sample_target_key())
    }

    pub fn blinding_envelope(
        sequence_id: SequenceId,
        shuffler_id: ShufflerId,
        card_position: CardPosition,
        target_player_key: PlayerKey,
    ) -> FinalizedEventEnvelope {
        finalize(
            sequence_id,
            AnyActor::Shuffler { shuffler_id },
            AnyGameMessage::Blinding(BlindingShareMessage {
                card_position,
                share: HexBytes::new(vec![1, 2, 3]),
                target_player_key,
            }),
        )
    }

    pub fn unblinding_envelope(
        sequence_id: SequenceId,
        shuffler_id: ShufflerId,
        card_position: CardPosition,
        target_player_key: PlayerKey,
    ) -> FinalizedEventEnvelope {
        finalize(
            sequence_id,
            AnyActor::Shuffler { shuffler_id },
            AnyGameMessage::PartialUnblinding(PartialUnblindingShareMessage {
                card_position,
                share: HexBytes::new(vec![3, 2, 1]),
                target_player_key,
            }),
        )
    }

    pub fn player_action_envelope(
        sequence_id: SequenceId,
        seat_id: SeatId,
        street: Street,
        action: PlayerBetAction,
    ) -> FinalizedEventEnvelope {
        let message = PlayerActionMessage { street, action };
        let message = match street {
            Street::Preflop => AnyGameMessage::PlayerPreflop(message),
            Street::Flop => AnyGameMessage::PlayerFlop(message),
            Street::Turn => AnyGameMessage::PlayerTurn(message),
            Street::River => AnyGameMessage::PlayerRiver(message),
        };
        finalize(
            sequence_id,
            AnyActor::Player {
                seat_id,
                player_id: u64::from(seat_id) + 100,
            },
            message,
        )
    }
}
