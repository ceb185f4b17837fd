use serde::{Deserialize, Serialize};

use super::types::{PlayerId, SeatId, ShufflerId};

/// Originator of a ledger message as reported by the backend. System-issued
/// envelopes (phase bookkeeping) carry `None`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum AnyActor {
    None,
    Player {
        seat_id: SeatId,
        player_id: PlayerId,
    },
    Shuffler {
        shuffler_id: ShufflerId,
    },
}

impl Default for AnyActor {
    fn default() -> Self {
        AnyActor::None
    }
}

impl AnyActor {
    pub fn is_shuffler(&self) -> bool {
        matches!(self, AnyActor::Shuffler { .. })
    }

    pub fn is_player(&self) -> bool {
        matches!(self, AnyActor::Player { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actor_variants_round_trip_with_serde() {
        for actor in [
            AnyActor::None,
            AnyActor::Player {
                seat_id: 2,
                player_id: 99,
            },
            AnyActor::Shuffler { shuffler_id: 7 },
        ] {
            let encoded = serde_json::to_string(&actor).unwrap();
            let decoded: AnyActor = serde_json::from_str(&encoded).unwrap();
            assert_eq!(decoded, actor);
        }
    }
}
