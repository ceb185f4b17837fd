use std::fmt;

use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize, Serializer};

pub type GameId = i64;
pub type HandId = i64;
pub type ShufflerId = i64;
pub type PlayerId = u64;
pub type SeatId = u8; // 0..=9
pub type Chips = u64;

/// Ordering key assigned by the backend ledger, unique within a hand.
pub type SequenceId = u64;

/// Index of a card within the shuffled deck.
pub type CardPosition = u8;

pub const DECK_SIZE: usize = 52;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandStatus {
    Pending,
    Shuffling,
    Dealing,
    Betting,
    Showdown,
    Complete,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventPhase {
    Pending,
    Shuffling,
    Dealing,
    Betting,
    Reveals,
    Showdown,
    Complete,
    Cancelled,
}

/// Whether the backend accepted the message into its snapshot chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotStatus {
    Success,
    Failure(String),
}

impl SnapshotStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, SnapshotStatus::Success)
    }
}

/// Opaque cryptographic payload carried as a lowercase hex string on the
/// wire. The client never interprets the bytes; shares, proofs, signatures
/// and public keys all ride in this shape.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HexBytes(Vec<u8>);

/// Public keys are opaque to the client and compared byte-for-byte.
pub type PlayerKey = HexBytes;

impl HexBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn from_hex(value: &str) -> Result<Self, hex::FromHexError> {
        hex::decode(value).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl From<Vec<u8>> for HexBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for HexBytes {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Debug for HexBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HexBytes({})", self.to_hex())
    }
}

impl Serialize for HexBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for HexBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        HexBytes::from_hex(&raw)
            .map_err(|err| DeError::custom(format!("invalid hex payload: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_bytes_round_trips_through_json() {
        let value = HexBytes::new(vec![0xde, 0xad, 0xbe, 0xef]);
        let encoded = serde_json::to_string(&value).unwrap();
        assert_eq!(encoded, "\"deadbeef\"");
        let decoded: HexBytes = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn hex_bytes_rejects_non_hex_input() {
        assert!(serde_json::from_str::<HexBytes>("\"zz\"").is_err());
        assert!(serde_json::from_str::<HexBytes>("\"abc\"").is_err());
    }

    #[test]
    fn snapshot_status_uses_snake_case_tags() {
        let ok = serde_json::to_value(SnapshotStatus::Success).unwrap();
        assert_eq!(ok, serde_json::json!("success"));
        let failed = serde_json::to_value(SnapshotStatus::Failure("bad proof".into())).unwrap();
        assert_eq!(failed, serde_json::json!({ "failure": "bad proof" }));
    }

    #[test]
    fn phase_enums_round_trip_with_serde() {
        for phase in [
            EventPhase::Pending,
            EventPhase::Shuffling,
            EventPhase::Dealing,
            EventPhase::Betting,
            EventPhase::Reveals,
            EventPhase::Showdown,
            EventPhase::Complete,
            EventPhase::Cancelled,
        ] {
            let encoded = serde_json::to_string(&phase).unwrap();
            let decoded: EventPhase = serde_json::from_str(&encoded).unwrap();
            assert_eq!(decoded, phase);
        }
    }
}
