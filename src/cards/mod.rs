//! Per-card decryption readiness: the threshold-share aggregator, the
//! per-hand tracker that feeds it, and the display card model.

pub mod card;
pub mod state;
pub mod tracker;

pub use card::{decode_card, idx_of, Card, Index, Rank, Suit};
pub use state::{CardDecryptionState, CardStateError, ContributorId, ShareProgress};
pub use tracker::{CardTracker, ShareApplied};
