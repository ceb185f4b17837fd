use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol::types::{CardPosition, HexBytes, PlayerKey, SeatId, ShufflerId};

use super::card::Card;

/// Parties contributing decryption shares are shufflers; their ledger id is
/// the dedup key for both share kinds.
pub type ContributorId = ShufflerId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CardStateError {
    /// Reveal was requested before both share maps reached the threshold.
    #[error(
        "reveal requested for card {position} before it is decryptable \
         ({collected}/{required} shares)"
    )]
    RevealBeforeDecryptable {
        position: CardPosition,
        collected: usize,
        required: usize,
    },

    /// Reveal addressed a position with no tracked card state.
    #[error("no card state tracked for position {position}")]
    Untracked { position: CardPosition },
}

/// Collected-vs-required share counts across both kinds, for UI meters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareProgress {
    pub collected: usize,
    pub required: usize,
}

impl ShareProgress {
    pub fn ratio(&self) -> f32 {
        if self.required == 0 {
            return 1.0;
        }
        (self.collected as f32 / self.required as f32).min(1.0)
    }

    pub fn is_complete(&self) -> bool {
        self.collected >= self.required
    }
}

/// Decryption-readiness bookkeeping for one card position.
///
/// The value is immutable: every transition returns a new state, so a
/// renderer can keep reading an old snapshot while the next one is built.
/// Shares accumulate monotonically; a contributor re-sending overwrites its
/// own entry and never double-counts. `decryptable` is defined solely by
/// both maps reaching `required_count`; contributor admission is handled
/// upstream by signature verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDecryptionState {
    pub position: CardPosition,
    pub target_player_key: PlayerKey,
    pub target_seat: SeatId,
    pub required_count: usize,
    blinding_shares: BTreeMap<ContributorId, HexBytes>,
    unblinding_shares: BTreeMap<ContributorId, HexBytes>,
    pub decryptable: bool,
    pub revealed: bool,
    pub display_card: Option<Card>,
    /// Deal animation is in flight toward the seat.
    pub flying: bool,
    /// Deal animation has landed; reveals may play.
    pub arrived: bool,
}

impl CardDecryptionState {
    pub fn new(
        position: CardPosition,
        target_player_key: PlayerKey,
        target_seat: SeatId,
        required_count: usize,
    ) -> Self {
        Self {
            position,
            target_player_key,
            target_seat,
            required_count,
            blinding_shares: BTreeMap::new(),
            unblinding_shares: BTreeMap::new(),
            decryptable: false,
            revealed: false,
            display_card: None,
            flying: false,
            arrived: false,
        }
    }

    pub fn with_blinding_share(&self, contributor: ContributorId, share: HexBytes) -> Self {
        let mut next = self.clone();
        next.blinding_shares.insert(contributor, share);
        next.recompute_decryptable();
        next
    }

    pub fn with_unblinding_share(&self, contributor: ContributorId, share: HexBytes) -> Self {
        let mut next = self.clone();
        next.unblinding_shares.insert(contributor, share);
        next.recompute_decryptable();
        next
    }

    /// Attach the plaintext card once the cryptographic layer has produced
    /// it. Rejected while the threshold is unmet; revealing is one-way.
    pub fn reveal(&self, display_card: Card) -> Result<Self, CardStateError> {
        if !self.decryptable {
            let progress = self.progress();
            return Err(CardStateError::RevealBeforeDecryptable {
                position: self.position,
                collected: progress.collected,
                required: progress.required,
            });
        }
        let mut next = self.clone();
        next.revealed = true;
        next.display_card = Some(display_card);
        Ok(next)
    }

    /// Mark the deal animation as launched toward the seat.
    pub fn in_flight(&self) -> Self {
        let mut next = self.clone();
        next.flying = true;
        next
    }

    /// Mark the deal animation as landed.
    pub fn landed(&self) -> Self {
        let mut next = self.clone();
        next.flying = false;
        next.arrived = true;
        next
    }

    pub fn blinding_count(&self) -> usize {
        self.blinding_shares.len()
    }

    pub fn unblinding_count(&self) -> usize {
        self.unblinding_shares.len()
    }

    /// Combined progress across both share kinds.
    pub fn progress(&self) -> ShareProgress {
        ShareProgress {
            collected: self.blinding_shares.len() + self.unblinding_shares.len(),
            required: self.required_count * 2,
        }
    }

    fn recompute_decryptable(&mut self) {
        self.decryptable = self.blinding_shares.len() >= self.required_count
            && self.unblinding_shares.len() >= self.required_count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::card::{decode_card, idx_of, Suit};
    use crate::test_utils::fixtures::sample_target_key;

    fn share(byte: u8) -> HexBytes {
        HexBytes::new(vec![byte])
    }

    fn fresh(required: usize) -> CardDecryptionState {
        CardDecryptionState::new(7, sample_target_key(), 2, required)
    }

    #[test]
    fn decryptable_flips_exactly_when_both_kinds_reach_threshold() {
        let mut state = fresh(3);
        for contributor in 0..3i64 {
            state = state.with_blinding_share(contributor, share(contributor as u8));
            assert!(!state.decryptable);
        }
        for contributor in 0..2i64 {
            state = state.with_unblinding_share(contributor, share(contributor as u8));
            assert!(!state.decryptable);
        }
        state = state.with_unblinding_share(2, share(9));
        assert!(state.decryptable);

        // Further duplicates never clear the flag.
        let state = state.with_unblinding_share(2, share(10));
        assert!(state.decryptable);
    }

    #[test]
    fn duplicate_contributor_overwrites_instead_of_double_counting() {
        let state = fresh(2)
            .with_blinding_share(1, share(1))
            .with_blinding_share(1, share(2));
        assert_eq!(state.blinding_count(), 1);
        assert!(!state.decryptable);
    }

    #[test]
    fn extra_contributors_beyond_threshold_are_still_recorded() {
        let mut state = fresh(2);
        for contributor in 0..3i64 {
            state = state
                .with_blinding_share(contributor, share(1))
                .with_unblinding_share(contributor, share(2));
        }
        assert!(state.decryptable);
        assert_eq!(state.blinding_count(), 3);
        assert_eq!(state.unblinding_count(), 3);
    }

    #[test]
    fn reveal_before_decryptable_is_a_typed_error() {
        let state = fresh(2).with_blinding_share(0, share(1));
        let card = decode_card(idx_of(14, Suit::Spades)).unwrap();
        let err = state.reveal(card).unwrap_err();
        assert_eq!(
            err,
            CardStateError::RevealBeforeDecryptable {
                position: 7,
                collected: 1,
                required: 4,
            }
        );
        assert!(!state.revealed);
    }

    #[test]
    fn reveal_attaches_the_display_card_once_decryptable() {
        let mut state = fresh(1);
        state = state
            .with_blinding_share(0, share(1))
            .with_unblinding_share(0, share(2));
        let card = decode_card(idx_of(12, Suit::Hearts)).unwrap();
        let state = state.reveal(card).unwrap();
        assert!(state.revealed);
        assert_eq!(state.display_card, Some(card));
    }

    #[test]
    fn transitions_leave_the_prior_snapshot_untouched() {
        let before = fresh(1);
        let after = before.with_blinding_share(0, share(1));
        assert_eq!(before.blinding_count(), 0);
        assert_eq!(after.blinding_count(), 1);
    }

    #[test]
    fn animation_flags_progress_one_way() {
        let state = fresh(1).in_flight();
        assert!(state.flying);
        assert!(!state.arrived);
        let state = state.landed();
        assert!(!state.flying);
        assert!(state.arrived);
    }

    #[test]
    fn progress_combines_both_share_kinds() {
        let state = fresh(2)
            .with_blinding_share(0, share(1))
            .with_unblinding_share(0, share(2))
            .with_unblinding_share(1, share(3));
        let progress = state.progress();
        assert_eq!(progress.collected, 3);
        assert_eq!(progress.required, 4);
        assert!((progress.ratio() - 0.75).abs() < f32::EPSILON);
        assert!(!progress.is_complete());
    }
}
