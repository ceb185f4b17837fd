use std::collections::BTreeMap;

use crate::protocol::actor::AnyActor;
use crate::protocol::messages::{AnyGameMessage, FinalizedEventEnvelope};
use crate::protocol::types::{CardPosition, HexBytes, PlayerKey, SeatId, DECK_SIZE};

use super::card::Card;
use super::state::{CardDecryptionState, CardStateError, ContributorId};

const LOG_TARGET: &str = "cards::tracker";

/// Outcome of routing one share-bearing envelope into the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareApplied {
    pub position: CardPosition,
    /// Set on the exact application that completed the threshold.
    pub newly_decryptable: bool,
}

/// Per-hand card state registry: one [`CardDecryptionState`] per position
/// that has (or will) receive shares. States are replaced wholesale on each
/// transition, so a reference handed to the renderer stays consistent.
///
/// Contributor identity is trusted as delivered; signatures were checked
/// before finalization, upstream of this client.
#[derive(Debug)]
pub struct CardTracker {
    required_count: usize,
    eager: bool,
    seats: BTreeMap<PlayerKey, SeatId>,
    states: BTreeMap<CardPosition, CardDecryptionState>,
}

impl CardTracker {
    /// Tracker that creates card states lazily, on the first share that
    /// references a position.
    pub fn new(required_count: usize) -> Self {
        Self {
            required_count,
            eager: false,
            seats: BTreeMap::new(),
            states: BTreeMap::new(),
        }
    }

    /// Tracker with a state for every deck position up front.
    pub fn eager(required_count: usize) -> Self {
        let mut tracker = Self::new(required_count);
        tracker.eager = true;
        tracker.seed_deck();
        tracker
    }

    fn seed_deck(&mut self) {
        for position in 0..DECK_SIZE as CardPosition {
            self.states.insert(
                position,
                CardDecryptionState::new(position, HexBytes::default(), 0, self.required_count),
            );
        }
    }

    pub fn required_count(&self) -> usize {
        self.required_count
    }

    /// Record which seat a player key belongs to, so card states can carry
    /// their target seat for the renderer. Arrives via `player_created`.
    pub fn register_player(&mut self, key: PlayerKey, seat: SeatId) {
        self.seats.insert(key, seat);
    }

    /// Route one finalized envelope. Only share-bearing messages from
    /// shufflers mutate state; everything else passes through untouched.
    /// Envelopes the backend rejected carry no applied shares and are
    /// skipped.
    pub fn apply_message(&mut self, finalized: &FinalizedEventEnvelope) -> Option<ShareApplied> {
        if !finalized.snapshot_status.is_success() {
            tracing::debug!(
                target: LOG_TARGET,
                sequence_id = finalized.sequence_id(),
                "skipping shares from rejected envelope"
            );
            return None;
        }

        let (position, share, target_key, is_blinding) = match &finalized.envelope.message {
            AnyGameMessage::Blinding(msg) => (
                msg.card_position,
                msg.share.clone(),
                msg.target_player_key.clone(),
                true,
            ),
            AnyGameMessage::PartialUnblinding(msg) => (
                msg.card_position,
                msg.share.clone(),
                msg.target_player_key.clone(),
                false,
            ),
            _ => return None,
        };

        let contributor = match finalized.envelope.actor {
            AnyActor::Shuffler { shuffler_id } => shuffler_id,
            ref other => {
                tracing::warn!(
                    target: LOG_TARGET,
                    sequence_id = finalized.sequence_id(),
                    actor = ?other,
                    "share-bearing message from non-shuffler actor, ignoring"
                );
                return None;
            }
        };

        Some(self.apply_share(position, target_key, contributor, share, is_blinding))
    }

    fn apply_share(
        &mut self,
        position: CardPosition,
        target_key: PlayerKey,
        contributor: ContributorId,
        share: HexBytes,
        is_blinding: bool,
    ) -> ShareApplied {
        let target_seat = self.seats.get(&target_key).copied().unwrap_or_default();
        let required_count = self.required_count;
        let state = self.states.entry(position).or_insert_with(|| {
            CardDecryptionState::new(position, target_key.clone(), target_seat, required_count)
        });

        // Eagerly created states learn their target on the first share.
        if state.target_player_key.is_empty() {
            state.target_player_key = target_key;
            state.target_seat = target_seat;
        }

        let was_decryptable = state.decryptable;
        let next = if is_blinding {
            state.with_blinding_share(contributor, share)
        } else {
            state.with_unblinding_share(contributor, share)
        };
        let newly_decryptable = next.decryptable && !was_decryptable;
        if newly_decryptable {
            tracing::debug!(
                target: LOG_TARGET,
                position,
                seat = next.target_seat,
                "card reached decryption threshold"
            );
        }
        *state = next;

        ShareApplied {
            position,
            newly_decryptable,
        }
    }

    /// Apply an externally computed plaintext to a tracked card.
    pub fn reveal(
        &mut self,
        position: CardPosition,
        card: Card,
    ) -> Result<&CardDecryptionState, CardStateError> {
        let state = self
            .states
            .get_mut(&position)
            .ok_or(CardStateError::Untracked { position })?;
        *state = state.reveal(card)?;
        Ok(state)
    }

    pub fn mark_in_flight(&mut self, position: CardPosition) {
        if let Some(state) = self.states.get_mut(&position) {
            *state = state.in_flight();
        }
    }

    pub fn mark_landed(&mut self, position: CardPosition) {
        if let Some(state) = self.states.get_mut(&position) {
            *state = state.landed();
        }
    }

    pub fn state(&self, position: CardPosition) -> Option<&CardDecryptionState> {
        self.states.get(&position)
    }

    pub fn states(&self) -> impl Iterator<Item = &CardDecryptionState> {
        self.states.values()
    }

    pub fn tracked_len(&self) -> usize {
        self.states.len()
    }

    pub fn decryptable_positions(&self) -> Vec<CardPosition> {
        self.states
            .values()
            .filter(|state| state.decryptable)
            .map(|state| state.position)
            .collect()
    }

    /// Discard every card state. Seat registrations survive: players stay
    /// at the table across hands; the cards do not.
    pub fn reset(&mut self) {
        tracing::info!(
            target: LOG_TARGET,
            discarded = self.states.len(),
            "card tracker reset"
        );
        self.states.clear();
        if self.eager {
            self.seed_deck();
        }
    }
}
