//! Per-hand replay session: validate → sequence → dispatch → aggregate.
//!
//! One `HandSession` is owned by one hand-viewing surface. Everything is
//! synchronous; suspension lives at the transport boundary outside this
//! crate.

use crate::cards::{CardDecryptionState, CardStateError, CardTracker};
use crate::protocol::messages::FinalizedEventEnvelope;
use crate::protocol::parse::{parse_envelope, ValidationError};
use crate::protocol::stream_event::StreamEvent;
use crate::protocol::types::{CardPosition, GameId, HandId, SequenceId};
use crate::replay::{BackfillRequest, Sequencer, SequencerDiagnostics};

const LOG_TARGET: &str = "session";

/// Tuning knobs for a hand-viewing session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Distinct contributors required per share kind before a card unlocks.
    pub required_share_count: usize,
    /// Buffered-envelope count beyond which a hard resync is recommended.
    pub pending_resync_threshold: usize,
    /// Create card states for every deck position at hand start instead of
    /// lazily on first share.
    pub eager_card_states: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            required_share_count: 3,
            pending_resync_threshold: 64,
            eager_card_states: false,
        }
    }
}

/// What one ingestion call produced for the presentation layer.
#[derive(Debug, Default)]
pub struct SessionUpdate {
    /// Events released in strict sequence order.
    pub applied: Vec<FinalizedEventEnvelope>,
    /// Set when the stream is stalled awaiting these ids.
    pub gap: Option<BackfillRequest>,
    /// Card positions that reached their threshold during this call.
    pub newly_decryptable: Vec<CardPosition>,
    /// The pending buffer has outgrown the configured tolerance.
    pub needs_resync: bool,
}

/// Combined view of buffered and aggregated state for diagnostics panes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDiagnostics {
    pub sequencer: SequencerDiagnostics,
    pub tracked_cards: usize,
    pub decryptable_cards: usize,
    pub needs_resync: bool,
}

pub struct HandSession {
    config: SessionConfig,
    game_id: Option<GameId>,
    hand_id: Option<HandId>,
    sequencer: Sequencer,
    cards: CardTracker,
}

impl HandSession {
    pub fn new(config: SessionConfig) -> Self {
        let cards = if config.eager_card_states {
            CardTracker::eager(config.required_share_count)
        } else {
            CardTracker::new(config.required_share_count)
        };
        Self {
            config,
            game_id: None,
            hand_id: None,
            sequencer: Sequencer::new(),
            cards,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn card_state(&self, position: CardPosition) -> Option<&CardDecryptionState> {
        self.cards.state(position)
    }

    pub fn card_states(&self) -> impl Iterator<Item = &CardDecryptionState> {
        self.cards.states()
    }

    /// Animation hooks driven by the page layer: a card leaves the deck...
    pub fn mark_card_in_flight(&mut self, position: CardPosition) {
        self.cards.mark_in_flight(position);
    }

    /// ...and lands at its seat, after which reveals may play.
    pub fn mark_card_landed(&mut self, position: CardPosition) {
        self.cards.mark_landed(position);
    }

    /// Validate and ingest one envelope from its JSON text. Malformed input
    /// is dropped with a logged diagnostic and never stalls the sequencer.
    pub fn ingest_raw(&mut self, raw: &str) -> SessionUpdate {
        match parse_envelope(raw) {
            Ok(envelope) => self.ingest(envelope),
            Err(error) => {
                self.log_dropped(&error);
                SessionUpdate::default()
            }
        }
    }

    /// Ingest one already-validated envelope from the live stream.
    pub fn ingest(&mut self, finalized: FinalizedEventEnvelope) -> SessionUpdate {
        self.game_id.get_or_insert(finalized.envelope.game_id);
        self.hand_id.get_or_insert(finalized.envelope.hand_id);

        let outcome = self.sequencer.observe(finalized);
        self.finish_update(outcome.ready, outcome.gap.then_some(outcome.missing))
    }

    /// Fold a backfill response into the stream.
    pub fn ingest_backfill(
        &mut self,
        batch: impl IntoIterator<Item = FinalizedEventEnvelope>,
    ) -> SessionUpdate {
        let outcome = self.sequencer.observe_batch(batch);
        self.finish_update(outcome.ready, outcome.gap.then_some(outcome.missing))
    }

    /// Route one stream item. Ledger activity goes through ingestion;
    /// reveal-type events update card state directly.
    pub fn on_stream_event(&mut self, event: StreamEvent) -> Result<SessionUpdate, CardStateError> {
        match event {
            StreamEvent::GameEvent { envelope } => Ok(self.ingest(envelope)),
            StreamEvent::PlayerCreated {
                seat, public_key, ..
            } => {
                self.cards.register_player(public_key, seat);
                Ok(SessionUpdate::default())
            }
            StreamEvent::HandCreated {
                game_id, hand_id, ..
            } => {
                tracing::info!(target: LOG_TARGET, game_id, hand_id, "new hand commenced");
                self.start_hand(game_id, hand_id);
                Ok(SessionUpdate::default())
            }
            StreamEvent::HoleCardsDecrypted {
                card_position,
                card,
                ..
            } => {
                self.cards.reveal(card_position as CardPosition, card)?;
                Ok(SessionUpdate::default())
            }
            StreamEvent::CardDecryptable {
                seat,
                card_position,
                ..
            } => {
                // Advisory only: our own aggregation decides locally.
                tracing::debug!(
                    target: LOG_TARGET,
                    seat,
                    card_position,
                    "backend reports card decryptable"
                );
                Ok(SessionUpdate::default())
            }
            StreamEvent::CommunityDecrypted { cards, .. } => {
                tracing::debug!(
                    target: LOG_TARGET,
                    count = cards.len(),
                    "community board decrypted"
                );
                Ok(SessionUpdate::default())
            }
            StreamEvent::HandCompleted { hand_id, .. } => {
                tracing::info!(target: LOG_TARGET, hand_id, "hand completed");
                Ok(SessionUpdate::default())
            }
        }
    }

    /// Discard all buffered and aggregated state and pin the sequence
    /// window. The only cancellation primitive; any in-flight backfill
    /// response must be ignored by the caller afterward.
    pub fn reset(&mut self, starting_seq: SequenceId) {
        self.sequencer.reset(starting_seq);
        self.cards.reset();
    }

    pub fn diagnostics(&self) -> SessionDiagnostics {
        SessionDiagnostics {
            sequencer: self.sequencer.diagnostics(),
            tracked_cards: self.cards.tracked_len(),
            decryptable_cards: self.cards.decryptable_positions().len(),
            needs_resync: self
                .sequencer
                .needs_resync(self.config.pending_resync_threshold),
        }
    }

    fn start_hand(&mut self, game_id: GameId, hand_id: HandId) {
        self.game_id = Some(game_id);
        self.hand_id = Some(hand_id);
        // Fresh window: the first finalized envelope of the hand pins it.
        self.sequencer = Sequencer::new();
        self.cards.reset();
    }

    fn finish_update(
        &mut self,
        ready: Vec<FinalizedEventEnvelope>,
        missing: Option<Vec<SequenceId>>,
    ) -> SessionUpdate {
        let mut newly_decryptable = Vec::new();
        for envelope in &ready {
            tracing::trace!(
                target: LOG_TARGET,
                sequence_id = envelope.sequence_id(),
                kind = envelope.envelope.message.kind(),
                "event released in order"
            );
            if let Some(applied) = self.cards.apply_message(envelope) {
                if applied.newly_decryptable {
                    newly_decryptable.push(applied.position);
                }
            }
        }

        let gap = missing.filter(|ids| !ids.is_empty()).map(|ids| {
            BackfillRequest::new(
                self.game_id.unwrap_or_default(),
                self.hand_id.unwrap_or_default(),
                ids,
            )
        });

        SessionUpdate {
            applied: ready,
            gap,
            newly_decryptable,
            needs_resync: self
                .sequencer
                .needs_resync(self.config.pending_resync_threshold),
        }
    }

    fn log_dropped(&self, error: &ValidationError) {
        match error {
            ValidationError::UnknownMessageKind { kind } => {
                tracing::warn!(target: LOG_TARGET, kind = %kind, "dropping envelope with unknown message kind");
            }
            other => {
                tracing::warn!(target: LOG_TARGET, error = %other, "dropping malformed envelope");
            }
        }
    }
}
