use std::collections::BTreeMap;

use crate::protocol::messages::FinalizedEventEnvelope;
use crate::protocol::types::SequenceId;

const LOG_TARGET: &str = "replay::sequencer";

/// Result of feeding envelopes to the sequencer.
///
/// `ready` holds the contiguous run drained by this call, in strictly
/// increasing sequence order. When `gap` is set, `missing` lists the ids the
/// caller should backfill before the stream can advance.
#[derive(Debug, Default)]
pub struct ObserveOutcome {
    pub gap: bool,
    pub missing: Vec<SequenceId>,
    pub ready: Vec<FinalizedEventEnvelope>,
}

/// Snapshot of buffered state for reconnect decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencerDiagnostics {
    pub expected: Option<SequenceId>,
    pub pending_count: usize,
    pub oldest_missing: Option<SequenceId>,
    pub newest_missing: Option<SequenceId>,
}

/// Reorders a possibly lossy, possibly out-of-order delivery of finalized
/// envelopes into a strictly increasing, gap-free stream.
///
/// The window starts at the first observed id (the backend does not promise
/// delivery from zero) or wherever [`Sequencer::reset`] pins it. Ids below
/// the window are duplicates of already-emitted events and are dropped.
#[derive(Debug, Default)]
pub struct Sequencer {
    expected: Option<SequenceId>,
    pending: BTreeMap<SequenceId, FinalizedEventEnvelope>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id to emit, once initialized.
    pub fn expected(&self) -> Option<SequenceId> {
        self.expected
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Buffered ids in ascending order.
    pub fn pending_ids(&self) -> Vec<SequenceId> {
        self.pending.keys().copied().collect()
    }

    /// Feed one envelope from the live stream.
    pub fn observe(&mut self, envelope: FinalizedEventEnvelope) -> ObserveOutcome {
        let sequence_id = envelope.sequence_id();
        let expected = *self.expected.get_or_insert(sequence_id);

        if sequence_id < expected {
            tracing::trace!(
                target: LOG_TARGET,
                sequence_id,
                expected,
                "dropping stale envelope"
            );
            return ObserveOutcome::default();
        }

        // Delivery is idempotent per id: a redelivery overwrites its buffered twin.
        self.pending.insert(sequence_id, envelope);

        if sequence_id > expected && !self.pending.contains_key(&expected) {
            let missing = self.missing_between(expected, sequence_id);
            tracing::debug!(
                target: LOG_TARGET,
                sequence_id,
                expected,
                missing_count = missing.len(),
                "sequence gap detected"
            );
            return ObserveOutcome {
                gap: true,
                missing,
                ready: Vec::new(),
            };
        }

        ObserveOutcome {
            gap: false,
            missing: Vec::new(),
            ready: self.drain_ready(),
        }
    }

    /// Fold a backfill response (or any batch) into the buffer, then drain
    /// whatever became contiguous.
    pub fn observe_batch(
        &mut self,
        envelopes: impl IntoIterator<Item = FinalizedEventEnvelope>,
    ) -> ObserveOutcome {
        let mut accepted = 0usize;
        for envelope in envelopes {
            let sequence_id = envelope.sequence_id();
            let expected = *self.expected.get_or_insert(sequence_id);
            if sequence_id < expected {
                tracing::trace!(
                    target: LOG_TARGET,
                    sequence_id,
                    expected,
                    "dropping stale envelope from batch"
                );
                continue;
            }
            self.pending.insert(sequence_id, envelope);
            accepted += 1;
        }

        let ready = self.drain_ready();

        let missing = match (self.expected, self.pending.keys().next_back()) {
            (Some(expected), Some(&newest)) => self.missing_between(expected, newest),
            _ => Vec::new(),
        };

        tracing::debug!(
            target: LOG_TARGET,
            accepted,
            drained = ready.len(),
            still_missing = missing.len(),
            "processed envelope batch"
        );

        ObserveOutcome {
            gap: !missing.is_empty(),
            missing,
            ready,
        }
    }

    /// Discard all buffered state and pin the window to `starting_seq`.
    /// Required between hands; in-flight backfills must be ignored afterward.
    pub fn reset(&mut self, starting_seq: SequenceId) {
        tracing::info!(
            target: LOG_TARGET,
            starting_seq,
            discarded = self.pending.len(),
            "sequencer reset"
        );
        self.pending.clear();
        self.expected = Some(starting_seq);
    }

    pub fn diagnostics(&self) -> SequencerDiagnostics {
        let missing = match (self.expected, self.pending.keys().next_back()) {
            (Some(expected), Some(&newest)) => self.missing_between(expected, newest),
            _ => Vec::new(),
        };
        SequencerDiagnostics {
            expected: self.expected,
            pending_count: self.pending.len(),
            oldest_missing: missing.first().copied(),
            newest_missing: missing.last().copied(),
        }
    }

    /// Whether the buffer has outgrown the caller's tolerance and a hard
    /// resync is warranted.
    pub fn needs_resync(&self, pending_threshold: usize) -> bool {
        self.pending.len() > pending_threshold
    }

    fn drain_ready(&mut self) -> Vec<FinalizedEventEnvelope> {
        let mut ready = Vec::new();
        if let Some(mut next) = self.expected {
            while let Some(envelope) = self.pending.remove(&next) {
                ready.push(envelope);
                next += 1;
            }
            self.expected = Some(next);
        }
        ready
    }

    fn missing_between(&self, lo: SequenceId, hi: SequenceId) -> Vec<SequenceId> {
        (lo..hi)
            .filter(|id| !self.pending.contains_key(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::finalized_envelope;
    use proptest::prelude::*;

    fn drained_ids(outcome: &ObserveOutcome) -> Vec<SequenceId> {
        outcome.ready.iter().map(|e| e.sequence_id()).collect()
    }

    #[test]
    fn in_order_delivery_drains_immediately() {
        let mut sequencer = Sequencer::new();
        for seq in 0..4 {
            let outcome = sequencer.observe(finalized_envelope(seq));
            assert!(!outcome.gap);
            assert_eq!(drained_ids(&outcome), vec![seq]);
        }
        assert_eq!(sequencer.expected(), Some(4));
        assert_eq!(sequencer.pending_len(), 0);
    }

    #[test]
    fn first_observation_pins_the_window() {
        let mut sequencer = Sequencer::new();
        let outcome = sequencer.observe(finalized_envelope(17));
        assert!(!outcome.gap);
        assert_eq!(drained_ids(&outcome), vec![17]);
        assert_eq!(sequencer.expected(), Some(18));
    }

    #[test]
    fn gap_is_reported_with_missing_ids() {
        let mut sequencer = Sequencer::new();
        sequencer.reset(0);
        for seq in 0..3 {
            sequencer.observe(finalized_envelope(seq));
        }
        let outcome = sequencer.observe(finalized_envelope(4));
        assert!(outcome.gap);
        assert_eq!(outcome.missing, vec![3]);
        assert!(outcome.ready.is_empty());

        // The follow-up above the gap widens nothing: 4 is already buffered.
        let outcome = sequencer.observe(finalized_envelope(5));
        assert!(outcome.gap);
        assert_eq!(outcome.missing, vec![3]);

        let outcome = sequencer.observe_batch([finalized_envelope(3)]);
        assert!(!outcome.gap);
        assert_eq!(drained_ids(&outcome), vec![3, 4, 5]);
        assert_eq!(sequencer.pending_len(), 0);
    }

    #[test]
    fn duplicates_never_reach_ready_twice() {
        let mut sequencer = Sequencer::new();
        sequencer.reset(0);
        assert_eq!(drained_ids(&sequencer.observe(finalized_envelope(0))), vec![0]);

        // Stale duplicate of an already-emitted id.
        let outcome = sequencer.observe(finalized_envelope(0));
        assert!(!outcome.gap);
        assert!(outcome.ready.is_empty());

        // Duplicate of a buffered id ahead of a gap.
        sequencer.observe(finalized_envelope(2));
        sequencer.observe(finalized_envelope(2));
        let outcome = sequencer.observe(finalized_envelope(1));
        assert_eq!(drained_ids(&outcome), vec![1, 2]);
    }

    #[test]
    fn reset_pins_a_new_starting_point() {
        let mut sequencer = Sequencer::new();
        sequencer.observe(finalized_envelope(0));
        sequencer.observe(finalized_envelope(2));
        sequencer.reset(5);
        assert_eq!(sequencer.pending_len(), 0);

        let outcome = sequencer.observe(finalized_envelope(5));
        assert!(!outcome.gap);
        assert_eq!(drained_ids(&outcome), vec![5]);
    }

    #[test]
    fn batch_reports_remaining_holes() {
        let mut sequencer = Sequencer::new();
        sequencer.reset(0);
        let outcome = sequencer.observe_batch([
            finalized_envelope(0),
            finalized_envelope(1),
            finalized_envelope(4),
            finalized_envelope(6),
        ]);
        assert_eq!(drained_ids(&outcome), vec![0, 1]);
        assert!(outcome.gap);
        assert_eq!(outcome.missing, vec![2, 3, 5]);

        let diag = sequencer.diagnostics();
        assert_eq!(diag.expected, Some(2));
        assert_eq!(diag.pending_count, 2);
        assert_eq!(diag.oldest_missing, Some(2));
        assert_eq!(diag.newest_missing, Some(5));
    }

    #[test]
    fn resync_threshold_tracks_pending_size() {
        let mut sequencer = Sequencer::new();
        sequencer.reset(0);
        for seq in 1..=5 {
            sequencer.observe(finalized_envelope(seq * 2));
        }
        assert!(!sequencer.needs_resync(5));
        assert!(sequencer.needs_resync(4));
    }

    #[test]
    fn late_middle_id_releases_the_buffered_tail() {
        let mut sequencer = Sequencer::new();
        let mut emitted = Vec::new();
        for seq in [0u64, 1, 2] {
            emitted.extend(drained_ids(&sequencer.observe(finalized_envelope(seq))));
        }
        let outcome = sequencer.observe(finalized_envelope(4));
        assert!(outcome.gap);
        assert_eq!(outcome.missing, vec![3]);
        emitted.extend(drained_ids(&sequencer.observe(finalized_envelope(5))));

        let outcome = sequencer.observe_batch([finalized_envelope(3)]);
        emitted.extend(drained_ids(&outcome));
        assert_eq!(emitted, vec![0, 1, 2, 3, 4, 5]);
    }

    proptest! {
        /// Any permutation of a contiguous id range drains to exactly the
        /// sorted range, each id exactly once.
        #[test]
        fn permutations_drain_to_sorted_order(
            perm in (1usize..10)
                .prop_flat_map(|n| Just((0..n as u64).collect::<Vec<_>>()).prop_shuffle())
        ) {
            let mut sequencer = Sequencer::new();
            sequencer.reset(0);
            let mut emitted = Vec::new();
            for &seq in &perm {
                let outcome = sequencer.observe(finalized_envelope(seq));
                emitted.extend(drained_ids(&outcome));
            }
            prop_assert_eq!(emitted, (0..perm.len() as u64).collect::<Vec<_>>());
            prop_assert_eq!(sequencer.pending_len(), 0);
        }

        /// Duplicated deliveries interleaved anywhere never duplicate output.
        #[test]
        fn permutations_with_duplicates_stay_exactly_once(
            perm in (1usize..8).prop_flat_map(|n| {
                let doubled: Vec<u64> = (0..n as u64).chain(0..n as u64).collect();
                Just(doubled).prop_shuffle()
            })
        ) {
            let mut sequencer = Sequencer::new();
            sequencer.reset(0);
            let mut emitted = Vec::new();
            for &seq in &perm {
                emitted.extend(drained_ids(&sequencer.observe(finalized_envelope(seq))));
            }
            let expected: Vec<u64> = (0..(perm.len() as u64 / 2)).collect();
            prop_assert_eq!(emitted, expected);
        }
    }
}
