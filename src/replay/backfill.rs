use serde::{Deserialize, Serialize};

use crate::protocol::types::{GameId, HandId, SequenceId};

/// A request to fetch specific missing envelopes for a hand from the
/// backfill endpoint. The response folds back in through
/// [`Sequencer::observe_batch`](super::Sequencer::observe_batch).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillRequest {
    pub game_id: GameId,
    pub hand_id: HandId,
    /// Ids to fetch, ascending.
    pub missing: Vec<SequenceId>,
}

impl BackfillRequest {
    pub fn new(game_id: GameId, hand_id: HandId, missing: Vec<SequenceId>) -> Self {
        Self {
            game_id,
            hand_id,
            missing,
        }
    }

    /// Inclusive bounds of the requested ids, if any.
    pub fn span(&self) -> Option<(SequenceId, SequenceId)> {
        match (self.missing.first(), self.missing.last()) {
            (Some(&oldest), Some(&newest)) => Some((oldest, newest)),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.missing.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_reports_inclusive_bounds() {
        let request = BackfillRequest::new(1, 2, vec![3, 5, 9]);
        assert_eq!(request.span(), Some((3, 9)));
        assert!(BackfillRequest::new(1, 2, Vec::new()).span().is_none());
    }
}
