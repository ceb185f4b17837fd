//! Pure presentation adapters: validated protocol values in, display
//! strings out. No state, no I/O.

use crate::protocol::actions::PlayerBetAction;
use crate::protocol::actor::AnyActor;
use crate::protocol::messages::{AnyGameMessage, FinalizedEventEnvelope};
use crate::protocol::types::EventPhase;

/// Short badge text for the phase indicator next to the table.
pub fn phase_badge(phase: EventPhase) -> &'static str {
    match phase {
        EventPhase::Pending => "PENDING",
        EventPhase::Shuffling => "SHUFFLE",
        EventPhase::Dealing => "DEAL",
        EventPhase::Betting => "BETTING",
        EventPhase::Reveals => "REVEAL",
        EventPhase::Showdown => "SHOWDOWN",
        EventPhase::Complete => "COMPLETE",
        EventPhase::Cancelled => "CANCELLED",
    }
}

/// Get a human-readable description
pub fn phase_description(phase: EventPhase) -> &'static str {
    match phase {
        EventPhase::Pending => "Waiting for the hand to start",
        EventPhase::Shuffling => "Shufflers shuffling deck",
        EventPhase::Dealing => "Dealing hole cards",
        EventPhase::Betting => "Players betting",
        EventPhase::Reveals => "Collecting decryption shares",
        EventPhase::Showdown => "Players revealing hands",
        EventPhase::Complete => "Hand complete",
        EventPhase::Cancelled => "Hand cancelled",
    }
}

pub fn actor_label(actor: &AnyActor) -> String {
    match actor {
        AnyActor::None => "System".to_string(),
        AnyActor::Player { seat_id, .. } => format!("Seat {seat_id}"),
        AnyActor::Shuffler { shuffler_id } => format!("Shuffler {shuffler_id}"),
    }
}

fn action_label(action: &PlayerBetAction) -> String {
    match action {
        PlayerBetAction::Fold => "folds".to_string(),
        PlayerBetAction::Check => "checks".to_string(),
        PlayerBetAction::Call => "calls".to_string(),
        PlayerBetAction::BetTo { to } => format!("bets to {to}"),
        PlayerBetAction::RaiseTo { to } => format!("raises to {to}"),
        PlayerBetAction::AllIn => "goes all-in".to_string(),
    }
}

/// One log line per finalized event for the activity feed.
pub fn event_summary(finalized: &FinalizedEventEnvelope) -> String {
    let actor = actor_label(&finalized.envelope.actor);
    let body = match &finalized.envelope.message {
        AnyGameMessage::Shuffle(msg) => {
            format!("{actor} shuffled the deck (turn {})", msg.turn_index)
        }
        AnyGameMessage::Blinding(msg) => {
            format!(
                "{actor} posted a blinding share for card {}",
                msg.card_position
            )
        }
        AnyGameMessage::PartialUnblinding(msg) => {
            format!(
                "{actor} posted an unblinding share for card {}",
                msg.card_position
            )
        }
        AnyGameMessage::PlayerPreflop(msg)
        | AnyGameMessage::PlayerFlop(msg)
        | AnyGameMessage::PlayerTurn(msg)
        | AnyGameMessage::PlayerRiver(msg) => {
            format!(
                "{actor} {} on the {}",
                action_label(&msg.action),
                msg.street.label()
            )
        }
        AnyGameMessage::Showdown(msg) => {
            format!(
                "{actor} reveals hole cards at positions {} and {}",
                msg.card_positions[0], msg.card_positions[1]
            )
        }
    };

    match &finalized.snapshot_status {
        crate::protocol::types::SnapshotStatus::Success => body,
        crate::protocol::types::SnapshotStatus::Failure(reason) => {
            format!("{body} [rejected: {reason}]")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::actions::Street;
    use crate::protocol::types::SnapshotStatus;
    use crate::test_utils::fixtures::{
        blinding_envelope, player_action_envelope, sample_target_key,
    };

    #[test]
    fn every_phase_has_badge_and_description() {
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
            assert!(!phase_badge(phase).is_empty());
            assert!(!phase_description(phase).is_empty());
        }
    }

    #[test]
    fn summaries_read_naturally() {
        let share = blinding_envelope(0, 2, 7, sample_target_key());
        assert_eq!(
            event_summary(&share),
            "Shuffler 2 posted a blinding share for card 7"
        );

        let action = player_action_envelope(1, 4, Street::Turn, PlayerBetAction::RaiseTo { to: 64 });
        assert_eq!(event_summary(&action), "Seat 4 raises to 64 on the turn");
    }

    #[test]
    fn rejected_events_carry_the_reason() {
        let mut share = blinding_envelope(0, 1, 3, sample_target_key());
        share.snapshot_status = SnapshotStatus::Failure("stale nonce".into());
        assert!(event_summary(&share).ends_with("[rejected: stale nonce]"));
    }
}
