//! Order reconstruction for the finalized envelope stream: the sequence-gap
//! detector and the backfill request it hands to the transport layer.

pub mod backfill;
pub mod sequencer;

pub use backfill::BackfillRequest;
pub use sequencer::{ObserveOutcome, Sequencer, SequencerDiagnostics};
