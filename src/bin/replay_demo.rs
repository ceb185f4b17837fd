use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use legit_poker_client::demo::scripted_hand;
use legit_poker_client::display::event_summary;
use legit_poker_client::protocol::messages::FinalizedEventEnvelope;
use legit_poker_client::protocol::stream_event::StreamEvent;
use legit_poker_client::session::{HandSession, SessionConfig};

const LOG_TARGET: &str = "bin::replay_demo";
const GAME_ID: i64 = 1;
const HAND_ID: i64 = 1;

#[derive(Debug, Parser)]
#[command(name = "replay_demo")]
#[command(
    about = "Replay a scripted hand through the event reconstruction engine",
    long_about = None
)]
struct Args {
    /// Number of seated players in the scripted hand
    #[arg(long, default_value_t = 2)]
    players: usize,

    /// Number of shufflers contributing decryption shares
    #[arg(long, default_value_t = 3)]
    shufflers: usize,

    /// Seed for the delivery-order shuffle
    #[arg(long, env = "REPLAY_DEMO_SEED", default_value_t = 7)]
    seed: u64,

    /// Deliver ledger events out of order to exercise gap reports
    #[arg(long)]
    shuffle_delivery: bool,

    /// Hold back this many ledger events and backfill them afterward
    #[arg(long, default_value_t = 0)]
    drop_events: usize,

    /// Toggle structured (JSON) tracing output
    #[arg(long)]
    json: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.json);

    if args.players == 0 || args.players > 5 {
        bail!("player count must be between 1 and 5");
    }
    if args.shufflers == 0 {
        bail!("at least one shuffler is required");
    }

    let script = scripted_hand(GAME_ID, HAND_ID, args.players, args.shufflers);
    let mut session = HandSession::new(SessionConfig {
        required_share_count: args.shufflers,
        ..SessionConfig::default()
    });

    info!(
        target: LOG_TARGET,
        players = args.players,
        shufflers = args.shufflers,
        events = script.events.len(),
        "starting scripted replay"
    );

    // Registration and hand commencement arrive before any ledger activity.
    let mut ledger: Vec<FinalizedEventEnvelope> = Vec::new();
    let mut post_events: Vec<StreamEvent> = Vec::new();
    for event in script.events.clone() {
        match event {
            StreamEvent::PlayerCreated { .. } | StreamEvent::HandCreated { .. } => {
                session
                    .on_stream_event(event)
                    .context("registration events cannot fail")?;
            }
            StreamEvent::GameEvent { envelope } => ledger.push(envelope),
            other => post_events.push(other),
        }
    }

    let mut rng = StdRng::seed_from_u64(args.seed);
    if args.shuffle_delivery {
        ledger.shuffle(&mut rng);
        info!(target: LOG_TARGET, seed = args.seed, "delivery order shuffled");
    }

    if args.drop_events >= ledger.len() {
        bail!(
            "cannot hold back {} of {} ledger events",
            args.drop_events,
            ledger.len()
        );
    }
    let held_back: Vec<FinalizedEventEnvelope> =
        (0..args.drop_events).filter_map(|_| ledger.pop()).collect();

    // Live pass: the sequencer reorders whatever the "transport" hands us.
    let mut applied = 0usize;
    let mut gap_reports = 0usize;
    for envelope in ledger {
        let update = session.ingest(envelope);
        for event in &update.applied {
            debug!(target: LOG_TARGET, "{}", event_summary(event));
        }
        applied += update.applied.len();
        for position in update.newly_decryptable {
            info!(target: LOG_TARGET, position, "card unlocked for decryption");
            session.mark_card_in_flight(position);
        }
        if let Some(gap) = update.gap {
            gap_reports += 1;
            if let Some((oldest, newest)) = gap.span() {
                debug!(
                    target: LOG_TARGET,
                    oldest,
                    newest,
                    missing = gap.missing.len(),
                    "backfill needed"
                );
            }
        }
        if update.needs_resync {
            warn!(target: LOG_TARGET, "pending buffer over threshold, would resync here");
        }
    }

    // Backfill pass: answer the last gap report from the script itself.
    let diagnostics = session.diagnostics();
    if let (Some(oldest), Some(newest)) = (
        diagnostics.sequencer.oldest_missing,
        diagnostics.sequencer.newest_missing,
    ) {
        let batch: Vec<FinalizedEventEnvelope> = (oldest..=newest)
            .filter_map(|seq| script.envelope(seq))
            .chain(held_back)
            .collect();
        info!(
            target: LOG_TARGET,
            oldest,
            newest,
            batch = batch.len(),
            "resolving gaps from backfill source"
        );
        let update = session.ingest_backfill(batch);
        for event in &update.applied {
            debug!(target: LOG_TARGET, "{}", event_summary(event));
        }
        applied += update.applied.len();
        for position in update.newly_decryptable {
            info!(target: LOG_TARGET, position, "card unlocked for decryption");
            session.mark_card_in_flight(position);
        }
        if update.gap.is_some() {
            bail!("backfill left unresolved gaps");
        }
    } else if !held_back.is_empty() {
        let update = session.ingest_backfill(held_back);
        applied += update.applied.len();
        for position in update.newly_decryptable {
            session.mark_card_in_flight(position);
        }
    }

    // Deal animations settle before the reveal events land.
    let decryptable = session.diagnostics().decryptable_cards;
    for position in 0..(args.players * 2) as u8 {
        session.mark_card_landed(position);
    }
    debug!(target: LOG_TARGET, decryptable, "deal animations settled");

    // Reveal-type events land once every share is in.
    for event in post_events {
        session
            .on_stream_event(event)
            .context("reveal arrived for a card the engine has not unlocked")?;
    }

    let total_ledger = script.game_envelopes().len();
    if applied != total_ledger {
        bail!("engine released {applied} of {total_ledger} ledger events");
    }

    let revealed: Vec<String> = session
        .card_states()
        .filter_map(|state| {
            state
                .display_card
                .map(|card| format!("seat {} card {} = {}", state.target_seat, state.position, card))
        })
        .collect();

    info!(
        target: LOG_TARGET,
        applied,
        gap_reports,
        decryptable = session.diagnostics().decryptable_cards,
        "replay complete"
    );
    for line in revealed {
        info!(target: LOG_TARGET, "{line}");
    }

    Ok(())
}
