use serde::{Deserialize, Serialize};

use super::types::Chips;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerBetAction {
    Fold,
    Check,               // only when price_to_call == 0
    Call,                // match current price (or go short all-in)
    BetTo { to: Chips }, // first bet this round (unopened pot)
    RaiseTo { to: Chips },
    AllIn, // engine normalizes to bet/raise/call
}

/// Betting street a player action belongs to. The backend pins the street
/// into the message tag; the client only needs it for rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
}

impl Street {
    pub fn label(&self) -> &'static str {
        match self {
            Street::Preflop => "preflop",
            Street::Flop => "flop",
            Street::Turn => "turn",
            Street::River => "river",
        }
    }
}
