use core::fmt;

use serde::{Deserialize, Serialize};

pub type Rank = u8; // 2..14 (A=14)
pub type Index = u8; // 1..52 (1-based)

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Suit {
    Clubs = 0,    // C
    Diamonds = 1, // D
    Hearts = 2,   // H
    Spades = 3,   // S
}

impl Suit {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Suit::Clubs),
            1 => Some(Suit::Diamonds),
            2 => Some(Suit::Hearts),
            3 => Some(Suit::Spades),
            _ => None,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            Suit::Clubs => 'c',
            Suit::Diamonds => 'd',
            Suit::Hearts => 'h',
            Suit::Spades => 's',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank, // 2..14
    pub suit: Suit,
}

/// Deterministic 1..52 -> Card mapping; 0=C,1=D,2=H,3=S; rank 2..14.
/// Matches the index scheme the backend uses for decrypted plaintexts.
pub fn decode_card(i: Index) -> Option<Card> {
    if !(1..=52).contains(&i) {
        return None;
    }
    let j = i - 1; // 0..51
    let suit = Suit::from_u8(j / 13)?;
    let rank = (j % 13) + 2;
    Some(Card { rank, suit })
}

/// Inverse of [`decode_card`]: (rank, suit) -> 1..52.
pub fn idx_of(rank: Rank, suit: Suit) -> Index {
    suit.as_u8() * 13 + (rank - 2) + 1
}

fn rank_glyph(rank: Rank) -> char {
    match rank {
        2..=9 => (b'0' + rank) as char,
        10 => 'T',
        11 => 'J',
        12 => 'Q',
        13 => 'K',
        14 => 'A',
        _ => '?',
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", rank_glyph(self.rank), self.suit.glyph())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_card_covers_the_full_deck_exactly_once() {
        let mut seen = std::collections::HashSet::new();
        for i in 1..=52u8 {
            let card = decode_card(i).unwrap();
            assert!((2..=14).contains(&card.rank));
            assert!(seen.insert((card.rank, card.suit)));
            assert_eq!(idx_of(card.rank, card.suit), i);
        }
        assert_eq!(seen.len(), 52);
    }

    #[test]
    fn out_of_range_indices_are_rejected() {
        assert!(decode_card(0).is_none());
        assert!(decode_card(53).is_none());
    }

    #[test]
    fn cards_render_compact_labels() {
        let ace = decode_card(idx_of(14, Suit::Spades)).unwrap();
        assert_eq!(ace.to_string(), "As");
        let ten = decode_card(idx_of(10, Suit::Clubs)).unwrap();
        assert_eq!(ten.to_string(), "Tc");
    }
}
