use std::fmt;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{HoldemError, HoldemResult};

pub const RANKS_STR: &str = "23456789TJQKA";
pub const SUITS_STR: &str = "cdhs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
    Ace = 14,
}

impl Rank {
    pub fn from_char(c: char) -> HoldemResult<Rank> {
        match c.to_ascii_uppercase() {
            '2' => Ok(Rank::Two),
            '3' => Ok(Rank::Three),
            '4' => Ok(Rank::Four),
            '5' => Ok(Rank::Five),
            '6' => Ok(Rank::Six),
            '7' => Ok(Rank::Seven),
            '8' => Ok(Rank::Eight),
            '9' => Ok(Rank::Nine),
            'T' => Ok(Rank::Ten),
            'J' => Ok(Rank::Jack),
            'Q' => Ok(Rank::Queen),
            'K' => Ok(Rank::King),
            'A' => Ok(Rank::Ace),
            _ => Err(HoldemError::InvalidRank(c)),
        }
    }

    /// Rank from its numeric value, 2 through 14.
    pub fn from_value(value: u8) -> Option<Rank> {
        ALL_RANKS.get(value.checked_sub(2)? as usize).copied()
    }

    pub fn to_char(self) -> char {
        RANKS_STR.as_bytes()[(self as usize) - 2] as char
    }

    pub fn value(self) -> u8 {
        self as u8
    }
}

pub const ALL_RANKS: [Rank; 13] = [
    Rank::Two,
    Rank::Three,
    Rank::Four,
    Rank::Five,
    Rank::Six,
    Rank::Seven,
    Rank::Eight,
    Rank::Nine,
    Rank::Ten,
    Rank::Jack,
    Rank::Queen,
    Rank::King,
    Rank::Ace,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Suit {
    Clubs = 0,
    Diamonds = 1,
    Hearts = 2,
    Spades = 3,
}

impl Suit {
    pub fn from_char(c: char) -> HoldemResult<Suit> {
        match c.to_ascii_lowercase() {
            'c' => Ok(Suit::Clubs),
            'd' => Ok(Suit::Diamonds),
            'h' => Ok(Suit::Hearts),
            's' => Ok(Suit::Spades),
            _ => Err(HoldemError::InvalidSuit(c)),
        }
    }

    pub fn from_index(index: u8) -> Option<Suit> {
        ALL_SUITS.get(index as usize).copied()
    }

    pub fn to_char(self) -> char {
        SUITS_STR.as_bytes()[self as usize] as char
    }

    pub fn index(self) -> u8 {
        self as u8
    }
}

pub const ALL_SUITS: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Card {
        Card { rank, suit }
    }

    pub fn value(&self) -> u8 {
        self.rank.value()
    }

    /// Dense index in 0..52, used for card bitmasks.
    pub fn index(&self) -> u8 {
        (self.rank.value() - 2) * 4 + self.suit.index()
    }

    pub fn from_index(index: u8) -> Option<Card> {
        let rank = Rank::from_value(index / 4 + 2)?;
        let suit = Suit::from_index(index % 4)?;
        Some(Card::new(rank, suit))
    }

    pub fn mask(&self) -> u64 {
        1u64 << self.index()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.to_char(), self.suit.to_char())
    }
}

impl From<Card> for String {
    fn from(card: Card) -> String {
        card.to_string()
    }
}

impl TryFrom<String> for Card {
    type Error = HoldemError;

    fn try_from(notation: String) -> HoldemResult<Card> {
        parse_card(&notation)
    }
}

pub type HoleCards = [Card; 2];

/// Bitmask of a card set. Returns the offending card on a duplicate.
pub fn card_mask(cards: &[Card]) -> Result<u64, Card> {
    let mut mask = 0u64;
    for card in cards {
        if mask & card.mask() != 0 {
            return Err(*card);
        }
        mask |= card.mask();
    }
    Ok(mask)
}

pub fn full_deck() -> Vec<Card> {
    ALL_RANKS
        .iter()
        .flat_map(|&r| ALL_SUITS.iter().map(move |&s| Card::new(r, s)))
        .collect()
}

#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Ordered 52-card deck.
    pub fn new() -> Deck {
        Deck { cards: full_deck() }
    }

    /// Ordered deck with the given dead cards removed.
    pub fn without(dead: &[Card]) -> Deck {
        let dead_mask = dead.iter().fold(0u64, |m, c| m | c.mask());
        let cards = full_deck()
            .into_iter()
            .filter(|c| dead_mask & c.mask() == 0)
            .collect();
        Deck { cards }
    }

    /// Fresh deck shuffled from a fixed seed.
    pub fn seeded(seed: u64) -> Deck {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut deck = Deck::new();
        deck.shuffle(&mut rng);
        deck
    }

    /// Full Fisher-Yates shuffle of the remaining cards.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &mut Self {
        self.cards.shuffle(rng);
        self
    }

    /// Removes and returns the first `n` cards.
    pub fn draw(&mut self, n: usize) -> HoldemResult<Vec<Card>> {
        if n > self.cards.len() {
            return Err(HoldemError::DeckExhaustion {
                requested: n,
                available: self.cards.len(),
            });
        }
        let dealt: Vec<Card> = self.cards.drain(..n).collect();
        Ok(dealt)
    }

    pub fn draw_one(&mut self) -> HoldemResult<Card> {
        if self.cards.is_empty() {
            return Err(HoldemError::DeckExhaustion {
                requested: 1,
                available: 0,
            });
        }
        Ok(self.cards.remove(0))
    }

    pub fn burn(&mut self) -> HoldemResult<()> {
        self.draw_one().map(|_| ())
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl Default for Deck {
    fn default() -> Self {
        Deck::new()
    }
}

pub fn parse_card(notation: &str) -> HoldemResult<Card> {
    let notation = notation.trim();
    let chars: Vec<char> = notation.chars().collect();
    if chars.len() != 2 {
        return Err(HoldemError::InvalidCardNotation(notation.to_string()));
    }
    let rank = Rank::from_char(chars[0])?;
    let suit = Suit::from_char(chars[1])?;
    Ok(Card::new(rank, suit))
}

pub fn parse_board(notation: &str) -> HoldemResult<Vec<Card>> {
    let notation = notation.trim().replace([' ', ','], "");
    if notation.len() % 2 != 0 {
        return Err(HoldemError::InvalidBoardNotation(notation));
    }
    let chars: Vec<char> = notation.chars().collect();
    chars
        .chunks(2)
        .map(|pair| parse_card(&pair.iter().collect::<String>()))
        .collect()
}

/// Parses exactly two distinct cards, e.g. `"AsKh"`.
pub fn parse_hole_cards(notation: &str) -> HoldemResult<HoleCards> {
    let cards = parse_board(notation)?;
    if cards.len() != 2 {
        return Err(HoldemError::InvalidHandNotation(notation.to_string()));
    }
    if cards[0] == cards[1] {
        return Err(HoldemError::DuplicateCard(cards[0]));
    }
    Ok([cards[0], cards[1]])
}

/// Expands one hand class into its concrete combos: `"AA"`, `"AKs"`, `"AKo"`, `"AK"` or `"AsKh"`.
pub fn hand_combos(notation: &str) -> HoldemResult<Vec<HoleCards>> {
    let notation = notation.trim();
    let chars: Vec<char> = notation.chars().collect();
    let invalid = || HoldemError::InvalidHandNotation(notation.to_string());

    match chars.len() {
        2 => {
            let r1 = Rank::from_char(chars[0])?;
            let r2 = Rank::from_char(chars[1])?;
            let mut combos = Vec::new();
            if r1 == r2 {
                for i in 0..ALL_SUITS.len() {
                    for j in (i + 1)..ALL_SUITS.len() {
                        combos.push([Card::new(r1, ALL_SUITS[i]), Card::new(r1, ALL_SUITS[j])]);
                    }
                }
            } else {
                for &s1 in &ALL_SUITS {
                    for &s2 in &ALL_SUITS {
                        combos.push([Card::new(r1, s1), Card::new(r2, s2)]);
                    }
                }
            }
            Ok(combos)
        }
        3 => {
            let r1 = Rank::from_char(chars[0])?;
            let r2 = Rank::from_char(chars[1])?;
            if r1 == r2 {
                return Err(invalid());
            }
            match chars[2] {
                's' => Ok(ALL_SUITS
                    .iter()
                    .map(|&s| [Card::new(r1, s), Card::new(r2, s)])
                    .collect()),
                'o' => {
                    let mut combos = Vec::new();
                    for &s1 in &ALL_SUITS {
                        for &s2 in &ALL_SUITS {
                            if s1 != s2 {
                                combos.push([Card::new(r1, s1), Card::new(r2, s2)]);
                            }
                        }
                    }
                    Ok(combos)
                }
                _ => Err(invalid()),
            }
        }
        4 => parse_hole_cards(notation).map(|hole| vec![hole]),
        _ => Err(invalid()),
    }
}
