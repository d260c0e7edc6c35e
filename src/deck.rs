use serde::{Deserialize, Serialize};

use crate::card::{Card, is_pot_of_duality, is_trap};
use crate::error::DeckError;
use crate::odds::hypergeometric_at_least;
use crate::rng::Xorshift32;

/// One line of a deck list after merging duplicates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
    pub name: String,
    pub count: usize,
}

impl DeckEntry {
    pub fn new(name: impl Into<String>, count: usize) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

/// Parses a deck list. Accepted line forms: `name`, `name 3`, `name x3`,
/// `name ×3`. Lines naming the same card are merged, first-seen order kept.
pub fn parse_deck(input: &str) -> Result<Vec<DeckEntry>, DeckError> {
    let mut entries: Vec<DeckEntry> = Vec::new();
    for (line_no, line) in input.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let (name, count) = split_count(trimmed, line_no + 1)?;
        match entries.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => entry.count += count,
            None => entries.push(DeckEntry {
                name: name.to_string(),
                count,
            }),
        }
    }
    Ok(entries)
}

fn split_count(line: &str, line_no: usize) -> Result<(&str, usize), DeckError> {
    let digits_start = line
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(idx, _)| idx);
    let Some(digits_start) = digits_start else {
        return Ok((line, 1));
    };
    let name = line[..digits_start].trim_end();
    let name = name
        .strip_suffix('x')
        .or_else(|| name.strip_suffix('×'))
        .unwrap_or(name)
        .trim_end();
    if name.is_empty() {
        // A bare number is treated as a card name.
        return Ok((line, 1));
    }
    let count = line[digits_start..]
        .parse::<usize>()
        .map_err(|_| DeckError::CountOverflow { line: line_no })?;
    if count == 0 {
        return Err(DeckError::ZeroCount { line: line_no });
    }
    Ok((name, count))
}

/// Expands entries into individual cards with ids `"<name>_<copy>"`.
pub fn create_deck(entries: &[DeckEntry]) -> Vec<Card> {
    let total = entries.iter().map(|entry| entry.count).sum();
    let mut deck = Vec::with_capacity(total);
    for entry in entries {
        for copy in 0..entry.count {
            deck.push(Card::new(entry.name.clone(), format!("{}_{copy}", entry.name)));
        }
    }
    deck
}

/// Fisher-Yates shuffle driven by the seeded xorshift generator.
pub fn shuffle_deck(deck: &[Card], seed: u64) -> Vec<Card> {
    let mut shuffled = deck.to_vec();
    let mut rng = Xorshift32::new(seed);
    for i in (1..shuffled.len()).rev() {
        let j = rng.index(i + 1);
        shuffled.swap(i, j);
    }
    shuffled
}

/// Takes up to `count` cards from the top (front) of the deck.
pub fn draw_cards(deck: &mut Vec<Card>, count: usize) -> Vec<Card> {
    let count = count.min(deck.len());
    deck.drain(..count).collect()
}

/// Opening-hand statistics for a main deck.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeckStats {
    pub total_cards: usize,
    pub pot_of_duality_count: usize,
    pub trap_count: usize,
    pub pot_in_five: f64,
    pub pot_in_six: f64,
    pub trap_in_five: f64,
    pub two_traps_in_five: f64,
}

impl DeckStats {
    pub fn from_entries(entries: &[DeckEntry]) -> Self {
        let total_cards = entries.iter().map(|entry| entry.count).sum();
        let pot_of_duality_count = entries
            .iter()
            .filter(|entry| is_pot_of_duality(&entry.name))
            .map(|entry| entry.count)
            .sum();
        let trap_count = entries
            .iter()
            .filter(|entry| is_trap(&entry.name))
            .map(|entry| entry.count)
            .sum();
        let odds = |target: usize, draw: usize, need: usize| {
            if total_cards == 0 || target == 0 {
                0.0
            } else {
                hypergeometric_at_least(total_cards, target, draw, need)
            }
        };
        Self {
            total_cards,
            pot_of_duality_count,
            trap_count,
            pot_in_five: odds(pot_of_duality_count, 5, 1),
            pot_in_six: odds(pot_of_duality_count, 6, 1),
            trap_in_five: odds(trap_count, 5, 1),
            two_traps_in_five: odds(trap_count, 5, 2),
        }
    }
}
