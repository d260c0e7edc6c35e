use std::fmt;

use serde::{Deserialize, Serialize};

use crate::card::{Card, MONSTER_ZONE_COUNT, SPELL_TRAP_ZONE_COUNT};
use crate::deck::draw_cards;
use crate::error::InvalidAction;
use crate::state::{GameState, MoveReason, Side};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneKind {
    Hand,
    Deck,
    Grave,
    Banish,
    Monster,
    SpellTrap,
    Extra,
}

impl ZoneKind {
    pub fn parse(input: &str) -> Option<ZoneKind> {
        match input.to_ascii_lowercase().as_str() {
            "hand" => Some(ZoneKind::Hand),
            "deck" => Some(ZoneKind::Deck),
            "grave" | "gy" | "graveyard" => Some(ZoneKind::Grave),
            "banish" | "banished" => Some(ZoneKind::Banish),
            "mz" | "monster" => Some(ZoneKind::Monster),
            "st" | "spelltrap" => Some(ZoneKind::SpellTrap),
            "extra" | "ed" => Some(ZoneKind::Extra),
            _ => None,
        }
    }
}

/// A location on one side of the board. `index` selects the slot for
/// monster and spell/trap zones; for the deck `None`/`Some(0)` is the top and
/// any other value the bottom.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRef {
    pub side: Side,
    pub zone: ZoneKind,
    pub index: Option<usize>,
}

impl ZoneRef {
    pub fn new(side: Side, zone: ZoneKind) -> Self {
        Self {
            side,
            zone,
            index: None,
        }
    }

    pub fn at(side: Side, zone: ZoneKind, index: usize) -> Self {
        Self {
            side,
            zone,
            index: Some(index),
        }
    }

    fn slot(&self, limit: usize) -> Result<usize, InvalidAction> {
        let index = self.index.ok_or(InvalidAction::MissingZoneIndex)?;
        if index >= limit {
            return Err(InvalidAction::ZoneIndex(index));
        }
        Ok(index)
    }
}

impl fmt::Display for ZoneRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.index.unwrap_or(0) + 1;
        match self.zone {
            ZoneKind::Hand => write!(f, "{} Hand", self.side),
            ZoneKind::Deck => write!(f, "{} Deck", self.side),
            ZoneKind::Grave => write!(f, "{} Grave", self.side),
            ZoneKind::Banish => write!(f, "{} Banish", self.side),
            ZoneKind::Monster => write!(f, "{} MZ{slot}", self.side),
            ZoneKind::SpellTrap => write!(f, "{} ST{slot}", self.side),
            ZoneKind::Extra => write!(f, "{} Extra", self.side),
        }
    }
}

fn position(cards: &[Card], card_id: &str) -> Result<usize, InvalidAction> {
    cards
        .iter()
        .position(|card| card.id == card_id)
        .ok_or_else(|| InvalidAction::CardNotFound(card_id.to_string()))
}

fn peek<'a>(
    state: &'a GameState,
    from: &ZoneRef,
    card_id: &str,
) -> Result<&'a Card, InvalidAction> {
    let player = state.player(from.side);
    let not_found = || InvalidAction::CardNotFound(card_id.to_string());
    let pile = match from.zone {
        ZoneKind::Hand => &player.hand,
        ZoneKind::Deck => &player.deck,
        ZoneKind::Grave => &player.zones.graveyard,
        ZoneKind::Banish => &player.zones.banished,
        ZoneKind::Extra => &player.zones.extra_deck,
        ZoneKind::Monster => {
            let slot = from.slot(MONSTER_ZONE_COUNT)?;
            return player.zones.monster_zones[slot]
                .as_ref()
                .filter(|card| card.id == card_id)
                .ok_or_else(not_found);
        }
        ZoneKind::SpellTrap => {
            let slot = from.slot(SPELL_TRAP_ZONE_COUNT)?;
            return player.zones.spell_trap_zones[slot]
                .as_ref()
                .filter(|card| card.id == card_id)
                .ok_or_else(not_found);
        }
    };
    pile.iter().find(|card| card.id == card_id).ok_or_else(not_found)
}

fn check_target(state: &GameState, to: &ZoneRef) -> Result<(), InvalidAction> {
    let zones = &state.player(to.side).zones;
    match to.zone {
        ZoneKind::Monster => {
            let slot = to.slot(MONSTER_ZONE_COUNT)?;
            if zones.monster_zones[slot].is_some() {
                return Err(InvalidAction::ZoneOccupied(slot));
            }
        }
        ZoneKind::SpellTrap => {
            let slot = to.slot(SPELL_TRAP_ZONE_COUNT)?;
            if zones.spell_trap_zones[slot].is_some() {
                return Err(InvalidAction::ZoneOccupied(slot));
            }
        }
        _ => {}
    }
    Ok(())
}

fn remove(state: &mut GameState, from: &ZoneRef, card_id: &str) -> Result<Card, InvalidAction> {
    let player = state.player_mut(from.side);
    let pile = match from.zone {
        ZoneKind::Hand => &mut player.hand,
        ZoneKind::Deck => &mut player.deck,
        ZoneKind::Grave => &mut player.zones.graveyard,
        ZoneKind::Banish => &mut player.zones.banished,
        ZoneKind::Extra => &mut player.zones.extra_deck,
        ZoneKind::Monster => return player.zones.take_monster(from.slot(MONSTER_ZONE_COUNT)?),
        ZoneKind::SpellTrap => {
            return player
                .zones
                .take_spell_trap(from.slot(SPELL_TRAP_ZONE_COUNT)?);
        }
    };
    let index = position(pile, card_id)?;
    Ok(pile.remove(index))
}

fn insert(
    state: &mut GameState,
    to: &ZoneRef,
    card: Card,
    from_zone: ZoneKind,
    reason: MoveReason,
) -> Result<(), InvalidAction> {
    let turn = state.turn;
    let player = state.player_mut(to.side);
    match to.zone {
        ZoneKind::Hand => player.hand.push(card.reset()),
        ZoneKind::Deck => {
            if matches!(to.index, None | Some(0)) {
                player.deck.insert(0, card.reset());
            } else {
                player.deck.push(card.reset());
            }
        }
        ZoneKind::Grave => player.zones.graveyard.push(card.reset()),
        ZoneKind::Banish => player.zones.banish(card),
        ZoneKind::Extra => player.zones.extra_deck.push(card.reset()),
        ZoneKind::Monster => player
            .zones
            .place_monster(card, to.slot(MONSTER_ZONE_COUNT)?)?,
        ZoneKind::SpellTrap => {
            // Cards arrive set unless activated or already face up on the field.
            let set = match (reason, from_zone) {
                (MoveReason::Activate, _) => false,
                (_, ZoneKind::SpellTrap) => card.is_set,
                _ => true,
            };
            player
                .zones
                .place_spell_trap(card, to.slot(SPELL_TRAP_ZONE_COUNT)?, set, turn)?;
        }
    }
    Ok(())
}

/// Moves one card between zones and logs the move. On error nothing changes.
pub fn move_card(
    state: &mut GameState,
    from: ZoneRef,
    to: ZoneRef,
    card_id: &str,
    reason: MoveReason,
) -> Result<(), InvalidAction> {
    let name = peek(state, &from, card_id)?.name.clone();
    check_target(state, &to)?;
    let card = remove(state, &from, card_id)?;
    insert(state, &to, card, from.zone, reason)?;
    let actor = state.active;
    state.log(
        actor,
        format!("[{actor}] {from} -> {to} : {name} ({})", reason.label()),
    );
    Ok(())
}

/// Logs and returns the top `count` cards of `side`'s deck without moving
/// them. An empty deck logs nothing.
pub fn peek_deck(state: &mut GameState, side: Side, count: usize) -> Vec<Card> {
    let top: Vec<Card> = state.player(side).deck.iter().take(count).cloned().collect();
    if top.is_empty() {
        return top;
    }
    let names: Vec<&str> = top.iter().map(|card| card.name.as_str()).collect();
    state.log(
        side,
        format!("[{side}] Deck Top({count}): {}", names.join(", ")),
    );
    top
}

fn search_label(zone: ZoneKind) -> &'static str {
    match zone {
        ZoneKind::Hand => "Search",
        ZoneKind::Monster => "Special Summon",
        ZoneKind::SpellTrap => "Set",
        ZoneKind::Grave => "Send to grave",
        ZoneKind::Banish => "Banish",
        ZoneKind::Deck | ZoneKind::Extra => "Move",
    }
}

/// Moves the named cards out of `to.side`'s deck. Monster and spell/trap
/// targets take the first free slots in order, ignoring `to.index`. A plain
/// `Move` reason becomes Search, Special Summon or Set for hand, monster and
/// spell/trap targets. Every card and slot is checked before anything moves.
pub fn search_deck(
    state: &mut GameState,
    to: ZoneRef,
    card_ids: &[String],
    reason: MoveReason,
) -> Result<Vec<Card>, InvalidAction> {
    let side = to.side;
    if card_ids.is_empty() {
        return Err(InvalidAction::NothingSelected);
    }
    let player = state.player(side);
    for (index, card_id) in card_ids.iter().enumerate() {
        if card_ids[..index].contains(card_id) {
            return Err(InvalidAction::DuplicateCard(card_id.clone()));
        }
        position(&player.deck, card_id)?;
    }
    let slots: Vec<usize> = match to.zone {
        ZoneKind::Monster => player
            .zones
            .monster_zones
            .iter()
            .enumerate()
            .filter_map(|(slot, card)| card.is_none().then_some(slot))
            .collect(),
        ZoneKind::SpellTrap => player
            .zones
            .spell_trap_zones
            .iter()
            .enumerate()
            .filter_map(|(slot, card)| card.is_none().then_some(slot))
            .collect(),
        _ => Vec::new(),
    };
    match to.zone {
        ZoneKind::Monster if slots.len() < card_ids.len() => {
            return Err(InvalidAction::NoFreeMonsterZone);
        }
        ZoneKind::SpellTrap if slots.len() < card_ids.len() => {
            return Err(InvalidAction::NoFreeSpellTrapZone);
        }
        _ => {}
    }

    let reason = match (reason, to.zone) {
        (MoveReason::Move, ZoneKind::Hand) => MoveReason::Search,
        (MoveReason::Move, ZoneKind::Monster) => MoveReason::SpecialSummon,
        (MoveReason::Move, ZoneKind::SpellTrap) => MoveReason::Set,
        (reason, _) => reason,
    };
    let from = ZoneRef::new(side, ZoneKind::Deck);
    let mut moved = Vec::with_capacity(card_ids.len());
    for (index, card_id) in card_ids.iter().enumerate() {
        let target = match to.zone {
            ZoneKind::Monster | ZoneKind::SpellTrap => ZoneRef::at(side, to.zone, slots[index]),
            _ => to,
        };
        let card = peek(state, &from, card_id)?.clone();
        move_card(state, from, target, card_id, reason)?;
        moved.push(card);
    }
    let names: Vec<&str> = moved.iter().map(|card| card.name.as_str()).collect();
    state.log(
        side,
        format!(
            "[{side}] From deck: {} -> {}",
            names.join(", "),
            search_label(to.zone)
        ),
    );
    Ok(moved)
}

/// Draws up to `count` cards into `side`'s hand. An empty deck draws nothing
/// and logs nothing.
pub fn draw(state: &mut GameState, side: Side, count: usize) -> Vec<Card> {
    let player = state.player_mut(side);
    if player.deck.is_empty() || count == 0 {
        return Vec::new();
    }
    let drawn = draw_cards(&mut player.deck, count);
    player.hand.extend(drawn.iter().cloned());
    let message = if drawn.len() == 1 {
        format!("{side} draws 1 card")
    } else {
        format!("{side} draws {} cards", drawn.len())
    };
    state.log(side, message);
    drawn
}
