use std::array::from_fn;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::card::{Card, MONSTER_ZONE_COUNT, SPELL_TRAP_ZONE_COUNT};
use crate::error::InvalidAction;

/// Field of one player: fixed monster and spell/trap slots plus piles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zones {
    pub monster_zones: [Option<Card>; MONSTER_ZONE_COUNT],
    pub spell_trap_zones: [Option<Card>; SPELL_TRAP_ZONE_COUNT],
    pub graveyard: Vec<Card>,
    pub banished: Vec<Card>,
    pub extra_deck: Vec<Card>,
    /// Overlay units keyed by the monster zone of the Xyz monster holding them.
    pub xyz_materials: BTreeMap<usize, Vec<Card>>,
}

impl Default for Zones {
    fn default() -> Self {
        Self::new()
    }
}

impl Zones {
    pub fn new() -> Self {
        Self {
            monster_zones: from_fn(|_| None),
            spell_trap_zones: from_fn(|_| None),
            graveyard: Vec::new(),
            banished: Vec::new(),
            extra_deck: Vec::new(),
            xyz_materials: BTreeMap::new(),
        }
    }

    pub fn with_extra_deck(extra_deck: Vec<Card>) -> Self {
        Self {
            extra_deck,
            ..Self::new()
        }
    }

    pub fn monster_count(&self) -> usize {
        self.monster_zones.iter().flatten().count()
    }

    pub fn spell_trap_count(&self) -> usize {
        self.spell_trap_zones.iter().flatten().count()
    }

    pub fn first_free_monster_zone(&self) -> Option<usize> {
        self.monster_zones.iter().position(Option::is_none)
    }

    pub fn first_free_spell_trap_zone(&self) -> Option<usize> {
        self.spell_trap_zones.iter().position(Option::is_none)
    }

    pub fn free_monster_zones(&self) -> usize {
        MONSTER_ZONE_COUNT - self.monster_count()
    }

    /// Puts a monster face up into an empty slot.
    pub fn place_monster(&mut self, card: Card, zone: usize) -> Result<(), InvalidAction> {
        let slot = self
            .monster_zones
            .get_mut(zone)
            .ok_or(InvalidAction::ZoneIndex(zone))?;
        if slot.is_some() {
            return Err(InvalidAction::ZoneOccupied(zone));
        }
        let mut card = card.reset();
        card.face_up = true;
        *slot = Some(card);
        Ok(())
    }

    /// Puts a spell or trap into an empty slot, set face down when `set` is
    /// true, remembering the turn it was set.
    pub fn place_spell_trap(
        &mut self,
        card: Card,
        zone: usize,
        set: bool,
        turn: u32,
    ) -> Result<(), InvalidAction> {
        let slot = self
            .spell_trap_zones
            .get_mut(zone)
            .ok_or(InvalidAction::ZoneIndex(zone))?;
        if slot.is_some() {
            return Err(InvalidAction::ZoneOccupied(zone));
        }
        let mut card = card.reset();
        card.is_set = set;
        card.face_up = !set;
        card.set_turn = set.then_some(turn);
        *slot = Some(card);
        Ok(())
    }

    /// Removes the monster in `zone`. Attached Xyz materials go to the graveyard.
    pub fn take_monster(&mut self, zone: usize) -> Result<Card, InvalidAction> {
        let card = self
            .monster_zones
            .get_mut(zone)
            .ok_or(InvalidAction::ZoneIndex(zone))?
            .take()
            .ok_or(InvalidAction::ZoneEmpty(zone))?;
        if let Some(materials) = self.xyz_materials.remove(&zone) {
            self.graveyard
                .extend(materials.into_iter().map(|material| material.reset()));
        }
        Ok(card)
    }

    pub fn take_spell_trap(&mut self, zone: usize) -> Result<Card, InvalidAction> {
        self.spell_trap_zones
            .get_mut(zone)
            .ok_or(InvalidAction::ZoneIndex(zone))?
            .take()
            .ok_or(InvalidAction::ZoneEmpty(zone))
    }

    pub fn send_monster_to_grave(&mut self, zone: usize) -> Result<Card, InvalidAction> {
        let card = self.take_monster(zone)?;
        self.graveyard.push(card.reset());
        Ok(card)
    }

    pub fn send_spell_trap_to_grave(&mut self, zone: usize) -> Result<Card, InvalidAction> {
        let card = self.take_spell_trap(zone)?;
        self.graveyard.push(card.reset());
        Ok(card)
    }

    pub fn banish_monster(&mut self, zone: usize) -> Result<Card, InvalidAction> {
        let card = self.take_monster(zone)?;
        self.banished.push(card.reset());
        Ok(card)
    }

    /// Banishes a card coming from outside the field (hand, deck).
    pub fn banish(&mut self, card: Card) {
        self.banished.push(card.reset());
    }

    /// Sends the given monster zones to the graveyard and places `extra_card_id`
    /// from the extra deck into `target`. Nothing changes on error.
    pub fn summon_from_extra_deck(
        &mut self,
        extra_card_id: &str,
        materials: &[usize],
        target: usize,
    ) -> Result<Vec<Card>, InvalidAction> {
        let extra_index = self
            .extra_deck
            .iter()
            .position(|card| card.id == extra_card_id)
            .ok_or_else(|| InvalidAction::CardNotFound(extra_card_id.to_string()))?;
        for &zone in materials {
            match self.monster_zones.get(zone) {
                None => return Err(InvalidAction::ZoneIndex(zone)),
                Some(None) => return Err(InvalidAction::ZoneEmpty(zone)),
                Some(Some(_)) => {}
            }
        }
        if target >= MONSTER_ZONE_COUNT {
            return Err(InvalidAction::ZoneIndex(target));
        }
        if self.monster_zones[target].is_some() && !materials.contains(&target) {
            return Err(InvalidAction::ZoneOccupied(target));
        }

        let mut sent = Vec::with_capacity(materials.len());
        for &zone in materials {
            sent.push(self.send_monster_to_grave(zone)?);
        }
        let extra_card = self.extra_deck.remove(extra_index);
        self.place_monster(extra_card, target)?;
        Ok(sent)
    }
}

/// A trap set face down cannot be activated during the turn it was set.
pub fn can_activate_trap(card: &Card, current_turn: u32) -> Result<(), InvalidAction> {
    if card.is_set && card.set_turn == Some(current_turn) {
        return Err(InvalidAction::TrapSetThisTurn);
    }
    Ok(())
}

/// Splits the deck into up to `count` normal monsters (deck order) and the rest.
pub fn search_normal_monsters(deck: &[Card], count: usize) -> (Vec<Card>, Vec<Card>) {
    let mut found = Vec::with_capacity(count);
    let mut remaining = Vec::with_capacity(deck.len());
    for card in deck {
        if card.is_normal_monster() && found.len() < count {
            found.push(card.clone());
        } else {
            remaining.push(card.clone());
        }
    }
    (found, remaining)
}
