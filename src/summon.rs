use serde::{Deserialize, Serialize};

use crate::card::{Card, MIN_SYNCHRO_MATERIALS, MIN_XYZ_MATERIALS, MONSTER_ZONE_COUNT};
use crate::error::InvalidAction;
use crate::glossary::Glossary;
use crate::state::{GameState, Side};

/// Rank 4 Xyz monsters the deck aims for with two level 4 monsters.
pub const RANK_FOUR_TARGETS: [&str; 4] = [
    "Evolzar Laggia",
    "Evolzar Dolkka",
    "Steelswarm Roach",
    "Daigusto Emeral",
];

/// Same targets, named for Japanese deck lists.
pub const RANK_FOUR_TARGETS_JA: [&str; 4] = [
    "エヴォルカイザー・ラギア",
    "エヴォルカイザー・ドルカ",
    "インヴェルズ・ローチ",
    "ダイガスタ・エメラル",
];

/// What happens to Xyz materials once the Xyz monster is on the field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialHandling {
    /// Materials stay attached as overlay units.
    Attach,
    /// Materials go straight to the graveyard.
    SendToGrave,
}

/// Xyz summon the player can make right now.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct XyzCandidate {
    pub name: String,
    pub rank: u8,
    pub materials: Vec<usize>,
}

fn validate_materials(
    state: &GameState,
    side: Side,
    materials: &[usize],
    minimum: usize,
    extra_card_id: &str,
    target: usize,
) -> Result<(Vec<Card>, Card), InvalidAction> {
    let mut distinct = materials.to_vec();
    distinct.sort_unstable();
    distinct.dedup();
    if distinct.len() < minimum || distinct.len() != materials.len() {
        return Err(InvalidAction::NotEnoughMaterials { required: minimum });
    }
    let zones = &state.player(side).zones;
    let mut cards = Vec::with_capacity(materials.len());
    for &zone in materials {
        let card = zones
            .monster_zones
            .get(zone)
            .ok_or(InvalidAction::ZoneIndex(zone))?
            .as_ref()
            .ok_or(InvalidAction::ZoneEmpty(zone))?;
        cards.push(card.clone());
    }
    let extra = zones
        .extra_deck
        .iter()
        .find(|card| card.id == extra_card_id)
        .cloned()
        .ok_or_else(|| InvalidAction::CardNotFound(extra_card_id.to_string()))?;
    if target >= MONSTER_ZONE_COUNT {
        return Err(InvalidAction::ZoneIndex(target));
    }
    if zones.monster_zones[target].is_some() && !materials.contains(&target) {
        return Err(InvalidAction::ZoneOccupied(target));
    }
    Ok((cards, extra))
}

/// Xyz summons `extra_card_id` onto `target`, which must be empty or one of
/// the `materials` zones. Level mismatches against the glossary only produce a warning.
pub fn xyz_summon(
    state: &mut GameState,
    glossary: &Glossary,
    side: Side,
    materials: &[usize],
    extra_card_id: &str,
    target: usize,
    handling: MaterialHandling,
) -> Result<(), InvalidAction> {
    let (material_cards, extra) =
        validate_materials(state, side, materials, MIN_XYZ_MATERIALS, extra_card_id, target)?;

    if let Some(rank) = glossary.lookup(&extra.name).and_then(|entry| entry.level()) {
        for material in &material_cards {
            if let Some(level) = glossary.lookup(&material.name).and_then(|entry| entry.level()) {
                if level != rank {
                    log::warn!(
                        "xyz material {} is level {level}, {} needs rank {rank}",
                        material.name,
                        extra.name
                    );
                }
            }
        }
    }

    let zones = &mut state.player_mut(side).zones;
    let mut names = Vec::with_capacity(materials.len());
    match handling {
        MaterialHandling::Attach => {
            let mut attached = Vec::with_capacity(materials.len());
            for &zone in materials {
                let card = zones.take_monster(zone)?;
                names.push(card.name.clone());
                attached.push(card.reset());
            }
            zones.xyz_materials.insert(target, attached);
        }
        MaterialHandling::SendToGrave => {
            for &zone in materials {
                names.push(zones.send_monster_to_grave(zone)?.name);
            }
        }
    }
    zones.extra_deck.retain(|card| card.id != extra.id);
    zones.place_monster(extra.clone(), target)?;

    let status = match handling {
        MaterialHandling::Attach => "attached",
        MaterialHandling::SendToGrave => "to grave",
    };
    state.log(
        side,
        format!(
            "[{side}] Xyz Summon: {} (materials: {} -> {status})",
            extra.name,
            names.join(", ")
        ),
    );
    Ok(())
}

/// Synchro summons `extra_card_id`; materials go to the graveyard.
pub fn synchro_summon(
    state: &mut GameState,
    glossary: &Glossary,
    side: Side,
    materials: &[usize],
    extra_card_id: &str,
    target: usize,
) -> Result<(), InvalidAction> {
    let (material_cards, extra) = validate_materials(
        state,
        side,
        materials,
        MIN_SYNCHRO_MATERIALS,
        extra_card_id,
        target,
    )?;

    if let Some(required) = glossary.lookup(&extra.name).and_then(|entry| entry.level()) {
        let total: u32 = material_cards
            .iter()
            .filter_map(|card| glossary.lookup(&card.name).and_then(|entry| entry.level()))
            .map(u32::from)
            .sum();
        if total > 0 && total != u32::from(required) {
            log::warn!(
                "synchro materials total level {total}, {} needs {required}",
                extra.name
            );
        }
    }

    let sent = state
        .player_mut(side)
        .zones
        .summon_from_extra_deck(extra_card_id, materials, target)?;
    let names: Vec<_> = sent.into_iter().map(|card| card.name).collect();
    state.log(
        side,
        format!(
            "[{side}] Synchro Summon: {} (materials: {})",
            extra.name,
            names.join(" + ")
        ),
    );
    Ok(())
}

/// Detaches one overlay unit from the Xyz monster in `zone` to the graveyard.
pub fn detach_material(
    state: &mut GameState,
    side: Side,
    zone: usize,
    material: usize,
) -> Result<(), InvalidAction> {
    let zones = &mut state.player_mut(side).zones;
    let units = zones
        .xyz_materials
        .get_mut(&zone)
        .filter(|units| material < units.len())
        .ok_or(InvalidAction::MaterialIndex { zone, material })?;
    let removed = units.remove(material);
    if units.is_empty() {
        zones.xyz_materials.remove(&zone);
    }
    zones.graveyard.push(removed.reset());
    let monster_name = zones
        .monster_zones
        .get(zone)
        .and_then(Option::as_ref)
        .map(|card| card.name.clone())
        .unwrap_or_else(|| String::from("Xyz monster"));
    state.log(
        side,
        format!(
            "[{side}] {monster_name} detaches {} (to grave)",
            removed.name
        ),
    );
    Ok(())
}

/// Rank 4 targets available when two level 4 monsters are on the field. The
/// first two level 4 monsters are proposed as materials. Targets use Japanese
/// names when the first material has one.
pub fn xyz_candidates(state: &GameState, side: Side) -> Vec<XyzCandidate> {
    let monsters = &state.player(side).zones.monster_zones;
    let materials: Vec<usize> = monsters
        .iter()
        .enumerate()
        .filter_map(|(zone, card)| card.as_ref().filter(|c| c.is_level_four()).map(|_| zone))
        .take(2)
        .collect();
    if materials.len() < 2 {
        return Vec::new();
    }
    let japanese = monsters[materials[0]]
        .as_ref()
        .is_some_and(|card| !card.name.is_ascii());
    let targets = if japanese {
        RANK_FOUR_TARGETS_JA
    } else {
        RANK_FOUR_TARGETS
    };
    targets
        .iter()
        .map(|name| XyzCandidate {
            name: name.to_string(),
            rank: 4,
            materials: materials.clone(),
        })
        .collect()
}
