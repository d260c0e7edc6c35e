//! Rescue Rabbit line: banish the Rabbit from hand, then special summon two
//! normal monsters from the deck.

use crate::card::{Card, RESCUE_RABBIT_SUMMONS};
use crate::error::InvalidAction;
use crate::phase::Phase;
use crate::state::GameState;
use crate::zones::search_normal_monsters;

/// Checks whether the active player may activate the Rescue Rabbit `hand_card_id`.
pub fn can_activate_rescue_rabbit(
    state: &GameState,
    hand_card_id: &str,
) -> Result<(), InvalidAction> {
    let player = state.active_player();
    if state.phase != Phase::Main1 {
        return Err(InvalidAction::RescueRabbit("only during Main Phase 1"));
    }
    if player.pot_of_duality_lock {
        return Err(InvalidAction::SpecialSummonLocked);
    }
    let in_hand = player
        .hand
        .iter()
        .any(|card| card.id == hand_card_id && card.is_rescue_rabbit());
    if !in_hand {
        return Err(InvalidAction::RescueRabbit("no Rescue Rabbit with that id in hand"));
    }
    let normals = player.deck.iter().filter(|card| card.is_normal_monster()).count();
    if normals < RESCUE_RABBIT_SUMMONS {
        return Err(InvalidAction::RescueRabbit(
            "fewer than two normal monsters in deck",
        ));
    }
    if player.zones.free_monster_zones() < RESCUE_RABBIT_SUMMONS {
        return Err(InvalidAction::NoFreeMonsterZone);
    }
    Ok(())
}

/// Picks the two deck monsters to summon. With exactly two `chosen` names each
/// is matched to a distinct normal monster; otherwise the first two are used.
fn pick_targets(deck: &[Card], chosen: &[String]) -> Result<Vec<Card>, InvalidAction> {
    if chosen.len() != RESCUE_RABBIT_SUMMONS {
        let (found, _) = search_normal_monsters(deck, RESCUE_RABBIT_SUMMONS);
        return Ok(found);
    }
    let mut picked: Vec<Card> = Vec::with_capacity(RESCUE_RABBIT_SUMMONS);
    for name in chosen {
        let card = deck
            .iter()
            .filter(|card| card.is_normal_monster() && &card.name == name)
            .find(|card| picked.iter().all(|p| p.id != card.id))
            .ok_or(InvalidAction::RescueRabbit(
                "chosen normal monsters are not in the deck",
            ))?;
        picked.push(card.clone());
    }
    Ok(picked)
}

/// Resolves Rescue Rabbit for the active player. Returns the summoned monsters.
/// Nothing changes when the activation is illegal.
pub fn activate_rescue_rabbit(
    state: &mut GameState,
    hand_card_id: &str,
    chosen: &[String],
) -> Result<Vec<Card>, InvalidAction> {
    can_activate_rescue_rabbit(state, hand_card_id)?;
    let targets = pick_targets(&state.active_player().deck, chosen)?;
    let side = state.active;

    let player = state.active_player_mut();
    let rabbit_index = player
        .hand_index(hand_card_id)
        .ok_or_else(|| InvalidAction::CardNotFound(hand_card_id.to_string()))?;
    let rabbit = player.hand.remove(rabbit_index);
    player.zones.banish(rabbit.clone());
    state.log(
        side,
        format!("[{side}] Rescue Rabbit activates (cost: banish {})", rabbit.name),
    );

    let mut summoned = Vec::with_capacity(targets.len());
    for target in targets {
        let player = state.active_player_mut();
        let zone = player
            .zones
            .first_free_monster_zone()
            .ok_or(InvalidAction::NoFreeMonsterZone)?;
        player.deck.retain(|card| card.id != target.id);
        player.zones.place_monster(target.clone(), zone)?;
        state.log(
            side,
            format!("[{side}] Special Summon {} from deck (MZ{})", target.name, zone + 1),
        );
        summoned.push(target);
    }
    Ok(summoned)
}
