use std::fs;

use rabbitsim::action::{Action, Play};
use rabbitsim::deck::shuffle_deck;
use rabbitsim::summon::xyz_candidates;
use rabbitsim::{
    Card, DeckEntry, Duel, DuelBuilder, GameError, GameState, Glossary, InvalidAction,
    MaterialHandling, MoveReason, Phase, PlayerState, Side, ZoneKind, ZoneRef,
};

fn cards(names: &[&str]) -> Vec<Card> {
    names
        .iter()
        .enumerate()
        .map(|(copy, name)| Card::new(*name, format!("{name}_{copy}")))
        .collect()
}

/// Duel past setup with `me` active in `phase`.
fn duel_in(phase: Phase, hand: &[&str], deck: &[&str], extra: &[&str]) -> Duel {
    let mut me = PlayerState::new(cards(deck), cards(extra));
    me.hand = cards(hand);
    let mut state = GameState::new(me, PlayerState::new(Vec::new(), Vec::new()), 11);
    state.first_player = Some(Side::Me);
    state.setup_complete = true;
    state.phase = phase;
    Duel::from_state(state, None, Glossary::default())
}

fn sabersaurus_deck() -> Vec<DeckEntry> {
    vec![DeckEntry::new("Sabersaurus", 40)]
}

#[test]
fn setup_draws_opening_hands() -> Result<(), GameError> {
    let mut duel = DuelBuilder::new(sabersaurus_deck())
        .with_opponent_deck(vec![DeckEntry::new("Pot of Greed", 40)])
        .with_seed(3)
        .build()?;

    let outcome = duel.apply_action(Action::ChooseFirstPlayer(Side::Me))?;
    assert_eq!(outcome.drawn.len(), 5);
    assert_eq!(duel.state().me.hand.len(), 5);
    assert_eq!(duel.state().opp.hand.len(), 5);
    assert!(!duel.state().setup_complete);

    duel.apply_action(Action::StartTurn)?;
    let state = duel.state();
    assert!(state.setup_complete);
    assert_eq!(state.me.hand.len(), 6);
    assert_eq!(state.me.deck.len(), 34);
    assert_eq!(state.active, Side::Me);
    assert_eq!(state.turn, 1);

    assert!(matches!(
        duel.apply_action(Action::ChooseFirstPlayer(Side::Opp)),
        Err(GameError::SetupAlreadyComplete)
    ));
    Ok(())
}

#[test]
fn start_turn_requires_first_player() -> Result<(), GameError> {
    let mut duel = DuelBuilder::new(sabersaurus_deck()).build()?;
    assert!(matches!(
        duel.apply_action(Action::StartTurn),
        Err(GameError::FirstPlayerNotChosen)
    ));
    assert!(matches!(
        duel.apply_action(Action::Play(Play::Attack)),
        Err(GameError::SetupIncomplete)
    ));
    Ok(())
}

#[test]
fn empty_main_deck_is_rejected() {
    assert!(matches!(
        DuelBuilder::new(Vec::new()).build(),
        Err(GameError::InvalidConfiguration(_))
    ));
}

#[test]
fn same_seed_gives_same_shuffle() -> Result<(), GameError> {
    let deck = vec![DeckEntry::new("Card", 40)];
    let first = DuelBuilder::new(deck.clone()).with_seed(99).build()?;
    let second = DuelBuilder::new(deck.clone()).with_seed(99).build()?;
    let other = DuelBuilder::new(deck).with_seed(100).build()?;
    assert_eq!(first.state().me.deck, second.state().me.deck);
    assert_ne!(first.state().me.deck, other.state().me.deck);
    Ok(())
}

#[test]
fn opening_draw_mirrors_opponent_and_advances_phase() -> Result<(), GameError> {
    let mut duel = DuelBuilder::new(sabersaurus_deck())
        .with_opponent_deck(vec![DeckEntry::new("Pot of Greed", 40)])
        .build()?;
    let outcome = duel.apply_action(Action::DrawInitial)?;
    assert_eq!(outcome.drawn.len(), 5);
    assert_eq!(outcome.phase_change, Some((Phase::Draw, Phase::Standby)));
    assert_eq!(duel.state().opp.hand.len(), 5);

    let mut quiet = DuelBuilder::new(sabersaurus_deck())
        .with_opponent_deck(vec![DeckEntry::new("Pot of Greed", 40)])
        .mirror_opponent_draws(false)
        .build()?;
    quiet.apply_action(Action::DrawFirst)?;
    assert_eq!(quiet.state().me.hand.len(), 1);
    assert!(quiet.state().opp.hand.is_empty());
    Ok(())
}

#[test]
fn normal_summon_once_per_turn() -> Result<(), GameError> {
    let mut duel = duel_in(Phase::Main1, &["Sabersaurus", "Sabersaurus"], &[], &[]);
    let outcome = duel.apply_action(Action::Play(Play::NormalSummon {
        card_id: Some("Sabersaurus_0".into()),
    }))?;
    assert_eq!(outcome.summoned.len(), 1);
    assert_eq!(outcome.phase_change, None);
    let placed = duel.state().me.zones.monster_zones[0].as_ref().expect("summoned");
    assert!(placed.face_up);

    let err = duel.apply_action(Action::Play(Play::NormalSummon {
        card_id: Some("Sabersaurus_1".into()),
    }));
    assert!(matches!(
        err,
        Err(GameError::InvalidAction(InvalidAction::NormalSummonUsed))
    ));
    assert_eq!(duel.state().me.hand.len(), 1);
    Ok(())
}

#[test]
fn summon_uses_selected_card_when_no_id_given() -> Result<(), GameError> {
    let mut duel = duel_in(Phase::Main1, &["Sabersaurus", "Gene-Warped Warwolf"], &[], &[]);
    assert!(matches!(
        duel.apply_action(Action::Play(Play::NormalSummon { card_id: None })),
        Err(GameError::InvalidAction(InvalidAction::NothingSelected))
    ));
    duel.apply_action(Action::SelectCard {
        side: Side::Me,
        card_id: "Gene-Warped Warwolf_1".into(),
    })?;
    duel.apply_action(Action::Play(Play::NormalSummon { card_id: None }))?;
    let placed = duel.state().me.zones.monster_zones[0].as_ref().expect("summoned");
    assert_eq!(placed.name, "Gene-Warped Warwolf");
    assert!(!placed.selected);
    Ok(())
}

#[test]
fn summon_in_standby_moves_to_main_phase() -> Result<(), GameError> {
    let mut duel = duel_in(Phase::Standby, &["Sabersaurus"], &[], &[]);
    let outcome = duel.apply_action(Action::Play(Play::NormalSummon {
        card_id: Some("Sabersaurus_0".into()),
    }))?;
    assert_eq!(outcome.phase_change, Some((Phase::Standby, Phase::Main1)));
    assert_eq!(duel.phase(), Phase::Main1);
    let last = duel.state().logs.last().expect("logged");
    assert_eq!(last.action, "Phase transition: Standby Phase -> Main Phase 1");
    Ok(())
}

#[test]
fn attack_is_forbidden_outside_battle_and_main_one() -> Result<(), GameError> {
    let mut duel = duel_in(Phase::Draw, &[], &[], &[]);
    let err = duel.apply_action(Action::Play(Play::Attack));
    assert!(matches!(
        err,
        Err(GameError::InvalidAction(InvalidAction::PhaseForbidden {
            phase: Phase::Draw,
            ..
        }))
    ));

    let mut duel = duel_in(Phase::Main1, &[], &[], &[]);
    let outcome = duel.apply_action(Action::Play(Play::Attack))?;
    assert_eq!(outcome.phase_change, Some((Phase::Main1, Phase::Battle)));
    Ok(())
}

#[test]
fn set_trap_waits_a_turn() -> Result<(), GameError> {
    let mut duel = duel_in(Phase::Main1, &["Trap Hole Trap"], &[], &[]);
    duel.apply_action(Action::SetSpellTrap {
        card_id: "Trap Hole Trap_0".into(),
    })?;
    let set = duel.state().me.zones.spell_trap_zones[0].as_ref().expect("set");
    assert!(set.is_set);
    assert_eq!(set.set_turn, Some(1));

    let err = duel.apply_action(Action::Play(Play::ActivateTrap { zone: Some(0) }));
    assert!(matches!(
        err,
        Err(GameError::InvalidAction(InvalidAction::TrapSetThisTurn))
    ));

    duel.apply_action(Action::EndTurn)?;
    assert_eq!(duel.active(), Side::Opp);
    duel.apply_action(Action::EndTurn)?;
    assert_eq!(duel.active(), Side::Me);
    assert_eq!(duel.turn(), 3);

    duel.apply_action(Action::Play(Play::ActivateTrap { zone: None }))?;
    let zones = &duel.state().me.zones;
    assert!(zones.spell_trap_zones[0].is_none());
    assert_eq!(zones.graveyard.len(), 1);
    Ok(())
}

#[test]
fn end_turn_resets_flags_and_passes_the_turn() -> Result<(), GameError> {
    let mut duel = duel_in(Phase::Main2, &["Sabersaurus"], &[], &[]);
    duel.apply_action(Action::Play(Play::NormalSummon {
        card_id: Some("Sabersaurus_0".into()),
    }))?;
    duel.apply_action(Action::UsePotOfDuality)?;
    assert!(duel.state().me.pot_of_duality_lock);

    let outcome = duel.apply_action(Action::EndTurn)?;
    assert_eq!(outcome.phase_change, Some((Phase::Main2, Phase::Draw)));
    let state = duel.state();
    assert_eq!(state.active, Side::Opp);
    assert_eq!(state.turn, 2);
    assert_eq!(state.phase, Phase::Draw);
    assert!(!state.me.pot_of_duality_lock);
    assert!(!state.me.normal_summon_used);
    Ok(())
}

#[test]
fn pot_of_duality_locks_special_summons() -> Result<(), GameError> {
    let mut duel = duel_in(
        Phase::Main1,
        &["Rescue Rabbit", "Sabersaurus"],
        &["Sabersaurus", "Sabersaurus"],
        &[],
    );
    duel.apply_action(Action::UsePotOfDuality)?;
    let special = duel.apply_action(Action::Play(Play::SpecialSummon {
        card_id: Some("Sabersaurus_1".into()),
    }));
    assert!(matches!(
        special,
        Err(GameError::InvalidAction(InvalidAction::SpecialSummonLocked))
    ));
    let rabbit = duel.apply_action(Action::RescueRabbit {
        card_id: "Rescue Rabbit_0".into(),
        chosen: Vec::new(),
    });
    assert!(matches!(
        rabbit,
        Err(GameError::InvalidAction(InvalidAction::SpecialSummonLocked))
    ));
    assert_eq!(duel.state().me.hand.len(), 2);
    Ok(())
}

#[test]
fn rescue_rabbit_summons_first_two_normals() -> Result<(), GameError> {
    let mut duel = duel_in(
        Phase::Main1,
        &["Rescue Rabbit"],
        &["Pot of Duality", "Sabersaurus", "Gene-Warped Warwolf", "Sabersaurus"],
        &[],
    );
    let outcome = duel.apply_action(Action::RescueRabbit {
        card_id: "Rescue Rabbit_0".into(),
        chosen: Vec::new(),
    })?;
    let ids: Vec<_> = outcome.summoned.iter().map(|card| card.id.as_str()).collect();
    assert_eq!(ids, ["Sabersaurus_1", "Gene-Warped Warwolf_2"]);

    let state = duel.state();
    assert!(state.me.hand.is_empty());
    assert_eq!(state.me.zones.banished[0].name, "Rescue Rabbit");
    assert_eq!(state.me.zones.monster_count(), 2);
    assert_eq!(state.me.deck.len(), 2);
    assert!(state.logs[0].action.contains("Rescue Rabbit activates"));
    Ok(())
}

#[test]
fn rescue_rabbit_honours_chosen_names() -> Result<(), GameError> {
    let mut duel = duel_in(
        Phase::Main1,
        &["Rescue Rabbit"],
        &["Gene-Warped Warwolf", "Sabersaurus", "Pot of Duality", "Sabersaurus"],
        &[],
    );
    let outcome = duel.apply_action(Action::RescueRabbit {
        card_id: "Rescue Rabbit_0".into(),
        chosen: vec!["Sabersaurus".into(), "Sabersaurus".into()],
    })?;
    let ids: Vec<_> = outcome.summoned.iter().map(|card| card.id.as_str()).collect();
    assert_eq!(ids, ["Sabersaurus_1", "Sabersaurus_3"]);
    Ok(())
}

#[test]
fn rescue_rabbit_outside_main_one_changes_nothing() {
    let mut duel = duel_in(
        Phase::Main2,
        &["Rescue Rabbit"],
        &["Sabersaurus", "Sabersaurus"],
        &[],
    );
    let before = duel.state().clone();
    let err = duel.apply_action(Action::RescueRabbit {
        card_id: "Rescue Rabbit_0".into(),
        chosen: Vec::new(),
    });
    assert!(matches!(
        err,
        Err(GameError::InvalidAction(InvalidAction::RescueRabbit(_)))
    ));
    assert_eq!(duel.state(), &before);
}

#[test]
fn xyz_summon_keeps_materials_attached() -> Result<(), GameError> {
    let mut duel = duel_in(
        Phase::Main1,
        &["Sabersaurus", "Gene-Warped Warwolf"],
        &[],
        &["Evolzar Laggia"],
    );
    duel.apply_action(Action::Play(Play::NormalSummon {
        card_id: Some("Sabersaurus_0".into()),
    }))?;
    duel.apply_action(Action::Play(Play::SpecialSummon {
        card_id: Some("Gene-Warped Warwolf_1".into()),
    }))?;

    let duplicate = duel.apply_action(Action::XyzSummon {
        materials: vec![0, 0],
        extra_card_id: "Evolzar Laggia_0".into(),
        target: 0,
        handling: MaterialHandling::Attach,
    });
    assert!(matches!(
        duplicate,
        Err(GameError::InvalidAction(InvalidAction::NotEnoughMaterials { required: 2 }))
    ));

    duel.apply_action(Action::XyzSummon {
        materials: vec![0, 1],
        extra_card_id: "Evolzar Laggia_0".into(),
        target: 0,
        handling: MaterialHandling::Attach,
    })?;
    let zones = &duel.state().me.zones;
    assert_eq!(
        zones.monster_zones[0].as_ref().map(|card| card.name.as_str()),
        Some("Evolzar Laggia")
    );
    assert!(zones.monster_zones[1].is_none());
    assert_eq!(zones.xyz_materials[&0].len(), 2);
    assert!(zones.extra_deck.is_empty());

    duel.apply_action(Action::DetachMaterial {
        zone: 0,
        material: 0,
    })?;
    let zones = &duel.state().me.zones;
    assert_eq!(zones.xyz_materials[&0].len(), 1);
    assert_eq!(zones.graveyard[0].name, "Sabersaurus");
    Ok(())
}

#[test]
fn synchro_summon_sends_materials_to_grave() -> Result<(), GameError> {
    let mut duel = duel_in(
        Phase::Main1,
        &["Effect Veiler", "Sabersaurus"],
        &[],
        &["Stardust Dragon"],
    );
    duel.apply_action(Action::Play(Play::NormalSummon {
        card_id: Some("Effect Veiler_0".into()),
    }))?;
    duel.apply_action(Action::Play(Play::SpecialSummon {
        card_id: Some("Sabersaurus_1".into()),
    }))?;
    duel.apply_action(Action::SynchroSummon {
        materials: vec![0, 1],
        extra_card_id: "Stardust Dragon_0".into(),
        target: 1,
    })?;
    let zones = &duel.state().me.zones;
    assert!(zones.monster_zones[0].is_none());
    assert_eq!(
        zones.monster_zones[1].as_ref().map(|card| card.name.as_str()),
        Some("Stardust Dragon")
    );
    assert_eq!(zones.graveyard.len(), 2);
    Ok(())
}

#[test]
fn move_card_is_logged_and_validated() -> Result<(), GameError> {
    let mut duel = duel_in(Phase::Main1, &["Sabersaurus"], &[], &[]);
    let hand = ZoneRef::new(Side::Me, ZoneKind::Hand);
    let grave = ZoneRef::new(Side::Me, ZoneKind::Grave);

    let missing = duel.apply_action(Action::MoveCard {
        from: hand,
        to: grave,
        card_id: "Nope_0".into(),
        reason: MoveReason::Cost,
    });
    assert!(matches!(
        missing,
        Err(GameError::InvalidAction(InvalidAction::CardNotFound(_)))
    ));

    duel.apply_action(Action::MoveCard {
        from: hand,
        to: grave,
        card_id: "Sabersaurus_0".into(),
        reason: MoveReason::Cost,
    })?;
    let last = duel.state().logs.last().expect("logged");
    assert_eq!(last.action, "[Me] Me Hand -> Me Grave : Sabersaurus (Cost)");
    assert_eq!(duel.state().me.zones.graveyard.len(), 1);
    Ok(())
}

#[test]
fn toggles_flip_hand_flags() -> Result<(), GameError> {
    let mut duel = duel_in(Phase::Main1, &["Effect Veiler"], &[], &[]);
    let id = String::from("Effect Veiler_0");
    duel.apply_action(Action::ToggleUsed {
        side: Side::Me,
        card_id: id.clone(),
    })?;
    duel.apply_action(Action::ToggleRevealed {
        side: Side::Me,
        card_id: id.clone(),
    })?;
    let card = &duel.state().me.hand[0];
    assert!(card.used && card.revealed);
    duel.apply_action(Action::ToggleUsed {
        side: Side::Me,
        card_id: id,
    })?;
    assert!(!duel.state().me.hand[0].used);
    Ok(())
}

#[test]
fn export_then_import_restores_the_duel() -> Result<(), GameError> {
    let mut duel = duel_in(Phase::Main1, &["Sabersaurus"], &["Sabersaurus"], &[]);
    duel.apply_action(Action::Play(Play::NormalSummon {
        card_id: Some("Sabersaurus_0".into()),
    }))?;
    let json = duel.state().export_json()?;
    let restored = GameState::import_json(&json)?;
    assert_eq!(&restored, duel.state());

    let mut broken = restored;
    broken.turn = 0;
    let json = broken.export_json()?;
    assert!(matches!(
        GameState::import_json(&json),
        Err(GameError::InvalidConfiguration(_))
    ));
    assert!(matches!(
        GameState::import_json("{not json"),
        Err(GameError::Serialization(_))
    ));
    Ok(())
}

#[test]
fn markdown_log_groups_by_turn() -> Result<(), GameError> {
    let mut duel = duel_in(Phase::Main1, &["Sabersaurus"], &["Sabersaurus"], &[]);
    duel.apply_action(Action::Play(Play::NormalSummon {
        card_id: Some("Sabersaurus_0".into()),
    }))?;
    duel.apply_action(Action::EndTurn)?;
    duel.apply_action(Action::EndTurn)?;
    let markdown = duel.state().markdown_log();
    assert!(markdown.starts_with("# Duel Log"));
    assert!(markdown.contains("### T1 - MP1"));
    assert!(markdown.contains("### T3 - DP"));
    assert!(markdown.contains("- Normal Summon: Sabersaurus (MZ1)"));
    assert!(markdown.contains("- **Monster zones**: 1"));
    Ok(())
}

#[test]
fn xyz_summon_onto_material_zone_can_send_materials_to_grave() -> Result<(), GameError> {
    let mut duel = duel_in(
        Phase::Main1,
        &["Sabersaurus", "Gene-Warped Warwolf"],
        &[],
        &["Evolzar Dolkka"],
    );
    duel.apply_action(Action::Play(Play::NormalSummon {
        card_id: Some("Sabersaurus_0".into()),
    }))?;
    duel.apply_action(Action::Play(Play::SpecialSummon {
        card_id: Some("Gene-Warped Warwolf_1".into()),
    }))?;
    duel.apply_action(Action::XyzSummon {
        materials: vec![0, 1],
        extra_card_id: "Evolzar Dolkka_0".into(),
        target: 1,
        handling: MaterialHandling::SendToGrave,
    })?;
    let zones = &duel.state().me.zones;
    assert!(zones.monster_zones[0].is_none());
    assert_eq!(
        zones.monster_zones[1].as_ref().map(|card| card.name.as_str()),
        Some("Evolzar Dolkka")
    );
    assert!(zones.xyz_materials.is_empty());
    let grave: Vec<_> = zones.graveyard.iter().map(|card| card.name.as_str()).collect();
    assert_eq!(grave, ["Sabersaurus", "Gene-Warped Warwolf"]);
    let last = duel.state().logs.last().expect("logged");
    assert!(last.action.ends_with("-> to grave)"));
    Ok(())
}

fn field_with(monsters: &[(usize, &str)]) -> GameState {
    let mut me = PlayerState::new(Vec::new(), Vec::new());
    for (zone, name) in monsters {
        me.zones.monster_zones[*zone] = Some(Card::new(*name, format!("{name}_{zone}")));
    }
    GameState::new(me, PlayerState::new(Vec::new(), Vec::new()), 11)
}

#[test]
fn xyz_candidates_need_two_level_four_monsters() {
    let one = field_with(&[(2, "Sabersaurus"), (3, "Effect Veiler")]);
    assert!(xyz_candidates(&one, Side::Me).is_empty());

    let two = field_with(&[
        (1, "Sabersaurus"),
        (2, "Effect Veiler"),
        (3, "Gene-Warped Warwolf"),
        (4, "Sabersaurus"),
    ]);
    let candidates = xyz_candidates(&two, Side::Me);
    let names: Vec<_> = candidates.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        ["Evolzar Laggia", "Evolzar Dolkka", "Steelswarm Roach", "Daigusto Emeral"]
    );
    assert!(candidates.iter().all(|c| c.rank == 4 && c.materials == [1, 3]));
    assert!(xyz_candidates(&two, Side::Opp).is_empty());
}

#[test]
fn xyz_candidates_follow_japanese_material_names() {
    let state = field_with(&[(0, "セイバーザウルス"), (1, "ジェネティック・ワーウルフ")]);
    let candidates = xyz_candidates(&state, Side::Me);
    assert_eq!(candidates.len(), 4);
    assert_eq!(candidates[0].name, "エヴォルカイザー・ラギア");
    assert_eq!(candidates[2].name, "インヴェルズ・ローチ");
}

#[test]
fn deck_shuffle_is_seeded_by_log_length() -> Result<(), GameError> {
    let deck = ["A", "B", "C", "D", "E", "F", "G", "H"];
    let mut first = duel_in(Phase::Main1, &[], &deck, &[]);
    let mut second = duel_in(Phase::Main1, &[], &deck, &[]);
    let before = first.state().me.deck.clone();

    first.apply_action(Action::ShuffleDeck(Side::Me))?;
    second.apply_action(Action::ShuffleDeck(Side::Me))?;
    assert_eq!(first.state().me.deck, second.state().me.deck);
    assert_eq!(first.state().me.deck, shuffle_deck(&before, 11));
    assert_eq!(
        first.state().logs.last().map(|entry| entry.action.as_str()),
        Some("[Me] Deck shuffled")
    );

    let once = first.state().me.deck.clone();
    first.apply_action(Action::ShuffleDeck(Side::Me))?;
    assert_eq!(first.state().me.deck, shuffle_deck(&once, 12));
    Ok(())
}

#[test]
fn restore_keeps_session_settings() -> Result<(), GameError> {
    let mut duel = DuelBuilder::new(sabersaurus_deck())
        .with_opponent_deck(vec![DeckEntry::new("Pot of Greed", 40)])
        .mirror_opponent_draws(false)
        .with_opponent_hand_size(3)
        .with_seed(21)
        .build()?;
    let snapshot = GameState::import_json(&duel.state().export_json()?)?;
    duel.restore(snapshot);
    assert!(!duel.config().mirror_opponent_draws);
    assert_eq!(duel.config().opponent_hand_size, Some(3));
    assert_eq!(duel.config().seed, 21);
    assert!(duel.analysis().is_some());

    duel.apply_action(Action::DrawFirst)?;
    assert_eq!(duel.state().me.hand.len(), 1);
    assert!(duel.state().opp.hand.is_empty());
    Ok(())
}

#[test]
fn export_to_picks_format_and_reports_bad_paths() -> Result<(), GameError> {
    let mut duel = duel_in(Phase::Main1, &["Sabersaurus"], &["Sabersaurus"], &[]);
    duel.apply_action(Action::Play(Play::NormalSummon {
        card_id: Some("Sabersaurus_0".into()),
    }))?;
    let dir = std::env::temp_dir();
    let id = std::process::id();
    let json_path = dir.join(format!("rabbitsim-export-{id}.json"));
    let md_path = dir.join(format!("rabbitsim-export-{id}.md"));

    duel.state().export_to(&json_path)?;
    let json =
        fs::read_to_string(&json_path).map_err(|err| GameError::Io(json_path.clone(), err))?;
    assert_eq!(&GameState::import_json(&json)?, duel.state());

    duel.state().export_to(&md_path)?;
    let markdown =
        fs::read_to_string(&md_path).map_err(|err| GameError::Io(md_path.clone(), err))?;
    assert!(markdown.starts_with("# Duel Log"));

    let missing = dir
        .join(format!("rabbitsim-no-such-dir-{id}"))
        .join("state.json");
    assert!(matches!(
        duel.state().export_to(&missing),
        Err(GameError::Io(path, _)) if path == missing
    ));
    let _ = fs::remove_file(&json_path);
    let _ = fs::remove_file(&md_path);
    Ok(())
}

const SEARCH_DECK: [&str; 4] = ["Sabersaurus", "Pot of Duality", "Rescue Rabbit", "Sabersaurus"];

#[test]
fn peek_logs_top_cards_without_moving_them() -> Result<(), GameError> {
    let mut duel = duel_in(Phase::Main1, &[], &SEARCH_DECK, &[]);
    let outcome = duel.apply_action(Action::PeekDeck {
        side: Side::Me,
        count: 3,
    })?;
    let ids: Vec<_> = outcome.peeked.iter().map(|card| card.id.as_str()).collect();
    assert_eq!(ids, ["Sabersaurus_0", "Pot of Duality_1", "Rescue Rabbit_2"]);
    assert_eq!(duel.state().me.deck.len(), 4);
    assert_eq!(
        duel.state().logs.last().map(|entry| entry.action.as_str()),
        Some("[Me] Deck Top(3): Sabersaurus, Pot of Duality, Rescue Rabbit")
    );

    let outcome = duel.apply_action(Action::PeekDeck {
        side: Side::Me,
        count: 10,
    })?;
    assert_eq!(outcome.peeked.len(), 4);

    let mut empty = duel_in(Phase::Main1, &[], &[], &[]);
    let outcome = empty.apply_action(Action::PeekDeck {
        side: Side::Me,
        count: 5,
    })?;
    assert!(outcome.peeked.is_empty());
    assert!(empty.state().logs.is_empty());
    Ok(())
}

#[test]
fn deck_search_matches_names_ignoring_case() {
    let duel = duel_in(Phase::Main1, &[], &SEARCH_DECK, &[]);
    let player = &duel.state().me;
    let saber: Vec<_> = player.search_deck("saber").iter().map(|c| c.id.clone()).collect();
    assert_eq!(saber, ["Sabersaurus_0", "Sabersaurus_3"]);
    assert_eq!(player.search_deck("POT").len(), 1);
    assert_eq!(player.search_deck("").len(), 4);
    assert!(player.search_deck("Blue-Eyes").is_empty());
}

#[test]
fn searched_card_goes_to_hand_as_a_search() -> Result<(), GameError> {
    let mut duel = duel_in(Phase::Main1, &[], &SEARCH_DECK, &[]);
    let outcome = duel.apply_action(Action::SearchDeck {
        to: ZoneRef::new(Side::Me, ZoneKind::Hand),
        card_ids: vec!["Rescue Rabbit_2".into()],
        reason: MoveReason::Move,
    })?;
    assert_eq!(outcome.searched.len(), 1);
    let state = duel.state();
    assert_eq!(state.me.hand[0].id, "Rescue Rabbit_2");
    assert_eq!(state.me.deck.len(), 3);
    let actions: Vec<_> = state.logs.iter().map(|entry| entry.action.as_str()).collect();
    assert_eq!(
        actions,
        [
            "[Me] Me Deck -> Me Hand : Rescue Rabbit (Search)",
            "[Me] From deck: Rescue Rabbit -> Search",
        ]
    );
    Ok(())
}

#[test]
fn searched_monsters_fill_free_zones() -> Result<(), GameError> {
    let mut duel = duel_in(Phase::Main1, &["Effect Veiler"], &SEARCH_DECK, &[]);
    duel.apply_action(Action::Play(Play::NormalSummon {
        card_id: Some("Effect Veiler_0".into()),
    }))?;
    duel.apply_action(Action::SearchDeck {
        to: ZoneRef::at(Side::Me, ZoneKind::Monster, 0),
        card_ids: vec!["Sabersaurus_0".into(), "Sabersaurus_3".into()],
        reason: MoveReason::Move,
    })?;
    let zones = &duel.state().me.zones;
    let ids: Vec<_> = zones
        .monster_zones
        .iter()
        .map(|slot| slot.as_ref().map(|card| card.id.as_str()))
        .collect();
    assert_eq!(
        ids,
        [
            Some("Effect Veiler_0"),
            Some("Sabersaurus_0"),
            Some("Sabersaurus_3"),
            None,
            None
        ]
    );
    assert!(zones.monster_zones[1].as_ref().is_some_and(|card| card.face_up));
    let logs = &duel.state().logs;
    assert_eq!(
        logs[logs.len() - 2].action,
        "[Me] Me Deck -> Me MZ3 : Sabersaurus (Special Summon)"
    );
    Ok(())
}

#[test]
fn rejected_search_changes_nothing() {
    let mut me = PlayerState::new(cards(&SEARCH_DECK), Vec::new());
    for zone in 0..4 {
        me.zones.spell_trap_zones[zone] = Some(Card::new("Trap Hole Trap", format!("Trap_{zone}")));
    }
    let mut state = GameState::new(me, PlayerState::new(Vec::new(), Vec::new()), 11);
    state.first_player = Some(Side::Me);
    state.setup_complete = true;
    let mut duel = Duel::from_state(state, None, Glossary::default());
    let before = duel.state().clone();

    let two_cards = vec!["Sabersaurus_0".to_string(), "Pot of Duality_1".to_string()];
    let no_room = duel.apply_action(Action::SearchDeck {
        to: ZoneRef::new(Side::Me, ZoneKind::SpellTrap),
        card_ids: two_cards,
        reason: MoveReason::Move,
    });
    assert!(matches!(
        no_room,
        Err(GameError::InvalidAction(InvalidAction::NoFreeSpellTrapZone))
    ));

    let twice = duel.apply_action(Action::SearchDeck {
        to: ZoneRef::new(Side::Me, ZoneKind::Hand),
        card_ids: vec!["Sabersaurus_0".into(), "Sabersaurus_0".into()],
        reason: MoveReason::Move,
    });
    assert!(matches!(
        twice,
        Err(GameError::InvalidAction(InvalidAction::DuplicateCard(_)))
    ));

    let missing = duel.apply_action(Action::SearchDeck {
        to: ZoneRef::new(Side::Me, ZoneKind::Grave),
        card_ids: vec!["Sabersaurus_0".into(), "Nope_9".into()],
        reason: MoveReason::Cost,
    });
    assert!(matches!(
        missing,
        Err(GameError::InvalidAction(InvalidAction::CardNotFound(_)))
    ));
    assert_eq!(duel.state(), &before);
}
