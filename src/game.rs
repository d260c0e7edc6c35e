use crate::action::{Action, ActionOutcome, Play};
use crate::card::{Card, OPENING_HAND_SIZE};
use crate::combo::activate_rescue_rabbit;
use crate::deck::{DeckEntry, create_deck, shuffle_deck};
use crate::error::{GameError, InvalidAction};
use crate::glossary::Glossary;
use crate::interrupt::{InterruptTable, OpponentAnalysis, analyze_opponent_deck, check_interrupt};
use crate::moves::{draw, move_card, peek_deck, search_deck};
use crate::phase::{Phase, PhaseAction, auto_transitions, next_phase, transition_description};
use crate::rng::Xorshift32;
use crate::state::{GameState, PlayerState, Side};
use crate::summon::{detach_material, synchro_summon, xyz_summon};
use crate::zones::can_activate_trap;

const DEFAULT_SEED: u64 = 0x5EED_AB17;

/// Configuration required to bootstrap a duel.
#[derive(Clone, Debug)]
pub struct DuelConfig {
    pub seed: u64,
    /// The opponent draws alongside the player so interrupts see a real hand size.
    pub mirror_opponent_draws: bool,
    /// Fixed opponent hand size for interrupt odds; `None` uses the tracked hand.
    pub opponent_hand_size: Option<usize>,
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            mirror_opponent_draws: true,
            opponent_hand_size: None,
        }
    }
}

/// Builder collecting the deck lists before shuffling.
pub struct DuelBuilder {
    config: DuelConfig,
    main_deck: Vec<DeckEntry>,
    extra_deck: Vec<DeckEntry>,
    opponent_deck: Vec<DeckEntry>,
    opponent_extra_deck: Vec<DeckEntry>,
    interrupt_table: InterruptTable,
    glossary: Glossary,
}

impl DuelBuilder {
    pub fn new(main_deck: Vec<DeckEntry>) -> Self {
        Self {
            config: DuelConfig::default(),
            main_deck,
            extra_deck: Vec::new(),
            opponent_deck: Vec::new(),
            opponent_extra_deck: Vec::new(),
            interrupt_table: InterruptTable::default(),
            glossary: Glossary::default(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn with_extra_deck(mut self, extra_deck: Vec<DeckEntry>) -> Self {
        self.extra_deck = extra_deck;
        self
    }

    pub fn with_opponent_deck(mut self, opponent_deck: Vec<DeckEntry>) -> Self {
        self.opponent_deck = opponent_deck;
        self
    }

    pub fn with_opponent_extra_deck(mut self, opponent_extra_deck: Vec<DeckEntry>) -> Self {
        self.opponent_extra_deck = opponent_extra_deck;
        self
    }

    pub fn with_interrupt_table(mut self, table: InterruptTable) -> Self {
        self.interrupt_table = table;
        self
    }

    pub fn with_glossary(mut self, glossary: Glossary) -> Self {
        self.glossary = glossary;
        self
    }

    pub fn mirror_opponent_draws(mut self, mirror: bool) -> Self {
        self.config.mirror_opponent_draws = mirror;
        self
    }

    pub fn with_opponent_hand_size(mut self, size: usize) -> Self {
        self.config.opponent_hand_size = Some(size);
        self
    }

    pub fn build(self) -> Result<Duel, GameError> {
        Duel::from_builder(self)
    }
}

/// Rules/state engine for one practice duel.
pub struct Duel {
    state: GameState,
    analysis: Option<OpponentAnalysis>,
    glossary: Glossary,
    config: DuelConfig,
}

impl Duel {
    pub fn builder(main_deck: Vec<DeckEntry>) -> DuelBuilder {
        DuelBuilder::new(main_deck)
    }

    /// Resumes from an imported snapshot.
    pub fn from_state(
        state: GameState,
        analysis: Option<OpponentAnalysis>,
        glossary: Glossary,
    ) -> Self {
        let config = DuelConfig {
            seed: state.seed,
            ..DuelConfig::default()
        };
        Self {
            state,
            analysis,
            glossary,
            config,
        }
    }

    /// Swaps in an imported snapshot, keeping this duel's config, analysis
    /// and glossary. The snapshot's seed takes over.
    pub fn restore(&mut self, state: GameState) {
        log::info!(
            "restored snapshot at turn {} ({}), seed {}",
            state.turn,
            state.phase,
            state.seed
        );
        self.config.seed = state.seed;
        self.state = state;
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &DuelConfig {
        &self.config
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    pub fn glossary(&self) -> &Glossary {
        &self.glossary
    }

    pub fn glossary_mut(&mut self) -> &mut Glossary {
        &mut self.glossary
    }

    pub fn analysis(&self) -> Option<&OpponentAnalysis> {
        self.analysis.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn turn(&self) -> u32 {
        self.state.turn
    }

    pub fn active(&self) -> Side {
        self.state.active
    }

    fn from_builder(builder: DuelBuilder) -> Result<Self, GameError> {
        let DuelBuilder {
            config,
            main_deck,
            extra_deck,
            opponent_deck,
            opponent_extra_deck,
            interrupt_table,
            glossary,
        } = builder;
        if main_deck.is_empty() {
            return Err(GameError::InvalidConfiguration("main deck is empty"));
        }
        let seed = config.seed;
        let me = PlayerState::new(
            shuffle_deck(&create_deck(&main_deck), seed),
            shuffle_deck(&create_deck(&extra_deck), seed.wrapping_add(2)),
        );
        let opp = PlayerState::new(
            shuffle_deck(&create_deck(&opponent_deck), seed.wrapping_add(1)),
            shuffle_deck(&create_deck(&opponent_extra_deck), seed.wrapping_add(3)),
        );
        let analysis = (!opponent_deck.is_empty())
            .then(|| analyze_opponent_deck(&opponent_deck, &interrupt_table));
        log::info!(
            "new duel: seed {seed}, {} main / {} extra / {} opponent cards",
            me.deck.len(),
            me.zones.extra_deck.len(),
            opp.deck.len()
        );
        Ok(Self {
            state: GameState::new(me, opp, seed),
            analysis,
            glossary,
            config,
        })
    }

    pub fn apply_action(&mut self, action: Action) -> Result<ActionOutcome, GameError> {
        log::debug!("apply {action:?}");
        match action {
            Action::ChooseFirstPlayer(side) => self.choose_first_player(side),
            Action::StartTurn => self.start_turn(),
            Action::DrawInitial => self.opening_draw(PhaseAction::DrawInitial, OPENING_HAND_SIZE),
            Action::DrawFirst => self.opening_draw(PhaseAction::DrawFirst, 1),
            Action::Draw(count) => {
                let side = self.state.active;
                Ok(ActionOutcome {
                    drawn: draw(&mut self.state, side, count),
                    ..ActionOutcome::default()
                })
            }
            Action::ChangePhase(phase) => Ok(self.change_phase(phase)),
            Action::NextPhase => {
                let next = self.state.phase.next();
                Ok(self.change_phase(next))
            }
            Action::EndTurn => self.end_turn(),
            Action::Play(play) => self.play(play),
            Action::SetSpellTrap { card_id } => self.set_spell_trap(&card_id),
            Action::MoveCard {
                from,
                to,
                card_id,
                reason,
            } => {
                move_card(&mut self.state, from, to, &card_id, reason)?;
                Ok(ActionOutcome::default())
            }
            Action::UsePotOfDuality => {
                let side = self.state.active;
                self.state.active_player_mut().pot_of_duality_lock = true;
                self.state.log(
                    side,
                    format!("[{side}] Pot of Duality used (no special summons this turn)"),
                );
                Ok(ActionOutcome::default())
            }
            Action::ShuffleDeck(side) => {
                let seed = self.interaction_seed();
                let player = self.state.player_mut(side);
                player.deck = shuffle_deck(&player.deck, seed);
                self.state.log(side, format!("[{side}] Deck shuffled"));
                Ok(ActionOutcome::default())
            }
            Action::PeekDeck { side, count } => Ok(ActionOutcome {
                peeked: peek_deck(&mut self.state, side, count),
                ..ActionOutcome::default()
            }),
            Action::SearchDeck {
                to,
                card_ids,
                reason,
            } => Ok(ActionOutcome {
                searched: search_deck(&mut self.state, to, &card_ids, reason)?,
                ..ActionOutcome::default()
            }),
            Action::SelectCard { side, card_id } => {
                let hand = &mut self.state.player_mut(side).hand;
                Self::hand_position(hand, &card_id)?;
                for card in hand.iter_mut() {
                    card.selected = card.id == card_id && !card.selected;
                }
                Ok(ActionOutcome::default())
            }
            Action::ToggleUsed { side, card_id } => {
                let hand = &mut self.state.player_mut(side).hand;
                let index = Self::hand_position(hand, &card_id)?;
                hand[index].used = !hand[index].used;
                Ok(ActionOutcome::default())
            }
            Action::ToggleRevealed { side, card_id } => {
                let hand = &mut self.state.player_mut(side).hand;
                let index = Self::hand_position(hand, &card_id)?;
                hand[index].revealed = !hand[index].revealed;
                Ok(ActionOutcome::default())
            }
            Action::XyzSummon {
                materials,
                extra_card_id,
                target,
                handling,
            } => {
                let side = self.state.active;
                self.require_special_summon()?;
                xyz_summon(
                    &mut self.state,
                    &self.glossary,
                    side,
                    &materials,
                    &extra_card_id,
                    target,
                    handling,
                )?;
                Ok(ActionOutcome::default())
            }
            Action::SynchroSummon {
                materials,
                extra_card_id,
                target,
            } => {
                let side = self.state.active;
                self.require_special_summon()?;
                synchro_summon(
                    &mut self.state,
                    &self.glossary,
                    side,
                    &materials,
                    &extra_card_id,
                    target,
                )?;
                Ok(ActionOutcome::default())
            }
            Action::DetachMaterial { zone, material } => {
                let side = self.state.active;
                detach_material(&mut self.state, side, zone, material)?;
                Ok(ActionOutcome::default())
            }
            Action::RescueRabbit { card_id, chosen } => {
                let summoned = activate_rescue_rabbit(&mut self.state, &card_id, &chosen)?;
                Ok(ActionOutcome {
                    summoned,
                    ..ActionOutcome::default()
                })
            }
        }
    }

    fn hand_position(hand: &[Card], card_id: &str) -> Result<usize, InvalidAction> {
        hand.iter()
            .position(|card| card.id == card_id)
            .ok_or_else(|| InvalidAction::CardNotFound(card_id.to_string()))
    }

    /// Seed for in-game randomness: the session seed offset by the log length.
    fn interaction_seed(&self) -> u64 {
        self.state.seed.wrapping_add(self.state.logs.len() as u64)
    }

    /// Hand size the interrupt odds assume. An untracked (empty) opponent hand
    /// counts as a full opening hand.
    fn opponent_hand_size(&self) -> usize {
        match self.config.opponent_hand_size {
            Some(size) => size,
            None if self.state.opp.hand.is_empty() => OPENING_HAND_SIZE,
            None => self.state.opp.hand.len(),
        }
    }

    fn require_special_summon(&self) -> Result<(), InvalidAction> {
        if self.state.active_player().pot_of_duality_lock {
            return Err(InvalidAction::SpecialSummonLocked);
        }
        Ok(())
    }

    fn choose_first_player(&mut self, side: Side) -> Result<ActionOutcome, GameError> {
        if self.state.setup_complete || self.state.first_player.is_some() {
            return Err(GameError::SetupAlreadyComplete);
        }
        let drawn = draw(&mut self.state, Side::Me, OPENING_HAND_SIZE);
        draw(&mut self.state, Side::Opp, OPENING_HAND_SIZE);
        self.state.first_player = Some(side);
        self.state.active = side;
        self.state.log(side, format!("Setup: {side} goes first"));
        self.state
            .log(side, format!("Setup: both players draw {OPENING_HAND_SIZE}"));
        log::info!("setup complete, {side} goes first");
        Ok(ActionOutcome {
            drawn,
            ..ActionOutcome::default()
        })
    }

    fn start_turn(&mut self) -> Result<ActionOutcome, GameError> {
        if self.state.setup_complete {
            return Err(GameError::SetupAlreadyComplete);
        }
        let first = self.state.first_player.ok_or(GameError::FirstPlayerNotChosen)?;
        let drawn = draw(&mut self.state, first, 1);
        self.state.setup_complete = true;
        self.state.active = first;
        self.state
            .log(first, format!("[{first}] Draw Phase: draws 1 (going first)"));
        Ok(ActionOutcome {
            drawn,
            ..ActionOutcome::default()
        })
    }

    fn opening_draw(
        &mut self,
        action: PhaseAction,
        count: usize,
    ) -> Result<ActionOutcome, GameError> {
        let side = self.state.active;
        let drawn = draw(&mut self.state, side, count);
        let mirror = side == Side::Me && self.config.mirror_opponent_draws;
        if mirror && !self.state.opp.deck.is_empty() {
            draw(&mut self.state, Side::Opp, count);
        }
        let phase_change = self.auto_transition(action, false);
        Ok(ActionOutcome {
            drawn,
            phase_change,
            ..ActionOutcome::default()
        })
    }

    fn change_phase(&mut self, phase: Phase) -> ActionOutcome {
        let from = self.state.phase;
        self.state.phase = phase;
        let side = self.state.active;
        self.state
            .log(side, format!("Phase change: {} -> {}", from.long_name(), phase.long_name()));
        ActionOutcome {
            phase_change: (from != phase).then_some((from, phase)),
            ..ActionOutcome::default()
        }
    }

    /// Applies the automatic transition for `action`. Returns the change, if any.
    fn auto_transition(&mut self, action: PhaseAction, describe: bool) -> Option<(Phase, Phase)> {
        let from = self.state.phase;
        if !auto_transitions(from, action) {
            return None;
        }
        let to = next_phase(from, action)?;
        self.state.phase = to;
        if describe {
            if let Some(description) = transition_description(from, action) {
                let side = self.state.active;
                self.state.log(side, format!("Phase transition: {description}"));
            }
        }
        Some((from, to))
    }

    fn end_turn(&mut self) -> Result<ActionOutcome, GameError> {
        if !self.state.setup_complete {
            return Err(GameError::SetupIncomplete);
        }
        let current = self.state.active;
        let from = self.state.phase;
        self.state.player_mut(current).reset_turn_flags();
        self.state.log(current, format!("Turn end ({current})"));

        let next = current.other();
        self.state.active = next;
        self.state.phase = Phase::Draw;
        self.state.turn += 1;
        let drawn = draw(&mut self.state, next, 1);
        log::info!("turn {} begins for {next}", self.state.turn);
        Ok(ActionOutcome {
            drawn,
            phase_change: Some((from, Phase::Draw)),
            ..ActionOutcome::default()
        })
    }

    fn selected_or(&self, card_id: Option<&str>) -> Result<usize, InvalidAction> {
        let player = self.state.active_player();
        match card_id {
            Some(id) => player
                .hand_index(id)
                .ok_or_else(|| InvalidAction::CardNotFound(id.to_string())),
            None => player
                .selected_hand_index()
                .ok_or(InvalidAction::NothingSelected),
        }
    }

    fn play(&mut self, play: Play) -> Result<ActionOutcome, GameError> {
        if !self.state.setup_complete {
            return Err(GameError::SetupIncomplete);
        }
        let phase = self.state.phase;
        let phase_action = play.phase_action();
        if next_phase(phase, phase_action).is_none() {
            return Err(InvalidAction::PhaseForbidden {
                phase,
                action: phase_action,
            }
            .into());
        }

        let side = self.state.active;
        let mut summoned = Vec::new();
        match &play {
            Play::NormalSummon { card_id } | Play::SpecialSummon { card_id } => {
                let normal = matches!(play, Play::NormalSummon { .. });
                let player = self.state.active_player();
                if normal && player.normal_summon_used {
                    return Err(InvalidAction::NormalSummonUsed.into());
                }
                if !normal && player.pot_of_duality_lock {
                    return Err(InvalidAction::SpecialSummonLocked.into());
                }
                let index = self.selected_or(card_id.as_deref())?;
                let zone = player
                    .zones
                    .first_free_monster_zone()
                    .ok_or(InvalidAction::NoFreeMonsterZone)?;
                let player = self.state.active_player_mut();
                let card = player.hand.remove(index);
                player.zones.place_monster(card.clone(), zone)?;
                if normal {
                    player.normal_summon_used = true;
                }
                let label = if normal { "Normal Summon" } else { "Special Summon" };
                self.state
                    .log(side, format!("{label}: {} (MZ{})", card.name, zone + 1));
                summoned.push(card);
            }
            Play::ActivateSpell { card_id } => {
                let index = self.selected_or(card_id.as_deref())?;
                let player = self.state.active_player_mut();
                let card = player.hand.remove(index);
                player.zones.graveyard.push(card.reset());
                self.state.log(side, format!("Spell activated: {}", card.name));
            }
            Play::ActivateTrap { zone } => {
                let zones = &self.state.active_player().zones;
                let zone = match zone {
                    Some(zone) => *zone,
                    None => zones
                        .spell_trap_zones
                        .iter()
                        .position(Option::is_some)
                        .ok_or(InvalidAction::NothingSelected)?,
                };
                let trap = zones
                    .spell_trap_zones
                    .get(zone)
                    .ok_or(InvalidAction::ZoneIndex(zone))?
                    .as_ref()
                    .ok_or(InvalidAction::ZoneEmpty(zone))?;
                can_activate_trap(trap, self.state.turn)?;
                let card = self
                    .state
                    .active_player_mut()
                    .zones
                    .send_spell_trap_to_grave(zone)?;
                self.state.log(side, format!("Trap activated: {}", card.name));
            }
            Play::Attack => self.state.log(side, "Attack declared"),
            Play::DamageStep => self.state.log(side, "Damage step"),
        }

        let interrupt = match (&self.analysis, side) {
            (Some(analysis), Side::Me) => {
                let mut rng = Xorshift32::new(self.interaction_seed());
                let result = check_interrupt(
                    analysis,
                    phase,
                    play.trigger(),
                    self.opponent_hand_size(),
                    &mut rng,
                );
                match &result {
                    Some(hit) => self.state.log(
                        Side::Opp,
                        format!("Opp activates {} ({})", hit.card_name, hit.category),
                    ),
                    None => self.state.log(Side::Opp, "Opp does not respond"),
                }
                result
            }
            _ => None,
        };

        let phase_change = self.auto_transition(phase_action, true);
        Ok(ActionOutcome {
            interrupt,
            phase_change,
            summoned,
            ..ActionOutcome::default()
        })
    }

    fn set_spell_trap(&mut self, card_id: &str) -> Result<ActionOutcome, GameError> {
        let side = self.state.active;
        let turn = self.state.turn;
        let player = self.state.active_player_mut();
        let index = player
            .hand_index(card_id)
            .ok_or_else(|| InvalidAction::CardNotFound(card_id.to_string()))?;
        let zone = player
            .zones
            .first_free_spell_trap_zone()
            .ok_or(InvalidAction::NoFreeSpellTrapZone)?;
        let card = player.hand.remove(index);
        player.zones.place_spell_trap(card.clone(), zone, true, turn)?;
        self.state
            .log(side, format!("[{side}] Set {} (ST{})", card.name, zone + 1));
        Ok(ActionOutcome::default())
    }
}
