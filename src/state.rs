use std::fmt::{self, Write};
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::error::GameError;
use crate::phase::Phase;
use crate::zones::Zones;

/// Which seat a player occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Me,
    Opp,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Me => Side::Opp,
            Side::Opp => Side::Me,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::Me => "Me",
            Side::Opp => "Opp",
        }
    }

    pub fn parse(input: &str) -> Option<Side> {
        match input.to_ascii_lowercase().as_str() {
            "me" | "self" => Some(Side::Me),
            "opp" | "opponent" => Some(Side::Opp),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a card moved, recorded in the action log.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveReason {
    NormalSummon,
    SpecialSummon,
    Set,
    Search,
    Activate,
    Destroy,
    Banish,
    Bounce,
    Cost,
    Resolve,
    #[default]
    Move,
}

impl MoveReason {
    pub fn label(self) -> &'static str {
        match self {
            MoveReason::NormalSummon => "Normal Summon",
            MoveReason::SpecialSummon => "Special Summon",
            MoveReason::Set => "Set",
            MoveReason::Search => "Search",
            MoveReason::Activate => "Activate",
            MoveReason::Destroy => "Destroy",
            MoveReason::Banish => "Banish",
            MoveReason::Bounce => "Bounce",
            MoveReason::Cost => "Cost",
            MoveReason::Resolve => "Resolve",
            MoveReason::Move => "Move",
        }
    }

    pub fn parse(input: &str) -> Option<MoveReason> {
        let normalized: String = input
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "normalsummon" | "ns" => Some(MoveReason::NormalSummon),
            "specialsummon" | "ss" => Some(MoveReason::SpecialSummon),
            "set" => Some(MoveReason::Set),
            "search" => Some(MoveReason::Search),
            "activate" => Some(MoveReason::Activate),
            "destroy" => Some(MoveReason::Destroy),
            "banish" => Some(MoveReason::Banish),
            "bounce" => Some(MoveReason::Bounce),
            "cost" => Some(MoveReason::Cost),
            "resolve" => Some(MoveReason::Resolve),
            "move" => Some(MoveReason::Move),
            _ => None,
        }
    }
}

/// Everything one player owns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Main deck, index 0 is the top.
    pub deck: Vec<Card>,
    pub hand: Vec<Card>,
    pub zones: Zones,
    /// Pot of Duality was used: no special summons for the rest of the turn.
    pub pot_of_duality_lock: bool,
    pub normal_summon_used: bool,
}

impl PlayerState {
    pub fn new(deck: Vec<Card>, extra_deck: Vec<Card>) -> Self {
        Self {
            deck,
            hand: Vec::new(),
            zones: Zones::with_extra_deck(extra_deck),
            pot_of_duality_lock: false,
            normal_summon_used: false,
        }
    }

    /// Clears once-per-turn flags.
    pub fn reset_turn_flags(&mut self) {
        self.pot_of_duality_lock = false;
        self.normal_summon_used = false;
    }

    pub fn selected_hand_index(&self) -> Option<usize> {
        self.hand.iter().position(|card| card.selected)
    }

    pub fn hand_index(&self, card_id: &str) -> Option<usize> {
        self.hand.iter().position(|card| card.id == card_id)
    }

    /// Deck cards whose name contains `query`, ignoring case, in deck order.
    /// An empty query matches the whole deck.
    pub fn search_deck(&self, query: &str) -> Vec<&Card> {
        let query = query.to_lowercase();
        self.deck
            .iter()
            .filter(|card| card.name.to_lowercase().contains(&query))
            .collect()
    }
}

/// One line of the reviewable action log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub turn: u32,
    pub phase: Phase,
    pub action: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub side: Side,
}

/// Complete duel snapshot. This is what gets exported and imported.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub me: PlayerState,
    pub opp: PlayerState,
    pub active: Side,
    pub first_player: Option<Side>,
    pub setup_complete: bool,
    pub phase: Phase,
    pub turn: u32,
    pub logs: Vec<LogEntry>,
    pub seed: u64,
}

impl GameState {
    pub fn new(me: PlayerState, opp: PlayerState, seed: u64) -> Self {
        Self {
            me,
            opp,
            active: Side::Me,
            first_player: None,
            setup_complete: false,
            phase: Phase::Draw,
            turn: 1,
            logs: Vec::new(),
            seed,
        }
    }

    pub fn player(&self, side: Side) -> &PlayerState {
        match side {
            Side::Me => &self.me,
            Side::Opp => &self.opp,
        }
    }

    pub fn player_mut(&mut self, side: Side) -> &mut PlayerState {
        match side {
            Side::Me => &mut self.me,
            Side::Opp => &mut self.opp,
        }
    }

    pub fn active_player(&self) -> &PlayerState {
        self.player(self.active)
    }

    pub fn active_player_mut(&mut self) -> &mut PlayerState {
        self.player_mut(self.active)
    }

    /// Appends a log line stamped with the current turn and phase.
    pub fn log(&mut self, side: Side, action: impl Into<String>) {
        let action = action.into();
        log::debug!("T{} {} [{side}] {action}", self.turn, self.phase);
        self.logs.push(LogEntry {
            turn: self.turn,
            phase: self.phase,
            action,
            timestamp: now_millis(),
            side,
        });
    }

    pub fn export_json(&self) -> Result<String, GameError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the markdown log for `.md` paths and the JSON snapshot otherwise.
    pub fn export_to(&self, path: &Path) -> Result<(), GameError> {
        let content = match path.extension().and_then(|ext| ext.to_str()) {
            Some("md") => self.markdown_log(),
            _ => self.export_json()?,
        };
        fs::write(path, content).map_err(|err| GameError::Io(path.to_path_buf(), err))
    }

    /// Parses an exported snapshot and checks its structural invariants.
    pub fn import_json(json: &str) -> Result<Self, GameError> {
        let state: GameState = serde_json::from_str(json)?;
        if state.turn == 0 {
            return Err(GameError::InvalidConfiguration("turn must start at 1"));
        }
        if state.setup_complete && state.first_player.is_none() {
            return Err(GameError::InvalidConfiguration(
                "completed setup requires a first player",
            ));
        }
        for side in [Side::Me, Side::Opp] {
            let zones = &state.player(side).zones;
            for zone in zones.xyz_materials.keys() {
                if zones.monster_zones.get(*zone).is_none_or(Option::is_none) {
                    return Err(GameError::InvalidConfiguration(
                        "xyz materials attached to an empty monster zone",
                    ));
                }
            }
        }
        Ok(state)
    }

    /// Review log grouped by turn and phase, followed by a zone summary.
    pub fn markdown_log(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Duel Log\n");
        let _ = writeln!(out, "**Turn**: {}\n", self.turn);
        let _ = writeln!(out, "**Phase**: {}\n", self.phase);
        let _ = writeln!(out, "**Active player**: {}\n", self.active);
        for side in [Side::Me, Side::Opp] {
            if self.player(side).pot_of_duality_lock {
                let _ = writeln!(
                    out,
                    "**{side}: Pot of Duality lock (no special summons)**\n"
                );
            }
        }

        let _ = writeln!(out, "\n## Actions\n");
        let mut current_turn = None;
        for entry in &self.logs {
            if current_turn != Some(entry.turn) {
                current_turn = Some(entry.turn);
                let _ = writeln!(out, "\n### T{} - {}\n", entry.turn, entry.phase);
            }
            let _ = writeln!(out, "- {}", entry.action);
        }

        let _ = writeln!(out, "\n## Current State\n");
        for side in [Side::Me, Side::Opp] {
            let player = self.player(side);
            let _ = writeln!(out, "### {side}");
            let _ = writeln!(out, "- **Hand**: {}", player.hand.len());
            if side == Side::Me {
                for card in &player.hand {
                    let mut markers = Vec::new();
                    if card.used {
                        markers.push("used");
                    }
                    if card.revealed {
                        markers.push("revealed");
                    }
                    if markers.is_empty() {
                        let _ = writeln!(out, "  - {}", card.name);
                    } else {
                        let _ = writeln!(out, "  - {} [{}]", card.name, markers.join(", "));
                    }
                }
            }
            let _ = writeln!(out, "- **Monster zones**: {}", player.zones.monster_count());
            let _ = writeln!(
                out,
                "- **Spell/Trap zones**: {}",
                player.zones.spell_trap_count()
            );
            let _ = writeln!(out, "- **Graveyard**: {}", player.zones.graveyard.len());
            let _ = writeln!(out, "- **Banished**: {}", player.zones.banished.len());
            let _ = writeln!(out, "- **Deck**: {}", player.deck.len());
            let _ = writeln!(out, "- **Extra deck**: {}", player.zones.extra_deck.len());
        }
        out
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
