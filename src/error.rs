use std::path::PathBuf;

use thiserror::Error;

use crate::phase::{Phase, PhaseAction};

/// Errors that can occur when manipulating the duel state.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("invalid action: {0}")]
    InvalidAction(#[from] InvalidAction),
    #[error("setup is not complete")]
    SetupIncomplete,
    #[error("setup has already been completed")]
    SetupAlreadyComplete,
    #[error("first player has not been chosen")]
    FirstPlayerNotChosen,
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error(transparent)]
    Deck(#[from] DeckError),
    #[error("failed to (de)serialize state: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("failed to write {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
}

/// Details of rejected player actions. The state is left untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidAction {
    #[error("zone index {0} is out of range")]
    ZoneIndex(usize),
    #[error("zone index is required for this zone")]
    MissingZoneIndex,
    #[error("zone {0} is already occupied")]
    ZoneOccupied(usize),
    #[error("zone {0} is empty")]
    ZoneEmpty(usize),
    #[error("no free monster zone")]
    NoFreeMonsterZone,
    #[error("no free spell/trap zone")]
    NoFreeSpellTrapZone,
    #[error("card {0} is not in the source zone")]
    CardNotFound(String),
    #[error("card {0} was named more than once")]
    DuplicateCard(String),
    #[error("no card is selected in hand")]
    NothingSelected,
    #[error("{action:?} is not allowed during {phase:?}")]
    PhaseForbidden { phase: Phase, action: PhaseAction },
    #[error("normal summon already used this turn")]
    NormalSummonUsed,
    #[error("special summons are locked by Pot of Duality this turn")]
    SpecialSummonLocked,
    #[error("a trap cannot be activated the turn it was set")]
    TrapSetThisTurn,
    #[error("at least {required} materials are required")]
    NotEnoughMaterials { required: usize },
    #[error("Rescue Rabbit cannot be activated: {0}")]
    RescueRabbit(&'static str),
    #[error("no Xyz material {material} under monster zone {zone}")]
    MaterialIndex { zone: usize, material: usize },
}

/// Errors raised while reading a deck list.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeckError {
    #[error("line {line}: card count must be positive")]
    ZeroCount { line: usize },
    #[error("line {line}: card count is too large")]
    CountOverflow { line: usize },
}

/// Errors raised while loading a session configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid deck list {0}: {1}")]
    Deck(PathBuf, #[source] DeckError),
    #[error("opponent hand size must be between 1 and {max}")]
    OpponentHandSize { max: usize },
    #[error("main deck list path is required")]
    MissingDeck,
}

/// Errors raised by glossary persistence and import.
#[derive(Debug, Error)]
pub enum GlossaryError {
    #[error("failed to access glossary file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("invalid glossary JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("entry \"{0}\" is missing a summary")]
    MissingSummary(String),
    #[error("entry \"{0}\" is not an object")]
    InvalidEntry(String),
    #[error("built-in entry \"{0}\" cannot be removed")]
    BuiltIn(String),
}
