//! Practice duel simulator for Rescue Rabbit / Evolzar openings: seeded decks,
//! a six-phase turn engine, a probabilistic opponent interrupt model and a
//! reviewable action log.

pub mod action;
pub mod card;
pub mod combo;
pub mod config;
pub mod deck;
pub mod error;
pub mod game;
pub mod glossary;
pub mod interrupt;
pub mod moves;
pub mod odds;
pub mod phase;
pub mod rng;
pub mod state;
pub mod summon;
pub mod visualize;
pub mod zones;

pub use crate::action::{Action, ActionOutcome, Play};
pub use crate::card::Card;
pub use crate::config::SessionConfig;
pub use crate::deck::{DeckEntry, DeckStats, parse_deck};
pub use crate::error::{ConfigError, DeckError, GameError, GlossaryError, InvalidAction};
pub use crate::game::{Duel, DuelBuilder, DuelConfig};
pub use crate::glossary::{Glossary, GlossaryEntry};
pub use crate::interrupt::{Interrupt, InterruptCategory, InterruptTable, OpponentAnalysis};
pub use crate::moves::{ZoneKind, ZoneRef};
pub use crate::phase::{Phase, PhaseAction};
pub use crate::rng::Xorshift32;
pub use crate::state::{GameState, LogEntry, MoveReason, PlayerState, Side};
pub use crate::summon::MaterialHandling;
pub use crate::visualize::{VisualOptions, describe_outcome, render_state};
