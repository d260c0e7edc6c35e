//! Session configuration loaded from YAML.
//!
//! A session file names the deck lists to load, the shuffle seed, the
//! opponent hand size assumed by the interrupt odds and the glossary file.
//! Relative paths are resolved against the directory of the session file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::deck::{DeckEntry, parse_deck};
use crate::error::ConfigError;

/// Largest opponent hand the interrupt model accepts.
pub const MAX_OPPONENT_HAND_SIZE: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// Main deck list.
    #[serde(default)]
    pub deck: Option<PathBuf>,
    #[serde(default)]
    pub extra_deck: Option<PathBuf>,
    #[serde(default)]
    pub opponent_deck: Option<PathBuf>,
    #[serde(default)]
    pub opponent_extra_deck: Option<PathBuf>,
    /// Shuffle seed. A random one is picked when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Fixed opponent hand size; the tracked hand is used when absent.
    #[serde(default)]
    pub opponent_hand_size: Option<usize>,
    #[serde(default)]
    pub glossary: Option<PathBuf>,
    #[serde(default = "default_mirror")]
    pub mirror_opponent_draws: bool,
}

fn default_mirror() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            deck: None,
            extra_deck: None,
            opponent_deck: None,
            opponent_extra_deck: None,
            seed: None,
            opponent_hand_size: None,
            glossary: None,
            mirror_opponent_draws: default_mirror(),
        }
    }
}

impl SessionConfig {
    /// Load a session file and resolve its paths relative to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let mut config = Self::from_yaml(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        log::info!("loaded session config from {}", path.display());
        Ok(config)
    }

    /// Parse a session from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid or a value is out of range.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(size) = self.opponent_hand_size {
            if size == 0 || size > MAX_OPPONENT_HAND_SIZE {
                return Err(ConfigError::OpponentHandSize {
                    max: MAX_OPPONENT_HAND_SIZE,
                });
            }
        }
        Ok(())
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        for path in [
            &mut self.deck,
            &mut self.extra_deck,
            &mut self.opponent_deck,
            &mut self.opponent_extra_deck,
            &mut self.glossary,
        ]
        .into_iter()
        .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Path of the main deck list.
    pub fn deck_path(&self) -> Result<&Path, ConfigError> {
        self.deck.as_deref().ok_or(ConfigError::MissingDeck)
    }
}

/// Reads and parses a deck list file.
pub fn load_deck_list(path: &Path) -> Result<Vec<DeckEntry>, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
    parse_deck(&content).map_err(|e| ConfigError::Deck(path.to_path_buf(), e))
}

/// Like [`load_deck_list`] for optional decks; `None` yields an empty list.
pub fn load_optional_deck_list(path: Option<&Path>) -> Result<Vec<DeckEntry>, ConfigError> {
    path.map(load_deck_list).transpose().map(Option::unwrap_or_default)
}
