use serde::{Deserialize, Serialize};

pub const MONSTER_ZONE_COUNT: usize = 5;
pub const SPELL_TRAP_ZONE_COUNT: usize = 5;
pub const OPENING_HAND_SIZE: usize = 5;
pub const RESCUE_RABBIT_SUMMONS: usize = 2;
pub const MIN_XYZ_MATERIALS: usize = 2;
pub const MIN_SYNCHRO_MATERIALS: usize = 2;

const NORMAL_MONSTER_NAMES: &[&str] = &[
    "セイバーザウルス",
    "ジェネティック・ワーウルフ",
    "通常モンスター",
    "Sabersaurus",
    "Gene-Warped Warwolf",
    "Normal Monster",
];
const DINOSAUR_MARKERS: &[&str] = &["恐竜", "Dinosaur"];
const EFFECT_MARKERS: &[&str] = &["効果", "Effect"];
const LEVEL_FOUR_NAMES: &[&str] = &[
    "セイバーザウルス",
    "ジェネティック・ワーウルフ",
    "レベル4",
    "Sabersaurus",
    "Gene-Warped Warwolf",
    "Level 4",
];
const RESCUE_RABBIT_NAMES: &[&str] = &["レスキューラビット", "Rescue Rabbit"];
const POT_OF_DUALITY_NAMES: &[&str] = &["強欲で謙虚な壺", "Pot of Duality"];
const TRAP_MARKERS: &[&str] = &["罠", "トラップ", "Trap"];

/// A single physical card. `id` is unique within one player's cards.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub face_up: bool,
    #[serde(default)]
    pub is_set: bool,
    #[serde(default)]
    pub set_turn: Option<u32>,
    #[serde(default)]
    pub used: bool,
    #[serde(default)]
    pub revealed: bool,
    #[serde(default)]
    pub selected: bool,
}

impl Card {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            face_up: false,
            is_set: false,
            set_turn: None,
            used: false,
            revealed: false,
            selected: false,
        }
    }

    /// Copy of the card with every zone-local flag cleared.
    pub fn reset(&self) -> Self {
        Self::new(self.name.clone(), self.id.clone())
    }

    pub fn is_normal_monster(&self) -> bool {
        is_normal_monster(&self.name)
    }

    pub fn is_level_four(&self) -> bool {
        contains_any(&self.name, LEVEL_FOUR_NAMES)
    }

    pub fn is_rescue_rabbit(&self) -> bool {
        contains_any(&self.name, RESCUE_RABBIT_NAMES)
    }
}

/// Name-based normal monster check. Dinosaurs count unless marked as effect monsters.
pub fn is_normal_monster(name: &str) -> bool {
    contains_any(name, NORMAL_MONSTER_NAMES)
        || (contains_any(name, DINOSAUR_MARKERS) && !contains_any(name, EFFECT_MARKERS))
}

pub fn is_pot_of_duality(name: &str) -> bool {
    contains_any(name, POT_OF_DUALITY_NAMES)
}

pub fn is_trap(name: &str) -> bool {
    contains_any(name, TRAP_MARKERS)
}

fn contains_any(name: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| name.contains(needle))
}
