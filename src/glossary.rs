//! Card glossary: effect summaries, timings and monster stats.
//!
//! Built-in entries are always available. User entries are persisted to a
//! JSON file that contains only the user's additions; built-ins are merged in
//! at load time so they stay current.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

use crate::error::GlossaryError;

/// Characters `encodeURIComponent` leaves alone.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Monster,
    Spell,
    Trap,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub race: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "type")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atk: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub def: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_category: Option<CardType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monster: Option<MonsterInfo>,
}

impl GlossaryEntry {
    pub fn level(&self) -> Option<u8> {
        self.monster.as_ref().and_then(|monster| monster.level)
    }
}

fn entry(
    summary: &str,
    timing: &str,
    notes: &str,
    tags: &[&str],
    type_category: CardType,
    monster: Option<MonsterInfo>,
) -> GlossaryEntry {
    GlossaryEntry {
        summary: summary.to_string(),
        timing: Some(timing.to_string()),
        notes: Some(notes.to_string()),
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        type_category: Some(type_category),
        url: None,
        monster,
    }
}

fn monster(attribute: &str, level: u8, race: &str, kind: &str, atk: u32, def: u32) -> MonsterInfo {
    MonsterInfo {
        attribute: Some(attribute.to_string()),
        level: Some(level),
        race: Some(race.to_string()),
        kind: Some(kind.to_string()),
        atk: Some(atk),
        def: Some(def),
    }
}

/// Japanese card names and the built-in entry each one shares.
const JAPANESE_NAMES: &[(&str, &str)] = &[
    ("レスキューラビット", "Rescue Rabbit"),
    ("強欲で謙虚な壺", "Pot of Duality"),
    ("神の警告", "Solemn Warning"),
    ("奈落の落とし穴", "Bottomless Trap Hole"),
    ("次元幽閉", "Dimensional Prison"),
    ("サイクロン", "Mystical Space Typhoon"),
    ("エフェクト・ヴェーラー", "Effect Veiler"),
    ("エヴォルカイザー・ラギア", "Evolzar Laggia"),
    ("エヴォルカイザー・ドルカ", "Evolzar Dolkka"),
    ("セイバーザウルス", "Sabersaurus"),
    ("ジェネティック・ワーウルフ", "Gene-Warped Warwolf"),
];

/// Entries shipped with the simulator, under both English and Japanese names.
pub fn builtin_entries() -> BTreeMap<String, GlossaryEntry> {
    let mut entries = BTreeMap::new();
    entries.insert(
        "Rescue Rabbit".to_string(),
        entry(
            "Banish this card; Special Summon 2 Normal Monsters with the same name from the Deck",
            "Main Phase 1 ignition effect",
            "Negated by Veiler or Chalice; the banish cost is not returned",
            &["normal monster", "special summon"],
            CardType::Monster,
            Some(monster("EARTH", 4, "Beast", "Effect", 300, 100)),
        ),
    );
    entries.insert(
        "Pot of Duality".to_string(),
        entry(
            "Excavate the top 3 cards, add 1 to hand; no Special Summons this turn",
            "Main Phase ignition",
            "Can be chained to with Mystical Space Typhoon or Dust Tornado",
            &["draw", "restriction"],
            CardType::Spell,
            None,
        ),
    );
    entries.insert(
        "Solemn Warning".to_string(),
        entry(
            "Pay 2000 LP; negate a Summon and destroy that monster",
            "Counter trap on summon",
            "Answered by Magic Cylinder or Divine Wrath",
            &["summon negation", "counter trap"],
            CardType::Trap,
            None,
        ),
    );
    entries.insert(
        "Bottomless Trap Hole".to_string(),
        entry(
            "Destroy and banish a summoned monster with 1500 or more ATK",
            "Normal trap on summon success",
            "Can be removed with Mystical Space Typhoon or Dust Tornado",
            &["summon hate", "normal trap"],
            CardType::Trap,
            None,
        ),
    );
    entries.insert(
        "Dimensional Prison".to_string(),
        entry(
            "Banish the attacking monster",
            "Normal trap on attack declaration",
            "Can be removed with Mystical Space Typhoon or Dust Tornado",
            &["battle hate", "normal trap"],
            CardType::Trap,
            None,
        ),
    );
    entries.insert(
        "Mystical Space Typhoon".to_string(),
        entry(
            "Destroy 1 spell or trap on the field",
            "Quick-play spell",
            "Answered by Magic Cylinder or Divine Wrath",
            &["backrow removal", "quick-play"],
            CardType::Spell,
            None,
        ),
    );
    entries.insert(
        "Effect Veiler".to_string(),
        entry(
            "Negate the effects of 1 opponent's face-up monster until end of turn",
            "Opponent's Main Phase quick effect",
            "Discarded from hand; cannot be chained to by most backrow",
            &["effect negation", "hand trap"],
            CardType::Monster,
            Some(monster("LIGHT", 1, "Spellcaster", "Tuner/Effect", 0, 0)),
        ),
    );
    entries.insert(
        "Evolzar Laggia".to_string(),
        entry(
            "Once per turn, detach 2 materials to negate a summon or spell/trap activation and destroy it",
            "Quick effect",
            "Negated by Veiler or Chalice",
            &["negation", "xyz"],
            CardType::Monster,
            Some(monster("FIRE", 4, "Dragon", "Xyz", 2400, 2000)),
        ),
    );
    entries.insert(
        "Evolzar Dolkka".to_string(),
        entry(
            "Twice per turn, detach 2 materials to negate a monster effect activation and destroy it",
            "Quick effect",
            "Negated by Veiler or Chalice",
            &["negation", "xyz"],
            CardType::Monster,
            Some(monster("FIRE", 4, "Dragon", "Xyz", 2300, 1700)),
        ),
    );
    entries.insert(
        "Sabersaurus".to_string(),
        GlossaryEntry {
            summary: "Normal Monster".to_string(),
            tags: vec!["normal monster".to_string()],
            type_category: Some(CardType::Monster),
            monster: Some(monster("EARTH", 4, "Dinosaur", "Normal", 1900, 500)),
            ..GlossaryEntry::default()
        },
    );
    entries.insert(
        "Gene-Warped Warwolf".to_string(),
        GlossaryEntry {
            summary: "Normal Monster".to_string(),
            tags: vec!["normal monster".to_string()],
            type_category: Some(CardType::Monster),
            monster: Some(monster("EARTH", 4, "Beast-Warrior", "Normal", 2000, 100)),
            ..GlossaryEntry::default()
        },
    );
    for (japanese, english) in JAPANESE_NAMES {
        if let Some(entry) = entries.get(*english).cloned() {
            entries.insert(japanese.to_string(), entry);
        }
    }
    entries
}

/// Built-in plus user entries. User entries shadow built-ins of the same name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Glossary {
    builtin: BTreeMap<String, GlossaryEntry>,
    user: BTreeMap<String, GlossaryEntry>,
}

impl Default for Glossary {
    fn default() -> Self {
        Self {
            builtin: builtin_entries(),
            user: BTreeMap::new(),
        }
    }
}

impl Glossary {
    /// Loads user entries from `path`. A missing file yields the built-ins only.
    pub fn load(path: &Path) -> Result<Self, GlossaryError> {
        let mut glossary = Self::default();
        if !path.exists() {
            return Ok(glossary);
        }
        let json =
            fs::read_to_string(path).map_err(|err| GlossaryError::Io(path.to_path_buf(), err))?;
        glossary.user = serde_json::from_str(&json)?;
        log::info!(
            "loaded {} glossary entries from {}",
            glossary.user.len(),
            path.display()
        );
        Ok(glossary)
    }

    /// Writes only the user entries that are not built-in names.
    pub fn save(&self, path: &Path) -> Result<(), GlossaryError> {
        let user: BTreeMap<&String, &GlossaryEntry> = self
            .user
            .iter()
            .filter(|(name, _)| !self.builtin.contains_key(*name))
            .collect();
        let json = serde_json::to_string_pretty(&user)?;
        fs::write(path, json).map_err(|err| GlossaryError::Io(path.to_path_buf(), err))
    }

    fn merged(&self) -> BTreeMap<&String, &GlossaryEntry> {
        self.builtin.iter().chain(self.user.iter()).collect()
    }

    /// Exact name first, then the first entry whose name contains or is
    /// contained in `name`.
    pub fn lookup(&self, name: &str) -> Option<&GlossaryEntry> {
        if let Some(entry) = self.user.get(name).or_else(|| self.builtin.get(name)) {
            return Some(entry);
        }
        if name.is_empty() {
            return None;
        }
        self.merged()
            .into_iter()
            .find(|(key, _)| name.contains(key.as_str()) || key.contains(name))
            .map(|(_, entry)| entry)
    }

    pub fn set(&mut self, name: impl Into<String>, entry: GlossaryEntry) {
        self.user.insert(name.into(), entry);
    }

    /// Removes a user entry. Built-in entries cannot be removed.
    pub fn remove(&mut self, name: &str) -> Result<Option<GlossaryEntry>, GlossaryError> {
        if self.builtin.contains_key(name) {
            return Err(GlossaryError::BuiltIn(name.to_string()));
        }
        Ok(self.user.remove(name))
    }

    /// Replaces the notes of an entry, creating an empty one when missing.
    pub fn update_notes(&mut self, name: &str, notes: impl Into<String>) {
        let mut entry = self.lookup(name).cloned().unwrap_or_default();
        entry.notes = Some(notes.into());
        self.set(name, entry);
    }

    /// Merged glossary as pretty JSON.
    pub fn export_json(&self) -> Result<String, GlossaryError> {
        Ok(serde_json::to_string_pretty(&self.merged())?)
    }

    /// Validates and merges an exported glossary; imported entries win.
    /// Returns the number of imported entries.
    pub fn import_json(&mut self, json: &str) -> Result<usize, GlossaryError> {
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(json)?;
        let mut imported = Vec::with_capacity(raw.len());
        for (name, value) in raw {
            let Some(object) = value.as_object() else {
                return Err(GlossaryError::InvalidEntry(name));
            };
            if !object.get("summary").is_some_and(serde_json::Value::is_string) {
                return Err(GlossaryError::MissingSummary(name));
            }
            let entry: GlossaryEntry = serde_json::from_value(value)?;
            imported.push((name, entry));
        }
        let count = imported.len();
        self.user.extend(imported);
        Ok(count)
    }
}

/// Search URL on the official card database.
pub fn official_db_search_url(card_name: &str) -> String {
    format!(
        "https://www.db.yugioh-card.com/yugiohdb/card_search.action?ope=1&request=cardname&keyword={}",
        utf8_percent_encode(card_name, URI_COMPONENT)
    )
}

/// Search URL on the Neuron card search.
pub fn neuron_search_url(card_name: &str) -> String {
    format!(
        "https://www.yugioh-card.com/japan/products/neuron/search.php?keyword={}",
        utf8_percent_encode(card_name, URI_COMPONENT)
    )
}
