//! Opponent interruption model.
//!
//! The opponent deck is reduced to counts per [`InterruptCategory`]. When the
//! active player acts, every category that can respond in the current phase
//! to that kind of action is rolled once against the hypergeometric chance
//! that the opponent holds at least one such card.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::deck::DeckEntry;
use crate::odds::hypergeometric_at_least;
use crate::phase::Phase;
use crate::rng::Xorshift32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InterruptCategory {
    NormalSummonMeta,
    SpecialSummonMeta,
    EffectNegate,
    BattleMeta,
    SpellTrapMeta,
}

pub const ALL_CATEGORIES: [InterruptCategory; 5] = [
    InterruptCategory::NormalSummonMeta,
    InterruptCategory::SpecialSummonMeta,
    InterruptCategory::EffectNegate,
    InterruptCategory::BattleMeta,
    InterruptCategory::SpellTrapMeta,
];

impl InterruptCategory {
    pub fn label(self) -> &'static str {
        match self {
            InterruptCategory::NormalSummonMeta => "normal summon hate",
            InterruptCategory::SpecialSummonMeta => "special summon hate",
            InterruptCategory::EffectNegate => "effect negation",
            InterruptCategory::BattleMeta => "battle hate",
            InterruptCategory::SpellTrapMeta => "spell/trap removal",
        }
    }
}

impl fmt::Display for InterruptCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Kinds of play the opponent can respond to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterruptTrigger {
    NormalSummon,
    SpecialSummon,
    SpellActivate,
    TrapActivate,
    AttackDeclare,
    DamageStep,
}

/// Categories able to respond during `phase`, in roll order.
pub fn phase_categories(phase: Phase) -> &'static [InterruptCategory] {
    use InterruptCategory::*;
    match phase {
        Phase::Draw | Phase::Standby | Phase::End => &[],
        Phase::Main1 | Phase::Main2 => &[
            NormalSummonMeta,
            SpecialSummonMeta,
            EffectNegate,
            SpellTrapMeta,
        ],
        Phase::Battle => &[BattleMeta, EffectNegate],
    }
}

/// Categories able to respond to `trigger`.
pub fn trigger_categories(trigger: InterruptTrigger) -> &'static [InterruptCategory] {
    use InterruptCategory::*;
    match trigger {
        InterruptTrigger::NormalSummon => &[NormalSummonMeta, SpecialSummonMeta],
        InterruptTrigger::SpecialSummon => &[SpecialSummonMeta],
        InterruptTrigger::SpellActivate | InterruptTrigger::TrapActivate => {
            &[SpellTrapMeta, EffectNegate]
        }
        InterruptTrigger::AttackDeclare | InterruptTrigger::DamageStep => &[BattleMeta],
    }
}

/// Card name to interrupt categories.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterruptTable {
    cards: BTreeMap<String, Vec<InterruptCategory>>,
}

impl Default for InterruptTable {
    fn default() -> Self {
        use InterruptCategory::*;
        let defaults: &[(&str, &[InterruptCategory])] = &[
            ("神の警告", &[NormalSummonMeta, SpecialSummonMeta]),
            ("Solemn Warning", &[NormalSummonMeta, SpecialSummonMeta]),
            ("奈落の落とし穴", &[NormalSummonMeta]),
            ("Bottomless Trap Hole", &[NormalSummonMeta]),
            ("強制脱出装置", &[NormalSummonMeta]),
            ("Compulsory Evacuation Device", &[NormalSummonMeta]),
            ("昇天の黒角笛", &[SpecialSummonMeta]),
            ("黒角笛", &[SpecialSummonMeta]),
            ("Black Horn of Heaven", &[SpecialSummonMeta]),
            ("神の宣告", &[SpecialSummonMeta, NormalSummonMeta]),
            ("Solemn Judgment", &[SpecialSummonMeta, NormalSummonMeta]),
            ("エフェクト・ヴェーラー", &[EffectNegate]),
            ("Effect Veiler", &[EffectNegate]),
            ("ヴェーラーの呪詛", &[EffectNegate]),
            ("禁じられた聖杯", &[EffectNegate]),
            ("Forbidden Chalice", &[EffectNegate]),
            ("次元幽閉", &[BattleMeta]),
            ("Dimensional Prison", &[BattleMeta]),
            ("聖なるバリア", &[BattleMeta]),
            ("ミラーフォース", &[BattleMeta]),
            ("Mirror Force", &[BattleMeta]),
            ("激流葬", &[NormalSummonMeta, SpecialSummonMeta]),
            ("Torrential Tribute", &[NormalSummonMeta, SpecialSummonMeta]),
            ("サイクロン", &[SpellTrapMeta]),
            ("Mystical Space Typhoon", &[SpellTrapMeta]),
            ("ハーピィの羽根帚", &[SpellTrapMeta]),
            ("Harpie's Feather Duster", &[SpellTrapMeta]),
            ("砂塵の大竜巻", &[SpellTrapMeta]),
            ("Dust Tornado", &[SpellTrapMeta]),
            ("盗賊の七つ道具", &[SpellTrapMeta]),
            ("Seven Tools of the Bandit", &[SpellTrapMeta]),
        ];
        let cards = defaults
            .iter()
            .map(|(name, categories)| (name.to_string(), categories.to_vec()))
            .collect();
        Self { cards }
    }
}

impl InterruptTable {
    pub fn empty() -> Self {
        Self {
            cards: BTreeMap::new(),
        }
    }

    /// Registers or replaces the categories of a card.
    pub fn insert(&mut self, name: impl Into<String>, categories: Vec<InterruptCategory>) {
        self.cards.insert(name.into(), categories);
    }

    /// Exact-name lookup.
    pub fn exact(&self, name: &str) -> &[InterruptCategory] {
        self.cards.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Exact lookup first, then the first key that contains or is contained
    /// in `name`.
    pub fn categories_for(&self, name: &str) -> &[InterruptCategory] {
        if let Some(categories) = self.cards.get(name) {
            return categories;
        }
        if name.is_empty() {
            return &[];
        }
        self.cards
            .iter()
            .find(|(key, _)| name.contains(key.as_str()) || key.contains(name))
            .map(|(_, categories)| categories.as_slice())
            .unwrap_or(&[])
    }
}

/// Opponent deck reduced to interrupt categories.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentAnalysis {
    pub total_cards: usize,
    pub counts: BTreeMap<InterruptCategory, usize>,
    pub card_names: BTreeMap<InterruptCategory, Vec<String>>,
}

impl OpponentAnalysis {
    pub fn count(&self, category: InterruptCategory) -> usize {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    pub fn names(&self, category: InterruptCategory) -> &[String] {
        self.card_names
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Counts each category's copies using exact card names.
pub fn analyze_opponent_deck(entries: &[DeckEntry], table: &InterruptTable) -> OpponentAnalysis {
    let mut counts: BTreeMap<InterruptCategory, usize> =
        ALL_CATEGORIES.iter().map(|&category| (category, 0)).collect();
    let mut card_names: BTreeMap<InterruptCategory, Vec<String>> = ALL_CATEGORIES
        .iter()
        .map(|&category| (category, Vec::new()))
        .collect();
    let mut total_cards = 0;

    for entry in entries {
        total_cards += entry.count;
        for &category in table.exact(&entry.name) {
            *counts.entry(category).or_insert(0) += entry.count;
            let names = card_names.entry(category).or_default();
            if !names.contains(&entry.name) {
                names.push(entry.name.clone());
            }
        }
    }

    OpponentAnalysis {
        total_cards,
        counts,
        card_names,
    }
}

/// A triggered interruption.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interrupt {
    pub card_name: String,
    pub category: InterruptCategory,
}

/// Rolls for an opponent response to `trigger` during `phase`.
pub fn check_interrupt(
    analysis: &OpponentAnalysis,
    phase: Phase,
    trigger: InterruptTrigger,
    opponent_hand_size: usize,
    rng: &mut Xorshift32,
) -> Option<Interrupt> {
    let reactable = trigger_categories(trigger);
    let candidates = phase_categories(phase)
        .iter()
        .copied()
        .filter(|category| reactable.contains(category));

    for category in candidates {
        let copies = analysis.count(category);
        if copies == 0 {
            continue;
        }
        let probability =
            hypergeometric_at_least(analysis.total_cards, copies, opponent_hand_size, 1);
        let roll = rng.next_f64() * 100.0;
        log::debug!("interrupt roll {category}: {roll:.2} vs {probability:.2}%");
        if roll < probability {
            let names = analysis.names(category);
            if !names.is_empty() {
                let card_name = names[rng.index(names.len())].clone();
                return Some(Interrupt {
                    card_name,
                    category,
                });
            }
        }
    }
    None
}
