use std::fmt;

use serde::{Deserialize, Serialize};

/// Turn segments in play order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    Draw,
    Standby,
    Main1,
    Battle,
    Main2,
    End,
}

pub const PHASE_ORDER: [Phase; 6] = [
    Phase::Draw,
    Phase::Standby,
    Phase::Main1,
    Phase::Battle,
    Phase::Main2,
    Phase::End,
];

impl Phase {
    pub fn short_name(self) -> &'static str {
        match self {
            Phase::Draw => "DP",
            Phase::Standby => "SP",
            Phase::Main1 => "MP1",
            Phase::Battle => "BP",
            Phase::Main2 => "MP2",
            Phase::End => "EP",
        }
    }

    pub fn long_name(self) -> &'static str {
        match self {
            Phase::Draw => "Draw Phase",
            Phase::Standby => "Standby Phase",
            Phase::Main1 => "Main Phase 1",
            Phase::Battle => "Battle Phase",
            Phase::Main2 => "Main Phase 2",
            Phase::End => "End Phase",
        }
    }

    /// Next phase in order; End wraps to the next turn's Draw.
    pub fn next(self) -> Phase {
        match self {
            Phase::Draw => Phase::Standby,
            Phase::Standby => Phase::Main1,
            Phase::Main1 => Phase::Battle,
            Phase::Battle => Phase::Main2,
            Phase::Main2 => Phase::End,
            Phase::End => Phase::Draw,
        }
    }

    /// Previous phase in order; Draw wraps back to End.
    pub fn previous(self) -> Phase {
        match self {
            Phase::Draw => Phase::End,
            Phase::Standby => Phase::Draw,
            Phase::Main1 => Phase::Standby,
            Phase::Battle => Phase::Main1,
            Phase::Main2 => Phase::Battle,
            Phase::End => Phase::Main2,
        }
    }

    /// Accepts short names (`MP1`) and long names (`main1`, `main phase 1`).
    pub fn parse(input: &str) -> Option<Phase> {
        let normalized: String = input
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "dp" | "draw" | "drawphase" => Some(Phase::Draw),
            "sp" | "standby" | "standbyphase" => Some(Phase::Standby),
            "mp1" | "main1" | "mainphase1" => Some(Phase::Main1),
            "bp" | "battle" | "battlephase" => Some(Phase::Battle),
            "mp2" | "main2" | "mainphase2" => Some(Phase::Main2),
            "ep" | "end" | "endphase" => Some(Phase::End),
            _ => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Player actions that drive automatic phase transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseAction {
    DrawInitial,
    DrawFirst,
    NormalSummon,
    SpecialSummon,
    SpellActivate,
    TrapActivate,
    AttackDeclare,
    DamageStep,
    EndTurn,
    PhaseChange,
}

/// Phase reached after `action` in `phase`, or `None` when the action is not
/// allowed there. Manual phase changes never transition automatically.
pub fn next_phase(phase: Phase, action: PhaseAction) -> Option<Phase> {
    use Phase::*;
    use PhaseAction::*;
    match (phase, action) {
        (_, PhaseChange) => None,

        (Draw, DrawInitial | DrawFirst) => Some(Standby),
        (Draw, NormalSummon | SpecialSummon | SpellActivate | TrapActivate | EndTurn) => {
            Some(Draw)
        }
        (Draw, AttackDeclare | DamageStep) => None,

        (Standby, DrawInitial | DrawFirst | TrapActivate) => Some(Standby),
        (Standby, NormalSummon | SpecialSummon | SpellActivate) => Some(Main1),
        (Standby, EndTurn) => Some(End),
        (Standby, AttackDeclare | DamageStep) => None,

        (Main1, AttackDeclare) => Some(Battle),
        (Main1, EndTurn) => Some(End),
        (Main1, DamageStep) => None,
        (Main1, _) => Some(Main1),

        (Battle, DrawInitial | DrawFirst | NormalSummon | SpecialSummon) => None,
        (Battle, SpellActivate | TrapActivate | AttackDeclare | DamageStep) => Some(Battle),
        (Battle, EndTurn) => Some(Main2),

        (Main2, DrawInitial | DrawFirst | AttackDeclare | DamageStep) => None,
        (Main2, EndTurn) => Some(End),
        (Main2, _) => Some(Main2),

        (End, TrapActivate) => Some(End),
        (End, EndTurn) => Some(Draw),
        (End, _) => None,
    }
}

/// True when `action` moves the turn into a different phase.
pub fn auto_transitions(phase: Phase, action: PhaseAction) -> bool {
    next_phase(phase, action).is_some_and(|next| next != phase)
}

/// Human readable `"From -> To"` for an automatic transition.
pub fn transition_description(phase: Phase, action: PhaseAction) -> Option<String> {
    let next = next_phase(phase, action)?;
    if next == phase {
        return None;
    }
    Some(format!("{} -> {}", phase.long_name(), next.long_name()))
}
