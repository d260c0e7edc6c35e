use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::interrupt::{Interrupt, InterruptTrigger};
use crate::moves::ZoneRef;
use crate::phase::{Phase, PhaseAction};
use crate::state::{MoveReason, Side};
use crate::summon::MaterialHandling;

/// A play the opponent may respond to. Hand cards are named by id; `None`
/// falls back to the card currently selected in hand.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Play {
    NormalSummon { card_id: Option<String> },
    SpecialSummon { card_id: Option<String> },
    ActivateSpell { card_id: Option<String> },
    /// Activates the trap in the given spell/trap zone, or the first occupied one.
    ActivateTrap { zone: Option<usize> },
    Attack,
    DamageStep,
}

impl Play {
    pub fn phase_action(&self) -> PhaseAction {
        match self {
            Play::NormalSummon { .. } => PhaseAction::NormalSummon,
            Play::SpecialSummon { .. } => PhaseAction::SpecialSummon,
            Play::ActivateSpell { .. } => PhaseAction::SpellActivate,
            Play::ActivateTrap { .. } => PhaseAction::TrapActivate,
            Play::Attack => PhaseAction::AttackDeclare,
            Play::DamageStep => PhaseAction::DamageStep,
        }
    }

    pub fn trigger(&self) -> InterruptTrigger {
        match self {
            Play::NormalSummon { .. } => InterruptTrigger::NormalSummon,
            Play::SpecialSummon { .. } => InterruptTrigger::SpecialSummon,
            Play::ActivateSpell { .. } => InterruptTrigger::SpellActivate,
            Play::ActivateTrap { .. } => InterruptTrigger::TrapActivate,
            Play::Attack => InterruptTrigger::AttackDeclare,
            Play::DamageStep => InterruptTrigger::DamageStep,
        }
    }
}

/// Everything a player can do to the duel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Both players draw their opening hand; `Side` goes first.
    ChooseFirstPlayer(Side),
    /// The first player draws for turn one and setup completes.
    StartTurn,
    /// Active player draws an opening hand.
    DrawInitial,
    /// Active player draws one card for the turn.
    DrawFirst,
    Draw(usize),
    ChangePhase(Phase),
    NextPhase,
    EndTurn,
    Play(Play),
    /// Sets a spell or trap from hand into the first free spell/trap zone.
    SetSpellTrap { card_id: String },
    MoveCard {
        from: ZoneRef,
        to: ZoneRef,
        card_id: String,
        reason: MoveReason,
    },
    UsePotOfDuality,
    ShuffleDeck(Side),
    /// Looks at the top `count` cards of a deck and logs their names.
    PeekDeck { side: Side, count: usize },
    /// Moves the named cards out of the deck of `to.side`.
    SearchDeck {
        to: ZoneRef,
        card_ids: Vec<String>,
        reason: MoveReason,
    },
    SelectCard { side: Side, card_id: String },
    ToggleUsed { side: Side, card_id: String },
    ToggleRevealed { side: Side, card_id: String },
    XyzSummon {
        materials: Vec<usize>,
        extra_card_id: String,
        target: usize,
        handling: MaterialHandling,
    },
    SynchroSummon {
        materials: Vec<usize>,
        extra_card_id: String,
        target: usize,
    },
    DetachMaterial { zone: usize, material: usize },
    RescueRabbit { card_id: String, chosen: Vec<String> },
}

/// Side effects of an applied action worth reporting to the player.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub drawn: Vec<Card>,
    pub interrupt: Option<Interrupt>,
    pub phase_change: Option<(Phase, Phase)>,
    pub summoned: Vec<Card>,
    /// Deck cards looked at, top first.
    pub peeked: Vec<Card>,
    /// Cards taken out of a deck by a search.
    pub searched: Vec<Card>,
}
