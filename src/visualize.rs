use std::fmt::Write;

use crate::action::ActionOutcome;
use crate::card::Card;
use crate::state::{GameState, PlayerState, Side};

/// Customize board rendering for the CLI.
#[derive(Clone, Copy, Debug)]
pub struct VisualOptions {
    /// Show the opponent's hand card names instead of a count.
    pub reveal_opponent_hand: bool,
    pub show_graveyard: bool,
    /// Number of trailing log lines printed under the board.
    pub recent_log_lines: usize,
}

impl Default for VisualOptions {
    fn default() -> Self {
        Self {
            reveal_opponent_hand: false,
            show_graveyard: true,
            recent_log_lines: 5,
        }
    }
}

pub fn render_state(state: &GameState) -> String {
    render_state_with_options(state, VisualOptions::default())
}

pub fn render_state_with_options(state: &GameState, options: VisualOptions) -> String {
    let mut out = String::new();
    let setup = if state.setup_complete {
        String::new()
    } else {
        String::from("  (setup)")
    };
    let _ = writeln!(
        out,
        "Turn {}  |  {}  |  Active: {}{setup}",
        state.turn,
        state.phase.long_name(),
        state.active
    );
    for side in [Side::Opp, Side::Me] {
        render_player(&mut out, state, side, options);
    }
    if options.recent_log_lines > 0 && !state.logs.is_empty() {
        let _ = writeln!(out, "Recent:");
        let skip = state.logs.len().saturating_sub(options.recent_log_lines);
        for entry in &state.logs[skip..] {
            let _ = writeln!(out, "  T{} {} {}", entry.turn, entry.phase, entry.action);
        }
    }
    out
}

fn render_player(out: &mut String, state: &GameState, side: Side, options: VisualOptions) {
    let player = state.player(side);
    let current_tag = if state.active == side { " <- active" } else { "" };
    let lock = if player.pot_of_duality_lock {
        "  [Pot of Duality lock]"
    } else {
        ""
    };
    let _ = writeln!(
        out,
        "{side}{current_tag} - deck {}  extra {}  banished {}{lock}",
        player.deck.len(),
        player.zones.extra_deck.len(),
        player.zones.banished.len()
    );

    let monsters = player
        .zones
        .monster_zones
        .iter()
        .enumerate()
        .map(|(idx, slot)| {
            let materials = player
                .zones
                .xyz_materials
                .get(&idx)
                .map(|units| format!(" +{}", units.len()))
                .unwrap_or_default();
            format!("{}:{}{materials}", idx + 1, format_slot(slot.as_ref()))
        })
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "    MZ {monsters}");

    let spell_traps = player
        .zones
        .spell_trap_zones
        .iter()
        .enumerate()
        .map(|(idx, slot)| format!("{}:{}", idx + 1, format_slot(slot.as_ref())))
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "    ST {spell_traps}");

    if options.show_graveyard {
        let grave = if player.zones.graveyard.is_empty() {
            String::from("(empty)")
        } else {
            names(&player.zones.graveyard)
        };
        let _ = writeln!(out, "    GY {grave}");
    }

    if side == Side::Me || options.reveal_opponent_hand {
        let _ = writeln!(out, "    Hand: {}", format_hand(player));
    } else {
        let _ = writeln!(out, "    Hand size: {}", player.hand.len());
    }
}

fn format_hand(player: &PlayerState) -> String {
    if player.hand.is_empty() {
        return String::from("(empty)");
    }
    player
        .hand
        .iter()
        .map(|card| {
            let mut label = card.id.clone();
            if card.selected {
                label.push('*');
            }
            if card.used {
                label.push_str(" (used)");
            }
            if card.revealed {
                label.push_str(" (revealed)");
            }
            label
        })
        .collect::<Vec<_>>()
        .join("  ")
}

fn format_slot(card: Option<&Card>) -> String {
    match card {
        None => String::from("--"),
        Some(card) if card.is_set => String::from("[set]"),
        Some(card) => card.name.clone(),
    }
}

fn names(cards: &[Card]) -> String {
    cards
        .iter()
        .map(|card| card.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One line per reportable effect of an applied action.
pub fn describe_outcome(outcome: &ActionOutcome) -> String {
    let mut out = String::new();
    if !outcome.drawn.is_empty() {
        let _ = writeln!(out, "Drew: {}", names(&outcome.drawn));
    }
    if !outcome.summoned.is_empty() {
        let _ = writeln!(out, "Summoned: {}", names(&outcome.summoned));
    }
    if !outcome.peeked.is_empty() {
        let _ = writeln!(out, "Deck top:");
        for (position, card) in outcome.peeked.iter().enumerate() {
            let _ = writeln!(out, "  {}. {} ({})", position + 1, card.name, card.id);
        }
    }
    if !outcome.searched.is_empty() {
        let _ = writeln!(out, "From deck: {}", names(&outcome.searched));
    }
    if let Some(hit) = &outcome.interrupt {
        let _ = writeln!(
            out,
            "Opponent responds with {} ({})",
            hit.card_name, hit.category
        );
    }
    if let Some((from, to)) = outcome.phase_change {
        let _ = writeln!(out, "Phase: {} -> {}", from.long_name(), to.long_name());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::deck::DeckEntry;
    use crate::game::DuelBuilder;

    #[test]
    fn render_and_describe_include_expected_phrases() {
        let deck = vec![DeckEntry::new("Sabersaurus", 40)];
        let mut duel = DuelBuilder::new(deck).with_seed(7).build().expect("duel");
        let outcome = duel
            .apply_action(Action::ChooseFirstPlayer(Side::Me))
            .expect("setup");
        let text = render_state(duel.state());
        assert!(text.contains("Me <- active"));
        assert!(text.contains("Hand: Sabersaurus_"));
        assert!(text.contains("Hand size: 0"));
        assert!(text.contains("(setup)"));

        let desc = describe_outcome(&outcome);
        assert!(desc.starts_with("Drew: Sabersaurus"));
    }
}
