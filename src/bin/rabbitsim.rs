use std::error::Error;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser};

use rabbitsim::config::{load_deck_list, load_optional_deck_list};
use rabbitsim::glossary::{neuron_search_url, official_db_search_url};
use rabbitsim::summon::xyz_candidates;
use rabbitsim::{
    Action, DeckStats, Duel, GameState, Glossary, MaterialHandling, MoveReason, Phase, Play,
    SessionConfig, Side, ZoneKind, ZoneRef, describe_outcome, render_state,
};

#[derive(Parser, Debug)]
#[command(
    name = "rabbitsim",
    about = "Practice Rescue Rabbit openings against a simulated opponent."
)]
struct Args {
    /// Main deck list (overrides the session file)
    deck: Option<PathBuf>,

    /// YAML session file naming decks, seed and glossary
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    #[arg(short = 'e', long = "extra")]
    extra: Option<PathBuf>,

    #[arg(short = 'o', long = "opponent")]
    opponent: Option<PathBuf>,

    #[arg(long = "opponent-extra")]
    opponent_extra: Option<PathBuf>,

    /// Shuffle seed (random when omitted)
    #[arg(short = 's', long = "seed")]
    seed: Option<u64>,

    /// Assume a fixed opponent hand size for interrupt odds
    #[arg(long = "opponent-hand-size")]
    opponent_hand_size: Option<usize>,

    /// Glossary file holding user entries
    #[arg(short = 'g', long = "glossary")]
    glossary: Option<PathBuf>,

    /// Do not draw for the opponent when you draw
    #[arg(long = "no-mirror", action = ArgAction::SetTrue)]
    no_mirror: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);
    if let Err(err) = run(args) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(log::LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
        }
    }
    builder.init();
}

/// Merges CLI flags over the session file.
fn session(args: &Args) -> Result<SessionConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    if args.deck.is_some() {
        config.deck = args.deck.clone();
    }
    if args.extra.is_some() {
        config.extra_deck = args.extra.clone();
    }
    if args.opponent.is_some() {
        config.opponent_deck = args.opponent.clone();
    }
    if args.opponent_extra.is_some() {
        config.opponent_extra_deck = args.opponent_extra.clone();
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.opponent_hand_size.is_some() {
        config.opponent_hand_size = args.opponent_hand_size;
    }
    if args.glossary.is_some() {
        config.glossary = args.glossary.clone();
    }
    if args.no_mirror {
        config.mirror_opponent_draws = false;
    }
    config.validate()?;
    Ok(config)
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = session(&args)?;
    let main_deck = load_deck_list(config.deck_path()?)?;
    let extra_deck = load_optional_deck_list(config.extra_deck.as_deref())?;
    let opponent_deck = load_optional_deck_list(config.opponent_deck.as_deref())?;
    let opponent_extra_deck = load_optional_deck_list(config.opponent_extra_deck.as_deref())?;
    let glossary = match &config.glossary {
        Some(path) => Glossary::load(path)?,
        None => Glossary::default(),
    };
    let seed: u64 = config.seed.unwrap_or_else(rand::random);
    let stats = DeckStats::from_entries(&main_deck);

    let mut builder = Duel::builder(main_deck)
        .with_extra_deck(extra_deck)
        .with_opponent_deck(opponent_deck)
        .with_opponent_extra_deck(opponent_extra_deck)
        .with_glossary(glossary)
        .with_seed(seed)
        .mirror_opponent_draws(config.mirror_opponent_draws);
    if let Some(size) = config.opponent_hand_size {
        builder = builder.with_opponent_hand_size(size);
    }
    let mut duel = builder.build()?;

    println!("rabbitsim - seed {seed}. Type 'help' for commands.\n");
    println!("{}", render_state(duel.state()));

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, rest)) = words.split_first() else {
            continue;
        };
        match command.to_ascii_lowercase().as_str() {
            "quit" | "q" | "exit" => break,
            "help" => print_usage(),
            "board" => println!("{}", render_state(duel.state())),
            "log" => println!("{}", duel.state().markdown_log()),
            "odds" => print_odds(&stats),
            "xyz?" => {
                for candidate in xyz_candidates(duel.state(), duel.active()) {
                    println!(
                        "  {} (rank {}) with MZ {:?}",
                        candidate.name,
                        candidate.rank,
                        candidate.materials.iter().map(|zone| zone + 1).collect::<Vec<_>>()
                    );
                }
            }
            "export" => {
                let Some(path) = rest.first() else {
                    println!("usage: export <file.json|file.md>");
                    continue;
                };
                match duel.state().export_to(Path::new(path)) {
                    Ok(()) => println!("Wrote {path}"),
                    Err(err) => println!("Export failed: {err}"),
                }
            }
            "import" => {
                let Some(path) = rest.first() else {
                    println!("usage: import <file.json>");
                    continue;
                };
                match fs::read_to_string(path)
                    .map_err(Box::<dyn Error>::from)
                    .and_then(|json| GameState::import_json(&json).map_err(Into::into))
                {
                    Ok(state) => {
                        duel.restore(state);
                        println!("{}", render_state(duel.state()));
                    }
                    Err(err) => println!("Import failed: {err}"),
                }
            }
            "search" => {
                let named_side = rest
                    .split_first()
                    .and_then(|(word, query)| Side::parse(word).map(|side| (side, query)));
                let (side, query) = match named_side {
                    Some((side, query)) => (side, query.join(" ")),
                    None => (Side::Me, rest.join(" ")),
                };
                let matches = duel.state().player(side).search_deck(&query);
                if matches.is_empty() {
                    println!("No deck cards match '{query}'");
                }
                for card in matches {
                    println!("  {} ({})", card.name, card.id);
                }
            }
            "card" => {
                let name = rest.join(" ");
                match duel.glossary().lookup(&name) {
                    Some(entry) => {
                        println!("{name}: {}", entry.summary);
                        if let Some(timing) = &entry.timing {
                            println!("  timing: {timing}");
                        }
                        if let Some(notes) = &entry.notes {
                            println!("  notes: {notes}");
                        }
                    }
                    None => println!("No glossary entry for {name}"),
                }
                println!("  {}", official_db_search_url(&name));
                println!("  {}", neuron_search_url(&name));
            }
            "note" => {
                let Some((name, notes)) = line
                    .split_once(char::is_whitespace)
                    .and_then(|(_, rest)| rest.split_once('|'))
                else {
                    println!("usage: note <card name> | <notes>");
                    continue;
                };
                duel.glossary_mut().update_notes(name.trim(), notes.trim());
                if let Some(path) = &config.glossary {
                    duel.glossary().save(path)?;
                }
            }
            _ => match parse_action(command, rest, duel.state()) {
                Ok(action) => {
                    let reshuffle = matches!(
                        &action,
                        Action::SearchDeck { to, .. }
                            if matches!(to.zone, ZoneKind::Hand | ZoneKind::Monster)
                    );
                    match duel.apply_action(action) {
                        Ok(outcome) => {
                            print!("{}", describe_outcome(&outcome));
                            println!("{}", render_state(duel.state()));
                            if reshuffle {
                                println!("Deck was searched; 'shuffle' before continuing.");
                            }
                        }
                        Err(err) => println!("Rejected: {err}"),
                    }
                }
                Err(message) => println!("{message}"),
            },
        }
    }
    Ok(())
}

const DEFAULT_PEEK: usize = 5;

fn parse_action(command: &str, rest: &[&str], state: &GameState) -> Result<Action, String> {
    let arg = |index: usize| {
        rest.get(index)
            .map(|value| value.to_string())
            .ok_or_else(|| format!("'{command}' needs more arguments; see 'help'"))
    };
    // Card ids may contain spaces (`Rescue Rabbit_0`), so they take the rest of the line.
    let card_id = || {
        (!rest.is_empty())
            .then(|| rest.join(" "))
            .ok_or_else(|| format!("'{command}' needs a card id; see 'help'"))
    };
    let optional_card = || (!rest.is_empty()).then(|| rest.join(" "));
    let action = match command.to_ascii_lowercase().as_str() {
        "first" => Action::ChooseFirstPlayer(parse_side(&arg(0)?)?),
        "start" => Action::StartTurn,
        "opening" => Action::DrawInitial,
        "draw" => match rest.first() {
            Some(count) => Action::Draw(parse_number(count)?),
            None => Action::DrawFirst,
        },
        "phase" => match rest.first() {
            None => Action::NextPhase,
            Some(name) => Action::ChangePhase(
                Phase::parse(&rest.join(" ")).ok_or_else(|| format!("unknown phase: {name}"))?,
            ),
        },
        "end" => Action::EndTurn,
        "summon" => Action::Play(Play::NormalSummon {
            card_id: optional_card(),
        }),
        "special" => Action::Play(Play::SpecialSummon {
            card_id: optional_card(),
        }),
        "spell" => Action::Play(Play::ActivateSpell {
            card_id: optional_card(),
        }),
        "trap" => Action::Play(Play::ActivateTrap {
            zone: rest.first().map(|slot| parse_slot(slot)).transpose()?,
        }),
        "attack" => Action::Play(Play::Attack),
        "damage" => Action::Play(Play::DamageStep),
        "set" => Action::SetSpellTrap {
            card_id: card_id()?,
        },
        "pot" => Action::UsePotOfDuality,
        "shuffle" => Action::ShuffleDeck(match rest.first() {
            Some(side) => parse_side(side)?,
            None => state.active,
        }),
        "select" => Action::SelectCard {
            side: Side::Me,
            card_id: card_id()?,
        },
        "used" => Action::ToggleUsed {
            side: Side::Me,
            card_id: card_id()?,
        },
        "reveal" => Action::ToggleRevealed {
            side: Side::Me,
            card_id: card_id()?,
        },
        "move" => {
            let (id_words, reason) = split_reason(&rest[2.min(rest.len())..]);
            if id_words.is_empty() {
                return Err(String::from("usage: move <from> <to> <id> [reason]"));
            }
            Action::MoveCard {
                from: parse_zone(&arg(0)?)?,
                to: parse_zone(&arg(1)?)?,
                card_id: id_words.join(" "),
                reason,
            }
        }
        "peek" => {
            let mut side = Side::Me;
            let mut count = DEFAULT_PEEK;
            for word in rest {
                match Side::parse(word) {
                    Some(parsed) => side = parsed,
                    None => count = parse_number(word)?,
                }
            }
            Action::PeekDeck { side, count }
        }
        "fetch" => {
            let (id_words, reason) = split_reason(&rest[1.min(rest.len())..]);
            Action::SearchDeck {
                to: parse_zone(&arg(0)?)?,
                card_ids: id_words
                    .join(" ")
                    .split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .collect(),
                reason,
            }
        }
        "xyz" | "xyz-grave" => {
            let (extra_card_id, materials) = split_slots(rest)?;
            Action::XyzSummon {
                extra_card_id,
                target: *materials.first().ok_or("xyz needs material zones")?,
                materials,
                handling: if command.eq_ignore_ascii_case("xyz") {
                    MaterialHandling::Attach
                } else {
                    MaterialHandling::SendToGrave
                },
            }
        }
        "synchro" => {
            let (extra_card_id, materials) = split_slots(rest)?;
            Action::SynchroSummon {
                extra_card_id,
                target: *materials.first().ok_or("synchro needs material zones")?,
                materials,
            }
        }
        "detach" => Action::DetachMaterial {
            zone: parse_slot(&arg(0)?)?,
            material: parse_slot(&arg(1)?)?,
        },
        "rabbit" => {
            let line = card_id()?;
            let (id, chosen) = line.split_once('|').unwrap_or((line.as_str(), ""));
            Action::RescueRabbit {
                card_id: id.trim().to_string(),
                chosen: chosen
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect(),
            }
        }
        other => return Err(format!("unknown command: {other}")),
    };
    Ok(action)
}

/// Splits an optional trailing move reason off the words.
fn split_reason<'a>(words: &'a [&'a str]) -> (&'a [&'a str], MoveReason) {
    match words.split_last() {
        Some((last, init)) if !init.is_empty() => match MoveReason::parse(last) {
            Some(reason) => (init, reason),
            None => (words, MoveReason::Move),
        },
        _ => (words, MoveReason::Move),
    }
}

fn parse_side(value: &str) -> Result<Side, String> {
    Side::parse(value).ok_or_else(|| format!("expected 'me' or 'opp', got {value}"))
}

fn parse_number(value: &str) -> Result<usize, String> {
    value
        .parse::<usize>()
        .map_err(|_| format!("invalid number: {value}"))
}

/// One-based slot on the board to a zero-based index.
fn parse_slot(value: &str) -> Result<usize, String> {
    match parse_number(value)? {
        0 => Err(String::from("slots are numbered from 1")),
        slot => Ok(slot - 1),
    }
}

/// `<card id words> <slot> <slot>..`: trailing numbers are one-based slots.
fn split_slots(words: &[&str]) -> Result<(String, Vec<usize>), String> {
    let id_len = words
        .iter()
        .rposition(|word| word.parse::<usize>().is_err())
        .map_or(0, |last| last + 1);
    if id_len == 0 {
        return Err(String::from("expected an extra deck card id before the zones"));
    }
    let slots = words[id_len..]
        .iter()
        .map(|value| parse_slot(value))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((words[..id_len].join(" "), slots))
}

/// `side:zone[:slot]`, e.g. `me:hand`, `opp:mz:3`, `me:deck:bottom`.
fn parse_zone(value: &str) -> Result<ZoneRef, String> {
    let mut parts = value.split(':');
    let side = parse_side(parts.next().unwrap_or_default())?;
    let zone_name = parts.next().ok_or_else(|| format!("missing zone in {value}"))?;
    let zone = ZoneKind::parse(zone_name).ok_or_else(|| format!("unknown zone: {zone_name}"))?;
    let index = match (zone, parts.next()) {
        (_, None) => None,
        (ZoneKind::Deck, Some("top")) => Some(0),
        (ZoneKind::Deck, Some("bottom")) => Some(1),
        (_, Some(slot)) => Some(parse_slot(slot)?),
    };
    Ok(ZoneRef { side, zone, index })
}

fn print_odds(stats: &DeckStats) {
    println!("Main deck: {} cards", stats.total_cards);
    println!(
        "Pot of Duality x{}: {:.1}% in 5, {:.1}% in 6",
        stats.pot_of_duality_count, stats.pot_in_five, stats.pot_in_six
    );
    println!(
        "Traps x{}: {:.1}% at least one in 5, {:.1}% at least two in 5",
        stats.trap_count, stats.trap_in_five, stats.two_traps_in_five
    );
}

fn print_usage() {
    println!("Setup:   first <me|opp>  start  opening  draw [n]  shuffle [me|opp]");
    println!("Turn:    phase [name]  end");
    println!("Plays:   summon [id]  special [id]  spell [id]  trap [slot]  attack  damage");
    println!("Cards:   set <id>  select <id>  used <id>  reveal <id>  pot");
    println!("         move <side:zone[:slot]> <side:zone[:slot]> <id> [reason]");
    println!("Deck:    peek [3|5|10] [me|opp]  search [me|opp] [text]");
    println!("         fetch <side:zone[:top|bottom]> <id>[, <id>..] [reason]");
    println!("Extra:   xyz <extra id> <mz> <mz>..  xyz-grave ..  synchro <extra id> <mz> <mz>..");
    println!("         detach <mz> <n>  xyz?  rabbit <id> [| name, name]");
    println!("Review:  board  log  odds  export <file>  import <file>");
    println!("Cards:   card <name>  note <name> | <notes>");
    println!("         quit");
}
