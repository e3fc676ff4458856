// ABOUTME: Command-line interface for the dados dice and combat engine.
// ABOUTME: Rolls dice, simulates distributions, packs encounters and plays out fights.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use dados::{
    Actor, Character, CombatPayload, CombatRules, CombatSession, DicePool, DiceSpec, DieKind,
    Encounter, FastRng, Highlight, Phase, RollMode,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Rounds after which `fight` gives up on a stalemate.
const MAX_FIGHT_ROUNDS: u32 = 1000;

#[derive(Parser)]
#[command(name = "dados")]
#[command(about = "Dice roller and combat resolver for tabletop RPGs")]
#[command(version)]
struct Cli {
    /// Seed the random source for reproducible results
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Roll dice using the given notation
    Roll {
        /// Dice notation (e.g., "2d6+3", "1d20-1", "d20")
        notation: String,

        #[command(flatten)]
        mode: ModeArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Roll a tray of standard dice
    Pool(PoolArgs),
    /// Simulate rolling dice many times
    Sim {
        /// Dice notation (e.g., "2d6")
        notation: String,

        /// Number of trials to run
        #[arg(short, long, default_value = "10000")]
        n: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the modifier for an ability score
    Modifier {
        #[arg(allow_negative_numbers = true)]
        score: i32,
    },
    /// Character sheets
    #[command(subcommand)]
    Character(CharacterCommand),
    /// Narrator encounters
    #[command(subcommand)]
    Encounter(EncounterCommand),
    /// Play out a fight, attacking every turn
    Fight {
        /// Character JSON file
        character: PathBuf,
        /// Hand-off payload JSON file
        payload: PathBuf,
        /// Write the updated character here
        #[arg(long)]
        out: Option<PathBuf>,
        /// Combat rules JSON file
        #[arg(long)]
        rules: Option<PathBuf>,
        /// Retreat instead of attacking once health falls to this value
        #[arg(long)]
        retreat_at: Option<i32>,
    },
    /// Estimate the odds of winning a fight
    Odds {
        /// Character JSON file
        character: PathBuf,
        /// Hand-off payload JSON file
        payload: PathBuf,
        /// Number of fights to simulate
        #[arg(short, long, default_value = "1000")]
        n: usize,
        /// Combat rules JSON file
        #[arg(long)]
        rules: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum CharacterCommand {
    /// Create a new character sheet (printed as JSON)
    New {
        #[arg(long)]
        name: String,
        #[arg(long)]
        race: String,
        #[arg(long)]
        class: String,
        #[arg(long, default_value = "1")]
        level: u32,
    },
}

#[derive(Subcommand)]
enum EncounterCommand {
    /// Wrap an encounter file into a hand-off payload
    Pack {
        /// Encounter JSON file
        encounter: PathBuf,
    },
}

#[derive(Args)]
struct ModeArgs {
    /// Roll twice and keep the higher
    #[arg(long, conflicts_with = "disadvantage")]
    advantage: bool,

    /// Roll twice and keep the lower
    #[arg(long)]
    disadvantage: bool,
}

impl ModeArgs {
    fn mode(&self) -> RollMode {
        if self.advantage {
            RollMode::Advantage
        } else if self.disadvantage {
            RollMode::Disadvantage
        } else {
            RollMode::Normal
        }
    }
}

#[derive(Args)]
struct PoolArgs {
    #[arg(long, default_value = "0")]
    d4: u32,
    #[arg(long, default_value = "0")]
    d6: u32,
    #[arg(long, default_value = "0")]
    d8: u32,
    #[arg(long, default_value = "0")]
    d10: u32,
    #[arg(long, default_value = "0")]
    d12: u32,
    #[arg(long, default_value = "0")]
    d20: u32,
    #[arg(long, default_value = "0")]
    d100: u32,

    /// Flat modifier added to the total
    #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
    modifier: i32,

    #[command(flatten)]
    mode: ModeArgs,
}

impl PoolArgs {
    fn pool(&self) -> DicePool {
        let counts = [
            self.d4, self.d6, self.d8, self.d10, self.d12, self.d20, self.d100,
        ];
        let mut pool = DieKind::ALL
            .iter()
            .zip(counts)
            .fold(DicePool::new(), |pool, (&kind, count)| pool.with(kind, count));
        pool.modifier = self.modifier;
        pool.mode = self.mode.mode();
        pool
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut rng = match cli.seed {
        Some(seed) => FastRng::with_seed(seed),
        None => FastRng::new(),
    };

    match cli.command {
        Commands::Roll {
            notation,
            mode,
            json,
        } => {
            let spec: DiceSpec = notation.parse()?;
            let mut outcome = match mode.mode() {
                RollMode::Normal => dados::evaluate_with_rng(&spec, &mut rng),
                RollMode::Advantage => dados::roll_with_advantage_with_rng(spec.sides, &mut rng),
                RollMode::Disadvantage => {
                    dados::roll_with_disadvantage_with_rng(spec.sides, &mut rng)
                }
            };
            if mode.mode() != RollMode::Normal && spec.modifier != 0 {
                outcome.total += spec.modifier as i64;
                outcome.expression =
                    format!("{} {:+} = {}", outcome.expression, spec.modifier, outcome.total);
            }
            if json {
                print_json(&outcome)?;
            } else {
                println!("{}", outcome);
            }
        }
        Commands::Pool(args) => {
            let roll = args.pool().roll_with_rng(&mut rng)?;
            println!("{}", roll);
            match roll.highlight() {
                Some(Highlight::Critical) => println!("Natural 20!"),
                Some(Highlight::Fumble) => println!("Natural 1..."),
                None => {}
            }
        }
        Commands::Sim { notation, n, json } => {
            let result = match cli.seed {
                Some(seed) => dados::simulate_seeded(&notation, n, seed)?,
                None => dados::simulate(&notation, n)?,
            };
            if json {
                print_sim_json(&result)?;
            } else {
                print_sim_histogram(&notation, &result);
            }
        }
        Commands::Modifier { score } => {
            println!("{:+}", dados::ability_modifier(score));
        }
        Commands::Character(CharacterCommand::New {
            name,
            race,
            class,
            level,
        }) => {
            if name.trim().is_empty() {
                bail!("character name must not be empty");
            }
            print_json(&Character::new(name, race, class, level))?;
        }
        Commands::Encounter(EncounterCommand::Pack { encounter }) => {
            let encounter: Encounter = read_json(&encounter)?;
            encounter.validate()?;
            println!("{}", CombatPayload::new(&encounter).encode()?);
        }
        Commands::Fight {
            character,
            payload,
            out,
            rules,
            retreat_at,
        } => {
            let hero: Character = read_json(&character)?;
            let payload = read_payload(&payload)?;
            let rules = read_rules(rules.as_deref())?;

            let mut session = CombatSession::start(&hero, &payload.encounter, rules)?;
            while !session.is_concluded() {
                if session.rounds() >= MAX_FIGHT_ROUNDS {
                    bail!("fight did not finish within {} rounds", MAX_FIGHT_ROUNDS);
                }
                let wants_out =
                    retreat_at.is_some_and(|hp| session.player().current_health <= hp);
                session = match session.phase() {
                    Phase::AwaitingPlayerAction if wants_out => session.retreat()?,
                    _ => session.advance(&mut rng)?,
                };
            }

            for entry in session.log() {
                let tag = match entry.actor {
                    Actor::Player => "player",
                    Actor::Enemy => "enemy ",
                    Actor::System => "system",
                };
                println!("[{}] {}", tag, entry.message);
            }

            let Some(result) = session.finish() else {
                bail!("fight ended without an outcome");
            };
            println!();
            println!(
                "{}: {} HP {}/{}, {} coins, {} XP",
                result.outcome,
                result.player.name,
                result.player.current_health,
                result.player.max_health,
                result.player.coins,
                result.player.experience
            );

            if let Some(path) = out {
                let text = serde_json::to_string_pretty(&result.player)?;
                fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
                tracing::debug!(path = %path.display(), "wrote updated character");
            }
        }
        Commands::Odds {
            character,
            payload,
            n,
            rules,
        } => {
            let hero: Character = read_json(&character)?;
            let payload = read_payload(&payload)?;
            let rules = read_rules(rules.as_deref())?;
            let seed = cli.seed.unwrap_or_else(|| fastrand::u64(..));

            let odds = dados::simulate_encounter(&hero, &payload.encounter, rules, n, seed)?;
            println!("{} vs {} (n={})", hero.name, payload.encounter.name, odds.n);
            println!("win rate: {:.1}%", odds.win_rate() * 100.0);
            println!(
                "victories: {}, defeats: {}, stalemates: {}, mean rounds: {:.2}",
                odds.victories, odds.defeats, odds.stalemates, odds.mean_rounds
            );
        }
    }

    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn read_payload(path: &Path) -> anyhow::Result<CombatPayload> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    CombatPayload::decode(&text).with_context(|| format!("decoding {}", path.display()))
}

fn read_rules(path: Option<&Path>) -> anyhow::Result<CombatRules> {
    match path {
        Some(path) => read_json(path),
        None => Ok(CombatRules::default()),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_sim_json(result: &dados::SimResult) -> anyhow::Result<()> {
    print_json(&sim_json(result))
}

fn sim_json(result: &dados::SimResult) -> serde_json::Value {
    serde_json::json!({
        "n": result.n,
        "min": result.min,
        "max": result.max,
        "mean": result.mean,
        "std_dev": result.std_dev,
        "mode": result.mode(),
        "median": result.median(),
        "distribution": result.distribution,
    })
}

fn print_sim_histogram(notation: &str, result: &dados::SimResult) {
    println!("{} (n={})", notation, result.n);
    println!();

    let outcomes = result.sorted_outcomes();
    let max_count = outcomes.iter().map(|(_, c)| *c).max().unwrap_or(1);
    let max_bar_width = 40;

    for (value, count) in outcomes {
        let pct = (count as f64 / result.n as f64) * 100.0;
        let bar_width = (count as f64 / max_count as f64 * max_bar_width as f64) as usize;
        let bar: String = "█".repeat(bar_width);

        println!("{:>4}: {:40} {:5.1}%", value, bar, pct);
    }

    println!();
    println!("mean: {:.2}, std: {:.2}", result.mean, result.std_dev);
}
