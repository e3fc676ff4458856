// ABOUTME: Core library for a tabletop RPG companion: dice engine and combat resolver.
// ABOUTME: Also covers characters, narrator encounters, encounter hand-off, shop and simulation.

//! # Dados
//!
//! Dice rolling and turn-based combat for a tabletop RPG companion.
//!
//! ## Quick Start
//!
//! ```
//! use dados::{ability_modifier, parse_notation, resolve_notation};
//!
//! let spec = parse_notation("2d6+3");
//! assert_eq!((spec.count, spec.sides, spec.modifier), (2, 6, 3));
//!
//! let outcome = resolve_notation("1d20-1");
//! println!("{}", outcome); // e.g. "1d20-1[14] = 13"
//!
//! assert_eq!(ability_modifier(16), 3);
//! ```
//!
//! ## Combat
//!
//! ```
//! use dados::{Character, CombatRules, CombatSession, Encounter, Enemy, EnemyStats, FastRng};
//!
//! let hero = Character::new("Aria", "Human", "Fighter", 1);
//! let goblin = Enemy::new("Goblin", EnemyStats::default());
//! let camp = Encounter::new("Goblin Camp", vec![goblin], 10, vec![]);
//!
//! let mut rng = FastRng::with_seed(7);
//! let session = CombatSession::start(&hero, &camp, CombatRules::default()).unwrap();
//! let session = session.player_attack(&mut rng).unwrap();
//! for entry in session.log() {
//!     println!("{}", entry.message);
//! }
//! ```

pub mod character;
pub mod combat;
pub mod encounter;
pub mod error;
pub mod handoff;
pub mod lexer;
pub mod notation;
pub mod parser;
pub mod pool;
pub mod roller;
pub mod shop;
pub mod sim;

pub use character::{Abilities, Ability, Character, InventoryItem, ItemEffect, ItemKind};
pub use combat::{
    Actor, CombatLogEntry, CombatResult, CombatRules, CombatSession, Combatant, Outcome, Phase,
};
pub use encounter::{Attack, Encounter, Enemy, EnemyStats, Rewards};
pub use error::{Error, Result};
pub use handoff::CombatPayload;
pub use notation::{parse_notation, DiceSpec};
pub use pool::{DicePool, DieKind, Highlight, PoolRoll, RollMode};
pub use roller::{
    ability_modifier, evaluate, evaluate_with_rng, resolve_notation, resolve_notation_with_rng,
    roll_dice, roll_dice_with_rng, roll_die, roll_die_with_rng, roll_with_advantage,
    roll_with_advantage_with_rng, roll_with_disadvantage, roll_with_disadvantage_with_rng,
    FastRng, Rng, RollOutcome,
};
pub use shop::{Cart, Catalog, ShopItem};
pub use sim::{simulate, simulate_encounter, simulate_seeded, EncounterOdds, SimResult};

/// Parse strict notation and roll it in one step.
///
/// # Examples
///
/// ```
/// let result = dados::roll("2d6+5").unwrap();
/// assert!(result.total >= 7 && result.total <= 17);
/// ```
pub fn roll(notation: &str) -> Result<RollOutcome> {
    let spec: DiceSpec = notation.parse()?;
    Ok(roller::evaluate(&spec))
}

/// Parse strict notation and roll it with a custom RNG.
///
/// Useful for testing or when you need reproducible results.
///
/// ```
/// use dados::{roll_with_rng, FastRng};
///
/// let mut rng = FastRng::with_seed(42);
/// let result = roll_with_rng("2d6", &mut rng).unwrap();
/// assert_eq!(result.results.len(), 2);
/// ```
pub fn roll_with_rng(notation: &str, rng: &mut impl Rng) -> Result<RollOutcome> {
    let spec: DiceSpec = notation.parse()?;
    Ok(roller::evaluate_with_rng(&spec, rng))
}
