// ABOUTME: Dice rolling primitives: single dice, pools, notation, advantage.
// ABOUTME: All randomness flows through the `Rng` trait so tests can script outcomes.

use crate::notation::{parse_notation, DiceSpec};
use serde::Serialize;
use std::fmt;

/// Trait for random number generation, allowing for testing with fixed values.
pub trait Rng {
    /// Generate a random number in the range [1, max].
    fn roll(&mut self, max: u32) -> u32;
}

/// Default RNG using fastrand.
pub struct FastRng(fastrand::Rng);

impl FastRng {
    pub fn new() -> Self {
        Self(fastrand::Rng::new())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self(fastrand::Rng::with_seed(seed))
    }
}

impl Default for FastRng {
    fn default() -> Self {
        Self::new()
    }
}

impl Rng for FastRng {
    fn roll(&mut self, max: u32) -> u32 {
        self.0.u32(1..=max)
    }
}

impl<R: Rng + ?Sized> Rng for &mut R {
    fn roll(&mut self, max: u32) -> u32 {
        (**self).roll(max)
    }
}

/// Result of rolling one or more dice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollOutcome {
    /// Raw die values in roll order. Modifiers are not included.
    pub results: Vec<u32>,
    /// Final value: sum plus modifier, or the kept die for advantage rolls.
    pub total: i64,
    /// Faces of the dice rolled (0 for a degenerate roll).
    pub sides: u32,
    /// Formatted expression showing the roll.
    pub expression: String,
}

impl RollOutcome {
    /// True if any die landed on its highest face.
    pub fn is_natural_max(&self) -> bool {
        self.sides > 0 && self.results.contains(&self.sides)
    }

    /// True if any die landed on 1.
    pub fn is_natural_min(&self) -> bool {
        self.sides > 0 && self.results.contains(&1)
    }
}

impl fmt::Display for RollOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)
    }
}

/// Roll a single die with `sides` faces.
pub fn roll_die(sides: u32) -> u32 {
    roll_die_with_rng(sides, &mut FastRng::new())
}

/// Roll a single die with a custom RNG. A zero-sided die always shows 0.
pub fn roll_die_with_rng(sides: u32, rng: &mut impl Rng) -> u32 {
    if sides == 0 {
        return 0;
    }
    let value = rng.roll(sides);
    tracing::trace!(sides, value, "rolled die");
    value
}

/// Roll `count` dice with `sides` faces and sum them.
pub fn roll_dice(sides: u32, count: u32) -> RollOutcome {
    roll_dice_with_rng(sides, count, &mut FastRng::new())
}

/// Roll `count` dice with a custom RNG.
pub fn roll_dice_with_rng(sides: u32, count: u32, rng: &mut impl Rng) -> RollOutcome {
    let results: Vec<u32> = (0..count).map(|_| roll_die_with_rng(sides, rng)).collect();
    let total: i64 = results.iter().map(|&r| r as i64).sum();
    let expression = format!("{}d{}[{}] = {}", count, sides, join(&results), total);
    RollOutcome {
        results,
        total,
        sides,
        expression,
    }
}

/// Evaluate a parsed notation with the default RNG.
pub fn evaluate(spec: &DiceSpec) -> RollOutcome {
    evaluate_with_rng(spec, &mut FastRng::new())
}

/// Evaluate a parsed notation. The modifier counts toward `total` only.
pub fn evaluate_with_rng(spec: &DiceSpec, rng: &mut impl Rng) -> RollOutcome {
    if spec.is_degenerate() {
        return RollOutcome {
            results: vec![0],
            total: 0,
            sides: 0,
            expression: format!("{}[0] = 0", spec),
        };
    }

    let results: Vec<u32> = (0..spec.count)
        .map(|_| roll_die_with_rng(spec.sides, rng))
        .collect();
    let total = results.iter().map(|&r| r as i64).sum::<i64>() + spec.modifier as i64;
    let expression = format!("{}[{}] = {}", spec, join(&results), total);
    tracing::debug!(notation = %spec, total, "evaluated notation");

    RollOutcome {
        results,
        total,
        sides: spec.sides,
        expression,
    }
}

/// Parse notation leniently and roll it.
pub fn resolve_notation(text: &str) -> RollOutcome {
    resolve_notation_with_rng(text, &mut FastRng::new())
}

/// Parse notation leniently and roll it with a custom RNG.
pub fn resolve_notation_with_rng(text: &str, rng: &mut impl Rng) -> RollOutcome {
    evaluate_with_rng(&parse_notation(text), rng)
}

/// Roll two dice and keep the higher.
pub fn roll_with_advantage(sides: u32) -> RollOutcome {
    roll_with_advantage_with_rng(sides, &mut FastRng::new())
}

pub fn roll_with_advantage_with_rng(sides: u32, rng: &mut impl Rng) -> RollOutcome {
    roll_pair(sides, rng, "kh1", std::cmp::max)
}

/// Roll two dice and keep the lower.
pub fn roll_with_disadvantage(sides: u32) -> RollOutcome {
    roll_with_disadvantage_with_rng(sides, &mut FastRng::new())
}

pub fn roll_with_disadvantage_with_rng(sides: u32, rng: &mut impl Rng) -> RollOutcome {
    roll_pair(sides, rng, "kl1", std::cmp::min)
}

fn roll_pair(
    sides: u32,
    rng: &mut impl Rng,
    suffix: &str,
    keep: fn(u32, u32) -> u32,
) -> RollOutcome {
    let first = roll_die_with_rng(sides, rng);
    let second = roll_die_with_rng(sides, rng);
    let total = keep(first, second) as i64;
    RollOutcome {
        results: vec![first, second],
        total,
        sides,
        expression: format!("2d{}{}[{}, {}] = {}", sides, suffix, first, second, total),
    }
}

/// Modifier for an ability score: `floor((score - 10) / 2)`.
pub fn ability_modifier(score: i32) -> i32 {
    score.saturating_sub(10).div_euclid(2)
}

fn join(values: &[u32]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
