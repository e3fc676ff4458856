// ABOUTME: Monte Carlo simulation for dice notation and whole encounters.
// ABOUTME: Runs many trials to compute distributions, statistics and win rates.

use crate::character::Character;
use crate::combat::{CombatRules, CombatSession, Outcome};
use crate::encounter::Encounter;
use crate::error::Result;
use crate::notation::DiceSpec;
use crate::roller::{evaluate_with_rng, FastRng, Rng};
use serde::Serialize;
use std::collections::HashMap;

/// Rounds after which a simulated fight is abandoned.
pub const MAX_SIMULATED_ROUNDS: u32 = 500;

/// Result of a Monte Carlo simulation.
#[derive(Debug, Clone, Serialize)]
pub struct SimResult {
    /// Distribution of outcomes: value -> count.
    pub distribution: HashMap<i64, usize>,
    /// Minimum value observed.
    pub min: i64,
    /// Maximum value observed.
    pub max: i64,
    /// Mean (average) value.
    pub mean: f64,
    /// Standard deviation.
    pub std_dev: f64,
    /// Number of trials run.
    pub n: usize,
}

impl SimResult {
    /// Returns outcomes sorted by value for iteration.
    pub fn sorted_outcomes(&self) -> Vec<(i64, usize)> {
        let mut outcomes: Vec<_> = self.distribution.iter().map(|(&k, &v)| (k, v)).collect();
        outcomes.sort_by_key(|(k, _)| *k);
        outcomes
    }

    /// Returns the probability of each outcome.
    pub fn probabilities(&self) -> HashMap<i64, f64> {
        self.distribution
            .iter()
            .map(|(&k, &v)| (k, v as f64 / self.n as f64))
            .collect()
    }

    /// Returns the mode (most common outcome).
    pub fn mode(&self) -> Option<i64> {
        self.distribution
            .iter()
            .max_by_key(|(_, &count)| count)
            .map(|(&value, _)| value)
    }

    /// Returns the median value.
    pub fn median(&self) -> f64 {
        let mut values: Vec<i64> = Vec::with_capacity(self.n);
        for (&value, &count) in &self.distribution {
            for _ in 0..count {
                values.push(value);
            }
        }
        values.sort();

        if values.is_empty() {
            return 0.0;
        }

        let mid = values.len() / 2;
        if values.len() % 2 == 0 {
            (values[mid - 1] + values[mid]) as f64 / 2.0
        } else {
            values[mid] as f64
        }
    }
}

/// Run a Monte Carlo simulation on a dice notation such as "2d6+3".
pub fn simulate(notation: &str, n: usize) -> Result<SimResult> {
    let spec: DiceSpec = notation.parse()?;
    Ok(simulate_spec(&spec, n, &mut FastRng::new()))
}

/// Run a simulation with a seeded RNG for reproducibility.
pub fn simulate_seeded(notation: &str, n: usize, seed: u64) -> Result<SimResult> {
    let spec: DiceSpec = notation.parse()?;
    Ok(simulate_spec(&spec, n, &mut FastRng::with_seed(seed)))
}

fn simulate_spec(spec: &DiceSpec, n: usize, rng: &mut impl Rng) -> SimResult {
    let mut distribution: HashMap<i64, usize> = HashMap::new();
    let mut sum: i64 = 0;
    let mut sum_sq: i64 = 0;
    let mut min = i64::MAX;
    let mut max = i64::MIN;

    for _ in 0..n {
        let total = evaluate_with_rng(spec, rng).total;

        *distribution.entry(total).or_insert(0) += 1;
        sum += total;
        sum_sq += total * total;
        min = min.min(total);
        max = max.max(total);
    }

    if n == 0 {
        return SimResult {
            distribution,
            min: 0,
            max: 0,
            mean: 0.0,
            std_dev: 0.0,
            n,
        };
    }

    let mean = sum as f64 / n as f64;
    let variance = (sum_sq as f64 / n as f64) - (mean * mean);
    let std_dev = variance.max(0.0).sqrt();

    SimResult {
        distribution,
        min,
        max,
        mean,
        std_dev,
        n,
    }
}

/// Aggregate of many auto-played fights.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterOdds {
    pub victories: usize,
    pub defeats: usize,
    /// Fights abandoned after [`MAX_SIMULATED_ROUNDS`].
    pub stalemates: usize,
    pub n: usize,
    /// Mean completed enemy phases over concluded fights.
    pub mean_rounds: f64,
}

impl EncounterOdds {
    pub fn win_rate(&self) -> f64 {
        if self.n == 0 {
            return 0.0;
        }
        self.victories as f64 / self.n as f64
    }
}

/// Auto-play `n` fights (always attacking) and count the outcomes.
pub fn simulate_encounter(
    player: &Character,
    encounter: &Encounter,
    rules: CombatRules,
    n: usize,
    seed: u64,
) -> Result<EncounterOdds> {
    let session = CombatSession::start(player, encounter, rules)?;
    let mut rng = FastRng::with_seed(seed);
    let mut odds = EncounterOdds {
        n,
        ..EncounterOdds::default()
    };
    let mut total_rounds: u64 = 0;

    for _ in 0..n {
        let Ok(done) = session.auto_play(&mut rng, MAX_SIMULATED_ROUNDS) else {
            odds.stalemates += 1;
            continue;
        };
        let Some(result) = done.finish() else {
            continue;
        };
        total_rounds += result.rounds as u64;
        match result.outcome {
            Outcome::Victory => odds.victories += 1,
            Outcome::Defeat => odds.defeats += 1,
            Outcome::Retreat => {}
        }
    }

    let concluded = odds.victories + odds.defeats;
    if concluded > 0 {
        odds.mean_rounds = total_rounds as f64 / concluded as f64;
    }
    tracing::info!(
        encounter = %encounter.name,
        n,
        victories = odds.victories,
        defeats = odds.defeats,
        "encounter simulation finished"
    );
    Ok(odds)
}
