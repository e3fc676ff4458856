// ABOUTME: Turn-based combat resolver between one player character and an encounter's enemies.
// ABOUTME: Sessions are immutable snapshots advanced by step functions that return a new session.

use crate::character::Character;
use crate::encounter::{Encounter, Enemy, Rewards};
use crate::error::{Error, Result};
use crate::notation::DiceSpec;
use crate::roller::{ability_modifier, evaluate_with_rng, roll_die_with_rng, Rng};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tunable constants of the resolver. The defaults are the standard rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CombatRules {
    /// Faces of the die rolled for every attack.
    pub attack_die: u32,
    /// Faces of the player's damage die.
    pub player_damage_die: u32,
}

impl Default for CombatRules {
    fn default() -> Self {
        Self {
            attack_die: 20,
            player_damage_die: 6,
        }
    }
}

/// Who produced a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Actor {
    Player,
    Enemy,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatLogEntry {
    pub id: String,
    pub message: String,
    #[serde(rename = "type")]
    pub actor: Actor,
    /// Unix time in milliseconds.
    pub timestamp: i64,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Victory,
    Defeat,
    Retreat,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Victory => write!(f, "victory"),
            Outcome::Defeat => write!(f, "defeat"),
            Outcome::Retreat => write!(f, "retreat"),
        }
    }
}

/// Where a session stands between steps.
///
/// Attack and enemy-phase resolution run to completion inside a single step,
/// so only the waiting states and the terminal state are ever observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    AwaitingPlayerAction,
    AwaitingEnemyPhase,
    Concluded(Outcome),
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::AwaitingPlayerAction => write!(f, "awaiting player action"),
            Phase::AwaitingEnemyPhase => write!(f, "awaiting enemy phase"),
            Phase::Concluded(outcome) => write!(f, "concluded ({})", outcome),
        }
    }
}

/// Session-local copy of an enemy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Combatant {
    pub id: String,
    pub name: String,
    pub current_health: i32,
    pub max_health: i32,
    pub armor_class: i32,
    pub attack_bonus: i32,
    pub damage: DiceSpec,
    pub is_defeated: bool,
}

impl From<&Enemy> for Combatant {
    fn from(enemy: &Enemy) -> Self {
        Self {
            id: enemy.id.clone(),
            name: enemy.name.clone(),
            current_health: enemy.stats.health,
            max_health: enemy.stats.health,
            armor_class: enemy.stats.armor_class,
            attack_bonus: enemy.stats.attack,
            damage: enemy.stats.damage,
            is_defeated: false,
        }
    }
}

/// What a concluded session hands back to its caller.
#[derive(Debug, Clone, PartialEq)]
pub struct CombatResult {
    pub outcome: Outcome,
    /// The player's final state, with rewards already applied on victory.
    pub player: Character,
    /// Rewards granted, present only on victory.
    pub rewards: Option<Rewards>,
    /// Completed enemy phases.
    pub rounds: u32,
}

impl CombatResult {
    pub fn is_victory(&self) -> bool {
        self.outcome == Outcome::Victory
    }

    pub fn is_retreat(&self) -> bool {
        self.outcome == Outcome::Retreat
    }
}

/// One fight between a player and an encounter.
#[derive(Debug, Clone)]
pub struct CombatSession {
    encounter_name: String,
    rewards: Rewards,
    rules: CombatRules,
    player: Character,
    enemies: Vec<Combatant>,
    log: Vec<CombatLogEntry>,
    phase: Phase,
    rounds: u32,
    applied_rewards: Option<Rewards>,
}

impl CombatSession {
    /// Start a session. Neither `player` nor `encounter` is modified.
    pub fn start(player: &Character, encounter: &Encounter, rules: CombatRules) -> Result<Self> {
        encounter.validate()?;
        if player.is_downed() {
            return Err(Error::PlayerDowned(player.name.clone()));
        }

        let mut session = Self {
            encounter_name: encounter.name.clone(),
            rewards: encounter.rewards.clone(),
            rules,
            player: player.clone(),
            enemies: encounter.enemies.iter().map(Combatant::from).collect(),
            log: Vec::new(),
            phase: Phase::AwaitingPlayerAction,
            rounds: 0,
            applied_rewards: None,
        };
        session.record(
            Actor::System,
            format!("Combat begins! {} faces {}", player.name, encounter.name),
        );

        tracing::info!(
            player = %player.name,
            encounter = %encounter.name,
            enemies = session.enemies.len(),
            "combat session started"
        );
        Ok(session)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn player(&self) -> &Character {
        &self.player
    }

    pub fn enemies(&self) -> &[Combatant] {
        &self.enemies
    }

    pub fn log(&self) -> &[CombatLogEntry] {
        &self.log
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn encounter_name(&self) -> &str {
        &self.encounter_name
    }

    pub fn is_concluded(&self) -> bool {
        matches!(self.phase, Phase::Concluded(_))
    }

    /// The enemy the player will strike next: first non-defeated in list order.
    pub fn target(&self) -> Option<&Combatant> {
        self.enemies.iter().find(|e| !e.is_defeated)
    }

    /// Resolve the player's attack against the current target.
    pub fn player_attack(&self, rng: &mut impl Rng) -> Result<Self> {
        self.require(Phase::AwaitingPlayerAction, "attacking")?;
        let mut next = self.clone();

        let Some(index) = next.enemies.iter().position(|e| !e.is_defeated) else {
            next.conclude(Outcome::Victory);
            return Ok(next);
        };

        let strength_mod = ability_modifier(next.player.abilities.strength);
        let bonus = strength_mod.saturating_add(next.player.abilities.proficiency_bonus);
        let attack_roll = roll(next.rules.attack_die, rng);
        let total_attack = attack_roll.saturating_add(bonus);
        let target_name = next.enemies[index].name.clone();
        let target_ac = next.enemies[index].armor_class;

        next.record(
            Actor::Player,
            format!(
                "{} attacks {}. Roll: {} + {} = {}",
                next.player.name, target_name, attack_roll, bonus, total_attack
            ),
        );
        tracing::debug!(target = %target_name, attack_roll, total_attack, target_ac, "player attack");

        if total_attack >= target_ac {
            let damage_roll = roll(next.rules.player_damage_die, rng);
            let total_damage = damage_roll.saturating_add(strength_mod).max(0);
            next.record(
                Actor::Player,
                format!(
                    "Hit! Damage: {} + {} = {}",
                    damage_roll, strength_mod, total_damage
                ),
            );

            let target = &mut next.enemies[index];
            target.current_health = target.current_health.saturating_sub(total_damage).max(0);
            if target.current_health == 0 {
                target.is_defeated = true;
                next.record(Actor::System, format!("{} has been defeated!", target_name));
            }

            if next.enemies.iter().all(|e| e.is_defeated) {
                next.conclude(Outcome::Victory);
                return Ok(next);
            }
        } else {
            next.record(
                Actor::Player,
                format!("Miss! The attack does not beat AC {}", target_ac),
            );
        }

        next.phase = Phase::AwaitingEnemyPhase;
        Ok(next)
    }

    /// Let every standing enemy attack once, in list order.
    ///
    /// The phase stops at the first hit that drops the player.
    pub fn enemy_phase(&self, rng: &mut impl Rng) -> Result<Self> {
        self.require(Phase::AwaitingEnemyPhase, "the enemy phase")?;
        let mut next = self.clone();

        if next.enemies.iter().all(|e| e.is_defeated) {
            next.conclude(Outcome::Victory);
            return Ok(next);
        }

        let player_ac = next.player.abilities.armor_class;
        for index in 0..next.enemies.len() {
            if next.enemies[index].is_defeated {
                continue;
            }
            let enemy = next.enemies[index].clone();

            let attack_roll = roll(next.rules.attack_die, rng);
            let total_attack = attack_roll.saturating_add(enemy.attack_bonus);
            next.record(
                Actor::Enemy,
                format!(
                    "{} attacks {}. Roll: {} + {} = {}",
                    enemy.name, next.player.name, attack_roll, enemy.attack_bonus, total_attack
                ),
            );
            tracing::debug!(enemy = %enemy.name, attack_roll, total_attack, player_ac, "enemy attack");

            if total_attack < player_ac {
                next.record(
                    Actor::Enemy,
                    format!("Miss! The attack does not beat AC {}", player_ac),
                );
                continue;
            }

            // a negative total deals nothing; it never heals
            let damage = evaluate_with_rng(&enemy.damage, rng).total.max(0);
            let damage = i32::try_from(damage).unwrap_or(i32::MAX);
            next.record(Actor::Enemy, format!("Hit! Damage: {}", damage));

            next.player.current_health = next.player.current_health.saturating_sub(damage).max(0);
            if next.player.current_health == 0 {
                next.conclude(Outcome::Defeat);
                return Ok(next);
            }
        }

        next.rounds += 1;
        next.phase = Phase::AwaitingPlayerAction;
        Ok(next)
    }

    /// Leave the fight. Only allowed on the player's turn; grants nothing.
    pub fn retreat(&self) -> Result<Self> {
        self.require(Phase::AwaitingPlayerAction, "retreating")?;
        let mut next = self.clone();
        next.record(
            Actor::System,
            format!("{} retreats from combat", next.player.name),
        );
        next.conclude(Outcome::Retreat);
        Ok(next)
    }

    /// Run whatever step the session is waiting for.
    pub fn advance(&self, rng: &mut impl Rng) -> Result<Self> {
        match self.phase {
            Phase::AwaitingPlayerAction => self.player_attack(rng),
            Phase::AwaitingEnemyPhase => self.enemy_phase(rng),
            Phase::Concluded(_) => Err(Error::Concluded),
        }
    }

    /// Attack every turn until the session concludes.
    pub fn auto_play(&self, rng: &mut impl Rng, max_rounds: u32) -> Result<Self> {
        let mut session = self.clone();
        while !session.is_concluded() {
            if session.rounds >= max_rounds {
                return Err(Error::RoundLimit(max_rounds));
            }
            session = session.advance(rng)?;
        }
        Ok(session)
    }

    /// The hand-back value once concluded.
    pub fn finish(&self) -> Option<CombatResult> {
        let Phase::Concluded(outcome) = self.phase else {
            return None;
        };
        Some(CombatResult {
            outcome,
            player: self.player.clone(),
            rewards: self.applied_rewards.clone(),
            rounds: self.rounds,
        })
    }

    fn require(&self, expected: Phase, action: &'static str) -> Result<()> {
        if self.is_concluded() {
            return Err(Error::Concluded);
        }
        if self.phase != expected {
            return Err(Error::ActionNotAllowed {
                action,
                phase: self.phase.to_string(),
            });
        }
        Ok(())
    }

    fn conclude(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Victory => {
                let rewards = self.rewards.clone();
                self.record(
                    Actor::System,
                    format!("Victory! {} wins the fight", self.player.name),
                );
                self.record(
                    Actor::System,
                    format!(
                        "Rewards: {} coins, {} XP",
                        rewards.coins, rewards.experience
                    ),
                );
                if !rewards.items.is_empty() {
                    let names: Vec<&str> = rewards.items.iter().map(|i| i.name.as_str()).collect();
                    self.record(
                        Actor::System,
                        format!("Items obtained: {}", names.join(", ")),
                    );
                }

                self.player.coins = self.player.coins.saturating_add(rewards.coins);
                self.player.experience = self.player.experience.saturating_add(rewards.experience);
                self.player.inventory.extend(rewards.items.iter().cloned());
                self.applied_rewards = Some(rewards);
            }
            Outcome::Retreat => {
                self.record(
                    Actor::System,
                    "Combat ended by retreat. No rewards are granted.".to_string(),
                );
            }
            Outcome::Defeat => {
                self.record(
                    Actor::System,
                    format!("{} has been defeated...", self.player.name),
                );
            }
        }

        self.phase = Phase::Concluded(outcome);
        tracing::info!(
            player = %self.player.name,
            encounter = %self.encounter_name,
            %outcome,
            rounds = self.rounds,
            "combat session concluded"
        );
    }

    fn record(&mut self, actor: Actor, message: String) {
        self.log.push(CombatLogEntry {
            id: uuid::Uuid::new_v4().to_string(),
            message,
            actor,
            timestamp: chrono::Utc::now().timestamp_millis(),
        });
    }
}

fn roll(sides: u32, rng: &mut impl Rng) -> i32 {
    i32::try_from(roll_die_with_rng(sides, rng)).unwrap_or(i32::MAX)
}
