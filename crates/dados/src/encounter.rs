// ABOUTME: Narrator-side enemy and encounter definitions.
// ABOUTME: Encounters bundle ordered enemies with a reward package and are validated before combat.

use crate::character::InventoryItem;
use crate::error::{Error, Result};
use crate::notation::DiceSpec;
use serde::{Deserialize, Serialize};

/// Experience granted per enemy in a freshly authored encounter.
pub const EXPERIENCE_PER_ENEMY: u32 = 25;

/// An opposing combatant as authored by the narrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enemy {
    pub id: String,
    pub name: String,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub race: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub stats: EnemyStats,
    #[serde(default)]
    pub attacks: Vec<Attack>,
}

fn default_level() -> u32 {
    1
}

impl Enemy {
    /// Create an enemy with a single basic attack matching its stats.
    pub fn new(name: impl Into<String>, stats: EnemyStats) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into().trim().to_string(),
            level: 1,
            race: String::new(),
            kind: String::new(),
            attacks: vec![Attack {
                name: "Basic Attack".to_string(),
                damage: stats.damage,
                bonus: stats.attack,
            }],
            stats,
        }
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_race(mut self, race: impl Into<String>) -> Self {
        self.race = race.into();
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyStats {
    pub health: i32,
    pub armor_class: i32,
    /// Bonus added to the enemy's d20 attack roll.
    pub attack: i32,
    #[serde(default)]
    pub defense: i32,
    pub damage: DiceSpec,
}

impl Default for EnemyStats {
    fn default() -> Self {
        Self {
            health: 10,
            armor_class: 10,
            attack: 0,
            defense: 0,
            damage: DiceSpec::new(1, 6, 0),
        }
    }
}

/// A named attack. Informational; combat uses [`EnemyStats`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attack {
    pub name: String,
    pub damage: DiceSpec,
    #[serde(default)]
    pub bonus: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rewards {
    pub coins: u32,
    pub experience: u32,
    #[serde(default)]
    pub items: Vec<InventoryItem>,
}

/// A predefined fight: ordered enemies plus what the victor receives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    pub id: String,
    pub name: String,
    pub enemies: Vec<Enemy>,
    #[serde(default)]
    pub rewards: Rewards,
}

impl Encounter {
    /// Author an encounter. Experience scales with the number of enemies.
    pub fn new(
        name: impl Into<String>,
        enemies: Vec<Enemy>,
        coins: u32,
        items: Vec<InventoryItem>,
    ) -> Self {
        let experience = EXPERIENCE_PER_ENEMY * enemies.len() as u32;
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            enemies,
            rewards: Rewards {
                coins,
                experience,
                items,
            },
        }
    }

    /// Check the encounter can start a combat session.
    pub fn validate(&self) -> Result<()> {
        if self.enemies.is_empty() {
            return Err(Error::NoEnemies(self.name.clone()));
        }
        if let Some(enemy) = self.enemies.iter().find(|e| e.stats.health <= 0) {
            return Err(Error::InvalidEnemyHealth {
                name: enemy.name.clone(),
                health: enemy.stats.health,
            });
        }
        Ok(())
    }
}
