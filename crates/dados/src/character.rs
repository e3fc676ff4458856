// ABOUTME: Player character sheet: abilities, inventory, coins and health.
// ABOUTME: Mirrors the JSON shape stored by the character-sheet collaborator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A player character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: String,
    pub name: String,
    pub level: u32,
    pub race: String,
    pub class: String,
    pub abilities: Abilities,
    #[serde(default)]
    pub inventory: Vec<InventoryItem>,
    pub coins: u32,
    pub experience: u32,
    pub max_health: i32,
    pub current_health: i32,
}

impl Character {
    /// Create a fresh level-`level` character with default scores.
    pub fn new(
        name: impl Into<String>,
        race: impl Into<String>,
        class: impl Into<String>,
        level: u32,
    ) -> Self {
        let level = level.max(1);
        let health = i32::try_from(level)
            .unwrap_or(i32::MAX)
            .saturating_mul(5)
            .saturating_add(10);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into().trim().to_string(),
            level,
            race: race.into(),
            class: class.into(),
            abilities: Abilities {
                proficiency_bonus: level.div_ceil(4) as i32 + 1,
                ..Abilities::default()
            },
            inventory: Vec::new(),
            coins: 50,
            experience: 0,
            max_health: health,
            current_health: health,
        }
    }

    pub fn is_downed(&self) -> bool {
        self.current_health <= 0
    }
}

/// Ability scores plus the derived combat numbers stored alongside them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Abilities {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
    pub armor_class: i32,
    pub proficiency_bonus: i32,
}

impl Default for Abilities {
    fn default() -> Self {
        Self {
            strength: 10,
            dexterity: 10,
            constitution: 10,
            intelligence: 10,
            wisdom: 10,
            charisma: 10,
            armor_class: 10,
            proficiency_bonus: 2,
        }
    }
}

impl Abilities {
    pub fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
            Ability::ArmorClass => self.armor_class,
            Ability::ProficiencyBonus => self.proficiency_bonus,
        }
    }

    pub fn get_mut(&mut self, ability: Ability) -> &mut i32 {
        match ability {
            Ability::Strength => &mut self.strength,
            Ability::Dexterity => &mut self.dexterity,
            Ability::Constitution => &mut self.constitution,
            Ability::Intelligence => &mut self.intelligence,
            Ability::Wisdom => &mut self.wisdom,
            Ability::Charisma => &mut self.charisma,
            Ability::ArmorClass => &mut self.armor_class,
            Ability::ProficiencyBonus => &mut self.proficiency_bonus,
        }
    }
}

/// Addresses one field of [`Abilities`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
    ArmorClass,
    ProficiencyBonus,
}

/// An item carried by a character or offered as a reward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<ItemEffect>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Weapon,
    Armor,
    Potion,
    Scroll,
    Misc,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Weapon => write!(f, "weapon"),
            ItemKind::Armor => write!(f, "armor"),
            ItemKind::Potion => write!(f, "potion"),
            ItemKind::Scroll => write!(f, "scroll"),
            ItemKind::Misc => write!(f, "misc"),
        }
    }
}

/// A permanent adjustment an item makes to one ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemEffect {
    pub stat: Ability,
    pub modifier: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_character_defaults() {
        let hero = Character::new("  Aria ", "Elf", "Ranger", 1);
        assert_eq!(hero.name, "Aria");
        assert_eq!(hero.max_health, 15);
        assert_eq!(hero.current_health, 15);
        assert_eq!(hero.coins, 50);
        assert_eq!(hero.experience, 0);
        assert_eq!(hero.abilities.strength, 10);
        assert_eq!(hero.abilities.armor_class, 10);
        assert_eq!(hero.abilities.proficiency_bonus, 2);
        assert!(hero.inventory.is_empty());
    }

    #[test]
    fn test_proficiency_by_level() {
        assert_eq!(Character::new("a", "b", "c", 4).abilities.proficiency_bonus, 2);
        assert_eq!(Character::new("a", "b", "c", 5).abilities.proficiency_bonus, 3);
        assert_eq!(Character::new("a", "b", "c", 9).abilities.proficiency_bonus, 4);
        assert_eq!(Character::new("a", "b", "c", 20).abilities.proficiency_bonus, 6);
    }

    #[test]
    fn test_huge_level_saturates_health() {
        let hero = Character::new("Aria", "Human", "Fighter", u32::MAX);
        assert_eq!(hero.max_health, i32::MAX);
        assert_eq!(hero.abilities.proficiency_bonus, 1_073_741_825);
    }

    #[test]
    fn test_ability_access() {
        let mut abilities = Abilities::default();
        *abilities.get_mut(Ability::Strength) += 2;
        assert_eq!(abilities.get(Ability::Strength), 12);
        assert_eq!(abilities.get(Ability::ArmorClass), 10);
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{
            "id": "c1",
            "name": "Borin",
            "level": 2,
            "race": "Dwarf",
            "class": "Fighter",
            "abilities": {
                "strength": 16, "dexterity": 10, "constitution": 14,
                "intelligence": 8, "wisdom": 10, "charisma": 9,
                "armorClass": 15, "proficiencyBonus": 2
            },
            "inventory": [
                {"id": "i1", "name": "Axe", "type": "weapon", "description": "", "price": 10,
                 "effects": [{"stat": "strength", "modifier": 1}]}
            ],
            "coins": 12,
            "experience": 40,
            "maxHealth": 20,
            "currentHealth": 18
        }"#;
        let hero: Character = serde_json::from_str(json).unwrap();
        assert_eq!(hero.abilities.armor_class, 15);
        assert_eq!(hero.inventory[0].kind, ItemKind::Weapon);
        assert_eq!(hero.inventory[0].effects[0].stat, Ability::Strength);

        let back = serde_json::to_value(&hero).unwrap();
        assert_eq!(back["currentHealth"], 18);
        assert_eq!(back["inventory"][0]["type"], "weapon");
    }
}
