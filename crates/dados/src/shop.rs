// ABOUTME: Shop catalog browsing and cart checkout against a character's purse.
// ABOUTME: Checkout deducts coins, adds purchased items and applies their ability effects.

use crate::character::{Character, InventoryItem};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// An item offered for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopItem {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub in_stock: bool,
    pub category: String,
}

/// The shop's full stock list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    pub items: Vec<ShopItem>,
}

impl Catalog {
    pub fn new(items: Vec<ShopItem>) -> Self {
        Self { items }
    }

    /// In-stock items matching an optional category and a case-insensitive
    /// search over name and description.
    pub fn filter<'a>(
        &'a self,
        category: Option<&'a str>,
        search: &'a str,
    ) -> impl Iterator<Item = &'a ShopItem> + 'a {
        let needle = search.trim().to_lowercase();
        self.items.iter().filter(move |entry| {
            let matches_category = category.map_or(true, |c| entry.category == c);
            let matches_search = needle.is_empty()
                || entry.item.name.to_lowercase().contains(&needle)
                || entry.item.description.to_lowercase().contains(&needle);
            entry.in_stock && matches_category && matches_search
        })
    }

    pub fn get(&self, id: &str) -> Option<&ShopItem> {
        self.items.iter().find(|entry| entry.item.id == id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub item: InventoryItem,
    pub quantity: u32,
}

/// Items picked for purchase but not yet paid for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of an item, stacking with any already in the cart.
    pub fn add(&mut self, item: &InventoryItem) {
        match self.lines.iter_mut().find(|line| line.item.id == item.id) {
            Some(line) => line.quantity += 1,
            None => self.lines.push(CartLine {
                item: item.clone(),
                quantity: 1,
            }),
        }
    }

    /// Drop every unit of an item from the cart.
    pub fn remove(&mut self, item_id: &str) {
        self.lines.retain(|line| line.item.id != item_id);
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total_price(&self) -> u32 {
        self.lines
            .iter()
            .map(|line| line.item.price.saturating_mul(line.quantity))
            .fold(0u32, u32::saturating_add)
    }

    /// Pay for the cart. The cart is emptied only on success.
    pub fn checkout(&mut self, character: &Character) -> Result<Character> {
        if self.is_empty() {
            return Err(Error::EmptyCart);
        }
        let total = self.total_price();
        if total > character.coins {
            return Err(Error::InsufficientFunds {
                needed: total,
                available: character.coins,
            });
        }

        let mut updated = character.clone();
        updated.coins -= total;
        for line in self.lines.drain(..) {
            for _ in 0..line.quantity {
                updated.inventory.push(line.item.clone());
            }
            let quantity = i32::try_from(line.quantity).unwrap_or(i32::MAX);
            for effect in &line.item.effects {
                let score = updated.abilities.get_mut(effect.stat);
                *score = score.saturating_add(effect.modifier.saturating_mul(quantity));
            }
        }

        tracing::info!(character = %updated.name, spent = total, coins = updated.coins, "purchase completed");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{Ability, ItemEffect, ItemKind};

    fn item(id: &str, name: &str, price: u32, effects: Vec<ItemEffect>) -> InventoryItem {
        InventoryItem {
            id: id.to_string(),
            name: name.to_string(),
            kind: ItemKind::Misc,
            description: format!("A fine {}", name.to_lowercase()),
            price,
            effects,
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            ShopItem {
                item: item("sword", "Longsword", 15, vec![]),
                in_stock: true,
                category: "weapons".to_string(),
            },
            ShopItem {
                item: item("shield", "Shield", 10, vec![]),
                in_stock: true,
                category: "armor".to_string(),
            },
            ShopItem {
                item: item("axe", "Battle Axe", 20, vec![]),
                in_stock: false,
                category: "weapons".to_string(),
            },
        ])
    }

    #[test]
    fn test_filter() {
        let shop = catalog();
        let ids = |it: Vec<&ShopItem>| it.iter().map(|e| e.item.id.clone()).collect::<Vec<_>>();

        assert_eq!(ids(shop.filter(None, "").collect()), vec!["sword", "shield"]);
        assert_eq!(ids(shop.filter(Some("weapons"), "").collect()), vec!["sword"]);
        assert_eq!(ids(shop.filter(None, "SHIELD").collect()), vec!["shield"]);
        assert_eq!(ids(shop.filter(None, "fine long").collect()), vec!["sword"]);
        assert!(shop.filter(None, "axe").next().is_none());
        assert!(shop.get("axe").is_some());
    }

    #[test]
    fn test_cart_stacks_and_totals() {
        let shop = catalog();
        let mut cart = Cart::new();
        cart.add(&shop.items[0].item);
        cart.add(&shop.items[0].item);
        cart.add(&shop.items[1].item);

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(cart.total_price(), 40);

        cart.remove("sword");
        assert_eq!(cart.total_price(), 10);
    }

    #[test]
    fn test_checkout_applies_purchase() {
        let gauntlets = item(
            "gauntlets",
            "Gauntlets of Might",
            20,
            vec![ItemEffect {
                stat: Ability::Strength,
                modifier: 1,
            }],
        );
        let hero = Character::new("Aria", "Human", "Fighter", 1);
        let mut cart = Cart::new();
        cart.add(&gauntlets);
        cart.add(&gauntlets);

        let updated = cart.checkout(&hero).unwrap();
        assert_eq!(updated.coins, 10);
        assert_eq!(updated.inventory.len(), 2);
        assert_eq!(updated.abilities.strength, 12);
        assert!(cart.is_empty());
        assert_eq!(hero.coins, 50);
    }

    #[test]
    fn test_checkout_effect_saturates() {
        let tome = item(
            "tome",
            "Tome of Boundless Might",
            0,
            vec![ItemEffect {
                stat: Ability::Strength,
                modifier: i32::MAX,
            }],
        );
        let hero = Character::new("Aria", "Human", "Fighter", 1);
        let mut cart = Cart::new();
        cart.add(&tome);
        cart.add(&tome);

        let updated = cart.checkout(&hero).unwrap();
        assert_eq!(updated.abilities.strength, i32::MAX);
    }

    #[test]
    fn test_checkout_insufficient_funds() {
        let hero = Character::new("Aria", "Human", "Fighter", 1);
        let mut cart = Cart::new();
        cart.add(&item("castle", "Castle", 1000, vec![]));

        assert!(matches!(
            cart.checkout(&hero),
            Err(Error::InsufficientFunds {
                needed: 1000,
                available: 50
            })
        ));
        assert!(!cart.is_empty());
    }

    #[test]
    fn test_checkout_empty_cart() {
        let hero = Character::new("Aria", "Human", "Fighter", 1);
        assert!(matches!(Cart::new().checkout(&hero), Err(Error::EmptyCart)));
    }

    #[test]
    fn test_catalog_json() {
        let json = r#"[{"id":"rope","name":"Rope","type":"misc","description":"50 ft","price":1,"inStock":true,"category":"gear"}]"#;
        let shop: Catalog = serde_json::from_str(json).unwrap();
        assert_eq!(shop.items[0].item.name, "Rope");
        assert_eq!(shop.items[0].category, "gear");
    }
}
