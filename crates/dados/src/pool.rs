// ABOUTME: Dice tray: a pool of standard dice with a flat modifier.
// ABOUTME: d20s honour advantage/disadvantage and natural 20s/1s are flagged.

use crate::error::{Error, Result};
use crate::roller::{
    roll_dice_with_rng, roll_with_advantage_with_rng, roll_with_disadvantage_with_rng, FastRng,
    Rng, RollOutcome,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Most dice of one kind a pool will hold.
pub const MAX_PER_KIND: u32 = 10;

/// The standard polyhedral set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DieKind {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
    D100,
}

impl DieKind {
    pub const ALL: [DieKind; 7] = [
        DieKind::D4,
        DieKind::D6,
        DieKind::D8,
        DieKind::D10,
        DieKind::D12,
        DieKind::D20,
        DieKind::D100,
    ];

    pub fn sides(self) -> u32 {
        match self {
            DieKind::D4 => 4,
            DieKind::D6 => 6,
            DieKind::D8 => 8,
            DieKind::D10 => 10,
            DieKind::D12 => 12,
            DieKind::D20 => 20,
            DieKind::D100 => 100,
        }
    }
}

impl fmt::Display for DieKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum RollMode {
    #[default]
    Normal,
    Advantage,
    Disadvantage,
}

/// Notable d20 results in a pool roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Highlight {
    Critical,
    Fumble,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DicePool {
    counts: BTreeMap<DieKind, u32>,
    pub modifier: i32,
    pub mode: RollMode,
}

impl DicePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or with a negative `change`, remove) dice of one kind.
    pub fn adjust(&mut self, kind: DieKind, change: i32) {
        let current = self.count(kind) as i64;
        let next = (current + change as i64).clamp(0, MAX_PER_KIND as i64) as u32;
        if next == 0 {
            self.counts.remove(&kind);
        } else {
            self.counts.insert(kind, next);
        }
    }

    pub fn with(mut self, kind: DieKind, count: u32) -> Self {
        self.adjust(kind, count.min(MAX_PER_KIND) as i32 - self.count(kind) as i32);
        self
    }

    pub fn count(&self, kind: DieKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn clear(&mut self) {
        self.counts.clear();
        self.modifier = 0;
        self.mode = RollMode::Normal;
    }

    pub fn roll(&self) -> Result<PoolRoll> {
        self.roll_with_rng(&mut FastRng::new())
    }

    pub fn roll_with_rng(&self, rng: &mut impl Rng) -> Result<PoolRoll> {
        if self.is_empty() {
            return Err(Error::EmptyPool);
        }

        let mut entries = Vec::with_capacity(self.counts.len());
        for (&kind, &count) in &self.counts {
            let outcome = match (kind, self.mode) {
                (DieKind::D20, RollMode::Advantage) => roll_with_advantage_with_rng(20, rng),
                (DieKind::D20, RollMode::Disadvantage) => roll_with_disadvantage_with_rng(20, rng),
                _ => roll_dice_with_rng(kind.sides(), count, rng),
            };
            let kept = match (kind, self.mode) {
                (DieKind::D20, RollMode::Advantage | RollMode::Disadvantage) => {
                    vec![outcome.total as u32]
                }
                _ => outcome.results.clone(),
            };
            entries.push(PoolEntry {
                kind,
                count,
                outcome,
                kept,
            });
        }

        let total = entries.iter().map(|e| e.outcome.total).sum::<i64>() + self.modifier as i64;
        tracing::debug!(dice = entries.len(), total, "rolled dice pool");
        Ok(PoolRoll {
            entries,
            modifier: self.modifier,
            mode: self.mode,
            total,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolEntry {
    pub kind: DieKind,
    pub count: u32,
    pub outcome: RollOutcome,
    /// Values that count toward the total; only the kept die for an
    /// advantage or disadvantage roll.
    pub kept: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolRoll {
    pub entries: Vec<PoolEntry>,
    pub modifier: i32,
    pub mode: RollMode,
    pub total: i64,
}

impl PoolRoll {
    /// `Critical` for any natural 20 on a d20, else `Fumble` for a natural 1.
    pub fn highlight(&self) -> Option<Highlight> {
        let d20s: Vec<u32> = self
            .entries
            .iter()
            .filter(|e| e.kind == DieKind::D20)
            .flat_map(|e| e.kept.iter().copied())
            .collect();
        if d20s.contains(&20) {
            Some(Highlight::Critical)
        } else if d20s.contains(&1) {
            Some(Highlight::Fumble)
        } else {
            None
        }
    }
}

impl fmt::Display for PoolRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.entries.iter().map(|e| e.outcome.to_string()).collect();
        write!(f, "{}", parts.join("; "))?;
        if self.modifier != 0 {
            write!(f, "; modifier {:+}", self.modifier)?;
        }
        write!(f, " => {}", self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roller::tests::TestRng;

    #[test]
    fn test_adjust_clamps() {
        let mut pool = DicePool::new();
        pool.adjust(DieKind::D6, 3);
        pool.adjust(DieKind::D6, 20);
        assert_eq!(pool.count(DieKind::D6), MAX_PER_KIND);
        pool.adjust(DieKind::D6, -50);
        assert_eq!(pool.count(DieKind::D6), 0);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_empty_pool_is_error() {
        assert!(matches!(DicePool::new().roll(), Err(Error::EmptyPool)));
    }

    #[test]
    fn test_pool_total_includes_modifier() {
        let mut pool = DicePool::new().with(DieKind::D6, 2).with(DieKind::D8, 1);
        pool.modifier = 3;
        // BTreeMap order: d6 first, then d8
        let mut rng = TestRng::new(vec![2, 5, 7]);
        let roll = pool.roll_with_rng(&mut rng).unwrap();
        assert_eq!(roll.entries[0].outcome.results, vec![2, 5]);
        assert_eq!(roll.entries[1].outcome.results, vec![7]);
        assert_eq!(roll.total, 17);
        assert_eq!(roll.highlight(), None);
    }

    #[test]
    fn test_advantage_replaces_d20_count() {
        let mut pool = DicePool::new().with(DieKind::D20, 3);
        pool.mode = RollMode::Advantage;
        let mut rng = TestRng::new(vec![3, 12]);
        let roll = pool.roll_with_rng(&mut rng).unwrap();
        assert_eq!(rng.consumed(), 2);
        assert_eq!(roll.total, 12);
    }

    #[test]
    fn test_mode_does_not_touch_other_dice() {
        let mut pool = DicePool::new().with(DieKind::D4, 2);
        pool.mode = RollMode::Disadvantage;
        let mut rng = TestRng::new(vec![4, 1]);
        let roll = pool.roll_with_rng(&mut rng).unwrap();
        assert_eq!(roll.total, 5);
        assert_eq!(roll.entries[0].kept, vec![4, 1]);
    }

    #[test]
    fn test_highlights() {
        let pool = DicePool::new().with(DieKind::D20, 2);
        let roll = pool.roll_with_rng(&mut TestRng::new(vec![1, 20])).unwrap();
        assert_eq!(roll.highlight(), Some(Highlight::Critical));

        let roll = pool.roll_with_rng(&mut TestRng::new(vec![1, 8])).unwrap();
        assert_eq!(roll.highlight(), Some(Highlight::Fumble));

        // a discarded natural 20 under disadvantage is not a critical
        let mut pool = DicePool::new().with(DieKind::D20, 1);
        pool.mode = RollMode::Disadvantage;
        let roll = pool.roll_with_rng(&mut TestRng::new(vec![20, 9])).unwrap();
        assert_eq!(roll.total, 9);
        assert_eq!(roll.highlight(), None);
    }

    #[test]
    fn test_clear() {
        let mut pool = DicePool::new().with(DieKind::D12, 1);
        pool.modifier = 2;
        pool.mode = RollMode::Advantage;
        pool.clear();
        assert_eq!(pool, DicePool::new());
    }
}
