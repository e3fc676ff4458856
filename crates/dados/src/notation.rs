// ABOUTME: Structured dice notation value ("2d6+3") and its lenient parse.
// ABOUTME: Malformed notation degrades to a zero-valued roll instead of failing.

use crate::error::{Error, Result};
use crate::parser;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Upper bound on dice per notation.
pub const MAX_DICE: u32 = 1000;

/// A parsed `<count>d<sides>[+/-modifier]` notation.
///
/// `sides == 0` marks the degenerate spec produced for unparsable text; it
/// evaluates to a single result of 0 and a total of 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiceSpec {
    /// Number of dice to roll.
    pub count: u32,
    /// Faces per die.
    pub sides: u32,
    /// Flat value added to the sum of the dice.
    pub modifier: i32,
}

impl DiceSpec {
    pub const DEGENERATE: DiceSpec = DiceSpec {
        count: 1,
        sides: 0,
        modifier: 0,
    };

    pub fn new(count: u32, sides: u32, modifier: i32) -> Self {
        Self {
            count,
            sides,
            modifier,
        }
    }

    /// True for the fallback spec of unparsable notation.
    pub fn is_degenerate(&self) -> bool {
        self.sides == 0
    }

    /// Smallest total this spec can produce.
    pub fn min(&self) -> i64 {
        if self.is_degenerate() {
            return 0;
        }
        self.count as i64 + self.modifier as i64
    }

    /// Largest total this spec can produce.
    pub fn max(&self) -> i64 {
        if self.is_degenerate() {
            return 0;
        }
        self.count as i64 * self.sides as i64 + self.modifier as i64
    }
}

impl Default for DiceSpec {
    fn default() -> Self {
        Self::DEGENERATE
    }
}

impl fmt::Display for DiceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        match self.modifier {
            0 => Ok(()),
            m if m > 0 => write!(f, "+{}", m),
            m => write!(f, "{}", m),
        }
    }
}

impl FromStr for DiceSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parser::parse(s)
    }
}

impl Serialize for DiceSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DiceSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(parse_notation(&text))
    }
}

/// Parse author-entered notation, falling back to [`DiceSpec::DEGENERATE`].
///
/// The leftmost `<count>d<sides>[+/-modifier]` anywhere in the text is used,
/// so `"1d8+2 slashing"` reads as `1d8+2`. Never fails.
pub fn parse_notation(text: &str) -> DiceSpec {
    match parser::find(text) {
        Ok(Some(spec)) => spec,
        Ok(None) => {
            tracing::warn!(notation = text, "no dice notation found, using zero roll");
            DiceSpec::DEGENERATE
        }
        Err(err) => {
            tracing::warn!(notation = text, error = %err, "invalid dice notation, using zero roll");
            DiceSpec::DEGENERATE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_notation_examples() {
        assert_eq!(parse_notation("2d6+3"), DiceSpec::new(2, 6, 3));
        assert_eq!(parse_notation("1d20-1"), DiceSpec::new(1, 20, -1));
        assert_eq!(parse_notation("4d8"), DiceSpec::new(4, 8, 0));
        assert_eq!(parse_notation("1D6"), DiceSpec::new(1, 6, 0));
    }

    #[test]
    fn test_parse_notation_garbage_is_degenerate() {
        let spec = parse_notation("garbage");
        assert_eq!(spec, DiceSpec::DEGENERATE);
        assert!(spec.is_degenerate());
        assert_eq!(spec.min(), 0);
        assert_eq!(spec.max(), 0);
    }

    #[test]
    fn test_parse_notation_out_of_range_is_degenerate() {
        assert!(parse_notation("0d6").is_degenerate());
        assert!(parse_notation("2d0").is_degenerate());
        assert!(parse_notation("5000d6").is_degenerate());
    }

    #[test]
    fn test_display() {
        assert_eq!(DiceSpec::new(2, 6, 3).to_string(), "2d6+3");
        assert_eq!(DiceSpec::new(1, 20, -1).to_string(), "1d20-1");
        assert_eq!(DiceSpec::new(4, 8, 0).to_string(), "4d8");
        assert_eq!(DiceSpec::DEGENERATE.to_string(), "1d0");
    }

    #[test]
    fn test_from_str_is_strict() {
        assert_eq!("2d6+3".parse::<DiceSpec>().unwrap(), DiceSpec::new(2, 6, 3));
        assert!("2d6 fire".parse::<DiceSpec>().is_err());
    }

    #[test]
    fn test_min_max() {
        let spec = DiceSpec::new(2, 6, 3);
        assert_eq!(spec.min(), 5);
        assert_eq!(spec.max(), 15);
    }

    #[test]
    fn test_serde_uses_notation_string() {
        let json = serde_json::to_string(&DiceSpec::new(1, 8, 2)).unwrap();
        assert_eq!(json, "\"1d8+2\"");

        let spec: DiceSpec = serde_json::from_str("\"1d6+2\"").unwrap();
        assert_eq!(spec, DiceSpec::new(1, 6, 2));

        let spec: DiceSpec = serde_json::from_str("\"a big stick\"").unwrap();
        assert!(spec.is_degenerate());
    }
}
