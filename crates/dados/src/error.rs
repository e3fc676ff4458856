// ABOUTME: Error types for the dados library.
// ABOUTME: Covers notation parsing, encounter validation, hand-off decoding, combat flow and checkout.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unexpected character '{0}' at position {1}")]
    UnexpectedChar(char, usize),

    #[error("Unexpected end of input")]
    UnexpectedEof,

    #[error("Expected {expected}, found {found}")]
    Expected { expected: String, found: String },

    #[error("Invalid dice count: {0}")]
    InvalidDiceCount(u32),

    #[error("Invalid dice sides: {0}")]
    InvalidDiceSides(u32),

    #[error("Dice pool is empty")]
    EmptyPool,

    #[error("Encounter '{0}' has no enemies")]
    NoEnemies(String),

    #[error("Enemy '{name}' has invalid health {health}")]
    InvalidEnemyHealth { name: String, health: i32 },

    #[error("Character '{0}' cannot fight with no health")]
    PlayerDowned(String),

    #[error("Malformed combat payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("Unsupported payload type '{0}'")]
    WrongPayloadType(String),

    #[error("{action} is not allowed while {phase}")]
    ActionNotAllowed { action: &'static str, phase: String },

    #[error("Combat session has already concluded")]
    Concluded,

    #[error("Combat did not conclude within {0} rounds")]
    RoundLimit(u32),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Insufficient funds: need {needed} coins, have {available}")]
    InsufficientFunds { needed: u32, available: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;
