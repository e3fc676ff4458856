// ABOUTME: Wire payload used to hand an encounter from the narrator's device to a player's.
// ABOUTME: JSON `{type: "combat", encounter, timestamp}`, compacted to fit in a QR code.

use crate::encounter::Encounter;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// The only payload type understood by players.
pub const COMBAT_PAYLOAD_TYPE: &str = "combat";

/// Attacks kept per enemy in a compacted payload.
pub const MAX_ATTACKS_PER_ENEMY: usize = 2;

/// Reward items kept in a compacted payload.
pub const MAX_REWARD_ITEMS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub encounter: Encounter,
    /// Unix time in milliseconds when the payload was produced.
    pub timestamp: i64,
}

impl CombatPayload {
    /// Wrap an encounter, trimming attack and reward lists to payload limits.
    pub fn new(encounter: &Encounter) -> Self {
        let mut encounter = encounter.clone();
        for enemy in &mut encounter.enemies {
            enemy.attacks.truncate(MAX_ATTACKS_PER_ENEMY);
        }
        encounter.rewards.items.truncate(MAX_REWARD_ITEMS);

        Self {
            kind: COMBAT_PAYLOAD_TYPE.to_string(),
            encounter,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode scanned text, rejecting anything that cannot start a fight.
    pub fn decode(text: &str) -> Result<Self> {
        let payload: CombatPayload = serde_json::from_str(text).map_err(|err| {
            tracing::warn!(error = %err, "rejected malformed combat payload");
            err
        })?;

        if payload.kind != COMBAT_PAYLOAD_TYPE {
            tracing::warn!(kind = %payload.kind, "rejected non-combat payload");
            return Err(Error::WrongPayloadType(payload.kind));
        }
        payload.encounter.validate()?;

        tracing::debug!(
            encounter = %payload.encounter.name,
            enemies = payload.encounter.enemies.len(),
            "decoded combat payload"
        );
        Ok(payload)
    }
}
