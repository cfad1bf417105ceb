use thiserror::Error;

use crate::core::types::{EffectId, EquipmentId, ItemId, LootId, LootTemplateId};

#[derive(Error, Debug)]
pub enum RulesError {
    /// A caller asked for something the rules forbid (not enough AP, bad slot, min > max...)
    #[error("Rule violation: {0}")]
    RuleViolation(String),

    #[error("Item not found in catalog: {0:?}")]
    UnknownItem(ItemId),

    #[error("Effect not found in catalog: {0:?}")]
    UnknownEffect(EffectId),

    #[error("Equipment not found in inventory: {0:?}")]
    UnknownEquipment(EquipmentId),

    #[error("Loot template not found in catalog: {0:?}")]
    UnknownLootTemplate(LootTemplateId),

    #[error("Loot not found in campaign: {0:?}")]
    UnknownLoot(LootId),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl RulesError {
    pub fn violation(reason: impl Into<String>) -> Self {
        Self::RuleViolation(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, RulesError>;

/// Return a rule violation unless `condition` holds
pub fn ensure(condition: bool, reason: impl Into<String>) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(RulesError::violation(reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure() {
        assert!(ensure(true, "never").is_ok());
        let err = ensure(false, "not enough action points").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Rule violation: not enough action points"
        );
    }
}
