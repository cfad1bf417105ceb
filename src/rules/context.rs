//! Everything a rule resolution reads but never owns

use crate::core::config::RulesConfig;
use crate::core::dice::Dice;
use crate::core::error::Result;
use crate::core::types::GameDate;
use crate::effects::effect::ActiveEffect;
use crate::entity::character::Character;
use crate::rules::loader::Catalog;
use crate::stats::calculator::{DerivedStats, StatsCalculator};

/// Constants, templates, the campaign clock and campaign-wide effects
#[derive(Debug, Clone, Copy)]
pub struct RulesContext<'a> {
    pub config: &'a RulesConfig,
    pub catalog: &'a Catalog,
    /// Current game date
    pub now: GameDate,
    pub campaign_effects: &'a [ActiveEffect],
}

impl<'a> RulesContext<'a> {
    pub fn new(config: &'a RulesConfig, catalog: &'a Catalog) -> Self {
        Self {
            config,
            catalog,
            now: 0,
            campaign_effects: &[],
        }
    }

    pub fn at(mut self, now: GameDate) -> Self {
        self.now = now;
        self
    }

    pub fn with_campaign_effects(mut self, effects: &'a [ActiveEffect]) -> Self {
        self.campaign_effects = effects;
        self
    }

    pub fn calculator(&self) -> StatsCalculator<'a> {
        StatsCalculator::new(self.config, self.catalog)
    }

    /// Fresh derived stats for `character`
    pub fn stats(&self, character: &Character, dice: &mut dyn Dice) -> Result<DerivedStats> {
        self.calculator()
            .compute(character, self.campaign_effects, dice)
    }
}
