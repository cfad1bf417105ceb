//! Effect templates and their active instances

use serde::{Deserialize, Serialize};

use crate::core::dice::Dice;
use crate::core::error::{ensure, Result};
use crate::core::types::{EffectId, GameDate, GameSeconds};
use crate::items::item::DamageProfile;
use crate::stats::modifier::Modifier;

/// Inclusive range of game seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub min: GameSeconds,
    pub max: GameSeconds,
}

impl Span {
    pub fn fixed(seconds: GameSeconds) -> Self {
        Self {
            min: seconds,
            max: seconds,
        }
    }

    pub fn roll(&self, dice: &mut dyn Dice) -> GameSeconds {
        dice.range(self.min, self.max)
    }
}

fn default_chance() -> i64 {
    100
}

/// Effect template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub id: EffectId,
    pub name: String,
    /// Percent chance to take hold when attached
    #[serde(default = "default_chance")]
    pub chance: i64,
    #[serde(default)]
    pub duration: Option<Span>,
    /// Seconds between two damage ticks
    #[serde(default)]
    pub interval: Option<GameSeconds>,
    #[serde(default)]
    pub damage: Option<DamageProfile>,
    /// First tick lands on attach instead of one interval later
    #[serde(default)]
    pub apply_immediately: bool,
    /// Never expires on its own
    #[serde(default)]
    pub controlled: bool,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub next_effect: Option<EffectId>,
    #[serde(default)]
    pub cancel_effect: Option<EffectId>,
}

impl Effect {
    pub fn new(id: EffectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            chance: 100,
            duration: None,
            interval: None,
            damage: None,
            apply_immediately: false,
            controlled: false,
            modifiers: Vec::new(),
            next_effect: None,
            cancel_effect: None,
        }
    }

    /// One-shot effects deal their damage once, on attach
    pub fn is_one_shot(&self) -> bool {
        self.interval.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        ensure(
            (0..=100).contains(&self.chance),
            format!("effect {} has chance {} outside 0..=100", self.name, self.chance),
        )?;
        if let Some(span) = &self.duration {
            ensure(
                0 <= span.min && span.min <= span.max,
                format!("effect {} has an invalid duration", self.name),
            )?;
        }
        if let Some(interval) = self.interval {
            ensure(
                interval > 0,
                format!("effect {} has a non-positive interval", self.name),
            )?;
        }
        if let Some(damage) = &self.damage {
            damage.validate()?;
        }
        for modifier in &self.modifiers {
            modifier.validate()?;
        }
        ensure(
            self.next_effect != Some(self.id),
            format!("effect {} chains into itself", self.name),
        )
    }
}

/// An effect bound to a character or a campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub effect: EffectId,
    pub start_date: Option<GameDate>,
    pub end_date: Option<GameDate>,
    pub next_date: Option<GameDate>,
}

impl ActiveEffect {
    /// Instance not yet started
    pub fn pending(effect: EffectId) -> Self {
        Self {
            effect,
            start_date: None,
            end_date: None,
            next_date: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.start_date.is_none()
    }

    pub fn is_expired(&self, now: GameDate) -> bool {
        self.end_date.is_some_and(|end| end <= now)
    }

    /// Elapsed share of the duration, 0.0 to 1.0
    pub fn progress(&self, now: GameDate) -> Option<f64> {
        let (start, end) = (self.start_date?, self.end_date?);
        if end <= start {
            return Some(1.0);
        }
        Some(((now - start) as f64 / (end - start) as f64).clamp(0.0, 1.0))
    }
}
