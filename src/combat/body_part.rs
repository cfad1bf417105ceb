//! Body parts for aimed and random hit locations

use serde::{Deserialize, Serialize};

use crate::core::dice::Dice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    #[default]
    Torso,
    Legs,
    Arms,
    Head,
    Eyes,
}

/// Hit and critical adjustments for a body part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartModifiers {
    pub ranged_hit: i64,
    pub melee_hit: i64,
    pub critical: i64,
    /// Percentage added to critical damage
    pub critical_damage: i64,
}

impl BodyPart {
    pub fn all() -> [BodyPart; 5] {
        [
            BodyPart::Torso,
            BodyPart::Legs,
            BodyPart::Arms,
            BodyPart::Head,
            BodyPart::Eyes,
        ]
    }

    pub fn modifiers(&self) -> PartModifiers {
        let (ranged_hit, melee_hit, critical, critical_damage) = match self {
            BodyPart::Torso => (0, 0, 0, 0),
            BodyPart::Legs => (-20, -10, 5, 0),
            BodyPart::Arms => (-30, -15, 10, 0),
            BodyPart::Head => (-40, -20, 15, 25),
            BodyPart::Eyes => (-60, -30, 20, 50),
        };
        PartModifiers {
            ranged_hit,
            melee_hit,
            critical,
            critical_damage,
        }
    }

    /// Hit-chance adjustment for the attack style
    pub fn hit_modifier(&self, melee: bool) -> i64 {
        let modifiers = self.modifiers();
        if melee {
            modifiers.melee_hit
        } else {
            modifiers.ranged_hit
        }
    }

    /// Helmets cover the head, everything else is covered by armor
    pub fn covered_by_helmet(&self) -> bool {
        matches!(self, BodyPart::Head | BodyPart::Eyes)
    }

    /// Sample a hit location; luck narrows every roll toward the rare parts
    pub fn random(dice: &mut dyn Dice, luck: i64) -> BodyPart {
        const CHANCES: [(BodyPart, i64); 5] = [
            (BodyPart::Eyes, 1),
            (BodyPart::Head, 2),
            (BodyPart::Arms, 5),
            (BodyPart::Legs, 10),
            (BodyPart::Torso, 100),
        ];
        for (part, chance) in CHANCES {
            let shift = dice.range(0, luck.max(0));
            if dice.range(1, (100 - shift).max(1)) < chance {
                return part;
            }
        }
        BodyPart::Torso
    }
}
