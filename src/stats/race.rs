//! Racial templates: a `(bonus, min, max)` entry per affected stat

use serde::{Deserialize, Serialize};

use crate::stats::ids::{Leveled, Protection, Secondary, Special, StatId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Race {
    Human,
    Ghoul,
    SuperMutant,
    Deathclaw,
    Robot,
    Animal,
}

/// One line of a racial template
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaceEntry {
    pub bonus: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

const fn bounded(bonus: f64, min: f64, max: f64) -> RaceEntry {
    RaceEntry {
        bonus,
        min: Some(min),
        max: Some(max),
    }
}

const fn flat(bonus: f64) -> RaceEntry {
    RaceEntry {
        bonus,
        min: None,
        max: None,
    }
}

/// S.P.E.C.I.A.L. bounds per race, in [`Special::all`] order
fn special_bounds(race: Race) -> [(f64, f64); 7] {
    match race {
        Race::Human => [(1., 10.); 7],
        Race::Ghoul => [(1., 8.), (4., 13.), (1., 10.), (1., 6.), (2., 10.), (1., 10.), (5., 12.)],
        Race::SuperMutant => [(5., 13.), (1., 11.), (4., 11.), (1., 7.), (1., 8.), (1., 8.), (1., 10.)],
        Race::Deathclaw => [(6., 14.), (4., 12.), (1., 13.), (1., 3.), (1., 4.), (6., 16.), (1., 10.)],
        Race::Robot => [(7., 12.), (7., 12.), (7., 12.), (1., 1.), (1., 12.), (1., 12.), (5., 5.)],
        Race::Animal => [(1., 7.), (4., 14.), (1., 6.), (1., 5.), (1., 3.), (1., 15.), (1., 10.)],
    }
}

impl Race {
    pub fn all() -> [Race; 6] {
        [
            Race::Human,
            Race::Ghoul,
            Race::SuperMutant,
            Race::Deathclaw,
            Race::Robot,
            Race::Animal,
        ]
    }

    /// Creatures fight on instinct: their level can stand in for a weapon skill
    pub fn is_creature(&self) -> bool {
        matches!(self, Race::Deathclaw | Race::Animal)
    }

    /// Template entry for a stat, if the race touches it
    pub fn entry(&self, stat: StatId) -> Option<RaceEntry> {
        if let StatId::Special(special) = stat {
            let (min, max) = special_bounds(*self)[special as usize];
            return Some(bounded(0.0, min, max));
        }
        use Protection as P;
        let entry = match (self, stat) {
            (Race::Human, StatId::Resistance(P::Electricity)) => bounded(30.0, -100.0, 100.0),
            (Race::Human, StatId::Leveled(Leveled::PerkRate)) => flat(2.0),

            (Race::Ghoul, StatId::Resistance(P::Radiation)) => bounded(80.0, -100.0, 100.0),
            (Race::Ghoul, StatId::Resistance(P::Poison)) => bounded(30.0, -100.0, 100.0),
            (Race::Ghoul, StatId::Leveled(Leveled::PerkRate)) => flat(3.0),

            (Race::SuperMutant, StatId::Resistance(P::Damage)) => bounded(25.0, -100.0, 100.0),
            (Race::SuperMutant, StatId::Resistance(P::Radiation)) => bounded(50.0, -100.0, 100.0),
            (Race::SuperMutant, StatId::Resistance(P::Poison)) => bounded(20.0, -100.0, 100.0),
            (Race::SuperMutant, StatId::Resistance(P::Fire)) => bounded(25.0, -100.0, 100.0),
            (Race::SuperMutant, StatId::Leveled(Leveled::HitPointsPerLevel)) => flat(2.0),
            (Race::SuperMutant, StatId::Leveled(Leveled::PerkRate)) => flat(3.0),

            (Race::Deathclaw, StatId::Secondary(Secondary::MeleeDamage)) => flat(5.0),
            (Race::Deathclaw, StatId::Resistance(P::Damage)) => bounded(40.0, -100.0, 100.0),
            (Race::Deathclaw, StatId::Threshold(P::Damage)) => flat(4.0),
            (Race::Deathclaw, StatId::Leveled(Leveled::HitPointsPerLevel)) => flat(2.0),
            (Race::Deathclaw, StatId::Leveled(Leveled::PerkRate)) => flat(3.0),

            (Race::Robot, StatId::Secondary(Secondary::HealingRate)) => bounded(0.0, 0.0, 0.0),
            (Race::Robot, StatId::Resistance(P::Damage)) => bounded(40.0, -100.0, 100.0),
            (Race::Robot, StatId::Resistance(P::Radiation)) => bounded(100.0, -100.0, 100.0),
            (Race::Robot, StatId::Resistance(P::Poison)) => bounded(100.0, -100.0, 100.0),
            (Race::Robot, StatId::Resistance(P::Fire)) => bounded(40.0, -100.0, 100.0),
            (Race::Robot, StatId::Resistance(P::Electricity)) => bounded(-50.0, -100.0, 100.0),
            (Race::Robot, StatId::Resistance(P::GasContact)) => bounded(100.0, -100.0, 100.0),
            (Race::Robot, StatId::Resistance(P::GasInhaled)) => bounded(100.0, -100.0, 100.0),
            (Race::Robot, StatId::Leveled(Leveled::HitPointsPerLevel)) => bounded(0.0, 0.0, 0.0),
            (Race::Robot, StatId::Leveled(Leveled::PerkRate)) => flat(10.0),

            (Race::Animal, StatId::Leveled(Leveled::PerkRate)) => flat(10.0),

            _ => return None,
        };
        Some(entry)
    }

    /// Every stat the template touches, with its entry
    pub fn entries(&self) -> Vec<(StatId, RaceEntry)> {
        StatId::editable()
            .into_iter()
            .filter_map(|stat| self.entry(stat).map(|entry| (stat, entry)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_special_bounds() {
        let entry = Race::Human.entry(StatId::Special(Special::Strength)).unwrap();
        assert_eq!(entry.bonus, 0.0);
        assert_eq!(entry.min, Some(1.0));
        assert_eq!(entry.max, Some(10.0));
    }

    #[test]
    fn test_robots_do_not_heal() {
        let entry = Race::Robot
            .entry(StatId::Secondary(Secondary::HealingRate))
            .unwrap();
        assert_eq!(entry.max, Some(0.0));
        let hppl = Race::Robot
            .entry(StatId::Leveled(Leveled::HitPointsPerLevel))
            .unwrap();
        assert_eq!(hppl.max, Some(0.0));
    }

    #[test]
    fn test_robots_shrug_off_gas_like_poison() {
        // Resistances are percentages: robots are as immune to gas as to poison
        let poison = Race::Robot.entry(StatId::Resistance(Protection::Poison)).unwrap();
        for gas in [Protection::GasContact, Protection::GasInhaled] {
            let entry = Race::Robot.entry(StatId::Resistance(gas)).unwrap();
            assert_eq!(entry.bonus, 100.0);
            assert_eq!(entry, poison);
        }
    }

    #[test]
    fn test_every_race_has_a_perk_rate() {
        for race in Race::all() {
            let entry = race.entry(StatId::Leveled(Leveled::PerkRate));
            assert!(entry.map(|e| e.bonus > 0.0).unwrap_or(false), "{race:?}");
        }
    }

    #[test]
    fn test_untouched_stat() {
        assert!(Race::Human
            .entry(StatId::Secondary(Secondary::Sequence))
            .is_none());
        assert_eq!(Race::Ghoul.entries().len(), 7 + 3);
    }
}
