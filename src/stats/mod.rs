//! Statistics: identifiers, racial templates, formulas and the derived view

pub mod block;
pub mod cache;
pub mod calculator;
pub mod formulas;
pub mod ids;
pub mod modifier;
pub mod race;

pub use block::StatBlock;
pub use cache::StatsCache;
pub use calculator::{DerivedStats, StatsCalculator};
pub use ids::{General, Leveled, Protection, Secondary, Skill, Special, StatId};
pub use modifier::{Modifier, StatDelta};
pub use race::Race;
