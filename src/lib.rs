//! Wasteland Rules - character and combat rules for a post-apocalyptic RPG

pub mod campaign;
pub mod combat;
pub mod core;
pub mod effects;
pub mod entity;
pub mod history;
pub mod items;
pub mod loot;
pub mod progression;
pub mod rolls;
pub mod rules;
pub mod stats;

pub use crate::campaign::{Campaign, TurnReport};
pub use crate::core::{Dice, Result, RulesConfig, RulesError, ScriptedDice, SeededDice};
pub use crate::entity::Character;
pub use crate::history::{DamageHistory, FightHistory, FightStatus, RollHistory};
pub use crate::rules::{Catalog, RulesContext};
