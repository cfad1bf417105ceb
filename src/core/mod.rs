pub mod config;
pub mod dice;
pub mod error;
pub mod types;

pub use config::RulesConfig;
pub use dice::{Dice, ScriptedDice, SeededDice};
pub use error::{Result, RulesError};
