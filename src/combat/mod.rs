//! Damage, single attacks and bursts

pub mod body_part;
pub mod burst;
pub mod damage;
pub mod damage_type;
pub mod fight;

pub use body_part::BodyPart;
pub use burst::{burst, BurstTarget};
pub use damage::{damage, resolve_damage, DamageRequest};
pub use damage_type::DamageType;
pub use fight::{fight, range_penalty, FightRequest};
