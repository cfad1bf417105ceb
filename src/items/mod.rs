//! Item templates, owned stacks and the operations on them

pub mod equipment;
pub mod inventory;
pub mod item;

pub use equipment::Equipment;
pub use inventory::{drop_item, equip, reload, repair, unequip, use_item};
pub use item::{DamageProfile, Guard, Item, ItemType, WeaponMode};
