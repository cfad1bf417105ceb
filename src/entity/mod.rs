pub mod character;
pub mod lifecycle;
pub mod needs;

pub use character::Character;
pub use lifecycle::{settle, Intent};
pub use needs::update_needs;
