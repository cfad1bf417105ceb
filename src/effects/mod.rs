//! Timed effects: templates, instances and their lifecycle

pub mod effect;
pub mod engine;

pub use effect::{ActiveEffect, Effect, Span};
pub use engine::{affect, tick_character, EffectOutcome};
