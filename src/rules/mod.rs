//! Static catalogs and the context every rule reads

pub mod context;
pub mod loader;

pub use context::RulesContext;
pub use loader::Catalog;
