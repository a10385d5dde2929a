pub mod clock;
pub mod config;
pub mod constants;
pub mod effects;
pub mod error;
pub mod grid;
pub mod placement;
pub mod rng;
pub mod runtime;
pub mod score_store;
pub mod session;
pub mod types;
