// tutelle-core/src/infrastructure/mod.rs

pub mod config;
pub mod error;
pub mod fixtures;
pub mod fs;
pub mod report;

pub use fixtures::{FixtureSet, InMemoryRecordSource, load_fixtures};
