// tutelle-core/src/application/mod.rs

pub mod engine;
pub mod init;
pub mod matrix;
pub mod ports;

// --- RE-EXPORTS (FACADE PATTERN) ---
// `use tutelle_core::application::{AccessEngine, build_matrix};`

pub use engine::{AccessEngine, RecordView};
pub use init::{InitReport, init_project};
pub use matrix::{MatrixReport, build_matrix};
