pub mod access;
pub mod error;
pub mod project;

// Re-exports pratiques pour simplifier les imports ailleurs
pub use error::DomainError;
