// tutelle-core/src/error.rs

use crate::domain::access::decision::AccessError;
use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum TutelleError {
    // --- ERREURS DU DOMAINE (Rôles, Politique, Sensibilité) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Domain(#[from] DomainError),

    // --- ERREURS D'INFRASTRUCTURE (IO, Parsing) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- REFUS D'ACCÈS (forme uniforme) ---
    #[error(transparent)]
    #[diagnostic(code(tutelle::access::denied))]
    Access(#[from] AccessError),

    // --- ERREURS GÉNÉRIQUES / APPLICATIVES ---
    #[error("Internal Error: {0}")]
    InternalError(String),

    #[error("Unsafe path traversal detected: {0}")]
    #[diagnostic(code(tutelle::unsafe_path))]
    UnsafePath(String),
}

// Manual implementation to avoid duplicate enum variant but keep ergonomics
impl From<std::io::Error> for TutelleError {
    fn from(err: std::io::Error) -> Self {
        TutelleError::Infrastructure(InfrastructureError::Io(err))
    }
}
