// tutelle-core/src/lib.rs

// 1. Documentation
#![allow(missing_docs)]
// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- MODULES HEXAGONAUX ---

// 1. Ports (Interfaces / Traits)
// Contrat d'accès aux enregistrements (RecordSource).
pub mod ports;

// 2. Domain (Cœur du métier)
// Rôles, politique de visibilité, masquage, périmètre de requête.
// Ne dépend de RIEN d'autre (ni infra, ni app).
pub mod domain;

// 3. Infrastructure (Adapters)
// Fichiers de configuration, fixtures, rendu Markdown.
pub mod infrastructure;

// 4. Application (Use Cases)
// Moteur d'accès, matrice de décisions, scaffolding.
pub mod application;

// --- GESTION DES ERREURS GLOBALE ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use application::AccessEngine;
pub use error::TutelleError;
