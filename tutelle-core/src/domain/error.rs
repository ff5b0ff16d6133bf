// tutelle-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum DomainError {
    #[error("Unknown role: '{0}'")]
    #[diagnostic(
        code(tutelle::domain::unknown_role),
        help("Valid roles: admin, medecin, soignant, assistant_social, logisticien, donateur, parrain, visiteur.")
    )]
    UnknownRole(String),

    #[error("Unknown capability: '{0}'")]
    #[diagnostic(code(tutelle::domain::unknown_capability))]
    UnknownCapability(String),

    #[error("Unknown entity type: '{0}'")]
    #[diagnostic(code(tutelle::domain::unknown_entity))]
    UnknownEntity(String),

    #[error("No access policy configured for entity '{entity}'")]
    #[diagnostic(
        code(tutelle::domain::missing_entity_policy),
        help("Declare the entity under 'entities:' in entities.yml.")
    )]
    MissingEntityPolicy { entity: String },

    #[error("Missing sensitivity entry for entity '{entity}' and role '{role}'")]
    #[diagnostic(
        code(tutelle::domain::missing_sensitivity),
        help("Every public role of an entity needs a 'sensitivity' entry listing the fields to strip or mask.")
    )]
    MissingSensitivityEntry { entity: String, role: String },

    #[error("Invalid field pattern '{pattern}': {reason}")]
    #[diagnostic(
        code(tutelle::domain::field_pattern),
        help("Field patterns are snake_case names, optionally with '*' wildcards (ex: emergency_contact_*).")
    )]
    InvalidFieldPattern { pattern: String, reason: String },

    #[error("Invalid access policy: {0}")]
    #[diagnostic(code(tutelle::domain::policy))]
    InvalidPolicy(String),
}
