// tutelle-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(tutelle::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- CONFIG / YAML ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(tutelle::infra::yaml),
        help("Check your YAML syntax (indentation, types, role names).")
    )]
    YamlError(#[from] serde_yaml::Error),

    // --- FIXTURES / JSON ---
    #[error("JSON Parsing Error: {0}")]
    #[diagnostic(
        code(tutelle::infra::json),
        help("Fixture records must be a JSON object or an array of objects.")
    )]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    #[diagnostic(code(tutelle::infra::config))]
    ConfigError(String),

    #[error("Project configuration not found at '{0}'")]
    #[diagnostic(code(tutelle::infra::config_missing))]
    ConfigNotFound(String),

    // --- TEMPLATING ---
    #[error("Template Rendering Error: {0}")]
    #[diagnostic(
        code(tutelle::infra::template),
        help("Check the Jinja syntax ({{ ... }}) of the report template.")
    )]
    TemplateError(#[from] minijinja::Error),
}
