// tutelle-core/src/domain/access/redactor.rs

use regex::Regex;
use serde_json::Value;

use crate::domain::access::decision::{AccessDecision, AccessError, RedactionPlan};
use crate::domain::access::masking::MaskingStrategy;
use crate::domain::access::record::OutputMapping;
use crate::domain::error::DomainError;

/// Turns a decision into the externally safe projection of a record.
/// This function is PURE: it only looks at the decision and the field values.
#[derive(Debug, Clone)]
pub struct FieldRedactor {
    mask_token: String,
    email: Regex,
}

impl FieldRedactor {
    pub fn new(mask_token: impl Into<String>) -> Result<Self, DomainError> {
        let email = Regex::new(r"^(.)[^@]*(@.*)$")
            .map_err(|e| DomainError::InvalidPolicy(format!("email mask regex: {}", e)))?;
        Ok(Self {
            mask_token: mask_token.into(),
            email,
        })
    }

    pub fn mask_token(&self) -> &str {
        &self.mask_token
    }

    /// All-or-nothing on denial: the error carries no field.
    pub fn apply(
        &self,
        decision: &AccessDecision,
        fields: &OutputMapping,
    ) -> Result<OutputMapping, AccessError> {
        match decision {
            AccessDecision::FullAccess => Ok(fields.clone()),
            AccessDecision::Redacted(plan) => Ok(self.redact(plan, fields)),
            AccessDecision::Denied => Err(AccessError::not_authorized()),
        }
    }

    fn redact(&self, plan: &RedactionPlan, fields: &OutputMapping) -> OutputMapping {
        let mut out: OutputMapping = fields
            .iter()
            .filter(|(name, _)| !plan.strips(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        // Masked keys are always present, even when the source lacks them.
        for (name, strategy) in &plan.mask {
            let source = fields.get(name).unwrap_or(&Value::Null);
            out.insert(name.clone(), self.mask(*strategy, source));
        }
        out
    }

    pub fn mask(&self, strategy: MaskingStrategy, value: &Value) -> Value {
        match strategy {
            MaskingStrategy::Redact => Value::String(self.mask_token.clone()),
            MaskingStrategy::Nullify => Value::Null,
            MaskingStrategy::Partial => match value {
                Value::Null => Value::String(self.mask_token.clone()),
                other => {
                    let text = as_text(other);
                    let head: String = text.chars().take(2).collect();
                    Value::String(format!("{}{}", head, self.mask_token))
                }
            },
            MaskingStrategy::MaskEmail => match value {
                Value::String(s) if self.email.is_match(s) => Value::String(
                    self.email
                        .replace(s, format!("${{1}}{}${{2}}", self.mask_token).as_str())
                        .into_owned(),
                ),
                _ => Value::String(self.mask_token.clone()),
            },
        }
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
