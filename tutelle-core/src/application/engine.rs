// tutelle-core/src/application/engine.rs

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::domain::access::{
    AccessDecision, AccessError, AccessModel, Capability, DecisionKind, EntityType,
    FieldRedactor, FilterPredicate, OutputMapping, Principal, ProtectedRecord, QueryScope,
    VisibilityPolicy,
};
use crate::domain::project::ProjectConfig;
use crate::error::TutelleError;
use crate::ports::RecordSource;

/// A record as one principal is allowed to see it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordView {
    pub entity: EntityType,
    pub id: String,
    pub decision: DecisionKind,
    pub fields: OutputMapping,
}

/// Wires the policy, the redactor and the query scope over one compiled
/// access model.
#[derive(Debug, Clone)]
pub struct AccessEngine {
    policy: VisibilityPolicy,
    redactor: FieldRedactor,
    scope: QueryScope,
    strict: bool,
}

impl AccessEngine {
    /// In strict mode a misconfiguration met during evaluation is returned
    /// as an error; otherwise it is logged and the record is denied.
    pub fn new(model: AccessModel, strict: bool) -> Result<Self, TutelleError> {
        let redactor = FieldRedactor::new(model.mask_token.clone())?;
        let model = Arc::new(model);
        Ok(Self {
            policy: VisibilityPolicy::new(Arc::clone(&model)),
            scope: QueryScope::new(model),
            redactor,
            strict,
        })
    }

    /// Production never runs strict, whatever the project file says.
    #[instrument(skip(config), fields(project = %config.name))]
    pub fn from_config(config: &ProjectConfig) -> Result<Self, TutelleError> {
        let model = AccessModel::compile(&config.policy, config.environment)?;
        let strict = config.strict && config.environment.fails_loud();
        info!(strict, environment = %config.environment, "Access engine ready");
        Self::new(model, strict)
    }

    pub fn policy(&self) -> &VisibilityPolicy {
        &self.policy
    }

    pub fn model(&self) -> &AccessModel {
        self.policy.model()
    }

    pub fn redactor(&self) -> &FieldRedactor {
        &self.redactor
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Accounts that are not approved see nothing.
    pub fn decide(
        &self,
        principal: &Principal,
        record: &ProtectedRecord,
    ) -> Result<AccessDecision, TutelleError> {
        if !principal.status().is_approved() {
            debug!(principal = %principal.id(), "Account not approved, denying");
            return Ok(AccessDecision::Denied);
        }
        if self.strict {
            Ok(self.policy.try_evaluate(principal, record)?)
        } else {
            Ok(self.policy.evaluate(principal, record))
        }
    }

    pub fn decide_nested(
        &self,
        principal: &Principal,
        parent: &ProtectedRecord,
        record: &ProtectedRecord,
    ) -> Result<AccessDecision, TutelleError> {
        if !principal.status().is_approved() {
            return Ok(AccessDecision::Denied);
        }
        if self.strict {
            Ok(self.policy.try_evaluate_nested(principal, parent, record)?)
        } else {
            Ok(self.policy.evaluate_nested(principal, parent, record))
        }
    }

    /// Single-record view. A denial comes back as `TutelleError::Access`
    /// carrying the uniform payload.
    pub fn view(
        &self,
        principal: &Principal,
        record: &ProtectedRecord,
    ) -> Result<RecordView, TutelleError> {
        let decision = self.decide(principal, record)?;
        self.project(&decision, record)
    }

    pub fn view_nested(
        &self,
        principal: &Principal,
        parent: &ProtectedRecord,
        record: &ProtectedRecord,
    ) -> Result<RecordView, TutelleError> {
        let decision = self.decide_nested(principal, parent, record)?;
        self.project(&decision, record)
    }

    fn project(
        &self,
        decision: &AccessDecision,
        record: &ProtectedRecord,
    ) -> Result<RecordView, TutelleError> {
        let fields = self.redactor.apply(decision, &record.fields)?;
        Ok(RecordView {
            entity: record.entity,
            id: record.id.clone(),
            decision: decision.kind(),
            fields,
        })
    }

    /// Operation-level check (create a child record, manage inventory...).
    pub fn authorize(
        &self,
        principal: &Principal,
        capability: Capability,
    ) -> Result<(), TutelleError> {
        if !principal.status().is_approved() {
            return Err(AccessError::not_authorized().into());
        }
        self.model()
            .catalog
            .authorize(principal, capability)
            .map_err(TutelleError::from)
    }

    pub fn scope(&self, principal: &Principal, entity: EntityType) -> FilterPredicate {
        if !principal.status().is_approved() {
            return FilterPredicate::Nothing;
        }
        self.scope.scope_predicate(principal, entity)
    }

    /// Scope, fetch, then evaluate and redact every candidate. Denied
    /// candidates are dropped silently. Sub-records are judged through their
    /// parent, fetched from the same source.
    #[instrument(skip(self, source, principal), fields(principal = %principal.id()))]
    pub async fn list(
        &self,
        source: &dyn RecordSource,
        principal: &Principal,
        entity: EntityType,
    ) -> Result<Vec<RecordView>, TutelleError> {
        let predicate = self.scope(principal, entity);
        if predicate == FilterPredicate::Nothing {
            debug!(%entity, "Empty scope, nothing fetched");
            return Ok(Vec::new());
        }

        let candidates = source.fetch(entity, &predicate).await?;
        let fetched = candidates.len();
        let mut views = Vec::with_capacity(fetched);

        for record in &candidates {
            let decision = match (entity.parent(), record.parent.as_deref()) {
                (Some(parent_entity), Some(parent_id)) => {
                    match source.get(parent_entity, parent_id).await? {
                        Some(parent) => self.decide_nested(principal, &parent, record)?,
                        None => AccessDecision::Denied,
                    }
                }
                (Some(_), None) => AccessDecision::Denied,
                (None, _) => self.decide(principal, record)?,
            };
            if decision.is_denied() {
                continue;
            }
            views.push(self.project(&decision, record)?);
        }

        info!(%entity, fetched, visible = views.len(), "Listing done");
        Ok(views)
    }
}
