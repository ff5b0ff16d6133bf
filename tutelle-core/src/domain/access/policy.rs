// tutelle-core/src/domain/access/policy.rs
//
// Instance-level visibility. Each entity type gets a chain of small rules;
// the first rule that returns a decision wins.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::access::decision::AccessDecision;
use crate::domain::access::entity::EntityType;
use crate::domain::access::model::{AccessModel, EntityAccess};
use crate::domain::access::principal::Principal;
use crate::domain::access::record::ProtectedRecord;
use crate::domain::access::role::{Capability, Role};
use crate::domain::error::DomainError;

pub struct DecisionContext<'a> {
    pub model: &'a AccessModel,
    pub principal: &'a Principal,
    pub record: &'a ProtectedRecord,
    /// Set when a sub-record is reached through its parent.
    pub parent: Option<&'a ProtectedRecord>,
}

/// A composable visibility rule. `Ok(None)` passes to the next rule.
pub trait Decide: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;
    fn decide(&self, ctx: &DecisionContext<'_>) -> Result<Option<AccessDecision>, DomainError>;
}

#[derive(Debug)]
pub struct AdminOverride;

impl Decide for AdminOverride {
    fn name(&self) -> &'static str {
        "admin_override"
    }

    fn decide(&self, ctx: &DecisionContext<'_>) -> Result<Option<AccessDecision>, DomainError> {
        Ok(ctx
            .model
            .catalog
            .has_role(ctx.principal, Role::Admin)
            .then_some(AccessDecision::FullAccess))
    }
}

/// Confidential records stop here unless the principal may bypass
/// confidentiality or is the record's case worker.
#[derive(Debug)]
pub struct ConfidentialityGate;

impl Decide for ConfidentialityGate {
    fn name(&self) -> &'static str {
        "confidentiality_gate"
    }

    fn decide(&self, ctx: &DecisionContext<'_>) -> Result<Option<AccessDecision>, DomainError> {
        if !ctx.record.is_confidential {
            return Ok(None);
        }
        let bypass = ctx
            .model
            .catalog
            .has_capability(ctx.principal, Capability::ViewConfidential);
        if bypass || ctx.record.is_case_worker(ctx.principal) {
            return Ok(None);
        }
        Ok(Some(AccessDecision::Denied))
    }
}

#[derive(Debug)]
pub struct PrivilegedViewer {
    roles: BTreeSet<Role>,
}

impl Decide for PrivilegedViewer {
    fn name(&self) -> &'static str {
        "privileged_viewer"
    }

    fn decide(&self, ctx: &DecisionContext<'_>) -> Result<Option<AccessDecision>, DomainError> {
        Ok(ctx
            .model
            .catalog
            .has_any_role(ctx.principal, &self.roles)
            .then_some(AccessDecision::FullAccess))
    }
}

#[derive(Debug)]
pub struct OwnershipGrant;

impl Decide for OwnershipGrant {
    fn name(&self) -> &'static str {
        "ownership"
    }

    fn decide(&self, ctx: &DecisionContext<'_>) -> Result<Option<AccessDecision>, DomainError> {
        Ok(ctx
            .record
            .is_owned_by(ctx.principal)
            .then_some(AccessDecision::FullAccess))
    }
}

/// A child's sponsor follows the child's non-confidential notes and
/// documents. Only reachable through `evaluate_nested`.
#[derive(Debug)]
pub struct ParentOwnerGrant;

impl Decide for ParentOwnerGrant {
    fn name(&self) -> &'static str {
        "parent_ownership"
    }

    fn decide(&self, ctx: &DecisionContext<'_>) -> Result<Option<AccessDecision>, DomainError> {
        Ok(ctx
            .parent
            .is_some_and(|parent| parent.is_owned_by(ctx.principal))
            .then_some(AccessDecision::FullAccess))
    }
}

#[derive(Debug)]
pub struct PublicEligibility {
    access: EntityAccess,
}

impl Decide for PublicEligibility {
    fn name(&self) -> &'static str {
        "public_eligibility"
    }

    fn decide(&self, ctx: &DecisionContext<'_>) -> Result<Option<AccessDecision>, DomainError> {
        let role = ctx.principal.role();
        if !ctx.model.catalog.is_one_of(ctx.principal, &self.access.public_roles)
            || ctx.record.is_confidential
            || !self.access.is_publicly_eligible(ctx.record)
        {
            return Ok(None);
        }

        let rules = ctx
            .model
            .sensitivity
            .get(self.access.entity, role)
            .ok_or_else(|| DomainError::MissingSensitivityEntry {
                entity: self.access.entity.to_string(),
                role: role.to_string(),
            })?;

        Ok(Some(AccessDecision::Redacted(
            rules.plan_for(&ctx.record.fields),
        )))
    }
}

#[derive(Debug, Default)]
pub struct RuleChain {
    rules: Vec<Box<dyn Decide>>,
}

impl RuleChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, rule: impl Decide + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Standard chain: admin, confidentiality, privileged role, ownership,
    /// parent ownership (when enabled), public eligibility.
    pub fn standard(access: &EntityAccess) -> Self {
        let mut chain = Self::new()
            .with(AdminOverride)
            .with(ConfidentialityGate)
            .with(PrivilegedViewer {
                roles: access.privileged.clone(),
            })
            .with(OwnershipGrant);
        if access.parent_owner_access {
            chain = chain.with(ParentOwnerGrant);
        }
        chain.with(PublicEligibility {
            access: access.clone(),
        })
    }

    pub fn run(&self, ctx: &DecisionContext<'_>) -> Result<AccessDecision, DomainError> {
        for rule in &self.rules {
            if let Some(decision) = rule.decide(ctx)? {
                debug!(
                    rule = rule.name(),
                    principal = %ctx.principal.id(),
                    record = %ctx.record.id,
                    decision = %decision.kind(),
                    "Visibility rule matched"
                );
                return Ok(decision);
            }
        }
        Ok(AccessDecision::Denied)
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }
}

/// Decides instance-level access. Holds no mutable state: the same inputs
/// always give the same decision.
#[derive(Debug, Clone)]
pub struct VisibilityPolicy {
    model: Arc<AccessModel>,
    chains: Arc<BTreeMap<EntityType, RuleChain>>,
}

impl VisibilityPolicy {
    pub fn new(model: Arc<AccessModel>) -> Self {
        let chains = model
            .entities
            .iter()
            .map(|(entity, access)| (*entity, RuleChain::standard(access)))
            .collect();
        Self {
            model,
            chains: Arc::new(chains),
        }
    }

    pub fn model(&self) -> &AccessModel {
        &self.model
    }

    /// Surfaces misconfiguration (missing policy or sensitivity entry) as an
    /// error instead of a decision.
    pub fn try_evaluate(
        &self,
        principal: &Principal,
        record: &ProtectedRecord,
    ) -> Result<AccessDecision, DomainError> {
        self.run(principal, record, None)
    }

    fn run(
        &self,
        principal: &Principal,
        record: &ProtectedRecord,
        parent: Option<&ProtectedRecord>,
    ) -> Result<AccessDecision, DomainError> {
        let ctx = DecisionContext {
            model: &self.model,
            principal,
            record,
            parent,
        };
        match self.chains.get(&record.entity) {
            Some(chain) => chain.run(&ctx),
            None => match AdminOverride.decide(&ctx)? {
                Some(decision) => Ok(decision),
                None => Err(DomainError::MissingEntityPolicy {
                    entity: record.entity.to_string(),
                }),
            },
        }
    }

    /// Misconfiguration degrades to `Denied`.
    pub fn evaluate(&self, principal: &Principal, record: &ProtectedRecord) -> AccessDecision {
        self.try_evaluate(principal, record).unwrap_or_else(|e| {
            warn!(error = %e, record = %record.id, "Policy misconfiguration, denying access");
            AccessDecision::Denied
        })
    }

    /// Sub-records are reachable only through a parent the principal fully
    /// sees; the sub-record is then judged under its own entity policy.
    pub fn try_evaluate_nested(
        &self,
        principal: &Principal,
        parent: &ProtectedRecord,
        record: &ProtectedRecord,
    ) -> Result<AccessDecision, DomainError> {
        let linked = record.entity.parent() == Some(parent.entity)
            && record.parent.as_deref() == Some(parent.id.as_str());
        if !linked {
            return Ok(AccessDecision::Denied);
        }
        match self.try_evaluate(principal, parent)? {
            AccessDecision::FullAccess => self.run(principal, record, Some(parent)),
            _ => Ok(AccessDecision::Denied),
        }
    }

    pub fn evaluate_nested(
        &self,
        principal: &Principal,
        parent: &ProtectedRecord,
        record: &ProtectedRecord,
    ) -> AccessDecision {
        self.try_evaluate_nested(principal, parent, record)
            .unwrap_or_else(|e| {
                warn!(error = %e, record = %record.id, "Policy misconfiguration, denying access");
                AccessDecision::Denied
            })
    }

    pub fn rule_names(&self, entity: EntityType) -> Vec<&'static str> {
        self.chains
            .get(&entity)
            .map(RuleChain::rule_names)
            .unwrap_or_default()
    }
}
