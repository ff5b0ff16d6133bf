// tutelle-core/src/domain/access/mod.rs

pub mod configuration;
pub mod decision;
pub mod entity;
pub mod masking;
pub mod model;
pub mod policy;
pub mod principal;
pub mod record;
pub mod redactor;
pub mod role;
pub mod scope;
pub mod sensitivity;

// Re-exports
pub use configuration::{EntityPolicy, FieldCondition, PolicyConfig, SensitivityEntry};
pub use decision::{AccessDecision, AccessError, DecisionKind, RedactionPlan};
pub use entity::{EntityType, OwnershipRelation};
pub use masking::MaskingStrategy;
pub use model::{AccessModel, EntityAccess};
pub use policy::{Decide, DecisionContext, RuleChain, VisibilityPolicy};
pub use principal::{AccountStatus, Principal, PrincipalId, PrincipalSpec};
pub use record::{OutputMapping, ProtectedRecord, RelationKey};
pub use redactor::FieldRedactor;
pub use role::{Capability, Role, RoleCatalog};
pub use scope::{FilterPredicate, QueryScope};
pub use sensitivity::{FieldPattern, FieldRules, FieldSensitivityMap};
