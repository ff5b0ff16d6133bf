// tutelle-core/src/domain/access/scope.rs
//
// Coarse, role-derived listing filter. It may let through records the
// policy later denies or redacts, but never hides one the policy would show.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::domain::access::entity::EntityType;
use crate::domain::access::model::AccessModel;
use crate::domain::access::principal::{Principal, PrincipalId};
use crate::domain::access::record::{ProtectedRecord, RelationKey};
use crate::domain::access::role::{Capability, Role};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FilterPredicate {
    All,
    Nothing,
    NotConfidential,
    Relation {
        key: RelationKey,
        principal: PrincipalId,
    },
    FieldIn {
        field: String,
        values: Vec<Value>,
    },
    And {
        terms: Vec<FilterPredicate>,
    },
    Or {
        terms: Vec<FilterPredicate>,
    },
}

impl FilterPredicate {
    pub fn relation(key: RelationKey, principal: &Principal) -> Self {
        Self::Relation {
            key,
            principal: principal.id().clone(),
        }
    }

    /// Conjunction with `All` dropped, `Nothing` absorbing and repeated
    /// terms kept once.
    pub fn and(terms: Vec<FilterPredicate>) -> Self {
        let mut flat = Vec::with_capacity(terms.len());
        for term in terms {
            match term {
                Self::All => {}
                Self::Nothing => return Self::Nothing,
                Self::And { terms } => terms.into_iter().for_each(|t| push_unique(&mut flat, t)),
                other => push_unique(&mut flat, other),
            }
        }
        match flat.len() {
            0 => Self::All,
            1 => flat.remove(0),
            _ => Self::And { terms: flat },
        }
    }

    /// Disjunction with `Nothing` dropped, `All` absorbing and repeated
    /// terms kept once.
    pub fn or(terms: Vec<FilterPredicate>) -> Self {
        let mut flat = Vec::with_capacity(terms.len());
        for term in terms {
            match term {
                Self::Nothing => {}
                Self::All => return Self::All,
                Self::Or { terms } => terms.into_iter().for_each(|t| push_unique(&mut flat, t)),
                other => push_unique(&mut flat, other),
            }
        }
        match flat.len() {
            0 => Self::Nothing,
            1 => flat.remove(0),
            _ => Self::Or { terms: flat },
        }
    }

    /// In-memory evaluation against a record snapshot.
    pub fn matches(&self, record: &ProtectedRecord) -> bool {
        match self {
            Self::All => true,
            Self::Nothing => false,
            Self::NotConfidential => !record.is_confidential,
            Self::Relation { key, principal } => record.relation(*key) == Some(principal),
            Self::FieldIn { field, values } => {
                record.field(field).is_some_and(|v| values.contains(v))
            }
            Self::And { terms } => terms.iter().all(|t| t.matches(record)),
            Self::Or { terms } => terms.iter().any(|t| t.matches(record)),
        }
    }
}

/// SQL `WHERE` rendering. Field names are validated identifiers; literals are
/// quoted with doubled single quotes.
impl fmt::Display for FilterPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "TRUE"),
            Self::Nothing => write!(f, "FALSE"),
            Self::NotConfidential => write!(f, "is_confidential = FALSE"),
            Self::Relation { key, principal } => {
                write!(f, "{} = {}", key.column(), quote(principal.as_str()))
            }
            Self::FieldIn { field, values } => {
                let (nulls, literals): (Vec<&Value>, Vec<&Value>) =
                    values.iter().partition(|v| v.is_null());
                let rendered: Vec<String> = literals.iter().map(|v| literal(v)).collect();
                let membership = match rendered.as_slice() {
                    [] => None,
                    [single] => Some(format!("{} = {}", field, single)),
                    many => Some(format!("{} IN ({})", field, many.join(", "))),
                };
                match (membership, nulls.is_empty()) {
                    (Some(m), true) => write!(f, "{}", m),
                    (Some(m), false) => write!(f, "({} OR {} IS NULL)", m, field),
                    (None, false) => write!(f, "{} IS NULL", field),
                    (None, true) => write!(f, "FALSE"),
                }
            }
            Self::And { terms } => write_joined(f, terms, " AND "),
            Self::Or { terms } => write_joined(f, terms, " OR "),
        }
    }
}

fn push_unique(terms: &mut Vec<FilterPredicate>, term: FilterPredicate) {
    if !terms.contains(&term) {
        terms.push(term);
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, terms: &[FilterPredicate], sep: &str) -> fmt::Result {
    let parts: Vec<String> = terms
        .iter()
        .map(|t| match t {
            FilterPredicate::And { .. } | FilterPredicate::Or { .. } => format!("({})", t),
            _ => t.to_string(),
        })
        .collect();
    write!(f, "{}", parts.join(sep))
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn literal(value: &Value) -> String {
    match value {
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        other => quote(&other.to_string()),
    }
}

/// Derives the listing predicate from the same entity policy the
/// `VisibilityPolicy` evaluates, rule by rule.
#[derive(Debug, Clone)]
pub struct QueryScope {
    model: Arc<AccessModel>,
}

impl QueryScope {
    pub fn new(model: Arc<AccessModel>) -> Self {
        Self { model }
    }

    pub fn scope_predicate(&self, principal: &Principal, entity: EntityType) -> FilterPredicate {
        let catalog = &self.model.catalog;
        if catalog.has_role(principal, Role::Admin) {
            return FilterPredicate::All;
        }
        let Some(access) = self.model.entity(entity) else {
            return FilterPredicate::Nothing;
        };

        let bypass = catalog.has_capability(principal, Capability::ViewConfidential);
        // What passes the confidentiality gate.
        let unguarded = if bypass {
            FilterPredicate::All
        } else {
            FilterPredicate::or(vec![
                FilterPredicate::NotConfidential,
                FilterPredicate::relation(RelationKey::CaseWorker, principal),
            ])
        };
        let mut disjuncts = Vec::new();

        if catalog.has_any_role(principal, &access.privileged) {
            disjuncts.push(unguarded.clone());
        }

        if let Some(key) = entity.ownership().key() {
            disjuncts.push(FilterPredicate::relation(key, principal));
        }

        // Parent ownership is not a column of the sub-record: anyone may own
        // the parent, so the gate alone bounds the listing.
        if access.parent_owner_access {
            disjuncts.push(unguarded);
        }

        if catalog.is_one_of(principal, &access.public_roles) {
            let mut terms: Vec<FilterPredicate> = access
                .eligibility
                .iter()
                .map(|c| FilterPredicate::FieldIn {
                    field: c.field.clone(),
                    values: c.one_of.clone(),
                })
                .collect();
            terms.push(FilterPredicate::NotConfidential);
            disjuncts.push(FilterPredicate::and(terms));
        }

        FilterPredicate::or(disjuncts)
    }
}
