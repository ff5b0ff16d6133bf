// tutelle-core/src/ports/record_source.rs

// What the listing use case needs from persistence, without knowing how it is
// stored. The predicate is a coarse pre-filter: implementations may return
// more records than it matches, never fewer.

use crate::domain::access::entity::EntityType;
use crate::domain::access::record::ProtectedRecord;
use crate::domain::access::scope::FilterPredicate;
use crate::error::TutelleError;
use async_trait::async_trait;

#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch(
        &self,
        entity: EntityType,
        predicate: &FilterPredicate,
    ) -> Result<Vec<ProtectedRecord>, TutelleError>;

    /// Direct lookup by id, used for single-record views.
    async fn get(
        &self,
        entity: EntityType,
        id: &str,
    ) -> Result<Option<ProtectedRecord>, TutelleError>;
}
