use async_trait::async_trait;

use crate::database::models::Owned;
use crate::database::{Criteria, DatabaseError, Repository};

/// Persistence seam for owner-scoped entities.
///
/// Every read that takes an owner filters by it in the same query, so a row
/// that exists but belongs to someone else is indistinguishable from a
/// missing one.
#[async_trait]
pub trait OwnedEntityStore<E: Owned>: Send + Sync {
    /// The owner's rows, most recently created first
    async fn find_all(&self, owner_id: &str) -> Result<Vec<E>, DatabaseError>;

    async fn find_one_owned(&self, id: &str, owner_id: &str) -> Result<E, DatabaseError>;

    /// Unscoped lookup
    async fn find_one_global(&self, criteria: Criteria) -> Result<E, DatabaseError>;

    async fn save(&self, entity: &E) -> Result<E, DatabaseError>;

    /// Never inserts; a row deleted in the meantime is NotFound
    async fn update(&self, entity: &E) -> Result<E, DatabaseError>;

    async fn delete(&self, entity: &E) -> Result<(), DatabaseError>;
}

#[async_trait]
impl<E: Owned> OwnedEntityStore<E> for Repository<E> {
    async fn find_all(&self, owner_id: &str) -> Result<Vec<E>, DatabaseError> {
        self.find(Criteria::new().eq(E::OWNER_COLUMN, owner_id)).await
    }

    async fn find_one_owned(&self, id: &str, owner_id: &str) -> Result<E, DatabaseError> {
        self.find_one(Criteria::new().eq("id", id).eq(E::OWNER_COLUMN, owner_id))
            .await
    }

    async fn find_one_global(&self, criteria: Criteria) -> Result<E, DatabaseError> {
        self.find_one(criteria).await
    }

    async fn save(&self, entity: &E) -> Result<E, DatabaseError> {
        self.upsert(entity).await
    }

    async fn update(&self, entity: &E) -> Result<E, DatabaseError> {
        Repository::update(self, entity).await
    }

    async fn delete(&self, entity: &E) -> Result<(), DatabaseError> {
        self.remove(entity.id()).await
    }
}
