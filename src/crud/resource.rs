use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use tracing::debug;

use crate::auth::Identity;
use crate::crud::store::OwnedEntityStore;
use crate::crud::validate::{parse, Validate};
use crate::database::models::Owned;
use crate::error::ApiError;

/// How a resource builds and mutates its entity from request DTOs
pub trait CrudEntity<C, U>: Owned + Serialize {
    /// A fresh entity owned by the caller; ids in the body never reach here
    fn from_create(dto: C, owner: &Identity) -> Self;

    fn apply_update(&mut self, dto: U);
}

/// Owner-scoped list/get/create/update/delete over any `CrudEntity`
pub struct CrudResource<E, C, U, S> {
    store: S,
    prefix: &'static str,
    _phantom: PhantomData<fn() -> (E, C, U)>,
}

impl<E, C, U, S> CrudResource<E, C, U, S>
where
    E: CrudEntity<C, U>,
    C: Validate + Send,
    U: Validate + Send,
    S: OwnedEntityStore<E>,
{
    pub fn new(store: S, prefix: &'static str) -> Self {
        Self {
            store,
            prefix,
            _phantom: PhantomData,
        }
    }

    /// Mount path, e.g. `/todo`
    pub fn prefix(&self) -> &'static str {
        self.prefix
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn list(&self, identity: &Identity) -> Result<Vec<E>, ApiError> {
        Ok(self.store.find_all(&identity.id).await?)
    }

    pub async fn get(&self, identity: &Identity, id: &str) -> Result<E, ApiError> {
        Ok(self.store.find_one_owned(id, &identity.id).await?)
    }

    pub async fn create(&self, identity: &Identity, body: Value) -> Result<E, ApiError> {
        let dto = parse::<C>(body)?;
        let entity = E::from_create(dto, identity);
        let saved = self.store.save(&entity).await?;
        debug!("{} {} created by {}", E::NAME, saved.id(), identity.username);
        Ok(saved)
    }

    /// Validation runs before the lookup, so a bad body is 400 even for a missing id
    pub async fn update(&self, identity: &Identity, id: &str, body: Value) -> Result<E, ApiError> {
        let dto = parse::<U>(body)?;
        let mut entity = self.store.find_one_owned(id, &identity.id).await?;
        entity.apply_update(dto);
        Ok(self.store.update(&entity).await?)
    }

    pub async fn delete(&self, identity: &Identity, id: &str) -> Result<(), ApiError> {
        let entity = self.store.find_one_owned(id, &identity.id).await?;
        self.store.delete(&entity).await?;
        debug!("{} {} deleted by {}", E::NAME, id, identity.username);
        Ok(())
    }
}
