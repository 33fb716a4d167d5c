//! Generic owner-scoped CRUD: a store seam, a resource that enforces
//! validation and ownership, and the HTTP handlers that mount it.

pub mod handlers;
pub mod resource;
pub mod store;
pub mod validate;

pub use handlers::router;
pub use resource::{CrudEntity, CrudResource};
pub use store::OwnedEntityStore;
pub use validate::{parse, Validate};
