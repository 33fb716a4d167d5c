use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Router,
};
use std::sync::Arc;

use crate::auth::Identity;
use crate::crud::resource::{CrudEntity, CrudResource};
use crate::crud::store::OwnedEntityStore;
use crate::crud::validate::Validate;
use crate::middleware::{ApiResponse, ApiResult, GenericResponse, JsonBody};

type Resource<E, C, U, S> = State<Arc<CrudResource<E, C, U, S>>>;

/// `GET`/`POST` on the prefix, `GET`/`PUT`/`DELETE` on `prefix/:id`.
/// Authentication is applied by the caller as a route layer.
pub fn router<E, C, U, S, T>(resource: Arc<CrudResource<E, C, U, S>>) -> Router<T>
where
    E: CrudEntity<C, U> + 'static,
    C: Validate + Send + 'static,
    U: Validate + Send + 'static,
    S: OwnedEntityStore<E> + 'static,
    T: Clone + Send + Sync + 'static,
{
    let prefix = resource.prefix();
    Router::new()
        .route(prefix, get(list::<E, C, U, S>).post(create::<E, C, U, S>))
        .route(
            &format!("{}/:id", prefix),
            get(get_one::<E, C, U, S>)
                .put(update::<E, C, U, S>)
                .delete(delete::<E, C, U, S>),
        )
        .with_state(resource)
}

pub async fn list<E, C, U, S>(
    State(resource): Resource<E, C, U, S>,
    identity: Identity,
) -> ApiResult<Vec<E>>
where
    E: CrudEntity<C, U>,
    C: Validate + Send,
    U: Validate + Send,
    S: OwnedEntityStore<E>,
{
    let rows = resource.list(&identity).await?;
    Ok(ApiResponse::success(rows))
}

pub async fn get_one<E, C, U, S>(
    State(resource): Resource<E, C, U, S>,
    identity: Identity,
    Path(id): Path<String>,
) -> ApiResult<E>
where
    E: CrudEntity<C, U>,
    C: Validate + Send,
    U: Validate + Send,
    S: OwnedEntityStore<E>,
{
    let row = resource.get(&identity, &id).await?;
    Ok(ApiResponse::success(row))
}

pub async fn create<E, C, U, S>(
    State(resource): Resource<E, C, U, S>,
    identity: Identity,
    JsonBody(body): JsonBody,
) -> ApiResult<GenericResponse>
where
    E: CrudEntity<C, U>,
    C: Validate + Send,
    U: Validate + Send,
    S: OwnedEntityStore<E>,
{
    resource.create(&identity, body).await?;
    Ok(acknowledge::<E>(StatusCode::CREATED, "created"))
}

pub async fn update<E, C, U, S>(
    State(resource): Resource<E, C, U, S>,
    identity: Identity,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> ApiResult<GenericResponse>
where
    E: CrudEntity<C, U>,
    C: Validate + Send,
    U: Validate + Send,
    S: OwnedEntityStore<E>,
{
    resource.update(&identity, &id, body).await?;
    Ok(acknowledge::<E>(StatusCode::OK, "updated"))
}

pub async fn delete<E, C, U, S>(
    State(resource): Resource<E, C, U, S>,
    identity: Identity,
    Path(id): Path<String>,
) -> ApiResult<GenericResponse>
where
    E: CrudEntity<C, U>,
    C: Validate + Send,
    U: Validate + Send,
    S: OwnedEntityStore<E>,
{
    resource.delete(&identity, &id).await?;
    Ok(acknowledge::<E>(StatusCode::OK, "deleted"))
}

fn acknowledge<E: crate::database::models::Entity>(
    status: StatusCode,
    action: &str,
) -> ApiResponse<GenericResponse> {
    GenericResponse::new(status, format!("{} {} successfully", E::NAME, action)).into_api_response()
}
