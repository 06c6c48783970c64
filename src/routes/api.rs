//! JSON endpoints shared by every registered resource.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, Responder, Scope, web};
use serde::Serialize;

use crate::AppState;
use crate::domain::metadata::EntityMetadata;
use crate::dto::api::{AutoCompleteParams, AutoCompleteValues, DataTableQuery};
use crate::models::Persisted;
use crate::repository::DieselRepository;
use crate::routes::error_response;
use crate::services::resource::{self as resource_service, Payload};

/// Routes of resource `R`, mounted under `/<table>`.
pub fn resource_scope<R>() -> Scope
where
    R: Persisted + Serialize + 'static,
{
    web::scope(&format!("/{}", R::TABLE))
        .route("", web::get().to(list::<R>))
        .route("", web::post().to(add::<R>))
        .route("/descriptor", web::get().to(descriptor::<R>))
        .route("/autocomplete/{field}", web::get().to(autocomplete::<R>))
        .route("/{id}", web::get().to(show::<R>))
        .route("/{id}", web::put().to(edit::<R>))
        .route("/{id}", web::delete().to(delete::<R>))
}

fn metadata<R: Persisted>(state: &AppState) -> EntityMetadata {
    state
        .resources
        .get(R::TABLE)
        .cloned()
        .unwrap_or_else(EntityMetadata::of::<R>)
}

async fn list<R>(
    query: web::Query<DataTableQuery>,
    repo: web::Data<DieselRepository>,
    state: web::Data<AppState>,
) -> impl Responder
where
    R: Persisted + Serialize,
{
    let metadata = metadata::<R>(&state);
    match resource_service::list::<R, _, _>(repo.get_ref(), &state.permissions, &metadata, &query) {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(err) => error_response(err),
    }
}

async fn show<R>(
    id: web::Path<i64>,
    repo: web::Data<DieselRepository>,
    state: web::Data<AppState>,
) -> impl Responder
where
    R: Persisted + Serialize,
{
    let metadata = metadata::<R>(&state);
    match resource_service::get::<R, _, _>(
        repo.get_ref(),
        &state.permissions,
        &metadata,
        id.into_inner(),
    ) {
        Ok(entity) => HttpResponse::Ok().json(entity),
        Err(err) => error_response(err),
    }
}

async fn add<R>(
    req: HttpRequest,
    web::Json(payload): web::Json<Payload>,
    repo: web::Data<DieselRepository>,
    state: web::Data<AppState>,
) -> impl Responder
where
    R: Persisted,
{
    let metadata = metadata::<R>(&state);
    match resource_service::add(repo.get_ref(), &state.permissions, &metadata, &payload) {
        Ok(id) => HttpResponse::Created()
            .insert_header((header::LOCATION, format!("{}/{id}", req.path())))
            .finish(),
        Err(err) => error_response(err),
    }
}

async fn edit<R>(
    id: web::Path<i64>,
    web::Json(payload): web::Json<Payload>,
    repo: web::Data<DieselRepository>,
    state: web::Data<AppState>,
) -> impl Responder
where
    R: Persisted,
{
    let metadata = metadata::<R>(&state);
    match resource_service::edit::<R, _, _>(
        repo.get_ref(),
        &state.permissions,
        &metadata,
        id.into_inner(),
        &payload,
    ) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err),
    }
}

async fn delete<R>(
    id: web::Path<i64>,
    repo: web::Data<DieselRepository>,
    state: web::Data<AppState>,
) -> impl Responder
where
    R: Persisted,
{
    let metadata = metadata::<R>(&state);
    match resource_service::delete::<R, _, _>(
        repo.get_ref(),
        &state.permissions,
        &metadata,
        id.into_inner(),
    ) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err),
    }
}

async fn descriptor<R>(state: web::Data<AppState>) -> impl Responder
where
    R: Persisted,
{
    let metadata = metadata::<R>(&state);
    match resource_service::descriptor(&state.permissions, &metadata) {
        Ok(descriptor) => HttpResponse::Ok().json(descriptor),
        Err(err) => error_response(err),
    }
}

async fn autocomplete<R>(
    field: web::Path<String>,
    params: web::Query<AutoCompleteParams>,
    repo: web::Data<DieselRepository>,
    state: web::Data<AppState>,
) -> impl Responder
where
    R: Persisted,
{
    let metadata = metadata::<R>(&state);
    match resource_service::autocomplete(
        repo.get_ref(),
        &state.permissions,
        &metadata,
        &field,
        params.q.as_deref(),
    ) {
        Ok(values) => HttpResponse::Ok().json(AutoCompleteValues { values }),
        Err(err) => error_response(err),
    }
}
