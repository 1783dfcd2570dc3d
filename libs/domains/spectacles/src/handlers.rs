//! HTTP handlers for the catalog

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::SpectacleResult;
use crate::models::{
    Category, CreateSpectacle, DeleteResponse, Gender, Spectacle, SpectacleQuery, UpdateSpectacle,
};
use crate::repository::SpectacleRepository;
use crate::service::SpectacleService;

/// OpenAPI documentation for the catalog
#[derive(OpenApi)]
#[openapi(
    paths(
        list_spectacles,
        create_spectacle,
        get_spectacle,
        update_spectacle,
        delete_spectacle,
    ),
    components(
        schemas(Spectacle, CreateSpectacle, UpdateSpectacle, Gender, Category, DeleteResponse),
        responses(
            BadRequestResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            NotFoundResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Spectacles", description = "Catalog of frames and lenses")
    )
)]
pub struct ApiDoc;

pub fn router<R: SpectacleRepository + 'static>(service: Arc<SpectacleService<R>>) -> Router {
    Router::new()
        .route("/", get(list_spectacles).post(create_spectacle))
        .route(
            "/{id}",
            get(get_spectacle)
                .put(update_spectacle)
                .delete(delete_spectacle),
        )
        .with_state(service)
}

/// List spectacles matching every given filter
#[utoipa::path(
    get,
    path = "",
    tag = "Spectacles",
    params(SpectacleQuery),
    responses(
        (status = 200, description = "Matching spectacles", body = Vec<Spectacle>),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_spectacles<R: SpectacleRepository>(
    State(service): State<Arc<SpectacleService<R>>>,
    Query(query): Query<SpectacleQuery>,
) -> SpectacleResult<Json<Vec<Spectacle>>> {
    Ok(Json(service.list_spectacles(query).await?))
}

/// Add a spectacle to the catalog
#[utoipa::path(
    post,
    path = "",
    tag = "Spectacles",
    request_body = CreateSpectacle,
    responses(
        (status = 201, description = "Spectacle created", body = Spectacle),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_spectacle<R: SpectacleRepository>(
    State(service): State<Arc<SpectacleService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateSpectacle>,
) -> SpectacleResult<impl IntoResponse> {
    let spectacle = service.create_spectacle(input).await?;
    Ok((StatusCode::CREATED, Json(spectacle)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Spectacles",
    params(
        ("id" = Uuid, Path, description = "Spectacle ID")
    ),
    responses(
        (status = 200, description = "Spectacle found", body = Spectacle),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_spectacle<R: SpectacleRepository>(
    State(service): State<Arc<SpectacleService<R>>>,
    UuidPath(id): UuidPath,
) -> SpectacleResult<Json<Spectacle>> {
    Ok(Json(service.get_spectacle(id).await?))
}

/// Merge the given fields into a spectacle
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Spectacles",
    params(
        ("id" = Uuid, Path, description = "Spectacle ID")
    ),
    request_body = UpdateSpectacle,
    responses(
        (status = 200, description = "Spectacle updated", body = Spectacle),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_spectacle<R: SpectacleRepository>(
    State(service): State<Arc<SpectacleService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateSpectacle>,
) -> SpectacleResult<Json<Spectacle>> {
    Ok(Json(service.update_spectacle(id, input).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Spectacles",
    params(
        ("id" = Uuid, Path, description = "Spectacle ID")
    ),
    responses(
        (status = 200, description = "Spectacle deleted", body = DeleteResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_spectacle<R: SpectacleRepository>(
    State(service): State<Arc<SpectacleService<R>>>,
    UuidPath(id): UuidPath,
) -> SpectacleResult<Json<DeleteResponse>> {
    service.delete_spectacle(id).await?;
    Ok(Json(DeleteResponse {
        message: "Spectacle deleted successfully".to_string(),
    }))
}
