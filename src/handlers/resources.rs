// src/handlers/resources.rs

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, pagination::PageParams},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::resource::{CreateResourcePayload, ResourceDto, UpdateResourcePayload},
};

#[utoipa::path(
    post,
    path = "/api/apps/{id}/resources",
    tag = "Resources",
    request_body = CreateResourcePayload,
    params(("id" = Uuid, Path, description = "ID do App")),
    responses(
        (status = 201, description = "Resource criado", body = ResourceDto),
        (status = 403, description = "Sem permissão para criar resources neste app"),
        (status = 404, description = "App não encontrado"),
        (status = 409, description = "Já existe um resource com esse nome no app")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_resource(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateResourcePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let created = app_state.resource_service.create(user.id, id, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/apps/{id}/resources",
    tag = "Resources",
    params(
        ("id" = Uuid, Path, description = "ID do App"),
        PageParams
    ),
    responses(
        (status = 200, description = "Resources do app: {items, total, page, limit}")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_resources(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = params?;
    let page = app_state.resource_service.list(user.id, id, params).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/apps/{id}/resources/by-name/{name}",
    tag = "Resources",
    params(
        ("id" = Uuid, Path, description = "ID do App"),
        ("name" = String, Path, description = "Nome do resource")
    ),
    responses(
        (status = 200, description = "Resource", body = ResourceDto),
        (status = 404, description = "Nenhum resource com esse nome no app")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_resource_by_name(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((id, name)): Path<(Uuid, String)>,
) -> Result<Json<ResourceDto>, AppError> {
    Ok(Json(app_state.resource_service.get_by_name(user.id, id, &name).await?))
}

#[utoipa::path(
    get,
    path = "/api/apps/{id}/resources/{child_id}",
    tag = "Resources",
    params(
        ("id" = Uuid, Path, description = "ID do App"),
        ("child_id" = Uuid, Path, description = "ID do resource")
    ),
    responses(
        (status = 200, description = "Resource", body = ResourceDto),
        (status = 404, description = "Resource não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_resource(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((id, child_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ResourceDto>, AppError> {
    Ok(Json(app_state.resource_service.get(user.id, id, child_id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/apps/{id}/resources/{child_id}",
    tag = "Resources",
    request_body = UpdateResourcePayload,
    params(
        ("id" = Uuid, Path, description = "ID do App"),
        ("child_id" = Uuid, Path, description = "ID do resource")
    ),
    responses(
        (status = 200, description = "Resource atualizado", body = ResourceDto)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_resource(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((id, child_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateResourcePayload>,
) -> Result<Json<ResourceDto>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let updated = app_state
        .resource_service
        .update(user.id, id, child_id, payload)
        .await?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/apps/{id}/resources/{child_id}",
    tag = "Resources",
    params(
        ("id" = Uuid, Path, description = "ID do App"),
        ("child_id" = Uuid, Path, description = "ID do resource")
    ),
    responses(
        (status = 204, description = "Resource excluído"),
        (status = 404, description = "Resource não encontrado (ou já excluído)")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_resource(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((id, child_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    app_state.resource_service.delete(user.id, id, child_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
