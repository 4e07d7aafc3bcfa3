// src/handlers/controllers.rs

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
    models::source_file::{CreateSourceFilePayload, SourceFile, UpdateSourceFilePayload},
};

#[utoipa::path(
    post,
    path = "/api/apps/{id}/controllers",
    tag = "Controllers",
    request_body = CreateSourceFilePayload,
    params(("id" = Uuid, Path, description = "ID do App")),
    responses(
        (status = 201, description = "Controller criado", body = SourceFile),
        (status = 403, description = "Sem permissão para criar controllers neste app"),
        (status = 404, description = "App não encontrado"),
        (status = 409, description = "Já existe um controller com esse nome no app")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_controller(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateSourceFilePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let created = app_state.source_file_service.create(user.id, id, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/apps/{id}/controllers",
    tag = "Controllers",
    params(
        ("id" = Uuid, Path, description = "ID do App"),
        PageParams
    ),
    responses(
        (status = 200, description = "Controllers do app: {items, total, page, limit}")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_controllers(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = params?;
    let page = app_state.source_file_service.list(user.id, id, params).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/apps/{id}/controllers/by-name/{name}",
    tag = "Controllers",
    params(
        ("id" = Uuid, Path, description = "ID do App"),
        ("name" = String, Path, description = "Nome do controller")
    ),
    responses(
        (status = 200, description = "Controller", body = SourceFile),
        (status = 404, description = "Nenhum controller com esse nome no app")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_controller_by_name(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((id, name)): Path<(Uuid, String)>,
) -> Result<Json<SourceFile>, AppError> {
    Ok(Json(app_state.source_file_service.get_by_name(user.id, id, &name).await?))
}

#[utoipa::path(
    get,
    path = "/api/apps/{id}/controllers/{child_id}",
    tag = "Controllers",
    params(
        ("id" = Uuid, Path, description = "ID do App"),
        ("child_id" = Uuid, Path, description = "ID do controller")
    ),
    responses(
        (status = 200, description = "Controller", body = SourceFile),
        (status = 404, description = "Controller não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_controller(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((id, child_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<SourceFile>, AppError> {
    Ok(Json(app_state.source_file_service.get(user.id, id, child_id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/apps/{id}/controllers/{child_id}",
    tag = "Controllers",
    request_body = UpdateSourceFilePayload,
    params(
        ("id" = Uuid, Path, description = "ID do App"),
        ("child_id" = Uuid, Path, description = "ID do controller")
    ),
    responses(
        (status = 200, description = "Controller atualizado", body = SourceFile)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_controller(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((id, child_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateSourceFilePayload>,
) -> Result<Json<SourceFile>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let updated = app_state
        .source_file_service
        .update(user.id, id, child_id, payload)
        .await?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/apps/{id}/controllers/{child_id}",
    tag = "Controllers",
    params(
        ("id" = Uuid, Path, description = "ID do App"),
        ("child_id" = Uuid, Path, description = "ID do controller")
    ),
    responses(
        (status = 204, description = "Controller excluído"),
        (status = 404, description = "Controller não encontrado (ou já excluído)")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_controller(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((id, child_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    app_state.source_file_service.delete(user.id, id, child_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
