// src/handlers/apps.rs

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::app::{App, AppListQuery, CreateAppPayload, UpdateAppPayload},
};

#[utoipa::path(
    post,
    path = "/api/apps",
    tag = "Apps",
    request_body = CreateAppPayload,
    responses(
        (status = 201, description = "App criado", body = App),
        (status = 404, description = "Organização não encontrada"),
        (status = 409, description = "Já existe um app com esse nome")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_app(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateAppPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let app = app_state.app_service.create(user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(app)))
}

#[utoipa::path(
    get,
    path = "/api/apps",
    tag = "Apps",
    params(AppListQuery),
    responses(
        (status = 200, description = "Apps da organização (ou pessoais): {items, total, page, limit}")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_apps(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    query: Result<Query<AppListQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query?;
    let page = app_state.app_service.list(user.id, query).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/apps/{id}",
    tag = "Apps",
    params(("id" = Uuid, Path, description = "ID do App")),
    responses(
        (status = 200, description = "App", body = App),
        (status = 404, description = "App não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_app(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<App>, AppError> {
    Ok(Json(app_state.app_service.get(user.id, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/apps/{id}",
    tag = "Apps",
    request_body = UpdateAppPayload,
    params(("id" = Uuid, Path, description = "ID do App")),
    responses(
        (status = 200, description = "App atualizado", body = App)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_app(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAppPayload>,
) -> Result<Json<App>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    Ok(Json(app_state.app_service.update(user.id, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/apps/{id}",
    tag = "Apps",
    params(("id" = Uuid, Path, description = "ID do App")),
    responses(
        (status = 204, description = "App excluído"),
        (status = 404, description = "App não encontrado (ou já excluído)")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_app(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.app_service.delete(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
