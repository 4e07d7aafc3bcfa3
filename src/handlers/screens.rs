// src/handlers/screens.rs

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
    models::screen::{CreateScreenPayload, Screen, UpdateScreenPayload},
};

#[utoipa::path(
    post,
    path = "/api/apps/{id}/screens",
    tag = "Screens",
    request_body = CreateScreenPayload,
    params(("id" = Uuid, Path, description = "ID do App")),
    responses(
        (status = 201, description = "Tela criada", body = Screen),
        (status = 403, description = "Sem permissão para criar telas neste app"),
        (status = 404, description = "App não encontrado"),
        (status = 409, description = "Já existe uma tela com esse nome no app")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_screen(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateScreenPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let created = app_state.screen_service.create(user.id, id, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/apps/{id}/screens",
    tag = "Screens",
    params(
        ("id" = Uuid, Path, description = "ID do App"),
        PageParams
    ),
    responses(
        (status = 200, description = "Telas do app: {items, total, page, limit}")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_screens(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = params?;
    let page = app_state.screen_service.list(user.id, id, params).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/apps/{id}/screens/by-name/{name}",
    tag = "Screens",
    params(
        ("id" = Uuid, Path, description = "ID do App"),
        ("name" = String, Path, description = "Nome da tela")
    ),
    responses(
        (status = 200, description = "Tela", body = Screen),
        (status = 404, description = "Nenhuma tela com esse nome no app")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_screen_by_name(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((id, name)): Path<(Uuid, String)>,
) -> Result<Json<Screen>, AppError> {
    Ok(Json(app_state.screen_service.get_by_name(user.id, id, &name).await?))
}

#[utoipa::path(
    get,
    path = "/api/apps/{id}/screens/{child_id}",
    tag = "Screens",
    params(
        ("id" = Uuid, Path, description = "ID do App"),
        ("child_id" = Uuid, Path, description = "ID da tela")
    ),
    responses(
        (status = 200, description = "Tela", body = Screen),
        (status = 404, description = "Tela não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_screen(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((id, child_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Screen>, AppError> {
    Ok(Json(app_state.screen_service.get(user.id, id, child_id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/apps/{id}/screens/{child_id}",
    tag = "Screens",
    request_body = UpdateScreenPayload,
    params(
        ("id" = Uuid, Path, description = "ID do App"),
        ("child_id" = Uuid, Path, description = "ID da tela")
    ),
    responses(
        (status = 200, description = "Tela atualizada", body = Screen)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_screen(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((id, child_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateScreenPayload>,
) -> Result<Json<Screen>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let updated = app_state
        .screen_service
        .update(user.id, id, child_id, payload)
        .await?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/apps/{id}/screens/{child_id}",
    tag = "Screens",
    params(
        ("id" = Uuid, Path, description = "ID do App"),
        ("child_id" = Uuid, Path, description = "ID da tela")
    ),
    responses(
        (status = 204, description = "Tela excluída"),
        (status = 404, description = "Tela não encontrada (ou já excluída)")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_screen(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((id, child_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    app_state.screen_service.delete(user.id, id, child_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
