// src/handlers/queries.rs

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
    models::query::{CreateQueryPayload, QueryTemplate, UpdateQueryPayload},
};

#[utoipa::path(
    post,
    path = "/api/apps/{id}/queries",
    tag = "Queries",
    request_body = CreateQueryPayload,
    params(("id" = Uuid, Path, description = "ID do App")),
    responses(
        (status = 201, description = "Query criada", body = QueryTemplate),
        (status = 403, description = "Sem permissão para criar queries neste app"),
        (status = 404, description = "App não encontrado"),
        (status = 409, description = "Já existe uma query com esse nome no app")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_query(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateQueryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let created = app_state.query_service.create(user.id, id, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/apps/{id}/queries",
    tag = "Queries",
    params(
        ("id" = Uuid, Path, description = "ID do App"),
        PageParams
    ),
    responses(
        (status = 200, description = "Queries do app: {items, total, page, limit}")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_queries(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = params?;
    let page = app_state.query_service.list(user.id, id, params).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/apps/{id}/queries/by-name/{name}",
    tag = "Queries",
    params(
        ("id" = Uuid, Path, description = "ID do App"),
        ("name" = String, Path, description = "Nome da query")
    ),
    responses(
        (status = 200, description = "Query", body = QueryTemplate),
        (status = 404, description = "Nenhuma query com esse nome no app")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_query_by_name(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((id, name)): Path<(Uuid, String)>,
) -> Result<Json<QueryTemplate>, AppError> {
    Ok(Json(app_state.query_service.get_by_name(user.id, id, &name).await?))
}

#[utoipa::path(
    get,
    path = "/api/apps/{id}/queries/{child_id}",
    tag = "Queries",
    params(
        ("id" = Uuid, Path, description = "ID do App"),
        ("child_id" = Uuid, Path, description = "ID da query")
    ),
    responses(
        (status = 200, description = "Query", body = QueryTemplate),
        (status = 404, description = "Query não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_query(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((id, child_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<QueryTemplate>, AppError> {
    Ok(Json(app_state.query_service.get(user.id, id, child_id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/apps/{id}/queries/{child_id}",
    tag = "Queries",
    request_body = UpdateQueryPayload,
    params(
        ("id" = Uuid, Path, description = "ID do App"),
        ("child_id" = Uuid, Path, description = "ID da query")
    ),
    responses(
        (status = 200, description = "Query atualizada", body = QueryTemplate)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_query(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((id, child_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateQueryPayload>,
) -> Result<Json<QueryTemplate>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let updated = app_state
        .query_service
        .update(user.id, id, child_id, payload)
        .await?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/apps/{id}/queries/{child_id}",
    tag = "Queries",
    params(
        ("id" = Uuid, Path, description = "ID do App"),
        ("child_id" = Uuid, Path, description = "ID da query")
    ),
    responses(
        (status = 204, description = "Query excluída"),
        (status = 404, description = "Query não encontrada (ou já excluída)")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_query(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((id, child_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    app_state.query_service.delete(user.id, id, child_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
