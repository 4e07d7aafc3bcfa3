// src/handlers/organizations.rs

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
    models::organization::{CreateOrganizationPayload, Organization, UpdateOrganizationPayload},
};

#[utoipa::path(
    post,
    path = "/api/organizations",
    tag = "Organizations",
    request_body = CreateOrganizationPayload,
    responses(
        (status = 201, description = "Organização criada (o criador vira dono)", body = Organization)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_organization(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateOrganizationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let organization = app_state
        .organization_service
        .create(user.id, &payload.name)
        .await?;

    Ok((StatusCode::CREATED, Json(organization)))
}

#[utoipa::path(
    get,
    path = "/api/organizations",
    tag = "Organizations",
    params(PageParams),
    responses(
        (status = 200, description = "Organizações do usuário: {items, total, page, limit}")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_my_organizations(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = params?;
    let page = app_state
        .organization_service
        .list_mine(user.id, params)
        .await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/organizations/{id}",
    tag = "Organizations",
    params(("id" = Uuid, Path, description = "ID da Organização")),
    responses(
        (status = 200, description = "Organização", body = Organization),
        (status = 404, description = "Organização não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_organization(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Organization>, AppError> {
    Ok(Json(app_state.organization_service.get(user.id, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/organizations/{id}",
    tag = "Organizations",
    request_body = UpdateOrganizationPayload,
    params(("id" = Uuid, Path, description = "ID da Organização")),
    responses(
        (status = 200, description = "Organização atualizada", body = Organization),
        (status = 403, description = "Apenas o dono pode alterar")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_organization(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrganizationPayload>,
) -> Result<Json<Organization>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let organization = app_state
        .organization_service
        .update(user.id, id, payload.name)
        .await?;
    Ok(Json(organization))
}

#[utoipa::path(
    delete,
    path = "/api/organizations/{id}",
    tag = "Organizations",
    params(("id" = Uuid, Path, description = "ID da Organização")),
    responses(
        (status = 204, description = "Organização excluída"),
        (status = 409, description = "A organização ainda possui apps")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_organization(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.organization_service.delete(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
