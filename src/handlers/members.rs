// src/handlers/members.rs

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
    models::membership::{InviteMemberPayload, Membership, UpdateMemberRolePayload},
};

#[utoipa::path(
    get,
    path = "/api/organizations/{id}/members",
    tag = "Members",
    params(
        ("id" = Uuid, Path, description = "ID da Organização"),
        PageParams
    ),
    responses(
        (status = 200, description = "Membros da organização: {items, total, page, limit}")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_members(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = params?;
    let page = app_state
        .membership_service
        .list(user.id, id, params)
        .await?;
    Ok(Json(page))
}

#[utoipa::path(
    post,
    path = "/api/organizations/{id}/members",
    tag = "Members",
    request_body = InviteMemberPayload,
    params(("id" = Uuid, Path, description = "ID da Organização")),
    responses(
        (status = 201, description = "Convite criado", body = Membership),
        (status = 409, description = "Usuário já é membro")
    ),
    security(("api_jwt" = []))
)]
pub async fn invite_member(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<InviteMemberPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let invitation = app_state
        .membership_service
        .invite(user.id, id, &payload.email, payload.role)
        .await?;

    Ok((StatusCode::CREATED, Json(invitation)))
}

#[utoipa::path(
    post,
    path = "/api/organizations/{id}/members/accept",
    tag = "Members",
    params(("id" = Uuid, Path, description = "ID da Organização")),
    responses(
        (status = 200, description = "Convite aceito", body = Membership),
        (status = 404, description = "Convite não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn accept_invitation(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Membership>, AppError> {
    Ok(Json(app_state.membership_service.accept(user.id, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/organizations/{id}/members/{user_id}",
    tag = "Members",
    request_body = UpdateMemberRolePayload,
    params(
        ("id" = Uuid, Path, description = "ID da Organização"),
        ("user_id" = Uuid, Path, description = "ID do Usuário membro")
    ),
    responses(
        (status = 200, description = "Papel atualizado", body = Membership),
        (status = 403, description = "Apenas o dono pode gerenciar membros")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_member_role(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((id, member_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateMemberRolePayload>,
) -> Result<Json<Membership>, AppError> {
    let membership = app_state
        .membership_service
        .update_role(user.id, id, member_id, payload.role)
        .await?;
    Ok(Json(membership))
}

#[utoipa::path(
    delete,
    path = "/api/organizations/{id}/members/{user_id}",
    tag = "Members",
    params(
        ("id" = Uuid, Path, description = "ID da Organização"),
        ("user_id" = Uuid, Path, description = "ID do Usuário membro")
    ),
    responses(
        (status = 204, description = "Membro removido")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_member(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    app_state
        .membership_service
        .remove(user.id, id, member_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
