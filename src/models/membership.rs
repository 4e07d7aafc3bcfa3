// src/models/membership.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::store::{Collection, Document};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Owner,
    Member,
    Viewer,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Owner => "owner",
            MemberRole::Member => "member",
            MemberRole::Viewer => "viewer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Invited,
    Active,
    Deleted,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::Invited => "invited",
            MembershipStatus::Active => "active",
            MembershipStatus::Deleted => "deleted",
        }
    }
}

// A "ponte" Usuário-Organização, com o papel do usuário
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: Uuid,
    pub organization: Uuid,
    pub user: Uuid,
    pub role: MemberRole,
    pub status: MembershipStatus,
    pub invited_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(
        organization: Uuid,
        user: Uuid,
        role: MemberRole,
        status: MembershipStatus,
        invited_by: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            organization,
            user,
            role,
            status,
            invited_by,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Document for Membership {
    const COLLECTION: Collection = Collection::Memberships;
    const ENTITY: &'static str = "Membro";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct InviteMemberPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    pub role: MemberRole,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateMemberRolePayload {
    pub role: MemberRole,
}
