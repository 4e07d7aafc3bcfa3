// src/models/organization.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::store::{Collection, Document};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrganizationStatus {
    Active,
    Deleted,
}

// Uma organização agrupa apps e membros; é o "container" dos apps
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,
    #[schema(example = "Acme")]
    pub name: String,
    pub creator: Uuid,
    pub status: OrganizationStatus,
    pub apps: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    pub fn new(name: String, creator: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            creator,
            status: OrganizationStatus::Active,
            apps: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Document for Organization {
    const COLLECTION: Collection = Collection::Organizations;
    const ENTITY: &'static str = "Organização";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrganizationPayload {
    #[validate(
        length(min = 1, max = 100, message = "O nome da organização é obrigatório."),
        custom(function = "crate::common::validation::not_blank")
    )]
    #[schema(example = "Acme")]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateOrganizationPayload {
    #[validate(
        length(min = 1, max = 100, message = "O nome da organização é obrigatório."),
        custom(function = "crate::common::validation::not_blank")
    )]
    pub name: Option<String>,
}
