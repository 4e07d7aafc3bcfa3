// src/models/source_file.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::store::{Collection, Document};
use crate::models::app::{ChildDocument, ChildList, ChildStatus};

// Código-fonte de um controller do app (exposto em /controllers)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourceFile {
    pub id: Uuid,
    #[schema(example = "checkout")]
    pub name: String,
    pub app: Uuid,
    pub creator: Uuid,
    pub status: ChildStatus,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SourceFile {
    pub fn new(name: String, app: Uuid, creator: Uuid, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            app,
            creator,
            status: ChildStatus::Enabled,
            content,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Document for SourceFile {
    const COLLECTION: Collection = Collection::SourceFiles;
    const ENTITY: &'static str = "Controller";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl ChildDocument for SourceFile {
    const LIST: ChildList = ChildList::SourceFiles;

    fn name(&self) -> &str {
        &self.name
    }

    fn app(&self) -> Uuid {
        self.app
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSourceFilePayload {
    #[validate(
        length(min = 1, max = 100, message = "O nome do controller é obrigatório."),
        custom(function = "crate::common::validation::not_blank")
    )]
    pub name: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateSourceFilePayload {
    #[validate(
        length(min = 1, max = 100, message = "O nome do controller é obrigatório."),
        custom(function = "crate::common::validation::not_blank")
    )]
    pub name: Option<String>,
    pub content: Option<String>,
    pub status: Option<ChildStatus>,
}
