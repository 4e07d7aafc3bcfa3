// src/models/query.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::store::{Collection, Document};
use crate::models::app::{ChildDocument, ChildList, ChildStatus};

// Template de consulta executado contra um resource do mesmo app
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryTemplate {
    pub id: Uuid,
    #[schema(example = "vendasPorMes")]
    pub name: String,
    pub app: Uuid,
    pub resource: Uuid,
    pub creator: Uuid,
    pub status: ChildStatus,
    /// Texto da consulta, com marcadores `{{variavel}}`.
    #[schema(example = "SELECT * FROM vendas WHERE mes = {{mes}}")]
    pub body: String,
    pub variables: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QueryTemplate {
    pub fn new(
        name: String,
        app: Uuid,
        resource: Uuid,
        creator: Uuid,
        body: String,
        variables: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            app,
            resource,
            creator,
            status: ChildStatus::Enabled,
            body,
            variables,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Document for QueryTemplate {
    const COLLECTION: Collection = Collection::Queries;
    const ENTITY: &'static str = "Query";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl ChildDocument for QueryTemplate {
    const LIST: ChildList = ChildList::Queries;

    fn name(&self) -> &str {
        &self.name
    }

    fn app(&self) -> Uuid {
        self.app
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateQueryPayload {
    #[validate(
        length(min = 1, max = 100, message = "O nome da query é obrigatório."),
        custom(function = "crate::common::validation::not_blank")
    )]
    pub name: String,
    pub resource: Uuid,
    #[validate(length(min = 1, message = "O corpo da query é obrigatório."))]
    pub body: String,
    #[serde(default)]
    pub variables: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateQueryPayload {
    #[validate(
        length(min = 1, max = 100, message = "O nome da query é obrigatório."),
        custom(function = "crate::common::validation::not_blank")
    )]
    pub name: Option<String>,
    /// Aponta a query para outro resource do mesmo app.
    pub resource: Option<Uuid>,
    #[validate(length(min = 1, message = "O corpo da query é obrigatório."))]
    pub body: Option<String>,
    pub variables: Option<Vec<String>>,
    pub status: Option<ChildStatus>,
}
