// src/models/app.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::store::{Collection, Document};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AppStatus {
    Private,
    Public,
    Deleted,
}

impl AppStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppStatus::Private => "private",
            AppStatus::Public => "public",
            AppStatus::Deleted => "deleted",
        }
    }
}

// O app do usuário final: container de resources, queries, controllers e telas
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct App {
    pub id: Uuid,
    #[schema(example = "Painel de Vendas")]
    pub name: String,
    pub description: Option<String>,
    /// `None` para apps pessoais (só o criador tem acesso).
    pub organization: Option<Uuid>,
    pub creator: Uuid,
    pub status: AppStatus,
    pub resources: Vec<Uuid>,
    pub queries: Vec<Uuid>,
    pub source_files: Vec<Uuid>,
    pub screens: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl App {
    pub fn new(
        name: String,
        description: Option<String>,
        organization: Option<Uuid>,
        creator: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            organization,
            creator,
            status: AppStatus::Private,
            resources: Vec::new(),
            queries: Vec::new(),
            source_files: Vec::new(),
            screens: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Document for App {
    const COLLECTION: Collection = Collection::Apps;
    const ENTITY: &'static str = "App";

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Listas de referências mantidas pelos containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildList {
    Resources,
    Queries,
    SourceFiles,
    Screens,
    /// `Organization.apps`
    Apps,
}

impl ChildList {
    pub fn field(&self) -> &'static str {
        match self {
            ChildList::Resources => "resources",
            ChildList::Queries => "queries",
            ChildList::SourceFiles => "sourceFiles",
            ChildList::Screens => "screens",
            ChildList::Apps => "apps",
        }
    }

    /// Coleção do documento que carrega esta lista.
    pub fn container(&self) -> Collection {
        match self {
            ChildList::Apps => Collection::Organizations,
            _ => Collection::Apps,
        }
    }
}

// Estados comuns a resources, queries, controllers e telas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChildStatus {
    Enabled,
    Disabled,
    Deleted,
}

impl ChildStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChildStatus::Enabled => "enabled",
            ChildStatus::Disabled => "disabled",
            ChildStatus::Deleted => "deleted",
        }
    }
}

/// Um documento pendurado num App: tem `name`, `app`, `creator` e `status`,
/// e o seu id aparece em uma das listas do App.
pub trait ChildDocument: Document + Clone {
    const LIST: ChildList;

    fn name(&self) -> &str;
    fn app(&self) -> Uuid;
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppPayload {
    #[validate(
        length(min = 1, max = 100, message = "O nome do app é obrigatório."),
        custom(function = "crate::common::validation::not_blank")
    )]
    pub name: String,
    #[validate(length(max = 500, message = "A descrição deve ter no máximo 500 caracteres."))]
    pub description: Option<String>,
    pub organization: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppPayload {
    #[validate(
        length(min = 1, max = 100, message = "O nome do app é obrigatório."),
        custom(function = "crate::common::validation::not_blank")
    )]
    pub name: Option<String>,
    #[validate(length(max = 500, message = "A descrição deve ter no máximo 500 caracteres."))]
    pub description: Option<String>,
    pub status: Option<AppStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AppListQuery {
    /// Lista os apps da organização; sem ela, os apps pessoais
    pub organization: Option<Uuid>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}
