// src/models/screen.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::db::store::{Collection, Document};
use crate::models::app::{ChildDocument, ChildList, ChildStatus};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Screen {
    pub id: Uuid,
    #[schema(example = "Home")]
    pub name: String,
    pub app: Uuid,
    pub creator: Uuid,
    pub status: ChildStatus,
    #[schema(example = "/home")]
    pub route: String,
    /// Árvore de componentes produzida pelo editor; o backend não interpreta.
    #[schema(value_type = Object)]
    pub layout: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Screen {
    pub fn new(name: String, app: Uuid, creator: Uuid, route: String, layout: Value) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            app,
            creator,
            status: ChildStatus::Enabled,
            route,
            layout,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Document for Screen {
    const COLLECTION: Collection = Collection::Screens;
    const ENTITY: &'static str = "Tela";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl ChildDocument for Screen {
    const LIST: ChildList = ChildList::Screens;

    fn name(&self) -> &str {
        &self.name
    }

    fn app(&self) -> Uuid {
        self.app
    }
}

fn validate_route(route: &str) -> Result<(), ValidationError> {
    if !route.starts_with('/') || route.contains(char::is_whitespace) {
        let mut err = ValidationError::new("route");
        err.message = Some("A rota deve começar com '/' e não pode ter espaços.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateScreenPayload {
    #[validate(
        length(min = 1, max = 100, message = "O nome da tela é obrigatório."),
        custom(function = "crate::common::validation::not_blank")
    )]
    pub name: String,
    #[validate(custom(function = "validate_route"))]
    pub route: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub layout: Value,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateScreenPayload {
    #[validate(
        length(min = 1, max = 100, message = "O nome da tela é obrigatório."),
        custom(function = "crate::common::validation::not_blank")
    )]
    pub name: Option<String>,
    #[validate(custom(function = "validate_route"))]
    pub route: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub layout: Option<Value>,
    pub status: Option<ChildStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_must_be_an_absolute_path() {
        assert!(validate_route("/vendas/2024").is_ok());
        assert!(validate_route("vendas").is_err());
        assert!(validate_route("/com espaco").is_err());
    }

    #[test]
    fn optional_route_is_validated_when_present() {
        let payload = UpdateScreenPayload {
            name: None,
            route: Some("sem-barra".into()),
            layout: None,
            status: None,
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn blank_name_fails_validation() {
        let payload = CreateScreenPayload {
            name: "   ".into(),
            route: "/inicio".into(),
            layout: Value::Null,
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }
}
