//! Helpers compartilhados pelos testes de integração.
//!
//! Tudo roda sobre o `MemoryStore`: nenhum banco externo é necessário.

#![allow(dead_code)]

use std::sync::Arc;

use console_backend::{
    common::pagination::PageLimits,
    config::{AppState, Config},
    db::{Collection, MemoryStore},
    models::{
        app::{App, CreateAppPayload},
        membership::MemberRole,
        resource::{CreateResourcePayload, ResourceConfig, SqlConfig},
    },
};
use serde_json::Value;
use uuid::Uuid;

pub struct TestApp {
    pub store: MemoryStore,
    pub state: AppState,
}

pub fn test_config() -> Config {
    Config {
        database_url: None,
        jwt_secret: "segredo-de-teste".to_string(),
        jwt_ttl_hours: 1,
        bind_addr: "127.0.0.1:0".to_string(),
        db_max_connections: 1,
        // Custo mínimo do bcrypt, para os testes não ficarem lentos
        bcrypt_cost: 4,
        page_limits: PageLimits::default(),
    }
}

pub fn setup() -> TestApp {
    let store = MemoryStore::new();
    let state = AppState::new(&test_config(), Arc::new(store.clone()));
    TestApp { store, state }
}

impl TestApp {
    /// Registra um usuário e devolve `(id, token)`.
    pub async fn user(&self, name: &str) -> (Uuid, String) {
        let email = format!("{}-{}@exemplo.com", name.to_lowercase(), Uuid::new_v4());
        let response = self
            .state
            .auth_service
            .register_user(&email, name, "senha-forte")
            .await
            .expect("registro");
        (response.user.id, response.token)
    }

    pub async fn email_of(&self, user_id: Uuid) -> String {
        self.raw(Collection::Users, user_id).await["email"]
            .as_str()
            .expect("email")
            .to_string()
    }

    pub async fn organization(&self, owner: Uuid) -> Uuid {
        self.state
            .organization_service
            .create(owner, "Acme")
            .await
            .expect("organização")
            .id
    }

    /// Convida e já aceita: o usuário fica ativo com o papel dado.
    pub async fn join(&self, owner: Uuid, organization: Uuid, user: Uuid, role: MemberRole) {
        let email = self.email_of(user).await;
        self.state
            .membership_service
            .invite(owner, organization, &email, role)
            .await
            .expect("convite");
        self.state
            .membership_service
            .accept(user, organization)
            .await
            .expect("aceite");
    }

    pub async fn app_in(&self, creator: Uuid, organization: Option<Uuid>, name: &str) -> App {
        self.state
            .app_service
            .create(
                creator,
                CreateAppPayload {
                    name: name.to_string(),
                    description: None,
                    organization,
                },
            )
            .await
            .expect("app")
    }

    pub async fn raw(&self, collection: Collection, id: Uuid) -> Value {
        self.store
            .raw_get(collection, id)
            .await
            .expect("documento gravado")
    }
}

pub fn postgres_config() -> ResourceConfig {
    ResourceConfig::Postgres(SqlConfig {
        host: "db.interno".to_string(),
        port: 5432,
        database: "vendas".to_string(),
        username: "leitura".to_string(),
        password: "s3nha".to_string(),
        ssl: false,
    })
}

pub fn resource_payload(name: &str) -> CreateResourcePayload {
    CreateResourcePayload {
        name: name.to_string(),
        config: postgres_config(),
    }
}

/// Ids de uma lista JSON de ids (ex.: `App.resources`).
pub fn ids(value: &Value) -> Vec<Uuid> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().and_then(|s| Uuid::parse_str(s).ok()))
                .collect()
        })
        .unwrap_or_default()
}
