// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::{
    common::pagination::PageLimits,
    db::{DocumentStore, MemoryStore, PostgresStore},
    services::{
        app_service::AppService,
        auth::AuthService,
        authorizer::{AccessRules, PostCommitAuthorizer},
        child_service::ChildService,
        membership_service::MembershipService,
        organization_service::OrganizationService,
        query_service::QueryService,
        resource_service::ResourceService,
        screen_service::ScreenService,
        source_file_service::SourceFileService,
        transaction::TransactionRunner,
    },
};

/// Configuração lida do ambiente (e do `.env`, quando existir).
#[derive(Debug, Clone)]
pub struct Config {
    /// Sem `DATABASE_URL` o servidor sobe com o armazenamento em memória.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub bcrypt_cost: u32,
    pub page_limits: PageLimits,
}

fn var_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} inválida: {raw:?}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty());
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let defaults = PageLimits::default();
        let page_limits = PageLimits {
            min: var_or("PAGE_MIN_LIMIT", defaults.min)?,
            max: var_or("PAGE_MAX_LIMIT", defaults.max)?,
            default: var_or("PAGE_DEFAULT_LIMIT", defaults.default)?,
        };
        if page_limits.min == 0 || page_limits.min > page_limits.max {
            anyhow::bail!(
                "Limites de paginação inconsistentes: min={} max={}",
                page_limits.min,
                page_limits.max
            );
        }

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_ttl_hours: var_or("JWT_TTL_HOURS", 168)?,
            bind_addr: var_or("BIND_ADDR", "0.0.0.0:3000".to_string())?,
            db_max_connections: var_or("DB_MAX_CONNECTIONS", 5)?,
            bcrypt_cost: var_or("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            page_limits,
        })
    }
}

/// Escolhe o armazenamento: Postgres (com migrações) ou memória.
pub async fn connect_store(config: &Config) -> anyhow::Result<Arc<dyn DocumentStore>> {
    let Some(database_url) = &config.database_url else {
        tracing::warn!("DATABASE_URL ausente: usando armazenamento em memória");
        return Ok(Arc::new(MemoryStore::new()));
    };

    // Conecta ao banco de dados, usando '?' para propagar erros
    let db_pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await
        .context("Falha ao conectar ao banco de dados")?;

    tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

    sqlx::migrate!()
        .run(&db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados")?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    Ok(Arc::new(PostgresStore::new(db_pool)))
}

#[derive(Clone)]
pub struct AppState {
    pub runner: TransactionRunner,
    pub authorizer: PostCommitAuthorizer,
    pub auth_service: AuthService,
    pub organization_service: OrganizationService,
    pub membership_service: MembershipService,
    pub app_service: AppService,
    pub resource_service: ResourceService,
    pub query_service: QueryService,
    pub source_file_service: SourceFileService,
    pub screen_service: ScreenService,
}

impl AppState {
    pub fn new(config: &Config, store: Arc<dyn DocumentStore>) -> Self {
        // --- Monta o gráfico de dependências ---
        let runner = TransactionRunner::new(store);
        let authorizer = PostCommitAuthorizer::new(AccessRules::standard());
        let limits = config.page_limits;

        let auth_service = AuthService::new(
            runner.clone(),
            config.jwt_secret.clone(),
            chrono::Duration::hours(config.jwt_ttl_hours),
            config.bcrypt_cost,
        );

        Self {
            organization_service: OrganizationService::new(runner.clone(), authorizer.clone(), limits),
            membership_service: MembershipService::new(runner.clone(), authorizer.clone(), limits),
            app_service: AppService::new(runner.clone(), authorizer.clone(), limits),
            resource_service: ResourceService::new(ChildService::new(
                runner.clone(),
                authorizer.clone(),
                limits,
            )),
            query_service: QueryService::new(ChildService::new(runner.clone(), authorizer.clone(), limits)),
            source_file_service: SourceFileService::new(ChildService::new(
                runner.clone(),
                authorizer.clone(),
                limits,
            )),
            screen_service: ScreenService::new(ChildService::new(runner.clone(), authorizer.clone(), limits)),
            auth_service,
            runner,
            authorizer,
        }
    }
}
