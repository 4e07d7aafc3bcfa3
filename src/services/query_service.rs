// src/services/query_service.rs

use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{PageParams, Paginated},
        validation::clean_name,
    },
    db::store::{Filter, Update},
    models::{
        app::ChildStatus,
        query::{CreateQueryPayload, QueryTemplate, UpdateQueryPayload},
        resource::Resource,
    },
    services::{
        child_service::{create_child, update_child, ChildService},
        soft_delete::SoftDeleteFilter,
        transaction::TxContext,
    },
};

#[derive(Clone)]
pub struct QueryService {
    children: ChildService<QueryTemplate>,
}

// A query só pode apontar para um resource visível do mesmo app.
async fn ensure_resource_in_app(
    tx: &mut TxContext,
    app_id: Uuid,
    resource_id: Uuid,
) -> Result<Resource, AppError> {
    let filter = SoftDeleteFilter::visible(
        Filter::by_id(resource_id).eq("app", app_id.to_string()),
    );
    tx.find_one::<Resource>(&filter)
        .await?
        .ok_or_else(|| AppError::not_found("Resource"))
}

impl QueryService {
    pub fn new(children: ChildService<QueryTemplate>) -> Self {
        Self { children }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        app_id: Uuid,
        payload: CreateQueryPayload,
    ) -> Result<QueryTemplate, AppError> {
        let authorizer = self.children.authorizer.clone();
        let query = QueryTemplate::new(
            clean_name(&payload.name)?,
            app_id,
            payload.resource,
            user_id,
            payload.body,
            payload.variables,
        );

        let created = self
            .children
            .runner
            .run(move |tx| {
                Box::pin(async move {
                    ensure_resource_in_app(tx, query.app, query.resource).await?;
                    create_child(tx, &authorizer, user_id, query).await
                })
            })
            .await?;

        tracing::info!(query_id = %created.id, %app_id, "Query criada");
        Ok(created)
    }

    pub async fn get(&self, user_id: Uuid, app_id: Uuid, query_id: Uuid) -> Result<QueryTemplate, AppError> {
        self.children.get(user_id, app_id, query_id).await
    }

    pub async fn get_by_name(&self, user_id: Uuid, app_id: Uuid, name: &str) -> Result<QueryTemplate, AppError> {
        self.children.get_by_name(user_id, app_id, name).await
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        app_id: Uuid,
        params: PageParams,
    ) -> Result<Paginated<QueryTemplate>, AppError> {
        self.children.list(user_id, app_id, params).await
    }

    /// Atualiza a query; `resource` permite apontá-la para outro resource do app.
    pub async fn update(
        &self,
        user_id: Uuid,
        app_id: Uuid,
        query_id: Uuid,
        payload: UpdateQueryPayload,
    ) -> Result<QueryTemplate, AppError> {
        SoftDeleteFilter::reject_deleted_status(payload.status.as_ref().map(ChildStatus::as_str))?;
        let authorizer = self.children.authorizer.clone();
        let name = payload.name.as_deref().map(clean_name).transpose()?;
        let resource = payload.resource;
        let update = Update::new()
            .set_if("name", name.clone())
            .set_if("resource", resource.map(|id| id.to_string()))
            .set_if("body", payload.body)
            .set_if("variables", payload.variables)
            .set_if("status", payload.status.map(|s| s.as_str()));

        self.children
            .runner
            .run(move |tx| {
                Box::pin(async move {
                    if let Some(resource_id) = resource {
                        ensure_resource_in_app(tx, app_id, resource_id).await?;
                    }
                    update_child(tx, &authorizer, user_id, app_id, query_id, name.as_deref(), &update)
                        .await
                })
            })
            .await
    }

    pub async fn delete(&self, user_id: Uuid, app_id: Uuid, query_id: Uuid) -> Result<(), AppError> {
        self.children.delete(user_id, app_id, query_id).await
    }
}
