// src/services/resource_service.rs

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
        resource::{CreateResourcePayload, Resource, ResourceDto, UpdateResourcePayload},
    },
    services::{
        child_service::{update_child, ChildService},
        soft_delete::SoftDeleteFilter,
    },
};

// Conexões com bancos externos. Nunca devolve segredos: só `ResourceDto`.
#[derive(Clone)]
pub struct ResourceService {
    children: ChildService<Resource>,
}

impl ResourceService {
    pub fn new(children: ChildService<Resource>) -> Self {
        Self { children }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        app_id: Uuid,
        payload: CreateResourcePayload,
    ) -> Result<ResourceDto, AppError> {
        payload.config.validate()?;

        let resource = Resource::new(clean_name(&payload.name)?, app_id, user_id, payload.config);
        let created = self.children.create(user_id, resource).await?;
        Ok(created.into())
    }

    pub async fn get(&self, user_id: Uuid, app_id: Uuid, resource_id: Uuid) -> Result<ResourceDto, AppError> {
        Ok(self.children.get(user_id, app_id, resource_id).await?.into())
    }

    pub async fn get_by_name(&self, user_id: Uuid, app_id: Uuid, name: &str) -> Result<ResourceDto, AppError> {
        Ok(self.children.get_by_name(user_id, app_id, name).await?.into())
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        app_id: Uuid,
        params: PageParams,
    ) -> Result<Paginated<ResourceDto>, AppError> {
        Ok(self
            .children
            .list(user_id, app_id, params)
            .await?
            .map(ResourceDto::from))
    }

    /// Atualiza o resource. Segredos mascarados na configuração recebida
    /// mantêm o valor gravado.
    pub async fn update(
        &self,
        user_id: Uuid,
        app_id: Uuid,
        resource_id: Uuid,
        payload: UpdateResourcePayload,
    ) -> Result<ResourceDto, AppError> {
        SoftDeleteFilter::reject_deleted_status(payload.status.as_ref().map(ChildStatus::as_str))?;
        let authorizer = self.children.authorizer.clone();
        let name = payload.name.as_deref().map(clean_name).transpose()?;
        let status = payload.status;
        let config = payload.config;

        let updated = self
            .children
            .runner
            .run(move |tx| {
                Box::pin(async move {
                    let mut update = Update::new()
                        .set_if("name", name.clone())
                        .set_if("status", status.map(|s| s.as_str()));

                    if let Some(config) = config {
                        let current = tx
                            .find_one::<Resource>(&SoftDeleteFilter::visible(
                                Filter::by_id(resource_id).eq("app", app_id.to_string()),
                            ))
                            .await?
                            .ok_or_else(|| AppError::not_found("Resource"))?;

                        let config = config.restore_secrets(&current.config)?;
                        config.validate()?;
                        update = update.set("config", serde_json::to_value(&config)?);
                    }

                    update_child::<Resource>(
                        tx,
                        &authorizer,
                        user_id,
                        app_id,
                        resource_id,
                        name.as_deref(),
                        &update,
                    )
                    .await
                })
            })
            .await?;

        Ok(updated.into())
    }

    pub async fn delete(&self, user_id: Uuid, app_id: Uuid, resource_id: Uuid) -> Result<(), AppError> {
        self.children.delete(user_id, app_id, resource_id).await
    }
}
