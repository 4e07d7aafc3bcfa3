// src/services/source_file_service.rs

use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{PageParams, Paginated},
        validation::clean_name,
    },
    db::store::Update,
    models::source_file::{CreateSourceFilePayload, SourceFile, UpdateSourceFilePayload},
    services::child_service::ChildService,
};

// Controllers do app (código-fonte guardado como texto)
#[derive(Clone)]
pub struct SourceFileService {
    children: ChildService<SourceFile>,
}

impl SourceFileService {
    pub fn new(children: ChildService<SourceFile>) -> Self {
        Self { children }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        app_id: Uuid,
        payload: CreateSourceFilePayload,
    ) -> Result<SourceFile, AppError> {
        let file = SourceFile::new(clean_name(&payload.name)?, app_id, user_id, payload.content);
        self.children.create(user_id, file).await
    }

    pub async fn get(&self, user_id: Uuid, app_id: Uuid, file_id: Uuid) -> Result<SourceFile, AppError> {
        self.children.get(user_id, app_id, file_id).await
    }

    pub async fn get_by_name(&self, user_id: Uuid, app_id: Uuid, name: &str) -> Result<SourceFile, AppError> {
        self.children.get_by_name(user_id, app_id, name).await
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        app_id: Uuid,
        params: PageParams,
    ) -> Result<Paginated<SourceFile>, AppError> {
        self.children.list(user_id, app_id, params).await
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        app_id: Uuid,
        file_id: Uuid,
        payload: UpdateSourceFilePayload,
    ) -> Result<SourceFile, AppError> {
        let update = Update::new().set_if("content", payload.content);
        self.children
            .update(
                user_id,
                app_id,
                file_id,
                payload.name.as_deref().map(clean_name).transpose()?,
                payload.status,
                update,
            )
            .await
    }

    pub async fn delete(&self, user_id: Uuid, app_id: Uuid, file_id: Uuid) -> Result<(), AppError> {
        self.children.delete(user_id, app_id, file_id).await
    }
}
