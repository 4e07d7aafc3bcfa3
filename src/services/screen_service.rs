// src/services/screen_service.rs

use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{PageParams, Paginated},
        validation::clean_name,
    },
    db::store::Update,
    models::screen::{CreateScreenPayload, Screen, UpdateScreenPayload},
    services::child_service::ChildService,
};

#[derive(Clone)]
pub struct ScreenService {
    children: ChildService<Screen>,
}

impl ScreenService {
    pub fn new(children: ChildService<Screen>) -> Self {
        Self { children }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        app_id: Uuid,
        payload: CreateScreenPayload,
    ) -> Result<Screen, AppError> {
        let screen = Screen::new(
            clean_name(&payload.name)?,
            app_id,
            user_id,
            payload.route,
            payload.layout,
        );
        self.children.create(user_id, screen).await
    }

    pub async fn get(&self, user_id: Uuid, app_id: Uuid, screen_id: Uuid) -> Result<Screen, AppError> {
        self.children.get(user_id, app_id, screen_id).await
    }

    pub async fn get_by_name(&self, user_id: Uuid, app_id: Uuid, name: &str) -> Result<Screen, AppError> {
        self.children.get_by_name(user_id, app_id, name).await
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        app_id: Uuid,
        params: PageParams,
    ) -> Result<Paginated<Screen>, AppError> {
        self.children.list(user_id, app_id, params).await
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        app_id: Uuid,
        screen_id: Uuid,
        payload: UpdateScreenPayload,
    ) -> Result<Screen, AppError> {
        // O layout é substituído por inteiro; o editor sempre envia a árvore completa.
        let update = Update::new()
            .set_if("route", payload.route)
            .set_if("layout", payload.layout);
        self.children
            .update(
                user_id,
                app_id,
                screen_id,
                payload.name.as_deref().map(clean_name).transpose()?,
                payload.status,
                update,
            )
            .await
    }

    pub async fn delete(&self, user_id: Uuid, app_id: Uuid, screen_id: Uuid) -> Result<(), AppError> {
        self.children.delete(user_id, app_id, screen_id).await
    }
}
