// src/services/app_service.rs

use serde_json::Value;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{PageLimits, PageParams, Paginated},
        validation::clean_name,
    },
    db::store::{Filter, Update},
    models::{
        app::{App, AppListQuery, AppStatus, ChildList, CreateAppPayload, UpdateAppPayload},
        organization::Organization,
    },
    services::{
        authorizer::{Guarded, Operation, PostCommitAuthorizer, Principal},
        cross_reference::CrossReferenceMaintainer,
        soft_delete::SoftDeleteFilter,
        transaction::{TransactionRunner, TxContext},
    },
};

#[derive(Clone)]
pub struct AppService {
    runner: TransactionRunner,
    authorizer: PostCommitAuthorizer,
    limits: PageLimits,
}

/// Escopo de unicidade do nome: a organização, ou o criador para apps pessoais.
fn name_scope(organization: Option<Uuid>, creator: Uuid) -> Filter {
    match organization {
        Some(org) => Filter::new().eq("organization", org.to_string()),
        None => Filter::new()
            .eq("organization", Value::Null)
            .eq("creator", creator.to_string()),
    }
}

pub(crate) async fn visible_app(tx: &mut TxContext, app_id: Uuid) -> Result<Option<App>, AppError> {
    tx.find_one::<App>(&SoftDeleteFilter::visible(Filter::by_id(app_id)))
        .await
}

impl AppService {
    pub fn new(runner: TransactionRunner, authorizer: PostCommitAuthorizer, limits: PageLimits) -> Self {
        Self {
            runner,
            authorizer,
            limits,
        }
    }

    pub async fn create(&self, user_id: Uuid, payload: CreateAppPayload) -> Result<App, AppError> {
        let authorizer = self.authorizer.clone();
        let app = App::new(
            clean_name(&payload.name)?,
            payload.description,
            payload.organization,
            user_id,
        );

        let created = self
            .runner
            .run(move |tx| {
                Box::pin(async move {
                    // 1. Vínculo no container (se o app pertence a uma organização)
                    let organization = match app.organization {
                        Some(org_id) => Some(
                            CrossReferenceMaintainer::link_child::<Organization>(
                                tx,
                                org_id,
                                ChildList::Apps,
                                app.id,
                            )
                            .await?,
                        ),
                        None => None,
                    };

                    // 2. Nome único no escopo
                    SoftDeleteFilter::ensure_name_available::<App>(
                        tx,
                        name_scope(app.organization, user_id),
                        &app.name,
                        None,
                    )
                    .await?;

                    // 3. Grava o app
                    let created = tx.insert(&app).await?;

                    // 4. Autorização sobre o estado pós-mutação
                    let principal = Principal::resolve(tx, user_id).await?;
                    match &organization {
                        Some(org) => authorizer.check(
                            &principal,
                            Operation::Create,
                            &[Guarded::Organization(org)],
                        )?,
                        None => authorizer.check(&principal, Operation::Update, &[Guarded::App(&created)])?,
                    }

                    Ok(created)
                })
            })
            .await?;

        tracing::info!(app_id = %created.id, %user_id, "App criado");
        Ok(created)
    }

    pub async fn get(&self, user_id: Uuid, app_id: Uuid) -> Result<App, AppError> {
        let authorizer = self.authorizer.clone();

        self.runner
            .run(move |tx| {
                Box::pin(async move {
                    let app = visible_app(tx, app_id).await?;
                    let principal = Principal::resolve(tx, user_id).await?;
                    authorizer.check_lookup(&principal, Operation::Read, &[app.as_ref().map(Guarded::App)])?;
                    app.ok_or_else(|| AppError::not_found("App"))
                })
            })
            .await
    }

    /// Apps de uma organização (`?organization=`) ou, sem ela, os apps pessoais.
    pub async fn list(&self, user_id: Uuid, query: AppListQuery) -> Result<Paginated<App>, AppError> {
        let authorizer = self.authorizer.clone();
        let (page, window) = SoftDeleteFilter::list_window(
            &self.limits,
            &PageParams {
                page: query.page,
                limit: query.limit,
            },
        );
        let organization_id = query.organization;

        let (items, total) = self
            .runner
            .run(move |tx| {
                Box::pin(async move {
                    if let Some(org_id) = organization_id {
                        let organization = tx
                            .find_one::<Organization>(&SoftDeleteFilter::visible(Filter::by_id(org_id)))
                            .await?;
                        let principal = Principal::resolve(tx, user_id).await?;
                        authorizer.check_lookup(
                            &principal,
                            Operation::Read,
                            &[organization.as_ref().map(Guarded::Organization)],
                        )?;
                    }

                    let filter = SoftDeleteFilter::visible(name_scope(organization_id, user_id));
                    tx.find_page::<App>(&filter, window).await
                })
            })
            .await?;

        Ok(Paginated::new(items, total, page))
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        app_id: Uuid,
        payload: UpdateAppPayload,
    ) -> Result<App, AppError> {
        SoftDeleteFilter::reject_deleted_status(payload.status.as_ref().map(AppStatus::as_str))?;
        let authorizer = self.authorizer.clone();
        let name = payload.name.as_deref().map(clean_name).transpose()?;
        let update = Update::new()
            .set_if("name", name.clone())
            .set_if("description", payload.description)
            .set_if("status", payload.status.map(|s| s.as_str()));

        self.runner
            .run(move |tx| {
                Box::pin(async move {
                    let current = visible_app(tx, app_id)
                        .await?
                        .ok_or_else(|| AppError::not_found("App"))?;

                    if let Some(name) = &name {
                        SoftDeleteFilter::ensure_name_available::<App>(
                            tx,
                            name_scope(current.organization, current.creator),
                            name,
                            Some(app_id),
                        )
                        .await?;
                    }

                    let updated = tx
                        .find_one_and_update::<App>(
                            &SoftDeleteFilter::visible(Filter::by_id(app_id)),
                            &update,
                        )
                        .await?
                        .ok_or_else(|| AppError::not_found("App"))?;

                    let principal = Principal::resolve(tx, user_id).await?;
                    authorizer.check(&principal, Operation::Update, &[Guarded::App(&updated)])?;
                    Ok(updated)
                })
            })
            .await
    }

    /// Exclusão lógica do app e retirada da lista `apps` da organização.
    pub async fn delete(&self, user_id: Uuid, app_id: Uuid) -> Result<(), AppError> {
        let authorizer = self.authorizer.clone();

        self.runner
            .run(move |tx| {
                Box::pin(async move {
                    let deleted = tx
                        .find_one_and_update::<App>(
                            &SoftDeleteFilter::deletable(Filter::by_id(app_id)),
                            &SoftDeleteFilter::mark_deleted(),
                        )
                        .await?
                        .ok_or_else(|| AppError::not_found("App"))?;

                    if let Some(org_id) = deleted.organization {
                        CrossReferenceMaintainer::unlink_child::<Organization>(
                            tx,
                            org_id,
                            ChildList::Apps,
                            app_id,
                        )
                        .await?;
                    }

                    let principal = Principal::resolve(tx, user_id).await?;
                    authorizer.check(&principal, Operation::Delete, &[Guarded::App(&deleted)])
                })
            })
            .await?;

        tracing::info!(%app_id, %user_id, "App excluído");
        Ok(())
    }
}
