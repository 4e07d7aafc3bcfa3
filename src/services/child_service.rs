// src/services/child_service.rs

//! Motor genérico dos filhos de um App (resources, queries, controllers, telas).
//!
//! Ordem das escritas dentro da unidade de trabalho: vínculo no pai, checagem de
//! nome, gravação do filho, resolução do principal e, por último, autorização.

use std::marker::PhantomData;

use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{PageLimits, PageParams, Paginated},
    },
    db::store::{Filter, Update},
    models::app::{App, ChildDocument, ChildStatus},
    services::{
        app_service::visible_app,
        authorizer::{Guarded, Operation, PostCommitAuthorizer, Principal},
        cross_reference::CrossReferenceMaintainer,
        soft_delete::SoftDeleteFilter,
        transaction::{TransactionRunner, TxContext},
    },
};

fn in_app(app_id: Uuid) -> Filter {
    Filter::new().eq("app", app_id.to_string())
}

/// Cria o filho já montado (id, app, criador) dentro da transação corrente.
pub async fn create_child<C: ChildDocument>(
    tx: &mut TxContext,
    authorizer: &PostCommitAuthorizer,
    user_id: Uuid,
    child: C,
) -> Result<C, AppError> {
    // 1. Vínculo no App (falha com NotFound se o app não existe)
    let app = CrossReferenceMaintainer::link_child::<App>(tx, child.app(), C::LIST, child.id()).await?;

    // 2. Nome único entre os filhos visíveis do app
    SoftDeleteFilter::ensure_name_available::<C>(tx, in_app(app.id), child.name(), None).await?;

    // 3. Grava o filho
    let created = tx.insert(&child).await?;

    // 4. Autorização pós-mutação
    let principal = Principal::resolve(tx, user_id).await?;
    authorizer.check(&principal, Operation::Update, &[Guarded::App(&app)])?;

    Ok(created)
}

/// Aplica `update` ao filho. `name`, quando presente, é checado por unicidade.
pub async fn update_child<C: ChildDocument>(
    tx: &mut TxContext,
    authorizer: &PostCommitAuthorizer,
    user_id: Uuid,
    app_id: Uuid,
    child_id: Uuid,
    name: Option<&str>,
    update: &Update,
) -> Result<C, AppError> {
    let app = visible_app(tx, app_id)
        .await?
        .ok_or_else(|| AppError::not_found("App"))?;

    if let Some(name) = name {
        SoftDeleteFilter::ensure_name_available::<C>(tx, in_app(app_id), name, Some(child_id)).await?;
    }

    let updated = tx
        .find_one_and_update::<C>(
            &SoftDeleteFilter::visible(Filter::by_id(child_id).eq("app", app_id.to_string())),
            update,
        )
        .await?
        .ok_or_else(|| AppError::not_found(C::ENTITY))?;

    let principal = Principal::resolve(tx, user_id).await?;
    authorizer.check(&principal, Operation::Update, &[Guarded::App(&app)])?;

    Ok(updated)
}

/// Exclusão lógica do filho e retirada do id da lista do app.
pub async fn delete_child<C: ChildDocument>(
    tx: &mut TxContext,
    authorizer: &PostCommitAuthorizer,
    user_id: Uuid,
    app_id: Uuid,
    child_id: Uuid,
) -> Result<C, AppError> {
    let deleted = tx
        .find_one_and_update::<C>(
            &SoftDeleteFilter::deletable(Filter::by_id(child_id).eq("app", app_id.to_string())),
            &SoftDeleteFilter::mark_deleted(),
        )
        .await?
        .ok_or_else(|| AppError::not_found(C::ENTITY))?;

    let app = CrossReferenceMaintainer::unlink_child::<App>(tx, app_id, C::LIST, child_id).await?;

    let principal = Principal::resolve(tx, user_id).await?;
    authorizer.check(&principal, Operation::Update, &[Guarded::App(&app)])?;

    Ok(deleted)
}

/// Leitura de um filho: o app precisa existir e ser legível pelo principal.
pub async fn find_child<C: ChildDocument>(
    tx: &mut TxContext,
    authorizer: &PostCommitAuthorizer,
    user_id: Uuid,
    app_id: Uuid,
    filter: Filter,
) -> Result<C, AppError> {
    let app = visible_app(tx, app_id).await?;
    let principal = Principal::resolve(tx, user_id).await?;
    authorizer.check_lookup(&principal, Operation::Read, &[app.as_ref().map(Guarded::App)])?;

    tx.find_one::<C>(&SoftDeleteFilter::visible(filter.eq("app", app_id.to_string())))
        .await?
        .ok_or_else(|| AppError::not_found(C::ENTITY))
}

#[derive(Clone)]
pub struct ChildService<C> {
    pub(crate) runner: TransactionRunner,
    pub(crate) authorizer: PostCommitAuthorizer,
    limits: PageLimits,
    _child: PhantomData<fn() -> C>,
}

impl<C: ChildDocument> ChildService<C> {
    pub fn new(runner: TransactionRunner, authorizer: PostCommitAuthorizer, limits: PageLimits) -> Self {
        Self {
            runner,
            authorizer,
            limits,
            _child: PhantomData,
        }
    }

    pub async fn create(&self, user_id: Uuid, child: C) -> Result<C, AppError> {
        let authorizer = self.authorizer.clone();
        let created = self
            .runner
            .run(move |tx| Box::pin(async move { create_child(tx, &authorizer, user_id, child).await }))
            .await?;

        tracing::info!(entity = C::ENTITY, id = %created.id(), app_id = %created.app(), "Criado");
        Ok(created)
    }

    pub async fn get(&self, user_id: Uuid, app_id: Uuid, child_id: Uuid) -> Result<C, AppError> {
        let authorizer = self.authorizer.clone();
        self.runner
            .run(move |tx| {
                Box::pin(async move {
                    find_child(tx, &authorizer, user_id, app_id, Filter::by_id(child_id)).await
                })
            })
            .await
    }

    pub async fn get_by_name(&self, user_id: Uuid, app_id: Uuid, name: &str) -> Result<C, AppError> {
        let authorizer = self.authorizer.clone();
        let filter = Filter::new().eq("name", name);
        self.runner
            .run(move |tx| {
                Box::pin(async move { find_child(tx, &authorizer, user_id, app_id, filter).await })
            })
            .await
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        app_id: Uuid,
        params: PageParams,
    ) -> Result<Paginated<C>, AppError> {
        let authorizer = self.authorizer.clone();
        let (page, window) = SoftDeleteFilter::list_window(&self.limits, &params);

        let (items, total) = self
            .runner
            .run(move |tx| {
                Box::pin(async move {
                    let app = visible_app(tx, app_id).await?;
                    let principal = Principal::resolve(tx, user_id).await?;
                    authorizer.check_lookup(&principal, Operation::Read, &[app.as_ref().map(Guarded::App)])?;

                    tx.find_page::<C>(&SoftDeleteFilter::visible(in_app(app_id)), window)
                        .await
                })
            })
            .await?;

        Ok(Paginated::new(items, total, page))
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        app_id: Uuid,
        child_id: Uuid,
        name: Option<String>,
        status: Option<ChildStatus>,
        update: Update,
    ) -> Result<C, AppError> {
        SoftDeleteFilter::reject_deleted_status(status.as_ref().map(ChildStatus::as_str))?;
        let authorizer = self.authorizer.clone();
        let update = update
            .set_if("name", name.clone())
            .set_if("status", status.map(|s| s.as_str()));

        self.runner
            .run(move |tx| {
                Box::pin(async move {
                    update_child(tx, &authorizer, user_id, app_id, child_id, name.as_deref(), &update)
                        .await
                })
            })
            .await
    }

    pub async fn delete(&self, user_id: Uuid, app_id: Uuid, child_id: Uuid) -> Result<(), AppError> {
        let authorizer = self.authorizer.clone();
        let deleted: C = self
            .runner
            .run(move |tx| {
                Box::pin(async move { delete_child(tx, &authorizer, user_id, app_id, child_id).await })
            })
            .await?;

        tracing::info!(entity = C::ENTITY, id = %deleted.id(), %app_id, "Excluído");
        Ok(())
    }
}
