// src/services/organization_service.rs

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
        membership::{MemberRole, Membership, MembershipStatus},
        organization::Organization,
    },
    services::{
        authorizer::{Guarded, Operation, PostCommitAuthorizer, Principal},
        soft_delete::SoftDeleteFilter,
        transaction::TransactionRunner,
    },
};

#[derive(Clone)]
pub struct OrganizationService {
    runner: TransactionRunner,
    authorizer: PostCommitAuthorizer,
    limits: PageLimits,
}

impl OrganizationService {
    pub fn new(runner: TransactionRunner, authorizer: PostCommitAuthorizer, limits: PageLimits) -> Self {
        Self {
            runner,
            authorizer,
            limits,
        }
    }

    /// Cria a organização e torna o criador `owner`, numa única transação.
    pub async fn create(&self, user_id: Uuid, name: &str) -> Result<Organization, AppError> {
        let authorizer = self.authorizer.clone();
        let organization = Organization::new(clean_name(name)?, user_id);

        let created = self
            .runner
            .run(move |tx| {
                Box::pin(async move {
                    // 1. Organização
                    let created = tx.insert(&organization).await?;

                    // 2. Associação do criador como dono
                    let owner = Membership::new(
                        created.id,
                        user_id,
                        MemberRole::Owner,
                        MembershipStatus::Active,
                        user_id,
                    );
                    tx.insert(&owner).await?;

                    // 3. Checagem sobre o estado já gravado
                    let principal = Principal::resolve(tx, user_id).await?;
                    authorizer.check(&principal, Operation::Update, &[Guarded::Organization(&created)])?;

                    Ok(created)
                })
            })
            .await?;

        tracing::info!(organization_id = %created.id, %user_id, "Organização criada");
        Ok(created)
    }

    pub async fn get(&self, user_id: Uuid, organization_id: Uuid) -> Result<Organization, AppError> {
        let authorizer = self.authorizer.clone();

        self.runner
            .run(move |tx| {
                Box::pin(async move {
                    let organization = tx
                        .find_one::<Organization>(&SoftDeleteFilter::visible(Filter::by_id(
                            organization_id,
                        )))
                        .await?;
                    let principal = Principal::resolve(tx, user_id).await?;
                    authorizer.check_lookup(
                        &principal,
                        Operation::Read,
                        &[organization.as_ref().map(Guarded::Organization)],
                    )?;

                    organization.ok_or_else(|| AppError::not_found("Organização"))
                })
            })
            .await
    }

    /// Organizações em que o usuário tem associação ativa.
    pub async fn list_mine(
        &self,
        user_id: Uuid,
        params: PageParams,
    ) -> Result<Paginated<Organization>, AppError> {
        let (page, window) = SoftDeleteFilter::list_window(&self.limits, &params);

        let (items, total) = self
            .runner
            .run(move |tx| {
                Box::pin(async move {
                    let principal = Principal::resolve(tx, user_id).await?;
                    let ids: Vec<Value> = principal
                        .organizations()
                        .map(|id| Value::String(id.to_string()))
                        .collect();

                    let filter = SoftDeleteFilter::visible(Filter::new().one_of("id", ids));
                    tx.find_page::<Organization>(&filter, window).await
                })
            })
            .await?;

        Ok(Paginated::new(items, total, page))
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        name: Option<String>,
    ) -> Result<Organization, AppError> {
        let authorizer = self.authorizer.clone();
        let update = Update::new().set_if("name", name.as_deref().map(clean_name).transpose()?);

        self.runner
            .run(move |tx| {
                Box::pin(async move {
                    let updated = tx
                        .find_one_and_update::<Organization>(
                            &SoftDeleteFilter::visible(Filter::by_id(organization_id)),
                            &update,
                        )
                        .await?
                        .ok_or_else(|| AppError::not_found("Organização"))?;

                    let principal = Principal::resolve(tx, user_id).await?;
                    authorizer.check(&principal, Operation::Update, &[Guarded::Organization(&updated)])?;
                    Ok(updated)
                })
            })
            .await
    }

    /// Exclusão lógica. Recusada enquanto a organização ainda tiver apps.
    pub async fn delete(&self, user_id: Uuid, organization_id: Uuid) -> Result<(), AppError> {
        let authorizer = self.authorizer.clone();

        self.runner
            .run(move |tx| {
                Box::pin(async move {
                    let deleted = tx
                        .find_one_and_update::<Organization>(
                            &SoftDeleteFilter::deletable(Filter::by_id(organization_id)),
                            &SoftDeleteFilter::mark_deleted(),
                        )
                        .await?
                        .ok_or_else(|| AppError::not_found("Organização"))?;

                    let principal = Principal::resolve(tx, user_id).await?;
                    authorizer.check(&principal, Operation::Delete, &[Guarded::Organization(&deleted)])?;

                    if !deleted.apps.is_empty() {
                        return Err(AppError::Conflict(format!(
                            "A organização ainda possui {} app(s)",
                            deleted.apps.len()
                        )));
                    }
                    Ok(())
                })
            })
            .await?;

        tracing::info!(%organization_id, %user_id, "Organização excluída");
        Ok(())
    }
}
