// src/services/membership_service.rs

use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{PageLimits, PageParams, Paginated},
    },
    db::store::{Filter, Update},
    models::{
        auth::User,
        membership::{MemberRole, Membership, MembershipStatus},
        organization::Organization,
    },
    services::{
        authorizer::{Guarded, Operation, PostCommitAuthorizer, Principal},
        soft_delete::SoftDeleteFilter,
        transaction::{TransactionRunner, TxContext},
    },
};

#[derive(Clone)]
pub struct MembershipService {
    runner: TransactionRunner,
    authorizer: PostCommitAuthorizer,
    limits: PageLimits,
}

fn membership_of(organization_id: Uuid, user_id: Uuid) -> Filter {
    SoftDeleteFilter::visible(
        Filter::new()
            .eq("organization", organization_id.to_string())
            .eq("user", user_id.to_string()),
    )
}

async fn visible_organization(
    tx: &mut TxContext,
    organization_id: Uuid,
) -> Result<Organization, AppError> {
    tx.find_one::<Organization>(&SoftDeleteFilter::visible(Filter::by_id(organization_id)))
        .await?
        .ok_or_else(|| AppError::not_found("Organização"))
}

impl MembershipService {
    pub fn new(runner: TransactionRunner, authorizer: PostCommitAuthorizer, limits: PageLimits) -> Self {
        Self {
            runner,
            authorizer,
            limits,
        }
    }

    /// Convida um usuário já cadastrado. Fica `invited` até ele aceitar.
    pub async fn invite(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        email: &str,
        role: MemberRole,
    ) -> Result<Membership, AppError> {
        let authorizer = self.authorizer.clone();
        let email = email.trim().to_lowercase();

        self.runner
            .run(move |tx| {
                Box::pin(async move {
                    let organization = visible_organization(tx, organization_id).await?;

                    let invitee = tx
                        .find_one::<User>(&SoftDeleteFilter::visible(Filter::new().eq("email", email)))
                        .await?
                        .ok_or_else(|| AppError::not_found("Usuário"))?;

                    if tx
                        .find_one::<Membership>(&membership_of(organization_id, invitee.id))
                        .await?
                        .is_some()
                    {
                        return Err(AppError::Conflict(
                            "O usuário já é membro (ou já foi convidado) desta organização".into(),
                        ));
                    }

                    let invitation = Membership::new(
                        organization_id,
                        invitee.id,
                        role,
                        MembershipStatus::Invited,
                        user_id,
                    );
                    let created = tx.insert(&invitation).await?;

                    let principal = Principal::resolve(tx, user_id).await?;
                    authorizer.check(
                        &principal,
                        Operation::ManageMembers,
                        &[Guarded::Organization(&organization)],
                    )?;

                    Ok(created)
                })
            })
            .await
    }

    /// O convidado aceita o próprio convite.
    pub async fn accept(&self, user_id: Uuid, organization_id: Uuid) -> Result<Membership, AppError> {
        let authorizer = self.authorizer.clone();

        self.runner
            .run(move |tx| {
                Box::pin(async move {
                    let organization = visible_organization(tx, organization_id).await?;

                    let filter = Filter::new()
                        .eq("organization", organization_id.to_string())
                        .eq("user", user_id.to_string())
                        .eq("status", MembershipStatus::Invited.as_str());
                    let accepted = tx
                        .find_one_and_update::<Membership>(
                            &filter,
                            &Update::new().set("status", MembershipStatus::Active.as_str()),
                        )
                        .await?
                        .ok_or_else(|| AppError::not_found("Convite"))?;

                    let principal = Principal::resolve(tx, user_id).await?;
                    authorizer.check(
                        &principal,
                        Operation::Read,
                        &[Guarded::Organization(&organization)],
                    )?;

                    Ok(accepted)
                })
            })
            .await
    }

    /// Troca o papel de um membro. A checagem roda depois da troca, então um
    /// dono que rebaixa a si mesmo perde a permissão e a transação é desfeita.
    pub async fn update_role(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        member_id: Uuid,
        role: MemberRole,
    ) -> Result<Membership, AppError> {
        let authorizer = self.authorizer.clone();

        self.runner
            .run(move |tx| {
                Box::pin(async move {
                    let organization = visible_organization(tx, organization_id).await?;

                    let updated = tx
                        .find_one_and_update::<Membership>(
                            &membership_of(organization_id, member_id),
                            &Update::new().set("role", role.as_str()),
                        )
                        .await?
                        .ok_or_else(|| AppError::not_found("Membro"))?;

                    let principal = Principal::resolve(tx, user_id).await?;
                    authorizer.check(
                        &principal,
                        Operation::ManageMembers,
                        &[Guarded::Organization(&organization)],
                    )?;

                    Ok(updated)
                })
            })
            .await
    }

    pub async fn remove(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        member_id: Uuid,
    ) -> Result<(), AppError> {
        let authorizer = self.authorizer.clone();

        self.runner
            .run(move |tx| {
                Box::pin(async move {
                    let organization = visible_organization(tx, organization_id).await?;

                    tx.find_one_and_update::<Membership>(
                        &membership_of(organization_id, member_id),
                        &SoftDeleteFilter::mark_deleted(),
                    )
                    .await?
                    .ok_or_else(|| AppError::not_found("Membro"))?;

                    let principal = Principal::resolve(tx, user_id).await?;
                    authorizer.check(
                        &principal,
                        Operation::ManageMembers,
                        &[Guarded::Organization(&organization)],
                    )
                })
            })
            .await
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        params: PageParams,
    ) -> Result<Paginated<Membership>, AppError> {
        let authorizer = self.authorizer.clone();
        let (page, window) = SoftDeleteFilter::list_window(&self.limits, &params);

        let (items, total) = self
            .runner
            .run(move |tx| {
                Box::pin(async move {
                    let organization = visible_organization(tx, organization_id).await?;
                    let principal = Principal::resolve(tx, user_id).await?;
                    authorizer.check(
                        &principal,
                        Operation::Read,
                        &[Guarded::Organization(&organization)],
                    )?;

                    let filter = SoftDeleteFilter::visible(
                        Filter::new().eq("organization", organization_id.to_string()),
                    );
                    tx.find_page::<Membership>(&filter, window).await
                })
            })
            .await?;

        Ok(Paginated::new(items, total, page))
    }
}
