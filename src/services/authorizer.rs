// src/services/authorizer.rs

//! Autorização avaliada sobre o estado pós-mutação, ainda dentro da transação.
//!
//! Os serviços escrevem primeiro e checam depois: se o principal não pode ver o
//! resultado da própria operação, o erro `Forbidden` derruba a transação e nada
//! fica gravado.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::store::{Filter, Window};
use crate::models::app::App;
use crate::models::auth::User;
use crate::models::membership::{MemberRole, Membership, MembershipStatus};
use crate::models::organization::Organization;
use crate::services::soft_delete::SoftDeleteFilter;
use crate::services::transaction::TxContext;

/// Quem está agindo: o usuário e os papéis ativos em cada organização.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    memberships: HashMap<Uuid, MemberRole>,
}

impl Principal {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            memberships: HashMap::new(),
        }
    }

    pub fn with_membership(mut self, organization: Uuid, role: MemberRole) -> Self {
        self.memberships.insert(organization, role);
        self
    }

    pub fn role_in(&self, organization: Uuid) -> Option<MemberRole> {
        self.memberships.get(&organization).copied()
    }

    pub fn organizations(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.memberships.keys().copied()
    }

    /// Carrega o usuário e as associações ativas de dentro da transação, para
    /// que a checagem enxergue as escritas da própria unidade de trabalho.
    pub async fn resolve(tx: &mut TxContext, user_id: Uuid) -> Result<Self, AppError> {
        tx.find_one::<User>(&SoftDeleteFilter::visible(Filter::by_id(user_id)))
            .await?
            .ok_or(AppError::InvalidToken)?;

        let filter = Filter::new()
            .eq("user", user_id.to_string())
            .eq("status", MembershipStatus::Active.as_str());
        let (memberships, _) = tx
            .find_page::<Membership>(&filter, Window::all())
            .await?;

        Ok(memberships
            .into_iter()
            .fold(Self::new(user_id), |principal, m| {
                principal.with_membership(m.organization, m.role)
            }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Organization,
    App,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
    ManageMembers,
}

/// Entidade sob checagem, emprestada do resultado da mutação.
#[derive(Debug, Clone, Copy)]
pub enum Guarded<'a> {
    Organization(&'a Organization),
    App(&'a App),
}

impl Guarded<'_> {
    pub fn kind(&self) -> EntityKind {
        match self {
            Guarded::Organization(_) => EntityKind::Organization,
            Guarded::App(_) => EntityKind::App,
        }
    }

    fn id(&self) -> Uuid {
        match self {
            Guarded::Organization(org) => org.id,
            Guarded::App(app) => app.id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleKey {
    pub entity: EntityKind,
    pub operation: Operation,
}

pub type Rule = fn(&Principal, &Guarded<'_>) -> bool;

/// Tabela de regras `(entidade, operação) -> predicado`, montada na inicialização.
/// Chave sem regra nega o acesso.
#[derive(Debug, Clone, Default)]
pub struct AccessRules {
    rules: HashMap<RuleKey, Rule>,
}

impl AccessRules {
    pub fn register(&mut self, entity: EntityKind, operation: Operation, rule: Rule) -> &mut Self {
        self.rules.insert(RuleKey { entity, operation }, rule);
        self
    }

    pub fn standard() -> Self {
        use EntityKind as E;
        use Operation as Op;

        let mut rules = Self::default();
        rules
            .register(E::Organization, Op::Read, is_org_member)
            .register(E::Organization, Op::Create, is_org_writer)
            .register(E::Organization, Op::Update, is_org_owner)
            .register(E::Organization, Op::Delete, is_org_owner)
            .register(E::Organization, Op::ManageMembers, is_org_owner)
            .register(E::App, Op::Read, can_read_app)
            .register(E::App, Op::Update, can_write_app)
            .register(E::App, Op::Delete, can_delete_app);
        rules
    }

    fn allows(&self, principal: &Principal, operation: Operation, entity: &Guarded<'_>) -> bool {
        let key = RuleKey {
            entity: entity.kind(),
            operation,
        };
        self.rules
            .get(&key)
            .is_some_and(|rule| rule(principal, entity))
    }
}

fn org_role(principal: &Principal, entity: &Guarded<'_>) -> Option<MemberRole> {
    match entity {
        Guarded::Organization(org) => principal.role_in(org.id),
        Guarded::App(_) => None,
    }
}

fn is_org_member(principal: &Principal, entity: &Guarded<'_>) -> bool {
    org_role(principal, entity).is_some()
}

fn is_org_writer(principal: &Principal, entity: &Guarded<'_>) -> bool {
    matches!(
        org_role(principal, entity),
        Some(MemberRole::Owner | MemberRole::Member)
    )
}

fn is_org_owner(principal: &Principal, entity: &Guarded<'_>) -> bool {
    org_role(principal, entity) == Some(MemberRole::Owner)
}

// Apps pessoais (sem organização) só respondem ao criador.
fn app_access(principal: &Principal, entity: &Guarded<'_>, roles: &[MemberRole]) -> bool {
    let Guarded::App(app) = entity else {
        return false;
    };
    if app.creator == principal.user_id {
        return true;
    }
    app.organization
        .and_then(|org| principal.role_in(org))
        .is_some_and(|role| roles.contains(&role))
}

fn can_read_app(principal: &Principal, entity: &Guarded<'_>) -> bool {
    app_access(
        principal,
        entity,
        &[MemberRole::Owner, MemberRole::Member, MemberRole::Viewer],
    )
}

fn can_write_app(principal: &Principal, entity: &Guarded<'_>) -> bool {
    app_access(principal, entity, &[MemberRole::Owner, MemberRole::Member])
}

fn can_delete_app(principal: &Principal, entity: &Guarded<'_>) -> bool {
    app_access(principal, entity, &[MemberRole::Owner])
}

#[derive(Clone)]
pub struct PostCommitAuthorizer {
    rules: Arc<AccessRules>,
}

impl PostCommitAuthorizer {
    pub fn new(rules: AccessRules) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }

    /// Falha com `Forbidden` se qualquer entidade reprovar. Lista vazia passa.
    pub fn check(
        &self,
        principal: &Principal,
        operation: Operation,
        entities: &[Guarded<'_>],
    ) -> Result<(), AppError> {
        for entity in entities {
            if !self.rules.allows(principal, operation, entity) {
                tracing::warn!(
                    user_id = %principal.user_id,
                    entity = ?entity.kind(),
                    entity_id = %entity.id(),
                    ?operation,
                    "Acesso negado"
                );
                return Err(AppError::Forbidden);
            }
        }
        Ok(())
    }

    /// Como `check`, mas para resultados de busca: uma entrada ausente vira
    /// `NotFound` antes de qualquer regra ser avaliada.
    pub fn check_lookup(
        &self,
        principal: &Principal,
        operation: Operation,
        entities: &[Option<Guarded<'_>>],
    ) -> Result<(), AppError> {
        let found = entities
            .iter()
            .map(|entry| entry.ok_or_else(|| AppError::not_found("Registro")))
            .collect::<Result<Vec<_>, _>>()?;
        self.check(principal, operation, &found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authorizer() -> PostCommitAuthorizer {
        PostCommitAuthorizer::new(AccessRules::standard())
    }

    fn org_app(org: &Organization, creator: Uuid) -> App {
        App::new("Painel".into(), None, Some(org.id), creator)
    }

    #[test]
    fn empty_list_is_allowed() {
        let principal = Principal::new(Uuid::new_v4());
        assert!(authorizer().check(&principal, Operation::Delete, &[]).is_ok());
    }

    #[test]
    fn organization_roles() {
        let org = Organization::new("Acme".into(), Uuid::new_v4());
        let owner = Principal::new(Uuid::new_v4()).with_membership(org.id, MemberRole::Owner);
        let viewer = Principal::new(Uuid::new_v4()).with_membership(org.id, MemberRole::Viewer);
        let outsider = Principal::new(Uuid::new_v4());
        let target = [Guarded::Organization(&org)];
        let auth = authorizer();

        assert!(auth.check(&owner, Operation::ManageMembers, &target).is_ok());
        assert!(auth.check(&viewer, Operation::Read, &target).is_ok());
        assert!(matches!(
            auth.check(&viewer, Operation::Update, &target),
            Err(AppError::Forbidden)
        ));
        assert!(matches!(
            auth.check(&viewer, Operation::Create, &target),
            Err(AppError::Forbidden)
        ));
        assert!(auth.check(&outsider, Operation::Read, &target).is_err());
    }

    #[test]
    fn app_rules_follow_the_organization_role() {
        let org = Organization::new("Acme".into(), Uuid::new_v4());
        let app = org_app(&org, Uuid::new_v4());
        let member = Principal::new(Uuid::new_v4()).with_membership(org.id, MemberRole::Member);
        let viewer = Principal::new(Uuid::new_v4()).with_membership(org.id, MemberRole::Viewer);
        let target = [Guarded::App(&app)];
        let auth = authorizer();

        assert!(auth.check(&member, Operation::Update, &target).is_ok());
        assert!(auth.check(&member, Operation::Delete, &target).is_err());
        assert!(auth.check(&viewer, Operation::Read, &target).is_ok());
        assert!(auth.check(&viewer, Operation::Update, &target).is_err());
    }

    #[test]
    fn personal_apps_answer_only_to_the_creator() {
        let creator = Principal::new(Uuid::new_v4());
        let app = App::new("Pessoal".into(), None, None, creator.user_id);
        let stranger = Principal::new(Uuid::new_v4());
        let target = [Guarded::App(&app)];
        let auth = authorizer();

        assert!(auth.check(&creator, Operation::Delete, &target).is_ok());
        assert!(auth.check(&stranger, Operation::Read, &target).is_err());
    }

    #[test]
    fn every_entity_must_pass() {
        let org = Organization::new("Acme".into(), Uuid::new_v4());
        let other = Organization::new("Outra".into(), Uuid::new_v4());
        let principal = Principal::new(Uuid::new_v4()).with_membership(org.id, MemberRole::Owner);

        let result = authorizer().check(
            &principal,
            Operation::Read,
            &[Guarded::Organization(&org), Guarded::Organization(&other)],
        );
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[test]
    fn missing_lookup_is_not_found_before_any_rule() {
        let principal = Principal::new(Uuid::new_v4());
        let org = Organization::new("Acme".into(), Uuid::new_v4());

        // A entidade presente reprovaria, mas a ausente é reportada primeiro.
        let result = authorizer().check_lookup(
            &principal,
            Operation::Read,
            &[Some(Guarded::Organization(&org)), None],
        );
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[test]
    fn unregistered_rule_denies() {
        let org = Organization::new("Acme".into(), Uuid::new_v4());
        let app = org_app(&org, Uuid::new_v4());
        let owner = Principal::new(Uuid::new_v4()).with_membership(org.id, MemberRole::Owner);

        // (App, Create) não tem regra: criação de app é checada na organização.
        let result = authorizer().check(&owner, Operation::Create, &[Guarded::App(&app)]);
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[test]
    fn custom_rules_can_be_registered() {
        let org = Organization::new("Acme".into(), Uuid::new_v4());
        let mut rules = AccessRules::default();
        rules.register(EntityKind::Organization, Operation::Read, |_, _| true);
        let auth = PostCommitAuthorizer::new(rules);

        let anyone = Principal::new(Uuid::new_v4());
        assert!(auth
            .check(&anyone, Operation::Read, &[Guarded::Organization(&org)])
            .is_ok());
    }
}
