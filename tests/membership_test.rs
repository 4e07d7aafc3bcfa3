// tests/membership_test.rs

mod common;

use console_backend::{
    common::{error::AppError, pagination::PageParams},
    db::Collection,
    models::{
        app::CreateAppPayload,
        membership::{MemberRole, MembershipStatus},
    },
};
use uuid::Uuid;

use common::{resource_payload, setup};

fn app_payload(name: &str, organization: Uuid) -> CreateAppPayload {
    CreateAppPayload {
        name: name.to_string(),
        description: Some("Painel interno".to_string()),
        organization: Some(organization),
    }
}

#[tokio::test]
async fn invited_member_gains_access_only_after_accepting() {
    let t = setup();
    let (owner, _) = t.user("Dona").await;
    let (member, _) = t.user("Membro").await;
    let org = t.organization(owner).await;
    let email = t.email_of(member).await;

    let invitation = t
        .state
        .membership_service
        .invite(owner, org, &email, MemberRole::Member)
        .await
        .unwrap();
    assert_eq!(invitation.status, MembershipStatus::Invited);

    // Convite pendente ainda não dá acesso
    let early = t.state.app_service.create(member, app_payload("Cedo", org)).await;
    assert!(matches!(early, Err(AppError::Forbidden)));

    let accepted = t.state.membership_service.accept(member, org).await.unwrap();
    assert_eq!(accepted.status, MembershipStatus::Active);

    let app = t.state.app_service.create(member, app_payload("Vendas", org)).await.unwrap();
    assert_eq!(app.organization, Some(org));

    let members = t
        .state
        .membership_service
        .list(owner, org, PageParams::default())
        .await
        .unwrap();
    assert_eq!(members.total, 2);
}

#[tokio::test]
async fn viewer_reads_but_cannot_write() {
    let t = setup();
    let (owner, _) = t.user("Dona").await;
    let (viewer, _) = t.user("Leitor").await;
    let org = t.organization(owner).await;
    t.join(owner, org, viewer, MemberRole::Viewer).await;
    let app = t.app_in(owner, Some(org), "Vendas").await;

    let read = t.state.app_service.get(viewer, app.id).await.unwrap();
    assert_eq!(read.id, app.id);

    let write = t.state.app_service.create(viewer, app_payload("Outro", org)).await;
    assert!(matches!(write, Err(AppError::Forbidden)));

    let child = t
        .state
        .resource_service
        .create(viewer, app.id, resource_payload("Principal"))
        .await;
    assert!(matches!(child, Err(AppError::Forbidden)));
}

#[tokio::test]
async fn owner_demoting_self_is_rolled_back() {
    let t = setup();
    let (owner, _) = t.user("Dona").await;
    let org = t.organization(owner).await;

    let result = t
        .state
        .membership_service
        .update_role(owner, org, owner, MemberRole::Member)
        .await;
    assert!(matches!(result, Err(AppError::Forbidden)), "{result:?}");

    let members = t
        .state
        .membership_service
        .list(owner, org, PageParams::default())
        .await
        .unwrap();
    let mine = members
        .items
        .iter()
        .find(|m| m.user == owner)
        .expect("associação da dona");
    assert_eq!(mine.role, MemberRole::Owner);
}

#[tokio::test]
async fn owner_promotes_member() {
    let t = setup();
    let (owner, _) = t.user("Dona").await;
    let (member, _) = t.user("Membro").await;
    let org = t.organization(owner).await;
    t.join(owner, org, member, MemberRole::Viewer).await;

    let updated = t
        .state
        .membership_service
        .update_role(owner, org, member, MemberRole::Owner)
        .await
        .unwrap();
    assert_eq!(updated.role, MemberRole::Owner);

    // Agora o novo dono também pode mexer nos membros
    let (third, _) = t.user("Terceira").await;
    let email = t.email_of(third).await;
    t.state
        .membership_service
        .invite(member, org, &email, MemberRole::Viewer)
        .await
        .unwrap();
}

#[tokio::test]
async fn duplicate_invitation_conflicts() {
    let t = setup();
    let (owner, _) = t.user("Dona").await;
    let (member, _) = t.user("Membro").await;
    let org = t.organization(owner).await;
    let email = t.email_of(member).await;

    t.state
        .membership_service
        .invite(owner, org, &email, MemberRole::Member)
        .await
        .unwrap();
    let again = t
        .state
        .membership_service
        .invite(owner, org, &email.to_uppercase(), MemberRole::Viewer)
        .await;
    assert!(matches!(again, Err(AppError::Conflict(_))), "{again:?}");
}

#[tokio::test]
async fn only_owners_invite() {
    let t = setup();
    let (owner, _) = t.user("Dona").await;
    let (member, _) = t.user("Membro").await;
    let (guest, _) = t.user("Convidada").await;
    let org = t.organization(owner).await;
    t.join(owner, org, member, MemberRole::Member).await;
    let before = t.store.raw_count(Collection::Memberships).await;

    let email = t.email_of(guest).await;
    let result = t
        .state
        .membership_service
        .invite(member, org, &email, MemberRole::Viewer)
        .await;
    assert!(matches!(result, Err(AppError::Forbidden)));
    assert_eq!(t.store.raw_count(Collection::Memberships).await, before);
}

#[tokio::test]
async fn unknown_invitee_is_not_found() {
    let t = setup();
    let (owner, _) = t.user("Dona").await;
    let org = t.organization(owner).await;

    let result = t
        .state
        .membership_service
        .invite(owner, org, "ninguem@exemplo.com", MemberRole::Member)
        .await;
    assert!(matches!(result, Err(AppError::NotFound { entity: "Usuário" })));
}

#[tokio::test]
async fn removed_member_loses_access() {
    let t = setup();
    let (owner, _) = t.user("Dona").await;
    let (member, _) = t.user("Membro").await;
    let org = t.organization(owner).await;
    t.join(owner, org, member, MemberRole::Member).await;
    let app = t.app_in(owner, Some(org), "Vendas").await;

    t.state.app_service.get(member, app.id).await.unwrap();

    t.state.membership_service.remove(owner, org, member).await.unwrap();

    let read = t.state.app_service.get(member, app.id).await;
    assert!(matches!(read, Err(AppError::Forbidden)));

    let again = t.state.membership_service.remove(owner, org, member).await;
    assert!(matches!(again, Err(AppError::NotFound { .. })));
}

#[tokio::test]
async fn accepting_without_invitation_is_not_found() {
    let t = setup();
    let (owner, _) = t.user("Dona").await;
    let (stranger, _) = t.user("Estranha").await;
    let org = t.organization(owner).await;

    let result = t.state.membership_service.accept(stranger, org).await;
    assert!(matches!(result, Err(AppError::NotFound { entity: "Convite" })));
}
