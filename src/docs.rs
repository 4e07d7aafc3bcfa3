// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::update_me,
        handlers::auth::delete_me,

        // --- Organizations ---
        handlers::organizations::create_organization,
        handlers::organizations::list_my_organizations,
        handlers::organizations::get_organization,
        handlers::organizations::update_organization,
        handlers::organizations::delete_organization,

        // --- Members ---
        handlers::members::list_members,
        handlers::members::invite_member,
        handlers::members::accept_invitation,
        handlers::members::update_member_role,
        handlers::members::remove_member,

        // --- Apps ---
        handlers::apps::create_app,
        handlers::apps::list_apps,
        handlers::apps::get_app,
        handlers::apps::update_app,
        handlers::apps::delete_app,

        // --- Resources ---
        handlers::resources::create_resource,
        handlers::resources::list_resources,
        handlers::resources::get_resource_by_name,
        handlers::resources::get_resource,
        handlers::resources::update_resource,
        handlers::resources::delete_resource,

        // --- Queries ---
        handlers::queries::create_query,
        handlers::queries::list_queries,
        handlers::queries::get_query_by_name,
        handlers::queries::get_query,
        handlers::queries::update_query,
        handlers::queries::delete_query,

        // --- Controllers ---
        handlers::controllers::create_controller,
        handlers::controllers::list_controllers,
        handlers::controllers::get_controller_by_name,
        handlers::controllers::get_controller,
        handlers::controllers::update_controller,
        handlers::controllers::delete_controller,

        // --- Screens ---
        handlers::screens::create_screen,
        handlers::screens::list_screens,
        handlers::screens::get_screen_by_name,
        handlers::screens::get_screen,
        handlers::screens::update_screen,
        handlers::screens::delete_screen,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserProfile,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::UpdateProfilePayload,
            models::auth::AuthResponse,

            // --- Organizations ---
            models::organization::OrganizationStatus,
            models::organization::Organization,
            models::organization::CreateOrganizationPayload,
            models::organization::UpdateOrganizationPayload,

            // --- Members ---
            models::membership::MemberRole,
            models::membership::MembershipStatus,
            models::membership::Membership,
            models::membership::InviteMemberPayload,
            models::membership::UpdateMemberRolePayload,

            // --- Apps ---
            models::app::AppStatus,
            models::app::ChildStatus,
            models::app::App,
            models::app::CreateAppPayload,
            models::app::UpdateAppPayload,

            // --- Filhos do App ---
            models::resource::ResourceDto,
            models::resource::CreateResourcePayload,
            models::resource::UpdateResourcePayload,
            models::query::QueryTemplate,
            models::query::CreateQueryPayload,
            models::query::UpdateQueryPayload,
            models::source_file::SourceFile,
            models::source_file::CreateSourceFilePayload,
            models::source_file::UpdateSourceFilePayload,
            models::screen::Screen,
            models::screen::CreateScreenPayload,
            models::screen::UpdateScreenPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário e Perfil"),
        (name = "Organizations", description = "Organizações (containers de apps)"),
        (name = "Members", description = "Membros, convites e papéis"),
        (name = "Apps", description = "Apps construídos no editor"),
        (name = "Resources", description = "Conexões com bancos externos"),
        (name = "Queries", description = "Templates de consulta"),
        (name = "Controllers", description = "Código-fonte dos controllers"),
        (name = "Screens", description = "Telas e layouts")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
