// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn build_router(app_state: AppState) -> Router {
    // Define as rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Define as rotas de usuário (protegidas pelo middleware)
    let user_routes = Router::new().route(
        "/me",
        get(handlers::auth::get_me)
            .patch(handlers::auth::update_me)
            .delete(handlers::auth::delete_me),
    );

    let organization_routes = Router::new()
        .route(
            "/",
            post(handlers::organizations::create_organization)
                .get(handlers::organizations::list_my_organizations),
        )
        .route(
            "/{id}",
            get(handlers::organizations::get_organization)
                .patch(handlers::organizations::update_organization)
                .delete(handlers::organizations::delete_organization),
        )
        .route(
            "/{id}/members",
            get(handlers::members::list_members).post(handlers::members::invite_member),
        )
        .route("/{id}/members/accept", post(handlers::members::accept_invitation))
        .route(
            "/{id}/members/{user_id}",
            axum::routing::patch(handlers::members::update_member_role)
                .delete(handlers::members::remove_member),
        );

    let app_routes = Router::new()
        .route("/", post(handlers::apps::create_app).get(handlers::apps::list_apps))
        .route(
            "/{id}",
            get(handlers::apps::get_app)
                .patch(handlers::apps::update_app)
                .delete(handlers::apps::delete_app),
        )
        // --- Resources ---
        .route(
            "/{id}/resources",
            post(handlers::resources::create_resource).get(handlers::resources::list_resources),
        )
        .route(
            "/{id}/resources/by-name/{name}",
            get(handlers::resources::get_resource_by_name),
        )
        .route(
            "/{id}/resources/{child_id}",
            get(handlers::resources::get_resource)
                .patch(handlers::resources::update_resource)
                .delete(handlers::resources::delete_resource),
        )
        // --- Queries ---
        .route(
            "/{id}/queries",
            post(handlers::queries::create_query).get(handlers::queries::list_queries),
        )
        .route(
            "/{id}/queries/by-name/{name}",
            get(handlers::queries::get_query_by_name),
        )
        .route(
            "/{id}/queries/{child_id}",
            get(handlers::queries::get_query)
                .patch(handlers::queries::update_query)
                .delete(handlers::queries::delete_query),
        )
        // --- Controllers ---
        .route(
            "/{id}/controllers",
            post(handlers::controllers::create_controller)
                .get(handlers::controllers::list_controllers),
        )
        .route(
            "/{id}/controllers/by-name/{name}",
            get(handlers::controllers::get_controller_by_name),
        )
        .route(
            "/{id}/controllers/{child_id}",
            get(handlers::controllers::get_controller)
                .patch(handlers::controllers::update_controller)
                .delete(handlers::controllers::delete_controller),
        )
        // --- Screens ---
        .route(
            "/{id}/screens",
            post(handlers::screens::create_screen).get(handlers::screens::list_screens),
        )
        .route(
            "/{id}/screens/by-name/{name}",
            get(handlers::screens::get_screen_by_name),
        )
        .route(
            "/{id}/screens/{child_id}",
            get(handlers::screens::get_screen)
                .patch(handlers::screens::update_screen)
                .delete(handlers::screens::delete_screen),
        );

    // Tudo que não é /auth passa pelo guardião
    let guard = axum_middleware::from_fn_with_state(app_state.clone(), auth_guard);

    // Combina tudo no router principal
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes.layer(guard.clone()))
        .nest("/api/organizations", organization_routes.layer(guard.clone()))
        .nest("/api/apps", app_routes.layer(guard))
        .with_state(app_state)
}
