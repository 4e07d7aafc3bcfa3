// tests/api_test.rs
//
// Testes ponta a ponta pelo router HTTP, sobre o armazenamento em memória.

mod common;

use axum_test::TestServer;
use console_backend::build_router;
use serde_json::{json, Value};

use common::setup;

fn server() -> TestServer {
    TestServer::new(build_router(setup().state)).unwrap()
}

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

async fn register(server: &TestServer, email: &str) -> String {
    let response = server
        .post("/api/auth/register")
        .json(&json!({ "email": email, "name": "Teste", "password": "senha-forte" }))
        .await;
    assert_eq!(response.status_code(), 201);
    let data: Value = response.json();
    data["token"].as_str().unwrap().to_string()
}

async fn create_app(server: &TestServer, token: &str, name: &str) -> String {
    let response = server
        .post("/api/apps")
        .add_header("Authorization", bearer(token))
        .json(&json!({ "name": name }))
        .await;
    assert_eq!(response.status_code(), 201);
    let data: Value = response.json();
    data["id"].as_str().unwrap().to_string()
}

fn postgres_resource(name: &str) -> Value {
    json!({
        "name": name,
        "config": {
            "type": "postgres",
            "host": "db.interno",
            "port": 5432,
            "database": "vendas",
            "username": "leitura",
            "password": "s3nha"
        }
    })
}

#[tokio::test]
async fn health_check() {
    let server = server();
    let response = server.get("/api/health").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.text(), "OK");
}

#[tokio::test]
async fn register_login_and_profile() {
    let server = server();
    register(&server, "ana@exemplo.com").await;

    let duplicate = server
        .post("/api/auth/register")
        .json(&json!({ "email": "ANA@exemplo.com", "name": "Ana", "password": "senha-forte" }))
        .await;
    assert_eq!(duplicate.status_code(), 409);

    let login = server
        .post("/api/auth/login")
        .json(&json!({ "email": "ana@exemplo.com", "password": "senha-forte" }))
        .await;
    assert_eq!(login.status_code(), 200);
    let data: Value = login.json();
    let token = data["token"].as_str().unwrap().to_string();

    let wrong = server
        .post("/api/auth/login")
        .json(&json!({ "email": "ana@exemplo.com", "password": "errada123" }))
        .await;
    assert_eq!(wrong.status_code(), 401);

    let me = server
        .get("/api/users/me")
        .add_header("Authorization", bearer(&token))
        .await;
    assert_eq!(me.status_code(), 200);
    let profile: Value = me.json();
    assert_eq!(profile["email"], "ana@exemplo.com");
    assert!(profile.get("passwordHash").is_none());
    assert!(profile.get("password_hash").is_none());
}

#[tokio::test]
async fn protected_routes_require_token() {
    let server = server();

    let response = server.get("/api/users/me").await;
    assert_eq!(response.status_code(), 401);

    let response = server
        .get("/api/apps")
        .add_header("Authorization", "Bearer nao-e-um-jwt")
        .await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn deleted_account_token_stops_working() {
    let server = server();
    let token = register(&server, "bia@exemplo.com").await;

    let response = server
        .delete("/api/users/me")
        .add_header("Authorization", bearer(&token))
        .await;
    assert_eq!(response.status_code(), 204);

    let response = server
        .get("/api/users/me")
        .add_header("Authorization", bearer(&token))
        .await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn organizations_are_listed_for_their_members() {
    let server = server();
    let token = register(&server, "caio@exemplo.com").await;

    let created = server
        .post("/api/organizations")
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "name": "Acme" }))
        .await;
    assert_eq!(created.status_code(), 201);

    let response = server
        .get("/api/organizations")
        .add_header("Authorization", bearer(&token))
        .await;
    assert_eq!(response.status_code(), 200);
    let page: Value = response.json();
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["name"], "Acme");

    let other = register(&server, "duda@exemplo.com").await;
    let response = server
        .get("/api/organizations")
        .add_header("Authorization", bearer(&other))
        .await;
    let page: Value = response.json();
    assert_eq!(page["total"], 0);
}

#[tokio::test]
async fn resource_secrets_never_leave_the_server() {
    let server = server();
    let token = register(&server, "edu@exemplo.com").await;
    let app_id = create_app(&server, &token, "Vendas").await;

    let created = server
        .post(&format!("/api/apps/{app_id}/resources"))
        .add_header("Authorization", bearer(&token))
        .json(&postgres_resource("Principal"))
        .await;
    assert_eq!(created.status_code(), 201);
    let data: Value = created.json();
    assert_eq!(data["config"]["type"], "postgres");
    assert_eq!(data["config"]["password"], "********");

    let by_name = server
        .get(&format!("/api/apps/{app_id}/resources/by-name/Principal"))
        .add_header("Authorization", bearer(&token))
        .await;
    assert_eq!(by_name.status_code(), 200);
    let data: Value = by_name.json();
    assert_eq!(data["config"]["password"], "********");
}

#[tokio::test]
async fn error_statuses_follow_the_error_kind() {
    let server = server();
    let owner = register(&server, "fabi@exemplo.com").await;
    let outsider = register(&server, "gui@exemplo.com").await;
    let app_id = create_app(&server, &owner, "Vendas").await;
    let path = format!("/api/apps/{app_id}/resources");

    // 403: quem não participa do app
    let response = server
        .post(&path)
        .add_header("Authorization", bearer(&outsider))
        .json(&postgres_resource("Principal"))
        .await;
    assert_eq!(response.status_code(), 403);

    // 404: app inexistente
    let response = server
        .post(&format!("/api/apps/{}/resources", uuid::Uuid::new_v4()))
        .add_header("Authorization", bearer(&owner))
        .json(&postgres_resource("Principal"))
        .await;
    assert_eq!(response.status_code(), 404);

    // 409: nome repetido no mesmo app
    for expected in [201, 409] {
        let response = server
            .post(&path)
            .add_header("Authorization", bearer(&owner))
            .json(&postgres_resource("Principal"))
            .await;
        assert_eq!(response.status_code(), expected);
    }

    // 400: nome vazio
    let response = server
        .post(&path)
        .add_header("Authorization", bearer(&owner))
        .json(&postgres_resource(""))
        .await;
    assert_eq!(response.status_code(), 400);
    let data: Value = response.json();
    assert!(data["details"]["name"].is_array());

    // 400: status "deleted" não passa por atualização
    let response = server
        .patch(&format!("/api/apps/{app_id}"))
        .add_header("Authorization", bearer(&owner))
        .json(&json!({ "status": "deleted" }))
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn deleting_twice_is_not_found() {
    let server = server();
    let token = register(&server, "hana@exemplo.com").await;
    let app_id = create_app(&server, &token, "Vendas").await;

    let created = server
        .post(&format!("/api/apps/{app_id}/controllers"))
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "name": "pedidos", "content": "export default {}" }))
        .await;
    assert_eq!(created.status_code(), 201);
    let data: Value = created.json();
    let path = format!("/api/apps/{app_id}/controllers/{}", data["id"].as_str().unwrap());

    for expected in [204, 404] {
        let response = server
            .delete(&path)
            .add_header("Authorization", bearer(&token))
            .await;
        assert_eq!(response.status_code(), expected);
    }

    let response = server
        .get(&format!("/api/apps/{app_id}/controllers"))
        .add_header("Authorization", bearer(&token))
        .await;
    let page: Value = response.json();
    assert_eq!(page["total"], 0);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let server = server();
    let response = server.get("/api-docs/openapi.json").await;
    assert_eq!(response.status_code(), 200);
    let doc: Value = response.json();
    assert!(doc["paths"]["/api/apps/{id}/queries"].is_object());
    assert_eq!(
        doc["paths"]["/api/apps/{id}/screens"]["post"]["responses"]["201"]["description"],
        "Tela criada"
    );
    assert_eq!(
        doc["paths"]["/api/apps/{id}/resources/{child_id}"]["delete"]["responses"]["204"]["description"],
        "Resource excluído"
    );
    assert!(!response.text().contains("(a)"));
}

#[tokio::test]
async fn blank_names_are_a_validation_error() {
    let server = server();
    let token = register(&server, "iara@exemplo.com").await;

    let response = server
        .post("/api/apps")
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "name": "   " }))
        .await;
    assert_eq!(response.status_code(), 400);
    let data: Value = response.json();
    assert!(data["details"]["name"].is_array());

    let app_id = create_app(&server, &token, "Vendas").await;
    let response = server
        .post(&format!("/api/apps/{app_id}/screens"))
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "name": " \t ", "route": "/inicio" }))
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn malformed_page_params_return_json_error() {
    let server = server();
    let token = register(&server, "joao@exemplo.com").await;
    let app_id = create_app(&server, &token, "Vendas").await;

    for query in ["page=abc", "limit=-1"] {
        let response = server
            .get(&format!("/api/apps/{app_id}/screens?{query}"))
            .add_header("Authorization", bearer(&token))
            .await;
        assert_eq!(response.status_code(), 400);
        let data: Value = response.json();
        assert!(data["error"].is_string(), "{query}: {data}");
    }

    let response = server
        .get("/api/organizations?page=x")
        .add_header("Authorization", bearer(&token))
        .await;
    assert_eq!(response.status_code(), 400);
    let data: Value = response.json();
    assert!(data["error"].is_string());
}
