//! Shared helpers for HTTP integration tests over the in-memory adapters.

use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header;
use actix_web::{App, Error, test as actix_test, web};
use serde_json::{Value, json};

use dicri_backend::inbound::http::routes;
use dicri_backend::test_support::in_memory_state;

/// Initialise the service under test with fresh in-memory state.
pub async fn test_service() -> impl Service<Request, Response = ServiceResponse, Error = Error> {
    actix_test::init_service(
        App::new()
            .app_data(web::Data::new(in_memory_state()))
            .service(routes()),
    )
    .await
}

/// Register an account through the API.
pub async fn register(
    app: &impl Service<Request, Response = ServiceResponse, Error = Error>,
    email: &str,
    role: &str,
) -> Value {
    let response = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "email": email,
                "name": "Integration Tester",
                "password": "secret1",
                "role": role,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status().as_u16(), 201, "registration should succeed");
    actix_test::read_body_json(response).await
}

/// Log in through the API and return the bearer token.
pub async fn login(
    app: &impl Service<Request, Response = ServiceResponse, Error = Error>,
    email: &str,
) -> String {
    let response = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": email, "password": "secret1" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status().as_u16(), 200, "login should succeed");
    let body: Value = actix_test::read_body_json(response).await;
    body.get("token")
        .and_then(Value::as_str)
        .expect("token present")
        .to_owned()
}

/// Register and log in, returning the bearer token.
pub async fn register_and_login(
    app: &impl Service<Request, Response = ServiceResponse, Error = Error>,
    email: &str,
    role: &str,
) -> String {
    register(app, email, role).await;
    login(app, email).await
}

/// Bearer authorization header tuple.
pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

/// A well-formed evidence item payload.
pub fn item_payload(description: &str) -> Value {
    json!({
        "descripcion": description,
        "color": "gris",
        "tamano": "pequeño",
        "peso": 0.5,
        "ubicacion": "bodega A",
    })
}

/// Create a case file with the given item descriptions, returning its JSON.
pub async fn create_case_file(
    app: &impl Service<Request, Response = ServiceResponse, Error = Error>,
    token: &str,
    descriptions: &[&str],
) -> Value {
    let items: Vec<Value> = descriptions
        .iter()
        .map(|description| item_payload(description))
        .collect();
    let response = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/expedientes")
            .insert_header(bearer(token))
            .set_json(json!({ "indicios": items }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status().as_u16(), 201, "creation should succeed");
    let body: Value = actix_test::read_body_json(response).await;
    body.get("expediente").expect("expediente present").clone()
}
