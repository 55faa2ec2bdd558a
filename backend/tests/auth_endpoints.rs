//! Integration coverage for registration, login, and token handling.

mod support;

use actix_web::http::header;
use actix_web::test as actix_test;
use serde_json::{Value, json};

use support::{bearer, login, register, register_and_login, test_service};

#[actix_web::test]
async fn register_returns_the_user_without_credential_material() {
    let app = test_service().await;
    let body = register(&app, "tech@example.com", "TECNICO").await;

    let user = body.get("user").expect("user envelope");
    assert_eq!(
        user.get("email").and_then(Value::as_str),
        Some("tech@example.com")
    );
    assert_eq!(user.get("role").and_then(Value::as_str), Some("TECNICO"));
    assert!(user.get("id").is_some());
    assert!(user.get("password").is_none());
    assert!(user.get("passwordHash").is_none());
    assert!(user.get("password_hash").is_none());
}

#[actix_web::test]
async fn register_collects_field_errors() {
    let app = test_service().await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "email": "not-an-email",
                "name": "",
                "password": "short",
                "role": "ADMIN",
            }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = actix_test::read_body_json(response).await;
    let errors = body
        .pointer("/details/errors")
        .and_then(Value::as_array)
        .expect("errors array");
    assert_eq!(errors.len(), 4);
}

#[actix_web::test]
async fn duplicate_emails_conflict() {
    let app = test_service().await;
    register(&app, "tech@example.com", "TECNICO").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "email": "tech@example.com",
                "name": "Someone Else",
                "password": "secret1",
                "role": "COORDINADOR",
            }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status().as_u16(), 409);
}

#[actix_web::test]
async fn unknown_email_and_wrong_password_return_identical_bodies() {
    let app = test_service().await;
    register(&app, "known@example.com", "TECNICO").await;

    let wrong_password = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "known@example.com", "password": "not-it" }))
            .to_request(),
    )
    .await;
    let unknown_email = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "ghost@example.com", "password": "secret1" }))
            .to_request(),
    )
    .await;

    assert_eq!(wrong_password.status().as_u16(), 401);
    assert_eq!(unknown_email.status().as_u16(), 401);
    let first: Value = actix_test::read_body_json(wrong_password).await;
    let second: Value = actix_test::read_body_json(unknown_email).await;
    assert_eq!(first, second);
}

#[actix_web::test]
async fn login_token_opens_protected_endpoints() {
    let app = test_service().await;
    let token = register_and_login(&app, "tech@example.com", "TECNICO").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/expedientes")
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert_eq!(response.status().as_u16(), 200);
}

#[actix_web::test]
async fn garbage_and_missing_tokens_are_rejected() {
    let app = test_service().await;
    register(&app, "tech@example.com", "TECNICO").await;
    login(&app, "tech@example.com").await;

    let missing = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/expedientes")
            .to_request(),
    )
    .await;
    assert_eq!(missing.status().as_u16(), 401);

    let garbage = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/expedientes")
            .insert_header((header::AUTHORIZATION, "Bearer nonsense"))
            .to_request(),
    )
    .await;
    assert_eq!(garbage.status().as_u16(), 401);
}
