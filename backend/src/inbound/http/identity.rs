//! Bearer-token identity extraction for HTTP handlers.
//!
//! Handlers take an [`AuthenticatedUser`] argument to require a valid token;
//! role checks stay explicit via [`crate::domain::authorize`] at each entry
//! point instead of living in routing-layer guards.

use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};

use crate::domain::ports::{TokenCodec as _, TokenCodecError};
use crate::domain::{AuthClaims, Error};

use super::state::HttpState;

/// Bearer scheme prefix expected on the Authorization header.
const BEARER_PREFIX: &str = "Bearer ";

/// Verified claims of the requesting user.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(AuthClaims);

impl AuthenticatedUser {
    /// The verified claims.
    pub fn claims(&self) -> AuthClaims {
        self.0
    }
}

fn missing_token() -> Error {
    Error::unauthorized("bearer token required")
}

fn map_token_error(error: TokenCodecError) -> Error {
    match error {
        TokenCodecError::Expired | TokenCodecError::Invalid => {
            Error::unauthorized("invalid or expired token")
        }
        TokenCodecError::Issue { message } => Error::internal(message),
    }
}

fn extract_claims(req: &HttpRequest) -> Result<AuthClaims, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("http state not configured"))?;

    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(missing_token)?;
    let token = header_value
        .strip_prefix(BEARER_PREFIX)
        .ok_or_else(missing_token)?;

    state.tokens.decode(token).map_err(map_token_error)
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_claims(req).map(AuthenticatedUser))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test as actix_test, web};
    use rstest::rstest;
    use uuid::Uuid;

    use super::*;
    use crate::domain::ports::{
        FixtureCaseFileRepository, FixturePasswordHasher, FixtureTokenCodec, FixtureUserRepository,
        TokenCodec,
    };
    use crate::domain::{AccountService, CaseFileService, Role, authorize};

    fn fixture_state() -> HttpState {
        HttpState::new(
            AccountService::new(
                Arc::new(FixtureUserRepository),
                Arc::new(FixturePasswordHasher),
                Arc::new(FixtureTokenCodec),
            ),
            CaseFileService::new(Arc::new(FixtureCaseFileRepository)),
            Arc::new(FixtureTokenCodec),
        )
    }

    async fn whoami(identity: AuthenticatedUser) -> HttpResponse {
        HttpResponse::Ok().body(identity.claims().user_id.to_string())
    }

    async fn coordinators_only(identity: AuthenticatedUser) -> Result<HttpResponse, Error> {
        authorize(&identity.claims(), &[Role::Coordinator])?;
        Ok(HttpResponse::Ok().finish())
    }

    fn test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(fixture_state()))
            .route("/whoami", web::get().to(whoami))
            .route("/coordinators", web::get().to(coordinators_only))
    }

    fn token_for(user_id: Uuid, role: Role) -> String {
        FixtureTokenCodec
            .issue(&AuthClaims { user_id, role })
            .expect("fixture token issues")
    }

    #[rstest]
    #[actix_web::test]
    async fn valid_bearer_tokens_pass() {
        let app = actix_test::init_service(test_app()).await;
        let user_id = Uuid::new_v4();
        let request = actix_test::TestRequest::get()
            .uri("/whoami")
            .insert_header((
                header::AUTHORIZATION,
                format!("Bearer {}", token_for(user_id, Role::Technician)),
            ))
            .to_request();

        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = actix_test::read_body(response).await;
        assert_eq!(body, user_id.to_string().as_bytes());
    }

    #[rstest]
    #[actix_web::test]
    async fn missing_header_is_unauthorised() {
        let app = actix_test::init_service(test_app()).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/whoami").to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[case("Basic dXNlcjpwdw==")]
    #[case("Bearer not-a-token")]
    #[case("bearer lowercase-scheme")]
    #[actix_web::test]
    async fn bad_schemes_and_tokens_are_unauthorised(#[case] header_value: &str) {
        let app = actix_test::init_service(test_app()).await;
        let request = actix_test::TestRequest::get()
            .uri("/whoami")
            .insert_header((header::AUTHORIZATION, header_value))
            .to_request();

        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn wrong_role_is_forbidden() {
        let app = actix_test::init_service(test_app()).await;
        let request = actix_test::TestRequest::get()
            .uri("/coordinators")
            .insert_header((
                header::AUTHORIZATION,
                format!("Bearer {}", token_for(Uuid::new_v4(), Role::Technician)),
            ))
            .to_request();

        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
