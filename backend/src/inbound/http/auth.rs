//! Auth API handlers.
//!
//! ```text
//! POST /api/auth/register {"email","name","password","role"}
//! POST /api/auth/login    {"email","password"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::{
    Credentials, CredentialsValidationError, Email, Error, MIN_PASSWORD_LENGTH, Password,
    Registration, Role,
};

use super::ApiResult;
use super::dto::{TokenResponse, UserDto, UserEnvelope};
use super::state::HttpState;
use super::validation::{FieldFault, validation_error};

/// Registration request body.
///
/// Every field is optional at the serde level so validation can report all
/// missing fields instead of failing on the first.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Unique login email.
    #[serde(default)]
    pub email: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Plaintext password, at least six characters.
    #[serde(default)]
    pub password: Option<String>,
    /// Requested role: `TECNICO` or `COORDINADOR`.
    #[serde(default)]
    pub role: Option<String>,
}

/// Login request body.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Login email.
    #[serde(default)]
    pub email: Option<String>,
    /// Account password.
    #[serde(default)]
    pub password: Option<String>,
}

fn parse_registration(body: RegisterRequest) -> Result<Registration, Error> {
    let RegisterRequest {
        email,
        name,
        password,
        role,
    } = body;
    let mut faults = Vec::new();

    let email = match email.as_deref() {
        None => {
            faults.push(FieldFault::missing("email"));
            None
        }
        Some(raw) => match Email::new(raw) {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                faults.push(FieldFault::new(
                    "email",
                    "invalid_email",
                    "email must be a valid address",
                ));
                None
            }
        },
    };

    let name = name.unwrap_or_default();
    if name.trim().is_empty() {
        faults.push(FieldFault::new(
            "name",
            "empty_field",
            "name must not be empty",
        ));
    }

    let password = match password.as_deref() {
        None => {
            faults.push(FieldFault::missing("password"));
            None
        }
        Some(raw) => match Password::new(raw) {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                faults.push(FieldFault::new(
                    "password",
                    "too_short",
                    format!("password must have at least {MIN_PASSWORD_LENGTH} characters"),
                ));
                None
            }
        },
    };

    let role = match role.as_deref() {
        None => {
            faults.push(FieldFault::missing("role"));
            None
        }
        Some(raw) => match raw.parse::<Role>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                faults.push(FieldFault::new(
                    "role",
                    "invalid_role",
                    "role must be TECNICO or COORDINADOR",
                ));
                None
            }
        },
    };

    match (email, password, role) {
        (Some(email), Some(password), Some(role)) if faults.is_empty() => {
            Registration::new(email, &name, password, role).map_err(|_| {
                validation_error(vec![FieldFault::new(
                    "name",
                    "empty_field",
                    "name must not be empty",
                )])
            })
        }
        _ => Err(validation_error(faults)),
    }
}

fn parse_credentials(body: LoginRequest) -> Result<Credentials, Error> {
    let LoginRequest { email, password } = body;
    let mut faults = Vec::new();

    if email.is_none() {
        faults.push(FieldFault::missing("email"));
    }
    if password.is_none() {
        faults.push(FieldFault::missing("password"));
    }
    if !faults.is_empty() {
        return Err(validation_error(faults));
    }

    Credentials::try_from_parts(
        email.unwrap_or_default().as_str(),
        password.unwrap_or_default().as_str(),
    )
    .map_err(|err| {
        let fault = match err {
            CredentialsValidationError::MalformedEmail => {
                FieldFault::new("email", "invalid_email", "email must be a valid address")
            }
            CredentialsValidationError::EmptyPassword => {
                FieldFault::new("password", "empty_field", "password must not be empty")
            }
        };
        validation_error(vec![fault])
    })
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserEnvelope),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = parse_registration(payload.into_inner())?;
    let user = state.accounts.register(registration).await?;
    Ok(HttpResponse::Created().json(UserEnvelope {
        user: UserDto::from(&user),
    }))
}

/// Authenticate and issue a bearer token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = TokenResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = parse_credentials(payload.into_inner())?;
    let token = state.accounts.login(&credentials).await?;
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::ErrorCode;

    fn register_body(value: Value) -> RegisterRequest {
        serde_json::from_value(value).expect("body deserialises")
    }

    #[rstest]
    fn complete_registrations_parse() {
        let registration = parse_registration(register_body(json!({
            "email": "tech@example.com",
            "name": "Ana Torres",
            "password": "secret1",
            "role": "TECNICO",
        })))
        .expect("valid body");
        assert_eq!(registration.email.as_str(), "tech@example.com");
        assert_eq!(registration.role, Role::Technician);
    }

    #[rstest]
    fn empty_registration_reports_every_field() {
        let err = parse_registration(RegisterRequest::default()).expect_err("all fields missing");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        let errors = err
            .details()
            .and_then(|details| details.get("errors"))
            .and_then(Value::as_array)
            .expect("errors array")
            .clone();
        // name is defaulted to empty rather than reported missing
        assert_eq!(errors.len(), 4);
    }

    #[rstest]
    #[case(json!({"email": "nope", "name": "Ana", "password": "secret1", "role": "TECNICO"}))]
    #[case(json!({"email": "a@b.co", "name": "Ana", "password": "short", "role": "TECNICO"}))]
    #[case(json!({"email": "a@b.co", "name": "Ana", "password": "secret1", "role": "ADMIN"}))]
    #[case(json!({"email": "a@b.co", "name": "  ", "password": "secret1", "role": "TECNICO"}))]
    fn single_bad_fields_fail_validation(#[case] body: Value) {
        let err = parse_registration(register_body(body)).expect_err("invalid body");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn login_requires_both_fields() {
        let err = parse_credentials(LoginRequest::default()).expect_err("both fields missing");
        let errors = err
            .details()
            .and_then(|details| details.get("errors"))
            .and_then(Value::as_array)
            .expect("errors array")
            .clone();
        assert_eq!(errors.len(), 2);
    }

    #[rstest]
    fn login_validates_email_shape() {
        let err = parse_credentials(LoginRequest {
            email: Some("not-an-email".to_owned()),
            password: Some("secret1".to_owned()),
        })
        .expect_err("malformed email");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }
}
