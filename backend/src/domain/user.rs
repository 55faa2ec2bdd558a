//! User accounts and the closed role enumeration.
//!
//! Roles and emails are validated at construction so an invalid value cannot
//! travel past the adapter boundary.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Closed set of account roles.
///
/// The wire representation keeps the legacy uppercase Spanish values so
/// existing clients keep working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Role {
    /// Field technician: creates case files and manages their evidence items.
    #[serde(rename = "TECNICO")]
    Technician,
    /// Coordinator: reviews, approves, and rejects case files.
    #[serde(rename = "COORDINADOR")]
    Coordinator,
}

impl Role {
    /// Wire form of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Technician => "TECNICO",
            Self::Coordinator => "COORDINADOR",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role string is outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {value}")]
pub struct RoleParseError {
    /// The rejected input.
    pub value: String,
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TECNICO" => Ok(Self::Technician),
            "COORDINADOR" => Ok(Self::Coordinator),
            other => Err(RoleParseError {
                value: other.to_owned(),
            }),
        }
    }
}

/// Validated email address.
///
/// ## Invariants
/// - trimmed, non-empty local part and domain
/// - exactly one `@`, a dot in the domain, no whitespace
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

/// Error returned when an email fails the shape check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed email address")]
pub struct EmailParseError;

impl Email {
    /// Validate and normalise (trim) a raw email string.
    pub fn new(raw: &str) -> Result<Self, EmailParseError> {
        let trimmed = raw.trim();
        if trimmed.chars().any(char::is_whitespace) {
            return Err(EmailParseError);
        }
        let mut parts = trimmed.split('@');
        let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
            (Some(local), Some(domain), None) => (local, domain),
            _ => return Err(EmailParseError),
        };
        if local.is_empty() || domain.is_empty() || !domain.contains('.') {
            return Err(EmailParseError);
        }
        if domain.starts_with('.') || domain.ends_with('.') {
            return Err(EmailParseError);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The normalised address.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl TryFrom<String> for Email {
    type Error = EmailParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

/// A registered account.
///
/// The password hash is deliberately private and excluded from every
/// serialised form; adapters read it through [`User::password_hash`] only to
/// verify credentials.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: Uuid,
    email: Email,
    name: String,
    password_hash: String,
    role: Role,
    created_at: DateTime<Utc>,
}

/// Fields captured when restoring a user from the backing store.
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Stable identifier.
    pub id: Uuid,
    /// Unique login email.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Salted one-way hash of the password.
    pub password_hash: String,
    /// Account role.
    pub role: Role,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a freshly registered user with a generated id.
    pub fn register(email: Email, name: String, password_hash: String, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            name,
            password_hash,
            role,
            created_at: Utc::now(),
        }
    }

    /// Restore a user from persisted fields.
    pub fn restore(record: UserRecord) -> Self {
        let UserRecord {
            id,
            email,
            name,
            password_hash,
            role,
            created_at,
        } = record;
        Self {
            id,
            email,
            name,
            password_hash,
            role,
            created_at,
        }
    }

    /// Stable identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Unique login email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Display name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Salted one-way hash of the password.
    pub fn password_hash(&self) -> &str {
        self.password_hash.as_str()
    }

    /// Account role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Registration timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Minimal identity embedded in case file reads.
    pub fn technician_ref(&self) -> TechnicianRef {
        TechnicianRef {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Minimal technician identity attached to case file reads.
///
/// Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechnicianRef {
    /// Technician's user id.
    pub id: Uuid,
    /// Technician's display name.
    pub name: String,
    /// Technician's email.
    pub email: Email,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("tech@example.com")]
    #[case("  padded@example.org  ")]
    #[case("first.last@sub.example.co")]
    fn accepts_plausible_emails(#[case] raw: &str) {
        let email = Email::new(raw).expect("valid email");
        assert_eq!(email.as_str(), raw.trim());
    }

    #[rstest]
    #[case("")]
    #[case("nodomain@")]
    #[case("@nolocal.com")]
    #[case("two@@example.com")]
    #[case("no-at-sign")]
    #[case("tld-less@example")]
    #[case("spaced out@example.com")]
    #[case("dot@.example.com")]
    fn rejects_malformed_emails(#[case] raw: &str) {
        assert_eq!(Email::new(raw), Err(EmailParseError));
    }

    #[rstest]
    #[case("TECNICO", Role::Technician)]
    #[case("COORDINADOR", Role::Coordinator)]
    fn parses_known_roles(#[case] raw: &str, #[case] expected: Role) {
        assert_eq!(raw.parse::<Role>().expect("known role"), expected);
        assert_eq!(expected.as_str(), raw);
    }

    #[rstest]
    #[case("ADMIN")]
    #[case("tecnico")]
    #[case("")]
    fn rejects_unknown_roles(#[case] raw: &str) {
        assert!(raw.parse::<Role>().is_err());
    }

    #[rstest]
    fn role_serialises_to_wire_values() {
        let json = serde_json::to_string(&Role::Coordinator).expect("serialise role");
        assert_eq!(json, "\"COORDINADOR\"");
        let back: Role = serde_json::from_str("\"TECNICO\"").expect("deserialise role");
        assert_eq!(back, Role::Technician);
    }

    #[rstest]
    fn register_assigns_fresh_identity() {
        let email = Email::new("t1@example.com").expect("valid email");
        let user = User::register(email, "Ana".to_owned(), "$hash".to_owned(), Role::Technician);
        let reference = user.technician_ref();
        assert_eq!(reference.id, user.id());
        assert_eq!(reference.name, "Ana");
        assert_eq!(reference.email.as_str(), "t1@example.com");
    }
}
