//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, User, UserRecord};

use super::diesel_error_mapping::{StoreFault, is_unique_violation};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_user_fault(fault: StoreFault) -> UserPersistenceError {
    match fault {
        StoreFault::Connection(message) => UserPersistenceError::connection(message),
        StoreFault::Query(message) => UserPersistenceError::query(message),
    }
}

fn map_user_pool_error(error: PoolError) -> UserPersistenceError {
    map_user_fault(StoreFault::from_pool(&error))
}

fn map_user_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_user_fault(StoreFault::from_diesel(&error))
}

/// Convert a database row into a validated domain user.
fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let UserRow {
        id,
        email,
        name,
        password_hash,
        role,
        created_at,
    } = row;

    let email = Email::new(&email)
        .map_err(|err| UserPersistenceError::query(format!("decode email: {err}")))?;
    let role = role
        .parse()
        .map_err(|err| UserPersistenceError::query(format!("decode role: {err}")))?;

    Ok(User::restore(UserRecord {
        id,
        email,
        name,
        password_hash,
        role,
        created_at,
    }))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_user_pool_error)?;

        let new_row = NewUserRow {
            id: user.id(),
            email: user.email().as_str(),
            name: user.name(),
            password_hash: user.password_hash(),
            role: user.role().as_str(),
            created_at: user.created_at(),
        };

        diesel::insert_into(users::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    UserPersistenceError::duplicate_email()
                } else {
                    map_user_diesel_error(err)
                }
            })?;
        Ok(())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_user_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_user_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_user_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_user_diesel_error)?;

        row.map(row_to_user).transpose()
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion coverage; live queries are exercised against a real
    //! database in deployment environments.
    use chrono::Utc;
    use rstest::rstest;

    use super::*;
    use crate::domain::Role;

    fn row(email: &str, role: &str) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            email: email.to_owned(),
            name: "Ana".to_owned(),
            password_hash: "$argon2id$stub".to_owned(),
            role: role.to_owned(),
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn valid_rows_convert() {
        let user = row_to_user(row("ana@example.com", "TECNICO")).expect("valid row");
        assert_eq!(user.email().as_str(), "ana@example.com");
        assert_eq!(user.role(), Role::Technician);
    }

    #[rstest]
    #[case("broken-email", "TECNICO")]
    #[case("ana@example.com", "SUPERVISOR")]
    fn corrupt_rows_surface_query_errors(#[case] email: &str, #[case] role: &str) {
        let err = row_to_user(row(email, role)).expect_err("corrupt row must fail");
        assert!(matches!(err, UserPersistenceError::Query { .. }));
    }
}
