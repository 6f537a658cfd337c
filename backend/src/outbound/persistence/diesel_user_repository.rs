//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{NewUserRecord, UserPersistenceError, UserRepository};
use crate::domain::{Role, UserAccount, UserId};

use super::diesel_error::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed credential store.
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

fn map_error(error: diesel::result::Error) -> UserPersistenceError {
    if is_unique_violation(&error) {
        return UserPersistenceError::DuplicateEmail;
    }
    map_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn row_to_account(row: UserRow) -> Result<UserAccount, UserPersistenceError> {
    let role: Role = row
        .role
        .parse()
        .map_err(|_| UserPersistenceError::query("unrecognised role value in storage"))?;
    Ok(UserAccount {
        id: UserId::new(row.user_id),
        name: row.name,
        email: row.email,
        phone: row.phone,
        password_hash: row.password_hash,
        role,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, record: NewUserRecord) -> Result<UserId, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, UserPersistenceError::connection))?;

        let row = NewUserRow {
            name: &record.name,
            email: &record.email,
            phone: record.phone.as_deref(),
            password_hash: &record.password_hash,
            role: Role::User.as_str(),
        };
        let user_id: i32 = diesel::insert_into(users::table)
            .values(&row)
            .returning(users::user_id)
            .get_result(&mut conn)
            .await
            .map_err(map_error)?;

        Ok(UserId::new(user_id))
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, UserPersistenceError::connection))?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_error)?;

        row.map(row_to_account).transpose()
    }
}
