//! PostgreSQL-backed `CategoryRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CategoryPersistenceError, CategoryRepository};
use crate::domain::{Category, CategoryId};

use super::diesel_error::{map_diesel_error, map_pool_error};
use super::models::CategoryRow;
use super::pool::DbPool;
use super::schema::categories;

/// Diesel-backed category catalog.
#[derive(Clone)]
pub struct DieselCategoryRepository {
    pool: DbPool,
}

impl DieselCategoryRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for DieselCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, CategoryPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, CategoryPersistenceError::connection))?;

        let rows: Vec<CategoryRow> = categories::table
            .order(categories::category_name.asc())
            .select(CategoryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|e| {
                map_diesel_error(
                    e,
                    CategoryPersistenceError::query,
                    CategoryPersistenceError::connection,
                )
            })?;

        Ok(rows
            .into_iter()
            .map(|row| Category {
                id: CategoryId::new(row.category_id),
                name: row.category_name,
            })
            .collect())
    }
}
