//! Category catalog handler.

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::CategoryPersistenceError;
use crate::domain::{Category, Error};

use super::ApiResult;
use super::schemas::ErrorSchema;
use super::state::HttpState;

/// One category as returned by `GET /api/categories`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    /// Stable identifier.
    pub category_id: i32,
    /// Human-readable category name.
    pub category_name: String,
}

impl From<Category> for CategoryResponse {
    fn from(value: Category) -> Self {
        Self {
            category_id: value.id.get(),
            category_name: value.name,
        }
    }
}

fn map_catalog_error(error: CategoryPersistenceError) -> Error {
    match error {
        CategoryPersistenceError::Connection { message } => {
            Error::internal(format!("category catalog unavailable: {message}"))
        }
        CategoryPersistenceError::Query { message } => {
            Error::internal(format!("category catalog error: {message}"))
        }
    }
}

/// List complaint categories, ordered by name.
#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "Categories", body = [CategoryResponse]),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["categories"],
    operation_id = "listCategories",
    security([])
)]
#[get("/categories")]
pub async fn list_categories(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<CategoryResponse>>> {
    let categories = state.categories.list().await.map_err(map_catalog_error)?;
    Ok(web::Json(
        categories.into_iter().map(CategoryResponse::from).collect(),
    ))
}
