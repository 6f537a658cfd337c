//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL via Diesel with async support through `diesel-async` and
//! `bb8` connection pooling.
//!
//! Repository implementations only translate between Diesel models and
//! domain types; row structs (`models.rs`) and schema definitions
//! (`schema.rs`) are internal and never exposed to the domain. Multi-step
//! writes (complaint creation, status transitions) run inside a single
//! transaction.

mod diesel_category_repository;
mod diesel_complaint_repository;
mod diesel_error;
mod diesel_user_repository;
pub mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_category_repository::DieselCategoryRepository;
pub use diesel_complaint_repository::DieselComplaintRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
