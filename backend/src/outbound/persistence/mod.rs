//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations only translate between Diesel models and
//! domain types; no business logic resides here. Row structs (`models.rs`)
//! and table definitions (`schema.rs`) are internal implementation details,
//! never exposed to the domain layer. Connections are managed via `bb8`
//! pools with async integration through `diesel-async`.

mod diesel_case_repository;
mod diesel_error_mapping;
mod diesel_notification_repository;
mod models;
mod pool;
mod schema;

pub use diesel_case_repository::DieselCaseRepository;
pub use diesel_notification_repository::DieselNotificationRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
