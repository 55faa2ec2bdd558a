//! PostgreSQL persistence adapter built on Diesel.

mod diesel_case_file_repository;
mod diesel_error_mapping;
mod diesel_user_repository;
mod models;
pub mod pool;
pub mod schema;

pub use diesel_case_file_repository::DieselCaseFileRepository;
pub use diesel_user_repository::DieselUserRepository;
