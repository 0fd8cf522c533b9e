//! Task tracking HTTP service backed by SQLite.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod repository;
mod routes;

pub use db::{Database, Session, StorageError};
pub use error::ApiError;
pub use routes::app;
