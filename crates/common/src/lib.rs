//! Common utilities and shared types for templatehub.
//!
//! This crate provides foundational components used across all templatehub
//! crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Bearer tokens**: JWT issue/validation via [`token`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Storage**: Object storage backends for uploaded images

pub mod config;
pub mod error;
pub mod id;
pub mod storage;
pub mod token;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use storage::{LocalStorage, StorageBackend, StorageService, StoredObject, generate_storage_key};
pub use token::{Claims, issue_token, validate_token};
