//! Core business logic for templatehub.

pub mod services;

pub use services::*;
