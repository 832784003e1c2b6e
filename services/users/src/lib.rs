//! User manager service
//!
//! Person records with create, read, replace, field-level patch and delete
//! operations, a birth date range query, and the validation rules every
//! stored user has to satisfy.

pub mod config;
pub mod error;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod service;
pub mod state;
pub mod uniqueness;
pub mod validation;
