//! Domain models and request payloads

pub mod user;

pub use user::{DateRange, Field, FieldUpdate, User, UserDraft};
