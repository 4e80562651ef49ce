//! `ecms-core`: domain building blocks shared by the catalog and session crates.
//!
//! This crate contains **pure domain** primitives (no HTTP, no rendering, no storage).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot};
pub use entity::Entity;
pub use error::{DomainError, DomainResult, FieldError, ValidationErrors};
pub use id::{CategoryId, OptionId, SessionId, StoreId, UserId, VariantId};
pub use value_object::ValueObject;
