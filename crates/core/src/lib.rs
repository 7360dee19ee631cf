//! `tollgate-core` — shared primitives for the identity core.
//!
//! This crate contains **pure** building blocks (no transport or storage concerns).

pub mod error;
pub mod id;

pub use error::DomainError;
pub use id::{IdGenerator, TimeOrderedIdGenerator, UserId};
