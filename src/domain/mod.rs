//! Domain layer - Business abstractions
//!
//! Repository contracts, query/input types, the error taxonomy and the pure
//! lending rules. No HTTP types live here.

pub mod errors;
pub mod lending;
pub mod repositories;

pub use errors::{DomainError, FieldError};
pub use repositories::*;
