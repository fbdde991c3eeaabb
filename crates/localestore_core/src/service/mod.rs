//! Use-case facades over sessions and repositories.
//!
//! # Responsibility
//! - Give application code one typed entry point per entity type.
//! - Keep callers decoupled from query building and translation details.

pub mod manager;
