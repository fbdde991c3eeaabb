//! Repository layer: find-family lookups and locale-aware query execution.
//!
//! # Responsibility
//! - Define the `ObjectRepository` contract shared by both repository variants.
//! - Keep translation decoration out of manager and call-site code.
//!
//! # Invariants
//! - Only `TranslatableRepository` attaches translation hints; the plain
//!   `EntityRepository` always hydrates base-language values.

pub mod entity_repo;
pub mod translatable_repo;
