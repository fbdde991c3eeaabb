//! Query construction and execution.
//!
//! # Responsibility
//! - Build entity-scoped SELECT statements from fluent builder calls.
//! - Carry name-keyed execution hints that the translation provider reads.
//! - Execute in object, array, scalar and single-scalar shapes.
//!
//! # Invariants
//! - Field paths and aliases are validated before any SQL is rendered; only
//!   values are bound as parameters.
//! - Building a query never mutates the builder it came from.

pub mod builder;
pub mod executable;
pub mod statement;
