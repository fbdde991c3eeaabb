//! Entity metadata contracts and query value types.
//!
//! # Responsibility
//! - Describe how a domain type maps onto one table and which of its fields
//!   are translatable.
//! - Provide the criteria/ordering vocabulary used by find-family lookups.
//!
//! # Invariants
//! - Every entity is identified by a stable `EntityId` stored in column `id`.
//! - Field definitions and `Entity::field_values` stay index-aligned.

pub mod criteria;
pub mod entity;
pub mod record;
