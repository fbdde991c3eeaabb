//! Request-boundary locale handling.
//!
//! # Responsibility
//! - Model the request/session attributes locale resolution reads.
//! - Resolve the request locale once and propagate it to every locale holder.
//!
//! # Invariants
//! - Resolution order is session `_locale`, then the request locale.
//! - After the listener runs, provider, translator and request agree.

pub mod locale_listener;
pub mod request;
