//! Locale-aware persistence core.
//! Generic entity managers over a unit-of-work session, plus repositories
//! that hydrate translatable fields in a request-resolved locale.

pub mod config;
pub mod db;
pub mod error;
pub mod listener;
pub mod locale;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;
pub mod session;
pub mod translation;

pub use config::{ConfigError, CoreConfig};
pub use db::{open_session, open_session_in_memory, DbError};
pub use error::{StoreError, StoreResult};
pub use listener::locale_listener::{resolve_locale, LocaleListener};
pub use listener::request::{Request, SessionBag, SESSION_LOCALE_KEY};
pub use locale::{Locale, LocaleError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::criteria::{Criteria, IntoValue, OrderSpec, SortDirection};
pub use model::entity::{AnyEntity, Entity, EntityId, FieldDef, SqlType};
pub use model::record::Record;
pub use query::builder::QueryBuilder;
pub use query::executable::{HydrationMode, Query, QueryOutput};
pub use repo::entity_repo::{EntityRepository, ObjectRepository};
pub use repo::translatable_repo::{translate_query, QueryOptions, TranslatableRepository};
pub use service::manager::{Manager, ManagerError, ManagerResult};
pub use session::unit_of_work::FlushStats;
pub use session::Session;
pub use translation::provider::{SqliteTranslationProvider, TranslationProvider};
pub use translation::translator::Translator;
pub use translation::LocaleAware;

/// Liveness answer printed by the `localestore_cli` smoke binary.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
