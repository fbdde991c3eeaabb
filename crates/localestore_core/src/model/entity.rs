//! Entity trait and field metadata.

use crate::error::StoreResult;
use crate::model::record::Record;
use rusqlite::types::Value;
use std::any::Any;
use std::fmt::Debug;
use uuid::Uuid;

/// Stable identifier for every persisted entity.
pub type EntityId = Uuid;

/// Column holding `EntityId` on every entity table.
pub const IDENTIFIER_COLUMN: &str = "id";

/// SQLite storage class of a mapped field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
    Real,
    Blob,
}

impl SqlType {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Blob => "BLOB",
        }
    }
}

/// One mapped, non-identifier field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub nullable: bool,
    /// Hydrated from the translation provider when a locale rewrite applies.
    pub translatable: bool,
}

impl FieldDef {
    pub const fn new(name: &'static str, sql_type: SqlType) -> Self {
        Self {
            name,
            sql_type,
            nullable: false,
            translatable: false,
        }
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, SqlType::Text)
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, SqlType::Integer)
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Translated values are stored as text; marking a field translatable
    /// also makes it nullable because a non-fallback rewrite may yield `NULL`.
    pub const fn translatable(mut self) -> Self {
        self.translatable = true;
        self.nullable = true;
        self
    }
}

/// A domain type persisted by the store.
///
/// `Default` must produce a fresh, non-persisted instance with a new id; it
/// backs `Manager::create`.
pub trait Entity: Any + Clone + Default + Debug {
    /// Type name used for translation rows and type-scoped `clear`.
    const NAME: &'static str;
    const TABLE: &'static str;
    /// Mapped fields, excluding the identifier.
    const FIELDS: &'static [FieldDef];

    fn id(&self) -> EntityId;

    /// Values for `FIELDS`, in the same order.
    fn field_values(&self) -> Vec<Value>;

    /// Builds an instance from one hydrated result row.
    fn hydrate(record: &Record) -> StoreResult<Self>;
}

/// Looks up a field definition by name.
pub fn find_field<T: Entity>(name: &str) -> Option<&'static FieldDef> {
    T::FIELDS.iter().find(|field| field.name == name)
}

/// Type-erased view of an entity for the dynamic manager boundary.
pub trait AnyEntity: Any {
    fn entity_name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
}

impl<T: Entity> AnyEntity for T {
    fn entity_name(&self) -> &'static str {
        T::NAME
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
