//! Store-level error taxonomy shared by session, query and repository code.
//!
//! Every failure raised while flushing or executing a query surfaces as a
//! `StoreError`. Callers above the repository layer receive it unchanged.

use crate::db::DbError;
use crate::locale::LocaleError;
use crate::model::entity::EntityId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure raised by the persistence engine or the query pipeline.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// A single-result query matched no row.
    NoResult,
    /// A single-result query matched more than one row.
    NonUniqueResult(usize),
    UnknownField {
        entity: &'static str,
        field: String,
    },
    UnknownAlias {
        expected: String,
        found: String,
    },
    NotTranslatable {
        entity: &'static str,
        field: String,
    },
    /// A translation was requested for an entity queued for removal.
    RemovalPending {
        entity: &'static str,
        id: EntityId,
    },
    /// Result rows could not be converted into the requested shape.
    UnexpectedShape(String),
    InvalidData(String),
    InvalidLocale(LocaleError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NoResult => write!(f, "no result was found for query although one row was expected"),
            Self::NonUniqueResult(count) => {
                write!(f, "query returned {count} rows although at most one was expected")
            }
            Self::UnknownField { entity, field } => {
                write!(f, "entity `{entity}` has no field `{field}`")
            }
            Self::NotTranslatable { entity, field } => {
                write!(f, "field `{field}` of entity `{entity}` is not translatable")
            }
            Self::RemovalPending { entity, id } => {
                write!(f, "entity `{entity}` with id `{id}` is queued for removal")
            }
            Self::UnknownAlias { expected, found } => {
                write!(f, "unknown query alias `{found}`; builder alias is `{expected}`")
            }
            Self::UnexpectedShape(message) => write!(f, "unexpected result shape: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::InvalidLocale(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidLocale(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<LocaleError> for StoreError {
    fn from(value: LocaleError) -> Self {
        Self::InvalidLocale(value)
    }
}
