//! Fluent query builder bound to one entity type.
//!
//! Builder calls never fail; field paths, the alias and pagination are
//! validated once, in `get_query`.

use crate::error::{StoreError, StoreResult};
use crate::model::criteria::{IntoValue, SortDirection};
use crate::model::entity::{find_field, Entity, IDENTIFIER_COLUMN};
use crate::query::executable::Query;
use crate::query::statement::{SelectStatement, Selection};
use crate::session::Session;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Value;
use std::marker::PhantomData;

static ALIAS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("alias pattern must compile"));

#[derive(Debug, Clone)]
enum BuilderSelection {
    All,
    Columns(Vec<String>),
    Count,
}

pub struct QueryBuilder<'s, T: Entity> {
    session: &'s Session,
    alias: String,
    selection: BuilderSelection,
    conditions: Vec<(String, Value)>,
    order_by: Vec<(String, SortDirection)>,
    max_results: Option<u32>,
    first_result: Option<u32>,
    _entity: PhantomData<T>,
}

impl<'s, T: Entity> QueryBuilder<'s, T> {
    pub fn new(session: &'s Session, alias: impl Into<String>) -> Self {
        Self {
            session,
            alias: alias.into(),
            selection: BuilderSelection::All,
            conditions: Vec::new(),
            order_by: Vec::new(),
            max_results: None,
            first_result: None,
            _entity: PhantomData,
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Replaces the select list with one column (`alias.field` or bare).
    pub fn select(&mut self, path: impl Into<String>) -> &mut Self {
        self.selection = BuilderSelection::Columns(vec![path.into()]);
        self
    }

    /// Appends a column to the select list.
    pub fn add_select(&mut self, path: impl Into<String>) -> &mut Self {
        match &mut self.selection {
            BuilderSelection::Columns(columns) => columns.push(path.into()),
            _ => self.selection = BuilderSelection::Columns(vec![path.into()]),
        }
        self
    }

    /// Selects the row count instead of entity columns.
    pub fn select_count(&mut self) -> &mut Self {
        self.selection = BuilderSelection::Count;
        self
    }

    /// Adds `path = value`; `path` is `alias.field` or a bare field name.
    pub fn where_eq(&mut self, path: impl Into<String>, value: impl IntoValue) -> &mut Self {
        self.conditions.push((path.into(), value.into_value()));
        self
    }

    /// Replaces every existing order clause with this one.
    pub fn order_by(&mut self, path: impl Into<String>, direction: SortDirection) -> &mut Self {
        self.order_by.clear();
        self.add_order_by(path, direction)
    }

    /// Appends an order clause after the existing ones.
    pub fn add_order_by(&mut self, path: impl Into<String>, direction: SortDirection) -> &mut Self {
        self.order_by.push((path.into(), direction));
        self
    }

    pub fn set_max_results(&mut self, max_results: Option<u32>) -> &mut Self {
        self.max_results = max_results;
        self
    }

    pub fn set_first_result(&mut self, first_result: Option<u32>) -> &mut Self {
        self.first_result = first_result;
        self
    }

    pub fn max_results(&self) -> Option<u32> {
        self.max_results
    }

    pub fn first_result(&self) -> Option<u32> {
        self.first_result
    }

    /// Order clauses as `(path, direction)`, in precedence order.
    pub fn order_clauses(&self) -> &[(String, SortDirection)] {
        &self.order_by
    }

    /// Validates the builder state and produces an executable query without
    /// hints. The builder is left untouched and can be reused.
    pub fn get_query(&self) -> StoreResult<Query<'s, T>> {
        if !ALIAS_PATTERN.is_match(&self.alias) {
            return Err(StoreError::UnknownAlias {
                expected: "an identifier".to_string(),
                found: self.alias.clone(),
            });
        }

        let mut statement = SelectStatement::for_entity::<T>(&self.alias);
        statement.selection = match &self.selection {
            BuilderSelection::All => Selection::All,
            BuilderSelection::Count => Selection::Count,
            BuilderSelection::Columns(paths) => Selection::Columns(
                paths
                    .iter()
                    .map(|path| self.resolve(path))
                    .collect::<StoreResult<Vec<_>>>()?,
            ),
        };
        for (path, value) in &self.conditions {
            statement.conditions.push((self.resolve(path)?, value.clone()));
        }
        for (path, direction) in &self.order_by {
            statement.order_by.push((self.resolve(path)?, *direction));
        }
        statement.limit = self.max_results;
        statement.offset = self.first_result;

        Ok(Query::new(self.session, statement))
    }

    fn resolve(&self, path: &str) -> StoreResult<&'static str> {
        let field = match path.split_once('.') {
            Some((alias, field)) if alias == self.alias => field,
            Some((alias, _)) => {
                return Err(StoreError::UnknownAlias {
                    expected: self.alias.clone(),
                    found: alias.to_string(),
                })
            }
            None => path,
        };

        if field == IDENTIFIER_COLUMN {
            return Ok(IDENTIFIER_COLUMN);
        }
        find_field::<T>(field)
            .map(|definition| definition.name)
            .ok_or_else(|| StoreError::UnknownField {
                entity: T::NAME,
                field: field.to_string(),
            })
    }
}
