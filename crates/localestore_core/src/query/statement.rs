//! Compiled SELECT statement and its SQL rendering.
//!
//! A `SelectStatement` is the validated form of a `QueryBuilder`. The
//! translation provider rewrites it in place (projections and joins) before
//! it is rendered, so WHERE and ORDER BY always reference the final,
//! possibly translated, projection expression of a column.

use crate::model::criteria::SortDirection;
use crate::model::entity::{Entity, IDENTIFIER_COLUMN};
use rusqlite::types::Value;

/// Quoted `alias."column"` reference; columns may be SQL keywords.
pub fn column_ref(alias: &str, column: &str) -> String {
    format!("{alias}.\"{column}\"")
}

/// One selected column and the SQL expression producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub column: &'static str,
    pub expr: String,
    pub translatable: bool,
}

/// Extra join added by a statement rewrite; `params` bind in textual order.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Which projections the rendered SELECT list returns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// Identifier plus every mapped field.
    #[default]
    All,
    /// Only these columns, in this order.
    Columns(Vec<&'static str>),
    /// `COUNT` of the identifier, returned as column `count`.
    Count,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub entity: &'static str,
    pub table: &'static str,
    pub alias: String,
    pub projections: Vec<Projection>,
    pub selection: Selection,
    pub joins: Vec<Join>,
    pub conditions: Vec<(&'static str, Value)>,
    pub order_by: Vec<(&'static str, SortDirection)>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl SelectStatement {
    /// Selects the identifier and every mapped field of `T`.
    pub fn for_entity<T: Entity>(alias: &str) -> Self {
        let mut projections = Vec::with_capacity(T::FIELDS.len() + 1);
        projections.push(Projection {
            column: IDENTIFIER_COLUMN,
            expr: column_ref(alias, IDENTIFIER_COLUMN),
            translatable: false,
        });
        projections.extend(T::FIELDS.iter().map(|field| Projection {
            column: field.name,
            expr: column_ref(alias, field.name),
            translatable: field.translatable,
        }));

        Self {
            entity: T::NAME,
            table: T::TABLE,
            alias: alias.to_string(),
            projections,
            selection: Selection::All,
            joins: Vec::new(),
            conditions: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn projection(&self, column: &str) -> Option<&Projection> {
        self.projections
            .iter()
            .find(|projection| projection.column == column)
    }

    pub fn projection_mut(&mut self, column: &str) -> Option<&mut Projection> {
        self.projections
            .iter_mut()
            .find(|projection| projection.column == column)
    }

    fn expression(&self, column: &str) -> String {
        self.projection(column).map_or_else(
            || column_ref(&self.alias, column),
            |projection| projection.expr.clone(),
        )
    }

    /// Renders SQL text and its positional parameters.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut params = Vec::new();
        let select_list = match &self.selection {
            Selection::All => self
                .projections
                .iter()
                .map(|projection| format!("{} AS \"{}\"", projection.expr, projection.column))
                .collect::<Vec<_>>()
                .join(", "),
            Selection::Columns(columns) => columns
                .iter()
                .map(|column| format!("{} AS \"{column}\"", self.expression(column)))
                .collect::<Vec<_>>()
                .join(", "),
            Selection::Count => format!(
                "COUNT({}) AS \"count\"",
                self.expression(IDENTIFIER_COLUMN)
            ),
        };
        let mut sql = format!("SELECT {select_list} FROM \"{}\" {}", self.table, self.alias);

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.sql);
            params.extend(join.params.iter().cloned());
        }

        if !self.conditions.is_empty() {
            let clauses = self
                .conditions
                .iter()
                .map(|(column, value)| {
                    let expr = self.expression(column);
                    if matches!(value, Value::Null) {
                        format!("{expr} IS NULL")
                    } else {
                        params.push(value.clone());
                        format!("{expr} = ?")
                    }
                })
                .collect::<Vec<_>>()
                .join(" AND ");
            sql.push_str(" WHERE ");
            sql.push_str(&clauses);
        }

        if !self.order_by.is_empty() {
            let clauses = self
                .order_by
                .iter()
                .map(|(column, direction)| format!("{} {}", self.expression(column), direction.as_sql()))
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(" ORDER BY ");
            sql.push_str(&clauses);
        }

        match (self.limit, self.offset) {
            (Some(limit), offset) => {
                sql.push_str(" LIMIT ?");
                params.push(Value::Integer(i64::from(limit)));
                if let Some(offset) = offset {
                    sql.push_str(" OFFSET ?");
                    params.push(Value::Integer(i64::from(offset)));
                }
            }
            (None, Some(offset)) => {
                sql.push_str(" LIMIT -1 OFFSET ?");
                params.push(Value::Integer(i64::from(offset)));
            }
            (None, None) => {}
        }

        (sql, params)
    }
}
