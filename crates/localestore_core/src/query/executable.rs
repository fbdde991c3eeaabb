//! Executable query: hints plus result-shape accessors.

use crate::error::{StoreError, StoreResult};
use crate::locale::Locale;
use crate::model::entity::Entity;
use crate::model::record::Record;
use crate::query::statement::SelectStatement;
use crate::session::Session;
use crate::translation::{HINT_OUTPUT_WALKER, HINT_TRANSLATABLE_LOCALE};
use log::debug;
use rusqlite::types::Value;
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::time::Instant;

/// Result shape a query is hydrated into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HydrationMode {
    /// Entity instances.
    #[default]
    Object,
    /// Column-name keyed JSON objects.
    Array,
    /// Flat rows keyed `alias_column`.
    Scalar,
    /// Exactly one value from exactly one row.
    SingleScalar,
}

impl HydrationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::Scalar => "scalar",
            Self::SingleScalar => "single_scalar",
        }
    }
}

/// Output of [`Query::execute`], one variant per hydration mode.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput<T> {
    Objects(Vec<T>),
    Arrays(Vec<Map<String, JsonValue>>),
    Scalars(Vec<Record>),
    SingleScalar(Value),
}

impl<T> QueryOutput<T> {
    /// Number of rows; a single scalar counts as one.
    pub fn len(&self) -> usize {
        match self {
            Self::Objects(items) => items.len(),
            Self::Arrays(rows) => rows.len(),
            Self::Scalars(rows) => rows.len(),
            Self::SingleScalar(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct Query<'s, T: Entity> {
    session: &'s Session,
    statement: SelectStatement,
    hints: BTreeMap<String, String>,
    _entity: PhantomData<T>,
}

impl<'s, T: Entity> Query<'s, T> {
    pub(crate) fn new(session: &'s Session, statement: SelectStatement) -> Self {
        Self {
            session,
            statement,
            hints: BTreeMap::new(),
            _entity: PhantomData,
        }
    }

    /// Sets one named hint, replacing any previous value under that name.
    pub fn set_hint(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.hints.insert(name.into(), value.into());
        self
    }

    pub fn remove_hint(&mut self, name: &str) -> &mut Self {
        self.hints.remove(name);
        self
    }

    pub fn hint(&self, name: &str) -> Option<&str> {
        self.hints.get(name).map(String::as_str)
    }

    pub fn hints(&self) -> &BTreeMap<String, String> {
        &self.hints
    }

    pub fn statement(&self) -> &SelectStatement {
        &self.statement
    }

    /// SQL as it would run right now, after any provider rewrite.
    pub fn to_sql(&self) -> StoreResult<(String, Vec<Value>)> {
        Ok(self.prepared_statement()?.to_sql())
    }

    pub fn execute(&self, mode: HydrationMode) -> StoreResult<QueryOutput<T>> {
        let started_at = Instant::now();
        let records = self.run()?;
        let row_count = records.len();

        let output = match mode {
            HydrationMode::Object => QueryOutput::Objects(
                records
                    .iter()
                    .map(T::hydrate)
                    .collect::<StoreResult<Vec<_>>>()?,
            ),
            HydrationMode::Array => {
                QueryOutput::Arrays(records.iter().map(Record::to_json).collect())
            }
            HydrationMode::Scalar => QueryOutput::Scalars(
                records
                    .into_iter()
                    .map(|record| self.scalar_record(record))
                    .collect(),
            ),
            HydrationMode::SingleScalar => QueryOutput::SingleScalar(single_scalar(records)?),
        };

        debug!(
            "event=query_execute module=query status=ok entity={} shape={} locale={} rows={} duration_ms={}",
            T::NAME,
            mode.as_str(),
            self.hint(HINT_TRANSLATABLE_LOCALE).unwrap_or("-"),
            row_count,
            started_at.elapsed().as_millis()
        );
        Ok(output)
    }

    pub fn get_result(&self) -> StoreResult<Vec<T>> {
        match self.execute(HydrationMode::Object)? {
            QueryOutput::Objects(items) => Ok(items),
            _ => Err(StoreError::UnexpectedShape("expected objects".to_string())),
        }
    }

    /// Returns `None` on zero rows and `NonUniqueResult` on more than one.
    pub fn get_one_or_null_result(&self) -> StoreResult<Option<T>> {
        let mut items = self.get_result()?;
        match items.len() {
            0 => Ok(None),
            1 => Ok(items.pop()),
            count => Err(StoreError::NonUniqueResult(count)),
        }
    }

    pub fn get_single_result(&self) -> StoreResult<T> {
        self.get_one_or_null_result()?.ok_or(StoreError::NoResult)
    }

    /// One-or-null in any hydration mode: `Some` holds exactly one row.
    pub fn get_one_or_null_output(&self, mode: HydrationMode) -> StoreResult<Option<QueryOutput<T>>> {
        let output = match self.execute(mode) {
            Err(StoreError::NoResult) => return Ok(None),
            other => other?,
        };
        match output.len() {
            0 => Ok(None),
            1 => Ok(Some(output)),
            count => Err(StoreError::NonUniqueResult(count)),
        }
    }

    pub fn get_single_output(&self, mode: HydrationMode) -> StoreResult<QueryOutput<T>> {
        self.get_one_or_null_output(mode)?.ok_or(StoreError::NoResult)
    }

    pub fn get_scalar_result(&self) -> StoreResult<Vec<Record>> {
        match self.execute(HydrationMode::Scalar)? {
            QueryOutput::Scalars(rows) => Ok(rows),
            _ => Err(StoreError::UnexpectedShape("expected scalar rows".to_string())),
        }
    }

    pub fn get_single_scalar_result(&self) -> StoreResult<Value> {
        match self.execute(HydrationMode::SingleScalar)? {
            QueryOutput::SingleScalar(value) => Ok(value),
            _ => Err(StoreError::UnexpectedShape("expected a single scalar".to_string())),
        }
    }

    pub fn get_array_result(&self) -> StoreResult<Vec<Map<String, JsonValue>>> {
        match self.execute(HydrationMode::Array)? {
            QueryOutput::Arrays(rows) => Ok(rows),
            _ => Err(StoreError::UnexpectedShape("expected arrays".to_string())),
        }
    }

    fn prepared_statement(&self) -> StoreResult<SelectStatement> {
        let mut statement = self.statement.clone();
        let provider = self.session.translation_provider();
        if self.hint(HINT_OUTPUT_WALKER) == Some(provider.walker_name()) {
            let locale = self
                .hint(HINT_TRANSLATABLE_LOCALE)
                .map(Locale::parse)
                .transpose()?;
            provider.rewrite(&mut statement, locale.as_ref());
        }
        Ok(statement)
    }

    fn run(&self) -> StoreResult<Vec<Record>> {
        let (sql, params) = self.prepared_statement()?.to_sql();
        self.session.select_records(&sql, params)
    }

    fn scalar_record(&self, record: Record) -> Record {
        let alias = &self.statement.alias;
        Record::new(
            record
                .into_columns()
                .into_iter()
                .map(|(column, value)| (format!("{alias}_{column}"), value))
                .collect(),
        )
    }
}

fn single_scalar(records: Vec<Record>) -> StoreResult<Value> {
    if records.len() > 1 {
        return Err(StoreError::NonUniqueResult(records.len()));
    }
    let record = records.into_iter().next().ok_or(StoreError::NoResult)?;
    if record.len() != 1 {
        return Err(StoreError::UnexpectedShape(format!(
            "single scalar expects one column, row has {}",
            record.len()
        )));
    }
    record
        .into_columns()
        .into_iter()
        .next()
        .map(|(_, value)| value)
        .ok_or_else(|| StoreError::UnexpectedShape("row has no columns".to_string()))
}
