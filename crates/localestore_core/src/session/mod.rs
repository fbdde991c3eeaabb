//! Request-scoped persistence session (unit of work).
//!
//! # Responsibility
//! - Queue persist/remove/translate changes until an explicit flush.
//! - Flush every queued change, across entity types, in one transaction.
//! - Hand out plain and locale-aware repositories bound to this session.
//!
//! # Invariants
//! - Queued changes are invisible to queries until `flush` commits.
//! - A failed flush rolls back and keeps the queue intact.
//! - `clear` never touches durable storage.
//! - A session is owned by one request/task; it is deliberately `!Sync`.

pub mod unit_of_work;

use crate::error::{StoreError, StoreResult};
use crate::locale::Locale;
use crate::model::entity::{find_field, Entity, EntityId, IDENTIFIER_COLUMN};
use crate::model::record::Record;
use crate::repo::entity_repo::EntityRepository;
use crate::repo::translatable_repo::TranslatableRepository;
use crate::translation::provider::TranslationProvider;
use log::{error, info};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use unit_of_work::{FlushStats, UnitOfWork};

/// Field name to translated content.
pub type FieldTranslations = BTreeMap<String, Option<String>>;

pub struct Session {
    conn: Connection,
    provider: Arc<dyn TranslationProvider>,
    unit_of_work: RefCell<UnitOfWork>,
}

impl Session {
    /// Wraps a migrated connection.
    pub fn new(conn: Connection, provider: Arc<dyn TranslationProvider>) -> Self {
        Self {
            conn,
            provider,
            unit_of_work: RefCell::new(UnitOfWork::default()),
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn translation_provider(&self) -> &Arc<dyn TranslationProvider> {
        &self.provider
    }

    /// Creates the entity table for `T` when it does not exist yet.
    pub fn ensure_schema<T: Entity>(&self) -> StoreResult<()> {
        let mut columns = vec![format!("\"{IDENTIFIER_COLUMN}\" TEXT PRIMARY KEY NOT NULL")];
        columns.extend(T::FIELDS.iter().map(|field| {
            let null_clause = if field.nullable { "" } else { " NOT NULL" };
            format!("\"{}\" {}{null_clause}", field.name, field.sql_type.as_sql())
        }));
        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" ({});",
            T::TABLE,
            columns.join(", ")
        ))?;
        Ok(())
    }

    /// Queues an insert-or-update of `entity`'s current state.
    pub fn persist<T: Entity>(&self, entity: &T) {
        self.unit_of_work.borrow_mut().schedule_upsert(entity);
    }

    /// Queues removal of `entity` and its translations.
    pub fn remove<T: Entity>(&self, entity: &T) {
        self.unit_of_work.borrow_mut().schedule_remove(entity);
    }

    /// Queues a translated value for one translatable field. Rejected while a
    /// removal of the same entity is queued.
    pub fn translate<T: Entity>(
        &self,
        entity: &T,
        field: &str,
        locale: &Locale,
        content: Option<String>,
    ) -> StoreResult<()> {
        let definition = find_field::<T>(field).ok_or_else(|| StoreError::UnknownField {
            entity: T::NAME,
            field: field.to_string(),
        })?;
        if !definition.translatable {
            return Err(StoreError::NotTranslatable {
                entity: T::NAME,
                field: field.to_string(),
            });
        }
        let mut unit_of_work = self.unit_of_work.borrow_mut();
        if unit_of_work.has_pending_remove(T::NAME, entity.id()) {
            return Err(StoreError::RemovalPending {
                entity: T::NAME,
                id: entity.id(),
            });
        }
        unit_of_work.schedule_translation(entity, definition.name, locale, content);
        Ok(())
    }

    /// Commits every queued change, for all entity types, in one transaction.
    pub fn flush(&self) -> StoreResult<FlushStats> {
        let started_at = Instant::now();
        let unit_of_work = self.unit_of_work.borrow();
        if unit_of_work.is_empty() {
            return Ok(FlushStats::default());
        }

        let applied = self
            .conn
            .unchecked_transaction()
            .and_then(|tx| {
                let stats = unit_of_work.apply(&tx)?;
                tx.commit()?;
                Ok(stats)
            });
        drop(unit_of_work);

        match applied {
            Ok(stats) => {
                self.unit_of_work.borrow_mut().clear(None);
                info!(
                    "event=flush module=session status=ok upserts={} removals={} translations={} duration_ms={}",
                    stats.upserts,
                    stats.removals,
                    stats.translations,
                    started_at.elapsed().as_millis()
                );
                Ok(stats)
            }
            Err(err) => {
                error!(
                    "event=flush module=session status=error pending={} duration_ms={} error={}",
                    self.pending_changes(),
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Detaches queued changes for all entities, or for one entity name.
    pub fn clear(&self, entity: Option<&str>) {
        let dropped = self.unit_of_work.borrow_mut().clear(entity);
        info!(
            "event=clear module=session status=ok scope={} dropped={}",
            entity.unwrap_or("all"),
            dropped
        );
    }

    pub fn pending_changes(&self) -> usize {
        self.unit_of_work.borrow().len()
    }

    /// Number of queued changes for one entity name.
    pub fn pending_changes_for(&self, entity: &str) -> usize {
        self.unit_of_work
            .borrow()
            .changes()
            .iter()
            .filter(|change| change.entity == entity)
            .count()
    }

    pub fn repository<T: Entity>(&self) -> EntityRepository<'_, T> {
        EntityRepository::new(self)
    }

    pub fn translatable_repository<T: Entity>(&self) -> TranslatableRepository<'_, T> {
        TranslatableRepository::new(self)
    }

    /// Stored translations of one entity, keyed by locale then field.
    pub fn load_translations(
        &self,
        entity: &str,
        id: EntityId,
    ) -> StoreResult<BTreeMap<String, FieldTranslations>> {
        let mut stmt = self.conn.prepare(
            "SELECT locale, field, content
             FROM translations
             WHERE object_class = ?1 AND foreign_key = ?2
             ORDER BY locale ASC, field ASC;",
        )?;
        let mut rows = stmt.query(params![entity, id.to_string()])?;
        let mut translations: BTreeMap<String, FieldTranslations> = BTreeMap::new();
        while let Some(row) = rows.next()? {
            translations
                .entry(row.get("locale")?)
                .or_default()
                .insert(row.get("field")?, row.get("content")?);
        }
        Ok(translations)
    }

    pub(crate) fn select_records(&self, sql: &str, params: Vec<Value>) -> StoreResult<Vec<Record>> {
        let mut stmt = self.conn.prepare(sql)?;
        let names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let mut rows = stmt.query(params_from_iter(params))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut columns = Vec::with_capacity(names.len());
            for (index, name) in names.iter().enumerate() {
                columns.push((name.clone(), row.get::<_, Value>(index)?));
            }
            records.push(Record::new(columns));
        }
        Ok(records)
    }
}
