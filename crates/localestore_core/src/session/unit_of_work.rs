//! Pending-change queue behind a `Session`.

use crate::locale::Locale;
use crate::model::entity::{Entity, EntityId, IDENTIFIER_COLUMN};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Transaction};

/// One queued mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeKind {
    Upsert {
        table: &'static str,
        columns: Vec<&'static str>,
        values: Vec<Value>,
    },
    Remove {
        table: &'static str,
    },
    Translate {
        field: &'static str,
        locale: Locale,
        content: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingChange {
    pub entity: &'static str,
    pub id: EntityId,
    pub kind: ChangeKind,
}

impl PendingChange {
    fn same_entity(&self, entity: &str, id: EntityId) -> bool {
        self.entity == entity && self.id == id
    }
}

/// Counts reported by one successful flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlushStats {
    pub upserts: usize,
    pub removals: usize,
    pub translations: usize,
}

impl FlushStats {
    pub fn total(&self) -> usize {
        self.upserts + self.removals + self.translations
    }
}

/// Insertion-ordered queue of pending changes.
///
/// # Invariants
/// - At most one upsert-or-remove per entity identity; the latest wins.
/// - At most one translation per `(entity, id, field, locale)`.
/// - Removing an entity drops its queued translations.
/// - No translation is queued behind a removal of the same entity.
#[derive(Debug, Default)]
pub struct UnitOfWork {
    changes: Vec<PendingChange>,
}

impl UnitOfWork {
    pub fn schedule_upsert<T: Entity>(&mut self, entity: &T) {
        let id = entity.id();
        self.drop_row_changes(T::NAME, id);
        let mut columns = Vec::with_capacity(T::FIELDS.len() + 1);
        columns.push(IDENTIFIER_COLUMN);
        columns.extend(T::FIELDS.iter().map(|field| field.name));
        let mut values = Vec::with_capacity(columns.len());
        values.push(Value::Text(id.to_string()));
        values.extend(entity.field_values());

        self.changes.push(PendingChange {
            entity: T::NAME,
            id,
            kind: ChangeKind::Upsert {
                table: T::TABLE,
                columns,
                values,
            },
        });
    }

    pub fn schedule_remove<T: Entity>(&mut self, entity: &T) {
        let id = entity.id();
        self.changes
            .retain(|change| !change.same_entity(T::NAME, id));
        self.changes.push(PendingChange {
            entity: T::NAME,
            id,
            kind: ChangeKind::Remove { table: T::TABLE },
        });
    }

    pub fn schedule_translation<T: Entity>(
        &mut self,
        entity: &T,
        field: &'static str,
        locale: &Locale,
        content: Option<String>,
    ) {
        let id = entity.id();
        self.changes.retain(|change| {
            !(change.same_entity(T::NAME, id)
                && matches!(
                    &change.kind,
                    ChangeKind::Translate { field: queued, locale: queued_locale, .. }
                        if *queued == field && queued_locale == locale
                ))
        });
        self.changes.push(PendingChange {
            entity: T::NAME,
            id,
            kind: ChangeKind::Translate {
                field,
                locale: locale.clone(),
                content,
            },
        });
    }

    pub fn has_pending_remove(&self, entity: &str, id: EntityId) -> bool {
        self.changes.iter().any(|change| {
            change.same_entity(entity, id) && matches!(change.kind, ChangeKind::Remove { .. })
        })
    }

    /// Drops queued changes for every entity, or for one entity name.
    pub fn clear(&mut self, entity: Option<&str>) -> usize {
        let before = self.changes.len();
        match entity {
            Some(name) => self.changes.retain(|change| change.entity != name),
            None => self.changes.clear(),
        }
        before - self.changes.len()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn changes(&self) -> &[PendingChange] {
        &self.changes
    }

    /// Applies every change inside `tx`; the caller commits.
    pub fn apply(&self, tx: &Transaction<'_>) -> rusqlite::Result<FlushStats> {
        let mut stats = FlushStats::default();
        for change in &self.changes {
            match &change.kind {
                ChangeKind::Upsert {
                    table,
                    columns,
                    values,
                } => {
                    tx.execute(&upsert_sql(table, columns), params_from_iter(values.iter()))?;
                    stats.upserts += 1;
                }
                ChangeKind::Remove { table } => {
                    let id = change.id.to_string();
                    tx.execute(
                        &format!("DELETE FROM \"{table}\" WHERE \"{IDENTIFIER_COLUMN}\" = ?1;"),
                        [id.as_str()],
                    )?;
                    tx.execute(
                        "DELETE FROM translations WHERE object_class = ?1 AND foreign_key = ?2;",
                        params![change.entity, id],
                    )?;
                    stats.removals += 1;
                }
                ChangeKind::Translate {
                    field,
                    locale,
                    content,
                } => {
                    tx.execute(
                        "INSERT INTO translations (locale, object_class, field, foreign_key, content)
                         VALUES (?1, ?2, ?3, ?4, ?5)
                         ON CONFLICT (locale, object_class, field, foreign_key) DO UPDATE SET
                            content = excluded.content,
                            updated_at = (strftime('%s', 'now') * 1000);",
                        params![
                            locale.as_str(),
                            change.entity,
                            field,
                            change.id.to_string(),
                            content.as_deref(),
                        ],
                    )?;
                    stats.translations += 1;
                }
            }
        }
        Ok(stats)
    }

    fn drop_row_changes(&mut self, entity: &str, id: EntityId) {
        self.changes.retain(|change| {
            !(change.same_entity(entity, id)
                && !matches!(change.kind, ChangeKind::Translate { .. }))
        });
    }
}

fn upsert_sql(table: &str, columns: &[&'static str]) -> String {
    let column_list = columns
        .iter()
        .map(|column| format!("\"{column}\""))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=columns.len())
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ");
    let updates = columns
        .iter()
        .filter(|column| **column != IDENTIFIER_COLUMN)
        .map(|column| format!("\"{column}\" = excluded.\"{column}\""))
        .collect::<Vec<_>>();

    if updates.is_empty() {
        format!(
            "INSERT INTO \"{table}\" ({column_list}) VALUES ({placeholders}) \
             ON CONFLICT (\"{IDENTIFIER_COLUMN}\") DO NOTHING;"
        )
    } else {
        format!(
            "INSERT INTO \"{table}\" ({column_list}) VALUES ({placeholders}) \
             ON CONFLICT (\"{IDENTIFIER_COLUMN}\") DO UPDATE SET {};",
            updates.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::upsert_sql;

    #[test]
    fn upsert_updates_every_non_identifier_column() {
        let sql = upsert_sql("articles", &["id", "slug", "title"]);
        assert_eq!(
            sql,
            "INSERT INTO \"articles\" (\"id\", \"slug\", \"title\") VALUES (?1, ?2, ?3) \
             ON CONFLICT (\"id\") DO UPDATE SET \"slug\" = excluded.\"slug\", \"title\" = excluded.\"title\";"
        );
    }

    #[test]
    fn identifier_only_upsert_does_nothing_on_conflict() {
        let sql = upsert_sql("tags", &["id"]);
        assert!(sql.ends_with("ON CONFLICT (\"id\") DO NOTHING;"));
    }
}
