//! Locale-aware repository.
//!
//! # Responsibility
//! - Decorate queries with the translation walker hint and a locale right
//!   before execution, in every result shape.
//! - Keep a repository-level locale used when a call passes none.
//!
//! # Invariants
//! - Decoration happens per call on the produced `Query`; the builder is never
//!   mutated, so one builder can run under several locales.
//! - Locale precedence: explicit argument, then `set_locale`, then the
//!   provider's own active/default locale.

use crate::error::StoreResult;
use crate::locale::Locale;
use crate::model::criteria::{Criteria, OrderSpec, SortDirection};
use crate::model::entity::{Entity, EntityId};
use crate::model::record::Record;
use crate::query::builder::QueryBuilder;
use crate::query::executable::{HydrationMode, Query, QueryOutput};
use crate::repo::entity_repo::{
    criteria_query_builder, identity_query_builder, EntityRepository, ObjectRepository,
};
use crate::session::{FieldTranslations, Session};
use crate::translation::{HINT_OUTPUT_WALKER, HINT_TRANSLATABLE_LOCALE, TRANSLATION_WALKER};
use rusqlite::types::Value;
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

/// Listing options accepted by the `alter_query_by_*` helpers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Applied only when `> 0`.
    pub limit: Option<i64>,
    /// Applied only when `> 0`.
    pub skip: Option<i64>,
    /// Sort field to direction, in precedence order.
    pub sorts: Vec<(String, SortDirection)>,
}

/// Attaches the translation walker hint and, when given, the locale hint.
///
/// With `locale = None` any previous locale hint is removed so the provider's
/// own locale applies. Applying this twice yields the same hints.
pub fn translate_query<'s, T: Entity>(mut query: Query<'s, T>, locale: Option<&Locale>) -> Query<'s, T> {
    query.set_hint(HINT_OUTPUT_WALKER, TRANSLATION_WALKER);
    match locale {
        Some(locale) => query.set_hint(HINT_TRANSLATABLE_LOCALE, locale.as_str()),
        None => query.remove_hint(HINT_TRANSLATABLE_LOCALE),
    };
    query
}

pub struct TranslatableRepository<'s, T: Entity> {
    inner: EntityRepository<'s, T>,
    locale: Option<Locale>,
}

impl<'s, T: Entity> TranslatableRepository<'s, T> {
    pub fn new(session: &'s Session) -> Self {
        Self {
            inner: EntityRepository::new(session),
            locale: None,
        }
    }

    pub fn set_locale(&mut self, locale: Option<Locale>) {
        self.locale = locale;
    }

    pub fn locale(&self) -> Option<&Locale> {
        self.locale.as_ref()
    }

    pub fn create_query_builder(&self, alias: &str) -> QueryBuilder<'s, T> {
        self.inner.create_query_builder(alias)
    }

    /// Builds the decorated query `qb` would execute under `locale`.
    pub fn get_translate_query(
        &self,
        qb: &QueryBuilder<'s, T>,
        locale: Option<&Locale>,
    ) -> StoreResult<Query<'s, T>> {
        let locale = locale.or(self.locale.as_ref());
        Ok(translate_query(qb.get_query()?, locale))
    }

    pub fn get_one_or_null_result(
        &self,
        qb: &QueryBuilder<'s, T>,
        locale: Option<&Locale>,
    ) -> StoreResult<Option<T>> {
        self.get_translate_query(qb, locale)?
            .get_one_or_null_result()
    }

    /// Errors with `NoResult` or `NonUniqueResult` unless exactly one row matches.
    pub fn get_single_result(
        &self,
        qb: &QueryBuilder<'s, T>,
        locale: Option<&Locale>,
    ) -> StoreResult<T> {
        self.get_translate_query(qb, locale)?.get_single_result()
    }

    pub fn get_result(&self, qb: &QueryBuilder<'s, T>, locale: Option<&Locale>) -> StoreResult<Vec<T>> {
        self.get_translate_query(qb, locale)?.get_result()
    }

    /// Executes in a caller-chosen hydration mode.
    pub fn get_result_with(
        &self,
        qb: &QueryBuilder<'s, T>,
        locale: Option<&Locale>,
        mode: HydrationMode,
    ) -> StoreResult<QueryOutput<T>> {
        self.get_translate_query(qb, locale)?.execute(mode)
    }

    /// `get_one_or_null_result` in a caller-chosen hydration mode.
    pub fn get_one_or_null_result_with(
        &self,
        qb: &QueryBuilder<'s, T>,
        locale: Option<&Locale>,
        mode: HydrationMode,
    ) -> StoreResult<Option<QueryOutput<T>>> {
        self.get_translate_query(qb, locale)?
            .get_one_or_null_output(mode)
    }

    pub fn get_single_result_with(
        &self,
        qb: &QueryBuilder<'s, T>,
        locale: Option<&Locale>,
        mode: HydrationMode,
    ) -> StoreResult<QueryOutput<T>> {
        self.get_translate_query(qb, locale)?.get_single_output(mode)
    }

    pub fn get_scalar_result(
        &self,
        qb: &QueryBuilder<'s, T>,
        locale: Option<&Locale>,
    ) -> StoreResult<Vec<Record>> {
        self.get_translate_query(qb, locale)?.get_scalar_result()
    }

    pub fn get_single_scalar_result(
        &self,
        qb: &QueryBuilder<'s, T>,
        locale: Option<&Locale>,
    ) -> StoreResult<Value> {
        self.get_translate_query(qb, locale)?
            .get_single_scalar_result()
    }

    pub fn get_array_result(
        &self,
        qb: &QueryBuilder<'s, T>,
        locale: Option<&Locale>,
    ) -> StoreResult<Vec<Map<String, JsonValue>>> {
        self.get_translate_query(qb, locale)?.get_array_result()
    }

    /// Applies `limit`/`skip` when positive; other builder state is kept.
    pub fn alter_query_by_limit_and_skip(&self, qb: &mut QueryBuilder<'s, T>, options: &QueryOptions) {
        if let Some(limit) = positive(options.limit) {
            qb.set_max_results(Some(limit));
        }
        if let Some(skip) = positive(options.skip) {
            qb.set_first_result(Some(skip));
        }
    }

    /// Appends one `alias.field` order clause per sort, in sequence.
    pub fn alter_query_by_order_by(&self, qb: &mut QueryBuilder<'s, T>, options: &QueryOptions, alias: &str) {
        for (field, direction) in &options.sorts {
            qb.add_order_by(format!("{alias}.{field}"), *direction);
        }
    }

    /// Every stored translation of `entity`, keyed by locale then field.
    pub fn find_translations(&self, entity: &T) -> StoreResult<BTreeMap<String, FieldTranslations>> {
        self.inner.session().load_translations(T::NAME, entity.id())
    }
}

fn positive(value: Option<i64>) -> Option<u32> {
    value
        .filter(|value| *value > 0)
        .map(|value| u32::try_from(value).unwrap_or(u32::MAX))
}

impl<T: Entity> ObjectRepository<T> for TranslatableRepository<'_, T> {
    fn find(&self, id: EntityId) -> StoreResult<Option<T>> {
        let qb = identity_query_builder(self.inner.session(), id);
        self.get_one_or_null_result(&qb, None)
    }

    fn find_by(
        &self,
        criteria: &Criteria,
        order: Option<&OrderSpec>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> StoreResult<Vec<T>> {
        let qb = criteria_query_builder(self.inner.session(), criteria, order, limit, offset);
        self.get_result(&qb, None)
    }

    fn find_one_by(&self, criteria: &Criteria) -> StoreResult<Option<T>> {
        let qb = criteria_query_builder(self.inner.session(), criteria, None, Some(1), None);
        self.get_one_or_null_result(&qb, None)
    }

    fn find_all(&self) -> StoreResult<Vec<T>> {
        let qb = criteria_query_builder(self.inner.session(), &Criteria::new(), None, None, None);
        self.get_result(&qb, None)
    }
}

#[cfg(test)]
mod tests {
    use super::positive;

    #[test]
    fn positive_ignores_zero_and_negative_values() {
        assert_eq!(positive(None), None);
        assert_eq!(positive(Some(0)), None);
        assert_eq!(positive(Some(-3)), None);
        assert_eq!(positive(Some(5)), Some(5));
        assert_eq!(positive(Some(i64::MAX)), Some(u32::MAX));
    }
}
