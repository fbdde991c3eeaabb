//! Base repository contract and the plain (untranslated) implementation.
//!
//! # Invariants
//! - Single lookups return `Option`; list lookups return a possibly empty `Vec`.
//! - `find_by` applies ordering before limit/offset.

use crate::error::StoreResult;
use crate::model::criteria::{Criteria, OrderSpec};
use crate::model::entity::{Entity, EntityId, IDENTIFIER_COLUMN};
use crate::query::builder::QueryBuilder;
use crate::session::Session;
use std::marker::PhantomData;

/// Alias used by find-family queries.
pub const DEFAULT_ALIAS: &str = "e";

/// Find-family lookups shared by plain and locale-aware repositories.
pub trait ObjectRepository<T: Entity> {
    fn find(&self, id: EntityId) -> StoreResult<Option<T>>;

    fn find_by(
        &self,
        criteria: &Criteria,
        order: Option<&OrderSpec>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> StoreResult<Vec<T>>;

    /// First match under the repository's natural order, or `None`.
    fn find_one_by(&self, criteria: &Criteria) -> StoreResult<Option<T>>;

    fn find_all(&self) -> StoreResult<Vec<T>>;
}

/// Repository returning base-language values; no translation hint is attached.
pub struct EntityRepository<'s, T: Entity> {
    session: &'s Session,
    _entity: PhantomData<T>,
}

impl<'s, T: Entity> EntityRepository<'s, T> {
    pub fn new(session: &'s Session) -> Self {
        Self {
            session,
            _entity: PhantomData,
        }
    }

    pub fn session(&self) -> &'s Session {
        self.session
    }

    pub fn create_query_builder(&self, alias: &str) -> QueryBuilder<'s, T> {
        QueryBuilder::new(self.session, alias)
    }
}

impl<T: Entity> ObjectRepository<T> for EntityRepository<'_, T> {
    fn find(&self, id: EntityId) -> StoreResult<Option<T>> {
        identity_query_builder(self.session, id)
            .get_query()?
            .get_one_or_null_result()
    }

    fn find_by(
        &self,
        criteria: &Criteria,
        order: Option<&OrderSpec>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> StoreResult<Vec<T>> {
        criteria_query_builder(self.session, criteria, order, limit, offset)
            .get_query()?
            .get_result()
    }

    fn find_one_by(&self, criteria: &Criteria) -> StoreResult<Option<T>> {
        criteria_query_builder(self.session, criteria, None, Some(1), None)
            .get_query()?
            .get_one_or_null_result()
    }

    fn find_all(&self) -> StoreResult<Vec<T>> {
        criteria_query_builder(self.session, &Criteria::new(), None, None, None)
            .get_query()?
            .get_result()
    }
}

pub(crate) fn identity_query_builder<T: Entity>(session: &Session, id: EntityId) -> QueryBuilder<'_, T> {
    let mut qb = QueryBuilder::new(session, DEFAULT_ALIAS);
    qb.where_eq(IDENTIFIER_COLUMN, id);
    qb
}

pub(crate) fn criteria_query_builder<'s, T: Entity>(
    session: &'s Session,
    criteria: &Criteria,
    order: Option<&OrderSpec>,
    limit: Option<u32>,
    offset: Option<u32>,
) -> QueryBuilder<'s, T> {
    let mut qb = QueryBuilder::new(session, DEFAULT_ALIAS);
    for (field, value) in criteria.iter() {
        qb.where_eq(field, value.clone());
    }
    for (field, direction) in order.into_iter().flatten() {
        qb.add_order_by(field.as_str(), *direction);
    }
    qb.set_max_results(limit).set_first_result(offset);
    qb
}
