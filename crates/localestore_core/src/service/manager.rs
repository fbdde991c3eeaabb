//! Generic entity manager.
//!
//! # Responsibility
//! - Provide create/save/delete/flush/clear/find entry points bound to one
//!   entity type and one session.
//! - Delegate lookups to the bound repository.
//!
//! # Invariants
//! - `save`/`delete` only queue changes unless `sync` is requested.
//! - A rejected `*_any` call leaves the unit of work unchanged.
//! - `flush` is session-wide, not scoped to this manager's type.

use crate::error::StoreError;
use crate::listener::locale_listener::resolve_locale;
use crate::listener::request::Request;
use crate::locale::Locale;
use crate::model::criteria::{Criteria, OrderSpec};
use crate::model::entity::{AnyEntity, Entity, EntityId};
use crate::repo::entity_repo::{EntityRepository, ObjectRepository};
use crate::repo::translatable_repo::TranslatableRepository;
use crate::session::Session;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;

pub type ManagerResult<T> = Result<T, ManagerError>;

#[derive(Debug)]
pub enum ManagerError {
    /// The value handed to a dynamic entry point is not the bound type.
    TypeMismatch {
        manager: &'static str,
        given: &'static str,
    },
    InvalidConfiguration(String),
    Store(StoreError),
}

impl Display for ManagerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TypeMismatch { manager, given } => {
                write!(f, "manager for `{manager}` is unable to handle entity `{given}`")
            }
            Self::InvalidConfiguration(message) => write!(f, "invalid configuration: {message}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ManagerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::TypeMismatch { .. } | Self::InvalidConfiguration(_) => None,
        }
    }
}

impl From<StoreError> for ManagerError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

pub struct Manager<'s, T: Entity, R: ObjectRepository<T> = EntityRepository<'s, T>> {
    session: &'s Session,
    repository: R,
    _entity: PhantomData<T>,
}

impl<'s, T: Entity> Manager<'s, T> {
    /// Manager backed by the plain repository.
    pub fn new(session: &'s Session) -> Self {
        Self::with_repository(session, session.repository())
    }
}

impl<'s, T: Entity> Manager<'s, T, TranslatableRepository<'s, T>> {
    /// Manager backed by the locale-aware repository.
    pub fn translatable(session: &'s Session) -> Self {
        Self::with_repository(session, session.translatable_repository())
    }

    /// Resolves the request locale (session `_locale`, else request locale)
    /// and stores it on the bound repository.
    ///
    /// # Errors
    /// - `InvalidConfiguration` when the session override is not a valid tag.
    pub fn set_repository_locale(&mut self, request: &Request) -> ManagerResult<Locale> {
        let locale = resolve_locale(request)
            .map_err(|err| ManagerError::InvalidConfiguration(format!("session locale: {err}")))?;
        self.repository.set_locale(Some(locale.clone()));
        Ok(locale)
    }
}

impl<'s, T: Entity, R: ObjectRepository<T>> Manager<'s, T, R> {
    pub fn with_repository(session: &'s Session, repository: R) -> Self {
        Self {
            session,
            repository,
            _entity: PhantomData,
        }
    }

    pub fn entity_name(&self) -> &'static str {
        T::NAME
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn repository_mut(&mut self) -> &mut R {
        &mut self.repository
    }

    /// Returns a new, non-persisted instance.
    pub fn create(&self) -> T {
        T::default()
    }

    /// Queues `entity` for insert/update; flushes immediately when `sync`.
    pub fn save(&self, entity: &T, sync: bool) -> ManagerResult<()> {
        self.session.persist(entity);
        self.sync_if(sync)
    }

    /// Dynamic-boundary variant of [`Manager::save`].
    pub fn save_any(&self, entity: &dyn AnyEntity, sync: bool) -> ManagerResult<()> {
        let entity = self.downcast(entity, "save")?;
        self.save(entity, sync)
    }

    /// Queues removal of `entity`; flushes immediately when `sync`.
    pub fn delete(&self, entity: &T, sync: bool) -> ManagerResult<()> {
        self.session.remove(entity);
        self.sync_if(sync)
    }

    /// Dynamic-boundary variant of [`Manager::delete`].
    pub fn delete_any(&self, entity: &dyn AnyEntity, sync: bool) -> ManagerResult<()> {
        let entity = self.downcast(entity, "delete")?;
        self.delete(entity, sync)
    }

    /// Commits every queued change in the shared session.
    pub fn flush(&self) -> ManagerResult<()> {
        self.session.flush()?;
        Ok(())
    }

    /// Detaches queued changes: all of them, or one entity name's.
    pub fn clear(&self, entity_name: Option<&str>) {
        self.session.clear(entity_name);
    }

    pub fn find(&self, id: EntityId) -> ManagerResult<Option<T>> {
        Ok(self.repository.find(id)?)
    }

    pub fn find_by(
        &self,
        criteria: &Criteria,
        order: Option<&OrderSpec>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> ManagerResult<Vec<T>> {
        Ok(self.repository.find_by(criteria, order, limit, offset)?)
    }

    pub fn find_one_by(&self, criteria: &Criteria) -> ManagerResult<Option<T>> {
        Ok(self.repository.find_one_by(criteria)?)
    }

    pub fn find_all(&self) -> ManagerResult<Vec<T>> {
        Ok(self.repository.find_all()?)
    }

    fn sync_if(&self, sync: bool) -> ManagerResult<()> {
        if sync {
            self.flush()?;
        }
        Ok(())
    }

    fn downcast<'e>(&self, entity: &'e dyn AnyEntity, operation: &str) -> ManagerResult<&'e T> {
        entity.as_any().downcast_ref::<T>().ok_or_else(|| {
            warn!(
                "event=manager_type_mismatch module=service status=error operation={} manager={} given={}",
                operation,
                T::NAME,
                entity.entity_name()
            );
            ManagerError::TypeMismatch {
                manager: T::NAME,
                given: entity.entity_name(),
            }
        })
    }
}
