use victoria_meta::Entity;
use victoria_store::Query;

use crate::dao::Dao;
use crate::error::DaoResult;

/// Blocking view of a [`Dao`].
///
/// Each call drives the DAO's async operation to completion on the DAO's
/// runtime and returns its result. Usable from plain threads, from
/// `spawn_blocking`, and from multi-threaded runtime workers; calls made
/// inside a current-thread runtime fail with
/// [`DaoError::Runtime`](crate::DaoError::Runtime).
#[derive(Debug)]
pub struct BlockingDao<'a, E> {
    dao: &'a Dao<E>,
}

impl<'a, E: Entity> BlockingDao<'a, E> {
    pub(crate) fn new(dao: &'a Dao<E>) -> Self {
        Self { dao }
    }

    pub fn save_element(&self, element: &E) -> DaoResult<String> {
        self.dao.dispatcher().block_on(self.dao.save_element(element))
    }

    pub fn save_element_with_ttl(&self, element: &E, ttl_seconds: u32) -> DaoResult<String> {
        self.dao
            .dispatcher()
            .block_on(self.dao.save_element_with_ttl(element, ttl_seconds))
    }

    pub fn get_element(&self, id: &str) -> DaoResult<Option<E>> {
        self.dao.dispatcher().block_on(self.dao.get_element(id))
    }

    pub fn get_element_by_query(&self, query: &Query) -> DaoResult<Option<E>> {
        self.dao
            .dispatcher()
            .block_on(self.dao.get_element_by_query(query))
    }

    pub fn get_elements(&self, query: &Query) -> DaoResult<Vec<E>> {
        self.dao.dispatcher().block_on(self.dao.get_elements(query))
    }

    pub fn get_all_elements(&self) -> DaoResult<Vec<E>> {
        self.dao.dispatcher().block_on(self.dao.get_all_elements())
    }

    pub fn count(&self) -> DaoResult<usize> {
        self.dao.dispatcher().block_on(self.dao.count())
    }

    pub fn remove_by_id(&self, id: &str) -> DaoResult<bool> {
        self.dao.dispatcher().block_on(self.dao.remove_by_id(id))
    }

    pub fn remove_element(&self, element: &E) -> DaoResult<bool> {
        self.dao.dispatcher().block_on(self.dao.remove_element(element))
    }

    pub fn exists_by_id(&self, id: &str) -> DaoResult<bool> {
        self.dao.dispatcher().block_on(self.dao.exists_by_id(id))
    }

    pub fn exists_element(&self, element: &E) -> DaoResult<bool> {
        self.dao.dispatcher().block_on(self.dao.exists_element(element))
    }
}
