use tokio::task::JoinHandle;
use victoria_meta::Entity;
use victoria_store::Query;

use crate::dao::Dao;
use crate::error::DaoResult;

/// Callback view of a [`Dao`].
///
/// Each call spawns the DAO's async operation on the DAO's runtime and
/// returns at once. The operation's result, success or failure, is handed
/// to `callback` when it completes. The returned [`JoinHandle`] resolves
/// after the callback has run.
#[derive(Debug)]
pub struct CallbackDao<E> {
    dao: Dao<E>,
}

impl<E> Clone for CallbackDao<E> {
    fn clone(&self) -> Self {
        Self {
            dao: self.dao.clone(),
        }
    }
}

impl<E: Entity> CallbackDao<E> {
    pub(crate) fn new(dao: Dao<E>) -> Self {
        Self { dao }
    }

    pub fn save_element<C>(&self, element: E, callback: C) -> JoinHandle<()>
    where
        C: FnOnce(DaoResult<String>) + Send + 'static,
    {
        let dao = self.dao.clone();
        self.dao
            .dispatcher()
            .spawn_with(async move { dao.save_element(&element).await }, callback)
    }

    pub fn save_element_with_ttl<C>(
        &self,
        element: E,
        ttl_seconds: u32,
        callback: C,
    ) -> JoinHandle<()>
    where
        C: FnOnce(DaoResult<String>) + Send + 'static,
    {
        let dao = self.dao.clone();
        self.dao.dispatcher().spawn_with(
            async move { dao.save_element_with_ttl(&element, ttl_seconds).await },
            callback,
        )
    }

    pub fn get_element<C>(&self, id: impl Into<String>, callback: C) -> JoinHandle<()>
    where
        C: FnOnce(DaoResult<Option<E>>) + Send + 'static,
    {
        let dao = self.dao.clone();
        let id = id.into();
        self.dao
            .dispatcher()
            .spawn_with(async move { dao.get_element(&id).await }, callback)
    }

    pub fn get_element_by_query<C>(&self, query: Query, callback: C) -> JoinHandle<()>
    where
        C: FnOnce(DaoResult<Option<E>>) + Send + 'static,
    {
        let dao = self.dao.clone();
        self.dao
            .dispatcher()
            .spawn_with(async move { dao.get_element_by_query(&query).await }, callback)
    }

    pub fn get_elements<C>(&self, query: Query, callback: C) -> JoinHandle<()>
    where
        C: FnOnce(DaoResult<Vec<E>>) + Send + 'static,
    {
        let dao = self.dao.clone();
        self.dao
            .dispatcher()
            .spawn_with(async move { dao.get_elements(&query).await }, callback)
    }

    pub fn get_all_elements<C>(&self, callback: C) -> JoinHandle<()>
    where
        C: FnOnce(DaoResult<Vec<E>>) + Send + 'static,
    {
        let dao = self.dao.clone();
        self.dao
            .dispatcher()
            .spawn_with(async move { dao.get_all_elements().await }, callback)
    }

    pub fn count<C>(&self, callback: C) -> JoinHandle<()>
    where
        C: FnOnce(DaoResult<usize>) + Send + 'static,
    {
        let dao = self.dao.clone();
        self.dao
            .dispatcher()
            .spawn_with(async move { dao.count().await }, callback)
    }

    pub fn remove_by_id<C>(&self, id: impl Into<String>, callback: C) -> JoinHandle<()>
    where
        C: FnOnce(DaoResult<bool>) + Send + 'static,
    {
        let dao = self.dao.clone();
        let id = id.into();
        self.dao
            .dispatcher()
            .spawn_with(async move { dao.remove_by_id(&id).await }, callback)
    }

    pub fn remove_element<C>(&self, element: E, callback: C) -> JoinHandle<()>
    where
        C: FnOnce(DaoResult<bool>) + Send + 'static,
    {
        let dao = self.dao.clone();
        self.dao
            .dispatcher()
            .spawn_with(async move { dao.remove_element(&element).await }, callback)
    }

    pub fn exists_by_id<C>(&self, id: impl Into<String>, callback: C) -> JoinHandle<()>
    where
        C: FnOnce(DaoResult<bool>) + Send + 'static,
    {
        let dao = self.dao.clone();
        let id = id.into();
        self.dao
            .dispatcher()
            .spawn_with(async move { dao.exists_by_id(&id).await }, callback)
    }

    pub fn exists_element<C>(&self, element: E, callback: C) -> JoinHandle<()>
    where
        C: FnOnce(DaoResult<bool>) + Send + 'static,
    {
        let dao = self.dao.clone();
        self.dao
            .dispatcher()
            .spawn_with(async move { dao.exists_element(&element).await }, callback)
    }
}
