//! Access to the stored clients and projects.
//!
//! All resolvers go through [`Store`], which is handed to them via the API
//! context. It is either a database connection or a shared in-memory store
//! (used for the sample data and in tests). Each method performs at most one
//! operation on the underlying storage.

use std::sync::Arc;

use crate::{
    db,
    model::{Client, ClientPatch, Key, NewClient, NewProject, Project, ProjectPatch},
};

mod memory;
mod pg;
mod sample;

pub(crate) use self::memory::MemoryStore;


/// Errors can only originate from the database. The in-memory store never
/// fails.
pub(crate) type StoreResult<T> = Result<T, tokio_postgres::Error>;

pub(crate) enum Store {
    Db(db::Connection),
    Memory(Arc<MemoryStore>),
}

impl Store {
    /// Number of SQL queries executed so far. Always 0 for the in-memory store.
    pub(crate) fn num_queries(&self) -> u32 {
        match self {
            Self::Db(db) => db.num_queries(),
            Self::Memory(_) => 0,
        }
    }

    // ----- Clients ------------------------------------------------------------

    pub(crate) async fn load_clients(&self) -> StoreResult<Vec<Client>> {
        match self {
            Self::Db(db) => pg::load_clients(db).await,
            Self::Memory(mem) => Ok(mem.clients(|c| c.all())),
        }
    }

    pub(crate) async fn load_client(&self, key: Key) -> StoreResult<Option<Client>> {
        match self {
            Self::Db(db) => pg::load_client(db, key).await,
            Self::Memory(mem) => Ok(mem.clients(|c| c.get(key))),
        }
    }

    pub(crate) async fn insert_client(&self, new: NewClient) -> StoreResult<Client> {
        match self {
            Self::Db(db) => pg::insert_client(db, &new).await,
            Self::Memory(mem) => Ok(mem.clients(|c| c.insert(|key| Client::create(key, new)))),
        }
    }

    /// Returns `None` if there is no client with the given key.
    pub(crate) async fn update_client(
        &self,
        key: Key,
        patch: ClientPatch,
    ) -> StoreResult<Option<Client>> {
        match self {
            Self::Db(db) if patch.is_empty() => pg::load_client(db, key).await,
            Self::Db(db) => pg::update_client(db, key, &patch).await,
            Self::Memory(mem) => Ok(mem.clients(|c| c.update(key, |client| client.apply(patch)))),
        }
    }

    /// Returns the removed client or `None` if there was no client with the
    /// given key. Projects of that client are not touched.
    pub(crate) async fn delete_client(&self, key: Key) -> StoreResult<Option<Client>> {
        match self {
            Self::Db(db) => pg::delete_client(db, key).await,
            Self::Memory(mem) => Ok(mem.clients(|c| c.remove(key))),
        }
    }

    // ----- Projects -----------------------------------------------------------

    pub(crate) async fn load_projects(&self) -> StoreResult<Vec<Project>> {
        match self {
            Self::Db(db) => pg::load_projects(db).await,
            Self::Memory(mem) => Ok(mem.projects(|p| p.all())),
        }
    }

    pub(crate) async fn load_project(&self, key: Key) -> StoreResult<Option<Project>> {
        match self {
            Self::Db(db) => pg::load_project(db, key).await,
            Self::Memory(mem) => Ok(mem.projects(|p| p.get(key))),
        }
    }

    pub(crate) async fn insert_project(&self, new: NewProject) -> StoreResult<Project> {
        match self {
            Self::Db(db) => pg::insert_project(db, &new).await,
            Self::Memory(mem) => Ok(mem.projects(|p| p.insert(|key| Project::create(key, new)))),
        }
    }

    /// Returns `None` if there is no project with the given key.
    pub(crate) async fn update_project(
        &self,
        key: Key,
        patch: ProjectPatch,
    ) -> StoreResult<Option<Project>> {
        match self {
            Self::Db(db) if patch.is_empty() => pg::load_project(db, key).await,
            Self::Db(db) => pg::update_project(db, key, &patch).await,
            Self::Memory(mem) => Ok(mem.projects(|p| p.update(key, |project| project.apply(patch)))),
        }
    }

    /// Returns the removed project or `None` if there was no project with the
    /// given key.
    pub(crate) async fn delete_project(&self, key: Key) -> StoreResult<Option<Project>> {
        match self {
            Self::Db(db) => pg::delete_project(db, key).await,
            Self::Memory(mem) => Ok(mem.projects(|p| p.remove(key))),
        }
    }
}
