//! The queries for the PostgreSQL backed store.

use tokio_postgres::Row;

use crate::{
    db::{Connection, util::dbargs},
    model::{Client, ClientPatch, Key, NewClient, NewProject, Project, ProjectPatch},
    prelude::*,
};
use super::StoreResult;


const CLIENT_COLS: &str = "id, name, email, phone";

fn client_from_row(row: Row) -> Client {
    Client {
        key: row.get(0),
        name: row.get(1),
        email: row.get(2),
        phone: row.get(3),
    }
}

pub(super) async fn load_clients(db: &Connection) -> StoreResult<Vec<Client>> {
    db.query_raw(&format!("select {CLIENT_COLS} from clients order by id"), dbargs![])
        .await?
        .map_ok(client_from_row)
        .try_collect()
        .await
}

pub(super) async fn load_client(db: &Connection, key: Key) -> StoreResult<Option<Client>> {
    db.query_opt(&format!("select {CLIENT_COLS} from clients where id = $1"), &[&key])
        .await?
        .map(client_from_row)
        .pipe(Ok)
}

pub(super) async fn insert_client(db: &Connection, new: &NewClient) -> StoreResult<Client> {
    let query = format!(
        "insert into clients (name, email, phone) \
            values ($1, $2, $3) \
            returning {CLIENT_COLS}",
    );
    db.query_one(&query, &[&new.name, &new.email, &new.phone])
        .await?
        .pipe(client_from_row)
        .pipe(Ok)
}

/// `patch` must not be empty.
pub(super) async fn update_client(
    db: &Connection,
    key: Key,
    patch: &ClientPatch,
) -> StoreResult<Option<Client>> {
    // A `null` parameter keeps the current value.
    let query = format!(
        "update clients set \
            name = coalesce($2, name), \
            email = coalesce($3, email), \
            phone = coalesce($4, phone) \
            where id = $1 \
            returning {CLIENT_COLS}",
    );
    db.query_opt(&query, &[&key, &patch.name, &patch.email, &patch.phone])
        .await?
        .map(client_from_row)
        .pipe(Ok)
}

pub(super) async fn delete_client(db: &Connection, key: Key) -> StoreResult<Option<Client>> {
    db.query_opt(&format!("delete from clients where id = $1 returning {CLIENT_COLS}"), &[&key])
        .await?
        .map(client_from_row)
        .pipe(Ok)
}


const PROJECT_COLS: &str = "id, name, description, status, client";

fn project_from_row(row: Row) -> Project {
    Project {
        key: row.get(0),
        name: row.get(1),
        description: row.get(2),
        status: row.get(3),
        client: row.get(4),
    }
}

pub(super) async fn load_projects(db: &Connection) -> StoreResult<Vec<Project>> {
    db.query_raw(&format!("select {PROJECT_COLS} from projects order by id"), dbargs![])
        .await?
        .map_ok(project_from_row)
        .try_collect()
        .await
}

pub(super) async fn load_project(db: &Connection, key: Key) -> StoreResult<Option<Project>> {
    db.query_opt(&format!("select {PROJECT_COLS} from projects where id = $1"), &[&key])
        .await?
        .map(project_from_row)
        .pipe(Ok)
}

pub(super) async fn insert_project(db: &Connection, new: &NewProject) -> StoreResult<Project> {
    let query = format!(
        "insert into projects (name, description, status, client) \
            values ($1, $2, $3, $4) \
            returning {PROJECT_COLS}",
    );
    db.query_one(&query, &[&new.name, &new.description, &new.status, &new.client])
        .await?
        .pipe(project_from_row)
        .pipe(Ok)
}

/// `patch` must not be empty.
pub(super) async fn update_project(
    db: &Connection,
    key: Key,
    patch: &ProjectPatch,
) -> StoreResult<Option<Project>> {
    let query = format!(
        "update projects set \
            name = coalesce($2, name), \
            description = coalesce($3, description), \
            status = coalesce($4, status), \
            client = coalesce($5, client) \
            where id = $1 \
            returning {PROJECT_COLS}",
    );
    let params = dbargs![&key, &patch.name, &patch.description, &patch.status, &patch.client];
    db.query_opt(&query, &params)
        .await?
        .map(project_from_row)
        .pipe(Ok)
}

pub(super) async fn delete_project(db: &Connection, key: Key) -> StoreResult<Option<Project>> {
    db.query_opt(&format!("delete from projects where id = $1 returning {PROJECT_COLS}"), &[&key])
        .await?
        .map(project_from_row)
        .pipe(Ok)
}
