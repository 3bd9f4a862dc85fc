use juniper::graphql_object;

use crate::model::{Client, Project};
use super::{Context, Id, err::ApiResult};


/// The root query object.
pub(crate) struct Query;

#[graphql_object(Context = Context)]
impl Query {
    /// Returns all clients.
    async fn clients(context: &Context) -> ApiResult<Vec<Client>> {
        Client::load_all(context).await
    }

    /// Returns the client with the given ID or `null` if there is no such
    /// client.
    async fn client(id: Id, context: &Context) -> ApiResult<Option<Client>> {
        Client::load_by_id(id, context).await
    }

    /// Returns all projects.
    async fn projects(context: &Context) -> ApiResult<Vec<Project>> {
        Project::load_all(context).await
    }

    /// Returns the project with the given ID or `null` if there is no such
    /// project.
    async fn project(id: Id, context: &Context) -> ApiResult<Option<Project>> {
        Project::load_by_id(id, context).await
    }
}
