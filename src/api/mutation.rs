use juniper::graphql_object;

use crate::model::{
    Client,
    ClientPatch,
    NewClient,
    NewProject,
    Project,
    ProjectPatch,
    ProjectStatus,
};
use super::{
    Context,
    Id,
    err::ApiResult,
    model::project::client_key,
};


/// The root mutation object.
///
/// All `update*` mutations only change the fields for which a non-null value
/// is passed. All `update*` and `delete*` mutations return `null` if there is
/// no record with the given ID.
pub(crate) struct Mutation;

#[graphql_object(Context = Context)]
impl Mutation {
    /// Adds a new client.
    async fn add_client(
        name: String,
        email: String,
        phone: String,
        context: &Context,
    ) -> ApiResult<Client> {
        Client::add(NewClient { name, email, phone }, context).await
    }

    /// Updates a client's data.
    async fn update_client(
        id: Id,
        name: Option<String>,
        email: Option<String>,
        phone: Option<String>,
        context: &Context,
    ) -> ApiResult<Option<Client>> {
        Client::update(id, ClientPatch { name, email, phone }, context).await
    }

    /// Removes a client. Projects of this client are not removed: their
    /// `client` will be `null` afterwards.
    async fn delete_client(id: Id, context: &Context) -> ApiResult<Option<Client>> {
        Client::delete(id, context).await
    }

    /// Adds a new project. The client is not required to exist.
    async fn add_project(
        client_id: Id,
        name: String,
        description: String,
        #[graphql(default = ProjectStatus::NotStarted)]
        status: ProjectStatus,
        context: &Context,
    ) -> ApiResult<Project> {
        let new = NewProject {
            name,
            description,
            status,
            client: client_key(client_id)?,
        };
        Project::add(new, context).await
    }

    /// Updates a project's data, potentially moving it to another client.
    async fn update_project(
        id: Id,
        client_id: Option<Id>,
        name: Option<String>,
        description: Option<String>,
        status: Option<ProjectStatus>,
        context: &Context,
    ) -> ApiResult<Option<Project>> {
        let patch = ProjectPatch {
            name,
            description,
            status,
            client: client_id.map(client_key).transpose()?,
        };
        Project::update(id, patch, context).await
    }

    /// Removes a project.
    async fn delete_project(id: Id, context: &Context) -> ApiResult<Option<Project>> {
        Project::delete(id, context).await
    }
}
