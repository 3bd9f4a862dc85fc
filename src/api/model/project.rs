use juniper::graphql_object;

use crate::{
    api::{Context, err::{ApiResult, invalid_input}, Id},
    model::{Client, Key, NewProject, Project, ProjectPatch},
    prelude::*,
};


/// A project done for a client.
#[graphql_object(Context = Context)]
impl Project {
    fn id(&self) -> Id {
        Id::new(self.key)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    /// One of "Not Started", "In Progress" or "Completed".
    fn status(&self) -> &str {
        self.status.as_str()
    }

    /// The ID of the client this project belongs to. The client does not
    /// necessarily exist.
    fn client_id(&self) -> Id {
        Id::new(self.client)
    }

    /// The client this project belongs to, or `null` if that client does not
    /// exist (anymore).
    async fn client(&self, context: &Context) -> ApiResult<Option<Client>> {
        Client::load_by_key(self.client, context).await
    }
}

impl Project {
    pub(crate) async fn load_all(context: &Context) -> ApiResult<Vec<Self>> {
        Ok(context.store.load_projects().await?)
    }

    pub(crate) async fn load_by_id(id: Id, context: &Context) -> ApiResult<Option<Self>> {
        match id.key() {
            Some(key) => Ok(context.store.load_project(key).await?),
            None => Ok(None),
        }
    }

    pub(crate) async fn add(new: NewProject, context: &Context) -> ApiResult<Self> {
        let project = context.store.insert_project(new).await?;
        info!(project = %project.key, client = %project.client, "Added project");
        Ok(project)
    }

    pub(crate) async fn update(
        id: Id,
        patch: ProjectPatch,
        context: &Context,
    ) -> ApiResult<Option<Self>> {
        let Some(key) = id.key() else {
            return Ok(None);
        };

        let project = context.store.update_project(key, patch).await?;
        match &project {
            Some(_) => debug!(project = %key, "Updated project"),
            None => debug!(project = %key, "Project to update does not exist"),
        }
        Ok(project)
    }

    pub(crate) async fn delete(id: Id, context: &Context) -> ApiResult<Option<Self>> {
        let Some(key) = id.key() else {
            return Ok(None);
        };

        let project = context.store.delete_project(key).await?;
        match &project {
            Some(_) => info!(project = %key, "Deleted project"),
            None => debug!(project = %key, "Project to delete does not exist"),
        }
        Ok(project)
    }
}

/// Converts the `clientId` argument of a mutation to a key. The client does
/// not have to exist, but the ID has to be well-formed as otherwise there is
/// nothing we could store.
pub(crate) fn client_key(client_id: Id) -> ApiResult<Key> {
    client_id.key()
        .ok_or_else(|| invalid_input!("`clientId` is not a valid client ID: {}", client_id))
}
