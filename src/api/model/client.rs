use juniper::graphql_object;

use crate::{
    api::{Context, err::ApiResult, Id},
    model::{Client, ClientPatch, Key, NewClient},
    prelude::*,
};


/// A client for whom projects are done.
#[graphql_object(Context = Context)]
impl Client {
    fn id(&self) -> Id {
        Id::new(self.key)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn email(&self) -> &str {
        &self.email
    }

    fn phone(&self) -> &str {
        &self.phone
    }
}

impl Client {
    pub(crate) async fn load_all(context: &Context) -> ApiResult<Vec<Self>> {
        Ok(context.store.load_clients().await?)
    }

    pub(crate) async fn load_by_id(id: Id, context: &Context) -> ApiResult<Option<Self>> {
        match id.key() {
            Some(key) => Self::load_by_key(key, context).await,
            None => Ok(None),
        }
    }

    pub(crate) async fn load_by_key(key: Key, context: &Context) -> ApiResult<Option<Self>> {
        Ok(context.store.load_client(key).await?)
    }

    pub(crate) async fn add(new: NewClient, context: &Context) -> ApiResult<Self> {
        let client = context.store.insert_client(new).await?;
        info!(client = %client.key, "Added client");
        Ok(client)
    }

    pub(crate) async fn update(
        id: Id,
        patch: ClientPatch,
        context: &Context,
    ) -> ApiResult<Option<Self>> {
        let Some(key) = id.key() else {
            return Ok(None);
        };

        let client = context.store.update_client(key, patch).await?;
        match &client {
            Some(_) => debug!(client = %key, "Updated client"),
            None => debug!(client = %key, "Client to update does not exist"),
        }
        Ok(client)
    }

    /// Removes the client. Its projects are left as they are.
    pub(crate) async fn delete(id: Id, context: &Context) -> ApiResult<Option<Self>> {
        let Some(key) = id.key() else {
            return Ok(None);
        };

        let client = context.store.delete_client(key).await?;
        match &client {
            Some(_) => info!(client = %key, "Deleted client"),
            None => debug!(client = %key, "Client to delete does not exist"),
        }
        Ok(client)
    }
}
