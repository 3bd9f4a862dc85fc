//! Definition of the GraphQL API.

use juniper::{
    EmptyMutation,
    EmptySubscription,
    http::{GraphQLBatchRequest, GraphQLBatchResponse},
};

use self::{
    mutation::Mutation,
    query::Query,
};

pub(crate) mod err;
pub(crate) mod model;

mod context;
mod id;
mod mutation;
mod query;

#[cfg(test)]
mod tests;

pub(crate) use self::{
    id::Id,
    context::Context,
};


/// Creates and returns the API root node.
pub(crate) fn root_node() -> RootNode {
    RootNode::new(Query, Mutation, EmptySubscription::new())
}

/// Creates the root node of the read-only API: the same queries, but no
/// mutations at all.
pub(crate) fn read_only_root_node() -> ReadOnlyRootNode {
    ReadOnlyRootNode::new(Query, EmptyMutation::new(), EmptySubscription::new())
}

/// Type of our API root node.
pub(crate) type RootNode = juniper::RootNode<'static, Query, Mutation, EmptySubscription<Context>>;

/// Type of the read-only API root node.
pub(crate) type ReadOnlyRootNode
    = juniper::RootNode<'static, Query, EmptyMutation<Context>, EmptySubscription<Context>>;


/// The schema that is served, either with or without mutations.
pub(crate) enum Schema {
    Full(RootNode),
    ReadOnly(ReadOnlyRootNode),
}

impl Schema {
    /// Executes a (possibly batched) request against this schema.
    pub(crate) async fn execute(
        &self,
        request: &GraphQLBatchRequest,
        context: &Context,
    ) -> GraphQLBatchResponse {
        match self {
            Self::Full(root) => request.execute(root, context).await,
            Self::ReadOnly(root) => request.execute(root, context).await,
        }
    }
}
