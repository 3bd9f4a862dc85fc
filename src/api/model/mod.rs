//! The GraphQL bindings of our domain types and the logic of the resolvers
//! operating on them.

pub(crate) mod client;
pub(crate) mod project;
