//! Items that define the domain data model.
//!
//! These are the records as they are stored, independent of where they are
//! stored (database or in-memory store) and of how they are exposed via the
//! API. The GraphQL bindings for these types live in `api::model`.

mod client;
mod key;
mod project;

pub(crate) use self::{
    client::{Client, NewClient, ClientPatch},
    key::Key,
    project::{Project, NewProject, ProjectPatch, ProjectStatus},
};
