use juniper::GraphQLEnum;
use postgres_types::{FromSql, ToSql};

use super::Key;


/// A project as it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Project {
    pub(crate) key: Key,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) status: ProjectStatus,

    /// The client this project belongs to. This is not checked in any way,
    /// the client might not exist (anymore).
    pub(crate) client: Key,
}

/// The progress of a project.
///
/// This is the single definition used for creating and updating projects.
/// In the API, variants are named `new`, `progress` and `completed`. The
/// stored (and displayed) value is the human readable one returned by
/// [`Self::as_str`]. In the DB, this is the `project_status` enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, GraphQLEnum, ToSql, FromSql)]
#[graphql(name = "ProjectStatus")]
#[postgres(name = "project_status")]
pub(crate) enum ProjectStatus {
    /// Work on the project has not begun yet.
    #[default]
    #[graphql(name = "new")]
    #[postgres(name = "Not Started")]
    NotStarted,

    /// The project is being worked on.
    #[graphql(name = "progress")]
    #[postgres(name = "In Progress")]
    InProgress,

    /// The project is done.
    #[graphql(name = "completed")]
    #[postgres(name = "Completed")]
    Completed,
}

impl ProjectStatus {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }
}

/// Data required to create a new project. The key is assigned by the store.
#[derive(Debug, Clone)]
pub(crate) struct NewProject {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) status: ProjectStatus,
    pub(crate) client: Key,
}

/// A partial update of a project. `None` means "leave as is".
#[derive(Debug, Clone, Default)]
pub(crate) struct ProjectPatch {
    pub(crate) name: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) status: Option<ProjectStatus>,
    pub(crate) client: Option<Key>,
}

impl Project {
    pub(crate) fn create(key: Key, new: NewProject) -> Self {
        Self {
            key,
            name: new.name,
            description: new.description,
            status: new.status,
            client: new.client,
        }
    }

    /// Overwrites all fields that are set in `patch`.
    pub(crate) fn apply(&mut self, patch: ProjectPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(client) = patch.client {
            self.client = client;
        }
    }
}

impl ProjectPatch {
    pub(crate) fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.client.is_none()
    }
}
