//! Fixed sample data used by `serve --sample-data`.

use crate::model::{Client, Key, Project, ProjectStatus};
use super::MemoryStore;


impl MemoryStore {
    /// Creates a store filled with a few clients and projects.
    pub(crate) fn with_sample_data() -> Self {
        Self::with_records(sample_clients(), sample_projects())
    }
}

fn sample_clients() -> Vec<Client> {
    let client = |key, name: &str, email: &str, phone: &str| Client {
        key: Key(key),
        name: name.into(),
        email: email.into(),
        phone: phone.into(),
    };

    vec![
        client(1, "Tony Stark", "ironman@gmail.com", "343-567-4333"),
        client(2, "Natasha Romanova", "blackwidow@gmail.com", "223-567-3322"),
        client(3, "Thor Odinson", "thor@gmail.com", "324-331-4333"),
        client(4, "Steve Rogers", "steve@gmail.com", "344-562-6787"),
        client(5, "Bruce Banner", "bruce@gmail.com", "321-468-8887"),
    ]
}

fn sample_projects() -> Vec<Project> {
    let project = |key, client, name: &str, description: &str, status| Project {
        key: Key(key),
        name: name.into(),
        description: description.into(),
        status,
        client: Key(client),
    };

    vec![
        project(
            1, 1,
            "eCommerce Website",
            "An online shop with product catalog, cart and checkout.",
            ProjectStatus::InProgress,
        ),
        project(
            2, 2,
            "Dating App",
            "A mobile app that matches people based on shared interests.",
            ProjectStatus::InProgress,
        ),
        project(
            3, 3,
            "SEO Project",
            "Improve search engine ranking of the existing company website.",
            ProjectStatus::InProgress,
        ),
        project(
            4, 1,
            "Design Prototype",
            "Clickable prototype for the redesign of the customer portal.",
            ProjectStatus::Completed,
        ),
        project(
            5, 5,
            "Auction Website",
            "A platform where users can list items and bid on them.",
            ProjectStatus::NotStarted,
        ),
        project(
            6, 4,
            "Social Media Campaign",
            "Plan and run a three month campaign for the product launch.",
            ProjectStatus::Completed,
        ),
        project(
            7, 3,
            "Portfolio Website",
            "A personal site showcasing previous work and contact details.",
            ProjectStatus::InProgress,
        ),
    ]
}
