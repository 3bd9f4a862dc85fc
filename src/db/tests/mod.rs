use crate::{
    prelude::*,
    model::{ClientPatch, Key, NewClient, NewProject, ProjectPatch, ProjectStatus},
};
use super::unapplied_migrations;
use self::util::TestDb;

mod util;


fn tony() -> NewClient {
    NewClient {
        name: "Tony Stark".into(),
        email: "ironman@gmail.com".into(),
        phone: "343-567-4333".into(),
    }
}

fn website(client: Key) -> NewProject {
    NewProject {
        name: "eCommerce Website".into(),
        description: "Online shop for armor parts".into(),
        status: ProjectStatus::default(),
        client,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn migrations_are_applied() -> Result<()> {
    let Some(db) = TestDb::with_migrations().await? else { return Ok(()) };
    assert!(db.load_clients().await?.is_empty());
    assert!(db.load_projects().await?.is_empty());

    let client = db.pool().get().await?;
    assert_eq!(unapplied_migrations(&**client).await?, 0);

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn client_insert_and_load() -> Result<()> {
    let Some(db) = TestDb::with_migrations().await? else { return Ok(()) };

    let inserted = db.insert_client(tony()).await?;
    assert_eq!(inserted.key, Key(1));
    assert_eq!(inserted.name, "Tony Stark");
    assert_eq!(inserted.email, "ironman@gmail.com");
    assert_eq!(inserted.phone, "343-567-4333");

    assert_eq!(db.load_client(inserted.key).await?, Some(inserted.clone()));
    assert_eq!(db.load_client(Key(2)).await?, None);

    let second = db.insert_client(NewClient {
        name: "Bruce Wayne".into(),
        email: "".into(),
        phone: "".into(),
    }).await?;
    assert_eq!(second.key, Key(2));
    assert_eq!(db.load_clients().await?, vec![inserted, second]);

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn client_partial_update() -> Result<()> {
    let Some(db) = TestDb::with_migrations().await? else { return Ok(()) };
    let tony = db.insert_client(tony()).await?;

    // Only `email` is set, and to the empty string, which is a value, not "unset".
    let patch = ClientPatch { email: Some("".into()), ..ClientPatch::default() };
    let updated = db.update_client(tony.key, patch).await?.expect("client missing");
    assert_eq!(updated.name, "Tony Stark");
    assert_eq!(updated.email, "");
    assert_eq!(updated.phone, "343-567-4333");
    assert_eq!(db.load_client(tony.key).await?, Some(updated.clone()));

    // An empty patch changes nothing and returns the current record.
    let unchanged = db.update_client(tony.key, ClientPatch::default()).await?;
    assert_eq!(unchanged, Some(updated));

    let patch = ClientPatch { name: Some("Iron Man".into()), ..ClientPatch::default() };
    assert_eq!(db.update_client(Key(99), patch).await?, None);

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn project_insert_and_update() -> Result<()> {
    let Some(db) = TestDb::with_migrations().await? else { return Ok(()) };
    let tony = db.insert_client(tony()).await?;

    let project = db.insert_project(website(tony.key)).await?;
    assert_eq!(project.name, "eCommerce Website");
    assert_eq!(project.description, "Online shop for armor parts");
    assert_eq!(project.status, ProjectStatus::NotStarted);
    assert_eq!(project.client, tony.key);
    assert_eq!(db.load_project(project.key).await?, Some(project.clone()));

    let patch = ProjectPatch {
        status: Some(ProjectStatus::InProgress),
        client: Some(Key(42)),
        ..ProjectPatch::default()
    };
    let updated = db.update_project(project.key, patch).await?.expect("project missing");
    assert_eq!(updated.status, ProjectStatus::InProgress);
    assert_eq!(updated.client, Key(42));
    assert_eq!(updated.name, project.name);
    assert_eq!(updated.description, project.description);
    assert_eq!(db.load_projects().await?, vec![updated]);

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_returns_removed_record() -> Result<()> {
    let Some(db) = TestDb::with_migrations().await? else { return Ok(()) };
    let tony = db.insert_client(tony()).await?;
    let project = db.insert_project(website(tony.key)).await?;

    assert_eq!(db.delete_client(tony.key).await?, Some(tony.clone()));
    assert_eq!(db.delete_client(tony.key).await?, None);
    assert_eq!(db.load_client(tony.key).await?, None);

    // Projects of a deleted client are kept.
    assert_eq!(db.load_project(project.key).await?, Some(project.clone()));

    assert_eq!(db.delete_project(project.key).await?, Some(project.clone()));
    assert_eq!(db.delete_project(project.key).await?, None);
    assert!(db.load_projects().await?.is_empty());

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn status_is_stored_as_enum_label() -> Result<()> {
    let Some(db) = TestDb::with_migrations().await? else { return Ok(()) };

    for status in [ProjectStatus::NotStarted, ProjectStatus::InProgress, ProjectStatus::Completed] {
        let project = db.insert_project(NewProject { status, ..website(Key(1)) }).await?;
        assert_eq!(project.status, status);
        assert_eq!(db.load_project(project.key).await?.map(|p| p.status), Some(status));
        assert_eq!(db.raw_status(project.key).await?, status.as_str());
    }

    Ok(())
}
