use std::sync::Arc;

use juniper::{DefaultScalarValue, ExecutionError, Value, Variables, graphql_value};

use crate::store::{MemoryStore, Store};
use super::{Context, read_only_root_node, root_node};


fn empty_context() -> Context {
    Context { store: Store::Memory(Arc::new(MemoryStore::new())) }
}

fn sample_context() -> Context {
    Context { store: Store::Memory(Arc::new(MemoryStore::with_sample_data())) }
}

async fn try_run(
    ctx: &Context,
    doc: &str,
) -> (Value<DefaultScalarValue>, Vec<ExecutionError<DefaultScalarValue>>) {
    let root = root_node();
    juniper::execute(doc, None, &root, &Variables::new(), ctx)
        .await
        .expect("request was rejected")
}

async fn run(ctx: &Context, doc: &str) -> Value<DefaultScalarValue> {
    let (value, errors) = try_run(ctx, doc).await;
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    value
}

async fn add_tony(ctx: &Context) {
    run(ctx, r#"mutation {
        addClient(name: "Tony Stark", email: "ironman@gmail.com", phone: "343-567-4333") { id }
    }"#).await;
}


#[tokio::test]
async fn add_client_and_project() {
    let ctx = empty_context();

    let out = run(&ctx, r#"mutation {
        addClient(name: "Tony Stark", email: "ironman@gmail.com", phone: "343-567-4333") {
            id name email phone
        }
    }"#).await;
    assert_eq!(out, graphql_value!({
        "addClient": {
            "id": "1",
            "name": "Tony Stark",
            "email": "ironman@gmail.com",
            "phone": "343-567-4333",
        },
    }));

    // The stored record is exactly what the mutation returned.
    let added = out.as_object_value()
        .and_then(|o| o.get_field_value("addClient"))
        .cloned()
        .expect("no 'addClient' field");
    let out = run(&ctx, r#"{ client(id: "1") { id name email phone } }"#).await;
    assert_eq!(out.as_object_value().and_then(|o| o.get_field_value("client")), Some(&added));

    let out = run(&ctx, r#"mutation {
        addProject(clientId: "1", name: "eCommerce Website", description: "Shop") {
            id status clientId client { name }
        }
    }"#).await;
    assert_eq!(out, graphql_value!({
        "addProject": {
            "id": "1",
            "status": "Not Started",
            "clientId": "1",
            "client": { "name": "Tony Stark" },
        },
    }));

    let out = run(&ctx, "{ clients { name } projects { name } }").await;
    assert_eq!(out, graphql_value!({
        "clients": [{ "name": "Tony Stark" }],
        "projects": [{ "name": "eCommerce Website" }],
    }));
}

#[tokio::test]
async fn status_values() {
    let ctx = empty_context();
    let out = run(&ctx, r#"mutation {
        a: addProject(clientId: "1", name: "A", description: "", status: new) { status }
        b: addProject(clientId: "1", name: "B", description: "", status: progress) { status }
        c: addProject(clientId: "1", name: "C", description: "", status: completed) { status }
    }"#).await;
    assert_eq!(out, graphql_value!({
        "a": { "status": "Not Started" },
        "b": { "status": "In Progress" },
        "c": { "status": "Completed" },
    }));
}

#[tokio::test]
async fn unknown_status_is_rejected() {
    let ctx = empty_context();
    let root = root_node();
    let res = juniper::execute(
        r#"mutation {
            addProject(clientId: "1", name: "A", description: "", status: started) { id }
        }"#,
        None,
        &root,
        &Variables::new(),
        &ctx,
    ).await;
    assert!(res.is_err());

    let out = run(&ctx, "{ projects { id } }").await;
    assert_eq!(out, graphql_value!({ "projects": [] }));
}

#[tokio::test]
async fn missing_argument_is_rejected() {
    let ctx = empty_context();
    let root = root_node();
    let res = juniper::execute(
        r#"mutation { addClient(name: "Tony Stark", email: "ironman@gmail.com") { id } }"#,
        None,
        &root,
        &Variables::new(),
        &ctx,
    ).await;
    assert!(res.is_err());

    let out = run(&ctx, "{ clients { id } }").await;
    assert_eq!(out, graphql_value!({ "clients": [] }));
}

#[tokio::test]
async fn missing_records_are_null() {
    let ctx = empty_context();
    let out = run(&ctx, r#"{
        client(id: "7") { id }
        project(id: "7") { id }
        malformed: client(id: "not-an-id") { id }
    }"#).await;
    assert_eq!(out, graphql_value!({
        "client": None,
        "project": None,
        "malformed": None,
    }));

    let out = run(&ctx, r#"mutation {
        deleteClient(id: "7") { id }
        deleteProject(id: "7") { id }
        updateClient(id: "7", name: "x") { id }
        updateProject(id: "7", name: "x") { id }
    }"#).await;
    assert_eq!(out, graphql_value!({
        "deleteClient": None,
        "deleteProject": None,
        "updateClient": None,
        "updateProject": None,
    }));
}

#[tokio::test]
async fn integer_ids_are_accepted() {
    let ctx = empty_context();
    add_tony(&ctx).await;
    let out = run(&ctx, "{ client(id: 1) { name } }").await;
    assert_eq!(out, graphql_value!({ "client": { "name": "Tony Stark" } }));
}

#[tokio::test]
async fn deleting_client_leaves_projects() {
    let ctx = empty_context();
    add_tony(&ctx).await;
    run(&ctx, r#"mutation {
        addProject(clientId: "1", name: "eCommerce Website", description: "Shop") { id }
    }"#).await;

    let out = run(&ctx, r#"mutation { deleteClient(id: "1") { name } }"#).await;
    assert_eq!(out, graphql_value!({ "deleteClient": { "name": "Tony Stark" } }));

    let out = run(&ctx, r#"{ project(id: "1") { clientId client { name } } }"#).await;
    assert_eq!(out, graphql_value!({
        "project": { "clientId": "1", "client": None },
    }));

    // Deleting again finds nothing.
    let out = run(&ctx, r#"mutation { deleteClient(id: "1") { name } }"#).await;
    assert_eq!(out, graphql_value!({ "deleteClient": None }));
}

#[tokio::test]
async fn partial_update_keeps_other_fields() {
    let ctx = empty_context();
    add_tony(&ctx).await;

    let out = run(&ctx, r#"mutation {
        updateClient(id: "1", email: "tony@stark.com", phone: null) { name email phone }
    }"#).await;
    assert_eq!(out, graphql_value!({
        "updateClient": {
            "name": "Tony Stark",
            "email": "tony@stark.com",
            "phone": "343-567-4333",
        },
    }));

    // Empty strings are values, too.
    let out = run(&ctx, r#"mutation {
        updateClient(id: "1", phone: "") { name email phone }
    }"#).await;
    assert_eq!(out, graphql_value!({
        "updateClient": {
            "name": "Tony Stark",
            "email": "tony@stark.com",
            "phone": "",
        },
    }));

    // Nothing to change: simply returns the current record.
    let out = run(&ctx, r#"mutation { updateClient(id: "1") { email } }"#).await;
    assert_eq!(out, graphql_value!({ "updateClient": { "email": "tony@stark.com" } }));
}

#[tokio::test]
async fn update_project() {
    let ctx = empty_context();
    add_tony(&ctx).await;
    run(&ctx, r#"mutation {
        addClient(name: "Bruce Banner", email: "bruce@gmail.com", phone: "321-468-8887") { id }
        addProject(clientId: "1", name: "SEO Project", description: "Ranking") { id }
    }"#).await;

    let out = run(&ctx, r#"mutation {
        updateProject(id: "1", status: completed) { name description status clientId }
    }"#).await;
    assert_eq!(out, graphql_value!({
        "updateProject": {
            "name": "SEO Project",
            "description": "Ranking",
            "status": "Completed",
            "clientId": "1",
        },
    }));

    let out = run(&ctx, r#"mutation {
        updateProject(id: "1", clientId: "2") { status client { name } }
    }"#).await;
    assert_eq!(out, graphql_value!({
        "updateProject": {
            "status": "Completed",
            "client": { "name": "Bruce Banner" },
        },
    }));
}

#[tokio::test]
async fn malformed_client_id_is_invalid_input() {
    let ctx = empty_context();
    let (out, errors) = try_run(&ctx, r#"mutation {
        addProject(clientId: "tony", name: "A", description: "") { id }
    }"#).await;

    assert_eq!(out, Value::null());
    assert_eq!(errors.len(), 1);
    assert!(errors[0].error().message().starts_with("Invalid input"));
    assert_eq!(errors[0].error().extensions(), &graphql_value!({ "kind": "INVALID_INPUT" }));

    let out = run(&ctx, "{ projects { id } }").await;
    assert_eq!(out, graphql_value!({ "projects": [] }));
}

#[tokio::test]
async fn keys_are_not_reused() {
    let ctx = empty_context();
    add_tony(&ctx).await;
    run(&ctx, r#"mutation { deleteClient(id: "1") { id } }"#).await;

    let out = run(&ctx, r#"mutation { addClient(name: "a", email: "b", phone: "c") { id } }"#)
        .await;
    assert_eq!(out, graphql_value!({ "addClient": { "id": "2" } }));
}

#[tokio::test]
async fn sample_data() {
    let ctx = sample_context();
    let root = read_only_root_node();
    let (out, errors) = juniper::execute(
        r#"{ client(id: "1") { name email } project(id: "1") { name client { name } } }"#,
        None,
        &root,
        &Variables::new(),
        &ctx,
    ).await.expect("request was rejected");

    assert!(errors.is_empty());
    assert_eq!(out, graphql_value!({
        "client": { "name": "Tony Stark", "email": "ironman@gmail.com" },
        "project": { "name": "eCommerce Website", "client": { "name": "Tony Stark" } },
    }));
}

#[test]
fn read_only_schema_has_no_mutations() {
    let sdl = read_only_root_node().as_sdl();
    assert!(sdl.contains("clients"));
    assert!(!sdl.contains("addClient"));
    assert!(!sdl.contains("deleteProject"));

    let sdl = root_node().as_sdl();
    assert!(sdl.contains("addClient"));
    assert!(sdl.contains("deleteProject"));
}
