use pizza_hunt::{build_app, MemoryStore};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;

// Test client wrapper for making API calls
struct TestClient {
    client: Client,
    base_url: String,
}

impl TestClient {
    fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    async fn post(&self, path: &str, json: Value) -> reqwest::Result<reqwest::Response> {
        self.client
            .post(&format!("{}{}", self.base_url, path))
            .json(&json)
            .send()
            .await
    }

    async fn put(&self, path: &str, json: Value) -> reqwest::Result<reqwest::Response> {
        self.client
            .put(&format!("{}{}", self.base_url, path))
            .json(&json)
            .send()
            .await
    }

    async fn get(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client
            .get(&format!("{}{}", self.base_url, path))
            .send()
            .await
    }

    async fn delete(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client
            .delete(&format!("{}{}", self.base_url, path))
            .send()
            .await
    }
}

/// Serve the app over an in-memory store on an ephemeral port.
async fn spawn_app_with_store() -> (TestClient, Arc<MemoryStore>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let store = Arc::new(MemoryStore::new());
    let app = build_app(store.clone(), None);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (TestClient::new(format!("http://{}", addr)), store)
}

async fn spawn_app() -> TestClient {
    spawn_app_with_store().await.0
}

async fn create_margherita(client: &TestClient) -> Value {
    let response = client
        .post(
            "/pizzas",
            json!({
                "pizzaName": "Margherita",
                "createdBy": "Al",
                "size": "Medium",
                "toppings": ["basil"]
            }),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    response.json().await.unwrap()
}

fn id_of(value: &Value) -> String {
    value["_id"].as_str().expect("document has an _id").to_string()
}

#[tokio::test]
async fn test_create_pizza_end_to_end() {
    let client = spawn_app().await;
    let pizza = create_margherita(&client).await;

    assert!(!id_of(&pizza).is_empty());
    assert_eq!(pizza["pizzaName"], "Margherita");
    assert_eq!(pizza["size"], "Medium");
    assert_eq!(pizza["toppings"], json!(["basil"]));
    assert_eq!(pizza["comments"], json!([]));
    assert_eq!(pizza["commentCount"], 0);
    assert!(pizza.get("__v").is_none());
    assert!(pizza["createdAt"].as_str().unwrap().contains(" at "));
}

#[tokio::test]
async fn test_pizza_crud_workflow() {
    let client = spawn_app().await;

    let list: Value = client.get("/pizzas").await.unwrap().json().await.unwrap();
    assert_eq!(list, json!([]));

    let first = create_margherita(&client).await;
    let second: Value = client
        .post("/pizzas", json!({"pizzaName": "Pepperoni", "createdBy": "Sal"}))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(second["size"], "Large");

    // Newest first
    let list: Value = client.get("/pizzas").await.unwrap().json().await.unwrap();
    let ids: Vec<String> = list.as_array().unwrap().iter().map(id_of).collect();
    assert_eq!(ids, vec![id_of(&second), id_of(&first)]);

    // Update runs validators
    let path = format!("/pizzas/{}", id_of(&first));
    let response = client.put(&path, json!({"size": "Gigantic"})).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .put(&path, json!({"size": "Personal", "toppings": ["basil", "garlic"]}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["size"], "Personal");
    assert_eq!(updated["toppings"], json!(["basil", "garlic"]));
    assert_eq!(updated["pizzaName"], "Margherita");

    // Delete returns the removed pizza
    let response = client.delete(&path).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let removed: Value = response.json().await.unwrap();
    assert_eq!(id_of(&removed), id_of(&first));

    for response in [
        client.get(&path).await.unwrap(),
        client.put(&path, json!({"size": "Small"})).await.unwrap(),
        client.delete(&path).await.unwrap(),
    ] {
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["message"], "No pizza found with this id!");
    }
}

#[tokio::test]
async fn test_comments_and_replies_workflow() {
    let client = spawn_app().await;
    let pizza = create_margherita(&client).await;
    let pizza_id = id_of(&pizza);

    let response = client
        .post(
            &format!("/pizzas/{}/comments", pizza_id),
            json!({"writtenBy": "Lernantino", "commentBody": "Best pizza ever"}),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.unwrap();
    let comment_id = updated["comments"][0].as_str().unwrap().to_string();

    let first_reply: Value = client
        .post(
            &format!("/comments/{}/replies", comment_id),
            json!({"replyBody": "Agreed", "writtenBy": "Sal"}),
        )
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let comment: Value = client
        .post(
            &format!("/comments/{}/replies", comment_id),
            json!({"replyBody": "Same", "writtenBy": "Al"}),
        )
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(comment["replyCount"], 2);
    let reply_ids: Vec<&str> = comment["replies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["replyId"].as_str().unwrap())
        .collect();
    assert_ne!(reply_ids[0], reply_ids[1]);
    assert_eq!(reply_ids[0], first_reply["replies"][0]["replyId"].as_str().unwrap());

    // Invalid reply is rejected
    let response = client
        .post(&format!("/comments/{}/replies", comment_id), json!({"replyBody": "  "}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // One comment with two replies counts as three
    let fetched: Value = client
        .get(&format!("/pizzas/{}", pizza_id))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["commentCount"], 3);
    assert_eq!(fetched["comments"][0]["commentBody"], "Best pizza ever");
    assert!(fetched["comments"][0].get("__v").is_none());

    // Removing an unknown reply leaves the comment unchanged
    let response = client
        .delete(&format!("/comments/{}/replies/unknown", comment_id))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let unchanged: Value = response.json().await.unwrap();
    assert_eq!(unchanged["replies"], comment["replies"]);

    let response = client
        .delete(&format!("/comments/{}/replies/{}", comment_id, reply_ids[0]))
        .await
        .unwrap();
    let comment: Value = response.json().await.unwrap();
    assert_eq!(comment["replyCount"], 1);

    // Removing the comment unlinks it from the pizza
    let response = client
        .delete(&format!("/pizzas/{}/comments/{}", pizza_id, comment_id))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: Value = client
        .get(&format!("/pizzas/{}", pizza_id))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["comments"], json!([]));
    assert_eq!(fetched["commentCount"], 0);

    let response = client.get(&format!("/comments/{}", comment_id)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // A second delete reports the comment as missing
    let response = client
        .delete(&format!("/pizzas/{}/comments/{}", pizza_id, comment_id))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "No comment with this id!");
}

#[tokio::test]
async fn test_comment_on_missing_pizza_is_orphaned() {
    let (client, store) = spawn_app_with_store().await;

    let response = client
        .post(
            "/pizzas/does-not-exist/comments",
            json!({"writtenBy": "Al", "commentBody": "Anyone home?"}),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "No pizza found with this id!");

    // The comment was written before the pizza lookup failed and is not cleaned up
    assert_eq!(store.comment_count(), 1);
    assert_eq!(store.pizza_count(), 0);
}

#[tokio::test]
async fn test_remove_comment_from_wrong_pizza_still_deletes_comment() {
    let client = spawn_app().await;
    let pizza = create_margherita(&client).await;
    let pizza_id = id_of(&pizza);

    let updated: Value = client
        .post(&format!("/pizzas/{}/comments", pizza_id), json!({"commentBody": "hi"}))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let comment_id = updated["comments"][0].as_str().unwrap().to_string();

    let response = client
        .delete(&format!("/pizzas/other-pizza/comments/{}", comment_id))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "No pizza found with this id!");

    let response = client.get(&format!("/comments/{}", comment_id)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
