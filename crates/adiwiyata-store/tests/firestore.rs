use std::sync::{Arc, Mutex};
use std::time::Duration;

use adiwiyata_store::document::{NewDocument, Snapshot};
use adiwiyata_store::firestore::{
    FirestoreConfig, FirestoreStore, commit_body, decode_value, encode_value,
};
use adiwiyata_store::store::{DocumentStore, SnapshotListener};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LIST_PATH: &str = "/v1/projects/demo/databases/(default)/documents/comments";
const COMMIT_PATH: &str = "/v1/projects/demo/databases/(default)/documents:commit";

fn store_for(server: &MockServer) -> FirestoreStore {
    let mut config = FirestoreConfig::new("demo");
    config.api_key = Some("test-key".to_string());
    config.base_url = server.uri();
    config.poll_interval = Duration::from_millis(20);
    FirestoreStore::new(config).unwrap()
}

#[test]
fn plain_json_round_trips_through_type_tags() {
    let plain = json!({
        "text": "Sekolah hijau",
        "likes": 3,
        "score": 1.5,
        "pinned": false,
        "note": null,
        "tags": ["a", "b"],
        "meta": { "source": "web" }
    });

    let encoded = encode_value(&plain);
    assert_eq!(encoded["mapValue"]["fields"]["likes"], json!({ "integerValue": "3" }));
    assert_eq!(encoded["mapValue"]["fields"]["text"], json!({ "stringValue": "Sekolah hijau" }));

    assert_eq!(decode_value(&encoded).unwrap(), plain);
}

#[test]
fn timestamps_decode_to_rfc3339_strings() {
    let decoded = decode_value(&json!({ "timestampValue": "2025-10-09T08:00:00.123Z" })).unwrap();
    assert_eq!(decoded, json!("2025-10-09T08:00:00.123Z"));
}

#[test]
fn unknown_or_malformed_values_are_errors() {
    assert!(decode_value(&json!({ "mysteryValue": 1 })).is_err());
    assert!(decode_value(&json!({ "integerValue": "abc" })).is_err());
    assert!(decode_value(&json!("bare")).is_err());
}

#[test]
fn commit_body_requests_server_timestamp() {
    let doc = NewDocument::new()
        .field("text", "Halo")
        .server_timestamp("timestamp");
    let body = commit_body("projects/demo/databases/(default)/documents/comments/abc", &doc);

    let write = &body["writes"][0];
    assert_eq!(write["update"]["fields"]["text"], json!({ "stringValue": "Halo" }));
    assert_eq!(write["currentDocument"], json!({ "exists": false }));
    assert_eq!(
        write["updateTransforms"],
        json!([{ "fieldPath": "timestamp", "setToServerValue": "REQUEST_TIME" }])
    );
}

#[test]
fn empty_project_is_rejected() {
    assert!(FirestoreStore::new(FirestoreConfig::new("  ")).is_err());
}

#[tokio::test]
async fn list_follows_page_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("pageToken", "next"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [{
                "name": "projects/demo/databases/(default)/documents/comments/b",
                "fields": { "text": { "stringValue": "kedua" } }
            }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [{
                "name": "projects/demo/databases/(default)/documents/comments/a",
                "fields": {
                    "text": { "stringValue": "pertama" },
                    "timestamp": { "timestampValue": "2025-10-09T08:00:00Z" }
                }
            }],
            "nextPageToken": "next"
        })))
        .mount(&server)
        .await;

    let docs = store_for(&server).list_documents("comments").await.unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].id, "a");
    assert_eq!(docs[0].str_field("timestamp"), Some("2025-10-09T08:00:00Z"));
    assert_eq!(docs[1].id, "b");
    assert_eq!(docs[1].str_field("text"), Some("kedua"));
}

#[tokio::test]
async fn write_posts_commit_and_returns_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(COMMIT_PATH))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "writeResults": [{ "updateTime": "2025-10-09T08:00:00Z" }],
            "commitTime": "2025-10-09T08:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server);
    let id = store
        .write("comments", NewDocument::new().field("text", "Halo").server_timestamp("timestamp"))
        .await
        .unwrap();
    assert!(!id.is_empty());

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let name = body["writes"][0]["update"]["name"].as_str().unwrap();
    assert_eq!(name, format!("projects/demo/databases/(default)/documents/comments/{id}"));
}

#[tokio::test]
async fn failed_commit_surfaces_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(COMMIT_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
        .mount(&server)
        .await;

    let err = store_for(&server)
        .write("comments", NewDocument::new().field("text", "x"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("403"), "got: {err}");
}

#[tokio::test]
async fn subscription_emits_first_poll_then_stops_after_release() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [{
                "name": "projects/demo/databases/(default)/documents/comments/a",
                "fields": { "text": { "stringValue": "pertama" } }
            }]
        })))
        .mount(&server)
        .await;

    let seen: Arc<Mutex<Vec<Snapshot>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let listener: SnapshotListener = Arc::new(move |s| sink.lock().unwrap().push(s));

    let store = store_for(&server);
    let sub = store.subscribe("comments", listener).unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    sub.release();

    // Unchanged collection: only the first poll produces a snapshot.
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].documents[0].id, "a");
}
