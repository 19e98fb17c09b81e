//! Firestore over its REST API.
//!
//! # Writes
//!
//! A new document is created with a single `documents:commit` call carrying
//! one `update` write (with a client-generated id and an `exists: false`
//! precondition) plus one `REQUEST_TIME` transform per server-timestamp
//! field. The store stamps those fields with its own clock.
//!
//! # Live snapshots
//!
//! The REST surface has no push channel, so a subscription is a polling task:
//! the collection is listed on a fixed interval and a snapshot is emitted on
//! the first successful poll and whenever the listed documents differ from
//! the previous poll. Releasing the subscription aborts the task.
//!
//! # Values
//!
//! Firestore wraps every value in a type tag (`{"stringValue": "..."}`).
//! Documents cross this module boundary as plain JSON; timestamps become
//! RFC 3339 strings.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Map, Value, json};
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::document::{Document, NewDocument, Snapshot};
use crate::error::StoreError;
use crate::store::{BoxFuture, DocumentStore, SnapshotListener, Subscription};

pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";
const DEFAULT_DATABASE: &str = "(default)";
const PAGE_SIZE: u32 = 300;

#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub database: String,
    pub poll_interval: Duration,
}

impl FirestoreConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            poll_interval: Duration::from_secs(2),
        }
    }
}

#[derive(Clone)]
pub struct FirestoreStore {
    http: reqwest::Client,
    config: Arc<FirestoreConfig>,
}

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<RawDocument>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

// ── Client ───────────────────────────────────────────────────────────────────

impl FirestoreStore {
    pub fn new(config: FirestoreConfig) -> Result<Self, StoreError> {
        if config.project_id.trim().is_empty() {
            return Err(StoreError::Config("firestore project id is empty".to_string()));
        }
        if config.poll_interval.is_zero() {
            return Err(StoreError::Config("poll interval must be positive".to_string()));
        }
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| StoreError::Config(e.to_string()))?;
        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    /// Resource name prefix, e.g. `projects/p/databases/(default)/documents`.
    fn documents_root(&self) -> String {
        format!(
            "projects/{}/databases/{}/documents",
            self.config.project_id, self.config.database
        )
    }

    fn url(&self, suffix: &str) -> String {
        format!(
            "{}/v1/{}{}",
            self.config.base_url.trim_end_matches('/'),
            self.documents_root(),
            suffix
        )
    }

    fn with_key(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => req.query(&[("key", key.as_str())]),
            None => req,
        }
    }

    /// List every document of a collection, following page tokens.
    pub async fn list_documents(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let url = self.url(&format!("/{collection}"));
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut req = self
                .http
                .get(&url)
                .query(&[("pageSize", PAGE_SIZE.to_string())]);
            if let Some(token) = &page_token {
                req = req.query(&[("pageToken", token.as_str())]);
            }

            let resp = self
                .with_key(req)
                .send()
                .await
                .map_err(|e| StoreError::Request(e.to_string()))?;
            let page: ListDocumentsResponse = read_json(resp).await?;

            for raw in page.documents {
                documents.push(decode_document(raw)?);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(documents)
    }

    /// Create a document with a fresh id. Returns the id.
    pub async fn create_document(
        &self,
        collection: &str,
        document: &NewDocument,
    ) -> Result<String, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        let name = format!("{}/{collection}/{id}", self.documents_root());
        let body = commit_body(&name, document);

        let req = self.http.post(self.url(":commit")).json(&body);
        let resp = self
            .with_key(req)
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;
        let _: Value = read_json(resp).await?;

        debug!(collection, id = %id, "document committed");
        Ok(id)
    }
}

impl DocumentStore for FirestoreStore {
    fn subscribe(
        &self,
        collection: &str,
        listener: SnapshotListener,
    ) -> Result<Subscription, StoreError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| StoreError::Runtime(e.to_string()))?;

        let store = self.clone();
        let collection = collection.to_string();
        let task = runtime.spawn(async move {
            let mut ticker = tokio::time::interval(store.config.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last: Option<Vec<Document>> = None;

            loop {
                ticker.tick().await;
                match store.list_documents(&collection).await {
                    Ok(documents) => {
                        if last.as_ref() == Some(&documents) {
                            continue;
                        }
                        debug!(collection = %collection, count = documents.len(), "collection changed");
                        last = Some(documents.clone());
                        listener(Snapshot {
                            collection: collection.clone(),
                            documents,
                        });
                    }
                    Err(e) => {
                        warn!(collection = %collection, error = %e, "snapshot poll failed");
                    }
                }
            }
        });

        Ok(Subscription::new(move || task.abort()))
    }

    fn write<'a>(
        &'a self,
        collection: &'a str,
        document: NewDocument,
    ) -> BoxFuture<'a, Result<String, StoreError>> {
        Box::pin(async move { self.create_document(collection, &document).await })
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, StoreError> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| StoreError::Request(e.to_string()))?;
    if !status.is_success() {
        return Err(StoreError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(serde_json::from_str(&body)?)
}

// ── Value conversion ─────────────────────────────────────────────────────────

/// Body of a `documents:commit` call creating `name`.
pub fn commit_body(name: &str, document: &NewDocument) -> Value {
    let fields: Map<String, Value> = document
        .fields
        .iter()
        .map(|(k, v)| (k.clone(), encode_value(v)))
        .collect();

    let transforms: Vec<Value> = document
        .server_timestamps
        .iter()
        .map(|field| json!({ "fieldPath": field, "setToServerValue": "REQUEST_TIME" }))
        .collect();

    let mut write = json!({
        "update": { "name": name, "fields": fields },
        "currentDocument": { "exists": false },
    });
    if !transforms.is_empty() {
        write["updateTransforms"] = Value::Array(transforms);
    }

    json!({ "writes": [write] })
}

/// Wrap plain JSON in Firestore type tags.
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => {
            let fields: Map<String, Value> =
                map.iter().map(|(k, v)| (k.clone(), encode_value(v))).collect();
            json!({ "mapValue": { "fields": fields } })
        }
    }
}

/// Strip Firestore type tags back to plain JSON.
pub fn decode_value(value: &Value) -> Result<Value, StoreError> {
    let obj = value
        .as_object()
        .ok_or_else(|| StoreError::Decode(format!("expected typed value, got {value}")))?;
    let (tag, inner) = obj
        .iter()
        .next()
        .ok_or_else(|| StoreError::Decode("empty typed value".to_string()))?;

    let decoded = match tag.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" | "doubleValue" => inner.clone(),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "integerValue" => {
            let raw = inner
                .as_str()
                .ok_or_else(|| StoreError::Decode("integerValue is not a string".to_string()))?;
            let parsed: i64 = raw
                .parse()
                .map_err(|_| StoreError::Decode(format!("bad integerValue: {raw}")))?;
            Value::from(parsed)
        }
        "geoPointValue" => inner.clone(),
        "mapValue" => {
            let mut out = Map::new();
            if let Some(fields) = inner.get("fields").and_then(Value::as_object) {
                for (k, v) in fields {
                    out.insert(k.clone(), decode_value(v)?);
                }
            }
            Value::Object(out)
        }
        "arrayValue" => {
            let values = match inner.get("values").and_then(Value::as_array) {
                Some(values) => values.iter().map(decode_value).collect::<Result<_, _>>()?,
                None => Vec::new(),
            };
            Value::Array(values)
        }
        other => return Err(StoreError::Decode(format!("unsupported value type: {other}"))),
    };

    Ok(decoded)
}

fn decode_document(raw: RawDocument) -> Result<Document, StoreError> {
    let id = raw
        .name
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| StoreError::Decode(format!("bad document name: {}", raw.name)))?
        .to_string();

    let mut fields = Map::new();
    for (k, v) in &raw.fields {
        fields.insert(k.clone(), decode_value(v)?);
    }

    Ok(Document { id, fields })
}
