use std::sync::{Arc, Mutex};

use adiwiyata_core::clock::ManualClock;
use adiwiyata_store::document::{NewDocument, Snapshot};
use adiwiyata_store::memory::MemoryStore;
use adiwiyata_store::store::{DocumentStore, SnapshotListener};
use jiff::Timestamp;

fn recorder() -> (SnapshotListener, Arc<Mutex<Vec<Snapshot>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let listener: SnapshotListener = Arc::new(move |snapshot| sink.lock().unwrap().push(snapshot));
    (listener, seen)
}

#[tokio::test]
async fn subscribe_emits_initial_snapshot() {
    let store = MemoryStore::new();
    let (listener, seen) = recorder();

    let _sub = store.subscribe("comments", listener).unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].collection, "comments");
    assert!(seen[0].documents.is_empty());
}

#[tokio::test]
async fn write_fans_out_full_snapshot_with_server_timestamp() {
    let now = Timestamp::from_second(1_760_000_000).unwrap();
    let store = MemoryStore::with_clock(Arc::new(ManualClock::new(now)));
    let (listener, seen) = recorder();
    let _sub = store.subscribe("comments", listener).unwrap();

    let first = store
        .write("comments", NewDocument::new().field("text", "satu").server_timestamp("timestamp"))
        .await
        .unwrap();
    let second = store
        .write("comments", NewDocument::new().field("text", "dua"))
        .await
        .unwrap();
    assert_ne!(first, second);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);

    let latest = &seen[2].documents;
    assert_eq!(latest.len(), 2);
    assert_eq!(latest[0].id, first);
    assert_eq!(latest[0].str_field("text"), Some("satu"));
    assert_eq!(latest[0].str_field("timestamp"), Some(now.to_string().as_str()));
    assert_eq!(latest[1].str_field("timestamp"), None);
}

#[tokio::test]
async fn other_collections_do_not_notify() {
    let store = MemoryStore::new();
    let (listener, seen) = recorder();
    let _sub = store.subscribe("comments", listener).unwrap();

    store.write("guestbook", NewDocument::new().field("text", "x")).await.unwrap();

    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn released_subscription_stops_notifications() {
    let store = MemoryStore::new();
    let (listener, seen) = recorder();
    let sub = store.subscribe("comments", listener).unwrap();
    assert_eq!(store.subscriber_count(), 1);

    sub.release();
    assert_eq!(store.subscriber_count(), 0);

    store.write("comments", NewDocument::new().field("text", "x")).await.unwrap();
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn dropping_subscription_releases_it() {
    let store = MemoryStore::new();
    let (listener, _seen) = recorder();
    {
        let _sub = store.subscribe("comments", listener).unwrap();
        assert_eq!(store.subscriber_count(), 1);
    }
    assert_eq!(store.subscriber_count(), 0);
}

#[tokio::test]
async fn remove_emits_snapshot_without_document() {
    let store = MemoryStore::new();
    let id = store.write("comments", NewDocument::new().field("text", "x")).await.unwrap();
    let (listener, seen) = recorder();
    let _sub = store.subscribe("comments", listener).unwrap();

    assert!(store.remove("comments", &id));
    assert!(!store.remove("comments", &id));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen[1].documents.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_writes_reach_listeners_in_commit_order() {
    let store = Arc::new(MemoryStore::new());
    let seen = Arc::new(Mutex::new(Vec::<usize>::new()));
    let sink = Arc::clone(&seen);
    let listener: SnapshotListener = Arc::new(move |snapshot: Snapshot| {
        if snapshot.documents.len() == 1 {
            std::thread::sleep(std::time::Duration::from_millis(200));
        }
        sink.lock().unwrap().push(snapshot.documents.len());
    });
    let _sub = store.subscribe("comments", listener).unwrap();

    let first = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.write("comments", NewDocument::new().field("text", "satu")).await }
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let second = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.write("comments", NewDocument::new().field("text", "dua")).await }
    });

    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    assert_eq!(store.documents("comments").len(), 2);
    assert_eq!(*seen.lock().unwrap(), [0, 1, 2]);
}
