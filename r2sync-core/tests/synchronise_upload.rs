use std::fs;

use tempfile::tempdir;

use r2sync_core::config::SyncRoot;
use r2sync_core::contract::{Direction, MockObjectStore};
use r2sync_core::synchronise::synchronise;
use r2sync_core::transfer::CACHE_CONTROL;

#[tokio::test]
async fn upload_puts_every_file_with_inferred_content_type() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"hello").unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub/b.png"), b"png body").unwrap();

    let mut store = MockObjectStore::new();
    store
        .expect_put()
        .withf(|key, _source, content_type, cache_control| {
            cache_control == CACHE_CONTROL
                && ((key == "a.txt" && content_type == "text/plain")
                    || (key == "sub/b.png" && content_type == "image/png"))
        })
        .times(2)
        .returning(|_, source, _, _| Ok(fs::metadata(source)?.len()));

    let root = SyncRoot::new("bucket", dir.path(), "");
    let report = synchronise(&store, &root, Direction::Upload, 4)
        .await
        .expect("upload run should succeed");

    assert_eq!(report.total, 2);
    assert_eq!(report.succeeded, 2);
    assert!(report.is_clean());
    assert_eq!(report.bytes_transferred, 5 + 8);
}

#[tokio::test]
async fn empty_directory_reports_immediately_with_zero_counts() {
    let dir = tempdir().unwrap();
    // No put expectation: any transfer attempt fails the test.
    let store = MockObjectStore::new();

    let root = SyncRoot::new("bucket", dir.path(), "");
    let report = synchronise(&store, &root, Direction::Upload, 4)
        .await
        .expect("empty run should succeed");

    assert_eq!(report.total, 0);
    assert_eq!(report.succeeded, 0);
    assert!(report.is_clean());
}

#[tokio::test]
async fn one_failing_put_does_not_abort_the_batch() {
    let dir = tempdir().unwrap();
    for name in ["one.txt", "two.txt", "three.txt", "four.txt", "five.txt"] {
        fs::write(dir.path().join(name), b"body").unwrap();
    }

    let mut store = MockObjectStore::new();
    store
        .expect_put()
        .times(5)
        .returning(|key, _, _, _| {
            if key == "three.txt" {
                Err("simulated network error".into())
            } else {
                Ok(4)
            }
        });

    let root = SyncRoot::new("bucket", dir.path(), "");
    let report = synchronise(&store, &root, Direction::Upload, 2)
        .await
        .expect("run should complete despite the failed item");

    assert_eq!(report.total, 5);
    assert_eq!(report.succeeded, 4);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].address, "three.txt");
    assert!(report.failed[0].reason.contains("simulated network error"));
}

#[tokio::test]
async fn missing_local_directory_is_fatal_before_any_transfer() {
    let dir = tempdir().unwrap();
    // No put expectation: enumeration failure must not reach the scheduler.
    let store = MockObjectStore::new();

    let root = SyncRoot::new("bucket", dir.path().join("does-not-exist"), "");
    let result = synchronise(&store, &root, Direction::Upload, 4).await;
    assert!(result.is_err());
}
