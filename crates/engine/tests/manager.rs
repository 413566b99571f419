//! Manager behavior against the in-memory backend.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use txscope_core::Error;
use txscope_engine::{DrainPolicy, HandleResolver, StoreLifecycle, TxManager};
use txscope_memstore::MemStore;

type Engine = (
    Arc<StoreLifecycle<MemStore>>,
    TxManager<MemStore>,
    HandleResolver<MemStore>,
    MemStore,
);

async fn ready_engine(policy: DrainPolicy) -> Engine {
    let store = MemStore::new();
    let lifecycle = Arc::new(StoreLifecycle::new(store.clone(), policy));
    lifecycle.initialize().await.expect("initialize");
    let manager = TxManager::new(lifecycle.clone());
    let resolver = HandleResolver::new(lifecycle.clone());
    (lifecycle, manager, resolver, store)
}

#[tokio::test]
async fn run_commits_on_ok() {
    let (_lifecycle, manager, resolver, store) = ready_engine(DrainPolicy::Wait).await;

    let inside = resolver.clone();
    manager
        .run(move || async move {
            let handle = inside.get()?;
            handle.put("order", json!({"total": 42})).await?;
            Ok::<_, Error>(())
        })
        .await
        .unwrap();

    let handle = resolver.get().unwrap();
    assert_eq!(
        handle.get("order").await.unwrap(),
        Some(json!({"total": 42}))
    );
    assert_eq!(store.stats().commits, 1);

    let metrics = manager.metrics();
    assert_eq!(metrics.roots_started, 1);
    assert_eq!(metrics.committed, 1);
    assert_eq!(metrics.rolled_back, 0);
    assert_eq!(metrics.active, 0);
}

#[tokio::test]
async fn run_propagates_callback_error_and_rolls_back() {
    let (_lifecycle, manager, resolver, store) = ready_engine(DrainPolicy::Wait).await;

    let inside = resolver.clone();
    let err = manager
        .run(move || async move {
            let handle = inside.get()?;
            handle.put("order", json!(1)).await?;
            Err::<(), anyhow::Error>(anyhow::anyhow!("callback boom"))
        })
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "callback boom");
    assert_eq!(resolver.get().unwrap().get("order").await.unwrap(), None);
    assert_eq!(store.stats().rollbacks, 1);
    assert_eq!(manager.metrics().rolled_back, 1);
}

#[tokio::test]
async fn nested_run_joins_without_second_begin() {
    let (_lifecycle, manager, resolver, store) = ready_engine(DrainPolicy::Wait).await;

    let outer_resolver = resolver.clone();
    let inner_manager = manager.clone();
    let (outer_id, inner_id) = manager
        .run(move || async move {
            let outer_id = outer_resolver.current_tx().expect("inside root");
            let inner_resolver = outer_resolver.clone();
            let inner_id = inner_manager
                .run(move || async move {
                    Ok::<_, Error>(inner_resolver.current_tx().expect("inside join"))
                })
                .await?;
            Ok::<_, Error>((outer_id, inner_id))
        })
        .await
        .unwrap();

    assert_eq!(outer_id, inner_id);
    assert_eq!(store.stats().begins, 1);

    let metrics = manager.metrics();
    assert_eq!(metrics.roots_started, 1);
    assert_eq!(metrics.joined, 1);
}

#[tokio::test]
async fn run_before_initialize_is_a_lifecycle_error() {
    let store = MemStore::new();
    let lifecycle = Arc::new(StoreLifecycle::new(store.clone(), DrainPolicy::Wait));
    let manager = TxManager::new(lifecycle);

    let err = manager
        .run(move || async move { Ok::<_, Error>(()) })
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotInitialized));
    assert_eq!(store.stats().begins, 0);
}

#[tokio::test]
async fn run_after_shutdown_is_rejected() {
    let (lifecycle, manager, resolver, _store) = ready_engine(DrainPolicy::Wait).await;
    lifecycle.shutdown().await.unwrap();

    let err = manager
        .run(move || async move { Ok::<_, Error>(()) })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Closed));
    assert!(matches!(resolver.get(), Err(Error::Closed)));
}

#[tokio::test]
async fn begin_failure_surfaces_untranslated() {
    let (_lifecycle, manager, _resolver, store) = ready_engine(DrainPolicy::Wait).await;
    store.fail_begins(true);

    let err = manager
        .run(move || async move { Ok::<_, Error>(()) })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Begin(_)));
    assert_eq!(store.stats().begins, 0);
}

#[tokio::test(start_paused = true)]
async fn drain_timeout_still_releases_the_connection() {
    let (lifecycle, manager, _resolver, store) =
        ready_engine(DrainPolicy::WaitTimeout(Duration::from_millis(50))).await;

    let hung = tokio::spawn({
        let manager = manager.clone();
        async move {
            manager
                .run(move || async move {
                    futures::future::pending::<()>().await;
                    Ok::<_, Error>(())
                })
                .await
        }
    });
    // Let the root enter its transaction before shutting down.
    tokio::time::sleep(Duration::from_millis(5)).await;
    assert_eq!(manager.metrics().active, 1);

    let err = lifecycle.shutdown().await.unwrap_err();
    assert!(matches!(err, Error::DrainTimeout { active: 1 }));
    assert!(!store.is_connected());

    hung.abort();
}

#[tokio::test(start_paused = true)]
async fn shutdown_waits_for_in_flight_roots() {
    let (lifecycle, manager, resolver, _store) = ready_engine(DrainPolicy::Wait).await;

    let gate = Arc::new(tokio::sync::Notify::new());
    let root = tokio::spawn({
        let manager = manager.clone();
        let resolver = resolver.clone();
        let gate = gate.clone();
        async move {
            manager
                .run(move || async move {
                    resolver.get()?.put("slow", json!(true)).await?;
                    gate.notified().await;
                    Ok::<_, Error>(())
                })
                .await
        }
    });
    tokio::time::sleep(Duration::from_millis(5)).await;
    assert_eq!(lifecycle.active_roots(), 1);

    let shutdown = tokio::spawn({
        let lifecycle = lifecycle.clone();
        async move { lifecycle.shutdown().await }
    });
    tokio::time::sleep(Duration::from_millis(5)).await;
    assert!(!shutdown.is_finished());

    gate.notify_one();
    root.await.unwrap().unwrap();
    shutdown.await.unwrap().unwrap();
    assert_eq!(lifecycle.active_roots(), 0);
}
