//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::driver::{Driver, EditorEvent};
use crate::runtime_config::{fetch_viewports, headless_coordinator, HeadlessCoordinator};
use digitizer_core::core::config::ApplicationCfg;
use digitizer_core::core::error::SyncError;
use digitizer_core::core::feature::{Feature, FeatureId, Properties};
use digitizer_core::core::geom::Geometry;
use digitizer_core::core::parse_config;
use digitizer_core::datasource::{MemoryBackend, Request, Transport};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use viewport_diff::Extent;

const CONFIG: &str = r#"
    [remote]
    url = "http://localhost/digitizer"

    [digitizer.schemes.poi]
    geom_type = "point"

    [[digitizer.schemes.poi.fields]]
    name = "name"
    "#;

fn editor() -> HeadlessCoordinator {
    let config: ApplicationCfg = parse_config(CONFIG.to_string(), "").unwrap();
    headless_coordinator(&config).unwrap()
}

/// Backend with a 10x10 grid of points at (0.5,0.5) .. (9.5,9.5)
fn backend() -> Arc<MemoryBackend> {
    let backend = MemoryBackend::new();
    for i in 0..100 {
        let (x, y) = ((i % 10) as f64 + 0.5, (i / 10) as f64 + 0.5);
        let feature = Feature::new(
            FeatureId::Persisted(format!("{}", i + 1)),
            Geometry::new(&format!("POINT({} {})", x, y)),
        );
        backend.insert("poi", &feature);
    }
    Arc::new(backend)
}

#[tokio::test]
async fn test_concurrent_strip_fetches() {
    let backend = backend();
    let mut editor = editor();
    let viewports = vec![
        Extent::new(0.0, 0.0, 5.0, 5.0),
        // Grows on all sides
        Extent::new(-1.0, -1.0, 8.0, 8.0),
        Extent::new(0.0, 0.0, 10.0, 10.0),
    ];
    fetch_viewports(&mut editor, backend.clone(), &viewports)
        .await
        .unwrap();
    assert_eq!(editor.pending_count(), 0);
    let poi = editor.schemas().feature_schema("poi").unwrap();
    assert_eq!(poi.store.len(), 100);
    assert_eq!(editor.map().len("poi"), 100);
    assert_eq!(editor.table().len("poi"), 100);
    // Full, 4 strips, 2 strips
    assert_eq!(backend.request_log().len(), 7);
    assert_eq!(editor.stats().results("new_features.poi").len, 7);
}

#[tokio::test]
async fn test_event_loop() {
    let backend = backend();
    backend.require_field("poi", "name");
    let mut editor = editor();
    let mut driver = Driver::new(backend.clone());
    let (tx, rx) = mpsc::channel(16);

    tx.send(EditorEvent::Enable).await.unwrap();
    tx.send(EditorEvent::ViewportChanged(Extent::new(0.0, 0.0, 3.0, 3.0)))
        .await
        .unwrap();
    tx.send(EditorEvent::ViewportChanged(Extent::new(0.0, 0.0, 6.0, 3.0)))
        .await
        .unwrap();
    tx.send(EditorEvent::DrawCompleted {
        schema: "poi".to_string(),
        geometry: Geometry::new("POINT(1.2 1.2)"),
    })
    .await
    .unwrap();
    // Rejected by the feature service: empty name
    tx.send(EditorEvent::Save {
        schema: "poi".to_string(),
        id: FeatureId::Transient(1),
        properties: Properties::new(),
    })
    .await
    .unwrap();
    tx.send(EditorEvent::SelectSchema("rivers".to_string()))
        .await
        .unwrap();
    drop(tx);

    let errors = driver.run(&mut editor, rx).await;
    assert_eq!(driver.in_flight(), 0);
    assert_eq!(errors.len(), 2);
    assert!(errors.contains(&SyncError::UnknownSchema("rivers".to_string())));
    assert!(errors.contains(&SyncError::Rejected(vec![
        "name must not be empty".to_string()
    ])));

    let poi = editor.schemas().feature_schema("poi").unwrap();
    // 18 points of the 6x3 viewport plus the drawn feature
    assert_eq!(poi.store.len(), 19);
    assert!(poi.store.contains(&FeatureId::Transient(1)));
    assert_eq!(editor.ui().errors, vec!["name must not be empty"]);
}

#[tokio::test]
async fn test_save_and_delete_roundtrip() {
    let backend = backend();
    let mut editor = editor();
    let mut driver = Driver::new(backend.clone());
    driver.dispatch(editor.enable().unwrap());
    driver.dispatch(
        editor
            .viewport_changed(&Extent::new(0.0, 0.0, 1.0, 1.0))
            .unwrap(),
    );
    assert!(driver.run_until_idle(&mut editor).await.is_empty());
    assert_eq!(editor.map().len("poi"), 1);

    let t1 = editor
        .draw_completed("poi", Geometry::new("POINT(0.2 0.2)"))
        .unwrap();
    let mut props = Properties::new();
    props.insert("name".to_string(), "Bern".to_string());
    driver.dispatch(editor.save("poi", &t1, props).unwrap());
    assert_eq!(driver.complete_next(&mut editor).await, Some(Ok(())));
    assert_eq!(driver.complete_next(&mut editor).await, None);
    assert_eq!(backend.feature_count("poi"), 101);
    let saved = FeatureId::Persisted("101".to_string());
    assert!(editor.map().feature("poi", &saved).is_some());

    editor.delete("poi", &saved).unwrap();
    driver.dispatch(editor.confirm_delete("poi", &saved).unwrap());
    assert!(driver.run_until_idle(&mut editor).await.is_empty());
    assert_eq!(backend.feature_count("poi"), 100);
    assert!(editor.map().feature("poi", &saved).is_none());

    backend.set_offline(true);
    driver.dispatch(editor.refresh("poi").unwrap());
    let errors = driver.run_until_idle(&mut editor).await;
    assert!(matches!(errors[..], [SyncError::Transport(_)]));
    assert_eq!(editor.map().len("poi"), 1);
}

/// Feature service whose connection task crashes on save
struct CrashingTransport {
    backend: MemoryBackend,
}

impl Transport for CrashingTransport {
    fn send(&self, request: Request) -> impl Future<Output = Result<Value, SyncError>> + Send {
        let crash = request.action() == "save";
        let response = self.backend.handle(&request);
        async move {
            if crash {
                panic!("connection task crashed");
            }
            response
        }
    }
}

#[tokio::test]
async fn test_crashed_request_task() {
    let backend = MemoryBackend::new();
    backend.add_schema("poi");
    let transport = Arc::new(CrashingTransport { backend });
    let mut editor = editor();
    let mut driver = Driver::new(transport);
    driver.dispatch(editor.enable().unwrap());

    let t1 = editor
        .draw_completed("poi", Geometry::new("POINT(0.2 0.2)"))
        .unwrap();
    let mut props = Properties::new();
    props.insert("name".to_string(), "Bern".to_string());
    driver.dispatch(editor.save("poi", &t1, props.clone()).unwrap());
    assert_eq!(editor.pending_count(), 1);
    assert!(!editor.ui().form_enabled);

    let errors = driver.run_until_idle(&mut editor).await;
    assert!(matches!(errors[..], [SyncError::Transport(_)]));
    assert_eq!(editor.pending_count(), 0);
    assert!(editor.ui().form_enabled);
    assert_eq!(editor.ui().notifications.len(), 1);
    // The feature can be saved again
    assert!(editor.save("poi", &t1, props).is_ok());
}
