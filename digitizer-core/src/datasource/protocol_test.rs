//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::error::SyncError;
use crate::core::feature::{Feature, FeatureId};
use crate::core::geom::Geometry;
use crate::datasource::memory::MemoryBackend;
use crate::datasource::protocol::*;
use viewport_diff::Extent;

fn point(id: &str, x: f64, y: f64) -> Feature {
    let mut feature = Feature::new(
        FeatureId::Persisted(id.to_string()),
        Geometry::new(&format!("POINT({} {})", x, y)),
    );
    feature.properties.insert("name".to_string(), format!("pt{}", id));
    feature
}

fn select(region: Option<Extent>) -> Request {
    Request::Select(SelectRequest {
        schema: "poi".to_string(),
        max_results: 100,
        srid: 3857,
        intersect_geometry: region.map(|r| r.to_wkt()),
    })
}

#[test]
fn test_request_json() {
    let req = select(Some(Extent::new(0.0, 0.0, 10.0, 5.0)));
    assert_eq!(req.action(), "select");
    assert_eq!(
        req.to_json().unwrap(),
        json!({
            "schema": "poi",
            "maxResults": 100,
            "srid": 3857,
            "intersectGeometry": "POLYGON((0 0,10 0,10 5,0 5,0 0))"
        })
    );
    let json = select(None).to_json().unwrap();
    assert!(json.get("intersectGeometry").is_none());

    let feature = Feature::new(FeatureId::Transient(1), Geometry::new("POINT(1 1)"));
    let req = Request::Export(ExportRequest {
        schema: "poi".to_string(),
        feature: feature.to_record(),
        format: "kml".to_string(),
    });
    assert_eq!(req.action(), "export");
    let json = req.to_json().unwrap();
    assert_eq!(json["format"], "kml");
    assert_eq!(json["feature"]["isNew"], true);
    assert_eq!(json["feature"]["type"], "Feature");
}

#[test]
fn test_parse_features() {
    let features = parse_features(json!({
        "features": [
            {"id": 1, "properties": {"name": "a"}, "geometry": "POINT(0 0)"},
            {"id": "2", "properties": {}, "geometry": "POINT(1 1)"}
        ]
    }))
    .unwrap();
    assert_eq!(features.len(), 2);
    assert_eq!(features[0].id, FeatureId::Persisted("1".to_string()));

    assert_eq!(
        parse_features(json!({"errors": ["no access", {"message": "try later"}]})),
        Err(SyncError::Rejected(vec![
            "no access".to_string(),
            "try later".to_string()
        ]))
    );
    assert!(parse_features(json!({"errors": [], "features": []}))
        .unwrap()
        .is_empty());
}

#[test]
fn test_error_list_only_checked_when_filled() {
    // `errors` is inspected on the raw response, its shape never breaks a feature list
    let features = parse_features(json!({
        "features": [{"id": 3, "geometry": "POINT(2 2)"}],
        "errors": null
    }))
    .unwrap();
    assert_eq!(features[0].id, FeatureId::Persisted("3".to_string()));
    let features = parse_features(json!({
        "features": [{"id": 3, "geometry": "POINT(2 2)"}],
        "errors": "none"
    }))
    .unwrap();
    assert_eq!(features.len(), 1);
}

#[test]
fn test_malformed_responses() {
    assert_eq!(
        parse_features(json!({"rows": []})),
        Err(SyncError::MalformedResponse(
            "expected `features` or `errors`".to_string()
        ))
    );
    assert!(matches!(
        parse_features(json!({"features": {"id": 1}})),
        Err(SyncError::MalformedResponse(_))
    ));
    // One broken record discards the whole response
    assert!(matches!(
        parse_features(json!({"features": [
            {"id": 1, "geometry": "POINT(0 0)"},
            {"geometry": "POINT(1 1)"}
        ]})),
        Err(SyncError::MalformedResponse(_))
    ));
    assert!(matches!(
        parse_saved_feature(json!({"features": []})),
        Err(SyncError::MalformedResponse(_))
    ));
}

#[test]
fn test_delete_confirmation() {
    let id = FeatureId::Persisted("7".to_string());
    assert_eq!(parse_delete_confirmation(json!({"id": 7}), &id), Ok(()));
    assert_eq!(parse_delete_confirmation(json!({"id": "7"}), &id), Ok(()));
    assert!(matches!(
        parse_delete_confirmation(json!({"id": 8}), &id),
        Err(SyncError::MalformedResponse(_))
    ));
    assert!(matches!(
        parse_delete_confirmation(json!({}), &id),
        Err(SyncError::MalformedResponse(_))
    ));
    assert_eq!(
        parse_delete_confirmation(json!({"errors": [{"message": "locked"}]}), &id),
        Err(SyncError::Rejected(vec!["locked".to_string()]))
    );
}

#[test]
fn test_memory_select() {
    let backend = MemoryBackend::new();
    backend.insert("poi", &point("1", 1.0, 1.0));
    backend.insert("poi", &point("2", 5.0, 5.0));
    backend.insert("poi", &point("3", 20.0, 20.0));

    let response = backend.handle(&select(None)).unwrap();
    assert_eq!(parse_features(response).unwrap().len(), 3);

    let response = backend
        .handle(&select(Some(Extent::new(0.0, 0.0, 10.0, 10.0))))
        .unwrap();
    let ids: Vec<String> = parse_features(response)
        .unwrap()
        .iter()
        .map(|f| f.id.to_string())
        .collect();
    assert_eq!(ids, vec!["1", "2"]);

    let response = backend
        .handle(&Request::Select(SelectRequest {
            schema: "poi".to_string(),
            max_results: 1,
            srid: 3857,
            intersect_geometry: None,
        }))
        .unwrap();
    assert_eq!(parse_features(response).unwrap().len(), 1);

    let response = backend
        .handle(&Request::Select(SelectRequest {
            schema: "roads".to_string(),
            max_results: 1,
            srid: 3857,
            intersect_geometry: None,
        }))
        .unwrap();
    assert_eq!(
        parse_features(response),
        Err(SyncError::Rejected(vec!["Unknown schema `roads`".to_string()]))
    );
    assert_eq!(backend.request_log(), vec!["select poi", "select poi", "select poi", "select roads"]);
}

#[test]
fn test_memory_save_and_delete() {
    let backend = MemoryBackend::new();
    backend.add_schema("poi");
    backend.require_field("poi", "name");

    let mut feature = Feature::new(FeatureId::Transient(1), Geometry::new("POINT(1 2)"));
    let save = |feature: &Feature| {
        backend.handle(&Request::Save(SaveRequest {
            schema: "poi".to_string(),
            feature: feature.to_record(),
        }))
    };
    assert_eq!(
        parse_saved_feature(save(&feature).unwrap()),
        Err(SyncError::Rejected(vec!["name must not be empty".to_string()]))
    );
    feature.properties.insert("name".to_string(), "Bern".to_string());
    let saved = parse_saved_feature(save(&feature).unwrap()).unwrap();
    assert_eq!(saved.id, FeatureId::Persisted("1".to_string()));
    assert_eq!(saved.properties["name"], "Bern");
    assert_eq!(backend.feature_count("poi"), 1);

    let delete = Request::Delete(DeleteRequest {
        schema: "poi".to_string(),
        feature: saved.to_record(),
    });
    let response = backend.handle(&delete).unwrap();
    assert_eq!(parse_delete_confirmation(response, &saved.id), Ok(()));
    assert_eq!(backend.feature_count("poi"), 0);
    let response = backend.handle(&delete).unwrap();
    assert!(matches!(
        parse_delete_confirmation(response, &saved.id),
        Err(SyncError::Rejected(_))
    ));

    backend.set_offline(true);
    assert!(matches!(
        backend.handle(&delete),
        Err(SyncError::Transport(_))
    ));
}
