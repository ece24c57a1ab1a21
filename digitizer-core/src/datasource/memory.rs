//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::error::SyncError;
use crate::core::feature::{Feature, FeatureRecord};
use crate::core::geom::Geometry;
use crate::datasource::protocol::{Request, SelectRequest};
use crate::datasource::transport::Transport;
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Mutex;

#[derive(Default)]
struct MemoryState {
    /// Records by schema and id
    schemas: BTreeMap<String, BTreeMap<String, FeatureRecord>>,
    /// Fields which must not be empty on save, by schema
    required: BTreeMap<String, Vec<String>>,
    last_id: u64,
    offline: bool,
    log: Vec<String>,
}

/// Passive in-memory feature service
///
/// Answers requests like a remote feature service would. Used for tests
/// and for headless runs without a server.
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

fn error_response(messages: Vec<String>) -> Value {
    json!({
        "errors": messages
            .into_iter()
            .map(|message| json!({ "message": message }))
            .collect::<Vec<_>>()
    })
}

impl MemoryBackend {
    pub fn new() -> MemoryBackend {
        MemoryBackend::default()
    }
    /// Create an empty schema
    pub fn add_schema(&self, schema: &str) {
        let mut state = self.lock();
        state.schemas.entry(schema.to_string()).or_default();
    }
    /// Add a persisted feature
    pub fn insert(&self, schema: &str, feature: &Feature) {
        let mut state = self.lock();
        let record = feature.to_record();
        let id = match record.id {
            Some(ref id) => {
                // Keep assigned ids unique
                if let Ok(numeric) = id.parse::<u64>() {
                    state.last_id = state.last_id.max(numeric);
                }
                id.clone()
            }
            None => {
                state.last_id += 1;
                state.last_id.to_string()
            }
        };
        state
            .schemas
            .entry(schema.to_string())
            .or_default()
            .insert(id.clone(), FeatureRecord {
                id: Some(id),
                is_new: false,
                ..record
            });
    }
    /// Reject saves with an empty value for `field`
    pub fn require_field(&self, schema: &str, field: &str) {
        let mut state = self.lock();
        state
            .required
            .entry(schema.to_string())
            .or_default()
            .push(field.to_string());
    }
    /// Fail every request with a transport error
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }
    pub fn feature_count(&self, schema: &str) -> usize {
        self.lock().schemas.get(schema).map_or(0, |s| s.len())
    }
    /// Handled requests as `action schema`
    pub fn request_log(&self) -> Vec<String> {
        self.lock().log.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // A poisoned lock only means a panicking test thread
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Answer a request
    pub fn handle(&self, request: &Request) -> Result<Value, SyncError> {
        let mut state = self.lock();
        if state.offline {
            return Err(SyncError::Transport("connection refused".to_string()));
        }
        state
            .log
            .push(format!("{} {}", request.action(), request.schema()));
        let schema = request.schema().to_string();
        if !state.schemas.contains_key(&schema) {
            return Ok(error_response(vec![format!("Unknown schema `{}`", schema)]));
        }
        let response = match request {
            Request::Select(req) => select(&state, req),
            Request::Save(req) => {
                let missing: Vec<String> = state
                    .required
                    .get(&schema)
                    .map(|fields| {
                        fields
                            .iter()
                            .filter(|f| {
                                req.feature
                                    .properties
                                    .get(*f)
                                    .and_then(|v| v.as_str())
                                    .map_or(true, |v| v.trim().is_empty())
                            })
                            .map(|f| format!("{} must not be empty", f))
                            .collect()
                    })
                    .unwrap_or_default();
                if !missing.is_empty() {
                    return Ok(error_response(missing));
                }
                let id = match req.feature.id {
                    Some(ref id) => id.clone(),
                    None => {
                        state.last_id += 1;
                        state.last_id.to_string()
                    }
                };
                let record = FeatureRecord {
                    id: Some(id.clone()),
                    is_new: false,
                    ..req.feature.clone()
                };
                if let Some(records) = state.schemas.get_mut(&schema) {
                    records.insert(id, record.clone());
                }
                json!({ "features": [record] })
            }
            Request::Delete(req) => {
                let id = req.feature.id.clone().unwrap_or_default();
                let removed = state
                    .schemas
                    .get_mut(&schema)
                    .and_then(|records| records.remove(&id));
                match removed {
                    Some(_) => json!({ "id": id }),
                    None => error_response(vec![format!("Feature `{}` not found", id)]),
                }
            }
            Request::Export(req) => json!({
                "format": req.format,
                "schema": schema,
                "data": req.feature.geometry,
            }),
        };
        Ok(response)
    }
}

fn select(state: &MemoryState, req: &SelectRequest) -> Value {
    let region = req
        .intersect_geometry
        .as_ref()
        .map(|wkt| Geometry::new(wkt).bbox());
    let features: Vec<&FeatureRecord> = state.schemas[&req.schema]
        .values()
        .filter(|record| match region {
            None => true,
            Some(None) => false,
            Some(Some(ref region)) => record
                .geometry
                .bbox()
                .map_or(false, |bbox| bbox.intersects(region)),
        })
        .take(req.max_results as usize)
        .collect();
    json!({ "features": features })
}

impl Transport for MemoryBackend {
    fn send(&self, request: Request) -> impl Future<Output = Result<Value, SyncError>> + Send {
        let response = self.handle(&request);
        async move { response }
    }
}
