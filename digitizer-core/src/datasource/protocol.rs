//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::error::SyncError;
use crate::core::feature::{Feature, FeatureId, FeatureRecord};
use serde_json::Value;

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
pub struct SelectRequest {
    pub schema: String,
    #[serde(rename = "maxResults")]
    pub max_results: u32,
    pub srid: i32,
    /// Query region as WKT polygon. Whole dataset if missing.
    #[serde(
        rename = "intersectGeometry",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub intersect_geometry: Option<String>,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
pub struct SaveRequest {
    pub schema: String,
    pub feature: FeatureRecord,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
pub struct DeleteRequest {
    pub schema: String,
    pub feature: FeatureRecord,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
pub struct ExportRequest {
    pub schema: String,
    pub feature: FeatureRecord,
    pub format: String,
}

/// Request to the feature service. The variant selects the endpoint.
#[derive(Serialize, PartialEq, Clone, Debug)]
#[serde(untagged)]
pub enum Request {
    Select(SelectRequest),
    Save(SaveRequest),
    Delete(DeleteRequest),
    Export(ExportRequest),
}

impl Request {
    pub fn action(&self) -> &'static str {
        match self {
            Request::Select(_) => "select",
            Request::Save(_) => "save",
            Request::Delete(_) => "delete",
            Request::Export(_) => "export",
        }
    }
    pub fn schema(&self) -> &str {
        match self {
            Request::Select(req) => &req.schema,
            Request::Save(req) => &req.schema,
            Request::Delete(req) => &req.schema,
            Request::Export(req) => &req.schema,
        }
    }
    /// Request body
    pub fn to_json(&self) -> Result<Value, SyncError> {
        serde_json::to_value(self).map_err(|e| SyncError::Transport(e.to_string()))
    }
}

/// Feature service response
#[derive(Deserialize, Debug)]
struct ResponseBody {
    #[serde(default)]
    features: Option<Vec<FeatureRecord>>,
}

/// Error entries are either plain strings or objects with a `message`
fn error_message(error: &Value) -> String {
    match error {
        Value::String(s) => s.clone(),
        Value::Object(obj) => match obj.get("message") {
            Some(Value::String(msg)) => msg.clone(),
            _ => error.to_string(),
        },
        other => other.to_string(),
    }
}

/// `Rejected` if the response carries a non-empty error list
fn check_errors(response: &Value) -> Result<(), SyncError> {
    match response.get("errors") {
        Some(Value::Array(errors)) if !errors.is_empty() => Err(SyncError::Rejected(
            errors.iter().map(error_message).collect(),
        )),
        _ => Ok(()),
    }
}

/// Features of a `select` or `save` response.
///
/// Any record which can't be converted invalidates the whole response.
pub fn parse_features(response: Value) -> Result<Vec<Feature>, SyncError> {
    check_errors(&response)?;
    let body: ResponseBody = serde_json::from_value(response)?;
    match body.features {
        Some(records) => records.into_iter().map(Feature::from_record).collect(),
        None => Err(SyncError::MalformedResponse(
            "expected `features` or `errors`".to_string(),
        )),
    }
}

/// Canonical feature returned by a `save` request
pub fn parse_saved_feature(response: Value) -> Result<Feature, SyncError> {
    parse_features(response)?
        .into_iter()
        .next()
        .ok_or_else(|| SyncError::MalformedResponse("save response without feature".to_string()))
}

/// Check the identity confirmation of a `delete` request
pub fn parse_delete_confirmation(response: Value, deleted: &FeatureId) -> Result<(), SyncError> {
    check_errors(&response)?;
    let confirmed = match response.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => {
            return Err(SyncError::MalformedResponse(
                "delete response without id".to_string(),
            ))
        }
    };
    if deleted.server_id() == Some(confirmed.as_str()) {
        Ok(())
    } else {
        Err(SyncError::MalformedResponse(format!(
            "delete confirmed `{}` instead of `{}`",
            confirmed, deleted
        )))
    }
}

/// Export payload is passed through unchanged
pub fn parse_export(response: Value) -> Result<Value, SyncError> {
    check_errors(&response)?;
    Ok(response)
}
