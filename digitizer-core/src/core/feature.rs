//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::error::SyncError;
use crate::core::geom::Geometry;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Feature identity
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Debug)]
pub enum FeatureId {
    /// Id assigned by the feature service
    Persisted(String),
    /// Local id of a feature not saved yet
    Transient(u64),
}

impl FeatureId {
    pub fn is_new(&self) -> bool {
        match self {
            FeatureId::Transient(_) => true,
            FeatureId::Persisted(_) => false,
        }
    }
    pub fn server_id(&self) -> Option<&str> {
        match self {
            FeatureId::Persisted(id) => Some(id),
            FeatureId::Transient(_) => None,
        }
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FeatureId::Persisted(id) => write!(f, "{}", id),
            FeatureId::Transient(id) => write!(f, "new-{}", id),
        }
    }
}

/// Feature attribute values by property name
pub type Properties = BTreeMap<String, String>;

#[derive(PartialEq, Clone, Debug)]
pub struct Feature {
    pub id: FeatureId,
    pub properties: Properties,
    pub geometry: Geometry,
    /// Spatial reference system (EPSG code)
    pub srid: Option<i32>,
}

impl Feature {
    pub fn new(id: FeatureId, geometry: Geometry) -> Feature {
        Feature {
            id,
            properties: Properties::new(),
            geometry,
            srid: None,
        }
    }
    pub fn is_new(&self) -> bool {
        self.id.is_new()
    }
    /// Wire representation. Transient ids are never sent.
    pub fn to_record(&self) -> FeatureRecord {
        FeatureRecord {
            id: self.id.server_id().map(|id| id.to_string()),
            is_new: self.is_new(),
            properties: self
                .properties
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
            geometry: self.geometry.clone(),
            srid: self.srid,
            type_: "Feature".to_string(),
        }
    }
    /// Feature from a service response. Records without id are rejected.
    pub fn from_record(record: FeatureRecord) -> Result<Feature, SyncError> {
        let id = match record.id {
            Some(id) if !record.is_new => FeatureId::Persisted(id),
            _ => {
                return Err(SyncError::MalformedResponse(
                    "feature without id in response".to_string(),
                ))
            }
        };
        let properties = record
            .properties
            .into_iter()
            .map(|(k, v)| (k, property_string(v)))
            .collect();
        Ok(Feature {
            id,
            properties,
            geometry: record.geometry,
            srid: record.srid,
        })
    }
}

fn property_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => "".to_string(),
        other => other.to_string(),
    }
}

/// Feature as exchanged with the feature service
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
pub struct FeatureRecord {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_id"
    )]
    pub id: Option<String>,
    #[serde(rename = "isNew", default, skip_serializing_if = "is_false")]
    pub is_new: bool,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
    #[serde(default)]
    pub geometry: Geometry,
    #[serde(default)]
    pub srid: Option<i32>,
    #[serde(rename = "type", default = "feature_type")]
    pub type_: String,
}

fn is_false(b: &bool) -> bool {
    !*b
}

fn feature_type() -> String {
    "Feature".to_string()
}

/// Numeric and string ids are both accepted
fn deserialize_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    use serde::Deserialize;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!("invalid feature id {}", other))),
    }
}

#[test]
fn test_record_conversion() {
    let record: FeatureRecord = serde_json::from_value(json!({
        "id": 42,
        "properties": {"name": "Bern", "population": 133115, "note": null},
        "geometry": "POINT(7.44 46.95)",
        "srid": 4326,
        "type": "Feature"
    }))
    .unwrap();
    assert_eq!(record.id, Some("42".to_string()));
    let feature = Feature::from_record(record).unwrap();
    assert_eq!(feature.id, FeatureId::Persisted("42".to_string()));
    assert_eq!(feature.properties["name"], "Bern");
    assert_eq!(feature.properties["population"], "133115");
    assert_eq!(feature.properties["note"], "");
    assert_eq!(feature.srid, Some(4326));

    let record = feature.to_record();
    assert_eq!(
        serde_json::to_value(&record).unwrap(),
        json!({
            "id": "42",
            "properties": {"name": "Bern", "note": "", "population": "133115"},
            "geometry": "POINT(7.44 46.95)",
            "srid": 4326,
            "type": "Feature"
        })
    );
}

#[test]
fn test_transient_record() {
    let feature = Feature::new(FeatureId::Transient(7), Geometry::new("POINT(1 2)"));
    assert_eq!(feature.id.to_string(), "new-7");
    let record = feature.to_record();
    assert_eq!(record.id, None);
    assert!(record.is_new);
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["isNew"], json!(true));
    assert!(json.get("id").is_none());
    // Transient records are never accepted from the service
    assert!(Feature::from_record(record).is_err());
}
