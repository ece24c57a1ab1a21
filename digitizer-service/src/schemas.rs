//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use digitizer_core::core::config::ApplicationCfg;
use digitizer_core::core::error::SyncError;
use digitizer_core::core::geom::GeometryKind;
use digitizer_core::core::schema::SchemaSettings;
use digitizer_core::core::Config;
use digitizer_core::store::FeatureStore;
use viewport_diff::ViewportTracker;

/// Name of the synthesized schema covering all configured schemas
pub const AGGREGATE_SCHEMA: &str = "all";
const AGGREGATE_LABEL: &str = "all geometries";

/// Editable feature type with its loaded features
pub struct FeatureSchema {
    pub settings: SchemaSettings,
    pub store: FeatureStore,
    /// Last viewport queried
    pub tracker: ViewportTracker,
}

impl FeatureSchema {
    pub fn new(settings: SchemaSettings) -> FeatureSchema {
        FeatureSchema {
            settings,
            store: FeatureStore::new(),
            tracker: ViewportTracker::new(),
        }
    }
}

pub enum Schema {
    Feature(FeatureSchema),
    /// Read-only view of all feature schemas
    Aggregate { label: String, members: Vec<String> },
}

impl Schema {
    pub fn name(&self) -> &str {
        match self {
            Schema::Feature(schema) => &schema.settings.name,
            Schema::Aggregate { .. } => AGGREGATE_SCHEMA,
        }
    }
    pub fn label(&self) -> &str {
        match self {
            Schema::Feature(schema) => &schema.settings.label,
            Schema::Aggregate { label, .. } => label,
        }
    }
    pub fn geometry_kind(&self) -> GeometryKind {
        match self {
            Schema::Feature(schema) => schema.settings.geometry_kind,
            Schema::Aggregate { .. } => GeometryKind::All,
        }
    }
    pub fn is_read_only(&self) -> bool {
        match self {
            Schema::Feature(_) => false,
            Schema::Aggregate { .. } => true,
        }
    }
    /// Keep projections visible while the editor is disabled
    pub fn display_on_inactive(&self) -> bool {
        match self {
            Schema::Feature(schema) => schema.settings.display_on_inactive,
            Schema::Aggregate { .. } => false,
        }
    }
    /// Feature schemas queried and shown for this schema
    pub fn members(&self) -> Vec<String> {
        match self {
            Schema::Feature(schema) => vec![schema.settings.name.clone()],
            Schema::Aggregate { members, .. } => members.clone(),
        }
    }
}

pub struct SchemaRegistry {
    schemas: Vec<Schema>,
}

impl SchemaRegistry {
    /// Registry with one schema per settings entry.
    /// An aggregate schema is added if more than one schema is configured.
    pub fn new(settings: Vec<SchemaSettings>) -> Result<SchemaRegistry, String> {
        let mut schemas: Vec<Schema> = Vec::new();
        for s in settings {
            if s.name == AGGREGATE_SCHEMA {
                return Err(format!("schema name `{}` is reserved", AGGREGATE_SCHEMA));
            }
            if schemas.iter().any(|schema| schema.name() == s.name) {
                return Err(format!("duplicate schema `{}`", s.name));
            }
            schemas.push(Schema::Feature(FeatureSchema::new(s)));
        }
        if schemas.len() > 1 {
            let members = schemas.iter().map(|s| s.name().to_string()).collect();
            schemas.push(Schema::Aggregate {
                label: AGGREGATE_LABEL.to_string(),
                members,
            });
        }
        Ok(SchemaRegistry { schemas })
    }
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.iter().find(|s| s.name() == name)
    }
    /// Schema by name or `UnknownSchema`
    pub fn schema(&self, name: &str) -> Result<&Schema, SyncError> {
        self.get(name)
            .ok_or_else(|| SyncError::UnknownSchema(name.to_string()))
    }
    /// Editable schema by name. The aggregate schema is read-only.
    pub fn feature_schema(&self, name: &str) -> Result<&FeatureSchema, SyncError> {
        match self.schema(name)? {
            Schema::Feature(schema) => Ok(schema),
            Schema::Aggregate { .. } => Err(SyncError::ReadOnlySchema(name.to_string())),
        }
    }
    pub fn feature_schema_mut(&mut self, name: &str) -> Result<&mut FeatureSchema, SyncError> {
        match self.schemas.iter_mut().find(|s| s.name() == name) {
            Some(Schema::Feature(schema)) => Ok(schema),
            Some(Schema::Aggregate { .. }) => Err(SyncError::ReadOnlySchema(name.to_string())),
            None => Err(SyncError::UnknownSchema(name.to_string())),
        }
    }
    /// Last configured schema with geometry kind `kind`
    pub fn by_geometry_kind(&self, kind: GeometryKind) -> Option<&Schema> {
        let schema = self.schemas.iter().rev().find(|s| s.geometry_kind() == kind);
        if schema.is_none() {
            warn!("No schema found for geometry type {}", kind);
        }
        schema
    }
    pub fn names(&self) -> Vec<&str> {
        self.schemas.iter().map(|s| s.name()).collect()
    }
    pub fn feature_schemas(&self) -> impl Iterator<Item = &FeatureSchema> {
        self.schemas.iter().filter_map(|s| match s {
            Schema::Feature(schema) => Some(schema),
            Schema::Aggregate { .. } => None,
        })
    }
    /// Title shown instead of a schema selector with only one schema
    pub fn title(&self) -> Option<&str> {
        match self.schemas.as_slice() {
            [schema] => Some(schema.label()),
            _ => None,
        }
    }
    pub fn len(&self) -> usize {
        self.schemas.len()
    }
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl<'a> Config<'a, ApplicationCfg> for SchemaRegistry {
    fn from_config(config: &ApplicationCfg) -> Result<Self, String> {
        let cfgs = config.digitizer.schema_cfgs()?;
        if cfgs.is_empty() {
            return Err("No schema configured".to_string());
        }
        let settings = cfgs
            .iter()
            .map(SchemaSettings::from_config)
            .collect::<Result<Vec<_>, _>>()?;
        SchemaRegistry::new(settings)
    }
    fn gen_config() -> String {
        SchemaSettings::gen_config()
    }
    fn gen_runtime_config(&self) -> String {
        self.feature_schemas()
            .map(|schema| schema.settings.gen_runtime_config())
            .collect()
    }
}

#[cfg(test)]
fn registry_from_config(toml: &str) -> Result<SchemaRegistry, String> {
    use digitizer_core::core::parse_config;

    let config: ApplicationCfg = parse_config(toml.to_string(), "")?;
    SchemaRegistry::from_config(&config)
}

#[test]
fn test_registry_with_aggregate() {
    let registry = registry_from_config(
        r#"
        [remote]
        url = "http://localhost/digitizer"

        [digitizer]
        max_results = 50
        target = "map"

        [digitizer.schemes.poi]
        geom_type = "point"

        [digitizer.schemes.roads]
        label = "Roads"
        geom_type = "line"
        max_results = 10
        "#,
    )
    .unwrap();
    assert_eq!(registry.names(), vec!["poi", "roads", "all"]);
    assert_eq!(registry.title(), None);

    let poi = registry.feature_schema("poi").unwrap();
    assert_eq!(poi.settings.max_results, 50);
    let roads = registry.feature_schema("roads").unwrap();
    assert_eq!(roads.settings.max_results, 10);

    let all = registry.get("all").unwrap();
    assert!(all.is_read_only());
    assert_eq!(all.label(), "all geometries");
    assert_eq!(all.members(), vec!["poi", "roads"]);
    assert_eq!(
        registry.feature_schema("all").err(),
        Some(SyncError::ReadOnlySchema("all".to_string()))
    );
    assert_eq!(
        registry.feature_schema("rivers").err(),
        Some(SyncError::UnknownSchema("rivers".to_string()))
    );

    assert_eq!(
        registry.by_geometry_kind(GeometryKind::Line).map(|s| s.name()),
        Some("roads")
    );
    assert_eq!(
        registry.by_geometry_kind(GeometryKind::All).map(|s| s.name()),
        Some("all")
    );
    assert!(registry.by_geometry_kind(GeometryKind::Polygon).is_none());

    let runtime_config = registry.gen_runtime_config();
    assert!(runtime_config.contains("[digitizer.schemes.roads]"));
    assert!(!runtime_config.contains("[digitizer.schemes.all]"));
}

#[test]
fn test_single_schema_title() {
    let registry = registry_from_config(
        r#"
        [remote]
        url = "http://localhost/digitizer"

        [digitizer.schemes.parcels]
        label = "Parcels"
        geom_type = "polygon"
        "#,
    )
    .unwrap();
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.title(), Some("Parcels"));
    assert!(registry.get("all").is_none());
}

#[test]
fn test_registry_errors() {
    let err = registry_from_config(
        r#"
        [remote]
        url = "http://localhost/digitizer"

        [digitizer.schemes.all]
        geom_type = "point"
        "#,
    )
    .err();
    assert_eq!(err, Some("schema name `all` is reserved".to_string()));

    let err = registry_from_config(
        r#"
        [remote]
        url = "http://localhost/digitizer"

        [digitizer.schemes]
        "#,
    )
    .err();
    assert_eq!(err, Some("No schema configured".to_string()));
}
