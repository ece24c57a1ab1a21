//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::config::{Config, SchemaCfg};
use crate::core::feature::Properties;
use crate::core::geom::GeometryKind;
use crate::core::schema::{FieldError, SchemaSettings, SearchType};
use crate::core::style::FeatureStyle;
use crate::core::toolset::Tool;

fn schema_from_config(toml: &str) -> Result<SchemaSettings, String> {
    use crate::core::parse_config;

    let mut cfg: SchemaCfg = parse_config(toml.to_string(), "")?;
    cfg.name = "poi".to_string();
    SchemaSettings::from_config(&cfg)
}

const SCHEMA: &str = r##"
    #[digitizer.schemes.poi]
    label = "Points of interest"
    geom_type = "point"
    srid = 2056
    max_results = 20
    search_type = "all"
    export_formats = ["kml"]

    [[fields]]
    name = "name"
    label = "Name"
    required = true
    max_length = 5

    [[fields]]
    name = "code"
    pattern = "[A-Z]{2}[0-9]+"
    default = "CH1"

    [style.default]
    fill_color = "#000000"
    "##;

#[test]
fn test_schema_config() {
    let schema = schema_from_config(SCHEMA).unwrap();
    assert_eq!(schema.name, "poi");
    assert_eq!(schema.label, "Points of interest");
    assert_eq!(schema.geometry_kind, GeometryKind::Point);
    assert_eq!(schema.srid, 2056);
    assert_eq!(schema.max_results, 20);
    assert_eq!(schema.search_type, SearchType::All);
    assert!(schema.open_form_after_draw);
    assert!(schema.allow_delete);
    assert!(!schema.display_on_inactive);
    assert!(schema.supports_export("kml"));
    assert!(!schema.supports_export("gpx"));
    assert_eq!(schema.fields.len(), 2);
    assert_eq!(schema.fields[1].label, "code");
    assert_eq!(schema.toolset[0], Tool::DrawPoint);
    assert_eq!(
        schema.styles.get(FeatureStyle::Default).unwrap().fill_color,
        Some("#000000".to_string())
    );
}

#[test]
fn test_schema_defaults() {
    let schema = schema_from_config(r#"geom_type = "polygon""#).unwrap();
    assert_eq!(schema.label, "poi");
    assert_eq!(schema.srid, 3857);
    assert_eq!(schema.max_results, 1000);
    assert_eq!(schema.search_type, SearchType::CurrentExtent);
    assert_eq!(schema.toolset.len(), 9);
    assert!(schema.fields.is_empty());
}

#[test]
fn test_schema_config_errors() {
    assert_eq!(
        schema_from_config(r#"geom_type = "circle""#).err(),
        Some("Unexpected geometry type 'circle'".to_string())
    );
    assert_eq!(
        schema_from_config(r#"geom_type = "all""#).err(),
        Some("schema `poi` - geometry type 'all' is reserved".to_string())
    );
    assert_eq!(
        schema_from_config(
            r#"
            geom_type = "point"
            search_type = "visible"
            "#
        )
        .err(),
        Some("Unexpected search type 'visible'".to_string())
    );
    assert_eq!(
        schema_from_config(
            r#"
            geom_type = "point"
            toolset = ["drawStar"]
            "#
        )
        .err(),
        Some("Unknown tool 'drawStar'".to_string())
    );
    let err = schema_from_config(
        r#"
        geom_type = "point"
        [[fields]]
        name = "code"
        pattern = "[A-Z"
        "#,
    )
    .err()
    .unwrap();
    assert!(err.starts_with("field `code` - invalid pattern"));
}

#[test]
fn test_validation() {
    let schema = schema_from_config(SCHEMA).unwrap();
    let defaults = schema.default_properties();
    assert_eq!(defaults["name"], "");
    assert_eq!(defaults["code"], "CH1");

    // Missing required value
    assert_eq!(
        schema.validate(&defaults),
        vec![FieldError {
            field: "name".to_string(),
            message: "Name is required".to_string(),
        }]
    );

    let mut props = Properties::new();
    props.insert("name".to_string(), "Bern".to_string());
    props.insert("code".to_string(), "CH42".to_string());
    assert!(schema.validate(&props).is_empty());

    props.insert("name".to_string(), "Zurich".to_string());
    props.insert("code".to_string(), "xCH42".to_string());
    let errors = schema.validate(&props);
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].message, "Name is longer than 5 characters");
    assert_eq!(errors[1].message, "code has an invalid format");

    // Optional fields may stay empty
    props.insert("name".to_string(), "Thun".to_string());
    props.remove("code");
    assert!(schema.validate(&props).is_empty());
}
