//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::config::{Config, FieldCfg, SchemaCfg};
use crate::core::feature::Properties;
use crate::core::geom::GeometryKind;
use crate::core::style::StyleMap;
use crate::core::toolset::{default_toolset, Tool};
use regex::Regex;
use std::str::FromStr;

pub const DEFAULT_SRID: i32 = 3857;
pub const DEFAULT_MAX_RESULTS: u32 = 1000;

/// Region queried on viewport changes
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum SearchType {
    /// Only the visible extent, fetched incrementally
    CurrentExtent,
    /// The whole dataset on every viewport change
    All,
}

impl FromStr for SearchType {
    type Err = String;

    fn from_str(s: &str) -> Result<SearchType, String> {
        match s {
            "current_extent" | "currentExtent" => Ok(SearchType::CurrentExtent),
            "all" => Ok(SearchType::All),
            _ => Err(format!("Unexpected search type '{}'", s)),
        }
    }
}

#[derive(PartialEq, Clone, Debug)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Attribute column of a schema
#[derive(Clone, Debug)]
pub struct Field {
    pub name: String,
    pub label: String,
    pub required: bool,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
    pub default: Option<String>,
}

impl Field {
    pub fn new(name: &str) -> Field {
        Field {
            name: name.to_string(),
            label: name.to_string(),
            required: false,
            max_length: None,
            pattern: None,
            default: None,
        }
    }
    pub fn validate(&self, value: Option<&String>) -> Option<FieldError> {
        let value = value.map(|v| v.trim()).unwrap_or("");
        let message = if value.is_empty() {
            if self.required {
                Some(format!("{} is required", self.label))
            } else {
                None
            }
        } else if self.max_length.map_or(false, |max| value.chars().count() > max) {
            Some(format!(
                "{} is longer than {} characters",
                self.label,
                self.max_length.unwrap_or(0)
            ))
        } else if self.pattern.as_ref().map_or(false, |re| !re.is_match(value)) {
            Some(format!("{} has an invalid format", self.label))
        } else {
            None
        };
        message.map(|message| FieldError {
            field: self.name.clone(),
            message,
        })
    }
}

impl<'a> Config<'a, FieldCfg> for Field {
    fn from_config(cfg: &FieldCfg) -> Result<Self, String> {
        let pattern = match cfg.pattern {
            // Match whole value
            Some(ref pattern) => Some(
                Regex::new(&format!("^(?:{})$", pattern))
                    .map_err(|e| format!("field `{}` - invalid pattern: {}", cfg.name, e))?,
            ),
            None => None,
        };
        Ok(Field {
            name: cfg.name.clone(),
            label: cfg.label.clone().unwrap_or(cfg.name.clone()),
            required: cfg.required,
            max_length: cfg.max_length,
            pattern,
            default: cfg.default.clone(),
        })
    }
    fn gen_config() -> String {
        let toml = r#"
[[digitizer.schemes.poi.fields]]
name = "name"
label = "Name"
required = true
#max_length = 80
#pattern = "[A-Z].*"
#default = ""
"#;
        toml.to_string()
    }
}

/// Settings of a feature type
#[derive(Clone, Debug)]
pub struct SchemaSettings {
    pub name: String,
    pub label: String,
    pub geometry_kind: GeometryKind,
    pub srid: i32,
    pub max_results: u32,
    pub search_type: SearchType,
    pub display_on_inactive: bool,
    pub open_form_after_draw: bool,
    pub allow_edit_data: bool,
    pub allow_delete: bool,
    pub export_formats: Vec<String>,
    pub fields: Vec<Field>,
    pub styles: StyleMap,
    pub toolset: Vec<Tool>,
}

impl SchemaSettings {
    pub fn new(name: &str, geometry_kind: GeometryKind) -> SchemaSettings {
        SchemaSettings {
            name: name.to_string(),
            label: name.to_string(),
            geometry_kind,
            srid: DEFAULT_SRID,
            max_results: DEFAULT_MAX_RESULTS,
            search_type: SearchType::CurrentExtent,
            display_on_inactive: false,
            open_form_after_draw: true,
            allow_edit_data: true,
            allow_delete: true,
            export_formats: Vec::new(),
            fields: Vec::new(),
            styles: StyleMap::default(),
            toolset: default_toolset(geometry_kind).unwrap_or_default(),
        }
    }
    /// Client-side validation of all fields
    pub fn validate(&self, properties: &Properties) -> Vec<FieldError> {
        self.fields
            .iter()
            .filter_map(|field| field.validate(properties.get(&field.name)))
            .collect()
    }
    /// Initial properties of a newly drawn feature
    pub fn default_properties(&self) -> Properties {
        self.fields
            .iter()
            .map(|field| {
                (
                    field.name.clone(),
                    field.default.clone().unwrap_or_default(),
                )
            })
            .collect()
    }
    pub fn supports_export(&self, format: &str) -> bool {
        self.export_formats.iter().any(|f| f == format)
    }
}

impl<'a> Config<'a, SchemaCfg> for SchemaSettings {
    fn from_config(cfg: &SchemaCfg) -> Result<Self, String> {
        let geometry_kind = GeometryKind::from_str(&cfg.geom_type)?;
        if geometry_kind == GeometryKind::All {
            return Err(format!(
                "schema `{}` - geometry type 'all' is reserved",
                cfg.name
            ));
        }
        let search_type = match cfg.search_type {
            Some(ref search_type) => SearchType::from_str(search_type)?,
            None => SearchType::CurrentExtent,
        };
        let fields = cfg
            .fields
            .iter()
            .map(Field::from_config)
            .collect::<Result<Vec<_>, _>>()?;
        let toolset = match cfg.toolset {
            Some(ref tools) => tools
                .iter()
                .map(|t| Tool::from_str(t))
                .collect::<Result<Vec<_>, _>>()?,
            None => default_toolset(geometry_kind).unwrap_or_default(),
        };
        Ok(SchemaSettings {
            name: cfg.name.clone(),
            label: cfg.label.clone().unwrap_or(cfg.name.clone()),
            geometry_kind,
            srid: cfg.srid.unwrap_or(DEFAULT_SRID),
            max_results: cfg.max_results.unwrap_or(DEFAULT_MAX_RESULTS),
            search_type,
            display_on_inactive: cfg.display_on_inactive,
            open_form_after_draw: cfg.open_form_after_draw,
            allow_edit_data: cfg.allow_edit_data,
            allow_delete: cfg.allow_delete,
            export_formats: cfg.export_formats.clone(),
            fields,
            styles: StyleMap::from_config(&cfg.style)?,
            toolset,
        })
    }

    fn gen_config() -> String {
        let toml = r#"
[digitizer.schemes.poi]
label = "Points of interest"
geom_type = "point"
#srid = 3857
#max_results = 1000
#search_type = "current_extent"
#display_on_inactive = false
#open_form_after_draw = true
#allow_edit_data = true
#allow_delete = true
#export_formats = ["kml", "gpx"]
#toolset = ["drawPoint", "moveFeature"]
"#;
        let mut config = toml.to_string();
        config.push_str(&Field::gen_config());
        config.push_str(&StyleMap::gen_config());
        config
    }

    fn gen_runtime_config(&self) -> String {
        let mut lines = vec![format!("\n[digitizer.schemes.{}]", self.name)];
        lines.push(format!(r#"label = "{}""#, self.label));
        lines.push(format!(r#"geom_type = "{}""#, self.geometry_kind));
        lines.push(format!("srid = {}", self.srid));
        lines.push(format!("max_results = {}", self.max_results));
        lines.push(format!(
            r#"search_type = "{}""#,
            match self.search_type {
                SearchType::CurrentExtent => "current_extent",
                SearchType::All => "all",
            }
        ));
        if self.display_on_inactive {
            lines.push("display_on_inactive = true".to_string());
        }
        if !self.export_formats.is_empty() {
            lines.push(format!(r#"export_formats = ["{}"]"#, self.export_formats.join(r#"", ""#)));
        }
        lines.push(format!(
            "toolset = [{}]",
            self.toolset
                .iter()
                .map(|t| format!(r#""{}""#, t))
                .collect::<Vec<_>>()
                .join(", ")
        ));
        for field in &self.fields {
            lines.push(format!("\n[[digitizer.schemes.{}.fields]]", self.name));
            lines.push(format!(r#"name = "{}""#, field.name));
            if field.required {
                lines.push("required = true".to_string());
            }
        }
        lines.join("\n") + "\n"
    }
}
