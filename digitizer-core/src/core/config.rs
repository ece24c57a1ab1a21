//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use regex::Regex;
use serde::Deserialize;
use std;
use std::collections::{BTreeMap, HashMap};
use std::env;
use std::error::Error;
use std::fs::File;
use std::io::prelude::*;
use tera::{Context, Tera};
use toml::Value;

pub trait Config<'a, C: Deserialize<'a>>
where
    Self: std::marker::Sized,
{
    /// Read configuration
    fn from_config(config: &C) -> Result<Self, String>;
    /// Generate configuration template
    fn gen_config() -> String;
    /// Generate configuration template with runtime information
    fn gen_runtime_config(&self) -> String {
        Self::gen_config()
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationCfg {
    pub remote: RemoteCfg,
    pub digitizer: DigitizerCfg,
}

#[derive(Deserialize, Clone, Debug)]
pub struct RemoteCfg {
    /// Base URL of the feature service. Requests are posted to `{url}/{action}`.
    pub url: String,
    /// Request timeout in seconds
    pub timeout: Option<u64>,
}

/// Editor options which never cascade into schema settings
pub const NON_CASCADING_OPTIONS: [&str; 5] = ["schemes", "target", "create", "js_src", "disabled"];

#[derive(Deserialize, Clone, Debug)]
pub struct DigitizerCfg {
    /// Editor instance identifier
    #[serde(default = "default_editor_id")]
    pub id: String,
    /// Map element the editor is attached to
    pub target: Option<String>,
    /// Schema selected on startup
    pub schema: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    /// Raw schema tables, completed with `options` by `schema_cfgs`
    pub schemes: BTreeMap<String, Value>,
    /// Remaining editor options (defaults for every schema)
    #[serde(flatten)]
    pub options: BTreeMap<String, Value>,
}

pub fn default_editor_id() -> String {
    "digitizer".to_string()
}

#[derive(Deserialize, Clone, Debug)]
pub struct SchemaCfg {
    /// Key of the schema table
    #[serde(skip)]
    pub name: String,
    pub label: Option<String>,
    /// point, line, polygon or label
    pub geom_type: String,
    /// Spatial reference system of fetched and saved geometries
    pub srid: Option<i32>,
    pub max_results: Option<u32>,
    /// current_extent or all
    pub search_type: Option<String>,
    /// Keep features visible while the editor is disabled
    #[serde(default)]
    pub display_on_inactive: bool,
    #[serde(default = "default_true")]
    pub open_form_after_draw: bool,
    #[serde(default = "default_true")]
    pub allow_edit_data: bool,
    #[serde(default = "default_true")]
    pub allow_delete: bool,
    #[serde(default)]
    pub export_formats: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldCfg>,
    /// Style overrides by style name (default, select, unsaved, ...)
    #[serde(default)]
    pub style: BTreeMap<String, StyleCfg>,
    /// Drawing tools (default depends on geom_type)
    pub toolset: Option<Vec<String>>,
}

pub fn default_true() -> bool {
    true
}

#[derive(Deserialize, Clone, Debug)]
pub struct FieldCfg {
    pub name: String,
    pub label: Option<String>,
    #[serde(default)]
    pub required: bool,
    pub max_length: Option<usize>,
    /// Regular expression the whole value has to match
    pub pattern: Option<String>,
    /// Initial value of newly drawn features
    pub default: Option<String>,
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct StyleCfg {
    pub stroke_width: Option<f32>,
    pub stroke_color: Option<String>,
    pub stroke_opacity: Option<f32>,
    pub fill_color: Option<String>,
    pub fill_opacity: Option<f32>,
    pub point_radius: Option<f32>,
    pub label: Option<String>,
    pub font_size: Option<u32>,
    pub graphic_z_index: Option<i32>,
    pub display: Option<String>,
}

impl DigitizerCfg {
    /// Editor options inherited by schemas
    pub fn cascading_options(&self) -> BTreeMap<String, Value> {
        self.options
            .iter()
            .filter(|(key, _)| !NON_CASCADING_OPTIONS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
    /// Schema settings completed with editor defaults
    pub fn schema_cfgs(&self) -> Result<Vec<SchemaCfg>, String> {
        let defaults = self.cascading_options();
        let mut cfgs = Vec::new();
        for (name, raw) in &self.schemes {
            let mut table = match raw {
                Value::Table(table) => table.clone(),
                _ => return Err(format!("schema `{}` - expected a table", name)),
            };
            for (key, value) in &defaults {
                if !table.contains_key(key) {
                    table.insert(key.clone(), value.clone());
                }
            }
            let mut cfg = Value::Table(table)
                .try_into::<SchemaCfg>()
                .map_err(|err| format!("schema `{}` - {}", name, err))?;
            cfg.name = name.clone();
            cfgs.push(cfg);
        }
        Ok(cfgs)
    }
}

pub const DEFAULT_CONFIG: &'static str = r#"
[remote]
url = "http://127.0.0.1:8080/digitizer"

[digitizer]
id = "digitizer"
target = "map"
max_results = 1000
search_type = "current_extent"

[digitizer.schemes.poi]
label = "Points of interest"
geom_type = "point"

[[digitizer.schemes.poi.fields]]
name = "name"
required = true
"#;

/// Load and parse the config file into an config struct.
pub fn read_config<'a, T: Deserialize<'a>>(path: &str) -> Result<T, String> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(_) => {
            return Err("Could not find config file!".to_string());
        }
    };
    let mut config_toml = String::new();
    if let Err(err) = file.read_to_string(&mut config_toml) {
        return Err(format!("Error while reading config: [{}]", err));
    };

    parse_config(config_toml, path)
}

/// Parse the configuration into an config struct.
pub fn parse_config<'a, T: Deserialize<'a>>(config_toml: String, path: &str) -> Result<T, String> {
    // Check for ${var} expressions
    let re = Regex::new(r"\$\{([[:alnum:]]+)\}").map_err(|e| e.to_string())?;
    if re.is_match(&config_toml) {
        return Err(
            "Replace environment variable syntax ${VARNAME} with `{{env.VARNAME}}`".to_string(),
        );
    }

    // Parse template
    let mut tera = Tera::default();
    tera.add_raw_template(path, &config_toml)
        .map_err(|e| format!("Template error: {}", e))?;
    let mut context = Context::new();
    let mut env = HashMap::new();
    for (key, value) in env::vars() {
        env.insert(key, value);
    }
    context.insert("env", &env);
    let toml = tera.render(path, &context).map_err(|e| match e.source() {
        Some(source) => format!("Template error: {}", source),
        None => format!("Template error: {}", e),
    })?;

    toml.parse::<Value>()
        .and_then(|cfg| cfg.try_into::<T>())
        .map_err(|err| format!("{} - {}", path, err))
}
