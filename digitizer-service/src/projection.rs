//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Map, table and editor UI collaborators

use digitizer_core::core::feature::{Feature, FeatureId};
use digitizer_core::core::schema::FieldError;
use digitizer_core::core::style::{FeatureStyle, StyleMap};
use digitizer_core::core::toolset::Tool;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

/// Rendered feature layers, one per schema
pub trait MapView {
    /// Show the layer of a schema, rendered with `styles` and edited with `toolset`
    fn show_layer(&mut self, schema: &str, styles: &StyleMap, toolset: &[Tool]);
    fn hide_layer(&mut self, schema: &str);
    fn add_features(&mut self, schema: &str, features: &[Feature], style: FeatureStyle);
    /// Replace `previous` by `feature`, which may carry a new id
    fn replace_feature(
        &mut self,
        schema: &str,
        previous: &FeatureId,
        feature: &Feature,
        style: FeatureStyle,
    );
    fn remove_feature(&mut self, schema: &str, id: &FeatureId);
    fn set_style(&mut self, schema: &str, id: &FeatureId, style: FeatureStyle);
    /// Hit test at map coordinates
    fn feature_at(&self, x: f64, y: f64) -> Option<(String, FeatureId)>;
}

/// Tabular view of the features of a schema
pub trait FeatureTable {
    fn show(&mut self, schema: &str);
    fn hide(&mut self, schema: &str);
    fn add_rows(&mut self, schema: &str, features: &[Feature]);
    fn replace_row(&mut self, schema: &str, previous: &FeatureId, feature: &Feature);
    fn remove_row(&mut self, schema: &str, id: &FeatureId);
    fn redraw(&mut self, schema: &str);
}

/// Forms, dialogs and notifications
pub trait EditorUi {
    fn open_form(&mut self, schema: &str, feature: &Feature);
    fn close_form(&mut self);
    /// Lock the open form while its save is in flight
    fn disable_form(&mut self);
    /// Allow editing the open form again after a failed save
    fn enable_form(&mut self);
    fn show_field_errors(&mut self, errors: &[FieldError]);
    fn show_errors(&mut self, messages: &[String]);
    fn notify(&mut self, message: &str);
    /// Ask the user to confirm deleting a persisted feature
    fn confirm_delete(&mut self, schema: &str, feature: &Feature);
    fn deliver_export(&mut self, schema: &str, id: &FeatureId, format: &str, payload: &Value);
}

/// Calls on all recording collaborators in order
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn new() -> Journal {
        Journal::default()
    }
    pub fn record(&self, entry: String) {
        debug!("{}", entry);
        match self.0.lock() {
            Ok(mut entries) => entries.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
    pub fn entries(&self) -> Vec<String> {
        match self.0.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
    /// Position of the first entry equal to `entry`
    pub fn position(&self, entry: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == entry)
    }
    pub fn clear(&self) {
        match self.0.lock() {
            Ok(mut entries) => entries.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

/// Map layers kept in memory
#[derive(Default)]
pub struct MemoryMap {
    layers: BTreeMap<String, BTreeMap<FeatureId, (Feature, FeatureStyle)>>,
    visible: BTreeSet<String>,
    styles: BTreeMap<String, StyleMap>,
    toolsets: BTreeMap<String, Vec<Tool>>,
    journal: Journal,
}

impl MemoryMap {
    pub fn new(journal: Journal) -> MemoryMap {
        MemoryMap {
            journal,
            ..Default::default()
        }
    }
    pub fn feature(&self, schema: &str, id: &FeatureId) -> Option<&Feature> {
        self.layers
            .get(schema)
            .and_then(|layer| layer.get(id))
            .map(|(feature, _)| feature)
    }
    pub fn style(&self, schema: &str, id: &FeatureId) -> Option<FeatureStyle> {
        self.layers
            .get(schema)
            .and_then(|layer| layer.get(id))
            .map(|(_, style)| *style)
    }
    pub fn len(&self, schema: &str) -> usize {
        self.layers.get(schema).map_or(0, |layer| layer.len())
    }
    pub fn is_visible(&self, schema: &str) -> bool {
        self.visible.contains(schema)
    }
    /// Styles of the last shown layer of a schema
    pub fn styles(&self, schema: &str) -> Option<&StyleMap> {
        self.styles.get(schema)
    }
    pub fn toolset(&self, schema: &str) -> Option<&[Tool]> {
        self.toolsets.get(schema).map(|tools| tools.as_slice())
    }
}

impl MapView for MemoryMap {
    fn show_layer(&mut self, schema: &str, styles: &StyleMap, toolset: &[Tool]) {
        self.journal.record(format!("map show {}", schema));
        self.visible.insert(schema.to_string());
        self.styles.insert(schema.to_string(), styles.clone());
        self.toolsets.insert(schema.to_string(), toolset.to_vec());
    }
    fn hide_layer(&mut self, schema: &str) {
        self.journal.record(format!("map hide {}", schema));
        self.visible.remove(schema);
    }
    fn add_features(&mut self, schema: &str, features: &[Feature], style: FeatureStyle) {
        self.journal
            .record(format!("map add {} {}", schema, features.len()));
        let layer = self.layers.entry(schema.to_string()).or_default();
        for feature in features {
            layer.insert(feature.id.clone(), (feature.clone(), style));
        }
    }
    fn replace_feature(
        &mut self,
        schema: &str,
        previous: &FeatureId,
        feature: &Feature,
        style: FeatureStyle,
    ) {
        self.journal
            .record(format!("map replace {} {} {}", schema, previous, feature.id));
        let layer = self.layers.entry(schema.to_string()).or_default();
        layer.remove(previous);
        layer.insert(feature.id.clone(), (feature.clone(), style));
    }
    fn remove_feature(&mut self, schema: &str, id: &FeatureId) {
        self.journal.record(format!("map remove {} {}", schema, id));
        if let Some(layer) = self.layers.get_mut(schema) {
            layer.remove(id);
        }
    }
    fn set_style(&mut self, schema: &str, id: &FeatureId, style: FeatureStyle) {
        if let Some((_, current)) = self.layers.get_mut(schema).and_then(|l| l.get_mut(id)) {
            *current = style;
        }
    }
    fn feature_at(&self, x: f64, y: f64) -> Option<(String, FeatureId)> {
        self.layers
            .iter()
            .filter(|(schema, _)| self.visible.contains(*schema))
            .flat_map(|(schema, layer)| layer.values().map(move |(f, _)| (schema, f)))
            .find(|(_, feature)| {
                feature
                    .geometry
                    .bbox()
                    .map_or(false, |bbox| bbox.contains_point(x, y))
            })
            .map(|(schema, feature)| (schema.clone(), feature.id.clone()))
    }
}

/// Table rows kept in memory
#[derive(Default)]
pub struct MemoryTable {
    rows: BTreeMap<String, BTreeMap<FeatureId, Feature>>,
    visible: BTreeSet<String>,
    redraws: usize,
    journal: Journal,
}

impl MemoryTable {
    pub fn new(journal: Journal) -> MemoryTable {
        MemoryTable {
            journal,
            ..Default::default()
        }
    }
    pub fn row(&self, schema: &str, id: &FeatureId) -> Option<&Feature> {
        self.rows.get(schema).and_then(|rows| rows.get(id))
    }
    pub fn len(&self, schema: &str) -> usize {
        self.rows.get(schema).map_or(0, |rows| rows.len())
    }
    pub fn is_visible(&self, schema: &str) -> bool {
        self.visible.contains(schema)
    }
    pub fn redraws(&self) -> usize {
        self.redraws
    }
}

impl FeatureTable for MemoryTable {
    fn show(&mut self, schema: &str) {
        self.journal.record(format!("table show {}", schema));
        self.visible.insert(schema.to_string());
    }
    fn hide(&mut self, schema: &str) {
        self.journal.record(format!("table hide {}", schema));
        self.visible.remove(schema);
    }
    fn add_rows(&mut self, schema: &str, features: &[Feature]) {
        self.journal
            .record(format!("table add {} {}", schema, features.len()));
        let rows = self.rows.entry(schema.to_string()).or_default();
        for feature in features {
            rows.insert(feature.id.clone(), feature.clone());
        }
    }
    fn replace_row(&mut self, schema: &str, previous: &FeatureId, feature: &Feature) {
        let rows = self.rows.entry(schema.to_string()).or_default();
        rows.remove(previous);
        rows.insert(feature.id.clone(), feature.clone());
    }
    fn remove_row(&mut self, schema: &str, id: &FeatureId) {
        if let Some(rows) = self.rows.get_mut(schema) {
            rows.remove(id);
        }
    }
    fn redraw(&mut self, _schema: &str) {
        self.redraws += 1;
    }
}

/// Editor UI state kept in memory
#[derive(Default)]
pub struct MemoryEditorUi {
    /// Schema and feature of the open form
    pub form: Option<(String, FeatureId)>,
    pub form_enabled: bool,
    pub field_errors: Vec<FieldError>,
    pub errors: Vec<String>,
    pub notifications: Vec<String>,
    pub confirmations: Vec<FeatureId>,
    pub exports: Vec<(FeatureId, String, Value)>,
    journal: Journal,
}

impl MemoryEditorUi {
    pub fn new(journal: Journal) -> MemoryEditorUi {
        MemoryEditorUi {
            journal,
            ..Default::default()
        }
    }
}

impl EditorUi for MemoryEditorUi {
    fn open_form(&mut self, schema: &str, feature: &Feature) {
        self.journal
            .record(format!("form open {} {}", schema, feature.id));
        self.form = Some((schema.to_string(), feature.id.clone()));
        self.form_enabled = true;
    }
    fn close_form(&mut self) {
        if self.form.is_some() {
            self.journal.record("form close".to_string());
        }
        self.form = None;
    }
    fn disable_form(&mut self) {
        if self.form.is_some() {
            self.journal.record("form disable".to_string());
        }
        self.form_enabled = false;
    }
    fn enable_form(&mut self) {
        if self.form.is_some() {
            self.journal.record("form enable".to_string());
        }
        self.form_enabled = true;
    }
    fn show_field_errors(&mut self, errors: &[FieldError]) {
        self.field_errors = errors.to_vec();
    }
    fn show_errors(&mut self, messages: &[String]) {
        self.errors.extend_from_slice(messages);
    }
    fn notify(&mut self, message: &str) {
        self.notifications.push(message.to_string());
    }
    fn confirm_delete(&mut self, _schema: &str, feature: &Feature) {
        self.confirmations.push(feature.id.clone());
    }
    fn deliver_export(&mut self, _schema: &str, id: &FeatureId, format: &str, payload: &Value) {
        self.exports
            .push((id.clone(), format.to_string(), payload.clone()));
    }
}
