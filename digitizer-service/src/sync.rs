//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::activation::{ActivationController, ActivationEffect};
use crate::projection::{EditorUi, FeatureTable, MapView};
use crate::schemas::{FeatureSchema, SchemaRegistry};
use digitizer_core::core::error::{SyncError, SyncResult};
use digitizer_core::core::feature::{Feature, FeatureId, Properties};
use digitizer_core::core::geom::Geometry;
use digitizer_core::core::schema::SearchType;
use digitizer_core::core::stats::Statistics;
use digitizer_core::core::style::FeatureStyle;
use digitizer_core::datasource::protocol::{
    parse_delete_confirmation, parse_export, parse_features, parse_saved_feature,
};
use digitizer_core::datasource::{DeleteRequest, ExportRequest, Request, SaveRequest, SelectRequest};
use digitizer_core::store::FeatureState;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use viewport_diff::{Edge, Extent};

pub type RequestId = u64;

/// Request to be sent to the feature service
#[derive(PartialEq, Clone, Debug)]
pub struct Outgoing {
    pub id: RequestId,
    pub request: Request,
}

#[derive(Debug)]
enum Pending {
    Select {
        schema: String,
        /// Viewport edge of a strip query, `None` for a query of all features
        edge: Option<Edge>,
        issued: Instant,
    },
    Save {
        schema: String,
        previous: FeatureId,
    },
    Delete {
        schema: String,
        id: FeatureId,
    },
    Export {
        schema: String,
        id: FeatureId,
        format: String,
    },
}

#[derive(Debug)]
struct PendingRequest {
    pending: Pending,
    /// Activation epoch at issue time
    epoch: u64,
}

/// Outcome of a delete request
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum DeleteOutcome {
    /// Transient feature removed locally
    Removed,
    /// Persisted feature, waiting for user confirmation
    ConfirmationRequired,
}

/// Drives fetching, merging and editing of features.
///
/// The coordinator does no I/O. Operations return the requests to send,
/// responses are passed back to `complete` in any order, one at a time.
pub struct SyncCoordinator<M, T, U> {
    schemas: SchemaRegistry,
    activation: ActivationController,
    map: M,
    table: T,
    ui: U,
    /// Last reported viewport
    viewport: Option<Extent>,
    pending: HashMap<RequestId, PendingRequest>,
    last_request: RequestId,
    hovered: Option<(String, FeatureId)>,
    /// Features with a save in flight
    saving: HashSet<(String, FeatureId)>,
    stats: Statistics,
}

/// Style of a stored feature in its resting state
fn resting_style(schema: &FeatureSchema, id: &FeatureId) -> FeatureStyle {
    match schema.store.state(id) {
        Some(FeatureState::Created) | Some(FeatureState::Modified) => FeatureStyle::Unsaved,
        _ => FeatureStyle::normal(schema.settings.geometry_kind),
    }
}

impl<M: MapView, T: FeatureTable, U: EditorUi> SyncCoordinator<M, T, U> {
    pub fn new(
        schemas: SchemaRegistry,
        selected: Option<String>,
        map: M,
        table: T,
        ui: U,
    ) -> SyncCoordinator<M, T, U> {
        SyncCoordinator {
            schemas,
            activation: ActivationController::new(selected),
            map,
            table,
            ui,
            viewport: None,
            pending: HashMap::new(),
            last_request: 0,
            hovered: None,
            saving: HashSet::new(),
            stats: Statistics::new(),
        }
    }
    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }
    pub fn activation(&self) -> &ActivationController {
        &self.activation
    }
    pub fn active_schema(&self) -> Option<&str> {
        self.activation.active()
    }
    pub fn map(&self) -> &M {
        &self.map
    }
    pub fn table(&self) -> &T {
        &self.table
    }
    pub fn ui(&self) -> &U {
        &self.ui
    }
    pub fn stats(&self) -> &Statistics {
        &self.stats
    }
    /// Number of requests without completion
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn issue(&mut self, pending: Pending, request: Request) -> Outgoing {
        self.last_request += 1;
        debug!(
            "request #{} {} `{}`",
            self.last_request,
            request.action(),
            request.schema()
        );
        self.pending.insert(
            self.last_request,
            PendingRequest {
                pending,
                epoch: self.activation.epoch(),
            },
        );
        Outgoing {
            id: self.last_request,
            request,
        }
    }

    // --- activation ---

    /// Activate schema `name`, deactivating the current one
    pub fn select_schema(&mut self, name: &str) -> SyncResult<Vec<Outgoing>> {
        self.schemas.schema(name)?;
        let previous = self.activation.active().map(|name| name.to_string());
        let effects = self.activation.select(name);
        self.run_effects(previous, effects)
    }
    /// Enable the editor, activating the selected schema
    pub fn enable(&mut self) -> SyncResult<Vec<Outgoing>> {
        let previous = self.activation.active().map(|name| name.to_string());
        let effects = self.activation.enable();
        self.run_effects(previous, effects)
    }
    /// Disable the editor. Schemas displayed on inactive stay visible.
    pub fn disable(&mut self) -> SyncResult<Vec<Outgoing>> {
        let keep_visible = match self.activation.active() {
            Some(name) => self.schemas.schema(name)?.display_on_inactive(),
            None => false,
        };
        let effects = self.activation.disable(keep_visible);
        self.run_effects(None, effects)
    }

    /// Run transition effects. Activating the `previous` schema again
    /// refetches its whole viewport.
    fn run_effects(
        &mut self,
        previous: Option<String>,
        effects: Vec<ActivationEffect>,
    ) -> SyncResult<Vec<Outgoing>> {
        let mut outgoing = Vec::new();
        for effect in effects {
            match effect {
                ActivationEffect::Deactivate(name) => self.deactivate(&name)?,
                ActivationEffect::Activate(name) => {
                    if previous.as_deref() == Some(name.as_str()) {
                        self.reset_trackers(&name)?;
                    }
                    outgoing.extend(self.activate(&name)?)
                }
            }
        }
        Ok(outgoing)
    }

    fn deactivate(&mut self, name: &str) -> SyncResult<()> {
        let members = self.schemas.schema(name)?.members();
        self.ui.close_form();
        self.clear_hover();
        for member in &members {
            self.map.hide_layer(member);
            self.table.hide(member);
        }
        Ok(())
    }

    fn activate(&mut self, name: &str) -> SyncResult<Vec<Outgoing>> {
        let members = self.schemas.schema(name)?.members();
        for member in &members {
            let settings = &self.schemas.feature_schema(member)?.settings;
            self.map
                .show_layer(member, &settings.styles, &settings.toolset);
            self.table.show(member);
        }
        match self.viewport {
            Some(extent) => self.fetch(name, &extent),
            None => Ok(Vec::new()),
        }
    }

    // --- fetching ---

    /// Viewport changed by pan or zoom
    pub fn viewport_changed(&mut self, extent: &Extent) -> SyncResult<Vec<Outgoing>> {
        self.viewport = Some(*extent);
        match self.activation.active().map(|name| name.to_string()) {
            Some(name) => self.fetch(&name, extent),
            None => Ok(Vec::new()),
        }
    }

    /// Fetch the parts of `extent` not queried yet for schema `name`
    fn fetch(&mut self, name: &str, extent: &Extent) -> SyncResult<Vec<Outgoing>> {
        let mut outgoing = Vec::new();
        let members = self.schemas.schema(name)?.members();
        for member in members {
            let schema = self.schemas.feature_schema_mut(&member)?;
            let (max_results, srid) = (schema.settings.max_results, schema.settings.srid);
            let select = |region: Option<&Extent>| SelectRequest {
                schema: member.clone(),
                max_results,
                srid,
                intersect_geometry: region.map(|r| r.to_wkt()),
            };
            let requests: Vec<(Option<Edge>, SelectRequest)> = match schema.settings.search_type {
                SearchType::All => vec![(None, select(None))],
                SearchType::CurrentExtent => schema
                    .tracker
                    .advance(extent)
                    .into_iter()
                    .map(|region| (Some(region.edge), select(Some(&region.extent))))
                    .collect(),
            };
            for (edge, request) in requests {
                let pending = Pending::Select {
                    schema: member.clone(),
                    edge,
                    issued: Instant::now(),
                };
                outgoing.push(self.issue(pending, Request::Select(request)));
            }
        }
        Ok(outgoing)
    }

    /// Forget the queried extent of schema `name` and fetch again
    pub fn refresh(&mut self, name: &str) -> SyncResult<Vec<Outgoing>> {
        self.reset_trackers(name)?;
        info!("Refreshing schema `{}`", name);
        match self.viewport {
            Some(extent) => self.fetch(name, &extent),
            None => Ok(Vec::new()),
        }
    }

    fn reset_trackers(&mut self, name: &str) -> SyncResult<()> {
        let members = self.schemas.schema(name)?.members();
        for member in &members {
            self.schemas.feature_schema_mut(member)?.tracker.reset();
        }
        Ok(())
    }

    // --- editing ---

    /// Add a newly drawn feature. Returns its transient id.
    pub fn draw_completed(&mut self, name: &str, geometry: Geometry) -> SyncResult<FeatureId> {
        let schema = self.schemas.feature_schema_mut(name)?;
        let id = schema.store.next_transient_id();
        let mut feature = Feature::new(id.clone(), geometry);
        feature.properties = schema.settings.default_properties();
        feature.srid = Some(schema.settings.srid);
        schema.store.create(feature.clone());
        let open_form = schema.settings.open_form_after_draw;
        self.map
            .add_features(name, &[feature.clone()], FeatureStyle::Unsaved);
        self.table.add_rows(name, &[feature.clone()]);
        if open_form {
            self.ui.open_form(name, &feature);
        }
        Ok(id)
    }

    /// Geometry of a feature changed on the map
    pub fn geometry_modified(
        &mut self,
        name: &str,
        id: &FeatureId,
        geometry: Geometry,
    ) -> SyncResult<()> {
        let schema = self.schemas.feature_schema_mut(name)?;
        let mut feature = schema
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| SyncError::UnknownFeature(id.to_string()))?;
        feature.geometry = geometry;
        schema.store.modify(feature.clone());
        self.map
            .replace_feature(name, id, &feature, FeatureStyle::Unsaved);
        self.table.replace_row(name, id, &feature);
        Ok(())
    }

    /// Open the edit form of a feature
    pub fn edit(&mut self, name: &str, id: &FeatureId) -> SyncResult<()> {
        let schema = self.schemas.feature_schema(name)?;
        let feature = schema
            .store
            .get(id)
            .ok_or_else(|| SyncError::UnknownFeature(id.to_string()))?;
        self.ui.open_form(name, feature);
        Ok(())
    }

    /// Save a feature with the properties entered in the edit form.
    /// Nothing is sent if a field is invalid or a save of the feature is
    /// still in flight. The form stays disabled until the response arrives.
    pub fn save(
        &mut self,
        name: &str,
        id: &FeatureId,
        properties: Properties,
    ) -> SyncResult<Vec<Outgoing>> {
        let key = (name.to_string(), id.clone());
        if self.saving.contains(&key) {
            return Err(SyncError::SaveInProgress(id.to_string()));
        }
        let schema = self.schemas.feature_schema(name)?;
        let mut feature = schema
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| SyncError::UnknownFeature(id.to_string()))?;
        if schema.settings.allow_edit_data {
            feature.properties = properties;
        }
        let errors = schema.settings.validate(&feature.properties);
        if !errors.is_empty() {
            self.ui.show_field_errors(&errors);
            return Err(SyncError::Validation(errors));
        }
        let request = Request::Save(SaveRequest {
            schema: name.to_string(),
            feature: feature.to_record(),
        });
        let pending = Pending::Save {
            schema: name.to_string(),
            previous: id.clone(),
        };
        self.saving.insert(key);
        self.ui.disable_form();
        Ok(vec![self.issue(pending, request)])
    }

    /// Delete a feature. Persisted features need a confirmation first.
    pub fn delete(&mut self, name: &str, id: &FeatureId) -> SyncResult<DeleteOutcome> {
        if self.saving.contains(&(name.to_string(), id.clone())) {
            return Err(SyncError::SaveInProgress(id.to_string()));
        }
        let schema = self.schemas.feature_schema_mut(name)?;
        if !schema.settings.allow_delete {
            return Err(SyncError::ReadOnlySchema(name.to_string()));
        }
        if id.is_new() {
            schema
                .store
                .remove(id)
                .ok_or_else(|| SyncError::UnknownFeature(id.to_string()))?;
            self.remove_projected(name, id);
            self.ui.close_form();
            return Ok(DeleteOutcome::Removed);
        }
        let feature = schema
            .store
            .get(id)
            .ok_or_else(|| SyncError::UnknownFeature(id.to_string()))?;
        self.ui.confirm_delete(name, feature);
        Ok(DeleteOutcome::ConfirmationRequired)
    }

    /// User confirmed deleting a persisted feature
    pub fn confirm_delete(&mut self, name: &str, id: &FeatureId) -> SyncResult<Vec<Outgoing>> {
        if id.is_new() {
            self.delete(name, id)?;
            return Ok(Vec::new());
        }
        let schema = self.schemas.feature_schema(name)?;
        let feature = schema
            .store
            .get(id)
            .ok_or_else(|| SyncError::UnknownFeature(id.to_string()))?;
        let request = Request::Delete(DeleteRequest {
            schema: name.to_string(),
            feature: feature.to_record(),
        });
        let pending = Pending::Delete {
            schema: name.to_string(),
            id: id.clone(),
        };
        Ok(vec![self.issue(pending, request)])
    }

    /// Request an export of a feature in `format`
    pub fn export(&mut self, name: &str, id: &FeatureId, format: &str) -> SyncResult<Vec<Outgoing>> {
        let schema = self.schemas.feature_schema(name)?;
        if !schema.settings.export_formats.is_empty() && !schema.settings.supports_export(format) {
            return Err(SyncError::Config(format!(
                "schema `{}` - export format `{}` not configured",
                name, format
            )));
        }
        let feature = schema
            .store
            .get(id)
            .ok_or_else(|| SyncError::UnknownFeature(id.to_string()))?;
        let request = Request::Export(ExportRequest {
            schema: name.to_string(),
            feature: feature.to_record(),
            format: format.to_string(),
        });
        let pending = Pending::Export {
            schema: name.to_string(),
            id: id.clone(),
            format: format.to_string(),
        };
        Ok(vec![self.issue(pending, request)])
    }

    fn remove_projected(&mut self, name: &str, id: &FeatureId) {
        if self.hovered.as_ref().map_or(false, |(s, h)| s == name && h == id) {
            self.hovered = None;
        }
        self.map.remove_feature(name, id);
        self.table.remove_row(name, id);
        self.table.redraw(name);
    }

    // --- hover ---

    /// Highlight a feature, e.g. while its table row is hovered
    pub fn hover(&mut self, name: &str, id: Option<&FeatureId>) -> SyncResult<()> {
        self.clear_hover();
        if let Some(id) = id {
            let schema = self.schemas.feature_schema(name)?;
            if !schema.store.contains(id) {
                return Err(SyncError::UnknownFeature(id.to_string()));
            }
            let style = FeatureStyle::hover(schema.settings.geometry_kind);
            self.map.set_style(name, id, style);
            self.hovered = Some((name.to_string(), id.clone()));
        }
        Ok(())
    }

    /// Highlight the feature at map coordinates
    pub fn hover_at(&mut self, x: f64, y: f64) -> SyncResult<Option<FeatureId>> {
        match self.map.feature_at(x, y) {
            Some((name, id)) => {
                self.hover(&name, Some(&id))?;
                Ok(Some(id))
            }
            None => {
                self.clear_hover();
                Ok(None)
            }
        }
    }

    fn clear_hover(&mut self) {
        if let Some((name, id)) = self.hovered.take() {
            if let Ok(schema) = self.schemas.feature_schema(&name) {
                let style = resting_style(schema, &id);
                self.map.set_style(&name, &id, style);
            }
        }
    }

    // --- completions ---

    /// Apply the response of request `id`.
    ///
    /// Store and projections are always updated. Form effects and error
    /// reports of requests issued before the last activation change are
    /// dropped.
    pub fn complete(&mut self, id: RequestId, response: SyncResult<Value>) -> SyncResult<()> {
        let PendingRequest { pending, epoch } = match self.pending.remove(&id) {
            Some(pending) => pending,
            None => {
                warn!("Ignoring response of unknown request #{}", id);
                return Ok(());
            }
        };
        let current = epoch == self.activation.epoch();
        if !current {
            debug!("request #{} completed after activation change", id);
        }
        let result = match pending {
            Pending::Select {
                schema,
                edge,
                issued,
            } => self.complete_select(&schema, edge, issued, response),
            Pending::Save { schema, previous } => {
                self.complete_save(&schema, &previous, response, current)
            }
            Pending::Delete { schema, id } => self.complete_delete(&schema, &id, response, current),
            Pending::Export { schema, id, format } => response
                .and_then(parse_export)
                .map(|payload| self.ui.deliver_export(&schema, &id, &format, &payload)),
        };
        if let Err(ref err) = result {
            error!("request #{} failed: {}", id, err);
            if current {
                match err {
                    SyncError::Rejected(messages) => self.ui.show_errors(messages),
                    _ => self.ui.notify(&err.to_string()),
                }
            }
        }
        result
    }

    fn complete_select(
        &mut self,
        name: &str,
        edge: Option<Edge>,
        issued: Instant,
        response: SyncResult<Value>,
    ) -> SyncResult<()> {
        let features = match response.and_then(parse_features) {
            Ok(features) => features,
            Err(err) => {
                self.stats.add_failure(name);
                return Err(err);
            }
        };
        let schema = self.schemas.feature_schema_mut(name)?;
        let received = features.len();
        let new_features = schema.store.merge(features);
        let style = FeatureStyle::normal(schema.settings.geometry_kind);
        debug!(
            "select `{}` ({:?}): {} features, {} new",
            name,
            edge,
            received,
            new_features.len()
        );
        self.stats
            .add_fetch(name, issued.elapsed(), new_features.len());
        if !new_features.is_empty() {
            self.map.add_features(name, &new_features, style);
            self.table.add_rows(name, &new_features);
            self.table.redraw(name);
        }
        Ok(())
    }

    fn complete_save(
        &mut self,
        name: &str,
        previous: &FeatureId,
        response: SyncResult<Value>,
        current: bool,
    ) -> SyncResult<()> {
        self.saving.remove(&(name.to_string(), previous.clone()));
        let canonical = match response.and_then(parse_saved_feature) {
            Ok(feature) => feature,
            Err(err) => {
                if current {
                    self.ui.enable_form();
                }
                return Err(err);
            }
        };
        let schema = self.schemas.feature_schema_mut(name)?;
        schema.store.confirm(previous, canonical.clone());
        let style = FeatureStyle::normal(schema.settings.geometry_kind);
        info!("Saved feature {} as {}", previous, canonical.id);
        if self.hovered.as_ref().map_or(false, |(s, h)| s == name && h == previous) {
            self.hovered = None;
        }
        self.map.replace_feature(name, previous, &canonical, style);
        self.table.replace_row(name, previous, &canonical);
        self.table.redraw(name);
        if current {
            self.ui.close_form();
        }
        Ok(())
    }

    fn complete_delete(
        &mut self,
        name: &str,
        id: &FeatureId,
        response: SyncResult<Value>,
        current: bool,
    ) -> SyncResult<()> {
        response.and_then(|value| parse_delete_confirmation(value, id))?;
        self.schemas.feature_schema_mut(name)?.store.remove(id);
        info!("Deleted feature {}", id);
        self.remove_projected(name, id);
        if current {
            self.ui.close_form();
        }
        Ok(())
    }
}
