//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::projection::{EditorUi, FeatureTable, MapView};
use crate::schemas::Schema;
use crate::sync::{Outgoing, SyncCoordinator};
use digitizer_core::core::error::{SyncError, SyncResult};
use std::collections::BTreeMap;

/// Editor instances by editor id
pub struct EditorRegistry<M, T, U> {
    editors: BTreeMap<String, SyncCoordinator<M, T, U>>,
}

impl<M: MapView, T: FeatureTable, U: EditorUi> EditorRegistry<M, T, U> {
    pub fn new() -> EditorRegistry<M, T, U> {
        EditorRegistry {
            editors: BTreeMap::new(),
        }
    }
    pub fn register(&mut self, id: &str, editor: SyncCoordinator<M, T, U>) -> SyncResult<()> {
        if self.editors.contains_key(id) {
            return Err(SyncError::DuplicateEditor(id.to_string()));
        }
        info!("Editor `{}` registered", id);
        self.editors.insert(id.to_string(), editor);
        Ok(())
    }
    pub fn get(&self, id: &str) -> SyncResult<&SyncCoordinator<M, T, U>> {
        self.editors
            .get(id)
            .ok_or_else(|| SyncError::UnknownEditor(id.to_string()))
    }
    pub fn get_mut(&mut self, id: &str) -> SyncResult<&mut SyncCoordinator<M, T, U>> {
        self.editors
            .get_mut(id)
            .ok_or_else(|| SyncError::UnknownEditor(id.to_string()))
    }
    /// Remove an editor. Requests still in flight for it are dropped by the caller.
    pub fn teardown(&mut self, id: &str) -> SyncResult<SyncCoordinator<M, T, U>> {
        let editor = self
            .editors
            .remove(id)
            .ok_or_else(|| SyncError::UnknownEditor(id.to_string()))?;
        if editor.pending_count() > 0 {
            warn!(
                "Editor `{}` removed with {} requests in flight",
                id,
                editor.pending_count()
            );
        }
        info!("Editor `{}` removed", id);
        Ok(editor)
    }
    pub fn ids(&self) -> Vec<&str> {
        self.editors.keys().map(|id| id.as_str()).collect()
    }
    /// Refetch feature schema `schema` in every editor owning it.
    /// Returns the requests to send per editor id.
    pub fn refresh_connected(&mut self, schema: &str) -> Vec<(String, Vec<Outgoing>)> {
        let mut requests = Vec::new();
        for (id, editor) in self.editors.iter_mut() {
            if !matches!(editor.schemas().get(schema), Some(Schema::Feature(_))) {
                continue;
            }
            match editor.refresh(schema) {
                Ok(outgoing) => requests.push((id.clone(), outgoing)),
                Err(err) => warn!("Editor `{}`: {}", id, err),
            }
        }
        requests
    }
}

impl<M: MapView, T: FeatureTable, U: EditorUi> Default for EditorRegistry<M, T, U> {
    fn default() -> Self {
        EditorRegistry::new()
    }
}
