//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::feature::{Feature, FeatureId};
use std::collections::HashMap;

/// Set a stored feature belongs to
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum FeatureState {
    /// Fetched from or confirmed by the feature service
    Loaded,
    /// Drawn locally, never saved
    Created,
    /// Loaded feature with local changes not saved yet
    Modified,
}

/// Features of one schema
///
/// Every feature id is contained in at most one of the three sets.
#[derive(Default, Debug)]
pub struct FeatureStore {
    loaded: HashMap<FeatureId, Feature>,
    created: HashMap<FeatureId, Feature>,
    modified: HashMap<FeatureId, Feature>,
    last_transient: u64,
}

impl FeatureStore {
    pub fn new() -> FeatureStore {
        FeatureStore::default()
    }
    /// Merge fetched features. Returns the features not known before.
    ///
    /// Features already contained in any set are skipped, so overlapping
    /// responses can be merged in any order.
    pub fn merge(&mut self, features: Vec<Feature>) -> Vec<Feature> {
        let mut new_features = Vec::new();
        for feature in features {
            if self.contains(&feature.id) {
                continue;
            }
            self.loaded.insert(feature.id.clone(), feature.clone());
            new_features.push(feature);
        }
        debug!(
            "merged {} new features ({} loaded)",
            new_features.len(),
            self.loaded.len()
        );
        new_features
    }
    /// Unused local id
    pub fn next_transient_id(&mut self) -> FeatureId {
        self.last_transient += 1;
        FeatureId::Transient(self.last_transient)
    }
    /// Add a locally drawn feature. Returns false if the id is already used.
    pub fn create(&mut self, feature: Feature) -> bool {
        if self.contains(&feature.id) {
            return false;
        }
        self.created.insert(feature.id.clone(), feature);
        true
    }
    /// Store a local change of a known feature.
    /// Loaded features move to the modified set, created features stay created.
    pub fn modify(&mut self, feature: Feature) -> Option<FeatureState> {
        let state = self.state(&feature.id)?;
        match state {
            FeatureState::Created => {
                self.created.insert(feature.id.clone(), feature);
                Some(FeatureState::Created)
            }
            FeatureState::Loaded | FeatureState::Modified => {
                self.loaded.remove(&feature.id);
                self.modified.insert(feature.id.clone(), feature);
                Some(FeatureState::Modified)
            }
        }
    }
    /// Replace the feature `previous` by the version confirmed by the feature service.
    /// The canonical feature may carry a new id (first save of a created feature).
    pub fn confirm(&mut self, previous: &FeatureId, canonical: Feature) -> Option<FeatureState> {
        let state = self.state(previous);
        self.remove(previous);
        self.remove(&canonical.id);
        self.loaded.insert(canonical.id.clone(), canonical);
        state
    }
    pub fn remove(&mut self, id: &FeatureId) -> Option<Feature> {
        self.loaded
            .remove(id)
            .or_else(|| self.created.remove(id))
            .or_else(|| self.modified.remove(id))
    }
    pub fn get(&self, id: &FeatureId) -> Option<&Feature> {
        self.loaded
            .get(id)
            .or_else(|| self.created.get(id))
            .or_else(|| self.modified.get(id))
    }
    pub fn state(&self, id: &FeatureId) -> Option<FeatureState> {
        if self.loaded.contains_key(id) {
            Some(FeatureState::Loaded)
        } else if self.created.contains_key(id) {
            Some(FeatureState::Created)
        } else if self.modified.contains_key(id) {
            Some(FeatureState::Modified)
        } else {
            None
        }
    }
    pub fn contains(&self, id: &FeatureId) -> bool {
        self.state(id).is_some()
    }
    pub fn len(&self) -> usize {
        self.loaded.len() + self.created.len() + self.modified.len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Number of features in one set
    pub fn count(&self, state: FeatureState) -> usize {
        match state {
            FeatureState::Loaded => self.loaded.len(),
            FeatureState::Created => self.created.len(),
            FeatureState::Modified => self.modified.len(),
        }
    }
    /// All features ordered by id
    pub fn features(&self) -> Vec<&Feature> {
        let mut features: Vec<&Feature> = self
            .loaded
            .values()
            .chain(self.created.values())
            .chain(self.modified.values())
            .collect();
        features.sort_by(|a, b| a.id.cmp(&b.id));
        features
    }
    /// Created and modified features
    pub fn unsaved(&self) -> Vec<&Feature> {
        self.features()
            .into_iter()
            .filter(|f| !self.loaded.contains_key(&f.id))
            .collect()
    }
}
