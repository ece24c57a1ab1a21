//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum ActivationState {
    Inactive,
    Active(String),
}

/// Side effect of a state transition, to be run in order
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum ActivationEffect {
    /// Hide projections, close edit forms. Features stay loaded.
    Deactivate(String),
    /// Show projections and start a fetch cycle
    Activate(String),
}

/// Selects which schema is active. At most one schema is active at a time.
///
/// Every transition increments the activation epoch. Requests remember the
/// epoch they were issued in, so effects of outdated completions can be
/// recognized.
#[derive(Debug)]
pub struct ActivationController {
    state: ActivationState,
    /// Value of the schema selector
    selected: Option<String>,
    enabled: bool,
    epoch: u64,
}

impl ActivationController {
    pub fn new(selected: Option<String>) -> ActivationController {
        ActivationController {
            state: ActivationState::Inactive,
            selected,
            enabled: true,
            epoch: 0,
        }
    }
    pub fn state(&self) -> &ActivationState {
        &self.state
    }
    pub fn active(&self) -> Option<&str> {
        match self.state {
            ActivationState::Active(ref name) => Some(name),
            ActivationState::Inactive => None,
        }
    }
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
    /// Select schema `name`.
    ///
    /// Selecting the active schema again skips deactivation but repeats
    /// activation. A disabled editor only remembers the selection.
    pub fn select(&mut self, name: &str) -> Vec<ActivationEffect> {
        self.selected = Some(name.to_string());
        if !self.enabled {
            debug!("editor disabled - schema `{}` selected", name);
            return Vec::new();
        }
        let mut effects = Vec::new();
        if let ActivationState::Active(ref current) = self.state {
            if current != name {
                effects.push(ActivationEffect::Deactivate(current.clone()));
            }
        }
        self.epoch += 1;
        self.state = ActivationState::Active(name.to_string());
        effects.push(ActivationEffect::Activate(name.to_string()));
        info!("Schema `{}` activated", name);
        effects
    }
    /// Disable the editor. The active schema stays active and visible if
    /// `keep_visible` is set.
    pub fn disable(&mut self, keep_visible: bool) -> Vec<ActivationEffect> {
        self.enabled = false;
        self.epoch += 1;
        match self.state.clone() {
            ActivationState::Active(ref name) if !keep_visible => {
                self.state = ActivationState::Inactive;
                info!("Schema `{}` deactivated", name);
                vec![ActivationEffect::Deactivate(name.clone())]
            }
            _ => Vec::new(),
        }
    }
    /// Enable the editor and activate the selected schema
    pub fn enable(&mut self) -> Vec<ActivationEffect> {
        self.enabled = true;
        match self.selected.clone() {
            Some(name) => self.select(&name),
            None => Vec::new(),
        }
    }
}

#[test]
fn test_select_transitions() {
    use self::ActivationEffect::*;

    let mut activation = ActivationController::new(None);
    assert_eq!(activation.state(), &ActivationState::Inactive);
    assert_eq!(activation.select("poi"), vec![Activate("poi".to_string())]);
    assert_eq!(
        activation.select("roads"),
        vec![Deactivate("poi".to_string()), Activate("roads".to_string())]
    );
    assert_eq!(activation.active(), Some("roads"));
    // Refresh by selecting again
    assert_eq!(activation.select("roads"), vec![Activate("roads".to_string())]);
    assert_eq!(activation.epoch(), 3);
}

#[test]
fn test_enable_disable() {
    use self::ActivationEffect::*;

    let mut activation = ActivationController::new(Some("poi".to_string()));
    assert_eq!(activation.active(), None);
    assert_eq!(activation.enable(), vec![Activate("poi".to_string())]);

    assert_eq!(activation.disable(false), vec![Deactivate("poi".to_string())]);
    assert_eq!(activation.state(), &ActivationState::Inactive);
    assert!(!activation.is_enabled());

    // Selection while disabled is applied on enable
    assert!(activation.select("roads").is_empty());
    assert_eq!(activation.enable(), vec![Activate("roads".to_string())]);

    // Schema displayed while inactive
    assert!(activation.disable(true).is_empty());
    assert_eq!(activation.active(), Some("roads"));
    assert_eq!(activation.enable(), vec![Activate("roads".to_string())]);
}
