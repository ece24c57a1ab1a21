//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::config::{Config, StyleCfg};
use crate::core::geom::GeometryKind;
use std::collections::BTreeMap;

/// Visual state of a rendered feature
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum FeatureStyle {
    Default,
    /// Hovered
    Select,
    Selected,
    Copy,
    /// Created or modified, not saved yet
    Unsaved,
    Invisible,
    LabelText,
    LabelTextHover,
}

impl FeatureStyle {
    pub fn name(&self) -> &'static str {
        match self {
            FeatureStyle::Default => "default",
            FeatureStyle::Select => "select",
            FeatureStyle::Selected => "selected",
            FeatureStyle::Copy => "copy",
            FeatureStyle::Unsaved => "unsaved",
            FeatureStyle::Invisible => "invisible",
            FeatureStyle::LabelText => "labelText",
            FeatureStyle::LabelTextHover => "labelTextHover",
        }
    }
    /// Resting style for a geometry kind
    pub fn normal(kind: GeometryKind) -> FeatureStyle {
        match kind {
            GeometryKind::Label => FeatureStyle::LabelText,
            _ => FeatureStyle::Default,
        }
    }
    /// Hover style for a geometry kind
    pub fn hover(kind: GeometryKind) -> FeatureStyle {
        match kind {
            GeometryKind::Label => FeatureStyle::LabelTextHover,
            _ => FeatureStyle::Select,
        }
    }
}

impl StyleCfg {
    /// Style with all values set in `over` replaced
    pub fn merged(&self, over: &StyleCfg) -> StyleCfg {
        StyleCfg {
            stroke_width: over.stroke_width.or(self.stroke_width),
            stroke_color: over.stroke_color.clone().or(self.stroke_color.clone()),
            stroke_opacity: over.stroke_opacity.or(self.stroke_opacity),
            fill_color: over.fill_color.clone().or(self.fill_color.clone()),
            fill_opacity: over.fill_opacity.or(self.fill_opacity),
            point_radius: over.point_radius.or(self.point_radius),
            label: over.label.clone().or(self.label.clone()),
            font_size: over.font_size.or(self.font_size),
            graphic_z_index: over.graphic_z_index.or(self.graphic_z_index),
            display: over.display.clone().or(self.display.clone()),
        }
    }
}

fn style(stroke_width: f32, stroke_color: &str, fill_color: &str, fill_opacity: f32) -> StyleCfg {
    StyleCfg {
        stroke_width: Some(stroke_width),
        stroke_color: Some(stroke_color.to_string()),
        fill_color: Some(fill_color.to_string()),
        fill_opacity: Some(fill_opacity),
        ..Default::default()
    }
}

/// Named styles of a schema
#[derive(PartialEq, Clone, Debug)]
pub struct StyleMap {
    styles: BTreeMap<String, StyleCfg>,
}

impl Default for StyleMap {
    fn default() -> StyleMap {
        let mut styles = BTreeMap::new();
        styles.insert(
            "default".to_string(),
            style(1.0, "#6fb536", "#6fb536", 0.3),
        );
        styles.insert(
            "select".to_string(),
            StyleCfg {
                graphic_z_index: Some(15),
                ..style(3.0, "#6fb536", "#F7F79A", 0.5)
            },
        );
        styles.insert(
            "selected".to_string(),
            StyleCfg {
                graphic_z_index: Some(15),
                ..style(3.0, "#b5ac14", "#74b1f7", 0.7)
            },
        );
        styles.insert(
            "copy".to_string(),
            StyleCfg {
                graphic_z_index: Some(1000),
                ..style(5.0, "#4250b5", "#f7ef7e", 0.7)
            },
        );
        styles.insert(
            "unsaved".to_string(),
            style(3.0, "#F5663C", "#FFD14F", 0.5),
        );
        styles.insert(
            "invisible".to_string(),
            StyleCfg {
                stroke_width: Some(1.0),
                stroke_color: Some("#6fb536".to_string()),
                fill_color: Some("#F7F79A".to_string()),
                display: Some("none".to_string()),
                ..Default::default()
            },
        );
        let label = StyleCfg {
            point_radius: Some(15.0),
            label: Some("${label}".to_string()),
            font_size: Some(15),
            ..style(0.0, "#5e1a2b", "#cccccc", 0.0)
        };
        styles.insert(
            "labelText".to_string(),
            StyleCfg {
                stroke_opacity: Some(0.0),
                ..label.clone()
            },
        );
        styles.insert(
            "labelTextHover".to_string(),
            StyleCfg {
                stroke_color: Some("#2340d3".to_string()),
                fill_opacity: Some(1.0),
                ..label
            },
        );
        StyleMap { styles }
    }
}

impl StyleMap {
    pub fn get(&self, style: FeatureStyle) -> Option<&StyleCfg> {
        self.styles.get(style.name())
    }
    pub fn names(&self) -> Vec<&str> {
        self.styles.keys().map(|k| k.as_str()).collect()
    }
}

impl<'a> Config<'a, BTreeMap<String, StyleCfg>> for StyleMap {
    /// Default styles merged by schema styles
    fn from_config(overrides: &BTreeMap<String, StyleCfg>) -> Result<Self, String> {
        let mut map = StyleMap::default();
        for (name, over) in overrides {
            let merged = match map.styles.get(name) {
                Some(base) => base.merged(over),
                None => over.clone(),
            };
            map.styles.insert(name.clone(), merged);
        }
        Ok(map)
    }
    fn gen_config() -> String {
        let toml = r##"
#[digitizer.schemes.poi.style.default]
#stroke_width = 1
#stroke_color = "#6fb536"
#fill_color = "#6fb536"
#fill_opacity = 0.3
"##;
        toml.to_string()
    }
}

#[test]
fn test_style_merge() {
    let mut overrides = BTreeMap::new();
    overrides.insert(
        "default".to_string(),
        StyleCfg {
            fill_color: Some("#ff0000".to_string()),
            ..Default::default()
        },
    );
    overrides.insert(
        "highlight".to_string(),
        StyleCfg {
            stroke_width: Some(8.0),
            ..Default::default()
        },
    );
    let map = StyleMap::from_config(&overrides).unwrap();
    let default = map.get(FeatureStyle::Default).unwrap();
    assert_eq!(default.fill_color, Some("#ff0000".to_string()));
    // Not overridden
    assert_eq!(default.stroke_color, Some("#6fb536".to_string()));
    assert_eq!(default.fill_opacity, Some(0.3));
    assert!(map.names().contains(&"highlight"));

    let unsaved = map.get(FeatureStyle::Unsaved).unwrap();
    assert_eq!(unsaved.fill_color, Some("#FFD14F".to_string()));
    let hover = map.get(FeatureStyle::LabelTextHover).unwrap();
    assert_eq!(hover.stroke_color, Some("#2340d3".to_string()));
    assert_eq!(hover.stroke_opacity, None);
}

#[test]
fn test_style_by_kind() {
    assert_eq!(FeatureStyle::normal(GeometryKind::Point), FeatureStyle::Default);
    assert_eq!(FeatureStyle::normal(GeometryKind::Label), FeatureStyle::LabelText);
    assert_eq!(FeatureStyle::hover(GeometryKind::Polygon), FeatureStyle::Select);
    assert_eq!(FeatureStyle::hover(GeometryKind::Label).name(), "labelTextHover");
}
