//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::geom::GeometryKind;
use std::fmt;
use std::str::FromStr;

/// Map drawing and editing tools
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Tool {
    DrawPoint,
    DrawLine,
    DrawPolygon,
    DrawRectangle,
    DrawCircle,
    DrawEllipse,
    DrawDonut,
    DrawText,
    ModifyFeature,
    MoveFeature,
    SelectFeature,
    RemoveSelected,
}

const TOOL_NAMES: [(Tool, &str); 12] = [
    (Tool::DrawPoint, "drawPoint"),
    (Tool::DrawLine, "drawLine"),
    (Tool::DrawPolygon, "drawPolygon"),
    (Tool::DrawRectangle, "drawRectangle"),
    (Tool::DrawCircle, "drawCircle"),
    (Tool::DrawEllipse, "drawEllipse"),
    (Tool::DrawDonut, "drawDonut"),
    (Tool::DrawText, "drawText"),
    (Tool::ModifyFeature, "modifyFeature"),
    (Tool::MoveFeature, "moveFeature"),
    (Tool::SelectFeature, "selectFeature"),
    (Tool::RemoveSelected, "removeSelected"),
];

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = TOOL_NAMES
            .iter()
            .find(|(tool, _)| tool == self)
            .map(|(_, name)| *name)
            .unwrap_or("unknown");
        write!(f, "{}", name)
    }
}

impl FromStr for Tool {
    type Err = String;

    fn from_str(s: &str) -> Result<Tool, String> {
        TOOL_NAMES
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(tool, _)| *tool)
            .ok_or(format!("Unknown tool '{}'", s))
    }
}

/// Drawing tools offered for a geometry kind
pub fn default_toolset(kind: GeometryKind) -> Option<Vec<Tool>> {
    use self::Tool::*;

    match kind {
        GeometryKind::Point => Some(vec![DrawPoint, MoveFeature, SelectFeature, RemoveSelected]),
        GeometryKind::Line => Some(vec![
            DrawLine,
            ModifyFeature,
            MoveFeature,
            SelectFeature,
            RemoveSelected,
        ]),
        GeometryKind::Polygon => Some(vec![
            DrawPolygon,
            DrawRectangle,
            DrawCircle,
            DrawEllipse,
            DrawDonut,
            ModifyFeature,
            MoveFeature,
            SelectFeature,
            RemoveSelected,
        ]),
        GeometryKind::Label => Some(vec![DrawText, MoveFeature]),
        GeometryKind::All => {
            warn!("No valid geom type {}", kind);
            None
        }
    }
}

#[test]
fn test_default_toolsets() {
    assert_eq!(
        default_toolset(GeometryKind::Point),
        Some(vec![
            Tool::DrawPoint,
            Tool::MoveFeature,
            Tool::SelectFeature,
            Tool::RemoveSelected
        ])
    );
    assert_eq!(default_toolset(GeometryKind::Polygon).map(|t| t.len()), Some(9));
    assert_eq!(
        default_toolset(GeometryKind::Label),
        Some(vec![Tool::DrawText, Tool::MoveFeature])
    );
    assert_eq!(default_toolset(GeometryKind::All), None);
}

#[test]
fn test_tool_names() {
    assert_eq!("drawDonut".parse::<Tool>(), Ok(Tool::DrawDonut));
    assert_eq!(Tool::RemoveSelected.to_string(), "removeSelected");
    assert_eq!(
        "drawStar".parse::<Tool>(),
        Err("Unknown tool 'drawStar'".to_string())
    );
}
