//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use geo::BoundingRect;
use std::fmt;
use std::str::FromStr;
use viewport_diff::Extent;
use wkt::TryFromWkt;

/// Geometry kind of a schema
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum GeometryKind {
    Point,
    Line,
    Polygon,
    Label,
    /// Aggregate of all schemas
    All,
}

impl GeometryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryKind::Point => "point",
            GeometryKind::Line => "line",
            GeometryKind::Polygon => "polygon",
            GeometryKind::Label => "label",
            GeometryKind::All => "all",
        }
    }
}

impl FromStr for GeometryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<GeometryKind, String> {
        match s.to_lowercase().as_str() {
            "point" => Ok(GeometryKind::Point),
            "line" | "linestring" => Ok(GeometryKind::Line),
            "polygon" => Ok(GeometryKind::Polygon),
            "label" | "text" => Ok(GeometryKind::Label),
            "all" => Ok(GeometryKind::All),
            _ => Err(format!("Unexpected geometry type '{}'", s)),
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Feature geometry as WKT
///
/// The editor treats geometries as opaque boundary representations handed
/// over by the map engine. Only the geometry type and the bounding box are
/// ever inspected.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[serde(transparent)]
pub struct Geometry(pub String);

impl Geometry {
    pub fn new(wkt: &str) -> Geometry {
        Geometry(wkt.to_string())
    }
    pub fn wkt(&self) -> &str {
        &self.0
    }
    /// Parsed geometry, `None` for empty or invalid WKT
    pub fn to_geo(&self) -> Option<geo_types::Geometry<f64>> {
        match geo_types::Geometry::<f64>::try_from_wkt_str(&self.0) {
            Ok(geom) => Some(geom),
            Err(err) => {
                if !self.0.trim().is_empty() {
                    debug!("Invalid WKT `{}`: {}", self.0, err);
                }
                None
            }
        }
    }
    pub fn is_empty(&self) -> bool {
        self.bbox().is_none()
    }
    pub fn kind(&self) -> Option<GeometryKind> {
        use geo_types::Geometry::*;
        match self.to_geo()? {
            Point(_) | MultiPoint(_) => Some(GeometryKind::Point),
            Line(_) | LineString(_) | MultiLineString(_) => Some(GeometryKind::Line),
            Polygon(_) | MultiPolygon(_) | Rect(_) | Triangle(_) => Some(GeometryKind::Polygon),
            GeometryCollection(_) => None,
        }
    }
    /// Bounding box of all coordinates
    pub fn bbox(&self) -> Option<Extent> {
        let rect = self.to_geo()?.bounding_rect()?;
        Some(Extent::new(
            rect.min().x,
            rect.min().y,
            rect.max().x,
            rect.max().y,
        ))
    }
}

#[test]
fn test_geometry_kind() {
    assert_eq!("Point".parse::<GeometryKind>(), Ok(GeometryKind::Point));
    assert_eq!("line".parse::<GeometryKind>(), Ok(GeometryKind::Line));
    assert_eq!(
        "circle".parse::<GeometryKind>(),
        Err("Unexpected geometry type 'circle'".to_string())
    );
    assert_eq!(GeometryKind::Polygon.to_string(), "polygon");
}

#[test]
fn test_wkt_inspection() {
    let geom = Geometry::new("POINT(7.5 47.1)");
    assert_eq!(geom.kind(), Some(GeometryKind::Point));
    assert_eq!(geom.bbox(), Some(Extent::new(7.5, 47.1, 7.5, 47.1)));

    let geom = Geometry::new("LINESTRING (0 0, -10 5.5, 300 -1)");
    assert_eq!(geom.kind(), Some(GeometryKind::Line));
    assert_eq!(geom.bbox(), Some(Extent::new(-10.0, -1.0, 300.0, 5.5)));

    let geom = Geometry::new("MULTIPOLYGON(((0 0,1 0,1 1,0 0)),((5 5,6 5,6 6,5 5)))");
    assert_eq!(geom.kind(), Some(GeometryKind::Polygon));
    assert_eq!(geom.bbox(), Some(Extent::new(0.0, 0.0, 6.0, 6.0)));

    let geom = Geometry::default();
    assert!(geom.is_empty());
    assert_eq!(geom.kind(), None);
}

#[test]
fn test_wkt_number_formats() {
    let geom = Geometry::new("POINT(.5 1)");
    assert_eq!(geom.bbox(), Some(Extent::new(0.5, 1.0, 0.5, 1.0)));

    let geom = Geometry::new("POINT Z (1 2 300)");
    assert_eq!(geom.kind(), Some(GeometryKind::Point));
    assert_eq!(geom.bbox(), Some(Extent::new(1.0, 2.0, 1.0, 2.0)));

    let geom = Geometry::new("LINESTRING(0 0, 1");
    assert!(geom.is_empty());
    assert_eq!(geom.kind(), None);
}
