//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Geographic extents

use std::fmt;

/// Geographic extent in map units
///
/// `minx` is the left edge, `miny` the bottom edge, `maxx` the right edge and
/// `maxy` the top edge of the rectangle.
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct Extent {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl Extent {
    pub fn new(minx: f64, miny: f64, maxx: f64, maxy: f64) -> Extent {
        Extent {
            minx,
            miny,
            maxx,
            maxy,
        }
    }
    /// Parse "minx,miny,maxx,maxy"
    pub fn from_csv(numlist: &str) -> Result<Extent, String> {
        let arr = numlist
            .split(',')
            .map(|v| {
                v.trim()
                    .parse::<f64>()
                    .map_err(|_| format!("Error parsing '{}' as float value", v))
            })
            .collect::<Result<Vec<f64>, String>>()?;
        if arr.len() != 4 {
            return Err(format!(
                "Expected 4 values (minx,miny,maxx,maxy), got {}",
                arr.len()
            ));
        }
        Ok(Extent::new(arr[0], arr[1], arr[2], arr[3]))
    }
    pub fn width(&self) -> f64 {
        self.maxx - self.minx
    }
    pub fn height(&self) -> f64 {
        self.maxy - self.miny
    }
    pub fn area(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.width() * self.height()
        }
    }
    /// Extent without any area (includes inverted extents)
    pub fn is_empty(&self) -> bool {
        !(self.maxx > self.minx && self.maxy > self.miny)
    }
    pub fn contains(&self, other: &Extent) -> bool {
        other.minx >= self.minx
            && other.maxx <= self.maxx
            && other.miny >= self.miny
            && other.maxy <= self.maxy
    }
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.minx && x <= self.maxx && y >= self.miny && y <= self.maxy
    }
    /// Touching extents intersect
    pub fn intersects(&self, other: &Extent) -> bool {
        self.minx <= other.maxx
            && self.maxx >= other.minx
            && self.miny <= other.maxy
            && self.maxy >= other.miny
    }
    pub fn intersection(&self, other: &Extent) -> Option<Extent> {
        let ext = Extent {
            minx: self.minx.max(other.minx),
            miny: self.miny.max(other.miny),
            maxx: self.maxx.min(other.maxx),
            maxy: self.maxy.min(other.maxy),
        };
        if ext.is_empty() {
            None
        } else {
            Some(ext)
        }
    }
    /// Smallest extent containing both extents
    pub fn union(&self, other: &Extent) -> Extent {
        Extent {
            minx: self.minx.min(other.minx),
            miny: self.miny.min(other.miny),
            maxx: self.maxx.max(other.maxx),
            maxy: self.maxy.max(other.maxy),
        }
    }
    /// Closed polygon ring in WKT
    pub fn to_wkt(&self) -> String {
        format!(
            "POLYGON(({minx} {miny},{maxx} {miny},{maxx} {maxy},{minx} {maxy},{minx} {miny}))",
            minx = self.minx,
            miny = self.miny,
            maxx = self.maxx,
            maxy = self.maxy
        )
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{:.5}, {:.5}, {:.5}, {:.5}]",
            self.minx, self.miny, self.maxx, self.maxy
        )
    }
}

#[test]
fn test_extent_ops() {
    let a = Extent::new(0.0, 0.0, 10.0, 10.0);
    let b = Extent::new(5.0, 5.0, 15.0, 15.0);
    assert!(a.intersects(&b));
    assert_eq!(a.intersection(&b), Some(Extent::new(5.0, 5.0, 10.0, 10.0)));
    assert_eq!(a.union(&b), Extent::new(0.0, 0.0, 15.0, 15.0));
    assert!(!a.contains(&b));
    assert!(a.contains(&Extent::new(1.0, 1.0, 9.0, 9.0)));
    assert!(a.contains_point(10.0, 0.0));

    // Touching extents have no common area
    let c = Extent::new(10.0, 0.0, 20.0, 10.0);
    assert!(a.intersects(&c));
    assert_eq!(a.intersection(&c), None);

    assert!(Extent::new(3.0, 0.0, 1.0, 5.0).is_empty());
    assert_eq!(Extent::new(3.0, 0.0, 1.0, 5.0).area(), 0.0);
    assert_eq!(a.area(), 100.0);
}

#[test]
fn test_extent_parsing() {
    assert_eq!(
        Extent::from_csv("-2, 0,12.5,10"),
        Ok(Extent::new(-2.0, 0.0, 12.5, 10.0))
    );
    assert_eq!(
        Extent::from_csv("1,2,3").err(),
        Some("Expected 4 values (minx,miny,maxx,maxy), got 3".to_string())
    );
    assert!(Extent::from_csv("1,2,x,4").is_err());
}

#[test]
fn test_extent_wkt() {
    let ext = Extent::new(0.0, -1.5, 2.0, 3.0);
    assert_eq!(ext.to_wkt(), "POLYGON((0 -1.5,2 -1.5,2 3,0 3,0 -1.5))");
    assert_eq!(format!("{}", ext), "[0.00000, -1.50000, 2.00000, 3.00000]");
}
