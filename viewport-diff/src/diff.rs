//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Incremental viewport diffs

use crate::extent::Extent;

/// Viewport edge a fetch region was revealed at
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Edge {
    /// No previous viewport known
    Full,
    Left,
    Right,
    Bottom,
    Top,
}

/// Rectangular region which has to be queried
#[derive(PartialEq, Clone, Debug)]
pub struct FetchRegion {
    pub edge: Edge,
    pub extent: Extent,
}

/// Outward movement of each viewport edge
///
/// Positive values mean the viewport grew on that side, negative values that
/// it shrank. Every delta is measured in the direction pointing away from the
/// viewport center, so the left edge grows when `minx` decreases and the top
/// edge grows when `maxy` increases.
#[derive(PartialEq, Clone, Debug)]
pub struct EdgeDeltas {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

impl EdgeDeltas {
    pub fn between(previous: &Extent, current: &Extent) -> EdgeDeltas {
        EdgeDeltas {
            left: previous.minx - current.minx,
            right: current.maxx - previous.maxx,
            bottom: previous.miny - current.miny,
            top: current.maxy - previous.maxy,
        }
    }
    pub fn grew(&self) -> bool {
        self.left > 0.0 || self.right > 0.0 || self.bottom > 0.0 || self.top > 0.0
    }
}

/// Regions of `current` not covered by `previous`.
///
/// Left and right strips span the full height of the new viewport, bottom and
/// top strips only the horizontal range between them. All strips are clipped
/// to `current`, so they never overlap and their union is exactly the newly
/// revealed area. Edges which moved inwards never emit a region.
pub fn diff(previous: Option<&Extent>, current: &Extent) -> Vec<FetchRegion> {
    let prev = match previous {
        Some(prev) => prev,
        None => {
            return vec![FetchRegion {
                edge: Edge::Full,
                extent: *current,
            }]
        }
    };
    let deltas = EdgeDeltas::between(prev, current);
    let mut regions = Vec::new();
    let mut push = |edge, extent: Extent| {
        if !extent.is_empty() {
            regions.push(FetchRegion { edge, extent });
        }
    };
    if deltas.left > 0.0 {
        push(
            Edge::Left,
            Extent::new(
                current.minx,
                current.miny,
                prev.minx.min(current.maxx),
                current.maxy,
            ),
        );
    }
    if deltas.right > 0.0 {
        push(
            Edge::Right,
            Extent::new(
                prev.maxx.max(current.minx),
                current.miny,
                current.maxx,
                current.maxy,
            ),
        );
    }
    // Horizontal range not yet covered by the left/right strips
    let inner_minx = current.minx.max(prev.minx);
    let inner_maxx = current.maxx.min(prev.maxx);
    if deltas.bottom > 0.0 {
        push(
            Edge::Bottom,
            Extent::new(
                inner_minx,
                current.miny,
                inner_maxx,
                prev.miny.min(current.maxy),
            ),
        );
    }
    if deltas.top > 0.0 {
        push(
            Edge::Top,
            Extent::new(
                inner_minx,
                prev.maxy.max(current.miny),
                inner_maxx,
                current.maxy,
            ),
        );
    }
    regions
}

/// Last known viewport of one consumer
#[derive(Clone, Debug, Default)]
pub struct ViewportTracker {
    last: Option<Extent>,
}

impl ViewportTracker {
    pub fn new() -> ViewportTracker {
        ViewportTracker { last: None }
    }
    pub fn last(&self) -> Option<&Extent> {
        self.last.as_ref()
    }
    /// Regions to fetch for `current`.
    /// The stored viewport is replaced by `current`, even if no region is returned.
    pub fn advance(&mut self, current: &Extent) -> Vec<FetchRegion> {
        let regions = diff(self.last.as_ref(), current);
        self.last = Some(*current);
        regions
    }
    /// Forget the stored viewport. The next `advance` returns the full viewport.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
