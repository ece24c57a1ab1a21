//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::diff::{diff, Edge, EdgeDeltas, ViewportTracker};
use crate::extent::Extent;

fn total_area(regions: &[crate::FetchRegion]) -> f64 {
    regions.iter().map(|r| r.extent.area()).sum()
}

#[test]
fn test_first_call() {
    let mut tracker = ViewportTracker::new();
    assert_eq!(tracker.last(), None);
    let viewport = Extent::new(0.0, 0.0, 10.0, 10.0);
    let regions = tracker.advance(&viewport);
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].edge, Edge::Full);
    assert_eq!(regions[0].extent, viewport);
    assert_eq!(tracker.last(), Some(&viewport));
}

#[test]
fn test_horizontal_growth() {
    let prev = Extent::new(0.0, 0.0, 10.0, 10.0);
    let regions = diff(Some(&prev), &Extent::new(-2.0, 0.0, 12.0, 10.0));
    assert_eq!(regions.len(), 2);
    assert_eq!(regions[0].edge, Edge::Left);
    assert_eq!(regions[0].extent, Extent::new(-2.0, 0.0, 0.0, 10.0));
    assert_eq!(regions[0].extent.width(), 2.0);
    assert_eq!(regions[1].edge, Edge::Right);
    assert_eq!(regions[1].extent, Extent::new(10.0, 0.0, 12.0, 10.0));
    assert_eq!(regions[1].extent.width(), 2.0);
}

#[test]
fn test_vertical_growth() {
    let prev = Extent::new(0.0, 0.0, 10.0, 10.0);
    let regions = diff(Some(&prev), &Extent::new(0.0, -1.0, 10.0, 13.0));
    assert_eq!(regions.len(), 2);
    assert_eq!(regions[0].edge, Edge::Bottom);
    assert_eq!(regions[0].extent, Extent::new(0.0, -1.0, 10.0, 0.0));
    assert_eq!(regions[1].edge, Edge::Top);
    assert_eq!(regions[1].extent, Extent::new(0.0, 10.0, 10.0, 13.0));
}

#[test]
fn test_shrink_only() {
    let mut tracker = ViewportTracker::new();
    tracker.advance(&Extent::new(0.0, 0.0, 10.0, 10.0));
    let smaller = Extent::new(1.0, 1.0, 9.0, 9.0);
    let regions = tracker.advance(&smaller);
    assert!(regions.is_empty());
    // Stored bound is replaced nevertheless
    assert_eq!(tracker.last(), Some(&smaller));
}

#[test]
fn test_unchanged() {
    let mut tracker = ViewportTracker::new();
    let viewport = Extent::new(0.0, 0.0, 10.0, 10.0);
    tracker.advance(&viewport);
    assert!(tracker.advance(&viewport).is_empty());
}

#[test]
fn test_pan() {
    // Pan right and up: right strip plus top strip without the corner
    let prev = Extent::new(0.0, 0.0, 10.0, 10.0);
    let current = Extent::new(5.0, 5.0, 15.0, 15.0);
    let regions = diff(Some(&prev), &current);
    assert_eq!(regions.len(), 2);
    assert_eq!(regions[0].edge, Edge::Right);
    assert_eq!(regions[0].extent, Extent::new(10.0, 5.0, 15.0, 15.0));
    assert_eq!(regions[1].edge, Edge::Top);
    assert_eq!(regions[1].extent, Extent::new(5.0, 10.0, 10.0, 15.0));
    // Newly revealed area only
    let overlap = prev.intersection(&current).map(|e| e.area()).unwrap_or(0.0);
    assert_eq!(total_area(&regions), current.area() - overlap);

    // Pan left and down
    let regions = diff(Some(&prev), &Extent::new(-3.0, -4.0, 7.0, 6.0));
    assert_eq!(regions.len(), 2);
    assert_eq!(regions[0].edge, Edge::Left);
    assert_eq!(regions[0].extent, Extent::new(-3.0, -4.0, 0.0, 6.0));
    assert_eq!(regions[1].edge, Edge::Bottom);
    assert_eq!(regions[1].extent, Extent::new(0.0, -4.0, 7.0, 0.0));
}

#[test]
fn test_disjoint_pan() {
    // Jump beyond the previous viewport: exactly the new viewport is fetched
    let prev = Extent::new(0.0, 0.0, 10.0, 10.0);
    let current = Extent::new(20.0, 0.0, 30.0, 10.0);
    let regions = diff(Some(&prev), &current);
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].edge, Edge::Right);
    assert_eq!(regions[0].extent, current);

    let current = Extent::new(-50.0, 20.0, -40.0, 30.0);
    let regions = diff(Some(&prev), &current);
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].edge, Edge::Left);
    assert_eq!(regions[0].extent, current);
}

#[test]
fn test_zoom_out_all_edges() {
    let prev = Extent::new(0.0, 0.0, 10.0, 10.0);
    let current = Extent::new(-5.0, -5.0, 15.0, 15.0);
    let regions = diff(Some(&prev), &current);
    let edges: Vec<Edge> = regions.iter().map(|r| r.edge).collect();
    assert_eq!(edges, vec![Edge::Left, Edge::Right, Edge::Bottom, Edge::Top]);
    assert_eq!(total_area(&regions), current.area() - prev.area());
    // Strips touch but never overlap
    for (i, a) in regions.iter().enumerate() {
        for b in regions.iter().skip(i + 1) {
            assert_eq!(a.extent.intersection(&b.extent), None);
        }
    }
}

#[test]
fn test_edge_deltas() {
    let prev = Extent::new(0.0, 0.0, 10.0, 10.0);
    let deltas = EdgeDeltas::between(&prev, &Extent::new(-2.0, 1.0, 12.0, 9.0));
    assert_eq!(deltas.left, 2.0);
    assert_eq!(deltas.right, 2.0);
    assert_eq!(deltas.bottom, -1.0);
    assert_eq!(deltas.top, -1.0);
    assert!(deltas.grew());
    let deltas = EdgeDeltas::between(&prev, &Extent::new(1.0, 1.0, 9.0, 9.0));
    assert!(!deltas.grew());
}

#[test]
fn test_reset() {
    let mut tracker = ViewportTracker::new();
    let viewport = Extent::new(0.0, 0.0, 10.0, 10.0);
    tracker.advance(&viewport);
    tracker.reset();
    let regions = tracker.advance(&viewport);
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].edge, Edge::Full);
}
