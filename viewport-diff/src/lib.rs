//! A library for incremental map viewport calculations
//!
//! ## Extents
//!
//! ```rust
//! use viewport_diff::Extent;
//!
//! let extent = Extent::new(0.0, 0.0, 10.0, 5.0);
//! assert_eq!(extent.width(), 10.0);
//! assert!(extent.intersects(&Extent::new(5.0, 2.0, 20.0, 20.0)));
//! ```
//!
//! ## Viewport diffs
//!
//! Only the newly revealed strips of a changed viewport have to be queried:
//!
//! ```rust
//! use viewport_diff::{Edge, Extent, ViewportTracker};
//!
//! let mut tracker = ViewportTracker::new();
//! // First call: the whole viewport
//! let regions = tracker.advance(&Extent::new(0.0, 0.0, 10.0, 10.0));
//! assert_eq!(regions.len(), 1);
//! assert_eq!(regions[0].edge, Edge::Full);
//!
//! // Zoom out horizontally: one strip left, one strip right
//! let regions = tracker.advance(&Extent::new(-2.0, 0.0, 12.0, 10.0));
//! assert_eq!(regions.len(), 2);
//! assert_eq!(regions[0].extent, Extent::new(-2.0, 0.0, 0.0, 10.0));
//! assert_eq!(regions[1].extent, Extent::new(10.0, 0.0, 12.0, 10.0));
//! ```

mod diff;
#[cfg(test)]
mod diff_test;
mod extent;

pub use diff::{diff, Edge, EdgeDeltas, FetchRegion, ViewportTracker};
pub use extent::Extent;
