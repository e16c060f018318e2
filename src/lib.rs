#![warn(clippy::all)]
#![forbid(unsafe_code)]
//!# Docs
//!
//! This is a rust implementation of
//! [fortune's algorithm](https://en.wikipedia.org/wiki/Fortune%27s_algorithm) to generate the
//! [voronoi diagram](https://en.wikipedia.org/wiki/Voronoi_diagram) of a set of sites on the
//! plane, bounded by an axis-aligned rectangle.
//!
//!## Implementation Details
//! The implementation is entirely in safe rust code.
//!
//! The sweepline moves from the topmost site downward. The resulting diagram is returned as a
//! [Doubly Connected Edge List](https://en.wikipedia.org/wiki/Doubly_connected_edge_list)
//! containing the Sites, Faces, Half Edges and Vertices that make up the diagram. Unbounded
//! cells are terminated against the supplied box (expanded so it contains every site and
//! vertex) but are not closed into polygons along the box sides.
//!
//! The sweep is metric-agnostic: the breakpoint and circle-event geometry comes from a
//! [`Metric`] implementation, with [`Euclidean`] as the default.
//!
//!## Example Usage
//!
//! ```rust
//! use sweepline_voronoi::{generate_diagram, BoundingBox, Point};
//!
//! let sites = vec![
//!     Point::new(0.0, 0.0),
//!     Point::new(2.0, 0.0),
//!     Point::new(1.0, 2.0),
//! ];
//! let diagram = generate_diagram(&sites, BoundingBox::new(-2.0, -2.0, 4.0, 4.0));
//! assert_eq!(diagram.num_faces(), 3);
//! ```
mod beachline;
mod boundingbox;
pub mod diagram;
mod error;
mod event;
mod fortune;
pub mod geometry;
pub mod metric;


pub use boundingbox::BoundingBox;
pub use diagram::Diagram;
pub use error::Error;
pub use fortune::FortuneAlgorithm;
pub use geometry::Point;
pub use metric::{Convergence, Euclidean, Metric};

/// Generates the bounded voronoi diagram of the supplied points with the
/// Euclidean metric.
/// # Arguments
/// * `points` - the sites to construct the diagram from.
/// * `bbox` - the rectangle to terminate unbounded edges against.
pub fn generate_diagram(points: &[Point], bbox: BoundingBox) -> Diagram {
    let mut algorithm = FortuneAlgorithm::new(points);
    algorithm.construct();
    algorithm.bound(bbox);
    algorithm.into_diagram()
}
