//! Geometric primitives and the predicates used during subdivision.
//!
//! All types are immutable values over `f64`. Every equality and
//! containment test uses the process-wide [`TOLERANCE`](crate::constants::TOLERANCE).

pub mod bounds;
pub mod culling;
pub mod face;
pub mod intersect;
pub mod plane;
pub mod polyhedron;
pub mod projection;
pub mod segment;

pub use bounds::BoundingBox3;
pub use culling::{cull_faces, cull_faces_along, outside_along, ray_may_hit};
pub use face::{validate_face, Face3, PointRelation};
pub use intersect::{box_faces, face_intersects_cuboid, face_intersects_face, Cuboid};
pub use plane::{Plane3, Side};
pub use polyhedron::Polyhedron;
pub use projection::{Axis, Projection};
pub use segment::{LineSegment3, SegmentIntersection};
