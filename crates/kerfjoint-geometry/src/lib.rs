//! # Kerfjoint Geometry
//!
//! Geometry layer for the kerfjoint engine: polyhedral solids with boolean
//! operations, planar face analysis, local frame resolution for panel faces,
//! segments and curve sampling.
//!
//! Solids are backed by `csgrs` BSP meshes and all vector maths uses
//! `nalgebra`.

pub mod curve;
pub mod error;
pub mod face;
pub mod frame;
pub mod polygon;
pub mod segment;
pub mod solid;

pub use curve::{arc_through_points, bezier};
pub use error::{GeometryError, GeometryResult};
pub use face::{extract_faces, group_faces_by_direction, Edge, Face, FaceGroup, FACE_TOLERANCE};
pub use frame::{
    axes_rotation, place_on_face, placement, resolve_frame, resolve_frame_with_tolerance,
    spun_placement, LocalFrame, FRAME_EPSILON,
};
pub use polygon::merge_colinear;
pub use segment::{do_intersection, Segment};
pub use solid::{BoundingBox, Probe, Solid};

pub use nalgebra::{Matrix3, Matrix4, Point3, Vector3};
