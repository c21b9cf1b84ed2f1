#![doc = include_str!("../readme.md")]

mod area;
mod bv_tree;
mod compact_cell;
mod compact_heightfield;
mod compact_span;
mod contours;
mod direction;
pub(crate) mod math;
mod region;

pub use area::AreaType;
pub use bv_tree::{BvNode, BvTree, MESH_NULL_IDX};
pub use compact_cell::CompactCell;
pub use compact_heightfield::CompactHeightfield;
pub use compact_span::CompactSpan;
pub use contours::{BuildContoursFlags, Contour, ContourSet, ContourSetError, RegionVertexId};
pub use direction::Direction;
pub use math::Aabb3d;
pub use region::RegionId;
