use crate::{
    area::AreaType, compact_cell::CompactCell, compact_span::CompactSpan, direction::Direction,
    math::Aabb3d, region::RegionId,
};

/// A packed heightfield whose walkable spans have been partitioned into regions.
///
/// Building this structure (rasterization, filtering, region partitioning) happens
/// upstream; this crate consumes it as-is to trace region contours.
#[derive(Debug, Clone, PartialEq)]
pub struct CompactHeightfield {
    /// The width of the heightfield along the x-axis in cell units
    pub width: u16,
    /// The height of the heightfield along the z-axis in cell units
    pub height: u16,
    /// The AABB border size used during the build of the field.
    pub border_size: u16,
    /// The maximum region id of any span within the field.
    pub max_region: RegionId,
    /// The AABB of the heightfield
    pub aabb: Aabb3d,
    /// The size of each cell on the xz-plane
    pub cell_size: f32,
    /// The size of each cell along the y-axis
    pub cell_height: f32,
    /// The cells in the heightfield [Size: `width * height`]
    pub cells: Vec<CompactCell>,
    /// All walkable spans in the heightfield
    pub spans: Vec<CompactSpan>,
    /// Vector containing area type data. [Size: `spans.len()`]
    pub areas: Vec<AreaType>,
}

impl CompactHeightfield {
    #[inline]
    pub(crate) fn column_index(&self, x: u16, z: u16) -> usize {
        x as usize + z as usize * self.width as usize
    }

    /// Returns the cell at the given coordinates. Panics if the coordinates are invalid.
    #[inline]
    pub fn cell_at(&self, x: u16, z: u16) -> &CompactCell {
        &self.cells[self.column_index(x, z)]
    }

    /// Follows the connection of span `span` at `(x, z)` in the given
    /// direction. Returns the neighbor's cell coordinates and span index, or
    /// `None` if the spans are not connected.
    #[inline]
    pub(crate) fn neighbor(
        &self,
        x: i32,
        z: i32,
        span: usize,
        direction: Direction,
    ) -> Option<(i32, i32, usize)> {
        let layer = self.spans[span].connection(direction)?;
        let (d_x, d_z) = direction.offset();
        let (neighbor_x, neighbor_z) = (x + d_x, z + d_z);
        let cell = &self.cells[(neighbor_x + neighbor_z * self.width as i32) as usize];
        Some((neighbor_x, neighbor_z, cell.index() as usize + layer as usize))
    }
}
