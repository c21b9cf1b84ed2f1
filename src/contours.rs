use glam::U16Vec3;
use thiserror::Error;

use crate::{
    Aabb3d, AreaType, CompactHeightfield, RegionId,
    direction::Direction,
    math::{next, prev},
};

/// Defensive ceiling for a single contour walk. A well-formed field closes
/// its loops orders of magnitude earlier.
const MAX_WALK_STEPS: u32 = 40_000;

impl CompactHeightfield {
    /// Traces the boundary of every region in the field into a closed polyline
    /// and simplifies it.
    ///
    /// The raw contours match the region outlines exactly. The `max_error` and
    /// `max_edge_len` parameters control how closely the simplified contours
    /// follow the raw ones.
    ///
    /// Simplified contours are generated such that the vertices for portals
    /// between regions match up. (They are considered mandatory vertices.)
    ///
    /// Setting `max_edge_len` to zero disables the edge length feature.
    ///
    /// # Errors
    ///
    /// Returns an error if the field's connectivity data is malformed, i.e. a
    /// boundary walk steps across a missing connection or fails to close.
    pub fn build_contours(
        &self,
        max_error: f32,
        max_edge_len: u16,
        build_flags: BuildContoursFlags,
    ) -> Result<ContourSet, ContourSetError> {
        let max_contours = self.max_region.bits().max(8);
        let mut cset = ContourSet {
            contours: Vec::with_capacity(max_contours as usize),
            aabb: self.aabb,
            cell_size: self.cell_size,
            cell_height: self.cell_height,
            width: self.width - self.border_size * 2,
            height: self.height - self.border_size * 2,
            border_size: self.border_size,
            max_error,
        };
        if self.border_size > 0 {
            // If the heightfield was built with border_size, remove the offset
            let pad = self.border_size as f32 * self.cell_size;
            cset.aabb.min.x += pad;
            cset.aabb.min.z += pad;
            cset.aabb.max.x -= pad;
            cset.aabb.max.z -= pad;
        }

        let mut edges = self.boundary_edges();

        let mut verts = Vec::with_capacity(256);
        let mut simplified = Vec::with_capacity(64);

        for z in 0..self.height {
            for x in 0..self.width {
                let cell = self.cell_at(x, z);
                for i in cell.index_range() {
                    // Fully interior or fully detached spans never seed a walk.
                    if edges[i] == 0 || edges[i] == 0xf {
                        edges[i] = 0;
                        continue;
                    }
                    let reg = self.spans[i].region;
                    if reg.is_border_or_none() {
                        continue;
                    }
                    let area = self.areas[i];

                    verts.clear();
                    simplified.clear();

                    self.walk_contour(x, z, i, &mut edges, &mut verts)?;

                    simplify_contour(
                        &verts,
                        &mut simplified,
                        max_error,
                        max_edge_len,
                        build_flags,
                    );
                    remove_degenerate_segments(&mut simplified);

                    if simplified.len() < 3 {
                        continue;
                    }
                    let mut vertices = simplified.clone();
                    let mut raw_vertices = verts.clone();
                    if self.border_size > 0 {
                        // The heightfield was built with a border; shift the
                        // vertices back into the trimmed grid.
                        for (v, _) in vertices.iter_mut().chain(raw_vertices.iter_mut()) {
                            v.x -= self.border_size;
                            v.z -= self.border_size;
                        }
                    }
                    cset.contours.push(Contour {
                        vertices,
                        raw_vertices,
                        region: reg,
                        area,
                    });
                }
            }
        }

        merge_backwards_contours(&mut cset.contours);

        Ok(cset)
    }

    /// For every span, the set of directions whose neighbor lies in a
    /// different region. These are the edges the region's contours run along;
    /// the walk clears each bit as it passes.
    fn boundary_edges(&self) -> Vec<u8> {
        let mut edges = vec![0_u8; self.spans.len()];
        for z in 0..self.height {
            for x in 0..self.width {
                for i in self.cell_at(x, z).index_range() {
                    edges[i] = self.span_boundary_edges(x, z, i);
                }
            }
        }
        edges
    }

    fn span_boundary_edges(&self, x: u16, z: u16, span: usize) -> u8 {
        let region = self.spans[span].region;
        if region.is_border_or_none() {
            return 0;
        }
        let mut edges = 0;
        for direction in Direction::ALL {
            let neighbor_region = self
                .neighbor(x as i32, z as i32, span, direction)
                .map(|(_, _, neighbor)| self.spans[neighbor].region)
                .unwrap_or(RegionId::NONE);
            if neighbor_region != region {
                edges |= direction.mask();
            }
        }
        edges
    }

    /// Traces the boundary of the region containing the seed span, starting
    /// from one of its marked edges. Facing an outward edge, the walk emits
    /// that edge's clockwise-trailing corner and turns clockwise; facing the
    /// region interior, it steps across the connection and turns
    /// counterclockwise. One full lap records one vertex per boundary edge.
    fn walk_contour(
        &self,
        seed_x: u16,
        seed_z: u16,
        seed_span: usize,
        edges: &mut [u8],
        points: &mut Vec<(U16Vec3, RegionVertexId)>,
    ) -> Result<(), ContourSetError> {
        let Some(first_edge) = Direction::ALL
            .into_iter()
            .find(|direction| edges[seed_span] & direction.mask() != 0)
        else {
            // Callers only seed walks from spans with at least one marked edge.
            return Ok(());
        };

        let start = (seed_span, first_edge);
        let (mut x, mut z, mut span) = (seed_x, seed_z, seed_span);
        let mut facing = first_edge;
        let area = self.areas[seed_span];

        for _ in 0..MAX_WALK_STEPS {
            if edges[span] & facing.mask() != 0 {
                points.push(self.edge_vertex(x, z, span, facing, area));
                edges[span] &= !facing.mask();
                facing = facing.clockwise();
            } else {
                let Some((n_x, n_z, n_span)) = self.neighbor(x as i32, z as i32, span, facing)
                else {
                    // A cleared edge bit promises a crossable connection.
                    return Err(ContourSetError::MissingConnection {
                        x,
                        z,
                        direction: facing,
                    });
                };
                (x, z, span) = (n_x as u16, n_z as u16, n_span);
                facing = facing.counter_clockwise();
            }
            if (span, facing) == start {
                return Ok(());
            }
        }
        tracing::warn!("Contour walk at ({x}, {z}) did not close after {MAX_WALK_STEPS} steps");
        Err(ContourSetError::MalformedConnectivity {
            x,
            z,
            max_steps: MAX_WALK_STEPS,
        })
    }

    /// The contour vertex for the outward edge of `span` in direction
    /// `facing`: the clockwise-trailing corner of that cell side, tagged with
    /// the region behind the edge.
    fn edge_vertex(
        &self,
        x: u16,
        z: u16,
        span: usize,
        facing: Direction,
        walk_area: AreaType,
    ) -> (U16Vec3, RegionVertexId) {
        let (height, is_border_vertex) = self.corner_height(x, z, span, facing);
        let (corner_x, corner_z) = match facing {
            Direction::West => (x, z + 1),
            Direction::North => (x + 1, z + 1),
            Direction::East => (x + 1, z),
            Direction::South => (x, z),
        };

        let mut tag = RegionVertexId::NONE;
        if let Some((_, _, neighbor)) = self.neighbor(x as i32, z as i32, span, facing) {
            tag = RegionVertexId::from(self.spans[neighbor].region);
            if self.areas[neighbor] != walk_area {
                tag |= RegionVertexId::AREA_BORDER;
            }
        }
        if is_border_vertex {
            tag |= RegionVertexId::BORDER_VERTEX;
        }
        (U16Vec3::new(corner_x, height, corner_z), tag)
    }

    /// The height of the corner between `facing` and its clockwise successor,
    /// plus whether that corner is a border vertex that will be removed when
    /// stitching tiles.
    fn corner_height(&self, x: u16, z: u16, span: usize, facing: Direction) -> (u16, bool) {
        let clockwise = facing.clockwise();
        let (x, z) = (x as i32, z as i32);

        // The corner is shared by up to four spans: this one, both side
        // neighbors, and the diagonal, reachable through either side.
        let side_a = self.neighbor(x, z, span, facing);
        let diagonal_a = side_a.and_then(|(a_x, a_z, a)| self.neighbor(a_x, a_z, a, clockwise));
        let side_b = self.neighbor(x, z, span, clockwise);
        let diagonal_b = side_b.and_then(|(b_x, b_z, b)| self.neighbor(b_x, b_z, b, facing));

        let mut height = self.spans[span].floor;
        for (_, _, probed) in [side_a, diagonal_a, side_b, diagonal_b].into_iter().flatten() {
            height = height.max(self.spans[probed].floor);
        }

        // Region and area code of each slot around the corner, combined into
        // one word so a border vertex between two areas is not dropped. Both
        // diagonal probes fill the same slot; the one through the clockwise
        // side wins when both connections exist.
        let slot_tag = |probe: Option<(i32, i32, usize)>| {
            probe
                .map(|(_, _, i)| {
                    RegionVertexId::from(
                        self.spans[i].region.bits() as u32 | ((self.areas[i].0 as u32) << 16),
                    )
                })
                .unwrap_or(RegionVertexId::NONE)
        };
        let corner_slots = [
            slot_tag(Some((x, z, span))),
            slot_tag(side_a),
            slot_tag(diagonal_b.or(diagonal_a)),
            slot_tag(side_b),
        ];

        (height, is_border_vertex(&corner_slots))
    }
}

/// A corner is a border vertex when, in some rotation of the four slots
/// around it, two equal border regions are followed by two non-border
/// regions of the same area, with no slot empty. Such vertices are later
/// removed to match up segments at tile boundaries.
fn is_border_vertex(slots: &[RegionVertexId; 4]) -> bool {
    for rotation in 0..4_usize {
        let [a, b, c, d] = std::array::from_fn(|k| slots[(rotation + k) & 0x3]);

        let paired_exteriors = a == b && a.contains(RegionId::BORDER_REGION.into());
        let open_interiors = !(c | d).contains(RegionId::BORDER_REGION.into());
        let same_interior_area = (c.bits() >> 16) == (d.bits() >> 16);
        let all_present = [a, b, c, d]
            .iter()
            .all(|slot| *slot != RegionVertexId::NONE);
        if paired_exteriors && open_interiors && same_interior_area && all_present {
            return true;
        }
    }
    false
}

fn simplify_contour(
    points: &[(U16Vec3, RegionVertexId)],
    simplified: &mut Vec<(U16Vec3, RegionVertexId)>,
    max_error: f32,
    max_edge_len: u16,
    flags: BuildContoursFlags,
) {
    let pn = points.len();

    // Add initial points.
    let has_connections = points
        .iter()
        .any(|(_p, r)| r.intersects(RegionVertexId::REGION_MASK));

    // The working set carries each vertex together with the index of the raw
    // point it came from.
    let mut work: Vec<(U16Vec3, usize)> = Vec::with_capacity(64);

    if has_connections {
        // The contour has some portals to other regions.
        // Add a new point to every location where the region changes.
        for (i, (point, region)) in points.iter().enumerate() {
            let ii = (i + 1) % pn;
            let next_region = &points[ii].1;
            let different_regs = RegionId::from(*region) != RegionId::from(*next_region);
            let area_borders = region.contains(RegionVertexId::AREA_BORDER)
                != next_region.contains(RegionVertexId::AREA_BORDER);
            if different_regs || area_borders {
                work.push((*point, i));
            }
        }
    }
    if work.is_empty() {
        // If there are no connections at all,
        // create some initial points for the simplification process.
        // Find lower-left and upper-right vertices of the contour.
        let (mut ll, mut lli) = (points[0].0, 0);
        let (mut ur, mut uri) = (points[0].0, 0);
        for (i, (p, _r)) in points.iter().enumerate() {
            if p.x < ll.x || (p.x == ll.x && p.z < ll.z) {
                ll = *p;
                lli = i;
            }
            if p.x > ur.x || (p.x == ur.x && p.z > ur.z) {
                ur = *p;
                uri = i;
            }
        }
        work.push((ll, lli));
        work.push((ur, uri));
    }

    // Add points until all raw points are within the error tolerance
    // of the simplified shape.
    let mut i = 0;
    while i < work.len() {
        let ii = (i + 1) % work.len();

        let (a, ai) = work[i];
        let (b, bi) = work[ii];
        let (mut ax, mut az) = (a.x as i32, a.z as i32);
        let (mut bx, mut bz) = (b.x as i32, b.z as i32);

        // Traverse the segment in lexilogical order so that the
        // max deviation is calculated similarly when traversing
        // opposite segments.
        let cinc;
        let mut ci;
        let endi;
        if bx > ax || (bx == ax && bz > az) {
            cinc = 1;
            ci = (ai + cinc) % pn;
            endi = bi;
        } else {
            cinc = pn - 1;
            ci = (bi + cinc) % pn;
            endi = ai;
            std::mem::swap(&mut ax, &mut bx);
            std::mem::swap(&mut az, &mut bz);
        }

        let mut max_dev = 0.0_f32;
        let mut max_i = None;

        // Tessellate only outer edges or edges between areas.
        let c_region = &points[ci].1;
        if !c_region.intersects(RegionVertexId::REGION_MASK)
            || c_region.contains(RegionVertexId::AREA_BORDER)
        {
            while ci != endi {
                let c = points[ci].0;
                let dev = distance_pt_seg_2d(c.x as i32, c.z as i32, ax, az, bx, bz);
                if dev > max_dev {
                    max_dev = dev;
                    max_i = Some(ci);
                }
                ci = (ci + cinc) % pn;
            }
        }

        // If the max deviation is larger than accepted error,
        // add a new point, else continue to next segment.
        if let Some(max_i) = max_i
            && max_dev > max_error * max_error
        {
            work.insert(i + 1, (points[max_i].0, max_i));
        } else {
            i += 1;
        }
    }

    // Split too long edges.
    if max_edge_len > 0
        && flags.intersects(
            BuildContoursFlags::TESSELLATE_SOLID_WALL_EDGES
                | BuildContoursFlags::TESSELLATE_AREA_EDGES,
        )
    {
        let max_edge_len_sq = max_edge_len as i32 * max_edge_len as i32;
        let mut i = 0;
        while i < work.len() {
            let ii = (i + 1) % work.len();

            let (a, ai) = work[i];
            let (b, bi) = work[ii];

            // Check if the segment should be split.
            let mut max_i = None;
            let ci = (ai + 1) % pn;
            let c_region = &points[ci].1;
            let tessellate = (flags.contains(BuildContoursFlags::TESSELLATE_SOLID_WALL_EDGES)
                && !c_region.intersects(RegionVertexId::REGION_MASK))
                || (flags.contains(BuildContoursFlags::TESSELLATE_AREA_EDGES)
                    && c_region.contains(RegionVertexId::AREA_BORDER));
            if tessellate {
                let dx = b.x as i32 - a.x as i32;
                let dz = b.z as i32 - a.z as i32;
                if dx * dx + dz * dz > max_edge_len_sq {
                    // Round based on the segments in lexilogical order so that the
                    // max tesselation is consistent regardless in which direction
                    // segments are traversed.
                    let n = if bi < ai { bi + pn - ai } else { bi - ai };
                    if n > 1 {
                        max_i = if b.x > a.x || (b.x == a.x && b.z > a.z) {
                            Some((ai + n / 2) % pn)
                        } else {
                            Some((ai + (n + 1) / 2) % pn)
                        };
                    }
                }
            }

            if let Some(max_i) = max_i {
                work.insert(i + 1, (points[max_i].0, max_i));
            } else {
                i += 1;
            }
        }
    }

    simplified.clear();
    simplified.extend(work.iter().map(|(p, vi)| {
        // The edge vertex flag is taken from the current raw point,
        // and the neighbour region is taken from the next raw point.
        let bi = *vi;
        let ai = (bi + 1) % pn;
        let tag = (points[ai].1 & (RegionVertexId::REGION_MASK | RegionVertexId::AREA_BORDER))
            | (points[bi].1 & RegionVertexId::BORDER_VERTEX);
        (*p, tag)
    }));
}

/// Removes adjacent vertices which are equal on the xz-plane,
/// or else the triangulator downstream gets confused.
fn remove_degenerate_segments(simplified: &mut Vec<(U16Vec3, RegionVertexId)>) {
    let mut i = 0;
    while i < simplified.len() {
        let ni = next(i, simplified.len());
        let p = simplified[i].0;
        let np = simplified[ni].0;
        if p.x == np.x && p.z == np.z {
            // Degenerate segment, remove.
            simplified.remove(i);
        }
        i += 1;
    }
}

/// Splices contours that wind backwards into another contour of the same
/// region. A backwards loop is the inner boundary of a region with a hole.
fn merge_backwards_contours(contours: &mut Vec<Contour>) {
    for i in 0..contours.len() {
        if contours[i].vertices.is_empty() || polygon_area_2d(&contours[i].vertices) >= 0 {
            continue;
        }
        let Some(host) = (0..contours.len()).find(|&j| {
            j != i
                && !contours[j].vertices.is_empty()
                && contours[j].region == contours[i].region
                && polygon_area_2d(&contours[j].vertices) > 0
        }) else {
            tracing::warn!(
                "No merge host found for backwards contour of region {:?}",
                contours[i].region
            );
            continue;
        };
        let hole = std::mem::take(&mut contours[i].vertices);
        let Some((ia, ib)) = get_closest_indices(&contours[host].vertices, &hole) else {
            tracing::warn!(
                "No closest points found to merge backwards contour of region {:?}",
                contours[i].region
            );
            contours[i].vertices = hole;
            continue;
        };
        let merged = merge_contour_vertices(&contours[host].vertices, &hole, ia, ib);
        contours[host].vertices = merged;
    }
    contours.retain(|contour| !contour.vertices.is_empty());
}

/// The signed area of the contour on the xz-plane. Positive for the winding
/// produced by a boundary walk, negative for hole loops.
fn polygon_area_2d(verts: &[(U16Vec3, RegionVertexId)]) -> i32 {
    let mut area = 0_i32;
    let mut j = verts.len() - 1;
    for i in 0..verts.len() {
        let vi = verts[i].0;
        let vj = verts[j].0;
        area += vi.x as i32 * vj.z as i32 - vj.x as i32 * vi.z as i32;
        j = i;
    }
    (area + 1) / 2
}

/// Finds the closest vertex pair between the two contours such that the hole
/// vertex lies in front of the host vertex.
fn get_closest_indices(
    host: &[(U16Vec3, RegionVertexId)],
    hole: &[(U16Vec3, RegionVertexId)],
) -> Option<(usize, usize)> {
    let mut closest = None;
    let mut closest_dist = i32::MAX;
    let na = host.len();
    for (i, (va, _)) in host.iter().enumerate() {
        let van = host[next(i, na)].0;
        let vap = host[prev(i, na)].0;
        for (j, (vb, _)) in hole.iter().enumerate() {
            // vb must be "infront" of va.
            if !ileft(vap, *va, *vb) || !ileft(*va, van, *vb) {
                continue;
            }
            let dx = vb.x as i32 - va.x as i32;
            let dz = vb.z as i32 - va.z as i32;
            let d = dx * dx + dz * dz;
            if d < closest_dist {
                closest = Some((i, j));
                closest_dist = d;
            }
        }
    }
    closest
}

/// Returns true iff c is to the left of or on the directed line through a to b.
#[inline]
fn ileft(a: U16Vec3, b: U16Vec3, c: U16Vec3) -> bool {
    (b.x as i32 - a.x as i32) * (c.z as i32 - a.z as i32)
        - (c.x as i32 - a.x as i32) * (b.z as i32 - a.z as i32)
        <= 0
}

/// Splices the hole loop into the host loop at the given vertex indices,
/// duplicating both splice points so the result stays closed.
fn merge_contour_vertices(
    host: &[(U16Vec3, RegionVertexId)],
    hole: &[(U16Vec3, RegionVertexId)],
    ia: usize,
    ib: usize,
) -> Vec<(U16Vec3, RegionVertexId)> {
    let mut merged = Vec::with_capacity(host.len() + hole.len() + 2);
    for k in 0..=host.len() {
        merged.push(host[(ia + k) % host.len()]);
    }
    for k in 0..=hole.len() {
        merged.push(hole[(ib + k) % hole.len()]);
    }
    merged
}

/// Squared distance of `(x, z)` to the segment `(px, pz)`-`(qx, qz)`.
fn distance_pt_seg_2d(x: i32, z: i32, px: i32, pz: i32, qx: i32, qz: i32) -> f32 {
    let pqx = (qx - px) as f32;
    let pqz = (qz - pz) as f32;
    let mut dx = (x - px) as f32;
    let mut dz = (z - pz) as f32;
    let d = pqx * pqx + pqz * pqz;
    let mut t = pqx * dx + pqz * dz;
    if d > 0.0 {
        t /= d;
    }
    t = t.clamp(0.0, 1.0);

    dx = px as f32 + t * pqx - x as f32;
    dz = pz as f32 + t * pqz - z as f32;
    dx * dx + dz * dz
}

/// Represents a group of related contours.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourSet {
    /// An array of the contours in the set.
    contours: Vec<Contour>,
    /// The AABB in world space
    pub aabb: Aabb3d,
    /// The size of each cell. (On the xz-plane.)
    pub cell_size: f32,
    /// The height of each cell. (The minimum increment along the y-axis.)
    pub cell_height: f32,
    /// The width of the set. (Along the x-axis in cell units.)
    pub width: u16,
    /// The height of the set. (Along the z-axis in cell units.)
    pub height: u16,
    /// The AABB border size used to generate the source data from which the contours were derived.
    pub border_size: u16,
    /// The max edge error that this contour set was simplified with.
    pub max_error: f32,
}

impl ContourSet {
    /// The contours in the set, in discovery order.
    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    /// The number of contours in the set.
    pub fn len(&self) -> usize {
        self.contours.len()
    }

    /// Whether the set contains no contours.
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    /// Iterates over the contours in the set.
    pub fn iter(&self) -> std::slice::Iter<'_, Contour> {
        self.contours.iter()
    }
}

impl<'a> IntoIterator for &'a ContourSet {
    type Item = &'a Contour;
    type IntoIter = std::slice::Iter<'a, Contour>;

    fn into_iter(self) -> Self::IntoIter {
        self.contours.iter()
    }
}

/// Represents a simple, non-overlapping contour in field space.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Contour {
    /// Simplified contour vertex and connection data.
    pub vertices: Vec<(U16Vec3, RegionVertexId)>,
    /// Raw contour vertex and connection data.
    pub raw_vertices: Vec<(U16Vec3, RegionVertexId)>,
    /// Region ID of the contour.
    pub region: RegionId,
    /// Area type of the contour.
    pub area: AreaType,
}

bitflags::bitflags! {
    /// The tag of a contour vertex: the neighbor region behind the edge it
    /// lies on, plus flags describing the vertex itself.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RegionVertexId: u32 {
        /// No neighbor region and no flags.
        const NONE = 0;

        /// Applied to the region id field of contour vertices in order to extract the region id.
        /// The region id field of a vertex may have several flags applied to it. So the
        /// field's value can't be used directly.
        const REGION_MASK = RegionId::MAX.bits() as u32;

        /// Border vertex flag.
        /// If a region ID has this bit set, then the associated element lies on
        /// a tile border. If a contour vertex's region ID has this bit set, the
        /// vertex will later be removed in order to match the segments and vertices
        /// at tile boundaries.
        /// (Used during the build process.)
        const BORDER_VERTEX = 0x10_000;

        /// Area border flag.
        /// If a region ID has this bit set, then the associated element lies on
        /// the border of an area.
        /// (Used during the region and contour build process.)
        const AREA_BORDER = 0x20_000;
    }
}

impl From<u32> for RegionVertexId {
    fn from(bits: u32) -> Self {
        RegionVertexId::from_bits_retain(bits)
    }
}

impl From<RegionId> for RegionVertexId {
    fn from(region_id: RegionId) -> Self {
        RegionVertexId::from_bits_retain(region_id.bits() as u32)
    }
}

impl From<RegionVertexId> for RegionId {
    fn from(region_vertex_id: RegionVertexId) -> Self {
        let bits = region_vertex_id.bits() & RegionVertexId::REGION_MASK.bits();
        RegionId::from_bits_retain(bits as u16)
    }
}

bitflags::bitflags! {
    /// Contour build flags used in [`CompactHeightfield::build_contours`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    #[repr(transparent)]
    pub struct BuildContoursFlags: u8 {
        /// Tessellate solid (impassable) edges during contour simplification.
        const TESSELLATE_SOLID_WALL_EDGES = 1;
        /// Tessellate edges between areas during contour simplification.
        const TESSELLATE_AREA_EDGES = 2;

        /// Default flags for building contours.
        const DEFAULT = Self::TESSELLATE_SOLID_WALL_EDGES.bits();
    }
}

impl Default for BuildContoursFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Errors that can occur when building a [`ContourSet`].
#[derive(Debug, Error)]
pub enum ContourSetError {
    /// A contour walk failed to close within its step budget, which indicates
    /// malformed connectivity data in the input field.
    #[error(
        "Contour walk at ({x}, {z}) did not close after {max_steps} steps; the field's region connectivity is malformed"
    )]
    MalformedConnectivity {
        /// The x coordinate of the cell the walker stopped in.
        x: u16,
        /// The z coordinate of the cell the walker stopped in.
        z: u16,
        /// The step budget that was exhausted.
        max_steps: u32,
    },
    /// A contour walk tried to step across a connection that does not exist.
    #[error("Contour walk at ({x}, {z}) stepped {direction:?} without a connection")]
    MissingConnection {
        /// The x coordinate of the cell the walker was in.
        x: u16,
        /// The z coordinate of the cell the walker was in.
        z: u16,
        /// The direction that was missing a connection.
        direction: Direction,
    },
}

#[cfg(test)]
mod tests {
    use glam::u16vec3;

    use super::*;

    fn untagged(points: &[(u16, u16)]) -> Vec<(U16Vec3, RegionVertexId)> {
        points
            .iter()
            .map(|&(x, z)| (u16vec3(x, 0, z), RegionVertexId::NONE))
            .collect()
    }

    #[test]
    fn distance_is_zero_on_the_segment() {
        assert_eq!(distance_pt_seg_2d(2, 2, 1, 1, 3, 3), 0.0);
        assert_eq!(distance_pt_seg_2d(1, 1, 1, 1, 3, 3), 0.0);
    }

    #[test]
    fn distance_is_squared_perpendicular_distance() {
        assert_eq!(distance_pt_seg_2d(2, 0, 0, 1, 4, 1), 1.0);
        assert_eq!(distance_pt_seg_2d(1, 3, 1, 1, 3, 3), 2.0);
    }

    #[test]
    fn distance_clamps_to_the_segment_ends() {
        assert_eq!(distance_pt_seg_2d(5, 1, 0, 1, 4, 1), 1.0);
        assert_eq!(distance_pt_seg_2d(-2, 1, 0, 1, 4, 1), 4.0);
    }

    #[test]
    fn walk_winding_has_positive_area() {
        // The vertex order a boundary walk produces for a 2x2 square.
        let square = untagged(&[(1, 1), (1, 3), (3, 3), (3, 1)]);
        assert_eq!(polygon_area_2d(&square), 4);

        let mut reversed = square;
        reversed.reverse();
        assert!(polygon_area_2d(&reversed) < 0);
    }

    #[test]
    fn degenerate_segments_are_removed_by_xz_position() {
        let mut simplified = vec![
            (u16vec3(0, 0, 0), RegionVertexId::NONE),
            (u16vec3(2, 0, 0), RegionVertexId::NONE),
            // Same xz as its successor, different height.
            (u16vec3(2, 5, 2), RegionVertexId::NONE),
            (u16vec3(2, 0, 2), RegionVertexId::NONE),
            (u16vec3(0, 0, 2), RegionVertexId::NONE),
        ];
        remove_degenerate_segments(&mut simplified);
        assert_eq!(
            simplified,
            vec![
                (u16vec3(0, 0, 0), RegionVertexId::NONE),
                (u16vec3(2, 0, 0), RegionVertexId::NONE),
                (u16vec3(2, 0, 2), RegionVertexId::NONE),
                (u16vec3(0, 0, 2), RegionVertexId::NONE),
            ]
        );
    }

    #[test]
    fn merged_loops_duplicate_both_splice_points() {
        let host = untagged(&[(0, 0), (0, 4), (4, 4), (4, 0)]);
        let hole = untagged(&[(1, 1), (3, 1), (3, 3), (1, 3)]);
        let merged = merge_contour_vertices(&host, &hole, 1, 3);
        assert_eq!(merged.len(), host.len() + hole.len() + 2);
        // Host walked from the splice point all the way around, inclusive.
        assert_eq!(merged[0].0, u16vec3(0, 0, 4));
        assert_eq!(merged[host.len()].0, u16vec3(0, 0, 4));
        // Then the hole, also inclusive.
        assert_eq!(merged[host.len() + 1].0, u16vec3(1, 0, 3));
        assert_eq!(merged.last().unwrap().0, u16vec3(1, 0, 3));
    }

    #[test]
    fn simplification_is_idempotent_on_a_wall_loop() {
        // Raw boundary of a 2x2 square region, as produced by a walk.
        let raw = untagged(&[
            (1, 2),
            (1, 3),
            (2, 3),
            (3, 3),
            (3, 2),
            (3, 1),
            (2, 1),
            (1, 1),
        ]);
        let mut simplified = Vec::new();
        simplify_contour(&raw, &mut simplified, 1.0, 0, BuildContoursFlags::default());
        let first: Vec<_> = simplified.iter().map(|(p, _)| *p).collect();
        assert_eq!(first.len(), 4);

        // Feeding the output back in adds no vertices.
        let mut again = Vec::new();
        simplify_contour(
            &simplified,
            &mut again,
            1.0,
            0,
            BuildContoursFlags::default(),
        );
        let second: Vec<_> = again.iter().map(|(p, _)| *p).collect();
        assert_eq!(first.len(), second.len());
    }
}
