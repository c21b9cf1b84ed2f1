use glam::U16Vec3;

/// A value which indicates the end of a polygon's vertex list when the
/// polygon has fewer vertices than the mesh's maximum.
pub const MESH_NULL_IDX: u16 = 0xffff;

/// A node of a [`BvTree`].
///
/// Bounds are in vertex units: x and z match the mesh vertices, y is
/// quantized by the cell height to cell size ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BvNode {
    /// The minimum corner of the node's bounding box.
    pub min: U16Vec3,
    /// The maximum corner of the node's bounding box.
    pub max: U16Vec3,
    /// The polygon index if this is a leaf (`index >= 0`), otherwise the
    /// negated escape offset: the number of nodes to skip, starting from this
    /// one, to reach the subtree's successor.
    pub index: i32,
}

/// A flat bounding-volume tree over the polygons of a polygon mesh,
/// laid out in preorder so a traversal never needs child pointers: visiting
/// nodes in array order descends the tree, and adding an internal node's
/// escape offset to the cursor skips its subtree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BvTree {
    nodes: Vec<BvNode>,
}

#[derive(Debug, Clone, Copy)]
struct BvItem {
    min: U16Vec3,
    max: U16Vec3,
    polygon: i32,
}

impl BvTree {
    /// Builds the tree over the given polygons.
    ///
    /// `polygons` holds `vertices_per_polygon` vertex indices per polygon,
    /// terminated early by [`MESH_NULL_IDX`] for polygons with fewer vertices.
    /// `cell_size` and `cell_height` are the xz and y quantization of the grid
    /// the mesh was built on; they rescale vertex heights into xz units so the
    /// boxes are meaningful in a single unit.
    ///
    /// A mesh with `n` polygons produces `2n - 1` nodes; an empty mesh
    /// produces an empty tree.
    pub fn new(
        vertices: &[U16Vec3],
        polygons: &[u16],
        vertices_per_polygon: usize,
        cell_size: f32,
        cell_height: f32,
    ) -> Self {
        let polygon_count = polygons.len() / vertices_per_polygon;
        if polygon_count == 0 {
            return Self::default();
        }

        let quant_factor = cell_height / cell_size;
        let mut items: Vec<BvItem> = polygons
            .chunks_exact(vertices_per_polygon)
            .enumerate()
            .map(|(polygon, indices)| {
                let mut min = vertices[indices[0] as usize];
                let mut max = min;
                for &index in &indices[1..] {
                    if index == MESH_NULL_IDX {
                        break;
                    }
                    let vertex = vertices[index as usize];
                    min = min.min(vertex);
                    max = max.max(vertex);
                }
                // Remap y
                min.y = (min.y as f32 * quant_factor).floor() as u16;
                max.y = (max.y as f32 * quant_factor).ceil() as u16;
                BvItem {
                    min,
                    max,
                    polygon: polygon as i32,
                }
            })
            .collect();

        let mut nodes = vec![BvNode::default(); polygon_count * 2];
        let mut cur_node = 0;
        subdivide(&mut items, 0, polygon_count, &mut cur_node, &mut nodes);
        nodes.truncate(cur_node);
        Self { nodes }
    }

    /// The nodes of the tree in preorder.
    pub fn nodes(&self) -> &[BvNode] {
        &self.nodes
    }

    /// The number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree contains no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl std::ops::Index<usize> for BvTree {
    type Output = BvNode;

    fn index(&self, index: usize) -> &Self::Output {
        &self.nodes[index]
    }
}

fn subdivide(
    items: &mut [BvItem],
    imin: usize,
    imax: usize,
    cur_node: &mut usize,
    nodes: &mut [BvNode],
) {
    let inum = imax - imin;
    let icur = *cur_node;
    let node = *cur_node;
    *cur_node += 1;

    if inum == 1 {
        // Leaf
        let item = &items[imin];
        nodes[node] = BvNode {
            min: item.min,
            max: item.max,
            index: item.polygon,
        };
        return;
    }

    // Split
    let (min, max) = calc_extends(&items[imin..imax]);
    let axis = longest_axis(max.x - min.x, max.y - min.y, max.z - min.z);
    items[imin..imax].sort_by_key(|item| match axis {
        0 => item.min.x,
        1 => item.min.y,
        _ => item.min.z,
    });

    let isplit = imin + inum / 2;
    subdivide(items, imin, isplit, cur_node, nodes);
    subdivide(items, isplit, imax, cur_node, nodes);

    let iescape = (*cur_node - icur) as i32;
    nodes[node] = BvNode {
        min,
        max,
        index: -iescape,
    };
}

fn calc_extends(items: &[BvItem]) -> (U16Vec3, U16Vec3) {
    let mut min = items[0].min;
    let mut max = items[0].max;
    for item in &items[1..] {
        min = min.min(item.min);
        max = max.max(item.max);
    }
    (min, max)
}

/// The axis with the largest extent. Ties resolve to the earlier axis.
fn longest_axis(x: u16, y: u16, z: u16) -> u8 {
    let mut axis = 0;
    let mut max_axis = x;
    if y > max_axis {
        axis = 1;
        max_axis = y;
    }
    if z > max_axis {
        axis = 2;
    }
    axis
}

#[cfg(test)]
mod tests {
    use glam::u16vec3;

    use super::*;

    /// Recursively checks that the subtree rooted at `node` spans exactly
    /// `[node, end)`, that internal boxes are the union of their children, and
    /// collects the leaf polygon indices. Returns the subtree's successor.
    fn check_subtree(tree: &BvTree, node: usize, end: usize, leaves: &mut Vec<i32>) -> usize {
        assert!(node < end);
        if tree[node].index >= 0 {
            leaves.push(tree[node].index);
            return node + 1;
        }
        let sub_end = node + (-tree[node].index) as usize;
        assert!(sub_end <= end, "escape offset leaves the subtree");
        let mut min = None;
        let mut max = None;
        let mut child = node + 1;
        while child < sub_end {
            min = Some(
                min.map(|m: U16Vec3| m.min(tree[child].min))
                    .unwrap_or(tree[child].min),
            );
            max = Some(
                max.map(|m: U16Vec3| m.max(tree[child].max))
                    .unwrap_or(tree[child].max),
            );
            child = check_subtree(tree, child, sub_end, leaves);
        }
        assert_eq!(child, sub_end);
        assert_eq!(Some(tree[node].min), min, "internal box must cover children");
        assert_eq!(Some(tree[node].max), max, "internal box must cover children");
        sub_end
    }

    fn triangle_mesh(triangles: &[[U16Vec3; 3]]) -> (Vec<U16Vec3>, Vec<u16>) {
        let mut vertices = Vec::new();
        let mut polygons = Vec::new();
        for triangle in triangles {
            for vertex in triangle {
                polygons.push(vertices.len() as u16);
                vertices.push(*vertex);
            }
        }
        (vertices, polygons)
    }

    #[test]
    fn empty_mesh_produces_empty_tree() {
        let tree = BvTree::new(&[], &[], 6, 0.3, 0.2);
        assert!(tree.is_empty());
    }

    #[test]
    fn single_polygon_produces_one_leaf() {
        let (vertices, polygons) = triangle_mesh(&[[
            u16vec3(0, 0, 0),
            u16vec3(2, 0, 0),
            u16vec3(2, 0, 2),
        ]]);
        let tree = BvTree::new(&vertices, &polygons, 3, 1.0, 1.0);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].index, 0);
        assert_eq!(tree[0].min, u16vec3(0, 0, 0));
        assert_eq!(tree[0].max, u16vec3(2, 0, 2));
    }

    #[test]
    fn two_polygons_produce_root_and_two_leaves() {
        let (vertices, polygons) = triangle_mesh(&[
            [u16vec3(0, 0, 0), u16vec3(1, 0, 0), u16vec3(1, 0, 1)],
            [u16vec3(10, 0, 10), u16vec3(11, 0, 10), u16vec3(11, 0, 11)],
        ]);
        let tree = BvTree::new(&vertices, &polygons, 3, 1.0, 1.0);
        assert_eq!(tree.len(), 3);

        let root = tree[0];
        assert_eq!(root.index, -3);
        assert_eq!(root.min, u16vec3(0, 0, 0));
        assert_eq!(root.max, u16vec3(11, 0, 11));

        assert_eq!(tree[1].index, 0);
        assert_eq!(tree[2].index, 1);
    }

    #[test]
    fn vertex_heights_are_quantized_into_xz_units() {
        let (vertices, polygons) = triangle_mesh(&[[
            u16vec3(0, 3, 0),
            u16vec3(2, 5, 0),
            u16vec3(2, 5, 2),
        ]]);
        // quantization factor 0.5: floor(3 * 0.5) = 1, ceil(5 * 0.5) = 3
        let tree = BvTree::new(&vertices, &polygons, 3, 0.4, 0.2);
        assert_eq!(tree[0].min.y, 1);
        assert_eq!(tree[0].max.y, 3);
    }

    #[test]
    fn null_index_terminates_a_polygon() {
        let vertices = vec![
            u16vec3(0, 0, 0),
            u16vec3(4, 0, 0),
            u16vec3(4, 0, 4),
            u16vec3(0, 0, 4),
        ];
        // A quad padded with null indices to a max of 6 vertices.
        let polygons = vec![0, 1, 2, 3, MESH_NULL_IDX, MESH_NULL_IDX];
        let tree = BvTree::new(&vertices, &polygons, 6, 1.0, 1.0);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].min, u16vec3(0, 0, 0));
        assert_eq!(tree[0].max, u16vec3(4, 0, 4));
    }

    #[test]
    fn longest_axis_resolves_ties_in_axis_order() {
        assert_eq!(longest_axis(3, 3, 3), 0);
        assert_eq!(longest_axis(1, 2, 2), 1);
        assert_eq!(longest_axis(1, 2, 3), 2);
        assert_eq!(longest_axis(5, 2, 3), 0);
    }

    #[test]
    fn tree_structure_is_valid_for_a_polygon_grid() {
        // A 4x2 grid of unit quads.
        let mut triangles = Vec::new();
        for z in 0..2_u16 {
            for x in 0..4_u16 {
                triangles.push([
                    u16vec3(x, 0, z),
                    u16vec3(x + 1, 0, z),
                    u16vec3(x + 1, 0, z + 1),
                ]);
            }
        }
        let (vertices, polygons) = triangle_mesh(&triangles);
        let tree = BvTree::new(&vertices, &polygons, 3, 1.0, 1.0);
        assert_eq!(tree.len(), triangles.len() * 2 - 1);

        let mut leaves = Vec::new();
        let end = check_subtree(&tree, 0, tree.len(), &mut leaves);
        assert_eq!(end, tree.len());

        // Every polygon appears in exactly one leaf.
        leaves.sort_unstable();
        let expected: Vec<i32> = (0..triangles.len() as i32).collect();
        assert_eq!(leaves, expected);
    }

    #[test]
    fn construction_is_deterministic() {
        let (vertices, polygons) = triangle_mesh(&[
            [u16vec3(0, 0, 0), u16vec3(3, 0, 0), u16vec3(3, 0, 3)],
            [u16vec3(3, 0, 0), u16vec3(6, 0, 0), u16vec3(6, 0, 3)],
            [u16vec3(0, 0, 3), u16vec3(3, 0, 3), u16vec3(3, 0, 6)],
        ]);
        let a = BvTree::new(&vertices, &polygons, 3, 0.3, 0.2);
        let b = BvTree::new(&vertices, &polygons, 3, 0.3, 0.2);
        assert_eq!(a, b);
    }
}
