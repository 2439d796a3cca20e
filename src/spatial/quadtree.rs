//! Barnes-Hut quadtree for O(n log n) force approximation.
//!
//! The quadtree recursively subdivides space and computes the center of mass
//! for each cell. Distant cells can be approximated as single points,
//! reducing the O(n²) pairwise charge calculation to O(n log n). The same
//! tree answers bounded neighbour queries for collision resolution.

/// A point stored in the tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadPoint {
    /// Caller-side index (node slot).
    pub index: usize,
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
    /// Charge weight.
    pub mass: f32,
}

impl QuadPoint {
    /// Create a unit-mass point.
    pub fn new(index: usize, x: f32, y: f32) -> Self {
        Self {
            index,
            x,
            y,
            mass: 1.0,
        }
    }
}

/// A cell of the flattened tree.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QuadCell {
    /// Center of mass X
    pub center_x: f32,
    /// Center of mass Y
    pub center_y: f32,
    /// Total mass of the points below this cell
    pub mass: f32,
    /// Left edge of the cell
    pub min_x: f32,
    /// Bottom edge of the cell
    pub min_y: f32,
    /// Cell width (for Barnes-Hut theta criterion)
    pub width: f32,
    /// Children (NW, NE, SW, SE), -1 when absent
    pub children: [i32; 4],
    /// First entry in the leaf point list (leaves only)
    pub first: u32,
    /// Number of points held directly (leaves only)
    pub count: u32,
}

impl QuadCell {
    /// Check whether this cell has children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(|&c| c < 0)
    }

    #[inline]
    fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min_x
            && x <= self.min_x + self.width
            && y >= self.min_y
            && y <= self.min_y + self.width
    }
}

/// A Barnes-Hut quadtree for 2D spatial partitioning.
#[derive(Debug, Clone, Default)]
pub struct QuadTree {
    /// Flattened tree cells, root first
    cells: Vec<QuadCell>,
    /// Points owned by leaves, grouped per leaf
    leaf_points: Vec<QuadPoint>,
}

impl QuadTree {
    /// Build a quadtree from points.
    ///
    /// # Arguments
    /// * `points` - Points to index
    /// * `max_depth` - Maximum tree depth (typically 10-15). Points that are
    ///   still together at this depth (e.g. coincident) share one leaf.
    pub fn build(points: &[QuadPoint], max_depth: usize) -> Self {
        if points.is_empty() {
            return Self::default();
        }

        // Find bounding box
        let mut min_x = f32::MAX;
        let mut min_y = f32::MAX;
        let mut max_x = f32::MIN;
        let mut max_y = f32::MIN;

        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        // Add padding
        let padding = ((max_x - min_x).max(max_y - min_y) * 0.1).max(1.0);
        min_x -= padding;
        min_y -= padding;
        max_x += padding;
        max_y += padding;

        // Make it square
        let width = (max_x - min_x).max(max_y - min_y);
        let center_x = (min_x + max_x) / 2.0;
        let center_y = (min_y + max_y) / 2.0;

        let mut tree = Self {
            cells: Vec::with_capacity(points.len() * 2),
            leaf_points: Vec::with_capacity(points.len()),
        };
        let mut builder = TreeBuilder {
            tree: &mut tree,
            max_depth,
        };
        builder.build_cell(
            points.to_vec(),
            center_x - width / 2.0,
            center_y - width / 2.0,
            width,
            0,
        );
        tree
    }

    /// Get the flattened cells, root first.
    pub fn cells(&self) -> &[QuadCell] {
        &self.cells
    }

    /// Check if the tree holds no points.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.leaf_points.len()
    }

    /// Visit every point in a cell whose square intersects the query square
    /// of half-size `max_distance` around (x, y).
    ///
    /// Candidates only: the visitor must do its own exact distance check, but
    /// no point within `max_distance` is ever skipped.
    pub fn for_each_neighbor<F>(&self, x: f32, y: f32, max_distance: f32, mut visitor: F)
    where
        F: FnMut(&QuadPoint),
    {
        if self.cells.is_empty() {
            return;
        }
        let mut stack = vec![0usize];
        while let Some(i) = stack.pop() {
            let cell = &self.cells[i];
            if x + max_distance < cell.min_x
                || x - max_distance > cell.min_x + cell.width
                || y + max_distance < cell.min_y
                || y - max_distance > cell.min_y + cell.width
            {
                continue;
            }
            if cell.is_leaf() {
                let start = cell.first as usize;
                for p in &self.leaf_points[start..start + cell.count as usize] {
                    visitor(p);
                }
            } else {
                stack.extend(cell.children.iter().filter(|&&c| c >= 0).map(|&c| c as usize));
            }
        }
    }

    /// Many-body acceleration on the point `index` at (x, y).
    ///
    /// A cell is treated as a single body at its center of mass when
    /// `width / distance < theta` and (x, y) lies outside it; otherwise its
    /// children are opened. Each body contributes
    /// `(dx, dy) * strength * mass / max(distance², min_distance2)`.
    /// The point itself and points coincident with (x, y) contribute nothing.
    pub fn charge_at(
        &self,
        index: usize,
        x: f32,
        y: f32,
        strength: f32,
        theta: f32,
        min_distance2: f32,
    ) -> (f32, f32) {
        if self.cells.is_empty() {
            return (0.0, 0.0);
        }
        let theta2 = theta * theta;
        let (mut ax, mut ay) = (0.0f32, 0.0f32);
        let mut stack = vec![0usize];

        while let Some(i) = stack.pop() {
            let cell = &self.cells[i];
            if cell.mass == 0.0 {
                continue;
            }

            if cell.is_leaf() {
                let start = cell.first as usize;
                for p in &self.leaf_points[start..start + cell.count as usize] {
                    if p.index == index {
                        continue;
                    }
                    let dx = p.x - x;
                    let dy = p.y - y;
                    let l2 = dx * dx + dy * dy;
                    if l2 == 0.0 {
                        continue;
                    }
                    let scale = strength * p.mass / l2.max(min_distance2);
                    ax += dx * scale;
                    ay += dy * scale;
                }
                continue;
            }

            let dx = cell.center_x - x;
            let dy = cell.center_y - y;
            let l2 = dx * dx + dy * dy;
            if theta2 > 0.0 && cell.width * cell.width < theta2 * l2 && !cell.contains(x, y) {
                let scale = strength * cell.mass / l2.max(min_distance2);
                ax += dx * scale;
                ay += dy * scale;
            } else {
                stack.extend(cell.children.iter().filter(|&&c| c >= 0).map(|&c| c as usize));
            }
        }

        (ax, ay)
    }
}

struct TreeBuilder<'a> {
    tree: &'a mut QuadTree,
    max_depth: usize,
}

impl TreeBuilder<'_> {
    fn build_cell(&mut self, points: Vec<QuadPoint>, x: f32, y: f32, width: f32, depth: usize) -> i32 {
        if points.is_empty() {
            return -1;
        }

        let cell_idx = self.tree.cells.len();
        self.tree.cells.push(QuadCell::default());

        // Compute center of mass
        let mut mass = 0.0;
        let mut com_x = 0.0;
        let mut com_y = 0.0;
        for p in &points {
            mass += p.mass;
            com_x += p.x * p.mass;
            com_y += p.y * p.mass;
        }
        if mass > 0.0 {
            com_x /= mass;
            com_y /= mass;
        } else {
            com_x = x + width / 2.0;
            com_y = y + width / 2.0;
        }

        let mut cell = QuadCell {
            center_x: com_x,
            center_y: com_y,
            mass,
            min_x: x,
            min_y: y,
            width,
            children: [-1; 4],
            first: 0,
            count: 0,
        };

        // If leaf (single point or max depth), store points directly
        if points.len() == 1 || depth >= self.max_depth {
            cell.first = self.tree.leaf_points.len() as u32;
            cell.count = points.len() as u32;
            self.tree.leaf_points.extend(points);
            self.tree.cells[cell_idx] = cell;
            return cell_idx as i32;
        }

        // Subdivide into quadrants
        let half_width = width / 2.0;
        let mid_x = x + half_width;
        let mid_y = y + half_width;

        let mut nw = Vec::new();
        let mut ne = Vec::new();
        let mut sw = Vec::new();
        let mut se = Vec::new();

        for p in points {
            if p.x < mid_x {
                if p.y < mid_y {
                    sw.push(p);
                } else {
                    nw.push(p);
                }
            } else if p.y < mid_y {
                se.push(p);
            } else {
                ne.push(p);
            }
        }

        // Recursively build children
        cell.children = [
            self.build_cell(nw, x, mid_y, half_width, depth + 1),
            self.build_cell(ne, mid_x, mid_y, half_width, depth + 1),
            self.build_cell(sw, x, y, half_width, depth + 1),
            self.build_cell(se, mid_x, y, half_width, depth + 1),
        ];
        self.tree.cells[cell_idx] = cell;
        cell_idx as i32
    }
}
