use crate::{BuildError, Rectangle};

/// A uniform partition of a [`Rectangle`] into `nx × ny` congruent cells.
///
/// Cells are numbered row by row starting at the lower-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartesianMesh {
    domain: Rectangle,
    cells: [usize; 2],
}

impl CartesianMesh {
    /// Partitions `domain` into `cells[0] × cells[1]` cells.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::EmptyPartition`] if either count is zero.
    pub fn new(domain: Rectangle, cells: [usize; 2]) -> Result<Self, BuildError> {
        if cells.contains(&0) {
            return Err(BuildError::EmptyPartition(cells));
        }
        Ok(Self { domain, cells })
    }

    #[must_use]
    pub fn domain(&self) -> &Rectangle {
        &self.domain
    }

    /// Cells per direction.
    #[must_use]
    pub fn cells(&self) -> [usize; 2] {
        self.cells
    }

    #[must_use]
    pub fn num_cells(&self) -> usize {
        self.cells[0] * self.cells[1]
    }

    /// Width and height of every cell.
    #[must_use]
    pub fn cell_size(&self) -> [f64; 2] {
        let [w, h] = self.domain.size();
        [w / self.cells[0] as f64, h / self.cells[1] as f64]
    }

    /// Lower-left corner of cell `(cx, cy)`.
    #[must_use]
    pub fn cell_origin(&self, cx: usize, cy: usize) -> [f64; 2] {
        let [x0, y0] = self.domain.origin();
        let [hx, hy] = self.cell_size();
        [x0 + cx as f64 * hx, y0 + cy as f64 * hy]
    }

    /// Iterates over cell indices `(cx, cy)` row by row.
    pub fn iter_cells(&self) -> impl Iterator<Item = (usize, usize)> + use<> {
        let [nx, ny] = self.cells;
        (0..ny).flat_map(move |cy| (0..nx).map(move |cx| (cx, cy)))
    }
}
