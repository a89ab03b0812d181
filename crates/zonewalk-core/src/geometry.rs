use serde::{Deserialize, Serialize};

/// Pixel-space point on a drawing surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

/// Largest grid extent on one axis, in cells.
pub const MAX_GRID_AXIS: usize = 4096;

/// Pixel dimensions of the container an effect draws into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Zero, negative and non-finite extents all count as degenerate.
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0)
    }

    /// Grid dimensions `(cols, rows)` covering this viewport with one spare
    /// cell on each axis. Degenerate viewports, and viewports needing more
    /// than `MAX_GRID_AXIS` cells on either axis, map to an empty grid.
    pub fn grid_dims(&self, cell_size: f64) -> (usize, usize) {
        if self.is_degenerate() || cell_size.is_nan() || cell_size <= 0.0 {
            return (0, 0);
        }
        let cols = (self.width / cell_size).ceil() + 1.0;
        let rows = (self.height / cell_size).ceil() + 1.0;
        let limit = MAX_GRID_AXIS as f64;
        if !(cols <= limit && rows <= limit) {
            return (0, 0);
        }
        (cols as usize, rows as usize)
    }
}

/// Column/row address of a grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellPos {
    pub col: usize,
    pub row: usize,
}

impl CellPos {
    pub const fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    /// Pixel center of this cell.
    pub fn center(self, cell_size: f64) -> Point {
        Point::new(
            self.col as f64 * cell_size + cell_size / 2.0,
            self.row as f64 * cell_size + cell_size / 2.0,
        )
    }
}
