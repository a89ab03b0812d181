use crate::config::AnimatorConfig;
use crate::geometry::{CellPos, Point, Rect};
use crate::grid::ZoneGrid;
use crate::surface::{Rgba, Surface};

pub(crate) const STREET: Rgba = Rgba::new(255, 255, 255, 0.025);
pub(crate) const AGENT: Rgba = Rgba::opaque(249, 112, 104);
pub(crate) const AGENT_GLOW: Rgba = AGENT.with_alpha(0.15);
pub(crate) const AGENT_RING: Rgba = AGENT.with_alpha(0.3);

const STREET_WIDTH: f64 = 1.0;
const BORDER_WIDTH: f64 = 1.0;
const RING_WIDTH: f64 = 1.5;

/// One line per column and row boundary, spanning the whole grid.
pub(crate) fn draw_streets<S: Surface>(surface: &mut S, grid: &ZoneGrid, config: &AnimatorConfig) {
    let cell = config.cell_size;
    let width = grid.cols() as f64 * cell;
    let height = grid.rows() as f64 * cell;
    for c in 0..=grid.cols() {
        let x = c as f64 * cell;
        surface.stroke_line(Point::new(x, 0.0), Point::new(x, height), STREET, STREET_WIDTH);
    }
    for r in 0..=grid.rows() {
        let y = r as f64 * cell;
        surface.stroke_line(Point::new(0.0, y), Point::new(width, y), STREET, STREET_WIDTH);
    }
}

/// Inset fill per zoned cell at its shimmer alpha, then the cell's outer
/// edges as one stroked path.
pub(crate) fn draw_zones<S: Surface>(
    surface: &mut S,
    grid: &ZoneGrid,
    config: &AnimatorConfig,
    t: f64,
) {
    let cell = config.cell_size;
    let mut segments: Vec<(Point, Point)> = Vec::with_capacity(4);
    for (pos, zone) in grid.occupied() {
        let CellPos { col, row } = pos;
        let x = col as f64 * cell;
        let y = row as f64 * cell;
        let alpha = config.shimmer(t, col, row);

        surface.fill_rect(Rect::new(x + 1.0, y + 1.0, cell - 2.0, cell - 2.0), zone.fill(), alpha);

        let edges = grid.border_edges(pos);
        segments.clear();
        if edges.top {
            segments.push((Point::new(x, y), Point::new(x + cell, y)));
        }
        if edges.bottom {
            segments.push((Point::new(x, y + cell), Point::new(x + cell, y + cell)));
        }
        if edges.left {
            segments.push((Point::new(x, y), Point::new(x, y + cell)));
        }
        if edges.right {
            segments.push((Point::new(x + cell, y), Point::new(x + cell, y + cell)));
        }
        if !segments.is_empty() {
            surface.stroke_segments(&segments, zone.border(), BORDER_WIDTH, alpha);
        }
    }
}

pub(crate) fn draw_agent<S: Surface>(surface: &mut S, at: Point, config: &AnimatorConfig) {
    surface.fill_radial_glow(at, config.glow_radius, AGENT_GLOW);
    surface.fill_circle(at, config.dot_radius, AGENT);
    surface.stroke_circle(at, config.ring_radius, AGENT_RING, RING_WIDTH);
}
