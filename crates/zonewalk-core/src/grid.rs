use crate::geometry::CellPos;
use crate::random::RandomSource;
use crate::zone::ZoneType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How seeds are scattered and how large a block each one stamps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedingRules {
    /// One seed per this many cells, rounded down.
    pub cells_per_seed: usize,
    pub min_block_width: usize,
    pub max_block_width: usize,
    pub min_block_height: usize,
    pub max_block_height: usize,
}

impl Default for SeedingRules {
    fn default() -> Self {
        Self {
            cells_per_seed: 25,
            min_block_width: 2,
            max_block_width: 5,
            min_block_height: 2,
            max_block_height: 4,
        }
    }
}

impl SeedingRules {
    pub fn seed_count(&self, cols: usize, rows: usize) -> usize {
        if self.cells_per_seed == 0 {
            return 0;
        }
        cols.saturating_mul(rows) / self.cells_per_seed
    }
}

/// Generation input: origin cell and the zone it stamps. Not retained.
#[derive(Clone, Copy, Debug)]
struct Seed {
    pos: CellPos,
    zone: ZoneType,
}

/// Which sides of a zone cell border a different zone or the grid edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BorderEdges {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

impl BorderEdges {
    pub fn count(&self) -> usize {
        [self.top, self.bottom, self.left, self.right]
            .iter()
            .filter(|&&e| e)
            .count()
    }
}

/// Row-major grid of optional zone tags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZoneGrid {
    cols: usize,
    rows: usize,
    cells: Vec<Option<ZoneType>>,
}

impl ZoneGrid {
    pub fn empty(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![None; cols * rows],
        }
    }

    /// Seeded generation with the default block rules.
    pub fn generate<R: RandomSource + ?Sized>(cols: usize, rows: usize, rng: &mut R) -> Self {
        Self::generate_with(cols, rows, &SeedingRules::default(), rng)
    }

    /// Scatter seeds, tag each seed cell directly (later seeds overwrite
    /// earlier ones at the same cell), then stamp each seed's block right and
    /// down over cells that are still empty. Blocks are clipped at the grid
    /// edge.
    pub fn generate_with<R: RandomSource + ?Sized>(
        cols: usize,
        rows: usize,
        rules: &SeedingRules,
        rng: &mut R,
    ) -> Self {
        let mut grid = Self::empty(cols, rows);
        if cols == 0 || rows == 0 {
            return grid;
        }

        let seed_count = rules.seed_count(cols, rows);
        let mut seeds = Vec::with_capacity(seed_count);
        for _ in 0..seed_count {
            let col = rng.pick(cols);
            let row = rng.pick(rows);
            let zone = ZoneType::ALL[rng.pick(ZoneType::COUNT)];
            let pos = CellPos::new(col, row);
            grid.set(pos, Some(zone));
            seeds.push(Seed { pos, zone });
        }

        for seed in &seeds {
            let width = pick_span(rng, rules.min_block_width, rules.max_block_width);
            let height = pick_span(rng, rules.min_block_height, rules.max_block_height);
            let col_end = (seed.pos.col + width).min(cols);
            let row_end = (seed.pos.row + height).min(rows);
            for row in seed.pos.row..row_end {
                for col in seed.pos.col..col_end {
                    let idx = row * cols + col;
                    if grid.cells[idx].is_none() {
                        grid.cells[idx] = Some(seed.zone);
                    }
                }
            }
        }
        grid
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, pos: CellPos) -> bool {
        pos.col < self.cols && pos.row < self.rows
    }

    /// Zone at `pos`; `None` for background cells and positions off the grid.
    pub fn zone_at(&self, pos: CellPos) -> Option<ZoneType> {
        if !self.contains(pos) {
            return None;
        }
        self.cells[pos.row * self.cols + pos.col]
    }

    pub fn set(&mut self, pos: CellPos, zone: Option<ZoneType>) {
        assert!(self.contains(pos), "cell {pos:?} outside {}x{} grid", self.cols, self.rows);
        self.cells[pos.row * self.cols + pos.col] = zone;
    }

    /// Occupied cells in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (CellPos, ZoneType)> + '_ {
        let cols = self.cols;
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            cell.map(|zone| (CellPos::new(i % cols, i / cols), zone))
        })
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Fraction of cells carrying a zone; zero for an empty grid.
    pub fn coverage(&self) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        self.occupied_count() as f64 / self.cells.len() as f64
    }

    /// Occupied cell count per zone, indexed by `ZoneType::index`.
    pub fn histogram(&self) -> [usize; ZoneType::COUNT] {
        let mut counts = [0usize; ZoneType::COUNT];
        for zone in self.cells.iter().flatten() {
            counts[zone.index()] += 1;
        }
        counts
    }

    /// Edges of the cell at `pos` that need a stroke. Edges shared with a
    /// same-zone neighbour are interior and never stroked.
    pub fn border_edges(&self, pos: CellPos) -> BorderEdges {
        let Some(zone) = self.zone_at(pos) else {
            return BorderEdges::default();
        };
        let differs = |neighbour: Option<CellPos>| {
            neighbour.map_or(true, |n| self.zone_at(n) != Some(zone))
        };
        BorderEdges {
            top: differs(pos.row.checked_sub(1).map(|r| CellPos::new(pos.col, r))),
            bottom: differs(Some(CellPos::new(pos.col, pos.row + 1))),
            left: differs(pos.col.checked_sub(1).map(|c| CellPos::new(c, pos.row))),
            right: differs(Some(CellPos::new(pos.col + 1, pos.row))),
        }
    }
}

fn pick_span<R: RandomSource + ?Sized>(rng: &mut R, min: usize, max: usize) -> usize {
    let max = max.max(min);
    min + rng.pick(max - min + 1)
}

impl fmt::Display for ZoneGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let ch = self
                    .zone_at(CellPos::new(col, row))
                    .map_or('.', ZoneType::letter);
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedSource;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    #[test]
    fn generation_is_deterministic_for_fixed_seed() {
        let mut a = ChaCha12Rng::seed_from_u64(42);
        let mut b = ChaCha12Rng::seed_from_u64(42);
        assert_eq!(ZoneGrid::generate(23, 13, &mut a), ZoneGrid::generate(23, 13, &mut b));
    }

    #[test]
    fn grid_has_requested_dimensions() {
        let mut rng = ChaCha12Rng::seed_from_u64(1);
        let grid = ZoneGrid::generate(17, 9, &mut rng);
        assert_eq!(grid.cols(), 17);
        assert_eq!(grid.rows(), 9);
        assert_eq!(grid.occupied().count(), grid.occupied_count());
    }

    #[test]
    fn zero_dimensions_skip_seeding() {
        let mut rng = ScriptedSource::constant(0);
        for (cols, rows) in [(0, 0), (0, 12), (12, 0)] {
            let grid = ZoneGrid::generate(cols, rows, &mut rng);
            assert!(grid.is_empty());
            assert_eq!(grid.coverage(), 0.0);
        }
    }

    #[test]
    fn small_grids_get_no_seeds() {
        let mut rng = ChaCha12Rng::seed_from_u64(3);
        let grid = ZoneGrid::generate(4, 6, &mut rng);
        assert_eq!(SeedingRules::default().seed_count(4, 6), 0);
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn seeded_grids_are_partially_covered() {
        for seed in 0..20 {
            let mut rng = ChaCha12Rng::seed_from_u64(seed);
            let grid = ZoneGrid::generate(23, 13, &mut rng);
            // 11 seeds, each stamping at least its own cell and at most 5x4.
            assert!(grid.occupied_count() >= 1);
            assert!(grid.occupied_count() <= 11 * 20);
            assert_eq!(grid.histogram().iter().sum::<usize>(), grid.occupied_count());
        }
    }

    #[test]
    fn later_seed_wins_on_shared_origin() {
        // 10x5 grid -> 2 seeds, both at (3, 2): beach then cafe.
        let mut rng = ScriptedSource::new(vec![3, 2, 0, 3, 2, 4, 0, 0, 0, 0]);
        let grid = ZoneGrid::generate(10, 5, &mut rng);
        assert_eq!(grid.zone_at(CellPos::new(3, 2)), Some(ZoneType::Cafe));
    }

    #[test]
    fn earlier_block_wins_on_overlap() {
        // Seed A: (0,0) beach, block 5x4. Seed B: (1,0) park, block 2x2.
        let mut rng = ScriptedSource::new(vec![0, 0, 0, 1, 0, 2, 3, 2, 0, 0]);
        let grid = ZoneGrid::generate(10, 5, &mut rng);

        // B's origin was tagged directly before any block stamping.
        assert_eq!(grid.zone_at(CellPos::new(1, 0)), Some(ZoneType::Park));
        // Cells in B's block already taken by A's block keep A's zone.
        assert_eq!(grid.zone_at(CellPos::new(2, 0)), Some(ZoneType::Beach));
        assert_eq!(grid.zone_at(CellPos::new(1, 1)), Some(ZoneType::Beach));
        assert_eq!(grid.zone_at(CellPos::new(2, 1)), Some(ZoneType::Beach));
        // A's block is 5 wide and 4 tall.
        assert_eq!(grid.zone_at(CellPos::new(4, 3)), Some(ZoneType::Beach));
        assert_eq!(grid.zone_at(CellPos::new(5, 0)), None);
        assert_eq!(grid.zone_at(CellPos::new(0, 4)), None);
        assert_eq!(grid.occupied_count(), 20);
    }

    #[test]
    fn blocks_are_clipped_at_grid_edge() {
        // Single seed (5x5 grid) at the bottom-right corner with the largest block.
        let mut rng = ScriptedSource::new(vec![4, 4, 5, 3, 2]);
        let grid = ZoneGrid::generate(5, 5, &mut rng);
        assert_eq!(grid.occupied_count(), 1);
        assert_eq!(grid.zone_at(CellPos::new(4, 4)), Some(ZoneType::Waterfront));
    }

    #[test]
    fn block_sizes_respect_rules() {
        // One seed at origin; block picks map to min + pick.
        let rules = SeedingRules::default();
        let mut rng = ScriptedSource::new(vec![0, 0, 1, 0, 0]);
        let grid = ZoneGrid::generate_with(5, 5, &rules, &mut rng);
        assert_eq!(grid.occupied_count(), rules.min_block_width * rules.min_block_height);
    }

    #[test]
    fn zone_at_is_none_off_grid() {
        let grid = ZoneGrid::empty(3, 3);
        assert_eq!(grid.zone_at(CellPos::new(3, 0)), None);
        assert_eq!(grid.zone_at(CellPos::new(0, 3)), None);
    }

    #[test]
    fn borders_only_between_different_zones() {
        let mut grid = ZoneGrid::empty(3, 3);
        grid.set(CellPos::new(0, 0), Some(ZoneType::Park));
        grid.set(CellPos::new(1, 0), Some(ZoneType::Park));
        grid.set(CellPos::new(1, 1), Some(ZoneType::Cafe));

        let left = grid.border_edges(CellPos::new(0, 0));
        assert_eq!(
            left,
            BorderEdges {
                top: true,
                bottom: true,
                left: true,
                right: false
            }
        );
        let right = grid.border_edges(CellPos::new(1, 0));
        assert!(!right.left && right.bottom && right.top && right.right);
        assert_eq!(grid.border_edges(CellPos::new(1, 1)).count(), 4);
        assert_eq!(grid.border_edges(CellPos::new(2, 2)).count(), 0);
    }

    #[test]
    fn ascii_rendering_marks_zones_and_background() {
        let mut grid = ZoneGrid::empty(3, 2);
        grid.set(CellPos::new(0, 0), Some(ZoneType::Beach));
        grid.set(CellPos::new(2, 1), Some(ZoneType::Waterfront));
        assert_eq!(grid.to_string(), "B..\n..W\n");
    }
}
