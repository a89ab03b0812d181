use crate::geometry::{CellPos, Point};
use crate::random::RandomSource;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PATH_LEN: usize = 200;

/// One recorded stop on the agent's walk.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub cell: CellPos,
    pub center: Point,
}

/// Precomputed random walk, consumed cyclically.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentPath {
    waypoints: Vec<Waypoint>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    East,
    West,
    South,
    North,
}

impl Step {
    const ALL: [Step; 4] = [Step::East, Step::West, Step::South, Step::North];
}

impl AgentPath {
    pub fn generate<R: RandomSource + ?Sized>(
        cols: usize,
        rows: usize,
        cell_size: f64,
        rng: &mut R,
    ) -> Self {
        Self::generate_len(cols, rows, cell_size, DEFAULT_PATH_LEN, rng)
    }

    /// Random walk from the center cell. A step that would enter the outer
    /// ring of cells is skipped, so that waypoint repeats the current cell.
    /// An empty grid yields an empty path.
    pub fn generate_len<R: RandomSource + ?Sized>(
        cols: usize,
        rows: usize,
        cell_size: f64,
        len: usize,
        rng: &mut R,
    ) -> Self {
        if cols == 0 || rows == 0 {
            return Self::default();
        }
        let mut col = cols / 2;
        let mut row = rows / 2;
        let mut waypoints = Vec::with_capacity(len);
        for _ in 0..len {
            let cell = CellPos::new(col, row);
            waypoints.push(Waypoint {
                cell,
                center: cell.center(cell_size),
            });
            match Step::ALL[rng.pick(Step::ALL.len())] {
                Step::East if col + 2 < cols => col += 1,
                Step::West if col > 1 => col -= 1,
                Step::South if row + 2 < rows => row += 1,
                Step::North if row > 1 => row -= 1,
                _ => {}
            }
        }
        Self { waypoints }
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Waypoint at `index` modulo the path length.
    pub fn at(&self, index: usize) -> Option<&Waypoint> {
        if self.waypoints.is_empty() {
            return None;
        }
        self.waypoints.get(index % self.waypoints.len())
    }

    pub fn start(&self) -> Option<Point> {
        self.waypoints.first().map(|w| w.center)
    }
}

/// Interpolated agent position chasing the current waypoint.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Walker {
    pub position: Point,
    pub target: usize,
}

impl Walker {
    pub fn at_start(path: &AgentPath) -> Option<Self> {
        path.start().map(|position| Self {
            position,
            target: 0,
        })
    }

    /// One tick: within `arrive_radius` of the target, retarget to the next
    /// waypoint without moving; otherwise move `speed` pixels toward it.
    pub fn advance(&mut self, path: &AgentPath, speed: f64, arrive_radius: f64) {
        let Some(target) = path.at(self.target) else {
            return;
        };
        let dx = target.center.x - self.position.x;
        let dy = target.center.y - self.position.y;
        let dist = self.position.distance(target.center);
        if dist < arrive_radius {
            self.target = (self.target + 1) % path.len();
        } else {
            let step = speed.min(dist);
            self.position.x += dx / dist * step;
            self.position.y += dy / dist * step;
        }
    }
}
