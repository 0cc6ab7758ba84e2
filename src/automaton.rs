use std::fmt;

use rand::Rng;
use thiserror::Error;
use tracing::debug;
use tracing::info;
use tracing::trace;

use crate::GridOffset;
use crate::rule_set::RuleSet;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AutomatonError {
    #[error("Invalid grid dimensions {width}x{height}, both sides must be at least 1")]
    InvalidDimension { width: GridOffset, height: GridOffset },

    #[error("Grid {width}x{height} has more cells than can be addressed")]
    TooLarge { width: GridOffset, height: GridOffset },
}

/// Wraps `v` onto a torus axis of length `len`.
///
/// This is a true modulo, so it holds for inputs any number of laps away from the grid.
#[inline]
pub fn wrap(v: GridOffset, len: usize) -> usize {
    v.rem_euclid(len as GridOffset) as usize
}

/// A Game of Life on a `width x height` torus.
///
/// `cells` holds the current generation. `next` is the scratch buffer: it is rewritten in full by
/// every step and then swapped in, so after a step it holds the previous generation.
#[derive(Clone, PartialEq, Eq)]
pub struct Automaton {
    cells: Vec<bool>,
    next: Vec<bool>,

    width: usize,
    height: usize,

    rule: RuleSet,

    /// Steps taken since the grid was built or last cleared
    generation: u64,
}

impl Automaton {
    /// Create an all-dead grid.
    ///
    /// Sizes whose cell count doesn't fit in `isize` are rejected. Anything smaller is allocated
    /// up front, twice, so it still has to fit in memory.
    pub fn build(width: GridOffset, height: GridOffset) -> Result<Self, AutomatonError> {
        if width < 1 || height < 1 {
            return Err(AutomatonError::InvalidDimension { width, height });
        }

        let (w, h) = (width as usize, height as usize);
        let len = w
            .checked_mul(h)
            .filter(|&n| n <= isize::MAX as usize)
            .ok_or(AutomatonError::TooLarge { width, height })?;

        info!(width = w, height = h, "building grid");

        Ok(Self {
            cells: vec![false; len],
            next: vec![false; len],
            width: w,
            height: h,
            rule: RuleSet::default(),
            generation: 0,
        })
    }

    /// Evaluate generations with `rule` instead of B3/S23.
    pub fn with_rule(mut self, rule: RuleSet) -> Self {
        self.rule = rule;
        self
    }

    pub fn rule(&self) -> RuleSet {
        self.rule
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Kill every cell, keeping the dimensions.
    pub fn clear(&mut self) {
        debug!("clearing grid");

        self.cells.fill(false);
        self.next.fill(false);
        self.generation = 0;
    }

    pub fn set_alive(&mut self, x: GridOffset, y: GridOffset) {
        let i = self.index(x, y);
        self.cells[i] = true;
    }

    pub fn set_dead(&mut self, x: GridOffset, y: GridOffset) {
        let i = self.index(x, y);
        self.cells[i] = false;
    }

    pub fn is_alive(&self, x: GridOffset, y: GridOffset) -> bool {
        self.cells[self.index(x, y)]
    }

    /// Wraps a raw coordinate pair onto the grid.
    pub fn wrap(&self, x: GridOffset, y: GridOffset) -> (usize, usize) {
        (wrap(x, self.width), wrap(y, self.height))
    }

    /// Wraps `(x + dx, y + dy)` onto the grid. Both terms are reduced first, so the sum can't
    /// overflow for any inputs.
    pub fn offset(
        &self,
        x: GridOffset,
        y: GridOffset,
        dx: GridOffset,
        dy: GridOffset,
    ) -> (usize, usize) {
        let (x, y) = self.wrap(x, y);
        let (dx, dy) = self.wrap(dx, dy);

        ((x + dx) % self.width, (y + dy) % self.height)
    }

    /// Number of live cells in the 3x3 block around `(x, y)`, not counting `(x, y)` itself.
    ///
    /// On grids narrower than 3 cells the same cell can sit on both sides of `(x, y)`; it is
    /// counted once per side, as the torus would.
    pub fn count_live_neighbors(&self, x: GridOffset, y: GridOffset) -> u8 {
        let mut count = 0;

        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }

                let (nx, ny) = self.offset(x, y, dx, dy);
                if self.cells[ny * self.width + nx] {
                    count += 1;
                }
            }
        }

        count
    }

    /// Advance the whole grid by one generation. Returns how many cells changed state.
    pub fn compute_next_generation(&mut self) -> usize {
        for y in 0..self.height {
            for x in 0..self.width {
                let i = y * self.width + x;
                let n = self.count_live_neighbors(x as GridOffset, y as GridOffset);

                self.next[i] = self.rule.next_state(self.cells[i], n);
            }
        }

        std::mem::swap(&mut self.cells, &mut self.next);
        self.generation += 1;

        let changed = self.changed_cells().count();
        trace!(generation = self.generation, changed, "stepped");

        changed
    }

    /// Set each cell alive with probability `density`, dead otherwise. `density` is clamped to
    /// `[0, 1]`.
    pub fn randomize<R>(&mut self, density: f64, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let density = if density.is_nan() {
            0.0
        } else {
            density.clamp(0.0, 1.0)
        };

        debug!(density, "randomizing grid");

        for cell in self.cells.iter_mut() {
            *cell = rng.gen_bool(density);
        }
    }

    /// Every cell as `(x, y, alive)`, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, bool)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, &alive)| (i % self.width, i / self.width, alive))
    }

    /// Cells whose state differs from the generation before the last step.
    ///
    /// Only meaningful right after [`Automaton::compute_next_generation`]; edits made since then
    /// are included as well.
    pub fn changed_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .zip(self.next.iter())
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(i, _)| (i % self.width, i / self.width))
    }

    fn index(&self, x: GridOffset, y: GridOffset) -> usize {
        let (x, y) = self.wrap(x, y);

        y * self.width + x
    }
}

impl fmt::Debug for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Automaton {}x{} ({:?}, generation {})",
            self.width, self.height, self.rule, self.generation
        )?;

        write!(f, "{self}")
    }
}

/// One text row per grid row, `#` for live cells and `.` for dead ones.
impl fmt::Display for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width) {
            for &alive in row {
                f.write_str(if alive { "#" } else { "." })?;
            }

            f.write_str("\n")?;
        }

        Ok(())
    }
}
