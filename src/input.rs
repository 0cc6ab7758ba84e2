use std::time::Duration;
use std::time::Instant;

use crate::GridOffset;

/// An unwrapped grid coordinate pair, as produced from pointer input.
pub type GridPoint = (GridOffset, GridOffset);

/// Maps a pixel surface onto a grid of square cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Width of the surface in pixels
    pub width: u32,

    /// Height of the surface in pixels
    pub height: u32,

    /// Side length of one cell, in pixels
    pub cell_size: f64,

    pub columns: GridOffset,
    pub rows: GridOffset,
}

impl Viewport {
    /// Fit `axis_size` cells along the longer side of a `width x height` surface. The shorter side
    /// gets as many whole cells as fit, and never fewer than one.
    pub fn fit(width: u32, height: u32, axis_size: u32) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let axis_size = axis_size.max(1);

        let cell_size = width.max(height) as f64 / axis_size as f64;
        let columns = ((width as f64 / cell_size).floor() as GridOffset).max(1);
        let rows = ((height as f64 / cell_size).floor() as GridOffset).max(1);

        Self {
            width,
            height,
            cell_size,
            columns,
            rows,
        }
    }

    /// Grid cell under pixel `(px, py)`. Pixels off the surface map to the nearest edge cell.
    pub fn to_grid(&self, px: f64, py: f64) -> GridPoint {
        let x = (px / self.width as f64 * self.columns as f64).floor() as GridOffset;
        let y = (py / self.height as f64 * self.rows as f64).floor() as GridOffset;

        (x.clamp(0, self.columns - 1), y.clamp(0, self.rows - 1))
    }

    /// Pixel range `[start, end)` covered by cell `i` along one axis.
    pub fn span(&self, i: usize) -> (usize, usize) {
        let start = (i as f64 * self.cell_size).floor() as usize;
        let end = ((i + 1) as f64 * self.cell_size).floor() as usize;

        (start, end.max(start + 1))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PressState {
    Idle,

    Pressed {
        /// Latest pointer position while held
        at: GridPoint,

        /// When the press last fired
        fired: Instant,
    },
}

/// Turns a held pointer into a stream of stamp events: one on press, then one per `interval`
/// for as long as the pointer stays down.
#[derive(Clone, Debug)]
pub struct Press {
    interval: Duration,
    state: PressState,
}

impl Press {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            state: PressState::Idle,
        }
    }

    pub fn state(&self) -> PressState {
        self.state
    }

    pub fn is_pressed(&self) -> bool {
        matches!(self.state, PressState::Pressed { .. })
    }

    /// Pointer went down. Always fires.
    pub fn press(&mut self, at: GridPoint, now: Instant) -> GridPoint {
        self.state = PressState::Pressed { at, fired: now };

        at
    }

    /// Track the pointer. Moving while idle does nothing.
    pub fn move_to(&mut self, to: GridPoint) {
        if let PressState::Pressed { at, .. } = &mut self.state {
            *at = to;
        }
    }

    /// Fires again if the pointer is still down and `interval` has passed since the last fire.
    pub fn poll(&mut self, now: Instant) -> Option<GridPoint> {
        let PressState::Pressed { at, fired } = &mut self.state else {
            return None;
        };

        if now.saturating_duration_since(*fired) < self.interval {
            return None;
        }

        *fired = now;

        Some(*at)
    }

    /// Pointer went up or left the surface.
    pub fn release(&mut self) {
        self.state = PressState::Idle;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fit_square() {
        let v = Viewport::fit(500, 500, 100);

        assert_eq!(v.cell_size, 5.0);
        assert_eq!((v.columns, v.rows), (100, 100));
    }

    #[test]
    fn fit_wide() {
        let v = Viewport::fit(800, 300, 80);

        assert_eq!(v.cell_size, 10.0);
        assert_eq!((v.columns, v.rows), (80, 30));
    }

    #[test]
    fn fit_never_empty() {
        let v = Viewport::fit(1000, 2, 10);

        assert_eq!((v.columns, v.rows), (10, 1));
    }

    #[test]
    fn to_grid_clamps() {
        let v = Viewport::fit(100, 100, 10);

        assert_eq!(v.to_grid(0.0, 0.0), (0, 0));
        assert_eq!(v.to_grid(55.0, 19.9), (5, 1));
        assert_eq!(v.to_grid(-3.0, 250.0), (0, 9));
        assert_eq!(v.to_grid(100.0, 100.0), (9, 9));
    }

    #[test]
    fn span_covers_at_least_one_pixel() {
        let v = Viewport::fit(10, 10, 20);

        assert_eq!(v.span(0), (0, 1));
        assert_eq!(v.span(3), (1, 2));

        let v = Viewport::fit(10, 10, 4);
        assert_eq!(v.span(1), (2, 5));
    }

    #[test]
    fn press_repeats_on_interval() {
        let t0 = Instant::now();
        let mut press = Press::new(Duration::from_millis(100));

        assert_eq!(press.poll(t0), None);
        assert_eq!(press.press((1, 2), t0), (1, 2));
        assert_eq!(press.poll(t0 + Duration::from_millis(50)), None);

        press.move_to((3, 4));
        assert_eq!(press.poll(t0 + Duration::from_millis(100)), Some((3, 4)));
        assert_eq!(press.poll(t0 + Duration::from_millis(150)), None);
        assert_eq!(press.poll(t0 + Duration::from_millis(210)), Some((3, 4)));

        press.release();
        assert!(!press.is_pressed());
        assert_eq!(press.poll(t0 + Duration::from_secs(5)), None);
    }

    #[test]
    fn move_while_idle_is_ignored() {
        let mut press = Press::new(Duration::ZERO);

        press.move_to((9, 9));

        assert_eq!(press.state(), PressState::Idle);
    }
}
