use crate::GridOffset;
use crate::Position;
use crate::automaton::Automaton;

/// Offset of one stamp cell from the stamp's anchor.
pub type Offset = (GridOffset, GridOffset);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StampMode {
    /// Turn the covered cells on
    #[default]
    Paint,

    /// Only report the covered cells
    Preview,
}

/// A cluster of cells placed relative to an anchor.
///
/// Offsets may repeat; stamping only ever sets cells alive, so duplicates change nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatternStamp {
    offsets: Vec<Offset>,
}

impl PatternStamp {
    pub fn from_offsets<I>(offsets: I) -> Self
    where
        I: IntoIterator<Item = Offset>,
    {
        Self {
            offsets: offsets.into_iter().collect(),
        }
    }

    pub fn offsets(&self) -> &[Offset] {
        &self.offsets
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Smallest and largest offset on each axis, `None` for an empty stamp.
    pub fn bounds(&self) -> Option<(Offset, Offset)> {
        let (&first, rest) = self.offsets.split_first()?;

        let bounds = rest.iter().fold((first, first), |(lo, hi), &(x, y)| {
            ((lo.0.min(x), lo.1.min(y)), (hi.0.max(x), hi.1.max(y)))
        });

        Some(bounds)
    }

    /// The same cells, re-anchored on the center of their bounding box (rounding toward the
    /// bottom right).
    ///
    /// Rounding that way keeps every re-anchored offset inside `i64`, even for bounds spanning
    /// the whole range.
    pub fn centered(&self) -> Self {
        let Some(((x0, y0), (x1, y1))) = self.bounds() else {
            return self.clone();
        };

        // sums are done in i128; only the results are known to fit
        let mid = |lo: GridOffset, hi: GridOffset| (lo as i128 + hi as i128 + 1).div_euclid(2);
        let (cx, cy) = (mid(x0, x1), mid(y0, y1));

        Self::from_offsets(
            self.offsets
                .iter()
                .map(|&(x, y)| ((x as i128 - cx) as GridOffset, (y as i128 - cy) as GridOffset)),
        )
    }

    /// Wrapped positions covered by the stamp anchored at `(x, y)`, sorted and without
    /// duplicates.
    pub fn footprint(&self, automaton: &Automaton, x: GridOffset, y: GridOffset) -> Vec<Position> {
        let mut cells: Vec<Position> = self
            .offsets
            .iter()
            .map(|&(dx, dy)| automaton.offset(x, y, dx, dy))
            .collect();

        cells.sort_unstable();
        cells.dedup();

        cells
    }

    /// Stamp at `(x, y)`. In [`StampMode::Paint`] the covered cells are set alive; in
    /// [`StampMode::Preview`] the automaton is left untouched. Either way the covered positions
    /// are returned.
    pub fn apply(
        &self,
        automaton: &mut Automaton,
        x: GridOffset,
        y: GridOffset,
        mode: StampMode,
    ) -> Vec<Position> {
        let cells = self.footprint(automaton, x, y);

        if mode == StampMode::Paint {
            for &(cx, cy) in &cells {
                automaton.set_alive(cx as GridOffset, cy as GridOffset);
            }
        }

        cells
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn glider() -> PatternStamp {
        PatternStamp::from_offsets([(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)])
    }

    #[test]
    fn empty_stamp_is_a_no_op() {
        let mut a = Automaton::build(4, 4).unwrap();
        let stamp = PatternStamp::default();

        assert!(stamp.apply(&mut a, 1, 1, StampMode::Paint).is_empty());
        assert_eq!(a.population(), 0);
        assert_eq!(stamp.bounds(), None);
    }

    #[test]
    fn paint_wraps_past_edges() {
        let mut a = Automaton::build(5, 5).unwrap();
        let stamp = PatternStamp::from_offsets([(-1, 0), (0, 0), (1, 0)]);

        let cells = stamp.apply(&mut a, 4, -6, StampMode::Paint);

        assert_eq!(cells, vec![(0, 4), (3, 4), (4, 4)]);
        assert!(a.is_alive(3, 4) && a.is_alive(4, 4) && a.is_alive(0, 4));
        assert_eq!(a.population(), 3);
    }

    #[test]
    fn offsets_larger_than_grid() {
        let mut a = Automaton::build(3, 3).unwrap();
        let stamp = PatternStamp::from_offsets([(7, -8)]);

        stamp.apply(&mut a, 0, 0, StampMode::Paint);

        assert!(a.is_alive(1, 1));
    }

    #[test]
    fn duplicates_collapse() {
        let a = Automaton::build(4, 4).unwrap();
        let stamp = PatternStamp::from_offsets([(0, 0), (0, 0), (4, 4)]);

        assert_eq!(stamp.footprint(&a, 2, 2), vec![(2, 2)]);
    }

    #[test]
    fn preview_leaves_grid_alone() {
        let mut a = Automaton::build(6, 6).unwrap();
        a.set_alive(0, 0);
        let before = a.clone();

        let cells = glider().apply(&mut a, 2, 2, StampMode::Preview);

        assert_eq!(a, before);
        assert_eq!(cells.len(), 5);
    }

    #[test]
    fn centering_extreme_offsets() {
        let stamp = PatternStamp::from_offsets([(GridOffset::MAX, 0), (GridOffset::MAX - 1, 0)]);
        assert_eq!(stamp.centered().offsets(), &[(0, 0), (-1, 0)]);

        let stamp =
            PatternStamp::from_offsets([(GridOffset::MIN, GridOffset::MIN), (GridOffset::MAX, 0)]);
        assert_eq!(
            stamp.centered().offsets(),
            &[(GridOffset::MIN, -(1 << 62)), (GridOffset::MAX, 1 << 62)]
        );
    }

    #[test]
    fn bounds_and_centering() {
        let stamp = glider();

        assert_eq!(stamp.bounds(), Some(((0, 0), (2, 2))));

        let centered = stamp.centered();
        assert_eq!(centered.bounds(), Some(((-1, -1), (1, 1))));
        assert_eq!(centered.offsets()[0], (0, -1));
    }
}
