use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;
use tracing::info;

use crate::GridOffset;
use crate::Position;
use crate::automaton::Automaton;
use crate::automaton::AutomatonError;
use crate::config::Config;
use crate::stamp::PatternStamp;
use crate::stamp::StampMode;

/// Whether generations are being stepped.
///
/// ```notrust
/// Stopped --start--> Running --pause--> Paused --start--> Running
///    ^                  |                  |
///    +------stop--------+-------stop-------+
/// ```
///
/// The grid can only be edited while `Stopped`. Stopping clears it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunState {
    #[default]
    Stopped,
    Running,
    Paused,
}

/// Drives an [`Automaton`]: run state, the selected stamp and the random source.
pub struct Session {
    automaton: Automaton,
    state: RunState,
    stamp: PatternStamp,

    density: f64,
    rng: ChaCha8Rng,
}

impl Session {
    /// A stopped session over `automaton`, painting single cells.
    pub fn new(automaton: Automaton, density: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Self {
            automaton,
            state: RunState::Stopped,
            stamp: PatternStamp::from_offsets([(0, 0)]),
            density,
            rng,
        }
    }

    /// A `width x height` session with the rule, density and seed from `config`.
    pub fn from_config(
        config: &Config,
        width: GridOffset,
        height: GridOffset,
    ) -> Result<Self, AutomatonError> {
        let automaton = Automaton::build(width, height)?.with_rule(config.rule);

        Ok(Self::new(automaton, config.density, config.seed))
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    pub fn stamp(&self) -> &PatternStamp {
        &self.stamp
    }

    pub fn select_stamp(&mut self, stamp: PatternStamp) {
        debug!(cells = stamp.len(), "selected stamp");

        self.stamp = stamp;
    }

    /// Edits are only accepted while stopped.
    pub fn is_editable(&self) -> bool {
        self.state == RunState::Stopped
    }

    /// Stop and replace the grid with an empty `width x height` one. On error nothing changes.
    pub fn rebuild(&mut self, width: GridOffset, height: GridOffset) -> Result<(), AutomatonError> {
        let automaton = Automaton::build(width, height)?.with_rule(self.automaton.rule());

        self.transition(RunState::Stopped);
        self.automaton = automaton;

        Ok(())
    }

    /// Start or resume stepping. Returns whether the state changed.
    pub fn start(&mut self) -> bool {
        match self.state {
            RunState::Stopped | RunState::Paused => {
                self.transition(RunState::Running);
                true
            }
            RunState::Running => false,
        }
    }

    /// Hold stepping, keeping the grid. Returns whether the state changed.
    pub fn pause(&mut self) -> bool {
        match self.state {
            RunState::Running => {
                self.transition(RunState::Paused);
                true
            }
            RunState::Stopped | RunState::Paused => false,
        }
    }

    /// Pause when running, start otherwise.
    pub fn toggle(&mut self) -> RunState {
        if !self.pause() {
            self.start();
        }

        self.state
    }

    /// Stop stepping and clear the grid, from any state.
    pub fn stop(&mut self) {
        self.transition(RunState::Stopped);
        self.automaton.clear();
    }

    /// Advance one generation if running. Returns whether a step happened.
    pub fn tick(&mut self) -> bool {
        if self.state != RunState::Running {
            return false;
        }

        self.automaton.compute_next_generation();

        true
    }

    /// Paint the selected stamp at `(x, y)`. Returns the painted cells, or `None` when the grid
    /// isn't editable.
    pub fn paint(&mut self, x: GridOffset, y: GridOffset) -> Option<Vec<Position>> {
        if !self.is_editable() {
            debug!(state = ?self.state, "ignoring paint");
            return None;
        }

        Some(self.stamp.apply(&mut self.automaton, x, y, StampMode::Paint))
    }

    /// Cells the selected stamp would cover at `(x, y)`, or `None` when the grid isn't editable.
    pub fn preview(&self, x: GridOffset, y: GridOffset) -> Option<Vec<Position>> {
        if !self.is_editable() {
            return None;
        }

        Some(self.stamp.footprint(&self.automaton, x, y))
    }

    /// Clear, then fill at the configured density. Ignored unless stopped.
    pub fn randomize(&mut self) -> bool {
        if !self.is_editable() {
            debug!(state = ?self.state, "ignoring randomize");
            return false;
        }

        self.automaton.clear();
        self.automaton.randomize(self.density, &mut self.rng);

        true
    }

    fn transition(&mut self, to: RunState) {
        if self.state != to {
            info!(from = ?self.state, ?to, generation = self.automaton.generation(), "run state");
        }

        self.state = to;
    }
}
