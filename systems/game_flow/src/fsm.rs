//! Table-driven state machine driver.

use std::fmt;

use maze_pursuit_core::Command;

/// One row of a transition table.
pub struct Transition<S: 'static, T: 'static, C: 'static> {
    /// State the transition leaves.
    pub from: S,
    /// Trigger that fires the transition.
    pub trigger: T,
    /// Predicate that must hold for the row to apply.
    pub guard: fn(&C) -> bool,
    /// State the transition enters.
    pub to: S,
    /// Commands issued when the transition is taken.
    pub effect: fn(&C, &mut Vec<Command>),
}

/// Guard accepting every context.
#[must_use]
pub fn always<C>(_: &C) -> bool {
    true
}

/// Effect issuing no commands.
pub fn nothing<C>(_: &C, _: &mut Vec<Command>) {}

/// Drives a state through a static transition table.
///
/// Rows are matched in table order; the first row whose state, trigger and
/// guard all match is taken.
pub struct StateMachine<S: 'static, T: 'static, C: 'static> {
    table: &'static [Transition<S, T, C>],
    state: S,
    ticks_in_state: u32,
}

impl<S, T, C> StateMachine<S, T, C>
where
    S: Copy + PartialEq,
    T: Copy + PartialEq,
{
    /// Creates a machine resting in `initial`.
    #[must_use]
    pub fn new(table: &'static [Transition<S, T, C>], initial: S) -> Self {
        Self {
            table,
            state: initial,
            ticks_in_state: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> S {
        self.state
    }

    /// Ticks spent in the current state.
    #[must_use]
    pub fn ticks_in_state(&self) -> u32 {
        self.ticks_in_state
    }

    /// Counts one tick in the current state.
    pub fn tick(&mut self) {
        self.ticks_in_state = self.ticks_in_state.saturating_add(1);
    }

    /// Forces the machine into `state` without running any effect.
    pub fn reset(&mut self, state: S) {
        self.state = state;
        self.ticks_in_state = 0;
    }

    /// Fires `trigger`, returning the entered state when a row matched.
    pub fn fire(&mut self, trigger: T, context: &C, out: &mut Vec<Command>) -> Option<S> {
        let table = self.table;
        let current = self.state;
        let row = table.iter().find(|row| {
            row.from == current && row.trigger == trigger && (row.guard)(context)
        })?;
        (row.effect)(context, out);
        self.state = row.to;
        self.ticks_in_state = 0;
        Some(row.to)
    }
}

impl<S: fmt::Debug, T, C> fmt::Debug for StateMachine<S, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("state", &self.state)
            .field("ticks_in_state", &self.ticks_in_state)
            .field("rows", &self.table.len())
            .finish()
    }
}
