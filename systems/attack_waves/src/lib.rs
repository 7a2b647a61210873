#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Attack wave scheduler alternating pursuers between scattering and chasing.
//!
//! Each level bracket owns a fixed table of phase durations. Even phases
//! scatter and odd phases chase; the last phase never ends. Every mode flip
//! and every power gain forces active pursuers to reverse.

use log::debug;
use maze_pursuit_core::{Command, Event, WaveMode};

/// Number of phases in every wave table.
pub const PHASE_COUNT: usize = 8;

/// Phase durations in ticks for `level`; `None` marks the unbounded phase.
#[must_use]
pub const fn wave_durations(level: u32) -> [Option<u32>; PHASE_COUNT] {
    match level {
        0 | 1 => [
            Some(420),
            Some(1200),
            Some(420),
            Some(1200),
            Some(300),
            Some(1200),
            Some(300),
            None,
        ],
        2..=4 => [
            Some(420),
            Some(1200),
            Some(420),
            Some(1200),
            Some(300),
            Some(61_980),
            Some(1),
            None,
        ],
        _ => [
            Some(300),
            Some(1200),
            Some(300),
            Some(1200),
            Some(300),
            Some(62_220),
            Some(1),
            None,
        ],
    }
}

/// Mode active during `phase`.
#[must_use]
pub const fn phase_mode(phase: usize) -> WaveMode {
    if phase % 2 == 0 {
        WaveMode::Scattering
    } else {
        WaveMode::Chasing
    }
}

/// Read-only summary of the scheduler for snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveStatus {
    /// Index into the level's wave table.
    pub phase: usize,
    /// Mode of the current phase.
    pub mode: WaveMode,
    /// Ticks left in the current phase, `None` when unbounded.
    pub remaining_ticks: Option<u32>,
    /// Set while player power pauses the schedule.
    pub suspended: bool,
}

/// Pure system that emits wave mode changes and forced reversals.
#[derive(Debug)]
pub struct AttackWaves {
    durations: [Option<u32>; PHASE_COUNT],
    phase: usize,
    remaining: Option<u32>,
    suspended: bool,
}

impl Default for AttackWaves {
    fn default() -> Self {
        Self::new()
    }
}

impl AttackWaves {
    /// Creates a scheduler positioned at the start of level 1.
    #[must_use]
    pub fn new() -> Self {
        let durations = wave_durations(1);
        Self {
            durations,
            phase: 0,
            remaining: durations[0],
            suspended: false,
        }
    }

    /// Reports the scheduler's current phase.
    #[must_use]
    pub fn status(&self) -> WaveStatus {
        WaveStatus {
            phase: self.phase,
            mode: phase_mode(self.phase),
            remaining_ticks: self.remaining,
            suspended: self.suspended,
        }
    }

    /// Consumes world events and emits wave commands.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::LevelStarted { level } => {
                    self.durations = wave_durations(*level);
                    self.restart();
                }
                Event::ActorsReset => self.restart(),
                Event::PowerGained { ticks } => {
                    if *ticks > 0 {
                        self.suspended = true;
                    }
                    out.push(Command::ReversePursuers);
                }
                Event::PowerLost => self.suspended = false,
                Event::TimeAdvanced { .. } if !self.suspended => self.count_down(out),
                _ => {}
            }
        }
    }

    fn restart(&mut self) {
        self.phase = 0;
        self.remaining = self.durations[0];
        self.suspended = false;
    }

    fn count_down(&mut self, out: &mut Vec<Command>) {
        let Some(remaining) = self.remaining else {
            return;
        };
        let remaining = remaining.saturating_sub(1);
        if remaining > 0 {
            self.remaining = Some(remaining);
            return;
        }

        self.phase = (self.phase + 1).min(PHASE_COUNT - 1);
        self.remaining = self.durations[self.phase];
        let mode = phase_mode(self.phase);
        debug!("wave phase {} begins in {mode:?}", self.phase);
        out.push(Command::SetWaveMode { mode });
        out.push(Command::ReversePursuers);
    }
}
