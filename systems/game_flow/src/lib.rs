#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Top-level game flow: intro, play, death and level-change phases.
//!
//! The flow is a [`fsm::StateMachine`] over a static transition table. World
//! events trigger transitions out of [`Phase::Playing`]; every other phase
//! ends on a timeout measured in simulation steps.

pub mod fsm;

use fsm::{always, nothing, StateMachine, Transition};
use log::info;
use maze_pursuit_core::{Command, Event};
use serde::{Deserialize, Serialize};

/// Phases of a game session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Intro pause with every actor at home.
    Ready,
    /// Normal play; the world advances every step.
    Playing,
    /// Freeze after a pursuer has been eaten.
    GhostDying,
    /// Death animation after the player was caught.
    PacManDying,
    /// Maze-clear flash before the next level.
    ChangingLevel,
    /// Final result shown until the player asks for a new game.
    GameOver,
}

impl Phase {
    /// Reports whether the world advances during this phase.
    #[must_use]
    pub const fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }
}

/// Triggers understood by the flow table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// The current phase ran out of time.
    Timeout,
    /// A frightened pursuer was eaten.
    PursuerEaten,
    /// A hunting pursuer caught the player.
    PlayerCaught,
    /// The last food item was eaten.
    MazeCleared,
    /// The player asked for a new game.
    StartRequested,
}

/// Policy durations of the timed phases, in simulation steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseDurations {
    /// Length of the intro pause.
    pub ready_ticks: u32,
    /// Freeze after a pursuer is eaten.
    pub pursuer_eaten_ticks: u32,
    /// Length of the player's death sequence.
    pub player_dying_ticks: u32,
    /// Ticks before pursuers are hidden when dying or changing level.
    pub hide_pursuers_ticks: u32,
    /// Number of maze flashes on level change.
    pub flash_count: u32,
    /// Length of one flash half-period.
    pub flash_ticks: u32,
    /// Minimum time on the game-over screen before a restart is accepted.
    pub game_over_ticks: u32,
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            ready_ticks: 120,
            pursuer_eaten_ticks: 60,
            player_dying_ticks: 180,
            hide_pursuers_ticks: 60,
            flash_count: 5,
            flash_ticks: 12,
            game_over_ticks: 180,
        }
    }
}

impl PhaseDurations {
    fn flashing_ticks(&self) -> u32 {
        self.flash_count
            .saturating_mul(self.flash_ticks)
            .saturating_mul(2)
    }

    /// Ticks after which `phase` times out, `None` for untimed phases.
    #[must_use]
    pub fn timeout(&self, phase: Phase) -> Option<u32> {
        match phase {
            Phase::Ready => Some(self.ready_ticks),
            Phase::GhostDying => Some(self.pursuer_eaten_ticks),
            Phase::PacManDying => Some(self.player_dying_ticks),
            Phase::ChangingLevel => Some(
                self.hide_pursuers_ticks
                    .saturating_add(self.flashing_ticks()),
            ),
            Phase::Playing | Phase::GameOver => None,
        }
    }
}

/// Values the transition guards and effects read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlowContext {
    /// Lives left, including the one in play.
    pub lives: u8,
    /// Current level.
    pub level: u32,
    /// Lives granted by a new game.
    pub starting_lives: u8,
    /// Level a new game starts on.
    pub starting_level: u32,
    /// Steps spent in the current phase.
    pub ticks_in_phase: u32,
    /// Minimum game-over time before a restart.
    pub game_over_ticks: u32,
}

fn has_spare_life(context: &FlowContext) -> bool {
    context.lives > 1
}

fn game_over_elapsed(context: &FlowContext) -> bool {
    context.ticks_in_phase >= context.game_over_ticks
}

fn wake(_: &FlowContext, out: &mut Vec<Command>) {
    out.push(Command::WakePlayer);
}

fn continue_after_death(_: &FlowContext, out: &mut Vec<Command>) {
    out.push(Command::LoseLife);
    out.push(Command::ResetActors);
    out.push(Command::WakePlayer);
}

fn end_game(_: &FlowContext, out: &mut Vec<Command>) {
    out.push(Command::LoseLife);
    out.push(Command::EndGame);
}

fn next_level(context: &FlowContext, out: &mut Vec<Command>) {
    out.push(Command::StartLevel {
        level: context.level.saturating_add(1),
    });
    out.push(Command::WakePlayer);
}

fn new_game(context: &FlowContext, out: &mut Vec<Command>) {
    out.push(Command::NewGame {
        lives: context.starting_lives,
    });
    out.push(Command::StartLevel {
        level: context.starting_level,
    });
}

type FlowTransition = Transition<Phase, Trigger, FlowContext>;

static TRANSITIONS: [FlowTransition; 9] = [
    Transition {
        from: Phase::Ready,
        trigger: Trigger::Timeout,
        guard: always,
        to: Phase::Playing,
        effect: wake,
    },
    Transition {
        from: Phase::Playing,
        trigger: Trigger::PlayerCaught,
        guard: always,
        to: Phase::PacManDying,
        effect: nothing,
    },
    Transition {
        from: Phase::Playing,
        trigger: Trigger::MazeCleared,
        guard: always,
        to: Phase::ChangingLevel,
        effect: nothing,
    },
    Transition {
        from: Phase::Playing,
        trigger: Trigger::PursuerEaten,
        guard: always,
        to: Phase::GhostDying,
        effect: nothing,
    },
    Transition {
        from: Phase::GhostDying,
        trigger: Trigger::Timeout,
        guard: always,
        to: Phase::Playing,
        effect: nothing,
    },
    Transition {
        from: Phase::PacManDying,
        trigger: Trigger::Timeout,
        guard: has_spare_life,
        to: Phase::Playing,
        effect: continue_after_death,
    },
    Transition {
        from: Phase::PacManDying,
        trigger: Trigger::Timeout,
        guard: always,
        to: Phase::GameOver,
        effect: end_game,
    },
    Transition {
        from: Phase::ChangingLevel,
        trigger: Trigger::Timeout,
        guard: always,
        to: Phase::Playing,
        effect: next_level,
    },
    Transition {
        from: Phase::GameOver,
        trigger: Trigger::StartRequested,
        guard: game_over_elapsed,
        to: Phase::Ready,
        effect: new_game,
    },
];

/// Presentation hints derived from the current phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlowStatus {
    /// Current phase.
    pub phase: Phase,
    /// Steps spent in the current phase.
    pub ticks_in_phase: u32,
    /// Whether pursuers should be drawn.
    pub pursuers_visible: bool,
    /// Whether the maze is in the bright half of a flash.
    pub maze_flashing: bool,
}

/// Pure system sequencing the game's phases.
#[derive(Debug)]
pub struct GameFlow {
    machine: StateMachine<Phase, Trigger, FlowContext>,
    durations: PhaseDurations,
    lives: u8,
    level: u32,
    starting_lives: u8,
    starting_level: u32,
    start_requested: bool,
}

impl GameFlow {
    /// Creates a flow waiting in [`Phase::Ready`].
    #[must_use]
    pub fn new(durations: PhaseDurations, starting_lives: u8, starting_level: u32) -> Self {
        Self {
            machine: StateMachine::new(&TRANSITIONS, Phase::Ready),
            durations,
            lives: starting_lives,
            level: starting_level,
            starting_lives,
            starting_level,
            start_requested: false,
        }
    }

    /// Enters [`Phase::Ready`] and requests a fresh game from the world.
    pub fn start(&mut self, out: &mut Vec<Command>) {
        self.machine.reset(Phase::Ready);
        self.start_requested = false;
        let context = self.context();
        new_game(&context, out);
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.machine.state()
    }

    /// Records a player request to leave the game-over screen.
    pub fn request_start(&mut self) {
        self.start_requested = true;
    }

    /// Presentation hints for the current step.
    #[must_use]
    pub fn status(&self) -> FlowStatus {
        let phase = self.phase();
        let ticks = self.machine.ticks_in_state();
        let hide = self.durations.hide_pursuers_ticks;
        let hiding = matches!(phase, Phase::PacManDying | Phase::ChangingLevel) && ticks >= hide;
        let maze_flashing = phase == Phase::ChangingLevel
            && self.durations.flash_ticks > 0
            && ticks >= hide
            && ticks - hide < self.durations.flashing_ticks()
            && ((ticks - hide) / self.durations.flash_ticks) % 2 == 0;
        FlowStatus {
            phase,
            ticks_in_phase: ticks,
            pursuers_visible: !hiding,
            maze_flashing,
        }
    }

    /// Consumes world events, firing the transitions they trigger.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::GameStarted { lives } | Event::ExtraLifeAwarded { lives } => {
                    self.lives = *lives;
                }
                Event::LifeLost { lives_remaining } => self.lives = *lives_remaining,
                Event::LevelStarted { level } => self.level = *level,
                Event::PursuerEaten { .. } => self.fire(Trigger::PursuerEaten, out),
                Event::PlayerCaught { .. } => self.fire(Trigger::PlayerCaught, out),
                Event::MazeCleared => self.fire(Trigger::MazeCleared, out),
                _ => {}
            }
        }
    }

    /// Counts one simulation step and fires timeouts and pending requests.
    pub fn advance(&mut self, out: &mut Vec<Command>) {
        self.machine.tick();
        if let Some(limit) = self.durations.timeout(self.phase()) {
            if self.machine.ticks_in_state() >= limit {
                self.fire(Trigger::Timeout, out);
            }
        }
        if self.phase() == Phase::GameOver && self.start_requested {
            self.start_requested = false;
            self.fire(Trigger::StartRequested, out);
        }
    }

    fn context(&self) -> FlowContext {
        FlowContext {
            lives: self.lives,
            level: self.level,
            starting_lives: self.starting_lives,
            starting_level: self.starting_level,
            ticks_in_phase: self.machine.ticks_in_state(),
            game_over_ticks: self.durations.game_over_ticks,
        }
    }

    fn fire(&mut self, trigger: Trigger, out: &mut Vec<Command>) {
        let from = self.phase();
        let context = self.context();
        if let Some(to) = self.machine.fire(trigger, &context, out) {
            info!("{from:?} -> {to:?} on {trigger:?}");
        }
    }
}
