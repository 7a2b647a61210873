#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that paces every actor once per tick.
//!
//! The system owns the speed policy: a percentage table keyed by level
//! bracket, actor state and tunnel occupancy. Each tick it converts those
//! percentages into pixel distances and proposes one `AdvanceActor` command
//! per mobile actor; the world performs the actual sub-tile movement.

use maze_pursuit_core::{
    ActorId, ActorSnapshot, ActorState, ActorView, Command, ElroyStage, Event, Maze, PlayerState,
    PursuerId, PursuerState, RoundStatus,
};

/// Distance in pixels covered per tick at 100% speed.
pub const BASE_SPEED: f32 = 1.25;

const DEAD_PERCENT: u32 = 150;
const ENTERING_PERCENT: u32 = 150;
const LEAVING_PERCENT: u32 = 50;
const LOCKED_PERCENT: u32 = 50;

/// Speed percentages shared by one range of levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Bracket {
    player: u32,
    player_powered: u32,
    pursuer: u32,
    frightened: u32,
    tunnel: u32,
    elroy_first: u32,
    elroy_second: u32,
}

const BRACKETS: [Bracket; 4] = [
    Bracket {
        player: 80,
        player_powered: 90,
        pursuer: 75,
        frightened: 50,
        tunnel: 40,
        elroy_first: 80,
        elroy_second: 85,
    },
    Bracket {
        player: 90,
        player_powered: 95,
        pursuer: 85,
        frightened: 55,
        tunnel: 45,
        elroy_first: 90,
        elroy_second: 95,
    },
    Bracket {
        player: 100,
        player_powered: 100,
        pursuer: 95,
        frightened: 60,
        tunnel: 50,
        elroy_first: 100,
        elroy_second: 105,
    },
    Bracket {
        player: 90,
        player_powered: 90,
        pursuer: 95,
        frightened: 60,
        tunnel: 50,
        elroy_first: 100,
        elroy_second: 105,
    },
];

fn bracket(level: u32) -> Bracket {
    match level {
        0 | 1 => BRACKETS[0],
        2..=4 => BRACKETS[1],
        5..=20 => BRACKETS[2],
        _ => BRACKETS[3],
    }
}

/// Converts the percentage policy into per-tick pixel distances.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeedTable {
    base: f32,
}

impl SpeedTable {
    /// Creates a table scaled to the provided 100% speed.
    #[must_use]
    pub const fn new(base: f32) -> Self {
        Self { base }
    }

    fn pixels(&self, percent: u32) -> f32 {
        self.base * percent as f32 / 100.0
    }

    /// Pixels per tick covered by the player.
    #[must_use]
    pub fn player(&self, level: u32, powered: bool) -> f32 {
        let bracket = bracket(level);
        let percent = if powered {
            bracket.player_powered
        } else {
            bracket.player
        };
        self.pixels(percent)
    }

    /// Pixels per tick covered by a pursuer.
    ///
    /// House choreography and dead pursuers use fixed speeds; tunnels slow
    /// down every other pursuer, and the direct pursuer speeds up while its
    /// elroy stage is active.
    #[must_use]
    pub fn pursuer(
        &self,
        pursuer: PursuerId,
        state: PursuerState,
        in_tunnel: bool,
        status: &RoundStatus,
    ) -> f32 {
        let bracket = bracket(status.level);
        let percent = match state {
            PursuerState::Locked => LOCKED_PERCENT,
            PursuerState::LeavingHouse => LEAVING_PERCENT,
            PursuerState::EnteringHouse => ENTERING_PERCENT,
            PursuerState::Dead => DEAD_PERCENT,
            _ if in_tunnel => bracket.tunnel,
            PursuerState::Frightened => bracket.frightened,
            PursuerState::Scattering | PursuerState::Chasing => {
                match (pursuer, status.elroy) {
                    (PursuerId::Direct, ElroyStage::First) => bracket.elroy_first,
                    (PursuerId::Direct, ElroyStage::Second) => bracket.elroy_second,
                    _ => bracket.pursuer,
                }
            }
        };
        self.pixels(percent)
    }
}

impl Default for SpeedTable {
    fn default() -> Self {
        Self::new(BASE_SPEED)
    }
}

/// Pure system that reacts to world events and emits movement commands.
#[derive(Debug, Default)]
pub struct Movement {
    speeds: SpeedTable,
}

impl Movement {
    /// Creates a movement system using the provided speed table.
    #[must_use]
    pub const fn new(speeds: SpeedTable) -> Self {
        Self { speeds }
    }

    /// Speed table used to pace actors.
    #[must_use]
    pub const fn speeds(&self) -> &SpeedTable {
        &self.speeds
    }

    /// Consumes world events and immutable views to emit movement commands.
    ///
    /// Commands are only produced on ticks that carry `TimeAdvanced`.
    pub fn handle(
        &mut self,
        events: &[Event],
        actors: &ActorView,
        maze: &Maze,
        status: RoundStatus,
        out: &mut Vec<Command>,
    ) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        for snapshot in actors.iter() {
            if let Some(pixels) = self.pace(snapshot, maze, &status) {
                out.push(Command::AdvanceActor {
                    actor: snapshot.id,
                    pixels,
                });
            }
        }
    }

    fn pace(&self, snapshot: &ActorSnapshot, maze: &Maze, status: &RoundStatus) -> Option<f32> {
        match (snapshot.id, snapshot.state) {
            (ActorId::Player, ActorState::Player(PlayerState::Eating)) => {
                Some(self.speeds.player(status.level, status.is_powered()))
            }
            (ActorId::Pursuer(pursuer), ActorState::Pursuer(state)) => {
                let in_tunnel = maze.is_tunnel(snapshot.tile());
                Some(self.speeds.pursuer(pursuer, state, in_tunnel, status))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_pursuit_core::WaveMode;

    fn status(level: u32, elroy: ElroyStage) -> RoundStatus {
        RoundStatus {
            level,
            wave_mode: WaveMode::Scattering,
            power_ticks: 0,
            elroy,
            food_remaining: 100,
        }
    }

    fn close(actual: f32, expected: f32) -> bool {
        (actual - expected).abs() < 1e-5
    }

    #[test]
    fn player_speed_follows_level_brackets() {
        let table = SpeedTable::default();
        assert!(close(table.player(1, false), 1.0));
        assert!(close(table.player(1, true), 1.125));
        assert!(close(table.player(3, false), 1.125));
        assert!(close(table.player(12, false), 1.25));
        assert!(close(table.player(21, false), 1.125));
    }

    #[test]
    fn tunnel_slows_hunting_and_frightened_pursuers() {
        let table = SpeedTable::default();
        let status = status(1, ElroyStage::Off);
        for state in [
            PursuerState::Scattering,
            PursuerState::Chasing,
            PursuerState::Frightened,
        ] {
            assert!(close(table.pursuer(PursuerId::Flanker, state, true, &status), 0.5));
        }
        assert!(close(
            table.pursuer(PursuerId::Flanker, PursuerState::Dead, true, &status),
            1.875
        ));
    }

    #[test]
    fn house_choreography_uses_fixed_speeds() {
        let table = SpeedTable::default();
        let status = status(7, ElroyStage::Off);
        assert!(close(
            table.pursuer(PursuerId::Ambusher, PursuerState::Locked, false, &status),
            0.625
        ));
        assert!(close(
            table.pursuer(PursuerId::Ambusher, PursuerState::LeavingHouse, false, &status),
            0.625
        ));
        assert!(close(
            table.pursuer(PursuerId::Ambusher, PursuerState::EnteringHouse, false, &status),
            1.875
        ));
    }

    #[test]
    fn elroy_speeds_apply_to_direct_pursuer_only() {
        let table = SpeedTable::default();
        let first = status(1, ElroyStage::First);
        let second = status(1, ElroyStage::Second);
        assert!(close(
            table.pursuer(PursuerId::Direct, PursuerState::Chasing, false, &first),
            1.0
        ));
        assert!(close(
            table.pursuer(PursuerId::Direct, PursuerState::Scattering, false, &second),
            1.0625
        ));
        assert!(close(
            table.pursuer(PursuerId::Ambusher, PursuerState::Chasing, false, &second),
            0.9375
        ));
        assert!(close(
            table.pursuer(PursuerId::Direct, PursuerState::Frightened, false, &second),
            0.625
        ));
    }
}
