#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Release controller deciding when caged pursuers may leave the house.
//!
//! Pursuers leave in a fixed priority order. Only the first caged pursuer in
//! that order counts food, either on its private counter or, after a life has
//! been lost, on the shared global counter. A starvation timer releases the
//! same pursuer when the player stops eating for too long.

use log::debug;
use maze_pursuit_core::{ActorView, Command, Event, PursuerId, PursuerState};

/// Global counter value at which the global counter is disabled if the
/// opportunist is still in the house.
pub const GLOBAL_COUNTER_CUTOFF: u32 = 32;

/// Private food limit for `pursuer` on `level`.
#[must_use]
pub const fn private_limit(pursuer: PursuerId, level: u32) -> u32 {
    match (pursuer, level) {
        (PursuerId::Flanker, 1) => 30,
        (PursuerId::Opportunist, 1) => 60,
        (PursuerId::Opportunist, 2) => 50,
        _ => 0,
    }
}

/// Global counter value that releases `pursuer`.
#[must_use]
pub const fn global_limit(pursuer: PursuerId) -> u32 {
    match pursuer {
        PursuerId::Direct => 0,
        PursuerId::Ambusher => 7,
        PursuerId::Flanker => 17,
        PursuerId::Opportunist => GLOBAL_COUNTER_CUTOFF,
    }
}

/// Ticks without eating the starvation timer must exceed before the next
/// caged pursuer is released.
#[must_use]
pub const fn starvation_limit(level: u32) -> u32 {
    if level < 5 {
        240
    } else {
        180
    }
}

/// Pure system that emits `ReleasePursuer` commands.
#[derive(Debug)]
pub struct Release {
    level: u32,
    private_counters: [u32; 4],
    global_counter: u32,
    global_enabled: bool,
    starvation_ticks: u32,
    released: [bool; 4],
}

impl Default for Release {
    fn default() -> Self {
        Self::new()
    }
}

impl Release {
    /// Creates a release controller for level 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            level: 1,
            private_counters: [0; 4],
            global_counter: 0,
            global_enabled: false,
            starvation_ticks: 0,
            released: [false; 4],
        }
    }

    /// Current value of the private counter belonging to `pursuer`.
    #[must_use]
    pub fn private_counter(&self, pursuer: PursuerId) -> u32 {
        self.private_counters[pursuer.index()]
    }

    /// Current global counter value, or `None` while it is disabled.
    #[must_use]
    pub fn global_counter(&self) -> Option<u32> {
        self.global_enabled.then_some(self.global_counter)
    }

    /// Ticks since the player last ate.
    #[must_use]
    pub fn starvation_ticks(&self) -> u32 {
        self.starvation_ticks
    }

    /// Consumes world events and the actor view to emit release commands.
    pub fn handle(&mut self, events: &[Event], actors: &ActorView, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::LevelStarted { level } => {
                    self.level = *level;
                    self.private_counters = [0; 4];
                    self.global_counter = 0;
                    self.global_enabled = false;
                    self.starvation_ticks = 0;
                    self.released = [false; 4];
                }
                Event::LifeLost { .. } => {
                    self.global_counter = 0;
                    self.global_enabled = true;
                    self.starvation_ticks = 0;
                }
                Event::ActorsReset => {
                    self.starvation_ticks = 0;
                    self.released = [false; 4];
                }
                Event::FoodEaten { .. } => {
                    self.starvation_ticks = 0;
                    self.count_food(actors);
                    self.release_by_counter(actors, out);
                    self.apply_global_cutoff(actors);
                }
                Event::TimeAdvanced { .. } => {
                    self.starvation_ticks = self.starvation_ticks.saturating_add(1);
                    self.release_by_counter(actors, out);
                    self.release_by_starvation(actors, out);
                }
                _ => {}
            }
        }
    }

    fn is_caged(&self, pursuer: PursuerId, actors: &ActorView) -> bool {
        !self.released[pursuer.index()]
            && actors
                .pursuer(pursuer)
                .and_then(|snapshot| snapshot.pursuer_state())
                == Some(PursuerState::Locked)
    }

    fn preferred(&self, actors: &ActorView) -> Option<PursuerId> {
        PursuerId::ALL
            .into_iter()
            .find(|pursuer| self.is_caged(*pursuer, actors))
    }

    fn is_in_house(pursuer: PursuerId, actors: &ActorView) -> bool {
        matches!(
            actors
                .pursuer(pursuer)
                .and_then(|snapshot| snapshot.pursuer_state()),
            Some(PursuerState::Locked | PursuerState::LeavingHouse)
        )
    }

    fn count_food(&mut self, actors: &ActorView) {
        if self.global_enabled {
            self.global_counter += 1;
        } else if let Some(pursuer) = self.preferred(actors) {
            self.private_counters[pursuer.index()] += 1;
        }
    }

    fn apply_global_cutoff(&mut self, actors: &ActorView) {
        if self.global_enabled
            && self.global_counter == GLOBAL_COUNTER_CUTOFF
            && Self::is_in_house(PursuerId::Opportunist, actors)
        {
            debug!("global food counter disabled");
            self.global_enabled = false;
            self.global_counter = 0;
        }
    }

    fn release_by_counter(&mut self, actors: &ActorView, out: &mut Vec<Command>) {
        let Some(pursuer) = self.preferred(actors) else {
            return;
        };
        let due = if self.global_enabled {
            self.global_counter == global_limit(pursuer)
        } else {
            self.private_counters[pursuer.index()] >= private_limit(pursuer, self.level)
        };
        if due {
            debug!("releasing {pursuer:?} by food count");
            self.release(pursuer, out);
        }
    }

    fn release_by_starvation(&mut self, actors: &ActorView, out: &mut Vec<Command>) {
        if self.starvation_ticks <= starvation_limit(self.level) {
            return;
        }
        self.starvation_ticks = 0;
        if let Some(pursuer) = self.preferred(actors) {
            debug!("releasing {pursuer:?} after the player starved");
            self.release(pursuer, out);
        }
    }

    fn release(&mut self, pursuer: PursuerId, out: &mut Vec<Command>) {
        self.released[pursuer.index()] = true;
        out.push(Command::ReleasePursuer { pursuer });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_follow_level_brackets() {
        assert_eq!(private_limit(PursuerId::Ambusher, 1), 0);
        assert_eq!(private_limit(PursuerId::Flanker, 1), 30);
        assert_eq!(private_limit(PursuerId::Opportunist, 1), 60);
        assert_eq!(private_limit(PursuerId::Flanker, 2), 0);
        assert_eq!(private_limit(PursuerId::Opportunist, 2), 50);
        assert_eq!(private_limit(PursuerId::Opportunist, 3), 0);
        assert_eq!(starvation_limit(4), 240);
        assert_eq!(starvation_limit(5), 180);
    }

    #[test]
    fn global_counter_is_reported_only_while_enabled() {
        let mut release = Release::new();
        assert_eq!(release.global_counter(), None);
        release.handle(
            &[Event::LifeLost { lives_remaining: 2 }],
            &ActorView::default(),
            &mut Vec::new(),
        );
        assert_eq!(release.global_counter(), Some(0));
    }
}
