//! Level-dependent tables shared by the world and several systems.

use crate::{ElroyStage, TICKS_PER_SECOND};

/// Seconds of power granted by an energizer for levels 1 through 19.
const POWER_SECONDS: [u32; 19] = [6, 5, 4, 3, 2, 5, 2, 2, 1, 5, 2, 1, 1, 3, 1, 1, 0, 1, 0];

/// Remaining food that triggers the first speed-up for levels 1 through 19.
const ELROY_THRESHOLDS: [u32; 19] = [
    20, 30, 40, 40, 40, 50, 50, 50, 60, 60, 60, 80, 80, 80, 100, 100, 100, 100, 120,
];

fn table_index(level: u32, len: usize) -> usize {
    let index = usize::try_from(level.max(1) - 1).unwrap_or(usize::MAX);
    index.min(len)
}

/// Ticks of power granted by an energizer on the provided level.
///
/// Levels past the end of the table grant no power at all.
#[must_use]
pub fn power_ticks(level: u32) -> u32 {
    POWER_SECONDS
        .get(table_index(level, POWER_SECONDS.len()))
        .copied()
        .unwrap_or(0)
        * TICKS_PER_SECOND
}

/// Remaining food at which the direct pursuer first speeds up.
#[must_use]
pub fn elroy_threshold(level: u32) -> u32 {
    let index = table_index(level, ELROY_THRESHOLDS.len() - 1);
    ELROY_THRESHOLDS[index]
}

/// Speed-up stage of the direct pursuer for the given remaining food.
#[must_use]
pub fn elroy_stage(level: u32, remaining_food: u32, suspended: bool) -> ElroyStage {
    if suspended {
        return ElroyStage::Off;
    }
    let threshold = elroy_threshold(level);
    if remaining_food <= threshold / 2 {
        ElroyStage::Second
    } else if remaining_food <= threshold {
        ElroyStage::First
    } else {
        ElroyStage::Off
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_duration_follows_level_table() {
        assert_eq!(power_ticks(1), 360);
        assert_eq!(power_ticks(6), 300);
        assert_eq!(power_ticks(17), 0);
        assert_eq!(power_ticks(18), 60);
        assert_eq!(power_ticks(19), 0);
        assert_eq!(power_ticks(40), 0);
    }

    #[test]
    fn level_zero_is_treated_as_first_level() {
        assert_eq!(power_ticks(0), power_ticks(1));
        assert_eq!(elroy_threshold(0), 20);
    }

    #[test]
    fn elroy_threshold_clamps_past_table_end() {
        assert_eq!(elroy_threshold(19), 120);
        assert_eq!(elroy_threshold(255), 120);
    }

    #[test]
    fn elroy_stages_follow_remaining_food() {
        assert_eq!(elroy_stage(1, 21, false), ElroyStage::Off);
        assert_eq!(elroy_stage(1, 20, false), ElroyStage::First);
        assert_eq!(elroy_stage(1, 11, false), ElroyStage::First);
        assert_eq!(elroy_stage(1, 10, false), ElroyStage::Second);
        assert_eq!(elroy_stage(1, 5, true), ElroyStage::Off);
    }
}
