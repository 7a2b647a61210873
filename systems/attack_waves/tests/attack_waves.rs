use maze_pursuit_core::{Command, Event, Maze, PursuerId, PursuerState, WaveMode};
use maze_pursuit_system_attack_waves::{AttackWaves, PHASE_COUNT};
use maze_pursuit_world::{self as world, query, World};

fn started_world(level: u32) -> World {
    let maze = Maze::classic().expect("classic maze parses");
    let mut world = World::new(maze);
    let mut events = Vec::new();
    world::apply(&mut world, Command::NewGame { lives: 3 }, &mut events);
    world::apply(&mut world, Command::StartLevel { level }, &mut events);
    world
}

/// Ticks the world once and applies the scheduler's response, returning the
/// mode changes it announced.
fn tick(world: &mut World, waves: &mut AttackWaves) -> Vec<WaveMode> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick, &mut events);
    let mut commands = Vec::new();
    waves.handle(&events, &mut commands);

    let mut changes = Vec::new();
    for command in commands {
        let mut produced = Vec::new();
        world::apply(world, command, &mut produced);
        changes.extend(produced.into_iter().filter_map(|event| match event {
            Event::WaveModeChanged { mode } => Some(mode),
            _ => None,
        }));
    }
    changes
}

#[test]
fn level_one_flips_follow_the_wave_table() {
    let mut world = started_world(1);
    let mut waves = AttackWaves::new();
    let mut flips = Vec::new();
    for tick_index in 1..=6_000_u32 {
        for mode in tick(&mut world, &mut waves) {
            flips.push((tick_index, mode));
        }
    }
    assert_eq!(
        flips,
        vec![
            (420, WaveMode::Chasing),
            (1620, WaveMode::Scattering),
            (2040, WaveMode::Chasing),
            (3240, WaveMode::Scattering),
            (3540, WaveMode::Chasing),
            (4740, WaveMode::Scattering),
            (5040, WaveMode::Chasing),
        ]
    );
}

#[test]
fn exhausted_table_keeps_chasing() {
    let mut world = started_world(5);
    let mut waves = AttackWaves::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::StartLevel { level: 5 }, &mut events);
    let mut ignored = Vec::new();
    waves.handle(&events, &mut ignored);

    for _ in 0..70_000 {
        let _ = tick(&mut world, &mut waves);
    }
    let status = waves.status();
    assert_eq!(status.phase, PHASE_COUNT - 1);
    assert_eq!(status.mode, WaveMode::Chasing);
    assert_eq!(status.remaining_ticks, None);

    for _ in 0..10_000 {
        assert!(tick(&mut world, &mut waves).is_empty());
    }
    assert_eq!(query::round_status(&world).wave_mode, WaveMode::Chasing);
}

#[test]
fn flip_switches_and_reverses_the_direct_pursuer() {
    let mut world = started_world(1);
    let mut waves = AttackWaves::new();
    for _ in 0..419 {
        let _ = tick(&mut world, &mut waves);
    }
    let before = query::actor_view(&world)
        .pursuer(PursuerId::Direct)
        .expect("direct pursuer")
        .motion;
    assert!(!before.reversal_pending);

    assert_eq!(tick(&mut world, &mut waves), vec![WaveMode::Chasing]);
    let direct = *query::actor_view(&world)
        .pursuer(PursuerId::Direct)
        .expect("direct pursuer");
    assert_eq!(direct.pursuer_state(), Some(PursuerState::Chasing));
    assert!(direct.motion.reversal_pending);
    assert_eq!(direct.motion.wish_direction, before.direction.opposite());
}
