use std::time::Duration;

use robo_blocks_core::{Command, Event, Instruction, Program, SimulationSnapshot};
use robo_blocks_world::{self as world, query, World};

const STEP_DELAY: Duration = Duration::from_millis(250);

/// Replays the program against a fresh session and records every event and
/// the snapshot observed after each applied command.
fn replay(instructions: &[Instruction]) -> (Vec<Event>, Vec<SimulationSnapshot>) {
    let mut world = World::new();
    let mut events = Vec::new();
    let mut snapshots = Vec::new();

    world::apply(
        &mut world,
        Command::StartRun {
            program: Program::from_instructions(instructions.to_vec()),
            step_delay: STEP_DELAY,
        },
        &mut events,
    );
    snapshots.push(query::snapshot(&world));

    let run = events
        .iter()
        .find_map(|event| match event {
            Event::RunStarted { run } => Some(*run),
            _ => None,
        })
        .expect("run started");

    for _ in 0..32 {
        let before = events.len();
        world::apply(
            &mut world,
            Command::Tick {
                run,
                dt: STEP_DELAY,
            },
            &mut events,
        );
        snapshots.push(query::snapshot(&world));

        let terminated = events[before..]
            .iter()
            .any(|event| matches!(event, Event::RunEnded { .. }));
        if terminated {
            break;
        }
    }

    (events, snapshots)
}

#[test]
fn identical_programs_replay_identically() {
    let program = [
        Instruction::Jump,
        Instruction::MoveForward,
        Instruction::TurnLeft,
        Instruction::MoveForward,
        Instruction::TurnRight,
        Instruction::MoveForward,
    ];

    let (first_events, first_snapshots) = replay(&program);
    let (second_events, second_snapshots) = replay(&program);

    assert_eq!(first_events, second_events);
    assert_eq!(first_snapshots, second_snapshots);
}

#[test]
fn crashing_programs_replay_identically() {
    // Marches straight into the starter level's obstacle at (1, 4).
    let program = [Instruction::MoveForward, Instruction::MoveForward];

    let (first_events, first_snapshots) = replay(&program);
    let (second_events, second_snapshots) = replay(&program);

    assert_eq!(first_events, second_events);
    assert_eq!(first_snapshots, second_snapshots);

    let last = first_snapshots.last().expect("snapshots recorded");
    assert!(last.failed);
    assert_eq!(last.log.len(), first_snapshots[0].log.len() + 1);
}
