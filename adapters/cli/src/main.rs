#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a block program against a grid level.
//!
//! The adapter stands in for the graphical authoring, rendering, and
//! feedback surfaces: it parses the program from positional tokens, drives
//! the timed run loop, draws the grid after every applied command, and
//! prints the action tag stream that an audio layer would consume.

use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;

use robo_blocks_core::{
    ActionTag, CellCoord, Command, Event, Heading, Instruction, Program, SimulationSnapshot,
};
use robo_blocks_system_level_gen::{
    Config as GeneratorConfig, LevelGeneration, DEFAULT_ATTEMPT_BUDGET,
};
use robo_blocks_world::{self as world, query, World};

/// Command-line arguments accepted by the playback adapter.
#[derive(Debug, Parser)]
#[command(
    name = "robo-blocks",
    about = "Steps a block program through a grid level"
)]
struct Args {
    /// Instructions in execution order: move_forward, turn_left,
    /// turn_right, jump.
    #[arg(required = true)]
    program: Vec<String>,

    /// Delay between instruction steps in milliseconds.
    #[arg(long, default_value_t = 500)]
    delay_ms: u64,

    /// Generate a random level instead of playing the starter level.
    #[arg(long)]
    random_level: bool,

    /// Seed for the level generator; omitted seeds draw from OS entropy.
    #[arg(long)]
    seed: Option<u64>,
}

/// Entry point for the Robo Blocks command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    let program = parse_program(&args.program)?;
    let step_delay = Duration::from_millis(args.delay_ms);

    let mut session = World::new();
    let mut events = Vec::new();

    if args.random_level {
        let mut generator = match args.seed {
            Some(seed) => {
                LevelGeneration::new(GeneratorConfig::new(DEFAULT_ATTEMPT_BUDGET, seed))
            }
            None => LevelGeneration::from_entropy(),
        };
        let mut commands = Vec::new();
        generator.handle(&mut commands);
        for command in commands {
            world::apply(&mut session, command, &mut events);
        }
    }

    render(&session);

    events.clear();
    world::apply(
        &mut session,
        Command::StartRun {
            program,
            step_delay,
        },
        &mut events,
    );
    let run = query::active_run(&session).context("run did not start")?;

    loop {
        thread::sleep(step_delay);

        events.clear();
        world::apply(
            &mut session,
            Command::Tick {
                run,
                dt: step_delay,
            },
            &mut events,
        );

        for event in &events {
            if let Some(tag) = event.action_tag() {
                println!("[{}]", feedback_cue(tag));
            }
        }
        render(&session);

        if events
            .iter()
            .any(|event| matches!(event, Event::RunEnded { .. }))
        {
            break;
        }
    }

    for line in &query::snapshot(&session).log {
        println!("{line}");
    }

    Ok(())
}

fn parse_program(tokens: &[String]) -> Result<Program> {
    tokens
        .iter()
        .map(|token| parse_instruction(token))
        .collect()
}

fn parse_instruction(token: &str) -> Result<Instruction> {
    match token {
        "move_forward" => Ok(Instruction::MoveForward),
        "turn_left" => Ok(Instruction::TurnLeft),
        "turn_right" => Ok(Instruction::TurnRight),
        "jump" => Ok(Instruction::Jump),
        other => bail!(
            "unknown instruction `{other}`; expected move_forward, turn_left, turn_right, or jump"
        ),
    }
}

fn render(session: &World) {
    let level = query::level(session);
    let snapshot = query::snapshot(session);

    for row in 0..level.grid_size() {
        let mut line = String::new();
        for column in 0..level.grid_size() {
            line.push(cell_glyph(session, &snapshot, CellCoord::new(column, row)));
            line.push(' ');
        }
        println!("{}", line.trim_end());
    }
    println!();
}

fn cell_glyph(session: &World, snapshot: &SimulationSnapshot, cell: CellCoord) -> char {
    let level = query::level(session);
    if snapshot.position == cell {
        heading_glyph(snapshot.heading)
    } else if level.target() == cell {
        'G'
    } else if level.is_obstacle(cell) {
        '#'
    } else if snapshot.trail.contains(&cell) {
        '*'
    } else {
        '.'
    }
}

fn heading_glyph(heading: Heading) -> char {
    match heading {
        Heading::North => '^',
        Heading::East => '>',
        Heading::South => 'v',
        Heading::West => '<',
    }
}

fn feedback_cue(tag: ActionTag) -> &'static str {
    match tag {
        ActionTag::Move => "step",
        ActionTag::Turn => "turn",
        ActionTag::Jump => "jump",
        ActionTag::Crash => "crash",
        ActionTag::Win => "win",
    }
}
