#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state management for Robo Blocks.
//!
//! The session owns the active level, the robot's simulation state, and at
//! most one in-flight run. Adapters mutate it exclusively through [`apply`]
//! and observe it exclusively through [`query`]. Each instruction's
//! validate/commit/log/event sequence completes inside a single `apply`
//! call, so observers never see a tentative or partially applied step.

use std::time::Duration;

use robo_blocks_core::{
    ActionTag, CellCoord, Command, Event, Heading, Instruction, LevelConfig, Program, RunId,
    RunOutcome, SimulationSnapshot,
};

const READY_LOG: &str = "Robot ready. Awaiting instructions.";
const RUNNING_LOG: &str = "Running program...";
const GOAL_LOG: &str = "Goal reached! Well done.";
const EXHAUSTED_LOG: &str = "Program finished. Goal not reached.";

/// Represents the authoritative Robo Blocks session state.
#[derive(Debug)]
pub struct World {
    level: LevelConfig,
    sim: SimulationState,
    active: Option<ActiveRun>,
    next_run: u64,
}

impl World {
    /// Creates a new session seeded with the starter level.
    #[must_use]
    pub fn new() -> Self {
        let level = LevelConfig::starter();
        let sim = SimulationState::initial(&level);
        Self {
            level,
            sim,
            active: None,
            next_run: 0,
        }
    }

    fn reset_sim(&mut self) {
        self.sim = SimulationState::initial(&self.level);
        self.active = None;
    }

    fn allocate_run(&mut self) -> RunId {
        let run = RunId::new(self.next_run);
        self.next_run = self.next_run.wrapping_add(1);
        run
    }

    /// Drains whole step delays from the accumulator, executing one
    /// instruction per delay until the budget or the run is spent.
    ///
    /// A zero step delay therefore drains the remaining program on the
    /// first tick that reaches it.
    fn advance_run(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let Some(mut active) = self.active.take() else {
            return;
        };
        active.accumulator = active.accumulator.saturating_add(dt);

        let mut running = true;
        while running {
            if active.accumulator < active.step_delay {
                break;
            }
            active.accumulator -= active.step_delay;

            match active.program.instructions().get(active.cursor).copied() {
                None => {
                    // Only an empty program reaches this arm; non-empty
                    // programs finish right after their last instruction.
                    self.finish_exhausted(active.id, out_events);
                    running = false;
                }
                Some(instruction) => {
                    active.cursor += 1;
                    running = self.execute_instruction(active.id, instruction, out_events);
                    if running && active.cursor >= active.program.len() {
                        self.finish_exhausted(active.id, out_events);
                        running = false;
                    }
                }
            }
        }

        if running {
            self.active = Some(active);
        }
    }

    /// Executes a single instruction against the simulation state.
    ///
    /// Returns `false` when the step terminated the run.
    fn execute_instruction(
        &mut self,
        run: RunId,
        instruction: Instruction,
        out_events: &mut Vec<Event>,
    ) -> bool {
        let from = self.sim.position;
        let heading = self.sim.heading;

        let step = match instruction {
            Instruction::MoveForward => PlannedStep {
                tentative: from.stepped(heading, 1),
                heading,
                trail: TrailEntries::one(from),
                log_line: "Move forward",
                tag: ActionTag::Move,
            },
            Instruction::TurnLeft => PlannedStep {
                tentative: from,
                heading: heading.turned_left(),
                trail: TrailEntries::none(),
                log_line: "Turn left",
                tag: ActionTag::Turn,
            },
            Instruction::TurnRight => PlannedStep {
                tentative: from,
                heading: heading.turned_right(),
                trail: TrailEntries::none(),
                log_line: "Turn right",
                tag: ActionTag::Turn,
            },
            Instruction::Jump => PlannedStep {
                // The intermediate cell is deliberately left unchecked so
                // the robot can clear a single obstacle; only the landing
                // cell faces validation.
                tentative: from.stepped(heading, 2),
                heading,
                trail: TrailEntries::two(from, from.stepped(heading, 1)),
                log_line: "Double jump",
                tag: ActionTag::Jump,
            },
        };

        if !self.level.contains(step.tentative) || self.level.is_obstacle(step.tentative) {
            self.sim.failed = true;
            self.sim.last_action = Some(ActionTag::Crash);
            self.sim
                .log
                .push(format!("Crash at computed position {}", step.tentative));
            out_events.push(Event::RobotCrashed {
                run,
                at: step.tentative,
            });
            out_events.push(Event::RunEnded {
                run,
                outcome: RunOutcome::Crashed,
            });
            return false;
        }

        self.sim.position = step.tentative;
        self.sim.heading = step.heading;
        for cell in step.trail.iter() {
            self.sim.trail.push(cell);
        }
        self.sim.log.push(step.log_line.to_owned());
        self.sim.last_action = Some(step.tag);
        out_events.push(match instruction {
            Instruction::MoveForward => Event::RobotAdvanced {
                run,
                from,
                to: step.tentative,
            },
            Instruction::TurnLeft | Instruction::TurnRight => Event::RobotTurned {
                run,
                heading: step.heading,
            },
            Instruction::Jump => Event::RobotJumped {
                run,
                from,
                over: from.stepped(heading, 1),
                to: step.tentative,
            },
        });

        if step.tentative == self.level.target() {
            self.sim.complete = true;
            self.sim.last_action = Some(ActionTag::Win);
            self.sim.log.push(GOAL_LOG.to_owned());
            out_events.push(Event::GoalReached {
                run,
                at: step.tentative,
            });
            out_events.push(Event::RunEnded {
                run,
                outcome: RunOutcome::GoalReached,
            });
            return false;
        }

        true
    }

    fn finish_exhausted(&mut self, run: RunId, out_events: &mut Vec<Event>) {
        self.sim.last_action = None;
        self.sim.log.push(EXHAUSTED_LOG.to_owned());
        out_events.push(Event::RunEnded {
            run,
            outcome: RunOutcome::ProgramExhausted,
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the session, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadLevel { level } => {
            world.level = level;
            world.reset_sim();
            out_events.push(Event::SessionReset);
        }
        Command::Reset => {
            world.reset_sim();
            out_events.push(Event::SessionReset);
        }
        Command::StartRun {
            program,
            step_delay,
        } => {
            world.reset_sim();
            world.sim.log.clear();
            world.sim.log.push(RUNNING_LOG.to_owned());
            let run = world.allocate_run();
            world.active = Some(ActiveRun {
                id: run,
                program,
                cursor: 0,
                step_delay,
                accumulator: Duration::ZERO,
            });
            out_events.push(Event::RunStarted { run });
        }
        Command::Tick { run, dt } => {
            // Stale epoch guard: a driver that outlived a reset or restart
            // must never advance the replacement session.
            let matches = world
                .active
                .as_ref()
                .map_or(false, |active| active.id == run);
            if !matches {
                return;
            }
            world.advance_run(dt, out_events);
        }
    }
}

/// Query functions that provide read-only access to the session state.
pub mod query {
    use super::World;
    use robo_blocks_core::{LevelConfig, RunId, SimulationSnapshot};

    /// Provides read-only access to the active level configuration.
    #[must_use]
    pub fn level(world: &World) -> &LevelConfig {
        &world.level
    }

    /// Captures an immutable snapshot of the simulation state.
    #[must_use]
    pub fn snapshot(world: &World) -> SimulationSnapshot {
        SimulationSnapshot {
            position: world.sim.position,
            heading: world.sim.heading,
            trail: world.sim.trail.clone(),
            complete: world.sim.complete,
            failed: world.sim.failed,
            log: world.sim.log.clone(),
            last_action: world.sim.last_action,
        }
    }

    /// Epoch token of the in-flight run, if one is active.
    #[must_use]
    pub fn active_run(world: &World) -> Option<RunId> {
        world.active.as_ref().map(|active| active.id)
    }
}

#[derive(Clone, Debug)]
struct SimulationState {
    position: CellCoord,
    heading: Heading,
    trail: Vec<CellCoord>,
    complete: bool,
    failed: bool,
    log: Vec<String>,
    last_action: Option<ActionTag>,
}

impl SimulationState {
    fn initial(level: &LevelConfig) -> Self {
        Self {
            position: level.start(),
            heading: level.heading(),
            trail: Vec::new(),
            complete: false,
            failed: false,
            log: vec![READY_LOG.to_owned()],
            last_action: None,
        }
    }
}

#[derive(Clone, Debug)]
struct ActiveRun {
    id: RunId,
    program: Program,
    cursor: usize,
    step_delay: Duration,
    accumulator: Duration,
}

/// Outcome of planning one instruction before validation.
#[derive(Clone, Copy, Debug)]
struct PlannedStep {
    tentative: CellCoord,
    heading: Heading,
    trail: TrailEntries,
    log_line: &'static str,
    tag: ActionTag,
}

/// Up to two trail cells recorded by a committed step.
#[derive(Clone, Copy, Debug)]
struct TrailEntries {
    cells: [Option<CellCoord>; 2],
}

impl TrailEntries {
    const fn none() -> Self {
        Self {
            cells: [None, None],
        }
    }

    const fn one(cell: CellCoord) -> Self {
        Self {
            cells: [Some(cell), None],
        }
    }

    const fn two(first: CellCoord, second: CellCoord) -> Self {
        Self {
            cells: [Some(first), Some(second)],
        }
    }

    fn iter(self) -> impl Iterator<Item = CellCoord> {
        self.cells.into_iter().flatten()
    }
}
