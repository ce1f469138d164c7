#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Robo Blocks engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative session, and pure systems. Adapters submit [`Command`]
//! values describing desired mutations, the session executes those commands
//! via its `apply` entry point, and then broadcasts [`Event`] values for
//! observers to react to deterministically. The rendering surface reads
//! immutable [`SimulationSnapshot`] values after each applied command; the
//! feedback surface consumes the [`ActionTag`] stream derived from events.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Commands that express all permissible session mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the active level wholesale and reinitializes the robot.
    LoadLevel {
        /// Level configuration the session should adopt.
        level: LevelConfig,
    },
    /// Freezes the provided program and activates a new run.
    StartRun {
        /// Ordered instruction sequence to execute.
        program: Program,
        /// Simulated time required between successive instruction steps.
        step_delay: Duration,
    },
    /// Advances the active run's clock by the provided delta time.
    Tick {
        /// Epoch token identifying the run the tick is meant for.
        run: RunId,
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Reinitializes the robot for the current level, aborting any run.
    Reset,
}

/// Events broadcast by the session after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that the session state was reinitialized wholesale.
    SessionReset,
    /// Confirms that a run was activated with a fresh epoch token.
    RunStarted {
        /// Epoch token allocated to the run.
        run: RunId,
    },
    /// Confirms that the robot advanced one cell along its heading.
    RobotAdvanced {
        /// Run that produced the step.
        run: RunId,
        /// Cell the robot occupied before moving.
        from: CellCoord,
        /// Cell the robot occupies after the move committed.
        to: CellCoord,
    },
    /// Confirms that the robot rotated in place.
    RobotTurned {
        /// Run that produced the step.
        run: RunId,
        /// Heading the robot faces after the turn committed.
        heading: Heading,
    },
    /// Confirms that the robot jumped two cells along its heading.
    RobotJumped {
        /// Run that produced the step.
        run: RunId,
        /// Cell the robot occupied before jumping.
        from: CellCoord,
        /// Intermediate cell cleared by the jump. Never collision-checked.
        over: CellCoord,
        /// Cell the robot occupies after the landing committed.
        to: CellCoord,
    },
    /// Reports that a step was rejected and the run terminated.
    RobotCrashed {
        /// Run that produced the rejected step.
        run: RunId,
        /// Tentative cell that failed validation. May lie off the grid.
        at: CellCoord,
    },
    /// Reports that the robot reached the target cell.
    GoalReached {
        /// Run that reached the goal.
        run: RunId,
        /// Target cell the robot arrived at.
        at: CellCoord,
    },
    /// Announces that a run terminated and no further steps will execute.
    RunEnded {
        /// Run that terminated.
        run: RunId,
        /// Terminal outcome of the run.
        outcome: RunOutcome,
    },
}

impl Event {
    /// Maps the event to the one-shot tag consumed by the feedback surface.
    ///
    /// Lifecycle events (`SessionReset`, `RunStarted`, `RunEnded`) carry no
    /// tag because they trigger no animation or sound.
    #[must_use]
    pub const fn action_tag(&self) -> Option<ActionTag> {
        match self {
            Self::RobotAdvanced { .. } => Some(ActionTag::Move),
            Self::RobotTurned { .. } => Some(ActionTag::Turn),
            Self::RobotJumped { .. } => Some(ActionTag::Jump),
            Self::RobotCrashed { .. } => Some(ActionTag::Crash),
            Self::GoalReached { .. } => Some(ActionTag::Win),
            Self::SessionReset | Self::RunStarted { .. } | Self::RunEnded { .. } => None,
        }
    }
}

/// Atomic robot instructions available to the authoring surface.
///
/// The vocabulary is fixed: there are no parameters, loops, conditionals,
/// or other composite forms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instruction {
    /// Advance one cell in the current heading.
    MoveForward,
    /// Rotate one quarter turn counter-clockwise.
    TurnLeft,
    /// Rotate one quarter turn clockwise.
    TurnRight,
    /// Advance two cells in the current heading, clearing the cell between.
    Jump,
}

/// Ordered instruction sequence authored by the user.
///
/// Insertion order is execution order. The session clones the program when
/// a run starts, so edits made while a run is in flight never affect it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    /// Creates a program from the provided instruction sequence.
    #[must_use]
    pub fn from_instructions(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// Instructions in execution order.
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of instructions in the program.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Reports whether the program contains no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

impl FromIterator<Instruction> for Program {
    fn from_iter<I: IntoIterator<Item = Instruction>>(iter: I) -> Self {
        Self {
            instructions: iter.into_iter().collect(),
        }
    }
}

/// Cardinal direction the robot currently faces.
///
/// Rows grow downward, matching screen coordinates: `North` decreases the
/// row index and `South` increases it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Heading {
    /// Heading after rotating one quarter turn counter-clockwise.
    #[must_use]
    pub const fn turned_left(self) -> Self {
        match self {
            Self::North => Self::West,
            Self::West => Self::South,
            Self::South => Self::East,
            Self::East => Self::North,
        }
    }

    /// Heading after rotating one quarter turn clockwise.
    #[must_use]
    pub const fn turned_right(self) -> Self {
        match self {
            Self::North => Self::East,
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
        }
    }

    /// Column delta of a single unit step along the heading.
    #[must_use]
    pub const fn column_delta(self) -> i32 {
        match self {
            Self::East => 1,
            Self::West => -1,
            Self::North | Self::South => 0,
        }
    }

    /// Row delta of a single unit step along the heading.
    #[must_use]
    pub const fn row_delta(self) -> i32 {
        match self {
            Self::South => 1,
            Self::North => -1,
            Self::East | Self::West => 0,
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Coordinates are signed so that rejected tentative positions one step
/// beyond the grid edge remain representable in crash reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: i32,
    row: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Coordinate reached by taking `steps` unit steps along `heading`.
    #[must_use]
    pub const fn stepped(self, heading: Heading, steps: i32) -> Self {
        Self {
            column: self.column + heading.column_delta() * steps,
            row: self.row + heading.row_delta() * steps,
        }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Unique epoch token assigned to a run.
///
/// Ticks carry the token of the run they intend to advance; the session
/// ignores ticks whose token does not match the active run, so a driver
/// that survives a reset can never push state into the replacement session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RunId(u64);

impl RunId {
    /// Creates a new run identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// One-shot tag describing the most recent committed action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionTag {
    /// The robot advanced one cell.
    Move,
    /// The robot rotated in place.
    Turn,
    /// The robot jumped two cells.
    Jump,
    /// A step was rejected and the run terminated.
    Crash,
    /// The robot reached the target cell.
    Win,
}

/// Terminal outcome of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunOutcome {
    /// The robot reached the target cell before the program ended.
    GoalReached,
    /// A step was rejected by the boundary or obstacle check.
    Crashed,
    /// The program ran out of instructions without crashing or winning.
    ProgramExhausted,
}

/// Reasons a level configuration may be rejected during construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum LevelError {
    /// The grid must contain at least one cell per axis.
    #[error("grid size must be positive")]
    ZeroGridSize,
    /// The start cell lies outside the grid bounds.
    #[error("start cell {0} lies outside the grid")]
    StartOutOfBounds(CellCoord),
    /// The target cell lies outside the grid bounds.
    #[error("target cell {0} lies outside the grid")]
    TargetOutOfBounds(CellCoord),
    /// The start and target cells must differ.
    #[error("start and target occupy the same cell {0}")]
    StartEqualsTarget(CellCoord),
    /// An obstacle lies outside the grid bounds.
    #[error("obstacle {0} lies outside the grid")]
    ObstacleOutOfBounds(CellCoord),
    /// An obstacle covers the start cell.
    #[error("obstacle {0} covers the start cell")]
    ObstacleOnStart(CellCoord),
    /// An obstacle covers the target cell.
    #[error("obstacle {0} covers the target cell")]
    ObstacleOnTarget(CellCoord),
    /// The same obstacle cell was listed more than once.
    #[error("obstacle {0} listed more than once")]
    DuplicateObstacle(CellCoord),
}

/// Immutable level configuration consumed by the session.
///
/// Construction validates every invariant the interpreter and the
/// reachability checker rely on, so holders of a `LevelConfig` never need
/// to re-check its shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    grid_size: i32,
    start: CellCoord,
    heading: Heading,
    target: CellCoord,
    obstacles: Vec<CellCoord>,
}

impl LevelConfig {
    /// Creates a validated level configuration.
    pub fn new(
        grid_size: i32,
        start: CellCoord,
        heading: Heading,
        target: CellCoord,
        obstacles: Vec<CellCoord>,
    ) -> Result<Self, LevelError> {
        if grid_size <= 0 {
            return Err(LevelError::ZeroGridSize);
        }
        if !in_bounds(start, grid_size) {
            return Err(LevelError::StartOutOfBounds(start));
        }
        if !in_bounds(target, grid_size) {
            return Err(LevelError::TargetOutOfBounds(target));
        }
        if start == target {
            return Err(LevelError::StartEqualsTarget(start));
        }
        for (index, &obstacle) in obstacles.iter().enumerate() {
            if !in_bounds(obstacle, grid_size) {
                return Err(LevelError::ObstacleOutOfBounds(obstacle));
            }
            if obstacle == start {
                return Err(LevelError::ObstacleOnStart(obstacle));
            }
            if obstacle == target {
                return Err(LevelError::ObstacleOnTarget(obstacle));
            }
            if obstacles[..index].contains(&obstacle) {
                return Err(LevelError::DuplicateObstacle(obstacle));
            }
        }

        Ok(Self {
            grid_size,
            start,
            heading,
            target,
            obstacles,
        })
    }

    /// Fixed known-good level used at session start and as the generator
    /// fallback: a 5x5 grid crossed from the bottom-left to the top-right.
    #[must_use]
    pub fn starter() -> Self {
        Self {
            grid_size: 5,
            start: CellCoord::new(0, 4),
            heading: Heading::East,
            target: CellCoord::new(4, 0),
            obstacles: vec![
                CellCoord::new(1, 3),
                CellCoord::new(1, 4),
                CellCoord::new(3, 1),
                CellCoord::new(3, 2),
            ],
        }
    }

    /// Side length of the square grid measured in cells.
    #[must_use]
    pub const fn grid_size(&self) -> i32 {
        self.grid_size
    }

    /// Cell the robot occupies when the level begins.
    #[must_use]
    pub const fn start(&self) -> CellCoord {
        self.start
    }

    /// Heading the robot faces when the level begins.
    #[must_use]
    pub const fn heading(&self) -> Heading {
        self.heading
    }

    /// Cell the robot must reach to complete the level.
    #[must_use]
    pub const fn target(&self) -> CellCoord {
        self.target
    }

    /// Obstacle cells, each distinct and disjoint from start and target.
    #[must_use]
    pub fn obstacles(&self) -> &[CellCoord] {
        &self.obstacles
    }

    /// Reports whether the cell lies within the grid bounds.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        in_bounds(cell, self.grid_size)
    }

    /// Reports whether the cell is covered by an obstacle.
    #[must_use]
    pub fn is_obstacle(&self, cell: CellCoord) -> bool {
        self.obstacles.contains(&cell)
    }
}

const fn in_bounds(cell: CellCoord, grid_size: i32) -> bool {
    cell.column() >= 0 && cell.column() < grid_size && cell.row() >= 0 && cell.row() < grid_size
}

/// Immutable copy of the simulation state published to observers.
///
/// A snapshot is captured after every committed step, so observers never
/// see a tentative or partially applied state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    /// Cell the robot currently occupies.
    pub position: CellCoord,
    /// Heading the robot currently faces.
    pub heading: Heading,
    /// Previously occupied cells in visit order. Display only; duplicates
    /// are allowed and the interpreter never consults it.
    pub trail: Vec<CellCoord>,
    /// True exactly once the target cell has been reached.
    pub complete: bool,
    /// True exactly once a step has been rejected.
    pub failed: bool,
    /// Human-readable event lines in append order.
    pub log: Vec<String>,
    /// Tag of the most recent committed action, or `None` when idle or
    /// after a clean program exhaustion.
    pub last_action: Option<ActionTag>,
}

#[cfg(test)]
mod tests {
    use super::{
        ActionTag, CellCoord, Heading, Instruction, LevelConfig, LevelError, Program, RunId,
        RunOutcome,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn left_turns_cycle_through_all_headings() {
        let mut heading = Heading::North;
        let mut seen = Vec::new();
        for _ in 0..4 {
            heading = heading.turned_left();
            seen.push(heading);
        }
        assert_eq!(
            seen,
            vec![Heading::West, Heading::South, Heading::East, Heading::North]
        );
    }

    #[test]
    fn four_right_turns_return_to_origin() {
        let mut heading = Heading::North;
        for _ in 0..4 {
            heading = heading.turned_right();
        }
        assert_eq!(heading, Heading::North);
    }

    #[test]
    fn left_and_right_turns_are_inverses() {
        for heading in [Heading::North, Heading::East, Heading::South, Heading::West] {
            assert_eq!(heading.turned_left().turned_right(), heading);
            assert_eq!(heading.turned_right().turned_left(), heading);
        }
    }

    #[test]
    fn stepped_follows_screen_coordinates() {
        let origin = CellCoord::new(2, 2);
        assert_eq!(origin.stepped(Heading::North, 1), CellCoord::new(2, 1));
        assert_eq!(origin.stepped(Heading::East, 1), CellCoord::new(3, 2));
        assert_eq!(origin.stepped(Heading::South, 1), CellCoord::new(2, 3));
        assert_eq!(origin.stepped(Heading::West, 1), CellCoord::new(1, 2));
        assert_eq!(origin.stepped(Heading::East, 2), CellCoord::new(4, 2));
    }

    #[test]
    fn stepped_may_leave_the_grid() {
        let corner = CellCoord::new(0, 0);
        assert_eq!(corner.stepped(Heading::West, 1), CellCoord::new(-1, 0));
        assert_eq!(corner.stepped(Heading::North, 2), CellCoord::new(0, -2));
    }

    #[test]
    fn cell_coord_displays_column_then_row() {
        assert_eq!(CellCoord::new(1, 4).to_string(), "(1, 4)");
        assert_eq!(CellCoord::new(-1, 0).to_string(), "(-1, 0)");
    }

    #[test]
    fn starter_level_passes_validation() {
        let starter = LevelConfig::starter();
        let rebuilt = LevelConfig::new(
            starter.grid_size(),
            starter.start(),
            starter.heading(),
            starter.target(),
            starter.obstacles().to_vec(),
        );
        assert_eq!(rebuilt, Ok(starter));
    }

    #[test]
    fn level_rejects_zero_grid() {
        let result = LevelConfig::new(
            0,
            CellCoord::new(0, 0),
            Heading::East,
            CellCoord::new(1, 1),
            Vec::new(),
        );
        assert_eq!(result, Err(LevelError::ZeroGridSize));
    }

    #[test]
    fn level_rejects_matching_start_and_target() {
        let cell = CellCoord::new(2, 2);
        let result = LevelConfig::new(5, cell, Heading::North, cell, Vec::new());
        assert_eq!(result, Err(LevelError::StartEqualsTarget(cell)));
    }

    #[test]
    fn level_rejects_obstacle_on_target() {
        let target = CellCoord::new(4, 0);
        let result = LevelConfig::new(
            5,
            CellCoord::new(0, 4),
            Heading::East,
            target,
            vec![target],
        );
        assert_eq!(result, Err(LevelError::ObstacleOnTarget(target)));
    }

    #[test]
    fn level_rejects_duplicate_obstacles() {
        let obstacle = CellCoord::new(2, 2);
        let result = LevelConfig::new(
            5,
            CellCoord::new(0, 4),
            Heading::East,
            CellCoord::new(4, 0),
            vec![obstacle, obstacle],
        );
        assert_eq!(result, Err(LevelError::DuplicateObstacle(obstacle)));
    }

    #[test]
    fn level_rejects_out_of_bounds_obstacle() {
        let obstacle = CellCoord::new(5, 0);
        let result = LevelConfig::new(
            5,
            CellCoord::new(0, 4),
            Heading::East,
            CellCoord::new(4, 0),
            vec![obstacle],
        );
        assert_eq!(result, Err(LevelError::ObstacleOutOfBounds(obstacle)));
    }

    #[test]
    fn instruction_round_trips_through_bincode() {
        assert_round_trip(&Instruction::MoveForward);
        assert_round_trip(&Instruction::Jump);
    }

    #[test]
    fn program_round_trips_through_bincode() {
        let program: Program = vec![
            Instruction::MoveForward,
            Instruction::TurnLeft,
            Instruction::Jump,
        ]
        .into_iter()
        .collect();
        assert_round_trip(&program);
    }

    #[test]
    fn level_config_round_trips_through_bincode() {
        assert_round_trip(&LevelConfig::starter());
    }

    #[test]
    fn run_id_round_trips_through_bincode() {
        assert_round_trip(&RunId::new(7));
    }

    #[test]
    fn run_outcome_round_trips_through_bincode() {
        assert_round_trip(&RunOutcome::ProgramExhausted);
        assert_round_trip(&RunOutcome::Crashed);
    }

    #[test]
    fn action_tags_cover_every_step_event() {
        use super::Event;

        let run = RunId::new(1);
        let cell = CellCoord::new(0, 0);
        assert_eq!(
            Event::RobotAdvanced {
                run,
                from: cell,
                to: cell.stepped(Heading::East, 1),
            }
            .action_tag(),
            Some(ActionTag::Move)
        );
        assert_eq!(
            Event::RobotCrashed { run, at: cell }.action_tag(),
            Some(ActionTag::Crash)
        );
        assert_eq!(Event::SessionReset.action_tag(), None);
        assert_eq!(
            Event::RunEnded {
                run,
                outcome: RunOutcome::GoalReached,
            }
            .action_tag(),
            None
        );
    }
}
