//! Breadth-first reachability checker over the 4-connected grid graph.

use std::collections::VecDeque;

use robo_blocks_core::{CellCoord, Heading, LevelConfig};

const HEADINGS: [Heading; 4] = [Heading::North, Heading::East, Heading::South, Heading::West];

/// Reports whether an obstacle-free 4-connected path exists from `start`
/// to `target` on a `grid_size` x `grid_size` grid.
///
/// Existence only: no path is produced and no length is measured. Each
/// cell is enqueued at most once, so the search visits every cell no more
/// than once before declaring the target unreachable.
#[must_use]
pub fn is_reachable(
    grid_size: i32,
    start: CellCoord,
    target: CellCoord,
    obstacles: &[CellCoord],
) -> bool {
    let Some(start_index) = index(grid_size, start) else {
        return false;
    };

    let width = grid_size as usize;
    let mut visited = vec![false; width * width];
    visited[start_index] = true;

    let mut queue = VecDeque::new();
    queue.push_back(start);

    while let Some(cell) = queue.pop_front() {
        if cell == target {
            return true;
        }

        for heading in HEADINGS {
            let neighbor = cell.stepped(heading, 1);
            let Some(neighbor_index) = index(grid_size, neighbor) else {
                continue;
            };
            if visited[neighbor_index] {
                continue;
            }
            if obstacles.contains(&neighbor) {
                continue;
            }

            visited[neighbor_index] = true;
            queue.push_back(neighbor);
        }
    }

    false
}

/// Reports whether a validated level's target is reachable from its start.
#[must_use]
pub fn level_is_solvable(level: &LevelConfig) -> bool {
    is_reachable(
        level.grid_size(),
        level.start(),
        level.target(),
        level.obstacles(),
    )
}

fn index(grid_size: i32, cell: CellCoord) -> Option<usize> {
    if cell.column() < 0 || cell.column() >= grid_size || cell.row() < 0 || cell.row() >= grid_size
    {
        return None;
    }

    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    let width = usize::try_from(grid_size).ok()?;
    row.checked_mul(width)?.checked_add(column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_grid_connects_opposite_corners() {
        assert!(is_reachable(
            5,
            CellCoord::new(0, 4),
            CellCoord::new(4, 0),
            &[],
        ));
    }

    #[test]
    fn start_cell_is_trivially_reachable() {
        let cell = CellCoord::new(2, 2);
        assert!(is_reachable(5, cell, cell, &[]));
    }

    #[test]
    fn full_wall_disconnects_the_target() {
        let wall: Vec<CellCoord> = (0..5).map(|row| CellCoord::new(2, row)).collect();
        assert!(!is_reachable(
            5,
            CellCoord::new(0, 4),
            CellCoord::new(4, 0),
            &wall,
        ));
    }

    #[test]
    fn gap_in_the_wall_restores_reachability() {
        let wall: Vec<CellCoord> = (1..5).map(|row| CellCoord::new(2, row)).collect();
        assert!(is_reachable(
            5,
            CellCoord::new(0, 4),
            CellCoord::new(4, 0),
            &wall,
        ));
    }

    #[test]
    fn out_of_bounds_start_is_unreachable() {
        assert!(!is_reachable(
            5,
            CellCoord::new(-1, 0),
            CellCoord::new(4, 0),
            &[],
        ));
    }

    #[test]
    fn starter_level_is_solvable() {
        assert!(level_is_solvable(&LevelConfig::starter()));
    }
}
