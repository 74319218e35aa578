//! Pathfinder - uniform-cost shortest paths over the grid.
//!
//! Dijkstra over the 4-connected grid with unit edge weights. A cell is
//! traversable unless it is a wall, or it holds a box and is not the
//! destination: robots may route *to* a box but never *through* one.
//!
//! Equal-cost frontier entries are ordered by position and neighbours are
//! expanded in [`Direction::ALL`](crate::types::Direction::ALL) order, so the
//! same grid always yields the same path.

use crate::grid::Grid;
use crate::types::Position;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// Ordered cells from the first step to the destination, start excluded.
pub type Path = Vec<Position>;

#[derive(Debug, PartialEq, Eq)]
struct State {
    cost: u32,
    at: Position,
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // min-heap on cost, then position
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.at.cmp(&self.at))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compute a shortest path from `start` to `target`.
///
/// Returns an empty path when either endpoint is out of bounds, when the
/// target is unreachable, or when `start == target`. Callers treat an empty
/// path as "no path".
pub fn compute_shortest_path(grid: &Grid, start: Position, target: Position) -> Path {
    if !grid.in_bounds(start) || !grid.in_bounds(target) {
        tracing::debug!(%start, %target, "path endpoints out of bounds");
        return Vec::new();
    }

    let mut dist: HashMap<Position, u32> = HashMap::new();
    let mut prev: HashMap<Position, Position> = HashMap::new();
    let mut heap = BinaryHeap::new();

    dist.insert(start, 0);
    heap.push(State { cost: 0, at: start });

    while let Some(State { cost, at }) = heap.pop() {
        if at == target {
            break;
        }
        if dist.get(&at).is_some_and(|&best| cost > best) {
            continue;
        }

        for next in at.neighbors() {
            if !grid.is_traversable(next, target) {
                continue;
            }
            let next_cost = cost + 1;
            if dist.get(&next).map_or(true, |&best| next_cost < best) {
                dist.insert(next, next_cost);
                prev.insert(next, at);
                heap.push(State {
                    cost: next_cost,
                    at: next,
                });
            }
        }
    }

    if start == target || !prev.contains_key(&target) {
        if start != target {
            tracing::debug!(%start, %target, "target unreachable");
        }
        return Vec::new();
    }

    let mut path = Vec::new();
    let mut current = target;
    while current != start {
        path.push(current);
        match prev.get(&current) {
            Some(&p) => current = p,
            None => return Vec::new(),
        }
    }
    path.reverse();

    tracing::trace!(%start, %target, steps = path.len(), "path computed");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_contiguous(start: Position, path: &[Position]) {
        let mut at = start;
        for &step in path {
            assert_eq!(at.manhattan(&step), 1, "path jumps from {at} to {step}");
            at = step;
        }
    }

    #[test]
    fn open_grid_path_is_manhattan() {
        let grid = Grid::new(6, 7);
        for (s, t) in [
            (Position::new(0, 0), Position::new(6, 5)),
            (Position::new(3, 2), Position::new(0, 4)),
            (Position::new(5, 5), Position::new(5, 0)),
        ] {
            let path = compute_shortest_path(&grid, s, t);
            assert_eq!(path.len() as u32, s.manhattan(&t));
            assert_eq!(path.last(), Some(&t));
            assert_contiguous(s, &path);
        }
    }

    #[test]
    fn path_may_end_on_a_box_but_never_cross_one() {
        let mut grid = Grid::new(3, 5);
        // A column of boxes at x = 2 except the middle row, which holds the target.
        grid.place_box(2, 0, 1).unwrap();
        grid.place_box(2, 2, 1).unwrap();
        grid.place_box(2, 1, 1).unwrap();
        let target = Position::new(2, 1);

        let path = compute_shortest_path(&grid, Position::new(0, 1), target);
        assert_eq!(path, vec![Position::new(1, 1), target]);

        // Beyond the box wall: the only way round is blocked by boxes.
        let behind = compute_shortest_path(&grid, Position::new(0, 1), Position::new(4, 1));
        assert!(behind.is_empty());
    }

    #[test]
    fn detours_around_mid_path_boxes() {
        let mut grid = Grid::new(3, 3);
        grid.place_box(1, 1, 1).unwrap();
        let start = Position::new(1, 0);
        let target = Position::new(1, 2);
        let path = compute_shortest_path(&grid, start, target);
        assert_eq!(path.len(), 4);
        assert!(!path.contains(&Position::new(1, 1)));
        assert_contiguous(start, &path);
    }

    #[test]
    fn walled_in_target_is_unreachable() {
        let mut grid = Grid::new(5, 5);
        grid.add_wall_range(1, 1, 3, 1);
        grid.add_wall_range(1, 3, 3, 3);
        grid.add_wall_range(1, 2, 1, 2);
        grid.add_wall_range(3, 2, 3, 2);
        let path = compute_shortest_path(&grid, Position::new(0, 0), Position::new(2, 2));
        assert!(path.is_empty());
    }

    #[test]
    fn out_of_bounds_endpoints_yield_no_path() {
        let grid = Grid::new(3, 3);
        assert!(compute_shortest_path(&grid, Position::new(-1, 0), Position::new(1, 1)).is_empty());
        assert!(compute_shortest_path(&grid, Position::new(0, 0), Position::new(3, 1)).is_empty());
    }

    #[test]
    fn start_equal_to_target_is_empty() {
        let grid = Grid::new(3, 3);
        assert!(compute_shortest_path(&grid, Position::new(1, 1), Position::new(1, 1)).is_empty());
    }

    #[test]
    fn repeated_queries_are_identical() {
        let mut grid = Grid::new(8, 8);
        grid.add_wall_range(2, 2, 5, 5);
        grid.place_box(6, 6, 1).unwrap();
        let a = compute_shortest_path(&grid, Position::new(0, 0), Position::new(7, 7));
        let b = compute_shortest_path(&grid, Position::new(0, 0), Position::new(7, 7));
        assert!(!a.is_empty());
        assert_eq!(a, b);
    }
}
