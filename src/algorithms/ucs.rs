use crate::environment::{Environment, Position};
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A pending cell in the uniform-cost search frontier.
///
/// `seq` is a running insertion counter: equal-cost entries pop in the order
/// they were enqueued, so the search settles cells breadth-first and an
/// equal-length winner is reproducible run to run.
#[derive(Clone, Copy, PartialEq, Eq)]
struct FrontierEntry {
    cost: u32,
    seq: u64,
    position: Position,
    parent: Option<Position>,
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed comparison to make BinaryHeap a min-heap
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Finds a shortest path between two cells using uniform-cost search.
///
/// Every traversable edge costs 1, so this is breadth-first search with cost
/// bookkeeping. A cell is marked visited when it is *popped*, not when it is
/// enqueued; the frontier may briefly hold several entries for one cell and
/// the stale ones are skipped lazily. Predecessors are committed to a parent
/// map on pop, and the returned path is rebuilt from that map, so frontier
/// entries stay constant-sized no matter how long the route gets.
///
/// # Arguments
///
/// * `environment` - Supplies the bounds and barrier queries.
/// * `start` - The cell the path begins at.
/// * `goal` - The cell the path must reach.
///
/// # Returns
///
/// The full path including both endpoints, `Some(vec![start])` when
/// `start == goal`, or `None` when the frontier exhausts without reaching
/// `goal`. No path is an expected outcome, not a fault.
pub fn find_path(environment: &Environment, start: Position, goal: Position) -> Option<Vec<Position>> {
    let mut frontier = BinaryHeap::new();
    let mut visited: FxHashSet<Position> = FxHashSet::default();
    let mut came_from: FxHashMap<Position, Position> = FxHashMap::default();
    let mut seq: u64 = 0;

    frontier.push(FrontierEntry {
        cost: 0,
        seq,
        position: start,
        parent: None,
    });

    while let Some(entry) = frontier.pop() {
        if !visited.insert(entry.position) {
            // A cheaper or earlier entry already settled this cell.
            continue;
        }
        if let Some(parent) = entry.parent {
            came_from.insert(entry.position, parent);
        }

        if entry.position == goal {
            return Some(reconstruct(&came_from, start, goal));
        }

        for neighbor in walkable_neighbors(environment, entry.position) {
            if !visited.contains(&neighbor) {
                seq += 1;
                frontier.push(FrontierEntry {
                    cost: entry.cost + 1,
                    seq,
                    position: neighbor,
                    parent: Some(entry.position),
                });
            }
        }
    }

    None
}

/// Walks the parent map back from `goal` and reverses the chain. The start
/// cell is the one position without a parent entry.
fn reconstruct(came_from: &FxHashMap<Position, Position>, start: Position, goal: Position) -> Vec<Position> {
    let mut path = Vec::new();
    let mut current = Some(goal);
    while let Some(position) = current {
        path.push(position);
        current = if position == start {
            None
        } else {
            came_from.get(&position).copied()
        };
    }
    path.reverse();
    path
}

/// The in-bounds, non-barrier orthogonal neighbors of a cell.
///
/// Probe order is up, down, left, right. Any order finds a shortest path
/// under uniform cost, but the order decides which of several equal-length
/// paths comes back, so it is fixed here rather than left to chance.
pub fn walkable_neighbors(environment: &Environment, position: Position) -> Vec<Position> {
    let (x, y) = (position.x as i64, position.y as i64);
    let mut neighbors = Vec::with_capacity(4);

    for (dx, dy) in [(0, -1), (0, 1), (-1, 0), (1, 0)] {
        let (nx, ny) = (x + dx, y + dy);
        if environment.is_within_bounds(nx, ny) && !environment.is_barrier(nx, ny) {
            neighbors.push(Position {
                x: nx as usize,
                y: ny as usize,
            });
        }
    }
    neighbors
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathfinding::prelude::bfs;
    use rand::{Rng, SeedableRng};

    fn open_grid(width: usize, height: usize) -> Environment {
        Environment::new(width, height)
    }

    /// Independent shortest-path length from the `pathfinding` crate's BFS,
    /// used as the oracle the hand-rolled search is checked against.
    fn oracle_length(environment: &Environment, start: Position, goal: Position) -> Option<usize> {
        bfs(
            &start,
            |p| walkable_neighbors(environment, *p),
            |p| *p == goal,
        )
        .map(|path| path.len())
    }

    fn assert_valid_path(environment: &Environment, path: &[Position], start: Position, goal: Position) {
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        for cell in path {
            assert!(environment.is_within_bounds(cell.x as i64, cell.y as i64));
            assert!(!environment.is_barrier(cell.x as i64, cell.y as i64));
        }
        for pair in path.windows(2) {
            let dx = pair[0].x.abs_diff(pair[1].x);
            let dy = pair[0].y.abs_diff(pair[1].y);
            assert_eq!(dx + dy, 1, "steps must be orthogonally adjacent");
        }
    }

    #[test]
    fn straight_line_on_open_grid() {
        let environment = open_grid(5, 5);
        let start = Position { x: 0, y: 0 };
        let goal = Position { x: 0, y: 2 };

        let path = find_path(&environment, start, goal).unwrap();
        assert_eq!(
            path,
            vec![start, Position { x: 0, y: 1 }, goal],
            "two cells down the left edge"
        );
    }

    #[test]
    fn equal_length_tie_follows_probe_order() {
        let environment = open_grid(3, 3);
        let start = Position { x: 0, y: 0 };
        let goal = Position { x: 1, y: 1 };

        // Down precedes right in the probe order, so the down-first corner
        // of the two equal L-shaped routes wins.
        let path = find_path(&environment, start, goal).unwrap();
        assert_eq!(path, vec![start, Position { x: 0, y: 1 }, goal]);
        assert_eq!(find_path(&environment, start, goal).unwrap(), path);
    }

    #[test]
    fn routes_around_a_barrier_wall() {
        // Wall across x=2 with a gap at y=4.
        let mut environment = open_grid(5, 5);
        for y in 0..4 {
            environment.add_barrier(Position { x: 2, y });
        }
        let start = Position { x: 0, y: 0 };
        let goal = Position { x: 4, y: 0 };

        let path = find_path(&environment, start, goal).unwrap();
        assert_valid_path(&environment, &path, start, goal);
        assert_eq!(Some(path.len()), oracle_length(&environment, start, goal));
        // 4 right + down/up detour through the gap: 4 + 2*4 moves.
        assert_eq!(path.len(), 13);
    }

    #[test]
    fn enclosed_goal_has_no_path() {
        let mut environment = open_grid(5, 5);
        let goal = Position { x: 3, y: 3 };
        for (x, y) in [(2, 3), (4, 3), (3, 2), (3, 4)] {
            environment.add_barrier(Position { x, y });
        }

        assert_eq!(find_path(&environment, Position { x: 0, y: 0 }, goal), None);
        assert_eq!(oracle_length(&environment, Position { x: 0, y: 0 }, goal), None);
    }

    #[test]
    fn degenerate_path_is_the_single_start_cell() {
        let environment = open_grid(4, 4);
        let p = Position { x: 2, y: 1 };
        assert_eq!(find_path(&environment, p, p), Some(vec![p]));
    }

    #[test]
    fn matches_oracle_on_random_barrier_grids() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(1234);

        for _ in 0..8 {
            let mut environment = open_grid(9, 9);
            for _ in 0..20 {
                let position = Position {
                    x: rng.gen_range(0..9),
                    y: rng.gen_range(0..9),
                };
                if position != (Position { x: 0, y: 0 }) && position != (Position { x: 8, y: 8 }) {
                    environment.add_barrier(position);
                }
            }
            let start = Position { x: 0, y: 0 };
            let goal = Position { x: 8, y: 8 };

            let ours = find_path(&environment, start, goal);
            let oracle = oracle_length(&environment, start, goal);
            match (ours, oracle) {
                (Some(path), Some(length)) => {
                    assert_valid_path(&environment, &path, start, goal);
                    assert_eq!(path.len(), length);
                }
                (None, None) => {}
                (ours, oracle) => panic!(
                    "reachability disagrees with oracle: ours={:?} oracle={:?}",
                    ours.map(|p| p.len()),
                    oracle
                ),
            }
        }
    }

    #[test]
    fn neighbor_enumeration_respects_bounds_and_barriers() {
        let mut environment = open_grid(3, 3);
        environment.add_barrier(Position { x: 1, y: 0 });

        // Corner cell: up and left fall off the grid, right is a barrier.
        let neighbors = walkable_neighbors(&environment, Position { x: 0, y: 0 });
        assert_eq!(neighbors, vec![Position { x: 0, y: 1 }]);

        // Center cell keeps the documented up, down, left, right order.
        let neighbors = walkable_neighbors(&environment, Position { x: 1, y: 1 });
        assert_eq!(
            neighbors,
            vec![
                Position { x: 1, y: 2 },
                Position { x: 0, y: 1 },
                Position { x: 2, y: 1 },
            ]
        );
    }
}
