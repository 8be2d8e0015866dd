use crate::config::Config;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

/// Identifier carried by a task cell. Generation assigns ids in placement
/// order starting at 1.
pub type TaskId = u32;

/// The cell the agent occupies at startup (top-left corner). Generation never
/// places a barrier or a task here.
pub const AGENT_START: Position = Position { x: 0, y: 0 };

/// The world the agent moves through: grid bounds, barrier cells, and the
/// positions of uncollected tasks.
///
/// Task locations live in a `BTreeMap` so every scan over them runs in
/// Position order (x, then y). The nearest-task tie-break is "first seen
/// wins", which only means something if the scan order is fixed.
#[derive(Debug, Clone)]
pub struct Environment {
    pub width: usize,
    pub height: usize,
    barriers: FxHashSet<Position>,
    task_locations: BTreeMap<Position, TaskId>,
}

impl Environment {
    /// Creates an empty environment: no barriers, no tasks.
    pub fn new(width: usize, height: usize) -> Self {
        Environment {
            width,
            height,
            barriers: FxHashSet::default(),
            task_locations: BTreeMap::new(),
        }
    }

    /// Generates a random environment from the configuration.
    ///
    /// Barriers and tasks land on distinct random cells, never on the agent
    /// start. Placement is attempt-bounded, so a crowded grid may end up with
    /// fewer barriers than requested; tasks are stricter and a shortfall is
    /// an error, since a run without its tasks measures nothing.
    pub fn generate(config: &Config, seed: Option<u64>) -> Result<Self, String> {
        if config.grid_size == 0 {
            return Err("grid size must be at least 1".to_string());
        }

        let mut rng = match seed {
            Some(seed) => rand::rngs::StdRng::seed_from_u64(seed),
            None => rand::rngs::StdRng::from_entropy(),
        };

        let mut environment = Environment::new(config.grid_size, config.grid_size);

        let mut barriers_placed = 0;
        let mut attempts = 0;
        while barriers_placed < config.num_barriers && attempts < config.num_barriers * 3 {
            let position = Position {
                x: rng.gen_range(0..config.grid_size),
                y: rng.gen_range(0..config.grid_size),
            };

            if position != AGENT_START && !environment.barriers.contains(&position) {
                environment.add_barrier(position);
                barriers_placed += 1;
            }
            attempts += 1;
        }

        let mut tasks_placed: usize = 0;
        let mut attempts = 0;
        while tasks_placed < config.num_tasks && attempts < config.num_tasks * 10 {
            let position = Position {
                x: rng.gen_range(0..config.grid_size),
                y: rng.gen_range(0..config.grid_size),
            };

            if position != AGENT_START
                && !environment.barriers.contains(&position)
                && !environment.task_locations.contains_key(&position)
            {
                tasks_placed += 1;
                environment.place_task(position, tasks_placed as TaskId);
            }
            attempts += 1;
        }

        if tasks_placed < config.num_tasks {
            return Err(format!(
                "placed only {} of {} tasks on a {}x{} grid - reduce --num-tasks or --num-barriers",
                tasks_placed, config.num_tasks, config.grid_size, config.grid_size
            ));
        }

        Ok(environment)
    }

    /// True when (x, y) names a cell of this grid. Takes signed coordinates
    /// so callers can probe one step off a zero edge.
    pub fn is_within_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// True when (x, y) is a barrier cell. Out-of-bounds coordinates are not
    /// barriers; bounds are a separate check.
    pub fn is_barrier(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        self.barriers.contains(&Position {
            x: x as usize,
            y: y as usize,
        })
    }

    pub fn add_barrier(&mut self, position: Position) {
        self.barriers.insert(position);
    }

    pub fn barrier_count(&self) -> usize {
        self.barriers.len()
    }

    pub fn place_task(&mut self, position: Position, task_id: TaskId) {
        self.task_locations.insert(position, task_id);
    }

    pub fn task_at(&self, position: Position) -> Option<TaskId> {
        self.task_locations.get(&position).copied()
    }

    /// Positions of the uncollected tasks, in ascending Position order.
    pub fn task_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.task_locations.keys().copied()
    }

    pub fn remaining_tasks(&self) -> usize {
        self.task_locations.len()
    }

    /// Removes and returns the task at `position`, if one is there. This is
    /// the single take-or-nothing primitive the completion check relies on:
    /// two callers can never both receive the same task id.
    pub fn remove_task(&mut self, position: Position) -> Option<TaskId> {
        self.task_locations.remove(&position)
    }

    /// Print a visual representation of the grid.
    pub fn print_grid(&self, agent: Option<Position>) {
        println!("Legend: A=Agent, #=Barrier, T=Task, .=Empty");

        // Print column numbers header
        print!("   ");
        for x in 0..self.width {
            print!("{:2}", x % 10);
        }
        println!();

        for y in 0..self.height {
            // Print row number
            print!("{:2} ", y);

            for x in 0..self.width {
                let position = Position { x, y };
                let glyph = if Some(position) == agent {
                    'A'
                } else if self.barriers.contains(&position) {
                    '#'
                } else if self.task_locations.contains_key(&position) {
                    'T'
                } else {
                    '.'
                };
                print!("{} ", glyph);
            }
            println!();
        }
        println!();
    }
}
