use crate::algorithms::ucs;
use crate::environment::{Environment, Position, TaskId};
use std::collections::VecDeque;

/// Whether the agent is executing a path or waiting for one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    Idle,
    Moving,
}

/// One collected task: its id and the agent's cumulative move count at the
/// moment of collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionRecord {
    pub task_id: TaskId,
    pub cost_at_completion: usize,
}

/// The single mobile agent. It owns its position and pending path; the
/// environment it moves through is owned by the driver and borrowed per
/// call, so task lookups during a search never overlap the completion
/// check's removal.
pub struct Agent {
    pub position: Position,
    path: VecDeque<Position>,
    state: AgentState,
    /// Cells traversed since creation. Monotone, never reset; completion
    /// records snapshot it as the cost of each task.
    pub total_path_cost: usize,
    pub tasks_completed: usize,
    pub completed_tasks: Vec<CompletionRecord>,
}

impl Agent {
    pub fn new(start: Position) -> Self {
        Agent {
            position: start,
            path: VecDeque::new(),
            state: AgentState::Idle,
            total_path_cost: 0,
            tasks_completed: 0,
            completed_tasks: Vec::new(),
        }
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn is_moving(&self) -> bool {
        self.state == AgentState::Moving
    }

    /// The cells still to visit, earliest first. Its front is never the
    /// agent's current position.
    pub fn remaining_path(&self) -> &VecDeque<Position> {
        &self.path
    }

    /// Executes one step of the pending path: pop the front cell, move onto
    /// it, count the move, and collect any task sitting there. Popping the
    /// last cell transitions to Idle. With no path this is a no-op, not an
    /// error - an idle tick is a routine outcome.
    pub fn advance(&mut self, environment: &mut Environment) {
        if let Some(next_position) = self.path.pop_front() {
            self.position = next_position;
            self.total_path_cost += 1;
            self.check_task_completion(environment);
            if self.path.is_empty() {
                self.state = AgentState::Idle;
            }
        } else {
            self.state = AgentState::Idle;
        }
    }

    /// Collects the task under the agent, if any. `remove_task` takes the
    /// entry in one step, so a task id can be handed out at most once; the
    /// recorded cost is the counter *after* the arriving move.
    fn check_task_completion(&mut self, environment: &mut Environment) {
        if let Some(task_id) = environment.remove_task(self.position) {
            self.tasks_completed += 1;
            self.completed_tasks.push(CompletionRecord {
                task_id,
                cost_at_completion: self.total_path_cost,
            });
        }
    }

    /// Searches every uncollected task for the one with the shortest path
    /// from the current position and loads that path for execution.
    ///
    /// The scan runs in the environment's Position order and a candidate
    /// only replaces the incumbent when strictly shorter, so the first task
    /// seen wins length ties deterministically. The loaded path excludes
    /// its first cell (the agent's own position). When no task is reachable
    /// the agent's path and state are left untouched: an agent with nothing
    /// to do stays Idle indefinitely.
    pub fn find_nearest_task(&mut self, environment: &Environment) {
        let mut shortest_path: Option<Vec<Position>> = None;

        for task_position in environment.task_positions() {
            if let Some(path) = ucs::find_path(environment, self.position, task_position) {
                let is_shorter = shortest_path
                    .as_ref()
                    .map_or(true, |incumbent| path.len() < incumbent.len());
                if is_shorter {
                    shortest_path = Some(path);
                }
            }
        }

        if let Some(path) = shortest_path {
            self.path = path.into_iter().skip(1).collect();
            self.state = if self.path.is_empty() {
                AgentState::Idle
            } else {
                AgentState::Moving
            };
        }
    }
}
