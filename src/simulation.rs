use crate::agent::Agent;
use crate::config::Config;
use crate::environment::{Environment, Position, AGENT_START};
use crate::statistics::Statistics;
use std::thread;
use std::time::{Duration, Instant};

/// Owns the environment and the agent and drives the tick loop: search when
/// idle, advance when moving, stop when every task is collected or nothing
/// reachable remains.
pub struct Simulation {
    pub environment: Environment,
    pub agent: Agent,
    config: Config,
}

impl Simulation {
    pub fn new(config: Config) -> Result<Self, String> {
        let environment = Environment::generate(&config, config.seed)?;

        if !config.quiet {
            println!(
                "Generated environment - Grid: {}x{}, Barriers: {}, Tasks: {}",
                environment.width,
                environment.height,
                environment.barrier_count(),
                environment.remaining_tasks()
            );
        }

        Ok(Self::with_environment(config, environment, AGENT_START))
    }

    /// Builds a simulation around a prepared environment. Used by tests and
    /// by callers that lay out the grid themselves.
    pub fn with_environment(config: Config, environment: Environment, start: Position) -> Self {
        let agent = Agent::new(start);
        Simulation {
            environment,
            agent,
            config,
        }
    }

    pub fn run(&mut self) -> (Statistics, SearchTimings) {
        let initial_tasks = self.environment.remaining_tasks();
        let mut stats = Statistics::new(self.environment.barrier_count(), initial_tasks);
        let mut timings = SearchTimings::new();

        // Generous bound; a healthy run finishes far below it.
        let max_ticks =
            self.environment.width * self.environment.height * initial_tasks.max(1) * 4;

        if !self.config.no_visualization {
            self.clear_screen();
            println!("=== TASK COLLECTION SIMULATION ===");
            println!("Tick: 0 | Moves: 0 | Collected: 0/{}", initial_tasks);
            self.environment.print_grid(Some(self.agent.position));
            thread::sleep(Duration::from_millis(self.config.delay_ms));
        }

        while stats.total_ticks < max_ticks {
            if self.environment.remaining_tasks() == 0 {
                break;
            }

            if !self.agent.is_moving() {
                let search_start = Instant::now();
                self.agent.find_nearest_task(&self.environment);
                timings.search_times.push(search_start.elapsed());

                if !self.agent.is_moving() {
                    // Nothing reachable: idle is the steady state from here,
                    // so end the run and report what is left over.
                    stats.tasks_unreachable = self.environment.remaining_tasks();
                    break;
                }
            }

            self.agent.advance(&mut self.environment);
            stats.total_ticks += 1;

            if !self.config.no_visualization {
                self.print_tick(&stats, initial_tasks);
            }
        }

        if stats.total_ticks >= max_ticks && self.environment.remaining_tasks() > 0 {
            println!(
                "Tick limit {} reached with {} tasks outstanding",
                max_ticks,
                self.environment.remaining_tasks()
            );
        }

        stats.total_moves = self.agent.total_path_cost;
        stats.tasks_completed = self.agent.tasks_completed;
        stats.calculate_average_cost();

        if !self.config.no_visualization {
            self.clear_screen();
            println!("=== SIMULATION COMPLETE ===");
            if stats.tasks_completed == initial_tasks {
                println!("SUCCESS: All tasks collected!");
            } else {
                println!(
                    "INCOMPLETE: {} of {} tasks collected",
                    stats.tasks_completed, initial_tasks
                );
            }
            println!(
                "Final position: ({}, {})",
                self.agent.position.x, self.agent.position.y
            );
            println!(
                "Total ticks: {} | Total moves: {}",
                stats.total_ticks, stats.total_moves
            );
            println!(
                "Average nearest-task search: {:.2?}",
                timings.average_search_time()
            );
            self.environment.print_grid(Some(self.agent.position));
        }

        (stats, timings)
    }

    fn print_tick(&self, stats: &Statistics, initial_tasks: usize) {
        self.clear_screen();
        println!("=== TASK COLLECTION SIMULATION ===");
        println!(
            "Tick: {} | Moves: {} | Collected: {}/{}",
            stats.total_ticks, self.agent.total_path_cost, self.agent.tasks_completed, initial_tasks
        );
        println!(
            "Agent position: ({}, {})",
            self.agent.position.x, self.agent.position.y
        );
        if let Some(destination) = self.agent.remaining_path().back() {
            println!(
                "Heading to: ({}, {}) | Moves left on path: {}",
                destination.x,
                destination.y,
                self.agent.remaining_path().len()
            );
        }
        self.environment.print_grid(Some(self.agent.position));
        thread::sleep(Duration::from_millis(self.config.delay_ms));
    }

    /// Clear the terminal screen (only used when visualization is enabled)
    fn clear_screen(&self) {
        print!("\x1B[2J\x1B[1;1H");
    }
}

#[derive(Debug, Clone)]
pub struct SearchTimings {
    pub search_times: Vec<Duration>,
}

impl SearchTimings {
    pub fn new() -> Self {
        SearchTimings {
            search_times: Vec::new(),
        }
    }

    pub fn average_search_time(&self) -> Duration {
        if self.search_times.is_empty() {
            Duration::from_nanos(0)
        } else {
            let total: Duration = self.search_times.iter().sum();
            total / self.search_times.len() as u32
        }
    }

    pub fn total_searches(&self) -> usize {
        self.search_times.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn test_config() -> Config {
        Config::parse_from(["task_pathfinding", "--no-visualization", "--quiet"])
    }

    fn at(x: usize, y: usize) -> Position {
        Position { x, y }
    }

    #[test]
    fn collects_every_task_on_an_open_grid() {
        let mut environment = Environment::new(6, 6);
        environment.place_task(at(2, 3), 1);
        environment.place_task(at(5, 5), 2);
        environment.place_task(at(0, 4), 3);
        let mut simulation = Simulation::with_environment(test_config(), environment, at(0, 0));

        let (stats, timings) = simulation.run();

        assert_eq!(stats.tasks_completed, 3);
        assert_eq!(stats.tasks_unreachable, 0);
        assert_eq!(simulation.environment.remaining_tasks(), 0);
        assert_eq!(stats.total_moves, simulation.agent.total_path_cost);
        // Exactly one search per collected task.
        assert_eq!(timings.total_searches(), 3);
    }

    #[test]
    fn reports_walled_off_tasks_as_unreachable() {
        let mut environment = Environment::new(6, 6);
        environment.place_task(at(1, 0), 1);
        environment.place_task(at(4, 4), 2);
        for (x, y) in [(3, 4), (5, 4), (4, 3), (4, 5)] {
            environment.add_barrier(at(x, y));
        }
        let mut simulation = Simulation::with_environment(test_config(), environment, at(0, 0));

        let (stats, _timings) = simulation.run();

        assert_eq!(stats.tasks_completed, 1);
        assert_eq!(stats.tasks_unreachable, 1);
        assert!(!simulation.agent.is_moving());
        assert_eq!(simulation.environment.remaining_tasks(), 1);
    }

    #[test]
    fn zero_tasks_ends_immediately() {
        let environment = Environment::new(4, 4);
        let mut simulation = Simulation::with_environment(test_config(), environment, at(0, 0));

        let (stats, timings) = simulation.run();

        assert_eq!(stats.total_ticks, 0);
        assert_eq!(stats.total_moves, 0);
        assert_eq!(stats.tasks_completed, 0);
        assert_eq!(stats.tasks_unreachable, 0);
        assert_eq!(timings.total_searches(), 0);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let config = Config::parse_from([
            "task_pathfinding",
            "--no-visualization",
            "--quiet",
            "--grid-size",
            "10",
            "--num-barriers",
            "12",
            "--num-tasks",
            "4",
            "--seed",
            "99",
        ]);

        let run_once = |config: Config| -> Result<(usize, usize, usize), String> {
            let mut simulation = Simulation::new(config)?;
            let (stats, _) = simulation.run();
            Ok((stats.total_moves, stats.tasks_completed, stats.total_ticks))
        };

        let first = run_once(config.clone());
        let second = run_once(config);
        assert!(first.is_ok());
        assert_eq!(first, second);
    }
}
