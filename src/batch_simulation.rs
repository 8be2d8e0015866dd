use crate::config::Config;
use crate::simulation::Simulation;
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::time::{Duration, Instant};

/// One CSV row: the configuration that was run and what came of it.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub simulation_id: usize,
    pub seed: u64,
    pub grid_size: usize,
    pub num_barriers: usize,
    pub num_tasks: usize,
    pub tasks_completed: usize,
    pub tasks_unreachable: usize,
    pub total_moves: usize,
    pub total_ticks: usize,
    pub average_cost_per_task: f64,
    pub average_search_time_ns: u64,
    pub total_searches: usize,
    pub execution_time_ms: u64,
}

/// Running totals kept per task count so the summary survives CSV flushes.
#[derive(Debug, Default, Clone)]
struct TaskCountAggregate {
    runs: usize,
    full_clears: usize,
    total_moves: u64,
    tasks_completed: u64,
    tasks_placed: u64,
}

pub struct BatchSimulation {
    config: Config,
    results: Vec<BatchResult>,
    summary: BTreeMap<usize, TaskCountAggregate>,
    start_time: Instant,
    batch_size: usize,
    total_results_written: usize,
    base_seed: u64,
}

impl BatchSimulation {
    pub fn new(config: Config) -> Self {
        // Every run's seed derives from this one value, so passing --seed
        // reproduces the entire sweep.
        let base_seed = config.seed.unwrap_or_else(|| rand::random::<u64>());

        BatchSimulation {
            config,
            results: Vec::new(),
            summary: BTreeMap::new(),
            start_time: Instant::now(),
            batch_size: 100,
            total_results_written: 0,
            base_seed,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn run(&mut self) -> Result<(), String> {
        if self.config.max_barriers < self.config.min_barriers
            || self.config.max_tasks < self.config.min_tasks
        {
            return Err(
                "sweep bounds are inverted: check --min/--max-barriers and --min/--max-tasks"
                    .to_string(),
            );
        }

        self.initialize_csv_file()?;

        if !self.config.quiet {
            println!("=== BATCH SIMULATION STARTED ===");
            println!("Grid size: {}", self.config.grid_size);
            println!(
                "Barriers range: {} to {}",
                self.config.min_barriers, self.config.max_barriers
            );
            println!(
                "Tasks range: {} to {}",
                self.config.min_tasks, self.config.max_tasks
            );
            println!(
                "Simulations per configuration: {}",
                self.config.num_simulations
            );
            println!("Timeout: {} seconds", self.config.timeout_seconds);
            println!("Base seed: {}", self.base_seed);
            println!("Output file: {}", self.config.output_file);
            println!();
        }

        let total_configurations = self.count_total_configurations();
        let total_simulations = total_configurations * self.config.num_simulations;

        if !self.config.quiet {
            println!("Total configurations to test: {}", total_configurations);
            println!("Total simulations to run: {}", total_simulations);
            println!();
        }

        let mut configuration_count = 0;
        let mut completed_simulations = 0;
        let timeout_duration = Duration::from_secs(self.config.timeout_seconds);

        let mut last_progress_report = Instant::now();
        let progress_interval = Duration::from_secs(10);

        'sweep: for num_barriers in self.config.min_barriers..=self.config.max_barriers {
            for num_tasks in self.config.min_tasks..=self.config.max_tasks {
                configuration_count += 1;

                if self.start_time.elapsed() > timeout_duration {
                    println!(
                        "Timeout reached after {} configurations",
                        configuration_count - 1
                    );
                    break 'sweep;
                }

                if !self.config.quiet {
                    println!(
                        "Configuration {}/{}: {} barriers, {} tasks",
                        configuration_count, total_configurations, num_barriers, num_tasks
                    );
                }

                completed_simulations += self.run_configuration(num_barriers, num_tasks)?;

                if self.results.len() >= self.batch_size {
                    self.flush_results_to_csv()?;
                }

                // Progress heartbeat, shown even in quiet mode: long sweeps
                // should not look hung.
                if last_progress_report.elapsed() > progress_interval {
                    let progress = (completed_simulations as f64 / total_simulations as f64) * 100.0;
                    let elapsed = self.start_time.elapsed();
                    let estimated_total = if completed_simulations > 0 {
                        elapsed.mul_f64(total_simulations as f64 / completed_simulations as f64)
                    } else {
                        Duration::from_secs(0)
                    };
                    let remaining = estimated_total.saturating_sub(elapsed);

                    println!(
                        "Progress: {:.1}% ({}/{}) - Elapsed: {:.1}s - ETA: {:.1}s - Rows written: {}",
                        progress,
                        completed_simulations,
                        total_simulations,
                        elapsed.as_secs_f64(),
                        remaining.as_secs_f64(),
                        self.total_results_written
                    );
                    last_progress_report = Instant::now();
                }
            }
        }

        self.flush_results_to_csv()?;

        if !self.config.quiet {
            println!("\n=== BATCH SIMULATION COMPLETED ===");
            println!("Total results collected: {}", self.total_results_written);
            println!("Results saved to: {}", self.config.output_file);
            println!("Total time: {:.2?}", self.start_time.elapsed());
        } else {
            println!(
                "Batch simulation completed: {} results in {:.1}s -> {}",
                self.total_results_written,
                self.start_time.elapsed().as_secs_f64(),
                self.config.output_file
            );
        }

        Ok(())
    }

    fn count_total_configurations(&self) -> usize {
        let barrier_settings = (self.config.max_barriers - self.config.min_barriers) + 1;
        let task_settings = (self.config.max_tasks - self.config.min_tasks) + 1;
        barrier_settings * task_settings
    }

    fn run_configuration(&mut self, num_barriers: usize, num_tasks: usize) -> Result<usize, String> {
        let mut run_config = self.config.clone();
        run_config.num_barriers = num_barriers;
        run_config.num_tasks = num_tasks;
        run_config.no_visualization = true;
        run_config.quiet = true;

        let mut completed_count = 0;
        let timeout_duration = Duration::from_secs(self.config.timeout_seconds);

        for simulation_id in 0..self.config.num_simulations {
            if self.start_time.elapsed() > timeout_duration {
                return Ok(completed_count);
            }

            let seed = self.derive_seed(num_barriers, num_tasks, simulation_id);
            run_config.seed = Some(seed);

            let simulation_start = Instant::now();

            let result = match Simulation::new(run_config.clone()) {
                Ok(mut simulation) => {
                    let (stats, timings) = simulation.run();

                    BatchResult {
                        simulation_id,
                        seed,
                        grid_size: self.config.grid_size,
                        num_barriers,
                        num_tasks,
                        tasks_completed: stats.tasks_completed,
                        tasks_unreachable: stats.tasks_unreachable,
                        total_moves: stats.total_moves,
                        total_ticks: stats.total_ticks,
                        average_cost_per_task: stats.average_cost_per_task,
                        average_search_time_ns: timings.average_search_time().as_nanos() as u64,
                        total_searches: timings.total_searches(),
                        execution_time_ms: simulation_start.elapsed().as_millis() as u64,
                    }
                }
                // Typically task placement ran out of free cells. Record the
                // attempt as a zeroed row so the sweep stays rectangular.
                Err(_) => BatchResult {
                    simulation_id,
                    seed,
                    grid_size: self.config.grid_size,
                    num_barriers,
                    num_tasks,
                    tasks_completed: 0,
                    tasks_unreachable: 0,
                    total_moves: 0,
                    total_ticks: 0,
                    average_cost_per_task: 0.0,
                    average_search_time_ns: 0,
                    total_searches: 0,
                    execution_time_ms: simulation_start.elapsed().as_millis() as u64,
                },
            };

            self.push_result(result);
            completed_count += 1;
        }

        Ok(completed_count)
    }

    /// Distinct per run and reproducible given the base seed.
    fn derive_seed(&self, num_barriers: usize, num_tasks: usize, simulation_id: usize) -> u64 {
        let lane =
            ((num_barriers as u64) << 40) ^ ((num_tasks as u64) << 20) ^ (simulation_id as u64);
        self.base_seed ^ lane
    }

    fn push_result(&mut self, result: BatchResult) {
        let aggregate = self.summary.entry(result.num_tasks).or_default();
        aggregate.runs += 1;
        if result.tasks_completed == result.num_tasks {
            aggregate.full_clears += 1;
        }
        aggregate.total_moves += result.total_moves as u64;
        aggregate.tasks_completed += result.tasks_completed as u64;
        aggregate.tasks_placed += result.num_tasks as u64;

        self.results.push(result);
    }

    fn flush_results_to_csv(&mut self) -> Result<(), String> {
        if self.results.is_empty() {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.config.output_file)
            .map_err(|e| format!("Failed to open output file for appending: {}", e))?;

        for result in &self.results {
            writeln!(
                file,
                "{},{},{},{},{},{},{},{},{},{:.6},{},{},{}",
                result.simulation_id,
                result.seed,
                result.grid_size,
                result.num_barriers,
                result.num_tasks,
                result.tasks_completed,
                result.tasks_unreachable,
                result.total_moves,
                result.total_ticks,
                result.average_cost_per_task,
                result.average_search_time_ns,
                result.total_searches,
                result.execution_time_ms
            )
            .map_err(|e| format!("Failed to write data row: {}", e))?;
        }

        self.total_results_written += self.results.len();
        if !self.config.quiet {
            println!(
                "Flushed {} results to CSV (total: {})",
                self.results.len(),
                self.total_results_written
            );
        }
        self.results.clear();
        Ok(())
    }

    fn initialize_csv_file(&self) -> Result<(), String> {
        let mut file = std::fs::File::create(&self.config.output_file)
            .map_err(|e| format!("Failed to create output file: {}", e))?;

        writeln!(file, "simulation_id,seed,grid_size,num_barriers,num_tasks,tasks_completed,tasks_unreachable,total_moves,total_ticks,average_cost_per_task,average_search_time_ns,total_searches,execution_time_ms")
            .map_err(|e| format!("Failed to write header: {}", e))?;

        if !self.config.quiet {
            println!("Initialized CSV file: {}", self.config.output_file);
        }
        Ok(())
    }

    pub fn print_summary(&self) {
        if self.summary.is_empty() {
            println!("No results to summarize.");
            return;
        }

        println!("\n=== BATCH SIMULATION SUMMARY ===");
        let total_runs: usize = self.summary.values().map(|a| a.runs).sum();
        println!("Total runs: {}", total_runs);

        for (num_tasks, aggregate) in &self.summary {
            let clear_rate = (aggregate.full_clears as f64 / aggregate.runs as f64) * 100.0;
            let avg_moves = aggregate.total_moves as f64 / aggregate.runs as f64;
            let collected_rate = if aggregate.tasks_placed > 0 {
                (aggregate.tasks_completed as f64 / aggregate.tasks_placed as f64) * 100.0
            } else {
                100.0
            };

            println!(
                "  {} tasks: {} runs, full clears {:.1}%, avg moves {:.1}, tasks collected {:.1}%",
                num_tasks, aggregate.runs, clear_rate, avg_moves, collected_rate
            );
        }
    }
}
