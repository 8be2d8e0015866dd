use clap::Parser;

use std::time::Duration;
use task_pathfinding::batch_simulation::BatchSimulation;
use task_pathfinding::config::Config;
use task_pathfinding::simulation::Simulation;

fn main() {
    let config = Config::parse();

    println!("Starting task collection simulation...");
    println!("Grid size: {}x{}", config.grid_size, config.grid_size);
    println!(
        "Barriers: {}, Tasks: {}",
        config.num_barriers, config.num_tasks
    );
    if let Some(seed) = config.seed {
        println!("Seed: {}", seed);
    }

    if config.no_visualization || config.batch_mode {
        println!("Visualization disabled - running in fast mode");
    } else {
        println!("Visualization enabled with {}ms delay", config.delay_ms);
        println!("Press Ctrl+C to stop the simulation");
    }

    if config.quiet {
        println!("Quiet mode enabled - minimal output");
    }

    println!();

    // Small delay before the screen starts clearing (visualization only)
    if !(config.no_visualization || config.batch_mode) {
        std::thread::sleep(Duration::from_millis(1000));
    }

    if config.batch_mode {
        let mut batch_simulation = BatchSimulation::new(config.clone());
        match batch_simulation.run() {
            Ok(()) => {
                if !config.quiet {
                    batch_simulation.print_summary();
                }
            }
            Err(e) => {
                eprintln!("Batch simulation failed: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        match Simulation::new(config.clone()) {
            Ok(mut simulation) => {
                let (stats, timings) = simulation.run();

                println!("\n=== FINAL RESULTS ===");
                println!("{}", stats);

                println!("\n=== TIMING ANALYSIS ===");
                println!("Nearest-task searches: {}", timings.total_searches());
                println!(
                    "Average search time: {:.2?}",
                    timings.average_search_time()
                );
                if timings.total_searches() > 0 {
                    let total_search_time: Duration = timings.search_times.iter().sum();
                    println!("Total time in search: {:.2?}", total_search_time);
                }

                if !config.quiet && !simulation.agent.completed_tasks.is_empty() {
                    println!("\nCollection order:");
                    for record in &simulation.agent.completed_tasks {
                        println!(
                            "  Task {} at cumulative cost {}",
                            record.task_id, record.cost_at_completion
                        );
                    }
                }
            }
            Err(e) => {
                eprintln!("Failed to create simulation: {}", e);
                eprintln!("Try reducing --num-barriers or --num-tasks, or increasing --grid-size");
                std::process::exit(1);
            }
        }
    }
}
