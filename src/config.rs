use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    #[arg(long, default_value_t = 20)]
    pub grid_size: usize,

    #[arg(long, default_value_t = 50)]
    pub num_barriers: usize,

    #[arg(long, default_value_t = 10)]
    pub num_tasks: usize,

    /// Seed for reproducible environment generation.
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value_t = 50)]
    pub delay_ms: u64,

    #[arg(long, default_value_t = false)]
    pub no_visualization: bool,

    #[arg(long, default_value_t = false)]
    pub quiet: bool,

    #[arg(long, default_value_t = false)]
    pub batch_mode: bool,

    // Batch sweep bounds, only read when --batch-mode is set.
    #[arg(long, default_value_t = 10)]
    pub min_barriers: usize,

    #[arg(long, default_value_t = 60)]
    pub max_barriers: usize,

    #[arg(long, default_value_t = 1)]
    pub min_tasks: usize,

    #[arg(long, default_value_t = 15)]
    pub max_tasks: usize,

    #[arg(long, default_value_t = 5)]
    pub num_simulations: usize,

    #[arg(long, default_value_t = 300)]
    pub timeout_seconds: u64,

    #[arg(long, default_value = "batch_results.csv")]
    pub output_file: String,
}
