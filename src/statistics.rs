use std::fmt;

/// Aggregate counters for one simulation run, finalized when the driving
/// loop ends.
#[derive(Debug, Clone)]
pub struct Statistics {
    pub num_barriers: usize,
    pub num_tasks: usize,
    pub total_ticks: usize,
    pub total_moves: usize,
    pub tasks_completed: usize,
    pub tasks_unreachable: usize,
    pub average_cost_per_task: f64,
}

impl Statistics {
    pub fn new(num_barriers: usize, num_tasks: usize) -> Self {
        Statistics {
            num_barriers,
            num_tasks,
            total_ticks: 0,
            total_moves: 0,
            tasks_completed: 0,
            tasks_unreachable: 0,
            average_cost_per_task: 0.0,
        }
    }

    /// Average moves per collected task. A run with no completions reports
    /// 0.0 rather than dividing by zero.
    pub fn calculate_average_cost(&mut self) {
        if self.tasks_completed > 0 {
            self.average_cost_per_task = self.total_moves as f64 / self.tasks_completed as f64;
        } else {
            self.average_cost_per_task = 0.0;
        }
    }

    /// Collected tasks as a percentage of the tasks placed.
    pub fn completion_rate(&self) -> f64 {
        if self.num_tasks > 0 {
            (self.tasks_completed as f64 / self.num_tasks as f64) * 100.0
        } else {
            100.0
        }
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Tasks Completed: {}/{} ({:.1}%)",
            self.tasks_completed,
            self.num_tasks,
            self.completion_rate()
        )?;
        writeln!(f, "Total Moves: {}", self.total_moves)?;
        writeln!(f, "Total Ticks: {}", self.total_ticks)?;
        writeln!(f, "Number of Barriers: {}", self.num_barriers)?;
        writeln!(f, "Average Cost per Task: {:.2}", self.average_cost_per_task)?;

        if self.tasks_unreachable > 0 {
            writeln!(
                f,
                "Unreachable Tasks: {} (no open route from the agent)",
                self.tasks_unreachable
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_cost_divides_moves_by_completions() {
        let mut stats = Statistics::new(10, 4);
        stats.total_moves = 18;
        stats.tasks_completed = 4;

        stats.calculate_average_cost();

        assert!((stats.average_cost_per_task - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn average_cost_is_zero_without_completions() {
        let mut stats = Statistics::new(10, 4);
        stats.total_moves = 7;
        stats.tasks_completed = 0;

        stats.calculate_average_cost();

        assert_eq!(stats.average_cost_per_task, 0.0);
    }

    #[test]
    fn completion_rate_handles_empty_runs() {
        let mut stats = Statistics::new(0, 0);
        assert_eq!(stats.completion_rate(), 100.0);

        stats.num_tasks = 8;
        stats.tasks_completed = 6;
        assert!((stats.completion_rate() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn display_reports_unreachable_tasks_only_when_present() {
        let mut stats = Statistics::new(5, 3);
        stats.tasks_completed = 3;
        assert!(!format!("{}", stats).contains("Unreachable"));

        stats.tasks_unreachable = 1;
        assert!(format!("{}", stats).contains("Unreachable Tasks: 1"));
    }
}
