//! Batch simulation and summary statistics over a set of runs.

use serde::Serialize;

use crate::machine::TuringMachine;
use crate::types::{Outcome, Simulation};

/// The outcome of one input, without its trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub input: String,
    pub outcome: Outcome,
    /// IDs recorded after the initial one.
    pub steps: usize,
}

impl RunSummary {
    pub fn new(input: impl Into<String>, simulation: &Simulation) -> Self {
        Self {
            input: input.into(),
            outcome: simulation.outcome,
            steps: simulation.steps(),
        }
    }

    pub fn accepted(&self) -> bool {
        self.outcome.is_accepted()
    }
}

/// Simulates every input on `machine` in order.
pub fn simulate_all(
    machine: &TuringMachine,
    inputs: &[String],
    max_steps: usize,
) -> Vec<(String, Simulation)> {
    inputs
        .iter()
        .map(|input| (input.clone(), machine.simulate(input, max_steps)))
        .collect()
}

/// Aggregate figures over a set of runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
    /// Share of accepted runs, 0 to 100.
    pub accepted_percent: f64,
    pub rejected_percent: f64,
    pub avg_steps_accepted: f64,
    pub avg_steps_rejected: f64,
}

impl Statistics {
    pub fn from_runs(runs: &[RunSummary]) -> Self {
        let total = runs.len();
        let (accepted, rejected): (Vec<&RunSummary>, Vec<&RunSummary>) =
            runs.iter().partition(|run| run.accepted());

        let percent = |count: usize| count as f64 * 100.0 / total.max(1) as f64;
        let average = |group: &[&RunSummary]| {
            group.iter().map(|run| run.steps).sum::<usize>() as f64 / group.len().max(1) as f64
        };

        Self {
            total,
            accepted: accepted.len(),
            rejected: rejected.len(),
            accepted_percent: percent(accepted.len()),
            rejected_percent: percent(rejected.len()),
            avg_steps_accepted: average(&accepted),
            avg_steps_rejected: average(&rejected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str, outcome: Outcome, steps: usize) -> RunSummary {
        RunSummary {
            input: input.to_string(),
            outcome,
            steps,
        }
    }

    #[test]
    fn test_statistics() {
        let stats = Statistics::from_runs(&[
            run("a", Outcome::Accepted, 2),
            run("aa", Outcome::Accepted, 4),
            run("b", Outcome::NoTransition, 1),
            run("bb", Outcome::StepLimit, 10),
        ]);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.accepted, 2);
        assert_eq!(stats.rejected, 2);
        assert_eq!(stats.accepted_percent, 50.0);
        assert_eq!(stats.rejected_percent, 50.0);
        assert_eq!(stats.avg_steps_accepted, 3.0);
        assert_eq!(stats.avg_steps_rejected, 5.5);
    }

    #[test]
    fn test_statistics_of_nothing() {
        let stats = Statistics::from_runs(&[]);

        assert_eq!(stats, Statistics::default());
    }

    #[test]
    fn test_all_accepted_has_zero_rejected_average() {
        let stats = Statistics::from_runs(&[run("", Outcome::Accepted, 1)]);

        assert_eq!(stats.accepted_percent, 100.0);
        assert_eq!(stats.rejected_percent, 0.0);
        assert_eq!(stats.avg_steps_rejected, 0.0);
    }
}
