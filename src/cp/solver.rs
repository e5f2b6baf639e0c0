//! CP solver interface.

use super::model::CpModel;
use super::variables::BoolVarId;

/// Status of the solver after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStatus {
    /// Proven optimal solution found.
    Optimal,
    /// Feasible (but not necessarily optimal) solution found.
    Feasible,
    /// No feasible solution exists.
    Infeasible,
    /// Model is invalid or malformed.
    ModelInvalid,
    /// No verdict within the budget.
    Unknown,
}

/// Solution from a CP solver.
#[derive(Debug, Clone)]
pub struct CpSolution {
    /// Solver status.
    pub status: SolverStatus,
    /// Objective function value (if any).
    pub objective_value: Option<i64>,
    /// Boolean variable assignments, indexed by [`BoolVarId`].
    pub values: Vec<bool>,
    /// Solve time in milliseconds.
    pub solve_time_ms: u64,
    /// Search nodes explored.
    pub branches: u64,
}

impl CpSolution {
    /// Creates an empty solution with the given status.
    pub fn empty(status: SolverStatus) -> Self {
        Self {
            status,
            objective_value: None,
            values: Vec::new(),
            solve_time_ms: 0,
            branches: 0,
        }
    }

    /// Whether a feasible solution was found.
    pub fn is_solution_found(&self) -> bool {
        matches!(self.status, SolverStatus::Optimal | SolverStatus::Feasible)
    }

    /// Resolved truth value of `var`; false when no solution was found.
    pub fn value(&self, var: BoolVarId) -> bool {
        self.values.get(var.index()).copied().unwrap_or(false)
    }

    /// Literals assigned true, in arena order.
    pub fn true_literals(&self) -> impl Iterator<Item = BoolVarId> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v)
            .map(|(i, _)| BoolVarId(i))
    }
}

/// Solver configuration.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Maximum solve time in milliseconds.
    pub time_limit_ms: u64,
    /// Number of parallel workers.
    pub num_workers: usize,
    /// Stop after finding the first feasible solution.
    pub stop_after_first: bool,
    /// Seed for tie-breaking among equally weighted choices.
    ///
    /// `None` uses a fixed default seed.
    pub seed: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: 60_000,
            num_workers: 1,
            stop_after_first: false,
            seed: None,
        }
    }
}

impl SolverConfig {
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    pub fn with_num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    pub fn with_stop_after_first(mut self, stop: bool) -> Self {
        self.stop_after_first = stop;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fast preset: short budget, single worker.
    pub fn fast() -> Self {
        Self {
            time_limit_ms: 5_000,
            ..Self::default()
        }
    }

    /// Thorough preset: long budget, all available cores.
    pub fn thorough() -> Self {
        Self {
            time_limit_ms: 300_000,
            num_workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            ..Self::default()
        }
    }

    /// Preset for feasibility probes: first solution, short budget.
    pub fn feasibility_probe() -> Self {
        Self {
            time_limit_ms: 10_000,
            stop_after_first: true,
            ..Self::default()
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.time_limit_ms == 0 {
            return Err("time_limit_ms must be positive".into());
        }
        if self.num_workers == 0 {
            return Err("num_workers must be at least 1".into());
        }
        Ok(())
    }
}

/// Trait for CP solver implementations.
///
/// Implementors provide the actual constraint solving logic. This can
/// wrap external solvers (e.g., OR-Tools CP-SAT) or the built-in
/// [`BranchAndBoundSolver`](super::BranchAndBoundSolver).
///
/// A solver must not retain state between calls: every call sees the
/// model as it is at that moment, including constraints added since the
/// previous call.
pub trait CpSolver {
    /// Solves the model and returns a solution.
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution;
}
