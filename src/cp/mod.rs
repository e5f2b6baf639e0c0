//! Constraint Programming (CP) framework.
//!
//! A small modeling layer for boolean decision problems over fixed-position
//! intervals, plus an exact solver for it.
//!
//! # Key Components
//!
//! - **Variables**: [`BoolVar`], [`IntervalVar`] addressed by [`BoolVarId`]
//!   and [`IntervalId`]
//! - **Constraints**: [`Constraint`] (exactly-one, cumulative, linear)
//! - **Model**: [`CpModel`], the container for variables, constraints, objective
//! - **Solver**: [`CpSolver`] trait and the built-in [`BranchAndBoundSolver`]
//!
//! # Design
//!
//! The model knows nothing about courses or professors. Timetabling concepts
//! are mapped onto it by [`crate::builder`]. Any engine that implements
//! [`CpSolver`] can replace the built-in one, e.g. a wrapper around
//! OR-Tools CP-SAT.
//!
//! # References
//!
//! Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming"

mod model;
mod search;
mod solver;
mod variables;

pub use model::{Constraint, CpModel, Objective};
pub use search::BranchAndBoundSolver;
pub use solver::{CpSolution, CpSolver, SolverConfig, SolverStatus};
pub use variables::{BoolVar, BoolVarId, IntervalId, IntervalVar};
