//! Course timetabling as a constraint model.
//!
//! Turns professors' weekly availability and a list of courses into
//! timetables where no professor, cohort, or over-capacity classroom is
//! double-booked:
//!
//! - **Availability**: [`availability`] merges raw windows that touch or
//!   sit within 15 minutes of each other.
//! - **Slots**: [`slots`] expands windows into fixed-length candidate
//!   meetings, filled from both window edges.
//! - **Model building**: [`builder`] maps courses and slots onto a
//!   [`cp::CpModel`] of literals, optional intervals, cumulative and linear
//!   constraints, with an objective counting preferred slots.
//! - **Enumeration**: [`enumerator`] solves repeatedly, excluding each
//!   found timetable, to return several distinct alternatives.
//! - **Orchestration**: [`scheduler`] runs the whole pipeline for a
//!   [`models::SolveRequest`] and renders reports.
//!
//! # Architecture
//!
//! The [`cp`] layer is domain-agnostic and solver-pluggable through
//! [`cp::CpSolver`]; a built-in exact branch-and-bound engine ships with
//! the crate. Everything above it speaks courses, professors and
//! classrooms.

pub mod availability;
pub mod builder;
pub mod config;
pub mod cp;
pub mod enumerator;
pub mod error;
pub mod mock;
pub mod models;
pub mod scheduler;
pub mod slots;
pub mod time;

pub use error::{Result, TimetableError, ValidationError};
