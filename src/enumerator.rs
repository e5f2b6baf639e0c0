//! Solution enumeration.
//!
//! Repeatedly solves a built timetable model. After each success the exact
//! set of chosen literals is excluded with `sum(chosen) <= k - 1`, so the
//! next solve must change at least one course's slot. The objective never
//! changes, which makes reported objectives non-increasing.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::builder::TimetableModel;
use crate::cp::{CpSolver, SolverConfig, SolverStatus};
use crate::models::CourseId;
use crate::slots::TimeSlot;

/// Score attached to every assignment until a real scoring rule exists.
pub const PLACEHOLDER_SCORE: u32 = 50;

/// One course placed in one slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assignment {
    pub course_id: CourseId,
    pub slot: TimeSlot,
    pub score: u32,
}

/// A complete timetable found by one solve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    /// One assignment per course, in input course order.
    pub assignments: Vec<Assignment>,
    /// Number of preferred slots chosen.
    pub objective: i64,
}

impl Solution {
    /// Assignment of course `id`, if present.
    pub fn assignment(&self, id: CourseId) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.course_id == id)
    }
}

/// Why enumeration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// The requested number of solutions was reached.
    Completed,
    /// No further distinct timetable exists.
    Infeasible,
    /// The engine gave no verdict within its budget.
    Unknown,
    /// The engine rejected the model.
    ModelInvalid,
}

/// Statistics of one solve call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationStats {
    pub iteration: usize,
    pub objective: Option<i64>,
    pub solve_time_ms: u64,
    pub branches: u64,
}

/// Result of an enumeration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enumeration {
    pub solutions: Vec<Solution>,
    pub stop_reason: StopReason,
    /// One entry per solve call, including the final unsuccessful one.
    pub iterations: Vec<IterationStats>,
}

/// Enumerates up to `n` distinct timetables.
///
/// # Examples
///
/// ```
/// use u_timetable::builder::{NoCheck, TimetableModelBuilder};
/// use u_timetable::cp::{BranchAndBoundSolver, SolverConfig};
/// use u_timetable::enumerator::{SolutionEnumerator, StopReason};
/// use u_timetable::models::Course;
/// use u_timetable::slots::TimeSlot;
/// use u_timetable::time::{ClockTime, SlotDuration, Weekday};
///
/// let slot = TimeSlot::new(
///     Weekday::Sunday,
///     ClockTime::parse("10:00").unwrap(),
///     ClockTime::parse("11:30").unwrap(),
///     4,
///     false,
/// );
/// let course = Course::new(1, 11, SlotDuration::from_minutes(90).unwrap())
///     .with_slots(vec![slot]);
/// let mut built = TimetableModelBuilder::new(vec![course])
///     .unwrap()
///     .build(&mut NoCheck)
///     .unwrap();
///
/// let solver = BranchAndBoundSolver::new();
/// let result = SolutionEnumerator::new(&solver, SolverConfig::default()).enumerate(&mut built, 3);
/// assert_eq!(result.solutions.len(), 1);
/// assert_eq!(result.stop_reason, StopReason::Infeasible);
/// ```
pub struct SolutionEnumerator<'a, S: CpSolver> {
    solver: &'a S,
    config: SolverConfig,
}

impl<'a, S: CpSolver> SolutionEnumerator<'a, S> {
    pub fn new(solver: &'a S, config: SolverConfig) -> Self {
        Self { solver, config }
    }

    /// Solves, records, excludes, and repeats until `n` solutions or the
    /// engine stops finding new ones.
    ///
    /// Each success adds one exclusion constraint to `built`.
    pub fn enumerate(&self, built: &mut TimetableModel, n: usize) -> Enumeration {
        let mut solutions = Vec::with_capacity(n);
        let mut iterations = Vec::new();
        let mut stop_reason = StopReason::Completed;

        while solutions.len() < n {
            let iteration = iterations.len();
            let result = self.solver.solve(built.model(), &self.config);
            iterations.push(IterationStats {
                iteration,
                objective: result.objective_value,
                solve_time_ms: result.solve_time_ms,
                branches: result.branches,
            });
            debug!(
                iteration,
                status = ?result.status,
                objective = ?result.objective_value,
                solve_time_ms = result.solve_time_ms,
                "solve iteration"
            );

            match result.status {
                SolverStatus::Optimal | SolverStatus::Feasible => {}
                SolverStatus::Infeasible => {
                    stop_reason = StopReason::Infeasible;
                    break;
                }
                SolverStatus::Unknown => {
                    stop_reason = StopReason::Unknown;
                    break;
                }
                SolverStatus::ModelInvalid => {
                    stop_reason = StopReason::ModelInvalid;
                    break;
                }
            }

            let assignments = built
                .decode(&result)
                .into_iter()
                .map(|(course_id, slot)| Assignment {
                    course_id,
                    slot,
                    score: PLACEHOLDER_SCORE,
                })
                .collect();
            let chosen = built.chosen_literals(&result);
            let k = chosen.len() as i64;
            built
                .model_mut()
                .add_linear(chosen.into_iter().map(|l| (l, 1)).collect(), None, Some(k - 1));

            solutions.push(Solution {
                assignments,
                objective: result.objective_value.unwrap_or(0),
            });
        }

        info!(
            requested = n,
            found = solutions.len(),
            ?stop_reason,
            "enumeration finished"
        );
        Enumeration {
            solutions,
            stop_reason,
            iterations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{NoCheck, TimetableModelBuilder};
    use crate::cp::{BranchAndBoundSolver, CpModel, CpSolution};
    use crate::models::{CohortGroup, Course, ProfessorId};
    use crate::time::{ClockTime, SlotDuration, Weekday};
    use std::collections::HashSet;

    fn slot(day: Weekday, start: &str, end: &str, professor: ProfessorId, preferred: bool) -> TimeSlot {
        TimeSlot::new(
            day,
            ClockTime::parse(start).unwrap(),
            ClockTime::parse(end).unwrap(),
            professor,
            preferred,
        )
    }

    fn course(id: CourseId, cohort: CohortGroup, slots: Vec<TimeSlot>) -> Course {
        Course::new(id, cohort, SlotDuration::from_minutes(90).unwrap()).with_slots(slots)
    }

    fn build(courses: Vec<Course>) -> TimetableModel {
        TimetableModelBuilder::new(courses)
            .unwrap()
            .build(&mut NoCheck)
            .unwrap()
    }

    fn enumerate(built: &mut TimetableModel, n: usize) -> Enumeration {
        let solver = BranchAndBoundSolver::new();
        SolutionEnumerator::new(&solver, SolverConfig::default()).enumerate(built, n)
    }

    #[test]
    fn test_single_slot_single_solution() {
        let s = slot(Weekday::Monday, "08:00", "09:30", 1, true);
        let mut built = build(vec![course(1, 11, vec![s])]);
        let result = enumerate(&mut built, 3);

        assert_eq!(result.solutions.len(), 1);
        assert_eq!(result.stop_reason, StopReason::Infeasible);
        assert_eq!(result.iterations.len(), 2);
        let only = &result.solutions[0];
        assert_eq!(only.objective, 1);
        assert_eq!(
            only.assignments,
            vec![Assignment {
                course_id: 1,
                slot: s,
                score: PLACEHOLDER_SCORE,
            }]
        );
    }

    #[test]
    fn test_cohort_pair_takes_both_slots() {
        let a = slot(Weekday::Monday, "08:00", "09:30", 1, false);
        let b = slot(Weekday::Monday, "10:00", "11:30", 2, false);
        let mut built = build(vec![course(1, 11, vec![a, b]), course(2, 11, vec![a, b])]);
        let result = enumerate(&mut built, 5);

        // The two courses swap the two slots.
        assert_eq!(result.solutions.len(), 2);
        assert_eq!(result.stop_reason, StopReason::Infeasible);
        for solution in &result.solutions {
            let first = solution.assignment(1).unwrap().slot;
            let second = solution.assignment(2).unwrap().slot;
            assert_ne!(first, second);
        }
    }

    #[test]
    fn test_cohort_clash_yields_no_solutions() {
        let mut built = build(vec![
            course(1, 23, vec![slot(Weekday::Monday, "08:00", "09:30", 1, false)]),
            course(2, 23, vec![slot(Weekday::Monday, "09:00", "10:30", 2, false)]),
        ]);
        let before = built.model().constraint_count();
        let result = enumerate(&mut built, 3);

        assert!(result.solutions.is_empty());
        assert_eq!(result.stop_reason, StopReason::Infeasible);
        assert_eq!(result.iterations.len(), 1);
        assert_eq!(result.iterations[0].objective, None);
        assert_eq!(built.model().constraint_count(), before);
    }

    #[test]
    fn test_stops_at_requested_count() {
        let slots: Vec<TimeSlot> = ["08:00", "10:00", "12:00", "14:00"]
            .iter()
            .map(|&start| {
                let t = ClockTime::parse(start).unwrap();
                TimeSlot::new(
                    Weekday::Sunday,
                    t,
                    ClockTime::from_minutes(t.minutes() + 90).unwrap(),
                    1,
                    false,
                )
            })
            .collect();
        let mut built = build(vec![course(1, 11, slots)]);
        let result = enumerate(&mut built, 2);

        assert_eq!(result.solutions.len(), 2);
        assert_eq!(result.stop_reason, StopReason::Completed);
        assert_eq!(result.iterations.len(), 2);
    }

    #[test]
    fn test_solutions_distinct_and_non_increasing() {
        let mut built = build(vec![
            course(
                1,
                11,
                vec![
                    slot(Weekday::Monday, "08:00", "09:30", 1, true),
                    slot(Weekday::Tuesday, "08:00", "09:30", 1, false),
                    slot(Weekday::Wednesday, "08:00", "09:30", 1, true),
                ],
            ),
            course(
                2,
                11,
                vec![
                    slot(Weekday::Monday, "08:00", "09:30", 2, true),
                    slot(Weekday::Tuesday, "10:00", "11:30", 2, false),
                ],
            ),
        ]);
        let result = enumerate(&mut built, 10);

        // (Mon, Tue10), (Tue8, Mon), (Tue8, Tue10), (Wed, Mon), (Wed, Tue10)
        assert_eq!(result.solutions.len(), 5);
        let distinct: HashSet<Vec<Assignment>> = result
            .solutions
            .iter()
            .map(|s| s.assignments.clone())
            .collect();
        assert_eq!(distinct.len(), 5);
        let objectives: Vec<i64> = result.solutions.iter().map(|s| s.objective).collect();
        assert!(objectives.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(objectives[0], 2);
    }

    struct Invalid;

    impl CpSolver for Invalid {
        fn solve(&self, _model: &CpModel, _config: &SolverConfig) -> CpSolution {
            CpSolution::empty(SolverStatus::ModelInvalid)
        }
    }

    #[test]
    fn test_model_invalid_stops() {
        let mut built = build(vec![course(1, 11, vec![slot(Weekday::Monday, "08:00", "09:30", 1, false)])]);
        let before = built.model().constraint_count();
        let result = SolutionEnumerator::new(&Invalid, SolverConfig::default()).enumerate(&mut built, 4);
        assert!(result.solutions.is_empty());
        assert_eq!(result.stop_reason, StopReason::ModelInvalid);
        assert_eq!(built.model().constraint_count(), before);
    }
}
