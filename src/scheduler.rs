//! Request-level orchestration.
//!
//! [`Timetabler`] takes a [`SolveRequest`] from the surrounding system and
//! runs the whole pipeline: settings check, slot expansion against the
//! professor directory, model building (with feasibility checks in debug
//! mode), and enumeration. [`TimetableReport`] turns the result back into
//! display records with course titles, professor names and `HH:MM` times.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::builder::{FeasibilityCheck, NoCheck, TimetableModelBuilder, WorkloadBound};
use crate::cp::{BranchAndBoundSolver, CpSolver};
use crate::enumerator::{IterationStats, Solution, SolutionEnumerator, StopReason};
use crate::error::{Result, ValidationError};
use crate::models::{
    Classroom, ClassroomId, CohortGroup, Course, CourseId, Professor, ProfessorId, SolveRequest,
};
use crate::slots::course_slots;

/// Outcome of one solve request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableResult {
    pub solutions: Vec<Solution>,
    pub stop_reason: StopReason,
    pub iterations: Vec<IterationStats>,
}

/// Runs solve requests against a [`CpSolver`].
///
/// # Examples
///
/// ```
/// use u_timetable::availability::AvailabilityWindow;
/// use u_timetable::config::SolverSettings;
/// use u_timetable::models::{CourseSpec, Professor, SolveRequest};
/// use u_timetable::scheduler::Timetabler;
/// use u_timetable::time::{SlotDuration, Weekday};
///
/// let professor = Professor::new(1, "Dr. Rahimi").with_availability(vec![
///     AvailabilityWindow::parse(Weekday::Monday, "08:00", "11:00").unwrap(),
/// ]);
/// let course = CourseSpec::new(100, SlotDuration::parse("01:30").unwrap())
///     .with_title("Compilers")
///     .with_professors(vec![1]);
/// let request = SolveRequest {
///     courses: vec![course],
///     professors: vec![professor],
///     classrooms: vec![],
///     settings: SolverSettings::default().with_number_of_solutions(5),
/// };
///
/// let result = Timetabler::new().solve(&request).unwrap();
/// // 08:00 and 09:30 are the only candidates.
/// assert_eq!(result.solutions.len(), 2);
/// ```
pub struct Timetabler<S: CpSolver = BranchAndBoundSolver> {
    solver: S,
}

impl Timetabler<BranchAndBoundSolver> {
    pub fn new() -> Self {
        Self {
            solver: BranchAndBoundSolver::new(),
        }
    }
}

impl Default for Timetabler<BranchAndBoundSolver> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: CpSolver> Timetabler<S> {
    /// Uses another engine.
    pub fn with_solver(solver: S) -> Self {
        Self { solver }
    }

    /// Expands course specs into courses with candidate slots.
    ///
    /// Unknown professor or classroom ids are validation errors; courses
    /// left without slots are rejected later by the model builder.
    pub fn prepare(&self, request: &SolveRequest) -> Result<Vec<Course>> {
        let professors: HashMap<ProfessorId, &Professor> =
            request.professors.iter().map(|p| (p.id, p)).collect();
        let classrooms: HashMap<ClassroomId, &Classroom> =
            request.classrooms.iter().map(|c| (c.id, c)).collect();

        request
            .courses
            .iter()
            .map(|spec| {
                let slots = course_slots(spec, &professors)?;
                let mut course = Course::new(spec.id, spec.cohort_group(), spec.duration)
                    .with_title(spec.title.clone())
                    .with_workload(spec.workload_hundredths())
                    .with_slots(slots);
                if let Some(classroom_id) = spec.classroom_id {
                    let classroom =
                        classrooms
                            .get(&classroom_id)
                            .ok_or(ValidationError::UnknownClassroom {
                                course: spec.id,
                                classroom: classroom_id,
                            })?;
                    course = course.with_classroom(classroom_id, classroom.capacity);
                }
                Ok(course)
            })
            .collect()
    }

    /// Runs the full pipeline for `request`.
    pub fn solve(&self, request: &SolveRequest) -> Result<TimetableResult> {
        let settings = &request.settings;
        settings.validate()?;

        let courses = self.prepare(request)?;
        let slots: usize = courses.iter().map(|c| c.candidate_slots.len()).sum();
        debug!(courses = courses.len(), slots, "courses expanded");

        let mut builder = TimetableModelBuilder::new(courses)?
            .with_classroom_limitation(settings.classroom_limitation);
        if settings.professor_hour_limits {
            builder = builder.with_workload_bounds(request.professors.iter().map(|p| WorkloadBound {
                professor_id: p.id,
                min_hours: p.min_hours,
                max_hours: p.max_hours,
            }));
        }

        let config = settings.engine_config();
        let mut built = if settings.debug {
            let mut check = FeasibilityCheck::new(&self.solver).with_config(config.clone());
            let built = builder.build(&mut check)?;
            debug!(checks = check.checks(), "feasibility checks passed");
            built
        } else {
            builder.build(&mut NoCheck)?
        };

        let enumeration = SolutionEnumerator::new(&self.solver, config)
            .enumerate(&mut built, settings.number_of_solutions);
        info!(
            solutions = enumeration.solutions.len(),
            stop_reason = ?enumeration.stop_reason,
            "solve request finished"
        );

        Ok(TimetableResult {
            solutions: enumeration.solutions,
            stop_reason: enumeration.stop_reason,
            iterations: enumeration.iterations,
        })
    }
}

/// A scheduled course in display form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledCourse {
    pub course_id: CourseId,
    pub title: String,
    pub units: u32,
    pub cohort_group: CohortGroup,
    pub classroom_id: Option<ClassroomId>,
    /// Weekday index, Saturday = 0.
    pub day: u8,
    pub start_time: String,
    pub end_time: String,
    pub professor_id: ProfessorId,
    pub professor_name: String,
    pub preferred: bool,
    pub score: u32,
}

/// One timetable in display form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedTimetable {
    pub courses: Vec<ScheduledCourse>,
    pub preferred_count: i64,
}

/// Display form of a [`TimetableResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableReport {
    pub solutions: Vec<ReportedTimetable>,
    pub stop_reason: StopReason,
}

impl TimetableReport {
    /// Joins `result` with the course and professor records of `request`.
    ///
    /// Assignments whose course is missing from the request are skipped;
    /// an unknown professor leaves the name empty.
    pub fn new(result: &TimetableResult, request: &SolveRequest) -> Self {
        let courses: HashMap<CourseId, _> = request.courses.iter().map(|c| (c.id, c)).collect();
        let professors: HashMap<ProfessorId, &Professor> =
            request.professors.iter().map(|p| (p.id, p)).collect();

        let solutions = result
            .solutions
            .iter()
            .map(|solution| ReportedTimetable {
                courses: solution
                    .assignments
                    .iter()
                    .filter_map(|a| {
                        let spec = courses.get(&a.course_id)?;
                        let professor_id = a.slot.professor_id();
                        Some(ScheduledCourse {
                            course_id: a.course_id,
                            title: spec.title.clone(),
                            units: spec.units,
                            cohort_group: spec.cohort_group(),
                            classroom_id: spec.classroom_id,
                            day: a.slot.day().index(),
                            start_time: a.slot.start().to_string(),
                            end_time: a.slot.end().to_string(),
                            professor_id,
                            professor_name: professors
                                .get(&professor_id)
                                .map(|p| p.full_name.clone())
                                .unwrap_or_default(),
                            preferred: a.slot.preferred(),
                            score: a.score,
                        })
                    })
                    .collect(),
                preferred_count: solution.objective,
            })
            .collect();

        Self {
            solutions,
            stop_reason: result.stop_reason,
        }
    }
}
