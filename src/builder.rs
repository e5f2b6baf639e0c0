//! Scheduling model builder.
//!
//! Maps courses and their candidate slots onto a [`CpModel`]: one literal
//! and one optional interval per (course, slot) pair, then the constraint
//! groups in a fixed order:
//!
//! 1. exactly one slot per course
//! 2. cohort groups never overlap (cumulative, capacity 1)
//! 3. professors never overlap (cumulative, capacity 1)
//! 4. classroom categories stay within capacity (optional)
//! 5. professor weekly workload bounds (optional)
//!
//! and finally the objective: maximize the number of preferred slots chosen.
//!
//! A [`PhaseHook`] runs after every constraint group. [`FeasibilityCheck`]
//! solves the partial model there and names the group that first makes it
//! infeasible.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use tracing::{debug, warn};

use crate::cp::{BoolVarId, CpModel, CpSolution, CpSolver, IntervalId, SolverConfig};
use crate::error::{Result, TimetableError, ValidationError};
use crate::models::{ClassroomId, CohortGroup, Course, CourseId, ProfessorId};
use crate::slots::TimeSlot;

/// Constraint group just added to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Course,
    Cohort,
    Professor,
    Classroom,
    ProfessorHours,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Course => "course",
            Phase::Cohort => "cohort group",
            Phase::Professor => "professor",
            Phase::Classroom => "classroom",
            Phase::ProfessorHours => "professor hours",
        };
        f.write_str(name)
    }
}

/// Callback run after each constraint group.
pub trait PhaseHook {
    /// `subject` names the course, cohort, professor or classroom the
    /// group was built for.
    fn after_group(&mut self, model: &CpModel, phase: Phase, subject: &str) -> Result<()>;
}

/// Hook that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCheck;

impl PhaseHook for NoCheck {
    fn after_group(&mut self, _model: &CpModel, _phase: Phase, _subject: &str) -> Result<()> {
        Ok(())
    }
}

/// Hook that solves the partial model after each group.
///
/// Any verdict other than a found solution raises
/// [`TimetableError::StructuralInfeasibility`] for that group.
pub struct FeasibilityCheck<'a, S: CpSolver> {
    solver: &'a S,
    config: SolverConfig,
    checks: usize,
}

impl<'a, S: CpSolver> FeasibilityCheck<'a, S> {
    pub fn new(solver: &'a S) -> Self {
        Self {
            solver,
            config: SolverConfig::feasibility_probe(),
            checks: 0,
        }
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config.with_stop_after_first(true);
        self
    }

    /// Number of probes run so far.
    pub fn checks(&self) -> usize {
        self.checks
    }
}

impl<S: CpSolver> PhaseHook for FeasibilityCheck<'_, S> {
    fn after_group(&mut self, model: &CpModel, phase: Phase, subject: &str) -> Result<()> {
        self.checks += 1;
        let probe = self.solver.solve(model, &self.config);
        if probe.is_solution_found() {
            return Ok(());
        }
        warn!(%phase, subject, status = ?probe.status, "constraint group breaks feasibility");
        Err(TimetableError::StructuralInfeasibility {
            phase: phase.to_string(),
            subject: subject.to_string(),
        })
    }
}

/// Weekly hour bounds of one professor (0 = unbounded).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadBound {
    pub professor_id: ProfessorId,
    pub min_hours: u32,
    pub max_hours: u32,
}

/// Engine handles of one candidate slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotVar {
    /// Index into the course's `candidate_slots`.
    pub slot: usize,
    pub literal: BoolVarId,
    pub interval: IntervalId,
}

/// Engine handles of one course, index-aligned with its candidate slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseVars {
    pub course_id: CourseId,
    pub slots: Vec<SlotVar>,
}

fn literal_name(course: CourseId, slot: &TimeSlot) -> String {
    format!(
        "course_{}_day_{}_start_{}_end_{}_prof_{}_preferred_{}",
        course,
        slot.day().index(),
        slot.start().compact(),
        slot.end().compact(),
        slot.professor_id(),
        u8::from(slot.preferred()),
    )
}

/// Builds a [`TimetableModel`] from validated courses.
///
/// # Examples
///
/// ```
/// use u_timetable::builder::{NoCheck, TimetableModelBuilder};
/// use u_timetable::models::Course;
/// use u_timetable::slots::TimeSlot;
/// use u_timetable::time::{ClockTime, SlotDuration, Weekday};
///
/// let slot = TimeSlot::new(
///     Weekday::Monday,
///     ClockTime::parse("08:00").unwrap(),
///     ClockTime::parse("09:30").unwrap(),
///     1,
///     true,
/// );
/// let course = Course::new(10, 11, SlotDuration::from_minutes(90).unwrap())
///     .with_slots(vec![slot]);
///
/// let built = TimetableModelBuilder::new(vec![course])
///     .unwrap()
///     .build(&mut NoCheck)
///     .unwrap();
/// assert_eq!(built.model().bool_count(), 1);
/// ```
pub struct TimetableModelBuilder {
    model: CpModel,
    courses: Vec<Course>,
    index: HashMap<CourseId, usize>,
    vars: Vec<CourseVars>,
    classroom_limitation: bool,
    workload_bounds: Vec<WorkloadBound>,
}

impl TimetableModelBuilder {
    /// Validates the course list.
    ///
    /// Fails before any variable exists on a duplicate course id, a course
    /// without candidate slots, a slot that does not end after it starts,
    /// or one classroom category given two different capacities.
    pub fn new(courses: Vec<Course>) -> Result<Self> {
        let mut index = HashMap::with_capacity(courses.len());
        for (i, course) in courses.iter().enumerate() {
            if index.insert(course.id, i).is_some() {
                return Err(ValidationError::DuplicateCourse(course.id).into());
            }
        }
        if let Some(course) = courses.iter().find(|c| c.candidate_slots.is_empty()) {
            return Err(ValidationError::NoCandidateSlots(course.id).into());
        }
        for course in &courses {
            if let Some(slot) = course.candidate_slots.iter().find(|s| !s.is_well_formed()) {
                return Err(ValidationError::InvalidSlot {
                    course: course.id,
                    day: slot.day().index(),
                    start: slot.start().to_string(),
                    end: slot.end().to_string(),
                }
                .into());
            }
        }
        let mut capacities: HashMap<ClassroomId, u32> = HashMap::new();
        for course in &courses {
            let Some(need) = course.classroom else {
                continue;
            };
            let first = *capacities.entry(need.classroom_id).or_insert(need.capacity);
            if first != need.capacity {
                return Err(ValidationError::ClassroomCapacityMismatch {
                    classroom: need.classroom_id,
                    course: course.id,
                    first,
                    second: need.capacity,
                }
                .into());
            }
        }

        Ok(Self {
            model: CpModel::new("timetable"),
            courses,
            index,
            vars: Vec::new(),
            classroom_limitation: true,
            workload_bounds: Vec::new(),
        })
    }

    pub fn with_classroom_limitation(mut self, enabled: bool) -> Self {
        self.classroom_limitation = enabled;
        self
    }

    /// Professor workload bounds to enforce; bounds of zero are skipped.
    pub fn with_workload_bounds(mut self, bounds: impl IntoIterator<Item = WorkloadBound>) -> Self {
        self.workload_bounds = bounds.into_iter().collect();
        self
    }

    /// Runs every phase in order, calling `hook` after each group.
    pub fn build<H: PhaseHook>(mut self, hook: &mut H) -> Result<TimetableModel> {
        self.add_course_vars(hook)?;
        self.add_cohort_constraints(hook)?;
        self.add_professor_constraints(hook)?;
        if self.classroom_limitation {
            self.add_classroom_constraints(hook)?;
        }
        self.add_workload_bounds(hook)?;
        self.add_preference_objective();

        debug!(
            courses = self.courses.len(),
            literals = self.model.bool_count(),
            constraints = self.model.constraint_count(),
            "timetable model built"
        );

        Ok(TimetableModel {
            model: self.model,
            courses: self.courses,
            index: self.index,
            vars: self.vars,
        })
    }

    fn add_course_vars<H: PhaseHook>(&mut self, hook: &mut H) -> Result<()> {
        for course in &self.courses {
            let mut slots = Vec::with_capacity(course.candidate_slots.len());
            for (i, slot) in course.candidate_slots.iter().enumerate() {
                let name = literal_name(course.id, slot);
                let literal = self.model.new_bool_var(name.clone());
                let interval = self.model.new_optional_interval(
                    name,
                    slot.packed_start(),
                    slot.length_minutes(),
                    slot.packed_end(),
                    literal,
                );
                slots.push(SlotVar {
                    slot: i,
                    literal,
                    interval,
                });
            }
            self.model
                .add_exactly_one(slots.iter().map(|s| s.literal).collect());
            hook.after_group(&self.model, Phase::Course, &format!("course {}", course.id))?;
            self.vars.push(CourseVars {
                course_id: course.id,
                slots,
            });
        }
        debug!(courses = self.vars.len(), literals = self.model.bool_count(), "course variables added");
        Ok(())
    }

    fn add_cohort_constraints<H: PhaseHook>(&mut self, hook: &mut H) -> Result<()> {
        let mut cohorts: BTreeMap<CohortGroup, Vec<IntervalId>> = BTreeMap::new();
        for (course, vars) in self.courses.iter().zip(&self.vars) {
            cohorts
                .entry(course.cohort_group)
                .or_default()
                .extend(vars.slots.iter().map(|s| s.interval));
        }
        let groups = cohorts.len();
        for (cohort, intervals) in cohorts {
            let demands = vec![1; intervals.len()];
            self.model.add_cumulative(intervals, demands, 1);
            hook.after_group(&self.model, Phase::Cohort, &format!("cohort group {cohort}"))?;
        }
        debug!(groups, "cohort constraints added");
        Ok(())
    }

    fn professor_slot_vars(&self) -> BTreeMap<ProfessorId, Vec<(usize, SlotVar)>> {
        let mut professors: BTreeMap<ProfessorId, Vec<(usize, SlotVar)>> = BTreeMap::new();
        for (c, (course, vars)) in self.courses.iter().zip(&self.vars).enumerate() {
            for var in &vars.slots {
                let professor = course.candidate_slots[var.slot].professor_id();
                professors.entry(professor).or_default().push((c, *var));
            }
        }
        professors
    }

    fn add_professor_constraints<H: PhaseHook>(&mut self, hook: &mut H) -> Result<()> {
        let professors = self.professor_slot_vars();
        let count = professors.len();
        for (professor, vars) in professors {
            let intervals: Vec<IntervalId> = vars.iter().map(|(_, v)| v.interval).collect();
            let demands = vec![1; intervals.len()];
            self.model.add_cumulative(intervals, demands, 1);
            hook.after_group(&self.model, Phase::Professor, &format!("professor {professor}"))?;
        }
        debug!(professors = count, "professor constraints added");
        Ok(())
    }

    fn add_classroom_constraints<H: PhaseHook>(&mut self, hook: &mut H) -> Result<()> {
        let mut classrooms: BTreeMap<ClassroomId, (u32, Vec<IntervalId>)> = BTreeMap::new();
        for (course, vars) in self.courses.iter().zip(&self.vars) {
            let Some(need) = course.classroom else {
                continue;
            };
            classrooms
                .entry(need.classroom_id)
                .or_insert_with(|| (need.capacity, Vec::new()))
                .1
                .extend(vars.slots.iter().map(|s| s.interval));
        }
        let count = classrooms.len();
        for (classroom, (capacity, intervals)) in classrooms {
            let demands = vec![1; intervals.len()];
            self.model
                .add_cumulative(intervals, demands, i64::from(capacity));
            hook.after_group(&self.model, Phase::Classroom, &format!("classroom {classroom}"))?;
        }
        debug!(classrooms = count, "classroom constraints added");
        Ok(())
    }

    fn add_workload_bounds<H: PhaseHook>(&mut self, hook: &mut H) -> Result<()> {
        if self.workload_bounds.is_empty() {
            return Ok(());
        }
        let professors = self.professor_slot_vars();
        let mut added = 0;
        for bound in &self.workload_bounds {
            if bound.min_hours == 0 && bound.max_hours == 0 {
                continue;
            }
            let Some(vars) = professors.get(&bound.professor_id) else {
                continue;
            };
            let terms: Vec<(BoolVarId, i64)> = vars
                .iter()
                .map(|(c, v)| (v.literal, self.courses[*c].calculated_hours))
                .collect();
            let lower = (bound.min_hours > 0).then(|| i64::from(bound.min_hours) * 100);
            let upper = (bound.max_hours > 0).then(|| i64::from(bound.max_hours) * 100);
            self.model.add_linear(terms, lower, upper);
            added += 1;
            hook.after_group(
                &self.model,
                Phase::ProfessorHours,
                &format!("professor {}", bound.professor_id),
            )?;
        }
        debug!(bounds = added, "professor workload bounds added");
        Ok(())
    }

    fn add_preference_objective(&mut self) {
        let terms: Vec<(BoolVarId, i64)> = self
            .courses
            .iter()
            .zip(&self.vars)
            .flat_map(|(course, vars)| {
                vars.slots
                    .iter()
                    .filter(|v| course.candidate_slots[v.slot].preferred())
                    .map(|v| (v.literal, 1))
            })
            .collect();
        debug!(preferred = terms.len(), "preference objective set");
        self.model.maximize(terms);
    }
}

/// A built timetable model and the variable lookup into it.
#[derive(Debug, Clone)]
pub struct TimetableModel {
    model: CpModel,
    courses: Vec<Course>,
    index: HashMap<CourseId, usize>,
    vars: Vec<CourseVars>,
}

impl TimetableModel {
    pub fn model(&self) -> &CpModel {
        &self.model
    }

    /// The model, for adding constraints between solves.
    pub fn model_mut(&mut self) -> &mut CpModel {
        &mut self.model
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn course(&self, id: CourseId) -> Option<&Course> {
        self.index.get(&id).map(|&i| &self.courses[i])
    }

    pub fn course_vars(&self, id: CourseId) -> Option<&CourseVars> {
        self.index.get(&id).map(|&i| &self.vars[i])
    }

    /// Literal of `slot` for course `id`: course first, then slot.
    pub fn literal(&self, id: CourseId, slot: &TimeSlot) -> Option<BoolVarId> {
        let i = *self.index.get(&id)?;
        self.vars[i]
            .slots
            .iter()
            .find(|v| self.courses[i].candidate_slots[v.slot] == *slot)
            .map(|v| v.literal)
    }

    /// Chosen slot of each course, in course order.
    ///
    /// Courses without a true literal (no solution found) are skipped.
    pub fn decode(&self, solution: &CpSolution) -> Vec<(CourseId, TimeSlot)> {
        self.courses
            .iter()
            .zip(&self.vars)
            .filter_map(|(course, vars)| {
                vars.slots
                    .iter()
                    .find(|v| solution.value(v.literal))
                    .map(|v| (course.id, course.candidate_slots[v.slot]))
            })
            .collect()
    }

    /// Literals set true in `solution`.
    pub fn chosen_literals(&self, solution: &CpSolution) -> Vec<BoolVarId> {
        self.vars
            .iter()
            .flat_map(|vars| vars.slots.iter())
            .map(|v| v.literal)
            .filter(|&literal| solution.value(literal))
            .collect()
    }

    /// Distinct professors referenced by any candidate slot.
    pub fn professor_ids(&self) -> HashSet<ProfessorId> {
        self.courses
            .iter()
            .flat_map(|c| c.candidate_slots.iter().map(|s| s.professor_id()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::{BranchAndBoundSolver, Constraint, SolverStatus};
    use crate::time::{ClockTime, SlotDuration, Weekday};

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

    #[test]
    fn test_rejects_duplicate_ids() {
        let s = slot(Weekday::Monday, "08:00", "09:30", 1, false);
        let err = TimetableModelBuilder::new(vec![course(1, 11, vec![s]), course(1, 12, vec![s])])
            .err()
            .unwrap();
        assert_eq!(err, ValidationError::DuplicateCourse(1).into());
    }

    #[test]
    fn test_rejects_course_without_slots() {
        let s = slot(Weekday::Monday, "08:00", "09:30", 1, false);
        let err = TimetableModelBuilder::new(vec![course(1, 11, vec![s]), course(2, 11, vec![])])
            .err()
            .unwrap();
        assert_eq!(err, ValidationError::NoCandidateSlots(2).into());
    }

    #[test]
    fn test_rejects_inverted_slot_before_variables() {
        let good = slot(Weekday::Monday, "08:00", "09:30", 1, false);
        let inverted = slot(Weekday::Monday, "10:00", "08:30", 1, false);
        let err = TimetableModelBuilder::new(vec![
            course(1, 11, vec![good]),
            course(2, 12, vec![good, inverted]),
        ])
        .err()
        .unwrap();
        assert_eq!(
            err,
            ValidationError::InvalidSlot {
                course: 2,
                day: 2,
                start: "10:00".into(),
                end: "08:30".into(),
            }
            .into()
        );
    }

    #[test]
    fn test_deserialized_course_with_inverted_slot_is_rejected() {
        let json = r#"{"id":1,"cohort_group":11,"duration":"01:30","candidate_slots":[
            {"day":2,"start":"10:00","end":"08:30","professor_id":1,"preferred":false}]}"#;
        assert!(serde_json::from_str::<Course>(json).is_err());

        let json = json.replace(r#""end":"08:30""#, r#""end":"11:30""#);
        let course: Course = serde_json::from_str(&json).unwrap();
        assert!(TimetableModelBuilder::new(vec![course]).is_ok());
    }

    #[test]
    fn test_rejects_classroom_capacity_mismatch() {
        let s = slot(Weekday::Monday, "08:00", "09:30", 1, false);
        let err = TimetableModelBuilder::new(vec![
            course(1, 11, vec![s]).with_classroom(5, 2),
            course(2, 12, vec![s]).with_classroom(5, 1),
        ])
        .err()
        .unwrap();
        assert_eq!(
            err,
            ValidationError::ClassroomCapacityMismatch {
                classroom: 5,
                course: 2,
                first: 2,
                second: 1,
            }
            .into()
        );

        assert!(TimetableModelBuilder::new(vec![
            course(1, 11, vec![s]).with_classroom(5, 2),
            course(2, 12, vec![s]).with_classroom(5, 2),
        ])
        .is_ok());
    }

    #[test]
    fn test_variables_and_groups() {
        let courses = vec![
            course(
                1,
                11,
                vec![
                    slot(Weekday::Monday, "08:00", "09:30", 1, true),
                    slot(Weekday::Tuesday, "08:00", "09:30", 2, false),
                ],
            ),
            course(2, 12, vec![slot(Weekday::Monday, "08:00", "09:30", 1, false)]),
        ];
        let built = TimetableModelBuilder::new(courses)
            .unwrap()
            .build(&mut NoCheck)
            .unwrap();
        let model = built.model();
        assert_eq!(model.bool_count(), 3);
        assert_eq!(model.interval_count(), 3);
        // 2 exactly-one + 2 cohorts + 2 professors
        assert_eq!(model.constraint_count(), 6);
        assert!(model.validate().is_ok());

        let first = built.interval_of(1, 0);
        assert_eq!(first.start, 30_480);
        assert_eq!(first.size, 90);
        assert_eq!(first.end, 30_570);

        let literal = built
            .literal(1, &slot(Weekday::Tuesday, "08:00", "09:30", 2, false))
            .unwrap();
        assert_eq!(
            model.bool_var(literal).unwrap().name,
            "course_1_day_3_start_0800_end_0930_prof_2_preferred_0"
        );
        assert!(built.literal(3, &slot(Weekday::Monday, "08:00", "09:30", 1, true)).is_none());
    }

    #[test]
    fn test_solve_avoids_professor_clash() {
        let courses = vec![
            course(
                1,
                11,
                vec![
                    slot(Weekday::Monday, "08:00", "09:30", 1, true),
                    slot(Weekday::Tuesday, "08:00", "09:30", 1, false),
                ],
            ),
            course(2, 12, vec![slot(Weekday::Monday, "08:30", "10:00", 1, false)]),
        ];
        let built = TimetableModelBuilder::new(courses)
            .unwrap()
            .build(&mut NoCheck)
            .unwrap();
        let solution = BranchAndBoundSolver::new().solve(built.model(), &SolverConfig::default());
        assert_eq!(solution.status, SolverStatus::Optimal);
        let decoded = built.decode(&solution);
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].1.day(), Weekday::Tuesday);
        assert_eq!(solution.objective_value, Some(0));
    }

    #[test]
    fn test_classroom_limitation_toggle() {
        let courses = || {
            vec![
                course(1, 11, vec![slot(Weekday::Monday, "08:00", "09:30", 1, false)])
                    .with_classroom(5, 1),
                course(2, 12, vec![slot(Weekday::Monday, "08:00", "09:30", 2, false)])
                    .with_classroom(5, 1),
            ]
        };
        let solver = BranchAndBoundSolver::new();

        let limited = TimetableModelBuilder::new(courses())
            .unwrap()
            .build(&mut NoCheck)
            .unwrap();
        assert_eq!(
            solver.solve(limited.model(), &SolverConfig::default()).status,
            SolverStatus::Infeasible
        );

        let relaxed = TimetableModelBuilder::new(courses())
            .unwrap()
            .with_classroom_limitation(false)
            .build(&mut NoCheck)
            .unwrap();
        assert_eq!(
            solver.solve(relaxed.model(), &SolverConfig::default()).status,
            SolverStatus::Optimal
        );
    }

    #[test]
    fn test_workload_bounds_scaled() {
        let courses = vec![
            course(1, 11, vec![slot(Weekday::Monday, "08:00", "09:30", 1, false)]).with_workload(150),
            course(2, 12, vec![slot(Weekday::Tuesday, "08:00", "09:30", 1, false)]).with_workload(150),
        ];
        let built = TimetableModelBuilder::new(courses)
            .unwrap()
            .with_workload_bounds([
                WorkloadBound {
                    professor_id: 1,
                    min_hours: 0,
                    max_hours: 2,
                },
                WorkloadBound {
                    professor_id: 9,
                    min_hours: 0,
                    max_hours: 0,
                },
            ])
            .build(&mut NoCheck)
            .unwrap();

        let linear = built
            .model()
            .constraints()
            .iter()
            .find_map(|c| match c {
                Constraint::Linear { terms, lower, upper } => Some((terms.clone(), *lower, *upper)),
                _ => None,
            })
            .unwrap();
        assert_eq!(linear.0.iter().map(|(_, w)| *w).collect::<Vec<_>>(), vec![150, 150]);
        assert_eq!(linear.1, None);
        assert_eq!(linear.2, Some(200));

        let solution = BranchAndBoundSolver::new().solve(built.model(), &SolverConfig::default());
        assert_eq!(solution.status, SolverStatus::Infeasible);
    }

    #[test]
    fn test_feasibility_check_names_cohort() {
        let courses = vec![
            course(1, 23, vec![slot(Weekday::Monday, "08:00", "09:30", 1, false)]),
            course(2, 23, vec![slot(Weekday::Monday, "09:00", "10:30", 2, false)]),
        ];
        let solver = BranchAndBoundSolver::new();
        let mut check = FeasibilityCheck::new(&solver);
        let err = TimetableModelBuilder::new(courses)
            .unwrap()
            .build(&mut check)
            .err()
            .unwrap();
        assert_eq!(
            err,
            TimetableError::StructuralInfeasibility {
                phase: "cohort group".into(),
                subject: "cohort group 23".into(),
            }
        );
        // two course groups, then the failing cohort
        assert_eq!(check.checks(), 3);
    }

    #[test]
    fn test_feasibility_check_passes_clean_model() {
        let courses = vec![
            course(1, 11, vec![slot(Weekday::Monday, "08:00", "09:30", 1, true)]),
            course(2, 11, vec![slot(Weekday::Monday, "09:30", "11:00", 1, true)]),
        ];
        let solver = BranchAndBoundSolver::new();
        let mut check = FeasibilityCheck::new(&solver);
        assert!(TimetableModelBuilder::new(courses).unwrap().build(&mut check).is_ok());
        // 2 courses + 1 cohort + 1 professor + 0 classrooms
        assert_eq!(check.checks(), 4);
    }

    impl TimetableModel {
        fn interval_of(&self, id: CourseId, slot: usize) -> &crate::cp::IntervalVar {
            let vars = self.course_vars(id).unwrap();
            self.model.interval(vars.slots[slot].interval).unwrap()
        }
    }
}
