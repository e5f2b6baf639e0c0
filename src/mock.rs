//! Synthetic timetabling instances.
//!
//! Generates random but reproducible [`SolveRequest`]s for tests and
//! benchmarks: professors with a few availability windows on random days,
//! and courses taught by a random subset of them.

use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};

use crate::availability::AvailabilityWindow;
use crate::config::SolverSettings;
use crate::error::{Result, TimetableError};
use crate::models::{Classroom, CourseSpec, Professor, SolveRequest};
use crate::time::{ClockTime, SlotDuration, Weekday};

/// Shape of a generated instance.
///
/// # Examples
///
/// ```
/// use u_timetable::mock::MockConfig;
///
/// let config = MockConfig::default().with_num_courses(8).with_seed(3);
/// assert!(config.validate().is_ok());
/// let request = config.generate().unwrap();
/// assert_eq!(request.courses.len(), 8);
/// ```
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub num_courses: usize,
    pub num_professors: usize,
    /// Inclusive range of professors per course.
    pub professors_per_course: (usize, usize),
    /// Inclusive range of availability windows per professor.
    pub windows_per_professor: (usize, usize),
    /// Number of cohort groups courses are spread over.
    pub num_cohorts: u32,
    /// Number of classroom categories; 0 disables classroom needs.
    pub num_classrooms: u32,
    pub duration_minutes: u16,
    pub seed: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            num_courses: 5,
            num_professors: 10,
            professors_per_course: (2, 4),
            windows_per_professor: (1, 3),
            num_cohorts: 4,
            num_classrooms: 0,
            duration_minutes: 90,
            seed: 42,
        }
    }
}

impl MockConfig {
    pub fn with_num_courses(mut self, n: usize) -> Self {
        self.num_courses = n;
        self
    }

    pub fn with_num_professors(mut self, n: usize) -> Self {
        self.num_professors = n;
        self
    }

    pub fn with_professors_per_course(mut self, min: usize, max: usize) -> Self {
        self.professors_per_course = (min, max);
        self
    }

    pub fn with_num_cohorts(mut self, n: u32) -> Self {
        self.num_cohorts = n;
        self
    }

    pub fn with_num_classrooms(mut self, n: u32) -> Self {
        self.num_classrooms = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        let (min_p, max_p) = self.professors_per_course;
        if min_p == 0 || min_p > max_p {
            return Err("professors_per_course must satisfy 1 <= min <= max".into());
        }
        if max_p > self.num_professors {
            return Err("professors_per_course exceeds num_professors".into());
        }
        let (min_w, max_w) = self.windows_per_professor;
        if min_w == 0 || min_w > max_w {
            return Err("windows_per_professor must satisfy 1 <= min <= max".into());
        }
        if self.num_cohorts == 0 {
            return Err("num_cohorts must be at least 1".into());
        }
        // Windows start no later than 15:30 and span up to three slots.
        if self.duration_minutes == 0 || self.duration_minutes > 160 {
            return Err("duration_minutes must be in 1..=160".into());
        }
        Ok(())
    }

    /// Generates the request.
    pub fn generate(&self) -> Result<SolveRequest> {
        self.validate().map_err(TimetableError::Config)?;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let duration = SlotDuration::from_minutes(self.duration_minutes)?;

        let mut professors = Vec::with_capacity(self.num_professors);
        for i in 0..self.num_professors {
            let id = (i as u32 + 1) * 10;
            let windows = self.random_windows(&mut rng)?;
            let mut days: Vec<Weekday> = windows.iter().map(|w| w.day()).collect();
            days.retain(|_| rng.random_bool(0.5));
            professors.push(
                Professor::new(id, format!("Professor {id}"))
                    .with_availability(windows)
                    .with_preferred_days(days),
            );
        }

        let classrooms: Vec<Classroom> = (1..=self.num_classrooms)
            .map(|id| Classroom::new(id, format!("Classroom {id}"), rng.random_range(1..=3)))
            .collect();

        let (min_p, max_p) = self.professors_per_course;
        let mut courses = Vec::with_capacity(self.num_courses);
        for i in 0..self.num_courses {
            let count = rng.random_range(min_p..=max_p);
            let mut chosen: Vec<u32> = professors
                .choose_multiple(&mut rng, count)
                .map(|p| p.id)
                .collect();
            chosen.shuffle(&mut rng);
            let cohort = rng.random_range(1..=self.num_cohorts);
            let mut spec = CourseSpec::new(100 + i as u32, duration)
                .with_title(format!("Course {}", 100 + i))
                .with_cohort(cohort / 10, cohort % 10)
                .with_hours(f64::from(self.duration_minutes) / 60.0)
                .with_professors(chosen);
            if let Some(classroom) = classrooms.choose(&mut rng) {
                spec = spec.with_classroom(classroom.id);
            }
            courses.push(spec);
        }

        Ok(SolveRequest {
            courses,
            professors,
            classrooms,
            settings: SolverSettings::default(),
        })
    }

    fn random_windows(&self, rng: &mut StdRng) -> Result<Vec<AvailabilityWindow>> {
        let (min_w, max_w) = self.windows_per_professor;
        let count = rng.random_range(min_w..=max_w);
        (0..count)
            .map(|_| {
                let day = *Weekday::ALL.choose(rng).unwrap_or(&Weekday::Saturday);
                let start = rng.random_range(8u16..=15) * 60 + if rng.random_bool(0.5) { 30 } else { 0 };
                let length = self.duration_minutes * rng.random_range(1u16..=3);
                AvailabilityWindow::new(
                    day,
                    ClockTime::from_minutes(start)?,
                    ClockTime::from_minutes(start + length)?,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::Timetabler;

    #[test]
    fn test_default_generates() {
        let request = MockConfig::default().generate().unwrap();
        assert_eq!(request.courses.len(), 5);
        assert_eq!(request.professors.len(), 10);
        for course in &request.courses {
            assert!((2..=4).contains(&course.professor_ids.len()));
            assert!(course.cohort_group() >= 1 && course.cohort_group() <= 4);
            assert!(course.classroom_id.is_none());
        }
        for professor in &request.professors {
            assert!(!professor.availability().is_empty());
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = MockConfig::default().with_seed(11).generate().unwrap();
        let b = MockConfig::default().with_seed(11).generate().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_config() {
        assert!(MockConfig::default()
            .with_professors_per_course(3, 2)
            .validate()
            .is_err());
        assert!(MockConfig::default()
            .with_num_professors(2)
            .generate()
            .is_err());
        assert!(MockConfig::default().with_num_cohorts(0).validate().is_err());
    }

    #[test]
    fn test_classrooms_assigned() {
        let request = MockConfig::default()
            .with_num_classrooms(2)
            .generate()
            .unwrap();
        assert_eq!(request.classrooms.len(), 2);
        assert!(request.courses.iter().all(|c| c.classroom_id.is_some()));
    }

    #[test]
    fn test_generated_instances_solve_without_overlaps() {
        for seed in 0..5 {
            let mut request = MockConfig::default()
                .with_num_courses(6)
                .with_seed(seed)
                .generate()
                .unwrap();
            request.settings = request.settings.with_number_of_solutions(3);
            let result = Timetabler::new().solve(&request).unwrap();
            for solution in &result.solutions {
                assert_eq!(solution.assignments.len(), 6);
                for (i, a) in solution.assignments.iter().enumerate() {
                    for b in &solution.assignments[i + 1..] {
                        if a.slot.overlaps(&b.slot) {
                            assert_ne!(a.slot.professor_id(), b.slot.professor_id());
                        }
                    }
                }
            }
        }
    }
}
