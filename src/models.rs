//! Timetabling domain records.
//!
//! These are the already-resolved entities the surrounding system hands to
//! the solver: professors with their availability, classroom categories,
//! and course specifications. [`Course`] is the expanded form the model
//! builder consumes, carrying its candidate slots.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::availability::{normalize_windows, AvailabilityWindow};
use crate::config::SolverSettings;
use crate::slots::TimeSlot;
use crate::time::{SlotDuration, Weekday};

pub type CourseId = u32;
pub type ProfessorId = u32;
pub type ClassroomId = u32;

/// Cohort key shared by courses that have the same students.
pub type CohortGroup = u32;

/// A professor and the times they can teach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Professor {
    pub id: ProfessorId,
    pub full_name: String,
    /// Always normalized.
    #[serde(deserialize_with = "deserialize_normalized")]
    availability: Vec<AvailabilityWindow>,
    #[serde(default)]
    pub preferred_days: BTreeSet<Weekday>,
    /// Minimum weekly teaching hours (0 = unbounded).
    #[serde(default)]
    pub min_hours: u32,
    /// Maximum weekly teaching hours (0 = unbounded).
    #[serde(default)]
    pub max_hours: u32,
}

fn deserialize_normalized<'de, D>(deserializer: D) -> Result<Vec<AvailabilityWindow>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<AvailabilityWindow>::deserialize(deserializer)?;
    Ok(normalize_windows(&raw))
}

impl Professor {
    pub fn new(id: ProfessorId, full_name: impl Into<String>) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            availability: Vec::new(),
            preferred_days: BTreeSet::new(),
            min_hours: 0,
            max_hours: 0,
        }
    }

    /// Sets availability, normalizing the windows.
    pub fn with_availability(mut self, windows: Vec<AvailabilityWindow>) -> Self {
        self.availability = normalize_windows(&windows);
        self
    }

    pub fn with_preferred_days(mut self, days: Vec<Weekday>) -> Self {
        self.preferred_days = days.into_iter().collect();
        self
    }

    /// Sets weekly hour bounds (0 = unbounded).
    pub fn with_hour_bounds(mut self, min_hours: u32, max_hours: u32) -> Self {
        self.min_hours = min_hours;
        self.max_hours = max_hours;
        self
    }

    /// Normalized availability windows, sorted by `(day, start)`.
    pub fn availability(&self) -> &[AvailabilityWindow] {
        &self.availability
    }

    /// Whether `day` is one of the professor's preferred days.
    pub fn prefers(&self, day: Weekday) -> bool {
        self.preferred_days.contains(&day)
    }

    /// Whether either workload bound is set.
    pub fn has_hour_bounds(&self) -> bool {
        self.min_hours > 0 || self.max_hours > 0
    }
}

/// A classroom category with a limited number of rooms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classroom {
    pub id: ClassroomId,
    pub name: String,
    /// How many courses of this category may run at the same time.
    pub capacity: u32,
}

impl Classroom {
    pub fn new(id: ClassroomId, name: impl Into<String>, capacity: u32) -> Self {
        Self {
            id,
            name: name.into(),
            capacity,
        }
    }
}

/// A course as received from the surrounding system, before slot expansion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseSpec {
    pub id: CourseId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub units: u32,
    /// Meeting length, `"hh:mm"`.
    pub duration: SlotDuration,
    #[serde(default)]
    pub major_id: u32,
    #[serde(default)]
    pub semester: u32,
    /// Weekly workload in hours (may be fractional).
    #[serde(default)]
    pub calculated_hours: f64,
    #[serde(default)]
    pub classroom_id: Option<ClassroomId>,
    #[serde(default)]
    pub professor_ids: Vec<ProfessorId>,
}

impl CourseSpec {
    pub fn new(id: CourseId, duration: SlotDuration) -> Self {
        Self {
            id,
            title: String::new(),
            units: 0,
            duration,
            major_id: 0,
            semester: 0,
            calculated_hours: 0.0,
            classroom_id: None,
            professor_ids: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_cohort(mut self, major_id: u32, semester: u32) -> Self {
        self.major_id = major_id;
        self.semester = semester;
        self
    }

    pub fn with_hours(mut self, hours: f64) -> Self {
        self.calculated_hours = hours;
        self
    }

    pub fn with_classroom(mut self, classroom_id: ClassroomId) -> Self {
        self.classroom_id = Some(classroom_id);
        self
    }

    pub fn with_professors(mut self, professor_ids: Vec<ProfessorId>) -> Self {
        self.professor_ids = professor_ids;
        self
    }

    /// `major_id * 10 + semester`.
    pub fn cohort_group(&self) -> CohortGroup {
        self.major_id * 10 + self.semester
    }

    /// Workload in hundredths of an hour.
    pub fn workload_hundredths(&self) -> i64 {
        (self.calculated_hours * 100.0).round() as i64
    }
}

/// The classroom category a course needs and its concurrent capacity.
///
/// Every course naming the same category must give the same capacity;
/// the model builder rejects a mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassroomNeed {
    pub classroom_id: ClassroomId,
    pub capacity: u32,
}

/// A course ready for model building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    #[serde(default)]
    pub title: String,
    pub cohort_group: CohortGroup,
    pub duration: SlotDuration,
    /// Workload weight in hundredths of an hour.
    #[serde(default)]
    pub calculated_hours: i64,
    #[serde(default)]
    pub classroom: Option<ClassroomNeed>,
    pub candidate_slots: Vec<TimeSlot>,
}

impl Course {
    pub fn new(id: CourseId, cohort_group: CohortGroup, duration: SlotDuration) -> Self {
        Self {
            id,
            title: String::new(),
            cohort_group,
            duration,
            calculated_hours: 0,
            classroom: None,
            candidate_slots: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_slots(mut self, slots: Vec<TimeSlot>) -> Self {
        self.candidate_slots = slots;
        self
    }

    /// Sets the workload weight in hundredths of an hour.
    pub fn with_workload(mut self, hundredths: i64) -> Self {
        self.calculated_hours = hundredths;
        self
    }

    pub fn with_classroom(mut self, classroom_id: ClassroomId, capacity: u32) -> Self {
        self.classroom = Some(ClassroomNeed {
            classroom_id,
            capacity,
        });
        self
    }
}

/// Everything one solve needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveRequest {
    pub courses: Vec<CourseSpec>,
    pub professors: Vec<Professor>,
    #[serde(default)]
    pub classrooms: Vec<Classroom>,
    pub settings: SolverSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cohort_and_workload() {
        let spec = CourseSpec::new(1, SlotDuration::parse("01:30").unwrap())
            .with_cohort(12, 3)
            .with_hours(2.25);
        assert_eq!(spec.cohort_group(), 123);
        assert_eq!(spec.workload_hundredths(), 225);
    }

    #[test]
    fn test_professor_normalizes_availability() {
        let prof = Professor::new(1, "P").with_availability(vec![
            AvailabilityWindow::parse(Weekday::Monday, "10:00", "12:00").unwrap(),
            AvailabilityWindow::parse(Weekday::Monday, "08:00", "10:10").unwrap(),
        ]);
        assert_eq!(prof.availability().len(), 1);
        assert_eq!(prof.availability()[0].start().to_string(), "08:00");
        assert!(!prof.has_hour_bounds());
        assert!(prof.with_hour_bounds(0, 10).has_hour_bounds());
    }

    #[test]
    fn test_professor_json_normalizes() {
        let json = r#"{
            "id": 7,
            "full_name": "Dr. Seven",
            "availability": [
                {"day": 2, "start": "13:00", "end": "15:00"},
                {"day": 2, "start": "08:00", "end": "10:00"},
                {"day": 2, "start": "10:05", "end": "11:00"}
            ],
            "preferred_days": [2],
            "max_hours": 12
        }"#;
        let prof: Professor = serde_json::from_str(json).unwrap();
        assert_eq!(prof.availability().len(), 2);
        assert!(prof.prefers(Weekday::Monday));
        assert_eq!(prof.max_hours, 12);
        assert_eq!(prof.min_hours, 0);
    }

    #[test]
    fn test_course_spec_json() {
        let json = r#"{"id": 3, "duration": "01:30", "major_id": 4, "semester": 2,
                       "calculated_hours": 1.5, "classroom_id": 9, "professor_ids": [1, 2]}"#;
        let spec: CourseSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.duration.minutes(), 90);
        assert_eq!(spec.cohort_group(), 42);
        assert_eq!(spec.classroom_id, Some(9));

        assert!(serde_json::from_str::<CourseSpec>(r#"{"id": 3, "duration": "1h30"}"#).is_err());
    }
}
