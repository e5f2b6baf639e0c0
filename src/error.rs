//! Error types for timetable construction.
//!
//! Only input and model-construction failures are errors. Engine verdicts
//! (infeasible, unknown) during enumeration end the loop and are reported
//! through [`StopReason`](crate::enumerator::StopReason) instead.

use thiserror::Error;

/// Input that can never produce a timetable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Two courses share the same id.
    #[error("duplicate course id: {0}")]
    DuplicateCourse(u32),

    /// A course has no candidate slot that fits its duration.
    #[error("course {0} does not have any candidate time slot")]
    NoCandidateSlots(u32),

    /// A candidate slot of a course does not end after it starts.
    #[error("course {course} has a candidate slot on day {day} ending at {end} before its start {start}")]
    InvalidSlot {
        course: u32,
        day: u8,
        start: String,
        end: String,
    },

    /// Two courses need the same classroom category with different capacities.
    #[error("classroom {classroom} has capacity {first} for one course and {second} for course {course}")]
    ClassroomCapacityMismatch {
        classroom: u32,
        course: u32,
        first: u32,
        second: u32,
    },

    /// A course references a professor missing from the directory.
    #[error("course {course} references unknown professor {professor}")]
    UnknownProfessor { course: u32, professor: u32 },

    /// A course references a classroom missing from the directory.
    #[error("course {course} references unknown classroom {classroom}")]
    UnknownClassroom { course: u32, classroom: u32 },
}

/// Errors surfaced to the caller of a solve request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimetableError {
    /// Malformed time or duration text.
    #[error("format error: {0}")]
    Format(String),

    /// Structurally invalid request.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A constraint group made the model infeasible (debug mode only).
    #[error("{phase} constraint for {subject} makes the timetable infeasible")]
    StructuralInfeasibility { phase: String, subject: String },

    /// Invalid solver settings.
    #[error("configuration error: {0}")]
    Config(String),
}

impl TimetableError {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }
}

/// Result type for timetable operations.
pub type Result<T> = std::result::Result<T, TimetableError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = TimetableError::from(ValidationError::DuplicateCourse(7));
        assert_eq!(err.to_string(), "duplicate course id: 7");

        let err = TimetableError::StructuralInfeasibility {
            phase: "professor".into(),
            subject: "professor 3".into(),
        };
        assert_eq!(
            err.to_string(),
            "professor constraint for professor 3 makes the timetable infeasible"
        );
    }

    #[test]
    fn test_validation_converts() {
        let err: TimetableError = ValidationError::NoCandidateSlots(1).into();
        assert!(matches!(
            err,
            TimetableError::Validation(ValidationError::NoCandidateSlots(1))
        ));
    }
}
