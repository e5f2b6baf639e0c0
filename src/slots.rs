//! Candidate slot generation.
//!
//! Expands normalized availability windows into fixed-duration candidate
//! meeting slots. Each window is filled from both ends so that a window
//! whose length is not a multiple of the duration still offers slots
//! flush against either edge.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::availability::AvailabilityWindow;
use crate::error::{Result, TimetableError, ValidationError};
use crate::models::{CourseSpec, Professor, ProfessorId};
use crate::time::{pack_week_minute, ClockTime, SlotDuration, Weekday};

/// A candidate meeting time for a course.
///
/// Two slots are equal iff every field matches; equality drives
/// deduplication of the bidirectional fill.
///
/// Deserialized slots are checked to end after they start; slots built
/// with [`TimeSlot::new`] are checked by the model builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawSlot")]
pub struct TimeSlot {
    day: Weekday,
    start: ClockTime,
    end: ClockTime,
    professor_id: ProfessorId,
    preferred: bool,
    original_start: ClockTime,
}

#[derive(Deserialize)]
struct RawSlot {
    day: Weekday,
    start: ClockTime,
    end: ClockTime,
    professor_id: ProfessorId,
    #[serde(default)]
    preferred: bool,
    original_start: Option<ClockTime>,
}

impl TryFrom<RawSlot> for TimeSlot {
    type Error = TimetableError;

    fn try_from(raw: RawSlot) -> Result<Self> {
        let mut slot = Self::new(raw.day, raw.start, raw.end, raw.professor_id, raw.preferred);
        if !slot.is_well_formed() {
            return Err(TimetableError::format(format!(
                "slot on {:?} ends ({}) before it starts ({})",
                raw.day, raw.end, raw.start
            )));
        }
        slot.original_start = raw.original_start.unwrap_or(raw.start);
        Ok(slot)
    }
}

impl TimeSlot {
    /// Creates a slot. `end` must lie after `start` on the same day.
    pub fn new(
        day: Weekday,
        start: ClockTime,
        end: ClockTime,
        professor_id: ProfessorId,
        preferred: bool,
    ) -> Self {
        Self {
            day,
            start,
            end,
            professor_id,
            preferred,
            original_start: start,
        }
    }

    #[inline]
    pub fn day(&self) -> Weekday {
        self.day
    }

    #[inline]
    pub fn start(&self) -> ClockTime {
        self.start
    }

    #[inline]
    pub fn end(&self) -> ClockTime {
        self.end
    }

    #[inline]
    pub fn professor_id(&self) -> ProfessorId {
        self.professor_id
    }

    #[inline]
    pub fn preferred(&self) -> bool {
        self.preferred
    }

    #[inline]
    pub fn original_start(&self) -> ClockTime {
        self.original_start
    }

    /// Whether the slot ends after it starts.
    #[inline]
    pub fn is_well_formed(&self) -> bool {
        self.end > self.start
    }

    /// Length in minutes.
    #[inline]
    pub fn length_minutes(&self) -> i64 {
        self.end.minutes() as i64 - self.start.minutes() as i64
    }

    /// Start on the packed week axis.
    #[inline]
    pub fn packed_start(&self) -> i64 {
        pack_week_minute(self.day, self.start.minutes())
    }

    /// End on the packed week axis.
    #[inline]
    pub fn packed_end(&self) -> i64 {
        pack_week_minute(self.day, self.end.minutes())
    }

    /// Whether two slots share any minute of the week.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.packed_start() < other.packed_end() && other.packed_start() < self.packed_end()
    }
}

fn slot_at(
    window: &AvailabilityWindow,
    start: u16,
    duration: SlotDuration,
    professor_id: ProfessorId,
    preferred: bool,
) -> TimeSlot {
    // start + duration <= window end, so both minutes stay inside the day.
    TimeSlot::new(
        window.day(),
        ClockTime::from_minutes(start).unwrap_or(window.start()),
        ClockTime::from_minutes(start + duration.minutes()).unwrap_or(window.end()),
        professor_id,
        preferred,
    )
}

/// Slots laid end to end from the window start.
pub fn forward_fill(
    window: &AvailabilityWindow,
    duration: SlotDuration,
    professor_id: ProfessorId,
    preferred: bool,
) -> Vec<TimeSlot> {
    let step = duration.minutes();
    let end = window.end().minutes();
    let mut current = window.start().minutes();
    let mut slots = Vec::new();
    while current + step <= end {
        slots.push(slot_at(window, current, duration, professor_id, preferred));
        current += step;
    }
    slots
}

/// Slots laid end to end backward from the window end.
pub fn backward_fill(
    window: &AvailabilityWindow,
    duration: SlotDuration,
    professor_id: ProfessorId,
    preferred: bool,
) -> Vec<TimeSlot> {
    let step = duration.minutes();
    let start = window.start().minutes();
    let mut current = window.end().minutes();
    let mut slots = Vec::new();
    while current >= start + step {
        current -= step;
        slots.push(slot_at(window, current, duration, professor_id, preferred));
    }
    slots.reverse();
    slots
}

/// Union of the forward and backward fill, deduplicated and sorted.
///
/// A window whose length is an exact multiple of `duration` yields the
/// same slots from both directions, which collapse to one set.
pub fn window_slots(
    window: &AvailabilityWindow,
    duration: SlotDuration,
    professor_id: ProfessorId,
    preferred: bool,
) -> Vec<TimeSlot> {
    let mut set: BTreeSet<TimeSlot> = BTreeSet::new();
    set.extend(forward_fill(window, duration, professor_id, preferred));
    set.extend(backward_fill(window, duration, professor_id, preferred));
    set.into_iter().collect()
}

/// All candidate slots of one professor for the given duration.
///
/// A slot is preferred iff its day is one of the professor's preferred days.
pub fn professor_slots(professor: &Professor, duration: SlotDuration) -> Vec<TimeSlot> {
    let mut set: BTreeSet<TimeSlot> = BTreeSet::new();
    for window in professor.availability() {
        let preferred = professor.prefers(window.day());
        set.extend(window_slots(window, duration, professor.id, preferred));
    }
    set.into_iter().collect()
}

/// Candidate slots of a course: the union over its assigned professors.
///
/// An empty result is not an error here; the model builder rejects it.
pub fn course_slots(
    spec: &CourseSpec,
    professors: &HashMap<ProfessorId, &Professor>,
) -> Result<Vec<TimeSlot>> {
    let mut set: BTreeSet<TimeSlot> = BTreeSet::new();
    for &professor_id in &spec.professor_ids {
        let professor = professors.get(&professor_id).ok_or(
            ValidationError::UnknownProfessor {
                course: spec.id,
                professor: professor_id,
            },
        )?;
        set.extend(professor_slots(professor, spec.duration));
    }
    Ok(set.into_iter().collect())
}
