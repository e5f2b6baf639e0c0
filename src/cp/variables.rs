//! CP variable types.
//!
//! Variables live in arenas owned by [`CpModel`](super::CpModel) and are
//! referred to by stable, copyable indices.

/// Index of a boolean variable within its model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoolVarId(pub(crate) usize);

impl BoolVarId {
    /// Position in the model's boolean arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of an interval variable within its model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntervalId(pub(crate) usize);

impl IntervalId {
    /// Position in the model's interval arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A boolean variable (true/false decision).
#[derive(Debug, Clone)]
pub struct BoolVar {
    /// Variable name, used in diagnostics.
    pub name: String,
}

impl BoolVar {
    /// Creates a new boolean variable.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A fixed-position interval `[start, end)` on an integer axis.
///
/// The interval is optional when it carries a presence literal: it
/// exists (and consumes resources) only when that literal is true.
///
/// # Examples
///
/// ```
/// use u_timetable::cp::IntervalVar;
///
/// let lecture = IntervalVar::new("lecture", 30_480, 90, 30_570);
/// assert_eq!(lecture.size, 90);
/// assert!(!lecture.is_optional());
/// ```
#[derive(Debug, Clone)]
pub struct IntervalVar {
    /// Variable name.
    pub name: String,
    /// Start point (inclusive).
    pub start: i64,
    /// Length; `start + size == end`.
    pub size: i64,
    /// End point (exclusive).
    pub end: i64,
    /// Presence literal (for optional intervals).
    pub presence: Option<BoolVarId>,
}

impl IntervalVar {
    /// Creates a mandatory interval.
    pub fn new(name: impl Into<String>, start: i64, size: i64, end: i64) -> Self {
        Self {
            name: name.into(),
            start,
            size,
            end,
            presence: None,
        }
    }

    /// Makes this interval optional on `presence`.
    pub fn as_optional(mut self, presence: BoolVarId) -> Self {
        self.presence = Some(presence);
        self
    }

    /// Whether this interval has a presence literal.
    #[inline]
    pub fn is_optional(&self) -> bool {
        self.presence.is_some()
    }

    /// Whether `point` lies in `[start, end)`.
    #[inline]
    pub fn covers(&self, point: i64) -> bool {
        self.start <= point && point < self.end
    }

    /// Whether two intervals share any point.
    #[inline]
    pub fn overlaps(&self, other: &IntervalVar) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_var() {
        let b = BoolVar::new("flag");
        assert_eq!(b.name, "flag");
    }

    #[test]
    fn test_interval_var() {
        let iv = IntervalVar::new("op1", 10, 50, 60);
        assert_eq!(iv.name, "op1");
        assert!(iv.covers(10));
        assert!(iv.covers(59));
        assert!(!iv.covers(60));
        assert!(!iv.is_optional());
    }

    #[test]
    fn test_optional_interval() {
        let iv = IntervalVar::new("op1", 0, 5, 5).as_optional(BoolVarId(3));
        assert!(iv.is_optional());
        assert_eq!(iv.presence, Some(BoolVarId(3)));
    }

    #[test]
    fn test_overlap_is_half_open() {
        let a = IntervalVar::new("a", 0, 10, 10);
        let b = IntervalVar::new("b", 10, 10, 20);
        let c = IntervalVar::new("c", 5, 10, 15);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
    }
}
