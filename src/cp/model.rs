//! CP model definition.

use super::variables::{BoolVar, BoolVarId, IntervalId, IntervalVar};

/// A constraint in the CP model.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Exactly one of the literals is true.
    ExactlyOne {
        literals: Vec<BoolVarId>,
    },

    /// Cumulative resource constraint.
    ///
    /// At any point, the summed demand of present intervals must not
    /// exceed the capacity.
    Cumulative {
        /// Interval variables.
        intervals: Vec<IntervalId>,
        /// Demand of each interval (parallel to `intervals`).
        demands: Vec<i64>,
        /// Maximum capacity.
        capacity: i64,
    },

    /// `lower <= sum(coef * literal) <= upper`; an absent bound is open.
    Linear {
        terms: Vec<(BoolVarId, i64)>,
        lower: Option<i64>,
        upper: Option<i64>,
    },
}

/// Objective function for the CP model.
#[derive(Debug, Clone)]
pub enum Objective {
    /// Maximize a weighted sum of literals.
    Maximize { terms: Vec<(BoolVarId, i64)> },

    /// Minimize a weighted sum of literals.
    Minimize { terms: Vec<(BoolVarId, i64)> },
}

/// A constraint programming model.
///
/// Contains variables, constraints, and an optional objective function.
/// Constraints may be added after a solve; the next solve sees them.
///
/// # Examples
///
/// ```
/// use u_timetable::cp::CpModel;
///
/// let mut model = CpModel::new("example");
/// let a = model.new_bool_var("a");
/// let b = model.new_bool_var("b");
/// let ia = model.new_optional_interval("ia", 0, 50, 50, a);
/// let ib = model.new_optional_interval("ib", 20, 50, 70, b);
/// model.add_exactly_one(vec![a, b]);
/// model.add_cumulative(vec![ia, ib], vec![1, 1], 1);
/// model.maximize(vec![(a, 1)]);
/// assert!(model.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct CpModel {
    /// Model name.
    pub name: String,
    bool_vars: Vec<BoolVar>,
    intervals: Vec<IntervalVar>,
    constraints: Vec<Constraint>,
    objective: Option<Objective>,
}

impl CpModel {
    /// Creates a new empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bool_vars: Vec::new(),
            intervals: Vec::new(),
            constraints: Vec::new(),
            objective: None,
        }
    }

    /// Adds a boolean variable.
    pub fn new_bool_var(&mut self, name: impl Into<String>) -> BoolVarId {
        self.bool_vars.push(BoolVar::new(name));
        BoolVarId(self.bool_vars.len() - 1)
    }

    /// Adds an interval variable.
    pub fn add_interval(&mut self, var: IntervalVar) -> IntervalId {
        self.intervals.push(var);
        IntervalId(self.intervals.len() - 1)
    }

    /// Adds an interval `[start, end)` that exists only when `presence` is true.
    pub fn new_optional_interval(
        &mut self,
        name: impl Into<String>,
        start: i64,
        size: i64,
        end: i64,
        presence: BoolVarId,
    ) -> IntervalId {
        self.add_interval(IntervalVar::new(name, start, size, end).as_optional(presence))
    }

    /// Adds a constraint.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Convenience: exactly one literal is true.
    pub fn add_exactly_one(&mut self, literals: Vec<BoolVarId>) {
        self.constraints.push(Constraint::ExactlyOne { literals });
    }

    /// Convenience: add a cumulative constraint.
    pub fn add_cumulative(&mut self, intervals: Vec<IntervalId>, demands: Vec<i64>, capacity: i64) {
        self.constraints.push(Constraint::Cumulative {
            intervals,
            demands,
            capacity,
        });
    }

    /// Convenience: add a linear constraint over weighted literals.
    pub fn add_linear(
        &mut self,
        terms: Vec<(BoolVarId, i64)>,
        lower: Option<i64>,
        upper: Option<i64>,
    ) {
        self.constraints.push(Constraint::Linear {
            terms,
            lower,
            upper,
        });
    }

    /// Sets a maximization objective.
    pub fn maximize(&mut self, terms: Vec<(BoolVarId, i64)>) {
        self.objective = Some(Objective::Maximize { terms });
    }

    /// Sets a minimization objective.
    pub fn minimize(&mut self, terms: Vec<(BoolVarId, i64)>) {
        self.objective = Some(Objective::Minimize { terms });
    }

    /// Sets the objective function.
    pub fn set_objective(&mut self, objective: Objective) {
        self.objective = Some(objective);
    }

    pub fn bool_var(&self, id: BoolVarId) -> Option<&BoolVar> {
        self.bool_vars.get(id.0)
    }

    pub fn interval(&self, id: IntervalId) -> Option<&IntervalVar> {
        self.intervals.get(id.0)
    }

    pub fn intervals(&self) -> &[IntervalVar] {
        &self.intervals
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    /// Returns the number of boolean variables.
    pub fn bool_count(&self) -> usize {
        self.bool_vars.len()
    }

    /// Returns the number of interval variables.
    pub fn interval_count(&self) -> usize {
        self.intervals.len()
    }

    /// Returns the number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Validates the model for consistency.
    ///
    /// Checks that every referenced variable exists and that intervals,
    /// demands, and bounds are well formed.
    pub fn validate(&self) -> Result<(), String> {
        let check_bool = |id: &BoolVarId| -> Result<(), String> {
            if id.0 >= self.bool_vars.len() {
                return Err(format!("undefined bool var: #{}", id.0));
            }
            Ok(())
        };

        for iv in &self.intervals {
            if iv.size < 0 || iv.start + iv.size != iv.end {
                return Err(format!(
                    "interval {}: start {} + size {} != end {}",
                    iv.name, iv.start, iv.size, iv.end
                ));
            }
            if let Some(p) = &iv.presence {
                check_bool(p)?;
            }
        }

        for constraint in &self.constraints {
            match constraint {
                Constraint::ExactlyOne { literals } => {
                    if literals.is_empty() {
                        return Err("exactly-one over no literals".into());
                    }
                    literals.iter().try_for_each(check_bool)?;
                }
                Constraint::Cumulative {
                    intervals,
                    demands,
                    capacity,
                } => {
                    if intervals.len() != demands.len() {
                        return Err("cumulative: intervals and demands length mismatch".into());
                    }
                    if *capacity < 0 || demands.iter().any(|&d| d < 0) {
                        return Err("cumulative: negative capacity or demand".into());
                    }
                    for id in intervals {
                        if id.0 >= self.intervals.len() {
                            return Err(format!("undefined interval: #{}", id.0));
                        }
                    }
                }
                Constraint::Linear {
                    terms,
                    lower,
                    upper,
                } => {
                    if let (Some(lo), Some(hi)) = (lower, upper) {
                        if lo > hi {
                            return Err(format!("linear: lower bound {lo} exceeds upper {hi}"));
                        }
                    }
                    terms.iter().try_for_each(|(id, _)| check_bool(id))?;
                }
            }
        }

        match &self.objective {
            Some(Objective::Maximize { terms }) | Some(Objective::Minimize { terms }) => {
                terms.iter().try_for_each(|(id, _)| check_bool(id))
            }
            None => Ok(()),
        }
    }

    /// Index of the first constraint `values` violates, if any.
    ///
    /// `values` is indexed by [`BoolVarId`]; missing entries read as false.
    /// Intended for validated models.
    pub fn violated_constraint(&self, values: &[bool]) -> Option<usize> {
        let value = |id: &BoolVarId| values.get(id.0).copied().unwrap_or(false);
        let weighted = |terms: &[(BoolVarId, i64)]| -> i64 {
            terms.iter().filter(|(id, _)| value(id)).map(|(_, c)| c).sum()
        };

        self.constraints.iter().position(|constraint| match constraint {
            Constraint::ExactlyOne { literals } => {
                literals.iter().filter(|id| value(*id)).count() != 1
            }
            Constraint::Cumulative {
                intervals,
                demands,
                capacity,
            } => {
                let active: Vec<(&IntervalVar, i64)> = intervals
                    .iter()
                    .zip(demands)
                    .filter_map(|(id, &demand)| {
                        let iv = self.intervals.get(id.0)?;
                        let present = iv.presence.as_ref().map_or(true, value);
                        (present && iv.size > 0 && demand > 0).then_some((iv, demand))
                    })
                    .collect();
                active.iter().any(|(iv, _)| {
                    let load: i64 = active
                        .iter()
                        .filter(|(other, _)| other.covers(iv.start))
                        .map(|(_, d)| d)
                        .sum();
                    load > *capacity
                })
            }
            Constraint::Linear {
                terms,
                lower,
                upper,
            } => {
                let sum = weighted(terms);
                lower.is_some_and(|lo| sum < lo) || upper.is_some_and(|hi| sum > hi)
            }
        })
    }

    /// Objective value of `values` (0 without an objective).
    pub fn objective_value(&self, values: &[bool]) -> i64 {
        let value = |id: &BoolVarId| values.get(id.0).copied().unwrap_or(false);
        match &self.objective {
            Some(Objective::Maximize { terms }) | Some(Objective::Minimize { terms }) => terms
                .iter()
                .filter(|(id, _)| value(id))
                .map(|(_, c)| c)
                .sum(),
            None => 0,
        }
    }
}
