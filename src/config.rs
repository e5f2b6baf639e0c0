//! Request-level solver settings.
//!
//! [`SolverSettings`] carries the switches the surrounding system sends
//! with every solve request, plus the engine budget forwarded to the
//! [`SolverConfig`] of each solve call.

use serde::{Deserialize, Serialize};

use crate::cp::SolverConfig;
use crate::error::{Result, TimetableError};

/// Settings for one timetabling request.
///
/// # Defaults
///
/// ```
/// use u_timetable::config::SolverSettings;
///
/// let settings = SolverSettings::default();
/// assert_eq!(settings.number_of_solutions, 1);
/// assert!(settings.classroom_limitation);
/// assert!(settings.professor_hour_limits);
/// assert!(!settings.debug);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_timetable::config::SolverSettings;
///
/// let settings = SolverSettings::default()
///     .with_number_of_solutions(5)
///     .with_classroom_limitation(false)
///     .with_time_limit_ms(2_000);
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverSettings {
    /// How many distinct timetables to enumerate.
    pub number_of_solutions: usize,

    /// Enforce classroom-category concurrent capacity.
    #[serde(default = "enabled")]
    pub classroom_limitation: bool,

    /// Enforce professor minimum/maximum weekly hours.
    #[serde(default = "enabled", alias = "professor_min_max_time_limitation")]
    pub professor_hour_limits: bool,

    /// Re-check feasibility after every constraint group and report the
    /// first group that breaks it.
    #[serde(default)]
    pub debug: bool,

    /// Wall-clock budget of each engine call, in milliseconds.
    #[serde(default = "default_time_limit_ms")]
    pub time_limit_ms: u64,

    /// Engine search workers (only effective with the `parallel` feature).
    #[serde(default = "default_workers")]
    pub num_workers: usize,

    /// Seed for the engine's tie-breaking order.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn enabled() -> bool {
    true
}

fn default_time_limit_ms() -> u64 {
    60_000
}

fn default_workers() -> usize {
    1
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            number_of_solutions: 1,
            classroom_limitation: true,
            professor_hour_limits: true,
            debug: false,
            time_limit_ms: default_time_limit_ms(),
            num_workers: default_workers(),
            seed: None,
        }
    }
}

impl SolverSettings {
    pub fn with_number_of_solutions(mut self, n: usize) -> Self {
        self.number_of_solutions = n;
        self
    }

    pub fn with_classroom_limitation(mut self, enabled: bool) -> Self {
        self.classroom_limitation = enabled;
        self
    }

    pub fn with_professor_hour_limits(mut self, enabled: bool) -> Self {
        self.professor_hour_limits = enabled;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    pub fn with_num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Engine configuration for each solve call.
    pub fn engine_config(&self) -> SolverConfig {
        let config = SolverConfig::default()
            .with_time_limit_ms(self.time_limit_ms)
            .with_num_workers(self.num_workers);
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }

    /// Validates the settings.
    pub fn validate(&self) -> Result<()> {
        if self.number_of_solutions == 0 {
            return Err(TimetableError::Config(
                "number_of_solutions must be at least 1".into(),
            ));
        }
        self.engine_config().validate().map_err(TimetableError::Config)
    }
}
