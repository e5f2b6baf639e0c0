//! Exact branch-and-bound solver over boolean models.
//!
//! Search branches on unresolved exactly-one groups (fewest open literals
//! first) and then on any remaining free literal. Every assignment is
//! propagated through:
//!
//! - **exactly-one**: a true literal falsifies its siblings; a group with a
//!   single open literal and no true one forces it.
//! - **cumulative**: a newly present interval must fit under capacity, and
//!   open overlapping intervals that no longer fit are made absent.
//! - **linear**: bounds are kept on the fixed part plus the optimistic and
//!   pessimistic rest, and literals whose value is implied are fixed.
//!
//! Subtrees whose optimistic objective cannot beat the incumbent are
//! pruned. Candidates of equal objective weight are visited in a seeded
//! random order, so the seed decides which of several equally good
//! assignments is reported.
//!
//! # Reference
//! Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming", Ch. 4

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, warn};

use super::model::{Constraint, CpModel, Objective};
use super::solver::{CpSolution, CpSolver, SolverConfig, SolverStatus};

const DEFAULT_SEED: u64 = 42;
const CLOCK_CHECK_INTERVAL: u64 = 256;
const NO_INCUMBENT: i64 = i64::MIN;

struct Member {
    start: i64,
    end: i64,
    demand: i64,
    presence: Option<usize>,
}

impl Member {
    #[inline]
    fn overlaps(&self, other: &Member) -> bool {
        self.start < other.end && other.start < self.end
    }
}

struct Cumulative {
    members: Vec<Member>,
    /// Per member: indices of the other members overlapping it.
    neighbors: Vec<Vec<usize>>,
    capacity: i64,
}

impl Cumulative {
    fn new(members: Vec<Member>, capacity: i64) -> Self {
        let mut order: Vec<usize> = (0..members.len()).collect();
        order.sort_by_key(|&m| members[m].start);
        let mut neighbors = vec![Vec::new(); members.len()];
        for (i, &a) in order.iter().enumerate() {
            for &b in &order[i + 1..] {
                if members[b].start >= members[a].end {
                    break;
                }
                if members[a].overlaps(&members[b]) {
                    neighbors[a].push(b);
                    neighbors[b].push(a);
                }
            }
        }
        Self {
            members,
            neighbors,
            capacity,
        }
    }
}

struct Linear {
    terms: Vec<(usize, i64)>,
    lower: Option<i64>,
    upper: Option<i64>,
}

/// Constraint network indexed by literal.
struct Compiled {
    groups: Vec<Vec<usize>>,
    var_groups: Vec<Vec<usize>>,
    free_vars: Vec<usize>,
    cumulatives: Vec<Cumulative>,
    var_cumulatives: Vec<Vec<(usize, usize)>>,
    linears: Vec<Linear>,
    var_linears: Vec<Vec<(usize, i64)>>,
    /// Objective weights in maximization sense.
    weights: Vec<i64>,
}

impl Compiled {
    fn new(model: &CpModel, rng: &mut StdRng) -> Self {
        let n = model.bool_count();
        let mut weights = vec![0i64; n];
        match model.objective() {
            Some(Objective::Maximize { terms }) => {
                for &(v, w) in terms {
                    weights[v.index()] += w;
                }
            }
            Some(Objective::Minimize { terms }) => {
                for &(v, w) in terms {
                    weights[v.index()] -= w;
                }
            }
            None => {}
        }

        let mut groups = Vec::new();
        let mut var_groups = vec![Vec::new(); n];
        let mut cumulatives = Vec::new();
        let mut var_cumulatives = vec![Vec::new(); n];
        let mut linears = Vec::new();
        let mut var_linears = vec![Vec::new(); n];

        for constraint in model.constraints() {
            match constraint {
                Constraint::ExactlyOne { literals } => {
                    let mut members: Vec<usize> = literals.iter().map(|l| l.index()).collect();
                    members.sort_unstable();
                    members.dedup();
                    members.shuffle(rng);
                    // Stable: ties keep the shuffled order.
                    members.sort_by_key(|&v| std::cmp::Reverse(weights[v]));
                    let g = groups.len();
                    for &v in &members {
                        var_groups[v].push(g);
                    }
                    groups.push(members);
                }
                Constraint::Cumulative {
                    intervals,
                    demands,
                    capacity,
                } => {
                    let c = cumulatives.len();
                    let mut members = Vec::with_capacity(intervals.len());
                    for (id, &demand) in intervals.iter().zip(demands) {
                        let iv = &model.intervals()[id.index()];
                        if demand == 0 || iv.size == 0 {
                            continue;
                        }
                        let presence = iv.presence.map(|p| p.index());
                        if let Some(p) = presence {
                            var_cumulatives[p].push((c, members.len()));
                        }
                        members.push(Member {
                            start: iv.start,
                            end: iv.end,
                            demand,
                            presence,
                        });
                    }
                    cumulatives.push(Cumulative::new(members, *capacity));
                }
                Constraint::Linear {
                    terms,
                    lower,
                    upper,
                } => {
                    let mut merged: BTreeMap<usize, i64> = BTreeMap::new();
                    for &(v, coef) in terms {
                        *merged.entry(v.index()).or_insert(0) += coef;
                    }
                    let l = linears.len();
                    let terms: Vec<(usize, i64)> =
                        merged.into_iter().filter(|&(_, coef)| coef != 0).collect();
                    for &(v, coef) in &terms {
                        var_linears[v].push((l, coef));
                    }
                    linears.push(Linear {
                        terms,
                        lower: *lower,
                        upper: *upper,
                    });
                }
            }
        }

        let free_vars = (0..n).filter(|&v| var_groups[v].is_empty()).collect();

        Self {
            groups,
            var_groups,
            free_vars,
            cumulatives,
            var_cumulatives,
            linears,
            var_linears,
            weights,
        }
    }
}

/// State shared by every search worker of one solve call.
struct Shared {
    incumbent: AtomicI64,
    stop: AtomicBool,
    timed_out: AtomicBool,
    deadline: Instant,
    stop_after_first: bool,
}

impl Shared {
    fn best(&self) -> Option<i64> {
        let best = self.incumbent.load(Ordering::Relaxed);
        (best != NO_INCUMBENT).then_some(best)
    }

    fn halted(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }
}

#[derive(Clone)]
struct State {
    values: Vec<Option<bool>>,
    trail: Vec<usize>,
    /// Per linear: sum of coefficients of literals fixed true.
    fixed: Vec<i64>,
    /// Per linear: sum of negative coefficients of open literals.
    min_rest: Vec<i64>,
    /// Per linear: sum of positive coefficients of open literals.
    max_rest: Vec<i64>,
    objective: i64,
}

impl State {
    fn new(compiled: &Compiled, n: usize) -> Self {
        let min_rest = compiled
            .linears
            .iter()
            .map(|lin| lin.terms.iter().map(|&(_, c)| c.min(0)).sum())
            .collect();
        let max_rest = compiled
            .linears
            .iter()
            .map(|lin| lin.terms.iter().map(|&(_, c)| c.max(0)).sum())
            .collect();
        Self {
            values: vec![None; n],
            trail: Vec::with_capacity(n),
            fixed: vec![0; compiled.linears.len()],
            min_rest,
            max_rest,
            objective: 0,
        }
    }
}

enum Branch {
    Leaf,
    Group(usize),
    Free(usize),
}

type Incumbent = Option<(i64, Vec<bool>)>;

struct Search<'a> {
    compiled: &'a Compiled,
    shared: &'a Shared,
    state: State,
    queue: Vec<usize>,
    best: Incumbent,
    nodes: u64,
}

impl<'a> Search<'a> {
    fn new(compiled: &'a Compiled, shared: &'a Shared, state: State) -> Self {
        Self {
            compiled,
            shared,
            state,
            queue: Vec::new(),
            best: None,
            nodes: 0,
        }
    }

    /// Fixes `var`; false if it already holds the opposite value.
    fn assign(&mut self, var: usize, value: bool) -> bool {
        if let Some(current) = self.state.values[var] {
            return current == value;
        }
        let compiled = self.compiled;
        self.state.values[var] = Some(value);
        self.state.trail.push(var);
        for &(l, coef) in &compiled.var_linears[var] {
            if coef > 0 {
                self.state.max_rest[l] -= coef;
            } else {
                self.state.min_rest[l] -= coef;
            }
            if value {
                self.state.fixed[l] += coef;
            }
        }
        if value {
            self.state.objective += compiled.weights[var];
        }
        self.queue.push(var);
        true
    }

    fn undo(&mut self, mark: usize) {
        let compiled = self.compiled;
        self.queue.clear();
        while self.state.trail.len() > mark {
            let Some(var) = self.state.trail.pop() else {
                break;
            };
            let value = self.state.values[var].take() == Some(true);
            for &(l, coef) in &compiled.var_linears[var] {
                if coef > 0 {
                    self.state.max_rest[l] += coef;
                } else {
                    self.state.min_rest[l] += coef;
                }
                if value {
                    self.state.fixed[l] -= coef;
                }
            }
            if value {
                self.state.objective -= compiled.weights[var];
            }
        }
    }

    fn fail(&mut self) -> bool {
        self.queue.clear();
        false
    }

    fn is_active(&self, member: &Member) -> bool {
        member
            .presence
            .map_or(true, |p| self.state.values[p] == Some(true))
    }

    /// Whether member `m` of cumulative `c` fits beside the other active members.
    ///
    /// Load peaks inside `m` sit at its start or at the start of an
    /// overlapping member, and only overlapping members contribute there.
    fn fits(&self, c: usize, m: usize) -> bool {
        let cumulative = &self.compiled.cumulatives[c];
        let member = &cumulative.members[m];
        let active: Vec<&Member> = cumulative.neighbors[m]
            .iter()
            .map(|&k| &cumulative.members[k])
            .filter(|other| self.is_active(other))
            .collect();
        let load_at = |point: i64| -> i64 {
            member.demand
                + active
                    .iter()
                    .filter(|other| other.start <= point && point < other.end)
                    .map(|other| other.demand)
                    .sum::<i64>()
        };
        if load_at(member.start) > cumulative.capacity {
            return false;
        }
        active
            .iter()
            .filter(|other| other.start > member.start)
            .all(|other| load_at(other.start) <= cumulative.capacity)
    }

    fn propagate_group(&mut self, g: usize) -> bool {
        let compiled = self.compiled;
        let mut open = None;
        let mut open_count = 0;
        for &v in &compiled.groups[g] {
            match self.state.values[v] {
                Some(true) => return true,
                Some(false) => {}
                None => {
                    open_count += 1;
                    open = Some(v);
                }
            }
        }
        match (open_count, open) {
            (0, _) => false,
            (1, Some(v)) => self.assign(v, true),
            _ => true,
        }
    }

    fn propagate_linear(&mut self, l: usize) -> bool {
        let compiled = self.compiled;
        let lin = &compiled.linears[l];
        for &(v, c) in &lin.terms {
            let fixed = self.state.fixed[l];
            let lo = self.state.min_rest[l];
            let hi = self.state.max_rest[l];
            if lin.upper.is_some_and(|upper| fixed + lo > upper)
                || lin.lower.is_some_and(|lower| fixed + hi < lower)
            {
                return false;
            }
            if self.state.values[v].is_some() {
                continue;
            }
            let forced = if c > 0 {
                if lin.lower.is_some_and(|lower| fixed + hi - c < lower) {
                    Some(true)
                } else if lin.upper.is_some_and(|upper| fixed + c + lo > upper) {
                    Some(false)
                } else {
                    None
                }
            } else if lin.lower.is_some_and(|lower| fixed + c + hi < lower) {
                Some(false)
            } else if lin.upper.is_some_and(|upper| fixed + lo - c > upper) {
                Some(true)
            } else {
                None
            };
            if let Some(value) = forced {
                if !self.assign(v, value) {
                    return false;
                }
            }
        }
        let fixed = self.state.fixed[l];
        !(lin
            .upper
            .is_some_and(|upper| fixed + self.state.min_rest[l] > upper)
            || lin
                .lower
                .is_some_and(|lower| fixed + self.state.max_rest[l] < lower))
    }

    /// Runs queued assignments to a fixpoint; false on conflict.
    fn propagate(&mut self) -> bool {
        let compiled = self.compiled;
        while let Some(var) = self.queue.pop() {
            if self.state.values[var] == Some(true) {
                for &g in &compiled.var_groups[var] {
                    for &other in &compiled.groups[g] {
                        if other != var && !self.assign(other, false) {
                            return self.fail();
                        }
                    }
                }
                for &(c, m) in &compiled.var_cumulatives[var] {
                    if !self.fits(c, m) {
                        return self.fail();
                    }
                    let cumulative = &compiled.cumulatives[c];
                    let member = &cumulative.members[m];
                    for &k in &cumulative.neighbors[m] {
                        let other = &cumulative.members[k];
                        let Some(p) = other.presence else {
                            continue;
                        };
                        if self.state.values[p].is_some() {
                            continue;
                        }
                        let excluded = member.demand + other.demand > cumulative.capacity
                            || !self.fits(c, k);
                        if excluded && !self.assign(p, false) {
                            return self.fail();
                        }
                    }
                }
            } else {
                for &g in &compiled.var_groups[var] {
                    if !self.propagate_group(g) {
                        return self.fail();
                    }
                }
            }
            for &(l, _) in &compiled.var_linears[var] {
                if !self.propagate_linear(l) {
                    return self.fail();
                }
            }
        }
        true
    }

    /// Root propagation; false if the model is infeasible outright.
    fn initialize(&mut self) -> bool {
        let compiled = self.compiled;
        for (c, cumulative) in compiled.cumulatives.iter().enumerate() {
            for (m, member) in cumulative.members.iter().enumerate() {
                match member.presence {
                    None => {
                        if !self.fits(c, m) {
                            return false;
                        }
                    }
                    Some(p) => {
                        if self.state.values[p].is_none()
                            && !self.fits(c, m)
                            && !self.assign(p, false)
                        {
                            return false;
                        }
                    }
                }
            }
        }
        for g in 0..compiled.groups.len() {
            if !self.propagate_group(g) {
                return false;
            }
        }
        for l in 0..compiled.linears.len() {
            if !self.propagate_linear(l) {
                return false;
            }
        }
        self.propagate()
    }

    /// Optimistic objective of any completion of the current state.
    fn bound(&self) -> i64 {
        let compiled = self.compiled;
        let mut bound = self.state.objective;
        for members in &compiled.groups {
            let mut best = 0;
            let mut resolved = false;
            for &v in members {
                match self.state.values[v] {
                    Some(true) => {
                        resolved = true;
                        break;
                    }
                    None => best = best.max(compiled.weights[v]),
                    Some(false) => {}
                }
            }
            if !resolved {
                bound += best;
            }
        }
        for &v in &compiled.free_vars {
            if self.state.values[v].is_none() {
                bound += compiled.weights[v].max(0);
            }
        }
        bound
    }

    fn pick_branch(&self) -> Branch {
        let compiled = self.compiled;
        let mut choice: Option<(usize, usize)> = None;
        for (g, members) in compiled.groups.iter().enumerate() {
            let mut open = 0;
            let mut resolved = false;
            for &v in members {
                match self.state.values[v] {
                    Some(true) => {
                        resolved = true;
                        break;
                    }
                    None => open += 1,
                    Some(false) => {}
                }
            }
            if !resolved && choice.map_or(true, |(_, fewest)| open < fewest) {
                choice = Some((g, open));
            }
        }
        if let Some((g, _)) = choice {
            return Branch::Group(g);
        }
        match compiled
            .free_vars
            .iter()
            .find(|&&v| self.state.values[v].is_none())
        {
            Some(&v) => Branch::Free(v),
            None => Branch::Leaf,
        }
    }

    fn should_stop(&mut self) -> bool {
        self.nodes += 1;
        if self.shared.halted() {
            return true;
        }
        if self.nodes % CLOCK_CHECK_INTERVAL == 0 && Instant::now() >= self.shared.deadline {
            self.shared.timed_out.store(true, Ordering::Relaxed);
            self.shared.stop.store(true, Ordering::Relaxed);
            return true;
        }
        false
    }

    fn record(&mut self) {
        let objective = self.state.objective;
        if self.best.as_ref().map_or(true, |(best, _)| objective > *best) {
            let values = self.state.values.iter().map(|v| *v == Some(true)).collect();
            self.best = Some((objective, values));
        }
        self.shared.incumbent.fetch_max(objective, Ordering::Relaxed);
        if self.shared.stop_after_first {
            self.shared.stop.store(true, Ordering::Relaxed);
        }
    }

    fn try_branch(&mut self, var: usize, value: bool) {
        let mark = self.state.trail.len();
        if self.assign(var, value) && self.propagate() {
            self.dfs();
        }
        self.undo(mark);
    }

    fn dfs(&mut self) {
        if self.should_stop() {
            return;
        }
        if let Some(best) = self.shared.best() {
            if self.bound() <= best {
                return;
            }
        }
        match self.pick_branch() {
            Branch::Leaf => self.record(),
            Branch::Group(g) => {
                let candidates: Vec<usize> = self.compiled.groups[g]
                    .iter()
                    .copied()
                    .filter(|&v| self.state.values[v].is_none())
                    .collect();
                for var in candidates {
                    self.try_branch(var, true);
                    if self.shared.halted() {
                        return;
                    }
                }
            }
            Branch::Free(var) => {
                let first = self.compiled.weights[var] > 0;
                for value in [first, !first] {
                    self.try_branch(var, value);
                    if self.shared.halted() {
                        return;
                    }
                }
            }
        }
    }
}

fn merge_incumbents(results: impl IntoIterator<Item = (Incumbent, u64)>) -> (Incumbent, u64) {
    let mut best: Incumbent = None;
    let mut nodes = 0;
    for (candidate, explored) in results {
        nodes += explored;
        if let Some((objective, values)) = candidate {
            if best.as_ref().map_or(true, |(b, _)| objective > *b) {
                best = Some((objective, values));
            }
        }
    }
    (best, nodes)
}

#[cfg(feature = "parallel")]
fn split_root(root: Search<'_>, group: usize, workers: usize) -> (Incumbent, u64) {
    use rayon::prelude::*;

    let compiled = root.compiled;
    let shared = root.shared;
    let state = &root.state;
    let candidates: Vec<usize> = compiled.groups[group]
        .iter()
        .copied()
        .filter(|&v| state.values[v].is_none())
        .collect();

    let explore = |&var: &usize| {
        let mut worker = Search::new(compiled, shared, state.clone());
        worker.try_branch(var, true);
        (worker.best, worker.nodes)
    };

    let results: Vec<(Incumbent, u64)> =
        match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
            Ok(pool) => pool.install(|| candidates.par_iter().map(explore).collect()),
            Err(e) => {
                warn!(error = %e, "could not start search pool, exploring sequentially");
                candidates.iter().map(explore).collect()
            }
        };
    let (best, nodes) = merge_incumbents(results);
    (best, nodes + root.nodes)
}

fn run_search(mut root: Search<'_>, workers: usize) -> (Incumbent, u64) {
    #[cfg(feature = "parallel")]
    {
        if workers > 1 {
            if let Branch::Group(g) = root.pick_branch() {
                return split_root(root, g, workers);
            }
        }
    }
    let _ = workers;
    root.dfs();
    merge_incumbents([(root.best, root.nodes)])
}

/// Exact branch-and-bound solver.
///
/// Complete for the boolean models this crate builds: exactly-one,
/// cumulative over fixed-position optional intervals, and linear
/// constraints over literals, with a linear objective.
///
/// With the `parallel` feature and `num_workers > 1`, the branches of the
/// root decision are explored on a rayon pool sharing one incumbent bound.
///
/// # Instance size
///
/// The objective bound only counts the best open literal of each
/// unresolved exactly-one group, so it ignores competition for the same
/// preferred time between courses of one cohort or professor. Proving
/// optimality is fast up to a few dozen courses. Beyond that the search
/// usually finds a good assignment early but then runs to
/// `time_limit_ms`, returning it as [`SolverStatus::Feasible`]. For large
/// instances set a time limit per solve (or `stop_after_first`) sized to
/// the number of solutions requested.
pub struct BranchAndBoundSolver;

impl BranchAndBoundSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BranchAndBoundSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl CpSolver for BranchAndBoundSolver {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        let started = Instant::now();
        if let Err(reason) = model.validate() {
            warn!(model = %model.name, %reason, "rejecting invalid model");
            return CpSolution::empty(SolverStatus::ModelInvalid);
        }

        let mut rng = StdRng::seed_from_u64(config.seed.unwrap_or(DEFAULT_SEED));
        let compiled = Compiled::new(model, &mut rng);
        let shared = Shared {
            incumbent: AtomicI64::new(NO_INCUMBENT),
            stop: AtomicBool::new(false),
            timed_out: AtomicBool::new(false),
            deadline: started + Duration::from_millis(config.time_limit_ms),
            stop_after_first: config.stop_after_first,
        };

        let mut root = Search::new(&compiled, &shared, State::new(&compiled, model.bool_count()));
        let (best, branches) = if root.initialize() {
            run_search(root, config.num_workers.max(1))
        } else {
            (None, 0)
        };

        let timed_out = shared.timed_out.load(Ordering::Relaxed);
        let status = match (&best, timed_out) {
            (Some(_), false) if !config.stop_after_first => SolverStatus::Optimal,
            (Some(_), _) => SolverStatus::Feasible,
            (None, false) => SolverStatus::Infeasible,
            (None, true) => SolverStatus::Unknown,
        };

        let solve_time_ms = started.elapsed().as_millis() as u64;
        debug!(
            model = %model.name,
            ?status,
            branches,
            solve_time_ms,
            "search finished"
        );

        let has_objective = model.objective().is_some();
        match best {
            Some((_, values)) => CpSolution {
                status,
                objective_value: has_objective.then(|| model.objective_value(&values)),
                values,
                solve_time_ms,
                branches,
            },
            None => CpSolution {
                solve_time_ms,
                branches,
                ..CpSolution::empty(status)
            },
        }
    }
}
