//! Constraint-based candidate selection.
//!
//! Some labels need exclusivity beyond "one block, one label": at most one
//! progress bar per page, each part inside at most one parts list, a step
//! may not reuse another step's diagram. Those classifiers model their
//! candidates as boolean variables of a small 0/1 integer program and keep
//! the assignment that maximizes the total score.
//!
//! The model supports linear constraints over sums of variables and an
//! integer objective. [`ConstraintModel::solve`] runs a depth-first
//! branch-and-bound that:
//!
//! - splits the model into independent components first,
//! - branches on the highest weight variable first,
//! - prunes on the optimistic objective bound,
//! - prunes on the activity bounds of every constraint the assigned variable
//!   appears in.
//!
//! The search is bounded by [`SolverLimits::max_nodes`]. When the budget runs
//! out the best complete assignment found so far is returned as
//! [`SolveStatus::Feasible`]. Components the search never reached are
//! filled greedily, so one hard component does not discard the others.
//!
//! ```
//! use instruction_oxide::solver::{ConstraintModel, SolveStatus, SolverLimits};
//!
//! let mut model = ConstraintModel::new();
//! let a = model.add_var(0.9);
//! let b = model.add_var(0.6);
//! let c = model.add_var(0.5);
//! model.at_most_one_of(&[a, b]);
//! model.at_most_one_of(&[a, c]);
//!
//! let solution = model.solve(&SolverLimits::default());
//! assert_eq!(solution.status, SolveStatus::Optimal);
//! // b + c (1.1) beats a alone (0.9)
//! assert!(!solution.is_selected(a));
//! assert!(solution.is_selected(b) && solution.is_selected(c));
//! ```

use crate::blocks::BlockId;
use crate::classification::union_find::UnionFind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Factor applied to `[0, 1]` scores to obtain integer weights.
pub const SCORE_SCALE: f64 = 1000.0;

/// Search budget of the solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverLimits {
    /// Maximum number of search nodes per solve
    pub max_nodes: u64,
}

impl Default for SolverLimits {
    fn default() -> Self {
        Self { max_nodes: 200_000 }
    }
}

impl SolverLimits {
    /// Set the node budget.
    pub fn with_max_nodes(mut self, max_nodes: u64) -> Self {
        self.max_nodes = max_nodes;
        self
    }
}

/// A boolean decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var(usize);

impl Var {
    /// Position of the variable in creation order.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Comparison of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    /// `sum <= rhs`
    Le,
    /// `sum >= rhs`
    Ge,
    /// `sum == rhs`
    Eq,
}

#[derive(Debug, Clone)]
struct Constraint {
    terms: Vec<(usize, i64)>,
    cmp: Cmp,
    rhs: i64,
}

/// Outcome class of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    /// Proven best assignment
    Optimal,
    /// Valid assignment; the budget ran out before optimality was proven
    Feasible,
    /// No valid assignment (or none found within the budget)
    Infeasible,
}

/// Result of [`ConstraintModel::solve`].
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Outcome class
    pub status: SolveStatus,
    /// Objective of the assignment
    pub objective: i64,
    /// Search nodes visited
    pub nodes: u64,
    values: Vec<bool>,
}

impl Solution {
    /// Whether the variable is selected. Always false when infeasible.
    pub fn is_selected(&self, var: Var) -> bool {
        self.values.get(var.0).copied().unwrap_or(false)
    }

    /// Selected variables, in creation order.
    pub fn selected(&self) -> Vec<Var> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, &v)| v)
            .map(|(i, _)| Var(i))
            .collect()
    }

    /// Whether an assignment is available.
    pub fn has_assignment(&self) -> bool {
        self.status != SolveStatus::Infeasible
    }
}

/// A 0/1 integer program maximizing the weighted sum of selected variables.
#[derive(Debug, Clone, Default)]
pub struct ConstraintModel {
    weights: Vec<i64>,
    constraints: Vec<Constraint>,
}

impl ConstraintModel {
    /// An empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable whose selection contributes `score` to the objective.
    pub fn add_var(&mut self, score: f64) -> Var {
        self.add_weighted_var((score * SCORE_SCALE).round() as i64)
    }

    /// Add a variable with an integer objective weight.
    pub fn add_weighted_var(&mut self, weight: i64) -> Var {
        self.weights.push(weight);
        Var(self.weights.len() - 1)
    }

    /// Number of variables.
    pub fn num_vars(&self) -> usize {
        self.weights.len()
    }

    /// Number of constraints.
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Add `sum(coef * var) <cmp> rhs`. Repeated variables are merged.
    pub fn add_linear(&mut self, terms: &[(Var, i64)], cmp: Cmp, rhs: i64) {
        let mut merged: BTreeMap<usize, i64> = BTreeMap::new();
        for &(var, coef) in terms {
            *merged.entry(var.0).or_default() += coef;
        }
        let terms = merged.into_iter().filter(|&(_, c)| c != 0).collect();
        self.constraints.push(Constraint { terms, cmp, rhs });
    }

    /// At most one of `vars` is selected.
    pub fn at_most_one_of(&mut self, vars: &[Var]) {
        if vars.len() > 1 {
            let terms: Vec<(Var, i64)> = vars.iter().map(|&v| (v, 1)).collect();
            self.add_linear(&terms, Cmp::Le, 1);
        }
    }

    /// Exactly one of `vars` is selected.
    pub fn exactly_one_of(&mut self, vars: &[Var]) {
        let terms: Vec<(Var, i64)> = vars.iter().map(|&v| (v, 1)).collect();
        self.add_linear(&terms, Cmp::Eq, 1);
    }

    /// Selecting `parent` forces every child to be selected.
    pub fn implies(&mut self, parent: Var, children: &[Var]) {
        for &child in children {
            self.add_linear(&[(child, 1), (parent, -1)], Cmp::Ge, 0);
        }
    }

    /// Selecting any variable of `group_a` requires at least one of
    /// `group_b`.
    pub fn if_any_then_one_of(&mut self, group_a: &[Var], group_b: &[Var]) {
        for &a in group_a {
            let mut terms: Vec<(Var, i64)> = group_b.iter().map(|&b| (b, 1)).collect();
            terms.push((a, -1));
            self.add_linear(&terms, Cmp::Ge, 0);
        }
    }

    /// For every block claimed by more than one variable, select at most
    /// one of the claimants.
    pub fn exclusive_blocks<'b, I>(&mut self, claims: I)
    where
        I: IntoIterator<Item = (Var, &'b [BlockId])>,
    {
        let mut by_block: BTreeMap<BlockId, Vec<Var>> = BTreeMap::new();
        for (var, blocks) in claims {
            for &block in blocks {
                let vars = by_block.entry(block).or_default();
                if !vars.contains(&var) {
                    vars.push(var);
                }
            }
        }
        for vars in by_block.values() {
            self.at_most_one_of(vars);
        }
    }

    /// Maximize the objective subject to every constraint.
    pub fn solve(&self, limits: &SolverLimits) -> Solution {
        let n = self.weights.len();
        let mut var_terms: Vec<Vec<(usize, i64)>> = vec![Vec::new(); n];
        let mut uf = UnionFind::new(n);
        for (ci, c) in self.constraints.iter().enumerate() {
            for &(v, coef) in &c.terms {
                var_terms[v].push((ci, coef));
            }
            for pair in c.terms.windows(2) {
                uf.union(pair[0].0, pair[1].0);
            }
        }

        let mut search = Search {
            model: self,
            var_terms: &var_terms,
            lo: self
                .constraints
                .iter()
                .map(|c| c.terms.iter().map(|&(_, k)| k.min(0)).sum())
                .collect(),
            hi: self
                .constraints
                .iter()
                .map(|c| c.terms.iter().map(|&(_, k)| k.max(0)).sum())
                .collect(),
            values: vec![false; n],
            nodes: 0,
            max_nodes: limits.max_nodes,
            exhausted: false,
        };

        // Constant constraints (no terms) are checked once up front.
        if (0..self.constraints.len()).any(|ci| !search.satisfiable(ci)) {
            return Solution::infeasible(0, n);
        }

        let mut values = vec![false; n];
        let mut objective = 0;
        for mut group in uf.groups() {
            group.sort_by(|&a, &b| self.weights[b].cmp(&self.weights[a]).then(a.cmp(&b)));
            match search.solve_component(&group) {
                Some((obj, assignment)) => {
                    objective += obj;
                    for (&v, &val) in group.iter().zip(&assignment) {
                        values[v] = val;
                    }
                }
                None if search.exhausted => {
                    log::warn!(
                        "solver budget of {} nodes exhausted without a solution",
                        limits.max_nodes
                    );
                    return Solution::infeasible(search.nodes, n);
                },
                None => return Solution::infeasible(search.nodes, n),
            }
        }

        let status = if search.exhausted {
            log::warn!(
                "solver budget of {} nodes exhausted, keeping best assignment found",
                limits.max_nodes
            );
            SolveStatus::Feasible
        } else {
            SolveStatus::Optimal
        };
        Solution {
            status,
            objective,
            nodes: search.nodes,
            values,
        }
    }
}

impl Solution {
    fn infeasible(nodes: u64, n: usize) -> Self {
        Self {
            status: SolveStatus::Infeasible,
            objective: 0,
            nodes,
            values: vec![false; n],
        }
    }
}

struct Search<'m> {
    model: &'m ConstraintModel,
    var_terms: &'m [Vec<(usize, i64)>],
    lo: Vec<i64>,
    hi: Vec<i64>,
    values: Vec<bool>,
    nodes: u64,
    max_nodes: u64,
    exhausted: bool,
}

impl Search<'_> {
    fn satisfiable(&self, ci: usize) -> bool {
        let c = &self.model.constraints[ci];
        match c.cmp {
            Cmp::Le => self.lo[ci] <= c.rhs,
            Cmp::Ge => self.hi[ci] >= c.rhs,
            Cmp::Eq => self.lo[ci] <= c.rhs && c.rhs <= self.hi[ci],
        }
    }

    /// Fix `v` to `val`; returns whether every touched constraint can still
    /// be satisfied. Must be paired with [`Search::unassign`].
    fn assign(&mut self, v: usize, val: bool) -> bool {
        self.values[v] = val;
        let x = i64::from(val);
        let mut ok = true;
        for &(ci, k) in &self.var_terms[v] {
            self.lo[ci] += k * x - k.min(0);
            self.hi[ci] += k * x - k.max(0);
            ok &= self.satisfiable(ci);
        }
        ok
    }

    fn unassign(&mut self, v: usize, val: bool) {
        let x = i64::from(val);
        for &(ci, k) in &self.var_terms[v] {
            self.lo[ci] -= k * x - k.min(0);
            self.hi[ci] -= k * x - k.max(0);
        }
        self.values[v] = false;
    }

    /// Best assignment of one component. Once the node budget is spent the
    /// component keeps its incumbent, or falls back to a single greedy pass
    /// when the search never completed an assignment for it.
    fn solve_component(&mut self, vars: &[usize]) -> Option<(i64, Vec<bool>)> {
        let optimistic: i64 = vars.iter().map(|&v| self.model.weights[v].max(0)).sum();
        let mut best = None;
        if !self.exhausted {
            self.dfs(vars, 0, 0, optimistic, &mut best);
        }
        if best.is_none() && self.exhausted {
            best = self.greedy(vars);
        }
        best
    }

    /// Assign each variable its preferred value when the constraints allow
    /// it, the other value otherwise. No backtracking.
    fn greedy(&mut self, vars: &[usize]) -> Option<(i64, Vec<bool>)> {
        let mut assigned = Vec::with_capacity(vars.len());
        let mut objective = 0;
        let mut complete = true;
        for &v in vars {
            let w = self.model.weights[v];
            let order = if w > 0 { [true, false] } else { [false, true] };
            let mut placed = None;
            for val in order {
                if self.assign(v, val) {
                    placed = Some(val);
                    break;
                }
                self.unassign(v, val);
            }
            match placed {
                Some(val) => {
                    assigned.push((v, val));
                    if val {
                        objective += w;
                    }
                },
                None => {
                    complete = false;
                    break;
                },
            }
        }
        let result = complete.then(|| (objective, vars.iter().map(|&v| self.values[v]).collect()));
        for &(v, val) in assigned.iter().rev() {
            self.unassign(v, val);
        }
        result
    }

    fn dfs(
        &mut self,
        vars: &[usize],
        depth: usize,
        objective: i64,
        remaining: i64,
        best: &mut Option<(i64, Vec<bool>)>,
    ) {
        if self.exhausted {
            return;
        }
        self.nodes += 1;
        if self.nodes > self.max_nodes {
            self.exhausted = true;
            return;
        }
        if let Some((incumbent, _)) = best {
            if objective + remaining <= *incumbent {
                return;
            }
        }
        if depth == vars.len() {
            *best = Some((objective, vars.iter().map(|&v| self.values[v]).collect()));
            return;
        }

        let v = vars[depth];
        let w = self.model.weights[v];
        let rest = remaining - w.max(0);
        let order = if w > 0 { [true, false] } else { [false, true] };
        for val in order {
            if self.assign(v, val) {
                let gained = if val { w } else { 0 };
                self.dfs(vars, depth + 1, objective + gained, rest, best);
            }
            self.unassign(v, val);
            if self.exhausted {
                return;
            }
        }
    }
}
