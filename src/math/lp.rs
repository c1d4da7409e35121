//! The bonus allocation program.
//!
//! Every component gets a decision variable `x_i` (its bonus). The program is:
//!
//! ```text
//! maximize   Σ z_i                       goals reached
//! then       minimize Σ x_i              bonus spent
//! subject to Σ x_i ≤ B                   shared budget row
//!            l_i ≤ x_i ≤ u_i             per-variable bounds
//!            x_i ≥ r_i · z_i, z_i ∈ {0,1}  soft goal: reach requirement r_i
//! ```
//!
//! The two objectives are solved lexicographically. With a single budget row
//! and unit value per goal this is a unit-profit knapsack, so taking goals in
//! ascending order of requirement is exact for both stages:
//! - the largest reachable goal count is the longest ascending prefix that fits `B`
//! - no other set of that size spends less than that prefix
//!
//! Equal requirements are taken in variable order, which makes the result
//! independent of the solver and reproducible run to run.

use std::cmp::Ordering;
use std::time::{Duration, Instant};

use nalgebra::{DMatrix, DVector};

/// Absolute slack on budget and bound comparisons.
///
/// Fractional marks produce requirements like `2.7000000000000028`; without
/// slack a budget that covers them exactly on paper can be rejected.
pub const TOLERANCE: f64 = 1e-9;

/// Row index of the shared budget constraint.
const BUDGET_ROW: usize = 0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LpError {
    #[error("{0}")]
    Infeasible(String),
    #[error("solve exceeded {0:?}")]
    Timeout(Duration),
}

/// Wall-clock bound for a solve.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    limit: Duration,
}

impl Deadline {
    pub fn after(limit: Duration) -> Self {
        Self {
            start: Instant::now(),
            limit,
        }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    pub fn expired(&self) -> bool {
        self.start.elapsed() >= self.limit
    }
}

/// Optimal point of a `BonusProgram`.
#[derive(Debug, Clone)]
pub struct LpSolution {
    pub values: DVector<f64>,
    /// Per variable: whether its goal is reached (`false` for variables without a goal).
    pub goals_met: Vec<bool>,
    pub spent: f64,
}

impl LpSolution {
    pub fn goals_met_count(&self) -> usize {
        self.goals_met.iter().filter(|&&m| m).count()
    }
}

/// Bounded variables, a budget row, and one optional soft goal per variable.
#[derive(Debug, Clone)]
pub struct BonusProgram {
    names: Vec<String>,
    lower: DVector<f64>,
    upper: DVector<f64>,
    /// Constraint rows `A x ≤ b`.
    a: DMatrix<f64>,
    b: DVector<f64>,
    requirements: Vec<Option<f64>>,
}

impl BonusProgram {
    /// One variable per name, each bounded to `[0, cap]`, sharing `budget`.
    pub fn new(names: Vec<String>, cap: f64, budget: f64) -> Self {
        let n = names.len();
        Self {
            names,
            lower: DVector::zeros(n),
            upper: DVector::from_element(n, cap),
            a: DMatrix::from_element(1, n, 1.0),
            b: DVector::from_element(1, budget),
            requirements: vec![None; n],
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn budget(&self) -> f64 {
        self.b[BUDGET_ROW]
    }

    /// Ask for `x_i ≥ requirement` whenever the budget allows.
    pub fn set_requirement(&mut self, i: usize, requirement: f64) {
        self.requirements[i] = Some(requirement);
    }

    pub fn requirement(&self, i: usize) -> Option<f64> {
        self.requirements[i]
    }

    /// Reject programs with no feasible point at all.
    pub fn check_consistency(&self) -> Result<(), LpError> {
        for i in 0..self.len() {
            let (l, u) = (self.lower[i], self.upper[i]);
            if !(l.is_finite() && u.is_finite()) {
                return Err(LpError::Infeasible(format!(
                    "bounds of '{}' must be finite, got [{l}, {u}]",
                    self.names[i]
                )));
            }
            if u < l {
                return Err(LpError::Infeasible(format!(
                    "cap of '{}' is {u}, below its lower bound {l}",
                    self.names[i]
                )));
            }
        }

        // All coefficients are non-negative, so the lower-bound corner is the
        // least-loaded point of every row.
        let min_load = &self.a * &self.lower;
        for (row, (&load, &rhs)) in min_load.iter().zip(self.b.iter()).enumerate() {
            if !rhs.is_finite() || load > rhs + TOLERANCE {
                let what = if row == BUDGET_ROW { "budget" } else { "constraint" };
                return Err(LpError::Infeasible(format!(
                    "{what} row {row}: right-hand side {rhs} is below the minimum load {load}"
                )));
            }
        }
        Ok(())
    }

    /// True if `x` satisfies all bounds and rows (within `TOLERANCE`).
    pub fn is_feasible(&self, x: &DVector<f64>) -> bool {
        if x.len() != self.len() {
            return false;
        }
        let in_bounds = x
            .iter()
            .zip(self.lower.iter().zip(self.upper.iter()))
            .all(|(&v, (&l, &u))| v >= l - TOLERANCE && v <= u + TOLERANCE);
        let load = &self.a * x;
        in_bounds && load.iter().zip(self.b.iter()).all(|(&lhs, &rhs)| lhs <= rhs + TOLERANCE)
    }

    /// Solve lexicographically: most goals reached, then least spent.
    pub fn solve(&self, deadline: Option<Deadline>) -> Result<LpSolution, LpError> {
        self.check_consistency()?;

        let n = self.len();
        let mut x = self.lower.clone();
        let mut goals_met = vec![false; n];

        // Goals already satisfied at the lower bound cost nothing; goals above
        // the cap can never be reached and get no bonus at all.
        let mut candidates: Vec<(usize, f64)> = Vec::new();
        for (i, req) in self.requirements.iter().enumerate() {
            let Some(r) = *req else { continue };
            if r <= self.lower[i] {
                goals_met[i] = true;
            } else if r <= self.upper[i] + TOLERANCE {
                candidates.push((i, r));
            }
        }
        candidates.sort_by(|a, b| {
            let cost_a = a.1 - self.lower[a.0];
            let cost_b = b.1 - self.lower[b.0];
            cost_a
                .partial_cmp(&cost_b)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        let budget = self.budget();
        let mut spent = x.sum();
        for (i, r) in candidates {
            if let Some(d) = deadline {
                if d.expired() {
                    return Err(LpError::Timeout(d.limit()));
                }
            }

            let target = r.min(self.upper[i]);
            let extra = target - x[i];
            if spent + extra > budget + TOLERANCE {
                // Ascending costs: nothing after this fits either.
                break;
            }
            x[i] = target;
            spent += extra;
            goals_met[i] = true;
        }

        if !self.is_feasible(&x) {
            return Err(LpError::Infeasible(format!(
                "allocation of {spent} violates the budget {budget} or a cap"
            )));
        }

        Ok(LpSolution {
            values: x,
            goals_met,
            spent,
        })
    }
}
