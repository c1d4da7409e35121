//! Attendance bonus allocation across all components of a record.
//!
//! Given:
//! - raw component marks
//! - a per-component cap
//! - one shared attendance bonus budget
//!
//! we build a `BonusProgram` with one variable per component and a soft goal
//! `raw + bonus ≥ pass_mark` for every failing component, then solve it.
//! Program variables are ordered by subject name, then theory before
//! practical. That order is the tie-break when the budget cannot cover two
//! equally cheap goals, so the outcome does not depend on the order subjects
//! were listed in. Results are reported back in record order.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{ComponentKind, ComponentValues, FinalMarks, GradingPolicy, StudentRecord, SubjectMarks};
use crate::error::GradingError;
use crate::math::{BonusProgram, Deadline, LpError};

/// The bonus granted to one component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentBonus {
    pub subject: String,
    pub kind: ComponentKind,
    pub raw: f64,
    pub bonus: f64,
    /// Bonus needed to reach the pass mark, for components that started below it.
    pub needed: Option<f64>,
    /// Whether the component is at or above the pass mark after its bonus.
    pub passes: bool,
}

impl ComponentBonus {
    pub fn adjusted(&self) -> f64 {
        self.raw + self.bonus
    }
}

/// Result of one allocation solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub components: Vec<ComponentBonus>,
    pub budget: f64,
    pub spent: f64,
    pub pass_mark: f64,
}

impl Allocation {
    pub fn bonus(&self, subject: &str, kind: ComponentKind) -> Option<f64> {
        self.components
            .iter()
            .find(|c| c.subject == subject && c.kind == kind)
            .map(|c| c.bonus)
    }

    /// Components lifted from below the pass mark to at or above it.
    pub fn passes_gained(&self) -> usize {
        self.components
            .iter()
            .filter(|c| c.needed.is_some() && c.passes)
            .count()
    }

    /// Components still below the pass mark after allocation.
    pub fn still_failing(&self) -> usize {
        self.components.iter().filter(|c| !c.passes).count()
    }

    /// Marks after adding each component's bonus.
    ///
    /// A component whose goal was met lands on at least the pass mark, even
    /// if `raw + (pass - raw)` rounds to just below it.
    pub fn apply(&self) -> FinalMarks {
        let mut subjects: Vec<SubjectMarks> = Vec::new();
        for c in &self.components {
            let mut mark = c.adjusted();
            if c.passes {
                mark = mark.max(self.pass_mark);
            }
            match subjects.last_mut() {
                Some(last) if last.name == c.subject => last.marks.set(c.kind, mark),
                _ => {
                    let mut marks = ComponentValues::default();
                    marks.set(c.kind, mark);
                    subjects.push(SubjectMarks {
                        name: c.subject.clone(),
                        marks,
                    });
                }
            }
        }
        FinalMarks { subjects }
    }
}

/// Distribute the record's attendance bonus budget.
pub fn allocate(record: &StudentRecord, policy: &GradingPolicy) -> Result<Allocation, GradingError> {
    let pass_mark = policy.pass_mark;

    let mut slots: Vec<(&str, ComponentKind, f64)> = Vec::with_capacity(record.component_count());
    for subject in record.subjects() {
        for c in &subject.components {
            slots.push((subject.name.as_str(), c.kind, c.mark));
        }
    }

    let mut order: Vec<usize> = (0..slots.len()).collect();
    order.sort_by(|&a, &b| slots[a].0.cmp(slots[b].0).then(slots[a].1.cmp(&slots[b].1)));
    let mut var_of = vec![0usize; slots.len()];
    for (var, &slot) in order.iter().enumerate() {
        var_of[slot] = var;
    }

    let names = order
        .iter()
        .map(|&slot| format!("{}/{}", slots[slot].0, slots[slot].1.label()))
        .collect();
    let mut program = BonusProgram::new(names, policy.component_cap, record.attendance_bonus_budget());
    for (var, &slot) in order.iter().enumerate() {
        let raw = slots[slot].2;
        if raw < pass_mark {
            program.set_requirement(var, pass_mark - raw);
        }
    }

    let deadline = policy.solve_timeout().map(Deadline::after);
    let solution = program.solve(deadline).map_err(|e| match e {
        LpError::Infeasible(constraint) => GradingError::OptimizationInfeasible { constraint },
        LpError::Timeout(limit) => GradingError::OptimizationTimeout { limit },
    })?;

    let components: Vec<ComponentBonus> = slots
        .iter()
        .enumerate()
        .map(|(slot, &(subject, kind, raw))| {
            let var = var_of[slot];
            ComponentBonus {
                subject: subject.to_string(),
                kind,
                raw,
                bonus: solution.values[var],
                needed: program.requirement(var),
                passes: raw >= pass_mark || solution.goals_met[var],
            }
        })
        .collect();

    let allocation = Allocation {
        components,
        budget: record.attendance_bonus_budget(),
        spent: solution.spent,
        pass_mark,
    };

    debug!(
        budget = allocation.budget,
        spent = allocation.spent,
        passes_gained = allocation.passes_gained(),
        still_failing = allocation.still_failing(),
        "attendance bonus allocated"
    );

    Ok(allocation)
}
