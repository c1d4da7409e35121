//! Deterministic override rules applied after allocation.
//!
//! Order matters and is fixed: the single-failure pardon runs on the allocated
//! marks, and the universal bonus runs on the pardon's output. Each rule takes
//! a full snapshot and returns a new one.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{ComponentKind, FinalMarks, GradingPolicy};

/// Output of one rule: the new snapshot plus what changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleOutcome {
    pub marks: FinalMarks,
    pub fired: bool,
    /// Components whose mark this rule changed.
    pub touched: Vec<(String, ComponentKind)>,
}

/// Single-failure pardon.
///
/// If exactly one subject has a component below the pass mark, every component
/// of that subject with a mark in `[pardon_floor, pass_mark)` is raised to the
/// pass mark. With zero or several failing subjects nothing changes.
pub fn apply_pardon(marks: &FinalMarks, policy: &GradingPolicy) -> RuleOutcome {
    let failing = marks.failing_subjects(policy.pass_mark);
    let [only] = failing.as_slice() else {
        debug!(failing = failing.len(), "pardon skipped");
        return RuleOutcome {
            marks: marks.clone(),
            fired: false,
            touched: Vec::new(),
        };
    };
    let only = only.to_string();

    let mut out = marks.clone();
    let mut touched = Vec::new();
    for subject in out.subjects.iter_mut().filter(|s| s.name == only) {
        for kind in ComponentKind::ALL {
            let Some(mark) = subject.marks.get(kind) else { continue };
            if mark >= policy.pardon_floor && mark < policy.pass_mark {
                subject.marks.set(kind, policy.pass_mark);
                touched.push((subject.name.clone(), kind));
            }
        }
    }

    debug!(subject = %only, pardoned = touched.len(), "pardon applied");
    RuleOutcome {
        marks: out,
        fired: !touched.is_empty(),
        touched,
    }
}

/// Universal bonus.
///
/// If no component is below the pass mark, every component gains
/// `universal_bonus`, uncapped. Otherwise nothing changes.
pub fn apply_universal_bonus(marks: &FinalMarks, policy: &GradingPolicy) -> RuleOutcome {
    if !marks.all_passing(policy.pass_mark) {
        debug!("universal bonus skipped: failures remain");
        return RuleOutcome {
            marks: marks.clone(),
            fired: false,
            touched: Vec::new(),
        };
    }

    let mut out = marks.clone();
    let mut touched = Vec::new();
    for subject in &mut out.subjects {
        for kind in ComponentKind::ALL {
            if let Some(mark) = subject.marks.get(kind) {
                subject.marks.set(kind, mark + policy.universal_bonus);
                touched.push((subject.name.clone(), kind));
            }
        }
    }

    debug!(components = touched.len(), bonus = policy.universal_bonus, "universal bonus applied");
    RuleOutcome {
        marks: out,
        fired: true,
        touched,
    }
}
