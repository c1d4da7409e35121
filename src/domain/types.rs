//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during grading
//! - exported to JSON/CSV
//! - reloaded later for display

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::GradingError;

/// Highest raw mark a component can carry.
pub const MAX_RAW_MARK: f64 = 100.0;

/// Which part of a subject a mark belongs to.
///
/// The declaration order (theory before practical) is the order components are
/// listed in within a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Theory,
    Practical,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 2] = [ComponentKind::Theory, ComponentKind::Practical];

    /// Lowercase label used in messages and exports.
    pub fn label(self) -> &'static str {
        match self {
            ComponentKind::Theory => "theory",
            ComponentKind::Practical => "practical",
        }
    }
}

/// One optional value per component kind.
///
/// Used both for mark sheets and credit sheets; `None` means the subject does
/// not define that component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentValues {
    pub theory: Option<f64>,
    pub practical: Option<f64>,
}

impl ComponentValues {
    pub fn new(theory: Option<f64>, practical: Option<f64>) -> Self {
        Self { theory, practical }
    }

    pub fn get(&self, kind: ComponentKind) -> Option<f64> {
        match kind {
            ComponentKind::Theory => self.theory,
            ComponentKind::Practical => self.practical,
        }
    }

    pub fn set(&mut self, kind: ComponentKind, value: f64) {
        match kind {
            ComponentKind::Theory => self.theory = Some(value),
            ComponentKind::Practical => self.practical = Some(value),
        }
    }

    /// Present values in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (ComponentKind, f64)> + '_ {
        ComponentKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(kind).map(|v| (kind, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.theory.is_none() && self.practical.is_none()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Unweighted arithmetic mean of the present values.
    pub fn mean(&self) -> Option<f64> {
        let n = self.len();
        if n == 0 {
            return None;
        }
        Some(self.iter().map(|(_, v)| v).sum::<f64>() / n as f64)
    }
}

/// A single marked and credited component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub kind: ComponentKind,
    pub mark: f64,
    pub credit: f64,
}

/// A subject and the components it defines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    pub components: Vec<Component>,
}

impl Subject {
    pub fn new(name: impl Into<String>, components: Vec<Component>) -> Self {
        Self {
            name: name.into(),
            components,
        }
    }

    /// Sum of the component credit weights.
    pub fn total_credit(&self) -> f64 {
        self.components.iter().map(|c| c.credit).sum()
    }

    pub fn component(&self, kind: ComponentKind) -> Option<&Component> {
        self.components.iter().find(|c| c.kind == kind)
    }

    pub fn raw_marks(&self) -> ComponentValues {
        let mut out = ComponentValues::default();
        for c in &self.components {
            out.set(c.kind, c.mark);
        }
        out
    }
}

/// Validated input to one grading run.
///
/// Construction validates every invariant, so downstream stages can rely on:
/// unique non-empty subject names, at least one component per subject, no
/// duplicate component kinds, marks in `[0, 100]`, credits `> 0`, and a
/// finite non-negative attendance bonus budget.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    subjects: Vec<Subject>,
    attendance_bonus_budget: f64,
}

impl StudentRecord {
    pub fn new(subjects: Vec<Subject>, attendance_bonus_budget: f64) -> Result<Self, GradingError> {
        if !(attendance_bonus_budget.is_finite() && attendance_bonus_budget >= 0.0) {
            return Err(GradingError::record(format!(
                "attendance bonus budget must be finite and >= 0, got {attendance_bonus_budget}"
            )));
        }

        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(subjects.len());
        for mut subject in subjects {
            let name = subject.name.trim().to_string();
            if name.is_empty() {
                return Err(GradingError::record("subject name must not be empty"));
            }
            if !seen.insert(name.clone()) {
                return Err(GradingError::subject(name, "duplicate subject name"));
            }
            if subject.components.is_empty() {
                return Err(GradingError::subject(
                    name,
                    "subject must define at least one of theory or practical",
                ));
            }

            subject.components.sort_by_key(|c| c.kind);
            for pair in subject.components.windows(2) {
                if pair[0].kind == pair[1].kind {
                    return Err(GradingError::component(name, pair[0].kind, "component defined twice"));
                }
            }
            for c in &subject.components {
                if !(c.mark.is_finite() && (0.0..=MAX_RAW_MARK).contains(&c.mark)) {
                    return Err(GradingError::component(
                        name,
                        c.kind,
                        format!("mark must be within [0, 100], got {}", c.mark),
                    ));
                }
                if !(c.credit.is_finite() && c.credit > 0.0) {
                    return Err(GradingError::component(
                        name,
                        c.kind,
                        format!("credit must be finite and > 0, got {}", c.credit),
                    ));
                }
            }

            subject.name = name;
            normalized.push(subject);
        }

        Ok(Self {
            subjects: normalized,
            attendance_bonus_budget,
        })
    }

    /// Build a record from separate mark and credit sheets.
    ///
    /// Every subject with marks must have a credit entry defining exactly the
    /// same component set, and every credit entry must belong to a marked subject.
    pub fn from_sheets(
        marks: &[(String, ComponentValues)],
        credits: &[(String, ComponentValues)],
        attendance_bonus_budget: f64,
    ) -> Result<Self, GradingError> {
        for (name, _) in credits {
            if !marks.iter().any(|(m, _)| m.trim() == name.trim()) {
                return Err(GradingError::subject(name.trim(), "credits given for a subject with no marks"));
            }
        }

        let mut subjects = Vec::with_capacity(marks.len());
        for (name, subject_marks) in marks {
            let name = name.trim();
            let subject_credits = credits
                .iter()
                .find(|(c, _)| c.trim() == name)
                .map(|(_, v)| *v)
                .ok_or_else(|| GradingError::subject(name, "no credit entry for subject"))?;

            let mut components = Vec::new();
            for kind in ComponentKind::ALL {
                match (subject_marks.get(kind), subject_credits.get(kind)) {
                    (Some(mark), Some(credit)) => components.push(Component { kind, mark, credit }),
                    (Some(_), None) => {
                        return Err(GradingError::component(name, kind, "mark has no matching credit"));
                    }
                    (None, Some(_)) => {
                        return Err(GradingError::component(name, kind, "credit has no matching mark"));
                    }
                    (None, None) => {}
                }
            }
            subjects.push(Subject::new(name, components));
        }

        Self::new(subjects, attendance_bonus_budget)
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn subject(&self, name: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.name == name)
    }

    pub fn attendance_bonus_budget(&self) -> f64 {
        self.attendance_bonus_budget
    }

    pub fn component_count(&self) -> usize {
        self.subjects.iter().map(|s| s.components.len()).sum()
    }
}

/// Adjusted marks for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectMarks {
    pub name: String,
    pub marks: ComponentValues,
}

impl SubjectMarks {
    /// True if any component is strictly below `pass_mark`.
    pub fn is_failing(&self, pass_mark: f64) -> bool {
        self.marks.iter().any(|(_, m)| m < pass_mark)
    }
}

/// Component marks at some stage of the pipeline.
///
/// Each stage produces a new value; nothing is adjusted in place across stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinalMarks {
    pub subjects: Vec<SubjectMarks>,
}

impl FinalMarks {
    /// Raw marks of a record, before any adjustment.
    pub fn from_record(record: &StudentRecord) -> Self {
        Self {
            subjects: record
                .subjects()
                .iter()
                .map(|s| SubjectMarks {
                    name: s.name.clone(),
                    marks: s.raw_marks(),
                })
                .collect(),
        }
    }

    pub fn subject(&self, name: &str) -> Option<&SubjectMarks> {
        self.subjects.iter().find(|s| s.name == name)
    }

    pub fn mark(&self, subject: &str, kind: ComponentKind) -> Option<f64> {
        self.subject(subject).and_then(|s| s.marks.get(kind))
    }

    /// Names of subjects with at least one component below `pass_mark`.
    pub fn failing_subjects(&self, pass_mark: f64) -> Vec<&str> {
        self.subjects
            .iter()
            .filter(|s| s.is_failing(pass_mark))
            .map(|s| s.name.as_str())
            .collect()
    }

    pub fn all_passing(&self, pass_mark: f64) -> bool {
        self.subjects.iter().all(|s| !s.is_failing(pass_mark))
    }
}

/// Rule constants for one grading run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradingPolicy {
    /// Minimum component mark that counts as a pass.
    pub pass_mark: f64,
    /// Maximum attendance bonus a single component may receive.
    pub component_cap: f64,
    /// Lowest mark (inclusive) the single-failure pardon lifts to the pass mark.
    pub pardon_floor: f64,
    /// Flat amount added to every component once nothing fails.
    pub universal_bonus: f64,
    /// Upper bound on the allocation solve; `None` disables the bound.
    pub solve_timeout_ms: Option<u64>,
}

impl Default for GradingPolicy {
    fn default() -> Self {
        Self {
            pass_mark: 35.0,
            component_cap: 7.0,
            pardon_floor: 33.0,
            universal_bonus: 2.0,
            solve_timeout_ms: Some(1_000),
        }
    }
}

impl GradingPolicy {
    /// Check the rule constants for consistency.
    ///
    /// The component cap is deliberately not checked here: a negative cap makes
    /// the allocation program infeasible and is reported by the allocator.
    pub fn validate(&self) -> Result<(), GradingError> {
        if !(self.pass_mark.is_finite() && (0.0..=MAX_RAW_MARK).contains(&self.pass_mark)) {
            return Err(GradingError::InvalidPolicy {
                field: "pass_mark",
                reason: format!("must be within [0, 100], got {}", self.pass_mark),
            });
        }
        if !self.pardon_floor.is_finite() || self.pardon_floor > self.pass_mark {
            return Err(GradingError::InvalidPolicy {
                field: "pardon_floor",
                reason: format!(
                    "must be finite and <= pass mark {}, got {}",
                    self.pass_mark, self.pardon_floor
                ),
            });
        }
        if !(self.universal_bonus.is_finite() && self.universal_bonus >= 0.0) {
            return Err(GradingError::InvalidPolicy {
                field: "universal_bonus",
                reason: format!("must be finite and >= 0, got {}", self.universal_bonus),
            });
        }
        Ok(())
    }

    pub fn solve_timeout(&self) -> Option<Duration> {
        self.solve_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(theory: Option<f64>, practical: Option<f64>) -> ComponentValues {
        ComponentValues::new(theory, practical)
    }

    #[test]
    fn from_sheets_pairs_marks_with_credits() {
        let marks = vec![("Mathematics".to_string(), values(Some(32.0), Some(33.0)))];
        let credits = vec![("Mathematics".to_string(), values(Some(3.0), Some(1.0)))];
        let record = StudentRecord::from_sheets(&marks, &credits, 7.0).unwrap();

        let subject = record.subject("Mathematics").unwrap();
        assert_eq!(subject.components.len(), 2);
        assert_eq!(subject.total_credit(), 4.0);
        assert_eq!(subject.component(ComponentKind::Theory).unwrap().mark, 32.0);
        assert_eq!(record.attendance_bonus_budget(), 7.0);
    }

    #[test]
    fn from_sheets_rejects_mark_without_credit() {
        let marks = vec![("Physics".to_string(), values(Some(50.0), Some(40.0)))];
        let credits = vec![("Physics".to_string(), values(Some(3.0), None))];
        let err = StudentRecord::from_sheets(&marks, &credits, 0.0).unwrap_err();
        assert_eq!(
            err,
            GradingError::component("Physics", ComponentKind::Practical, "mark has no matching credit")
        );
    }

    #[test]
    fn from_sheets_rejects_orphan_credit_entries() {
        let marks = vec![("Physics".to_string(), values(Some(50.0), None))];
        let credits = vec![
            ("Physics".to_string(), values(Some(3.0), None)),
            ("Chemistry".to_string(), values(Some(3.0), None)),
        ];
        let err = StudentRecord::from_sheets(&marks, &credits, 0.0).unwrap_err();
        assert!(matches!(err, GradingError::InvalidInput { subject: Some(ref s), .. } if s == "Chemistry"));
    }

    #[test]
    fn record_rejects_subject_without_components() {
        let err = StudentRecord::new(vec![Subject::new("Biology", vec![])], 3.0).unwrap_err();
        assert!(matches!(err, GradingError::InvalidInput { subject: Some(ref s), .. } if s == "Biology"));
    }

    #[test]
    fn record_rejects_negative_budget_and_duplicates() {
        let c = Component {
            kind: ComponentKind::Theory,
            mark: 50.0,
            credit: 2.0,
        };
        assert!(StudentRecord::new(vec![Subject::new("A", vec![c])], -1.0).is_err());
        assert!(StudentRecord::new(vec![Subject::new("A", vec![c]), Subject::new("A", vec![c])], 1.0).is_err());
        assert!(StudentRecord::new(vec![Subject::new("A", vec![c, c])], 1.0).is_err());
    }

    #[test]
    fn record_rejects_out_of_range_marks_and_credits() {
        let bad_mark = Component {
            kind: ComponentKind::Theory,
            mark: 101.0,
            credit: 2.0,
        };
        let bad_credit = Component {
            kind: ComponentKind::Practical,
            mark: 40.0,
            credit: 0.0,
        };
        assert!(StudentRecord::new(vec![Subject::new("A", vec![bad_mark])], 0.0).is_err());
        assert!(StudentRecord::new(vec![Subject::new("A", vec![bad_credit])], 0.0).is_err());
    }

    #[test]
    fn components_are_normalized_to_declaration_order() {
        let record = StudentRecord::new(
            vec![Subject::new(
                "A",
                vec![
                    Component {
                        kind: ComponentKind::Practical,
                        mark: 40.0,
                        credit: 1.0,
                    },
                    Component {
                        kind: ComponentKind::Theory,
                        mark: 50.0,
                        credit: 3.0,
                    },
                ],
            )],
            0.0,
        )
        .unwrap();
        let kinds: Vec<_> = record.subjects()[0].components.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![ComponentKind::Theory, ComponentKind::Practical]);
    }

    #[test]
    fn failing_subjects_uses_strict_threshold() {
        let marks = FinalMarks {
            subjects: vec![
                SubjectMarks {
                    name: "A".to_string(),
                    marks: values(Some(35.0), None),
                },
                SubjectMarks {
                    name: "B".to_string(),
                    marks: values(Some(60.0), Some(34.9)),
                },
            ],
        };
        assert_eq!(marks.failing_subjects(35.0), vec!["B"]);
        assert!(!marks.all_passing(35.0));
    }

    #[test]
    fn policy_validation() {
        assert!(GradingPolicy::default().validate().is_ok());

        let policy = GradingPolicy {
            pardon_floor: 36.0,
            ..GradingPolicy::default()
        };
        assert!(matches!(
            policy.validate(),
            Err(GradingError::InvalidPolicy { field: "pardon_floor", .. })
        ));

        // A negative cap is left for the allocator to report.
        let policy = GradingPolicy {
            component_cap: -1.0,
            ..GradingPolicy::default()
        };
        assert!(policy.validate().is_ok());
    }
}
