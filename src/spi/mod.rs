//! Credit-weighted grade point aggregation.
//!
//! For each subject:
//! - mean of its adjusted component marks (unweighted)
//! - grade point of that mean
//! - weight = sum of the subject's component credits
//!
//! `SPI = Σ(grade_point × credits) / Σ credits`, and `0` when no credits exist.

use serde::{Deserialize, Serialize};

use crate::domain::{FinalMarks, StudentRecord};
use crate::error::GradingError;
use crate::grade::{Grade, grade_of};

/// Per-subject aggregation row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectGrade {
    pub name: String,
    pub mean: f64,
    pub grade: Grade,
    pub grade_point: f64,
    pub credits: f64,
}

/// Aggregated result of one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpiReport {
    pub subjects: Vec<SubjectGrade>,
    pub weighted_points: f64,
    pub total_credits: f64,
    pub spi: f64,
}

/// Compute the SPI of `marks`, taking credits from `record`.
pub fn compute_spi(marks: &FinalMarks, record: &StudentRecord) -> Result<SpiReport, GradingError> {
    let mut subjects = Vec::with_capacity(marks.subjects.len());
    let mut weighted_points = 0.0;
    let mut total_credits = 0.0;

    for s in &marks.subjects {
        let subject = record
            .subject(&s.name)
            .ok_or_else(|| GradingError::subject(&s.name, "marks given for a subject with no credits"))?;
        let mean = s
            .marks
            .mean()
            .ok_or_else(|| GradingError::subject(&s.name, "subject has no component marks"))?;

        let (grade, grade_point) = grade_of(mean);
        let credits = subject.total_credit();
        weighted_points += grade_point * credits;
        total_credits += credits;

        subjects.push(SubjectGrade {
            name: s.name.clone(),
            mean,
            grade,
            grade_point,
            credits,
        });
    }

    let spi = if total_credits > 0.0 {
        weighted_points / total_credits
    } else {
        0.0
    };

    Ok(SpiReport {
        subjects,
        weighted_points,
        total_credits,
        spi,
    })
}
