//! Shared grading pipeline used by every command.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! validate policy -> allocate bonus -> pardon -> universal bonus -> SPI
//!
//! Each stage takes the previous stage's full output and returns a new
//! snapshot, so every intermediate state is kept for reporting.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::allocate::{Allocation, allocate};
use crate::domain::{FinalMarks, GradingPolicy, StudentRecord};
use crate::error::GradingError;
use crate::rules::{RuleOutcome, apply_pardon, apply_universal_bonus};
use crate::spi::{SpiReport, compute_spi};

/// All computed outputs of a single grading run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingOutcome {
    pub policy: GradingPolicy,
    pub raw: FinalMarks,
    pub allocation: Allocation,
    pub pardon: RuleOutcome,
    pub universal_bonus: RuleOutcome,
    pub report: SpiReport,
}

impl GradingOutcome {
    /// Marks after allocation, before either override rule.
    pub fn allocated(&self) -> FinalMarks {
        self.allocation.apply()
    }

    pub fn final_marks(&self) -> &FinalMarks {
        &self.universal_bonus.marks
    }

    pub fn spi(&self) -> f64 {
        self.report.spi
    }
}

/// Run the full pipeline for one record. All or nothing: any error aborts the run.
pub fn run_grading(record: &StudentRecord, policy: &GradingPolicy) -> Result<GradingOutcome, GradingError> {
    policy.validate()?;

    info!(
        subjects = record.subjects().len(),
        components = record.component_count(),
        budget = record.attendance_bonus_budget(),
        "grading record"
    );

    let raw = FinalMarks::from_record(record);
    let allocation = allocate(record, policy)?;
    let pardon = apply_pardon(&allocation.apply(), policy);
    let universal_bonus = apply_universal_bonus(&pardon.marks, policy);
    let report = compute_spi(&universal_bonus.marks, record)?;

    info!(
        spent = allocation.spent,
        pardon = pardon.fired,
        universal_bonus = universal_bonus.fired,
        spi = report.spi,
        "grading complete"
    );

    Ok(GradingOutcome {
        policy: *policy,
        raw,
        allocation,
        pardon,
        universal_bonus,
        report,
    })
}
