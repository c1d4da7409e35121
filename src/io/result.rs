//! Read/write JSON result documents.
//!
//! A result document is the portable record of one grading run: the policy
//! used, marks at every stage, the bonus per component, which rules fired,
//! per-subject grades and the SPI. `spi show` prints a summary from it
//! without re-running the pipeline.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app::pipeline::GradingOutcome;
use crate::error::{AppError, EXIT_IO};
use crate::io::export::write_outputs;

/// Name recorded in every result document.
pub const TOOL_NAME: &str = "spi";

/// On-disk schema of a JSON result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub outcome: GradingOutcome,
}

impl ResultFile {
    pub fn new(outcome: GradingOutcome) -> Self {
        Self {
            tool: TOOL_NAME.to_string(),
            generated_at: Utc::now(),
            outcome,
        }
    }
}

/// Write a result JSON file.
pub fn write_result_json(path: &Path, outcome: &GradingOutcome) -> Result<(), AppError> {
    let bytes = render_result_json(outcome)?;
    write_outputs(&[(path, bytes.as_slice())])
}

/// Render a result document as pretty-printed JSON bytes.
pub fn render_result_json(outcome: &GradingOutcome) -> Result<Vec<u8>, AppError> {
    serde_json::to_vec_pretty(&ResultFile::new(outcome.clone()))
        .map_err(|e| AppError::new(EXIT_IO, format!("Failed to write result JSON: {e}")))
}

/// Read a result JSON file.
pub fn read_result_json(path: &Path) -> Result<ResultFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(EXIT_IO, format!("Failed to open result JSON '{}': {e}", path.display())))?;
    let result: ResultFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(EXIT_IO, format!("Invalid result JSON: {e}")))?;
    Ok(result)
}
