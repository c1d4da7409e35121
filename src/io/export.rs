//! CSV writers: graded results and input records.
//!
//! The results CSV mirrors the two sheets of the grading workbook, one after
//! the other separated by a blank line:
//!
//! ```text
//! Subject,Theory,Practical
//! Mathematics,37,37
//!
//! Parameter,Value
//! Final SPI,4
//! ```

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::app::pipeline::GradingOutcome;
use crate::domain::{ComponentKind, StudentRecord};
use crate::error::{AppError, EXIT_IO};
use crate::io::ingest::ATTENDANCE_PARAMETER;

/// Write a record in the input layout accepted by `io::ingest`.
pub fn write_record_csv(path: &Path, record: &StudentRecord) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(EXIT_IO, format!("Failed to create input CSV '{}': {e}", path.display())))?;
    write_record(file, record)
}

/// Render final marks and SPI as results CSV bytes.
pub fn render_results_csv(outcome: &GradingOutcome) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(Vec::new());

    writer.write_record(["Subject", "Theory", "Practical"]).map_err(write_err)?;
    for s in &outcome.final_marks().subjects {
        writer
            .write_record([
                s.name.clone(),
                cell(s.marks.get(ComponentKind::Theory)),
                cell(s.marks.get(ComponentKind::Practical)),
            ])
            .map_err(write_err)?;
    }
    let mut out = writer
        .into_inner()
        .map_err(|e| AppError::new(EXIT_IO, format!("Failed to write results CSV: {e}")))?;

    // Blank separator line between the two sections.
    out.push(b'\n');

    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(out);
    writer.write_record(["Parameter", "Value"]).map_err(write_err)?;
    writer
        .write_record(["Final SPI".to_string(), outcome.spi().to_string()])
        .map_err(write_err)?;
    writer
        .into_inner()
        .map_err(|e| AppError::new(EXIT_IO, format!("Failed to write results CSV: {e}")))
}

/// Write every `(path, bytes)` target, or none of them.
///
/// All files are created before any content is written. On failure, files
/// created by this call are removed again.
pub fn write_outputs(targets: &[(&Path, &[u8])]) -> Result<(), AppError> {
    let mut created: Vec<(&Path, File)> = Vec::with_capacity(targets.len());
    for &(path, _) in targets {
        match File::create(path) {
            Ok(file) => created.push((path, file)),
            Err(e) => {
                remove_all(created.iter().map(|(p, _)| *p));
                return Err(AppError::new(
                    EXIT_IO,
                    format!("Failed to create output '{}': {e}", path.display()),
                ));
            }
        }
    }

    for ((path, file), (_, bytes)) in created.iter_mut().zip(targets) {
        if let Err(e) = file.write_all(bytes).and_then(|()| file.flush()) {
            let message = format!("Failed to write output '{}': {e}", path.display());
            remove_all(targets.iter().map(|(p, _)| *p));
            return Err(AppError::new(EXIT_IO, message));
        }
    }
    Ok(())
}

fn remove_all<'a>(paths: impl Iterator<Item = &'a Path>) {
    for path in paths {
        let _ = std::fs::remove_file(path);
    }
}

fn write_record<W: Write>(sink: W, record: &StudentRecord) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(sink);

    writer
        .write_record([
            "Parameter",
            "Subject Name",
            "Theory Marks",
            "Practical Marks",
            "Theory Credits",
            "Practical Credits",
            "Value",
        ])
        .map_err(write_err)?;

    let budget = record.attendance_bonus_budget().to_string();
    writer
        .write_record([ATTENDANCE_PARAMETER, "", "", "", "", "", budget.as_str()])
        .map_err(write_err)?;

    for (i, subject) in record.subjects().iter().enumerate() {
        let theory = subject.component(ComponentKind::Theory);
        let practical = subject.component(ComponentKind::Practical);
        writer
            .write_record([
                format!("Subject {}", i + 1),
                subject.name.clone(),
                cell(theory.map(|c| c.mark)),
                cell(practical.map(|c| c.mark)),
                cell(theory.map(|c| c.credit)),
                cell(practical.map(|c| c.credit)),
                String::new(),
            ])
            .map_err(write_err)?;
    }

    writer.flush().map_err(|e| AppError::new(EXIT_IO, format!("Failed to write input CSV: {e}")))?;
    Ok(())
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn write_err(e: csv::Error) -> AppError {
    AppError::new(EXIT_IO, format!("Failed to write CSV row: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::run_grading;
    use crate::data::sample::{RandomSampleConfig, random_record, template_record};
    use crate::domain::GradingPolicy;
    use crate::io::ingest::{load_record, parse_record};

    #[test]
    fn results_have_marks_then_spi_sections() {
        let outcome = run_grading(&template_record().unwrap(), &GradingPolicy::default()).unwrap();
        let text = String::from_utf8(render_results_csv(&outcome).unwrap()).unwrap();
        assert_eq!(
            text,
            "Subject,Theory,Practical\nMathematics,37,37\n\nParameter,Value\nFinal SPI,4\n"
        );
    }

    #[test]
    fn absent_components_are_empty_cells() {
        let csv = "Parameter,Subject Name,Theory Marks,Practical Marks,Theory Credits,Practical Credits,Value\n\
                   Attendance Bonus,,,,,,0\n\
                   Subject 1,Physics,,80,,2,\n";
        let record = parse_record(csv.as_bytes()).unwrap();
        let outcome = run_grading(&record, &GradingPolicy::default()).unwrap();
        let text = String::from_utf8(render_results_csv(&outcome).unwrap()).unwrap();
        assert!(text.contains("\nPhysics,,82\n"), "{text}");
    }

    #[test]
    fn subject_names_with_commas_are_quoted() {
        let csv = "Parameter,Subject Name,Theory Marks,Practical Marks,Theory Credits,Practical Credits,Value\n\
                   Attendance Bonus,,,,,,0\n\
                   Subject 1,\"Maths, Applied\",60,,3,,\n";
        let record = parse_record(csv.as_bytes()).unwrap();
        let mut buf = Vec::new();
        write_record(&mut buf, &record).unwrap();
        assert_eq!(parse_record(buf.as_slice()).unwrap(), record);
    }

    #[test]
    fn failed_target_leaves_no_outputs_behind() {
        let good = std::env::temp_dir().join(format!("spi_grader_atomic_{}.csv", std::process::id()));
        let bad = std::env::temp_dir()
            .join(format!("spi_grader_missing_dir_{}", std::process::id()))
            .join("out.json");

        let err = write_outputs(&[(good.as_path(), b"a\n".as_slice()), (bad.as_path(), b"{}".as_slice())]).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_IO);
        assert!(!good.exists());
        assert!(!bad.exists());
    }

    #[test]
    fn written_records_load_back() {
        let config = RandomSampleConfig {
            seed: 11,
            subjects: 8,
            ..RandomSampleConfig::default()
        };
        let record = random_record(&config).unwrap();
        let path = std::env::temp_dir().join(format!("spi_grader_record_{}.csv", std::process::id()));
        write_record_csv(&path, &record).unwrap();
        let loaded = load_record(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, record);
    }
}
