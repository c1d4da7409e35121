//! Sample student records.
//!
//! - `template_record`: the fixed single-subject example shipped with the tool
//! - `random_record`: seeded synthetic records for demos and invariant checks

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Component, ComponentKind, MAX_RAW_MARK, StudentRecord, Subject};
use crate::error::GradingError;

/// The template: one subject just short of passing in both components.
pub fn template_record() -> Result<StudentRecord, GradingError> {
    StudentRecord::new(
        vec![Subject::new(
            "Mathematics",
            vec![
                Component {
                    kind: ComponentKind::Theory,
                    mark: 32.0,
                    credit: 3.0,
                },
                Component {
                    kind: ComponentKind::Practical,
                    mark: 33.0,
                    credit: 1.0,
                },
            ],
        )],
        7.0,
    )
}

/// Settings for `random_record`.
#[derive(Debug, Clone)]
pub struct RandomSampleConfig {
    pub seed: u64,
    pub subjects: usize,
    /// Mean of the normal distribution marks are drawn from.
    pub mean: f64,
    pub std_dev: f64,
    /// Attendance bonus budget is drawn uniformly from `0..=max_budget`.
    pub max_budget: u32,
}

impl Default for RandomSampleConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            subjects: 6,
            mean: 40.0,
            std_dev: 10.0,
            max_budget: 12,
        }
    }
}

/// Generate a reproducible synthetic record.
///
/// Marks are whole numbers clamped to `[0, 100]`. Each subject has theory,
/// practical, or both; theory carries 1–4 credits and practical 1–2.
pub fn random_record(config: &RandomSampleConfig) -> Result<StudentRecord, GradingError> {
    if config.subjects == 0 {
        return Err(GradingError::record("sample subject count must be > 0"));
    }
    // rand_distr only rejects a non-finite std_dev; a negative one would mirror the draws.
    if !(config.std_dev.is_finite() && config.std_dev >= 0.0) || !config.mean.is_finite() {
        return Err(GradingError::record(format!(
            "invalid mark distribution (mean={}, std_dev={}): mean must be finite and std_dev finite and >= 0",
            config.mean, config.std_dev
        )));
    }
    let normal = Normal::new(config.mean, config.std_dev).map_err(|e| {
        GradingError::record(format!(
            "invalid mark distribution (mean={}, std_dev={}): {e}",
            config.mean, config.std_dev
        ))
    })?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let draw_mark = |rng: &mut StdRng| normal.sample(rng).clamp(0.0, MAX_RAW_MARK).round();

    let mut subjects = Vec::with_capacity(config.subjects);
    for i in 0..config.subjects {
        let shape = rng.gen_range(0..4u8);
        let mut components = Vec::with_capacity(2);
        // Half of the subjects have both components.
        if shape != 3 {
            components.push(Component {
                kind: ComponentKind::Theory,
                mark: draw_mark(&mut rng),
                credit: f64::from(rng.gen_range(1..=4u8)),
            });
        }
        if shape != 2 {
            components.push(Component {
                kind: ComponentKind::Practical,
                mark: draw_mark(&mut rng),
                credit: f64::from(rng.gen_range(1..=2u8)),
            });
        }
        subjects.push(Subject::new(format!("Subject {}", i + 1), components));
    }

    let budget = f64::from(rng.gen_range(0..=config.max_budget));
    StudentRecord::new(subjects, budget)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_matches_shipped_example() {
        let record = template_record().unwrap();
        let maths = record.subject("Mathematics").unwrap();
        assert_eq!(maths.component(ComponentKind::Theory).unwrap().mark, 32.0);
        assert_eq!(maths.component(ComponentKind::Practical).unwrap().credit, 1.0);
        assert_eq!(record.attendance_bonus_budget(), 7.0);
    }

    #[test]
    fn random_records_are_reproducible_per_seed() {
        let config = RandomSampleConfig::default();
        assert_eq!(random_record(&config).unwrap(), random_record(&config).unwrap());

        let other = RandomSampleConfig {
            seed: 7,
            ..RandomSampleConfig::default()
        };
        assert_ne!(random_record(&config).unwrap(), random_record(&other).unwrap());
    }

    #[test]
    fn random_records_respect_shape() {
        let config = RandomSampleConfig {
            subjects: 25,
            ..RandomSampleConfig::default()
        };
        let record = random_record(&config).unwrap();
        assert_eq!(record.subjects().len(), 25);
        for s in record.subjects() {
            assert!(!s.components.is_empty() && s.components.len() <= 2);
            for c in &s.components {
                assert!((0.0..=100.0).contains(&c.mark));
                assert_eq!(c.mark.fract(), 0.0);
            }
        }
        assert!(record.attendance_bonus_budget() <= 12.0);
    }

    #[test]
    fn rejects_empty_and_bad_distributions() {
        let empty = RandomSampleConfig {
            subjects: 0,
            ..RandomSampleConfig::default()
        };
        assert!(random_record(&empty).is_err());

        let bad = RandomSampleConfig {
            std_dev: -1.0,
            ..RandomSampleConfig::default()
        };
        assert!(random_record(&bad).is_err());

        for (mean, std_dev) in [(40.0, f64::NAN), (40.0, f64::INFINITY), (f64::NAN, 10.0)] {
            let config = RandomSampleConfig {
                mean,
                std_dev,
                ..RandomSampleConfig::default()
            };
            assert!(random_record(&config).is_err(), "mean={mean} std_dev={std_dev}");
        }

        let degenerate = RandomSampleConfig {
            std_dev: 0.0,
            ..RandomSampleConfig::default()
        };
        assert!(random_record(&degenerate).is_ok());
    }
}
