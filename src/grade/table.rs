//! Mark → letter grade → grade point.
//!
//! Bands are keyed by their integer lower bound. A mark belongs to the highest
//! band whose lower bound it reaches, which gives:
//!
//! - integer marks land in the familiar inclusive bands (`35–39 → E`, ...)
//! - fractional marks between two bands fall into the lower one (`39.5 → E`)
//! - marks above 100 clamp into the top band (`O+++`)
//! - marks below 35, negative marks and NaN resolve to `F`

use std::fmt;

use serde::{Deserialize, Serialize};

/// Letter grades, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    F,
    E,
    D,
    C,
    B,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B++")]
    BPlusPlus,
    A,
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A++")]
    APlusPlus,
    O,
    #[serde(rename = "O+")]
    OPlus,
    #[serde(rename = "O++")]
    OPlusPlus,
    #[serde(rename = "O+++")]
    OPlusPlusPlus,
}

impl Grade {
    pub fn label(self) -> &'static str {
        match self {
            Grade::F => "F",
            Grade::E => "E",
            Grade::D => "D",
            Grade::C => "C",
            Grade::B => "B",
            Grade::BPlus => "B+",
            Grade::BPlusPlus => "B++",
            Grade::A => "A",
            Grade::APlus => "A+",
            Grade::APlusPlus => "A++",
            Grade::O => "O",
            Grade::OPlus => "O+",
            Grade::OPlusPlus => "O++",
            Grade::OPlusPlusPlus => "O+++",
        }
    }

    pub fn grade_point(self) -> f64 {
        match self {
            Grade::F => 0.0,
            Grade::E => 4.0,
            Grade::D => 4.5,
            Grade::C => 5.0,
            Grade::B => 5.5,
            Grade::BPlus => 6.0,
            Grade::BPlusPlus => 6.5,
            Grade::A => 7.0,
            Grade::APlus => 7.5,
            Grade::APlusPlus => 8.0,
            Grade::O => 8.5,
            Grade::OPlus => 9.0,
            Grade::OPlusPlus => 9.5,
            Grade::OPlusPlusPlus => 10.0,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the grade table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeBand {
    pub grade: Grade,
    /// Inclusive lower bound.
    pub lower: f64,
    /// Inclusive upper bound as printed on mark sheets (integer marks).
    pub upper: f64,
}

/// The grade table, ascending by lower bound.
pub const GRADE_BANDS: [GradeBand; 14] = [
    GradeBand { grade: Grade::F, lower: 0.0, upper: 34.0 },
    GradeBand { grade: Grade::E, lower: 35.0, upper: 39.0 },
    GradeBand { grade: Grade::D, lower: 40.0, upper: 44.0 },
    GradeBand { grade: Grade::C, lower: 45.0, upper: 49.0 },
    GradeBand { grade: Grade::B, lower: 50.0, upper: 54.0 },
    GradeBand { grade: Grade::BPlus, lower: 55.0, upper: 59.0 },
    GradeBand { grade: Grade::BPlusPlus, lower: 60.0, upper: 64.0 },
    GradeBand { grade: Grade::A, lower: 65.0, upper: 69.0 },
    GradeBand { grade: Grade::APlus, lower: 70.0, upper: 74.0 },
    GradeBand { grade: Grade::APlusPlus, lower: 75.0, upper: 79.0 },
    GradeBand { grade: Grade::O, lower: 80.0, upper: 84.0 },
    GradeBand { grade: Grade::OPlus, lower: 85.0, upper: 89.0 },
    GradeBand { grade: Grade::OPlusPlus, lower: 90.0, upper: 94.0 },
    GradeBand { grade: Grade::OPlusPlusPlus, lower: 95.0, upper: 100.0 },
];

/// Resolve a mark to its grade and grade point. Total over all `f64`.
pub fn grade_of(mark: f64) -> (Grade, f64) {
    let grade = GRADE_BANDS
        .iter()
        .rev()
        .find(|band| mark >= band.lower)
        .map(|band| band.grade)
        .unwrap_or(Grade::F);
    (grade, grade.grade_point())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_band_boundaries() {
        let cases = [
            (0.0, Grade::F),
            (34.0, Grade::F),
            (35.0, Grade::E),
            (39.0, Grade::E),
            (40.0, Grade::D),
            (54.0, Grade::B),
            (55.0, Grade::BPlus),
            (64.0, Grade::BPlusPlus),
            (74.0, Grade::APlus),
            (79.0, Grade::APlusPlus),
            (80.0, Grade::O),
            (89.0, Grade::OPlus),
            (94.0, Grade::OPlusPlus),
            (95.0, Grade::OPlusPlusPlus),
            (100.0, Grade::OPlusPlusPlus),
        ];
        for (mark, expected) in cases {
            assert_eq!(grade_of(mark).0, expected, "mark {mark}");
        }
    }

    #[test]
    fn fractional_marks_fall_into_lower_band() {
        assert_eq!(grade_of(34.5).0, Grade::F);
        assert_eq!(grade_of(39.5).0, Grade::E);
        assert_eq!(grade_of(33.5), (Grade::F, 0.0));
    }

    #[test]
    fn out_of_range_marks_clamp() {
        assert_eq!(grade_of(102.0), (Grade::OPlusPlusPlus, 10.0));
        assert_eq!(grade_of(f64::INFINITY).0, Grade::OPlusPlusPlus);
        assert_eq!(grade_of(-3.0), (Grade::F, 0.0));
        assert_eq!(grade_of(f64::NAN).0, Grade::F);
    }

    #[test]
    fn table_is_total_and_monotone_over_range() {
        let mut prev = grade_of(0.0);
        for i in 0..=1000 {
            let mark = i as f64 / 10.0;
            let current = grade_of(mark);
            assert!(current.0 >= prev.0, "grade decreased at {mark}");
            assert!(current.1 >= prev.1, "grade point decreased at {mark}");
            assert!((0.0..=10.0).contains(&current.1));
            prev = current;
        }
    }

    #[test]
    fn bands_are_contiguous() {
        for pair in GRADE_BANDS.windows(2) {
            assert_eq!(pair[0].upper + 1.0, pair[1].lower);
            assert!(pair[0].grade < pair[1].grade);
            assert!(pair[0].grade.grade_point() < pair[1].grade.grade_point());
        }
        assert_eq!(GRADE_BANDS[0].lower, 0.0);
        assert_eq!(GRADE_BANDS[GRADE_BANDS.len() - 1].upper, 100.0);
    }

    #[test]
    fn serializes_with_printed_labels() {
        let json = serde_json::to_string(&Grade::OPlusPlusPlus).unwrap();
        assert_eq!(json, "\"O+++\"");
        assert_eq!(Grade::BPlus.to_string(), "B+");
    }
}
