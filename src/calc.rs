use crate::model::{StudentRecord, Topper};
use serde::Serialize;
use std::collections::BTreeMap;

/// Rounds to two decimals, ties to even.
///
/// A tie is judged on the exact value of `x`, not on the rounded product
/// `x * 100`: `mul_add` recovers the multiplication error.
pub fn round2(x: f64) -> f64 {
    let scaled = x * 100.0;
    if (scaled - scaled.trunc()).abs() != 0.5 {
        return scaled.round() / 100.0;
    }
    let err = x.mul_add(100.0, -scaled);
    let rounded = if err > 0.0 {
        scaled.ceil()
    } else if err < 0.0 {
        scaled.floor()
    } else {
        let lo = scaled.floor();
        if lo % 2.0 == 0.0 {
            lo
        } else {
            lo + 1.0
        }
    };
    rounded / 100.0
}

/// Mean of a student's grades, rounded. An ungraded student averages 0.
pub fn average(grades: &BTreeMap<String, f64>) -> f64 {
    if grades.is_empty() {
        return 0.0;
    }
    let sum: f64 = grades.values().sum();
    round2(sum / grades.len() as f64)
}

/// Highest grade recorded for `subject`.
///
/// `students` is expected in canonical order (name, then roll number); on a tie
/// the first student in that order keeps the title.
pub fn subject_topper(subject: &str, students: &[StudentRecord]) -> Option<Topper> {
    let mut best: Option<(&StudentRecord, f64)> = None;
    for s in students {
        let Some(&g) = s.grades.get(subject) else {
            continue;
        };
        if best.map_or(true, |(_, b)| g > b) {
            best = Some((s, g));
        }
    }
    best.map(|(s, grade)| Topper {
        name: s.name.clone(),
        roll_number: s.roll_number.clone(),
        grade,
    })
}

/// Mean grade for `subject` across graded students, or `None` when nobody has one.
pub fn class_average(subject: &str, students: &[StudentRecord]) -> Option<f64> {
    let grades: Vec<f64> = students
        .iter()
        .filter_map(|s| s.grades.get(subject).copied())
        .collect();
    if grades.is_empty() {
        return None;
    }
    Some(round2(grades.iter().sum::<f64>() / grades.len() as f64))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub total_students: usize,
    pub total_grades: usize,
    pub overall_average: f64,
    pub total_subjects: usize,
}

pub fn dashboard(students: &[StudentRecord], subjects: &[String]) -> Dashboard {
    let averages: Vec<f64> = students
        .iter()
        .filter(|s| !s.grades.is_empty())
        .map(|s| average(&s.grades))
        .collect();
    let overall_average = if averages.is_empty() {
        0.0
    } else {
        round2(averages.iter().sum::<f64>() / averages.len() as f64)
    };
    Dashboard {
        total_students: students.len(),
        total_grades: students.iter().map(|s| s.grades.len()).sum(),
        overall_average,
        total_subjects: subjects.len(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectSummary {
    pub subject: String,
    pub graded_count: usize,
    pub class_average: Option<f64>,
    pub topper: Option<Topper>,
}

pub fn subject_report(subjects: &[String], students: &[StudentRecord]) -> Vec<SubjectSummary> {
    subjects
        .iter()
        .map(|subject| SubjectSummary {
            subject: subject.clone(),
            graded_count: students
                .iter()
                .filter(|s| s.grades.contains_key(subject))
                .count(),
            class_average: class_average(subject, students),
            topper: subject_topper(subject, students),
        })
        .collect()
}
