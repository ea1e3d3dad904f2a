use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type StudentId = i64;

/// A student together with every grade recorded for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: StudentId,
    pub name: String,
    pub roll_number: String,
    pub created_at: String,
    pub grades: BTreeMap<String, f64>,
}

/// A single stored grade. `revision` starts at 1 and bumps on every overwrite.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub student_id: StudentId,
    pub subject: String,
    pub value: f64,
    pub revision: i64,
    pub updated_at: String,
}

/// Grade as submitted by a caller, before validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawGrade {
    Number(f64),
    Text(String),
}

impl From<f64> for RawGrade {
    fn from(v: f64) -> Self {
        RawGrade::Number(v)
    }
}

impl From<&str> for RawGrade {
    fn from(v: &str) -> Self {
        RawGrade::Text(v.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GradeEntry {
    pub subject: String,
    pub grade: RawGrade,
}

impl GradeEntry {
    pub fn new(subject: &str, grade: impl Into<RawGrade>) -> Self {
        Self {
            subject: subject.to_string(),
            grade: grade.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Topper {
    pub name: String,
    pub roll_number: String,
    pub grade: f64,
}

pub(crate) fn now_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}
