use crate::error::{Result, StoreError};
use crate::model::RawGrade;

pub const GRADE_MIN: f64 = 0.0;
pub const GRADE_MAX: f64 = 100.0;

/// Trims `value`, rejecting it when nothing is left.
pub fn required(field: &'static str, value: &str) -> Result<String> {
    let t = value.trim();
    if t.is_empty() {
        return Err(StoreError::InvalidInput { field });
    }
    Ok(t.to_string())
}

/// Resolves a submitted grade to a number in `[GRADE_MIN, GRADE_MAX]`.
pub fn parse_grade(raw: &RawGrade) -> Result<f64> {
    let v = match raw {
        RawGrade::Number(v) => *v,
        RawGrade::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| StoreError::InvalidGrade {
                reason: "Invalid grade value",
            })?,
    };
    if v.is_nan() {
        return Err(StoreError::InvalidGrade {
            reason: "Invalid grade value",
        });
    }
    if !(GRADE_MIN..=GRADE_MAX).contains(&v) {
        return Err(StoreError::InvalidGrade {
            reason: "Grade must be between 0 and 100",
        });
    }
    Ok(v)
}
