//! Record storage for students and their grades.
//!
//! [`RecordStore`] is the contract every backend satisfies:
//!
//! - [`sqlite::SqliteStore`]: the durable store behind the daemon. One SQLite
//!   file per workspace; every mutator is a single transaction.
//! - [`memory::InMemoryStore`]: ordered maps, no persistence.
//!
//! Stores know nothing about averages or toppers; see [`crate::calc`] for the
//! reductions over what they return.

use crate::error::{Result, StoreError};
use crate::model::{Grade, GradeEntry, RawGrade, StudentId, StudentRecord};

pub mod memory;
pub mod sqlite;

/// Result of a batch upsert. One bad entry never rejects the rest.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub updated: usize,
    pub failures: Vec<(String, StoreError)>,
}

pub trait RecordStore {
    /// Registers a new student and returns its internal id.
    fn add_student(&mut self, name: &str, roll_number: &str) -> Result<StudentId>;

    fn get_student(&self, roll_number: &str) -> Result<StudentRecord>;

    /// All students ordered by name, then roll number.
    fn list_students(&self) -> Result<Vec<StudentRecord>>;

    /// Newest students first.
    fn recent_students(&self, limit: usize) -> Result<Vec<StudentRecord>>;

    /// Inserts or overwrites the grade for `(student_id, subject)`.
    fn upsert_grade(
        &mut self,
        student_id: StudentId,
        subject: &str,
        grade: &RawGrade,
    ) -> Result<Grade>;

    /// Removes the student and all of its grades.
    fn delete_student(&mut self, roll_number: &str) -> Result<()>;

    /// Every subject with at least one grade, sorted.
    fn list_subjects(&self) -> Result<Vec<String>>;

    fn upsert_grades(&mut self, roll_number: &str, entries: &[GradeEntry]) -> Result<BatchOutcome> {
        let student = self.get_student(roll_number)?;
        let mut outcome = BatchOutcome::default();
        for entry in entries {
            match self.upsert_grade(student.id, &entry.subject, &entry.grade) {
                Ok(_) => outcome.updated += 1,
                Err(e) => outcome.failures.push((entry.subject.trim().to_string(), e)),
            }
        }
        tracing::debug!(
            roll_number = %student.roll_number,
            updated = outcome.updated,
            rejected = outcome.failures.len(),
            "batch grade upsert"
        );
        Ok(outcome)
    }
}
