use crate::error::{Result, StoreError};
use crate::model::{now_timestamp, Grade, RawGrade, StudentId, StudentRecord};
use crate::store::RecordStore;
use crate::validate;
use std::collections::{BTreeMap, BTreeSet, HashMap};

struct Entry {
    id: StudentId,
    name: String,
    created_at: String,
    grades: BTreeMap<String, Grade>,
}

impl Entry {
    fn record(&self, roll_number: &str) -> StudentRecord {
        StudentRecord {
            id: self.id,
            name: self.name.clone(),
            roll_number: roll_number.to_string(),
            created_at: self.created_at.clone(),
            grades: self
                .grades
                .iter()
                .map(|(subject, g)| (subject.clone(), g.value))
                .collect(),
        }
    }
}

/// Non-durable store keyed by roll number.
#[derive(Default)]
pub struct InMemoryStore {
    students: BTreeMap<String, Entry>,
    roll_by_id: HashMap<StudentId, String>,
    next_id: StudentId,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for InMemoryStore {
    fn add_student(&mut self, name: &str, roll_number: &str) -> Result<StudentId> {
        let name = validate::required("Student name", name)?;
        let roll_number = validate::required("Roll number", roll_number)?;
        if self.students.contains_key(&roll_number) {
            return Err(StoreError::AlreadyExists { roll_number });
        }

        self.next_id += 1;
        let id = self.next_id;
        self.roll_by_id.insert(id, roll_number.clone());
        self.students.insert(
            roll_number,
            Entry {
                id,
                name,
                created_at: now_timestamp(),
                grades: BTreeMap::new(),
            },
        );
        Ok(id)
    }

    fn get_student(&self, roll_number: &str) -> Result<StudentRecord> {
        let roll_number = roll_number.trim();
        self.students
            .get(roll_number)
            .map(|e| e.record(roll_number))
            .ok_or_else(|| StoreError::NotFound {
                roll_number: roll_number.to_string(),
            })
    }

    fn list_students(&self) -> Result<Vec<StudentRecord>> {
        let mut out: Vec<StudentRecord> = self
            .students
            .iter()
            .map(|(roll, e)| e.record(roll))
            .collect();
        out.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.roll_number.cmp(&b.roll_number))
        });
        Ok(out)
    }

    fn recent_students(&self, limit: usize) -> Result<Vec<StudentRecord>> {
        let mut out: Vec<StudentRecord> = self
            .students
            .iter()
            .map(|(roll, e)| e.record(roll))
            .collect();
        out.sort_by(|a, b| b.id.cmp(&a.id));
        out.truncate(limit);
        Ok(out)
    }

    fn upsert_grade(
        &mut self,
        student_id: StudentId,
        subject: &str,
        grade: &RawGrade,
    ) -> Result<Grade> {
        let value = validate::parse_grade(grade)?;
        let subject = validate::required("Subject", subject)?;
        let entry = self
            .roll_by_id
            .get(&student_id)
            .and_then(|roll| self.students.get_mut(roll))
            .ok_or(StoreError::StudentNotFound { student_id })?;

        let updated_at = now_timestamp();
        let revision = entry.grades.get(&subject).map_or(1, |g| g.revision + 1);
        let stored = Grade {
            student_id,
            subject: subject.clone(),
            value,
            revision,
            updated_at,
        };
        entry.grades.insert(subject, stored.clone());
        Ok(stored)
    }

    fn delete_student(&mut self, roll_number: &str) -> Result<()> {
        let roll_number = roll_number.trim();
        let Some(entry) = self.students.remove(roll_number) else {
            return Err(StoreError::NotFound {
                roll_number: roll_number.to_string(),
            });
        };
        self.roll_by_id.remove(&entry.id);
        Ok(())
    }

    fn list_subjects(&self) -> Result<Vec<String>> {
        let subjects: BTreeSet<&String> = self
            .students
            .values()
            .flat_map(|e| e.grades.keys())
            .collect();
        Ok(subjects.into_iter().cloned().collect())
    }
}
