use crate::error::{Result, StoreError};
use crate::model::{now_timestamp, Grade, RawGrade, StudentId, StudentRecord};
use crate::store::RecordStore;
use crate::validate;
use anyhow::Context;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

pub const DB_FILE_NAME: &str = "gradetrack.sqlite3";

pub struct SqliteStore {
    conn: Connection,
    path: PathBuf,
}

impl SqliteStore {
    /// Opens (or creates) the workspace database and brings its schema up to date.
    pub fn open(workspace: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(workspace).with_context(|| {
            format!("failed to create workspace {}", workspace.to_string_lossy())
        })?;
        let path = workspace.join(DB_FILE_NAME);
        let conn = Connection::open(&path)
            .with_context(|| format!("failed to open database {}", path.to_string_lossy()))?;
        init_schema(&conn)?;
        tracing::info!(path = %path.display(), "record store opened");
        Ok(Self { conn, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn student_by_roll(conn: &Connection, roll_number: &str) -> Result<Option<StudentRecord>> {
        let student = conn
            .query_row(
                "SELECT id, name, roll_number, created_at FROM students WHERE roll_number = ?",
                [roll_number],
                student_from_row,
            )
            .optional()?;
        let Some(mut student) = student else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT subject, grade FROM grades WHERE student_id = ? ORDER BY subject",
        )?;
        student.grades = stmt
            .query_map([student.id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })?
            .collect::<std::result::Result<BTreeMap<_, _>, _>>()?;
        Ok(Some(student))
    }

    fn students_with_grades(conn: &Connection, sql: &str) -> Result<Vec<StudentRecord>> {
        let mut stmt = conn.prepare(sql)?;
        let mut students = stmt
            .query_map([], student_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut grade_stmt = conn.prepare("SELECT student_id, subject, grade FROM grades")?;
        let mut by_student: HashMap<StudentId, BTreeMap<String, f64>> = HashMap::new();
        let mut rows = grade_stmt.query([])?;
        while let Some(row) = rows.next()? {
            let sid: StudentId = row.get(0)?;
            by_student
                .entry(sid)
                .or_default()
                .insert(row.get(1)?, row.get(2)?);
        }

        for s in students.iter_mut() {
            if let Some(g) = by_student.remove(&s.id) {
                s.grades = g;
            }
        }
        Ok(students)
    }
}

impl RecordStore for SqliteStore {
    fn add_student(&mut self, name: &str, roll_number: &str) -> Result<StudentId> {
        let name = validate::required("Student name", name)?;
        let roll_number = validate::required("Roll number", roll_number)?;

        let tx = self.conn.transaction()?;
        let inserted = tx.execute(
            "INSERT INTO students(name, roll_number, created_at) VALUES(?, ?, ?)",
            (&name, &roll_number, now_timestamp()),
        );
        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                return Err(StoreError::AlreadyExists { roll_number });
            }
            Err(e) => return Err(e.into()),
        }
        let id = tx.last_insert_rowid();
        tx.commit()?;

        tracing::debug!(id, %roll_number, "student added");
        Ok(id)
    }

    fn get_student(&self, roll_number: &str) -> Result<StudentRecord> {
        let roll_number = roll_number.trim();
        let tx = self.conn.unchecked_transaction()?;
        let student = Self::student_by_roll(&tx, roll_number)?;
        tx.commit()?;
        student.ok_or_else(|| StoreError::NotFound {
            roll_number: roll_number.to_string(),
        })
    }

    fn list_students(&self) -> Result<Vec<StudentRecord>> {
        let tx = self.conn.unchecked_transaction()?;
        let students = Self::students_with_grades(
            &tx,
            "SELECT id, name, roll_number, created_at FROM students ORDER BY name, roll_number",
        )?;
        tx.commit()?;
        Ok(students)
    }

    fn recent_students(&self, limit: usize) -> Result<Vec<StudentRecord>> {
        let tx = self.conn.unchecked_transaction()?;
        // AUTOINCREMENT ids never go backwards, so they double as creation order.
        let sql = format!(
            "SELECT id, name, roll_number, created_at FROM students ORDER BY id DESC LIMIT {}",
            i64::try_from(limit).unwrap_or(i64::MAX)
        );
        let students = Self::students_with_grades(&tx, &sql)?;
        tx.commit()?;
        Ok(students)
    }

    fn upsert_grade(
        &mut self,
        student_id: StudentId,
        subject: &str,
        grade: &RawGrade,
    ) -> Result<Grade> {
        let value = validate::parse_grade(grade)?;
        let subject = validate::required("Subject", subject)?;

        let tx = self.conn.transaction()?;
        let exists: Option<i64> = tx
            .query_row("SELECT 1 FROM students WHERE id = ?", [student_id], |r| {
                r.get(0)
            })
            .optional()?;
        if exists.is_none() {
            return Err(StoreError::StudentNotFound { student_id });
        }

        let now = now_timestamp();
        tx.execute(
            "INSERT INTO grades(student_id, subject, grade, created_at, updated_at, revision)
             VALUES(?, ?, ?, ?, ?, 1)
             ON CONFLICT(student_id, subject) DO UPDATE SET
               grade = excluded.grade,
               updated_at = excluded.updated_at,
               revision = grades.revision + 1",
            (student_id, &subject, value, &now, &now),
        )?;
        let revision: i64 = tx.query_row(
            "SELECT revision FROM grades WHERE student_id = ? AND subject = ?",
            (student_id, &subject),
            |r| r.get(0),
        )?;
        tx.commit()?;

        tracing::debug!(student_id, %subject, value, revision, "grade stored");
        Ok(Grade {
            student_id,
            subject,
            value,
            revision,
            updated_at: now,
        })
    }

    fn delete_student(&mut self, roll_number: &str) -> Result<()> {
        let roll_number = roll_number.trim();
        let tx = self.conn.transaction()?;
        let id: Option<StudentId> = tx
            .query_row(
                "SELECT id FROM students WHERE roll_number = ?",
                [roll_number],
                |r| r.get(0),
            )
            .optional()?;
        let Some(id) = id else {
            return Err(StoreError::NotFound {
                roll_number: roll_number.to_string(),
            });
        };

        // The foreign key cascades too, but databases opened without
        // foreign_keys enforcement still need the explicit delete.
        let grades_removed = tx.execute("DELETE FROM grades WHERE student_id = ?", [id])?;
        tx.execute("DELETE FROM students WHERE id = ?", [id])?;
        tx.commit()?;

        tracing::debug!(id, %roll_number, grades_removed, "student deleted");
        Ok(())
    }

    fn list_subjects(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT subject FROM grades ORDER BY subject")?;
        let subjects = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(subjects)
    }
}

fn student_from_row(row: &Row<'_>) -> rusqlite::Result<StudentRecord> {
    Ok(StudentRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        roll_number: row.get(2)?,
        created_at: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        grades: BTreeMap::new(),
    })
}

fn init_schema(conn: &Connection) -> anyhow::Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS students(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            roll_number TEXT UNIQUE NOT NULL,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS grades(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id INTEGER NOT NULL,
            subject TEXT NOT NULL,
            grade REAL NOT NULL CHECK(grade >= 0 AND grade <= 100),
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT,
            revision INTEGER NOT NULL DEFAULT 1,
            FOREIGN KEY(student_id) REFERENCES students(id) ON DELETE CASCADE,
            UNIQUE(student_id, subject)
        )",
        [],
    )?;

    // Databases written before grades tracked overwrites lack these columns.
    ensure_grades_revision(conn)?;
    ensure_grades_updated_at(conn)?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_grades_subject ON grades(subject)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_students_name ON students(name, roll_number)",
        [],
    )?;
    Ok(())
}

fn ensure_grades_revision(conn: &Connection) -> anyhow::Result<()> {
    if table_has_column(conn, "grades", "revision")? {
        return Ok(());
    }
    conn.execute(
        "ALTER TABLE grades ADD COLUMN revision INTEGER NOT NULL DEFAULT 1",
        [],
    )?;
    Ok(())
}

fn ensure_grades_updated_at(conn: &Connection) -> anyhow::Result<()> {
    if table_has_column(conn, "grades", "updated_at")? {
        return Ok(());
    }
    conn.execute("ALTER TABLE grades ADD COLUMN updated_at TEXT", [])?;
    conn.execute(
        "UPDATE grades SET updated_at = created_at WHERE updated_at IS NULL",
        [],
    )?;
    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
