use crate::calc;
use crate::model::StudentRecord;
use anyhow::Context;
use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};

const BANNER_WIDTH: usize = 80;
const RULE_WIDTH: usize = 40;
const MAX_NAME_SUFFIX: usize = 1000;

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub student_count: usize,
}

/// Whole numbers keep one decimal (`85.0`), everything else prints as-is.
fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.is_finite() {
        format!("{:.1}", v)
    } else {
        v.to_string()
    }
}

/// Plain-text listing of every student with their sorted grades.
pub fn render_text(students: &[StudentRecord], generated_at: DateTime<Local>) -> String {
    let banner = "=".repeat(BANNER_WIDTH);
    let mut out = String::new();
    let _ = writeln!(out, "{banner}");
    let _ = writeln!(out, "STUDENT PERFORMANCE TRACKER - DATA EXPORT");
    let _ = writeln!(out, "Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "{banner}\n");

    if students.is_empty() {
        let _ = writeln!(out, "No student data available.");
        return out;
    }

    for s in students {
        let _ = writeln!(out, "Name: {}", s.name);
        let _ = writeln!(out, "Roll Number: {}", s.roll_number);
        // An ungraded student's average prints as a bare `0`.
        let average = if s.grades.is_empty() {
            "0".to_string()
        } else {
            format_number(calc::average(&s.grades))
        };
        let _ = writeln!(out, "Average Grade: {}", average);
        let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
        if s.grades.is_empty() {
            let _ = writeln!(out, "No grades recorded.");
        } else {
            let _ = writeln!(out, "Grades:");
            for (subject, grade) in &s.grades {
                let _ = writeln!(out, "  {}: {}", subject, format_number(*grade));
            }
        }
        let _ = writeln!(out, "\n{banner}\n");
    }
    out
}

/// Creates `<stem>.txt` in `out_dir`, or `<stem>_N.txt` when that name is taken.
fn create_unique(out_dir: &Path, stem: &str) -> anyhow::Result<(PathBuf, File)> {
    for n in 0..=MAX_NAME_SUFFIX {
        let name = if n == 0 {
            format!("{stem}.txt")
        } else {
            format!("{stem}_{n}.txt")
        };
        let path = out_dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("failed to create export {}", path.to_string_lossy())
                });
            }
        }
    }
    anyhow::bail!("no free export name for {} in {}", stem, out_dir.to_string_lossy())
}

pub fn write_text_export(
    out_dir: &Path,
    students: &[StudentRecord],
) -> anyhow::Result<ExportSummary> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create directory {}", out_dir.to_string_lossy()))?;

    let now = Local::now();
    let stem = format!("student_data_{}", now.format("%Y%m%d_%H%M%S"));
    let (path, mut file) = create_unique(out_dir, &stem)?;
    file.write_all(render_text(students, now).as_bytes())
        .with_context(|| format!("failed to write export {}", path.to_string_lossy()))?;

    tracing::info!(path = %path.display(), students = students.len(), "text export written");
    Ok(ExportSummary {
        path,
        student_count: students.len(),
    })
}
