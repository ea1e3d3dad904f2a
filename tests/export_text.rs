mod test_support;

use chrono::{Local, TimeZone};
use gradetrackd::export;
use gradetrackd::model::StudentRecord;
use test_support::temp_dir;

fn alice() -> StudentRecord {
    StudentRecord {
        id: 1,
        name: "Alice".into(),
        roll_number: "R1".into(),
        created_at: String::new(),
        grades: [("Science".to_string(), 90.0), ("Math".to_string(), 80.5)]
            .into_iter()
            .collect(),
    }
}

fn bob() -> StudentRecord {
    StudentRecord {
        id: 2,
        name: "Bob".into(),
        roll_number: "R2".into(),
        created_at: String::new(),
        grades: Default::default(),
    }
}

#[test]
fn text_export_lists_students_with_sorted_grades() {
    let at = Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
    let text = export::render_text(&[alice(), bob()], at);
    let banner = "=".repeat(80);

    let expected = format!(
        "{banner}\n\
         STUDENT PERFORMANCE TRACKER - DATA EXPORT\n\
         Generated: 2024-03-05 14:07:09\n\
         {banner}\n\n\
         Name: Alice\n\
         Roll Number: R1\n\
         Average Grade: 85.25\n\
         {rule}\n\
         Grades:\n  Math: 80.5\n  Science: 90.0\n\
         \n{banner}\n\n\
         Name: Bob\n\
         Roll Number: R2\n\
         Average Grade: 0\n\
         {rule}\n\
         No grades recorded.\n\
         \n{banner}\n\n",
        rule = "-".repeat(40),
    );
    assert_eq!(text, expected);
}

#[test]
fn empty_export_says_so() {
    let text = export::render_text(&[], Local::now());
    assert!(text.ends_with("No student data available.\n"));
}

#[test]
fn export_file_lands_in_requested_directory() {
    let dir = temp_dir("gradetrack-export");
    let out = dir.path().join("nested").join("exports");
    let summary = export::write_text_export(&out, &[alice()]).expect("export");

    assert_eq!(summary.student_count, 1);
    assert!(summary.path.starts_with(&out));
    let name = summary
        .path
        .file_name()
        .and_then(|n| n.to_str())
        .expect("file name");
    assert!(name.starts_with("student_data_") && name.ends_with(".txt"));
    let body = std::fs::read_to_string(&summary.path).expect("read export");
    assert!(body.contains("Roll Number: R1"));
}

#[test]
fn back_to_back_exports_keep_both_files() {
    let dir = temp_dir("gradetrack-export-twice");
    let first = export::write_text_export(dir.path(), &[alice()]).expect("first export");
    let second = export::write_text_export(dir.path(), &[alice(), bob()]).expect("second export");

    assert_ne!(first.path, second.path);
    let first_body = std::fs::read_to_string(&first.path).expect("read first");
    let second_body = std::fs::read_to_string(&second.path).expect("read second");
    assert!(!first_body.contains("Roll Number: R2"));
    assert!(second_body.contains("Roll Number: R2"));
}

#[test]
fn graded_zero_average_keeps_its_decimal() {
    let mut zero = bob();
    zero.grades.insert("Math".to_string(), 0.0);
    let text = export::render_text(&[zero], Local::now());
    assert!(text.contains("Average Grade: 0.0\n"));
    assert!(text.contains("  Math: 0.0\n"));
}
