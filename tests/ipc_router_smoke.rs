mod test_support;

use serde_json::json;
use test_support::{error_code, request, request_ok, spawn_sidecar, temp_dir};

#[test]
fn store_methods_need_a_workspace() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let health = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    assert!(health.get("workspacePath").map(|v| v.is_null()).unwrap_or(false));

    let resp = request(
        &mut stdin,
        &mut reader,
        "2",
        "students.create",
        json!({ "name": "Alice", "rollNumber": "R1" }),
    );
    assert_eq!(error_code(&resp), Some("no_workspace"));

    let listed = request_ok(&mut stdin, &mut reader, "3", "students.list", json!({}));
    assert_eq!(listed["students"], json!([]));

    let unknown = request(&mut stdin, &mut reader, "4", "grades.delete", json!({}));
    assert_eq!(error_code(&unknown), Some("not_implemented"));
}

#[test]
fn grade_tracking_round_trip_over_ipc() {
    let workspace = temp_dir("gradetrack-ipc");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.path().to_string_lossy() }),
    );

    let alice = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.create",
        json!({ "name": " Alice ", "rollNumber": "R1" }),
    );
    let alice_id = alice["studentId"].as_i64().expect("studentId");
    assert_eq!(alice["name"], "Alice");

    let bob = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "students.create",
        json!({ "name": "Bob", "rollNumber": "R2" }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3a",
        "students.create",
        json!({ "name": "Carol", "rollNumber": "R3" }),
    );

    let dup = request(
        &mut stdin,
        &mut reader,
        "4",
        "students.create",
        json!({ "name": "Eve", "rollNumber": "R1" }),
    );
    assert_eq!(error_code(&dup), Some("already_exists"));

    let blank = request(
        &mut stdin,
        &mut reader,
        "5",
        "students.create",
        json!({ "name": "   ", "rollNumber": "R9" }),
    );
    assert_eq!(error_code(&blank), Some("invalid_input"));

    let stored = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "grades.upsert",
        json!({ "studentId": alice_id, "subject": "Math", "grade": 70 }),
    );
    assert_eq!(stored["grade"]["revision"], 1);

    let out_of_range = request(
        &mut stdin,
        &mut reader,
        "7",
        "grades.upsert",
        json!({ "studentId": alice_id, "subject": "Math", "grade": 101 }),
    );
    assert_eq!(error_code(&out_of_range), Some("invalid_grade"));

    let missing = request(
        &mut stdin,
        &mut reader,
        "8",
        "grades.upsert",
        json!({ "studentId": 4242, "subject": "Math", "grade": 50 }),
    );
    assert_eq!(error_code(&missing), Some("student_not_found"));

    let bulk = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "grades.bulkUpsert",
        json!({
            "rollNumber": "R2",
            "entries": [
                { "subject": "Math", "grade": "95" },
                { "subject": "Science", "grade": "abc" },
                { "subject": "Art" }
            ]
        }),
    );
    assert_eq!(bulk["updated"], 1);
    assert_eq!(bulk["rejected"], 2);
    let codes: Vec<&str> = bulk["errors"]
        .as_array()
        .expect("errors")
        .iter()
        .filter_map(|e| e["code"].as_str())
        .collect();
    assert!(codes.contains(&"invalid_grade"));
    assert!(codes.contains(&"bad_params"));
    assert_eq!(bob["rollNumber"], "R2");

    let topper = request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "analytics.topper",
        json!({ "subject": "Math" }),
    );
    assert_eq!(
        topper["topper"],
        json!({ "name": "Bob", "rollNumber": "R2", "grade": 95.0 })
    );

    let avg = request_ok(
        &mut stdin,
        &mut reader,
        "11",
        "analytics.classAverage",
        json!({ "subject": "Math" }),
    );
    assert_eq!(avg["average"], 82.5);

    let none = request_ok(
        &mut stdin,
        &mut reader,
        "12",
        "analytics.classAverage",
        json!({ "subject": "History" }),
    );
    assert!(none["average"].is_null());

    let dashboard = request_ok(&mut stdin, &mut reader, "13", "analytics.dashboard", json!({}));
    assert_eq!(dashboard["totalStudents"], 3);
    assert_eq!(dashboard["totalGrades"], 2);
    assert_eq!(dashboard["totalSubjects"], 1);
    assert_eq!(dashboard["overallAverage"], 82.5);

    let recent = request_ok(
        &mut stdin,
        &mut reader,
        "14",
        "students.recent",
        json!({ "limit": 1 }),
    );
    assert_eq!(recent["students"][0]["rollNumber"], "R3");

    let exported = request_ok(&mut stdin, &mut reader, "15", "export.text", json!({}));
    assert_eq!(exported["studentCount"], 3);
    let export_path = exported["path"].as_str().expect("path");
    assert!(std::path::Path::new(export_path).starts_with(workspace.path().join("exports")));

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "16",
        "students.delete",
        json!({ "rollNumber": "R2" }),
    );
    let gone = request(
        &mut stdin,
        &mut reader,
        "17",
        "students.get",
        json!({ "rollNumber": "R2" }),
    );
    assert_eq!(error_code(&gone), Some("not_found"));

    let subjects = request_ok(&mut stdin, &mut reader, "18", "subjects.list", json!({}));
    assert_eq!(subjects["subjects"], json!(["Math"]));

    let student = request_ok(
        &mut stdin,
        &mut reader,
        "19",
        "students.get",
        json!({ "rollNumber": "R1" }),
    );
    assert_eq!(student["grades"], json!({ "Math": 70.0 }));
    assert_eq!(student["average"], 70.0);
}

#[test]
fn non_numeric_grade_values_are_invalid_grades() {
    let workspace = temp_dir("gradetrack-ipc-grade-types");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.path().to_string_lossy() }),
    );
    let alice = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.create",
        json!({ "name": "Alice", "rollNumber": "R1" }),
    );
    let alice_id = alice["studentId"].as_i64().expect("studentId");

    for (i, grade) in [json!(true), json!(null), json!({}), json!([90])].into_iter().enumerate() {
        let resp = request(
            &mut stdin,
            &mut reader,
            &format!("3{}", i),
            "grades.upsert",
            json!({ "studentId": alice_id, "subject": "Math", "grade": grade.clone() }),
        );
        assert_eq!(error_code(&resp), Some("invalid_grade"), "grade {}", grade);
    }

    let missing = request(
        &mut stdin,
        &mut reader,
        "4",
        "grades.upsert",
        json!({ "studentId": alice_id, "subject": "Math" }),
    );
    assert_eq!(error_code(&missing), Some("bad_params"));

    let bulk = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "grades.bulkUpsert",
        json!({
            "rollNumber": "R1",
            "entries": [
                { "subject": "Math", "grade": 88 },
                { "subject": "Art", "grade": false },
                { "subject": "Music" }
            ]
        }),
    );
    assert_eq!(bulk["updated"], 1);
    let errors = bulk["errors"].as_array().expect("errors");
    assert_eq!(errors[0]["subject"], "Art");
    assert_eq!(errors[0]["code"], "invalid_grade");
    assert_eq!(errors[1]["subject"], "Music");
    assert_eq!(errors[1]["code"], "bad_params");

    let student = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "students.get",
        json!({ "rollNumber": "R1" }),
    );
    assert_eq!(student["grades"], json!({ "Math": 88.0 }));
}
