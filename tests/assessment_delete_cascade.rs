mod test_support;

use serde_json::json;
use test_support::{
    create_assessment, create_student, request_err, request_ok, spawn_sidecar, str_field,
    teacher_auth, temp_dir, upsert_rating,
};

#[test]
fn deleting_an_assessment_removes_ratings_and_observations() {
    let dir = temp_dir("drdp-delete-cascade");
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&dir.join("drdp.sqlite3"));
    let auth = teacher_auth();

    let student_id = create_student(&mut stdin, &mut reader, "1", "Jane", "Doe", "K");
    let doomed =
        create_assessment(&mut stdin, &mut reader, "2", &student_id, "2024-09-15", "Fall");
    let kept =
        create_assessment(&mut stdin, &mut reader, "3", &student_id, "2025-01-15", "Winter");

    let r1 = upsert_rating(&mut stdin, &mut reader, "4", &doomed, "LLD-9", "building-earlier");
    let r2 = upsert_rating(&mut stdin, &mut reader, "5", &doomed, "SED-1", "exploring-later");
    let kept_rating = upsert_rating(&mut stdin, &mut reader, "6", &kept, "LLD-9", "building-later");
    for (i, rating) in [&r1, &r1, &r2].iter().enumerate() {
        request_ok(
            &mut stdin,
            &mut reader,
            &format!("o{}", i),
            "observations.create",
            json!({ "ratingId": str_field(rating, "ratingId"), "text": format!("note {}", i) }),
        );
    }

    let deleted = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "assessments.delete",
        json!({ "assessmentId": doomed }),
    );
    assert_eq!(deleted["deleted"]["ratingsDeleted"], json!(2));
    assert_eq!(deleted["deleted"]["observationsDeleted"], json!(3));

    let code = request_err(
        &mut stdin,
        &mut reader,
        "8",
        "assessments.open",
        json!({ "assessmentId": doomed }),
        Some(&auth),
    );
    assert_eq!(code, "not_found");
    for (i, rating) in [&r1, &r2].iter().enumerate() {
        let code = request_err(
            &mut stdin,
            &mut reader,
            &format!("r{}", i),
            "observations.list",
            json!({ "ratingId": str_field(rating, "ratingId") }),
            Some(&auth),
        );
        assert_eq!(code, "not_found");
    }

    // The sibling assessment is untouched.
    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "assessments.open",
        json!({ "assessmentId": kept }),
    );
    let ratings = opened["assessment"]["ratings"].as_array().expect("ratings");
    assert_eq!(ratings.len(), 1);
    assert_eq!(str_field(&ratings[0], "id"), str_field(&kept_rating, "ratingId"));

    let code = request_err(
        &mut stdin,
        &mut reader,
        "10",
        "assessments.delete",
        json!({ "assessmentId": doomed }),
        Some(&auth),
    );
    assert_eq!(code, "not_found");

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(dir);
}
