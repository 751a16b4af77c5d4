mod test_support;

use serde_json::json;
use test_support::{
    create_assessment, create_student, request_err, request_ok, spawn_sidecar, str_field,
    teacher_auth, temp_dir, upsert_rating,
};

#[test]
fn repeated_upserts_converge_to_one_row() {
    let dir = temp_dir("drdp-ratings-upsert");
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&dir.join("drdp.sqlite3"));

    let student_id = create_student(&mut stdin, &mut reader, "1", "Jane", "Doe", "K");
    let assessment_id =
        create_assessment(&mut stdin, &mut reader, "2", &student_id, "2024-09-15", "Fall");

    let first = upsert_rating(&mut stdin, &mut reader, "3", &assessment_id, "LLD-9", "building-earlier");
    let second = upsert_rating(&mut stdin, &mut reader, "4", &assessment_id, "LLD-9", "building-middle");
    let third = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "ratings.upsert",
        json!({
            "assessmentId": assessment_id,
            "measureId": "lld-9",
            "levelId": "building-later",
            "notes": "reads simple words"
        }),
    );
    assert_eq!(str_field(&first, "ratingId"), str_field(&second, "ratingId"));
    assert_eq!(str_field(&first, "ratingId"), str_field(&third, "ratingId"));

    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "assessments.open",
        json!({ "assessmentId": assessment_id }),
    );
    let ratings = opened["assessment"]["ratings"].as_array().expect("ratings");
    assert_eq!(ratings.len(), 1);
    assert_eq!(ratings[0]["developmentalLevelId"], json!("building-later"));
    assert_eq!(ratings[0]["observationNotes"], json!("reads simple words"));
    assert_eq!(opened["assessment"]["progress"]["ratedCount"], json!(1));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn ratings_follow_reference_order_and_reject_foreign_catalog_entries() {
    let dir = temp_dir("drdp-ratings-validate");
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&dir.join("drdp.sqlite3"));
    let auth = teacher_auth();

    let student_id = create_student(&mut stdin, &mut reader, "1", "Jane", "Doe", "K");
    let assessment_id =
        create_assessment(&mut stdin, &mut reader, "2", &student_id, "2024-09-15", "Fall");

    upsert_rating(&mut stdin, &mut reader, "3", &assessment_id, "MATH-1", "exploring-later");
    upsert_rating(&mut stdin, &mut reader, "4", &assessment_id, "ATL-REG-1", "building-earlier");
    upsert_rating(&mut stdin, &mut reader, "5", &assessment_id, "LLD-2", "building-middle");

    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "assessments.open",
        json!({ "assessmentId": assessment_id }),
    );
    let order: Vec<String> = opened["assessment"]["ratings"]
        .as_array()
        .expect("ratings")
        .iter()
        .map(|r| str_field(r, "measureId"))
        .collect();
    assert_eq!(order, vec!["ATL-REG-1", "LLD-2", "MATH-1"]);

    // COG belongs to the preschool catalog only.
    let code = request_err(
        &mut stdin,
        &mut reader,
        "7",
        "ratings.upsert",
        json!({ "assessmentId": assessment_id, "measureId": "COG-1", "levelId": "building-earlier" }),
        Some(&auth),
    );
    assert_eq!(code, "bad_params");
    // responding-* levels do not exist on the kindergarten scale.
    let code = request_err(
        &mut stdin,
        &mut reader,
        "8",
        "ratings.upsert",
        json!({ "assessmentId": assessment_id, "measureId": "LLD-1", "levelId": "responding-earlier" }),
        Some(&auth),
    );
    assert_eq!(code, "bad_params");
    let code = request_err(
        &mut stdin,
        &mut reader,
        "9",
        "ratings.upsert",
        json!({ "assessmentId": "missing", "measureId": "LLD-1", "levelId": "building-earlier" }),
        Some(&auth),
    );
    assert_eq!(code, "not_found");

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn observations_list_newest_first_and_delete_leaves_rating() {
    let dir = temp_dir("drdp-ratings-observations");
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&dir.join("drdp.sqlite3"));
    let auth = teacher_auth();

    let student_id = create_student(&mut stdin, &mut reader, "1", "Jane", "Doe", "K");
    let assessment_id =
        create_assessment(&mut stdin, &mut reader, "2", &student_id, "2024-09-15", "Fall");
    let rating = upsert_rating(&mut stdin, &mut reader, "3", &assessment_id, "LLD-9", "building-earlier");
    let rating_id = str_field(&rating, "ratingId");

    let early = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "observations.create",
        json!({ "ratingId": rating_id, "observationDate": "2024-01-01", "text": "named 12 letters" }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "observations.create",
        json!({ "ratingId": rating_id, "observationDate": "2024-01-15", "text": "named 20 letters" }),
    );

    let listed = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "observations.list",
        json!({ "ratingId": rating_id }),
    );
    let dates: Vec<String> = listed["observations"]
        .as_array()
        .expect("observations")
        .iter()
        .map(|o| str_field(o, "observationDate"))
        .collect();
    assert_eq!(dates, vec!["2024-01-15", "2024-01-01"]);

    let code = request_err(
        &mut stdin,
        &mut reader,
        "7",
        "observations.create",
        json!({ "ratingId": rating_id, "text": "   " }),
        Some(&auth),
    );
    assert_eq!(code, "bad_params");
    let code = request_err(
        &mut stdin,
        &mut reader,
        "8",
        "observations.create",
        json!({ "ratingId": "missing", "text": "note" }),
        Some(&auth),
    );
    assert_eq!(code, "not_found");

    request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "observations.delete",
        json!({ "observationId": str_field(&early, "observationId") }),
    );
    let listed = request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "observations.list",
        json!({ "ratingId": rating_id }),
    );
    assert_eq!(listed["observations"].as_array().map(|o| o.len()), Some(1));
    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "11",
        "assessments.open",
        json!({ "assessmentId": assessment_id }),
    );
    let ratings = opened["assessment"]["ratings"].as_array().expect("ratings");
    assert_eq!(ratings.len(), 1);
    assert_eq!(ratings[0]["developmentalLevelId"], json!("building-earlier"));
    assert_eq!(ratings[0]["observations"].as_array().map(|o| o.len()), Some(1));

    let code = request_err(
        &mut stdin,
        &mut reader,
        "12",
        "observations.delete",
        json!({ "observationId": str_field(&early, "observationId") }),
        Some(&auth),
    );
    assert_eq!(code, "not_found");

    let removed = request_ok(
        &mut stdin,
        &mut reader,
        "13",
        "ratings.delete",
        json!({ "ratingId": rating_id }),
    );
    assert_eq!(removed["observationsDeleted"], json!(1));
    let code = request_err(
        &mut stdin,
        &mut reader,
        "14",
        "observations.list",
        json!({ "ratingId": rating_id }),
        Some(&auth),
    );
    assert_eq!(code, "not_found");

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(dir);
}
