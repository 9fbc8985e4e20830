//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results or error kinds. Comparing parsed JSON (not raw
//! strings) avoids false negatives from field-ordering differences.

use serde_json::Value;
use task_core::{
    ApiError, CreateTask, HttpMethod, HttpRequest, HttpResponse, ListQuery, Task, TaskClient,
    UpdateTask,
};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:3000";

fn client() -> TaskClient {
    TaskClient::new(BASE_URL)
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn load(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

fn simulated_response(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse::new(
        sim["status"].as_u64().unwrap() as u16,
        sim["body"].as_str().unwrap(),
    )
}

/// Compare method, path and (when the vector has one) the JSON body.
fn assert_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(
        req.path,
        format!("{BASE_URL}{}", expected["path"].as_str().unwrap()),
        "{name}: path"
    );
    match expected.get("body") {
        Some(body) => {
            let actual: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&actual, body, "{name}: body");
        }
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }
}

fn assert_error_kind(name: &str, err: ApiError, case: &Value) {
    match case["expected_error"].as_str().unwrap() {
        "NotFound" => assert!(matches!(err, ApiError::NotFound), "{name}: expected NotFound"),
        "Validation" => {
            assert!(matches!(err, ApiError::Validation(_)), "{name}: expected Validation")
        }
        "Http" => assert!(matches!(err, ApiError::Http { .. }), "{name}: expected Http"),
        other => panic!("{name}: unknown expected_error: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[test]
fn create_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/create.json")) {
        let name = case["name"].as_str().unwrap();
        let input: CreateTask = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_create_task(&input).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let expected_headers: Vec<(String, String)> =
            serde_json::from_value(case["expected_request"]["headers"].clone()).unwrap();
        assert_eq!(req.headers, expected_headers, "{name}: headers");

        match c.parse_create_task(simulated_response(&case)) {
            Ok(task) => {
                let expected: Task = serde_json::from_value(case["expected_result"].clone()).unwrap();
                assert_eq!(task, expected, "{name}: parsed result");
            }
            Err(err) => assert_error_kind(name, err, &case),
        }
    }
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[test]
fn list_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/list.json")) {
        let name = case["name"].as_str().unwrap();
        let q = &case["query"];
        let query = ListQuery {
            completed: q["completed"].as_bool(),
            category: q["category"].as_str().map(str::to_string),
            sort_by: q["sortBy"].as_str().map(str::to_string),
            sort_order: q["sortOrder"].as_str().map(str::to_string),
        };

        let req = c.build_list_tasks(&query);
        assert_request(name, &req, &case["expected_request"]);

        match c.parse_list_tasks(simulated_response(&case)) {
            Ok(tasks) => {
                let expected: Vec<Task> =
                    serde_json::from_value(case["expected_result"].clone()).unwrap();
                assert_eq!(tasks, expected, "{name}: parsed result");
            }
            Err(err) => assert_error_kind(name, err, &case),
        }
    }
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[test]
fn update_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/update.json")) {
        let name = case["name"].as_str().unwrap();
        let id: Uuid = case["input_id"].as_str().unwrap().parse().unwrap();
        let input: UpdateTask = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_update_task(id, &input).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        match c.parse_update_task(simulated_response(&case)) {
            Ok(task) => {
                let expected: Task = serde_json::from_value(case["expected_result"].clone()).unwrap();
                assert_eq!(task, expected, "{name}: parsed result");
            }
            Err(err) => assert_error_kind(name, err, &case),
        }
    }
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[test]
fn delete_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/delete.json")) {
        let name = case["name"].as_str().unwrap();
        let id: Uuid = case["input_id"].as_str().unwrap().parse().unwrap();

        let req = c.build_delete_task(id);
        assert_request(name, &req, &case["expected_request"]);

        match c.parse_delete_task(simulated_response(&case)) {
            Ok(message) => {
                assert_eq!(message, case["expected_result"].as_str().unwrap(), "{name}: message")
            }
            Err(err) => assert_error_kind(name, err, &case),
        }
    }
}
