//! HTTP client ↔ server E2E integration tests.
//!
//! These tests start a real `labflow-server` in-process on a random port
//! and drive the whole approval chain over the JSON API. No mocks.

use labflow_core::Engine;
use labflow_schema::{Designation, Identity, Lab, Role, User};
use labflow_server::TestServer;

const DEPT: &str = "Computer Science and Engineering";

/// Seed the store directly through the core, then start a server over it.
fn start_seeded_server() -> (TestServer, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    {
        let engine = Engine::new(dir.path());
        let now = "2024-01-01T00:00:00Z";
        engine
            .register_user(User::new("admin-1", "Registrar", Role::Admin, None, now))
            .unwrap();
        engine
            .register_user(User::new(
                "student-1",
                "Devi Pillai",
                Role::Student,
                Some(DEPT.to_owned()),
                now,
            ))
            .unwrap();
        for (id, name) in [
            ("tutor-1", "Asha Nair"),
            ("hod-1", "Ravi Menon"),
            ("principal-1", "Dr. Kurian"),
        ] {
            engine
                .register_user(User::new(id, name, Role::Staff, Some(DEPT.to_owned()), now))
                .unwrap();
        }
        let admin = Identity::from_user(&engine.get_user("admin-1").unwrap());
        engine
            .assign_designation(&admin, "hod-1", Designation::Hod)
            .unwrap();
        engine
            .assign_designation(&admin, "principal-1", Designation::Principal)
            .unwrap();
        engine
            .add_lab(&admin, Lab::new("lab-1", "Systems Lab", 30, "Block C"))
            .unwrap();
    }
    let server = TestServer::start(dir.path().to_path_buf());
    (server, dir)
}

/// GET returning (status, body). Non-2xx statuses come back as values,
/// not panics.
fn get(url: &str) -> (u16, String) {
    match ureq::get(url).call() {
        Ok(resp) => {
            let status = resp.status().as_u16();
            let body = resp
                .into_body()
                .read_to_string()
                .unwrap_or_default();
            (status, body)
        }
        Err(ureq::Error::StatusCode(code)) => (code, String::new()),
        Err(e) => panic!("GET {url} failed: {e}"),
    }
}

/// POST a JSON value, returning (status, body).
fn post(url: &str, body: &serde_json::Value) -> (u16, String) {
    let payload = body.to_string();
    match ureq::post(url)
        .header("Content-Type", "application/json")
        .send(payload.as_bytes())
    {
        Ok(resp) => {
            let status = resp.status().as_u16();
            let body = resp
                .into_body()
                .read_to_string()
                .unwrap_or_default();
            (status, body)
        }
        Err(ureq::Error::StatusCode(code)) => (code, String::new()),
        Err(e) => panic!("POST {url} failed: {e}"),
    }
}

fn open_session(url: &str, user_id: &str) -> String {
    let (status, body) = post(
        &format!("{url}/sessions"),
        &serde_json::json!({ "user_id": user_id }),
    );
    assert_eq!(status, 201, "session open failed: {body}");
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    value["token"].as_str().unwrap().to_owned()
}

fn submit(url: &str, session: &str, slots: serde_json::Value) -> String {
    let (status, body) = post(
        &format!("{url}/requests"),
        &serde_json::json!({
            "session": session,
            "lab_id": "lab-1",
            "staff_id": "tutor-1",
            "subject": "Compiler project demo",
            "slots": slots,
        }),
    );
    assert_eq!(status, 201, "submit failed: {body}");
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    value["id"].as_str().unwrap().to_owned()
}

fn decide(url: &str, session: &str, request_id: &str, decision: &str) -> (u16, String) {
    post(
        &format!("{url}/requests/{request_id}/decision"),
        &serde_json::json!({ "session": session, "decision": decision, "remark": "ok" }),
    )
}

#[test]
fn health_endpoint_responds() {
    let (server, _dir) = start_seeded_server();
    let (status, body) = get(&format!("{}/health", server.url));
    assert_eq!(status, 200);
    assert!(body.contains("ok"));
}

#[test]
fn full_approval_chain_over_http() {
    let (server, _dir) = start_seeded_server();
    let url = &server.url;

    let student = open_session(url, "student-1");
    let request_id = submit(
        url,
        &student,
        serde_json::json!([{ "date": "2024-05-01", "time": "FN" }]),
    );

    for approver in ["tutor-1", "hod-1"] {
        let session = open_session(url, approver);
        let (status, body) = decide(url, &session, &request_id, "forward");
        assert_eq!(status, 200, "forward by {approver} failed: {body}");
    }

    let principal = open_session(url, "principal-1");
    let (status, body) = decide(url, &principal, &request_id, "approve");
    assert_eq!(status, 200, "approve failed: {body}");
    let approved: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(approved["status"], "approved");

    // The reservation shows up on the calendar route
    let (status, body) = get(&format!("{url}/reservations/lab-1"));
    assert_eq!(status, 200);
    let reservations: serde_json::Value = serde_json::from_str(&body).unwrap();
    let list = reservations.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["date"], "2024-05-01");
    assert_eq!(list[0]["time"], "FN");
}

#[test]
fn conflicting_approval_returns_409() {
    let (server, _dir) = start_seeded_server();
    let url = &server.url;

    let student = open_session(url, "student-1");
    let tutor = open_session(url, "tutor-1");
    let hod = open_session(url, "hod-1");
    let principal = open_session(url, "principal-1");

    // First booking takes the afternoon
    let first = submit(
        url,
        &student,
        serde_json::json!([{ "date": "2024-05-01", "time": "AN" }]),
    );
    decide(url, &tutor, &first, "forward");
    decide(url, &hod, &first, "forward");
    let (status, _) = decide(url, &principal, &first, "approve");
    assert_eq!(status, 200);

    // Second wants the full day and must be blocked
    let second = submit(
        url,
        &student,
        serde_json::json!([{ "date": "2024-05-01", "time": "FULL" }]),
    );
    decide(url, &tutor, &second, "forward");
    decide(url, &hod, &second, "forward");
    let (status, _) = decide(url, &principal, &second, "approve");
    assert_eq!(status, 409, "conflicting approval must return 409");

    // Nothing extra was booked, and the request is still decidable
    let (_, body) = get(&format!("{url}/reservations/lab-1"));
    let reservations: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(reservations.as_array().unwrap().len(), 1);

    let (status, body) = decide(url, &principal, &second, "send-back");
    assert_eq!(status, 200);
    let sent_back: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(sent_back["status"], "sent_back");
}

#[test]
fn ineligible_actor_returns_403() {
    let (server, _dir) = start_seeded_server();
    let url = &server.url;

    let student = open_session(url, "student-1");
    let request_id = submit(
        url,
        &student,
        serde_json::json!([{ "date": "2024-05-02", "time": "AN" }]),
    );

    // The HOD cannot act before the tutor forwarded
    let hod = open_session(url, "hod-1");
    let (status, _) = decide(url, &hod, &request_id, "forward");
    assert_eq!(status, 403);
}

#[test]
fn unknown_session_returns_401() {
    let (server, _dir) = start_seeded_server();
    let bogus = "f".repeat(64);
    let (status, _) = get(&format!("{}/requests?session={bogus}", server.url));
    assert_eq!(status, 401);

    let (status, _) = get(&format!("{}/requests", server.url));
    assert_eq!(status, 401, "missing session parameter must be rejected");
}

#[test]
fn role_scoped_listing_over_http() {
    let (server, _dir) = start_seeded_server();
    let url = &server.url;

    let student = open_session(url, "student-1");
    submit(
        url,
        &student,
        serde_json::json!([{ "date": "2024-05-03", "time": "FN" }]),
    );

    let (status, body) = get(&format!("{url}/requests?session={student}"));
    assert_eq!(status, 200);
    let own: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(own.as_array().unwrap().len(), 1);

    // The principal's queue is still empty
    let principal = open_session(url, "principal-1");
    let (_, body) = get(&format!("{url}/requests?session={principal}"));
    let queue: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(queue.as_array().unwrap().is_empty());
}

#[test]
fn unknown_route_returns_404() {
    let (server, _dir) = start_seeded_server();
    let (status, _) = get(&format!("{}/nope", server.url));
    assert_eq!(status, 404);
}

#[test]
fn submission_with_no_slots_returns_400() {
    let (server, _dir) = start_seeded_server();
    let url = &server.url;
    let student = open_session(url, "student-1");
    let (status, _) = post(
        &format!("{url}/requests"),
        &serde_json::json!({
            "session": student,
            "lab_id": "lab-1",
            "staff_id": "tutor-1",
            "subject": "Empty",
            "slots": [],
        }),
    );
    assert_eq!(status, 400);
}
