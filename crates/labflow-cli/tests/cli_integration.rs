//! CLI subprocess integration tests.
//!
//! These tests invoke the `labflow` binary as a subprocess and verify
//! exit codes, stdout content, and JSON output stability.

use std::path::Path;
use std::process::{Command, Output};

fn labflow_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_labflow"))
}

fn run(store: &Path, args: &[&str]) -> Output {
    let store_arg = store.to_string_lossy().into_owned();
    labflow_bin()
        .args(["--store", &store_arg])
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn expect_success(output: &Output, what: &str) {
    assert!(
        output.status.success(),
        "{what} must exit 0. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Register the standard cast and return (admin, student, tutor, hod,
/// principal) session tokens.
fn seed(store: &Path) -> (String, String, String, String, String) {
    const DEPT: &str = "Computer Science and Engineering";
    let out = run(store, &["register", "admin-1", "Registrar", "--role", "admin"]);
    expect_success(&out, "register admin");
    let out = run(
        store,
        &[
            "register",
            "student-1",
            "Devi Pillai",
            "--role",
            "student",
            "--department",
            DEPT,
        ],
    );
    expect_success(&out, "register student");
    for (id, name) in [
        ("tutor-1", "Asha Nair"),
        ("hod-1", "Ravi Menon"),
        ("principal-1", "Dr. Kurian"),
    ] {
        let out = run(
            store,
            &["register", id, name, "--role", "staff", "--department", DEPT],
        );
        expect_success(&out, "register staff");
    }

    let login = |id: &str| -> String {
        let out = run(store, &["login", id]);
        expect_success(&out, "login");
        stdout(&out).trim().to_owned()
    };
    let admin = login("admin-1");

    for (user, designation) in [("hod-1", "hod"), ("principal-1", "principal")] {
        let out = run(store, &["designate", user, designation, "--session", &admin]);
        expect_success(&out, "designate");
    }

    let out = run(
        store,
        &[
            "lab-add",
            "lab-1",
            "Systems Lab",
            "--capacity",
            "30",
            "--location",
            "Block C",
            "--session",
            &admin,
        ],
    );
    expect_success(&out, "lab-add");

    (
        admin,
        login("student-1"),
        login("tutor-1"),
        login("hod-1"),
        login("principal-1"),
    )
}

fn submit(store: &Path, student: &str, slot: &str) -> String {
    let out = run(
        store,
        &[
            "--json",
            "submit",
            "--lab",
            "lab-1",
            "--tutor",
            "tutor-1",
            "--subject",
            "Compiler project demo",
            "--slot",
            slot,
            "--session",
            student,
        ],
    );
    expect_success(&out, "submit");
    let request: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    request["id"].as_str().unwrap().to_owned()
}

#[test]
fn cli_version_exits_zero() {
    let output = labflow_bin().arg("--version").output().unwrap();
    assert!(output.status.success(), "labflow --version must exit 0");
    let out = String::from_utf8_lossy(&output.stdout);
    assert!(
        out.contains("labflow"),
        "version output must contain 'labflow': {out}"
    );
}

#[test]
fn cli_help_lists_commands() {
    let output = labflow_bin().arg("--help").output().unwrap();
    assert!(output.status.success(), "labflow --help must exit 0");
    let out = String::from_utf8_lossy(&output.stdout);
    assert!(out.contains("submit"), "help must list 'submit'");
    assert!(out.contains("decide"), "help must list 'decide'");
    assert!(out.contains("reservations"), "help must list 'reservations'");
}

#[test]
fn full_approval_chain_through_cli() {
    let store = tempfile::tempdir().unwrap();
    let (_admin, student, tutor, hod, principal) = seed(store.path());

    let request_id = submit(store.path(), &student, "2024-05-01:FN");

    for (session, action) in [(&tutor, "forward"), (&hod, "forward"), (&principal, "approve")] {
        let out = run(
            store.path(),
            &[
                "decide",
                &request_id,
                action,
                "--remark",
                "ok",
                "--session",
                session,
            ],
        );
        expect_success(&out, "decide");
    }

    // The reservation is visible on the calendar listing
    let out = run(store.path(), &["reservations", "lab-1"]);
    expect_success(&out, "reservations");
    let listing = stdout(&out);
    assert!(listing.contains("2024-05-01"), "reservation listing: {listing}");
    assert!(listing.contains("FN"));

    // Inspect shows the full approval trail
    let out = run(store.path(), &["inspect", &request_id]);
    expect_success(&out, "inspect");
    let detail = stdout(&out);
    assert!(detail.contains("approved"));
    assert!(detail.contains("Asha Nair"));
    assert!(detail.contains("Ravi Menon"));
    assert!(detail.contains("Dr. Kurian"));
}

#[test]
fn replayed_decision_exits_not_eligible() {
    let store = tempfile::tempdir().unwrap();
    let (_admin, student, tutor, _hod, _principal) = seed(store.path());

    let request_id = submit(store.path(), &student, "2024-05-01:FN");

    let out = run(
        store.path(),
        &["decide", &request_id, "forward", "--session", &tutor],
    );
    expect_success(&out, "first forward");

    let out = run(
        store.path(),
        &["decide", &request_id, "forward", "--session", &tutor],
    );
    assert_eq!(
        out.status.code(),
        Some(4),
        "replayed forward must exit with the not-eligible code. stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
}

#[test]
fn conflicting_approval_exits_conflict() {
    let store = tempfile::tempdir().unwrap();
    let (_admin, student, tutor, hod, principal) = seed(store.path());

    // First request claims the forenoon and is fully approved
    let first = submit(store.path(), &student, "2024-05-01:FN");
    for (session, action) in [(&tutor, "forward"), (&hod, "forward"), (&principal, "approve")] {
        let out = run(
            store.path(),
            &["decide", &first, action, "--session", session],
        );
        expect_success(&out, "decide");
    }

    // Second request wants the full day — staged to the principal, then blocked
    let second = submit(store.path(), &student, "2024-05-01:FULL");
    for session in [&tutor, &hod] {
        let out = run(
            store.path(),
            &["decide", &second, "forward", "--session", session],
        );
        expect_success(&out, "staging decide");
    }
    let out = run(
        store.path(),
        &["decide", &second, "approve", "--session", &principal],
    );
    assert_eq!(out.status.code(), Some(5), "conflict must exit code 5");
    assert!(stdout(&out).contains("slot already booked"));

    // Only the first reservation exists
    let out = run(store.path(), &["--json", "reservations", "lab-1"]);
    let reservations: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(reservations.as_array().unwrap().len(), 1);
}

#[test]
fn staff_without_department_exits_validation_error() {
    let store = tempfile::tempdir().unwrap();
    let out = run(
        store.path(),
        &["register", "s1", "No Department", "--role", "staff"],
    );
    assert_eq!(
        out.status.code(),
        Some(2),
        "missing staff department must exit the validation code"
    );
}

#[test]
fn role_scoped_list_shows_queue() {
    let store = tempfile::tempdir().unwrap();
    let (_admin, student, tutor, hod, _principal) = seed(store.path());

    let request_id = submit(store.path(), &student, "2024-05-02:AN");

    // Tutor sees it pending; HOD sees nothing yet
    let out = run(store.path(), &["list", "--session", &tutor]);
    assert!(stdout(&out).contains("pending"));
    let out = run(store.path(), &["list", "--session", &hod]);
    assert!(stdout(&out).contains("no requests found"));

    let out = run(
        store.path(),
        &["decide", &request_id, "forward", "--session", &tutor],
    );
    expect_success(&out, "forward");

    let out = run(store.path(), &["list", "--session", &hod]);
    assert!(stdout(&out).contains("forwarded_to_hod"));
}

#[test]
fn creator_can_delete_unapproved_request() {
    let store = tempfile::tempdir().unwrap();
    let (_admin, student, tutor, _hod, _principal) = seed(store.path());

    let request_id = submit(store.path(), &student, "2024-05-04:FN");

    // Someone else's session may not delete it
    let out = run(
        store.path(),
        &["delete", &request_id, "--session", &tutor],
    );
    assert!(!out.status.success(), "foreign delete must fail");

    let out = run(
        store.path(),
        &["delete", &request_id, "--session", &student],
    );
    expect_success(&out, "delete");

    let out = run(store.path(), &["inspect", &request_id]);
    assert!(!out.status.success(), "deleted request must be gone");
}

#[test]
fn doctor_reports_healthy_store() {
    let store = tempfile::tempdir().unwrap();
    let (_admin, _student, _tutor, _hod, _principal) = seed(store.path());

    let out = run(store.path(), &["--json", "doctor"]);
    expect_success(&out, "doctor");
    let report: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(report["healthy"], serde_json::Value::Bool(true));
}
