//! Reference HTTP adapter for the Labflow core.
//!
//! A thin JSON layer over [`Engine`]: sessions, request submission,
//! approval decisions, role-scoped listings, and reservation calendars.
//! A detected slot conflict maps to `409 Conflict` with the colliding
//! slot in the body — an actionable result, not a failure.
//!
//! The [`TestServer`] helper starts a server on a random port for
//! integration testing.

use labflow_core::{CoreError, Decision, DecisionOutcome, Engine};
use labflow_schema::{RequestDraft, SessionToken, Slot};
use labflow_store::StoreError;
use serde::Deserialize;
use std::io::Read;
use std::sync::Arc;
use tiny_http::{Header, Method, Response, Server, StatusCode};
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct SessionBody {
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct SubmitBody {
    session: String,
    lab_id: String,
    staff_id: String,
    department: Option<String>,
    subject: String,
    #[serde(default)]
    description: String,
    slots: Vec<Slot>,
}

#[derive(Debug, Deserialize)]
struct DecisionBody {
    session: String,
    decision: String,
    #[serde(default)]
    remark: String,
}

/// The HTTP status a core failure maps to.
fn error_status(err: &CoreError) -> u16 {
    match err {
        CoreError::NotAuthenticated => 401,
        CoreError::NotEligible { .. } | CoreError::Forbidden(_) => 403,
        CoreError::Store(
            StoreError::RequestNotFound(_)
            | StoreError::LabNotFound(_)
            | StoreError::UserNotFound(_)
            | StoreError::ReservationNotFound(_),
        ) => 404,
        CoreError::Validation(_) => 400,
        CoreError::DesignationHeld { .. }
        | CoreError::UserExists(_)
        | CoreError::LabExists(_)
        | CoreError::LabInUse(_)
        | CoreError::RequestImmutable(_) => 409,
        _ => 500,
    }
}

/// Split a URL into its path segments and an optional `session` query value.
pub fn parse_url(url: &str) -> (Vec<&str>, Option<&str>) {
    let (path, query) = match url.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (url, None),
    };
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let session = query.and_then(|q| {
        q.split('&')
            .find_map(|pair| pair.strip_prefix("session="))
            .filter(|s| !s.is_empty())
    });
    (segments, session)
}

fn respond_err(req: tiny_http::Request, code: u16, msg: &str) {
    let body = serde_json::json!({ "error": msg }).to_string();
    let header = Header::from_bytes("Content-Type", "application/json").expect("valid header");
    let _ = req.respond(
        Response::from_string(body)
            .with_header(header)
            .with_status_code(StatusCode(code)),
    );
}

fn respond_json(req: tiny_http::Request, code: u16, value: &impl serde::Serialize) {
    let body = serde_json::to_string(value).unwrap_or_else(|_| "{}".to_owned());
    let header = Header::from_bytes("Content-Type", "application/json").expect("valid header");
    let _ = req.respond(
        Response::from_string(body)
            .with_header(header)
            .with_status_code(StatusCode(code)),
    );
}

fn respond_core_err(req: tiny_http::Request, err: &CoreError) {
    respond_err(req, error_status(err), &err.to_string());
}

fn read_body(req: &mut tiny_http::Request) -> Option<Vec<u8>> {
    let mut body = Vec::new();
    if req.as_reader().read_to_end(&mut body).is_ok() {
        Some(body)
    } else {
        None
    }
}

fn parse_body<T: for<'de> Deserialize<'de>>(
    req: &mut tiny_http::Request,
) -> Result<T, &'static str> {
    let Some(body) = read_body(req) else {
        return Err("read error");
    };
    serde_json::from_slice(&body).map_err(|_| "invalid JSON body")
}

fn handle_open_session(engine: &Engine, mut req: tiny_http::Request) {
    let body: SessionBody = match parse_body(&mut req) {
        Ok(b) => b,
        Err(msg) => {
            respond_err(req, 400, msg);
            return;
        }
    };
    match engine.open_session(&body.user_id) {
        Ok(token) => {
            info!("session opened for {}", body.user_id);
            respond_json(req, 201, &serde_json::json!({ "token": token }));
        }
        Err(e) => respond_core_err(req, &e),
    }
}

fn handle_list_requests(engine: &Engine, req: tiny_http::Request, session: Option<&str>) {
    let Some(session) = session else {
        respond_err(req, 401, "missing session query parameter");
        return;
    };
    let result = engine
        .resolve_identity(&SessionToken::new(session))
        .and_then(|identity| engine.list_requests_for(&identity));
    match result {
        Ok(requests) => respond_json(req, 200, &requests),
        Err(e) => respond_core_err(req, &e),
    }
}

fn handle_submit(engine: &Engine, mut req: tiny_http::Request) {
    let body: SubmitBody = match parse_body(&mut req) {
        Ok(b) => b,
        Err(msg) => {
            respond_err(req, 400, msg);
            return;
        }
    };
    let result = engine
        .resolve_identity(&SessionToken::new(&body.session))
        .and_then(|student| {
            let department = body
                .department
                .clone()
                .or_else(|| student.department.clone())
                .unwrap_or_default();
            let draft = RequestDraft {
                lab_id: body.lab_id.clone().into(),
                staff_id: body.staff_id.clone().into(),
                department,
                subject: body.subject.clone(),
                description: body.description.clone(),
                slots: body.slots.clone(),
            };
            engine.submit_request(&student, draft)
        });
    match result {
        Ok(request) => respond_json(req, 201, &request),
        Err(e) => respond_core_err(req, &e),
    }
}

fn handle_decision(engine: &Engine, mut req: tiny_http::Request, request_id: &str) {
    let body: DecisionBody = match parse_body(&mut req) {
        Ok(b) => b,
        Err(msg) => {
            respond_err(req, 400, msg);
            return;
        }
    };
    let decision: Decision = match body.decision.parse() {
        Ok(d) => d,
        Err(msg) => {
            respond_err(req, 400, &msg);
            return;
        }
    };
    let result = engine
        .resolve_identity(&SessionToken::new(&body.session))
        .and_then(|actor| engine.apply_decision(request_id, &actor, decision, &body.remark));
    match result {
        Ok(DecisionOutcome::Applied(request)) => {
            respond_json(req, 200, &request);
        }
        Ok(DecisionOutcome::Conflict(slot)) => {
            respond_json(req, 409, &serde_json::json!({ "conflict": slot }));
        }
        Err(e) => respond_core_err(req, &e),
    }
}

fn handle_reservations(engine: &Engine, req: tiny_http::Request, lab_id: &str) {
    match engine.list_reservations(lab_id) {
        Ok(reservations) => respond_json(req, 200, &reservations),
        Err(e) => respond_core_err(req, &e),
    }
}

/// Handle a single HTTP request, dispatching to the appropriate route handler.
pub fn handle_request(engine: &Engine, req: tiny_http::Request) {
    let method = req.method().clone();
    let url = req.url().to_owned();
    debug!("{method} {url}");

    let (segments, session) = parse_url(&url);
    match (&method, segments.as_slice()) {
        (Method::Get, ["health"]) => {
            let _ = req.respond(Response::from_string(r#"{"status":"ok"}"#));
        }
        (Method::Post, ["sessions"]) => handle_open_session(engine, req),
        (Method::Get, ["requests"]) => handle_list_requests(engine, req, session),
        (Method::Post, ["requests"]) => handle_submit(engine, req),
        (Method::Post, ["requests", request_id, "decision"]) => {
            let request_id = (*request_id).to_owned();
            handle_decision(engine, req, &request_id);
        }
        (Method::Get, ["reservations", lab_id]) => {
            let lab_id = (*lab_id).to_owned();
            handle_reservations(engine, req, &lab_id);
        }
        _ => respond_err(req, 404, "not found"),
    }
}

/// Start the server loop, blocking the current thread.
pub fn run_server(engine: &Arc<Engine>, addr: &str) {
    let server = Server::http(addr).expect("failed to bind HTTP server");
    for request in server.incoming_requests() {
        handle_request(engine, request);
    }
}

/// A test helper that starts a labflow-server on a random port in a
/// background thread.
///
/// The server listens on `127.0.0.1:{port}` against a store rooted at the
/// provided directory. Drop the `TestServer` to stop it.
pub struct TestServer {
    pub url: String,
    pub port: u16,
    _server: Arc<Server>,
    _handle: std::thread::JoinHandle<()>,
}

impl TestServer {
    /// Start a test server with the given store root.
    /// Binds to `127.0.0.1:0` (random port).
    pub fn start(store_root: std::path::PathBuf) -> Self {
        let server =
            Arc::new(Server::http("127.0.0.1:0").expect("failed to bind test HTTP server"));
        let port = server.server_addr().to_ip().expect("not an IP addr").port();
        let url = format!("http://127.0.0.1:{port}");

        let engine = Arc::new(Engine::new(store_root));
        let srv = Arc::clone(&server);
        let handle = std::thread::spawn(move || {
            for request in srv.incoming_requests() {
                handle_request(&engine, request);
            }
        });

        Self {
            url,
            port,
            _server: server,
            _handle: handle,
        }
    }
}
