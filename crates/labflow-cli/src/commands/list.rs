use super::{colorize_status, json_pretty, resolve_session, EXIT_SUCCESS};
use labflow_core::Engine;

pub fn run(engine: &Engine, session: &str, json: bool) -> Result<u8, String> {
    let identity = resolve_session(engine, session)?;
    let requests = engine
        .list_requests_for(&identity)
        .map_err(|e| e.to_string())?;
    if json {
        println!("{}", json_pretty(&requests)?);
    } else if requests.is_empty() {
        println!("no requests found");
    } else {
        println!(
            "{:<28} {:<18} {:<24} {:<22} SUBJECT",
            "REQUEST_ID", "STUDENT", "LAB", "STATUS"
        );
        for request in &requests {
            let status = colorize_status(&request.status.to_string());
            println!(
                "{:<28} {:<18} {:<24} {:<22} {}",
                request.id, request.student_name, request.lab_name, status, request.subject
            );
        }
    }
    Ok(EXIT_SUCCESS)
}
