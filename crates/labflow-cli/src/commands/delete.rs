use super::{resolve_request_id, resolve_session, EXIT_SUCCESS};
use labflow_core::Engine;

pub fn run(engine: &Engine, session: &str, request_id: &str) -> Result<u8, String> {
    let actor = resolve_session(engine, session)?;
    let resolved = resolve_request_id(engine, request_id)?;
    engine
        .delete_request(&resolved, &actor)
        .map_err(|e| e.to_string())?;
    println!("deleted request {resolved}");
    Ok(EXIT_SUCCESS)
}
