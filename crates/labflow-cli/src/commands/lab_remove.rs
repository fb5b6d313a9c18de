use super::{resolve_session, EXIT_SUCCESS};
use labflow_core::Engine;

pub fn run(engine: &Engine, session: &str, lab_id: &str) -> Result<u8, String> {
    let admin = resolve_session(engine, session)?;
    engine
        .remove_lab(&admin, lab_id)
        .map_err(|e| e.to_string())?;
    println!("removed lab {lab_id}");
    Ok(EXIT_SUCCESS)
}
