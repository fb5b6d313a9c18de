use super::{resolve_session, EXIT_SUCCESS};
use labflow_core::Engine;
use labflow_schema::Lab;

pub fn run(
    engine: &Engine,
    session: &str,
    lab_id: &str,
    name: &str,
    capacity: u32,
    location: &str,
) -> Result<u8, String> {
    let admin = resolve_session(engine, session)?;
    let lab = Lab::new(lab_id, name, capacity, location);
    engine.add_lab(&admin, lab).map_err(|e| e.to_string())?;
    println!("added lab {lab_id}");
    Ok(EXIT_SUCCESS)
}
