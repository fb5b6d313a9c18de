use super::{json_pretty, resolve_session, EXIT_SUCCESS};
use labflow_core::Engine;
use labflow_schema::Designation;

pub fn run(
    engine: &Engine,
    session: &str,
    user_id: &str,
    designation: &str,
    json: bool,
) -> Result<u8, String> {
    let admin = resolve_session(engine, session)?;
    let designation: Designation = designation.parse()?;
    let user = engine
        .assign_designation(&admin, user_id, designation)
        .map_err(|e| e.to_string())?;
    if json {
        println!("{}", json_pretty(&user)?);
    } else {
        println!("{} is now designated '{}'", user.id, user.designation);
    }
    Ok(EXIT_SUCCESS)
}
