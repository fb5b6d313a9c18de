use super::{json_pretty, resolve_session, EXIT_SUCCESS};
use labflow_core::Engine;

pub fn run(engine: &Engine, session: &str, json: bool) -> Result<u8, String> {
    let identity = resolve_session(engine, session)?;
    if json {
        println!("{}", json_pretty(&identity)?);
    } else {
        println!("user:        {}", identity.user_id);
        println!("name:        {}", identity.full_name);
        println!("role:        {}", identity.role);
        println!("designation: {}", identity.designation);
        println!(
            "department:  {}",
            identity.department.as_deref().unwrap_or("(none)")
        );
    }
    Ok(EXIT_SUCCESS)
}
