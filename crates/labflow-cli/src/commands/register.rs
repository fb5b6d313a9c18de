use super::{json_pretty, EXIT_SUCCESS};
use labflow_core::Engine;
use labflow_schema::{Role, User};

pub fn run(
    engine: &Engine,
    user_id: &str,
    full_name: &str,
    role: &str,
    department: Option<&str>,
    json: bool,
) -> Result<u8, String> {
    let role: Role = role.parse()?;
    let user = User::new(
        user_id,
        full_name,
        role,
        department.map(str::to_owned),
        chrono::Utc::now().to_rfc3339(),
    );
    let user = engine.register_user(user).map_err(|e| e.to_string())?;
    if json {
        println!("{}", json_pretty(&user)?);
    } else {
        println!("registered {} '{}' as {}", user.role, user.full_name, user.id);
    }
    Ok(EXIT_SUCCESS)
}
