use super::{json_pretty, EXIT_SUCCESS};
use labflow_core::Engine;

pub fn run(engine: &Engine, user_id: &str, json: bool) -> Result<u8, String> {
    let token = engine.open_session(user_id).map_err(|e| e.to_string())?;
    if json {
        println!("{}", json_pretty(&serde_json::json!({ "token": token }))?);
    } else {
        println!("{token}");
    }
    Ok(EXIT_SUCCESS)
}
