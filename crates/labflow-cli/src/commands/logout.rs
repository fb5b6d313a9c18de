use super::EXIT_SUCCESS;
use labflow_core::Engine;
use labflow_schema::SessionToken;

pub fn run(engine: &Engine, session: &str) -> Result<u8, String> {
    engine
        .close_session(&SessionToken::new(session))
        .map_err(|e| e.to_string())?;
    println!("session revoked");
    Ok(EXIT_SUCCESS)
}
