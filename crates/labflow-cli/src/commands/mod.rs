pub mod completions;
pub mod decide;
pub mod delete;
pub mod designate;
pub mod doctor;
pub mod inspect;
pub mod lab_add;
pub mod lab_list;
pub mod lab_remove;
pub mod list;
pub mod login;
pub mod logout;
pub mod man_pages;
pub mod register;
pub mod reservations;
pub mod submit;
pub mod whoami;

use labflow_core::Engine;
use labflow_schema::{Identity, SessionToken, Slot};

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_VALIDATION_ERROR: u8 = 2;
pub const EXIT_STORE_ERROR: u8 = 3;
pub const EXIT_NOT_ELIGIBLE: u8 = 4;
pub const EXIT_CONFLICT: u8 = 5;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn colorize_status(status: &str) -> String {
    use console::Style;
    match status {
        "pending" => Style::new().yellow().apply_to(status).to_string(),
        "forwarded_to_hod" => Style::new().cyan().apply_to(status).to_string(),
        "forwarded_to_principal" => Style::new().blue().apply_to(status).to_string(),
        "approved" => Style::new().green().apply_to(status).to_string(),
        "sent_back" => Style::new().red().apply_to(status).to_string(),
        other => other.to_owned(),
    }
}

/// Resolve the caller's identity from a session token string.
pub fn resolve_session(engine: &Engine, session: &str) -> Result<Identity, String> {
    engine
        .resolve_identity(&SessionToken::new(session))
        .map_err(|e| e.to_string())
}

/// Resolve a request id or unique id prefix to the full id.
pub fn resolve_request_id(engine: &Engine, input: &str) -> Result<String, String> {
    let requests = engine.list_requests().map_err(|e| e.to_string())?;

    for r in &requests {
        if *r.id == *input {
            return Ok(r.id.to_string());
        }
    }

    let matches: Vec<_> = requests
        .iter()
        .filter(|r| r.id.starts_with(input))
        .collect();

    match matches.len() {
        0 => Err(format!("no request matching '{input}'")),
        1 => Ok(matches[0].id.to_string()),
        n => Err(format!(
            "ambiguous request id prefix '{input}': matches {n} requests"
        )),
    }
}

/// Parse a `DATE:TIME` argument, e.g. `2024-05-01:FN`.
pub fn parse_slot(input: &str) -> Result<Slot, String> {
    let Some((date_str, time_str)) = input.split_once(':') else {
        return Err(format!(
            "invalid slot '{input}', expected DATE:TIME (e.g. 2024-05-01:FN)"
        ));
    };
    let date = date_str
        .parse()
        .map_err(|e| format!("invalid date '{date_str}': {e}"))?;
    let time = time_str.parse()?;
    Ok(Slot::new(date, time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use labflow_schema::TimeOfDay;

    #[test]
    fn json_pretty_serializes_value() {
        let val = serde_json::json!({"key": "value"});
        let result = json_pretty(&val).unwrap();
        assert!(result.contains("\"key\""));
        assert!(result.contains("\"value\""));
    }

    #[test]
    fn colorize_status_known_states() {
        for status in [
            "pending",
            "forwarded_to_hod",
            "forwarded_to_principal",
            "approved",
            "sent_back",
        ] {
            assert!(colorize_status(status).contains(status));
        }
    }

    #[test]
    fn colorize_status_unknown_passthrough() {
        assert_eq!(colorize_status("weird"), "weird");
    }

    #[test]
    fn parse_slot_valid() {
        let slot = parse_slot("2024-05-01:FN").unwrap();
        assert_eq!(slot.time, TimeOfDay::Forenoon);
        assert_eq!(slot.date.to_string(), "2024-05-01");
    }

    #[test]
    fn parse_slot_rejects_garbage() {
        assert!(parse_slot("2024-05-01").is_err());
        assert!(parse_slot("notadate:FN").is_err());
        assert!(parse_slot("2024-05-01:EVENING").is_err());
    }

    #[test]
    fn resolve_request_id_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::new(dir.path());
        let result = resolve_request_id(&engine, "nonexistent");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("no request matching"));
    }

    #[test]
    fn resolve_session_rejects_unknown_token() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::new(dir.path());
        assert!(resolve_session(&engine, &"f".repeat(64)).is_err());
    }

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_FAILURE,
            EXIT_VALIDATION_ERROR,
            EXIT_STORE_ERROR,
            EXIT_NOT_ELIGIBLE,
            EXIT_CONFLICT,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
