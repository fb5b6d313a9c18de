use super::{json_pretty, resolve_request_id, resolve_session, EXIT_CONFLICT, EXIT_SUCCESS};
use labflow_core::{Decision, DecisionOutcome, Engine};

pub fn run(
    engine: &Engine,
    session: &str,
    request_id: &str,
    action: &str,
    remark: &str,
    json: bool,
) -> Result<u8, String> {
    let actor = resolve_session(engine, session)?;
    let decision: Decision = action.parse()?;
    let resolved = resolve_request_id(engine, request_id)?;

    let outcome = engine
        .apply_decision(&resolved, &actor, decision, remark)
        .map_err(|e| e.to_string())?;

    match outcome {
        DecisionOutcome::Applied(request) => {
            if json {
                println!("{}", json_pretty(&request)?);
            } else {
                println!("request {} is now {}", request.id, request.status);
            }
            Ok(EXIT_SUCCESS)
        }
        DecisionOutcome::Conflict(slot) => {
            // Actionable result: the slot is taken, nothing was changed.
            // The approver can re-run with send-back.
            if json {
                println!(
                    "{}",
                    json_pretty(&serde_json::json!({ "conflict": slot }))?
                );
            } else {
                println!("slot already booked: {slot}");
                println!("request unchanged; use 'decide {request_id} send-back' to return it");
            }
            Ok(EXIT_CONFLICT)
        }
    }
}
