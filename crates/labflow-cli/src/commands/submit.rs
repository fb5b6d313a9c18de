use super::{json_pretty, parse_slot, resolve_session, EXIT_SUCCESS};
use labflow_core::Engine;
use labflow_schema::RequestDraft;

#[allow(clippy::too_many_arguments)]
pub fn run(
    engine: &Engine,
    session: &str,
    lab: &str,
    tutor: &str,
    department: Option<&str>,
    subject: &str,
    description: &str,
    slot_args: &[String],
    json: bool,
) -> Result<u8, String> {
    let student = resolve_session(engine, session)?;

    let mut slots = Vec::with_capacity(slot_args.len());
    for arg in slot_args {
        slots.push(parse_slot(arg)?);
    }

    let department = department
        .map(str::to_owned)
        .or_else(|| student.department.clone())
        .unwrap_or_default();

    let draft = RequestDraft {
        lab_id: lab.into(),
        staff_id: tutor.into(),
        department,
        subject: subject.to_owned(),
        description: description.to_owned(),
        slots,
    };

    let request = engine
        .submit_request(&student, draft)
        .map_err(|e| e.to_string())?;
    if json {
        println!("{}", json_pretty(&request)?);
    } else {
        println!("submitted request {}", request.id);
    }
    Ok(EXIT_SUCCESS)
}
