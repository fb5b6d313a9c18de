use super::{colorize_status, json_pretty, resolve_request_id, EXIT_SUCCESS};
use labflow_core::Engine;
use labflow_store::StageRecord;

fn print_stage(label: &str, record: Option<&StageRecord>) {
    match record {
        Some(r) => {
            println!("{label}: {} at {}", r.actor_name, r.decided_at);
            if !r.remark.is_empty() {
                println!("{:11}remark: {}", "", r.remark);
            }
        }
        None => println!("{label}: -"),
    }
}

pub fn run(engine: &Engine, request_id: &str, json: bool) -> Result<u8, String> {
    let resolved = resolve_request_id(engine, request_id)?;
    let request = engine.get_request(&resolved).map_err(|e| e.to_string())?;
    if json {
        println!("{}", json_pretty(&request)?);
    } else {
        println!("request:    {}", request.id);
        println!("student:    {} ({})", request.student_name, request.student_id);
        println!("lab:        {} ({})", request.lab_name, request.lab_id);
        println!("department: {}", request.department);
        println!("subject:    {}", request.subject);
        println!(
            "status:     {}",
            colorize_status(&request.status.to_string())
        );
        println!("created:    {}", request.created_at);
        println!("slots:");
        for slot in &request.slots {
            println!("  {slot}");
        }
        println!("trail:");
        print_stage("  tutor    ", request.trail.tutor.as_ref());
        print_stage("  hod      ", request.trail.hod.as_ref());
        print_stage("  principal", request.trail.principal.as_ref());
    }
    Ok(EXIT_SUCCESS)
}
