use super::{json_pretty, EXIT_SUCCESS};
use labflow_core::Engine;

pub fn run(engine: &Engine, lab_id: &str, json: bool) -> Result<u8, String> {
    let reservations = engine
        .list_reservations(lab_id)
        .map_err(|e| e.to_string())?;
    if json {
        println!("{}", json_pretty(&reservations)?);
    } else if reservations.is_empty() {
        println!("no reservations for lab {lab_id}");
    } else {
        println!("{:<12} {:<6} {:<28} RESERVATION_ID", "DATE", "TIME", "REQUEST");
        for r in &reservations {
            println!("{:<12} {:<6} {:<28} {}", r.date, r.time.to_string(), r.request_id, r.id);
        }
    }
    Ok(EXIT_SUCCESS)
}
