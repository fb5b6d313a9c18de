use super::{json_pretty, EXIT_SUCCESS};
use labflow_core::Engine;

pub fn run(engine: &Engine, json: bool) -> Result<u8, String> {
    let labs = engine.list_labs().map_err(|e| e.to_string())?;
    if json {
        println!("{}", json_pretty(&labs)?);
    } else if labs.is_empty() {
        println!("no labs found");
    } else {
        println!("{:<14} {:<24} {:<9} LOCATION", "LAB_ID", "NAME", "CAPACITY");
        for lab in &labs {
            println!(
                "{:<14} {:<24} {:<9} {}",
                lab.id, lab.name, lab.capacity, lab.location
            );
        }
    }
    Ok(EXIT_SUCCESS)
}
