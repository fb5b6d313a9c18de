use super::{EXIT_FAILURE, EXIT_SUCCESS};
use labflow_store::{LabStore, RequestStatus, RequestStore, SlotLedger, StoreLayout, UserStore};
use std::path::Path;

pub fn run(store_path: &Path, json_output: bool) -> Result<u8, String> {
    let mut checks: Vec<Check> = Vec::new();
    let mut all_pass = true;

    let layout = StoreLayout::new(store_path);
    if store_path.join("store").exists() {
        checks.push(Check::pass("store_exists", "Store directory exists"));
        check_store(&layout, &mut checks, &mut all_pass);
    } else {
        checks.push(Check::info(
            "store_exists",
            "Store not initialized (will be created on first use)",
        ));
    }

    print_results(&checks, all_pass, json_output)
}

fn check_store(layout: &StoreLayout, checks: &mut Vec<Check>, all_pass: &mut bool) {
    // Version
    match layout.initialize() {
        Ok(()) => checks.push(Check::pass("store_version", "Store format version valid")),
        Err(e) => {
            *all_pass = false;
            checks.push(Check::fail(
                "store_version",
                &format!("Store version check failed: {e}"),
            ));
        }
    }

    // WAL
    let wal = labflow_store::WriteAheadLog::new(layout);
    match wal.list_incomplete() {
        Ok(entries) if entries.is_empty() => {
            checks.push(Check::pass(
                "wal_clean",
                "WAL is clean (no incomplete entries)",
            ));
        }
        Ok(entries) => {
            checks.push(Check::warn(
                "wal_clean",
                &format!(
                    "WAL has {} incomplete entries (will recover on next start)",
                    entries.len()
                ),
            ));
        }
        Err(e) => checks.push(Check::warn("wal_clean", &format!("Cannot read WAL: {e}"))),
    }

    // Lock
    match labflow_core::StoreLock::try_acquire(&layout.lock_file()) {
        Ok(Some(_)) => checks.push(Check::pass("store_lock", "Store lock is free")),
        Ok(None) => checks.push(Check::warn(
            "store_lock",
            "Store lock is held by another process",
        )),
        Err(e) => {
            *all_pass = false;
            checks.push(Check::fail(
                "store_lock",
                &format!("Cannot check store lock: {e}"),
            ));
        }
    }

    // Ledger vs approved requests
    let requests = RequestStore::new(layout.clone());
    let ledger = SlotLedger::new(layout.clone());
    match (requests.list(), ledger.list()) {
        (Ok(all_requests), Ok(reservations)) => {
            let approved_slots: usize = all_requests
                .iter()
                .filter(|r| r.status == RequestStatus::Approved)
                .map(|r| r.slots.len())
                .sum();
            if reservations.len() == approved_slots {
                checks.push(Check::pass(
                    "ledger_consistent",
                    &format!(
                        "Ledger consistent ({} reservations for {approved_slots} approved slots)",
                        reservations.len()
                    ),
                ));
            } else {
                *all_pass = false;
                checks.push(Check::fail(
                    "ledger_consistent",
                    &format!(
                        "Ledger mismatch: {} reservations vs {approved_slots} approved slots",
                        reservations.len()
                    ),
                ));
            }
            checks.push(Check::info(
                "requests",
                &format!("{} requests stored", all_requests.len()),
            ));
        }
        (Err(e), _) | (_, Err(e)) => {
            *all_pass = false;
            checks.push(Check::fail(
                "ledger_consistent",
                &format!("Cannot read requests/ledger: {e}"),
            ));
        }
    }

    // Inventory
    let users = UserStore::new(layout.clone());
    let labs = LabStore::new(layout.clone());
    match (users.list(), labs.list()) {
        (Ok(users), Ok(labs)) => {
            checks.push(Check::info(
                "inventory",
                &format!("{} users, {} labs", users.len(), labs.len()),
            ));
        }
        (Err(e), _) | (_, Err(e)) => {
            checks.push(Check::warn(
                "inventory",
                &format!("Cannot list users/labs: {e}"),
            ));
        }
    }
}

fn print_results(checks: &[Check], all_pass: bool, json_output: bool) -> Result<u8, String> {
    if json_output {
        let json = serde_json::json!({
            "healthy": all_pass,
            "checks": checks.iter().map(|c| serde_json::json!({
                "name": c.name,
                "status": c.status,
                "message": c.message,
            })).collect::<Vec<_>>(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&json).map_err(|e| e.to_string())?
        );
    } else {
        println!("Labflow Doctor\n");
        for check in checks {
            let icon = match check.status.as_str() {
                "pass" => "✓",
                "fail" => "✗",
                "warn" => "⚠",
                _ => "ℹ",
            };
            println!("  {icon} {}", check.message);
        }
        println!();
        if all_pass {
            println!("All checks passed.");
        } else {
            println!("Some checks failed. See above for details.");
        }
    }
    Ok(if all_pass { EXIT_SUCCESS } else { EXIT_FAILURE })
}

struct Check {
    name: String,
    status: String,
    message: String,
}

impl Check {
    fn pass(name: &str, message: &str) -> Self {
        Self {
            name: name.to_owned(),
            status: "pass".to_owned(),
            message: message.to_owned(),
        }
    }

    fn fail(name: &str, message: &str) -> Self {
        Self {
            name: name.to_owned(),
            status: "fail".to_owned(),
            message: message.to_owned(),
        }
    }

    fn warn(name: &str, message: &str) -> Self {
        Self {
            name: name.to_owned(),
            status: "warn".to_owned(),
            message: message.to_owned(),
        }
    }

    fn info(name: &str, message: &str) -> Self {
        Self {
            name: name.to_owned(),
            status: "info".to_owned(),
            message: message.to_owned(),
        }
    }
}
