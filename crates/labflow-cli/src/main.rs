mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::{EXIT_FAILURE, EXIT_NOT_ELIGIBLE, EXIT_STORE_ERROR, EXIT_VALIDATION_ERROR};
use labflow_core::Engine;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "labflow",
    version,
    about = "Approval workflow and slot ledger for institutional lab bookings"
)]
struct Cli {
    /// Path to the Labflow store directory.
    #[arg(long, default_value = "~/.local/share/labflow")]
    store: String,

    /// Path to the institution config (labflow.toml) for department validation.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Register a user (student, staff, or admin).
    Register {
        /// User id (e.g. admission or staff number).
        user_id: String,
        /// Full display name.
        full_name: String,
        /// Role: student, staff, or admin.
        #[arg(long)]
        role: String,
        /// Department (required for staff).
        #[arg(long)]
        department: Option<String>,
    },
    /// Open a session for a registered user and print its token.
    Login {
        /// User id to open the session for.
        user_id: String,
    },
    /// Revoke a session token.
    Logout {
        /// Session token to revoke.
        #[arg(long)]
        session: String,
    },
    /// Show the identity a session token resolves to.
    Whoami {
        /// Session token.
        #[arg(long)]
        session: String,
    },
    /// Add a lab (admin only).
    LabAdd {
        /// Lab id.
        lab_id: String,
        /// Display name.
        name: String,
        /// Seats available.
        #[arg(long, default_value_t = 1)]
        capacity: u32,
        /// Physical location.
        #[arg(long, default_value = "")]
        location: String,
        /// Admin session token.
        #[arg(long)]
        session: String,
    },
    /// List all labs.
    LabList,
    /// Remove a lab with no remaining references (admin only).
    LabRemove {
        /// Lab id.
        lab_id: String,
        /// Admin session token.
        #[arg(long)]
        session: String,
    },
    /// Assign or clear a staff designation (admin only).
    Designate {
        /// Staff user id.
        user_id: String,
        /// Designation: none, hod, or principal.
        designation: String,
        /// Admin session token.
        #[arg(long)]
        session: String,
    },
    /// Submit a booking request (students).
    Submit {
        /// Target lab id.
        #[arg(long)]
        lab: String,
        /// Tutor the request is routed to first.
        #[arg(long)]
        tutor: String,
        /// Department (defaults to the caller's).
        #[arg(long)]
        department: Option<String>,
        /// Subject line.
        #[arg(long)]
        subject: String,
        /// Free-form description.
        #[arg(long, default_value = "")]
        description: String,
        /// Requested slot as DATE:TIME (repeatable), e.g. 2024-05-01:FN.
        #[arg(long = "slot", required = true)]
        slots: Vec<String>,
        /// Student session token.
        #[arg(long)]
        session: String,
    },
    /// Forward or send back a request at your stage of the chain.
    Decide {
        /// Request id (full or unique prefix).
        request_id: String,
        /// Action: forward or send-back.
        action: String,
        /// Remark recorded in the approval trail.
        #[arg(long, default_value = "")]
        remark: String,
        /// Approver session token.
        #[arg(long)]
        session: String,
    },
    /// Delete a request you created (approved requests are immutable).
    Delete {
        /// Request id (full or unique prefix).
        request_id: String,
        /// Session token of the request's creator (or an admin).
        #[arg(long)]
        session: String,
    },
    /// List the requests visible to your role.
    List {
        /// Session token.
        #[arg(long)]
        session: String,
    },
    /// Inspect a request and its approval trail.
    Inspect {
        /// Request id (full or unique prefix).
        request_id: String,
    },
    /// List confirmed reservations for a lab.
    Reservations {
        /// Lab id.
        lab_id: String,
    },
    /// Run diagnostic checks on the store.
    Doctor,
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
    /// Generate man pages in the specified directory.
    ManPages {
        /// Output directory for man pages.
        #[arg(default_value = "man")]
        dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("LABFLOW_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .init();

    let institution = match cli.config.as_deref() {
        Some(path) => match labflow_schema::parse_institution_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::from(EXIT_VALIDATION_ERROR);
            }
        },
        None => None,
    };

    let store_path = expand_tilde(&cli.store);
    let engine = Engine::with_institution(&store_path, institution);
    let json_output = cli.json;

    let result = match cli.command {
        Commands::Register {
            user_id,
            full_name,
            role,
            department,
        } => commands::register::run(
            &engine,
            &user_id,
            &full_name,
            &role,
            department.as_deref(),
            json_output,
        ),
        Commands::Login { user_id } => commands::login::run(&engine, &user_id, json_output),
        Commands::Logout { session } => commands::logout::run(&engine, &session),
        Commands::Whoami { session } => commands::whoami::run(&engine, &session, json_output),
        Commands::LabAdd {
            lab_id,
            name,
            capacity,
            location,
            session,
        } => commands::lab_add::run(&engine, &session, &lab_id, &name, capacity, &location),
        Commands::LabList => commands::lab_list::run(&engine, json_output),
        Commands::LabRemove { lab_id, session } => {
            commands::lab_remove::run(&engine, &session, &lab_id)
        }
        Commands::Designate {
            user_id,
            designation,
            session,
        } => commands::designate::run(&engine, &session, &user_id, &designation, json_output),
        Commands::Submit {
            lab,
            tutor,
            department,
            subject,
            description,
            slots,
            session,
        } => commands::submit::run(
            &engine,
            &session,
            &lab,
            &tutor,
            department.as_deref(),
            &subject,
            &description,
            &slots,
            json_output,
        ),
        Commands::Decide {
            request_id,
            action,
            remark,
            session,
        } => commands::decide::run(&engine, &session, &request_id, &action, &remark, json_output),
        Commands::Delete {
            request_id,
            session,
        } => commands::delete::run(&engine, &session, &request_id),
        Commands::List { session } => commands::list::run(&engine, &session, json_output),
        Commands::Inspect { request_id } => {
            commands::inspect::run(&engine, &request_id, json_output)
        }
        Commands::Reservations { lab_id } => {
            commands::reservations::run(&engine, &lab_id, json_output)
        }
        Commands::Doctor => commands::doctor::run(&store_path, json_output),
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
        Commands::ManPages { dir } => commands::man_pages::run::<Cli>(&dir),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            let code = if msg.starts_with("validation error:") {
                EXIT_VALIDATION_ERROR
            } else if msg.starts_with("store error:") {
                EXIT_STORE_ERROR
            } else if msg.starts_with("not eligible") {
                EXIT_NOT_ELIGIBLE
            } else {
                EXIT_FAILURE
            };
            ExitCode::from(code)
        }
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(stripped);
        }
    }
    PathBuf::from(path)
}
