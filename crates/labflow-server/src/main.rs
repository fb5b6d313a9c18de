use clap::Parser;
use labflow_core::Engine;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "labflow-server", about = "Labflow booking approval JSON API")]
struct Cli {
    /// Port to listen on.
    #[arg(long, default_value_t = 8484)]
    port: u16,

    /// Path to the Labflow store directory.
    #[arg(long, default_value = "./labflow-data")]
    store: PathBuf,

    /// Path to the institution config (labflow.toml) for department validation.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let institution = cli.config.as_deref().map(|path| {
        labflow_schema::parse_institution_file(path).expect("failed to load institution config")
    });

    let addr = format!("0.0.0.0:{}", cli.port);
    info!("starting labflow-server on {addr}");
    info!("store directory: {}", cli.store.display());

    let engine = Arc::new(Engine::with_institution(cli.store, institution));
    labflow_server::run_server(&engine, &addr);
}
