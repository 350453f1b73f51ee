use std::process::ExitCode;
use std::sync::Arc;

use cheatsheet_server::config::{AppState, Config};
use cheatsheet_server::error::StartupError;
use cheatsheet_server::{logger, server};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("[FATAL] {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), StartupError> {
    // Optional first argument: config file path without extension
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config".to_string());
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg.logging)?;

    // Document root and headers are validated before anything listens
    let addr = cfg.get_socket_addr()?;
    let workers = cfg.server.workers;
    let state = Arc::new(AppState::from_env(cfg)?);

    // Create Tokio runtime, sized by the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build().map_err(StartupError::Runtime)?;

    runtime.block_on(async move {
        let listener = server::create_listener(addr)?;
        logger::log_server_start(&addr, &state);
        server::run_server(listener, state, server::shutdown_signal()).await;
        tracing::info!("server stopped");
        Ok::<(), StartupError>(())
    })
}
