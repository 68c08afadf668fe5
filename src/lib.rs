mod app;
mod application;
mod domain;
mod infrastructure;
mod interfaces;

pub use crate::domain::error::{AppError, Result};
pub use crate::infrastructure::config::{AppConfig, ConfigService};

use tracing::info;
use tracing_subscriber::EnvFilter;

/// Loads configuration and serves the checklist until the process is stopped.
pub fn run() -> Result<()> {
    let _ = dotenvy::dotenv();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let config = ConfigService::load()?;
    let address = config.bind_address();
    let state = app::build_state(config)?;
    let logs = state.logs.clone();

    actix_web::rt::System::new().block_on(async move {
        let server = interfaces::http::start_server(state)?;
        interfaces::http::add_log(
            &logs,
            "INFO",
            "System",
            &format!("HTTP server started on {}", address),
        );
        info!(%address, "Validation checklist available at http://{}/", address);
        server.await
    })?;

    Ok(())
}
