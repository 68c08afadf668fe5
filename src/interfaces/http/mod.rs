pub mod handlers;
pub mod state;

pub use state::{HostClipboard, HttpState};

use crate::domain::error::AppError;
use actix_cors::Cors;
use actix_web::{dev::Server, web, App, HttpResponse, HttpServer};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

const LOG_CAPACITY: usize = 100;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

pub fn add_log_entry(
    logs: &Mutex<Vec<LogEntry>>,
    level: &str,
    source: &str,
    message: &str,
) -> LogEntry {
    let entry = LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    };
    if let Ok(mut logs) = logs.lock() {
        logs.push(entry.clone());
        if logs.len() > LOG_CAPACITY {
            logs.remove(0);
        }
    }
    entry
}

pub fn add_log(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) {
    add_log_entry(logs, level, source, message);
}

pub fn error_response(err: &AppError) -> HttpResponse {
    let body = err.to_string();
    match err {
        AppError::NotFound(_) => HttpResponse::NotFound().body(body),
        AppError::ValidationError(_) | AppError::ParseError(_) => {
            HttpResponse::BadRequest().body(body)
        }
        AppError::ExportError(_) => HttpResponse::ServiceUnavailable().body(body),
        AppError::Internal(_) | AppError::ConfigError(_) | AppError::IoError(_) => {
            HttpResponse::InternalServerError().body(body)
        }
    }
}

pub fn start_server(state: HttpState) -> std::io::Result<Server> {
    let address = state.config.bind_address();
    let upload_limit = state.config.max_upload_bytes;
    let state = web::Data::new(state);

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Local tool, any origin

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .app_data(handlers::json_config(upload_limit))
            .configure(handlers::configure)
    })
    .bind(address)?
    .run();

    Ok(server)
}
