use super::state::HttpState;
use super::{add_log, error_response};
use crate::application::use_cases::checklist_store::{CaseKey, ChecklistStore, Confirmation};
use crate::application::use_cases::clipboard::COPY_SUCCESS_MESSAGE;
use crate::application::use_cases::filter::FilterQuery;
use crate::application::use_cases::{json_export, pdf_export, render};
use crate::domain::checklist::{ChecklistSummary, ReportMeta};
use crate::domain::error::{AppError, Result};
use crate::domain::test_case::{
    Evidence, QueryKind, ReportingTool, Status, TestCaseInput, TestCaseUpdate,
};
use crate::infrastructure::evidence_store::EvidenceUpload;
use crate::infrastructure::storage::REPORT_DESCRIPTION_KEY;
use actix_web::error::InternalError;
use actix_web::http::header;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder, ResponseError};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    pub message: String,
    pub summary: ChecklistSummary,
    pub next_id: String,
}

impl MutationResponse {
    fn new(store: &ChecklistStore, message: &str) -> Self {
        Self {
            message: message.to_string(),
            summary: store.summary(),
            next_id: store.suggest_next_id(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: Status,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub reporting_tool: ReportingTool,
    #[serde(default)]
    pub validation_date: String,
    #[serde(default)]
    pub validator: String,
}

#[derive(Debug, Deserialize)]
pub struct DescriptionRequest {
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CopyResponse {
    pub text: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

fn failure(data: &HttpState, action: &str, err: AppError) -> HttpResponse {
    error!(error = %err, action, "Request failed");
    add_log(
        &data.logs,
        "ERROR",
        "HttpApi",
        &format!("{} failed: {}", action, err),
    );
    error_response(&err)
}

fn attachment(content_type: &str, file_name: &str, bytes: Vec<u8>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(content_type)
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        ))
        .body(bytes)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// JSON extractor settings shared by every route. Evidence uploads are the
/// large bodies; rejections answer with plain text the page can show.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            let response = HttpResponse::build(err.status_code()).body(err.to_string());
            InternalError::from_response(err, response).into()
        })
}

/// Deletes stored files that no remaining evidence points at. Runs under the
/// store lock so a concurrent upload of the same content cannot interleave.
fn release_files(data: &HttpState, store: &ChecklistStore, removed: &[Evidence]) {
    for handle in removed.iter().filter_map(|e| e.file.as_ref()) {
        if store.references_file(&handle.path) {
            continue;
        }
        if let Err(e) = data.evidence.discard(handle) {
            warn!(error = %e, "Could not delete evidence file");
        }
    }
}

/// Decodes outside the lock, then writes and attaches under it. The case is
/// found by key, so deletions while decoding cannot redirect the evidence.
fn attach_upload(
    data: &HttpState,
    key: CaseKey,
    upload: &EvidenceUpload,
) -> Result<MutationResponse> {
    let prepared = data.evidence.prepare(upload)?;
    let mut store = data.lock_store()?;
    if store.index_of(key).is_none() {
        return Err(AppError::NotFound(format!(
            "Test case was deleted before {} was attached",
            prepared.name()
        )));
    }
    let evidence = data.evidence.commit(prepared)?;
    store.add_evidence_to(key, evidence)?;
    Ok(MutationResponse::new(&store, "Evidence uploaded"))
}

#[get("/")]
async fn page(data: web::Data<HttpState>) -> impl Responder {
    match data.lock_store() {
        Ok(store) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(render::render_page(&store, &data.config.report_name)),
        Err(e) => failure(&data, "Render page", e),
    }
}

#[get("/cards")]
async fn cards(data: web::Data<HttpState>) -> impl Responder {
    match data.lock_store() {
        Ok(store) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(render::render_cards(&store)),
        Err(e) => failure(&data, "Render cards", e),
    }
}

#[get("/test-cases")]
async fn list_test_cases(data: web::Data<HttpState>) -> impl Responder {
    match data.lock_store() {
        Ok(store) => HttpResponse::Ok().json(store.test_cases()),
        Err(e) => failure(&data, "List test cases", e),
    }
}

#[post("/test-cases")]
async fn add_test_case(
    data: web::Data<HttpState>,
    req: web::Json<TestCaseInput>,
) -> impl Responder {
    add_log(
        &data.logs,
        "INFO",
        "HttpApi",
        &format!("Adding test case {}", req.id),
    );

    let result = data.lock_store().and_then(|mut store| {
        store.add(req.into_inner())?;
        Ok(MutationResponse::new(&store, "Test case added successfully!"))
    });
    match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e) => failure(&data, "Add test case", e),
    }
}

#[get("/test-cases/{index}")]
async fn get_test_case(data: web::Data<HttpState>, path: web::Path<usize>) -> impl Responder {
    let index = path.into_inner();
    let result = data
        .lock_store()
        .and_then(|store| store.get(index).cloned());
    match result {
        Ok(test_case) => HttpResponse::Ok().json(test_case),
        Err(e) => failure(&data, "Get test case", e),
    }
}

#[put("/test-cases/{index}")]
async fn update_test_case(
    data: web::Data<HttpState>,
    path: web::Path<usize>,
    req: web::Json<TestCaseUpdate>,
) -> impl Responder {
    let index = path.into_inner();
    add_log(
        &data.logs,
        "INFO",
        "HttpApi",
        &format!("Updating test case at {}", index),
    );

    let result = data.lock_store().and_then(|mut store| {
        store.update(index, req.into_inner())?;
        Ok(MutationResponse::new(&store, "Test case updated successfully!"))
    });
    match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e) => failure(&data, "Update test case", e),
    }
}

#[delete("/test-cases/{index}")]
async fn delete_test_case(
    data: web::Data<HttpState>,
    path: web::Path<usize>,
    query: web::Query<DeleteQuery>,
) -> impl Responder {
    let index = path.into_inner();
    let confirmation = Confirmation::from(query.confirm);

    let result = data.lock_store().and_then(|mut store| {
        let message = match store.remove(index, confirmation)? {
            Some(removed) => {
                release_files(&data, &store, &removed.evidence);
                format!("Test case {} deleted", removed.id)
            }
            None => "Deletion cancelled".to_string(),
        };
        Ok(MutationResponse::new(&store, &message))
    });
    match result {
        Ok(body) => {
            add_log(&data.logs, "INFO", "HttpApi", &body.message);
            HttpResponse::Ok().json(body)
        }
        Err(e) => failure(&data, "Delete test case", e),
    }
}

#[get("/test-cases/{index}/form")]
async fn test_case_form(data: web::Data<HttpState>, path: web::Path<usize>) -> impl Responder {
    let index = path.into_inner();
    match data.lock_store().and_then(|store| store.form_values(index)) {
        Ok(values) => HttpResponse::Ok().json(values),
        Err(e) => failure(&data, "Load edit form", e),
    }
}

#[put("/test-cases/{index}/status")]
async fn set_status(
    data: web::Data<HttpState>,
    path: web::Path<usize>,
    req: web::Json<StatusRequest>,
) -> impl Responder {
    let index = path.into_inner();
    let status = req.status;

    let result = data.lock_store().and_then(|mut store| {
        let id = store.set_status(index, status)?.id.clone();
        Ok(MutationResponse::new(
            &store,
            &format!("{} marked {}", id, status.label()),
        ))
    });
    match result {
        Ok(body) => {
            add_log(&data.logs, "INFO", "HttpApi", &body.message);
            HttpResponse::Ok().json(body)
        }
        Err(e) => failure(&data, "Set status", e),
    }
}

#[post("/test-cases/{index}/evidence")]
async fn upload_evidence(
    data: web::Data<HttpState>,
    path: web::Path<usize>,
    req: web::Json<EvidenceUpload>,
) -> impl Responder {
    let index = path.into_inner();
    let upload = req.into_inner();
    add_log(
        &data.logs,
        "INFO",
        "HttpApi",
        &format!("Uploading evidence {} to test case at {}", upload.name, index),
    );

    let key = match data.lock_store().and_then(|store| store.key_of(index)) {
        Ok(key) => key,
        Err(e) => return failure(&data, "Upload evidence", e),
    };

    let state = data.clone();
    let result = match tokio::task::spawn_blocking(move || attach_upload(&state, key, &upload)).await
    {
        Ok(result) => result,
        Err(e) => Err(AppError::Internal(format!("Evidence task failed: {}", e))),
    };
    match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e) => failure(&data, "Upload evidence", e),
    }
}

#[delete("/test-cases/{index}/evidence/{evidence_index}")]
async fn remove_evidence(
    data: web::Data<HttpState>,
    path: web::Path<(usize, usize)>,
) -> impl Responder {
    let (index, evidence_index) = path.into_inner();

    let result = data.lock_store().and_then(|mut store| {
        let removed = store.remove_evidence(index, evidence_index)?;
        release_files(&data, &store, std::slice::from_ref(&removed));
        Ok(MutationResponse::new(
            &store,
            &format!("Removed evidence {}", removed.name),
        ))
    });
    match result {
        Ok(body) => {
            add_log(&data.logs, "INFO", "HttpApi", &body.message);
            HttpResponse::Ok().json(body)
        }
        Err(e) => failure(&data, "Remove evidence", e),
    }
}

#[get("/test-cases/{index}/copy/{kind}")]
async fn copy_query(
    data: web::Data<HttpState>,
    path: web::Path<(usize, String)>,
) -> impl Responder {
    let (index, kind) = path.into_inner();

    let text = kind
        .parse::<QueryKind>()
        .map_err(AppError::ParseError)
        .and_then(|kind| {
            let store = data.lock_store()?;
            let text = store.copy_text(index, kind)?.to_string();
            Ok(text)
        });
    let text = match text {
        Ok(text) => text,
        Err(e) => return failure(&data, "Copy query", e),
    };

    let mut message = COPY_SUCCESS_MESSAGE.to_string();
    if data.clipboard.is_some() {
        let state = data.clone();
        let host_text = text.clone();
        let copied = tokio::task::spawn_blocking(move || {
            state
                .clipboard
                .as_ref()
                .map(|clipboard| clipboard.copy(&host_text))
        })
        .await;
        match copied {
            Ok(Some(report)) => message = report.message.to_string(),
            Ok(None) => {}
            Err(e) => error!(error = %e, "Host clipboard task failed"),
        }
    }

    HttpResponse::Ok().json(CopyResponse { text, message })
}

#[get("/summary")]
async fn get_summary(data: web::Data<HttpState>) -> impl Responder {
    match data.lock_store() {
        Ok(store) => HttpResponse::Ok().json(store.summary()),
        Err(e) => failure(&data, "Summary", e),
    }
}

#[get("/filter")]
async fn filter(data: web::Data<HttpState>, query: web::Query<FilterQuery>) -> impl Responder {
    let result = query.criteria().and_then(|criteria| {
        let store = data.lock_store()?;
        store.visibility(&criteria, query.rendered)
    });
    match result {
        Ok(flags) => HttpResponse::Ok().json(flags),
        Err(e) => failure(&data, "Filter", e),
    }
}

fn parse_validation_date(raw: &str, current: NaiveDate) -> Result<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(current);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| AppError::ParseError(format!("Invalid validation date {}: {}", raw, e)))
}

#[put("/report")]
async fn update_report(
    data: web::Data<HttpState>,
    req: web::Json<ReportRequest>,
) -> impl Responder {
    let result = data.lock_store().and_then(|mut store| {
        let validation_date =
            parse_validation_date(&req.validation_date, store.meta().validation_date)?;
        store.set_active_tool(req.reporting_tool);
        store.set_meta(ReportMeta {
            validation_date,
            validator: req.validator.trim().to_string(),
        });
        Ok(store.meta().clone())
    });
    match result {
        Ok(meta) => {
            info!(tool = %req.reporting_tool, date = %meta.validation_date, "Report info updated");
            HttpResponse::Ok().json(meta)
        }
        Err(e) => failure(&data, "Update report info", e),
    }
}

#[put("/report/description")]
async fn save_description(
    data: web::Data<HttpState>,
    req: web::Json<DescriptionRequest>,
) -> impl Responder {
    let description = req.into_inner().description;
    let result = data.lock_store().and_then(|mut store| {
        store.set_report_description(description.clone());
        data.local_storage.set(REPORT_DESCRIPTION_KEY, &description)
    });
    match result {
        Ok(()) => {
            add_log(&data.logs, "INFO", "HttpApi", "Report description saved");
            HttpResponse::Ok().json(MessageResponse {
                message: "Report description saved!".to_string(),
            })
        }
        Err(e) => failure(&data, "Save report description", e),
    }
}

#[get("/export/json")]
async fn export_json(data: web::Data<HttpState>) -> impl Responder {
    let result = data
        .lock_store()
        .and_then(|store| json_export::export_json(&store, &data.config.report_name, today()));
    match result {
        Ok(export) => {
            add_log(
                &data.logs,
                "INFO",
                "Export",
                &format!("Exported {}", export.file_name),
            );
            attachment("application/json", &export.file_name, export.bytes)
        }
        Err(e) => failure(&data, "JSON export", e),
    }
}

#[get("/export/pdf")]
async fn export_pdf(data: web::Data<HttpState>) -> impl Responder {
    let snapshot = match data.lock_store() {
        Ok(store) => store.clone(),
        Err(e) => return failure(&data, "PDF export", e),
    };
    let report_name = data.config.report_name.clone();

    let result = match tokio::task::spawn_blocking(move || {
        pdf_export::export_pdf(&snapshot, &report_name, today())
    })
    .await
    {
        Ok(result) => result,
        Err(e) => Err(AppError::ExportError(format!("PDF task failed: {}", e))),
    };
    match result {
        Ok(report) => {
            debug!(sections = ?report.section_pages, "PDF section start pages");
            add_log(
                &data.logs,
                "INFO",
                "Export",
                &format!("Exported {} ({} pages)", report.file_name, report.page_count),
            );
            attachment("application/pdf", &report.file_name, report.bytes)
        }
        Err(e) => failure(&data, "PDF export", e),
    }
}

#[get("/logs")]
async fn get_logs(data: web::Data<HttpState>) -> impl Responder {
    match data.logs.lock() {
        Ok(logs) => HttpResponse::Ok().json(&*logs),
        Err(_) => failure(
            &data,
            "Read logs",
            AppError::Internal("Log buffer lock poisoned".to_string()),
        ),
    }
}

/// Registers the page at `/` and the JSON API under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(page).service(
        web::scope("/api")
            .service(cards)
            .service(list_test_cases)
            .service(add_test_case)
            .service(test_case_form)
            .service(set_status)
            .service(upload_evidence)
            .service(remove_evidence)
            .service(copy_query)
            .service(get_test_case)
            .service(update_test_case)
            .service(delete_test_case)
            .service(get_summary)
            .service(filter)
            .service(update_report)
            .service(save_description)
            .service(export_json)
            .service(export_pdf)
            .service(get_logs),
    );
}
