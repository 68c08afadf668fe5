use crate::application::use_cases::checklist_store::ChecklistStore;
use crate::domain::checklist::ChecklistExport;
use crate::domain::error::Result;
use chrono::NaiveDate;

pub struct JsonExport {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub fn build_snapshot(store: &ChecklistStore, report_name: &str) -> ChecklistExport {
    ChecklistExport {
        report_name: report_name.to_string(),
        reporting_tool: store.active_tool(),
        validation_date: store.meta().validation_date,
        validator: store.meta().validator.clone(),
        report_description: store.report_description().to_string(),
        test_cases: store.test_cases().to_vec(),
    }
}

pub fn json_file_name(today: NaiveDate) -> String {
    format!("Validation_Checklist_{}.json", today.format("%Y-%m-%d"))
}

/// Pretty-printed snapshot named after `today`.
pub fn export_json(store: &ChecklistStore, report_name: &str, today: NaiveDate) -> Result<JsonExport> {
    let snapshot = build_snapshot(store, report_name);
    let bytes = serde_json::to_vec_pretty(&snapshot)?;
    Ok(JsonExport {
        file_name: json_file_name(today),
        bytes,
    })
}
