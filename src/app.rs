use crate::application::use_cases::checklist_store::ChecklistStore;
use crate::domain::checklist::ReportMeta;
use crate::domain::error::Result;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::evidence_store::EvidenceStore;
use crate::infrastructure::storage::{
    ensure_evidence_dir, resolve_data_dir, KeyValueStore, REPORT_DESCRIPTION_KEY,
};
use crate::interfaces::http::{HostClipboard, HttpState};
use std::sync::{Arc, Mutex};
use tracing::info;

/// Prepares the data directory and assembles the shared server state.
pub fn build_state(config: AppConfig) -> Result<HttpState> {
    let data_dir = resolve_data_dir(&config.data_dir)?;
    let evidence = EvidenceStore::new(ensure_evidence_dir(&data_dir)?)?;
    let local_storage = KeyValueStore::open(&data_dir)?;

    let mut store = if config.seed_on_start {
        ChecklistStore::seeded(config.default_tool)
    } else {
        ChecklistStore::new(config.default_tool)
    };
    if let Some(description) = local_storage.get(REPORT_DESCRIPTION_KEY) {
        store.set_report_description(description);
    }
    if !config.validator.trim().is_empty() {
        store.set_meta(ReportMeta {
            validator: config.validator.trim().to_string(),
            ..ReportMeta::default()
        });
    }

    info!(
        data_dir = %data_dir.display(),
        test_cases = store.len(),
        tool = %config.default_tool,
        "Checklist state ready"
    );

    let clipboard = config.host_clipboard.then(HostClipboard::detect);
    Ok(HttpState {
        store: Mutex::new(store),
        evidence,
        local_storage,
        config,
        clipboard,
        logs: Arc::new(Mutex::new(Vec::new())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_case::ReportingTool;

    fn config_in(dir: &std::path::Path) -> AppConfig {
        AppConfig {
            data_dir: dir.join("data"),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_build_state_seeds_and_creates_layout() {
        let dir = tempfile::tempdir().unwrap();
        let state = build_state(config_in(dir.path())).unwrap();
        assert_eq!(state.lock_store().unwrap().len(), 10);
        assert!(dir.path().join("data").join("evidence").is_dir());
        assert!(state.clipboard.is_none());
    }

    #[test]
    fn test_build_state_restores_description_and_validator() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        std::fs::create_dir_all(&data_dir).unwrap();
        KeyValueStore::open(&data_dir)
            .unwrap()
            .set(REPORT_DESCRIPTION_KEY, "Saved earlier")
            .unwrap();

        let config = AppConfig {
            seed_on_start: false,
            default_tool: ReportingTool::Oac,
            validator: " Ana ".into(),
            ..config_in(dir.path())
        };
        let state = build_state(config).unwrap();
        let store = state.lock_store().unwrap();
        assert!(store.is_empty());
        assert_eq!(store.active_tool(), ReportingTool::Oac);
        assert_eq!(store.report_description(), "Saved earlier");
        assert_eq!(store.meta().validator, "Ana");
        assert_eq!(store.suggest_next_id(), "TC-001");
    }
}
