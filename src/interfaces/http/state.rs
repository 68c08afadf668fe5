use super::LogEntry;
use crate::application::use_cases::checklist_store::ChecklistStore;
use crate::application::use_cases::clipboard::{
    copy_to_clipboard, ClipboardBackend, CommandClipboard, CopyReport, Osc52Clipboard,
};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::evidence_store::EvidenceStore;
use crate::infrastructure::storage::KeyValueStore;
use std::sync::{Arc, Mutex, MutexGuard};

/// Primary/fallback pair used when copies should also land on the server
/// host's clipboard.
pub struct HostClipboard {
    pub primary: Box<dyn ClipboardBackend>,
    pub fallback: Box<dyn ClipboardBackend>,
}

impl HostClipboard {
    pub fn detect() -> Self {
        Self {
            primary: Box::new(CommandClipboard::detect()),
            fallback: Box::new(Osc52Clipboard::stdout()),
        }
    }

    pub fn copy(&self, text: &str) -> CopyReport {
        copy_to_clipboard(text, self.primary.as_ref(), self.fallback.as_ref())
    }
}

pub struct HttpState {
    pub store: Mutex<ChecklistStore>,
    pub evidence: EvidenceStore,
    pub local_storage: KeyValueStore,
    pub config: AppConfig,
    pub clipboard: Option<HostClipboard>,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
}

impl HttpState {
    pub fn lock_store(&self) -> Result<MutexGuard<'_, ChecklistStore>> {
        self.store
            .lock()
            .map_err(|_| AppError::Internal("Checklist store lock poisoned".to_string()))
    }
}
