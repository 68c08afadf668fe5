use crate::application::use_cases::filter::{self, FilterCriteria};
use crate::application::use_cases::seed::seed_test_cases;
use crate::application::use_cases::summary::summarize;
use crate::domain::checklist::{ChecklistSummary, ReportMeta};
use crate::domain::error::{AppError, Result};
use crate::domain::test_case::{
    resolve_target_query, Evidence, QueryKind, ReportingTool, Status, TestCase, TestCaseInput,
    TestCaseUpdate,
};
use std::path::Path;
use tracing::debug;
use validator::Validate;

/// Answer to the "are you sure?" prompt that guards deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Self::Confirmed
        } else {
            Self::Declined
        }
    }
}

/// Identity of a test case that survives reordering and deletion of its
/// neighbours. Never reused within one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaseKey(u64);

/// Owned checklist state: the ordered test cases plus the report header.
///
/// Every lookup is a linear scan; checklists hold a few dozen cases at most.
#[derive(Debug, Clone)]
pub struct ChecklistStore {
    test_cases: Vec<TestCase>,
    keys: Vec<CaseKey>,
    next_key: u64,
    counter: usize,
    active_tool: ReportingTool,
    meta: ReportMeta,
    report_description: String,
}

impl ChecklistStore {
    pub fn new(active_tool: ReportingTool) -> Self {
        Self {
            test_cases: Vec::new(),
            keys: Vec::new(),
            next_key: 0,
            counter: 1,
            active_tool,
            meta: ReportMeta::default(),
            report_description: String::new(),
        }
    }

    pub fn seeded(active_tool: ReportingTool) -> Self {
        let mut store = Self::new(active_tool);
        for test_case in seed_test_cases() {
            store.push(test_case);
        }
        store.counter = store.test_cases.len() + 1;
        store
    }

    fn push(&mut self, test_case: TestCase) {
        self.test_cases.push(test_case);
        self.keys.push(CaseKey(self.next_key));
        self.next_key += 1;
    }

    pub fn test_cases(&self) -> &[TestCase] {
        &self.test_cases
    }

    pub fn len(&self) -> usize {
        self.test_cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.test_cases.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&TestCase> {
        self.test_cases
            .get(index)
            .ok_or_else(|| not_found(index, self.test_cases.len()))
    }

    fn get_mut(&mut self, index: usize) -> Result<&mut TestCase> {
        let len = self.test_cases.len();
        self.test_cases
            .get_mut(index)
            .ok_or_else(|| not_found(index, len))
    }

    pub fn active_tool(&self) -> ReportingTool {
        self.active_tool
    }

    /// Changes which target-query variant is read and written. Stored
    /// variants are left untouched.
    pub fn set_active_tool(&mut self, tool: ReportingTool) {
        debug!(tool = %tool, "Switching reporting tool");
        self.active_tool = tool;
    }

    pub fn meta(&self) -> &ReportMeta {
        &self.meta
    }

    pub fn set_meta(&mut self, meta: ReportMeta) {
        self.meta = meta;
    }

    pub fn report_description(&self) -> &str {
        &self.report_description
    }

    pub fn set_report_description(&mut self, description: impl Into<String>) {
        self.report_description = description.into();
    }

    pub fn suggest_next_id(&self) -> String {
        format!("TC-{:03}", self.counter)
    }

    /// Appends a new pending case with no evidence. The single target query
    /// from the form seeds both tool variants. Duplicate ids are accepted.
    pub fn add(&mut self, input: TestCaseInput) -> Result<&TestCase> {
        input.validate()?;

        let test_case = TestCase {
            id: input.id,
            title: input.title,
            phase: input.phase,
            description: input.description,
            source_query: input.source_query,
            target_query_power_bi: input.target_query.clone(),
            target_query_oac: input.target_query,
            target_query: None,
            expected_result: input.expected_result,
            status: Status::Pending,
            evidence: Vec::new(),
        };
        debug!(id = %test_case.id, index = self.test_cases.len(), "Adding test case");

        self.push(test_case);
        self.counter += 1;
        Ok(&self.test_cases[self.test_cases.len() - 1])
    }

    /// Overwrites only the supplied fields. The target query lands in the
    /// variant of the tool that is active right now.
    pub fn update(&mut self, index: usize, update: TestCaseUpdate) -> Result<&TestCase> {
        if matches!(update.id.as_deref(), Some(""))
            || matches!(update.title.as_deref(), Some(""))
        {
            return Err(AppError::ValidationError(
                "Test case ID and title cannot be empty".to_string(),
            ));
        }

        let tool = self.active_tool;
        let test_case = self.get_mut(index)?;

        if let Some(id) = update.id {
            test_case.id = id;
        }
        if let Some(title) = update.title {
            test_case.title = title;
        }
        if let Some(phase) = update.phase {
            test_case.phase = phase;
        }
        if let Some(description) = update.description {
            test_case.description = description;
        }
        if let Some(source_query) = update.source_query {
            test_case.source_query = source_query;
        }
        if let Some(target_query) = update.target_query {
            match tool {
                ReportingTool::PowerBi => test_case.target_query_power_bi = target_query,
                ReportingTool::Oac => test_case.target_query_oac = target_query,
            }
        }
        if let Some(expected_result) = update.expected_result {
            test_case.expected_result = expected_result;
        }

        debug!(index, id = %test_case.id, tool = %tool, "Updated test case");
        Ok(test_case)
    }

    /// Removes exactly one case when confirmed. Ids and the counter are not
    /// renumbered.
    pub fn remove(&mut self, index: usize, confirmation: Confirmation) -> Result<Option<TestCase>> {
        self.get(index)?;
        if confirmation == Confirmation::Declined {
            debug!(index, "Delete declined");
            return Ok(None);
        }
        let removed = self.test_cases.remove(index);
        self.keys.remove(index);
        debug!(index, id = %removed.id, "Removed test case");
        Ok(Some(removed))
    }

    pub fn set_status(&mut self, index: usize, status: Status) -> Result<&TestCase> {
        let test_case = self.get_mut(index)?;
        test_case.status = status;
        Ok(test_case)
    }

    pub fn add_evidence(&mut self, index: usize, evidence: Evidence) -> Result<&TestCase> {
        let test_case = self.get_mut(index)?;
        debug!(index, name = %evidence.name, "Attaching evidence");
        test_case.evidence.push(evidence);
        Ok(test_case)
    }

    pub fn key_of(&self, index: usize) -> Result<CaseKey> {
        self.get(index)?;
        Ok(self.keys[index])
    }

    /// Current position of a keyed case, `None` once it has been deleted.
    pub fn index_of(&self, key: CaseKey) -> Option<usize> {
        self.keys.iter().position(|k| *k == key)
    }

    /// Attaches to whichever position the keyed case holds now.
    pub fn add_evidence_to(&mut self, key: CaseKey, evidence: Evidence) -> Result<&TestCase> {
        let index = self.index_of(key).ok_or_else(|| {
            AppError::NotFound("Test case was deleted before the evidence was attached".to_string())
        })?;
        self.add_evidence(index, evidence)
    }

    /// Whether any evidence still points at the stored file.
    pub fn references_file(&self, path: &Path) -> bool {
        self.test_cases
            .iter()
            .flat_map(|tc| tc.evidence.iter())
            .filter_map(|e| e.file.as_ref())
            .any(|handle| handle.path == path)
    }

    pub fn remove_evidence(&mut self, index: usize, evidence_index: usize) -> Result<Evidence> {
        let test_case = self.get_mut(index)?;
        if evidence_index >= test_case.evidence.len() {
            return Err(AppError::NotFound(format!(
                "Evidence {} on test case {} (has {})",
                evidence_index,
                index,
                test_case.evidence.len()
            )));
        }
        Ok(test_case.evidence.remove(evidence_index))
    }

    pub fn target_query(&self, index: usize) -> Result<&str> {
        let test_case = self.get(index)?;
        Ok(resolve_target_query(test_case, self.active_tool))
    }

    pub fn copy_text(&self, index: usize, kind: QueryKind) -> Result<&str> {
        match kind {
            QueryKind::Source => Ok(self.get(index)?.source_query.as_str()),
            QueryKind::Target => self.target_query(index),
        }
    }

    /// Current values for the edit form, with the target query resolved for
    /// the active tool.
    pub fn form_values(&self, index: usize) -> Result<TestCaseInput> {
        let test_case = self.get(index)?;
        Ok(TestCaseInput {
            id: test_case.id.clone(),
            title: test_case.title.clone(),
            phase: test_case.phase,
            description: test_case.description.clone(),
            source_query: test_case.source_query.clone(),
            target_query: resolve_target_query(test_case, self.active_tool).to_string(),
            expected_result: test_case.expected_result.clone(),
        })
    }

    pub fn summary(&self) -> ChecklistSummary {
        summarize(&self.test_cases)
    }

    pub fn visibility(&self, criteria: &FilterCriteria, rendered_len: usize) -> Result<Vec<bool>> {
        filter::visibility(&self.test_cases, criteria, rendered_len)
    }
}

fn not_found(index: usize, len: usize) -> AppError {
    AppError::NotFound(format!("Test case at index {} (checklist has {})", index, len))
}
