use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::test_case::{ReportingTool, TestCase};

/// Header fields of the checklist that are not part of any test case.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportMeta {
    pub validation_date: NaiveDate,
    #[serde(default)]
    pub validator: String,
}

impl Default for ReportMeta {
    fn default() -> Self {
        Self {
            validation_date: chrono::Local::now().date_naive(),
            validator: String::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pending: usize,
    /// Whole percent of test cases that are no longer pending.
    pub completion_rate: u32,
}

/// Snapshot written by the JSON export.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistExport {
    pub report_name: String,
    pub reporting_tool: ReportingTool,
    pub validation_date: NaiveDate,
    pub validator: String,
    pub report_description: String,
    pub test_cases: Vec<TestCase>,
}
