use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use validator::Validate;

/// Validation category a test case belongs to.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Technical,
    Functional,
    Integrity,
    Accuracy,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Technical,
        Phase::Functional,
        Phase::Integrity,
        Phase::Accuracy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Technical => "technical",
            Self::Functional => "functional",
            Self::Integrity => "integrity",
            Self::Accuracy => "accuracy",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Technical => "Technical Validation",
            Self::Functional => "Functional Validation",
            Self::Integrity => "Data Integrity Validation",
            Self::Accuracy => "Data Accuracy Validation",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Technical => "\u{1F527}",
            Self::Functional => "\u{1F9ED}",
            Self::Integrity => "\u{1F9F1}",
            Self::Accuracy => "\u{1F3AF}",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "technical" => Ok(Self::Technical),
            "functional" => Ok(Self::Functional),
            "integrity" => Ok(Self::Integrity),
            "accuracy" => Ok(Self::Accuracy),
            _ => Err(format!("Unknown validation phase: {}", s)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    Passed,
    Failed,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Pending, Status::Passed, Status::Failed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Passed => "passed",
            Self::Failed => "failed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Passed => "Passed",
            Self::Failed => "Failed",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Pending => "\u{23F3}",
            Self::Passed => "\u{2705}",
            Self::Failed => "\u{274C}",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "passed" => Ok(Self::Passed),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("Unknown test status: {}", s)),
        }
    }
}

/// Reporting tool whose target-query variant is currently active.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReportingTool {
    #[default]
    #[serde(rename = "powerbi")]
    PowerBi,
    #[serde(rename = "oac")]
    Oac,
}

impl ReportingTool {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PowerBi => "powerbi",
            Self::Oac => "oac",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::PowerBi => "Power BI",
            Self::Oac => "Oracle Analytics Cloud",
        }
    }

    pub fn target_query_label(&self) -> &'static str {
        match self {
            Self::PowerBi => "Target Query (One Lake Warehouse / Lakehouse)",
            Self::Oac => "Target Query (Oracle ADW)",
        }
    }
}

impl fmt::Display for ReportingTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReportingTool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "powerbi" => Ok(Self::PowerBi),
            "oac" => Ok(Self::Oac),
            _ => Err(format!("Unknown reporting tool: {}", s)),
        }
    }
}

pub const SOURCE_QUERY_LABEL: &str = "Source Query (Oracle EBS/Fusion)";

/// Handle to the uploaded bytes on disk. Lives only in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceHandle {
    pub path: PathBuf,
    pub size: u64,
    pub sha256: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Evidence {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Inline data URL, only kept for image attachments.
    pub url: Option<String>,
    #[serde(skip)]
    pub file: Option<EvidenceHandle>,
}

impl Evidence {
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub id: String,
    pub title: String,
    pub phase: Phase,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source_query: String,
    #[serde(default, rename = "targetQueryPowerBI")]
    pub target_query_power_bi: String,
    #[serde(default, rename = "targetQueryOAC")]
    pub target_query_oac: String,
    /// Single-field target query from older checklists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_query: Option<String>,
    #[serde(default)]
    pub expected_result: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
}

/// Tool-specific target query if non-empty, else the legacy field, else "".
pub fn resolve_target_query(test_case: &TestCase, tool: ReportingTool) -> &str {
    let specific = match tool {
        ReportingTool::PowerBi => test_case.target_query_power_bi.as_str(),
        ReportingTool::Oac => test_case.target_query_oac.as_str(),
    };
    if !specific.is_empty() {
        return specific;
    }
    match test_case.target_query.as_deref() {
        Some(legacy) if !legacy.is_empty() => legacy,
        _ => "",
    }
}

/// Values submitted by the add/edit form.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseInput {
    #[validate(length(min = 1, message = "Test case ID is required"))]
    pub id: String,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub phase: Phase,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source_query: String,
    #[serde(default)]
    pub target_query: String,
    #[serde(default)]
    pub expected_result: String,
}

/// Partial edit. `None` leaves the stored field untouched.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseUpdate {
    pub id: Option<String>,
    pub title: Option<String>,
    pub phase: Option<Phase>,
    pub description: Option<String>,
    pub source_query: Option<String>,
    pub target_query: Option<String>,
    pub expected_result: Option<String>,
}

impl From<TestCaseInput> for TestCaseUpdate {
    fn from(input: TestCaseInput) -> Self {
        Self {
            id: Some(input.id),
            title: Some(input.title),
            phase: Some(input.phase),
            description: Some(input.description),
            source_query: Some(input.source_query),
            target_query: Some(input.target_query),
            expected_result: Some(input.expected_result),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    Source,
    Target,
}

impl std::str::FromStr for QueryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "source" => Ok(Self::Source),
            "target" => Ok(Self::Target),
            _ => Err(format!("Unknown query kind: {}", s)),
        }
    }
}
