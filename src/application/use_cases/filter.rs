//! Card visibility for the phase/status/search filter bar.
//!
//! Filtering never removes test cases; it yields one visibility flag per
//! rendered card, positionally aligned with the store.

use crate::domain::error::{AppError, Result};
use crate::domain::test_case::{Phase, Status, TestCase};
use serde::Deserialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseFilter {
    #[default]
    All,
    Only(Phase),
}

impl FromStr for PhaseFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        Phase::from_str(s).map(Self::Only)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        Status::from_str(s).map(Self::Only)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub phase: PhaseFilter,
    pub status: StatusFilter,
    pub search: String,
}

/// Raw filter values as they arrive from the filter bar.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterQuery {
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    /// Number of cards currently rendered by the caller.
    pub rendered: usize,
}

impl FilterQuery {
    pub fn criteria(&self) -> Result<FilterCriteria> {
        let phase = self
            .phase
            .as_deref()
            .unwrap_or("all")
            .parse::<PhaseFilter>()
            .map_err(AppError::ParseError)?;
        let status = self
            .status
            .as_deref()
            .unwrap_or("all")
            .parse::<StatusFilter>()
            .map_err(AppError::ParseError)?;
        Ok(FilterCriteria {
            phase,
            status,
            search: self.search.clone().unwrap_or_default(),
        })
    }
}

impl FilterCriteria {
    pub fn matches(&self, test_case: &TestCase) -> bool {
        if let PhaseFilter::Only(phase) = self.phase {
            if test_case.phase != phase {
                return false;
            }
        }

        if let StatusFilter::Only(status) = self.status {
            if test_case.status != status {
                return false;
            }
        }

        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        test_case.title.to_lowercase().contains(&needle)
            || test_case.description.to_lowercase().contains(&needle)
            || test_case.id.to_lowercase().contains(&needle)
    }
}

/// One flag per card. Refuses to run when the rendered list and the store
/// disagree in length, since flags are applied by position.
pub fn visibility(
    test_cases: &[TestCase],
    criteria: &FilterCriteria,
    rendered_len: usize,
) -> Result<Vec<bool>> {
    if rendered_len != test_cases.len() {
        return Err(AppError::ValidationError(format!(
            "Rendered card count {} does not match {} test cases; re-render before filtering",
            rendered_len,
            test_cases.len()
        )));
    }
    Ok(test_cases.iter().map(|tc| criteria.matches(tc)).collect())
}
