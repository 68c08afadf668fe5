use crate::domain::checklist::ChecklistSummary;
use crate::domain::test_case::{Status, TestCase};

pub fn summarize(test_cases: &[TestCase]) -> ChecklistSummary {
    let total = test_cases.len();
    let count = |status: Status| test_cases.iter().filter(|tc| tc.status == status).count();
    let passed = count(Status::Passed);
    let failed = count(Status::Failed);
    let pending = count(Status::Pending);

    ChecklistSummary {
        total,
        passed,
        failed,
        pending,
        completion_rate: completion_rate(passed, failed, total),
    }
}

/// round(100 * (passed + failed) / total), 0 for an empty checklist.
pub fn completion_rate(passed: usize, failed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let done = (passed + failed) as f64;
    (done * 100.0 / total as f64).round() as u32
}
