use crate::domain::test_case::TestCase;
use once_cell::sync::Lazy;

static SEED_JSON: &str = include_str!("../../../resources/seed_test_cases.json");

static SEED_CASES: Lazy<Vec<TestCase>> = Lazy::new(|| {
    serde_json::from_str(SEED_JSON).expect("bundled seed test cases must be valid JSON")
});

/// The fixed "Top 10 Suppliers" checklist loaded at startup.
pub fn seed_test_cases() -> Vec<TestCase> {
    SEED_CASES.clone()
}
