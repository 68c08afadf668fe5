pub mod checklist;
pub mod error;
pub mod test_case;
