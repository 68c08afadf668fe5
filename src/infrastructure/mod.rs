pub mod config;
pub mod evidence_store;
pub mod storage;
