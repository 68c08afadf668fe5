pub mod checklist_store;
pub mod clipboard;
pub mod filter;
pub mod json_export;
pub mod pdf_export;
pub mod render;
pub mod seed;
pub mod summary;
