pub mod activity;
pub mod detail;
pub mod document_list;
pub mod header;
pub mod help;
pub mod indicators;
pub mod stats;
