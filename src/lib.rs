//! Spendbook
//!
//! A local personal-finance tracker: record transactions, validate input,
//! search and sort them, and derive dashboard statistics in any configured
//! currency. State is persisted through a pluggable key-value backend.

pub mod config;
pub mod core;
pub mod import;
pub mod render;
pub mod storage;
