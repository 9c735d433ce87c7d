//! Core types, configuration, and string utilities shared by every Penwise crate.

pub mod config;
pub mod types;
pub mod utils;
