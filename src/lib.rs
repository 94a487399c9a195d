// ABOUTME: Library module for sqldump-importer
// ABOUTME: Exports all core functionality for use in binary and tests

pub mod commands;
pub mod config;
pub mod index;
pub mod replay;
pub mod source;
pub mod target;
pub mod utils;
