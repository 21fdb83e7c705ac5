//! Core functionality: document session, persistence backends, recent files,
//! transient resources and configuration

pub mod autosave;
pub mod backend;
pub mod config;
pub mod document;
pub mod error;
pub mod file_system;
pub mod format;
pub mod host;
pub mod recent;
pub mod render;
pub mod resources;
pub mod session;
pub mod stats;
pub mod storage;
pub mod theme;

#[cfg(test)]
pub mod testing;
