//! Configuration management for linelog

pub mod settings;

pub use settings::{ServerConfig, ServerSettings, StorageSettings};
