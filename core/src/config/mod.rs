//! Application configuration management

use std::path::PathBuf;

use anyhow::Result;
use directories::ProjectDirs;

pub mod app_config;

pub use app_config::AppConfig;

/// Versioned configuration that knows how to upgrade itself.
pub trait Migrate {
	fn current_version(&self) -> u32;

	fn target_version() -> u32;

	fn migrate(&mut self) -> Result<()>;
}

/// Platform specific data directory, `None` when no home directory can be determined.
#[must_use]
pub fn default_data_dir() -> Option<PathBuf> {
	ProjectDirs::from("app", "MyBar", "mybar").map(|dirs| dirs.data_local_dir().to_path_buf())
}
