//! Application configuration

use super::{default_data_dir, Migrate};

use std::{
	env, fs,
	path::{Path, PathBuf},
	time::Duration,
};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "mybar.json";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";
pub const SERVER_URL_ENV: &str = "SERVER_URL";

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
	/// Config schema version
	pub version: u32,

	/// Data directory path
	pub data_dir: PathBuf,

	/// Base URL of the cocktail server
	pub server_url: String,

	/// Timeout applied to every HTTP request
	#[serde(default = "default_request_timeout_secs")]
	pub request_timeout_secs: u64,

	/// Period of the background sync loop
	#[serde(default = "default_sync_interval_secs")]
	pub sync_interval_secs: u64,

	/// Logging level
	pub log_level: String,
}

const fn default_request_timeout_secs() -> u64 {
	30
}

const fn default_sync_interval_secs() -> u64 {
	60
}

impl AppConfig {
	/// Load configuration from the default location
	pub fn load() -> Result<Self> {
		let data_dir = default_data_dir().unwrap_or_else(|| PathBuf::from("."));
		Self::load_from(&data_dir)
	}

	/// Load configuration from a specific data directory, creating it with defaults if missing.
	///
	/// The `SERVER_URL` environment variable overrides the stored server url without being
	/// written back.
	pub fn load_from(data_dir: &Path) -> Result<Self> {
		let config_path = data_dir.join(CONFIG_FILE_NAME);

		let mut config = if config_path.exists() {
			info!(path = %config_path.display(), "Loading config;");
			let json = fs::read_to_string(&config_path)
				.with_context(|| format!("failed to read {}", config_path.display()))?;
			let mut config: AppConfig = serde_json::from_str(&json)
				.with_context(|| format!("failed to parse {}", config_path.display()))?;

			if config.current_version() < Self::target_version() {
				info!(
					from = config.current_version(),
					to = Self::target_version(),
					"Migrating config;",
				);
				config.migrate()?;
				config.save()?;
			}

			config
		} else {
			warn!(path = %config_path.display(), "No config found, creating default;");
			let config = Self::default_with_dir(data_dir.to_path_buf());
			config.save()?;
			config
		};

		if let Ok(server_url) = env::var(SERVER_URL_ENV) {
			if !server_url.trim().is_empty() {
				config.server_url = server_url;
			}
		}

		Ok(config)
	}

	/// Create default configuration with specific data directory
	#[must_use]
	pub fn default_with_dir(data_dir: PathBuf) -> Self {
		Self {
			version: Self::target_version(),
			data_dir,
			server_url: DEFAULT_SERVER_URL.to_string(),
			request_timeout_secs: default_request_timeout_secs(),
			sync_interval_secs: default_sync_interval_secs(),
			log_level: "info".to_string(),
		}
	}

	/// Save configuration to disk
	pub fn save(&self) -> Result<()> {
		fs::create_dir_all(&self.data_dir)?;

		let config_path = self.data_dir.join(CONFIG_FILE_NAME);
		let json = serde_json::to_string_pretty(self)?;
		fs::write(&config_path, json)?;
		info!(path = %config_path.display(), "Saved config;");
		Ok(())
	}

	#[must_use]
	pub fn store_path(&self) -> PathBuf {
		self.data_dir.join("store.mbstore")
	}

	#[must_use]
	pub fn image_cache_dir(&self) -> PathBuf {
		self.data_dir.join("images")
	}

	#[must_use]
	pub const fn request_timeout(&self) -> Duration {
		Duration::from_secs(self.request_timeout_secs)
	}

	#[must_use]
	pub const fn sync_interval(&self) -> Duration {
		Duration::from_secs(self.sync_interval_secs)
	}
}

impl Default for AppConfig {
	fn default() -> Self {
		Self::default_with_dir(default_data_dir().unwrap_or_else(|| PathBuf::from(".")))
	}
}

impl Migrate for AppConfig {
	fn current_version(&self) -> u32 {
		self.version
	}

	fn target_version() -> u32 {
		2
	}

	fn migrate(&mut self) -> Result<()> {
		match self.version {
			0 => {
				self.version = 1;
				self.migrate()
			}
			1 => {
				// v2 made timeouts and the sync interval configurable
				self.request_timeout_secs = default_request_timeout_secs();
				self.sync_interval_secs = default_sync_interval_secs();
				self.version = 2;
				Ok(())
			}
			2 => Ok(()),
			v => Err(anyhow!("Unknown config version: {v}")),
		}
	}
}
