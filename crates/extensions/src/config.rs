//! Host configuration loaded from TOML.
//!
//! ```toml
//! [runtime]
//! dev_mode = true
//! host_plugin_id = "grafana"
//!
//! [[core.added_links]]
//! title = "Explore"
//! description = "Open in Explore"
//! targets = "grafana/dashboard/panel/menu"
//! path = "/a/grafana/explore"
//!
//! [apps."acme-app".extensions]
//! extension_points = [{ id = "acme-app/main" }]
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::meta::{AddedLinkMeta, AppPluginTable, PluginMeta};
use crate::registry::added_links::AddedLinkConfig;
use crate::registry::setup::CoreExtensions;

pub const DEFAULT_HOST_PLUGIN_ID: &str = "grafana";

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("I/O error reading {path}: {error}")]
	Io { path: PathBuf, error: std::io::Error },

	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("invalid app {id:?}: {reason}")]
	InvalidApp { id: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Settings that change how hooks treat their callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
	/// Enables the restriction checks on plugin call sites.
	pub dev_mode: bool,
	/// Plugin id the host registers its own contributions under.
	pub host_plugin_id: String,
}

impl Default for RuntimeSettings {
	fn default() -> Self {
		Self {
			dev_mode: false,
			host_plugin_id: DEFAULT_HOST_PLUGIN_ID.to_string(),
		}
	}
}

/// Contributions the host declares for itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
	pub added_links: Vec<AddedLinkMeta>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutletConfig {
	pub runtime: RuntimeSettings,
	pub core: CoreConfig,
	/// App plugin metadata keyed by plugin id.
	pub apps: BTreeMap<String, PluginMeta>,
}

impl OutletConfig {
	/// Parses a TOML document. App ids default to their table key.
	pub fn parse(source: &str) -> Result<Self> {
		let mut config: Self = toml::from_str(source)?;
		for (key, meta) in &mut config.apps {
			if meta.id.is_empty() {
				meta.id.clone_from(key);
			} else if meta.id != *key {
				return Err(ConfigError::InvalidApp {
					id: key.clone(),
					reason: format!("declared id {:?} does not match its table key", meta.id),
				});
			}
		}
		if config.runtime.host_plugin_id.trim().is_empty() {
			config.runtime.host_plugin_id = DEFAULT_HOST_PLUGIN_ID.to_string();
		}
		Ok(config)
	}

	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let source = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		let config = Self::parse(&source)?;
		tracing::debug!(
			path = %path.display(),
			apps = config.apps.len(),
			dev_mode = config.runtime.dev_mode,
			"loaded outlet config",
		);
		Ok(config)
	}

	pub fn app_table(&self) -> AppPluginTable {
		self.apps.values().cloned().collect()
	}

	/// Host contributions declared in `[core]`.
	pub fn core_extensions(&self) -> CoreExtensions {
		CoreExtensions {
			added_links: self.core.added_links.iter().map(AddedLinkConfig::from).collect(),
			..CoreExtensions::default()
		}
	}

	/// Apps marked `preload`, which the host loads at startup.
	pub fn preloaded_apps(&self) -> impl Iterator<Item = &str> {
		self.apps
			.values()
			.filter(|meta| meta.preload)
			.map(|meta| meta.id.as_str())
	}
}
