//! File handler contributions.
//!
//! A file handler receives files the user dropped or pasted at an extension
//! point. One config may target several extension points; it is stored once
//! per target.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use super::{PluginExtensionConfigs, RegisterReport, Registry, RegistryState};
use crate::errors::{self, ExtensionError};
use crate::helpers::ExtensionHelpers;
use crate::meta::{ExtensionMeta, Targets};
use crate::validators::{is_target_valid, required_text};

const LOG_PREFIX: &str = "Could not register file handler extension. Reason:";

/// A file handed to file handler extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginFile {
	pub name: String,
	pub mime_type: Option<String>,
	pub data: Bytes,
}

impl PluginFile {
	pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
		Self {
			name: name.into(),
			mime_type: None,
			data: data.into(),
		}
	}

	pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
		self.mime_type = Some(mime_type.into());
		self
	}
}

pub type OnFileFn = Arc<dyn Fn(&PluginFile, &ExtensionHelpers) -> anyhow::Result<()> + Send + Sync>;

/// Plugin-authored file handler descriptor.
#[derive(Clone)]
pub struct FileHandlerConfig {
	pub title: Option<String>,
	pub description: Option<String>,
	pub targets: Targets,
	pub on_file: OnFileFn,
}

impl FileHandlerConfig {
	pub fn new<F>(targets: impl Into<Targets>, on_file: F) -> Self
	where
		F: Fn(&PluginFile, &ExtensionHelpers) -> anyhow::Result<()> + Send + Sync + 'static,
	{
		Self {
			title: None,
			description: None,
			targets: targets.into(),
			on_file: Arc::new(on_file),
		}
	}

	/// Builds a config from declared metadata and the plugin's handler.
	pub fn from_meta(meta: &ExtensionMeta, on_file: OnFileFn) -> Self {
		Self {
			title: meta.title.clone(),
			description: meta.description.clone(),
			targets: meta.targets.clone(),
			on_file,
		}
	}

	pub fn title(mut self, title: impl Into<String>) -> Self {
		self.title = Some(title.into());
		self
	}

	pub fn description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}
}

impl fmt::Debug for FileHandlerConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FileHandlerConfig")
			.field("title", &self.title)
			.field("description", &self.description)
			.field("targets", &self.targets)
			.finish_non_exhaustive()
	}
}

/// A validated file handler stored under one extension point.
#[derive(Clone)]
pub struct FileHandlerRegistryItem {
	pub plugin_id: String,
	pub extension_point_id: String,
	pub title: String,
	pub description: Option<String>,
	pub on_file: OnFileFn,
}

impl fmt::Debug for FileHandlerRegistryItem {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FileHandlerRegistryItem")
			.field("plugin_id", &self.plugin_id)
			.field("extension_point_id", &self.extension_point_id)
			.field("title", &self.title)
			.field("description", &self.description)
			.finish_non_exhaustive()
	}
}

pub type FileHandlerRegistry = Registry<Vec<FileHandlerRegistryItem>, FileHandlerConfig>;

impl FileHandlerRegistry {
	pub fn new() -> Self {
		Self::with_mapper("file-handlers", map_file_handlers)
	}
}

impl Default for FileHandlerRegistry {
	fn default() -> Self {
		Self::new()
	}
}

/// Mapping function of the file handler registry.
pub fn map_file_handlers(
	registry: &mut RegistryState<Vec<FileHandlerRegistryItem>>,
	item: PluginExtensionConfigs<FileHandlerConfig>,
) -> RegisterReport {
	let PluginExtensionConfigs { plugin_id, configs } = item;
	let mut report = RegisterReport::default();

	for config in configs {
		let Some(title) = required_text(config.title.as_deref()) else {
			tracing::error!(
				target: crate::REGISTRY_LOG_TARGET,
				plugin_id = %plugin_id,
				description = config.description.as_deref().unwrap_or_default(),
				"{LOG_PREFIX} {}",
				errors::TITLE_MISSING,
			);
			report.reject(&plugin_id, None, ExtensionError::TitleMissing);
			continue;
		};

		if config.targets.is_empty() {
			tracing::debug!(
				target: crate::REGISTRY_LOG_TARGET,
				plugin_id = %plugin_id,
				title,
				"file handler has no targets, nothing stored",
			);
			continue;
		}

		for extension_point_id in config.targets.iter() {
			if !is_target_valid(extension_point_id) {
				tracing::error!(
					target: crate::REGISTRY_LOG_TARGET,
					plugin_id = %plugin_id,
					title,
					extension_point_id = %extension_point_id,
					"{LOG_PREFIX} {}",
					errors::INVALID_TARGET,
				);
				report.reject(&plugin_id, Some(title), ExtensionError::InvalidTarget);
				continue;
			}
			registry.entry_mut(extension_point_id).push(FileHandlerRegistryItem {
				plugin_id: plugin_id.clone(),
				extension_point_id: extension_point_id.clone(),
				title: title.to_string(),
				description: config.description.clone(),
				on_file: Arc::clone(&config.on_file),
			});
			report.added += 1;

			tracing::debug!(
				target: crate::REGISTRY_LOG_TARGET,
				plugin_id = %plugin_id,
				extension_point_id = %extension_point_id,
				title,
				"File handler extension successfully registered",
			);
		}
	}

	report
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	fn noop(_: &PluginFile, _: &ExtensionHelpers) -> anyhow::Result<()> {
		Ok(())
	}

	#[test]
	fn fans_out_one_item_per_target() {
		let registry = FileHandlerRegistry::new();
		let config = FileHandlerConfig::new(["dash/grid", "dash/dragndrop"], noop)
			.title("Import CSV")
			.description("Creates a table panel");
		let report = registry.register(PluginExtensionConfigs::new("acme", vec![config]));

		assert_eq!(report.added, 2);
		let snap = registry.snapshot();
		let grid = &snap.get("dash/grid").unwrap()[0];
		let drop = &snap.get("dash/dragndrop").unwrap()[0];
		assert_eq!(grid.extension_point_id, "dash/grid");
		assert_eq!(drop.extension_point_id, "dash/dragndrop");
		for item in [grid, drop] {
			assert_eq!(item.plugin_id, "acme");
			assert_eq!(item.title, "Import CSV");
			assert_eq!(item.description.as_deref(), Some("Creates a table panel"));
		}
		assert!(Arc::ptr_eq(&grid.on_file, &drop.on_file));
	}

	#[test]
	fn scalar_target_is_a_single_item() {
		let registry = FileHandlerRegistry::new();
		let config = FileHandlerConfig::new("dash/grid", noop).title("Import CSV");
		registry.register(PluginExtensionConfigs::new("acme", vec![config]));

		let snap = registry.snapshot();
		assert_eq!(snap.len(), 1);
		assert_eq!(snap.get("dash/grid").map(Vec::len), Some(1));
	}

	#[test]
	fn untitled_config_is_skipped_rest_of_batch_lands() {
		let registry = FileHandlerRegistry::new();
		let report = registry.register(PluginExtensionConfigs::new(
			"acme",
			vec![
				FileHandlerConfig::new(["dash/grid", "dash/dragndrop"], noop),
				FileHandlerConfig::new("dash/grid", noop).title("   "),
				FileHandlerConfig::new("dash/grid", noop).title("Import JSON"),
			],
		));

		assert_eq!(report.added, 1);
		assert_eq!(report.rejected.len(), 2);
		assert!(report.rejected.iter().all(|r| r.reason == ExtensionError::TitleMissing));

		let snap = registry.snapshot();
		assert!(!snap.contains_key("dash/dragndrop"));
		let titles: Vec<_> = snap.get("dash/grid").unwrap().iter().map(|i| i.title.as_str()).collect();
		assert_eq!(titles, vec!["Import JSON"]);
	}

	#[test]
	fn blank_targets_are_rejected_one_by_one() {
		let registry = FileHandlerRegistry::new();
		let report = registry.register(PluginExtensionConfigs::new(
			"acme",
			vec![FileHandlerConfig::new(["", "dash/grid", "  "], noop).title("Import CSV")],
		));

		assert_eq!(report.added, 1);
		assert_eq!(report.rejected.len(), 2);
		assert!(report.rejected.iter().all(|r| r.reason == ExtensionError::InvalidTarget));
		let snap = registry.snapshot();
		assert_eq!(snap.len(), 1);
		assert!(snap.contains_key("dash/grid"));
	}

	#[test]
	fn title_is_stored_as_written() {
		let registry = FileHandlerRegistry::new();
		registry.register(PluginExtensionConfigs::new(
			"acme",
			vec![
				FileHandlerConfig::new("dash/grid", noop).title(" Import CSV "),
				FileHandlerConfig::new("dash/grid", noop).title("Import CSV"),
			],
		));

		let snap = registry.snapshot();
		let titles: Vec<_> = snap.get("dash/grid").unwrap().iter().map(|i| i.title.as_str()).collect();
		assert_eq!(titles, vec![" Import CSV ", "Import CSV"]);
	}

	#[test]
	fn order_follows_configs_then_targets() {
		let registry = FileHandlerRegistry::new();
		registry.register(PluginExtensionConfigs::new(
			"acme",
			vec![
				FileHandlerConfig::new(["dash/grid"], noop).title("First"),
				FileHandlerConfig::new(["dash/grid", "dash/list"], noop).title("Second"),
			],
		));
		registry.register(PluginExtensionConfigs::new(
			"zeta",
			vec![FileHandlerConfig::new("dash/grid", noop).title("Third")],
		));

		let snap = registry.snapshot();
		let grid: Vec<_> = snap
			.get("dash/grid")
			.unwrap()
			.iter()
			.map(|i| (i.plugin_id.as_str(), i.title.as_str()))
			.collect();
		assert_eq!(grid, vec![("acme", "First"), ("acme", "Second"), ("zeta", "Third")]);
	}
}
