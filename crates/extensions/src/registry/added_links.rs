//! Link contributions added to extension points.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{PluginExtensionConfigs, RegisterReport, Registry, RegistryState};
use crate::context::ReadOnlyContext;
use crate::errors::{self, ExtensionError};
use crate::helpers::ExtensionHelpers;
use crate::meta::{AddedLinkMeta, Targets};
use crate::validators::{is_link_path_valid, is_target_valid, required_text};

const LOG_PREFIX: &str = "Could not register link extension. Reason:";

pub type OnClickFn = Arc<dyn Fn(&ExtensionHelpers) -> anyhow::Result<()> + Send + Sync>;

/// Per-context adjustment of a link. `Ok(None)` hides the link.
pub type ConfigureFn =
	Arc<dyn Fn(&ReadOnlyContext) -> anyhow::Result<Option<LinkOverrides>> + Send + Sync>;

/// Fields a `configure` function may override for one render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkOverrides {
	pub title: Option<String>,
	pub description: Option<String>,
	pub path: Option<String>,
	pub icon: Option<String>,
	pub category: Option<String>,
}

#[derive(Clone, Default)]
pub struct AddedLinkConfig {
	pub title: Option<String>,
	pub description: Option<String>,
	pub targets: Targets,
	pub path: Option<String>,
	pub on_click: Option<OnClickFn>,
	pub icon: Option<String>,
	pub category: Option<String>,
	pub configure: Option<ConfigureFn>,
}

impl AddedLinkConfig {
	pub fn new(targets: impl Into<Targets>) -> Self {
		Self {
			targets: targets.into(),
			..Self::default()
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

	pub fn path(mut self, path: impl Into<String>) -> Self {
		self.path = Some(path.into());
		self
	}

	pub fn icon(mut self, icon: impl Into<String>) -> Self {
		self.icon = Some(icon.into());
		self
	}

	pub fn category(mut self, category: impl Into<String>) -> Self {
		self.category = Some(category.into());
		self
	}

	pub fn on_click<F>(mut self, on_click: F) -> Self
	where
		F: Fn(&ExtensionHelpers) -> anyhow::Result<()> + Send + Sync + 'static,
	{
		self.on_click = Some(Arc::new(on_click));
		self
	}

	pub fn configure<F>(mut self, configure: F) -> Self
	where
		F: Fn(&ReadOnlyContext) -> anyhow::Result<Option<LinkOverrides>> + Send + Sync + 'static,
	{
		self.configure = Some(Arc::new(configure));
		self
	}
}

impl From<&AddedLinkMeta> for AddedLinkConfig {
	fn from(meta: &AddedLinkMeta) -> Self {
		Self {
			title: meta.title.clone(),
			description: meta.description.clone(),
			targets: meta.targets.clone(),
			path: meta.path.clone(),
			icon: meta.icon.clone(),
			category: meta.category.clone(),
			..Self::default()
		}
	}
}

impl fmt::Debug for AddedLinkConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AddedLinkConfig")
			.field("title", &self.title)
			.field("targets", &self.targets)
			.field("path", &self.path)
			.field("on_click", &self.on_click.is_some())
			.field("configure", &self.configure.is_some())
			.finish_non_exhaustive()
	}
}

#[derive(Clone)]
pub struct AddedLinkRegistryItem {
	pub plugin_id: String,
	pub extension_point_id: String,
	pub title: String,
	pub description: String,
	pub path: Option<String>,
	pub on_click: Option<OnClickFn>,
	pub icon: Option<String>,
	pub category: Option<String>,
	pub configure: Option<ConfigureFn>,
}

impl fmt::Debug for AddedLinkRegistryItem {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AddedLinkRegistryItem")
			.field("plugin_id", &self.plugin_id)
			.field("extension_point_id", &self.extension_point_id)
			.field("title", &self.title)
			.field("path", &self.path)
			.finish_non_exhaustive()
	}
}

pub type AddedLinksRegistry = Registry<Vec<AddedLinkRegistryItem>, AddedLinkConfig>;

impl AddedLinksRegistry {
	pub fn new() -> Self {
		Self::with_mapper("added-links", map_added_links)
	}
}

impl Default for AddedLinksRegistry {
	fn default() -> Self {
		Self::new()
	}
}

/// Checks a link config; returns its title and description when it may be stored.
fn validate<'a>(
	plugin_id: &str,
	config: &'a AddedLinkConfig,
) -> Result<(&'a str, &'a str), ExtensionError> {
	let title = required_text(config.title.as_deref()).ok_or(ExtensionError::TitleMissing)?;
	let description =
		required_text(config.description.as_deref()).ok_or(ExtensionError::DescriptionMissing)?;
	match (&config.path, &config.on_click) {
		(None, None) => Err(ExtensionError::InvalidPathOrOnClick),
		(Some(path), _) if !is_link_path_valid(plugin_id, path) => Err(ExtensionError::InvalidPath),
		_ => Ok((title, description)),
	}
}

pub fn map_added_links(
	registry: &mut RegistryState<Vec<AddedLinkRegistryItem>>,
	item: PluginExtensionConfigs<AddedLinkConfig>,
) -> RegisterReport {
	let PluginExtensionConfigs { plugin_id, configs } = item;
	let mut report = RegisterReport::default();

	for config in configs {
		let (title, description) = match validate(&plugin_id, &config) {
			Ok(valid) => valid,
			Err(reason) => {
				tracing::error!(
					target: crate::REGISTRY_LOG_TARGET,
					plugin_id = %plugin_id,
					title = config.title.as_deref().unwrap_or_default(),
					path = config.path.as_deref().unwrap_or_default(),
					"{LOG_PREFIX} {}",
					reason.message(),
				);
				report.reject(&plugin_id, config.title.as_deref(), reason);
				continue;
			}
		};

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
			registry.entry_mut(extension_point_id).push(AddedLinkRegistryItem {
				plugin_id: plugin_id.clone(),
				extension_point_id: extension_point_id.clone(),
				title: title.to_string(),
				description: description.to_string(),
				path: config.path.clone(),
				on_click: config.on_click.clone(),
				icon: config.icon.clone(),
				category: config.category.clone(),
				configure: config.configure.clone(),
			});
			report.added += 1;

			tracing::debug!(
				target: crate::REGISTRY_LOG_TARGET,
				plugin_id = %plugin_id,
				extension_point_id = %extension_point_id,
				title,
				"Link extension successfully registered",
			);
		}
	}

	report
}

#[cfg(test)]
mod tests;
