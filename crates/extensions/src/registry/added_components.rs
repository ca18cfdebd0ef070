//! Component contributions rendered inside extension points.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::{PluginExtensionConfigs, RegisterReport, Registry, RegistryState};
use crate::context::ReadOnlyContext;
use crate::errors::{self, ExtensionError};
use crate::meta::{ExtensionMeta, Targets};
use crate::validators::{is_target_valid, required_text};

const LOG_PREFIX: &str = "Could not register component extension. Reason:";

/// Renders a component for the given props, producing an opaque description
/// the host knows how to display.
pub type ComponentFn = Arc<dyn Fn(&ReadOnlyContext) -> anyhow::Result<Value> + Send + Sync>;

#[derive(Clone)]
pub struct AddedComponentConfig {
	pub title: Option<String>,
	pub description: Option<String>,
	pub targets: Targets,
	pub component: ComponentFn,
}

impl AddedComponentConfig {
	pub fn new<F>(targets: impl Into<Targets>, component: F) -> Self
	where
		F: Fn(&ReadOnlyContext) -> anyhow::Result<Value> + Send + Sync + 'static,
	{
		Self {
			title: None,
			description: None,
			targets: targets.into(),
			component: Arc::new(component),
		}
	}

	pub fn from_meta(meta: &ExtensionMeta, component: ComponentFn) -> Self {
		Self {
			title: meta.title.clone(),
			description: meta.description.clone(),
			targets: meta.targets.clone(),
			component,
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

impl fmt::Debug for AddedComponentConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AddedComponentConfig")
			.field("title", &self.title)
			.field("description", &self.description)
			.field("targets", &self.targets)
			.finish_non_exhaustive()
	}
}

#[derive(Clone)]
pub struct AddedComponentRegistryItem {
	pub plugin_id: String,
	pub extension_point_id: String,
	pub title: String,
	pub description: String,
	pub component: ComponentFn,
}

impl fmt::Debug for AddedComponentRegistryItem {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AddedComponentRegistryItem")
			.field("plugin_id", &self.plugin_id)
			.field("extension_point_id", &self.extension_point_id)
			.field("title", &self.title)
			.finish_non_exhaustive()
	}
}

pub type AddedComponentsRegistry = Registry<Vec<AddedComponentRegistryItem>, AddedComponentConfig>;

impl AddedComponentsRegistry {
	pub fn new() -> Self {
		Self::with_mapper("added-components", map_added_components)
	}
}

impl Default for AddedComponentsRegistry {
	fn default() -> Self {
		Self::new()
	}
}

pub fn map_added_components(
	registry: &mut RegistryState<Vec<AddedComponentRegistryItem>>,
	item: PluginExtensionConfigs<AddedComponentConfig>,
) -> RegisterReport {
	let PluginExtensionConfigs { plugin_id, configs } = item;
	let mut report = RegisterReport::default();

	for config in configs {
		let checked = required_text(config.title.as_deref())
			.ok_or(ExtensionError::TitleMissing)
			.and_then(|title| {
				required_text(config.description.as_deref())
					.map(|description| (title, description))
					.ok_or(ExtensionError::DescriptionMissing)
			});
		let (title, description) = match checked {
			Ok(fields) => fields,
			Err(reason) => {
				tracing::error!(
					target: crate::REGISTRY_LOG_TARGET,
					plugin_id = %plugin_id,
					title = config.title.as_deref().unwrap_or_default(),
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
			registry.entry_mut(extension_point_id).push(AddedComponentRegistryItem {
				plugin_id: plugin_id.clone(),
				extension_point_id: extension_point_id.clone(),
				title: title.to_string(),
				description: description.to_string(),
				component: Arc::clone(&config.component),
			});
			report.added += 1;

			tracing::debug!(
				target: crate::REGISTRY_LOG_TARGET,
				plugin_id = %plugin_id,
				extension_point_id = %extension_point_id,
				title,
				"Component extension successfully registered",
			);
		}
	}

	report
}
