//! Components a plugin exposes for other plugins to render by id.
//!
//! Unlike the list registries this one is keyed by component id and stores a
//! single item per key. The first registration of an id wins.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::added_components::ComponentFn;
use super::{PluginExtensionConfigs, RegisterReport, Registry, RegistryState};
use crate::context::ReadOnlyContext;
use crate::errors::ExtensionError;
use crate::meta::ExposedComponentMeta;
use crate::validators::{is_exposed_component_id_valid, required_text};

const LOG_PREFIX: &str = "Could not register exposed component extension. Reason:";

#[derive(Clone)]
pub struct ExposedComponentConfig {
	pub id: String,
	pub title: Option<String>,
	pub description: Option<String>,
	pub component: ComponentFn,
}

impl ExposedComponentConfig {
	pub fn new<F>(id: impl Into<String>, component: F) -> Self
	where
		F: Fn(&ReadOnlyContext) -> anyhow::Result<Value> + Send + Sync + 'static,
	{
		Self {
			id: id.into(),
			title: None,
			description: None,
			component: Arc::new(component),
		}
	}

	pub fn from_meta(meta: &ExposedComponentMeta, component: ComponentFn) -> Self {
		Self {
			id: meta.id.clone(),
			title: meta.title.clone(),
			description: meta.description.clone(),
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

impl fmt::Debug for ExposedComponentConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ExposedComponentConfig")
			.field("id", &self.id)
			.field("title", &self.title)
			.finish_non_exhaustive()
	}
}

#[derive(Clone)]
pub struct ExposedComponentRegistryItem {
	/// Plugin that exposes the component.
	pub plugin_id: String,
	pub id: String,
	pub title: String,
	pub description: String,
	pub component: ComponentFn,
}

impl fmt::Debug for ExposedComponentRegistryItem {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ExposedComponentRegistryItem")
			.field("plugin_id", &self.plugin_id)
			.field("id", &self.id)
			.field("title", &self.title)
			.finish_non_exhaustive()
	}
}

pub type ExposedComponentsRegistry = Registry<ExposedComponentRegistryItem, ExposedComponentConfig>;

impl ExposedComponentsRegistry {
	pub fn new() -> Self {
		Self::with_mapper("exposed-components", map_exposed_components)
	}
}

impl Default for ExposedComponentsRegistry {
	fn default() -> Self {
		Self::new()
	}
}

pub fn map_exposed_components(
	registry: &mut RegistryState<ExposedComponentRegistryItem>,
	item: PluginExtensionConfigs<ExposedComponentConfig>,
) -> RegisterReport {
	let PluginExtensionConfigs { plugin_id, configs } = item;
	let mut report = RegisterReport::default();

	for config in configs {
		let id = config.id.as_str();
		let checked = if !is_exposed_component_id_valid(&plugin_id, id) {
			Err(ExtensionError::InvalidExposedComponentId)
		} else if registry.contains_key(id) {
			Err(ExtensionError::ExposedComponentAlreadyExists)
		} else {
			required_text(config.title.as_deref())
				.ok_or(ExtensionError::TitleMissing)
				.and_then(|title| {
					required_text(config.description.as_deref())
						.map(|description| (title, description))
						.ok_or(ExtensionError::DescriptionMissing)
				})
		};

		let (title, description) = match checked {
			Ok(fields) => fields,
			Err(reason) => {
				tracing::error!(
					target: crate::REGISTRY_LOG_TARGET,
					plugin_id = %plugin_id,
					component_id = id,
					"{LOG_PREFIX} {}",
					reason.message(),
				);
				report.reject(&plugin_id, Some(id), reason);
				continue;
			}
		};

		registry.insert(
			id,
			ExposedComponentRegistryItem {
				plugin_id: plugin_id.clone(),
				id: id.to_string(),
				title: title.to_string(),
				description: description.to_string(),
				component: Arc::clone(&config.component),
			},
		);
		report.added += 1;

		tracing::debug!(
			target: crate::REGISTRY_LOG_TARGET,
			plugin_id = %plugin_id,
			component_id = id,
			title,
			"Exposed component extension successfully registered",
		);
	}

	report
}
