//! Registry bundle built once at startup.
//!
//! The bundle is an ordinary value handed to whoever needs it; the writable
//! side goes to plugin loading, the read-only side to consumers.

use super::added_components::{
	AddedComponentConfig, AddedComponentRegistryItem, AddedComponentsRegistry,
};
use super::added_links::{AddedLinkConfig, AddedLinkRegistryItem, AddedLinksRegistry};
use super::exposed_components::{
	ExposedComponentConfig, ExposedComponentRegistryItem, ExposedComponentsRegistry,
};
use super::file_handlers::{FileHandlerConfig, FileHandlerRegistry, FileHandlerRegistryItem};
use super::{PluginExtensionConfigs, ReadOnlyRegistry, RegisterReport};

/// Contributions the host itself makes, registered under the host plugin id.
#[derive(Debug, Clone, Default)]
pub struct CoreExtensions {
	pub added_links: Vec<AddedLinkConfig>,
	pub added_components: Vec<AddedComponentConfig>,
	pub added_file_handlers: Vec<FileHandlerConfig>,
	pub exposed_components: Vec<ExposedComponentConfig>,
}

impl CoreExtensions {
	pub fn is_empty(&self) -> bool {
		self.added_links.is_empty()
			&& self.added_components.is_empty()
			&& self.added_file_handlers.is_empty()
			&& self.exposed_components.is_empty()
	}
}

/// Writable registries, one per extension kind.
#[derive(Debug, Clone)]
pub struct PluginExtensionRegistries {
	pub added_links: AddedLinksRegistry,
	pub added_components: AddedComponentsRegistry,
	pub added_file_handlers: FileHandlerRegistry,
	pub exposed_components: ExposedComponentsRegistry,
}

impl PluginExtensionRegistries {
	/// Builds the registries and registers `core` under `host_plugin_id`.
	///
	/// Builtins land before the bundle is returned, so no consumer can observe
	/// a registry without them. Empty sets are not registered.
	pub fn new(host_plugin_id: &str, core: CoreExtensions) -> Self {
		let registries = Self {
			added_links: AddedLinksRegistry::new(),
			added_components: AddedComponentsRegistry::new(),
			added_file_handlers: FileHandlerRegistry::new(),
			exposed_components: ExposedComponentsRegistry::new(),
		};

		let CoreExtensions {
			added_links,
			added_components,
			added_file_handlers,
			exposed_components,
		} = core;

		let mut report = RegisterReport::default();
		if !added_links.is_empty() {
			report.merge(
				registries
					.added_links
					.register(PluginExtensionConfigs::new(host_plugin_id, added_links)),
			);
		}
		if !added_components.is_empty() {
			report.merge(
				registries
					.added_components
					.register(PluginExtensionConfigs::new(host_plugin_id, added_components)),
			);
		}
		if !added_file_handlers.is_empty() {
			report.merge(
				registries
					.added_file_handlers
					.register(PluginExtensionConfigs::new(host_plugin_id, added_file_handlers)),
			);
		}
		if !exposed_components.is_empty() {
			report.merge(
				registries
					.exposed_components
					.register(PluginExtensionConfigs::new(host_plugin_id, exposed_components)),
			);
		}

		tracing::info!(
			target: crate::REGISTRY_LOG_TARGET,
			host_plugin_id,
			added = report.added,
			rejected = report.rejected.len(),
			"core extensions registered",
		);
		registries
	}

	pub fn read_only(&self) -> ReadOnlyPluginExtensionRegistries {
		ReadOnlyPluginExtensionRegistries {
			added_links: self.added_links.read_only(),
			added_components: self.added_components.read_only(),
			added_file_handlers: self.added_file_handlers.read_only(),
			exposed_components: self.exposed_components.read_only(),
		}
	}
}

impl Default for PluginExtensionRegistries {
	fn default() -> Self {
		Self::new(crate::config::DEFAULT_HOST_PLUGIN_ID, CoreExtensions::default())
	}
}

/// Consumer-side bundle; shares snapshots with [`PluginExtensionRegistries`].
#[derive(Debug, Clone)]
pub struct ReadOnlyPluginExtensionRegistries {
	pub added_links: ReadOnlyRegistry<Vec<AddedLinkRegistryItem>>,
	pub added_components: ReadOnlyRegistry<Vec<AddedComponentRegistryItem>>,
	pub added_file_handlers: ReadOnlyRegistry<Vec<FileHandlerRegistryItem>>,
	pub exposed_components: ReadOnlyRegistry<ExposedComponentRegistryItem>,
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	fn core_link() -> AddedLinkConfig {
		AddedLinkConfig::new("grafana/dashboard/panel/menu")
			.title("Explore")
			.description("Open in Explore")
			.path("/a/grafana/explore")
	}

	#[test]
	fn core_extensions_are_visible_to_first_reader() {
		let registries = PluginExtensionRegistries::new(
			"grafana",
			CoreExtensions {
				added_links: vec![core_link()],
				..CoreExtensions::default()
			},
		);
		let read_only = registries.read_only();

		let snap = read_only.added_links.snapshot();
		let items = snap.get("grafana/dashboard/panel/menu").unwrap();
		assert_eq!(items.len(), 1);
		assert_eq!(items[0].plugin_id, "grafana");
		assert_eq!(read_only.added_links.version(), 1);
	}

	#[test]
	fn empty_core_sets_are_not_registered() {
		let registries = PluginExtensionRegistries::default();
		assert_eq!(registries.added_links.version(), 0);
		assert_eq!(registries.added_components.version(), 0);
		assert_eq!(registries.added_file_handlers.version(), 0);
		assert_eq!(registries.exposed_components.version(), 0);
	}

	#[test]
	fn read_only_bundle_shares_the_writable_stores() {
		let registries = PluginExtensionRegistries::default();
		let read_only = registries.read_only();

		registries
			.added_links
			.register(PluginExtensionConfigs::new("grafana", vec![core_link()]));

		assert_eq!(read_only.added_links.snapshot().len(), 1);
		assert!(read_only.added_links.same_registry(&registries.added_links.read_only()));
	}
}
