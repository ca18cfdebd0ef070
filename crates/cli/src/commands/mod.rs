//! Subcommand implementations. Each writes its output to the given writer.

pub mod resolve;
pub mod validate;

use outlet_extensions::registry::added_links::AddedLinkConfig;
use outlet_extensions::{
	OutletConfig, PluginExtensionConfigs, PluginExtensionRegistries, RegisterReport,
};

/// Builds the registries a config describes.
///
/// Core links land under the host plugin id; each app's declared path links
/// under the app id. Returns one report per registering plugin, host first.
pub fn load_registries(
	config: &OutletConfig,
) -> (PluginExtensionRegistries, Vec<(String, RegisterReport)>) {
	let host_plugin_id = config.runtime.host_plugin_id.as_str();
	let registries = PluginExtensionRegistries::new(host_plugin_id, Default::default());
	let mut reports = Vec::with_capacity(config.apps.len() + 1);

	let core = config.core_extensions();
	reports.push((
		host_plugin_id.to_string(),
		registries
			.added_links
			.register(PluginExtensionConfigs::new(host_plugin_id, core.added_links)),
	));

	for meta in config.apps.values() {
		let links: Vec<_> = meta
			.extensions
			.added_links
			.iter()
			.map(AddedLinkConfig::from)
			.collect();
		if links.is_empty() {
			continue;
		}
		let report = registries
			.added_links
			.register(PluginExtensionConfigs::new(meta.id.as_str(), links));
		reports.push((meta.id.clone(), report));
	}

	tracing::info!(plugins = reports.len(), "registered configured links");
	(registries, reports)
}
