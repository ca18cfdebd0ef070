use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use outlet_extensions::{
	ExtensionHost, OutletConfig, PluginContext, PluginExtensionLink, PluginMeta,
	UsePluginExtensionsOptions,
};
use serde::Serialize;

use super::load_registries;

#[derive(Debug, Clone, Default)]
pub struct Request {
	pub extension_point: String,
	pub as_plugin: Option<String>,
	pub context: Option<String>,
	pub limit_per_plugin: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Output<'a> {
	extension_point_id: &'a str,
	caller: Option<&'a str>,
	is_loading: bool,
	links: &'a [PluginExtensionLink],
}

/// Prints the links resolved for the request as pretty JSON.
pub fn run(config: &OutletConfig, request: &Request, out: &mut impl Write) -> anyhow::Result<()> {
	let (registries, _) = load_registries(config);
	let host = ExtensionHost::new(registries.read_only())
		.with_apps(Arc::new(config.app_table()))
		.with_settings(config.runtime.clone());

	let mut options = UsePluginExtensionsOptions::new(request.extension_point.as_str());
	if let Some(raw) = &request.context {
		let context = serde_json::from_str(raw).context("--context is not valid JSON")?;
		options = options.context(context);
	}
	options.limit_per_plugin = request.limit_per_plugin;

	let caller = request.as_plugin.as_deref().map(|plugin_id| {
		let meta = config
			.apps
			.get(plugin_id)
			.cloned()
			.unwrap_or_else(|| PluginMeta::new(plugin_id));
		PluginContext::new(Arc::new(meta))
	});

	let result = host.use_plugin_links(caller.as_ref(), &options);
	tracing::debug!(
		extension_point_id = %request.extension_point,
		links = result.extensions.len(),
		is_loading = result.is_loading,
		"resolved extension point",
	);

	let output = Output {
		extension_point_id: &request.extension_point,
		caller: request.as_plugin.as_deref(),
		is_loading: result.is_loading,
		links: &result.extensions,
	};
	serde_json::to_writer_pretty(&mut *out, &output)?;
	writeln!(out)?;
	Ok(())
}
