mod common;

use common::{capture_logs, errors_containing};
use outlet_extensions::errors;
use outlet_extensions::registry::added_links::{AddedLinkConfig, AddedLinksRegistry};
use outlet_extensions::registry::file_handlers::{FileHandlerConfig, PluginFile};
use outlet_extensions::{
	ExtensionError, ExtensionHelpers, ExtensionHost, PluginExtensionRegistries,
	UsePluginExtensionsOptions, generate_extension_id,
};
use outlet_extensions::{CoreExtensions, PluginExtensionConfigs};
use pretty_assertions::assert_eq;

fn noop(_: &PluginFile, _: &ExtensionHelpers) -> anyhow::Result<()> {
	Ok(())
}

#[test]
fn import_csv_handler_resolves_with_stable_id() {
	let registries = PluginExtensionRegistries::new("grafana", CoreExtensions::default());
	registries.added_file_handlers.register(PluginExtensionConfigs::new(
		"acme",
		vec![FileHandlerConfig::new("dash/grid", noop).title("Import CSV")],
	));
	let host = ExtensionHost::new(registries.read_only());
	let options = UsePluginExtensionsOptions::new("dash/grid");

	let first = host.use_plugin_file_handlers(None, &options);
	let second = host.use_plugin_file_handlers(None, &options);

	assert_eq!(first.extensions.len(), 1);
	let handler = &first.extensions[0];
	assert_eq!(handler.plugin_id, "acme");
	assert_eq!(handler.title, "Import CSV");
	assert_eq!(handler.id, generate_extension_id("acme", "dash/grid", "Import CSV"));
	assert_eq!(handler.id, second.extensions[0].id);
}

#[test]
fn untitled_multi_target_handler_logs_title_missing_once() {
	let registries = PluginExtensionRegistries::new("grafana", CoreExtensions::default());

	let (report, events) = capture_logs(|| {
		registries.added_file_handlers.register(PluginExtensionConfigs::new(
			"acme",
			vec![FileHandlerConfig::new(["dash/grid", "dash/dragndrop", "dash/list"], noop)],
		))
	});

	assert_eq!(report.added, 0);
	assert_eq!(report.rejected[0].reason, ExtensionError::TitleMissing);
	assert!(registries.added_file_handlers.snapshot().is_empty());

	let logged = errors_containing(&events, errors::TITLE_MISSING);
	assert_eq!(logged.len(), 1);
	assert_eq!(logged[0].target, "outlet::registry");
	assert!(logged[0].message.starts_with("Could not register file handler extension. Reason:"));
	assert_eq!(logged[0].field("plugin_id"), Some("acme"));
}

#[test]
fn successful_registration_logs_each_target() {
	let registries = PluginExtensionRegistries::new("grafana", CoreExtensions::default());

	let (_, events) = capture_logs(|| {
		registries.added_file_handlers.register(PluginExtensionConfigs::new(
			"acme",
			vec![FileHandlerConfig::new(["dash/grid", "dash/list"], noop).title("Import CSV")],
		))
	});

	let points: Vec<_> = events
		.iter()
		.filter(|e| e.message == "File handler extension successfully registered")
		.filter_map(|e| e.field("extension_point_id"))
		.collect();
	assert_eq!(points, vec!["dash/grid", "dash/list"]);
}

#[test]
fn link_rejections_log_the_catalog_message() {
	let registry = AddedLinksRegistry::new();

	let (report, events) = capture_logs(|| {
		registry.register(PluginExtensionConfigs::new(
			"acme",
			vec![
				AddedLinkConfig::new("grafana/menu")
					.title("Open")
					.description("d")
					.path("/a/other/open"),
			],
		))
	});

	assert_eq!(report.rejected[0].reason, ExtensionError::InvalidPath);
	assert_eq!(errors_containing(&events, errors::INVALID_PATH).len(), 1);
}

#[test]
fn blank_target_is_logged_and_other_targets_land() {
	let registries = PluginExtensionRegistries::new("grafana", CoreExtensions::default());

	let (report, events) = capture_logs(|| {
		registries.added_file_handlers.register(PluginExtensionConfigs::new(
			"acme",
			vec![FileHandlerConfig::new(["dash/grid", ""], noop).title("Import CSV")],
		))
	});

	assert_eq!(report.added, 1);
	assert_eq!(report.rejected.len(), 1);
	assert_eq!(report.rejected[0].reason, ExtensionError::InvalidTarget);
	let snap = registries.added_file_handlers.snapshot();
	assert!(!snap.contains_key(""));
	assert_eq!(snap.get("dash/grid").map(Vec::len), Some(1));

	let logged = errors_containing(&events, errors::INVALID_TARGET);
	assert_eq!(logged.len(), 1);
	assert_eq!(logged[0].field("plugin_id"), Some("acme"));
	assert_eq!(logged[0].field("title"), Some("Import CSV"));
}

#[test]
fn padded_title_keeps_its_own_id() {
	let registries = PluginExtensionRegistries::new("grafana", CoreExtensions::default());
	registries.added_file_handlers.register(PluginExtensionConfigs::new(
		"acme",
		vec![
			FileHandlerConfig::new("dash/grid", noop).title(" Import CSV "),
			FileHandlerConfig::new("dash/grid", noop).title("Import CSV"),
		],
	));
	let host = ExtensionHost::new(registries.read_only());

	let result = host.use_plugin_file_handlers(None, &UsePluginExtensionsOptions::new("dash/grid"));
	let ids: Vec<_> = result.extensions.iter().map(|h| h.id.as_str()).collect();
	assert_eq!(ids.len(), 2);
	assert_ne!(ids[0], ids[1]);
	assert_eq!(ids[0], generate_extension_id("acme", "dash/grid", " Import CSV "));
}
