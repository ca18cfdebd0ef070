use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;

fn link(title: &str) -> AddedLinkConfig {
	AddedLinkConfig::new("dash/panel-menu")
		.title(title)
		.description("Opens the app")
		.path("/a/acme/explore")
}

fn register_one(config: AddedLinkConfig) -> RegisterReport {
	AddedLinksRegistry::new().register(PluginExtensionConfigs::new("acme", vec![config]))
}

#[test]
fn valid_link_is_stored_per_target() {
	let registry = AddedLinksRegistry::new();
	let config = AddedLinkConfig::new(["dash/panel-menu", "explore/toolbar"])
		.title("Open in Acme")
		.description("Opens the app")
		.path("/a/acme/explore")
		.icon("external-link-alt");
	let report = registry.register(PluginExtensionConfigs::new("acme", vec![config]));

	assert!(report.is_clean());
	assert_eq!(report.added, 2);
	let snap = registry.snapshot();
	let item = &snap.get("explore/toolbar").unwrap()[0];
	assert_eq!(item.plugin_id, "acme");
	assert_eq!(item.title, "Open in Acme");
	assert_eq!(item.path.as_deref(), Some("/a/acme/explore"));
	assert_eq!(item.icon.as_deref(), Some("external-link-alt"));
}

#[test]
fn on_click_without_path_is_accepted() {
	let config = AddedLinkConfig::new("dash/panel-menu")
		.title("Share")
		.description("Shares the panel")
		.on_click(|_| Ok(()));
	let report = register_one(config);
	assert_eq!(report.added, 1);
}

#[rstest]
#[case::no_title(AddedLinkConfig::new("dash/panel-menu").description("d").path("/a/acme/x"), ExtensionError::TitleMissing)]
#[case::no_description(AddedLinkConfig::new("dash/panel-menu").title("t").path("/a/acme/x"), ExtensionError::DescriptionMissing)]
#[case::no_path_or_on_click(AddedLinkConfig::new("dash/panel-menu").title("t").description("d"), ExtensionError::InvalidPathOrOnClick)]
#[case::foreign_path(AddedLinkConfig::new("dash/panel-menu").title("t").description("d").path("/a/other/x"), ExtensionError::InvalidPath)]
#[case::non_app_path(AddedLinkConfig::new("dash/panel-menu").title("t").description("d").path("/explore"), ExtensionError::InvalidPath)]
fn rejects_invalid_links(#[case] config: AddedLinkConfig, #[case] reason: ExtensionError) {
	let report = register_one(config);
	assert_eq!(report.added, 0);
	assert_eq!(report.rejected.len(), 1);
	assert_eq!(report.rejected[0].reason, reason);
}

#[test]
fn title_is_checked_before_path() {
	let config = AddedLinkConfig::new("dash/panel-menu").path("/elsewhere");
	let report = register_one(config);
	assert_eq!(report.rejected[0].reason, ExtensionError::TitleMissing);
}

#[test]
fn rejected_link_does_not_block_the_batch() {
	let registry = AddedLinksRegistry::new();
	let report = registry.register(PluginExtensionConfigs::new(
		"acme",
		vec![link("First"), AddedLinkConfig::new("dash/panel-menu"), link("Second")],
	));

	assert_eq!(report.added, 2);
	assert_eq!(report.rejected.len(), 1);
	let snap = registry.snapshot();
	let titles: Vec<_> = snap
		.get("dash/panel-menu")
		.unwrap()
		.iter()
		.map(|i| i.title.as_str())
		.collect();
	assert_eq!(titles, vec!["First", "Second"]);
}

#[test]
fn config_from_meta_keeps_declared_fields() {
	let meta = AddedLinkMeta {
		title: Some("Open".into()),
		description: Some("Opens".into()),
		targets: "dash/panel-menu".into(),
		path: Some("/a/acme/open".into()),
		icon: None,
		category: Some("Apps".into()),
	};
	let config = AddedLinkConfig::from(&meta);
	assert_eq!(config.title.as_deref(), Some("Open"));
	assert_eq!(config.category.as_deref(), Some("Apps"));
	assert!(config.on_click.is_none());
	assert_eq!(register_one(config).added, 1);
}
