use std::sync::Arc;

use rstest::rstest;

use super::*;
use crate::meta::{ExtensionPointMeta, PluginMeta};

#[rstest]
#[case("grafana/dashboard/panel/menu", "acme", true)]
#[case("acme/main", "acme", true)]
#[case("acme/main/v1", "acme", true)]
#[case("plugins/acme/main", "acme", true)]
#[case("", "acme", false)]
#[case("acme", "acme", false)]
#[case("acme/", "acme", false)]
#[case("acme//main", "acme", false)]
#[case("other/main", "acme", false)]
#[case("plugins/other/main", "acme", false)]
#[case("acme/has space", "acme", false)]
#[case("dash/grid", "acme", false)]
fn extension_point_id_convention(#[case] id: &str, #[case] plugin: &str, #[case] valid: bool) {
	assert_eq!(is_extension_point_id_valid(id, plugin, "grafana"), valid, "{id}");
}

#[test]
fn empty_plugin_id_only_allows_host_namespace() {
	assert!(is_extension_point_id_valid("grafana/explore", "", "grafana"));
	assert!(!is_extension_point_id_valid("/explore", "", "grafana"));
}

#[test]
fn host_namespace_follows_configuration() {
	assert!(is_extension_point_id_valid("core/menu", "acme", "core"));
	assert!(!is_extension_point_id_valid("grafana/menu", "acme", "core"));
}

#[rstest]
#[case("acme", "/a/acme/import", true)]
#[case("acme", "/a/acme/", true)]
#[case("acme", "/a/acme", false)]
#[case("acme", "/a/acme-other/x", false)]
#[case("acme", "/explore", false)]
#[case("", "/a//x", false)]
fn link_paths(#[case] plugin: &str, #[case] path: &str, #[case] valid: bool) {
	assert_eq!(is_link_path_valid(plugin, path), valid, "{path}");
}

#[rstest]
#[case("acme", "acme/preview/v1", true)]
#[case("acme", "acme/", false)]
#[case("acme", "acmepreview", false)]
#[case("acme", "other/preview", false)]
fn exposed_component_ids(#[case] plugin: &str, #[case] id: &str, #[case] valid: bool) {
	assert_eq!(is_exposed_component_id_valid(plugin, id), valid, "{id}");
}

#[test]
fn meta_info_lookup() {
	let mut meta = PluginMeta::new("acme");
	meta.extensions.extension_points.push(ExtensionPointMeta::new("acme/main"));
	let caller = PluginContext::new(Arc::new(meta));

	assert!(!is_extension_point_meta_info_missing("acme/main", &caller));
	assert!(is_extension_point_meta_info_missing("acme/other", &caller));
}

#[test]
fn exposed_dependency_lookup() {
	let mut meta = PluginMeta::new("acme");
	meta.dependencies
		.extensions
		.exposed_components
		.push("other/preview/v1".to_string());
	let caller = PluginContext::new(Arc::new(meta));

	assert!(!is_exposed_component_dependency_missing("other/preview/v1", &caller));
	assert!(is_exposed_component_dependency_missing("other/preview/v2", &caller));
}

#[test]
fn required_text_rejects_blank_values_and_keeps_the_rest() {
	assert_eq!(required_text(Some(" Import CSV ")), Some(" Import CSV "));
	assert_eq!(required_text(Some("   ")), None);
	assert_eq!(required_text(None), None);
}

#[rstest]
#[case("dash/grid", true)]
#[case("grafana/dashboard/panel/menu", true)]
#[case("", false)]
#[case("   ", false)]
fn targets_must_name_an_extension_point(#[case] target: &str, #[case] expected: bool) {
	assert_eq!(is_target_valid(target), expected);
}
