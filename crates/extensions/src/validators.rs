//! Identity and naming policy checks.
//!
//! All checks are pure predicates; callers decide whether a failure is logged,
//! reported or ignored (host call sites skip most of them).

use std::sync::LazyLock;

use regex::Regex;

use crate::meta::PluginContext;

/// A single path segment of an extension point id.
static SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.\-]*$").expect("segment pattern is valid")
});

/// Checks the `namespace/component-path` convention of an extension point id.
///
/// The namespace must be the host id, the calling plugin's id, or the legacy
/// `plugins/<plugin-id>` prefix. The remaining path needs at least one
/// segment and no empty segments.
pub fn is_extension_point_id_valid(
	extension_point_id: &str,
	plugin_id: &str,
	host_plugin_id: &str,
) -> bool {
	let Some((namespace, path)) = extension_point_id.split_once('/') else {
		return false;
	};

	let path = if namespace == host_plugin_id || (!plugin_id.is_empty() && namespace == plugin_id)
	{
		path
	} else if namespace == "plugins" {
		match path.split_once('/') {
			Some((owner, rest)) if !plugin_id.is_empty() && owner == plugin_id => rest,
			_ => return false,
		}
	} else {
		return false;
	};

	!path.is_empty() && path.split('/').all(|segment| SEGMENT.is_match(segment))
}

/// Returns true when the caller's metadata does not declare the extension point.
pub fn is_extension_point_meta_info_missing(extension_point_id: &str, caller: &PluginContext) -> bool {
	!caller
		.meta
		.extensions
		.extension_points
		.iter()
		.any(|point| point.id == extension_point_id)
}

/// Returns true when the caller's metadata does not list the exposed component
/// as a dependency.
pub fn is_exposed_component_dependency_missing(component_id: &str, caller: &PluginContext) -> bool {
	!caller
		.meta
		.dependencies
		.extensions
		.exposed_components
		.iter()
		.any(|id| id == component_id)
}

/// Link paths must stay inside the contributing plugin's app: `/a/<plugin-id>/...`.
pub fn is_link_path_valid(plugin_id: &str, path: &str) -> bool {
	!plugin_id.is_empty()
		&& path
			.strip_prefix("/a/")
			.and_then(|rest| rest.strip_prefix(plugin_id))
			.is_some_and(|rest| rest.starts_with('/'))
}

/// Exposed component ids are namespaced by the owning plugin: `<plugin-id>/<name>`.
pub fn is_exposed_component_id_valid(plugin_id: &str, component_id: &str) -> bool {
	!plugin_id.is_empty()
		&& component_id
			.strip_prefix(plugin_id)
			.and_then(|rest| rest.strip_prefix('/'))
			.is_some_and(|rest| !rest.is_empty())
}

/// Targets must name an extension point; blank ids are malformed.
pub fn is_target_valid(extension_point_id: &str) -> bool {
	!extension_point_id.trim().is_empty()
}

/// Returns the text as written when it is present and not blank.
pub(crate) fn required_text(value: Option<&str>) -> Option<&str> {
	value.filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests;
