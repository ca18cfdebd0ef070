//! Plugin metadata and the app plugin table.
//!
//! Metadata is what a plugin declares about itself up front (its manifest):
//! the extension points it renders, the contributions it will register, and
//! the exposed components it depends on. Consumers use it for restriction
//! checks; the host uses the table of app plugins to decide which plugins must
//! finish loading before an extension point can be resolved.

use std::collections::BTreeMap;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// One or many extension point ids targeted by a contribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Targets {
	One(String),
	Many(Vec<String>),
}

impl Targets {
	/// Normalized view: a single target becomes a one-element slice.
	pub fn as_slice(&self) -> &[String] {
		match self {
			Self::One(target) => std::slice::from_ref(target),
			Self::Many(targets) => targets,
		}
	}

	pub fn iter(&self) -> std::slice::Iter<'_, String> {
		self.as_slice().iter()
	}

	pub fn contains(&self, extension_point_id: &str) -> bool {
		self.iter().any(|target| target == extension_point_id)
	}

	pub fn is_empty(&self) -> bool {
		self.as_slice().is_empty()
	}
}

impl Default for Targets {
	fn default() -> Self {
		Self::Many(Vec::new())
	}
}

impl From<&str> for Targets {
	fn from(target: &str) -> Self {
		Self::One(target.to_string())
	}
}

impl From<String> for Targets {
	fn from(target: String) -> Self {
		Self::One(target)
	}
}

impl From<Vec<String>> for Targets {
	fn from(targets: Vec<String>) -> Self {
		Self::Many(targets)
	}
}

impl<const N: usize> From<[&str; N]> for Targets {
	fn from(targets: [&str; N]) -> Self {
		Self::Many(targets.iter().map(|t| (*t).to_string()).collect())
	}
}

/// Declared metadata of a plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginMeta {
	pub id: String,
	/// Loaded eagerly at startup rather than on first use.
	pub preload: bool,
	pub extensions: PluginExtensionsMeta,
	pub dependencies: PluginDependencies,
}

impl PluginMeta {
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			..Self::default()
		}
	}

	/// Whether any declared contribution of this plugin targets the extension point.
	pub fn targets(&self, extension_point_id: &str) -> bool {
		let ext = &self.extensions;
		ext.added_links.iter().any(|l| l.targets.contains(extension_point_id))
			|| ext.added_components.iter().any(|c| c.targets.contains(extension_point_id))
			|| ext.added_file_handlers.iter().any(|f| f.targets.contains(extension_point_id))
	}

	pub fn exposes(&self, component_id: &str) -> bool {
		self.extensions
			.exposed_components
			.iter()
			.any(|c| c.id == component_id)
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginExtensionsMeta {
	pub extension_points: Vec<ExtensionPointMeta>,
	pub added_links: Vec<AddedLinkMeta>,
	pub added_components: Vec<ExtensionMeta>,
	pub added_file_handlers: Vec<ExtensionMeta>,
	pub exposed_components: Vec<ExposedComponentMeta>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionPointMeta {
	pub id: String,
	pub title: Option<String>,
	pub description: Option<String>,
}

impl ExtensionPointMeta {
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			..Self::default()
		}
	}
}

/// Declared component or file handler contribution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionMeta {
	pub title: Option<String>,
	pub description: Option<String>,
	pub targets: Targets,
}

/// Declared link contribution.
///
/// Links with a `path` are fully described by metadata and can be registered
/// without running plugin code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddedLinkMeta {
	pub title: Option<String>,
	pub description: Option<String>,
	pub targets: Targets,
	pub path: Option<String>,
	pub icon: Option<String>,
	pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExposedComponentMeta {
	pub id: String,
	pub title: Option<String>,
	pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginDependencies {
	pub extensions: ExtensionDependencies,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionDependencies {
	/// Ids of exposed components this plugin renders.
	pub exposed_components: Vec<String>,
}

/// Identity of the code calling a hook.
///
/// Host code passes no context at all; plugin code passes its own metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginContext {
	pub meta: Arc<PluginMeta>,
}

impl PluginContext {
	pub fn new(meta: Arc<PluginMeta>) -> Self {
		Self { meta }
	}

	pub fn plugin_id(&self) -> &str {
		&self.meta.id
	}
}

/// All app plugins known to the host, keyed by plugin id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppPluginTable {
	apps: BTreeMap<String, Arc<PluginMeta>>,
}

impl AppPluginTable {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, meta: PluginMeta) {
		self.apps.insert(meta.id.clone(), Arc::new(meta));
	}

	pub fn get(&self, plugin_id: &str) -> Option<&Arc<PluginMeta>> {
		self.apps.get(plugin_id)
	}

	pub fn iter(&self) -> impl Iterator<Item = &Arc<PluginMeta>> {
		self.apps.values()
	}

	pub fn len(&self) -> usize {
		self.apps.len()
	}

	pub fn is_empty(&self) -> bool {
		self.apps.is_empty()
	}

	/// Apps that must be loaded before the extension point can be resolved.
	///
	/// Every app contributing to the point comes first, each followed by the
	/// apps owning the exposed components it depends on (transitively). The
	/// result holds no duplicates and is ordered by app id within each level.
	pub fn extension_point_plugin_dependencies(&self, extension_point_id: &str) -> Vec<String> {
		let mut out = Vec::new();
		let mut seen = FxHashSet::default();
		for app in self.apps.values().filter(|app| app.targets(extension_point_id)) {
			if seen.insert(app.id.clone()) {
				out.push(app.id.clone());
			}
			self.collect_app_dependencies(&app.id, &mut seen, &mut out);
		}
		out
	}

	/// Apps that must be loaded before the exposed component can be rendered.
	pub fn exposed_component_plugin_dependencies(&self, component_id: &str) -> Vec<String> {
		let owner = self.exposed_component_owner(component_id);
		let mut seen = FxHashSet::default();
		let mut out = Vec::new();
		if seen.insert(owner.clone()) {
			out.push(owner.clone());
		}
		self.collect_app_dependencies(&owner, &mut seen, &mut out);
		out
	}

	fn collect_app_dependencies(
		&self,
		app_id: &str,
		seen: &mut FxHashSet<String>,
		out: &mut Vec<String>,
	) {
		let Some(app) = self.apps.get(app_id) else {
			return;
		};
		for component_id in &app.dependencies.extensions.exposed_components {
			let owner = self.exposed_component_owner(component_id);
			// Cycles between apps terminate here.
			if !seen.insert(owner.clone()) {
				continue;
			}
			out.push(owner.clone());
			self.collect_app_dependencies(&owner, seen, out);
		}
	}

	/// The app declaring the component, falling back to the id's namespace.
	fn exposed_component_owner(&self, component_id: &str) -> String {
		self.apps
			.values()
			.find(|app| app.exposes(component_id))
			.map(|app| app.id.clone())
			.unwrap_or_else(|| {
				component_id
					.split_once('/')
					.map_or(component_id, |(owner, _)| owner)
					.to_string()
			})
	}
}

impl FromIterator<PluginMeta> for AppPluginTable {
	fn from_iter<I: IntoIterator<Item = PluginMeta>>(iter: I) -> Self {
		let mut table = Self::new();
		for meta in iter {
			table.insert(meta);
		}
		table
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	fn app(id: &str, targets: &[&str], exposes: &[&str], depends_on: &[&str]) -> PluginMeta {
		let mut meta = PluginMeta::new(id);
		for target in targets {
			meta.extensions.added_links.push(AddedLinkMeta {
				title: Some(format!("{id} link")),
				targets: Targets::from(*target),
				..AddedLinkMeta::default()
			});
		}
		for component in exposes {
			meta.extensions.exposed_components.push(ExposedComponentMeta {
				id: (*component).to_string(),
				..ExposedComponentMeta::default()
			});
		}
		meta.dependencies.extensions.exposed_components =
			depends_on.iter().map(|d| (*d).to_string()).collect();
		meta
	}

	#[test]
	fn targets_deserialize_from_string_or_list() {
		let one: ExtensionMeta = serde_json::from_str(r#"{"targets":"dash/grid"}"#).unwrap();
		let many: ExtensionMeta =
			serde_json::from_str(r#"{"targets":["dash/grid","dash/dragndrop"]}"#).unwrap();
		assert_eq!(one.targets.as_slice(), ["dash/grid".to_string()]);
		assert_eq!(many.targets.as_slice().len(), 2);
		assert!(many.targets.contains("dash/dragndrop"));
	}

	#[test]
	fn dependencies_follow_exposed_components() {
		let table: AppPluginTable = [
			app("a-app", &["grafana/menu"], &[], &["b-app/widget/v1"]),
			app("b-app", &[], &["b-app/widget/v1"], &["c-app/chart/v1"]),
			app("c-app", &[], &["c-app/chart/v1"], &[]),
			app("d-app", &["grafana/other"], &[], &[]),
		]
		.into_iter()
		.collect();

		assert_eq!(
			table.extension_point_plugin_dependencies("grafana/menu"),
			vec!["a-app", "b-app", "c-app"]
		);
		assert_eq!(table.extension_point_plugin_dependencies("grafana/other"), vec!["d-app"]);
		assert!(table.extension_point_plugin_dependencies("grafana/none").is_empty());
	}

	#[test]
	fn circular_dependencies_terminate() {
		let table: AppPluginTable = [
			app("a-app", &["grafana/menu"], &["a-app/x"], &["b-app/y"]),
			app("b-app", &[], &["b-app/y"], &["a-app/x"]),
		]
		.into_iter()
		.collect();

		assert_eq!(
			table.extension_point_plugin_dependencies("grafana/menu"),
			vec!["a-app", "b-app"]
		);
	}

	#[test]
	fn exposed_component_owner_falls_back_to_namespace() {
		let table = AppPluginTable::new();
		assert_eq!(table.exposed_component_plugin_dependencies("z-app/thing"), vec!["z-app"]);
	}
}
