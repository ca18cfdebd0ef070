//! Consumer-facing extension values produced by the hooks.
//!
//! Each value carries the frozen context it was resolved with. Invoking a
//! callback passes that context (through [`ExtensionHelpers`]) and returns the
//! callback's own result untouched.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::context::ReadOnlyContext;
use crate::helpers::ExtensionHelpers;
use crate::registry::added_components::ComponentFn;
use crate::registry::added_links::OnClickFn;
use crate::registry::file_handlers::{OnFileFn, PluginFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PluginExtensionType {
	Link,
	Component,
	FileHandler,
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginExtensionFileHandler {
	pub id: String,
	#[serde(rename = "type")]
	pub extension_type: PluginExtensionType,
	pub plugin_id: String,
	pub extension_point_id: String,
	pub title: String,
	pub description: Option<String>,
	#[serde(skip)]
	pub(crate) on_file: OnFileFn,
	#[serde(skip)]
	pub(crate) helpers: ExtensionHelpers,
}

impl PluginExtensionFileHandler {
	/// Hands `file` to the plugin's handler.
	pub fn handle(&self, file: &PluginFile) -> anyhow::Result<()> {
		(self.on_file)(file, &self.helpers)
	}

	pub fn context(&self) -> &ReadOnlyContext {
		self.helpers.context()
	}
}

impl fmt::Debug for PluginExtensionFileHandler {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PluginExtensionFileHandler")
			.field("id", &self.id)
			.field("plugin_id", &self.plugin_id)
			.field("extension_point_id", &self.extension_point_id)
			.field("title", &self.title)
			.finish_non_exhaustive()
	}
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginExtensionLink {
	pub id: String,
	#[serde(rename = "type")]
	pub extension_type: PluginExtensionType,
	pub plugin_id: String,
	pub extension_point_id: String,
	pub title: String,
	pub description: String,
	pub path: Option<String>,
	pub icon: Option<String>,
	pub category: Option<String>,
	#[serde(skip)]
	pub(crate) on_click: Option<OnClickFn>,
	#[serde(skip)]
	pub(crate) helpers: ExtensionHelpers,
}

impl PluginExtensionLink {
	pub fn has_on_click(&self) -> bool {
		self.on_click.is_some()
	}

	/// Runs the link's click handler. Path-only links have nothing to run.
	pub fn click(&self) -> anyhow::Result<()> {
		match &self.on_click {
			Some(on_click) => on_click(&self.helpers),
			None => Ok(()),
		}
	}

	pub fn context(&self) -> &ReadOnlyContext {
		self.helpers.context()
	}
}

impl fmt::Debug for PluginExtensionLink {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PluginExtensionLink")
			.field("id", &self.id)
			.field("plugin_id", &self.plugin_id)
			.field("extension_point_id", &self.extension_point_id)
			.field("title", &self.title)
			.field("path", &self.path)
			.finish_non_exhaustive()
	}
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginExtensionComponent {
	pub id: String,
	#[serde(rename = "type")]
	pub extension_type: PluginExtensionType,
	pub plugin_id: String,
	pub extension_point_id: String,
	pub title: String,
	pub description: String,
	#[serde(skip)]
	pub(crate) component: ComponentFn,
	#[serde(skip)]
	pub(crate) context: ReadOnlyContext,
}

impl PluginExtensionComponent {
	/// Renders the component with the context it was resolved with.
	pub fn render(&self) -> anyhow::Result<Value> {
		(self.component)(&self.context)
	}

	pub fn context(&self) -> &ReadOnlyContext {
		&self.context
	}
}

impl fmt::Debug for PluginExtensionComponent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PluginExtensionComponent")
			.field("id", &self.id)
			.field("plugin_id", &self.plugin_id)
			.field("extension_point_id", &self.extension_point_id)
			.field("title", &self.title)
			.finish_non_exhaustive()
	}
}

/// A component another plugin exposed under a well-known id.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginExtensionExposedComponent {
	pub id: String,
	pub plugin_id: String,
	pub title: String,
	pub description: String,
	#[serde(skip)]
	pub(crate) component: ComponentFn,
}

impl PluginExtensionExposedComponent {
	/// Renders with caller-supplied props.
	pub fn render(&self, props: &ReadOnlyContext) -> anyhow::Result<Value> {
		(self.component)(props)
	}
}

impl fmt::Debug for PluginExtensionExposedComponent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PluginExtensionExposedComponent")
			.field("id", &self.id)
			.field("plugin_id", &self.plugin_id)
			.field("title", &self.title)
			.finish_non_exhaustive()
	}
}

/// Entry of the combined hook.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PluginExtension {
	Link(PluginExtensionLink),
	Component(PluginExtensionComponent),
}

impl PluginExtension {
	pub fn id(&self) -> &str {
		match self {
			Self::Link(link) => &link.id,
			Self::Component(component) => &component.id,
		}
	}

	pub fn plugin_id(&self) -> &str {
		match self {
			Self::Link(link) => &link.plugin_id,
			Self::Component(component) => &component.plugin_id,
		}
	}

	pub fn extension_type(&self) -> PluginExtensionType {
		match self {
			Self::Link(_) => PluginExtensionType::Link,
			Self::Component(_) => PluginExtensionType::Component,
		}
	}
}
