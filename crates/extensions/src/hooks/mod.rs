//! Read path: resolving an extension point against the latest snapshots.
//!
//! # Restriction policy
//!
//! Host code (no [`PluginContext`]) always gets the full list. Plugin code is
//! checked only in dev mode: the extension point id must follow the naming
//! convention and be declared in the plugin's metadata. A failed check yields
//! an empty result and an error log, never a panic.
//!
//! # Loading
//!
//! Apps contributing to an extension point (and apps owning exposed
//! components those depend on) may still be loading. While any is, hooks
//! return `is_loading: true` with no extensions.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::Value;

use crate::config::RuntimeSettings;
use crate::context::ReadOnlyContext;
use crate::errors;
use crate::helpers::{ExtensionHelpers, ModalHost, NoopModalHost};
use crate::ids::generate_extension_id;
use crate::loader::{AlwaysLoaded, AppPluginLoader};
use crate::meta::{AppPluginTable, PluginContext};
use crate::registry::added_links::{AddedLinkRegistryItem, LinkOverrides};
use crate::registry::setup::ReadOnlyPluginExtensionRegistries;
use crate::validators::{
	is_exposed_component_dependency_missing, is_extension_point_id_valid,
	is_extension_point_meta_info_missing, is_link_path_valid,
};

mod extensions;
mod memo;

pub use extensions::{
	PluginExtension, PluginExtensionComponent, PluginExtensionExposedComponent,
	PluginExtensionFileHandler, PluginExtensionLink, PluginExtensionType,
};
pub use memo::{
	ComponentsHook, ExtensionKind, ExtensionsHook, FileHandlersHook, LinksHook, UsePluginHook,
};


/// Inputs of a list hook.
#[derive(Debug, Clone, Default)]
pub struct UsePluginExtensionsOptions {
	pub extension_point_id: String,
	/// Host data handed to extensions, frozen for them.
	pub context: Option<Arc<Value>>,
	/// Keeps at most this many extensions per contributing plugin.
	pub limit_per_plugin: Option<usize>,
}

impl UsePluginExtensionsOptions {
	pub fn new(extension_point_id: impl Into<String>) -> Self {
		Self {
			extension_point_id: extension_point_id.into(),
			..Self::default()
		}
	}

	pub fn context(mut self, context: Value) -> Self {
		self.context = Some(Arc::new(context));
		self
	}

	pub fn shared_context(mut self, context: Arc<Value>) -> Self {
		self.context = Some(context);
		self
	}

	pub fn limit_per_plugin(mut self, limit: usize) -> Self {
		self.limit_per_plugin = Some(limit);
		self
	}

	/// Same inputs; contexts compare by identity.
	pub(crate) fn same_inputs(&self, other: &Self) -> bool {
		self.extension_point_id == other.extension_point_id
			&& self.limit_per_plugin == other.limit_per_plugin
			&& match (&self.context, &other.context) {
				(Some(a), Some(b)) => Arc::ptr_eq(a, b),
				(None, None) => true,
				_ => false,
			}
	}
}

/// Result of a list hook.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsePluginResult<E> {
	pub is_loading: bool,
	pub extensions: Vec<E>,
}

impl<E> UsePluginResult<E> {
	fn empty() -> Self {
		Self {
			is_loading: false,
			extensions: Vec::new(),
		}
	}

	fn loading() -> Self {
		Self {
			is_loading: true,
			extensions: Vec::new(),
		}
	}
}

impl<E> Default for UsePluginResult<E> {
	fn default() -> Self {
		Self::empty()
	}
}

pub type UsePluginFileHandlersResult = UsePluginResult<PluginExtensionFileHandler>;
pub type UsePluginLinksResult = UsePluginResult<PluginExtensionLink>;
pub type UsePluginComponentsResult = UsePluginResult<PluginExtensionComponent>;
pub type UsePluginExtensionsResult = UsePluginResult<PluginExtension>;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsePluginComponentResult {
	pub is_loading: bool,
	pub component: Option<PluginExtensionExposedComponent>,
}

enum Gate {
	Open,
	Denied,
	Loading,
}

/// Everything a hook reads: registries, app metadata, loader, settings.
#[derive(Clone)]
pub struct ExtensionHost {
	registries: ReadOnlyPluginExtensionRegistries,
	apps: Arc<AppPluginTable>,
	loader: Arc<dyn AppPluginLoader>,
	modal_host: Arc<dyn ModalHost>,
	settings: RuntimeSettings,
}

impl ExtensionHost {
	pub fn new(registries: ReadOnlyPluginExtensionRegistries) -> Self {
		Self {
			registries,
			apps: Arc::new(AppPluginTable::new()),
			loader: Arc::new(AlwaysLoaded),
			modal_host: Arc::new(NoopModalHost),
			settings: RuntimeSettings::default(),
		}
	}

	pub fn with_apps(mut self, apps: Arc<AppPluginTable>) -> Self {
		self.apps = apps;
		self
	}

	pub fn with_loader(mut self, loader: Arc<dyn AppPluginLoader>) -> Self {
		self.loader = loader;
		self
	}

	pub fn with_modal_host(mut self, modal_host: Arc<dyn ModalHost>) -> Self {
		self.modal_host = modal_host;
		self
	}

	pub fn with_settings(mut self, settings: RuntimeSettings) -> Self {
		self.settings = settings;
		self
	}

	pub fn registries(&self) -> &ReadOnlyPluginExtensionRegistries {
		&self.registries
	}

	pub fn apps(&self) -> &AppPluginTable {
		&self.apps
	}

	pub fn loader(&self) -> &Arc<dyn AppPluginLoader> {
		&self.loader
	}

	pub fn settings(&self) -> &RuntimeSettings {
		&self.settings
	}

	/// Whether apps the extension point depends on are still loading.
	pub fn is_loading(&self, extension_point_id: &str) -> bool {
		self.apps_loading(self.apps.extension_point_plugin_dependencies(extension_point_id))
	}

	/// Requests the configured apps among `dependencies`.
	///
	/// Ids outside the app table, such as the host namespace, have nothing to
	/// load and never hold consumers in the loading state.
	fn apps_loading(&self, mut dependencies: Vec<String>) -> bool {
		dependencies.retain(|id| self.apps.get(id).is_some());
		!dependencies.is_empty() && self.loader.load_app_plugins(&dependencies).is_loading
	}

	/// The caller, when its call site is subject to the restriction checks.
	fn is_restricted<'c>(&self, caller: Option<&'c PluginContext>) -> Option<&'c PluginContext> {
		caller.filter(|_| self.settings.dev_mode)
	}

	fn gate(&self, caller: Option<&PluginContext>, extension_point_id: &str) -> Gate {
		if let Some(caller) = self.is_restricted(caller) {
			let plugin_id = caller.plugin_id();
			let host_plugin_id = self.settings.host_plugin_id.as_str();
			if !is_extension_point_id_valid(extension_point_id, plugin_id, host_plugin_id) {
				tracing::error!(
					target: crate::HOOKS_LOG_TARGET,
					plugin_id,
					extension_point_id,
					"{}",
					errors::INVALID_EXTENSION_POINT_ID,
				);
				return Gate::Denied;
			}
			if is_extension_point_meta_info_missing(extension_point_id, caller) {
				tracing::error!(
					target: crate::HOOKS_LOG_TARGET,
					plugin_id,
					extension_point_id,
					"{}",
					errors::EXTENSION_POINT_META_INFO_MISSING,
				);
				return Gate::Denied;
			}
		}

		if self.is_loading(extension_point_id) {
			tracing::debug!(
				target: crate::HOOKS_LOG_TARGET,
				extension_point_id,
				"extension point waits for app plugins",
			);
			return Gate::Loading;
		}
		Gate::Open
	}

	fn frozen_context(options: &UsePluginExtensionsOptions) -> ReadOnlyContext {
		options
			.context
			.as_ref()
			.map_or_else(ReadOnlyContext::empty, |value| {
				ReadOnlyContext::from_shared(Arc::clone(value))
			})
	}

	fn helpers(&self, plugin_id: &str, context: &ReadOnlyContext) -> ExtensionHelpers {
		ExtensionHelpers::new(plugin_id, context.clone(), Arc::clone(&self.modal_host))
	}

	/// File handlers registered at the extension point.
	pub fn use_plugin_file_handlers(
		&self,
		caller: Option<&PluginContext>,
		options: &UsePluginExtensionsOptions,
	) -> Arc<UsePluginFileHandlersResult> {
		let id = options.extension_point_id.as_str();
		let _span = tracing::debug_span!(
			target: crate::HOOKS_LOG_TARGET,
			"use_plugin_file_handlers",
			extension_point_id = id,
			plugin_id = caller.map(PluginContext::plugin_id),
		)
		.entered();

		match self.gate(caller, id) {
			Gate::Denied => return Arc::new(UsePluginResult::empty()),
			Gate::Loading => return Arc::new(UsePluginResult::loading()),
			Gate::Open => {}
		}

		let snapshot = self.registries.added_file_handlers.snapshot();
		let context = Self::frozen_context(options);
		let mut limit = PerPluginLimit::new(options.limit_per_plugin);

		let extensions = snapshot
			.get(id)
			.into_iter()
			.flatten()
			.filter(|item| limit.admit(&item.plugin_id))
			.map(|item| PluginExtensionFileHandler {
				id: generate_extension_id(&item.plugin_id, id, &item.title),
				extension_type: PluginExtensionType::FileHandler,
				plugin_id: item.plugin_id.clone(),
				extension_point_id: id.to_string(),
				title: item.title.clone(),
				description: item.description.clone(),
				on_file: Arc::clone(&item.on_file),
				helpers: self.helpers(&item.plugin_id, &context),
			})
			.collect();

		Arc::new(UsePluginResult {
			is_loading: false,
			extensions,
		})
	}

	/// Links registered at the extension point, after each link's `configure`.
	pub fn use_plugin_links(
		&self,
		caller: Option<&PluginContext>,
		options: &UsePluginExtensionsOptions,
	) -> Arc<UsePluginLinksResult> {
		let id = options.extension_point_id.as_str();
		let _span = tracing::debug_span!(
			target: crate::HOOKS_LOG_TARGET,
			"use_plugin_links",
			extension_point_id = id,
			plugin_id = caller.map(PluginContext::plugin_id),
		)
		.entered();

		match self.gate(caller, id) {
			Gate::Denied => return Arc::new(UsePluginResult::empty()),
			Gate::Loading => return Arc::new(UsePluginResult::loading()),
			Gate::Open => {}
		}

		Arc::new(UsePluginResult {
			is_loading: false,
			extensions: self.resolve_links(id, options),
		})
	}

	fn resolve_links(
		&self,
		id: &str,
		options: &UsePluginExtensionsOptions,
	) -> Vec<PluginExtensionLink> {
		let snapshot = self.registries.added_links.snapshot();
		let context = Self::frozen_context(options);
		let mut limit = PerPluginLimit::new(options.limit_per_plugin);
		let mut links = Vec::new();

		for item in snapshot.get(id).into_iter().flatten() {
			if limit.is_full(&item.plugin_id) {
				continue;
			}
			let Some(overrides) = configure_link(item, &context) else {
				continue;
			};
			limit.admit(&item.plugin_id);

			links.push(PluginExtensionLink {
				id: generate_extension_id(&item.plugin_id, id, &item.title),
				extension_type: PluginExtensionType::Link,
				plugin_id: item.plugin_id.clone(),
				extension_point_id: id.to_string(),
				title: overrides.title.unwrap_or_else(|| item.title.clone()),
				description: overrides.description.unwrap_or_else(|| item.description.clone()),
				path: overrides.path.or_else(|| item.path.clone()),
				icon: overrides.icon.or_else(|| item.icon.clone()),
				category: overrides.category.or_else(|| item.category.clone()),
				on_click: item.on_click.clone(),
				helpers: self.helpers(&item.plugin_id, &context),
			});
		}
		links
	}

	/// Components registered at the extension point.
	pub fn use_plugin_components(
		&self,
		caller: Option<&PluginContext>,
		options: &UsePluginExtensionsOptions,
	) -> Arc<UsePluginComponentsResult> {
		let id = options.extension_point_id.as_str();
		let _span = tracing::debug_span!(
			target: crate::HOOKS_LOG_TARGET,
			"use_plugin_components",
			extension_point_id = id,
			plugin_id = caller.map(PluginContext::plugin_id),
		)
		.entered();

		match self.gate(caller, id) {
			Gate::Denied => return Arc::new(UsePluginResult::empty()),
			Gate::Loading => return Arc::new(UsePluginResult::loading()),
			Gate::Open => {}
		}

		Arc::new(UsePluginResult {
			is_loading: false,
			extensions: self.resolve_components(id, options),
		})
	}

	fn resolve_components(
		&self,
		id: &str,
		options: &UsePluginExtensionsOptions,
	) -> Vec<PluginExtensionComponent> {
		let snapshot = self.registries.added_components.snapshot();
		let context = Self::frozen_context(options);
		let mut limit = PerPluginLimit::new(options.limit_per_plugin);

		snapshot
			.get(id)
			.into_iter()
			.flatten()
			.filter(|item| limit.admit(&item.plugin_id))
			.map(|item| PluginExtensionComponent {
				id: generate_extension_id(&item.plugin_id, id, &item.title),
				extension_type: PluginExtensionType::Component,
				plugin_id: item.plugin_id.clone(),
				extension_point_id: id.to_string(),
				title: item.title.clone(),
				description: item.description.clone(),
				component: Arc::clone(&item.component),
				context: context.clone(),
			})
			.collect()
	}

	/// Links then components of the extension point.
	///
	/// `limit_per_plugin` applies to each kind separately.
	pub fn use_plugin_extensions(
		&self,
		caller: Option<&PluginContext>,
		options: &UsePluginExtensionsOptions,
	) -> Arc<UsePluginExtensionsResult> {
		let id = options.extension_point_id.as_str();
		let _span = tracing::debug_span!(
			target: crate::HOOKS_LOG_TARGET,
			"use_plugin_extensions",
			extension_point_id = id,
			plugin_id = caller.map(PluginContext::plugin_id),
		)
		.entered();

		match self.gate(caller, id) {
			Gate::Denied => return Arc::new(UsePluginResult::empty()),
			Gate::Loading => return Arc::new(UsePluginResult::loading()),
			Gate::Open => {}
		}

		let links = self.resolve_links(id, options).into_iter().map(PluginExtension::Link);
		let components = self
			.resolve_components(id, options)
			.into_iter()
			.map(PluginExtension::Component);

		Arc::new(UsePluginResult {
			is_loading: false,
			extensions: links.chain(components).collect(),
		})
	}

	/// One exposed component by id, or none.
	pub fn use_plugin_component(
		&self,
		caller: Option<&PluginContext>,
		component_id: &str,
	) -> UsePluginComponentResult {
		let _span = tracing::debug_span!(
			target: crate::HOOKS_LOG_TARGET,
			"use_plugin_component",
			component_id,
			plugin_id = caller.map(PluginContext::plugin_id),
		)
		.entered();

		if let Some(caller) = self.is_restricted(caller)
			&& is_exposed_component_dependency_missing(component_id, caller)
		{
			tracing::error!(
				target: crate::HOOKS_LOG_TARGET,
				plugin_id = caller.plugin_id(),
				component_id,
				"{}",
				errors::EXPOSED_COMPONENT_DEPENDENCY_MISSING,
			);
			return UsePluginComponentResult::default();
		}

		if self.apps_loading(self.apps.exposed_component_plugin_dependencies(component_id)) {
			return UsePluginComponentResult {
				is_loading: true,
				component: None,
			};
		}

		let snapshot = self.registries.exposed_components.snapshot();
		let component = snapshot
			.get(component_id)
			.map(|item| PluginExtensionExposedComponent {
				id: item.id.clone(),
				plugin_id: item.plugin_id.clone(),
				title: item.title.clone(),
				description: item.description.clone(),
				component: Arc::clone(&item.component),
			});

		UsePluginComponentResult {
			is_loading: false,
			component,
		}
	}
}

impl std::fmt::Debug for ExtensionHost {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ExtensionHost")
			.field("apps", &self.apps.len())
			.field("settings", &self.settings)
			.finish_non_exhaustive()
	}
}

/// Runs a link's `configure` for one context.
///
/// `None` hides the link: `configure` asked for it, failed, or returned a
/// path outside the plugin's app.
fn configure_link(item: &AddedLinkRegistryItem, context: &ReadOnlyContext) -> Option<LinkOverrides> {
	let Some(configure) = &item.configure else {
		return Some(LinkOverrides::default());
	};

	match configure(context) {
		Ok(Some(overrides)) => {
			if let Some(path) = &overrides.path
				&& !is_link_path_valid(&item.plugin_id, path)
			{
				tracing::error!(
					target: crate::HOOKS_LOG_TARGET,
					plugin_id = %item.plugin_id,
					extension_point_id = %item.extension_point_id,
					title = %item.title,
					path = %path,
					"{}",
					errors::INVALID_CONFIGURE_RESULT,
				);
				return None;
			}
			Some(overrides)
		}
		Ok(None) => None,
		Err(error) => {
			tracing::error!(
				target: crate::HOOKS_LOG_TARGET,
				plugin_id = %item.plugin_id,
				extension_point_id = %item.extension_point_id,
				title = %item.title,
				error = %error,
				"{}",
				errors::CONFIGURE_FAILED,
			);
			None
		}
	}
}

/// Per-plugin counter behind `limit_per_plugin`.
struct PerPluginLimit<'a> {
	limit: Option<usize>,
	counts: FxHashMap<&'a str, usize>,
}

impl<'a> PerPluginLimit<'a> {
	fn new(limit: Option<usize>) -> Self {
		Self {
			limit,
			counts: FxHashMap::default(),
		}
	}

	fn is_full(&self, plugin_id: &str) -> bool {
		self.limit
			.is_some_and(|limit| self.counts.get(plugin_id).copied().unwrap_or(0) >= limit)
	}

	/// Counts one extension of `plugin_id`; false once the plugin hit the limit.
	fn admit(&mut self, plugin_id: &'a str) -> bool {
		if self.is_full(plugin_id) {
			return false;
		}
		*self.counts.entry(plugin_id).or_default() += 1;
		true
	}
}
