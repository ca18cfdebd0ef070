//! App plugin loading state consulted by the hooks.
//!
//! Hooks never load plugins themselves. They ask an [`AppPluginLoader`]
//! whether the apps an extension point depends on are ready, and report
//! `is_loading` until they are.

use std::collections::BTreeMap;
use std::pin::pin;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

/// Loading state for a set of requested apps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadAppPluginsState {
	pub is_loading: bool,
}

#[async_trait]
pub trait AppPluginLoader: Send + Sync {
	/// Requests `plugin_ids` and reports whether any of them is still loading.
	fn load_app_plugins(&self, plugin_ids: &[String]) -> LoadAppPluginsState;

	/// Resolves once none of `plugin_ids` is loading anymore.
	async fn wait_loaded(&self, _plugin_ids: &[String]) {}
}

/// Loader for hosts that load every app eagerly.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysLoaded;

#[async_trait]
impl AppPluginLoader for AlwaysLoaded {
	fn load_app_plugins(&self, _plugin_ids: &[String]) -> LoadAppPluginsState {
		LoadAppPluginsState::default()
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AppLoadStatus {
	#[default]
	Pending,
	Loading,
	Loaded,
	/// Failed apps contribute nothing but do not keep consumers waiting.
	Failed,
}

impl AppLoadStatus {
	pub fn is_settled(self) -> bool {
		matches!(self, Self::Loaded | Self::Failed)
	}
}

/// Tracks app loading driven by an external loader.
///
/// `load_app_plugins` moves pending apps to loading; whoever actually loads
/// them calls [`PreloadTracker::finish`]. Waiters are woken on every change.
#[derive(Debug, Default)]
pub struct PreloadTracker {
	states: Mutex<BTreeMap<String, AppLoadStatus>>,
	changed: Notify,
}

impl PreloadTracker {
	pub fn new() -> Self {
		Self::default()
	}

	/// Tracker where `plugin_ids` are already loaded.
	pub fn loaded<I, S>(plugin_ids: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let tracker = Self::new();
		{
			let mut states = tracker.states.lock();
			for id in plugin_ids {
				states.insert(id.into(), AppLoadStatus::Loaded);
			}
		}
		tracker
	}

	pub fn status(&self, plugin_id: &str) -> AppLoadStatus {
		self.states.lock().get(plugin_id).copied().unwrap_or_default()
	}

	pub fn mark_loaded(&self, plugin_id: &str) {
		self.finish(plugin_id, true);
	}

	/// Records the outcome of loading `plugin_id` and wakes waiters.
	pub fn finish(&self, plugin_id: &str, ok: bool) {
		let status = if ok {
			AppLoadStatus::Loaded
		} else {
			AppLoadStatus::Failed
		};
		self.states.lock().insert(plugin_id.to_string(), status);
		if !ok {
			tracing::warn!(target: crate::HOOKS_LOG_TARGET, plugin_id, "app plugin failed to load");
		}
		self.changed.notify_waiters();
	}

	fn any_loading(&self, plugin_ids: &[String]) -> bool {
		let states = self.states.lock();
		plugin_ids
			.iter()
			.any(|id| matches!(states.get(id.as_str()), Some(AppLoadStatus::Loading)))
	}
}

#[async_trait]
impl AppPluginLoader for PreloadTracker {
	fn load_app_plugins(&self, plugin_ids: &[String]) -> LoadAppPluginsState {
		let mut states = self.states.lock();
		let mut is_loading = false;
		for id in plugin_ids {
			let status = states.entry(id.clone()).or_default();
			if *status == AppLoadStatus::Pending {
				*status = AppLoadStatus::Loading;
				tracing::debug!(target: crate::HOOKS_LOG_TARGET, plugin_id = %id, "app plugin requested");
			}
			is_loading |= *status == AppLoadStatus::Loading;
		}
		LoadAppPluginsState { is_loading }
	}

	async fn wait_loaded(&self, plugin_ids: &[String]) {
		loop {
			let mut notified = pin!(self.changed.notified());
			// Register before checking so a `finish` in between is not missed.
			notified.as_mut().enable();
			if !self.any_loading(plugin_ids) {
				return;
			}
			notified.await;
		}
	}
}
