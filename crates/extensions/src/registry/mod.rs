//! Generic extension registry with copy-on-write publication.
//!
//! # Mental model
//!
//! * A registry owns one current [`RegistryState`] behind an `ArcSwap`.
//! * Readers pin an `Arc<RegistryState<V>>` and never see it change.
//! * `register` clones the current state (one `Arc` bump per key), lets the
//!   registry's mapping function fold the plugin's configs in, and publishes
//!   the result as a new snapshot.
//! * Subscribers created with [`Registry::as_observable`] receive the snapshot
//!   current at subscription time, then every later snapshot in order.
//!
//! # Invariants
//!
//! * A published snapshot is never mutated. Values touched by a registration
//!   are copied (`Arc::make_mut`) because the previous snapshot still shares
//!   them.
//! * Snapshots are published in `register` call order: the publisher lock is
//!   held from loading the base state until every subscriber was fed.
//! * Subscribing takes the same lock, so a new subscriber sees either the
//!   state before a registration plus its update, or the state after it, never
//!   both and never neither.
//! * Registration is additive. There is no removal path.
//!
//! # Failure modes
//!
//! Mapping functions reject malformed configs individually (logged and listed
//! in the [`RegisterReport`]); the rest of the batch still lands.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::sync::mpsc;

use crate::errors::ExtensionError;

pub mod added_components;
pub mod added_links;
pub mod exposed_components;
pub mod file_handlers;
pub mod setup;


/// A plugin's batch of configs for one registry.
#[derive(Debug, Clone)]
pub struct PluginExtensionConfigs<C> {
	pub plugin_id: String,
	pub configs: Vec<C>,
}

impl<C> PluginExtensionConfigs<C> {
	pub fn new(plugin_id: impl Into<String>, configs: Vec<C>) -> Self {
		Self {
			plugin_id: plugin_id.into(),
			configs,
		}
	}
}

/// Folds one plugin's configs into a state. Each registry supplies its own.
pub type MapToRegistry<V, C> = fn(&mut RegistryState<V>, PluginExtensionConfigs<C>) -> RegisterReport;

/// Immutable key to value mapping published by a registry.
///
/// List registries key by extension point id with `V = Vec<Item>` in
/// registration order; the exposed components registry keys by component id.
pub struct RegistryState<V> {
	entries: FxHashMap<Box<str>, Arc<V>>,
}

impl<V> RegistryState<V> {
	pub fn new() -> Self {
		Self {
			entries: FxHashMap::default(),
		}
	}

	pub fn get(&self, key: &str) -> Option<&V> {
		self.entries.get(key).map(AsRef::as_ref)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.entries.contains_key(key)
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(AsRef::as_ref)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
		self.entries.iter().map(|(k, v)| (k.as_ref(), v.as_ref()))
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Replaces the value under `key`.
	pub fn insert(&mut self, key: &str, value: V) {
		self.entries.insert(key.into(), Arc::new(value));
	}

	/// Whether both states share the value stored under `key`.
	pub fn shares_value(&self, other: &Self, key: &str) -> bool {
		match (self.entries.get(key), other.entries.get(key)) {
			(Some(a), Some(b)) => Arc::ptr_eq(a, b),
			_ => false,
		}
	}
}

impl<V: Clone + Default> RegistryState<V> {
	/// Mutable access to the value under `key`, creating it when absent.
	///
	/// A value still shared with an older snapshot is copied first.
	pub fn entry_mut(&mut self, key: &str) -> &mut V {
		let slot = self.entries.entry(key.into()).or_default();
		Arc::make_mut(slot)
	}
}

impl<V> Clone for RegistryState<V> {
	fn clone(&self) -> Self {
		Self {
			entries: self.entries.clone(),
		}
	}
}

impl<V> Default for RegistryState<V> {
	fn default() -> Self {
		Self::new()
	}
}

impl<V> fmt::Debug for RegistryState<V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut keys: Vec<&str> = self.keys().collect();
		keys.sort_unstable();
		f.debug_struct("RegistryState").field("keys", &keys).finish()
	}
}

/// A config the mapping function refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedConfig {
	pub plugin_id: String,
	/// Title or component id of the config, when it had one.
	pub label: Option<String>,
	pub reason: ExtensionError,
}

/// Outcome of a single `register` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterReport {
	/// Number of registry items stored (one per accepted target).
	pub added: usize,
	pub rejected: Vec<RejectedConfig>,
}

impl RegisterReport {
	pub(crate) fn reject(&mut self, plugin_id: &str, label: Option<&str>, reason: ExtensionError) {
		self.rejected.push(RejectedConfig {
			plugin_id: plugin_id.to_string(),
			label: label.map(str::to_string),
			reason,
		});
	}

	pub fn is_clean(&self) -> bool {
		self.rejected.is_empty()
	}

	pub fn merge(&mut self, other: RegisterReport) {
		self.added += other.added;
		self.rejected.extend(other.rejected);
	}
}

type Snapshot<V> = Arc<RegistryState<V>>;

struct Publisher<V> {
	subscribers: Vec<mpsc::UnboundedSender<Snapshot<V>>>,
	/// Number of snapshots published after the initial one.
	version: u64,
}

struct Store<V> {
	label: &'static str,
	current: ArcSwap<RegistryState<V>>,
	publisher: Mutex<Publisher<V>>,
}

impl<V> Store<V> {
	fn new(label: &'static str, initial: RegistryState<V>) -> Self {
		Self {
			label,
			current: ArcSwap::from_pointee(initial),
			publisher: Mutex::new(Publisher {
				subscribers: Vec::new(),
				version: 0,
			}),
		}
	}

	fn snapshot(&self) -> Snapshot<V> {
		self.current.load_full()
	}

	fn subscribe(&self) -> SnapshotStream<V> {
		let (tx, rx) = mpsc::unbounded_channel();
		let mut publisher = self.publisher.lock();
		// Receiver is alive, the send cannot fail.
		let _ = tx.send(self.current.load_full());
		publisher.subscribers.push(tx);
		SnapshotStream { rx }
	}

	fn version(&self) -> u64 {
		self.publisher.lock().version
	}
}

/// Writable registry: the plugin-facing side.
pub struct Registry<V, C> {
	store: Arc<Store<V>>,
	map: MapToRegistry<V, C>,
}

impl<V, C> Registry<V, C> {
	/// Creates an empty registry driven by `map`.
	pub fn with_mapper(label: &'static str, map: MapToRegistry<V, C>) -> Self {
		Self::with_state(label, map, RegistryState::new())
	}

	/// Creates a registry starting from an existing state.
	pub fn with_state(label: &'static str, map: MapToRegistry<V, C>, initial: RegistryState<V>) -> Self {
		Self {
			store: Arc::new(Store::new(label, initial)),
			map,
		}
	}

	/// Folds a plugin's configs into a new snapshot and publishes it.
	///
	/// A snapshot is published even when every config was rejected, so
	/// subscribers see exactly one update per call.
	pub fn register(&self, item: PluginExtensionConfigs<C>) -> RegisterReport {
		let plugin_id = item.plugin_id.clone();
		let mut publisher = self.store.publisher.lock();

		let mut next = RegistryState::clone(&self.store.current.load());
		let report = (self.map)(&mut next, item);
		let next = Arc::new(next);

		self.store.current.store(Arc::clone(&next));
		publisher.version += 1;
		publisher
			.subscribers
			.retain(|tx| tx.send(Arc::clone(&next)).is_ok());

		tracing::debug!(
			target: crate::REGISTRY_LOG_TARGET,
			registry = self.store.label,
			plugin_id = %plugin_id,
			added = report.added,
			rejected = report.rejected.len(),
			version = publisher.version,
			subscribers = publisher.subscribers.len(),
			"published registry snapshot",
		);
		report
	}

	pub fn snapshot(&self) -> Snapshot<V> {
		self.store.snapshot()
	}

	/// Replay-of-one stream of snapshots.
	pub fn as_observable(&self) -> SnapshotStream<V> {
		self.store.subscribe()
	}

	/// Read handle sharing this registry's snapshots, without write access.
	pub fn read_only(&self) -> ReadOnlyRegistry<V> {
		ReadOnlyRegistry {
			store: Arc::clone(&self.store),
		}
	}

	/// Number of registrations applied so far.
	pub fn version(&self) -> u64 {
		self.store.version()
	}

	pub fn label(&self) -> &'static str {
		self.store.label
	}
}

impl<V, C> Clone for Registry<V, C> {
	fn clone(&self) -> Self {
		Self {
			store: Arc::clone(&self.store),
			map: self.map,
		}
	}
}

impl<V, C> fmt::Debug for Registry<V, C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Registry")
			.field("label", &self.store.label)
			.field("version", &self.store.version())
			.finish()
	}
}

/// Consumer-facing registry handle. Same snapshots, no `register`.
pub struct ReadOnlyRegistry<V> {
	store: Arc<Store<V>>,
}

impl<V> ReadOnlyRegistry<V> {
	pub fn snapshot(&self) -> Snapshot<V> {
		self.store.snapshot()
	}

	pub fn as_observable(&self) -> SnapshotStream<V> {
		self.store.subscribe()
	}

	pub fn version(&self) -> u64 {
		self.store.version()
	}

	pub fn label(&self) -> &'static str {
		self.store.label
	}

	/// Whether both handles observe the same underlying registry.
	pub fn same_registry(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.store, &other.store)
	}
}

impl<V> Clone for ReadOnlyRegistry<V> {
	fn clone(&self) -> Self {
		Self {
			store: Arc::clone(&self.store),
		}
	}
}

impl<V> fmt::Debug for ReadOnlyRegistry<V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ReadOnlyRegistry")
			.field("label", &self.store.label)
			.finish()
	}
}

/// Subscription to a registry's snapshots.
///
/// The first item is the snapshot current at subscription time. Dropping the
/// stream unsubscribes; the registry prunes it on its next publication.
pub struct SnapshotStream<V> {
	rx: mpsc::UnboundedReceiver<Snapshot<V>>,
}

impl<V> SnapshotStream<V> {
	/// Waits for the next snapshot. `None` once every registry handle is gone.
	pub async fn recv(&mut self) -> Option<Snapshot<V>> {
		self.rx.recv().await
	}

	/// Next snapshot if one is already queued.
	pub fn try_recv(&mut self) -> Option<Snapshot<V>> {
		self.rx.try_recv().ok()
	}

	/// Drains queued snapshots, returning the newest.
	pub fn latest(&mut self) -> Option<Snapshot<V>> {
		let mut newest = None;
		while let Ok(snapshot) = self.rx.try_recv() {
			newest = Some(snapshot);
		}
		newest
	}
}
