//! Memoized hook handles.
//!
//! A [`UsePluginHook`] is bound to one caller. `call` recomputes only when a
//! relevant registry published a new snapshot, the options changed, or the
//! loading state flipped; otherwise it returns the identical `Arc`, so
//! consumers can compare results with `Arc::ptr_eq` before re-rendering.

use std::sync::Arc;

use async_trait::async_trait;

use super::{
	ExtensionHost, UsePluginComponentsResult, UsePluginExtensionsOptions,
	UsePluginExtensionsResult, UsePluginFileHandlersResult, UsePluginLinksResult,
};
use crate::meta::PluginContext;
use crate::registry::SnapshotStream;
use crate::registry::added_components::AddedComponentRegistryItem;
use crate::registry::added_links::AddedLinkRegistryItem;
use crate::registry::file_handlers::FileHandlerRegistryItem;

/// One list hook: which registries it reads and how it resolves.
#[async_trait]
pub trait ExtensionKind {
	type Output: Send + Sync;
	type Streams: Send;

	fn resolve(
		host: &ExtensionHost,
		caller: Option<&PluginContext>,
		options: &UsePluginExtensionsOptions,
	) -> Arc<Self::Output>;

	/// Registry versions the output depends on.
	fn versions(host: &ExtensionHost) -> Vec<u64>;

	fn subscribe(host: &ExtensionHost) -> Self::Streams;

	/// Waits for the next snapshot of any read registry; false once they are gone.
	async fn changed(streams: &mut Self::Streams) -> bool;
}

/// Subscribes and discards the replayed current snapshot.
fn fresh<V>(mut stream: SnapshotStream<V>) -> SnapshotStream<V> {
	stream.try_recv();
	stream
}

pub struct FileHandlersHook;

#[async_trait]
impl ExtensionKind for FileHandlersHook {
	type Output = UsePluginFileHandlersResult;
	type Streams = SnapshotStream<Vec<FileHandlerRegistryItem>>;

	fn resolve(
		host: &ExtensionHost,
		caller: Option<&PluginContext>,
		options: &UsePluginExtensionsOptions,
	) -> Arc<Self::Output> {
		host.use_plugin_file_handlers(caller, options)
	}

	fn versions(host: &ExtensionHost) -> Vec<u64> {
		vec![host.registries().added_file_handlers.version()]
	}

	fn subscribe(host: &ExtensionHost) -> Self::Streams {
		fresh(host.registries().added_file_handlers.as_observable())
	}

	async fn changed(streams: &mut Self::Streams) -> bool {
		streams.recv().await.is_some()
	}
}

pub struct LinksHook;

#[async_trait]
impl ExtensionKind for LinksHook {
	type Output = UsePluginLinksResult;
	type Streams = SnapshotStream<Vec<AddedLinkRegistryItem>>;

	fn resolve(
		host: &ExtensionHost,
		caller: Option<&PluginContext>,
		options: &UsePluginExtensionsOptions,
	) -> Arc<Self::Output> {
		host.use_plugin_links(caller, options)
	}

	fn versions(host: &ExtensionHost) -> Vec<u64> {
		vec![host.registries().added_links.version()]
	}

	fn subscribe(host: &ExtensionHost) -> Self::Streams {
		fresh(host.registries().added_links.as_observable())
	}

	async fn changed(streams: &mut Self::Streams) -> bool {
		streams.recv().await.is_some()
	}
}

pub struct ComponentsHook;

#[async_trait]
impl ExtensionKind for ComponentsHook {
	type Output = UsePluginComponentsResult;
	type Streams = SnapshotStream<Vec<AddedComponentRegistryItem>>;

	fn resolve(
		host: &ExtensionHost,
		caller: Option<&PluginContext>,
		options: &UsePluginExtensionsOptions,
	) -> Arc<Self::Output> {
		host.use_plugin_components(caller, options)
	}

	fn versions(host: &ExtensionHost) -> Vec<u64> {
		vec![host.registries().added_components.version()]
	}

	fn subscribe(host: &ExtensionHost) -> Self::Streams {
		fresh(host.registries().added_components.as_observable())
	}

	async fn changed(streams: &mut Self::Streams) -> bool {
		streams.recv().await.is_some()
	}
}

pub struct ExtensionsHook;

#[async_trait]
impl ExtensionKind for ExtensionsHook {
	type Output = UsePluginExtensionsResult;
	type Streams = (
		SnapshotStream<Vec<AddedLinkRegistryItem>>,
		SnapshotStream<Vec<AddedComponentRegistryItem>>,
	);

	fn resolve(
		host: &ExtensionHost,
		caller: Option<&PluginContext>,
		options: &UsePluginExtensionsOptions,
	) -> Arc<Self::Output> {
		host.use_plugin_extensions(caller, options)
	}

	fn versions(host: &ExtensionHost) -> Vec<u64> {
		let registries = host.registries();
		vec![registries.added_links.version(), registries.added_components.version()]
	}

	fn subscribe(host: &ExtensionHost) -> Self::Streams {
		let registries = host.registries();
		(
			fresh(registries.added_links.as_observable()),
			fresh(registries.added_components.as_observable()),
		)
	}

	async fn changed(streams: &mut Self::Streams) -> bool {
		let (links, components) = streams;
		tokio::select! {
			snapshot = links.recv() => snapshot.is_some(),
			snapshot = components.recv() => snapshot.is_some(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Inputs {
	versions: Vec<u64>,
	is_loading: bool,
}

/// Memoizing handle over one hook for one caller.
pub struct UsePluginHook<K: ExtensionKind> {
	host: ExtensionHost,
	caller: Option<PluginContext>,
	options: UsePluginExtensionsOptions,
	streams: K::Streams,
	last: Option<(Inputs, Arc<K::Output>)>,
}

impl<K: ExtensionKind> UsePluginHook<K> {
	pub fn new(
		host: ExtensionHost,
		caller: Option<PluginContext>,
		options: UsePluginExtensionsOptions,
	) -> Self {
		let streams = K::subscribe(&host);
		Self {
			host,
			caller,
			options,
			streams,
			last: None,
		}
	}

	pub fn options(&self) -> &UsePluginExtensionsOptions {
		&self.options
	}

	/// Replaces the options; the next `call` recomputes unless they are the same.
	pub fn set_options(&mut self, options: UsePluginExtensionsOptions) {
		if !self.options.same_inputs(&options) {
			self.last = None;
		}
		self.options = options;
	}

	/// Current result, recomputed only when an input changed.
	pub fn call(&mut self) -> Arc<K::Output> {
		let inputs = Inputs {
			versions: K::versions(&self.host),
			is_loading: self.host.is_loading(&self.options.extension_point_id),
		};
		if let Some((last_inputs, output)) = &self.last
			&& *last_inputs == inputs
		{
			return Arc::clone(output);
		}

		let output = K::resolve(&self.host, self.caller.as_ref(), &self.options);
		self.last = Some((inputs, Arc::clone(&output)));
		output
	}

	/// Resolves when a read registry publishes again; false once it is gone.
	pub async fn changed(&mut self) -> bool {
		K::changed(&mut self.streams).await
	}
}
