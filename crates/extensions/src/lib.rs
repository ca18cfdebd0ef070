//! Plugin extension registries and the hooks that consume them.
//!
//! Plugins contribute links, components, file handlers and exposed components
//! at named extension points. The host never knows about plugins at compile
//! time; it only reads what the registries currently hold.
//!
//! # Layout
//!
//! - [`registry`] - generic copy-on-write store plus the concrete registries
//! - [`hooks`] - per-render consumption ([`ExtensionHost`])
//! - [`validators`] / [`ids`] / [`errors`] - identity and naming policy
//! - [`context`] - read-only context handed to extension callbacks
//! - [`loader`] - app plugin loading state consulted by the hooks
//! - [`config`] - TOML configuration for the host
//!
//! # Data flow
//!
//! 1. Startup builds [`PluginExtensionRegistries`], registering host builtins.
//! 2. Plugins call `register` on the writable registries.
//! 3. Each registration publishes a new immutable snapshot.
//! 4. Consumers hold an [`ExtensionHost`] over the read-only registries and
//!    resolve extension points against the latest snapshot.

pub mod config;
pub mod context;
pub mod errors;
pub mod helpers;
pub mod hooks;
pub mod ids;
pub mod loader;
pub mod meta;
pub mod registry;
pub mod validators;

pub use config::{ConfigError, OutletConfig, RuntimeSettings};
pub use context::{ContextError, ReadOnlyContext};
pub use errors::ExtensionError;
pub use helpers::{ExtensionHelpers, ModalHost, ModalOptions, NoopModalHost};
pub use hooks::{
	ExtensionHost, PluginExtension, PluginExtensionComponent, PluginExtensionExposedComponent,
	PluginExtensionFileHandler, PluginExtensionLink, PluginExtensionType, UsePluginComponentResult,
	UsePluginComponentsResult, UsePluginExtensionsOptions, UsePluginExtensionsResult,
	UsePluginFileHandlersResult, UsePluginHook, UsePluginLinksResult, UsePluginResult,
};
pub use ids::generate_extension_id;
pub use loader::{AlwaysLoaded, AppLoadStatus, AppPluginLoader, LoadAppPluginsState, PreloadTracker};
pub use meta::{AppPluginTable, PluginContext, PluginMeta, Targets};
pub use registry::setup::{
	CoreExtensions, PluginExtensionRegistries, ReadOnlyPluginExtensionRegistries,
};
pub use registry::{
	PluginExtensionConfigs, ReadOnlyRegistry, RegisterReport, Registry, RegistryState,
	RejectedConfig, SnapshotStream,
};

/// Log target for registration-time events.
pub(crate) const REGISTRY_LOG_TARGET: &str = "outlet::registry";

/// Log target for consumption-time events.
pub(crate) const HOOKS_LOG_TARGET: &str = "outlet::hooks";
