//! Host-provided helpers passed to extension callbacks.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::context::ReadOnlyContext;

/// Modal request issued by an extension.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModalOptions {
	pub title: String,
	/// Opaque body description rendered by the host.
	pub body: Value,
	pub width: Option<String>,
	pub height: Option<String>,
}

impl ModalOptions {
	pub fn new(title: impl Into<String>, body: Value) -> Self {
		Self {
			title: title.into(),
			body,
			..Self::default()
		}
	}
}

/// The host's modal surface.
pub trait ModalHost: Send + Sync {
	/// Opens a modal on behalf of `plugin_id`.
	fn open_modal(&self, plugin_id: &str, options: ModalOptions);
}

/// Modal host for hosts without a modal surface; requests are only logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopModalHost;

impl ModalHost for NoopModalHost {
	fn open_modal(&self, plugin_id: &str, options: ModalOptions) {
		tracing::debug!(
			target: crate::HOOKS_LOG_TARGET,
			plugin_id,
			title = %options.title,
			"modal requested without a modal host",
		);
	}
}

/// What an extension callback receives besides its own arguments.
///
/// The open-modal helper is scoped to the plugin that owns the extension, so
/// a plugin cannot open modals in another plugin's name.
#[derive(Clone)]
pub struct ExtensionHelpers {
	plugin_id: Arc<str>,
	context: ReadOnlyContext,
	modal_host: Arc<dyn ModalHost>,
}

impl ExtensionHelpers {
	pub fn new(plugin_id: &str, context: ReadOnlyContext, modal_host: Arc<dyn ModalHost>) -> Self {
		Self {
			plugin_id: plugin_id.into(),
			context,
			modal_host,
		}
	}

	pub fn plugin_id(&self) -> &str {
		&self.plugin_id
	}

	pub fn context(&self) -> &ReadOnlyContext {
		&self.context
	}

	pub fn open_modal(&self, options: ModalOptions) {
		self.modal_host.open_modal(&self.plugin_id, options);
	}
}

impl fmt::Debug for ExtensionHelpers {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ExtensionHelpers")
			.field("plugin_id", &self.plugin_id)
			.field("context", &self.context)
			.finish_non_exhaustive()
	}
}
