//! Read-only view over the context value handed to extensions.
//!
//! Extensions receive a [`ReadOnlyContext`]: a shared, immutable
//! `serde_json::Value`. There is no accessor returning `&mut`, so plugin code
//! can read host state but never write it back. The host keeps ownership of
//! its own `Arc<Value>`; changing it later (via `Arc::make_mut`) clones rather
//! than mutating what extensions already hold.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextError {
	#[error("context value could not be converted: {0}")]
	Convert(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadOnlyContext(Arc<Value>);

impl ReadOnlyContext {
	pub fn new(value: Value) -> Self {
		Self(Arc::new(value))
	}

	/// Wraps a value the host already shares.
	pub fn from_shared(value: Arc<Value>) -> Self {
		Self(value)
	}

	/// An empty object, used when a consumer passes no context.
	pub fn empty() -> Self {
		Self::new(Value::Object(Map::new()))
	}

	pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, ContextError> {
		Ok(Self::new(serde_json::to_value(value)?))
	}

	pub fn as_value(&self) -> &Value {
		&self.0
	}

	/// Field of an object context; `None` for other shapes.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	/// JSON pointer lookup (`/panel/title`).
	pub fn pointer(&self, pointer: &str) -> Option<&Value> {
		self.0.pointer(pointer)
	}

	pub fn get_str(&self, key: &str) -> Option<&str> {
		self.get(key).and_then(Value::as_str)
	}

	pub fn is_empty(&self) -> bool {
		match self.0.as_ref() {
			Value::Null => true,
			Value::Object(map) => map.is_empty(),
			Value::Array(items) => items.is_empty(),
			_ => false,
		}
	}

	/// Deserializes an owned copy; changes to the copy never reach the host.
	pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ContextError> {
		Ok(serde_json::from_value(self.0.as_ref().clone())?)
	}

	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl Default for ReadOnlyContext {
	fn default() -> Self {
		Self::empty()
	}
}

impl Serialize for ReadOnlyContext {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		self.0.as_ref().serialize(serializer)
	}
}

#[cfg(test)]
mod tests {
	use serde::Deserialize;
	use serde_json::json;

	use super::*;

	#[derive(Debug, Deserialize, PartialEq)]
	struct Panel {
		title: String,
		targets: Vec<String>,
	}

	#[test]
	fn reads_fields_and_pointers() {
		let ctx = ReadOnlyContext::new(json!({ "panel": { "title": "CPU" }, "kind": "timeseries" }));
		assert_eq!(ctx.get_str("kind"), Some("timeseries"));
		assert_eq!(ctx.pointer("/panel/title"), Some(&json!("CPU")));
		assert!(ctx.get("missing").is_none());
	}

	#[test]
	fn copies_do_not_reach_the_host() {
		let host = Arc::new(json!({ "title": "CPU", "targets": ["A"] }));
		let ctx = ReadOnlyContext::from_shared(Arc::clone(&host));

		let mut copy: Panel = ctx.deserialize().unwrap();
		copy.title.push_str(" (edited)");
		copy.targets.clear();

		assert_eq!(host["title"], json!("CPU"));
		assert_eq!(host["targets"], json!(["A"]));
		assert_eq!(ctx.get_str("title"), Some("CPU"));
	}

	#[test]
	fn host_updates_do_not_change_frozen_views() {
		let mut host = Arc::new(json!({ "title": "CPU" }));
		let ctx = ReadOnlyContext::from_shared(Arc::clone(&host));

		Arc::make_mut(&mut host)["title"] = json!("Memory");

		assert_eq!(ctx.get_str("title"), Some("CPU"));
		assert_eq!(host["title"], json!("Memory"));
	}

	#[test]
	fn empty_context_is_an_object() {
		let ctx = ReadOnlyContext::empty();
		assert!(ctx.is_empty());
		assert!(ctx.as_value().is_object());
	}
}
