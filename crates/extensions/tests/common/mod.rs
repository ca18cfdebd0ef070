//! Log capture shared by the integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

#[derive(Debug, Clone)]
pub struct CapturedEvent {
	pub level: Level,
	pub target: String,
	pub message: String,
	pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
	pub fn field(&self, name: &str) -> Option<&str> {
		self.fields.get(name).map(String::as_str)
	}
}

#[derive(Default)]
struct EventVisitor {
	message: String,
	fields: BTreeMap<String, String>,
}

impl Visit for EventVisitor {
	fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
		let value = format!("{value:?}");
		if field.name() == "message" {
			self.message = value;
		} else {
			self.fields.insert(field.name().to_string(), value);
		}
	}

	fn record_str(&mut self, field: &Field, value: &str) {
		if field.name() == "message" {
			self.message = value.to_string();
		} else {
			self.fields.insert(field.name().to_string(), value.to_string());
		}
	}
}

#[derive(Clone, Default)]
struct CaptureLayer {
	events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
	fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
		let mut visitor = EventVisitor::default();
		event.record(&mut visitor);
		let meta = event.metadata();
		self.events.lock().push(CapturedEvent {
			level: *meta.level(),
			target: meta.target().to_string(),
			message: visitor.message,
			fields: visitor.fields,
		});
	}
}

/// Runs `f` with a subscriber that records every event on this thread.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, Vec<CapturedEvent>) {
	let layer = CaptureLayer::default();
	let events = Arc::clone(&layer.events);
	let subscriber = tracing_subscriber::registry().with(layer);
	let out = tracing::subscriber::with_default(subscriber, f);
	let events = std::mem::take(&mut *events.lock());
	(out, events)
}

pub fn errors_containing<'a>(events: &'a [CapturedEvent], needle: &str) -> Vec<&'a CapturedEvent> {
	events
		.iter()
		.filter(|e| e.level == Level::ERROR && e.message.contains(needle))
		.collect()
}
