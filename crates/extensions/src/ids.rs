use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

/// Derives the consumer-facing id of an extension.
///
/// The same `(plugin_id, extension_point_id, title)` triple always yields the
/// same id, so consumers can key rendered lists across recomputations. Each
/// part is hashed with its own terminator, which keeps `("a/b", "c")` and
/// `("a", "b/c")` apart.
pub fn generate_extension_id(plugin_id: &str, extension_point_id: &str, title: &str) -> String {
	let mut hasher = FxHasher::default();
	(plugin_id, extension_point_id, title).hash(&mut hasher);
	format!("{:016x}", hasher.finish())
}
