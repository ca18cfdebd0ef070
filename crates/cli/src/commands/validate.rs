use std::io::Write;

use outlet_extensions::meta::ExtensionMeta;
use outlet_extensions::validators::{is_extension_point_id_valid, is_target_valid};
use outlet_extensions::{ExtensionError, OutletConfig, PluginMeta, RegisterReport, RejectedConfig};

use super::load_registries;

/// Prints one line per plugin plus one per rejection. Returns whether the
/// config registered cleanly.
pub fn run(config: &OutletConfig, out: &mut impl Write) -> anyhow::Result<bool> {
	let (_, mut reports) = load_registries(config);
	let host_plugin_id = config.runtime.host_plugin_id.as_str();

	for meta in config.apps.values() {
		let report = RegisterReport {
			added: 0,
			rejected: declared_rejections(meta, host_plugin_id),
		};
		if !report.is_clean() {
			match reports.iter_mut().find(|(plugin_id, _)| *plugin_id == meta.id) {
				Some((_, existing)) => existing.merge(report),
				None => reports.push((meta.id.clone(), report)),
			}
		}
	}

	let mut clean = true;
	for (plugin_id, report) in &reports {
		writeln!(
			out,
			"{plugin_id}: {} stored, {} rejected",
			report.added,
			report.rejected.len()
		)?;
		for rejected in &report.rejected {
			clean = false;
			let label = rejected.label.as_deref().unwrap_or("<untitled>");
			writeln!(out, "  {label}: {}", rejected.reason)?;
		}
	}
	Ok(clean)
}

/// Checks the declarations that only take effect once the app registers them.
fn declared_rejections(meta: &PluginMeta, host_plugin_id: &str) -> Vec<RejectedConfig> {
	let reject = |label: Option<&str>, reason| RejectedConfig {
		plugin_id: meta.id.clone(),
		label: label.map(str::to_string),
		reason,
	};
	let mut rejected: Vec<_> = meta
		.extensions
		.extension_points
		.iter()
		.filter(|point| !is_extension_point_id_valid(&point.id, &meta.id, host_plugin_id))
		.map(|point| reject(Some(point.id.as_str()), ExtensionError::InvalidExtensionPointId))
		.collect();

	let declared = meta
		.extensions
		.added_components
		.iter()
		.chain(&meta.extensions.added_file_handlers);
	for ExtensionMeta { title, targets, .. } in declared {
		let Some(title) = title.as_deref().filter(|t| !t.trim().is_empty()) else {
			rejected.push(reject(None, ExtensionError::TitleMissing));
			continue;
		};
		for _ in targets.iter().filter(|target| !is_target_valid(target)) {
			rejected.push(reject(Some(title), ExtensionError::InvalidTarget));
		}
	}
	rejected
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	fn output(source: &str) -> (bool, String) {
		let config = OutletConfig::parse(source).unwrap();
		let mut out = Vec::new();
		let clean = run(&config, &mut out).unwrap();
		(clean, String::from_utf8(out).unwrap())
	}

	#[test]
	fn clean_config_reports_counts() {
		let (clean, text) = output(
			r#"
[[core.added_links]]
title = "Explore"
description = "d"
targets = ["grafana/menu", "grafana/toolbar"]
path = "/a/grafana/explore"
"#,
		);
		assert!(clean);
		assert_eq!(text, "grafana: 2 stored, 0 rejected\n");
	}

	#[test]
	fn rejections_are_listed_per_plugin() {
		let (clean, text) = output(
			r#"
[apps.acme.extensions]
extension_points = [{ id = "bad" }, { id = "acme/ok" }]
added_links = [
	{ title = "Open", description = "d", targets = "grafana/menu", path = "/a/other/x" },
	{ title = "Fine", description = "d", targets = "grafana/menu", path = "/a/acme/x" },
]
"#,
		);
		assert!(!clean);
		let lines: Vec<_> = text.lines().collect();
		assert_eq!(lines[0], "grafana: 0 stored, 0 rejected");
		assert_eq!(lines[1], "acme: 1 stored, 2 rejected");
		assert!(lines[2].starts_with("  Open: The \"path\""));
		assert!(lines[3].starts_with("  bad: Invalid extension point id."));
	}

	#[test]
	fn declared_components_and_file_handlers_are_checked() {
		let (clean, text) = output(
			r#"
[apps.acme.extensions]
added_components = [{ description = "no title", targets = "grafana/menu" }]
added_file_handlers = [
	{ title = "Import CSV", targets = ["dash/grid", ""] },
	{ title = "Import JSON", targets = "dash/grid" },
]
"#,
		);
		assert!(!clean);
		let lines: Vec<_> = text.lines().collect();
		assert_eq!(lines[1], "acme: 0 stored, 2 rejected");
		assert_eq!(lines[2], "  <untitled>: Title is missing.");
		assert!(lines[3].starts_with("  Import CSV: The target should be"));
	}
}
