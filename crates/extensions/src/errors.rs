//! Message catalog for registration and consumption failures.
//!
//! The same constants are used for log lines and for the typed
//! [`ExtensionError`] carried in registration reports, so tests can match on
//! either.

use thiserror::Error;

pub const TITLE_MISSING: &str = "Title is missing.";

pub const DESCRIPTION_MISSING: &str = "Description is missing.";

pub const INVALID_PATH_OR_ON_CLICK: &str = "Either \"path\" or \"on_click\" is required.";

pub const INVALID_PATH: &str = "The \"path\" should start with \"/a/<plugin-id>/\".";

pub const INVALID_TARGET: &str = "The target should be a non-empty extension point id.";

pub const INVALID_CONFIGURE_RESULT: &str =
	"The \"configure\" function returned an invalid override and the link was hidden.";

pub const CONFIGURE_FAILED: &str = "The \"configure\" function failed and the link was hidden.";

pub const INVALID_EXTENSION_POINT_ID: &str = "Invalid extension point id. The id should be \
	prefixed with the host namespace or the plugin id followed by a slash, e.g. \
	\"<plugin-id>/component-name/v1\".";

pub const EXTENSION_POINT_META_INFO_MISSING: &str = "The extension point is not declared in the \
	plugin metadata. Add it to \"extensions.extension_points\" of the plugin.";

pub const INVALID_EXPOSED_COMPONENT_ID: &str =
	"The component id should be prefixed with the plugin id followed by a slash.";

pub const EXPOSED_COMPONENT_ALREADY_EXISTS: &str =
	"An exposed component with the same id already exists.";

pub const EXPOSED_COMPONENT_DEPENDENCY_MISSING: &str = "The exposed component is not declared \
	as a dependency. Add it to \"dependencies.extensions.exposed_components\" of the plugin.";

/// Validation failure of a single contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExtensionError {
	#[error("{}", TITLE_MISSING)]
	TitleMissing,
	#[error("{}", DESCRIPTION_MISSING)]
	DescriptionMissing,
	#[error("{}", INVALID_PATH_OR_ON_CLICK)]
	InvalidPathOrOnClick,
	#[error("{}", INVALID_PATH)]
	InvalidPath,
	#[error("{}", INVALID_TARGET)]
	InvalidTarget,
	#[error("{}", INVALID_EXTENSION_POINT_ID)]
	InvalidExtensionPointId,
	#[error("{}", EXTENSION_POINT_META_INFO_MISSING)]
	ExtensionPointMetaInfoMissing,
	#[error("{}", INVALID_EXPOSED_COMPONENT_ID)]
	InvalidExposedComponentId,
	#[error("{}", EXPOSED_COMPONENT_ALREADY_EXISTS)]
	ExposedComponentAlreadyExists,
	#[error("{}", EXPOSED_COMPONENT_DEPENDENCY_MISSING)]
	ExposedComponentDependencyMissing,
}

impl ExtensionError {
	/// Returns the catalog message for this error.
	pub const fn message(self) -> &'static str {
		match self {
			Self::TitleMissing => TITLE_MISSING,
			Self::DescriptionMissing => DESCRIPTION_MISSING,
			Self::InvalidPathOrOnClick => INVALID_PATH_OR_ON_CLICK,
			Self::InvalidPath => INVALID_PATH,
			Self::InvalidTarget => INVALID_TARGET,
			Self::InvalidExtensionPointId => INVALID_EXTENSION_POINT_ID,
			Self::ExtensionPointMetaInfoMissing => EXTENSION_POINT_META_INFO_MISSING,
			Self::InvalidExposedComponentId => INVALID_EXPOSED_COMPONENT_ID,
			Self::ExposedComponentAlreadyExists => EXPOSED_COMPONENT_ALREADY_EXISTS,
			Self::ExposedComponentDependencyMissing => EXPOSED_COMPONENT_DEPENDENCY_MISSING,
		}
	}
}
