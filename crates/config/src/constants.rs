//! Centralized constants for the appenv workspace.
//!
//! This module contains well-known file names, environment variable names and
//! default values shared by the loader, discovery and CLI crates.

// =============================================================================
// File Locations
// =============================================================================

/// Default `.env` file, resolved against the working directory.
pub const DEFAULT_ENV_PATH: &str = ".env";

/// Default local service-binding document, resolved against the working directory.
pub const DEFAULT_VCAP_PATH: &str = "vcap-local.json";

// =============================================================================
// Environment Variables
// =============================================================================

/// Port variable read by discovery and written back for local runs.
pub const PORT_VAR: &str = "PORT";

/// Platform application metadata. Its absence marks a local context.
pub const VCAP_APPLICATION_VAR: &str = "VCAP_APPLICATION";

/// Platform service bindings.
pub const VCAP_SERVICES_VAR: &str = "VCAP_SERVICES";

/// Legacy platform port variable, consulted after `PORT`.
pub const VCAP_APP_PORT_VAR: &str = "VCAP_APP_PORT";

/// Legacy platform host variable.
pub const VCAP_APP_HOST_VAR: &str = "VCAP_APP_HOST";

/// Set to `1` or `true` to skip `.env` loading entirely.
pub const DOTENV_DISABLED_VAR: &str = "DOTENV_DISABLED";

// =============================================================================
// Discovery Defaults
// =============================================================================

/// Port reported by discovery when neither `PORT` nor `VCAP_APP_PORT` is set.
pub const DEFAULT_PORT: u16 = 3000;

/// Bind host reported for local runs.
pub const LOCAL_BIND: &str = "localhost";

/// Bind host reported when running on the platform.
pub const PLATFORM_BIND: &str = "0.0.0.0";

// =============================================================================
// Store Layout
// =============================================================================

/// Namespace under which the discovery literal layer is queryable.
pub const CFENV_NAMESPACE: &str = "cfenv";

/// Separator for nested key paths, e.g. `cfenv:isLocal`.
pub const KEY_SEPARATOR: char = ':';

/// Command name used for usage text when the caller does not supply one.
pub const DEFAULT_APP_NAME: &str = "app";
