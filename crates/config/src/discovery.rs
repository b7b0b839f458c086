//! Platform environment discovery.
//!
//! Responsibilities:
//! - Decide whether the process runs on the cloud platform or locally.
//! - Expose application metadata, service bindings, port, bind host and URLs as `AppEnv`.
//! - Load a local service-binding document (`vcap-local.json`) for local development.
//! - Export binding data into `VCAP_SERVICES`/`VCAP_APPLICATION` during bootstrap.
//!
//! Does NOT handle:
//! - Adding discovery results to a store (see `loader::resolve`).
//!
//! Invariants:
//! - `is_local` is true exactly when `VCAP_APPLICATION` is unset.
//! - Platform variables take precedence over the local document.
//! - A missing or unparseable binding document is ignored; contents are never logged.
//! - Exports never overwrite variables that are already set.

use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use url::Url;

use crate::constants::{
    DEFAULT_PORT, LOCAL_BIND, PLATFORM_BIND, PORT_VAR, VCAP_APP_HOST_VAR, VCAP_APP_PORT_VAR,
    VCAP_APPLICATION_VAR, VCAP_SERVICES_VAR,
};
use crate::loader::env_var_or_none;
use crate::loader::env::export_env_var;

/// Contents of a local service-binding document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceBindings {
    #[serde(default)]
    pub application: Option<Value>,
    #[serde(default)]
    pub services: Option<Value>,
}

impl ServiceBindings {
    /// Load a binding document, returning `None` if it is missing or unparseable.
    pub fn load(path: &Path) -> Option<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no service-binding document found");
                return None;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), kind = ?e.kind(), "ignoring unreadable service-binding document");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(bindings) => {
                tracing::debug!(path = %path.display(), "loaded service-binding document");
                Some(bindings)
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    line = e.line(),
                    column = e.column(),
                    "ignoring unparseable service-binding document"
                );
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.application.is_none() && self.services.is_none()
    }

    /// Write bindings into `VCAP_SERVICES`/`VCAP_APPLICATION` when those are unset.
    ///
    /// Returns the names of the variables that were written.
    pub(crate) fn export_to_env(&self) -> Vec<&'static str> {
        let mut exported = Vec::new();
        let pairs = [
            (VCAP_SERVICES_VAR, &self.services),
            (VCAP_APPLICATION_VAR, &self.application),
        ];
        for (var, value) in pairs {
            let Some(value) = value else { continue };
            if env_var_or_none(var).is_some() {
                continue;
            }
            export_env_var(var, &value.to_string());
            exported.push(var);
        }
        exported
    }
}

/// Discovered runtime context.
#[derive(Debug, Clone, PartialEq)]
pub struct AppEnv {
    pub is_local: bool,
    pub app: Value,
    pub services: Value,
    pub name: Option<String>,
    pub port: u16,
    pub bind: String,
    pub urls: Vec<Url>,
}

impl AppEnv {
    /// Inspect the process environment, falling back to `bindings` for local runs.
    pub fn discover(bindings: Option<&ServiceBindings>, name: Option<&str>) -> Self {
        let vcap_application = env_var_or_none(VCAP_APPLICATION_VAR);
        let is_local = vcap_application.is_none();

        let app = vcap_application
            .as_deref()
            .and_then(|raw| parse_json_var(VCAP_APPLICATION_VAR, raw))
            .or_else(|| bindings.and_then(|b| b.application.clone()))
            .unwrap_or_else(|| Value::Object(Map::new()));

        let services = env_var_or_none(VCAP_SERVICES_VAR)
            .as_deref()
            .and_then(|raw| parse_json_var(VCAP_SERVICES_VAR, raw))
            .or_else(|| bindings.and_then(|b| b.services.clone()))
            .unwrap_or_else(|| Value::Object(Map::new()));

        let name = app
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| name.map(str::to_string));

        let port = [PORT_VAR, VCAP_APP_PORT_VAR]
            .into_iter()
            .find_map(|var| env_var_or_none(var).and_then(|raw| raw.parse::<u16>().ok()))
            .unwrap_or(DEFAULT_PORT);

        let default_bind = if is_local { LOCAL_BIND } else { PLATFORM_BIND };
        let bind = env_var_or_none(VCAP_APP_HOST_VAR).unwrap_or_else(|| default_bind.to_string());

        let urls = application_urls(&app, is_local, port);

        tracing::debug!(is_local, port, name = ?name, "platform discovery complete");

        Self {
            is_local,
            app,
            services,
            name,
            port,
            bind,
            urls,
        }
    }

    /// First application URL.
    pub fn url(&self) -> Option<&Url> {
        self.urls.first()
    }

    fn instances(&self) -> impl Iterator<Item = &Value> {
        self.services
            .as_object()
            .into_iter()
            .flat_map(|labels| labels.values())
            .filter_map(Value::as_array)
            .flatten()
    }

    /// Find a bound service instance by exact name, then by name substring.
    pub fn service(&self, name: &str) -> Option<&Value> {
        self.instances()
            .find(|instance| instance_name(instance) == Some(name))
            .or_else(|| {
                self.instances()
                    .find(|instance| instance_name(instance).is_some_and(|n| n.contains(name)))
            })
    }

    pub fn service_credentials(&self, name: &str) -> Option<&Value> {
        self.service(name)?.get("credentials")
    }

    /// The `url` (or `uri`) credential of a bound service.
    pub fn service_url(&self, name: &str) -> Option<Url> {
        let credentials = self.service_credentials(name)?;
        let raw = credentials
            .get("url")
            .or_else(|| credentials.get("uri"))?
            .as_str()?;
        Url::parse(raw).ok()
    }

    /// JSON form placed under the `cfenv` namespace of the store.
    pub fn to_literal(&self) -> Value {
        json!({
            "isLocal": self.is_local,
            "app": self.app,
            "services": self.services,
            "name": self.name,
            "port": self.port,
            "bind": self.bind,
            "urls": self.urls.iter().map(Url::as_str).collect::<Vec<_>>(),
        })
    }
}

fn instance_name(instance: &Value) -> Option<&str> {
    instance.get("name").and_then(Value::as_str)
}

fn parse_json_var(var: &str, raw: &str) -> Option<Value> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(var = %var, "ignoring environment variable with invalid JSON");
            None
        }
    }
}

fn application_urls(app: &Value, is_local: bool, port: u16) -> Vec<Url> {
    let uris: Vec<&str> = app
        .get("application_uris")
        .or_else(|| app.get("uris"))
        .and_then(Value::as_array)
        .map(|uris| uris.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let candidates: Vec<String> = if is_local || uris.is_empty() {
        vec![format!("http://{LOCAL_BIND}:{port}")]
    } else {
        uris.iter().map(|uri| format!("https://{uri}")).collect()
    };

    candidates
        .iter()
        .filter_map(|candidate| match Url::parse(candidate) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(uri = %candidate, error = %e, "skipping invalid application URI");
                None
            }
        })
        .collect()
}
