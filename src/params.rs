//! Module argument parsing.
//!
//! Raw arguments arrive as one JSON object (optionally wrapped in
//! `ANSIBLE_MODULE_ARGS`). They are checked against the argument schema,
//! defaulted, and split into framework settings and object fields.

use serde_json::{Map, Value};
use std::env;
use std::fmt;
use tracing::debug;

use crate::config::ProviderConfig;
use crate::constants::{
    CHECK_MODE_ARG, DEFAULT_HTTP_REQUEST_TIMEOUT, DEFAULT_MAX_RESULTS, DEFAULT_MAX_RETRIES,
    DEFAULT_WAPI_VERSION, ENV_HOST, ENV_PASSWORD, ENV_USERNAME, ENV_WAPI_VERSION,
    INTERNAL_ARG_PREFIX, MODULE_ARGS_KEY,
};
use crate::error::{ModuleError, Result};
use crate::schema::{argument_spec, IbSpec};
use crate::types::State;

/// Connection settings for the appliance
#[derive(Clone, PartialEq)]
pub struct Provider {
    pub host: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub validate_certs: bool,
    pub http_request_timeout: u64,
    /// Passed through for collaborators that retry; the bundled HTTP
    /// adapter does not.
    pub max_retries: u32,
    pub wapi_version: String,
    pub max_results: u32,
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "********"))
            .field("validate_certs", &self.validate_certs)
            .field("http_request_timeout", &self.http_request_timeout)
            .field("max_retries", &self.max_retries)
            .field("wapi_version", &self.wapi_version)
            .field("max_results", &self.max_results)
            .finish()
    }
}

impl Provider {
    /// Resolve provider settings: explicit arguments, then `INFOBLOX_*`
    /// environment variables, then the config file, then defaults.
    pub fn resolve(explicit: &Map<String, Value>, file: &ProviderConfig) -> Result<Self> {
        let str_arg = |key: &str| explicit.get(key).and_then(Value::as_str).map(str::to_string);
        let env_arg = |key: &str| env::var(key).ok().filter(|v| !v.is_empty());

        let host = str_arg("host")
            .or_else(|| env_arg(ENV_HOST))
            .or_else(|| file.host.clone())
            .ok_or_else(|| {
                ModuleError::validation(format!(
                    "provider host is required (set provider.host or {})",
                    ENV_HOST
                ))
            })?;

        let validate_certs = explicit
            .get("validate_certs")
            .and_then(Value::as_bool)
            .or_else(|| explicit.get("ssl_verify").and_then(Value::as_bool))
            .or(file.validate_certs)
            .unwrap_or(false);

        Ok(Provider {
            host,
            username: str_arg("username")
                .or_else(|| env_arg(ENV_USERNAME))
                .or_else(|| file.username.clone()),
            password: str_arg("password")
                .or_else(|| env_arg(ENV_PASSWORD))
                .or_else(|| file.password.clone()),
            validate_certs,
            http_request_timeout: int_arg(explicit, "http_request_timeout")?
                .or(file.http_request_timeout)
                .unwrap_or(DEFAULT_HTTP_REQUEST_TIMEOUT),
            max_retries: int_arg(explicit, "max_retries")?
                .or(file.max_retries)
                .unwrap_or(DEFAULT_MAX_RETRIES),
            wapi_version: str_arg("wapi_version")
                .or_else(|| env_arg(ENV_WAPI_VERSION))
                .or_else(|| file.wapi_version.clone())
                .unwrap_or_else(|| DEFAULT_WAPI_VERSION.to_string()),
            max_results: int_arg(explicit, "max_results")?
                .or(file.max_results)
                .unwrap_or(DEFAULT_MAX_RESULTS),
        })
    }
}

/// Read an unsigned provider integer, rejecting values the target type
/// cannot hold.
fn int_arg<T: TryFrom<u64>>(explicit: &Map<String, Value>, key: &str) -> Result<Option<T>> {
    match explicit.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| T::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| {
                ModuleError::validation(format!(
                    "provider.{} is out of range: {}",
                    key, value
                ))
            }),
    }
}

/// Validated arguments of one module invocation
#[derive(Debug, Clone)]
pub struct Params {
    pub state: State,
    pub check_mode: bool,
    pub provider: Provider,
    /// Values of the object's declared fields; unset fields are `null`
    pub fields: Map<String, Value>,
}

impl Params {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|v| !v.is_null())
    }

    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    /// Parse raw arguments for an object described by `spec`.
    ///
    /// Field transforms are not applied here; see
    /// [`IbSpec::apply_transforms`].
    pub fn parse(raw: Value, spec: &IbSpec, provider_fallback: &ProviderConfig) -> Result<Self> {
        let mut args = unwrap_module_args(raw)?;

        let check_mode = args
            .get(CHECK_MODE_ARG)
            .and_then(Value::as_bool)
            .unwrap_or(false);
        args.retain(|k, _| !k.starts_with(INTERNAL_ARG_PREFIX));

        let arg_spec = argument_spec(spec);
        arg_spec.validate(&Value::Object(args.clone()))?;
        arg_spec.apply_defaults(&mut args);

        let state = args
            .get("state")
            .and_then(Value::as_str)
            .unwrap_or("present")
            .parse::<State>()?;

        let explicit_provider = args
            .get("provider")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        let provider = Provider::resolve(&explicit_provider, provider_fallback)?;

        let fields: Map<String, Value> = spec
            .fields()
            .iter()
            .map(|f| {
                let value = args.get(f.name).cloned().unwrap_or(Value::Null);
                (f.name.to_string(), value)
            })
            .collect();

        debug!(?state, check_mode, host = %provider.host, "parsed module arguments");

        Ok(Params {
            state,
            check_mode,
            provider,
            fields,
        })
    }
}

fn unwrap_module_args(raw: Value) -> Result<Map<String, Value>> {
    let mut args = match raw {
        Value::Object(map) => map,
        _ => {
            return Err(ModuleError::validation(
                "module arguments must be a JSON object",
            ))
        }
    };
    if let Some(Value::Object(inner)) = args.remove(MODULE_ARGS_KEY) {
        args = inner;
    }
    Ok(args)
}
