use reqwest::blocking::{Client, RequestBuilder, Response};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

use crate::app::ports::{ObjectApiPort, WapiObject};
use crate::error::{ModuleError, Result};
use crate::params::Provider;

/// WAPI over HTTPS with basic auth. One request per call, no retries.
pub struct ReqwestWapi {
    client: Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
    max_results: u32,
}

impl ReqwestWapi {
    pub fn new(provider: &Provider) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(provider.http_request_timeout))
            .danger_accept_invalid_certs(!provider.validate_certs)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url(provider),
            username: provider.username.clone(),
            password: provider.password.clone(),
            max_results: provider.max_results,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn send(&self, request: RequestBuilder) -> Result<Value> {
        let request = match &self.username {
            Some(user) => request.basic_auth(user, self.password.as_ref()),
            None => request,
        };
        let resp = request.send()?;
        let status = resp.status();
        debug!(status = status.as_u16(), url = %resp.url(), "WAPI response");
        if !status.is_success() {
            return Err(api_error(resp));
        }
        Ok(resp.json::<Value>()?)
    }
}

fn base_url(provider: &Provider) -> String {
    let host = provider.host.trim_end_matches('/');
    let host = if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    };
    format!("{}/wapi/v{}", host, provider.wapi_version)
}

/// WAPI reports errors as `{"Error": ..., "code": ..., "text": ...}`
fn api_error(resp: Response) -> ModuleError {
    let status = resp.status().as_u16();
    let body = resp.text().unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| {
            v.get("text")
                .or_else(|| v.get("Error"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or(body);
    ModuleError::Api { status, message }
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn object_ref(value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(ModuleError::Api {
            status: 200,
            message: format!("expected an object reference, got {}", other),
        }),
    }
}

fn into_object(value: Value) -> Option<WapiObject> {
    let Value::Object(mut fields) = value else {
        return None;
    };
    let object_ref = match fields.remove("_ref") {
        Some(Value::String(r)) => r,
        _ => return None,
    };
    Some(WapiObject { object_ref, fields })
}

impl ObjectApiPort for ReqwestWapi {
    fn find(
        &self,
        object_type: &str,
        filter: &Map<String, Value>,
        return_fields: &[&str],
    ) -> Result<Vec<WapiObject>> {
        let mut query: Vec<(String, String)> = filter
            .iter()
            .map(|(k, v)| (k.clone(), query_value(v)))
            .collect();
        query.push(("_return_fields".into(), return_fields.join(",")));
        query.push(("_max_results".into(), self.max_results.to_string()));

        let body = self.send(self.client.get(self.url(object_type)).query(&query))?;
        let objects = match body {
            Value::Array(items) => items.into_iter().filter_map(into_object).collect(),
            _ => Vec::new(),
        };
        Ok(objects)
    }

    fn create(&self, object_type: &str, payload: &Map<String, Value>) -> Result<String> {
        object_ref(self.send(self.client.post(self.url(object_type)).json(payload))?)
    }

    fn update(&self, object_ref_path: &str, payload: &Map<String, Value>) -> Result<String> {
        object_ref(self.send(self.client.put(self.url(object_ref_path)).json(payload))?)
    }

    fn delete(&self, object_ref_path: &str) -> Result<String> {
        object_ref(self.send(self.client.delete(self.url(object_ref_path)))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use serde_json::json;

    fn provider(host: &str) -> Provider {
        let explicit: Map<String, Value> =
            serde_json::from_value(json!({"host": host, "wapi_version": "2.12"})).unwrap();
        Provider::resolve(&explicit, &ProviderConfig::default()).unwrap()
    }

    #[test]
    fn base_url_defaults_to_https() {
        let api = ReqwestWapi::new(&provider("nios.example.com")).unwrap();
        assert_eq!(api.base_url(), "https://nios.example.com/wapi/v2.12");
        assert_eq!(
            api.url("extensibleattributedef/ZG5z:site"),
            "https://nios.example.com/wapi/v2.12/extensibleattributedef/ZG5z:site"
        );
    }

    #[test]
    fn explicit_scheme_is_kept() {
        let api = ReqwestWapi::new(&provider("http://127.0.0.1:8080/")).unwrap();
        assert_eq!(api.base_url(), "http://127.0.0.1:8080/wapi/v2.12");
    }

    #[test]
    fn objects_without_ref_are_skipped() {
        assert!(into_object(json!({"name": "site"})).is_none());
        let obj = into_object(json!({"_ref": "extensibleattributedef/x:site", "name": "site"})).unwrap();
        assert_eq!(obj.object_ref, "extensibleattributedef/x:site");
        assert_eq!(Value::Object(obj.fields), json!({"name": "site"}));
    }

    #[test]
    fn query_values_are_unquoted_strings() {
        assert_eq!(query_value(&json!("site")), "site");
        assert_eq!(query_value(&json!(10)), "10");
    }
}
