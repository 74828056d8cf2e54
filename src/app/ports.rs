use serde_json::{Map, Value};

use crate::error::Result;
use crate::params::Params;
use crate::schema::IbSpec;
use crate::types::RunResult;

/// Reconciliation client: compares desired against actual state on the
/// appliance and issues whatever create/update/delete calls are needed.
#[cfg_attr(test, mockall::automock)]
pub trait WapiPort: Send + Sync {
    fn run(&self, object_type: &str, spec: &IbSpec, params: &Params) -> Result<RunResult>;
}

/// A WAPI object as read back from the appliance
#[derive(Debug, Clone, PartialEq)]
pub struct WapiObject {
    pub object_ref: String,
    pub fields: Map<String, Value>,
}

/// Raw object CRUD against WAPI
pub trait ObjectApiPort: Send + Sync {
    /// Objects of `object_type` whose fields equal every entry of `filter`
    fn find(
        &self,
        object_type: &str,
        filter: &Map<String, Value>,
        return_fields: &[&str],
    ) -> Result<Vec<WapiObject>>;

    /// Returns the new object's reference
    fn create(&self, object_type: &str, payload: &Map<String, Value>) -> Result<String>;

    fn update(&self, object_ref: &str, payload: &Map<String, Value>) -> Result<String>;

    fn delete(&self, object_ref: &str) -> Result<String>;
}
