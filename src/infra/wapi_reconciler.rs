use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::app::ports::{ObjectApiPort, WapiObject, WapiPort};
use crate::error::{ModuleError, Result};
use crate::params::Params;
use crate::schema::IbSpec;
use crate::types::{Diff, RunResult, State};

/// Desired-vs-actual reconciliation on top of raw object CRUD.
///
/// Only the fields declared in the object's schema are compared, and only
/// those the caller actually set.
pub struct WapiReconciler<A> {
    api: A,
}

impl<A: ObjectApiPort> WapiReconciler<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    fn lookup(
        &self,
        object_type: &str,
        spec: &IbSpec,
        identity: &Map<String, Value>,
    ) -> Result<Option<WapiObject>> {
        let mut found = self
            .api
            .find(object_type, identity, &spec.field_names())?;
        if found.len() > 1 {
            return Err(ModuleError::Ambiguous {
                object_type: object_type.to_string(),
                filter: Value::Object(identity.clone()).to_string(),
                count: found.len(),
            });
        }
        Ok(found.pop())
    }
}

/// Fields of `desired` whose value differs from `current`
fn changed_fields(desired: &Map<String, Value>, current: &Map<String, Value>) -> Map<String, Value> {
    desired
        .iter()
        .filter(|(k, v)| current.get(k.as_str()) != Some(*v))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn before_view(current: &Map<String, Value>, keys: &Map<String, Value>) -> Value {
    Value::Object(
        keys.keys()
            .filter_map(|k| current.get(k).map(|v| (k.clone(), v.clone())))
            .collect(),
    )
}

impl<A: ObjectApiPort> WapiPort for WapiReconciler<A> {
    fn run(&self, object_type: &str, spec: &IbSpec, params: &Params) -> Result<RunResult> {
        let payload = spec.payload(&params.fields);
        let identity = spec.identity(&payload);
        if identity.is_empty() {
            return Err(ModuleError::validation(format!(
                "no identifying field set for {}",
                object_type
            )));
        }

        let current = self.lookup(object_type, spec, &identity)?;
        debug!(object_type, exists = current.is_some(), "looked up object");

        match (params.state, current) {
            (State::Present, None) => {
                let object_ref = if params.check_mode {
                    None
                } else {
                    Some(self.api.create(object_type, &payload)?)
                };
                info!(object_type, check_mode = params.check_mode, "created object");
                Ok(RunResult {
                    changed: true,
                    diff: Some(Diff {
                        before: Value::Object(Map::new()),
                        after: Value::Object(payload),
                    }),
                    object_ref,
                })
            }
            (State::Present, Some(existing)) => {
                let changes = changed_fields(&payload, &existing.fields);
                if changes.is_empty() {
                    return Ok(RunResult::unchanged(Some(existing.object_ref)));
                }
                let object_ref = if params.check_mode {
                    existing.object_ref.clone()
                } else {
                    self.api.update(&existing.object_ref, &changes)?
                };
                info!(
                    object_type,
                    fields = ?changes.keys().collect::<Vec<_>>(),
                    check_mode = params.check_mode,
                    "updated object"
                );
                Ok(RunResult {
                    changed: true,
                    diff: Some(Diff {
                        before: before_view(&existing.fields, &changes),
                        after: Value::Object(changes),
                    }),
                    object_ref: Some(object_ref),
                })
            }
            (State::Absent, Some(existing)) => {
                if !params.check_mode {
                    self.api.delete(&existing.object_ref)?;
                }
                info!(object_type, check_mode = params.check_mode, "deleted object");
                Ok(RunResult {
                    changed: true,
                    diff: Some(Diff {
                        before: Value::Object(existing.fields),
                        after: Value::Object(Map::new()),
                    }),
                    object_ref: Some(existing.object_ref),
                })
            }
            (State::Absent, None) => Ok(RunResult::unchanged(None)),
        }
    }
}
