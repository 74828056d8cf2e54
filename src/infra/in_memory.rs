use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::debug;

use crate::app::ports::{ObjectApiPort, WapiObject};
use crate::error::{ModuleError, Result};

#[derive(Debug, Clone)]
struct StoredObject {
    object_type: String,
    fields: Map<String, Value>,
}

/// In-process WAPI object store for development and testing
#[derive(Default)]
pub struct InMemoryWapi {
    objects: Mutex<BTreeMap<String, StoredObject>>,
    next_id: Mutex<u64>,
    writes: Mutex<usize>,
}

impl InMemoryWapi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of create/update/delete calls served so far
    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored fields of an object, if it exists
    pub fn get(&self, object_ref: &str) -> Option<Map<String, Value>> {
        self.objects
            .lock()
            .unwrap()
            .get(object_ref)
            .map(|o| o.fields.clone())
    }

    /// Seed an object directly, bypassing the write counter
    pub fn insert(&self, object_type: &str, fields: Map<String, Value>) -> String {
        let object_ref = self.next_ref(object_type, &fields);
        self.objects.lock().unwrap().insert(
            object_ref.clone(),
            StoredObject {
                object_type: object_type.to_string(),
                fields,
            },
        );
        object_ref
    }

    fn next_ref(&self, object_type: &str, fields: &Map<String, Value>) -> String {
        let mut id = self.next_id.lock().unwrap();
        *id += 1;
        let name = fields.get("name").and_then(Value::as_str).unwrap_or_default();
        format!("{}/mem{:04}:{}", object_type, *id, name)
    }

    fn record_write(&self) {
        *self.writes.lock().unwrap() += 1;
    }

    fn not_found(object_ref: &str) -> ModuleError {
        ModuleError::Api {
            status: 404,
            message: format!("Reference {} not found", object_ref),
        }
    }
}

impl ObjectApiPort for InMemoryWapi {
    fn find(
        &self,
        object_type: &str,
        filter: &Map<String, Value>,
        return_fields: &[&str],
    ) -> Result<Vec<WapiObject>> {
        let objects = self.objects.lock().unwrap();
        let found = objects
            .iter()
            .filter(|(_, o)| o.object_type == object_type)
            .filter(|(_, o)| filter.iter().all(|(k, v)| o.fields.get(k) == Some(v)))
            .map(|(r, o)| WapiObject {
                object_ref: r.clone(),
                fields: o
                    .fields
                    .iter()
                    .filter(|(k, _)| return_fields.contains(&k.as_str()))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            })
            .collect();
        Ok(found)
    }

    fn create(&self, object_type: &str, payload: &Map<String, Value>) -> Result<String> {
        self.record_write();
        let object_ref = self.insert(object_type, payload.clone());
        debug!(object_ref = %object_ref, "created in-memory object");
        Ok(object_ref)
    }

    fn update(&self, object_ref: &str, payload: &Map<String, Value>) -> Result<String> {
        self.record_write();
        let mut objects = self.objects.lock().unwrap();
        let stored = objects
            .get_mut(object_ref)
            .ok_or_else(|| Self::not_found(object_ref))?;
        for (k, v) in payload {
            stored.fields.insert(k.clone(), v.clone());
        }
        Ok(object_ref.to_string())
    }

    fn delete(&self, object_ref: &str) -> Result<String> {
        self.record_write();
        self.objects
            .lock()
            .unwrap()
            .remove(object_ref)
            .map(|_| object_ref.to_string())
            .ok_or_else(|| Self::not_found(object_ref))
    }
}
